//! Request and response vocabulary for habitkit.
//!
//! This crate defines what a caller says to the API and what it hears
//! back, independent of how bytes move:
//!
//! - **Types** ([`RequestDescriptor`], [`ResponseOutcome`], [`Payload`]):
//!   one request in, one classified outcome out.
//! - **Codec** ([`ResponseBody`], [`encode_payload`]): JSON in both
//!   directions, tolerant of non-JSON replies.
//! - **Habits** ([`Habit`], [`NewHabit`], [`HabitUpdate`], [`HabitId`],
//!   [`Frequency`]): typed records for the habit endpoints.
//! - **Errors** ([`ProtocolError`], [`OutcomeError`]).
//!
//! # Architecture
//!
//! ```text
//! Transport (HttpRequest/HttpResponse) → Protocol (descriptor/outcome) → Client
//! ```

mod codec;
mod error;
mod habit;
mod types;

pub use codec::{
    access_token, challenge_session, encode_payload, from_value, to_payload,
    ResponseBody, NEW_PASSWORD_REQUIRED,
};
pub use error::{OutcomeError, ProtocolError};
pub use habit::{
    Frequency, Habit, HabitId, HabitUpdate, NewHabit, HABITS_PATH,
};
pub use habitkit_transport::Method;
pub use types::{Payload, RequestDescriptor, ResponseOutcome};
