//! # habitkit
//!
//! Client core for a personal habit-tracking API behind a managed
//! identity provider.
//!
//! habitkit owns the part of a habit tracker that has real state: who the
//! user is signed in as, and what happens to that when the server answers.
//! Every request goes through one [`AuthenticatedRequestClient`], which
//! attaches the bearer credential, classifies the reply into a
//! [`ResponseOutcome`], and keeps the [`SessionStore`] in step.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use habitkit::prelude::*;
//!
//! # async fn run() -> Result<(), HabitkitError> {
//! let config = ClientConfig::builder()
//!     .base_url("https://api.example.com/dev")
//!     .build()?;
//! let client = AuthenticatedRequestClient::new(config)?;
//!
//! match client.login("a@x.com", "temporary-pw").await {
//!     ResponseOutcome::ChallengeRequired { .. } => {
//!         client.complete_challenge("NewPw1!").await.into_result()?;
//!     }
//!     other => {
//!         other.into_result()?;
//!     }
//! }
//!
//! for habit in client.habits().list().await? {
//!     println!("{} ({})", habit.name, habit.frequency);
//! }
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod error;
mod habits;

pub use client::{
    AuthenticatedRequestClient, NO_ACTIVE_SESSION, REQUEST_FAILED,
    SESSION_REJECTED, SESSION_SUPERSEDED,
};
pub use config::{ClientConfig, ClientConfigBuilder, Endpoints, RequestFields};
pub use error::HabitkitError;
pub use habits::HabitsApi;

pub use habitkit_protocol::{
    Frequency, Habit, HabitId, HabitUpdate, Method, NewHabit, OutcomeError,
    Payload, RequestDescriptor, ResponseOutcome,
};
pub use habitkit_session::{
    PendingChallenge, SessionSnapshot, SessionState, SessionStore,
};
pub use habitkit_transport::{
    HttpRequest, HttpResponse, HttpTransport, ReqwestTransport, TransportError,
};

/// Everything a typical caller needs, in one import.
pub mod prelude {
    pub use crate::{
        AuthenticatedRequestClient, ClientConfig, Frequency, Habit, HabitId,
        HabitUpdate, HabitkitError, NewHabit, Payload, RequestDescriptor,
        ResponseOutcome,
    };
}
