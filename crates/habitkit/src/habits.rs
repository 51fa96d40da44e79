//! Typed habit endpoints on top of the passthrough surface.
//!
//! `HabitsApi` holds no state. Each method builds a path and payload,
//! calls the client, and turns the outcome into a `Result` so callers can
//! use `?`. Validation that can be done locally (empty update, blank
//! name) happens before anything is sent.

use habitkit_protocol::{
    Habit, HabitId, HabitUpdate, NewHabit, Payload, ProtocolError,
    HABITS_PATH,
};
use habitkit_transport::HttpTransport;

use crate::{AuthenticatedRequestClient, HabitkitError};

/// Borrowed view of a client that speaks in habits.
///
/// Obtained from [`AuthenticatedRequestClient::habits`].
pub struct HabitsApi<'a, T: HttpTransport> {
    client: &'a AuthenticatedRequestClient<T>,
}

impl<'a, T: HttpTransport> HabitsApi<'a, T> {
    pub(crate) fn new(client: &'a AuthenticatedRequestClient<T>) -> Self {
        Self { client }
    }

    /// Lists the caller's habits.
    ///
    /// # Errors
    /// - [`HabitkitError::Outcome`] for any non-success outcome
    /// - [`HabitkitError::Protocol`] if a record cannot be decoded
    pub async fn list(&self) -> Result<Vec<Habit>, HabitkitError> {
        let body = self.client.get(HABITS_PATH).await.into_result()?;
        let habits = Habit::list_from(&body)?;
        tracing::debug!(count = habits.len(), "habits listed");
        Ok(habits)
    }

    /// Creates a habit and returns the server's reply (normally carrying
    /// the new `habitId`).
    ///
    /// # Errors
    /// [`HabitkitError::Outcome`] for any non-success outcome.
    pub async fn create(&self, habit: &NewHabit) -> Result<Payload, HabitkitError> {
        let payload = habit.to_payload()?;
        let body = self.client.post(HABITS_PATH, payload).await.into_result()?;
        tracing::info!(name = habit.name(), "habit created");
        Ok(body)
    }

    /// Updates the fields set in `update`.
    ///
    /// # Errors
    /// - [`HabitkitError::Protocol`] if `update` sets nothing (no request
    ///   is sent)
    /// - [`HabitkitError::Outcome`] for any non-success outcome
    pub async fn update(
        &self,
        id: &HabitId,
        update: &HabitUpdate,
    ) -> Result<Payload, HabitkitError> {
        if update.is_empty() {
            return Err(ProtocolError::InvalidMessage(
                "update sets no fields".into(),
            )
            .into());
        }
        let payload = update.to_payload()?;
        let body = self
            .client
            .put(&id.resource_path(), payload)
            .await
            .into_result()?;
        Ok(body)
    }

    /// Deletes a habit.
    ///
    /// # Errors
    /// [`HabitkitError::Outcome`] for any non-success outcome.
    pub async fn delete(&self, id: &HabitId) -> Result<Payload, HabitkitError> {
        let body = self
            .client
            .delete(&id.resource_path(), None)
            .await
            .into_result()?;
        tracing::info!(%id, "habit deleted");
        Ok(body)
    }

    /// Marks a habit done for today.
    ///
    /// # Errors
    /// [`HabitkitError::Outcome`] for any non-success outcome.
    pub async fn complete(&self, id: &HabitId) -> Result<Payload, HabitkitError> {
        let body = self
            .client
            .post(&id.complete_path(), Payload::new())
            .await
            .into_result()?;
        Ok(body)
    }

    /// Fetches a habit's completion history.
    ///
    /// # Errors
    /// [`HabitkitError::Outcome`] for any non-success outcome.
    pub async fn history(&self, id: &HabitId) -> Result<Payload, HabitkitError> {
        Ok(self.client.get(&id.history_path()).await.into_result()?)
    }
}
