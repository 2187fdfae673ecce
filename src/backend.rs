use crate::error::{AppError, BackendError};
use crate::types::{Appointment, Availability, Party, Role, User};

/// Storage for the credential store and both ledgers.
///
/// Every method is a single independent statement; callers that combine
/// several of them get no isolation between the steps.
pub trait AppointmentBackend: Clone + Send + Sync + 'static {
    fn add_user(
        &self,
        username: String,
        password_hash: String,
        role: Role,
    ) -> Result<User, BackendError>;
    fn user_by_username(&self, username: &str) -> Result<Option<User>, BackendError>;
    /// Looks up a user by id, only if that user is a professor.
    fn professor(&self, id: i32) -> Result<Option<User>, BackendError>;

    fn add_availability(
        &self,
        professor_id: i32,
        time_slots: Vec<String>,
    ) -> Result<Vec<Availability>, BackendError>;
    fn availability(&self, professor_id: i32) -> Result<Vec<Availability>, BackendError>;
    fn find_availability(
        &self,
        professor_id: i32,
        time_slot: &str,
    ) -> Result<Option<Availability>, BackendError>;

    fn add_appointment(
        &self,
        student_id: i32,
        professor_id: i32,
        time_slot: String,
    ) -> Result<Appointment, BackendError>;
    /// Any appointment of the student carrying this slot label, whichever professor owns it.
    fn student_appointment_at(
        &self,
        student_id: i32,
        time_slot: &str,
    ) -> Result<Option<Appointment>, BackendError>;
    fn appointments(&self, party: Party) -> Result<Vec<Appointment>, BackendError>;
    /// Returns `false` when no appointment with that id is owned by `party`.
    fn remove_appointment(&self, id: i32, party: Party) -> Result<bool, BackendError>;
}

/// Runs storage work on tokio's blocking pool, off the async workers.
pub async fn blocking<R, F>(task: F) -> Result<R, AppError>
where
    F: FnOnce() -> Result<R, AppError> + Send + 'static,
    R: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|err| AppError::Internal(format!("Storage task failed: {err}")))?
}
