use std::sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    Arc,
};

use chrono::Utc;

use crate::{
    auth::Authenticator,
    backend::AppointmentBackend,
    configuration::Configuration,
    error::BackendError,
    types::{Appointment, Availability, Identity, Party, Role, User},
};

pub const TEST_SECRET: &str = "test-secret";
const TEST_HASH_COST: u32 = 4;

#[derive(Clone)]
pub struct TestConfiguration;

impl Configuration for TestConfiguration {
    fn port(&self) -> u16 {
        0
    }

    fn database_url(&self) -> Option<String> {
        None
    }

    fn token_secret(&self) -> String {
        TEST_SECRET.into()
    }

    fn password_hash_cost(&self) -> u32 {
        TEST_HASH_COST
    }

    fn reset_database(&self) -> bool {
        false
    }
}

pub fn token_for(id: i32, role: Role) -> String {
    Authenticator::new(TEST_SECRET, TEST_HASH_COST)
        .issue_token(Identity { id, role })
        .unwrap()
}

/// A well-formed student token signed with the wrong secret.
pub fn forged_token() -> String {
    Authenticator::new("forged-secret", TEST_HASH_COST)
        .issue_token(Identity {
            id: 2,
            role: Role::Student,
        })
        .unwrap()
}

pub struct MockBackendInner {
    pub success: AtomicBool,
    pub calls: AtomicU64,
}

/// Backend without state that counts every call. Lookups find nothing and
/// inserts echo their input; with `success` cleared every call fails.
#[derive(Clone)]
pub struct MockBackend(pub Arc<MockBackendInner>);

impl MockBackendInner {
    fn new() -> Self {
        Self {
            success: AtomicBool::new(true),
            calls: AtomicU64::default(),
        }
    }
}

impl MockBackend {
    pub fn new() -> Self {
        Self(Arc::new(MockBackendInner::new()))
    }

    fn result(&self) -> Result<(), BackendError> {
        self.0.calls.fetch_add(1, Ordering::SeqCst);
        match self.0.success.load(Ordering::SeqCst) {
            true => Ok(()),
            false => Err(BackendError::Database(
                diesel::result::Error::BrokenTransactionManager,
            )),
        }
    }
}

impl AppointmentBackend for MockBackend {
    fn add_user(
        &self,
        username: String,
        password_hash: String,
        role: Role,
    ) -> Result<User, BackendError> {
        self.result()?;
        Ok(User {
            id: 1,
            username,
            password_hash,
            role,
            created_at: Utc::now(),
        })
    }

    fn user_by_username(&self, _username: &str) -> Result<Option<User>, BackendError> {
        self.result()?;
        Ok(None)
    }

    fn professor(&self, _id: i32) -> Result<Option<User>, BackendError> {
        self.result()?;
        Ok(None)
    }

    fn add_availability(
        &self,
        professor_id: i32,
        time_slots: Vec<String>,
    ) -> Result<Vec<Availability>, BackendError> {
        self.result()?;
        Ok(time_slots
            .into_iter()
            .zip(1..)
            .map(|(time_slot, id)| Availability {
                id,
                professor_id,
                time_slot,
                created_at: Utc::now(),
            })
            .collect())
    }

    fn availability(&self, _professor_id: i32) -> Result<Vec<Availability>, BackendError> {
        self.result()?;
        Ok(vec![])
    }

    fn find_availability(
        &self,
        _professor_id: i32,
        _time_slot: &str,
    ) -> Result<Option<Availability>, BackendError> {
        self.result()?;
        Ok(None)
    }

    fn add_appointment(
        &self,
        student_id: i32,
        professor_id: i32,
        time_slot: String,
    ) -> Result<Appointment, BackendError> {
        self.result()?;
        Ok(Appointment {
            id: 1,
            student_id,
            professor_id,
            time_slot,
            created_at: Utc::now(),
        })
    }

    fn student_appointment_at(
        &self,
        _student_id: i32,
        _time_slot: &str,
    ) -> Result<Option<Appointment>, BackendError> {
        self.result()?;
        Ok(None)
    }

    fn appointments(&self, _party: Party) -> Result<Vec<Appointment>, BackendError> {
        self.result()?;
        Ok(vec![])
    }

    fn remove_appointment(&self, _id: i32, _party: Party) -> Result<bool, BackendError> {
        self.result()?;
        Ok(false)
    }
}
