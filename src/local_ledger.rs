use crate::{
    backend::AppointmentBackend,
    error::BackendError,
    types::{Appointment, Availability, Party, Role, User},
};
use chrono::Utc;
use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex, MutexGuard},
};

#[derive(Debug, Default)]
struct Ledger {
    users: BTreeMap<i32, User>,
    availabilities: BTreeMap<i32, Availability>,
    appointments: BTreeMap<i32, Appointment>,
    last_user_id: i32,
    last_availability_id: i32,
    last_appointment_id: i32,
}

/// In-memory backend, used when no database is configured.
#[derive(Debug, Clone, Default)]
pub struct LocalLedger {
    ledger: Arc<Mutex<Ledger>>,
}

impl LocalLedger {
    fn lock(&self) -> Result<MutexGuard<'_, Ledger>, BackendError> {
        self.ledger.lock().map_err(|_| BackendError::LockPoisoned)
    }
}

impl AppointmentBackend for LocalLedger {
    fn add_user(
        &self,
        username: String,
        password_hash: String,
        role: Role,
    ) -> Result<User, BackendError> {
        let mut ledger = self.lock()?;
        if ledger.users.values().any(|user| user.username == username) {
            return Err(BackendError::DuplicateUsername);
        }

        ledger.last_user_id += 1;
        let user = User {
            id: ledger.last_user_id,
            username,
            password_hash,
            role,
            created_at: Utc::now(),
        };
        ledger.users.insert(user.id, user.clone());
        Ok(user)
    }

    fn user_by_username(&self, username: &str) -> Result<Option<User>, BackendError> {
        Ok(self
            .lock()?
            .users
            .values()
            .find(|user| user.username == username)
            .cloned())
    }

    fn professor(&self, id: i32) -> Result<Option<User>, BackendError> {
        Ok(self
            .lock()?
            .users
            .get(&id)
            .filter(|user| user.role == Role::Professor)
            .cloned())
    }

    fn add_availability(
        &self,
        professor_id: i32,
        time_slots: Vec<String>,
    ) -> Result<Vec<Availability>, BackendError> {
        let mut ledger = self.lock()?;
        let created_at = Utc::now();
        let mut added = Vec::with_capacity(time_slots.len());
        for time_slot in time_slots {
            ledger.last_availability_id += 1;
            let availability = Availability {
                id: ledger.last_availability_id,
                professor_id,
                time_slot,
                created_at,
            };
            ledger
                .availabilities
                .insert(availability.id, availability.clone());
            added.push(availability);
        }
        Ok(added)
    }

    fn availability(&self, professor_id: i32) -> Result<Vec<Availability>, BackendError> {
        Ok(self
            .lock()?
            .availabilities
            .values()
            .filter(|availability| availability.professor_id == professor_id)
            .cloned()
            .collect())
    }

    fn find_availability(
        &self,
        professor_id: i32,
        time_slot: &str,
    ) -> Result<Option<Availability>, BackendError> {
        Ok(self
            .lock()?
            .availabilities
            .values()
            .find(|availability| {
                availability.professor_id == professor_id && availability.time_slot == time_slot
            })
            .cloned())
    }

    fn add_appointment(
        &self,
        student_id: i32,
        professor_id: i32,
        time_slot: String,
    ) -> Result<Appointment, BackendError> {
        let mut ledger = self.lock()?;
        ledger.last_appointment_id += 1;
        let appointment = Appointment {
            id: ledger.last_appointment_id,
            student_id,
            professor_id,
            time_slot,
            created_at: Utc::now(),
        };
        ledger
            .appointments
            .insert(appointment.id, appointment.clone());
        Ok(appointment)
    }

    fn student_appointment_at(
        &self,
        student_id: i32,
        time_slot: &str,
    ) -> Result<Option<Appointment>, BackendError> {
        Ok(self
            .lock()?
            .appointments
            .values()
            .find(|appointment| {
                appointment.student_id == student_id && appointment.time_slot == time_slot
            })
            .cloned())
    }

    fn appointments(&self, party: Party) -> Result<Vec<Appointment>, BackendError> {
        Ok(self
            .lock()?
            .appointments
            .values()
            .filter(|appointment| party.owns(appointment))
            .cloned()
            .collect())
    }

    fn remove_appointment(&self, id: i32, party: Party) -> Result<bool, BackendError> {
        let mut ledger = self.lock()?;
        let owned = ledger
            .appointments
            .get(&id)
            .is_some_and(|appointment| party.owns(appointment));
        if owned {
            ledger.appointments.remove(&id);
        }
        Ok(owned)
    }
}
