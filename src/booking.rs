//! Availability publication, booking and cancellation.
//!
//! A booking is a sequence of independent reads followed by one insert:
//! professor lookup, availability lookup, duplicate check on the slot label,
//! then the appointment row. Nothing locks across those steps, so two
//! concurrent requests for the same student and slot can both succeed.
//! Availability rows are never consumed by a booking.

use crate::{
    backend::AppointmentBackend,
    error::AppError,
    types::{Appointment, Availability, Party},
};
use tracing::info;

#[derive(Clone)]
pub struct BookingService<T: AppointmentBackend> {
    backend: T,
}

impl<T: AppointmentBackend> BookingService<T> {
    pub fn new(backend: T) -> Self {
        Self { backend }
    }

    pub fn publish_availability(
        &self,
        professor_id: i32,
        time_slots: Vec<String>,
    ) -> Result<Vec<Availability>, AppError> {
        if time_slots.is_empty() {
            return Err(AppError::InvalidInput("Invalid time slots".into()));
        }

        let added = self.backend.add_availability(professor_id, time_slots)?;
        info!(professor_id, slots = added.len(), "Availability added");
        Ok(added)
    }

    pub fn availability(&self, professor_id: i32) -> Result<Vec<Availability>, AppError> {
        Ok(self.backend.availability(professor_id)?)
    }

    pub fn book(
        &self,
        student_id: i32,
        professor_id: i32,
        time_slot: String,
    ) -> Result<Appointment, AppError> {
        if self.backend.professor(professor_id)?.is_none() {
            return Err(AppError::ProfessorNotFound);
        }

        if self
            .backend
            .find_availability(professor_id, &time_slot)?
            .is_none()
        {
            return Err(AppError::SlotUnavailable);
        }

        // Label only: a booking with any professor at this label collides.
        if self
            .backend
            .student_appointment_at(student_id, &time_slot)?
            .is_some()
        {
            return Err(AppError::DuplicateBooking);
        }

        let appointment = self
            .backend
            .add_appointment(student_id, professor_id, time_slot)?;
        info!(
            appointment_id = appointment.id,
            student_id,
            professor_id,
            "Appointment booked"
        );
        Ok(appointment)
    }

    pub fn appointments(&self, party: Party) -> Result<Vec<Appointment>, AppError> {
        Ok(self.backend.appointments(party)?)
    }

    pub fn cancel(&self, appointment_id: i32, party: Party) -> Result<(), AppError> {
        if !self.backend.remove_appointment(appointment_id, party)? {
            return Err(AppError::AppointmentNotFound);
        }
        info!(appointment_id, ?party, "Appointment cancelled");
        Ok(())
    }
}
