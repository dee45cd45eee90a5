//! Port for appointment persistence adapters.

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::appointment::{Appointment, BookingRequest};
use crate::domain::user::UserId;

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by appointment repository adapters.
    pub enum AppointmentPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "appointment repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "appointment repository query failed: {message}",
    }
}

/// Ownership side used to scope appointment reads and cancellations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppointmentOwner {
    /// The appointment's doctor.
    Doctor(UserId),
    /// The appointment's patient.
    Patient(UserId),
}

/// Port for appointment persistence.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    /// Atomically insert a booking unless the (doctor, date, time) slot is
    /// already taken by any appointment, regardless of status.
    ///
    /// Returns `None` when the slot was taken; the storage-level unique
    /// constraint makes this race-free against concurrent requests.
    async fn insert_if_slot_free(
        &self,
        booking: &BookingRequest,
    ) -> Result<Option<Appointment>, AppointmentPersistenceError>;

    /// Times (`HH:MM`) of every appointment for a doctor on a date,
    /// regardless of status.
    async fn booked_times(
        &self,
        doctor_id: UserId,
        date: NaiveDate,
    ) -> Result<Vec<String>, AppointmentPersistenceError>;

    /// All appointments for a doctor.
    async fn list_for_doctor(
        &self,
        doctor_id: UserId,
    ) -> Result<Vec<Appointment>, AppointmentPersistenceError>;

    /// All appointments for a patient.
    async fn list_for_patient(
        &self,
        patient_id: UserId,
    ) -> Result<Vec<Appointment>, AppointmentPersistenceError>;

    /// All appointments, newest first.
    async fn list_all(&self) -> Result<Vec<Appointment>, AppointmentPersistenceError>;

    /// Total number of appointments.
    async fn count(&self) -> Result<i64, AppointmentPersistenceError>;

    /// Fetch an appointment by identifier.
    async fn find_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<Appointment>, AppointmentPersistenceError>;

    /// Fetch an appointment only when owned by the given party.
    async fn find_owned(
        &self,
        id: Uuid,
        owner: AppointmentOwner,
    ) -> Result<Option<Appointment>, AppointmentPersistenceError>;

    /// Cancel a Booked appointment owned by the given party.
    ///
    /// Returns `false` when nothing matched, whether the appointment is
    /// absent, owned by someone else, or no longer Booked.
    async fn cancel_booked(
        &self,
        id: Uuid,
        owner: AppointmentOwner,
    ) -> Result<bool, AppointmentPersistenceError>;

    /// A patient's Completed appointments, newest first.
    async fn list_completed_for_patient(
        &self,
        patient_id: UserId,
    ) -> Result<Vec<Appointment>, AppointmentPersistenceError>;
}
