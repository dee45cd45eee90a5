//! Appointments and their three-state status machine.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::user::UserId;

/// Appointment lifecycle status.
///
/// ```text
/// Booked --(complete)--> Completed
/// Booked --(cancel, owner only)--> Cancelled
/// Completed, Cancelled --(complete)--> Completed
/// ```
///
/// The final transition is deliberate compatibility with the legacy system:
/// completing an appointment is not guarded by its prior status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum AppointmentStatus {
    /// Reserved by a patient, not yet seen.
    Booked,
    /// Seen by the doctor; a treatment record exists.
    Completed,
    /// Cancelled by the doctor or the patient.
    Cancelled,
}

impl AppointmentStatus {
    /// Stable string form used in storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Booked => "Booked",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }

    /// Parse the stable storage form.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Booked" => Some(Self::Booked),
            "Completed" => Some(Self::Completed),
            "Cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A booked, completed, or cancelled appointment.
///
/// ## Invariants
/// - at most one appointment per (doctor, date, time), regardless of status
///   (enforced by a storage-level unique constraint).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    /// Stable identifier.
    pub id: Uuid,
    /// Patient holding the appointment.
    pub patient_id: UserId,
    /// Doctor seeing the patient.
    pub doctor_id: UserId,
    /// Calendar date of the visit.
    pub date: NaiveDate,
    /// Time-of-day slot in `HH:MM` form.
    pub time: String,
    /// Lifecycle status.
    pub status: AppointmentStatus,
    /// Booking timestamp.
    pub created_at: DateTime<Utc>,
}

/// Booking request admitted by the scheduling service.
#[derive(Debug, Clone)]
pub struct BookingRequest {
    /// Patient making the booking.
    pub patient_id: UserId,
    /// Doctor being booked.
    pub doctor_id: UserId,
    /// Requested calendar date.
    pub date: NaiveDate,
    /// Requested `HH:MM` slot.
    pub time: String,
}
