//! Port for doctor availability persistence adapters.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::availability::{AvailabilityDay, AvailabilityUpdate};
use crate::domain::user::UserId;

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by availability repository adapters.
    pub enum AvailabilityPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "availability repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "availability repository query failed: {message}",
    }
}

/// Port for per-day availability persistence.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AvailabilityRepository: Send + Sync {
    /// Materialize default day records for the given dates where absent.
    ///
    /// Idempotent: existing records, including ones the doctor already
    /// edited, are left untouched.
    async fn provision_defaults(
        &self,
        doctor_id: UserId,
        dates: &[NaiveDate],
    ) -> Result<(), AvailabilityPersistenceError>;

    /// Fetch the day records for the given dates, ordered by date.
    async fn list_for_dates(
        &self,
        doctor_id: UserId,
        dates: &[NaiveDate],
    ) -> Result<Vec<AvailabilityDay>, AvailabilityPersistenceError>;

    /// Fetch a single day record, only when the doctor opted in on that date.
    async fn find_available_day(
        &self,
        doctor_id: UserId,
        date: NaiveDate,
    ) -> Result<Option<AvailabilityDay>, AvailabilityPersistenceError>;

    /// Apply a batch of day updates in one transaction.
    ///
    /// Records not owned by `doctor_id` are skipped rather than rejected.
    async fn apply_updates(
        &self,
        doctor_id: UserId,
        updates: &[AvailabilityUpdate],
    ) -> Result<(), AvailabilityPersistenceError>;
}
