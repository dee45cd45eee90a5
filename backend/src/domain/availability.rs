//! Per-day doctor availability windows.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::user::UserId;

/// Default working-day start applied when a day record is first provisioned.
pub const DEFAULT_START_TIME: &str = "09:00";
/// Default working-day end applied when a day record is first provisioned.
pub const DEFAULT_END_TIME: &str = "17:00";

/// A doctor's declared working window for one calendar date.
///
/// ## Invariants
/// - at most one record per (doctor, date), enforced by storage.
///
/// Days default to unavailable until the doctor explicitly opts in, so a
/// freshly provisioned week exposes no bookable slots. Start/end strings are
/// deliberately unvalidated beyond being `HH:MM`-shaped inputs; the slot
/// generator degrades to a fixed fallback when they do not parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityDay {
    /// Stable identifier.
    pub id: Uuid,
    /// Doctor owning this window.
    pub doctor_id: UserId,
    /// Calendar date this window applies to.
    pub date: NaiveDate,
    /// Working window start, `HH:MM`.
    pub start_time: String,
    /// Working window end, `HH:MM`.
    pub end_time: String,
    /// Whether the doctor takes bookings on this date.
    pub is_available: bool,
}

/// One day's worth of changes in an availability update batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilityUpdate {
    /// Identifier of the day record to change.
    pub id: Uuid,
    /// New working window start, `HH:MM`.
    pub start_time: String,
    /// New working window end, `HH:MM`.
    pub end_time: String,
    /// New availability flag.
    pub is_available: bool,
}
