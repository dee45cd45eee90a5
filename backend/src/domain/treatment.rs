//! Treatment records attached to completed appointments.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Validation errors returned by [`TreatmentDraft::try_from_parts`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreatmentValidationError {
    /// Diagnosis was missing or blank once trimmed.
    EmptyDiagnosis,
    /// Prescription was missing or blank once trimmed.
    EmptyPrescription,
}

impl fmt::Display for TreatmentValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyDiagnosis => write!(f, "diagnosis must not be empty"),
            Self::EmptyPrescription => write!(f, "prescription must not be empty"),
        }
    }
}

impl std::error::Error for TreatmentValidationError {}

/// Clinical outcome record for a completed appointment.
///
/// ## Invariants
/// - at most one treatment per appointment (enforced by storage); repeat
///   completions overwrite the existing record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Treatment {
    /// Stable identifier.
    pub id: Uuid,
    /// Appointment this record belongs to.
    pub appointment_id: Uuid,
    /// Diagnosis text.
    pub diagnosis: String,
    /// Prescription text.
    pub prescription: String,
    /// Optional follow-up date noted by the doctor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub follow_up_date: Option<String>,
    /// Optional free-text notes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Record creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Validated treatment content submitted when completing an appointment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreatmentDraft {
    /// Diagnosis text; required.
    pub diagnosis: String,
    /// Prescription text; required.
    pub prescription: String,
    /// Optional follow-up date.
    pub follow_up_date: Option<String>,
    /// Optional free-text notes.
    pub notes: Option<String>,
}

impl TreatmentDraft {
    /// Validate raw treatment input.
    pub fn try_from_parts(
        diagnosis: &str,
        prescription: &str,
        follow_up_date: Option<&str>,
        notes: Option<&str>,
    ) -> Result<Self, TreatmentValidationError> {
        let diagnosis = diagnosis.trim();
        if diagnosis.is_empty() {
            return Err(TreatmentValidationError::EmptyDiagnosis);
        }
        let prescription = prescription.trim();
        if prescription.is_empty() {
            return Err(TreatmentValidationError::EmptyPrescription);
        }
        let clean = |raw: Option<&str>| {
            raw.map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_owned)
        };
        Ok(Self {
            diagnosis: diagnosis.to_owned(),
            prescription: prescription.to_owned(),
            follow_up_date: clean(follow_up_date),
            notes: clean(notes),
        })
    }
}
