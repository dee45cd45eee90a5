//! Port for treatment persistence adapters.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::treatment::{Treatment, TreatmentDraft};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by treatment repository adapters.
    pub enum TreatmentPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "treatment repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "treatment repository query failed: {message}",
    }
}

/// Port for treatment persistence.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TreatmentRepository: Send + Sync {
    /// Record the clinical outcome of an appointment in one transaction:
    /// insert the treatment (or overwrite the existing one) and mark the
    /// appointment Completed.
    ///
    /// Idempotent on repeat submission; the latest draft wins. The status
    /// flip deliberately ignores the appointment's prior status.
    async fn complete_appointment(
        &self,
        appointment_id: Uuid,
        draft: &TreatmentDraft,
    ) -> Result<Treatment, TreatmentPersistenceError>;

    /// Fetch the treatment attached to an appointment, if any.
    async fn find_by_appointment(
        &self,
        appointment_id: Uuid,
    ) -> Result<Option<Treatment>, TreatmentPersistenceError>;
}
