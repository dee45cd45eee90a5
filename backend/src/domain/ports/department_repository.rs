//! Port for department persistence adapters.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::department::{Department, NewDepartment};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by department repository adapters.
    pub enum DepartmentPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "department repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "department repository query failed: {message}",
        /// A storage uniqueness constraint rejected the write.
        Duplicate { field: String } => "duplicate {field}",
    }
}

/// Port for department persistence.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DepartmentRepository: Send + Sync {
    /// Insert a new department; surfaces unique-name violations as
    /// `Duplicate`.
    async fn insert(
        &self,
        department: &NewDepartment,
    ) -> Result<Department, DepartmentPersistenceError>;

    /// List all departments ordered by name.
    async fn list(&self) -> Result<Vec<Department>, DepartmentPersistenceError>;

    /// Fetch a department by identifier.
    async fn find_by_id(&self, id: Uuid)
    -> Result<Option<Department>, DepartmentPersistenceError>;
}
