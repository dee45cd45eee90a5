//! Clinic departments that group doctors.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Validation errors returned by [`NewDepartment::try_from_parts`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DepartmentValidationError {
    /// Name was missing or blank once trimmed.
    EmptyName,
}

impl fmt::Display for DepartmentValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "department name must not be empty"),
        }
    }
}

impl std::error::Error for DepartmentValidationError {}

/// A clinic department, owner of zero or more doctors.
///
/// ## Invariants
/// - `name` is unique across departments (enforced by storage).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    /// Stable identifier.
    pub id: Uuid,
    /// Unique department name.
    pub name: String,
    /// Free-text description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Validated input for creating a department.
#[derive(Debug, Clone)]
pub struct NewDepartment {
    /// Unique department name.
    pub name: String,
    /// Free-text description.
    pub description: Option<String>,
}

impl NewDepartment {
    /// Validate raw department input.
    pub fn try_from_parts(
        name: &str,
        description: Option<&str>,
    ) -> Result<Self, DepartmentValidationError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(DepartmentValidationError::EmptyName);
        }
        Ok(Self {
            name: trimmed.to_owned(),
            description: description
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_owned),
        })
    }
}
