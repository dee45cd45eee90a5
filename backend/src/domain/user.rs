//! User identity, roles, and the validated inputs that create or amend users.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use zeroize::Zeroizing;

/// Minimum allowed password length for any account.
pub const PASSWORD_MIN: usize = 6;

/// Validation errors returned by the user input constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    /// Name was missing or blank once trimmed.
    EmptyName,
    /// Email was missing or blank once trimmed.
    EmptyEmail,
    /// Email failed the structural check.
    InvalidEmail,
    /// Password shorter than [`PASSWORD_MIN`].
    PasswordTooShort {
        /// Minimum accepted length.
        min: usize,
    },
    /// Password and confirmation differ.
    PasswordMismatch,
    /// Age was present but not a positive number.
    NonPositiveAge,
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "name must not be empty"),
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::InvalidEmail => write!(f, "email must be a valid address"),
            Self::PasswordTooShort { min } => {
                write!(f, "password must be at least {min} characters long")
            }
            Self::PasswordMismatch => write!(f, "passwords do not match"),
            Self::NonPositiveAge => write!(f, "age must be a positive number"),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Wrap an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Generate a new random identifier.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for UserId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Closed set of caller roles.
///
/// Role checks dispatch on this enum rather than raw strings so every
/// authorization gate handles all roles exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Clinic administrator.
    Admin,
    /// Practising doctor attached to a department.
    Doctor,
    /// Registered patient.
    Patient,
}

impl Role {
    /// Stable string form used in storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Doctor => "doctor",
            Self::Patient => "patient",
        }
    }

    /// Parse the stable storage form.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "admin" => Some(Self::Admin),
            "doctor" => Some(Self::Doctor),
            "patient" => Some(Self::Patient),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized email address.
///
/// ## Invariants
/// - trimmed of surrounding whitespace and lowercased;
/// - non-empty, with a non-empty local part and domain around a single `@`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and construct an address from raw input.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let normalized = raw.as_ref().trim().to_lowercase();
        if normalized.is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        let mut parts = normalized.splitn(2, '@');
        let local = parts.next().unwrap_or_default();
        let domain = parts.next().unwrap_or_default();
        if local.is_empty() || domain.is_empty() || domain.contains('@') {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(normalized))
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Application user of any role.
///
/// Doctors carry a `department_id`; patients carry the demographic fields.
/// The password hash never appears here; it stays behind the user repository
/// port as [`StoredCredentials`](crate::domain::ports::StoredCredentials).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Stable identifier.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Unique login email.
    pub email: EmailAddress,
    /// Caller role.
    pub role: Role,
    /// Whether the account may log in.
    pub active: bool,
    /// Department reference; doctors only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department_id: Option<Uuid>,
    /// Patient demographic: age in years.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<i32>,
    /// Patient demographic: self-reported gender.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    /// Patient demographic: contact number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_number: Option<String>,
    /// Patient demographic: postal address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Account creation timestamp.
    pub created_at: DateTime<Utc>,
}

fn normalize_name(raw: &str) -> Result<String, UserValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(UserValidationError::EmptyName);
    }
    Ok(trimmed.to_owned())
}

fn normalize_optional(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
}

fn validate_age(age: Option<i32>) -> Result<Option<i32>, UserValidationError> {
    match age {
        Some(value) if value <= 0 => Err(UserValidationError::NonPositiveAge),
        other => Ok(other),
    }
}

fn validate_password(password: &str) -> Result<(), UserValidationError> {
    if password.chars().count() < PASSWORD_MIN {
        return Err(UserValidationError::PasswordTooShort { min: PASSWORD_MIN });
    }
    Ok(())
}

/// Validated patient self-registration input.
#[derive(Debug, Clone)]
pub struct PatientRegistration {
    /// Display name.
    pub name: String,
    /// Normalized login email.
    pub email: EmailAddress,
    /// Plaintext password, wiped from memory on drop.
    pub password: Zeroizing<String>,
    /// Optional positive age.
    pub age: Option<i32>,
    /// Optional gender.
    pub gender: Option<String>,
    /// Optional contact number.
    pub contact_number: Option<String>,
    /// Optional address.
    pub address: Option<String>,
}

/// Raw fields accepted by [`PatientRegistration::try_from_parts`].
#[derive(Debug, Clone, Copy)]
pub struct PatientRegistrationParts<'a> {
    /// Raw display name.
    pub name: &'a str,
    /// Raw email input.
    pub email: &'a str,
    /// Raw password.
    pub password: &'a str,
    /// Password confirmation; must match `password`.
    pub confirm_password: &'a str,
    /// Optional age.
    pub age: Option<i32>,
    /// Optional gender.
    pub gender: Option<&'a str>,
    /// Optional contact number.
    pub contact_number: Option<&'a str>,
    /// Optional address.
    pub address: Option<&'a str>,
}

impl PatientRegistration {
    /// Validate raw registration input.
    pub fn try_from_parts(
        parts: PatientRegistrationParts<'_>,
    ) -> Result<Self, UserValidationError> {
        let name = normalize_name(parts.name)?;
        let email = EmailAddress::new(parts.email)?;
        validate_password(parts.password)?;
        if parts.password != parts.confirm_password {
            return Err(UserValidationError::PasswordMismatch);
        }
        let age = validate_age(parts.age)?;

        Ok(Self {
            name,
            email,
            password: Zeroizing::new(parts.password.to_owned()),
            age,
            gender: normalize_optional(parts.gender),
            contact_number: normalize_optional(parts.contact_number),
            address: normalize_optional(parts.address),
        })
    }
}

/// Validated input for an admin creating a doctor account.
#[derive(Debug, Clone)]
pub struct NewDoctor {
    /// Display name.
    pub name: String,
    /// Normalized login email.
    pub email: EmailAddress,
    /// Plaintext password, wiped from memory on drop.
    pub password: Zeroizing<String>,
    /// Department the doctor belongs to.
    pub department_id: Uuid,
}

impl NewDoctor {
    /// Validate raw doctor-creation input.
    pub fn try_from_parts(
        name: &str,
        email: &str,
        password: &str,
        department_id: Uuid,
    ) -> Result<Self, UserValidationError> {
        let name = normalize_name(name)?;
        let email = EmailAddress::new(email)?;
        validate_password(password)?;

        Ok(Self {
            name,
            email,
            password: Zeroizing::new(password.to_owned()),
            department_id,
        })
    }
}

/// Validated input for an admin editing a doctor's profile.
#[derive(Debug, Clone)]
pub struct DoctorUpdate {
    /// Display name.
    pub name: String,
    /// Normalized login email.
    pub email: EmailAddress,
    /// Department the doctor belongs to.
    pub department_id: Uuid,
}

impl DoctorUpdate {
    /// Validate raw doctor-edit input.
    pub fn try_from_parts(
        name: &str,
        email: &str,
        department_id: Uuid,
    ) -> Result<Self, UserValidationError> {
        Ok(Self {
            name: normalize_name(name)?,
            email: EmailAddress::new(email)?,
            department_id,
        })
    }
}

/// Validated input for a patient editing their own profile.
#[derive(Debug, Clone)]
pub struct PatientProfileUpdate {
    /// Display name.
    pub name: String,
    /// Optional positive age.
    pub age: Option<i32>,
    /// Optional gender.
    pub gender: Option<String>,
    /// Optional contact number.
    pub contact_number: Option<String>,
    /// Optional address.
    pub address: Option<String>,
}

impl PatientProfileUpdate {
    /// Validate raw profile-edit input.
    pub fn try_from_parts(
        name: &str,
        age: Option<i32>,
        gender: Option<&str>,
        contact_number: Option<&str>,
        address: Option<&str>,
    ) -> Result<Self, UserValidationError> {
        Ok(Self {
            name: normalize_name(name)?,
            age: validate_age(age)?,
            gender: normalize_optional(gender),
            contact_number: normalize_optional(contact_number),
            address: normalize_optional(address),
        })
    }
}
