//! Port abstraction for user persistence adapters and their errors.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::user::{
    DoctorUpdate, EmailAddress, PatientProfileUpdate, Role, User, UserId,
};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// A storage uniqueness constraint rejected the write.
        Duplicate { field: String } => "duplicate {field}",
    }
}

/// New user record handed to [`UserRepository::insert`].
///
/// The adapter assigns the identifier and creation timestamp.
#[derive(Debug, Clone)]
pub struct NewUserRecord {
    /// Display name.
    pub name: String,
    /// Unique login email.
    pub email: EmailAddress,
    /// Hashed password (PHC string).
    pub password_hash: String,
    /// Caller role.
    pub role: Role,
    /// Whether the account may log in.
    pub active: bool,
    /// Department reference; doctors only.
    pub department_id: Option<Uuid>,
    /// Patient demographic: age in years.
    pub age: Option<i32>,
    /// Patient demographic: gender.
    pub gender: Option<String>,
    /// Patient demographic: contact number.
    pub contact_number: Option<String>,
    /// Patient demographic: address.
    pub address: Option<String>,
}

/// A user together with the stored password hash, for authentication only.
#[derive(Debug, Clone)]
pub struct StoredCredentials {
    /// The matched user.
    pub user: User,
    /// Stored password hash (PHC string).
    pub password_hash: String,
}

/// Port for user persistence.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user; surfaces unique-email violations as `Duplicate`.
    async fn insert(&self, user: &NewUserRecord) -> Result<User, UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch a user plus password hash by login email.
    async fn find_credentials(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<StoredCredentials>, UserPersistenceError>;

    /// Whether an email is taken, optionally ignoring one account.
    async fn email_in_use(
        &self,
        email: &EmailAddress,
        exclude: Option<UserId>,
    ) -> Result<bool, UserPersistenceError>;

    /// Apply a doctor profile edit; `None` when no doctor matches.
    async fn update_doctor(
        &self,
        id: UserId,
        update: &DoctorUpdate,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// Apply a patient profile edit; `None` when no patient matches.
    async fn update_patient_profile(
        &self,
        id: UserId,
        update: &PatientProfileUpdate,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// Flip the active flag; `None` when no user matches.
    async fn set_active(
        &self,
        id: UserId,
        active: bool,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// Count active users holding a role.
    async fn count_active_by_role(&self, role: Role) -> Result<i64, UserPersistenceError>;

    /// Whether any user (active or not) holds a role.
    async fn role_exists(&self, role: Role) -> Result<bool, UserPersistenceError>;

    /// Fetch an active doctor by identifier.
    async fn find_active_doctor(&self, id: UserId) -> Result<Option<User>, UserPersistenceError>;

    /// List patients ordered by name, optionally filtered by a pattern over
    /// name, email, or contact number (or an exact id match).
    async fn search_patients<'a>(&self, search: Option<&'a str>)
    -> Result<Vec<User>, UserPersistenceError>;

    /// List doctors ordered by name. With a pattern, matches name, email, or
    /// department name; `active_only` restricts to bookable doctors.
    async fn search_doctors<'a>(
        &self,
        search: Option<&'a str>,
        active_only: bool,
    ) -> Result<Vec<User>, UserPersistenceError>;
}
