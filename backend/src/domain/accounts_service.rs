//! Account management: authentication, registration, and the admin's user
//! and department administration.
//!
//! The service speaks only to ports, so every operation is testable against
//! mocks and the HTTP adapter stays free of persistence detail.

use std::sync::Arc;

use tracing::info;

use crate::domain::Error;
use crate::domain::auth::LoginCredentials;
use crate::domain::department::{Department, NewDepartment};
use crate::domain::ports::{
    DepartmentPersistenceError, DepartmentRepository, NewUserRecord, PasswordHashError,
    PasswordHasher, UserPersistenceError, UserRepository,
};
use crate::domain::user::{
    DoctorUpdate, EmailAddress, NewDoctor, PatientProfileUpdate, PatientRegistration, Role, User,
    UserId,
};

/// Uniform login failure message; never reveals which check failed.
const LOGIN_REJECTION: &str = "invalid email or password";

fn map_user_repo_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::Duplicate { .. } => {
            Error::conflict("an account already exists with that email")
        }
    }
}

fn map_department_repo_error(error: DepartmentPersistenceError) -> Error {
    match error {
        DepartmentPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("department repository unavailable: {message}"))
        }
        DepartmentPersistenceError::Query { message } => {
            Error::internal(format!("department repository error: {message}"))
        }
        DepartmentPersistenceError::Duplicate { .. } => {
            Error::conflict("a department with this name already exists")
        }
    }
}

fn map_hash_error(error: PasswordHashError) -> Error {
    let PasswordHashError::Hash { message } = error;
    Error::internal(format!("password hashing failed: {message}"))
}

/// Directory data backing the admin dashboard.
#[derive(Debug, Clone)]
pub struct AdminDirectory {
    /// Number of active patients.
    pub patient_count: i64,
    /// Number of active doctors.
    pub doctor_count: i64,
    /// All departments, ordered by name.
    pub departments: Vec<Department>,
    /// Patients matching the patient search, ordered by name.
    pub patients: Vec<User>,
    /// Doctors matching the doctor search, ordered by name.
    pub doctors: Vec<User>,
}

/// Account management service over the user, department, and hashing ports.
#[derive(Clone)]
pub struct AccountsService {
    users: Arc<dyn UserRepository>,
    departments: Arc<dyn DepartmentRepository>,
    hasher: Arc<dyn PasswordHasher>,
}

impl AccountsService {
    /// Create a new service over the given ports.
    pub fn new(
        users: Arc<dyn UserRepository>,
        departments: Arc<dyn DepartmentRepository>,
        hasher: Arc<dyn PasswordHasher>,
    ) -> Self {
        Self {
            users,
            departments,
            hasher,
        }
    }

    /// Authenticate login credentials.
    ///
    /// Unknown email, wrong password, and deactivated accounts all fail with
    /// the same unauthorized error so callers learn nothing about which
    /// check rejected them.
    pub async fn authenticate(&self, credentials: &LoginCredentials) -> Result<User, Error> {
        let stored = self
            .users
            .find_credentials(credentials.email())
            .await
            .map_err(map_user_repo_error)?
            .ok_or_else(|| Error::unauthorized(LOGIN_REJECTION))?;

        if !stored.user.active {
            return Err(Error::unauthorized(LOGIN_REJECTION));
        }

        let matches = self
            .hasher
            .verify(credentials.password(), &stored.password_hash)
            .map_err(map_hash_error)?;
        if !matches {
            return Err(Error::unauthorized(LOGIN_REJECTION));
        }

        Ok(stored.user)
    }

    /// Resolve a session's user id to an active user.
    ///
    /// Returns `None` for unknown or deactivated accounts; the caller treats
    /// both identically to a missing session.
    pub async fn resolve_active(&self, id: UserId) -> Result<Option<User>, Error> {
        let user = self
            .users
            .find_by_id(id)
            .await
            .map_err(map_user_repo_error)?;
        Ok(user.filter(|found| found.active))
    }

    /// Register a new patient account.
    pub async fn register_patient(&self, registration: PatientRegistration) -> Result<User, Error> {
        if self
            .users
            .email_in_use(&registration.email, None)
            .await
            .map_err(map_user_repo_error)?
        {
            return Err(Error::conflict("an account already exists with that email"));
        }

        let password_hash = self
            .hasher
            .hash(registration.password.as_str())
            .map_err(map_hash_error)?;

        let record = NewUserRecord {
            name: registration.name,
            email: registration.email,
            password_hash,
            role: Role::Patient,
            active: true,
            department_id: None,
            age: registration.age,
            gender: registration.gender,
            contact_number: registration.contact_number,
            address: registration.address,
        };
        // The unique index still backstops a concurrent registration racing
        // past the email_in_use check; Duplicate maps to the same conflict.
        self.users
            .insert(&record)
            .await
            .map_err(map_user_repo_error)
    }

    /// Create a doctor account (admin operation).
    pub async fn add_doctor(&self, doctor: NewDoctor) -> Result<User, Error> {
        self.require_department(doctor.department_id).await?;

        if self
            .users
            .email_in_use(&doctor.email, None)
            .await
            .map_err(map_user_repo_error)?
        {
            return Err(Error::conflict("an account already exists with that email"));
        }

        let password_hash = self
            .hasher
            .hash(doctor.password.as_str())
            .map_err(map_hash_error)?;

        let record = NewUserRecord {
            name: doctor.name,
            email: doctor.email,
            password_hash,
            role: Role::Doctor,
            active: true,
            department_id: Some(doctor.department_id),
            age: None,
            gender: None,
            contact_number: None,
            address: None,
        };
        self.users
            .insert(&record)
            .await
            .map_err(map_user_repo_error)
    }

    /// Edit a doctor's name, email, and department (admin operation).
    pub async fn edit_doctor(&self, id: UserId, update: DoctorUpdate) -> Result<User, Error> {
        self.require_department(update.department_id).await?;

        if self
            .users
            .email_in_use(&update.email, Some(id))
            .await
            .map_err(map_user_repo_error)?
        {
            return Err(Error::conflict(
                "that email is already in use by another account",
            ));
        }

        self.users
            .update_doctor(id, &update)
            .await
            .map_err(map_user_repo_error)?
            .ok_or_else(|| Error::not_found("doctor not found"))
    }

    /// Flip a user's active flag (admin operation).
    ///
    /// Admins cannot deactivate their own account.
    pub async fn toggle_active(&self, admin_id: UserId, target_id: UserId) -> Result<User, Error> {
        if admin_id == target_id {
            return Err(Error::invalid_request(
                "you cannot deactivate your own account",
            ));
        }

        let target = self
            .users
            .find_by_id(target_id)
            .await
            .map_err(map_user_repo_error)?
            .ok_or_else(|| Error::not_found("user not found"))?;

        self.users
            .set_active(target_id, !target.active)
            .await
            .map_err(map_user_repo_error)?
            .ok_or_else(|| Error::not_found("user not found"))
    }

    /// Create a department (admin operation).
    pub async fn add_department(&self, department: NewDepartment) -> Result<Department, Error> {
        self.departments
            .insert(&department)
            .await
            .map_err(map_department_repo_error)
    }

    /// Update a patient's own profile.
    pub async fn update_patient_profile(
        &self,
        id: UserId,
        update: PatientProfileUpdate,
    ) -> Result<User, Error> {
        self.users
            .update_patient_profile(id, &update)
            .await
            .map_err(map_user_repo_error)?
            .ok_or_else(|| Error::not_found("patient not found"))
    }

    /// Directory data for the admin dashboard.
    pub async fn admin_directory(
        &self,
        patient_search: Option<&str>,
        doctor_search: Option<&str>,
    ) -> Result<AdminDirectory, Error> {
        let patient_count = self
            .users
            .count_active_by_role(Role::Patient)
            .await
            .map_err(map_user_repo_error)?;
        let doctor_count = self
            .users
            .count_active_by_role(Role::Doctor)
            .await
            .map_err(map_user_repo_error)?;
        let departments = self
            .departments
            .list()
            .await
            .map_err(map_department_repo_error)?;
        let patients = self
            .users
            .search_patients(patient_search)
            .await
            .map_err(map_user_repo_error)?;
        let doctors = self
            .users
            .search_doctors(doctor_search, false)
            .await
            .map_err(map_user_repo_error)?;

        Ok(AdminDirectory {
            patient_count,
            doctor_count,
            departments,
            patients,
            doctors,
        })
    }

    /// Active doctors for the patient-facing directory, optionally filtered
    /// by name or department name.
    pub async fn search_active_doctors(&self, search: Option<&str>) -> Result<Vec<User>, Error> {
        self.users
            .search_doctors(search, true)
            .await
            .map_err(map_user_repo_error)
    }

    /// Fetch an active doctor or fail with a not-found error.
    ///
    /// Inactive and unknown doctors are indistinguishable to the caller.
    pub async fn find_active_doctor(&self, id: UserId) -> Result<User, Error> {
        self.users
            .find_active_doctor(id)
            .await
            .map_err(map_user_repo_error)?
            .ok_or_else(|| Error::not_found("doctor not found"))
    }

    /// Fetch a patient by id or fail with a not-found error.
    pub async fn find_patient(&self, id: UserId) -> Result<User, Error> {
        let user = self
            .users
            .find_by_id(id)
            .await
            .map_err(map_user_repo_error)?;
        user.filter(|found| found.role == Role::Patient)
            .ok_or_else(|| Error::not_found("patient not found"))
    }

    /// Seed the default admin account when no admin exists yet.
    ///
    /// Idempotent across restarts.
    pub async fn seed_default_admin(
        &self,
        name: &str,
        email: EmailAddress,
        password: &str,
    ) -> Result<(), Error> {
        if self
            .users
            .role_exists(Role::Admin)
            .await
            .map_err(map_user_repo_error)?
        {
            return Ok(());
        }

        let password_hash = self.hasher.hash(password).map_err(map_hash_error)?;
        let record = NewUserRecord {
            name: name.to_owned(),
            email: email.clone(),
            password_hash,
            role: Role::Admin,
            active: true,
            department_id: None,
            age: None,
            gender: None,
            contact_number: None,
            address: None,
        };
        let admin = self
            .users
            .insert(&record)
            .await
            .map_err(map_user_repo_error)?;
        info!(email = %email, id = %admin.id, "default admin account created");
        Ok(())
    }

    async fn require_department(&self, id: uuid::Uuid) -> Result<(), Error> {
        self.departments
            .find_by_id(id)
            .await
            .map_err(map_department_repo_error)?
            .ok_or_else(|| Error::invalid_request("please select a valid department"))?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "accounts_service_tests.rs"]
mod tests;
