//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod appointment_repository;
mod availability_repository;
mod clock;
mod department_repository;
mod password_hasher;
mod treatment_repository;
mod user_repository;

#[cfg(test)]
pub use appointment_repository::MockAppointmentRepository;
pub use appointment_repository::{
    AppointmentOwner, AppointmentPersistenceError, AppointmentRepository,
};
#[cfg(test)]
pub use availability_repository::MockAvailabilityRepository;
pub use availability_repository::{AvailabilityPersistenceError, AvailabilityRepository};
pub use clock::{Clock, FixtureClock, SystemClock};
#[cfg(test)]
pub use department_repository::MockDepartmentRepository;
pub use department_repository::{DepartmentPersistenceError, DepartmentRepository};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{FixturePasswordHasher, PasswordHashError, PasswordHasher};
#[cfg(test)]
pub use treatment_repository::MockTreatmentRepository;
pub use treatment_repository::{TreatmentPersistenceError, TreatmentRepository};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{
    NewUserRecord, StoredCredentials, UserPersistenceError, UserRepository,
};
