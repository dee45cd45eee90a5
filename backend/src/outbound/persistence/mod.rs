//! PostgreSQL persistence adapters implementing the repository ports.

mod diesel_appointment_repository;
mod diesel_availability_repository;
mod diesel_department_repository;
mod diesel_helpers;
mod diesel_treatment_repository;
mod diesel_user_repository;
mod models;
mod pool;
mod schema;

pub use diesel_appointment_repository::DieselAppointmentRepository;
pub use diesel_availability_repository::DieselAvailabilityRepository;
pub use diesel_department_repository::DieselDepartmentRepository;
pub use diesel_treatment_repository::DieselTreatmentRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
