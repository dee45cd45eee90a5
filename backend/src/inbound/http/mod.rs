//! HTTP inbound adapter exposing the REST endpoints.

pub mod admin;
pub mod auth;
pub mod doctor;
pub mod error;
pub mod guard;
pub mod health;
pub mod patient;
pub mod session;
pub mod state;
#[cfg(test)]
pub mod test_utils;

pub use error::ApiResult;

use actix_web::web;

/// Register every API handler on a scope.
///
/// Shared by the production server and the test harness so the two route
/// tables cannot drift apart.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(auth::login)
        .service(auth::logout)
        .service(auth::register)
        .service(admin::dashboard)
        .service(admin::create_department)
        .service(admin::create_doctor)
        .service(admin::update_doctor)
        .service(admin::toggle_active)
        .service(admin::appointment_details)
        .service(doctor::dashboard)
        .service(doctor::update_availability)
        .service(doctor::complete_appointment)
        .service(doctor::cancel_appointment)
        .service(doctor::patient_history)
        .service(patient::dashboard)
        .service(patient::doctor_slots)
        .service(patient::book_appointment)
        .service(patient::cancel_appointment)
        .service(patient::appointment_details)
        .service(patient::update_profile);
}
