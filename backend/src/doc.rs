//! OpenAPI document exposed by Swagger UI in debug builds.

use utoipa::OpenApi;

use crate::domain;
use crate::inbound::http;

/// Public OpenAPI surface used by Swagger UI and tooling.
#[derive(OpenApi)]
#[openapi(
    paths(
        http::auth::login,
        http::auth::logout,
        http::auth::register,
        http::admin::dashboard,
        http::admin::create_department,
        http::admin::create_doctor,
        http::admin::update_doctor,
        http::admin::toggle_active,
        http::admin::appointment_details,
        http::doctor::dashboard,
        http::doctor::update_availability,
        http::doctor::complete_appointment,
        http::doctor::cancel_appointment,
        http::doctor::patient_history,
        http::patient::dashboard,
        http::patient::doctor_slots,
        http::patient::book_appointment,
        http::patient::cancel_appointment,
        http::patient::appointment_details,
        http::patient::update_profile,
        http::health::ready,
        http::health::live,
    ),
    components(schemas(
        domain::Error,
        domain::ErrorCode,
        domain::User,
        domain::user::Role,
        domain::user::UserId,
        domain::Department,
        domain::Appointment,
        domain::appointment::AppointmentStatus,
        domain::Treatment,
        domain::AvailabilityDay,
        domain::ScheduleDay,
        domain::DaySlots,
        http::auth::LoginRequest,
        http::auth::RegisterRequest,
        http::admin::AdminDashboard,
        http::admin::CreateDepartmentRequest,
        http::admin::CreateDoctorRequest,
        http::admin::UpdateDoctorRequest,
        http::admin::AdminAppointmentDetails,
        http::doctor::DoctorDashboard,
        http::doctor::AvailabilityDayRequest,
        http::doctor::UpdateAvailabilityRequest,
        http::doctor::CompleteAppointmentRequest,
        http::doctor::PatientHistory,
        http::patient::PatientDashboard,
        http::patient::DoctorSlots,
        http::patient::BookAppointmentRequest,
        http::patient::PatientAppointmentDetails,
        http::patient::UpdateProfileRequest,
    )),
    tags(
        (name = "auth", description = "Login, logout, and registration"),
        (name = "admin", description = "Administrator operations"),
        (name = "doctor", description = "Doctor operations"),
        (name = "patient", description = "Patient operations"),
        (name = "health", description = "Probes")
    )
)]
pub struct ApiDoc;
