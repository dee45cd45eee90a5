//! Doctor handlers: dashboard, availability maintenance, appointment
//! completion and cancellation, and patient history.

use actix_web::{HttpResponse, get, post, put, web};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::ports::AppointmentOwner;
use crate::domain::{
    Appointment, AppointmentsOverview, AvailabilityUpdate, Error, Role, ScheduleDay, Treatment,
    TreatmentDraft, User,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::guard::require_role;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Payload of `GET /api/v1/doctor/dashboard`.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DoctorDashboard {
    /// Booked appointments from today on, earliest first.
    pub upcoming: Vec<Appointment>,
    /// Everything else, latest first.
    pub past: Vec<Appointment>,
    /// The 7-day availability schedule, provisioned on view.
    pub schedule: Vec<ScheduleDay>,
}

/// One day's changes in an availability update request.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityDayRequest {
    /// Identifier of the day record to change.
    pub id: Uuid,
    /// Working window start, `HH:MM`.
    pub start_time: String,
    /// Working window end, `HH:MM`.
    pub end_time: String,
    /// Whether the doctor takes bookings on this date.
    pub is_available: bool,
}

/// Request body for `PUT /api/v1/doctor/availability`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAvailabilityRequest {
    /// Day records to change.
    pub days: Vec<AvailabilityDayRequest>,
}

/// Request body for `POST /api/v1/doctor/appointments/{id}/complete`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompleteAppointmentRequest {
    /// Diagnosis text; required.
    pub diagnosis: String,
    /// Prescription text; required.
    pub prescription: String,
    /// Optional follow-up date.
    #[serde(default)]
    pub follow_up_date: Option<String>,
    /// Optional free-text notes.
    #[serde(default)]
    pub notes: Option<String>,
}

/// Payload of `GET /api/v1/doctor/patients/{id}/history`.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PatientHistory {
    /// The patient the history belongs to.
    pub patient: User,
    /// Completed appointments, newest first.
    pub history: Vec<Appointment>,
}

/// Doctor dashboard: appointment overview plus the weekly schedule.
///
/// Viewing the schedule provisions missing day records with defaults; the
/// upsert is idempotent so repeated views never duplicate rows.
#[utoipa::path(
    get,
    path = "/api/v1/doctor/dashboard",
    responses(
        (status = 200, description = "Dashboard data", body = DoctorDashboard),
        (status = 401, description = "Not logged in", body = Error),
        (status = 403, description = "Not a doctor", body = Error)
    ),
    tags = ["doctor"],
    operation_id = "doctorDashboard"
)]
#[get("/doctor/dashboard")]
pub async fn dashboard(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<DoctorDashboard>> {
    let doctor = require_role(&session, &state.accounts, Role::Doctor).await?;

    let AppointmentsOverview { upcoming, past } =
        state.scheduling.doctor_overview(doctor.id).await?;
    let schedule = state.scheduling.weekly_schedule(doctor.id).await?;

    Ok(web::Json(DoctorDashboard {
        upcoming,
        past,
        schedule,
    }))
}

/// Batch-update the caller's availability windows.
///
/// Day records belonging to other doctors are skipped, not rejected. Start
/// and end strings are stored as given; an unparsable window degrades to the
/// fallback slot sequence at booking time.
#[utoipa::path(
    put,
    path = "/api/v1/doctor/availability",
    request_body = UpdateAvailabilityRequest,
    responses(
        (status = 200, description = "Availability updated"),
        (status = 401, description = "Not logged in", body = Error),
        (status = 403, description = "Not a doctor", body = Error)
    ),
    tags = ["doctor"],
    operation_id = "updateAvailability"
)]
#[put("/doctor/availability")]
pub async fn update_availability(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<UpdateAvailabilityRequest>,
) -> ApiResult<HttpResponse> {
    let doctor = require_role(&session, &state.accounts, Role::Doctor).await?;

    let updates: Vec<AvailabilityUpdate> = payload
        .into_inner()
        .days
        .into_iter()
        .map(|day| AvailabilityUpdate {
            id: day.id,
            start_time: day.start_time,
            end_time: day.end_time,
            is_available: day.is_available,
        })
        .collect();

    state
        .scheduling
        .update_availability(doctor.id, &updates)
        .await?;
    Ok(HttpResponse::Ok().finish())
}

/// Record a treatment and mark the appointment Completed.
#[utoipa::path(
    post,
    path = "/api/v1/doctor/appointments/{id}/complete",
    request_body = CompleteAppointmentRequest,
    responses(
        (status = 200, description = "Treatment recorded", body = Treatment),
        (status = 400, description = "Missing diagnosis or prescription", body = Error),
        (status = 404, description = "No such appointment", body = Error)
    ),
    tags = ["doctor"],
    operation_id = "completeAppointment"
)]
#[post("/doctor/appointments/{id}/complete")]
pub async fn complete_appointment(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
    payload: web::Json<CompleteAppointmentRequest>,
) -> ApiResult<web::Json<Treatment>> {
    let doctor = require_role(&session, &state.accounts, Role::Doctor).await?;

    let body = payload.into_inner();
    let draft = TreatmentDraft::try_from_parts(
        &body.diagnosis,
        &body.prescription,
        body.follow_up_date.as_deref(),
        body.notes.as_deref(),
    )
    .map_err(|err| Error::invalid_request(err.to_string()))?;

    let treatment = state
        .scheduling
        .complete(doctor.id, path.into_inner(), draft)
        .await?;
    Ok(web::Json(treatment))
}

/// Cancel one of the caller's Booked appointments.
#[utoipa::path(
    post,
    path = "/api/v1/doctor/appointments/{id}/cancel",
    responses(
        (status = 200, description = "Appointment cancelled"),
        (status = 404, description = "No such appointment", body = Error)
    ),
    tags = ["doctor"],
    operation_id = "doctorCancelAppointment"
)]
#[post("/doctor/appointments/{id}/cancel")]
pub async fn cancel_appointment(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let doctor = require_role(&session, &state.accounts, Role::Doctor).await?;

    state
        .scheduling
        .cancel(path.into_inner(), AppointmentOwner::Doctor(doctor.id))
        .await?;
    Ok(HttpResponse::Ok().finish())
}

/// A patient's completed-visit history.
#[utoipa::path(
    get,
    path = "/api/v1/doctor/patients/{id}/history",
    responses(
        (status = 200, description = "Patient history", body = PatientHistory),
        (status = 404, description = "No such patient", body = Error)
    ),
    tags = ["doctor"],
    operation_id = "patientHistory"
)]
#[get("/doctor/patients/{id}/history")]
pub async fn patient_history(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<PatientHistory>> {
    require_role(&session, &state.accounts, Role::Doctor).await?;

    let patient_id = crate::domain::UserId::from_uuid(path.into_inner());
    let patient = state.accounts.find_patient(patient_id).await?;
    let history = state.scheduling.patient_history(patient_id).await?;

    Ok(web::Json(PatientHistory { patient, history }))
}
