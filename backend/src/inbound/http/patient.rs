//! Patient handlers: dashboard, slot discovery, booking, cancellation,
//! appointment details, and profile maintenance.

use actix_web::{HttpResponse, get, post, put, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::ports::AppointmentOwner;
use crate::domain::{
    Appointment, AppointmentsOverview, BookingRequest, DaySlots, Error, PatientProfileUpdate,
    Role, Treatment, User, UserId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::map_user_validation_error;
use crate::inbound::http::guard::require_role;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Search filter accepted by the patient dashboard.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct PatientDashboardQuery {
    /// Pattern over doctor name or department name.
    pub search: Option<String>,
}

/// Payload of `GET /api/v1/patient/dashboard`.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PatientDashboard {
    /// Active doctors matching the search filter.
    pub doctors: Vec<User>,
    /// Booked appointments from today on, earliest first.
    pub upcoming: Vec<Appointment>,
    /// Everything else, latest first.
    pub past: Vec<Appointment>,
}

/// Payload of `GET /api/v1/patient/doctors/{id}/slots`.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DoctorSlots {
    /// The doctor being booked.
    pub doctor: User,
    /// Days with at least one open slot, earliest first.
    pub days: Vec<DaySlots>,
}

/// Request body for `POST /api/v1/patient/appointments`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookAppointmentRequest {
    /// Doctor to book.
    pub doctor_id: Uuid,
    /// Requested calendar date.
    pub date: NaiveDate,
    /// Requested `HH:MM` slot.
    pub time: String,
}

/// Payload of `GET /api/v1/patient/appointments/{id}`.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PatientAppointmentDetails {
    /// The completed appointment.
    pub appointment: Appointment,
    /// Its treatment record, when one was filed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub treatment: Option<Treatment>,
}

/// Request body for `PUT /api/v1/patient/profile`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    /// Display name; required.
    pub name: String,
    /// Optional positive age.
    #[serde(default)]
    pub age: Option<i32>,
    /// Optional gender.
    #[serde(default)]
    pub gender: Option<String>,
    /// Optional contact number.
    #[serde(default)]
    pub contact_number: Option<String>,
    /// Optional postal address.
    #[serde(default)]
    pub address: Option<String>,
}

/// Patient dashboard: bookable doctors plus the caller's appointments.
#[utoipa::path(
    get,
    path = "/api/v1/patient/dashboard",
    params(PatientDashboardQuery),
    responses(
        (status = 200, description = "Dashboard data", body = PatientDashboard),
        (status = 401, description = "Not logged in", body = Error),
        (status = 403, description = "Not a patient", body = Error)
    ),
    tags = ["patient"],
    operation_id = "patientDashboard"
)]
#[get("/patient/dashboard")]
pub async fn dashboard(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<PatientDashboardQuery>,
) -> ApiResult<web::Json<PatientDashboard>> {
    let patient = require_role(&session, &state.accounts, Role::Patient).await?;

    let search = query
        .into_inner()
        .search
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty());

    let doctors = state
        .accounts
        .search_active_doctors(search.as_deref())
        .await?;
    let AppointmentsOverview { upcoming, past } =
        state.scheduling.patient_overview(patient.id).await?;

    Ok(web::Json(PatientDashboard {
        doctors,
        upcoming,
        past,
    }))
}

/// Open slots for a doctor over the next seven days.
#[utoipa::path(
    get,
    path = "/api/v1/patient/doctors/{id}/slots",
    responses(
        (status = 200, description = "Open slots", body = DoctorSlots),
        (status = 404, description = "No such doctor", body = Error)
    ),
    tags = ["patient"],
    operation_id = "doctorSlots"
)]
#[get("/patient/doctors/{id}/slots")]
pub async fn doctor_slots(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<DoctorSlots>> {
    require_role(&session, &state.accounts, Role::Patient).await?;

    let doctor = state
        .accounts
        .find_active_doctor(UserId::from_uuid(path.into_inner()))
        .await?;
    let days = state.scheduling.bookable_slots(doctor.id).await?;

    Ok(web::Json(DoctorSlots { doctor, days }))
}

/// Book an appointment.
///
/// The slot check and the insert are one atomic statement at the storage
/// layer; losing a race for the last slot surfaces as the same conflict as
/// picking a taken slot.
#[utoipa::path(
    post,
    path = "/api/v1/patient/appointments",
    request_body = BookAppointmentRequest,
    responses(
        (status = 201, description = "Appointment booked", body = Appointment),
        (status = 400, description = "Invalid request", body = Error),
        (status = 404, description = "No such doctor", body = Error),
        (status = 409, description = "Slot already taken", body = Error)
    ),
    tags = ["patient"],
    operation_id = "bookAppointment"
)]
#[post("/patient/appointments")]
pub async fn book_appointment(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<BookAppointmentRequest>,
) -> ApiResult<HttpResponse> {
    let patient = require_role(&session, &state.accounts, Role::Patient).await?;

    let body = payload.into_inner();
    let time = body.time.trim().to_owned();
    if time.is_empty() {
        return Err(Error::invalid_request("an appointment time is required"));
    }

    let doctor = state
        .accounts
        .find_active_doctor(UserId::from_uuid(body.doctor_id))
        .await?;

    let appointment = state
        .scheduling
        .book(BookingRequest {
            patient_id: patient.id,
            doctor_id: doctor.id,
            date: body.date,
            time,
        })
        .await?;
    Ok(HttpResponse::Created().json(appointment))
}

/// Cancel one of the caller's Booked appointments.
#[utoipa::path(
    post,
    path = "/api/v1/patient/appointments/{id}/cancel",
    responses(
        (status = 200, description = "Appointment cancelled"),
        (status = 404, description = "No such appointment", body = Error)
    ),
    tags = ["patient"],
    operation_id = "patientCancelAppointment"
)]
#[post("/patient/appointments/{id}/cancel")]
pub async fn cancel_appointment(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let patient = require_role(&session, &state.accounts, Role::Patient).await?;

    state
        .scheduling
        .cancel(path.into_inner(), AppointmentOwner::Patient(patient.id))
        .await?;
    Ok(HttpResponse::Ok().finish())
}

/// Details of one of the caller's completed appointments.
#[utoipa::path(
    get,
    path = "/api/v1/patient/appointments/{id}",
    responses(
        (status = 200, description = "Appointment details", body = PatientAppointmentDetails),
        (status = 400, description = "Appointment is not completed", body = Error),
        (status = 404, description = "No such appointment", body = Error)
    ),
    tags = ["patient"],
    operation_id = "patientAppointmentDetails"
)]
#[get("/patient/appointments/{id}")]
pub async fn appointment_details(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<PatientAppointmentDetails>> {
    let patient = require_role(&session, &state.accounts, Role::Patient).await?;

    let (appointment, treatment) = state
        .scheduling
        .patient_appointment_details(path.into_inner(), patient.id)
        .await?;
    Ok(web::Json(PatientAppointmentDetails {
        appointment,
        treatment,
    }))
}

/// Update the caller's profile.
#[utoipa::path(
    put,
    path = "/api/v1/patient/profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = User),
        (status = 400, description = "Invalid request", body = Error)
    ),
    tags = ["patient"],
    operation_id = "updateProfile"
)]
#[put("/patient/profile")]
pub async fn update_profile(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<UpdateProfileRequest>,
) -> ApiResult<web::Json<User>> {
    let patient = require_role(&session, &state.accounts, Role::Patient).await?;

    let body = payload.into_inner();
    let update = PatientProfileUpdate::try_from_parts(
        &body.name,
        body.age,
        body.gender.as_deref(),
        body.contact_number.as_deref(),
        body.address.as_deref(),
    )
    .map_err(map_user_validation_error)?;

    let updated = state
        .accounts
        .update_patient_profile(patient.id, update)
        .await?;
    Ok(web::Json(updated))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::test_utils::{TestStateBuilder, session_cookie, test_app};
    use actix_web::{http::StatusCode, test as actix_test};
    use serde_json::{Value, json};

    async fn login(
        app: &impl actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
        >,
        email: &str,
        password: &str,
    ) -> actix_web::cookie::Cookie<'static> {
        let res = actix_test::call_service(
            app,
            actix_test::TestRequest::post()
                .uri("/api/v1/login")
                .set_json(json!({ "email": email, "password": password }))
                .to_request(),
        )
        .await;
        assert!(res.status().is_success(), "login must succeed");
        session_cookie(&res)
    }

    struct Seeded {
        builder: TestStateBuilder,
        doctor: User,
    }

    async fn seed_clinic() -> Seeded {
        let builder = TestStateBuilder::new();
        let department = builder.seed_department("Cardiology").await;
        let doctor = builder
            .seed_user(
                Role::Doctor,
                "Dr. Grey",
                "grey@clinic.test",
                "secret1",
                Some(department.id),
            )
            .await;
        builder
            .seed_user(Role::Patient, "Ann", "ann@clinic.test", "secret1", None)
            .await;
        Seeded { builder, doctor }
    }

    async fn open_today(
        app: &impl actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
        >,
        start: &str,
        end: &str,
    ) {
        let doctor_cookie = login(app, "grey@clinic.test", "secret1").await;
        let res = actix_test::call_service(
            app,
            actix_test::TestRequest::get()
                .uri("/api/v1/doctor/dashboard")
                .cookie(doctor_cookie.clone())
                .to_request(),
        )
        .await;
        let body: Value = actix_test::read_body_json(res).await;
        let first_day = body
            .pointer("/schedule/0/day/id")
            .and_then(Value::as_str)
            .expect("first schedule day id")
            .to_owned();

        let res = actix_test::call_service(
            app,
            actix_test::TestRequest::put()
                .uri("/api/v1/doctor/availability")
                .cookie(doctor_cookie)
                .set_json(json!({
                    "days": [{
                        "id": first_day,
                        "startTime": start,
                        "endTime": end,
                        "isAvailable": true
                    }]
                }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn booking_flow_blocks_the_taken_slot() {
        let seeded = seed_clinic().await;
        let today = seeded.builder.today();
        let doctor_id = seeded.doctor.id;
        let app = actix_test::init_service(test_app(seeded.builder.build())).await;
        open_today(&app, "09:00", "10:00").await;

        let patient_cookie = login(&app, "ann@clinic.test", "secret1").await;

        let slots_res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri(&format!("/api/v1/patient/doctors/{doctor_id}/slots"))
                .cookie(patient_cookie.clone())
                .to_request(),
        )
        .await;
        assert_eq!(slots_res.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(slots_res).await;
        assert_eq!(
            body.pointer("/days/0/slots").and_then(Value::as_array).map(Vec::len),
            Some(2)
        );

        let book = |time: &str| {
            json!({ "doctorId": doctor_id, "date": today.to_string(), "time": time })
        };
        let first = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/patient/appointments")
                .cookie(patient_cookie.clone())
                .set_json(book("09:00"))
                .to_request(),
        )
        .await;
        assert_eq!(first.status(), StatusCode::CREATED);

        let second = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/patient/appointments")
                .cookie(patient_cookie.clone())
                .set_json(book("09:00"))
                .to_request(),
        )
        .await;
        assert_eq!(second.status(), StatusCode::CONFLICT);

        // The taken slot disappears from the listing.
        let slots_res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri(&format!("/api/v1/patient/doctors/{doctor_id}/slots"))
                .cookie(patient_cookie)
                .to_request(),
        )
        .await;
        let body: Value = actix_test::read_body_json(slots_res).await;
        assert_eq!(
            body.pointer("/days/0/slots/0").and_then(Value::as_str),
            Some("09:30")
        );
    }

    #[actix_web::test]
    async fn booking_an_unknown_doctor_is_not_found() {
        let seeded = seed_clinic().await;
        let today = seeded.builder.today();
        let app = actix_test::init_service(test_app(seeded.builder.build())).await;
        let cookie = login(&app, "ann@clinic.test", "secret1").await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/patient/appointments")
                .cookie(cookie)
                .set_json(json!({
                    "doctorId": uuid::Uuid::new_v4(),
                    "date": today.to_string(),
                    "time": "09:00"
                }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn doctors_cannot_reach_patient_endpoints() {
        let seeded = seed_clinic().await;
        let app = actix_test::init_service(test_app(seeded.builder.build())).await;
        let cookie = login(&app, "grey@clinic.test", "secret1").await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/patient/dashboard")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn profile_update_validates_age() {
        let seeded = seed_clinic().await;
        let app = actix_test::init_service(test_app(seeded.builder.build())).await;
        let cookie = login(&app, "ann@clinic.test", "secret1").await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::put()
                .uri("/api/v1/patient/profile")
                .cookie(cookie)
                .set_json(json!({ "name": "Ann", "age": -1 }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
