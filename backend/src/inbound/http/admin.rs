//! Administrator handlers: dashboard, departments, doctor accounts, and
//! account activation.

use actix_web::{HttpResponse, get, post, put, web};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    Appointment, Department, DoctorUpdate, Error, NewDepartment, NewDoctor, Role, Treatment, User,
    UserId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::map_user_validation_error;
use crate::inbound::http::guard::require_role;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

fn clean_search(raw: Option<String>) -> Option<String> {
    raw.map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

/// Search filters accepted by the admin dashboard.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct AdminDashboardQuery {
    /// Pattern over patient name, email, or contact number.
    pub patient_search: Option<String>,
    /// Pattern over doctor name, email, or department name.
    pub doctor_search: Option<String>,
}

/// Payload of `GET /api/v1/admin/dashboard`.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminDashboard {
    /// Number of active patients.
    pub patient_count: i64,
    /// Number of active doctors.
    pub doctor_count: i64,
    /// Total number of appointments, any status.
    pub appointment_count: i64,
    /// All departments.
    pub departments: Vec<Department>,
    /// Patients matching the search filter.
    pub patients: Vec<User>,
    /// Doctors matching the search filter.
    pub doctors: Vec<User>,
    /// All appointments, newest first.
    pub appointments: Vec<Appointment>,
}

/// Request body for `POST /api/v1/admin/departments`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateDepartmentRequest {
    /// Unique department name.
    pub name: String,
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
}

/// Request body for `POST /api/v1/admin/doctors`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateDoctorRequest {
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: String,
    /// Plaintext password, minimum six characters.
    pub password: String,
    /// Department the doctor belongs to.
    pub department_id: Uuid,
}

/// Request body for `PUT /api/v1/admin/doctors/{id}`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDoctorRequest {
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: String,
    /// Department the doctor belongs to.
    pub department_id: Uuid,
}

/// Payload of `GET /api/v1/admin/appointments/{id}`.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminAppointmentDetails {
    /// The completed appointment.
    pub appointment: Appointment,
    /// Its treatment record.
    pub treatment: Treatment,
}

/// Admin dashboard: counts, directory, and the full appointment list.
#[utoipa::path(
    get,
    path = "/api/v1/admin/dashboard",
    params(AdminDashboardQuery),
    responses(
        (status = 200, description = "Dashboard data", body = AdminDashboard),
        (status = 401, description = "Not logged in", body = Error),
        (status = 403, description = "Not an admin", body = Error)
    ),
    tags = ["admin"],
    operation_id = "adminDashboard"
)]
#[get("/admin/dashboard")]
pub async fn dashboard(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<AdminDashboardQuery>,
) -> ApiResult<web::Json<AdminDashboard>> {
    require_role(&session, &state.accounts, Role::Admin).await?;

    let filters = query.into_inner();
    let patient_search = clean_search(filters.patient_search);
    let doctor_search = clean_search(filters.doctor_search);

    let directory = state
        .accounts
        .admin_directory(patient_search.as_deref(), doctor_search.as_deref())
        .await?;
    let appointments = state.scheduling.list_all_appointments().await?;
    let appointment_count = state.scheduling.appointment_count().await?;

    Ok(web::Json(AdminDashboard {
        patient_count: directory.patient_count,
        doctor_count: directory.doctor_count,
        appointment_count,
        departments: directory.departments,
        patients: directory.patients,
        doctors: directory.doctors,
        appointments,
    }))
}

/// Create a department.
#[utoipa::path(
    post,
    path = "/api/v1/admin/departments",
    request_body = CreateDepartmentRequest,
    responses(
        (status = 201, description = "Department created", body = Department),
        (status = 400, description = "Invalid request", body = Error),
        (status = 409, description = "Name already taken", body = Error)
    ),
    tags = ["admin"],
    operation_id = "createDepartment"
)]
#[post("/admin/departments")]
pub async fn create_department(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateDepartmentRequest>,
) -> ApiResult<HttpResponse> {
    require_role(&session, &state.accounts, Role::Admin).await?;

    let body = payload.into_inner();
    let department = NewDepartment::try_from_parts(&body.name, body.description.as_deref())
        .map_err(|err| Error::invalid_request(err.to_string()))?;
    let created = state.accounts.add_department(department).await?;
    Ok(HttpResponse::Created().json(created))
}

/// Create a doctor account.
#[utoipa::path(
    post,
    path = "/api/v1/admin/doctors",
    request_body = CreateDoctorRequest,
    responses(
        (status = 201, description = "Doctor created", body = User),
        (status = 400, description = "Invalid request", body = Error),
        (status = 409, description = "Email already registered", body = Error)
    ),
    tags = ["admin"],
    operation_id = "createDoctor"
)]
#[post("/admin/doctors")]
pub async fn create_doctor(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateDoctorRequest>,
) -> ApiResult<HttpResponse> {
    require_role(&session, &state.accounts, Role::Admin).await?;

    let body = payload.into_inner();
    let doctor =
        NewDoctor::try_from_parts(&body.name, &body.email, &body.password, body.department_id)
            .map_err(map_user_validation_error)?;
    let created = state.accounts.add_doctor(doctor).await?;
    Ok(HttpResponse::Created().json(created))
}

/// Edit a doctor's profile.
#[utoipa::path(
    put,
    path = "/api/v1/admin/doctors/{id}",
    request_body = UpdateDoctorRequest,
    responses(
        (status = 200, description = "Doctor updated", body = User),
        (status = 404, description = "No such doctor", body = Error),
        (status = 409, description = "Email already registered", body = Error)
    ),
    tags = ["admin"],
    operation_id = "updateDoctor"
)]
#[put("/admin/doctors/{id}")]
pub async fn update_doctor(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
    payload: web::Json<UpdateDoctorRequest>,
) -> ApiResult<web::Json<User>> {
    require_role(&session, &state.accounts, Role::Admin).await?;

    let body = payload.into_inner();
    let update = DoctorUpdate::try_from_parts(&body.name, &body.email, body.department_id)
        .map_err(map_user_validation_error)?;
    let doctor = state
        .accounts
        .edit_doctor(UserId::from_uuid(path.into_inner()), update)
        .await?;
    Ok(web::Json(doctor))
}

/// Flip a user's active flag (blacklist / reinstate).
#[utoipa::path(
    post,
    path = "/api/v1/admin/users/{id}/toggle-active",
    responses(
        (status = 200, description = "Flag flipped", body = User),
        (status = 400, description = "Cannot deactivate yourself", body = Error),
        (status = 404, description = "No such user", body = Error)
    ),
    tags = ["admin"],
    operation_id = "toggleUserActive"
)]
#[post("/admin/users/{id}/toggle-active")]
pub async fn toggle_active(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<User>> {
    let admin = require_role(&session, &state.accounts, Role::Admin).await?;

    let updated = state
        .accounts
        .toggle_active(admin.id, UserId::from_uuid(path.into_inner()))
        .await?;
    Ok(web::Json(updated))
}

/// Details of a completed appointment, treatment included.
#[utoipa::path(
    get,
    path = "/api/v1/admin/appointments/{id}",
    responses(
        (status = 200, description = "Appointment details", body = AdminAppointmentDetails),
        (status = 400, description = "Appointment is not completed", body = Error),
        (status = 404, description = "No such appointment or treatment", body = Error)
    ),
    tags = ["admin"],
    operation_id = "adminAppointmentDetails"
)]
#[get("/admin/appointments/{id}")]
pub async fn appointment_details(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<AdminAppointmentDetails>> {
    require_role(&session, &state.accounts, Role::Admin).await?;

    let (appointment, treatment) = state
        .scheduling
        .admin_appointment_details(path.into_inner())
        .await?;
    Ok(web::Json(AdminAppointmentDetails {
        appointment,
        treatment,
    }))
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

    #[actix_web::test]
    async fn dashboard_requires_a_session() {
        let state = TestStateBuilder::new().build();
        let app = actix_test::init_service(test_app(state)).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/admin/dashboard")
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn dashboard_rejects_non_admin_roles() {
        let builder = TestStateBuilder::new();
        builder
            .seed_user(Role::Patient, "Ann", "ann@clinic.test", "secret1", None)
            .await;
        let app = actix_test::init_service(test_app(builder.build())).await;

        let cookie = login(&app, "ann@clinic.test", "secret1").await;
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/admin/dashboard")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn duplicate_department_names_conflict() {
        let builder = TestStateBuilder::new();
        builder
            .seed_user(Role::Admin, "admin", "admin@clinic.test", "admin123", None)
            .await;
        let app = actix_test::init_service(test_app(builder.build())).await;
        let cookie = login(&app, "admin@clinic.test", "admin123").await;

        let first = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/admin/departments")
                .cookie(cookie.clone())
                .set_json(json!({ "name": "Cardiology" }))
                .to_request(),
        )
        .await;
        assert_eq!(first.status(), StatusCode::CREATED);

        let second = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/admin/departments")
                .cookie(cookie)
                .set_json(json!({ "name": "Cardiology" }))
                .to_request(),
        )
        .await;
        assert_eq!(second.status(), StatusCode::CONFLICT);
    }

    #[actix_web::test]
    async fn admins_cannot_toggle_themselves() {
        let builder = TestStateBuilder::new();
        let admin = builder
            .seed_user(Role::Admin, "admin", "admin@clinic.test", "admin123", None)
            .await;
        let app = actix_test::init_service(test_app(builder.build())).await;
        let cookie = login(&app, "admin@clinic.test", "admin123").await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri(&format!("/api/v1/admin/users/{}/toggle-active", admin.id))
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn deactivated_users_lose_their_session() {
        let builder = TestStateBuilder::new();
        builder
            .seed_user(Role::Admin, "admin", "admin@clinic.test", "admin123", None)
            .await;
        let patient = builder
            .seed_user(Role::Patient, "Ann", "ann@clinic.test", "secret1", None)
            .await;
        let app = actix_test::init_service(test_app(builder.build())).await;

        let patient_cookie = login(&app, "ann@clinic.test", "secret1").await;
        let admin_cookie = login(&app, "admin@clinic.test", "admin123").await;

        let toggled = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri(&format!("/api/v1/admin/users/{}/toggle-active", patient.id))
                .cookie(admin_cookie)
                .to_request(),
        )
        .await;
        assert_eq!(toggled.status(), StatusCode::OK);

        // The patient's existing session now resolves to an inactive account.
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/patient/dashboard")
                .cookie(patient_cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn create_doctor_requires_an_existing_department() {
        let builder = TestStateBuilder::new();
        builder
            .seed_user(Role::Admin, "admin", "admin@clinic.test", "admin123", None)
            .await;
        let app = actix_test::init_service(test_app(builder.build())).await;
        let cookie = login(&app, "admin@clinic.test", "admin123").await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/admin/doctors")
                .cookie(cookie)
                .set_json(json!({
                    "name": "Dr. Grey",
                    "email": "grey@clinic.test",
                    "password": "secret1",
                    "departmentId": uuid::Uuid::new_v4()
                }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(
            body.get("message").and_then(Value::as_str),
            Some("please select a valid department")
        );
    }
}
