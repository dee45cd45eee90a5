//! Authentication handlers: login, logout, and patient self-registration.
//!
//! ```text
//! POST /api/v1/login    {"email":"ann@clinic.test","password":"secret1"}
//! POST /api/v1/logout
//! POST /api/v1/register {"name":"Ann","email":"ann@clinic.test", ...}
//! ```

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::{
    Error, LoginCredentials, LoginValidationError, PatientRegistration,
    PatientRegistrationParts, User, UserValidationError,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Login request body for `POST /api/v1/login`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// Login email.
    pub email: String,
    /// Plaintext password.
    pub password: String,
}

/// Registration request body for `POST /api/v1/register`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: String,
    /// Plaintext password, minimum six characters.
    pub password: String,
    /// Must match `password`.
    pub confirm_password: String,
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

pub(crate) fn map_login_validation_error(err: LoginValidationError) -> Error {
    match err {
        LoginValidationError::InvalidEmail => Error::invalid_request("email must be a valid address")
            .with_details(json!({ "field": "email", "code": "invalid_email" })),
        LoginValidationError::EmptyPassword => Error::invalid_request("password must not be empty")
            .with_details(json!({ "field": "password", "code": "empty_password" })),
    }
}

pub(crate) fn map_user_validation_error(err: UserValidationError) -> Error {
    let (field, code) = match err {
        UserValidationError::EmptyName => ("name", "empty_name"),
        UserValidationError::EmptyEmail => ("email", "empty_email"),
        UserValidationError::InvalidEmail => ("email", "invalid_email"),
        UserValidationError::PasswordTooShort { .. } => ("password", "password_too_short"),
        UserValidationError::PasswordMismatch => ("confirmPassword", "password_mismatch"),
        UserValidationError::NonPositiveAge => ("age", "non_positive_age"),
    };
    Error::invalid_request(err.to_string()).with_details(json!({ "field": field, "code": code }))
}

/// Authenticate a user and establish a session.
///
/// All failure paths return one uniform unauthorized error so clients learn
/// nothing about which check rejected them.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = User,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid credentials", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<User>> {
    let body = payload.into_inner();
    let credentials = LoginCredentials::try_from_parts(&body.email, &body.password)
        .map_err(map_login_validation_error)?;
    let user = state.accounts.authenticate(&credentials).await?;
    session.persist_user(user.id)?;
    Ok(web::Json(user))
}

/// Drop the caller's session.
#[utoipa::path(
    post,
    path = "/api/v1/logout",
    responses((status = 200, description = "Session cleared")),
    tags = ["auth"],
    operation_id = "logout",
    security([])
)]
#[post("/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.clear();
    HttpResponse::Ok().finish()
}

/// Register a new patient account.
#[utoipa::path(
    post,
    path = "/api/v1/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = User),
        (status = 400, description = "Invalid request", body = Error),
        (status = 409, description = "Email already registered", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["auth"],
    operation_id = "register",
    security([])
)]
#[post("/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let body = payload.into_inner();
    let registration = PatientRegistration::try_from_parts(PatientRegistrationParts {
        name: &body.name,
        email: &body.email,
        password: &body.password,
        confirm_password: &body.confirm_password,
        age: body.age,
        gender: body.gender.as_deref(),
        contact_number: body.contact_number.as_deref(),
        address: body.address.as_deref(),
    })
    .map_err(map_user_validation_error)?;

    let user = state.accounts.register_patient(registration).await?;
    Ok(HttpResponse::Created().json(user))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::test_utils::{TestStateBuilder, test_app};
    use actix_web::{http::StatusCode, test as actix_test};
    use serde_json::Value;

    #[actix_web::test]
    async fn register_rejects_short_passwords() {
        let state = TestStateBuilder::new().build();
        let app = actix_test::init_service(test_app(state)).await;

        let request = actix_test::TestRequest::post()
            .uri("/api/v1/register")
            .set_json(json!({
                "name": "Ann",
                "email": "ann@clinic.test",
                "password": "tiny",
                "confirmPassword": "tiny"
            }))
            .to_request();

        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(
            body.get("details")
                .and_then(|details| details.get("code"))
                .and_then(Value::as_str),
            Some("password_too_short")
        );
    }

    #[actix_web::test]
    async fn register_rejects_mismatched_confirmation() {
        let state = TestStateBuilder::new().build();
        let app = actix_test::init_service(test_app(state)).await;

        let request = actix_test::TestRequest::post()
            .uri("/api/v1/register")
            .set_json(json!({
                "name": "Ann",
                "email": "ann@clinic.test",
                "password": "secret1",
                "confirmPassword": "secret2"
            }))
            .to_request();

        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn register_then_login_round_trips() {
        let state = TestStateBuilder::new().build();
        let app = actix_test::init_service(test_app(state)).await;

        let register_req = actix_test::TestRequest::post()
            .uri("/api/v1/register")
            .set_json(json!({
                "name": "Ann",
                "email": "Ann@Clinic.Test",
                "password": "secret1",
                "confirmPassword": "secret1",
                "age": 30
            }))
            .to_request();
        let register_res = actix_test::call_service(&app, register_req).await;
        assert_eq!(register_res.status(), StatusCode::CREATED);

        let login_req = actix_test::TestRequest::post()
            .uri("/api/v1/login")
            .set_json(json!({ "email": "ann@clinic.test", "password": "secret1" }))
            .to_request();
        let login_res = actix_test::call_service(&app, login_req).await;
        assert_eq!(login_res.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(login_res).await;
        assert_eq!(
            body.get("role").and_then(Value::as_str),
            Some("patient"),
            "login returns the user's role for client-side routing"
        );
    }

    #[actix_web::test]
    async fn duplicate_registration_conflicts() {
        let state = TestStateBuilder::new().build();
        let app = actix_test::init_service(test_app(state)).await;

        let payload = json!({
            "name": "Ann",
            "email": "ann@clinic.test",
            "password": "secret1",
            "confirmPassword": "secret1"
        });
        let first = actix_test::TestRequest::post()
            .uri("/api/v1/register")
            .set_json(&payload)
            .to_request();
        assert_eq!(
            actix_test::call_service(&app, first).await.status(),
            StatusCode::CREATED
        );

        let second = actix_test::TestRequest::post()
            .uri("/api/v1/register")
            .set_json(&payload)
            .to_request();
        assert_eq!(
            actix_test::call_service(&app, second).await.status(),
            StatusCode::CONFLICT
        );
    }

    #[actix_web::test]
    async fn login_rejects_wrong_credentials_uniformly() {
        let state = TestStateBuilder::new().build();
        let app = actix_test::init_service(test_app(state)).await;

        let request = actix_test::TestRequest::post()
            .uri("/api/v1/login")
            .set_json(json!({ "email": "ghost@clinic.test", "password": "whatever" }))
            .to_request();

        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(
            body.get("message").and_then(Value::as_str),
            Some("invalid email or password")
        );
    }
}
