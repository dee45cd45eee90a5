//! Test helpers for HTTP adapter tests: session middleware, an in-memory
//! application state, and a fully wired test app.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::ServiceResponse;
use actix_web::{App, web};
use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::ports::{
    FixtureClock, FixturePasswordHasher, NewUserRecord, PasswordHasher, UserRepository,
};
use crate::domain::{
    AccountsService, Department, EmailAddress, NewDepartment, Role, SchedulingService, User,
};
use crate::inbound::http::state::HttpState;
use crate::test_support::{
    InMemoryAvailability, InMemoryDepartments, InMemoryLedger, InMemoryUsers,
};

/// Cookie-session middleware with an ephemeral key and lax transport, for
/// in-process tests only.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".into())
        .cookie_secure(false)
        .build()
}

/// Extract the session cookie set by a response.
pub fn session_cookie<B>(res: &ServiceResponse<B>) -> Cookie<'static> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie set")
        .into_owned()
}

/// Builder assembling an [`HttpState`] over shared in-memory stores.
pub struct TestStateBuilder {
    /// User store shared with the built state.
    pub users: Arc<InMemoryUsers>,
    /// Department store shared with the built state.
    pub departments: Arc<InMemoryDepartments>,
    /// Availability store shared with the built state.
    pub availability: Arc<InMemoryAvailability>,
    /// Appointment/treatment ledger shared with the built state.
    pub ledger: Arc<InMemoryLedger>,
    today: NaiveDate,
}

impl Default for TestStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestStateBuilder {
    /// Fresh empty stores pinned to a fixed date.
    pub fn new() -> Self {
        Self {
            users: Arc::new(InMemoryUsers::default()),
            departments: Arc::new(InMemoryDepartments::default()),
            availability: Arc::new(InMemoryAvailability::default()),
            ledger: Arc::new(InMemoryLedger::default()),
            today: "2026-03-02".parse().expect("valid fixture date"),
        }
    }

    /// The pinned "today" used by the scheduling service.
    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Seed a user with a fixture-hashed password.
    pub async fn seed_user(
        &self,
        role: Role,
        name: &str,
        email: &str,
        password: &str,
        department_id: Option<Uuid>,
    ) -> User {
        let record = NewUserRecord {
            name: name.to_owned(),
            email: EmailAddress::new(email).expect("valid seed email"),
            password_hash: FixturePasswordHasher
                .hash(password)
                .expect("fixture hash succeeds"),
            role,
            active: true,
            department_id,
            age: None,
            gender: None,
            contact_number: None,
            address: None,
        };
        self.users.insert(&record).await.expect("seed user")
    }

    /// Seed a department.
    pub async fn seed_department(&self, name: &str) -> Department {
        use crate::domain::ports::DepartmentRepository;

        let department =
            NewDepartment::try_from_parts(name, None).expect("valid seed department");
        self.departments
            .insert(&department)
            .await
            .expect("seed department")
    }

    /// Assemble the application state over the shared stores.
    pub fn build(&self) -> web::Data<HttpState> {
        let accounts = AccountsService::new(
            self.users.clone(),
            self.departments.clone(),
            Arc::new(FixturePasswordHasher),
        );
        let scheduling = SchedulingService::new(
            self.ledger.clone(),
            self.availability.clone(),
            self.ledger.clone(),
            Arc::new(FixtureClock(self.today)),
        );
        web::Data::new(HttpState::new(Arc::new(accounts), Arc::new(scheduling)))
    }
}

/// A fully wired application mirroring the production route table.
pub fn test_app(
    state: web::Data<HttpState>,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new().app_data(state).service(
        web::scope("/api/v1")
            .wrap(test_session_middleware())
            .configure(crate::inbound::http::configure),
    )
}
