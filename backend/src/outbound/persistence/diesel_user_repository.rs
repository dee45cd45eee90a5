//! PostgreSQL-backed `UserRepository` implementation using Diesel.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{
    NewUserRecord, StoredCredentials, UserPersistenceError, UserRepository,
};
use crate::domain::{
    DoctorUpdate, EmailAddress, PatientProfileUpdate, Role, User, UserId,
};

use super::diesel_helpers::{StorageErrorKind, classify_diesel_error, classify_pool_error};
use super::models::{NewUserRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::{departments, users};

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    match classify_pool_error(error) {
        StorageErrorKind::Connection(message) => UserPersistenceError::connection(message),
        StorageErrorKind::Query(message) => UserPersistenceError::query(message),
        StorageErrorKind::Duplicate => UserPersistenceError::duplicate("email"),
    }
}

fn map_diesel_error(error: diesel::result::Error) -> UserPersistenceError {
    match classify_diesel_error(error) {
        StorageErrorKind::Connection(message) => UserPersistenceError::connection(message),
        StorageErrorKind::Query(message) => UserPersistenceError::query(message),
        // The only uniqueness constraint on users is the email index.
        StorageErrorKind::Duplicate => UserPersistenceError::duplicate("email"),
    }
}

/// Convert a database row to a domain user.
///
/// Rows carrying an unrecognized role are treated as corrupt rather than
/// silently coerced.
fn row_to_user(row: UserRow) -> Result<User, UserPersistenceError> {
    let role = Role::parse(&row.role)
        .ok_or_else(|| UserPersistenceError::query(format!("unrecognized role: {}", row.role)))?;
    let email = EmailAddress::new(&row.email)
        .map_err(|err| UserPersistenceError::query(format!("stored email invalid: {err}")))?;

    Ok(User {
        id: UserId::from_uuid(row.id),
        name: row.name,
        email,
        role,
        active: row.active,
        department_id: row.department_id,
        age: row.age,
        gender: row.gender,
        contact_number: row.contact_number,
        address: row.address,
        created_at: row.created_at,
    })
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(&self, record: &NewUserRecord) -> Result<User, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewUserRow {
            id: Uuid::new_v4(),
            name: &record.name,
            email: record.email.as_ref(),
            password_hash: &record.password_hash,
            role: record.role.as_str(),
            active: record.active,
            department_id: record.department_id,
            age: record.age,
            gender: record.gender.as_deref(),
            contact_number: record.contact_number.as_deref(),
            address: record.address.as_deref(),
        };

        let row: UserRow = diesel::insert_into(users::table)
            .values(&new_row)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        row_to_user(row)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .filter(users::id.eq(id.as_uuid()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_user).transpose()
    }

    async fn find_credentials(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<StoredCredentials>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .filter(users::email.eq(email.as_ref()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(|found| {
            let password_hash = found.password_hash.clone();
            row_to_user(found).map(|user| StoredCredentials {
                user,
                password_hash,
            })
        })
        .transpose()
    }

    async fn email_in_use(
        &self,
        email: &EmailAddress,
        exclude: Option<UserId>,
    ) -> Result<bool, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut query = users::table
            .filter(users::email.eq(email.as_ref()))
            .into_boxed();
        if let Some(excluded) = exclude {
            query = query.filter(users::id.ne(*excluded.as_uuid()));
        }

        let matches: i64 = query
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(matches > 0)
    }

    async fn update_doctor(
        &self,
        id: UserId,
        update: &DoctorUpdate,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = diesel::update(
            users::table.filter(
                users::id
                    .eq(id.as_uuid())
                    .and(users::role.eq(Role::Doctor.as_str())),
            ),
        )
        .set((
            users::name.eq(&update.name),
            users::email.eq(update.email.as_ref()),
            users::department_id.eq(Some(update.department_id)),
        ))
        .returning(UserRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;

        row.map(row_to_user).transpose()
    }

    async fn update_patient_profile(
        &self,
        id: UserId,
        update: &PatientProfileUpdate,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = diesel::update(
            users::table.filter(
                users::id
                    .eq(id.as_uuid())
                    .and(users::role.eq(Role::Patient.as_str())),
            ),
        )
        .set((
            users::name.eq(&update.name),
            users::age.eq(update.age),
            users::gender.eq(update.gender.as_deref()),
            users::contact_number.eq(update.contact_number.as_deref()),
            users::address.eq(update.address.as_deref()),
        ))
        .returning(UserRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;

        row.map(row_to_user).transpose()
    }

    async fn set_active(
        &self,
        id: UserId,
        active: bool,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> =
            diesel::update(users::table.filter(users::id.eq(id.as_uuid())))
                .set(users::active.eq(active))
                .returning(UserRow::as_returning())
                .get_result(&mut conn)
                .await
                .optional()
                .map_err(map_diesel_error)?;

        row.map(row_to_user).transpose()
    }

    async fn count_active_by_role(&self, role: Role) -> Result<i64, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        users::table
            .filter(users::role.eq(role.as_str()).and(users::active.eq(true)))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)
    }

    async fn role_exists(&self, role: Role) -> Result<bool, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::select(diesel::dsl::exists(
            users::table.filter(users::role.eq(role.as_str())),
        ))
        .get_result(&mut conn)
        .await
        .map_err(map_diesel_error)
    }

    async fn find_active_doctor(
        &self,
        id: UserId,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .filter(
                users::id
                    .eq(id.as_uuid())
                    .and(users::role.eq(Role::Doctor.as_str()))
                    .and(users::active.eq(true)),
            )
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_user).transpose()
    }

    async fn search_patients<'a>(
        &self,
        search: Option<&'a str>,
    ) -> Result<Vec<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut query = users::table
            .filter(users::role.eq(Role::Patient.as_str()))
            .into_boxed();

        if let Some(needle) = search {
            let pattern = format!("%{needle}%");
            let text_match = users::name
                .ilike(pattern.clone())
                .nullable()
                .or(users::email.ilike(pattern.clone()).nullable())
                .or(users::contact_number.ilike(pattern));
            // Exact id lookup replaces the legacy cast-to-text pattern match.
            query = match Uuid::parse_str(needle) {
                Ok(exact) => query.filter(text_match.or(users::id.eq(exact).nullable())),
                Err(_) => query.filter(text_match),
            };
        }

        let rows: Vec<UserRow> = query
            .order(users::name.asc())
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_user).collect()
    }

    async fn search_doctors<'a>(
        &self,
        search: Option<&'a str>,
        active_only: bool,
    ) -> Result<Vec<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<UserRow> = if let Some(needle) = search {
            // Searching joins departments so the pattern also matches the
            // department name; doctors without a department drop out of a
            // filtered listing, matching the legacy behavior.
            let pattern = format!("%{needle}%");
            let mut query = users::table
                .inner_join(departments::table)
                .filter(users::role.eq(Role::Doctor.as_str()))
                .filter(
                    users::name
                        .ilike(pattern.clone())
                        .or(users::email.ilike(pattern.clone()))
                        .or(departments::name.ilike(pattern)),
                )
                .into_boxed();
            if active_only {
                query = query.filter(users::active.eq(true));
            }
            query
                .order(users::name.asc())
                .select(UserRow::as_select())
                .load(&mut conn)
                .await
                .map_err(map_diesel_error)?
        } else {
            let mut query = users::table
                .filter(users::role.eq(Role::Doctor.as_str()))
                .into_boxed();
            if active_only {
                query = query.filter(users::active.eq(true));
            }
            query
                .order(users::name.asc())
                .select(UserRow::as_select())
                .load(&mut conn)
                .await
                .map_err(map_diesel_error)?
        };

        rows.into_iter().map(row_to_user).collect()
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use chrono::Utc;

    fn sample_row(role: &str) -> UserRow {
        UserRow {
            id: Uuid::new_v4(),
            name: "Sam Carter".to_owned(),
            email: "sam@clinic.test".to_owned(),
            password_hash: "$argon2id$stub".to_owned(),
            role: role.to_owned(),
            active: true,
            department_id: None,
            age: None,
            gender: None,
            contact_number: None,
            address: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn row_conversion_parses_role() {
        let user = row_to_user(sample_row("doctor")).expect("valid row converts");
        assert_eq!(user.role, Role::Doctor);
        assert_eq!(user.email.as_ref(), "sam@clinic.test");
    }

    #[test]
    fn row_conversion_rejects_unknown_roles() {
        let err = row_to_user(sample_row("superuser")).expect_err("unknown role fails");
        assert!(matches!(err, UserPersistenceError::Query { .. }));
    }

    #[test]
    fn pool_errors_map_to_connection() {
        let err = map_pool_error(PoolError::checkout("refused"));
        assert!(matches!(err, UserPersistenceError::Connection { .. }));
    }

    #[test]
    fn unique_violations_map_to_duplicate_email() {
        use diesel::result::{DatabaseErrorKind, Error as DieselError};

        let err = map_diesel_error(DieselError::DatabaseError(
            DatabaseErrorKind::UniqueViolation,
            Box::new("duplicate key".to_owned()),
        ));
        assert!(matches!(err, UserPersistenceError::Duplicate { field } if field == "email"));
    }
}
