//! PostgreSQL-backed `DepartmentRepository` implementation using Diesel.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{DepartmentPersistenceError, DepartmentRepository};
use crate::domain::{Department, NewDepartment};

use super::diesel_helpers::{StorageErrorKind, classify_diesel_error, classify_pool_error};
use super::models::{DepartmentRow, NewDepartmentRow};
use super::pool::{DbPool, PoolError};
use super::schema::departments;

/// Diesel-backed implementation of the `DepartmentRepository` port.
#[derive(Clone)]
pub struct DieselDepartmentRepository {
    pool: DbPool,
}

impl DieselDepartmentRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> DepartmentPersistenceError {
    match classify_pool_error(error) {
        StorageErrorKind::Connection(message) => DepartmentPersistenceError::connection(message),
        StorageErrorKind::Query(message) => DepartmentPersistenceError::query(message),
        StorageErrorKind::Duplicate => DepartmentPersistenceError::duplicate("name"),
    }
}

fn map_diesel_error(error: diesel::result::Error) -> DepartmentPersistenceError {
    match classify_diesel_error(error) {
        StorageErrorKind::Connection(message) => DepartmentPersistenceError::connection(message),
        StorageErrorKind::Query(message) => DepartmentPersistenceError::query(message),
        // The only uniqueness constraint on departments is the name index.
        StorageErrorKind::Duplicate => DepartmentPersistenceError::duplicate("name"),
    }
}

fn row_to_department(row: DepartmentRow) -> Department {
    Department {
        id: row.id,
        name: row.name,
        description: row.description,
    }
}

#[async_trait]
impl DepartmentRepository for DieselDepartmentRepository {
    async fn insert(
        &self,
        department: &NewDepartment,
    ) -> Result<Department, DepartmentPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewDepartmentRow {
            id: Uuid::new_v4(),
            name: &department.name,
            description: department.description.as_deref(),
        };

        let row: DepartmentRow = diesel::insert_into(departments::table)
            .values(&new_row)
            .returning(DepartmentRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(row_to_department(row))
    }

    async fn list(&self) -> Result<Vec<Department>, DepartmentPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<DepartmentRow> = departments::table
            .order(departments::name.asc())
            .select(DepartmentRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(rows.into_iter().map(row_to_department).collect())
    }

    async fn find_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<Department>, DepartmentPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<DepartmentRow> = departments::table
            .filter(departments::id.eq(id))
            .select(DepartmentRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(row.map(row_to_department))
    }
}
