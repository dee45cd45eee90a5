//! PostgreSQL-backed `AvailabilityRepository` implementation using Diesel.
//!
//! Default provisioning is an `INSERT .. ON CONFLICT DO NOTHING` batch
//! against the (doctor_id, date) unique constraint, making the
//! read-through materialization idempotent.

use async_trait::async_trait;
use chrono::NaiveDate;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::availability::{DEFAULT_END_TIME, DEFAULT_START_TIME};
use crate::domain::ports::{AvailabilityPersistenceError, AvailabilityRepository};
use crate::domain::{AvailabilityDay, AvailabilityUpdate, UserId};

use super::diesel_helpers::{StorageErrorKind, classify_diesel_error, classify_pool_error};
use super::models::{AvailabilityRow, NewAvailabilityRow};
use super::pool::{DbPool, PoolError};
use super::schema::doctor_availability;

/// Diesel-backed implementation of the `AvailabilityRepository` port.
#[derive(Clone)]
pub struct DieselAvailabilityRepository {
    pool: DbPool,
}

impl DieselAvailabilityRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> AvailabilityPersistenceError {
    match classify_pool_error(error) {
        StorageErrorKind::Connection(message) => {
            AvailabilityPersistenceError::connection(message)
        }
        StorageErrorKind::Query(message) => AvailabilityPersistenceError::query(message),
        StorageErrorKind::Duplicate => AvailabilityPersistenceError::query("database error"),
    }
}

fn map_diesel_error(error: diesel::result::Error) -> AvailabilityPersistenceError {
    match classify_diesel_error(error) {
        StorageErrorKind::Connection(message) => {
            AvailabilityPersistenceError::connection(message)
        }
        StorageErrorKind::Query(message) => AvailabilityPersistenceError::query(message),
        // Concurrent provisioning races are absorbed by ON CONFLICT.
        StorageErrorKind::Duplicate => AvailabilityPersistenceError::query("database error"),
    }
}

fn row_to_day(row: AvailabilityRow) -> AvailabilityDay {
    AvailabilityDay {
        id: row.id,
        doctor_id: UserId::from_uuid(row.doctor_id),
        date: row.date,
        start_time: row.start_time,
        end_time: row.end_time,
        is_available: row.is_available,
    }
}

#[async_trait]
impl AvailabilityRepository for DieselAvailabilityRepository {
    async fn provision_defaults(
        &self,
        doctor_id: UserId,
        dates: &[NaiveDate],
    ) -> Result<(), AvailabilityPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let defaults: Vec<NewAvailabilityRow<'_>> = dates
            .iter()
            .map(|date| NewAvailabilityRow {
                id: Uuid::new_v4(),
                doctor_id: *doctor_id.as_uuid(),
                date: *date,
                start_time: DEFAULT_START_TIME,
                end_time: DEFAULT_END_TIME,
                is_available: false,
            })
            .collect();

        diesel::insert_into(doctor_availability::table)
            .values(&defaults)
            .on_conflict_do_nothing()
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn list_for_dates(
        &self,
        doctor_id: UserId,
        dates: &[NaiveDate],
    ) -> Result<Vec<AvailabilityDay>, AvailabilityPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<AvailabilityRow> = doctor_availability::table
            .filter(
                doctor_availability::doctor_id
                    .eq(doctor_id.as_uuid())
                    .and(doctor_availability::date.eq_any(dates)),
            )
            .order(doctor_availability::date.asc())
            .select(AvailabilityRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(rows.into_iter().map(row_to_day).collect())
    }

    async fn find_available_day(
        &self,
        doctor_id: UserId,
        date: NaiveDate,
    ) -> Result<Option<AvailabilityDay>, AvailabilityPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<AvailabilityRow> = doctor_availability::table
            .filter(
                doctor_availability::doctor_id
                    .eq(doctor_id.as_uuid())
                    .and(doctor_availability::date.eq(date))
                    .and(doctor_availability::is_available.eq(true)),
            )
            .select(AvailabilityRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(row.map(row_to_day))
    }

    async fn apply_updates(
        &self,
        doctor_id: UserId,
        updates: &[AvailabilityUpdate],
    ) -> Result<(), AvailabilityPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let doctor_uuid = *doctor_id.as_uuid();

        conn.transaction::<(), diesel::result::Error, _>(|conn| {
            async move {
                for update in updates {
                    // Rows owned by other doctors simply match nothing.
                    diesel::update(
                        doctor_availability::table.filter(
                            doctor_availability::id
                                .eq(update.id)
                                .and(doctor_availability::doctor_id.eq(doctor_uuid)),
                        ),
                    )
                    .set((
                        doctor_availability::start_time.eq(&update.start_time),
                        doctor_availability::end_time.eq(&update.end_time),
                        doctor_availability::is_available.eq(update.is_available),
                    ))
                    .execute(conn)
                    .await?;
                }
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }
}
