//! PostgreSQL-backed `TreatmentRepository` implementation using Diesel.
//!
//! Completion runs in one transaction: the treatment upsert (keyed by the
//! unique appointment reference) and the status flip either both commit or
//! both roll back.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{TreatmentPersistenceError, TreatmentRepository};
use crate::domain::{AppointmentStatus, Treatment, TreatmentDraft};

use super::diesel_helpers::{StorageErrorKind, classify_diesel_error, classify_pool_error};
use super::models::{NewTreatmentRow, TreatmentRow};
use super::pool::{DbPool, PoolError};
use super::schema::{appointments, treatments};

/// Diesel-backed implementation of the `TreatmentRepository` port.
#[derive(Clone)]
pub struct DieselTreatmentRepository {
    pool: DbPool,
}

impl DieselTreatmentRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> TreatmentPersistenceError {
    match classify_pool_error(error) {
        StorageErrorKind::Connection(message) => TreatmentPersistenceError::connection(message),
        StorageErrorKind::Query(message) => TreatmentPersistenceError::query(message),
        StorageErrorKind::Duplicate => TreatmentPersistenceError::query("database error"),
    }
}

fn map_diesel_error(error: diesel::result::Error) -> TreatmentPersistenceError {
    match classify_diesel_error(error) {
        StorageErrorKind::Connection(message) => TreatmentPersistenceError::connection(message),
        StorageErrorKind::Query(message) => TreatmentPersistenceError::query(message),
        // The upsert below absorbs the appointment_id uniqueness constraint.
        StorageErrorKind::Duplicate => TreatmentPersistenceError::query("database error"),
    }
}

fn row_to_treatment(row: TreatmentRow) -> Treatment {
    Treatment {
        id: row.id,
        appointment_id: row.appointment_id,
        diagnosis: row.diagnosis,
        prescription: row.prescription,
        follow_up_date: row.follow_up_date,
        notes: row.notes,
        created_at: row.created_at,
    }
}

#[async_trait]
impl TreatmentRepository for DieselTreatmentRepository {
    async fn complete_appointment(
        &self,
        appointment_id: Uuid,
        draft: &TreatmentDraft,
    ) -> Result<Treatment, TreatmentPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = conn
            .transaction::<TreatmentRow, diesel::result::Error, _>(|conn| {
                async move {
                    let new_row = NewTreatmentRow {
                        id: Uuid::new_v4(),
                        appointment_id,
                        diagnosis: &draft.diagnosis,
                        prescription: &draft.prescription,
                        follow_up_date: draft.follow_up_date.as_deref(),
                        notes: draft.notes.as_deref(),
                    };

                    // Repeat completions overwrite the existing record in
                    // place; the original row keeps its id and timestamp.
                    let row: TreatmentRow = diesel::insert_into(treatments::table)
                        .values(&new_row)
                        .on_conflict(treatments::appointment_id)
                        .do_update()
                        .set((
                            treatments::diagnosis.eq(&draft.diagnosis),
                            treatments::prescription.eq(&draft.prescription),
                            treatments::follow_up_date.eq(draft.follow_up_date.as_deref()),
                            treatments::notes.eq(draft.notes.as_deref()),
                        ))
                        .returning(TreatmentRow::as_returning())
                        .get_result(conn)
                        .await?;

                    diesel::update(
                        appointments::table.filter(appointments::id.eq(appointment_id)),
                    )
                    .set(appointments::status.eq(AppointmentStatus::Completed.as_str()))
                    .execute(conn)
                    .await?;

                    Ok(row)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        Ok(row_to_treatment(row))
    }

    async fn find_by_appointment(
        &self,
        appointment_id: Uuid,
    ) -> Result<Option<Treatment>, TreatmentPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<TreatmentRow> = treatments::table
            .filter(treatments::appointment_id.eq(appointment_id))
            .select(TreatmentRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(row.map(row_to_treatment))
    }
}
