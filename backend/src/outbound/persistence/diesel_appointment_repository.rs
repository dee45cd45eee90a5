//! PostgreSQL-backed `AppointmentRepository` implementation using Diesel.
//!
//! Booking admission is a single `INSERT .. ON CONFLICT DO NOTHING` against
//! the (doctor_id, date, time) unique constraint, so two concurrent requests
//! for the same slot cannot both insert.

use async_trait::async_trait;
use chrono::NaiveDate;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{
    AppointmentOwner, AppointmentPersistenceError, AppointmentRepository,
};
use crate::domain::{Appointment, AppointmentStatus, BookingRequest, UserId};

use super::diesel_helpers::{StorageErrorKind, classify_diesel_error, classify_pool_error};
use super::models::{AppointmentRow, NewAppointmentRow};
use super::pool::{DbPool, PoolError};
use super::schema::appointments;

/// Diesel-backed implementation of the `AppointmentRepository` port.
#[derive(Clone)]
pub struct DieselAppointmentRepository {
    pool: DbPool,
}

impl DieselAppointmentRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> AppointmentPersistenceError {
    match classify_pool_error(error) {
        StorageErrorKind::Connection(message) => AppointmentPersistenceError::connection(message),
        StorageErrorKind::Query(message) => AppointmentPersistenceError::query(message),
        StorageErrorKind::Duplicate => AppointmentPersistenceError::query("database error"),
    }
}

fn map_diesel_error(error: diesel::result::Error) -> AppointmentPersistenceError {
    match classify_diesel_error(error) {
        StorageErrorKind::Connection(message) => AppointmentPersistenceError::connection(message),
        StorageErrorKind::Query(message) => AppointmentPersistenceError::query(message),
        // Slot conflicts are handled by ON CONFLICT DO NOTHING, so a stray
        // unique violation here is an ordinary query failure.
        StorageErrorKind::Duplicate => AppointmentPersistenceError::query("database error"),
    }
}

pub(crate) fn row_to_appointment(
    row: AppointmentRow,
) -> Result<Appointment, AppointmentPersistenceError> {
    let status = AppointmentStatus::parse(&row.status).ok_or_else(|| {
        AppointmentPersistenceError::query(format!("unrecognized status: {}", row.status))
    })?;

    Ok(Appointment {
        id: row.id,
        patient_id: UserId::from_uuid(row.patient_id),
        doctor_id: UserId::from_uuid(row.doctor_id),
        date: row.date,
        time: row.time,
        status,
        created_at: row.created_at,
    })
}

#[async_trait]
impl AppointmentRepository for DieselAppointmentRepository {
    async fn insert_if_slot_free(
        &self,
        booking: &BookingRequest,
    ) -> Result<Option<Appointment>, AppointmentPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewAppointmentRow {
            id: Uuid::new_v4(),
            patient_id: *booking.patient_id.as_uuid(),
            doctor_id: *booking.doctor_id.as_uuid(),
            date: booking.date,
            time: &booking.time,
            status: AppointmentStatus::Booked.as_str(),
        };

        let row: Option<AppointmentRow> = diesel::insert_into(appointments::table)
            .values(&new_row)
            .on_conflict_do_nothing()
            .returning(AppointmentRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_appointment).transpose()
    }

    async fn booked_times(
        &self,
        doctor_id: UserId,
        date: NaiveDate,
    ) -> Result<Vec<String>, AppointmentPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        appointments::table
            .filter(
                appointments::doctor_id
                    .eq(doctor_id.as_uuid())
                    .and(appointments::date.eq(date)),
            )
            .select(appointments::time)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)
    }

    async fn list_for_doctor(
        &self,
        doctor_id: UserId,
    ) -> Result<Vec<Appointment>, AppointmentPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<AppointmentRow> = appointments::table
            .filter(appointments::doctor_id.eq(doctor_id.as_uuid()))
            .select(AppointmentRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_appointment).collect()
    }

    async fn list_for_patient(
        &self,
        patient_id: UserId,
    ) -> Result<Vec<Appointment>, AppointmentPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<AppointmentRow> = appointments::table
            .filter(appointments::patient_id.eq(patient_id.as_uuid()))
            .select(AppointmentRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_appointment).collect()
    }

    async fn list_all(&self) -> Result<Vec<Appointment>, AppointmentPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<AppointmentRow> = appointments::table
            .order(appointments::created_at.desc())
            .select(AppointmentRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_appointment).collect()
    }

    async fn count(&self) -> Result<i64, AppointmentPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        appointments::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)
    }

    async fn find_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<Appointment>, AppointmentPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<AppointmentRow> = appointments::table
            .filter(appointments::id.eq(id))
            .select(AppointmentRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_appointment).transpose()
    }

    async fn find_owned(
        &self,
        id: Uuid,
        owner: AppointmentOwner,
    ) -> Result<Option<Appointment>, AppointmentPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut query = appointments::table
            .filter(appointments::id.eq(id))
            .into_boxed();
        query = match owner {
            AppointmentOwner::Doctor(doctor_id) => {
                query.filter(appointments::doctor_id.eq(*doctor_id.as_uuid()))
            }
            AppointmentOwner::Patient(patient_id) => {
                query.filter(appointments::patient_id.eq(*patient_id.as_uuid()))
            }
        };

        let row: Option<AppointmentRow> = query
            .select(AppointmentRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_appointment).transpose()
    }

    async fn cancel_booked(
        &self,
        id: Uuid,
        owner: AppointmentOwner,
    ) -> Result<bool, AppointmentPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let base = appointments::table.filter(
            appointments::id
                .eq(id)
                .and(appointments::status.eq(AppointmentStatus::Booked.as_str())),
        );

        let updated = match owner {
            AppointmentOwner::Doctor(doctor_id) => {
                diesel::update(base.filter(appointments::doctor_id.eq(*doctor_id.as_uuid())))
                    .set(appointments::status.eq(AppointmentStatus::Cancelled.as_str()))
                    .execute(&mut conn)
                    .await
            }
            AppointmentOwner::Patient(patient_id) => {
                diesel::update(base.filter(appointments::patient_id.eq(*patient_id.as_uuid())))
                    .set(appointments::status.eq(AppointmentStatus::Cancelled.as_str()))
                    .execute(&mut conn)
                    .await
            }
        }
        .map_err(map_diesel_error)?;

        Ok(updated > 0)
    }

    async fn list_completed_for_patient(
        &self,
        patient_id: UserId,
    ) -> Result<Vec<Appointment>, AppointmentPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<AppointmentRow> = appointments::table
            .filter(
                appointments::patient_id
                    .eq(patient_id.as_uuid())
                    .and(appointments::status.eq(AppointmentStatus::Completed.as_str())),
            )
            .order((appointments::date.desc(), appointments::time.desc()))
            .select(AppointmentRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_appointment).collect()
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use chrono::Utc;

    fn sample_row(status: &str) -> AppointmentRow {
        AppointmentRow {
            id: Uuid::new_v4(),
            patient_id: Uuid::new_v4(),
            doctor_id: Uuid::new_v4(),
            date: "2026-03-02".parse().expect("valid date"),
            time: "09:00".to_owned(),
            status: status.to_owned(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn row_conversion_parses_status() {
        let appointment = row_to_appointment(sample_row("Booked")).expect("valid row converts");
        assert_eq!(appointment.status, AppointmentStatus::Booked);
        assert_eq!(appointment.time, "09:00");
    }

    #[test]
    fn row_conversion_rejects_unknown_status() {
        let err = row_to_appointment(sample_row("Pending")).expect_err("unknown status fails");
        assert!(matches!(err, AppointmentPersistenceError::Query { .. }));
    }
}
