//! Scheduling: weekly availability, bookable-slot computation, booking
//! admission, cancellation, and completion.
//!
//! The booking path relies on the appointment repository's atomic
//! conditional insert, so two concurrent requests for the same slot can
//! never both succeed.

use std::cmp::Reverse;
use std::sync::Arc;

use chrono::{Days, NaiveDate};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::Error;
use crate::domain::appointment::{Appointment, AppointmentStatus, BookingRequest};
use crate::domain::availability::{AvailabilityDay, AvailabilityUpdate};
use crate::domain::ports::{
    AppointmentOwner, AppointmentPersistenceError, AppointmentRepository,
    AvailabilityPersistenceError, AvailabilityRepository, Clock, TreatmentPersistenceError,
    TreatmentRepository,
};
use crate::domain::slots::{SLOT_INTERVAL_MINUTES, generate_time_slots};
use crate::domain::treatment::{Treatment, TreatmentDraft};
use crate::domain::user::UserId;

/// Length of the rolling scheduling window, in days.
pub const SCHEDULE_WINDOW_DAYS: u64 = 7;

fn map_appointment_repo_error(error: AppointmentPersistenceError) -> Error {
    match error {
        AppointmentPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("appointment repository unavailable: {message}"))
        }
        AppointmentPersistenceError::Query { message } => {
            Error::internal(format!("appointment repository error: {message}"))
        }
    }
}

fn map_availability_repo_error(error: AvailabilityPersistenceError) -> Error {
    match error {
        AvailabilityPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("availability repository unavailable: {message}"))
        }
        AvailabilityPersistenceError::Query { message } => {
            Error::internal(format!("availability repository error: {message}"))
        }
    }
}

fn map_treatment_repo_error(error: TreatmentPersistenceError) -> Error {
    match error {
        TreatmentPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("treatment repository unavailable: {message}"))
        }
        TreatmentPersistenceError::Query { message } => {
            Error::internal(format!("treatment repository error: {message}"))
        }
    }
}

fn day_name(date: NaiveDate) -> String {
    date.format("%A").to_string()
}

/// One entry of a doctor's weekly schedule view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleDay {
    /// Weekday name, e.g. `Monday`.
    pub day_name: String,
    /// The underlying availability record.
    pub day: AvailabilityDay,
}

/// Remaining bookable slots for one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DaySlots {
    /// Calendar date.
    pub date: NaiveDate,
    /// Weekday name, e.g. `Monday`.
    pub day_name: String,
    /// Open `HH:MM` slots, earliest first.
    pub slots: Vec<String>,
}

/// A caller's appointments split around "now".
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentsOverview {
    /// Booked appointments dated today or later, earliest first.
    pub upcoming: Vec<Appointment>,
    /// Everything else, latest first.
    pub past: Vec<Appointment>,
}

/// Scheduling service over the appointment, availability, and treatment
/// ports.
#[derive(Clone)]
pub struct SchedulingService {
    appointments: Arc<dyn AppointmentRepository>,
    availability: Arc<dyn AvailabilityRepository>,
    treatments: Arc<dyn TreatmentRepository>,
    clock: Arc<dyn Clock>,
}

impl SchedulingService {
    /// Create a new service over the given ports.
    pub fn new(
        appointments: Arc<dyn AppointmentRepository>,
        availability: Arc<dyn AvailabilityRepository>,
        treatments: Arc<dyn TreatmentRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            appointments,
            availability,
            treatments,
            clock,
        }
    }

    fn window_dates(&self) -> Vec<NaiveDate> {
        let today = self.clock.today();
        (0..SCHEDULE_WINDOW_DAYS)
            .filter_map(|offset| today.checked_add_days(Days::new(offset)))
            .collect()
    }

    /// A doctor's weekly schedule, provisioning default day records where
    /// absent.
    ///
    /// The provisioning upsert is idempotent: repeat views neither duplicate
    /// rows nor touch settings the doctor already changed.
    pub async fn weekly_schedule(&self, doctor_id: UserId) -> Result<Vec<ScheduleDay>, Error> {
        let dates = self.window_dates();
        self.availability
            .provision_defaults(doctor_id, &dates)
            .await
            .map_err(map_availability_repo_error)?;

        let days = self
            .availability
            .list_for_dates(doctor_id, &dates)
            .await
            .map_err(map_availability_repo_error)?;

        Ok(days
            .into_iter()
            .map(|day| ScheduleDay {
                day_name: day_name(day.date),
                day,
            })
            .collect())
    }

    /// Apply a doctor's batch availability update.
    pub async fn update_availability(
        &self,
        doctor_id: UserId,
        updates: &[AvailabilityUpdate],
    ) -> Result<(), Error> {
        self.availability
            .apply_updates(doctor_id, updates)
            .await
            .map_err(map_availability_repo_error)
    }

    /// Remaining bookable slots for a doctor over the scheduling window.
    ///
    /// Dates the doctor has not opted into are skipped; slots matching any
    /// existing appointment are removed regardless of that appointment's
    /// status, so a cancelled booking still blocks its slot. Dates with no
    /// remaining slots are omitted.
    pub async fn bookable_slots(&self, doctor_id: UserId) -> Result<Vec<DaySlots>, Error> {
        let mut open_days = Vec::new();
        for date in self.window_dates() {
            let Some(day) = self
                .availability
                .find_available_day(doctor_id, date)
                .await
                .map_err(map_availability_repo_error)?
            else {
                continue;
            };

            let taken = self
                .appointments
                .booked_times(doctor_id, date)
                .await
                .map_err(map_appointment_repo_error)?;

            let slots: Vec<String> =
                generate_time_slots(&day.start_time, &day.end_time, SLOT_INTERVAL_MINUTES)
                    .into_iter()
                    .filter(|slot| !taken.contains(slot))
                    .collect();

            if !slots.is_empty() {
                open_days.push(DaySlots {
                    date,
                    day_name: day_name(date),
                    slots,
                });
            }
        }
        Ok(open_days)
    }

    /// Admit a booking request.
    ///
    /// The slot-taken check and the insert are one atomic statement in the
    /// adapter; a lost race surfaces as the same conflict as a plainly taken
    /// slot.
    pub async fn book(&self, request: BookingRequest) -> Result<Appointment, Error> {
        self.appointments
            .insert_if_slot_free(&request)
            .await
            .map_err(map_appointment_repo_error)?
            .ok_or_else(|| Error::conflict("this time slot is already booked"))
    }

    /// Cancel a Booked appointment on behalf of its owner.
    ///
    /// A non-owned, absent, or non-Booked appointment fails with the same
    /// not-found error; callers cannot distinguish "already cancelled" from
    /// "never existed".
    pub async fn cancel(&self, id: Uuid, owner: AppointmentOwner) -> Result<(), Error> {
        let cancelled = self
            .appointments
            .cancel_booked(id, owner)
            .await
            .map_err(map_appointment_repo_error)?;
        if cancelled {
            Ok(())
        } else {
            Err(Error::not_found("appointment not found"))
        }
    }

    /// Record a treatment and mark the appointment Completed (doctor
    /// operation, owner only).
    ///
    /// Idempotent on repeat submission: the treatment is overwritten in
    /// place. The status flip deliberately ignores prior status.
    pub async fn complete(
        &self,
        doctor_id: UserId,
        appointment_id: Uuid,
        draft: TreatmentDraft,
    ) -> Result<Treatment, Error> {
        self.appointments
            .find_owned(appointment_id, AppointmentOwner::Doctor(doctor_id))
            .await
            .map_err(map_appointment_repo_error)?
            .ok_or_else(|| Error::not_found("appointment not found"))?;

        self.treatments
            .complete_appointment(appointment_id, &draft)
            .await
            .map_err(map_treatment_repo_error)
    }

    /// A doctor's appointments split into upcoming and past.
    pub async fn doctor_overview(&self, doctor_id: UserId) -> Result<AppointmentsOverview, Error> {
        let appointments = self
            .appointments
            .list_for_doctor(doctor_id)
            .await
            .map_err(map_appointment_repo_error)?;
        Ok(self.partition(appointments))
    }

    /// A patient's appointments split into upcoming and past.
    pub async fn patient_overview(
        &self,
        patient_id: UserId,
    ) -> Result<AppointmentsOverview, Error> {
        let appointments = self
            .appointments
            .list_for_patient(patient_id)
            .await
            .map_err(map_appointment_repo_error)?;
        Ok(self.partition(appointments))
    }

    /// A patient's Completed appointments, newest first.
    pub async fn patient_history(&self, patient_id: UserId) -> Result<Vec<Appointment>, Error> {
        self.appointments
            .list_completed_for_patient(patient_id)
            .await
            .map_err(map_appointment_repo_error)
    }

    /// Details of a patient's own appointment; Completed appointments only.
    pub async fn patient_appointment_details(
        &self,
        id: Uuid,
        patient_id: UserId,
    ) -> Result<(Appointment, Option<Treatment>), Error> {
        let appointment = self
            .appointments
            .find_owned(id, AppointmentOwner::Patient(patient_id))
            .await
            .map_err(map_appointment_repo_error)?
            .ok_or_else(|| Error::not_found("appointment not found"))?;

        if appointment.status != AppointmentStatus::Completed {
            return Err(Error::invalid_request(
                "details are only available for completed appointments",
            ));
        }

        let treatment = self
            .treatments
            .find_by_appointment(id)
            .await
            .map_err(map_treatment_repo_error)?;
        Ok((appointment, treatment))
    }

    /// Details of any appointment for the admin; Completed only, and the
    /// treatment must exist.
    pub async fn admin_appointment_details(
        &self,
        id: Uuid,
    ) -> Result<(Appointment, Treatment), Error> {
        let appointment = self
            .appointments
            .find_by_id(id)
            .await
            .map_err(map_appointment_repo_error)?
            .ok_or_else(|| Error::not_found("appointment not found"))?;

        if appointment.status != AppointmentStatus::Completed {
            return Err(Error::invalid_request(
                "details are only available for completed appointments",
            ));
        }

        let treatment = self
            .treatments
            .find_by_appointment(id)
            .await
            .map_err(map_treatment_repo_error)?
            .ok_or_else(|| Error::not_found("no treatment details were found"))?;
        Ok((appointment, treatment))
    }

    /// All appointments, newest first (admin dashboard).
    pub async fn list_all_appointments(&self) -> Result<Vec<Appointment>, Error> {
        self.appointments
            .list_all()
            .await
            .map_err(map_appointment_repo_error)
    }

    /// Total number of appointments (admin dashboard).
    pub async fn appointment_count(&self) -> Result<i64, Error> {
        self.appointments
            .count()
            .await
            .map_err(map_appointment_repo_error)
    }

    fn partition(&self, appointments: Vec<Appointment>) -> AppointmentsOverview {
        let today = self.clock.today();
        let (mut upcoming, mut past): (Vec<Appointment>, Vec<Appointment>) =
            appointments.into_iter().partition(|appointment| {
                appointment.status == AppointmentStatus::Booked && appointment.date >= today
            });

        upcoming.sort_by(|a, b| (a.date, &a.time).cmp(&(b.date, &b.time)));
        past.sort_by_key(|appointment| Reverse((appointment.date, appointment.time.clone())));

        AppointmentsOverview { upcoming, past }
    }
}

#[cfg(test)]
#[path = "scheduling_service_tests.rs"]
mod tests;
