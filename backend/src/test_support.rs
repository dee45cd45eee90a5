//! Shared in-memory port implementations for tests.
//!
//! These doubles mirror the invariants the PostgreSQL adapters enforce
//! (unique emails, unique slots, transactional completion) so service and
//! handler tests exercise realistic state transitions without a database.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::domain::availability::{DEFAULT_END_TIME, DEFAULT_START_TIME};
use crate::domain::ports::{
    AppointmentOwner, AppointmentPersistenceError, AppointmentRepository,
    AvailabilityPersistenceError, AvailabilityRepository, DepartmentPersistenceError,
    DepartmentRepository, NewUserRecord, StoredCredentials, TreatmentPersistenceError,
    TreatmentRepository, UserPersistenceError, UserRepository,
};
use crate::domain::{
    Appointment, AppointmentStatus, AvailabilityDay, AvailabilityUpdate, BookingRequest,
    Department, DoctorUpdate, EmailAddress, NewDepartment, PatientProfileUpdate, Role, Treatment,
    TreatmentDraft, User, UserId,
};

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// In-memory user store keyed by unique email.
#[derive(Default)]
pub struct InMemoryUsers {
    rows: Mutex<Vec<StoredCredentials>>,
}

impl InMemoryUsers {
    /// Direct read access for assertions.
    pub fn snapshot(&self) -> Vec<User> {
        self.rows
            .lock()
            .expect("users lock")
            .iter()
            .map(|stored| stored.user.clone())
            .collect()
    }
}

#[async_trait]
impl UserRepository for InMemoryUsers {
    async fn insert(&self, record: &NewUserRecord) -> Result<User, UserPersistenceError> {
        let mut rows = self.rows.lock().expect("users lock");
        if rows
            .iter()
            .any(|stored| stored.user.email == record.email)
        {
            return Err(UserPersistenceError::duplicate("email"));
        }
        let user = User {
            id: UserId::random(),
            name: record.name.clone(),
            email: record.email.clone(),
            role: record.role,
            active: record.active,
            department_id: record.department_id,
            age: record.age,
            gender: record.gender.clone(),
            contact_number: record.contact_number.clone(),
            address: record.address.clone(),
            created_at: Utc::now(),
        };
        rows.push(StoredCredentials {
            user: user.clone(),
            password_hash: record.password_hash.clone(),
        });
        Ok(user)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        let rows = self.rows.lock().expect("users lock");
        Ok(rows
            .iter()
            .find(|stored| stored.user.id == id)
            .map(|stored| stored.user.clone()))
    }

    async fn find_credentials(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<StoredCredentials>, UserPersistenceError> {
        let rows = self.rows.lock().expect("users lock");
        Ok(rows.iter().find(|stored| &stored.user.email == email).cloned())
    }

    async fn email_in_use(
        &self,
        email: &EmailAddress,
        exclude: Option<UserId>,
    ) -> Result<bool, UserPersistenceError> {
        let rows = self.rows.lock().expect("users lock");
        Ok(rows.iter().any(|stored| {
            &stored.user.email == email && Some(stored.user.id) != exclude
        }))
    }

    async fn update_doctor(
        &self,
        id: UserId,
        update: &DoctorUpdate,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut rows = self.rows.lock().expect("users lock");
        let Some(stored) = rows
            .iter_mut()
            .find(|stored| stored.user.id == id && stored.user.role == Role::Doctor)
        else {
            return Ok(None);
        };
        stored.user.name = update.name.clone();
        stored.user.email = update.email.clone();
        stored.user.department_id = Some(update.department_id);
        Ok(Some(stored.user.clone()))
    }

    async fn update_patient_profile(
        &self,
        id: UserId,
        update: &PatientProfileUpdate,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut rows = self.rows.lock().expect("users lock");
        let Some(stored) = rows
            .iter_mut()
            .find(|stored| stored.user.id == id && stored.user.role == Role::Patient)
        else {
            return Ok(None);
        };
        stored.user.name = update.name.clone();
        stored.user.age = update.age;
        stored.user.gender = update.gender.clone();
        stored.user.contact_number = update.contact_number.clone();
        stored.user.address = update.address.clone();
        Ok(Some(stored.user.clone()))
    }

    async fn set_active(
        &self,
        id: UserId,
        active: bool,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut rows = self.rows.lock().expect("users lock");
        let Some(stored) = rows.iter_mut().find(|stored| stored.user.id == id) else {
            return Ok(None);
        };
        stored.user.active = active;
        Ok(Some(stored.user.clone()))
    }

    async fn count_active_by_role(&self, role: Role) -> Result<i64, UserPersistenceError> {
        let rows = self.rows.lock().expect("users lock");
        let count = rows
            .iter()
            .filter(|stored| stored.user.role == role && stored.user.active)
            .count();
        Ok(i64::try_from(count).unwrap_or(i64::MAX))
    }

    async fn role_exists(&self, role: Role) -> Result<bool, UserPersistenceError> {
        let rows = self.rows.lock().expect("users lock");
        Ok(rows.iter().any(|stored| stored.user.role == role))
    }

    async fn find_active_doctor(
        &self,
        id: UserId,
    ) -> Result<Option<User>, UserPersistenceError> {
        let rows = self.rows.lock().expect("users lock");
        Ok(rows
            .iter()
            .find(|stored| {
                stored.user.id == id && stored.user.role == Role::Doctor && stored.user.active
            })
            .map(|stored| stored.user.clone()))
    }

    async fn search_patients<'a>(
        &self,
        search: Option<&'a str>,
    ) -> Result<Vec<User>, UserPersistenceError> {
        let rows = self.rows.lock().expect("users lock");
        let mut patients: Vec<User> = rows
            .iter()
            .filter(|stored| stored.user.role == Role::Patient)
            .filter(|stored| {
                search.is_none_or(|needle| {
                    contains_ci(&stored.user.name, needle)
                        || contains_ci(stored.user.email.as_ref(), needle)
                        || stored
                            .user
                            .contact_number
                            .as_deref()
                            .is_some_and(|number| contains_ci(number, needle))
                })
            })
            .map(|stored| stored.user.clone())
            .collect();
        patients.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(patients)
    }

    async fn search_doctors<'a>(
        &self,
        search: Option<&'a str>,
        active_only: bool,
    ) -> Result<Vec<User>, UserPersistenceError> {
        let rows = self.rows.lock().expect("users lock");
        let mut doctors: Vec<User> = rows
            .iter()
            .filter(|stored| stored.user.role == Role::Doctor)
            .filter(|stored| !active_only || stored.user.active)
            .filter(|stored| {
                search.is_none_or(|needle| {
                    contains_ci(&stored.user.name, needle)
                        || contains_ci(stored.user.email.as_ref(), needle)
                })
            })
            .map(|stored| stored.user.clone())
            .collect();
        doctors.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(doctors)
    }
}

/// In-memory department store keyed by unique name.
#[derive(Default)]
pub struct InMemoryDepartments {
    rows: Mutex<Vec<Department>>,
}

#[async_trait]
impl DepartmentRepository for InMemoryDepartments {
    async fn insert(
        &self,
        department: &NewDepartment,
    ) -> Result<Department, DepartmentPersistenceError> {
        let mut rows = self.rows.lock().expect("departments lock");
        if rows.iter().any(|existing| existing.name == department.name) {
            return Err(DepartmentPersistenceError::duplicate("name"));
        }
        let created = Department {
            id: Uuid::new_v4(),
            name: department.name.clone(),
            description: department.description.clone(),
        };
        rows.push(created.clone());
        Ok(created)
    }

    async fn list(&self) -> Result<Vec<Department>, DepartmentPersistenceError> {
        let rows = self.rows.lock().expect("departments lock");
        let mut listed = rows.clone();
        listed.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(listed)
    }

    async fn find_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<Department>, DepartmentPersistenceError> {
        let rows = self.rows.lock().expect("departments lock");
        Ok(rows.iter().find(|department| department.id == id).cloned())
    }
}

/// In-memory availability store keyed by unique (doctor, date).
#[derive(Default)]
pub struct InMemoryAvailability {
    /// Stored day records; exposed for assertions.
    pub days: Mutex<Vec<AvailabilityDay>>,
}

#[async_trait]
impl AvailabilityRepository for InMemoryAvailability {
    async fn provision_defaults(
        &self,
        doctor_id: UserId,
        dates: &[NaiveDate],
    ) -> Result<(), AvailabilityPersistenceError> {
        let mut days = self.days.lock().expect("availability lock");
        for date in dates {
            let exists = days
                .iter()
                .any(|day| day.doctor_id == doctor_id && day.date == *date);
            if !exists {
                days.push(AvailabilityDay {
                    id: Uuid::new_v4(),
                    doctor_id,
                    date: *date,
                    start_time: DEFAULT_START_TIME.to_owned(),
                    end_time: DEFAULT_END_TIME.to_owned(),
                    is_available: false,
                });
            }
        }
        Ok(())
    }

    async fn list_for_dates(
        &self,
        doctor_id: UserId,
        dates: &[NaiveDate],
    ) -> Result<Vec<AvailabilityDay>, AvailabilityPersistenceError> {
        let days = self.days.lock().expect("availability lock");
        let mut found: Vec<AvailabilityDay> = days
            .iter()
            .filter(|day| day.doctor_id == doctor_id && dates.contains(&day.date))
            .cloned()
            .collect();
        found.sort_by_key(|day| day.date);
        Ok(found)
    }

    async fn find_available_day(
        &self,
        doctor_id: UserId,
        date: NaiveDate,
    ) -> Result<Option<AvailabilityDay>, AvailabilityPersistenceError> {
        let days = self.days.lock().expect("availability lock");
        Ok(days
            .iter()
            .find(|day| day.doctor_id == doctor_id && day.date == date && day.is_available)
            .cloned())
    }

    async fn apply_updates(
        &self,
        doctor_id: UserId,
        updates: &[AvailabilityUpdate],
    ) -> Result<(), AvailabilityPersistenceError> {
        let mut days = self.days.lock().expect("availability lock");
        for update in updates {
            if let Some(day) = days
                .iter_mut()
                .find(|day| day.id == update.id && day.doctor_id == doctor_id)
            {
                day.start_time = update.start_time.clone();
                day.end_time = update.end_time.clone();
                day.is_available = update.is_available;
            }
        }
        Ok(())
    }
}

/// Appointment and treatment store sharing one set of rows, mirroring the
/// transactional coupling of the real adapters.
#[derive(Default)]
pub struct InMemoryLedger {
    appointments: Mutex<Vec<Appointment>>,
    treatments: Mutex<Vec<Treatment>>,
}

impl InMemoryLedger {
    /// Fetch one appointment for assertions.
    pub fn appointment(&self, id: Uuid) -> Option<Appointment> {
        self.appointments
            .lock()
            .expect("appointments lock")
            .iter()
            .find(|appointment| appointment.id == id)
            .cloned()
    }

    /// Number of stored appointment rows.
    pub fn appointment_rows(&self) -> usize {
        self.appointments.lock().expect("appointments lock").len()
    }

    /// Number of stored treatment rows.
    pub fn treatment_rows(&self) -> usize {
        self.treatments.lock().expect("treatments lock").len()
    }
}

fn owner_matches(appointment: &Appointment, owner: AppointmentOwner) -> bool {
    match owner {
        AppointmentOwner::Doctor(id) => appointment.doctor_id == id,
        AppointmentOwner::Patient(id) => appointment.patient_id == id,
    }
}

#[async_trait]
impl AppointmentRepository for InMemoryLedger {
    async fn insert_if_slot_free(
        &self,
        booking: &BookingRequest,
    ) -> Result<Option<Appointment>, AppointmentPersistenceError> {
        let mut appointments = self.appointments.lock().expect("appointments lock");
        let taken = appointments.iter().any(|appointment| {
            appointment.doctor_id == booking.doctor_id
                && appointment.date == booking.date
                && appointment.time == booking.time
        });
        if taken {
            return Ok(None);
        }
        let appointment = Appointment {
            id: Uuid::new_v4(),
            patient_id: booking.patient_id,
            doctor_id: booking.doctor_id,
            date: booking.date,
            time: booking.time.clone(),
            status: AppointmentStatus::Booked,
            created_at: Utc::now(),
        };
        appointments.push(appointment.clone());
        Ok(Some(appointment))
    }

    async fn booked_times(
        &self,
        doctor_id: UserId,
        date: NaiveDate,
    ) -> Result<Vec<String>, AppointmentPersistenceError> {
        let appointments = self.appointments.lock().expect("appointments lock");
        Ok(appointments
            .iter()
            .filter(|appointment| appointment.doctor_id == doctor_id && appointment.date == date)
            .map(|appointment| appointment.time.clone())
            .collect())
    }

    async fn list_for_doctor(
        &self,
        doctor_id: UserId,
    ) -> Result<Vec<Appointment>, AppointmentPersistenceError> {
        let appointments = self.appointments.lock().expect("appointments lock");
        Ok(appointments
            .iter()
            .filter(|appointment| appointment.doctor_id == doctor_id)
            .cloned()
            .collect())
    }

    async fn list_for_patient(
        &self,
        patient_id: UserId,
    ) -> Result<Vec<Appointment>, AppointmentPersistenceError> {
        let appointments = self.appointments.lock().expect("appointments lock");
        Ok(appointments
            .iter()
            .filter(|appointment| appointment.patient_id == patient_id)
            .cloned()
            .collect())
    }

    async fn list_all(&self) -> Result<Vec<Appointment>, AppointmentPersistenceError> {
        let appointments = self.appointments.lock().expect("appointments lock");
        Ok(appointments.iter().rev().cloned().collect())
    }

    async fn count(&self) -> Result<i64, AppointmentPersistenceError> {
        Ok(i64::try_from(self.appointment_rows()).unwrap_or(i64::MAX))
    }

    async fn find_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<Appointment>, AppointmentPersistenceError> {
        Ok(self.appointment(id))
    }

    async fn find_owned(
        &self,
        id: Uuid,
        owner: AppointmentOwner,
    ) -> Result<Option<Appointment>, AppointmentPersistenceError> {
        Ok(self
            .appointment(id)
            .filter(|appointment| owner_matches(appointment, owner)))
    }

    async fn cancel_booked(
        &self,
        id: Uuid,
        owner: AppointmentOwner,
    ) -> Result<bool, AppointmentPersistenceError> {
        let mut appointments = self.appointments.lock().expect("appointments lock");
        let Some(appointment) = appointments.iter_mut().find(|appointment| {
            appointment.id == id
                && owner_matches(appointment, owner)
                && appointment.status == AppointmentStatus::Booked
        }) else {
            return Ok(false);
        };
        appointment.status = AppointmentStatus::Cancelled;
        Ok(true)
    }

    async fn list_completed_for_patient(
        &self,
        patient_id: UserId,
    ) -> Result<Vec<Appointment>, AppointmentPersistenceError> {
        let appointments = self.appointments.lock().expect("appointments lock");
        let mut completed: Vec<Appointment> = appointments
            .iter()
            .filter(|appointment| {
                appointment.patient_id == patient_id
                    && appointment.status == AppointmentStatus::Completed
            })
            .cloned()
            .collect();
        completed.sort_by_key(|appointment| {
            std::cmp::Reverse((appointment.date, appointment.time.clone()))
        });
        Ok(completed)
    }
}

#[async_trait]
impl TreatmentRepository for InMemoryLedger {
    async fn complete_appointment(
        &self,
        appointment_id: Uuid,
        draft: &TreatmentDraft,
    ) -> Result<Treatment, TreatmentPersistenceError> {
        let mut treatments = self.treatments.lock().expect("treatments lock");
        let treatment = if let Some(existing) = treatments
            .iter_mut()
            .find(|treatment| treatment.appointment_id == appointment_id)
        {
            existing.diagnosis = draft.diagnosis.clone();
            existing.prescription = draft.prescription.clone();
            existing.follow_up_date = draft.follow_up_date.clone();
            existing.notes = draft.notes.clone();
            existing.clone()
        } else {
            let created = Treatment {
                id: Uuid::new_v4(),
                appointment_id,
                diagnosis: draft.diagnosis.clone(),
                prescription: draft.prescription.clone(),
                follow_up_date: draft.follow_up_date.clone(),
                notes: draft.notes.clone(),
                created_at: Utc::now(),
            };
            treatments.push(created.clone());
            created
        };

        let mut appointments = self.appointments.lock().expect("appointments lock");
        if let Some(appointment) = appointments
            .iter_mut()
            .find(|appointment| appointment.id == appointment_id)
        {
            appointment.status = AppointmentStatus::Completed;
        }
        Ok(treatment)
    }

    async fn find_by_appointment(
        &self,
        appointment_id: Uuid,
    ) -> Result<Option<Treatment>, TreatmentPersistenceError> {
        let treatments = self.treatments.lock().expect("treatments lock");
        Ok(treatments
            .iter()
            .find(|treatment| treatment.appointment_id == appointment_id)
            .cloned())
    }
}
