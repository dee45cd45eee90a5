//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the migrations exactly; Diesel uses them for
//! compile-time query validation and type-safe SQL generation. Regenerate
//! with `diesel print-schema` when the migrations change.

diesel::table! {
    /// Clinic departments.
    departments (id) {
        /// Primary key.
        id -> Uuid,
        /// Unique department name.
        name -> Varchar,
        /// Free-text description.
        description -> Nullable<Text>,
    }
}

diesel::table! {
    /// User accounts for every role.
    users (id) {
        /// Primary key.
        id -> Uuid,
        /// Display name.
        name -> Varchar,
        /// Unique login email, stored lowercased.
        email -> Varchar,
        /// Argon2 PHC hash of the password.
        password_hash -> Varchar,
        /// Role discriminator: admin, doctor, or patient.
        role -> Varchar,
        /// Whether the account may log in.
        active -> Bool,
        /// Department reference; doctors only.
        department_id -> Nullable<Uuid>,
        /// Patient demographic: age in years.
        age -> Nullable<Int4>,
        /// Patient demographic: gender.
        gender -> Nullable<Varchar>,
        /// Patient demographic: contact number.
        contact_number -> Nullable<Varchar>,
        /// Patient demographic: address.
        address -> Nullable<Varchar>,
        /// Record creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Appointments; unique over (doctor_id, date, time).
    appointments (id) {
        /// Primary key.
        id -> Uuid,
        /// Patient holding the appointment.
        patient_id -> Uuid,
        /// Doctor seeing the patient.
        doctor_id -> Uuid,
        /// Calendar date of the visit.
        date -> Date,
        /// Time-of-day slot in HH:MM form.
        time -> Varchar,
        /// Lifecycle status: Booked, Completed, or Cancelled.
        status -> Varchar,
        /// Booking timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Treatment records; at most one per appointment.
    treatments (id) {
        /// Primary key.
        id -> Uuid,
        /// Unique appointment reference.
        appointment_id -> Uuid,
        /// Diagnosis text.
        diagnosis -> Text,
        /// Prescription text.
        prescription -> Text,
        /// Optional follow-up date.
        follow_up_date -> Nullable<Varchar>,
        /// Optional free-text notes.
        notes -> Nullable<Text>,
        /// Record creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Per-day doctor availability; unique over (doctor_id, date).
    doctor_availability (id) {
        /// Primary key.
        id -> Uuid,
        /// Doctor owning this window.
        doctor_id -> Uuid,
        /// Calendar date this window applies to.
        date -> Date,
        /// Working window start, HH:MM.
        start_time -> Varchar,
        /// Working window end, HH:MM.
        end_time -> Varchar,
        /// Whether the doctor takes bookings on this date.
        is_available -> Bool,
    }
}

diesel::joinable!(users -> departments (department_id));
diesel::joinable!(treatments -> appointments (appointment_id));

diesel::allow_tables_to_appear_in_same_query!(
    appointments,
    departments,
    doctor_availability,
    treatments,
    users,
);
