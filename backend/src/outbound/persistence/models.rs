//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Conversions into domain types live beside
//! the repository that loads them.

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{appointments, departments, doctor_availability, treatments, users};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub active: bool,
    pub department_id: Option<Uuid>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub contact_number: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for creating new user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub role: &'a str,
    pub active: bool,
    pub department_id: Option<Uuid>,
    pub age: Option<i32>,
    pub gender: Option<&'a str>,
    pub contact_number: Option<&'a str>,
    pub address: Option<&'a str>,
}

/// Row struct for reading from the departments table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = departments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct DepartmentRow {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
}

/// Insertable struct for creating new department records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = departments)]
pub(crate) struct NewDepartmentRow<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub description: Option<&'a str>,
}

/// Row struct for reading from the appointments table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = appointments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AppointmentRow {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub date: NaiveDate,
    pub time: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for creating new appointment records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = appointments)]
pub(crate) struct NewAppointmentRow<'a> {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub date: NaiveDate,
    pub time: &'a str,
    pub status: &'a str,
}

/// Row struct for reading from the treatments table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = treatments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct TreatmentRow {
    pub id: Uuid,
    pub appointment_id: Uuid,
    pub diagnosis: String,
    pub prescription: String,
    pub follow_up_date: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for creating new treatment records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = treatments)]
pub(crate) struct NewTreatmentRow<'a> {
    pub id: Uuid,
    pub appointment_id: Uuid,
    pub diagnosis: &'a str,
    pub prescription: &'a str,
    pub follow_up_date: Option<&'a str>,
    pub notes: Option<&'a str>,
}

/// Row struct for reading from the doctor_availability table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = doctor_availability)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AvailabilityRow {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    pub is_available: bool,
}

/// Insertable struct for provisioning default availability records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = doctor_availability)]
pub(crate) struct NewAvailabilityRow<'a> {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub date: NaiveDate,
    pub start_time: &'a str,
    pub end_time: &'a str,
    pub is_available: bool,
}
