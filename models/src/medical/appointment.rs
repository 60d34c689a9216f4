// models/src/medical/appointment.rs

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A follow-up slot attached to a visit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub visit_id: Uuid,
    pub appointment_date: NaiveDate,
    pub appointment_time: NaiveTime,
    pub arrived_at: Option<NaiveDate>,
}

impl Appointment {
    pub fn new(
        visit_id: Uuid,
        appointment_date: NaiveDate,
        appointment_time: NaiveTime,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            visit_id,
            appointment_date,
            appointment_time,
            arrived_at: None,
        }
    }
}

/// One row of an appointment-set update for a visit: an existing row to keep
/// (with its id) or a new row to create (id absent). Rows missing from the
/// submitted set are deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentUpsert {
    pub id: Option<Uuid>,
    pub appointment_date: NaiveDate,
    pub appointment_time: NaiveTime,
    pub arrived_at: Option<NaiveDate>,
}
