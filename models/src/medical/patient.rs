// models/src/medical/patient.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::access::Scoped;

/// A person in the directory. The national `identity` is unique when present;
/// intake checks it before inserting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: Uuid,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub district_id: Option<Uuid>,
    pub sector_id: Option<Uuid>,
    pub cell_id: Option<Uuid>,
    pub village_id: Option<Uuid>,
    pub phone_number: Option<String>,
    pub identity: Option<String>,
    pub email: Option<String>,
    pub profile_pic: Option<String>,
    /// Facility that registered the patient; set from the acting user's
    /// assignment at intake.
    pub health_facility_id: Option<Uuid>,
    pub community_work_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Patient {
    pub fn full_name(&self) -> String {
        match &self.middle_name {
            Some(middle) => format!("{} {} {}", self.first_name, middle, self.last_name),
            None => format!("{} {}", self.first_name, self.last_name),
        }
    }
}

impl Scoped for Patient {
    fn community_work_ref(&self) -> Option<Uuid> {
        self.community_work_id
    }
    fn facility_ref(&self) -> Option<Uuid> {
        self.health_facility_id
    }
}
