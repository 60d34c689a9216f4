// models/src/medical/doctor.rs

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::access::Scoped;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Doctor {
    pub id: Uuid,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub district_id: Option<Uuid>,
    pub sector_id: Option<Uuid>,
    pub cell_id: Option<Uuid>,
    pub village_id: Option<Uuid>,
    pub phone_number: Option<String>,
    pub health_facility_id: Option<Uuid>,
    pub profile_pic: Option<String>,
}

impl Scoped for Doctor {
    fn facility_ref(&self) -> Option<Uuid> {
        self.health_facility_id
    }
}
