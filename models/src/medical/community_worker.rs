// models/src/medical/community_worker.rs

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::access::Scoped;

/// A community health worker. Visits created in the field reference the
/// worker; user accounts with the CHW role are assigned to exactly one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommunityWorker {
    pub id: Uuid,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub district_id: Option<Uuid>,
    pub sector_id: Option<Uuid>,
    pub cell_id: Option<Uuid>,
    pub village_id: Option<Uuid>,
    pub health_facility_id: Option<Uuid>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub profile_pic: Option<String>,
}

impl Scoped for CommunityWorker {
    fn community_work_ref(&self) -> Option<Uuid> {
        Some(self.id)
    }
    fn facility_ref(&self) -> Option<Uuid> {
        self.health_facility_id
    }
}
