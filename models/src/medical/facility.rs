// models/src/medical/facility.rs

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::access::Scoped;
use crate::errors::ValidationError;

/// Whether a facility is a first-line health center or a hospital. Only
/// hospitals are eligible transfer destinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FacilityStatus {
    HealthCenter,
    Hospital,
}

impl FacilityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FacilityStatus::HealthCenter => "health_center",
            FacilityStatus::Hospital => "hospital",
        }
    }
}

impl fmt::Display for FacilityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FacilityStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "health_center" => Ok(FacilityStatus::HealthCenter),
            "hospital" => Ok(FacilityStatus::Hospital),
            other => Err(ValidationError::UnknownFacilityStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthFacility {
    pub id: Uuid,
    pub name: String,
    pub district_id: Option<Uuid>,
    pub sector_id: Option<Uuid>,
    pub cell_id: Option<Uuid>,
    pub village_id: Option<Uuid>,
    pub director: String,
    pub phone_number: Option<String>,
    pub status: FacilityStatus,
    pub email: Option<String>,
    pub profile_pic: Option<String>,
}

impl HealthFacility {
    pub fn is_hospital(&self) -> bool {
        self.status == FacilityStatus::Hospital
    }
}

impl Scoped for HealthFacility {
    fn facility_ref(&self) -> Option<Uuid> {
        Some(self.id)
    }
}
