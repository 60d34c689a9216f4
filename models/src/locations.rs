// models/src/locations.rs
//
// The administrative location hierarchy: District -> Sector -> Cell -> Village.
// Each child references exactly one parent. The hierarchy is seeded once by
// the bulk loader and rarely mutated afterwards.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct District {
    pub id: Uuid,
    pub name: String,
}

impl District {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sector {
    pub id: Uuid,
    pub name: String,
    pub district_id: Uuid,
}

impl Sector {
    pub fn new(name: impl Into<String>, district_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            district_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub id: Uuid,
    pub name: String,
    pub sector_id: Uuid,
}

impl Cell {
    pub fn new(name: impl Into<String>, sector_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            sector_id,
        }
    }
}

/// The most specific unit of the hierarchy; directory entities point here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Village {
    pub id: Uuid,
    pub name: String,
    pub village_code: Option<String>,
    pub cell_id: Uuid,
}

impl Village {
    pub fn new(name: impl Into<String>, village_code: Option<String>, cell_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            village_code,
            cell_id,
        }
    }
}
