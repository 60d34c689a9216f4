// models/src/medical/role.rs

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;

/// The account roles. Any string outside this set is rejected at the parsing
/// boundary, so the policy table only ever sees known roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "ADMIN")]
    Admin,
    #[serde(rename = "CHW")]
    Chw,
    #[serde(rename = "HEALTH FACILITY")]
    HealthFacility,
    #[serde(rename = "HOSPITAL")]
    Hospital,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Chw => "CHW",
            Role::HealthFacility => "HEALTH FACILITY",
            Role::Hospital => "HOSPITAL",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADMIN" => Ok(Role::Admin),
            "CHW" => Ok(Role::Chw),
            "HEALTH FACILITY" => Ok(Role::HealthFacility),
            "HOSPITAL" => Ok(Role::Hospital),
            other => Err(ValidationError::UnknownRole(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Role;
    use crate::errors::ValidationError;
    use core::str::FromStr;

    #[test]
    fn should_round_trip_known_roles() {
        for role in [Role::Admin, Role::Chw, Role::HealthFacility, Role::Hospital] {
            assert_eq!(Role::from_str(role.as_str()).unwrap(), role);
        }
    }

    #[test]
    fn should_reject_unknown_role() {
        let err = Role::from_str("DOCTOR").unwrap_err();
        assert_eq!(err, ValidationError::UnknownRole("DOCTOR".to_string()));
    }
}
