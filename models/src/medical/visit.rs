// models/src/medical/visit.rs

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::access::Scoped;
use crate::errors::ValidationError;
use crate::validation::round2;

/// Lifecycle of a clinical encounter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisitStatus {
    /// Being taken care of.
    Active,
    Recovered,
    Deceased,
}

impl VisitStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VisitStatus::Active => "active",
            VisitStatus::Recovered => "recovered",
            VisitStatus::Deceased => "deceased",
        }
    }
}

impl fmt::Display for VisitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VisitStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(VisitStatus::Active),
            "recovered" => Ok(VisitStatus::Recovered),
            "deceased" => Ok(VisitStatus::Deceased),
            other => Err(ValidationError::UnknownVisitStatus(other.to_string())),
        }
    }
}

/// Triage classification assigned at diagnosis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosisClass {
    Green,
    Red,
    Orange,
}

impl DiagnosisClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosisClass::Green => "green",
            DiagnosisClass::Red => "red",
            DiagnosisClass::Orange => "orange",
        }
    }
}

impl fmt::Display for DiagnosisClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DiagnosisClass {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "green" => Ok(DiagnosisClass::Green),
            "red" => Ok(DiagnosisClass::Red),
            "orange" => Ok(DiagnosisClass::Orange),
            other => Err(ValidationError::UnknownClassification(other.to_string())),
        }
    }
}

/// One clinical encounter for a patient. `is_transferred` is flipped to true
/// exactly when a transfer row is created for the visit, in the same storage
/// transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Visit {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub community_work_id: Option<Uuid>,
    pub health_facility_id: Option<Uuid>,
    pub date: DateTime<Utc>,
    pub disease: String,
    pub weight: f64,
    pub bmi: f64,
    pub diagnosis: DiagnosisClass,
    pub is_transferred: bool,
    pub status: VisitStatus,
}

impl Visit {
    /// Creates a new encounter with the default lifecycle state: active, not
    /// transferred, timestamped now. Weight and BMI are kept to two decimals.
    pub fn new(
        patient_id: Uuid,
        community_work_id: Option<Uuid>,
        health_facility_id: Option<Uuid>,
        disease: impl Into<String>,
        weight: f64,
        bmi: f64,
        diagnosis: DiagnosisClass,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            patient_id,
            community_work_id,
            health_facility_id,
            date: Utc::now(),
            disease: disease.into(),
            weight: round2(weight),
            bmi: round2(bmi),
            diagnosis,
            is_transferred: false,
            status: VisitStatus::Active,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == VisitStatus::Active
    }
}

impl Scoped for Visit {
    fn community_work_ref(&self) -> Option<Uuid> {
        self.community_work_id
    }
    fn facility_ref(&self) -> Option<Uuid> {
        self.health_facility_id
    }
}

#[cfg(test)]
mod tests {
    use super::{DiagnosisClass, Visit, VisitStatus};
    use uuid::Uuid;

    #[test]
    fn new_visit_defaults_to_active_and_untransferred() {
        let visit = Visit::new(
            Uuid::new_v4(),
            None,
            Some(Uuid::new_v4()),
            "malaria",
            61.237,
            22.504,
            DiagnosisClass::Orange,
        );
        assert_eq!(visit.status, VisitStatus::Active);
        assert!(!visit.is_transferred);
        assert_eq!(visit.weight, 61.24);
        assert_eq!(visit.bmi, 22.5);
    }

    #[test]
    fn recovered_visit_is_not_active() {
        let mut visit = Visit::new(
            Uuid::new_v4(),
            None,
            None,
            "flu",
            70.0,
            24.0,
            DiagnosisClass::Green,
        );
        visit.status = VisitStatus::Recovered;
        assert!(!visit.is_active());
    }
}
