// models/src/medical/transfer.rs
//
// A transfer moves a patient from the health center that produced a visit to
// a hospital. The row is created together with the visit's `is_transferred`
// flag and is mutated exactly once afterwards, when arrival is confirmed.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{ValidationError, ValidationResult};
use crate::validation::round2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transfer {
    pub id: Uuid,
    pub visit_id: Uuid,
    pub from_health_facility_id: Uuid,
    pub to_hospital_id: Uuid,
    pub transfer_date: DateTime<Utc>,
    pub patient_arrived_at: Option<DateTime<Utc>>,
    /// Elapsed hours between transfer initiation and confirmed arrival,
    /// rounded to two decimals. None until arrival is confirmed.
    pub delay_in_hours: Option<f64>,
}

impl Transfer {
    pub fn new(visit_id: Uuid, from_health_facility_id: Uuid, to_hospital_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            visit_id,
            from_health_facility_id,
            to_hospital_id,
            transfer_date: Utc::now(),
            patient_arrived_at: None,
            delay_in_hours: None,
        }
    }

    /// Records the arrival instant and computes the delay. Both operands are
    /// `DateTime<Utc>` at this point; offset-less client input is reconciled
    /// at the parsing boundary (`parse_client_timestamp`).
    pub fn confirm_arrival(&mut self, arrived_at: DateTime<Utc>) {
        self.patient_arrived_at = Some(arrived_at);
        self.delay_in_hours = Some(delay_hours(self.transfer_date, arrived_at));
    }

    pub fn has_arrived(&self) -> bool {
        self.patient_arrived_at.is_some()
    }
}

/// Delay between two instants in hours, rounded to two decimals.
pub fn delay_hours(transferred_at: DateTime<Utc>, arrived_at: DateTime<Utc>) -> f64 {
    let seconds = (arrived_at - transferred_at).num_milliseconds() as f64 / 1000.0;
    round2(seconds / 3600.0)
}

/// Parses a client-supplied timestamp. The two sides of the delay
/// subtraction may originate from different code paths, so a timestamp
/// without an offset is interpreted as UTC rather than rejected, keeping
/// both operands in the same awareness.
pub fn parse_client_timestamp(raw: &str) -> ValidationResult<DateTime<Utc>> {
    if let Ok(aware) = DateTime::parse_from_rfc3339(raw) {
        return Ok(aware.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }
    Err(ValidationError::InvalidDateFormat(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::{delay_hours, parse_client_timestamp, Transfer};
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    fn sample_transfer() -> Transfer {
        Transfer::new(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4())
    }

    #[test]
    fn delay_is_null_until_arrival_confirmed() {
        let transfer = sample_transfer();
        assert!(transfer.patient_arrived_at.is_none());
        assert!(transfer.delay_in_hours.is_none());
    }

    #[test]
    fn confirming_arrival_computes_rounded_delay() {
        let mut transfer = sample_transfer();
        // 5400s = 1.5h; extra 6s pushes the exact value to 1.50166..h
        let arrived = transfer.transfer_date + Duration::seconds(5406);
        transfer.confirm_arrival(arrived);
        assert_eq!(transfer.patient_arrived_at, Some(arrived));
        assert_eq!(transfer.delay_in_hours, Some(1.5));
    }

    #[test]
    fn delay_round_trip_matches_manual_computation() {
        let t0 = Utc::now();
        let t1 = t0 + Duration::seconds(9000);
        let expected = ((9000.0 / 3600.0) * 100.0_f64).round() / 100.0;
        assert_eq!(delay_hours(t0, t1), expected);
    }

    #[test]
    fn delay_is_non_negative_for_forward_arrivals() {
        let mut transfer = sample_transfer();
        transfer.confirm_arrival(transfer.transfer_date + Duration::minutes(1));
        assert!(transfer.delay_in_hours.unwrap() >= 0.0);
    }

    #[test]
    fn naive_timestamp_is_reconciled_to_utc() {
        let aware = parse_client_timestamp("2024-03-01T10:30:00+00:00").unwrap();
        let naive = parse_client_timestamp("2024-03-01T10:30:00").unwrap();
        let spaced = parse_client_timestamp("2024-03-01 10:30:00").unwrap();
        assert_eq!(aware, naive);
        assert_eq!(naive, spaced);
    }

    #[test]
    fn offset_timestamps_convert_to_utc_before_subtraction() {
        let plus_two = parse_client_timestamp("2024-03-01T12:30:00+02:00").unwrap();
        let utc = parse_client_timestamp("2024-03-01T10:30:00").unwrap();
        assert_eq!(plus_two, utc);
    }

    #[test]
    fn garbage_timestamp_is_rejected() {
        assert!(parse_client_timestamp("yesterday-ish").is_err());
    }
}
