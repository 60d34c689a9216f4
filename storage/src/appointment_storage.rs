// storage/src/appointment_storage.rs

use async_trait::async_trait;
use bincode::config::{BigEndian, Configuration, Fixint};
use bincode::serde::{decode_from_slice, encode_to_vec};
use sled::{Db, Tree};
use uuid::Uuid;

use models::access::Scope;
use models::errors::{RecordError, RecordResult};
use models::medical::{Appointment, AppointmentUpsert, Visit};

use crate::bincode_config;

#[async_trait]
pub trait AppointmentStorageEngine: Send + Sync + 'static {
    /// Retrieves an appointment by its unique ID.
    async fn get_appointment(&self, id: Uuid) -> RecordResult<Option<Appointment>>;
    /// Appointments of one visit, earliest first.
    async fn appointments_for_visit(&self, visit_id: Uuid) -> RecordResult<Vec<Appointment>>;
    /// Lists appointments visible under the given scope; scoping resolves
    /// through the parent visit.
    async fn list_appointments(&self, scope: &Scope) -> RecordResult<Vec<Appointment>>;
    /// Replaces one visit's appointment set: rows with an id are updated,
    /// rows without one are created, stored rows missing from the submitted
    /// set are deleted.
    async fn sync_for_visit(
        &self,
        visit_id: Uuid,
        entries: Vec<AppointmentUpsert>,
    ) -> RecordResult<Vec<Appointment>>;
}

/// Sled-backed implementation of the `AppointmentStorageEngine` trait.
pub struct SledAppointmentStorage {
    appointments: Tree,
    visits: Tree,
    config: Configuration<BigEndian, Fixint>,
}

impl SledAppointmentStorage {
    pub fn new(db: &Db) -> RecordResult<Self> {
        Ok(Self {
            appointments: db.open_tree("appointments")?,
            visits: db.open_tree("visits")?,
            config: bincode_config(),
        })
    }

    fn get_visit(&self, id: Uuid) -> RecordResult<Option<Visit>> {
        if let Some(value) = self.visits.get(id.as_bytes())? {
            let (visit, _): (Visit, usize) = decode_from_slice(&value, self.config.clone())?;
            Ok(Some(visit))
        } else {
            Ok(None)
        }
    }

    fn scan(&self) -> RecordResult<Vec<Appointment>> {
        let mut rows = Vec::new();
        for item in self.appointments.iter() {
            let (_key, value) = item?;
            let (appointment, _): (Appointment, usize) =
                decode_from_slice(&value, self.config.clone())?;
            rows.push(appointment);
        }
        Ok(rows)
    }

    fn put(&self, appointment: &Appointment) -> RecordResult<()> {
        let bytes = encode_to_vec(appointment, self.config.clone())?;
        self.appointments.insert(appointment.id.as_bytes(), bytes)?;
        Ok(())
    }
}

#[async_trait]
impl AppointmentStorageEngine for SledAppointmentStorage {
    async fn get_appointment(&self, id: Uuid) -> RecordResult<Option<Appointment>> {
        if let Some(value) = self.appointments.get(id.as_bytes())? {
            let (appointment, _): (Appointment, usize) =
                decode_from_slice(&value, self.config.clone())?;
            Ok(Some(appointment))
        } else {
            Ok(None)
        }
    }

    async fn appointments_for_visit(&self, visit_id: Uuid) -> RecordResult<Vec<Appointment>> {
        let mut rows = self.scan()?;
        rows.retain(|a| a.visit_id == visit_id);
        rows.sort_by(|a, b| {
            (a.appointment_date, a.appointment_time).cmp(&(b.appointment_date, b.appointment_time))
        });
        Ok(rows)
    }

    async fn list_appointments(&self, scope: &Scope) -> RecordResult<Vec<Appointment>> {
        let mut rows = Vec::new();
        for appointment in self.scan()? {
            let visible = match scope {
                Scope::All => true,
                _ => match self.get_visit(appointment.visit_id)? {
                    Some(visit) => scope.permits(&visit),
                    None => false,
                },
            };
            if visible {
                rows.push(appointment);
            }
        }
        rows.sort_by(|a, b| {
            (a.appointment_date, a.appointment_time).cmp(&(b.appointment_date, b.appointment_time))
        });
        Ok(rows)
    }

    async fn sync_for_visit(
        &self,
        visit_id: Uuid,
        entries: Vec<AppointmentUpsert>,
    ) -> RecordResult<Vec<Appointment>> {
        if self.get_visit(visit_id)?.is_none() {
            return Err(RecordError::NotFound("visit", visit_id));
        }

        let existing = self.appointments_for_visit(visit_id).await?;
        let submitted_ids: Vec<Uuid> = entries.iter().filter_map(|e| e.id).collect();

        // drop rows the client removed from the set
        for stale in existing.iter().filter(|a| !submitted_ids.contains(&a.id)) {
            self.appointments.remove(stale.id.as_bytes())?;
        }

        for entry in entries {
            match entry.id {
                Some(id) => {
                    let mut appointment = self
                        .get_appointment(id)
                        .await?
                        .filter(|a| a.visit_id == visit_id)
                        .ok_or(RecordError::NotFound("appointment", id))?;
                    appointment.appointment_date = entry.appointment_date;
                    appointment.appointment_time = entry.appointment_time;
                    appointment.arrived_at = entry.arrived_at;
                    self.put(&appointment)?;
                }
                None => {
                    let mut appointment =
                        Appointment::new(visit_id, entry.appointment_date, entry.appointment_time);
                    appointment.arrived_at = entry.arrived_at;
                    self.put(&appointment)?;
                }
            }
        }

        self.appointments_for_visit(visit_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::{AppointmentStorageEngine, SledAppointmentStorage};
    use crate::visit_storage::{SledVisitStorage, VisitStorageEngine};
    use chrono::{NaiveDate, NaiveTime};
    use models::medical::{AppointmentUpsert, DiagnosisClass, Visit};
    use uuid::Uuid;

    fn entry(id: Option<Uuid>, day: u32) -> AppointmentUpsert {
        AppointmentUpsert {
            id,
            appointment_date: NaiveDate::from_ymd_opt(2024, 5, day).unwrap(),
            appointment_time: NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
            arrived_at: None,
        }
    }

    #[tokio::test]
    async fn sync_creates_updates_and_deletes_in_one_call() {
        let dir = tempfile::tempdir().unwrap();
        let db = sled::open(dir.path()).unwrap();
        let visits = SledVisitStorage::new(&db).unwrap();
        let store = SledAppointmentStorage::new(&db).unwrap();

        let visit = Visit::new(
            Uuid::new_v4(),
            None,
            None,
            "follow-up",
            55.0,
            19.8,
            DiagnosisClass::Green,
        );
        visits.add_visit(&visit).await.unwrap();

        let created = store
            .sync_for_visit(visit.id, vec![entry(None, 1), entry(None, 2)])
            .await
            .unwrap();
        assert_eq!(created.len(), 2);

        // keep the first (moved a week later), drop the second, add a third
        let kept_id = created[0].id;
        let updated = store
            .sync_for_visit(visit.id, vec![entry(Some(kept_id), 8), entry(None, 15)])
            .await
            .unwrap();
        assert_eq!(updated.len(), 2);
        assert!(updated.iter().any(|a| a.id == kept_id
            && a.appointment_date == chrono::NaiveDate::from_ymd_opt(2024, 5, 8).unwrap()));
        assert!(!updated.iter().any(|a| a.id == created[1].id));
    }

    #[tokio::test]
    async fn sync_for_missing_visit_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let db = sled::open(dir.path()).unwrap();
        let store = SledAppointmentStorage::new(&db).unwrap();

        let err = store
            .sync_for_visit(Uuid::new_v4(), vec![entry(None, 1)])
            .await
            .unwrap_err();
        assert!(matches!(err, models::RecordError::NotFound("visit", _)));
    }
}
