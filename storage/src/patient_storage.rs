// storage/src/patient_storage.rs

use async_trait::async_trait;
use bincode::config::{BigEndian, Configuration, Fixint};
use bincode::serde::{decode_from_slice, encode_to_vec};
use sled::{Db, Tree};
use uuid::Uuid;

use models::access::Scope;
use models::errors::RecordResult;
use models::medical::Patient;

use crate::bincode_config;

#[async_trait]
pub trait PatientStorageEngine: Send + Sync + 'static {
    /// Adds a new patient to the storage.
    async fn add_patient(&self, patient: &Patient) -> RecordResult<()>;
    /// Updates an existing patient in the storage.
    async fn update_patient(&self, patient: &Patient) -> RecordResult<()>;
    /// Retrieves a patient by their unique ID.
    async fn get_patient(&self, id: Uuid) -> RecordResult<Option<Patient>>;
    /// Retrieves a patient by their national identity, when registered.
    async fn find_by_identity(&self, identity: &str) -> RecordResult<Option<Patient>>;
    /// Lists patients visible under the given scope.
    async fn list_patients(&self, scope: &Scope) -> RecordResult<Vec<Patient>>;
}

/// Sled-backed implementation of the `PatientStorageEngine` trait.
pub struct SledPatientStorage {
    tree: Tree,
    config: Configuration<BigEndian, Fixint>,
}

impl SledPatientStorage {
    pub fn new(db: &Db) -> RecordResult<Self> {
        let tree = db.open_tree("patients")?;
        Ok(Self {
            tree,
            config: bincode_config(),
        })
    }
}

#[async_trait]
impl PatientStorageEngine for SledPatientStorage {
    async fn add_patient(&self, patient: &Patient) -> RecordResult<()> {
        let bytes = encode_to_vec(patient, self.config.clone())?;
        self.tree.insert(patient.id.as_bytes(), bytes)?;
        Ok(())
    }

    async fn update_patient(&self, patient: &Patient) -> RecordResult<()> {
        let bytes = encode_to_vec(patient, self.config.clone())?;
        self.tree.insert(patient.id.as_bytes(), bytes)?;
        Ok(())
    }

    async fn get_patient(&self, id: Uuid) -> RecordResult<Option<Patient>> {
        if let Some(value) = self.tree.get(id.as_bytes())? {
            let (patient, _): (Patient, usize) = decode_from_slice(&value, self.config.clone())?;
            Ok(Some(patient))
        } else {
            Ok(None)
        }
    }

    async fn find_by_identity(&self, identity: &str) -> RecordResult<Option<Patient>> {
        for item in self.tree.iter() {
            let (_key, value) = item?;
            let (patient, _): (Patient, usize) = decode_from_slice(&value, self.config.clone())?;
            if patient.identity.as_deref() == Some(identity) {
                return Ok(Some(patient));
            }
        }
        Ok(None)
    }

    async fn list_patients(&self, scope: &Scope) -> RecordResult<Vec<Patient>> {
        let mut rows = Vec::new();
        for item in self.tree.iter() {
            let (_key, value) = item?;
            let (patient, _): (Patient, usize) = decode_from_slice(&value, self.config.clone())?;
            if scope.permits(&patient) {
                rows.push(patient);
            }
        }
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::{PatientStorageEngine, SledPatientStorage};
    use chrono::Utc;
    use models::access::Scope;
    use models::medical::Patient;
    use uuid::Uuid;

    fn sample_patient(identity: Option<&str>, facility: Option<Uuid>) -> Patient {
        Patient {
            id: Uuid::new_v4(),
            first_name: "Claudine".to_string(),
            middle_name: None,
            last_name: "Uwera".to_string(),
            district_id: None,
            sector_id: None,
            cell_id: None,
            village_id: None,
            phone_number: Some("+250783378349".to_string()),
            identity: identity.map(str::to_string),
            email: None,
            profile_pic: None,
            health_facility_id: facility,
            community_work_id: None,
            created_at: Utc::now(),
        }
    }

    fn open_store() -> (tempfile::TempDir, SledPatientStorage) {
        let dir = tempfile::tempdir().unwrap();
        let db = sled::open(dir.path()).unwrap();
        let store = SledPatientStorage::new(&db).unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn find_by_identity_matches_registered_patient() {
        let (_dir, store) = open_store();
        let patient = sample_patient(Some("1199080012345678"), None);
        store.add_patient(&patient).await.unwrap();

        let found = store.find_by_identity("1199080012345678").await.unwrap();
        assert_eq!(found.map(|p| p.id), Some(patient.id));
        assert!(store.find_by_identity("other").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn listing_honors_facility_scope() {
        let (_dir, store) = open_store();
        let facility = Uuid::new_v4();
        store.add_patient(&sample_patient(None, Some(facility))).await.unwrap();
        store.add_patient(&sample_patient(None, Some(Uuid::new_v4()))).await.unwrap();

        let mine = store.list_patients(&Scope::ByFacility(facility)).await.unwrap();
        assert_eq!(mine.len(), 1);
        let all = store.list_patients(&Scope::All).await.unwrap();
        assert_eq!(all.len(), 2);
    }
}
