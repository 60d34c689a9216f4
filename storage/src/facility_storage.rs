// storage/src/facility_storage.rs

use async_trait::async_trait;
use bincode::config::{BigEndian, Configuration, Fixint};
use bincode::serde::{decode_from_slice, encode_to_vec};
use sled::{Db, Tree};
use uuid::Uuid;

use models::errors::RecordResult;
use models::medical::{FacilityStatus, HealthFacility};

use crate::bincode_config;

#[async_trait]
pub trait FacilityStorageEngine: Send + Sync + 'static {
    async fn add_facility(&self, facility: &HealthFacility) -> RecordResult<()>;
    async fn update_facility(&self, facility: &HealthFacility) -> RecordResult<()>;
    async fn get_facility(&self, id: Uuid) -> RecordResult<Option<HealthFacility>>;
    async fn list_facilities(&self) -> RecordResult<Vec<HealthFacility>>;
    /// Facilities of one status; the transfer form offers only hospitals.
    async fn list_by_status(&self, status: FacilityStatus) -> RecordResult<Vec<HealthFacility>>;
}

/// Sled-backed implementation of the `FacilityStorageEngine` trait.
pub struct SledFacilityStorage {
    tree: Tree,
    config: Configuration<BigEndian, Fixint>,
}

impl SledFacilityStorage {
    pub fn new(db: &Db) -> RecordResult<Self> {
        let tree = db.open_tree("health_facilities")?;
        Ok(Self {
            tree,
            config: bincode_config(),
        })
    }
}

#[async_trait]
impl FacilityStorageEngine for SledFacilityStorage {
    async fn add_facility(&self, facility: &HealthFacility) -> RecordResult<()> {
        let bytes = encode_to_vec(facility, self.config.clone())?;
        self.tree.insert(facility.id.as_bytes(), bytes)?;
        Ok(())
    }

    async fn update_facility(&self, facility: &HealthFacility) -> RecordResult<()> {
        let bytes = encode_to_vec(facility, self.config.clone())?;
        self.tree.insert(facility.id.as_bytes(), bytes)?;
        Ok(())
    }

    async fn get_facility(&self, id: Uuid) -> RecordResult<Option<HealthFacility>> {
        if let Some(value) = self.tree.get(id.as_bytes())? {
            let (facility, _): (HealthFacility, usize) =
                decode_from_slice(&value, self.config.clone())?;
            Ok(Some(facility))
        } else {
            Ok(None)
        }
    }

    async fn list_facilities(&self) -> RecordResult<Vec<HealthFacility>> {
        let mut rows = Vec::new();
        for item in self.tree.iter() {
            let (_key, value) = item?;
            let (facility, _): (HealthFacility, usize) =
                decode_from_slice(&value, self.config.clone())?;
            rows.push(facility);
        }
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn list_by_status(&self, status: FacilityStatus) -> RecordResult<Vec<HealthFacility>> {
        let mut rows = self.list_facilities().await?;
        rows.retain(|f| f.status == status);
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::{FacilityStorageEngine, SledFacilityStorage};
    use models::medical::{FacilityStatus, HealthFacility};
    use uuid::Uuid;

    pub(crate) fn sample_facility(name: &str, status: FacilityStatus) -> HealthFacility {
        HealthFacility {
            id: Uuid::new_v4(),
            name: name.to_string(),
            district_id: None,
            sector_id: None,
            cell_id: None,
            village_id: None,
            director: "Dr. Mukamana".to_string(),
            phone_number: Some("+250788000001".to_string()),
            status,
            email: Some("facility@example.org".to_string()),
            profile_pic: None,
        }
    }

    #[tokio::test]
    async fn list_by_status_returns_only_hospitals() {
        let dir = tempfile::tempdir().unwrap();
        let db = sled::open(dir.path()).unwrap();
        let store = SledFacilityStorage::new(&db).unwrap();

        store
            .add_facility(&sample_facility("Kacyiru HC", FacilityStatus::HealthCenter))
            .await
            .unwrap();
        store
            .add_facility(&sample_facility("King Faisal", FacilityStatus::Hospital))
            .await
            .unwrap();

        let hospitals = store.list_by_status(FacilityStatus::Hospital).await.unwrap();
        assert_eq!(hospitals.len(), 1);
        assert_eq!(hospitals[0].name, "King Faisal");
        assert!(hospitals[0].is_hospital());
    }
}
