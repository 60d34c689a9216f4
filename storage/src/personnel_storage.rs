// storage/src/personnel_storage.rs
//
// Doctors and community health workers share the same directory shape, so
// their engines live together.

use async_trait::async_trait;
use bincode::config::{BigEndian, Configuration, Fixint};
use bincode::serde::{decode_from_slice, encode_to_vec};
use sled::{Db, Tree};
use uuid::Uuid;

use models::access::Scope;
use models::errors::RecordResult;
use models::medical::{CommunityWorker, Doctor};

use crate::bincode_config;

#[async_trait]
pub trait DoctorStorageEngine: Send + Sync + 'static {
    async fn add_doctor(&self, doctor: &Doctor) -> RecordResult<()>;
    async fn get_doctor(&self, id: Uuid) -> RecordResult<Option<Doctor>>;
    async fn list_doctors(&self, scope: &Scope) -> RecordResult<Vec<Doctor>>;
}

#[async_trait]
pub trait CommunityWorkerStorageEngine: Send + Sync + 'static {
    async fn add_worker(&self, worker: &CommunityWorker) -> RecordResult<()>;
    async fn get_worker(&self, id: Uuid) -> RecordResult<Option<CommunityWorker>>;
    async fn list_workers(&self, scope: &Scope) -> RecordResult<Vec<CommunityWorker>>;
}

/// Sled-backed implementation of the `DoctorStorageEngine` trait.
pub struct SledDoctorStorage {
    tree: Tree,
    config: Configuration<BigEndian, Fixint>,
}

impl SledDoctorStorage {
    pub fn new(db: &Db) -> RecordResult<Self> {
        let tree = db.open_tree("doctors")?;
        Ok(Self {
            tree,
            config: bincode_config(),
        })
    }
}

#[async_trait]
impl DoctorStorageEngine for SledDoctorStorage {
    async fn add_doctor(&self, doctor: &Doctor) -> RecordResult<()> {
        let bytes = encode_to_vec(doctor, self.config.clone())?;
        self.tree.insert(doctor.id.as_bytes(), bytes)?;
        Ok(())
    }

    async fn get_doctor(&self, id: Uuid) -> RecordResult<Option<Doctor>> {
        if let Some(value) = self.tree.get(id.as_bytes())? {
            let (doctor, _): (Doctor, usize) = decode_from_slice(&value, self.config.clone())?;
            Ok(Some(doctor))
        } else {
            Ok(None)
        }
    }

    async fn list_doctors(&self, scope: &Scope) -> RecordResult<Vec<Doctor>> {
        let mut rows = Vec::new();
        for item in self.tree.iter() {
            let (_key, value) = item?;
            let (doctor, _): (Doctor, usize) = decode_from_slice(&value, self.config.clone())?;
            if scope.permits(&doctor) {
                rows.push(doctor);
            }
        }
        rows.sort_by(|a, b| a.last_name.cmp(&b.last_name));
        Ok(rows)
    }
}

/// Sled-backed implementation of the `CommunityWorkerStorageEngine` trait.
pub struct SledCommunityWorkerStorage {
    tree: Tree,
    config: Configuration<BigEndian, Fixint>,
}

impl SledCommunityWorkerStorage {
    pub fn new(db: &Db) -> RecordResult<Self> {
        let tree = db.open_tree("community_workers")?;
        Ok(Self {
            tree,
            config: bincode_config(),
        })
    }
}

#[async_trait]
impl CommunityWorkerStorageEngine for SledCommunityWorkerStorage {
    async fn add_worker(&self, worker: &CommunityWorker) -> RecordResult<()> {
        let bytes = encode_to_vec(worker, self.config.clone())?;
        self.tree.insert(worker.id.as_bytes(), bytes)?;
        Ok(())
    }

    async fn get_worker(&self, id: Uuid) -> RecordResult<Option<CommunityWorker>> {
        if let Some(value) = self.tree.get(id.as_bytes())? {
            let (worker, _): (CommunityWorker, usize) =
                decode_from_slice(&value, self.config.clone())?;
            Ok(Some(worker))
        } else {
            Ok(None)
        }
    }

    async fn list_workers(&self, scope: &Scope) -> RecordResult<Vec<CommunityWorker>> {
        let mut rows = Vec::new();
        for item in self.tree.iter() {
            let (_key, value) = item?;
            let (worker, _): (CommunityWorker, usize) =
                decode_from_slice(&value, self.config.clone())?;
            if scope.permits(&worker) {
                rows.push(worker);
            }
        }
        rows.sort_by(|a, b| a.last_name.cmp(&b.last_name));
        Ok(rows)
    }
}
