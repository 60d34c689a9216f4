// storage/src/visit_storage.rs

use async_trait::async_trait;
use bincode::config::{BigEndian, Configuration, Fixint};
use bincode::serde::{decode_from_slice, encode_to_vec};
use sled::{Db, Tree};
use uuid::Uuid;

use models::access::Scope;
use models::errors::{RecordError, RecordResult};
use models::medical::{Visit, VisitStatus};

use crate::bincode_config;

#[async_trait]
pub trait VisitStorageEngine: Send + Sync + 'static {
    /// Adds a new encounter to the storage.
    async fn add_visit(&self, visit: &Visit) -> RecordResult<()>;
    /// Retrieves a visit by its unique ID.
    async fn get_visit(&self, id: Uuid) -> RecordResult<Option<Visit>>;
    /// Moves a visit to a new lifecycle status; not-found is an error.
    async fn set_status(&self, id: Uuid, status: VisitStatus) -> RecordResult<Visit>;
    /// Lists visits visible under the given scope, newest first.
    async fn list_visits(&self, scope: &Scope) -> RecordResult<Vec<Visit>>;
    /// The "current visits" view: active encounters only.
    async fn current_visits(&self, scope: &Scope) -> RecordResult<Vec<Visit>>;
    /// All visits of one patient, newest first.
    async fn visits_for_patient(&self, patient_id: Uuid) -> RecordResult<Vec<Visit>>;
}

/// Sled-backed implementation of the `VisitStorageEngine` trait.
pub struct SledVisitStorage {
    tree: Tree,
    config: Configuration<BigEndian, Fixint>,
}

impl SledVisitStorage {
    pub fn new(db: &Db) -> RecordResult<Self> {
        let tree = db.open_tree("visits")?;
        Ok(Self {
            tree,
            config: bincode_config(),
        })
    }

    fn scan(&self) -> RecordResult<Vec<Visit>> {
        let mut rows = Vec::new();
        for item in self.tree.iter() {
            let (_key, value) = item?;
            let (visit, _): (Visit, usize) = decode_from_slice(&value, self.config.clone())?;
            rows.push(visit);
        }
        Ok(rows)
    }
}

#[async_trait]
impl VisitStorageEngine for SledVisitStorage {
    async fn add_visit(&self, visit: &Visit) -> RecordResult<()> {
        let bytes = encode_to_vec(visit, self.config.clone())?;
        self.tree.insert(visit.id.as_bytes(), bytes)?;
        Ok(())
    }

    async fn get_visit(&self, id: Uuid) -> RecordResult<Option<Visit>> {
        if let Some(value) = self.tree.get(id.as_bytes())? {
            let (visit, _): (Visit, usize) = decode_from_slice(&value, self.config.clone())?;
            Ok(Some(visit))
        } else {
            Ok(None)
        }
    }

    async fn set_status(&self, id: Uuid, status: VisitStatus) -> RecordResult<Visit> {
        let mut visit = self
            .get_visit(id)
            .await?
            .ok_or(RecordError::NotFound("visit", id))?;
        visit.status = status;
        let bytes = encode_to_vec(&visit, self.config.clone())?;
        self.tree.insert(visit.id.as_bytes(), bytes)?;
        Ok(visit)
    }

    async fn list_visits(&self, scope: &Scope) -> RecordResult<Vec<Visit>> {
        let mut rows = self.scan()?;
        rows.retain(|v| scope.permits(v));
        rows.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(rows)
    }

    async fn current_visits(&self, scope: &Scope) -> RecordResult<Vec<Visit>> {
        let mut rows = self.list_visits(scope).await?;
        rows.retain(Visit::is_active);
        Ok(rows)
    }

    async fn visits_for_patient(&self, patient_id: Uuid) -> RecordResult<Vec<Visit>> {
        let mut rows = self.scan()?;
        rows.retain(|v| v.patient_id == patient_id);
        rows.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::{SledVisitStorage, VisitStorageEngine};
    use models::access::Scope;
    use models::medical::{DiagnosisClass, Visit, VisitStatus};
    use uuid::Uuid;

    fn open_store() -> (tempfile::TempDir, SledVisitStorage) {
        let dir = tempfile::tempdir().unwrap();
        let db = sled::open(dir.path()).unwrap();
        let store = SledVisitStorage::new(&db).unwrap();
        (dir, store)
    }

    fn sample_visit(community_work: Option<Uuid>) -> Visit {
        Visit::new(
            Uuid::new_v4(),
            community_work,
            None,
            "malaria",
            64.0,
            21.3,
            DiagnosisClass::Red,
        )
    }

    #[tokio::test]
    async fn recovered_visit_leaves_the_current_view() {
        let (_dir, store) = open_store();
        let visit = sample_visit(None);
        store.add_visit(&visit).await.unwrap();

        assert_eq!(store.current_visits(&Scope::All).await.unwrap().len(), 1);

        let updated = store
            .set_status(visit.id, VisitStatus::Recovered)
            .await
            .unwrap();
        assert_eq!(updated.status, VisitStatus::Recovered);
        assert!(store.current_visits(&Scope::All).await.unwrap().is_empty());
        // still present in the unrestricted listing
        assert_eq!(store.list_visits(&Scope::All).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn community_work_scope_filters_other_workers_rows() {
        let (_dir, store) = open_store();
        let mine = Uuid::new_v4();
        store.add_visit(&sample_visit(Some(mine))).await.unwrap();
        store.add_visit(&sample_visit(Some(Uuid::new_v4()))).await.unwrap();
        store.add_visit(&sample_visit(None)).await.unwrap();

        let scoped = store.list_visits(&Scope::ByCommunityWork(mine)).await.unwrap();
        assert_eq!(scoped.len(), 1);
        assert_eq!(scoped[0].community_work_id, Some(mine));
    }

    #[tokio::test]
    async fn set_status_on_missing_visit_is_not_found() {
        let (_dir, store) = open_store();
        let err = store
            .set_status(Uuid::new_v4(), VisitStatus::Deceased)
            .await
            .unwrap_err();
        assert!(matches!(err, models::RecordError::NotFound("visit", _)));
    }
}
