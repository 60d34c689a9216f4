// storage/src/transfer_storage.rs
//
// Transfer lifecycle: pending -> transferred -> arrived. Creating a transfer
// and flipping the visit's `is_transferred` flag happen in one sled
// transaction across both trees, so neither side can exist without the
// other. Arrival confirmation mutates the row exactly once.

use async_trait::async_trait;
use bincode::config::{BigEndian, Configuration, Fixint};
use bincode::serde::{decode_from_slice, encode_to_vec};
use chrono::{DateTime, Utc};
use sled::{Db, Transactional, Tree};
use uuid::Uuid;

use models::access::Scope;
use models::errors::{RecordError, RecordResult, ValidationError};
use models::medical::{HealthFacility, Transfer, Visit};

use crate::bincode_config;

#[async_trait]
pub trait TransferStorageEngine: Send + Sync + 'static {
    /// Creates a transfer for a visit towards a destination facility and
    /// marks the visit transferred, atomically. The destination must be a
    /// hospital and the visit must carry its originating facility.
    async fn create_transfer(
        &self,
        visit_id: Uuid,
        destination: &HealthFacility,
    ) -> RecordResult<Transfer>;
    /// Confirms the patient's arrival and computes the delay in hours.
    async fn confirm_arrival(
        &self,
        transfer_id: Uuid,
        arrived_at: DateTime<Utc>,
    ) -> RecordResult<Transfer>;
    /// Retrieves a transfer by its unique ID.
    async fn get_transfer(&self, id: Uuid) -> RecordResult<Option<Transfer>>;
    /// Lists transfers visible under the given scope, newest first.
    async fn list_transfers(&self, scope: &Scope) -> RecordResult<Vec<Transfer>>;
    /// All transfers of one visit.
    async fn transfers_for_visit(&self, visit_id: Uuid) -> RecordResult<Vec<Transfer>>;
}

/// Sled-backed implementation of the `TransferStorageEngine` trait. Holds
/// the visits tree as well: the atomic create path and community-work
/// scoping both need it.
pub struct SledTransferStorage {
    transfers: Tree,
    visits: Tree,
    config: Configuration<BigEndian, Fixint>,
}

impl SledTransferStorage {
    pub fn new(db: &Db) -> RecordResult<Self> {
        Ok(Self {
            transfers: db.open_tree("transfers")?,
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

    fn decode_transfer(&self, value: &[u8]) -> RecordResult<Transfer> {
        let (transfer, _): (Transfer, usize) = decode_from_slice(value, self.config.clone())?;
        Ok(transfer)
    }

    fn matches_scope(&self, scope: &Scope, transfer: &Transfer) -> RecordResult<bool> {
        Ok(match scope {
            Scope::All => true,
            Scope::ByCommunityWork(id) => {
                let visit = self.get_visit(transfer.visit_id)?;
                visit.and_then(|v| v.community_work_id) == Some(*id)
            }
            Scope::ByFacility(id) => {
                transfer.from_health_facility_id == *id || transfer.to_hospital_id == *id
            }
            Scope::TransfersFrom(id) => transfer.from_health_facility_id == *id,
            Scope::TransfersTo(id) => transfer.to_hospital_id == *id,
        })
    }
}

#[async_trait]
impl TransferStorageEngine for SledTransferStorage {
    async fn create_transfer(
        &self,
        visit_id: Uuid,
        destination: &HealthFacility,
    ) -> RecordResult<Transfer> {
        if !destination.is_hospital() {
            return Err(ValidationError::DestinationNotHospital(destination.id).into());
        }

        let mut visit = self
            .get_visit(visit_id)?
            .ok_or(RecordError::NotFound("visit", visit_id))?;
        let from_facility = visit
            .health_facility_id
            .ok_or(ValidationError::MissingField("health_facility"))?;

        let transfer = Transfer::new(visit.id, from_facility, destination.id);
        visit.is_transferred = true;

        let transfer_bytes = encode_to_vec(&transfer, self.config.clone())?;
        let visit_bytes = encode_to_vec(&visit, self.config.clone())?;

        let transfer_key = transfer.id.as_bytes().to_vec();
        let visit_key = visit.id.as_bytes().to_vec();
        (&self.transfers, &self.visits)
            .transaction(|(transfers, visits)| {
                transfers.insert(transfer_key.as_slice(), transfer_bytes.as_slice())?;
                visits.insert(visit_key.as_slice(), visit_bytes.as_slice())?;
                Ok(())
            })
            .map_err(|e: sled::transaction::TransactionError| {
                RecordError::TransactionError(format!("{:?}", e))
            })?;

        Ok(transfer)
    }

    async fn confirm_arrival(
        &self,
        transfer_id: Uuid,
        arrived_at: DateTime<Utc>,
    ) -> RecordResult<Transfer> {
        let value = self
            .transfers
            .get(transfer_id.as_bytes())?
            .ok_or(RecordError::NotFound("transfer", transfer_id))?;
        let mut transfer = self.decode_transfer(&value)?;

        if transfer.has_arrived() {
            return Err(RecordError::InvalidData(
                "arrival already confirmed for this transfer".to_string(),
            ));
        }

        transfer.confirm_arrival(arrived_at);
        let bytes = encode_to_vec(&transfer, self.config.clone())?;
        self.transfers.insert(transfer.id.as_bytes(), bytes)?;
        Ok(transfer)
    }

    async fn get_transfer(&self, id: Uuid) -> RecordResult<Option<Transfer>> {
        match self.transfers.get(id.as_bytes())? {
            Some(value) => Ok(Some(self.decode_transfer(&value)?)),
            None => Ok(None),
        }
    }

    async fn list_transfers(&self, scope: &Scope) -> RecordResult<Vec<Transfer>> {
        let mut rows = Vec::new();
        for item in self.transfers.iter() {
            let (_key, value) = item?;
            let transfer = self.decode_transfer(&value)?;
            if self.matches_scope(scope, &transfer)? {
                rows.push(transfer);
            }
        }
        rows.sort_by(|a, b| b.transfer_date.cmp(&a.transfer_date));
        Ok(rows)
    }

    async fn transfers_for_visit(&self, visit_id: Uuid) -> RecordResult<Vec<Transfer>> {
        let mut rows = Vec::new();
        for item in self.transfers.iter() {
            let (_key, value) = item?;
            let transfer = self.decode_transfer(&value)?;
            if transfer.visit_id == visit_id {
                rows.push(transfer);
            }
        }
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::{SledTransferStorage, TransferStorageEngine};
    use crate::visit_storage::{SledVisitStorage, VisitStorageEngine};
    use chrono::Duration;
    use models::access::Scope;
    use models::errors::{RecordError, ValidationError};
    use models::medical::{DiagnosisClass, FacilityStatus, HealthFacility, Visit};
    use uuid::Uuid;

    fn facility(status: FacilityStatus) -> HealthFacility {
        HealthFacility {
            id: Uuid::new_v4(),
            name: "CHUK".to_string(),
            district_id: None,
            sector_id: None,
            cell_id: None,
            village_id: None,
            director: "Dr. Nsenga".to_string(),
            phone_number: None,
            status,
            email: None,
            profile_pic: None,
        }
    }

    fn visit_at_facility(facility_id: Uuid, community_work: Option<Uuid>) -> Visit {
        Visit::new(
            Uuid::new_v4(),
            community_work,
            Some(facility_id),
            "severe malaria",
            58.0,
            20.1,
            DiagnosisClass::Red,
        )
    }

    fn open_stores() -> (tempfile::TempDir, SledVisitStorage, SledTransferStorage) {
        let dir = tempfile::tempdir().unwrap();
        let db = sled::open(dir.path()).unwrap();
        let visits = SledVisitStorage::new(&db).unwrap();
        let transfers = SledTransferStorage::new(&db).unwrap();
        (dir, visits, transfers)
    }

    #[tokio::test]
    async fn creating_a_transfer_flags_the_visit_atomically() {
        let (_dir, visits, transfers) = open_stores();
        let source = facility(FacilityStatus::HealthCenter);
        let hospital = facility(FacilityStatus::Hospital);
        let visit = visit_at_facility(source.id, None);
        visits.add_visit(&visit).await.unwrap();

        let transfer = transfers.create_transfer(visit.id, &hospital).await.unwrap();
        assert_eq!(transfer.visit_id, visit.id);
        assert_eq!(transfer.from_health_facility_id, source.id);
        assert_eq!(transfer.to_hospital_id, hospital.id);
        assert!(transfer.delay_in_hours.is_none());

        let stored_visit = visits.get_visit(visit.id).await.unwrap().unwrap();
        assert!(stored_visit.is_transferred);
        assert_eq!(transfers.transfers_for_visit(visit.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn transfer_to_health_center_is_rejected() {
        let (_dir, visits, transfers) = open_stores();
        let source = facility(FacilityStatus::HealthCenter);
        let destination = facility(FacilityStatus::HealthCenter);
        let visit = visit_at_facility(source.id, None);
        visits.add_visit(&visit).await.unwrap();

        let err = transfers
            .create_transfer(visit.id, &destination)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RecordError::Validation(ValidationError::DestinationNotHospital(_))
        ));
        // no partial state change
        assert!(!visits.get_visit(visit.id).await.unwrap().unwrap().is_transferred);
        assert!(transfers.transfers_for_visit(visit.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn confirming_arrival_computes_delay_once() {
        let (_dir, visits, transfers) = open_stores();
        let source = facility(FacilityStatus::HealthCenter);
        let hospital = facility(FacilityStatus::Hospital);
        let visit = visit_at_facility(source.id, None);
        visits.add_visit(&visit).await.unwrap();

        let transfer = transfers.create_transfer(visit.id, &hospital).await.unwrap();
        let arrived = transfer.transfer_date + Duration::hours(2) + Duration::minutes(30);
        let confirmed = transfers.confirm_arrival(transfer.id, arrived).await.unwrap();
        assert_eq!(confirmed.delay_in_hours, Some(2.5));

        // terminal: a second confirmation is refused
        let err = transfers.confirm_arrival(transfer.id, arrived).await.unwrap_err();
        assert!(matches!(err, RecordError::InvalidData(_)));
    }

    #[tokio::test]
    async fn confirming_a_missing_transfer_is_not_found() {
        let (_dir, _visits, transfers) = open_stores();
        let err = transfers
            .confirm_arrival(Uuid::new_v4(), chrono::Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, RecordError::NotFound("transfer", _)));
    }

    #[tokio::test]
    async fn transfer_scopes_follow_direction() {
        let (_dir, visits, transfers) = open_stores();
        let source = facility(FacilityStatus::HealthCenter);
        let hospital = facility(FacilityStatus::Hospital);
        let worker = Uuid::new_v4();
        let visit = visit_at_facility(source.id, Some(worker));
        visits.add_visit(&visit).await.unwrap();
        transfers.create_transfer(visit.id, &hospital).await.unwrap();

        let from_source = transfers
            .list_transfers(&Scope::TransfersFrom(source.id))
            .await
            .unwrap();
        assert_eq!(from_source.len(), 1);

        let to_hospital = transfers
            .list_transfers(&Scope::TransfersTo(hospital.id))
            .await
            .unwrap();
        assert_eq!(to_hospital.len(), 1);

        let to_other = transfers
            .list_transfers(&Scope::TransfersTo(source.id))
            .await
            .unwrap();
        assert!(to_other.is_empty());

        // CHW scoping resolves through the visit
        let by_worker = transfers
            .list_transfers(&Scope::ByCommunityWork(worker))
            .await
            .unwrap();
        assert_eq!(by_worker.len(), 1);
    }
}
