// storage/src/location_storage.rs

use async_trait::async_trait;
use bincode::config::{BigEndian, Configuration, Fixint};
use bincode::serde::{decode_from_slice, encode_to_vec};
use sled::{Db, Tree};
use uuid::Uuid;

use models::errors::RecordResult;
use models::locations::{Cell, District, Sector, Village};

use crate::bincode_config;

/// Reference-data access for the District -> Sector -> Cell -> Village
/// hierarchy. The get-or-create operations carry the idempotence the bulk
/// loader relies on: matching is by name, scoped by parent.
#[async_trait]
pub trait LocationStorageEngine: Send + Sync + 'static {
    async fn get_or_create_district(&self, name: &str) -> RecordResult<District>;
    async fn get_or_create_sector(&self, name: &str, district_id: Uuid) -> RecordResult<Sector>;
    async fn get_or_create_cell(&self, name: &str, sector_id: Uuid) -> RecordResult<Cell>;
    async fn get_or_create_village(
        &self,
        name: &str,
        village_code: Option<&str>,
        cell_id: Uuid,
    ) -> RecordResult<Village>;

    async fn list_districts(&self) -> RecordResult<Vec<District>>;
    /// Sectors belonging to one district (cascading dropdown lookup).
    async fn sectors_in_district(&self, district_id: Uuid) -> RecordResult<Vec<Sector>>;
    /// Cells belonging to one sector.
    async fn cells_in_sector(&self, sector_id: Uuid) -> RecordResult<Vec<Cell>>;
    /// Villages belonging to one cell.
    async fn villages_in_cell(&self, cell_id: Uuid) -> RecordResult<Vec<Village>>;
}

/// Sled-backed implementation of the `LocationStorageEngine` trait.
pub struct SledLocationStorage {
    districts: Tree,
    sectors: Tree,
    cells: Tree,
    villages: Tree,
    config: Configuration<BigEndian, Fixint>,
}

impl SledLocationStorage {
    pub fn new(db: &Db) -> RecordResult<Self> {
        Ok(Self {
            districts: db.open_tree("districts")?,
            sectors: db.open_tree("sectors")?,
            cells: db.open_tree("cells")?,
            villages: db.open_tree("villages")?,
            config: bincode_config(),
        })
    }

    fn scan<T: serde::de::DeserializeOwned>(&self, tree: &Tree) -> RecordResult<Vec<T>> {
        let mut rows = Vec::new();
        for item in tree.iter() {
            let (_key, value) = item?;
            let (row, _): (T, usize) = decode_from_slice(&value, self.config.clone())?;
            rows.push(row);
        }
        Ok(rows)
    }

    fn put<T: serde::Serialize>(&self, tree: &Tree, id: &Uuid, row: &T) -> RecordResult<()> {
        let bytes = encode_to_vec(row, self.config.clone())?;
        tree.insert(id.as_bytes(), bytes)?;
        Ok(())
    }
}

#[async_trait]
impl LocationStorageEngine for SledLocationStorage {
    async fn get_or_create_district(&self, name: &str) -> RecordResult<District> {
        let existing: Vec<District> = self.scan(&self.districts)?;
        if let Some(found) = existing.into_iter().find(|d| d.name == name) {
            return Ok(found);
        }
        let district = District::new(name);
        self.put(&self.districts, &district.id, &district)?;
        Ok(district)
    }

    async fn get_or_create_sector(&self, name: &str, district_id: Uuid) -> RecordResult<Sector> {
        let existing: Vec<Sector> = self.scan(&self.sectors)?;
        if let Some(found) = existing
            .into_iter()
            .find(|s| s.name == name && s.district_id == district_id)
        {
            return Ok(found);
        }
        let sector = Sector::new(name, district_id);
        self.put(&self.sectors, &sector.id, &sector)?;
        Ok(sector)
    }

    async fn get_or_create_cell(&self, name: &str, sector_id: Uuid) -> RecordResult<Cell> {
        let existing: Vec<Cell> = self.scan(&self.cells)?;
        if let Some(found) = existing
            .into_iter()
            .find(|c| c.name == name && c.sector_id == sector_id)
        {
            return Ok(found);
        }
        let cell = Cell::new(name, sector_id);
        self.put(&self.cells, &cell.id, &cell)?;
        Ok(cell)
    }

    async fn get_or_create_village(
        &self,
        name: &str,
        village_code: Option<&str>,
        cell_id: Uuid,
    ) -> RecordResult<Village> {
        let existing: Vec<Village> = self.scan(&self.villages)?;
        if let Some(found) = existing.into_iter().find(|v| {
            v.name == name
                && v.cell_id == cell_id
                && v.village_code.as_deref() == village_code
        }) {
            return Ok(found);
        }
        let village = Village::new(name, village_code.map(str::to_string), cell_id);
        self.put(&self.villages, &village.id, &village)?;
        Ok(village)
    }

    async fn list_districts(&self) -> RecordResult<Vec<District>> {
        let mut rows: Vec<District> = self.scan(&self.districts)?;
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn sectors_in_district(&self, district_id: Uuid) -> RecordResult<Vec<Sector>> {
        let mut rows: Vec<Sector> = self.scan(&self.sectors)?;
        rows.retain(|s| s.district_id == district_id);
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn cells_in_sector(&self, sector_id: Uuid) -> RecordResult<Vec<Cell>> {
        let mut rows: Vec<Cell> = self.scan(&self.cells)?;
        rows.retain(|c| c.sector_id == sector_id);
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn villages_in_cell(&self, cell_id: Uuid) -> RecordResult<Vec<Village>> {
        let mut rows: Vec<Village> = self.scan(&self.villages)?;
        rows.retain(|v| v.cell_id == cell_id);
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::{LocationStorageEngine, SledLocationStorage};

    fn open_store() -> (tempfile::TempDir, SledLocationStorage) {
        let dir = tempfile::tempdir().unwrap();
        let db = sled::open(dir.path()).unwrap();
        let store = SledLocationStorage::new(&db).unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn get_or_create_is_idempotent_per_parent() {
        let (_dir, store) = open_store();
        let d1 = store.get_or_create_district("Gasabo").await.unwrap();
        let d2 = store.get_or_create_district("Gasabo").await.unwrap();
        assert_eq!(d1.id, d2.id);

        let s1 = store.get_or_create_sector("Kacyiru", d1.id).await.unwrap();
        let s2 = store.get_or_create_sector("Kacyiru", d1.id).await.unwrap();
        assert_eq!(s1.id, s2.id);
        assert_eq!(store.list_districts().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn same_sector_name_under_two_districts_is_two_rows() {
        let (_dir, store) = open_store();
        let gasabo = store.get_or_create_district("Gasabo").await.unwrap();
        let kicukiro = store.get_or_create_district("Kicukiro").await.unwrap();
        let a = store.get_or_create_sector("Kacyiru", gasabo.id).await.unwrap();
        let b = store.get_or_create_sector("Kacyiru", kicukiro.id).await.unwrap();
        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn cascading_lookups_follow_the_parent() {
        let (_dir, store) = open_store();
        let district = store.get_or_create_district("Gasabo").await.unwrap();
        let sector = store.get_or_create_sector("Kacyiru", district.id).await.unwrap();
        let cell = store.get_or_create_cell("Kamatamu", sector.id).await.unwrap();
        store
            .get_or_create_village("Nyarutarama", Some("V001"), cell.id)
            .await
            .unwrap();

        let sectors = store.sectors_in_district(district.id).await.unwrap();
        assert_eq!(sectors.len(), 1);
        let cells = store.cells_in_sector(sector.id).await.unwrap();
        assert_eq!(cells.len(), 1);
        let villages = store.villages_in_cell(cell.id).await.unwrap();
        assert_eq!(villages.len(), 1);
        assert_eq!(villages[0].village_code.as_deref(), Some("V001"));
    }
}
