// storage/src/importer.rs
//
// Offline bulk loader for the location hierarchy. Reads tabular rows of
// (district, sector, cell, village, village code) and upserts all four
// levels with get-or-create semantics, so re-running the import leaves the
// data unchanged.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::info;

use models::errors::{RecordError, RecordResult};

use crate::location_storage::LocationStorageEngine;

/// One row of the source sheet. Header names follow the exported sheet.
#[derive(Debug, Deserialize)]
pub struct LocationRow {
    #[serde(rename = "DISTRICT NAME")]
    pub district: String,
    #[serde(rename = "SECTOR NAME")]
    pub sector: String,
    #[serde(rename = "CELL NAME")]
    pub cell: String,
    #[serde(rename = "VILLAGE NAME")]
    pub village: String,
    #[serde(rename = "VILLAGE CODE")]
    pub village_code: Option<String>,
}

/// Loads location rows from a CSV reader. Returns the number of rows
/// processed.
pub async fn load_locations<R: Read>(
    store: &dyn LocationStorageEngine,
    reader: R,
) -> RecordResult<usize> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut processed = 0usize;

    for result in csv_reader.deserialize() {
        let row: LocationRow =
            result.map_err(|e| RecordError::InvalidData(format!("bad location row: {}", e)))?;

        let district = store.get_or_create_district(row.district.trim()).await?;
        let sector = store
            .get_or_create_sector(row.sector.trim(), district.id)
            .await?;
        let cell = store.get_or_create_cell(row.cell.trim(), sector.id).await?;
        let code = row.village_code.as_deref().map(str::trim).filter(|c| !c.is_empty());
        let village = store
            .get_or_create_village(row.village.trim(), code, cell.id)
            .await?;

        info!(village = %village.name, "loaded location row");
        processed += 1;
    }

    Ok(processed)
}

/// Loads location rows from a CSV file on disk.
pub async fn load_locations_from_path(
    store: &dyn LocationStorageEngine,
    path: &Path,
) -> RecordResult<usize> {
    let file = std::fs::File::open(path)?;
    load_locations(store, file).await
}
