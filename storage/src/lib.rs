// storage/src/lib.rs
//
// Sled-backed storage engines for the record system. Each entity gets a
// trait describing its operations and a sled implementation storing bincode
// rows in a dedicated tree. Listings take a `Scope` so per-role filtering
// happens in one place.

use bincode::config::{self, BigEndian, Configuration, Fixint};

pub mod appointment_storage;
pub mod facility_storage;
pub mod importer;
pub mod location_storage;
pub mod patient_storage;
pub mod personnel_storage;
pub mod transfer_storage;
pub mod user_storage;
pub mod visit_storage;

pub use appointment_storage::{AppointmentStorageEngine, SledAppointmentStorage};
pub use facility_storage::{FacilityStorageEngine, SledFacilityStorage};
pub use location_storage::{LocationStorageEngine, SledLocationStorage};
pub use patient_storage::{PatientStorageEngine, SledPatientStorage};
pub use personnel_storage::{
    CommunityWorkerStorageEngine, DoctorStorageEngine, SledCommunityWorkerStorage,
    SledDoctorStorage,
};
pub use transfer_storage::{SledTransferStorage, TransferStorageEngine};
pub use user_storage::{SledUserStorage, UserStorageEngine};
pub use visit_storage::{SledVisitStorage, VisitStorageEngine};

/// Provides a standard bincode configuration.
pub(crate) fn bincode_config() -> Configuration<BigEndian, Fixint> {
    config::standard()
        .with_big_endian()
        .with_fixed_int_encoding()
}
