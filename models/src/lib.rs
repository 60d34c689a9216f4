// models/src/lib.rs
//
// Domain entities for the ANC Track record system: the location hierarchy,
// the directory entities (patients, facilities, doctors, community workers),
// clinical records (visits, transfers, appointments) and user accounts.

pub mod access;
pub mod errors;
pub mod locations;
pub mod medical;
pub mod validation;

pub use access::{Resource, Scope, Scoped};
pub use errors::{RecordError, RecordResult, ValidationError, ValidationResult};
pub use locations::{Cell, District, Sector, Village};
