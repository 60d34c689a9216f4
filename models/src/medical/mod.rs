// models/src/medical/mod.rs

pub mod appointment;
pub mod community_worker;
pub mod doctor;
pub mod facility;
pub mod patient;
pub mod role;
pub mod transfer;
pub mod user;
pub mod visit;

pub use appointment::{Appointment, AppointmentUpsert};
pub use community_worker::CommunityWorker;
pub use doctor::Doctor;
pub use facility::{FacilityStatus, HealthFacility};
pub use patient::Patient;
pub use role::Role;
pub use transfer::{parse_client_timestamp, Transfer};
pub use user::{Login, NewUser, User};
pub use visit::{DiagnosisClass, Visit, VisitStatus};
