// models/src/access.rs
//
// Access-control vocabulary shared between the policy layer and the storage
// engines. The policy table in the `security` crate maps an authenticated
// request to a `Scope`; storage listings apply the scope as a pure row filter.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The collections a request can be scoped against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Resource {
    Patients,
    Visits,
    Transfers,
    Appointments,
    Doctors,
    CommunityWorkers,
    HealthFacilities,
    Users,
}

/// A filter over a collection, produced once per request by the policy table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Unrestricted view (admins and superusers).
    All,
    /// Rows whose community-work reference equals the given assignment.
    ByCommunityWork(Uuid),
    /// Rows whose health-facility reference equals the given assignment.
    ByFacility(Uuid),
    /// Transfers leaving the given facility (health-facility users).
    TransfersFrom(Uuid),
    /// Transfers arriving at the given hospital (hospital users).
    TransfersTo(Uuid),
}

/// Rows that carry the references the role scopes filter on.
pub trait Scoped {
    fn community_work_ref(&self) -> Option<Uuid> {
        None
    }
    fn facility_ref(&self) -> Option<Uuid> {
        None
    }
}

impl Scope {
    /// Whether a row is visible under this scope. Transfer rows are matched
    /// separately by the transfer storage because they carry two facility
    /// references and borrow the community-work reference from their visit.
    pub fn permits<T: Scoped>(&self, row: &T) -> bool {
        match self {
            Scope::All => true,
            Scope::ByCommunityWork(id) => row.community_work_ref() == Some(*id),
            Scope::ByFacility(id) | Scope::TransfersFrom(id) | Scope::TransfersTo(id) => {
                row.facility_ref() == Some(*id)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Scope, Scoped};
    use uuid::Uuid;

    struct Row {
        cw: Option<Uuid>,
        facility: Option<Uuid>,
    }

    impl Scoped for Row {
        fn community_work_ref(&self) -> Option<Uuid> {
            self.cw
        }
        fn facility_ref(&self) -> Option<Uuid> {
            self.facility
        }
    }

    #[test]
    fn all_scope_permits_everything() {
        let row = Row { cw: None, facility: None };
        assert!(Scope::All.permits(&row));
    }

    #[test]
    fn community_work_scope_matches_only_the_assignment() {
        let mine = Uuid::new_v4();
        let theirs = Uuid::new_v4();
        let row = Row { cw: Some(mine), facility: None };
        assert!(Scope::ByCommunityWork(mine).permits(&row));
        assert!(!Scope::ByCommunityWork(theirs).permits(&row));
    }

    #[test]
    fn facility_scope_rejects_unassigned_rows() {
        let facility = Uuid::new_v4();
        let row = Row { cw: None, facility: None };
        assert!(!Scope::ByFacility(facility).permits(&row));
    }
}
