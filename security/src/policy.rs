// security/src/policy.rs
//
// The single policy table. Every scoped endpoint makes one `authorize` call:
// it applies the first-login gate, checks the endpoint's allowed roles, and
// resolves the `(role, resource)` pair to a row filter. Role checks beyond
// this module are a bug.

use thiserror::Error;

use models::access::{Resource, Scope};
use models::medical::Role;

use crate::context::RequestContext;

#[derive(Debug, Error, PartialEq)]
pub enum AccessError {
    #[error("no community work assigned to this user")]
    NoCommunityWorkAssigned,
    #[error("no health facility assigned to this user")]
    NoHealthFacilityAssigned,
    #[error("you don't have permission to access this page")]
    Forbidden,
    #[error("password change required before any other action")]
    PasswordChangeRequired,
}

/// Resolves the acting user to a scope over `resource`, or refuses.
///
/// `allowed` lists the roles the endpoint admits; superusers bypass the role
/// check but still pass through the first-login gate.
pub fn authorize(
    ctx: &RequestContext,
    allowed: &[Role],
    resource: Resource,
) -> Result<Scope, AccessError> {
    // Hard precondition: a first-login account must change its password
    // before reaching any scoped view.
    if ctx.first_login {
        return Err(AccessError::PasswordChangeRequired);
    }

    if ctx.is_superuser {
        return Ok(Scope::All);
    }

    if !allowed.contains(&ctx.role) {
        return Err(AccessError::Forbidden);
    }

    scope_for(ctx, resource)
}

/// The `(role, resource)` -> filter mapping, independent of per-endpoint
/// role gates.
pub fn scope_for(ctx: &RequestContext, resource: Resource) -> Result<Scope, AccessError> {
    match ctx.role {
        Role::Admin => Ok(Scope::All),
        Role::Chw => ctx
            .chw_assigned
            .map(Scope::ByCommunityWork)
            .ok_or(AccessError::NoCommunityWorkAssigned),
        Role::HealthFacility => {
            let facility = ctx
                .facility_assigned
                .ok_or(AccessError::NoHealthFacilityAssigned)?;
            Ok(match resource {
                // a health center sees the transfers it initiated
                Resource::Transfers => Scope::TransfersFrom(facility),
                _ => Scope::ByFacility(facility),
            })
        }
        Role::Hospital => {
            let facility = ctx
                .facility_assigned
                .ok_or(AccessError::NoHealthFacilityAssigned)?;
            Ok(match resource {
                // a hospital sees the transfers arriving at it
                Resource::Transfers => Scope::TransfersTo(facility),
                _ => Scope::ByFacility(facility),
            })
        }
    }
}

/// Role sets for the endpoint gates, kept next to the policy so they stay
/// in one place.
pub mod allowed {
    use models::medical::Role;

    pub const ALL_ROLES: &[Role] = &[
        Role::Admin,
        Role::Chw,
        Role::HealthFacility,
        Role::Hospital,
    ];
    pub const FACILITY_STAFF: &[Role] = &[Role::Admin, Role::HealthFacility, Role::Hospital];
    pub const INTAKE: &[Role] = &[Role::Admin, Role::HealthFacility];
    pub const ADMIN_ONLY: &[Role] = &[Role::Admin];
}

#[cfg(test)]
mod tests {
    use super::{allowed, authorize, AccessError};
    use crate::context::RequestContext;
    use models::access::{Resource, Scope};
    use models::medical::Role;
    use uuid::Uuid;

    fn ctx(role: Role) -> RequestContext {
        RequestContext {
            user_id: Uuid::new_v4(),
            username: "someone".to_string(),
            role,
            chw_assigned: None,
            facility_assigned: None,
            is_superuser: false,
            first_login: false,
        }
    }

    #[test]
    fn admin_gets_unrestricted_scope() {
        let scope = authorize(&ctx(Role::Admin), allowed::ALL_ROLES, Resource::Visits).unwrap();
        assert_eq!(scope, Scope::All);
    }

    #[test]
    fn chw_is_scoped_to_its_assignment() {
        let mut chw = ctx(Role::Chw);
        let assignment = Uuid::new_v4();
        chw.chw_assigned = Some(assignment);
        let scope = authorize(&chw, allowed::ALL_ROLES, Resource::Visits).unwrap();
        assert_eq!(scope, Scope::ByCommunityWork(assignment));
    }

    #[test]
    fn unassigned_chw_is_unauthorized() {
        let err = authorize(&ctx(Role::Chw), allowed::ALL_ROLES, Resource::Visits).unwrap_err();
        assert_eq!(err, AccessError::NoCommunityWorkAssigned);
    }

    #[test]
    fn unassigned_facility_user_is_unauthorized() {
        let err = authorize(
            &ctx(Role::HealthFacility),
            allowed::ALL_ROLES,
            Resource::Patients,
        )
        .unwrap_err();
        assert_eq!(err, AccessError::NoHealthFacilityAssigned);
    }

    #[test]
    fn transfer_scope_follows_direction_per_role() {
        let facility = Uuid::new_v4();

        let mut center = ctx(Role::HealthFacility);
        center.facility_assigned = Some(facility);
        assert_eq!(
            authorize(&center, allowed::ALL_ROLES, Resource::Transfers).unwrap(),
            Scope::TransfersFrom(facility)
        );

        let mut hospital = ctx(Role::Hospital);
        hospital.facility_assigned = Some(facility);
        assert_eq!(
            authorize(&hospital, allowed::ALL_ROLES, Resource::Transfers).unwrap(),
            Scope::TransfersTo(facility)
        );
        assert_eq!(
            authorize(&hospital, allowed::ALL_ROLES, Resource::Visits).unwrap(),
            Scope::ByFacility(facility)
        );
    }

    #[test]
    fn role_outside_the_endpoint_gate_is_forbidden() {
        let mut chw = ctx(Role::Chw);
        chw.chw_assigned = Some(Uuid::new_v4());
        let err = authorize(&chw, allowed::INTAKE, Resource::Patients).unwrap_err();
        assert_eq!(err, AccessError::Forbidden);
    }

    #[test]
    fn first_login_blocks_everything() {
        let mut admin = ctx(Role::Admin);
        admin.first_login = true;
        let err = authorize(&admin, allowed::ALL_ROLES, Resource::Visits).unwrap_err();
        assert_eq!(err, AccessError::PasswordChangeRequired);
    }

    #[test]
    fn superuser_bypasses_the_role_gate() {
        let mut su = ctx(Role::Chw);
        su.is_superuser = true;
        let scope = authorize(&su, allowed::ADMIN_ONLY, Resource::Users).unwrap();
        assert_eq!(scope, Scope::All);
    }
}
