// security/src/context.rs

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use models::medical::{Role, User};

/// Request-scoped view of the acting user. Built once per request from the
/// authenticated account and passed into every access-control check; there
/// is deliberately no process-wide "current user".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestContext {
    pub user_id: Uuid,
    pub username: String,
    pub role: Role,
    pub chw_assigned: Option<Uuid>,
    pub facility_assigned: Option<Uuid>,
    pub is_superuser: bool,
    pub first_login: bool,
}

impl From<&User> for RequestContext {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            username: user.username.clone(),
            role: user.role,
            chw_assigned: user.chw_assigned,
            facility_assigned: user.health_facility_assigned,
            is_superuser: user.is_superuser,
            first_login: user.first_login,
        }
    }
}
