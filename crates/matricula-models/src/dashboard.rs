//! Head counts for the admin dashboard.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SchoolStatistics {
    /// Students whose status is `active`
    pub total_students: u64,
    pub total_teachers: u64,
    pub total_parents: u64,
    /// Every login: staff, students of any status and parents
    pub total_users: u64,
    /// Applications still `pending` or `under_review`
    pub open_applications: u64,
}
