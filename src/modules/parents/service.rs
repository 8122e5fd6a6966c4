use tracing::{instrument, warn};

use matricula_db::Store;
use matricula_models::{ParentId, StudentId, StudentStatus};

use super::model::Parent;
use crate::error::{ServiceError, ServiceResult};
use crate::modules::students::model::Student;

pub struct ParentService;

impl ParentService {
    /// Active students on the parent's child list, in the order they were linked.
    #[instrument(skip(store))]
    pub async fn children(store: &dyn Store, parent_id: ParentId) -> ServiceResult<Vec<Student>> {
        let parent = Self::parent(store, parent_id).await?;

        let mut children = Vec::with_capacity(parent.children.len());
        for link in &parent.children {
            if let Some(student) = store.get_student(link.student_id).await? {
                if student.status == StudentStatus::Active {
                    children.push(student);
                }
            }
        }
        Ok(children)
    }

    /// One of the parent's own children.
    #[instrument(skip(store))]
    pub async fn child(
        store: &dyn Store,
        parent_id: ParentId,
        student_id: StudentId,
    ) -> ServiceResult<Student> {
        let parent = Self::parent(store, parent_id).await?;

        if !parent.has_child(student_id) {
            warn!(%parent_id, %student_id, "Parent requested a student outside their family");
            return Err(ServiceError::AccessDenied);
        }

        store
            .get_student(student_id)
            .await?
            .ok_or(ServiceError::NotFound("Student"))
    }

    async fn parent(store: &dyn Store, id: ParentId) -> ServiceResult<Parent> {
        store
            .get_parent(id)
            .await?
            .ok_or(ServiceError::NotFound("Parent"))
    }
}
