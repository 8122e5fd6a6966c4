use chrono::Utc;
use tracing::{info, instrument};

use matricula_db::{Store, insert_application_with_next_number};
use matricula_models::{ApplicationId, StaffId};

use super::model::{
    AdmissionApplication, ApplicationInput, ApplicationStatus, ApprovalMode, ApproveFullDto,
    FullApprovalResponse, RejectDto, ReviewDto, ReviewUpdate, SIMPLE_APPROVAL_REMARK,
    SubmitApplicationResponse,
};
use crate::error::{ServiceError, ServiceResult};
use crate::metrics::{
    track_application_approved, track_application_rejected, track_application_submitted,
};
use crate::modules::enrollment::model::EnrollmentRequest;
use crate::modules::enrollment::service::{EnrollmentService, with_number_retry};
use crate::notifications::{notify_best_effort, templates};
use crate::state::AppState;

/// Error for a review action the application's current status forbids.
/// Anything already approved reports `AlreadyApproved`.
fn transition_error(action: &'static str, status: ApplicationStatus) -> ServiceError {
    match status {
        ApplicationStatus::Approved => ServiceError::AlreadyApproved { status },
        _ => ServiceError::InvalidTransition { action, status },
    }
}

pub struct AdmissionService;

impl AdmissionService {
    #[instrument(skip(state, input))]
    pub async fn submit(
        state: &AppState,
        input: ApplicationInput,
    ) -> ServiceResult<SubmitApplicationResponse> {
        let application = input
            .into_new_application(&state.school_config.default_country)
            .map_err(ServiceError::Validation)?;

        let stored =
            insert_application_with_next_number(state.store.as_ref(), &application, Utc::now())
                .await?;

        info!(
            application_number = %stored.application_number,
            "Admission application submitted"
        );
        track_application_submitted();

        notify_best_effort(
            state.notifier.as_ref(),
            templates::application_received(
                &state.school_config,
                &state.email_config.admissions_email,
                &stored,
            ),
        )
        .await;

        Ok(SubmitApplicationResponse {
            application_number: stored.application_number,
            status: stored.status,
        })
    }

    #[instrument(skip(store))]
    pub async fn list_applications(store: &dyn Store) -> ServiceResult<Vec<AdmissionApplication>> {
        Ok(store.list_applications().await?)
    }

    #[instrument(skip(store))]
    pub async fn get_application(
        store: &dyn Store,
        id: ApplicationId,
    ) -> ServiceResult<AdmissionApplication> {
        store
            .get_application(id)
            .await?
            .ok_or(ServiceError::NotFound("Application"))
    }

    /// Moves the application from `expected` to the update's status, or
    /// reports why it could not.
    async fn transition(
        store: &dyn Store,
        application: &AdmissionApplication,
        action: &'static str,
        update: &ReviewUpdate,
    ) -> ServiceResult<AdmissionApplication> {
        match store
            .update_review(application.id, application.status, update)
            .await?
        {
            Some(updated) => Ok(updated),
            // Another reviewer got there first
            None => {
                let current = Self::get_application(store, application.id).await?;
                Err(transition_error(action, current.status))
            }
        }
    }

    /// Simple approval: no accounts are created.
    #[instrument(skip(state))]
    pub async fn approve(
        state: &AppState,
        id: ApplicationId,
        reviewer: Option<StaffId>,
    ) -> ServiceResult<AdmissionApplication> {
        let application = Self::get_application(state.store.as_ref(), id).await?;

        if application.status.is_terminal() {
            return Err(transition_error("approve", application.status));
        }

        let update = ReviewUpdate::status_change(
            ApplicationStatus::Approved,
            reviewer,
            Some(SIMPLE_APPROVAL_REMARK.to_string()),
            Utc::now(),
        );
        let approved = Self::transition(state.store.as_ref(), &application, "approve", &update).await?;

        info!(application_number = %approved.application_number, "Application approved");
        track_application_approved(ApprovalMode::Simple.as_str());

        notify_best_effort(
            state.notifier.as_ref(),
            templates::application_approved(&state.school_config, &approved),
        )
        .await;

        Ok(approved)
    }

    /// Full approval: provisions the student and parent and stamps the
    /// placement on the application, all in one transaction.
    ///
    /// Allowed while the application is pending, under review, or approved
    /// without accounts.
    #[instrument(skip(state, dto), fields(roll_number = %dto.roll_number))]
    pub async fn approve_full(
        state: &AppState,
        id: ApplicationId,
        reviewer: Option<StaffId>,
        dto: ApproveFullDto,
    ) -> ServiceResult<FullApprovalResponse> {
        let student_password_hash = state.hasher.hash(&dto.student_password)?;
        let parent_password_hash = state.hasher.hash(&dto.parent_password)?;
        let now = Utc::now();

        let dto = &dto;
        let student_password_hash = &student_password_hash;
        let parent_password_hash = &parent_password_hash;

        let (application, enrollment) = with_number_retry(|| async move {
            let mut tx = state.store.begin().await?;

            let application = tx
                .lock_application(id)
                .await?
                .ok_or(ServiceError::NotFound("Application"))?;

            if application.is_provisioned() {
                return Err(ServiceError::AlreadyApproved {
                    status: application.status,
                });
            }
            if application.status == ApplicationStatus::Rejected {
                return Err(transition_error("approve", application.status));
            }

            let request = EnrollmentRequest::from_application(
                &application,
                dto,
                student_password_hash.clone(),
                parent_password_hash.clone(),
            );
            let enrollment =
                EnrollmentService::provision(tx.as_mut(), &state.school_config, &request, now)
                    .await?;

            let update = ReviewUpdate {
                status: ApplicationStatus::Approved,
                reviewed_by: reviewer,
                review_date: now,
                remarks: None,
                assigned_roll_number: Some(enrollment.student.roll_number.clone()),
                assigned_class: Some(enrollment.student.academic_info.class_name.clone()),
                assigned_section: enrollment.student.academic_info.section.clone(),
                admission_date: Some(now),
            };
            let application = tx.record_approval(id, &update).await?;

            tx.commit().await?;
            Ok((application, enrollment))
        })
        .await?;

        info!(
            application_number = %application.application_number,
            student_id = %enrollment.student.id,
            "Application approved with enrollment"
        );
        track_application_approved(ApprovalMode::Full.as_str());

        notify_best_effort(
            state.notifier.as_ref(),
            templates::enrollment_confirmed(&state.school_config, &application, &enrollment.student),
        )
        .await;

        Ok(FullApprovalResponse {
            application,
            student: enrollment.student,
            parent: enrollment.parent,
        })
    }

    /// `pending → under_review`.
    #[instrument(skip(state, dto))]
    pub async fn mark_under_review(
        state: &AppState,
        id: ApplicationId,
        reviewer: Option<StaffId>,
        dto: ReviewDto,
    ) -> ServiceResult<AdmissionApplication> {
        let application = Self::get_application(state.store.as_ref(), id).await?;

        if application.status != ApplicationStatus::Pending {
            return Err(transition_error("review", application.status));
        }

        let update = ReviewUpdate::status_change(
            ApplicationStatus::UnderReview,
            reviewer,
            dto.remarks,
            Utc::now(),
        );
        let reviewed = Self::transition(state.store.as_ref(), &application, "review", &update).await?;

        info!(application_number = %reviewed.application_number, "Application under review");
        Ok(reviewed)
    }

    #[instrument(skip(state, dto))]
    pub async fn reject(
        state: &AppState,
        id: ApplicationId,
        reviewer: Option<StaffId>,
        dto: RejectDto,
    ) -> ServiceResult<AdmissionApplication> {
        let application = Self::get_application(state.store.as_ref(), id).await?;

        if application.status.is_terminal() {
            return Err(transition_error("reject", application.status));
        }

        let update = ReviewUpdate::status_change(
            ApplicationStatus::Rejected,
            reviewer,
            Some(dto.remarks),
            Utc::now(),
        );
        let rejected = Self::transition(state.store.as_ref(), &application, "reject", &update).await?;

        info!(application_number = %rejected.application_number, "Application rejected");
        track_application_rejected();

        notify_best_effort(
            state.notifier.as_ref(),
            templates::application_rejected(&state.school_config, &rejected),
        )
        .await;

        Ok(rejected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_error_for_approved_is_already_approved() {
        assert!(matches!(
            transition_error("reject", ApplicationStatus::Approved),
            ServiceError::AlreadyApproved { .. }
        ));
        assert!(matches!(
            transition_error("approve", ApplicationStatus::Rejected),
            ServiceError::InvalidTransition {
                action: "approve",
                status: ApplicationStatus::Rejected
            }
        ));
    }
}
