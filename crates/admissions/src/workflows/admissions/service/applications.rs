use tracing::{info, warn};

use super::{guard, validated, AdmissionsService};
use crate::workflows::admissions::access::{Action, Actor, Resource, ResourceKind};
use crate::workflows::admissions::documents::DocumentChecklist;
use crate::workflows::admissions::domain::{
    Application, ApplicationId, ApplicationStatus, Document, Interview, InterviewStatus, UserId,
    UserRole,
};
use crate::workflows::admissions::eligibility::check_eligibility;
use crate::workflows::admissions::error::{AdmissionsError, StoreResultExt};
use crate::workflows::admissions::lifecycle::ApplicationTrigger;
use crate::workflows::admissions::repository::AdmissionsStore;
use crate::workflows::admissions::requests::{
    ApplicationFilter, ReviewApplicationRequest, SubmitApplicationRequest,
};
use crate::workflows::admissions::views::{
    ApplicationStage, ApplicationStatusView, ApplicationSummary, DocumentStatusEntry,
    InterviewSummary, Page,
};

const STUDENT_NOT_YOURS: &str = "Student not found or does not belong to you";
const NO_ACCESS: &str = "You do not have access to this application";
const ACTIVE_APPLICATION: &str = "Student already has an active application";

impl<S> AdmissionsService<S>
where
    S: AdmissionsStore + 'static,
{
    /// Files a new application for one of the parent's students and submits it.
    pub fn submit_application(
        &self,
        actor: &Actor,
        request: SubmitApplicationRequest,
    ) -> Result<Application, AdmissionsError> {
        const OP: &str = "submitting application";
        if actor.role != UserRole::Parent {
            return Err(AdmissionsError::unauthorized(
                "Only parents can submit applications",
            ));
        }
        validated(&request)?;

        let found = self.store.student(&request.student_id).or_fail(OP)?;
        let student = guard(
            actor,
            ResourceKind::Student,
            Action::Edit,
            found,
            STUDENT_NOT_YOURS,
            |student| Ok(Resource::student(student.parent_user_id)),
        )?;

        if self
            .store
            .applications_by_student(&student.id)
            .or_fail(OP)?
            .iter()
            .any(|application| application.status.is_active())
        {
            return Err(AdmissionsError::Conflict(ACTIVE_APPLICATION.to_string()));
        }

        let today = self.today();
        check_eligibility(student.date_of_birth, request.applying_for_level, today).ensure()?;

        let status = ApplicationStatus::Draft.apply(ApplicationTrigger::Submit)?;
        let application_number = self.draw_application_number(OP)?;
        let now = self.now();
        let application = Application {
            id: ApplicationId::new(),
            application_number,
            student_id: student.id,
            submitted_by: actor.user_id,
            applying_for_level: request.applying_for_level,
            applying_for_class: request.applying_for_class,
            preferred_stream: request.preferred_stream,
            academic_year: request.academic_year,
            status,
            submitted_at: Some(now),
            reviewed_at: None,
            decision_at: None,
            review_notes: None,
            decision_remarks: None,
            created_at: now,
            updated_at: now,
        };

        let application = self.store.insert_application(application).or_fail(OP)?;
        info!(
            application_id = %application.id,
            application_number = %application.application_number,
            student_id = %student.id,
            "application submitted"
        );
        Ok(application)
    }

    pub fn advance_to_review(
        &self,
        actor: &Actor,
        id: ApplicationId,
        request: ReviewApplicationRequest,
    ) -> Result<Application, AdmissionsError> {
        const OP: &str = "reviewing application";
        validated(&request)?;

        let found = self.store.application(&id).or_fail(OP)?;
        let mut application = guard(
            actor,
            ResourceKind::Application,
            Action::Review,
            found,
            "Only admissions staff can review applications",
            |application| self.application_resource(ResourceKind::Application, application, OP),
        )?;

        application.status = application
            .status
            .apply(ApplicationTrigger::AdvanceToReview)?;
        let now = self.now();
        application.reviewed_at = Some(now);
        if request.notes.is_some() {
            application.review_notes = request.notes;
        }
        application.updated_at = now;

        self.store.update_application(application.clone()).or_fail(OP)?;
        info!(application_id = %application.id, reviewer = %actor.user_id, "application under review");
        Ok(application)
    }

    /// Applicant-facing progress view: stages, documents and the interview, if any.
    pub fn application_status(
        &self,
        actor: &Actor,
        id: ApplicationId,
    ) -> Result<ApplicationStatusView, AdmissionsError> {
        const OP: &str = "loading application status";
        let found = self.store.application(&id).or_fail(OP)?;
        let application = guard(
            actor,
            ResourceKind::Application,
            Action::View,
            found,
            NO_ACCESS,
            |application| self.application_resource(ResourceKind::Application, application, OP),
        )?;

        let student_name = self
            .store
            .student(&application.student_id)
            .or_fail(OP)?
            .map(|student| student.full_name())
            .unwrap_or_default();
        let documents = self
            .store
            .documents_by_application(&application.id)
            .or_fail(OP)?;
        let interview = self
            .store
            .interview_by_application(&application.id)
            .or_fail(OP)?;
        let checklist = DocumentChecklist::from_documents(&documents);

        Ok(ApplicationStatusView {
            application_id: application.id,
            application_number: application.application_number.clone(),
            student_id: application.student_id,
            student_name,
            applying_for_level: application.applying_for_level,
            applying_for_class: application.applying_for_class,
            status: application.status,
            submitted_at: application.submitted_at,
            reviewed_at: application.reviewed_at,
            decision_at: application.decision_at,
            decision_remarks: application.decision_remarks.clone(),
            stages: stages(&application, &documents, &checklist, interview.as_ref()),
            documents: documents.iter().map(document_status).collect(),
            required_documents: checklist.required_entries(),
            documents_complete: checklist.is_complete(),
            documents_verified: checklist.is_fully_verified(),
            interview: interview.as_ref().map(InterviewSummary::from),
        })
    }

    pub fn applications_by_parent(
        &self,
        actor: &Actor,
        parent: UserId,
        filter: ApplicationFilter,
    ) -> Result<Page<ApplicationSummary>, AdmissionsError> {
        const OP: &str = "listing applications";
        if actor.user_id != parent && !actor.role.is_admissions_staff() {
            return Err(AdmissionsError::unauthorized(
                "You can only view your own applications",
            ));
        }

        let mut applications = self.store.applications_by_parent(&parent).or_fail(OP)?;
        if let Some(status) = filter.status {
            applications.retain(|application| application.status == status);
        }
        applications.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let summaries = applications
            .iter()
            .map(|application| self.summarize(application, OP))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::slice(
            summaries,
            filter.page.unwrap_or(1),
            self.policy.page_size(filter.page_size),
        ))
    }

    fn summarize(
        &self,
        application: &Application,
        operation: &str,
    ) -> Result<ApplicationSummary, AdmissionsError> {
        let student_name = self
            .store
            .student(&application.student_id)
            .or_fail(operation)?
            .map(|student| student.full_name())
            .unwrap_or_default();
        let has_interview = self
            .store
            .interview_by_application(&application.id)
            .or_fail(operation)?
            .is_some();
        let documents = self
            .store
            .documents_by_application(&application.id)
            .or_fail(operation)?;
        Ok(ApplicationSummary::new(
            application,
            student_name,
            has_interview,
            DocumentChecklist::from_documents(&documents).is_complete(),
        ))
    }

    /// Draws candidate numbers until one is unused. The store still rejects a duplicate
    /// that slips in between the lookup and the insert.
    fn draw_application_number(&self, operation: &str) -> Result<String, AdmissionsError> {
        let today = self.today();
        for _ in 0..self.policy.application_number_attempts {
            let candidate = self.numbers.next_number(today);
            if self
                .store
                .application_by_number(&candidate)
                .or_fail(operation)?
                .is_none()
            {
                return Ok(candidate);
            }
            warn!(candidate = %candidate, "application number already issued, drawing again");
        }
        Err(AdmissionsError::Conflict(
            "Could not allocate a unique application number".to_string(),
        ))
    }
}

fn document_status(document: &Document) -> DocumentStatusEntry {
    DocumentStatusEntry {
        document_type: document.document_type,
        file_name: document.file_name.clone(),
        status: if document.is_verified {
            "Verified"
        } else {
            "Pending Verification"
        },
        uploaded_at: document.uploaded_at,
        verified_at: document.verified_at,
    }
}

fn stages(
    application: &Application,
    documents: &[Document],
    checklist: &DocumentChecklist,
    interview: Option<&Interview>,
) -> Vec<ApplicationStage> {
    let conducted = interview.filter(|i| i.status == InterviewStatus::Completed);
    let decided = application.status.is_decided();

    vec![
        ApplicationStage {
            name: "Application Submitted",
            completed: application.submitted_at.is_some(),
            date: application.submitted_at,
            detail: None,
        },
        ApplicationStage {
            name: "Documents Uploaded",
            completed: checklist.is_complete(),
            date: documents.iter().map(|document| document.uploaded_at).max(),
            detail: Some(format!(
                "{} of {} required documents",
                checklist
                    .required_entries()
                    .iter()
                    .filter(|entry| entry.uploaded)
                    .count(),
                checklist.required_entries().len()
            )),
        },
        ApplicationStage {
            name: "Under Review",
            completed: application.reviewed_at.is_some(),
            date: application.reviewed_at,
            detail: application.review_notes.clone(),
        },
        ApplicationStage {
            name: "Interview Scheduled",
            completed: interview.is_some(),
            date: interview.map(|i| i.created_at),
            detail: interview.map(|i| {
                format!(
                    "{} at {}",
                    i.scheduled_date.format("%Y-%m-%d"),
                    i.scheduled_time.format("%H:%M")
                )
            }),
        },
        ApplicationStage {
            name: "Interview Conducted",
            completed: conducted.is_some(),
            date: conducted.and_then(|i| i.conducted_at),
            detail: conducted
                .and_then(|i| i.score)
                .map(|score| format!("Score: {score}/100")),
        },
        ApplicationStage {
            name: if decided {
                "Decision Made"
            } else {
                "Decision Pending"
            },
            completed: decided,
            date: application.decision_at,
            detail: decided.then(|| application.status.label().to_string()),
        },
    ]
}
