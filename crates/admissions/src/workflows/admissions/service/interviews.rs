use std::collections::HashSet;

use chrono::NaiveDate;
use tracing::info;

use super::{guard, validated, AdmissionsService};
use crate::workflows::admissions::access::{
    has_unconditional, Action, Actor, ResourceKind, Scope,
};
use crate::workflows::admissions::domain::{Interview, InterviewId, InterviewStatus};
use crate::workflows::admissions::error::{AdmissionsError, StoreResultExt};
use crate::workflows::admissions::lifecycle::ApplicationTrigger;
use crate::workflows::admissions::repository::AdmissionsStore;
use crate::workflows::admissions::requests::{
    ConductInterviewRequest, ScheduleInterviewRequest, UpcomingInterviewsQuery,
};
use crate::workflows::admissions::scheduling::{
    availability, can_conduct_at, interview_outcome, rank_availability, slot_violations,
    InterviewerAvailability,
};

const NO_ACCESS: &str = "You do not have access to this interview";
const SLOT_TAKEN: &str = "Interviewer already has an interview scheduled at this time";

impl<S> AdmissionsService<S>
where
    S: AdmissionsStore + 'static,
{
    /// Books an interview for an application under review and moves the application to
    /// `InterviewScheduled`. Booking and status change are stored together.
    pub fn schedule_interview(
        &self,
        actor: &Actor,
        request: ScheduleInterviewRequest,
    ) -> Result<Interview, AdmissionsError> {
        const OP: &str = "scheduling interview";
        if !has_unconditional(actor.role, ResourceKind::Interview, Action::Review) {
            return Err(AdmissionsError::unauthorized(
                "Only admissions staff can schedule interviews",
            ));
        }
        validated(&request)?;
        AdmissionsError::from_violations(
            slot_violations(
                request.scheduled_date,
                request.scheduled_time,
                request.interview_type,
                request.meeting_link.as_deref(),
                self.today(),
            )
            .iter()
            .map(ToString::to_string)
            .collect(),
        )?;

        let found = self.store.application(&request.application_id).or_fail(OP)?;
        let mut application = guard(
            actor,
            ResourceKind::Application,
            Action::Review,
            found,
            "Only admissions staff can schedule interviews",
            |application| self.application_resource(ResourceKind::Application, application, OP),
        )?;
        application.status = application
            .status
            .apply(ApplicationTrigger::ScheduleInterview)?;

        let interviewer = self
            .store
            .staff(&request.interviewer_id)
            .or_fail(OP)?
            .ok_or_else(|| AdmissionsError::NotFound("Interviewer not found".to_string()))?;
        if !interviewer.can_interview() {
            return Err(AdmissionsError::InvalidState(
                "Interviewer must be an active teaching staff member".to_string(),
            ));
        }

        if self
            .store
            .slot_taken(
                &interviewer.id,
                request.scheduled_date,
                request.scheduled_time,
            )
            .or_fail(OP)?
        {
            return Err(AdmissionsError::Conflict(SLOT_TAKEN.to_string()));
        }

        let now = self.now();
        application.updated_at = now;
        let interview = Interview {
            id: InterviewId::new(),
            application_id: application.id,
            student_id: application.student_id,
            scheduled_date: request.scheduled_date,
            scheduled_time: request.scheduled_time,
            interview_type: request.interview_type,
            meeting_link: request.meeting_link,
            meeting_id: request.meeting_id,
            interviewer_id: interviewer.id,
            interviewer_name: interviewer.full_name(),
            status: InterviewStatus::Scheduled,
            score: None,
            feedback: None,
            remarks: None,
            conducted_at: None,
            scheduled_by: actor.user_id,
            created_at: now,
        };

        let interview = self.store.schedule(interview, application).or_fail(OP)?;
        info!(
            interview_id = %interview.id,
            application_id = %interview.application_id,
            interviewer = %interview.interviewer_id,
            date = %interview.scheduled_date,
            time = %interview.scheduled_time,
            "interview scheduled"
        );
        Ok(interview)
    }

    /// Records the interviewer's score and decides the application from it.
    pub fn conduct_interview(
        &self,
        actor: &Actor,
        id: InterviewId,
        request: ConductInterviewRequest,
    ) -> Result<Interview, AdmissionsError> {
        const OP: &str = "conducting interview";
        let found = self.store.interview(&id).or_fail(OP)?;
        let mut interview = guard(
            actor,
            ResourceKind::Interview,
            Action::Edit,
            found,
            "Only the assigned interviewer can conduct this interview",
            |interview| self.interview_resource(interview, OP),
        )?;

        if interview.status != InterviewStatus::Scheduled {
            return Err(AdmissionsError::InvalidState(format!(
                "Interview is already {}",
                interview.status.label()
            )));
        }
        validated(&request)?;

        let now = self.now();
        if !can_conduct_at(&interview, now.naive_utc()) {
            return Err(AdmissionsError::InvalidState(
                "Interview can only be conducted at or after scheduled time".to_string(),
            ));
        }

        let score = u8::try_from(request.score)
            .map_err(|_| AdmissionsError::invalid("Score must be between 0 and 100"))?;
        let outcome = interview_outcome(score, request.remarks.as_deref());

        let mut application = self
            .store
            .application(&interview.application_id)
            .or_fail(OP)?
            .ok_or_else(|| AdmissionsError::NotFound("Application not found".to_string()))?;
        application.status = application
            .status
            .apply(ApplicationTrigger::RecordInterviewOutcome {
                passed: outcome.passed,
            })?;
        application.decision_at = Some(now);
        application.decision_remarks = Some(outcome.decision_remarks);
        application.updated_at = now;

        interview.status = InterviewStatus::Completed;
        interview.score = Some(score);
        interview.feedback = Some(request.feedback);
        interview.remarks = request.remarks;
        interview.conducted_at = Some(now);

        self.store
            .complete(interview.clone(), application.clone())
            .or_fail(OP)?;
        info!(
            interview_id = %interview.id,
            application_id = %application.id,
            score,
            decision = application.status.label(),
            "interview conducted"
        );
        Ok(interview)
    }

    pub fn interview(&self, actor: &Actor, id: InterviewId) -> Result<Interview, AdmissionsError> {
        const OP: &str = "loading interview";
        let found = self.store.interview(&id).or_fail(OP)?;
        guard(
            actor,
            ResourceKind::Interview,
            Action::View,
            found,
            NO_ACCESS,
            |interview| self.interview_resource(interview, OP),
        )
    }

    /// Scheduled interviews from today onwards that the caller may see, earliest first.
    pub fn upcoming_interviews(
        &self,
        actor: &Actor,
        query: UpcomingInterviewsQuery,
    ) -> Result<Vec<Interview>, AdmissionsError> {
        const OP: &str = "loading upcoming interviews";
        let visible = match actor
            .role
            .capabilities()
            .grant(ResourceKind::Interview)
            .scope(Action::View)
        {
            Scope::All => self.store.scheduled_interviews(None).or_fail(OP)?,
            Scope::Assigned => match self.store.staff_by_user(&actor.user_id).or_fail(OP)? {
                Some(staff) => self.store.scheduled_interviews(Some(&staff.id)).or_fail(OP)?,
                None => Vec::new(),
            },
            Scope::Owned => {
                let owned: HashSet<_> = self
                    .store
                    .applications_by_parent(&actor.user_id)
                    .or_fail(OP)?
                    .into_iter()
                    .map(|application| application.id)
                    .collect();
                let mut interviews = self.store.scheduled_interviews(None).or_fail(OP)?;
                interviews.retain(|interview| owned.contains(&interview.application_id));
                interviews
            }
            Scope::None | Scope::TeachingOnly => {
                return Err(AdmissionsError::unauthorized(
                    "You do not have access to interviews",
                ));
            }
        };

        let from = query.from.map_or(self.today(), |from| from.max(self.today()));
        let limit = query
            .limit
            .unwrap_or(self.policy.upcoming_interview_limit)
            .max(1);
        let mut upcoming: Vec<Interview> = visible
            .into_iter()
            .filter(|interview| interview.scheduled_date >= from)
            .filter(|interview| query.to.map_or(true, |to| interview.scheduled_date <= to))
            .collect();
        upcoming.sort_by_key(Interview::scheduled_at);
        upcoming.truncate(limit);
        Ok(upcoming)
    }

    /// Load of every active teaching staff member on `date`, available ones first.
    pub fn available_interviewers(
        &self,
        actor: &Actor,
        date: NaiveDate,
    ) -> Result<Vec<InterviewerAvailability>, AdmissionsError> {
        const OP: &str = "finding available interviewers";
        if !actor.role.is_admissions_staff() {
            return Err(AdmissionsError::unauthorized(
                "Only admissions staff can look up interviewer availability",
            ));
        }

        let mut entries = self
            .store
            .active_teaching_staff()
            .or_fail(OP)?
            .iter()
            .map(|staff| {
                let booked = self.store.scheduled_interviews(Some(&staff.id)).or_fail(OP)?;
                Ok(availability(staff, &booked, date))
            })
            .collect::<Result<Vec<_>, AdmissionsError>>()?;
        rank_availability(&mut entries);
        Ok(entries)
    }
}
