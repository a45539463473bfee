//! Application state machine.
//!
//! Every status change goes through [`ApplicationStatus::apply`]; services never assign a
//! status directly. `Waitlisted` is a recognised state but no trigger currently produces it.

use serde::{Deserialize, Serialize};

use super::domain::ApplicationStatus;

/// Events that move an application between lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplicationTrigger {
    Submit,
    AdvanceToReview,
    ScheduleInterview,
    RecordInterviewOutcome { passed: bool },
}

impl ApplicationTrigger {
    const fn action(self) -> &'static str {
        match self {
            ApplicationTrigger::Submit => "be submitted",
            ApplicationTrigger::AdvanceToReview => "move to review",
            ApplicationTrigger::ScheduleInterview => "have an interview scheduled",
            ApplicationTrigger::RecordInterviewOutcome { .. } => "receive an interview outcome",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Application in {from} status cannot {}", .trigger.action())]
pub struct TransitionError {
    pub from: ApplicationStatus,
    pub trigger: ApplicationTrigger,
}

impl ApplicationStatus {
    pub fn apply(self, trigger: ApplicationTrigger) -> Result<ApplicationStatus, TransitionError> {
        use ApplicationStatus::*;
        use ApplicationTrigger as T;

        match (self, trigger) {
            (Draft, T::Submit) => Ok(Submitted),
            (Submitted, T::AdvanceToReview) => Ok(UnderReview),
            (UnderReview, T::ScheduleInterview) => Ok(InterviewScheduled),
            (InterviewScheduled, T::RecordInterviewOutcome { passed: true }) => Ok(Approved),
            (InterviewScheduled, T::RecordInterviewOutcome { passed: false }) => Ok(Rejected),
            (from, trigger) => Err(TransitionError { from, trigger }),
        }
    }

    /// Active applications block a second submission for the same student.
    pub const fn is_active(self) -> bool {
        matches!(
            self,
            ApplicationStatus::Draft
                | ApplicationStatus::Submitted
                | ApplicationStatus::UnderReview
                | ApplicationStatus::InterviewScheduled
        )
    }

    pub const fn is_decided(self) -> bool {
        matches!(
            self,
            ApplicationStatus::Approved | ApplicationStatus::Rejected | ApplicationStatus::Waitlisted
        )
    }
}
