use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Serialize;

use super::documents::ChecklistEntry;
use super::domain::{
    Application, ApplicationId, ApplicationStatus, ClassLevel, Document, DocumentType,
    EducationalLevel, Interview, InterviewId, InterviewStatus, InterviewType, NigerianState, StaffId,
    Student, StudentId, StudentStatus, User, UserId, UserRole, UserStatus,
};

/// Account details safe to return to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserView {
    pub id: UserId,
    pub email: String,
    pub phone_number: String,
    pub first_name: String,
    pub last_name: String,
    pub middle_name: Option<String>,
    pub role: UserRole,
    pub status: UserStatus,
    pub state_of_origin: Option<NigerianState>,
    pub lga: Option<String>,
    pub is_email_verified: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            phone_number: user.phone_number.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            middle_name: user.middle_name.clone(),
            role: user.role,
            status: user.status,
            state_of_origin: user.state_of_origin,
            lga: user.lga.clone(),
            is_email_verified: user.is_email_verified,
            last_login_at: user.last_login_at,
            created_at: user.created_at,
        }
    }
}

/// Registration result. The verification token is what a mailer would deliver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Registration {
    pub user: UserView,
    pub verification_token: String,
    pub verification_expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginResponse {
    pub user_id: UserId,
    pub email: String,
    pub full_name: String,
    pub token: String,
    pub token_expiry: DateTime<Utc>,
    pub role: UserRole,
    pub status: UserStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudentSummary {
    pub id: StudentId,
    pub full_name: String,
    pub date_of_birth: NaiveDate,
    pub age: i32,
    pub status: StudentStatus,
}

impl StudentSummary {
    pub fn new(student: &Student, age: i32) -> Self {
        Self {
            id: student.id,
            full_name: student.full_name(),
            date_of_birth: student.date_of_birth,
            age,
            status: student.status,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    #[serde(flatten)]
    pub user: UserView,
    pub students: Vec<StudentSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudentView {
    #[serde(flatten)]
    pub student: Student,
    pub age: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentView {
    #[serde(flatten)]
    pub document: Document,
    pub status: &'static str,
}

impl From<Document> for DocumentView {
    fn from(document: Document) -> Self {
        let status = if document.is_verified {
            "Verified"
        } else {
            "Pending Verification"
        };
        Self { document, status }
    }
}

/// Milestone in the applicant-facing progress timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplicationStage {
    pub name: &'static str,
    pub completed: bool,
    pub date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentStatusEntry {
    pub document_type: DocumentType,
    pub file_name: String,
    pub status: &'static str,
    pub uploaded_at: DateTime<Utc>,
    pub verified_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterviewSummary {
    pub id: InterviewId,
    pub scheduled_date: NaiveDate,
    pub scheduled_time: NaiveTime,
    pub interview_type: InterviewType,
    pub interviewer_id: StaffId,
    pub interviewer_name: String,
    pub status: InterviewStatus,
    pub score: Option<u8>,
    pub meeting_link: Option<String>,
}

impl From<&Interview> for InterviewSummary {
    fn from(interview: &Interview) -> Self {
        Self {
            id: interview.id,
            scheduled_date: interview.scheduled_date,
            scheduled_time: interview.scheduled_time,
            interview_type: interview.interview_type,
            interviewer_id: interview.interviewer_id,
            interviewer_name: interview.interviewer_name.clone(),
            status: interview.status,
            score: interview.score,
            meeting_link: interview.meeting_link.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplicationStatusView {
    pub application_id: ApplicationId,
    pub application_number: String,
    pub student_id: StudentId,
    pub student_name: String,
    pub applying_for_level: EducationalLevel,
    pub applying_for_class: ClassLevel,
    pub status: ApplicationStatus,
    pub submitted_at: Option<DateTime<Utc>>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub decision_at: Option<DateTime<Utc>>,
    pub decision_remarks: Option<String>,
    pub stages: Vec<ApplicationStage>,
    pub documents: Vec<DocumentStatusEntry>,
    pub required_documents: Vec<ChecklistEntry>,
    pub documents_complete: bool,
    pub documents_verified: bool,
    pub interview: Option<InterviewSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplicationSummary {
    pub application_id: ApplicationId,
    pub application_number: String,
    pub student_id: StudentId,
    pub student_name: String,
    pub applying_for_level: EducationalLevel,
    pub applying_for_class: ClassLevel,
    pub status: ApplicationStatus,
    pub submitted_at: Option<DateTime<Utc>>,
    pub has_interview: bool,
    pub documents_complete: bool,
}

impl ApplicationSummary {
    pub fn new(
        application: &Application,
        student_name: String,
        has_interview: bool,
        documents_complete: bool,
    ) -> Self {
        Self {
            application_id: application.id,
            application_number: application.application_number.clone(),
            student_id: application.student_id,
            student_name,
            applying_for_level: application.applying_for_level,
            applying_for_class: application.applying_for_class,
            status: application.status,
            submitted_at: application.submitted_at,
            has_interview,
            documents_complete,
        }
    }
}

/// One page of a larger result set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
}

impl<T> Page<T> {
    /// Pages are 1-based; out-of-range pages come back empty.
    pub fn slice(all: Vec<T>, page: usize, page_size: usize) -> Self {
        let page = page.max(1);
        let page_size = page_size.max(1);
        let total = all.len();
        let items = all
            .into_iter()
            .skip((page - 1).saturating_mul(page_size))
            .take(page_size)
            .collect();
        Self {
            items,
            total,
            page,
            page_size,
        }
    }
}
