use chrono::{NaiveDate, NaiveTime};

use super::domain::{
    Application, ApplicationId, Document, DocumentId, Interview, InterviewId, Staff, StaffId,
    Student, StudentId, User, UserId,
};

/// Error enumeration for repository failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    /// A uniqueness rule rejected the write. The message is safe to show to callers.
    #[error("{0}")]
    Conflict(String),
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

pub trait UserRepository: Send + Sync {
    /// Rejects duplicate email addresses and phone numbers.
    fn insert_user(&self, user: User) -> Result<User, RepositoryError>;
    fn update_user(&self, user: User) -> Result<(), RepositoryError>;
    fn user(&self, id: &UserId) -> Result<Option<User>, RepositoryError>;
    fn user_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError>;
    fn user_by_phone(&self, phone_number: &str) -> Result<Option<User>, RepositoryError>;
    fn user_by_verification_token(&self, token: &str) -> Result<Option<User>, RepositoryError>;
}

pub trait StudentRepository: Send + Sync {
    fn insert_student(&self, student: Student) -> Result<Student, RepositoryError>;
    fn update_student(&self, student: Student) -> Result<(), RepositoryError>;
    fn student(&self, id: &StudentId) -> Result<Option<Student>, RepositoryError>;
    fn student_by_email(&self, email: &str) -> Result<Option<Student>, RepositoryError>;
    fn student_by_phone(&self, phone_number: &str) -> Result<Option<Student>, RepositoryError>;
    fn students_by_parent(&self, parent: &UserId) -> Result<Vec<Student>, RepositoryError>;
    /// Case-insensitive match on name, email, or phone. `None` lists everyone.
    fn search_students(&self, search: Option<&str>) -> Result<Vec<Student>, RepositoryError>;
}

pub trait ApplicationRepository: Send + Sync {
    /// Rejects a duplicate application number, or a second active application for the
    /// same student.
    fn insert_application(&self, application: Application)
        -> Result<Application, RepositoryError>;
    fn update_application(&self, application: Application) -> Result<(), RepositoryError>;
    fn application(&self, id: &ApplicationId) -> Result<Option<Application>, RepositoryError>;
    fn application_by_number(&self, number: &str)
        -> Result<Option<Application>, RepositoryError>;
    fn applications_by_student(
        &self,
        student: &StudentId,
    ) -> Result<Vec<Application>, RepositoryError>;
    fn applications_by_parent(&self, parent: &UserId)
        -> Result<Vec<Application>, RepositoryError>;
}

pub trait DocumentRepository: Send + Sync {
    /// Rejects a reused file name or a second document of the same type on an application.
    fn insert_document(&self, document: Document) -> Result<Document, RepositoryError>;
    fn update_document(&self, document: Document) -> Result<(), RepositoryError>;
    fn document(&self, id: &DocumentId) -> Result<Option<Document>, RepositoryError>;
    fn document_by_file_name(&self, file_name: &str)
        -> Result<Option<Document>, RepositoryError>;
    fn documents_by_application(
        &self,
        application: &ApplicationId,
    ) -> Result<Vec<Document>, RepositoryError>;
}

pub trait InterviewRepository: Send + Sync {
    fn interview(&self, id: &InterviewId) -> Result<Option<Interview>, RepositoryError>;
    fn interview_by_application(
        &self,
        application: &ApplicationId,
    ) -> Result<Option<Interview>, RepositoryError>;
    /// Interviews still in `Scheduled` status, optionally restricted to one interviewer.
    fn scheduled_interviews(
        &self,
        interviewer: Option<&StaffId>,
    ) -> Result<Vec<Interview>, RepositoryError>;
    fn slot_taken(
        &self,
        interviewer: &StaffId,
        date: NaiveDate,
        time: NaiveTime,
    ) -> Result<bool, RepositoryError>;
    /// Books the interview and stores the advanced application in one step. Fails with
    /// `Conflict` when the interviewer's slot is taken or the stored application has moved
    /// on since it was read.
    fn schedule(
        &self,
        interview: Interview,
        application: Application,
    ) -> Result<Interview, RepositoryError>;
    /// Stores a conducted interview together with the application decision. Conflicts unless
    /// the stored interview is still scheduled and the application still awaits it.
    fn complete(
        &self,
        interview: Interview,
        application: Application,
    ) -> Result<(), RepositoryError>;
}

pub trait StaffRepository: Send + Sync {
    /// Rejects a duplicate staff email.
    fn insert_staff(&self, staff: Staff) -> Result<Staff, RepositoryError>;
    fn update_staff(&self, staff: Staff) -> Result<(), RepositoryError>;
    fn staff(&self, id: &StaffId) -> Result<Option<Staff>, RepositoryError>;
    fn staff_by_user(&self, user: &UserId) -> Result<Option<Staff>, RepositoryError>;
    fn staff_by_email(&self, email: &str) -> Result<Option<Staff>, RepositoryError>;
    fn active_teaching_staff(&self) -> Result<Vec<Staff>, RepositoryError>;
    fn staff_count(&self) -> Result<usize, RepositoryError>;
}

/// Everything the admissions service persists, bundled for a single generic parameter.
pub trait AdmissionsStore:
    UserRepository
    + StudentRepository
    + ApplicationRepository
    + DocumentRepository
    + InterviewRepository
    + StaffRepository
{
}

impl<T> AdmissionsStore for T where
    T: UserRepository
        + StudentRepository
        + ApplicationRepository
        + DocumentRepository
        + InterviewRepository
        + StaffRepository
{
}
