use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

entity_id!(
    /// Identifier for registered accounts (parents, staff logins, administrators).
    UserId
);
entity_id!(StudentId);
entity_id!(ApplicationId);
entity_id!(DocumentId);
entity_id!(InterviewId);
entity_id!(StaffId);

/// Roles recognised by the authorization guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UserRole {
    SuperAdmin,
    SchoolAdmin,
    AdmissionOfficer,
    Teacher,
    Parent,
    Student,
}

impl UserRole {
    pub const fn label(self) -> &'static str {
        match self {
            UserRole::SuperAdmin => "SuperAdmin",
            UserRole::SchoolAdmin => "SchoolAdmin",
            UserRole::AdmissionOfficer => "AdmissionOfficer",
            UserRole::Teacher => "Teacher",
            UserRole::Parent => "Parent",
            UserRole::Student => "Student",
        }
    }

    /// Roles that review applications and manage the admission pipeline.
    pub const fn is_admissions_staff(self) -> bool {
        matches!(
            self,
            UserRole::SuperAdmin | UserRole::SchoolAdmin | UserRole::AdmissionOfficer
        )
    }

    /// Roles a member of the public may pick when self-registering.
    pub const fn is_self_registrable(self) -> bool {
        matches!(self, UserRole::Parent | UserRole::Student)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UserStatus {
    Active,
    Inactive,
    Suspended,
    Locked,
    PendingVerification,
}

impl UserStatus {
    pub const fn label(self) -> &'static str {
        match self {
            UserStatus::Active => "Active",
            UserStatus::Inactive => "Inactive",
            UserStatus::Suspended => "Suspended",
            UserStatus::Locked => "Locked",
            UserStatus::PendingVerification => "PendingVerification",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StudentStatus {
    Prospective,
    Admitted,
    Active,
    Graduated,
    Withdrawn,
    Suspended,
}

/// Application lifecycle states. Transitions live in `lifecycle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApplicationStatus {
    Draft,
    Submitted,
    UnderReview,
    InterviewScheduled,
    Approved,
    Rejected,
    Waitlisted,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Draft => "Draft",
            ApplicationStatus::Submitted => "Submitted",
            ApplicationStatus::UnderReview => "UnderReview",
            ApplicationStatus::InterviewScheduled => "InterviewScheduled",
            ApplicationStatus::Approved => "Approved",
            ApplicationStatus::Rejected => "Rejected",
            ApplicationStatus::Waitlisted => "Waitlisted",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DocumentType {
    BirthCertificate,
    PreviousSchoolReport,
    RecommendationLetter,
    PassportPhotograph,
    MedicalCertificate,
    TransferCertificate,
}

impl DocumentType {
    pub const fn label(self) -> &'static str {
        match self {
            DocumentType::BirthCertificate => "BirthCertificate",
            DocumentType::PreviousSchoolReport => "PreviousSchoolReport",
            DocumentType::RecommendationLetter => "RecommendationLetter",
            DocumentType::PassportPhotograph => "PassportPhotograph",
            DocumentType::MedicalCertificate => "MedicalCertificate",
            DocumentType::TransferCertificate => "TransferCertificate",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InterviewType {
    InPerson,
    Virtual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InterviewStatus {
    Scheduled,
    Completed,
    Cancelled,
    Rescheduled,
}

impl InterviewStatus {
    pub const fn label(self) -> &'static str {
        match self {
            InterviewStatus::Scheduled => "Scheduled",
            InterviewStatus::Completed => "Completed",
            InterviewStatus::Cancelled => "Cancelled",
            InterviewStatus::Rescheduled => "Rescheduled",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StaffType {
    Teaching,
    NonTeaching,
    Administrative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StaffStatus {
    Active,
    Inactive,
    Suspended,
    Retired,
}

impl StaffStatus {
    pub const fn label(self) -> &'static str {
        match self {
            StaffStatus::Active => "Active",
            StaffStatus::Inactive => "Inactive",
            StaffStatus::Suspended => "Suspended",
            StaffStatus::Retired => "Retired",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Department {
    Science,
    Arts,
    Commercial,
    Administration,
    Accounts,
    #[serde(rename = "IT")]
    It,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

/// School stage an applicant is seeking admission into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EducationalLevel {
    Primary,
    JuniorSecondary,
    SeniorSecondary,
}

impl EducationalLevel {
    pub const fn label(self) -> &'static str {
        match self {
            EducationalLevel::Primary => "Primary",
            EducationalLevel::JuniorSecondary => "JuniorSecondary",
            EducationalLevel::SeniorSecondary => "SeniorSecondary",
        }
    }
}

impl fmt::Display for EducationalLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClassLevel {
    #[serde(rename = "JSS1")]
    Jss1,
    #[serde(rename = "JSS2")]
    Jss2,
    #[serde(rename = "JSS3")]
    Jss3,
    #[serde(rename = "SSS1")]
    Sss1,
    #[serde(rename = "SSS2")]
    Sss2,
    #[serde(rename = "SSS3")]
    Sss3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SecondaryStream {
    Science,
    Arts,
    Commercial,
}

/// The 36 states of the federation plus the Federal Capital Territory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NigerianState {
    Abia,
    Adamawa,
    AkwaIbom,
    Anambra,
    Bauchi,
    Bayelsa,
    Benue,
    Borno,
    CrossRiver,
    Delta,
    Ebonyi,
    Edo,
    Ekiti,
    Enugu,
    Gombe,
    Imo,
    Jigawa,
    Kaduna,
    Kano,
    Katsina,
    Kebbi,
    Kogi,
    Kwara,
    Lagos,
    Nasarawa,
    Niger,
    Ogun,
    Ondo,
    Osun,
    Oyo,
    Plateau,
    Rivers,
    Sokoto,
    Taraba,
    Yobe,
    Zamfara,
    #[serde(rename = "FCT")]
    Fct,
}

/// Postal address value object. Replaced wholesale, never patched in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NigerianAddress {
    pub street: String,
    pub city: String,
    pub lga: String,
    pub state: NigerianState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
}

/// Contact details for a parent or guardian recorded on a student profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentInfo {
    pub full_name: String,
    pub phone_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occupation: Option<String>,
    pub relationship: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub phone_number: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub middle_name: Option<String>,
    pub role: UserRole,
    pub status: UserStatus,
    pub state_of_origin: Option<NigerianState>,
    pub lga: Option<String>,
    pub is_email_verified: bool,
    pub email_verified_at: Option<DateTime<Utc>>,
    pub email_verification_token: Option<String>,
    pub email_verification_token_expires_at: Option<DateTime<Utc>>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub last_login_ip: Option<String>,
    pub failed_login_attempts: u32,
    pub lockout_end: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub parent_user_id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub middle_name: Option<String>,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    pub religion: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub address: NigerianAddress,
    pub previous_school: Option<String>,
    pub previous_class: Option<String>,
    pub state_of_origin: NigerianState,
    pub lga: String,
    pub nationality: String,
    pub selected_stream: Option<SecondaryStream>,
    pub status: StudentStatus,
    pub father: Option<ParentInfo>,
    pub mother: Option<ParentInfo>,
    pub guardian: Option<ParentInfo>,
    pub admission_number: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Student {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    pub application_number: String,
    pub student_id: StudentId,
    pub submitted_by: UserId,
    pub applying_for_level: EducationalLevel,
    pub applying_for_class: ClassLevel,
    pub preferred_stream: Option<SecondaryStream>,
    pub academic_year: String,
    pub status: ApplicationStatus,
    pub submitted_at: Option<DateTime<Utc>>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub decision_at: Option<DateTime<Utc>>,
    pub review_notes: Option<String>,
    pub decision_remarks: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub application_id: ApplicationId,
    pub student_id: StudentId,
    pub document_type: DocumentType,
    pub file_name: String,
    pub file_path: String,
    pub file_url: Option<String>,
    pub content_type: String,
    pub file_size: u64,
    pub description: Option<String>,
    pub uploaded_at: DateTime<Utc>,
    pub uploaded_by: UserId,
    pub is_verified: bool,
    pub verified_at: Option<DateTime<Utc>>,
    pub verified_by: Option<UserId>,
    pub verification_notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interview {
    pub id: InterviewId,
    pub application_id: ApplicationId,
    pub student_id: StudentId,
    pub scheduled_date: NaiveDate,
    pub scheduled_time: NaiveTime,
    pub interview_type: InterviewType,
    pub meeting_link: Option<String>,
    pub meeting_id: Option<String>,
    pub interviewer_id: StaffId,
    pub interviewer_name: String,
    pub status: InterviewStatus,
    pub score: Option<u8>,
    pub feedback: Option<String>,
    pub remarks: Option<String>,
    pub conducted_at: Option<DateTime<Utc>>,
    pub scheduled_by: UserId,
    pub created_at: DateTime<Utc>,
}

impl Interview {
    pub fn scheduled_at(&self) -> NaiveDateTime {
        self.scheduled_date.and_time(self.scheduled_time)
    }

    pub fn occupies(&self, interviewer: StaffId, date: NaiveDate, time: NaiveTime) -> bool {
        self.status == InterviewStatus::Scheduled
            && self.interviewer_id == interviewer
            && self.scheduled_date == date
            && self.scheduled_time == time
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Staff {
    pub id: StaffId,
    pub user_id: Option<UserId>,
    pub staff_number: String,
    pub first_name: String,
    pub last_name: String,
    pub middle_name: Option<String>,
    pub email: String,
    pub phone_number: String,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    pub staff_type: StaffType,
    pub department: Department,
    pub qualification: String,
    pub employment_date: NaiveDate,
    pub status: StaffStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Staff {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Only active teaching staff may sit on an admission interview panel.
    pub fn can_interview(&self) -> bool {
        self.status == StaffStatus::Active && self.staff_type == StaffType::Teaching
    }
}
