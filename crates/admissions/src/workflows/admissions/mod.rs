//! Admissions pipeline from parent registration to the interview decision.
//!
//! Pure rules (eligibility, lifecycle, document checklist, scheduling, access) live in their
//! own modules and are composed by [`AdmissionsService`] over an [`AdmissionsStore`].

pub mod access;
pub mod clock;
pub mod credentials;
pub mod documents;
pub mod domain;
pub mod eligibility;
pub mod error;
pub mod lifecycle;
pub mod numbering;
pub mod policy;
pub mod repository;
pub mod requests;
pub mod router;
pub mod scheduling;
mod service;
pub mod store;
pub mod views;

#[cfg(test)]
mod tests;

pub use access::{can_access, Action, Actor, Resource, ResourceKind};
pub use clock::{Clock, FixedClock, SystemClock};
pub use credentials::{
    Argon2PasswordHasher, CredentialError, IssuedToken, JwtSettings, JwtTokenService,
    PasswordHasher, TokenClaims, TokenService,
};
pub use documents::{DocumentChecklist, REQUIRED_DOCUMENT_TYPES};
pub use domain::{
    Application, ApplicationId, ApplicationStatus, ClassLevel, Department, Document,
    DocumentId, DocumentType, EducationalLevel, Gender, Interview, InterviewId, InterviewStatus,
    InterviewType, NigerianAddress, NigerianState, ParentInfo, Staff, StaffId, StaffStatus,
    StaffType, Student, StudentId, StudentStatus, User, UserId, UserRole, UserStatus,
};
pub use eligibility::{check_eligibility, EligibilityCheck};
pub use error::{AdmissionsError, ErrorKind, Failure};
pub use lifecycle::ApplicationTrigger;
pub use numbering::{
    ApplicationNumberGenerator, RandomApplicationNumbers, SequentialApplicationNumbers,
};
pub use policy::AdmissionsPolicy;
pub use repository::{AdmissionsStore, RepositoryError};
pub use router::admissions_router;
pub use scheduling::InterviewerAvailability;
pub use service::AdmissionsService;
pub use store::InMemoryAdmissionsStore;
