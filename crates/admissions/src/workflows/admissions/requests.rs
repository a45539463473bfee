//! Inbound payloads and their field-level validation.

use std::borrow::Cow;
use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveTime};
use regex::Regex;
use serde::Deserialize;
use validator::{Validate, ValidationError, ValidationErrors};

use super::domain::{
    ApplicationId, ApplicationStatus, ClassLevel, Department, DocumentType, EducationalLevel,
    Gender, InterviewType, NigerianAddress, NigerianState, ParentInfo, SecondaryStream,
    StaffId, StaffStatus, StaffType, StudentId, UserId, UserRole,
};

static NIGERIAN_PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\+234|0)[789][01]\d{8}$").expect("valid phone regex"));

static ACADEMIC_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}/\d{4}$").expect("valid academic year regex"));

fn failure(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

fn nigerian_phone(value: &str) -> Result<(), ValidationError> {
    if NIGERIAN_PHONE.is_match(value) {
        Ok(())
    } else {
        Err(failure(
            "phone",
            "Phone number must be a valid Nigerian number (e.g. 08031234567 or +2348031234567)",
        ))
    }
}

fn password_complexity(value: &str) -> Result<(), ValidationError> {
    let upper = value.chars().any(|c| c.is_ascii_uppercase());
    let lower = value.chars().any(|c| c.is_ascii_lowercase());
    let digit = value.chars().any(|c| c.is_ascii_digit());
    if upper && lower && digit {
        Ok(())
    } else {
        Err(failure(
            "password",
            "Password must contain at least one uppercase letter, one lowercase letter, and one number",
        ))
    }
}

fn academic_year(value: &str) -> Result<(), ValidationError> {
    if ACADEMIC_YEAR.is_match(value) {
        Ok(())
    } else {
        Err(failure(
            "academic_year",
            "Academic year must look like 2025/2026",
        ))
    }
}

fn address(value: &NigerianAddress) -> Result<(), ValidationError> {
    if [&value.street, &value.city, &value.lga]
        .iter()
        .any(|field| field.trim().is_empty())
    {
        return Err(failure(
            "address",
            "Address street, city and LGA are required",
        ));
    }
    Ok(())
}

/// Flattens validator output into a stable, de-duplicated message list.
pub(crate) fn messages(errors: &ValidationErrors) -> Vec<String> {
    let mut messages: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |err| match &err.message {
                Some(message) => message.to_string(),
                None => format!("{field} is invalid"),
            })
        })
        .collect();
    messages.sort();
    messages.dedup();
    messages
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterUserRequest {
    #[validate(
        email(message = "A valid email address is required"),
        length(max = 100, message = "Email cannot exceed 100 characters")
    )]
    pub email: String,
    #[validate(custom(function = "nigerian_phone"))]
    pub phone_number: String,
    #[validate(
        length(min = 8, max = 100, message = "Password must be between 8 and 100 characters"),
        custom(function = "password_complexity")
    )]
    pub password: String,
    pub confirm_password: String,
    #[validate(length(min = 1, max = 50, message = "First name must be between 1 and 50 characters"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 50, message = "Last name must be between 1 and 50 characters"))]
    pub last_name: String,
    #[validate(length(max = 50, message = "Middle name cannot exceed 50 characters"))]
    #[serde(default)]
    pub middle_name: Option<String>,
    pub role: UserRole,
    #[serde(default)]
    pub state_of_origin: Option<NigerianState>,
    #[serde(default)]
    pub lga: Option<String>,
}

impl RegisterUserRequest {
    /// Field rules plus the cross-field checks the derive cannot express.
    pub fn violations(&self) -> Vec<String> {
        let mut errors = match self.validate() {
            Ok(()) => Vec::new(),
            Err(errors) => messages(&errors),
        };
        if self.password != self.confirm_password {
            errors.push("Passwords do not match".to_string());
        }
        if !self.role.is_self_registrable() {
            errors.push("Only Parent or Student accounts can self-register".to_string());
        }
        errors
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Account created directly by an operator, bypassing email verification.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ProvisionUserRequest {
    #[validate(email(message = "A valid email address is required"))]
    pub email: String,
    #[validate(custom(function = "nigerian_phone"))]
    pub phone_number: String,
    #[validate(
        length(min = 8, max = 100, message = "Password must be between 8 and 100 characters"),
        custom(function = "password_complexity")
    )]
    pub password: String,
    #[validate(length(min = 1, max = 50, message = "First name must be between 1 and 50 characters"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 50, message = "Last name must be between 1 and 50 characters"))]
    pub last_name: String,
    pub role: UserRole,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateStudentRequest {
    #[validate(length(min = 1, max = 50, message = "First name must be between 1 and 50 characters"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 50, message = "Last name must be between 1 and 50 characters"))]
    pub last_name: String,
    #[validate(length(max = 50, message = "Middle name cannot exceed 50 characters"))]
    #[serde(default)]
    pub middle_name: Option<String>,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    #[serde(default)]
    pub religion: Option<String>,
    #[validate(email(message = "Student email must be a valid email address"))]
    #[serde(default)]
    pub email: Option<String>,
    #[validate(custom(function = "nigerian_phone"))]
    #[serde(default)]
    pub phone_number: Option<String>,
    #[validate(custom(function = "address"))]
    pub address: NigerianAddress,
    #[serde(default)]
    pub previous_school: Option<String>,
    #[serde(default)]
    pub previous_class: Option<String>,
    pub state_of_origin: NigerianState,
    #[validate(length(min = 1, max = 100, message = "LGA is required"))]
    pub lga: String,
    #[serde(default)]
    pub nationality: Option<String>,
    #[serde(default)]
    pub selected_stream: Option<SecondaryStream>,
    #[serde(default)]
    pub father: Option<ParentInfo>,
    #[serde(default)]
    pub mother: Option<ParentInfo>,
    #[serde(default)]
    pub guardian: Option<ParentInfo>,
}

/// Address fields to change. Any present field replaces the whole address value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddressPatch {
    pub street: Option<String>,
    pub city: Option<String>,
    pub lga: Option<String>,
    pub state: Option<NigerianState>,
    pub postal_code: Option<String>,
}

impl AddressPatch {
    pub fn is_empty(&self) -> bool {
        self.street.is_none()
            && self.city.is_none()
            && self.lga.is_none()
            && self.state.is_none()
            && self.postal_code.is_none()
    }

    pub fn merged_onto(&self, current: &NigerianAddress) -> NigerianAddress {
        NigerianAddress {
            street: self.street.clone().unwrap_or_else(|| current.street.clone()),
            city: self.city.clone().unwrap_or_else(|| current.city.clone()),
            lga: self.lga.clone().unwrap_or_else(|| current.lga.clone()),
            state: self.state.unwrap_or(current.state),
            postal_code: self.postal_code.clone().or_else(|| current.postal_code.clone()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateStudentRequest {
    #[validate(length(min = 1, max = 50, message = "First name must be between 1 and 50 characters"))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 50, message = "Last name must be between 1 and 50 characters"))]
    pub last_name: Option<String>,
    #[validate(length(max = 50, message = "Middle name cannot exceed 50 characters"))]
    pub middle_name: Option<String>,
    pub religion: Option<String>,
    #[validate(email(message = "Student email must be a valid email address"))]
    pub email: Option<String>,
    #[validate(custom(function = "nigerian_phone"))]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub address: AddressPatch,
    pub previous_school: Option<String>,
    pub previous_class: Option<String>,
    pub selected_stream: Option<SecondaryStream>,
    pub father: Option<ParentInfo>,
    pub mother: Option<ParentInfo>,
    pub guardian: Option<ParentInfo>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SubmitApplicationRequest {
    pub student_id: StudentId,
    pub applying_for_level: EducationalLevel,
    pub applying_for_class: ClassLevel,
    #[serde(default)]
    pub preferred_stream: Option<SecondaryStream>,
    #[validate(custom(function = "academic_year"))]
    pub academic_year: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ReviewApplicationRequest {
    #[validate(length(max = 1000, message = "Review notes cannot exceed 1000 characters"))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UploadDocumentRequest {
    pub application_id: ApplicationId,
    pub document_type: DocumentType,
    #[validate(length(min = 1, max = 255, message = "File name must be between 1 and 255 characters"))]
    pub file_name: String,
    #[validate(length(min = 1, max = 100, message = "Content type is required"))]
    pub content_type: String,
    pub file_size: u64,
    #[serde(default)]
    pub file_url: Option<String>,
    #[validate(length(max = 500, message = "Description cannot exceed 500 characters"))]
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct VerifyDocumentRequest {
    pub is_verified: bool,
    #[validate(length(max = 500, message = "Verification notes cannot exceed 500 characters"))]
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ScheduleInterviewRequest {
    pub application_id: ApplicationId,
    pub interviewer_id: StaffId,
    pub scheduled_date: NaiveDate,
    pub scheduled_time: NaiveTime,
    pub interview_type: InterviewType,
    #[validate(length(max = 500, message = "Meeting link cannot exceed 500 characters"))]
    #[serde(default)]
    pub meeting_link: Option<String>,
    #[serde(default)]
    pub meeting_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ConductInterviewRequest {
    #[validate(range(min = 0, max = 100, message = "Score must be between 0 and 100"))]
    pub score: i32,
    #[validate(length(min = 1, max = 1000, message = "Feedback is required and cannot exceed 1000 characters"))]
    pub feedback: String,
    #[validate(length(max = 500, message = "Remarks cannot exceed 500 characters"))]
    #[serde(default)]
    pub remarks: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateStaffRequest {
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[validate(length(min = 1, max = 50, message = "First name must be between 1 and 50 characters"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 50, message = "Last name must be between 1 and 50 characters"))]
    pub last_name: String,
    #[validate(length(max = 50, message = "Middle name cannot exceed 50 characters"))]
    #[serde(default)]
    pub middle_name: Option<String>,
    #[validate(email(message = "A valid email address is required"))]
    pub email: String,
    #[validate(custom(function = "nigerian_phone"))]
    pub phone_number: String,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    pub staff_type: StaffType,
    pub department: Department,
    #[validate(length(min = 1, max = 100, message = "Qualification is required"))]
    pub qualification: String,
    pub employment_date: NaiveDate,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct UpdateStaffStatusRequest {
    pub status: StaffStatus,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApplicationFilter {
    pub status: Option<ApplicationStatus>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StudentSearch {
    pub search: Option<String>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpcomingInterviewsQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub limit: Option<usize>,
}
