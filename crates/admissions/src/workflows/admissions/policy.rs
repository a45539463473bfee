use serde::{Deserialize, Serialize};

/// Tunable limits applied by the admissions service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdmissionsPolicy {
    pub max_failed_logins: u32,
    pub lockout_minutes: i64,
    pub verification_token_days: i64,
    pub minimum_student_age: i32,
    /// Students older than this are accepted but logged for follow-up.
    pub student_age_warning: i32,
    pub minimum_staff_age: i32,
    pub maximum_staff_age: i32,
    pub default_page_size: usize,
    pub max_page_size: usize,
    pub upcoming_interview_limit: usize,
    pub application_number_attempts: u8,
}

impl Default for AdmissionsPolicy {
    fn default() -> Self {
        Self {
            max_failed_logins: 5,
            lockout_minutes: 30,
            verification_token_days: 7,
            minimum_student_age: 10,
            student_age_warning: 18,
            minimum_staff_age: 18,
            maximum_staff_age: 65,
            default_page_size: 10,
            max_page_size: 100,
            upcoming_interview_limit: 50,
            application_number_attempts: 5,
        }
    }
}

impl AdmissionsPolicy {
    pub fn page_size(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.default_page_size)
            .clamp(1, self.max_page_size.max(1))
    }
}
