use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::Serialize;

use super::domain::{
    ApplicationStatus, Department, Interview, InterviewStatus, InterviewType, Staff, StaffId,
};

/// Scheduled interviews an interviewer can hold on one day.
pub const DAILY_INTERVIEW_CAPACITY: usize = 4;
pub const AVAILABILITY_LOOKAHEAD_DAYS: i64 = 7;
pub const EARLY_START_MINUTES: i64 = 15;
pub const PASS_MARK: u8 = 70;
pub const MAX_SCORE: u8 = 100;

const SCHOOL_DAY_START_SECS: u32 = 8 * 3600;
const SCHOOL_DAY_END_SECS: u32 = 16 * 3600;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SlotViolation {
    #[error("Interview date cannot be in the past")]
    DateInPast,
    #[error("Interview time must be between 8:00 AM and 4:00 PM")]
    OutsideSchoolHours,
    #[error("Virtual interviews require a meeting link starting with https://")]
    MissingMeetingLink,
}

/// Input rules for a requested slot, independent of who else is booked.
pub fn slot_violations(
    date: NaiveDate,
    time: NaiveTime,
    interview_type: InterviewType,
    meeting_link: Option<&str>,
    today: NaiveDate,
) -> Vec<SlotViolation> {
    let mut violations = Vec::new();
    if date < today {
        violations.push(SlotViolation::DateInPast);
    }
    let secs = time.num_seconds_from_midnight();
    if !(SCHOOL_DAY_START_SECS..=SCHOOL_DAY_END_SECS).contains(&secs) {
        violations.push(SlotViolation::OutsideSchoolHours);
    }
    if interview_type == InterviewType::Virtual
        && !meeting_link.is_some_and(|link| link.starts_with("https://"))
    {
        violations.push(SlotViolation::MissingMeetingLink);
    }
    violations
}

/// Exact-slot conflict: same interviewer, same date, same start time, still scheduled.
pub fn slot_is_taken<'a>(
    interviews: impl IntoIterator<Item = &'a Interview>,
    interviewer: StaffId,
    date: NaiveDate,
    time: NaiveTime,
) -> bool {
    interviews
        .into_iter()
        .any(|interview| interview.occupies(interviewer, date, time))
}

/// Interviews may begin up to fifteen minutes before their scheduled start.
pub fn can_conduct_at(interview: &Interview, now: NaiveDateTime) -> bool {
    now >= interview.scheduled_at() - Duration::minutes(EARLY_START_MINUTES)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterviewerAvailability {
    pub staff_id: StaffId,
    pub full_name: String,
    pub department: Department,
    pub qualification: String,
    pub is_available: bool,
    pub next_available_date: NaiveDate,
}

fn scheduled_on(interviews: &[Interview], date: NaiveDate) -> usize {
    interviews
        .iter()
        .filter(|i| i.status == InterviewStatus::Scheduled && i.scheduled_date == date)
        .count()
}

/// Availability of one interviewer given their booked interviews.
///
/// Past the lookahead window the day after it is reported without checking its load.
pub fn availability(
    staff: &Staff,
    interviews: &[Interview],
    date: NaiveDate,
) -> InterviewerAvailability {
    let is_available = scheduled_on(interviews, date) < DAILY_INTERVIEW_CAPACITY;
    let next_available_date = if is_available {
        date
    } else {
        (1..=AVAILABILITY_LOOKAHEAD_DAYS)
            .map(|offset| date + Duration::days(offset))
            .find(|day| scheduled_on(interviews, *day) < DAILY_INTERVIEW_CAPACITY)
            .unwrap_or(date + Duration::days(AVAILABILITY_LOOKAHEAD_DAYS + 1))
    };

    InterviewerAvailability {
        staff_id: staff.id,
        full_name: staff.full_name(),
        department: staff.department,
        qualification: staff.qualification.clone(),
        is_available,
        next_available_date,
    }
}

/// Available interviewers first, then alphabetical.
pub fn rank_availability(entries: &mut [InterviewerAvailability]) {
    entries.sort_by(|a, b| {
        b.is_available
            .cmp(&a.is_available)
            .then_with(|| a.full_name.cmp(&b.full_name))
    });
}

/// Decision derived from an interview score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterviewOutcome {
    pub passed: bool,
    pub decision: ApplicationStatus,
    pub decision_remarks: String,
}

pub fn interview_outcome(score: u8, remarks: Option<&str>) -> InterviewOutcome {
    let passed = score >= PASS_MARK;
    let verdict = if passed { "passed" } else { "failed" };
    let remarks = remarks.unwrap_or_default().trim();
    let decision_remarks = format!("Interview {verdict} with score: {score}/{MAX_SCORE}. {remarks}")
        .trim_end()
        .to_string();

    InterviewOutcome {
        passed,
        decision: if passed {
            ApplicationStatus::Approved
        } else {
            ApplicationStatus::Rejected
        },
        decision_remarks,
    }
}
