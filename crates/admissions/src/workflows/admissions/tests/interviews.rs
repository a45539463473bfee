use chrono::{Duration, TimeZone, Utc};

use super::common::*;
use crate::workflows::admissions::domain::{
    ApplicationStatus, InterviewId, InterviewStatus, InterviewType, StaffId, StaffType, UserRole,
};
use crate::workflows::admissions::error::AdmissionsError;
use crate::workflows::admissions::requests::{ConductInterviewRequest, UpcomingInterviewsQuery};
use crate::workflows::admissions::repository::ApplicationRepository;

fn conduct(score: i32) -> ConductInterviewRequest {
    ConductInterviewRequest {
        score,
        feedback: "Answered clearly and confidently".to_string(),
        remarks: None,
    }
}

/// Moves the clock to `hour:minute` on the interview day.
fn interview_day_at(h: &Harness, hour: u32, minute: u32) {
    h.clock
        .set(Utc.with_ymd_and_hms(2025, 9, 3, hour, minute, 0).unwrap());
}

#[test]
fn scheduling_books_the_slot_and_advances_the_application() {
    let h = harness();
    let admin = h.admin();
    let (_, staff) = h.teacher(&admin);
    let (_, application, interview) = h.scheduled(&admin, &staff, time(10, 0));

    assert_eq!(interview.status, InterviewStatus::Scheduled);
    assert_eq!(interview.interviewer_id, staff.id);
    assert_eq!(interview.interviewer_name, "Adaeze Nwosu");
    assert_eq!(interview.scheduled_by, admin.user_id);

    let stored = h
        .store
        .application(&application.id)
        .expect("store reachable")
        .expect("application stored");
    assert_eq!(stored.status, ApplicationStatus::InterviewScheduled);
}

#[test]
fn only_admissions_staff_schedule() {
    let h = harness();
    let admin = h.admin();
    let (teacher, staff) = h.teacher(&admin);
    let (parent, application) = h.under_review(&admin);

    for actor in [parent, teacher] {
        let message = expect_unauthorized(h.service.schedule_interview(
            &actor,
            schedule_request(application.id, staff.id, time(10, 0)),
        ));
        assert_eq!(message, "Only admissions staff can schedule interviews");
    }
}

#[test]
fn slot_rules_are_reported_together() {
    let h = harness();
    let admin = h.admin();
    let (_, staff) = h.teacher(&admin);
    let (_, application) = h.under_review(&admin);

    let mut request = schedule_request(application.id, staff.id, time(7, 30));
    request.scheduled_date = date(2025, 8, 29);
    request.interview_type = InterviewType::Virtual;
    request.meeting_link = Some("http://meet.example.ng/room".to_string());

    let (message, errors) = expect_validation(h.service.schedule_interview(&admin, request));
    assert_eq!(message, "Interview date cannot be in the past");
    assert_eq!(
        errors,
        vec![
            "Interview date cannot be in the past".to_string(),
            "Interview time must be between 8:00 AM and 4:00 PM".to_string(),
            "Virtual interviews require a meeting link starting with https://".to_string(),
        ]
    );

    let mut virtual_ok = schedule_request(application.id, staff.id, time(16, 0));
    virtual_ok.interview_type = InterviewType::Virtual;
    virtual_ok.meeting_link = Some("https://meet.example.ng/room".to_string());
    h.service
        .schedule_interview(&admin, virtual_ok)
        .expect("4:00 PM with a secure link is accepted");
}

#[test]
fn applications_must_be_under_review() {
    let h = harness();
    let admin = h.admin();
    let (_, staff) = h.teacher(&admin);
    let (_, application) = h.submitted();

    let message = expect_invalid_state(h.service.schedule_interview(
        &admin,
        schedule_request(application.id, staff.id, time(10, 0)),
    ));
    assert_eq!(
        message,
        "Application in Submitted status cannot have an interview scheduled"
    );
}

#[test]
fn interviewers_must_be_active_teaching_staff() {
    let h = harness();
    let admin = h.admin();
    let (_, application) = h.under_review(&admin);

    match h.service.schedule_interview(
        &admin,
        schedule_request(application.id, StaffId::new(), time(10, 0)),
    ) {
        Err(AdmissionsError::NotFound(message)) => assert_eq!(message, "Interviewer not found"),
        other => panic!("expected not found, got {other:?}"),
    }

    let (email, _) = h.contact("bursar");
    let bursar = h
        .service
        .create_staff(&admin, staff_request(&email, StaffType::Administrative))
        .expect("staff created");
    let message = expect_invalid_state(h.service.schedule_interview(
        &admin,
        schedule_request(application.id, bursar.id, time(10, 0)),
    ));
    assert_eq!(message, "Interviewer must be an active teaching staff member");
}

#[test]
fn an_interviewer_cannot_be_double_booked() {
    let h = harness();
    let admin = h.admin();
    let (_, staff) = h.teacher(&admin);
    h.scheduled(&admin, &staff, time(10, 0));
    let (_, second) = h.under_review(&admin);

    let message = expect_conflict(h.service.schedule_interview(
        &admin,
        schedule_request(second.id, staff.id, time(10, 0)),
    ));
    assert_eq!(message, "Interviewer already has an interview scheduled at this time");

    let stored = h
        .store
        .application(&second.id)
        .expect("store reachable")
        .expect("application stored");
    assert_eq!(stored.status, ApplicationStatus::UnderReview);

    h.service
        .schedule_interview(&admin, schedule_request(second.id, staff.id, time(10, 30)))
        .expect("a different start time is free");
}

#[test]
fn passing_scores_approve_and_failing_scores_reject() {
    let h = harness();
    let admin = h.admin();
    let (teacher, staff) = h.teacher(&admin);
    let (_, passed, passed_interview) = h.scheduled(&admin, &staff, time(10, 0));
    let (_, failed, failed_interview) = h.scheduled(&admin, &staff, time(11, 0));

    interview_day_at(&h, 11, 5);
    let conducted = h
        .service
        .conduct_interview(&teacher, passed_interview.id, conduct(70))
        .expect("score recorded");
    assert_eq!(conducted.status, InterviewStatus::Completed);
    assert_eq!(conducted.score, Some(70));
    assert!(conducted.conducted_at.is_some());

    let mut low = conduct(69);
    low.remarks = Some("Needs support in mathematics".to_string());
    h.service
        .conduct_interview(&teacher, failed_interview.id, low)
        .expect("score recorded");

    let approved = h
        .store
        .application(&passed.id)
        .expect("store reachable")
        .expect("application stored");
    assert_eq!(approved.status, ApplicationStatus::Approved);
    assert_eq!(
        approved.decision_remarks.as_deref(),
        Some("Interview passed with score: 70/100.")
    );
    assert!(approved.decision_at.is_some());

    let rejected = h
        .store
        .application(&failed.id)
        .expect("store reachable")
        .expect("application stored");
    assert_eq!(rejected.status, ApplicationStatus::Rejected);
    assert_eq!(
        rejected.decision_remarks.as_deref(),
        Some("Interview failed with score: 69/100. Needs support in mathematics")
    );
}

#[test]
fn interviews_open_fifteen_minutes_early() {
    let h = harness();
    let admin = h.admin();
    let (teacher, staff) = h.teacher(&admin);
    let (_, _, interview) = h.scheduled(&admin, &staff, time(10, 0));

    interview_day_at(&h, 9, 44);
    let message = expect_invalid_state(h.service.conduct_interview(
        &teacher,
        interview.id,
        conduct(80),
    ));
    assert_eq!(message, "Interview can only be conducted at or after scheduled time");

    h.clock.advance(Duration::minutes(1));
    h.service
        .conduct_interview(&teacher, interview.id, conduct(80))
        .expect("fifteen minutes early is allowed");

    let message = expect_invalid_state(h.service.conduct_interview(
        &teacher,
        interview.id,
        conduct(80),
    ));
    assert_eq!(message, "Interview is already Completed");
}

#[test]
fn only_the_assigned_interviewer_conducts() {
    let h = harness();
    let admin = h.admin();
    let (_, staff) = h.teacher(&admin);
    let (other_teacher, _) = h.teacher(&admin);
    let (parent, _, interview) = h.scheduled(&admin, &staff, time(10, 0));
    interview_day_at(&h, 10, 0);

    for actor in [other_teacher, admin, parent] {
        let message = expect_unauthorized(h.service.conduct_interview(
            &actor,
            interview.id,
            conduct(90),
        ));
        assert_eq!(message, "Only the assigned interviewer can conduct this interview");
    }
}

#[test]
fn officers_on_the_teaching_roster_conduct_their_own_interviews() {
    let h = harness();
    let admin = h.admin();
    let officer = h.provision(UserRole::AdmissionOfficer);
    let (email, _) = h.contact("officer-staff");
    let mut request = staff_request(&email, StaffType::Teaching);
    request.user_id = Some(officer.user_id);
    let staff = h
        .service
        .create_staff(&admin, request)
        .expect("officer linked to teaching staff");

    let (_, application, interview) = h.scheduled(&admin, &staff, time(10, 0));
    interview_day_at(&h, 10, 0);

    let message = expect_unauthorized(h.service.conduct_interview(
        &admin,
        interview.id,
        conduct(85),
    ));
    assert_eq!(message, "Only the assigned interviewer can conduct this interview");

    let conducted = h
        .service
        .conduct_interview(&officer, interview.id, conduct(85))
        .expect("assigned officer conducts");
    assert_eq!(conducted.status, InterviewStatus::Completed);
    let decided = h
        .store
        .application(&application.id)
        .expect("store reachable")
        .expect("application stored");
    assert_eq!(decided.status, ApplicationStatus::Approved);
}

#[test]
fn scores_outside_the_scale_are_rejected() {
    let h = harness();
    let admin = h.admin();
    let (teacher, staff) = h.teacher(&admin);
    let (_, _, interview) = h.scheduled(&admin, &staff, time(10, 0));
    interview_day_at(&h, 10, 0);

    let (message, _) = expect_validation(h.service.conduct_interview(
        &teacher,
        interview.id,
        conduct(101),
    ));
    assert_eq!(message, "Score must be between 0 and 100");

    h.service
        .conduct_interview(&teacher, interview.id, conduct(0))
        .expect("zero is a valid score");
}

#[test]
fn interview_details_follow_application_access() {
    let h = harness();
    let admin = h.admin();
    let (teacher, staff) = h.teacher(&admin);
    let (parent, _, interview) = h.scheduled(&admin, &staff, time(10, 0));

    for actor in [parent, teacher, admin] {
        assert_eq!(
            h.service
                .interview(&actor, interview.id)
                .expect("visible")
                .id,
            interview.id
        );
    }

    let stranger = h.parent();
    let message = expect_unauthorized(h.service.interview(&stranger, interview.id));
    assert_eq!(message, "You do not have access to this interview");
    let message = expect_unauthorized(h.service.interview(&stranger, InterviewId::new()));
    assert_eq!(message, "You do not have access to this interview");
}

#[test]
fn upcoming_interviews_are_scoped_to_the_caller() {
    let h = harness();
    let admin = h.admin();
    let (teacher, staff) = h.teacher(&admin);
    let (other_teacher, other_staff) = h.teacher(&admin);
    let (parent, _, own) = h.scheduled(&admin, &staff, time(11, 0));
    h.scheduled(&admin, &staff, time(9, 0));
    h.scheduled(&admin, &other_staff, time(10, 0));

    let all = h
        .service
        .upcoming_interviews(&admin, UpcomingInterviewsQuery::default())
        .expect("admins see every interview");
    assert_eq!(all.len(), 3);
    let times: Vec<_> = all.iter().map(|i| i.scheduled_time).collect();
    assert_eq!(times, vec![time(9, 0), time(10, 0), time(11, 0)]);

    let limited = h
        .service
        .upcoming_interviews(
            &admin,
            UpcomingInterviewsQuery {
                limit: Some(2),
                ..UpcomingInterviewsQuery::default()
            },
        )
        .expect("limit applies");
    assert_eq!(limited.len(), 2);

    let outside = h
        .service
        .upcoming_interviews(
            &admin,
            UpcomingInterviewsQuery {
                to: Some(date(2025, 9, 2)),
                ..UpcomingInterviewsQuery::default()
            },
        )
        .expect("window applies");
    assert!(outside.is_empty());

    assert_eq!(
        h.service
            .upcoming_interviews(&teacher, UpcomingInterviewsQuery::default())
            .expect("own panel")
            .len(),
        2
    );
    assert_eq!(
        h.service
            .upcoming_interviews(&other_teacher, UpcomingInterviewsQuery::default())
            .expect("own panel")
            .len(),
        1
    );

    let mine = h
        .service
        .upcoming_interviews(&parent, UpcomingInterviewsQuery::default())
        .expect("parent sees own");
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].id, own.id);

    h.clock.advance(Duration::days(3));
    assert!(h
        .service
        .upcoming_interviews(&admin, UpcomingInterviewsQuery::default())
        .expect("past interviews drop off")
        .is_empty());

    let student = h.provision(UserRole::Student);
    let message = expect_unauthorized(
        h.service
            .upcoming_interviews(&student, UpcomingInterviewsQuery::default()),
    );
    assert_eq!(message, "You do not have access to interviews");
}

#[test]
fn availability_ranks_free_interviewers_first() {
    let h = harness();
    let admin = h.admin();
    let (_, busy) = h.teacher(&admin);
    let (_, free) = h.teacher(&admin);
    for hour in 9..13 {
        h.scheduled(&admin, &busy, time(hour, 0));
    }

    let entries = h
        .service
        .available_interviewers(&admin, interview_day())
        .expect("availability computed");
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].staff_id, free.id);
    assert!(entries[0].is_available);
    assert_eq!(entries[0].next_available_date, interview_day());
    assert_eq!(entries[1].staff_id, busy.id);
    assert!(!entries[1].is_available);
    assert_eq!(entries[1].next_available_date, date(2025, 9, 4));

    let parent = h.parent();
    let message = expect_unauthorized(h.service.available_interviewers(&parent, interview_day()));
    assert_eq!(
        message,
        "Only admissions staff can look up interviewer availability"
    );
}
