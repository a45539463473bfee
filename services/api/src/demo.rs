use admissions::config::AppConfig;
use admissions::error::AppError;
use admissions::workflows::admissions::requests::{
    ConductInterviewRequest, CreateStaffRequest, CreateStudentRequest, LoginRequest,
    ProvisionUserRequest, RegisterUserRequest, ReviewApplicationRequest,
    ScheduleInterviewRequest, SubmitApplicationRequest, UploadDocumentRequest,
    VerifyDocumentRequest,
};
use admissions::workflows::admissions::views::ApplicationStatusView;
use admissions::workflows::admissions::{
    Actor, AdmissionsService, ClassLevel, Department, EducationalLevel, FixedClock, Gender,
    InMemoryAdmissionsStore, InterviewType, JwtTokenService, NigerianAddress, NigerianState,
    StaffType, UserRole, REQUIRED_DOCUMENT_TYPES,
};
use chrono::{Datelike, Duration, NaiveDate, TimeZone, Utc};
use clap::Args;
use std::sync::Arc;

const DEMO_PASSWORD: &str = "Demo2025pass";

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Date the walkthrough starts on (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Interview score awarded at the end of the walkthrough (0-100).
    #[arg(long, default_value_t = 82, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub(crate) score: u8,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let today = args.today.unwrap_or_else(|| Utc::now().date_naive());
    let start = today
        .and_hms_opt(8, 0, 0)
        .map_or_else(Utc::now, |opening| Utc.from_utc_datetime(&opening));
    let clock = Arc::new(FixedClock::at(start));
    let service = AdmissionsService::new(
        Arc::new(InMemoryAdmissionsStore::default()),
        Arc::new(JwtTokenService::new(&config.auth.jwt)),
    )
    .with_clock(clock.clone());

    println!("School admissions walkthrough ({today})");

    let admin = service.provision_user(ProvisionUserRequest {
        email: "registrar@demo.school.ng".to_string(),
        phone_number: "08020000001".to_string(),
        password: DEMO_PASSWORD.to_string(),
        first_name: "Funke".to_string(),
        last_name: "Adeyemi".to_string(),
        role: UserRole::SchoolAdmin,
    })?;
    let admin = Actor::new(admin.id, UserRole::SchoolAdmin);
    let teacher = service.provision_user(ProvisionUserRequest {
        email: "interviews@demo.school.ng".to_string(),
        phone_number: "08020000002".to_string(),
        password: DEMO_PASSWORD.to_string(),
        first_name: "Emeka".to_string(),
        last_name: "Obi".to_string(),
        role: UserRole::Teacher,
    })?;
    let teacher = Actor::new(teacher.id, UserRole::Teacher);
    let interviewer = service.create_staff(
        &admin,
        CreateStaffRequest {
            user_id: Some(teacher.user_id),
            first_name: "Emeka".to_string(),
            last_name: "Obi".to_string(),
            middle_name: None,
            email: "emeka.obi@demo.school.ng".to_string(),
            phone_number: "08020000002".to_string(),
            date_of_birth: today - Duration::days(40 * 365),
            gender: Gender::Male,
            staff_type: StaffType::Teaching,
            department: Department::Science,
            qualification: "M.Sc Mathematics Education".to_string(),
            employment_date: today - Duration::days(5 * 365),
        },
    )?;
    println!("- Staff {} ({}) ready to interview", interviewer.staff_number, interviewer.full_name());

    let registration = service.register_user(RegisterUserRequest {
        email: "halima.musa@example.ng".to_string(),
        phone_number: "08161234567".to_string(),
        password: DEMO_PASSWORD.to_string(),
        confirm_password: DEMO_PASSWORD.to_string(),
        first_name: "Halima".to_string(),
        last_name: "Musa".to_string(),
        middle_name: None,
        role: UserRole::Parent,
        state_of_origin: Some(NigerianState::Kano),
        lga: Some("Nassarawa".to_string()),
    })?;
    println!(
        "- Parent registered as {} ({:?})",
        registration.user.email, registration.user.status
    );
    service.verify_email(&registration.verification_token)?;
    let login = service.login(
        LoginRequest {
            email: registration.user.email.clone(),
            password: DEMO_PASSWORD.to_string(),
        },
        Some("127.0.0.1".to_string()),
    )?;
    println!("- Parent signed in, token valid until {}", login.token_expiry);
    let parent = service.authenticate(&login.token)?;

    let born = NaiveDate::from_ymd_opt(today.year() - 12, 3, 15).unwrap_or(today);
    let student = service.create_student(
        &parent,
        CreateStudentRequest {
            first_name: "Aisha".to_string(),
            last_name: "Musa".to_string(),
            middle_name: None,
            date_of_birth: born,
            gender: Gender::Female,
            religion: None,
            email: None,
            phone_number: None,
            address: NigerianAddress {
                street: "22 Zoo Road".to_string(),
                city: "Kano".to_string(),
                lga: "Tarauni".to_string(),
                state: NigerianState::Kano,
                postal_code: None,
            },
            previous_school: Some("Capital Primary School".to_string()),
            previous_class: Some("Primary 6".to_string()),
            state_of_origin: NigerianState::Kano,
            lga: "Tarauni".to_string(),
            nationality: None,
            selected_stream: None,
            father: None,
            mother: None,
            guardian: None,
        },
    )?;
    println!("- Student {} added, age {}", student.student.full_name(), student.age);

    let academic_year = format!("{}/{}", today.year(), today.year() + 1);
    let application = service.submit_application(
        &parent,
        SubmitApplicationRequest {
            student_id: student.student.id,
            applying_for_level: EducationalLevel::JuniorSecondary,
            applying_for_class: ClassLevel::Jss1,
            preferred_stream: None,
            academic_year,
        },
    )?;
    println!("- Application {} submitted", application.application_number);

    for document_type in REQUIRED_DOCUMENT_TYPES {
        let uploaded = service.upload_document(
            &parent,
            UploadDocumentRequest {
                application_id: application.id,
                document_type,
                file_name: format!("{document_type:?}.pdf").to_ascii_lowercase(),
                content_type: "application/pdf".to_string(),
                file_size: 350_000,
                file_url: None,
                description: None,
            },
        )?;
        service.verify_document(
            &admin,
            uploaded.document.id,
            VerifyDocumentRequest {
                is_verified: true,
                notes: None,
            },
        )?;
    }
    println!("- Required documents uploaded and verified");

    service.advance_to_review(
        &admin,
        application.id,
        ReviewApplicationRequest {
            notes: Some("File complete".to_string()),
        },
    )?;

    let interview_day = today + Duration::days(2);
    let interview_time = start.time() + Duration::hours(2);
    let interview = service.schedule_interview(
        &admin,
        ScheduleInterviewRequest {
            application_id: application.id,
            interviewer_id: interviewer.id,
            scheduled_date: interview_day,
            scheduled_time: interview_time,
            interview_type: InterviewType::InPerson,
            meeting_link: None,
            meeting_id: None,
        },
    )?;
    println!(
        "- Interview booked with {} on {} at {}",
        interview.interviewer_name,
        interview.scheduled_date,
        interview.scheduled_time.format("%H:%M")
    );
    render_status(&service.application_status(&parent, application.id)?);

    clock.set(Utc.from_utc_datetime(&interview_day.and_time(interview_time)));
    service.conduct_interview(
        &teacher,
        interview.id,
        ConductInterviewRequest {
            score: i32::from(args.score),
            feedback: "Confident reader, comfortable with arithmetic".to_string(),
            remarks: None,
        },
    )?;
    println!("\nAfter the interview");
    render_status(&service.application_status(&parent, application.id)?);

    Ok(())
}

fn render_status(status: &ApplicationStatusView) {
    println!(
        "\nApplication {} for {}: {}",
        status.application_number,
        status.student_name,
        status.status.label()
    );
    for stage in &status.stages {
        let mark = if stage.completed { "x" } else { " " };
        match &stage.detail {
            Some(detail) => println!("  [{mark}] {} ({detail})", stage.name),
            None => println!("  [{mark}] {}", stage.name),
        }
    }
    if let Some(remarks) = &status.decision_remarks {
        println!("  Decision remarks: {remarks}");
    }
}
