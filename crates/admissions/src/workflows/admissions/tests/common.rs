use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::response::Response;
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use serde_json::Value;

use crate::workflows::admissions::access::Actor;
use crate::workflows::admissions::clock::FixedClock;
use crate::workflows::admissions::credentials::{
    CredentialError, JwtSettings, JwtTokenService, PasswordHasher,
};
use crate::workflows::admissions::domain::{
    Application, ApplicationId, ClassLevel, Department, Document, DocumentId, DocumentType,
    EducationalLevel, Gender, Interview, InterviewId, InterviewType, NigerianAddress,
    NigerianState, Staff, StaffId, StaffType, Student, StudentId, User, UserId, UserRole,
};
use crate::workflows::admissions::error::AdmissionsError;
use crate::workflows::admissions::numbering::SequentialApplicationNumbers;
use crate::workflows::admissions::repository::{
    ApplicationRepository, DocumentRepository, InterviewRepository, RepositoryError,
    StaffRepository, StudentRepository, UserRepository,
};
use crate::workflows::admissions::requests::{
    CreateStaffRequest, CreateStudentRequest, ProvisionUserRequest, RegisterUserRequest,
    ReviewApplicationRequest, ScheduleInterviewRequest, SubmitApplicationRequest,
    UploadDocumentRequest,
};
use crate::workflows::admissions::store::InMemoryAdmissionsStore;
use crate::workflows::admissions::AdmissionsService;

pub(super) const PASSWORD: &str = "Secret123";

/// Monday 1 September 2025, 09:00 UTC.
pub(super) fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 9, 1, 9, 0, 0).unwrap()
}

pub(super) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub(super) fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).expect("valid time")
}

pub(super) fn interview_day() -> NaiveDate {
    date(2025, 9, 3)
}

pub(super) fn jwt_settings() -> JwtSettings {
    JwtSettings {
        secret: "admissions-test-secret-with-plenty-of-bytes".to_string(),
        issuer: "AdmissionsService".to_string(),
        audience: "AdmissionsClient".to_string(),
        expiry_minutes: 60,
    }
}

/// Stores passwords with a marker prefix. Argon2 is exercised in the credentials tests.
#[derive(Debug, Default)]
pub(super) struct PlainPasswords;

impl PasswordHasher for PlainPasswords {
    fn hash_password(&self, password: &str) -> Result<String, CredentialError> {
        Ok(format!("plain:{password}"))
    }

    fn verify_password(&self, password: &str, hash: &str) -> bool {
        hash.strip_prefix("plain:") == Some(password)
    }
}

pub(super) type Service = AdmissionsService<InMemoryAdmissionsStore>;

pub(super) struct Harness {
    pub(super) service: Arc<Service>,
    pub(super) store: Arc<InMemoryAdmissionsStore>,
    pub(super) clock: Arc<FixedClock>,
    sequence: AtomicUsize,
}

pub(super) fn harness() -> Harness {
    let store = Arc::new(InMemoryAdmissionsStore::default());
    let clock = Arc::new(FixedClock::at(start()));
    let service = AdmissionsService::new(
        store.clone(),
        Arc::new(JwtTokenService::new(&jwt_settings())),
    )
    .with_clock(clock.clone())
    .with_numbers(Arc::new(SequentialApplicationNumbers::starting_at(1000)))
    .with_passwords(Arc::new(PlainPasswords));

    Harness {
        service: Arc::new(service),
        store,
        clock,
        sequence: AtomicUsize::new(1),
    }
}

pub(super) fn register_request(email: &str, phone_number: &str) -> RegisterUserRequest {
    RegisterUserRequest {
        email: email.to_string(),
        phone_number: phone_number.to_string(),
        password: PASSWORD.to_string(),
        confirm_password: PASSWORD.to_string(),
        first_name: "Chiamaka".to_string(),
        last_name: "Okeke".to_string(),
        middle_name: None,
        role: UserRole::Parent,
        state_of_origin: Some(NigerianState::Anambra),
        lga: Some("Awka South".to_string()),
    }
}

pub(super) fn address() -> NigerianAddress {
    NigerianAddress {
        street: "14 Admiralty Way".to_string(),
        city: "Lekki".to_string(),
        lga: "Eti-Osa".to_string(),
        state: NigerianState::Lagos,
        postal_code: None,
    }
}

/// Born 15 March, so on the harness start date the student is exactly `age`.
pub(super) fn student_request(age: i32) -> CreateStudentRequest {
    CreateStudentRequest {
        first_name: "Tobenna".to_string(),
        last_name: "Okeke".to_string(),
        middle_name: None,
        date_of_birth: date(2025 - age, 3, 15),
        gender: Gender::Male,
        religion: None,
        email: None,
        phone_number: None,
        address: address(),
        previous_school: Some("Corona Primary School".to_string()),
        previous_class: Some("Primary 6".to_string()),
        state_of_origin: NigerianState::Anambra,
        lga: "Awka South".to_string(),
        nationality: None,
        selected_stream: None,
        father: None,
        mother: None,
        guardian: None,
    }
}

pub(super) fn submit_request(student_id: StudentId) -> SubmitApplicationRequest {
    SubmitApplicationRequest {
        student_id,
        applying_for_level: EducationalLevel::JuniorSecondary,
        applying_for_class: ClassLevel::Jss1,
        preferred_stream: None,
        academic_year: "2025/2026".to_string(),
    }
}

pub(super) fn upload_request(
    application_id: ApplicationId,
    document_type: DocumentType,
    file_name: &str,
) -> UploadDocumentRequest {
    UploadDocumentRequest {
        application_id,
        document_type,
        file_name: file_name.to_string(),
        content_type: "application/pdf".to_string(),
        file_size: 250_000,
        file_url: None,
        description: None,
    }
}

pub(super) fn schedule_request(
    application_id: ApplicationId,
    interviewer_id: StaffId,
    scheduled_time: NaiveTime,
) -> ScheduleInterviewRequest {
    ScheduleInterviewRequest {
        application_id,
        interviewer_id,
        scheduled_date: interview_day(),
        scheduled_time,
        interview_type: InterviewType::InPerson,
        meeting_link: None,
        meeting_id: None,
    }
}

pub(super) fn staff_request(email: &str, staff_type: StaffType) -> CreateStaffRequest {
    CreateStaffRequest {
        user_id: None,
        first_name: "Adaeze".to_string(),
        last_name: "Nwosu".to_string(),
        middle_name: None,
        email: email.to_string(),
        phone_number: "09011223344".to_string(),
        date_of_birth: date(1988, 6, 1),
        gender: Gender::Female,
        staff_type,
        department: Department::Science,
        qualification: "B.Sc. Ed Mathematics".to_string(),
        employment_date: date(2019, 9, 9),
    }
}

impl Harness {
    /// Unique (email, phone) pair per call.
    pub(super) fn contact(&self, prefix: &str) -> (String, String) {
        let n = self.sequence.fetch_add(1, Ordering::Relaxed);
        (
            format!("{prefix}{n}@example.ng"),
            format!("0803{n:07}"),
        )
    }

    /// Registered and verified parent account.
    pub(super) fn parent(&self) -> Actor {
        let (email, phone) = self.contact("parent");
        let registration = self
            .service
            .register_user(register_request(&email, &phone))
            .expect("registration succeeds");
        self.service
            .verify_email(&registration.verification_token)
            .expect("verification succeeds");
        Actor::new(registration.user.id, UserRole::Parent)
    }

    pub(super) fn provision(&self, role: UserRole) -> Actor {
        let (email, phone) = self.contact(role.label());
        let user = self
            .service
            .provision_user(ProvisionUserRequest {
                email: email.to_lowercase(),
                phone_number: phone,
                password: PASSWORD.to_string(),
                first_name: "Bola".to_string(),
                last_name: role.label().to_string(),
                role,
            })
            .expect("provisioning succeeds");
        Actor::new(user.id, role)
    }

    pub(super) fn admin(&self) -> Actor {
        self.provision(UserRole::SchoolAdmin)
    }

    /// Teacher login linked to an active teaching staff record.
    pub(super) fn teacher(&self, admin: &Actor) -> (Actor, Staff) {
        let actor = self.provision(UserRole::Teacher);
        let (email, _) = self.contact("staff");
        let mut request = staff_request(&email, StaffType::Teaching);
        request.user_id = Some(actor.user_id);
        let staff = self
            .service
            .create_staff(admin, request)
            .expect("staff created");
        (actor, staff)
    }

    pub(super) fn student_of(&self, parent: &Actor, age: i32) -> Student {
        self.service
            .create_student(parent, student_request(age))
            .expect("student created")
            .student
    }

    /// Fresh parent with a submitted JSS application for a 12 year old.
    pub(super) fn submitted(&self) -> (Actor, Application) {
        let parent = self.parent();
        let student = self.student_of(&parent, 12);
        let application = self
            .service
            .submit_application(&parent, submit_request(student.id))
            .expect("application submitted");
        (parent, application)
    }

    pub(super) fn under_review(&self, admin: &Actor) -> (Actor, Application) {
        let (parent, application) = self.submitted();
        let application = self
            .service
            .advance_to_review(admin, application.id, ReviewApplicationRequest::default())
            .expect("application under review");
        (parent, application)
    }

    pub(super) fn upload_required(&self, parent: &Actor, application_id: ApplicationId) -> Vec<Document> {
        [
            (DocumentType::BirthCertificate, "birth"),
            (DocumentType::PreviousSchoolReport, "report"),
            (DocumentType::PassportPhotograph, "passport"),
        ]
        .into_iter()
        .map(|(document_type, stem)| {
            let file_name = format!("{stem}-{}.pdf", application_id.0.simple());
            self.service
                .upload_document(parent, upload_request(application_id, document_type, &file_name))
                .expect("upload succeeds")
                .document
        })
        .collect()
    }

    /// Application under review with an interview booked at `at` on [`interview_day`].
    pub(super) fn scheduled(
        &self,
        admin: &Actor,
        interviewer: &Staff,
        at: NaiveTime,
    ) -> (Actor, Application, Interview) {
        let (parent, application) = self.under_review(admin);
        let interview = self
            .service
            .schedule_interview(admin, schedule_request(application.id, interviewer.id, at))
            .expect("interview scheduled");
        (parent, application, interview)
    }
}

pub(super) fn expect_unauthorized<T: std::fmt::Debug>(result: Result<T, AdmissionsError>) -> String {
    match result {
        Err(AdmissionsError::Unauthorized(message)) => message,
        other => panic!("expected unauthorized, got {other:?}"),
    }
}

pub(super) fn expect_conflict<T: std::fmt::Debug>(result: Result<T, AdmissionsError>) -> String {
    match result {
        Err(AdmissionsError::Conflict(message)) => message,
        other => panic!("expected conflict, got {other:?}"),
    }
}

pub(super) fn expect_invalid_state<T: std::fmt::Debug>(
    result: Result<T, AdmissionsError>,
) -> String {
    match result {
        Err(AdmissionsError::InvalidState(message)) => message,
        other => panic!("expected invalid state, got {other:?}"),
    }
}

pub(super) fn expect_validation<T: std::fmt::Debug>(
    result: Result<T, AdmissionsError>,
) -> (String, Vec<String>) {
    match result {
        Err(AdmissionsError::ValidationFailed { message, errors }) => (message, errors),
        other => panic!("expected validation failure, got {other:?}"),
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

/// Store whose every call fails as if the backing database were offline.
pub(super) struct UnavailableStore;

fn offline<T>() -> Result<T, RepositoryError> {
    Err(RepositoryError::Unavailable("database offline".to_string()))
}

impl UserRepository for UnavailableStore {
    fn insert_user(&self, _user: User) -> Result<User, RepositoryError> {
        offline()
    }
    fn update_user(&self, _user: User) -> Result<(), RepositoryError> {
        offline()
    }
    fn user(&self, _id: &UserId) -> Result<Option<User>, RepositoryError> {
        offline()
    }
    fn user_by_email(&self, _email: &str) -> Result<Option<User>, RepositoryError> {
        offline()
    }
    fn user_by_phone(&self, _phone_number: &str) -> Result<Option<User>, RepositoryError> {
        offline()
    }
    fn user_by_verification_token(&self, _token: &str) -> Result<Option<User>, RepositoryError> {
        offline()
    }
}

impl StudentRepository for UnavailableStore {
    fn insert_student(&self, _student: Student) -> Result<Student, RepositoryError> {
        offline()
    }
    fn update_student(&self, _student: Student) -> Result<(), RepositoryError> {
        offline()
    }
    fn student(&self, _id: &StudentId) -> Result<Option<Student>, RepositoryError> {
        offline()
    }
    fn student_by_email(&self, _email: &str) -> Result<Option<Student>, RepositoryError> {
        offline()
    }
    fn student_by_phone(&self, _phone_number: &str) -> Result<Option<Student>, RepositoryError> {
        offline()
    }
    fn students_by_parent(&self, _parent: &UserId) -> Result<Vec<Student>, RepositoryError> {
        offline()
    }
    fn search_students(&self, _search: Option<&str>) -> Result<Vec<Student>, RepositoryError> {
        offline()
    }
}

impl ApplicationRepository for UnavailableStore {
    fn insert_application(
        &self,
        _application: Application,
    ) -> Result<Application, RepositoryError> {
        offline()
    }
    fn update_application(&self, _application: Application) -> Result<(), RepositoryError> {
        offline()
    }
    fn application(&self, _id: &ApplicationId) -> Result<Option<Application>, RepositoryError> {
        offline()
    }
    fn application_by_number(
        &self,
        _number: &str,
    ) -> Result<Option<Application>, RepositoryError> {
        offline()
    }
    fn applications_by_student(
        &self,
        _student: &StudentId,
    ) -> Result<Vec<Application>, RepositoryError> {
        offline()
    }
    fn applications_by_parent(
        &self,
        _parent: &UserId,
    ) -> Result<Vec<Application>, RepositoryError> {
        offline()
    }
}

impl DocumentRepository for UnavailableStore {
    fn insert_document(&self, _document: Document) -> Result<Document, RepositoryError> {
        offline()
    }
    fn update_document(&self, _document: Document) -> Result<(), RepositoryError> {
        offline()
    }
    fn document(&self, _id: &DocumentId) -> Result<Option<Document>, RepositoryError> {
        offline()
    }
    fn document_by_file_name(
        &self,
        _file_name: &str,
    ) -> Result<Option<Document>, RepositoryError> {
        offline()
    }
    fn documents_by_application(
        &self,
        _application: &ApplicationId,
    ) -> Result<Vec<Document>, RepositoryError> {
        offline()
    }
}

impl InterviewRepository for UnavailableStore {
    fn interview(&self, _id: &InterviewId) -> Result<Option<Interview>, RepositoryError> {
        offline()
    }
    fn interview_by_application(
        &self,
        _application: &ApplicationId,
    ) -> Result<Option<Interview>, RepositoryError> {
        offline()
    }
    fn scheduled_interviews(
        &self,
        _interviewer: Option<&StaffId>,
    ) -> Result<Vec<Interview>, RepositoryError> {
        offline()
    }
    fn slot_taken(
        &self,
        _interviewer: &StaffId,
        _date: NaiveDate,
        _time: NaiveTime,
    ) -> Result<bool, RepositoryError> {
        offline()
    }
    fn schedule(
        &self,
        _interview: Interview,
        _application: Application,
    ) -> Result<Interview, RepositoryError> {
        offline()
    }
    fn complete(
        &self,
        _interview: Interview,
        _application: Application,
    ) -> Result<(), RepositoryError> {
        offline()
    }
}

impl StaffRepository for UnavailableStore {
    fn insert_staff(&self, _staff: Staff) -> Result<Staff, RepositoryError> {
        offline()
    }
    fn update_staff(&self, _staff: Staff) -> Result<(), RepositoryError> {
        offline()
    }
    fn staff(&self, _id: &StaffId) -> Result<Option<Staff>, RepositoryError> {
        offline()
    }
    fn staff_by_user(&self, _user: &UserId) -> Result<Option<Staff>, RepositoryError> {
        offline()
    }
    fn staff_by_email(&self, _email: &str) -> Result<Option<Staff>, RepositoryError> {
        offline()
    }
    fn active_teaching_staff(&self) -> Result<Vec<Staff>, RepositoryError> {
        offline()
    }
    fn staff_count(&self) -> Result<usize, RepositoryError> {
        offline()
    }
}

pub(super) fn unavailable_service() -> AdmissionsService<UnavailableStore> {
    AdmissionsService::new(
        Arc::new(UnavailableStore),
        Arc::new(JwtTokenService::new(&jwt_settings())),
    )
    .with_clock(Arc::new(FixedClock::at(start())))
    .with_passwords(Arc::new(PlainPasswords))
}
