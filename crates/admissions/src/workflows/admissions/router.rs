use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::access::Actor;
use super::domain::{ApplicationId, DocumentId, InterviewId, StaffId, StudentId, UserId};
use super::error::{AdmissionsError, ErrorKind};
use super::repository::AdmissionsStore;
use super::requests::{
    ApplicationFilter, ConductInterviewRequest, CreateStaffRequest, CreateStudentRequest,
    LoginRequest, RegisterUserRequest, ReviewApplicationRequest, ScheduleInterviewRequest,
    StudentSearch, SubmitApplicationRequest, UpcomingInterviewsQuery, UpdateStaffStatusRequest,
    UpdateStudentRequest, UploadDocumentRequest, VerifyDocumentRequest,
};
use super::service::AdmissionsService;

type Shared<S> = State<Arc<AdmissionsService<S>>>;

#[derive(Debug, Deserialize)]
pub(crate) struct VerifyEmailRequest {
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AvailabilityQuery {
    pub date: NaiveDate,
}

/// Router exposing the admissions commands and queries under `/api/v1/admissions`.
pub fn admissions_router<S>(service: Arc<AdmissionsService<S>>) -> Router
where
    S: AdmissionsStore + 'static,
{
    Router::new()
        .route("/api/v1/admissions/auth/register", post(register_handler::<S>))
        .route(
            "/api/v1/admissions/auth/verify-email",
            post(verify_email_handler::<S>),
        )
        .route("/api/v1/admissions/auth/login", post(login_handler::<S>))
        .route("/api/v1/admissions/auth/me", get(profile_handler::<S>))
        .route(
            "/api/v1/admissions/students",
            post(create_student_handler::<S>).get(search_students_handler::<S>),
        )
        .route(
            "/api/v1/admissions/students/:student_id",
            get(student_handler::<S>).put(update_student_handler::<S>),
        )
        .route(
            "/api/v1/admissions/parents/:parent_id/students",
            get(parent_students_handler::<S>),
        )
        .route(
            "/api/v1/admissions/parents/:parent_id/applications",
            get(parent_applications_handler::<S>),
        )
        .route(
            "/api/v1/admissions/applications",
            post(submit_application_handler::<S>),
        )
        .route(
            "/api/v1/admissions/applications/:application_id",
            get(application_status_handler::<S>),
        )
        .route(
            "/api/v1/admissions/applications/:application_id/review",
            post(review_handler::<S>),
        )
        .route(
            "/api/v1/admissions/applications/:application_id/documents",
            get(application_documents_handler::<S>),
        )
        .route("/api/v1/admissions/documents", post(upload_handler::<S>))
        .route(
            "/api/v1/admissions/documents/:document_id/verify",
            post(verify_document_handler::<S>),
        )
        .route(
            "/api/v1/admissions/interviews",
            post(schedule_handler::<S>),
        )
        .route(
            "/api/v1/admissions/interviews/upcoming",
            get(upcoming_handler::<S>),
        )
        .route(
            "/api/v1/admissions/interviews/availability",
            get(availability_handler::<S>),
        )
        .route(
            "/api/v1/admissions/interviews/:interview_id",
            get(interview_handler::<S>),
        )
        .route(
            "/api/v1/admissions/interviews/:interview_id/conduct",
            post(conduct_handler::<S>),
        )
        .route("/api/v1/admissions/staff", post(create_staff_handler::<S>))
        .route(
            "/api/v1/admissions/staff/:staff_id",
            get(staff_handler::<S>),
        )
        .route(
            "/api/v1/admissions/staff/:staff_id/status",
            put(staff_status_handler::<S>),
        )
        .with_state(service)
}

pub(crate) fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Unauthorized => StatusCode::FORBIDDEN,
        ErrorKind::InvalidState | ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::ValidationFailed => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::Unexpected => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AdmissionsError {
    fn into_response(self) -> Response {
        (status_for(self.kind()), axum::Json(self.failure())).into_response()
    }
}

fn unauthenticated(message: impl Into<String>) -> Response {
    let payload = json!({ "error": message.into() });
    (StatusCode::UNAUTHORIZED, axum::Json(payload)).into_response()
}

fn respond<T: Serialize>(success: StatusCode, result: Result<T, AdmissionsError>) -> Response {
    match result {
        Ok(body) => (success, axum::Json(body)).into_response(),
        Err(error) => error.into_response(),
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

fn client_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")?
        .to_str()
        .ok()?
        .split(',')
        .next()
        .map(|ip| ip.trim().to_string())
        .filter(|ip| !ip.is_empty())
}

/// Resolves the caller, answering 401 when the token is absent or rejected.
fn authenticate<S>(service: &AdmissionsService<S>, headers: &HeaderMap) -> Result<Actor, Response>
where
    S: AdmissionsStore + 'static,
{
    let token = bearer_token(headers).ok_or_else(|| unauthenticated("Missing bearer token"))?;
    service
        .authenticate(token)
        .map_err(|error| match error.kind() {
            ErrorKind::Unauthorized => unauthenticated(error.to_string()),
            _ => error.into_response(),
        })
}

macro_rules! actor_or_return {
    ($service:expr, $headers:expr) => {
        match authenticate(&$service, &$headers) {
            Ok(actor) => actor,
            Err(response) => return response,
        }
    };
}

pub(crate) async fn register_handler<S>(
    State(service): Shared<S>,
    axum::Json(request): axum::Json<RegisterUserRequest>,
) -> Response
where
    S: AdmissionsStore + 'static,
{
    respond(StatusCode::CREATED, service.register_user(request))
}

pub(crate) async fn verify_email_handler<S>(
    State(service): Shared<S>,
    axum::Json(request): axum::Json<VerifyEmailRequest>,
) -> Response
where
    S: AdmissionsStore + 'static,
{
    respond(StatusCode::OK, service.verify_email(&request.token))
}

pub(crate) async fn login_handler<S>(
    State(service): Shared<S>,
    headers: HeaderMap,
    axum::Json(request): axum::Json<LoginRequest>,
) -> Response
where
    S: AdmissionsStore + 'static,
{
    match service.login(request, client_ip(&headers)) {
        Ok(response) => (StatusCode::OK, axum::Json(response)).into_response(),
        Err(error) if error.kind() == ErrorKind::Unauthorized => unauthenticated(error.to_string()),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn profile_handler<S>(State(service): Shared<S>, headers: HeaderMap) -> Response
where
    S: AdmissionsStore + 'static,
{
    let actor = actor_or_return!(service, headers);
    respond(StatusCode::OK, service.user_profile(&actor))
}

pub(crate) async fn create_student_handler<S>(
    State(service): Shared<S>,
    headers: HeaderMap,
    axum::Json(request): axum::Json<CreateStudentRequest>,
) -> Response
where
    S: AdmissionsStore + 'static,
{
    let actor = actor_or_return!(service, headers);
    respond(StatusCode::CREATED, service.create_student(&actor, request))
}

pub(crate) async fn search_students_handler<S>(
    State(service): Shared<S>,
    headers: HeaderMap,
    Query(query): Query<StudentSearch>,
) -> Response
where
    S: AdmissionsStore + 'static,
{
    let actor = actor_or_return!(service, headers);
    respond(StatusCode::OK, service.students(&actor, query))
}

pub(crate) async fn student_handler<S>(
    State(service): Shared<S>,
    headers: HeaderMap,
    Path(student_id): Path<StudentId>,
) -> Response
where
    S: AdmissionsStore + 'static,
{
    let actor = actor_or_return!(service, headers);
    respond(StatusCode::OK, service.student(&actor, student_id))
}

pub(crate) async fn update_student_handler<S>(
    State(service): Shared<S>,
    headers: HeaderMap,
    Path(student_id): Path<StudentId>,
    axum::Json(request): axum::Json<UpdateStudentRequest>,
) -> Response
where
    S: AdmissionsStore + 'static,
{
    let actor = actor_or_return!(service, headers);
    respond(
        StatusCode::OK,
        service.update_student(&actor, student_id, request),
    )
}

pub(crate) async fn parent_students_handler<S>(
    State(service): Shared<S>,
    headers: HeaderMap,
    Path(parent_id): Path<UserId>,
) -> Response
where
    S: AdmissionsStore + 'static,
{
    let actor = actor_or_return!(service, headers);
    respond(StatusCode::OK, service.students_by_parent(&actor, parent_id))
}

pub(crate) async fn parent_applications_handler<S>(
    State(service): Shared<S>,
    headers: HeaderMap,
    Path(parent_id): Path<UserId>,
    Query(filter): Query<ApplicationFilter>,
) -> Response
where
    S: AdmissionsStore + 'static,
{
    let actor = actor_or_return!(service, headers);
    respond(
        StatusCode::OK,
        service.applications_by_parent(&actor, parent_id, filter),
    )
}

pub(crate) async fn submit_application_handler<S>(
    State(service): Shared<S>,
    headers: HeaderMap,
    axum::Json(request): axum::Json<SubmitApplicationRequest>,
) -> Response
where
    S: AdmissionsStore + 'static,
{
    let actor = actor_or_return!(service, headers);
    respond(
        StatusCode::CREATED,
        service.submit_application(&actor, request),
    )
}

pub(crate) async fn application_status_handler<S>(
    State(service): Shared<S>,
    headers: HeaderMap,
    Path(application_id): Path<ApplicationId>,
) -> Response
where
    S: AdmissionsStore + 'static,
{
    let actor = actor_or_return!(service, headers);
    respond(
        StatusCode::OK,
        service.application_status(&actor, application_id),
    )
}

pub(crate) async fn review_handler<S>(
    State(service): Shared<S>,
    headers: HeaderMap,
    Path(application_id): Path<ApplicationId>,
    axum::Json(request): axum::Json<ReviewApplicationRequest>,
) -> Response
where
    S: AdmissionsStore + 'static,
{
    let actor = actor_or_return!(service, headers);
    respond(
        StatusCode::OK,
        service.advance_to_review(&actor, application_id, request),
    )
}

pub(crate) async fn application_documents_handler<S>(
    State(service): Shared<S>,
    headers: HeaderMap,
    Path(application_id): Path<ApplicationId>,
) -> Response
where
    S: AdmissionsStore + 'static,
{
    let actor = actor_or_return!(service, headers);
    respond(
        StatusCode::OK,
        service.documents_by_application(&actor, application_id),
    )
}

pub(crate) async fn upload_handler<S>(
    State(service): Shared<S>,
    headers: HeaderMap,
    axum::Json(request): axum::Json<UploadDocumentRequest>,
) -> Response
where
    S: AdmissionsStore + 'static,
{
    let actor = actor_or_return!(service, headers);
    respond(StatusCode::CREATED, service.upload_document(&actor, request))
}

pub(crate) async fn verify_document_handler<S>(
    State(service): Shared<S>,
    headers: HeaderMap,
    Path(document_id): Path<DocumentId>,
    axum::Json(request): axum::Json<VerifyDocumentRequest>,
) -> Response
where
    S: AdmissionsStore + 'static,
{
    let actor = actor_or_return!(service, headers);
    respond(
        StatusCode::OK,
        service.verify_document(&actor, document_id, request),
    )
}

pub(crate) async fn schedule_handler<S>(
    State(service): Shared<S>,
    headers: HeaderMap,
    axum::Json(request): axum::Json<ScheduleInterviewRequest>,
) -> Response
where
    S: AdmissionsStore + 'static,
{
    let actor = actor_or_return!(service, headers);
    respond(
        StatusCode::CREATED,
        service.schedule_interview(&actor, request),
    )
}

pub(crate) async fn upcoming_handler<S>(
    State(service): Shared<S>,
    headers: HeaderMap,
    Query(query): Query<UpcomingInterviewsQuery>,
) -> Response
where
    S: AdmissionsStore + 'static,
{
    let actor = actor_or_return!(service, headers);
    respond(StatusCode::OK, service.upcoming_interviews(&actor, query))
}

pub(crate) async fn availability_handler<S>(
    State(service): Shared<S>,
    headers: HeaderMap,
    Query(query): Query<AvailabilityQuery>,
) -> Response
where
    S: AdmissionsStore + 'static,
{
    let actor = actor_or_return!(service, headers);
    respond(
        StatusCode::OK,
        service.available_interviewers(&actor, query.date),
    )
}

pub(crate) async fn interview_handler<S>(
    State(service): Shared<S>,
    headers: HeaderMap,
    Path(interview_id): Path<InterviewId>,
) -> Response
where
    S: AdmissionsStore + 'static,
{
    let actor = actor_or_return!(service, headers);
    respond(StatusCode::OK, service.interview(&actor, interview_id))
}

pub(crate) async fn conduct_handler<S>(
    State(service): Shared<S>,
    headers: HeaderMap,
    Path(interview_id): Path<InterviewId>,
    axum::Json(request): axum::Json<ConductInterviewRequest>,
) -> Response
where
    S: AdmissionsStore + 'static,
{
    let actor = actor_or_return!(service, headers);
    respond(
        StatusCode::OK,
        service.conduct_interview(&actor, interview_id, request),
    )
}

pub(crate) async fn create_staff_handler<S>(
    State(service): Shared<S>,
    headers: HeaderMap,
    axum::Json(request): axum::Json<CreateStaffRequest>,
) -> Response
where
    S: AdmissionsStore + 'static,
{
    let actor = actor_or_return!(service, headers);
    respond(StatusCode::CREATED, service.create_staff(&actor, request))
}

pub(crate) async fn staff_handler<S>(
    State(service): Shared<S>,
    headers: HeaderMap,
    Path(staff_id): Path<StaffId>,
) -> Response
where
    S: AdmissionsStore + 'static,
{
    let actor = actor_or_return!(service, headers);
    respond(StatusCode::OK, service.staff_member(&actor, staff_id))
}

pub(crate) async fn staff_status_handler<S>(
    State(service): Shared<S>,
    headers: HeaderMap,
    Path(staff_id): Path<StaffId>,
    axum::Json(request): axum::Json<UpdateStaffStatusRequest>,
) -> Response
where
    S: AdmissionsStore + 'static,
{
    let actor = actor_or_return!(service, headers);
    respond(
        StatusCode::OK,
        service.update_staff_status(&actor, staff_id, request),
    )
}
