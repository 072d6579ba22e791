use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Path, Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::auth::{bearer_token, AdminAuthorizer};
use super::domain::{
    ApplicantId, ApplicantKind, ApplicationStatus, DocumentRef, DoctorSubmission,
    NurseSubmission,
};
use super::notifier::NotificationDispatcher;
use super::repository::ApplicantRepository;
use super::review::ReviewDesk;
use super::service::{OnboardingError, OnboardingService};
use super::storage::{ObjectStorage, StorageError, MAX_DOCUMENT_BYTES};

/// Shared handler state: the write path, the read path, and the blob store behind them.
pub struct OnboardingApi<R, S, N> {
    pub onboarding: Arc<OnboardingService<R, S, N>>,
    pub review: Arc<ReviewDesk<R, S>>,
    pub storage: Arc<S>,
    pub authorizer: Arc<dyn AdminAuthorizer>,
}

impl<R, S, N> Clone for OnboardingApi<R, S, N> {
    fn clone(&self) -> Self {
        Self {
            onboarding: self.onboarding.clone(),
            review: self.review.clone(),
            storage: self.storage.clone(),
            authorizer: self.authorizer.clone(),
        }
    }
}

impl<R, S, N> OnboardingApi<R, S, N>
where
    R: ApplicantRepository + 'static,
    S: ObjectStorage + 'static,
    N: NotificationDispatcher + 'static,
{
    pub fn new(
        repository: Arc<R>,
        storage: Arc<S>,
        notifier: Arc<N>,
        authorizer: Arc<dyn AdminAuthorizer>,
    ) -> Self {
        Self {
            onboarding: Arc::new(OnboardingService::new(
                repository.clone(),
                storage.clone(),
                notifier,
            )),
            review: Arc::new(ReviewDesk::new(repository, storage.clone())),
            storage,
            authorizer,
        }
    }
}

#[derive(Debug, Deserialize)]
struct StatusUpdate {
    status: ApplicationStatus,
}

/// Router builder exposing the public onboarding forms and the token-gated review surface.
pub fn onboarding_router<R, S, N>(api: OnboardingApi<R, S, N>) -> Router
where
    R: ApplicantRepository + 'static,
    S: ObjectStorage + 'static,
    N: NotificationDispatcher + 'static,
{
    let admin = Router::new()
        .route("/api/v1/applicants", get(list_handler::<R, S, N>))
        .route("/api/v1/doctors/:id", get(doctor_detail_handler::<R, S, N>))
        .route("/api/v1/nurses/:id", get(nurse_detail_handler::<R, S, N>))
        .route(
            "/api/v1/doctors/:id/status",
            patch(doctor_status_handler::<R, S, N>),
        )
        .route(
            "/api/v1/nurses/:id/status",
            patch(nurse_status_handler::<R, S, N>),
        )
        .route(
            "/api/v1/documents/:document_id/url",
            get(document_url_handler::<R, S, N>),
        )
        .route_layer(middleware::from_fn_with_state(
            api.authorizer.clone(),
            require_admin,
        ));

    Router::new()
        .route("/api/v1/uploads", post(issue_upload_handler::<R, S, N>))
        .route(
            "/api/v1/uploads/:ticket",
            post(complete_upload_handler::<R, S, N>)
                .layer(DefaultBodyLimit::max(MAX_DOCUMENT_BYTES)),
        )
        .route("/files/:document_id", get(file_handler::<R, S, N>))
        .route("/api/v1/doctors", post(submit_doctor_handler::<R, S, N>))
        .route("/api/v1/nurses", post(submit_nurse_handler::<R, S, N>))
        .merge(admin)
        .with_state(api)
}

async fn require_admin(
    State(authorizer): State<Arc<dyn AdminAuthorizer>>,
    request: Request,
    next: Next,
) -> Response {
    let verdict = authorizer.authorize(bearer_token(request.headers()));
    match verdict {
        Ok(()) => next.run(request).await,
        Err(error) => (
            StatusCode::UNAUTHORIZED,
            [(header::WWW_AUTHENTICATE, "Bearer")],
            Json(json!({ "error": error.to_string() })),
        )
            .into_response(),
    }
}

pub(crate) async fn submit_doctor_handler<R, S, N>(
    State(api): State<OnboardingApi<R, S, N>>,
    Json(submission): Json<DoctorSubmission>,
) -> Response
where
    R: ApplicantRepository + 'static,
    S: ObjectStorage + 'static,
    N: NotificationDispatcher + 'static,
{
    created(api.onboarding.submit_doctor(submission))
}

pub(crate) async fn submit_nurse_handler<R, S, N>(
    State(api): State<OnboardingApi<R, S, N>>,
    Json(submission): Json<NurseSubmission>,
) -> Response
where
    R: ApplicantRepository + 'static,
    S: ObjectStorage + 'static,
    N: NotificationDispatcher + 'static,
{
    created(api.onboarding.submit_nurse(submission))
}

fn created(result: Result<ApplicantId, OnboardingError>) -> Response {
    match result {
        Ok(id) => (StatusCode::CREATED, Json(json!({ "id": id }))).into_response(),
        Err(error) => error_response(error),
    }
}

async fn doctor_status_handler<R, S, N>(
    State(api): State<OnboardingApi<R, S, N>>,
    Path(id): Path<String>,
    Json(update): Json<StatusUpdate>,
) -> Response
where
    R: ApplicantRepository + 'static,
    S: ObjectStorage + 'static,
    N: NotificationDispatcher + 'static,
{
    status_response(api, ApplicantKind::Doctor, ApplicantId(id), update.status)
}

async fn nurse_status_handler<R, S, N>(
    State(api): State<OnboardingApi<R, S, N>>,
    Path(id): Path<String>,
    Json(update): Json<StatusUpdate>,
) -> Response
where
    R: ApplicantRepository + 'static,
    S: ObjectStorage + 'static,
    N: NotificationDispatcher + 'static,
{
    status_response(api, ApplicantKind::Nurse, ApplicantId(id), update.status)
}

fn status_response<R, S, N>(
    api: OnboardingApi<R, S, N>,
    kind: ApplicantKind,
    id: ApplicantId,
    status: ApplicationStatus,
) -> Response
where
    R: ApplicantRepository + 'static,
    S: ObjectStorage + 'static,
    N: NotificationDispatcher + 'static,
{
    match api.onboarding.update_status(kind, &id, status) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn list_handler<R, S, N>(State(api): State<OnboardingApi<R, S, N>>) -> Response
where
    R: ApplicantRepository + 'static,
    S: ObjectStorage + 'static,
    N: NotificationDispatcher + 'static,
{
    match api.review.list_applicants() {
        Ok(applicants) => (StatusCode::OK, Json(applicants)).into_response(),
        Err(error) => error_response(error),
    }
}

async fn doctor_detail_handler<R, S, N>(
    State(api): State<OnboardingApi<R, S, N>>,
    Path(id): Path<String>,
) -> Response
where
    R: ApplicantRepository + 'static,
    S: ObjectStorage + 'static,
    N: NotificationDispatcher + 'static,
{
    detail_response(api, ApplicantKind::Doctor, ApplicantId(id))
}

async fn nurse_detail_handler<R, S, N>(
    State(api): State<OnboardingApi<R, S, N>>,
    Path(id): Path<String>,
) -> Response
where
    R: ApplicantRepository + 'static,
    S: ObjectStorage + 'static,
    N: NotificationDispatcher + 'static,
{
    detail_response(api, ApplicantKind::Nurse, ApplicantId(id))
}

fn detail_response<R, S, N>(
    api: OnboardingApi<R, S, N>,
    kind: ApplicantKind,
    id: ApplicantId,
) -> Response
where
    R: ApplicantRepository + 'static,
    S: ObjectStorage + 'static,
    N: NotificationDispatcher + 'static,
{
    match api.review.applicant_detail(kind, &id) {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

async fn document_url_handler<R, S, N>(
    State(api): State<OnboardingApi<R, S, N>>,
    Path(document_id): Path<String>,
) -> Response
where
    R: ApplicantRepository + 'static,
    S: ObjectStorage + 'static,
    N: NotificationDispatcher + 'static,
{
    match api.review.resolve_document_url(&DocumentRef(document_id)) {
        Ok(url) => (StatusCode::OK, Json(json!({ "url": url }))).into_response(),
        Err(error) => error_response(error),
    }
}

async fn issue_upload_handler<R, S, N>(State(api): State<OnboardingApi<R, S, N>>) -> Response
where
    R: ApplicantRepository + 'static,
    S: ObjectStorage + 'static,
    N: NotificationDispatcher + 'static,
{
    match api.storage.issue_upload() {
        Ok(ticket) => (StatusCode::OK, Json(ticket)).into_response(),
        Err(error) => storage_error_response(error),
    }
}

async fn complete_upload_handler<R, S, N>(
    State(api): State<OnboardingApi<R, S, N>>,
    Path(ticket): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response
where
    R: ApplicantRepository + 'static,
    S: ObjectStorage + 'static,
    N: NotificationDispatcher + 'static,
{
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    match api
        .storage
        .complete_upload(&ticket, content_type, body.to_vec())
    {
        Ok(document) => (StatusCode::OK, Json(json!({ "storageId": document }))).into_response(),
        Err(error) => storage_error_response(error),
    }
}

async fn file_handler<R, S, N>(
    State(api): State<OnboardingApi<R, S, N>>,
    Path(document_id): Path<String>,
) -> Response
where
    R: ApplicantRepository + 'static,
    S: ObjectStorage + 'static,
    N: NotificationDispatcher + 'static,
{
    match api.storage.fetch(&DocumentRef(document_id)) {
        Ok(Some(document)) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, document.content_type)],
            document.bytes,
        )
            .into_response(),
        Ok(None) => {
            let payload = json!({ "error": "Document not found" });
            (StatusCode::NOT_FOUND, Json(payload)).into_response()
        }
        Err(error) => storage_error_response(error),
    }
}

pub(crate) fn error_response(error: OnboardingError) -> Response {
    match error {
        OnboardingError::ValidationFailed(errors) => {
            let payload = json!({
                "error": errors.to_string(),
                "fields": errors.by_field(),
            });
            (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
        }
        OnboardingError::DuplicateEmail => {
            let payload = json!({
                "error": OnboardingError::DuplicateEmail.to_string(),
                "fields": { "email": OnboardingError::DuplicateEmail.to_string() },
            });
            (StatusCode::CONFLICT, Json(payload)).into_response()
        }
        OnboardingError::DocumentNotFound => {
            let payload = json!({
                "error": OnboardingError::DocumentNotFound.to_string(),
                "fields": { "documentId": OnboardingError::DocumentNotFound.to_string() },
            });
            (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
        }
        OnboardingError::NotFound => {
            let payload = json!({ "error": OnboardingError::NotFound.to_string() });
            (StatusCode::NOT_FOUND, Json(payload)).into_response()
        }
        other => {
            let payload = json!({ "error": other.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}

fn storage_error_response(error: StorageError) -> Response {
    let status = match &error {
        StorageError::UnknownTicket => StatusCode::NOT_FOUND,
        StorageError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        StorageError::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        StorageError::Empty => StatusCode::BAD_REQUEST,
        StorageError::Unavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({ "error": error.to_string() });
    (status, Json(payload)).into_response()
}
