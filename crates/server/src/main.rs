// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]
#![allow(clippy::multiple_crate_versions)]

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State as AxumState},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info};
use velo_api::{
    ApiError, AuthenticationService, CoverImageUpdate, Identity, OrganizeRaceRequest,
    RaceDetailModel, RaceListModel, RaceRegistrationModel, UpdateRaceRequest,
    approve_medical_certificate, approve_race_registration, open_race_for_registration,
    organize_race, race_detail, race_list, race_registrations, register_for_race, update_race,
    upload_medical_certificate,
};
use velo_domain::Id;
use velo_persistence::Persistence;

use crate::files::DiskFileStore;
use crate::session::{MaybeIdentity, SessionIdentity};

mod files;
mod session;

/// Velo Server - HTTP server for the Velo race organization service
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` database file. If not provided, uses in-memory database.
    #[arg(short, long)]
    database: Option<String>,

    /// Port to bind the server to
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// Directory for stored certificate and cover-image files
    #[arg(short, long, default_value = "media")]
    media_dir: String,
}

/// Application state shared across handlers.
#[derive(Clone)]
struct AppState {
    /// The persistence layer, wrapped in a Mutex for safe concurrent access.
    persistence: Arc<Mutex<Persistence>>,
    /// Disk storage for certificate and cover-image bytes.
    files: Arc<DiskFileStore>,
}

/// API request for signing up a user.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct SignUpApiRequest {
    /// The desired username.
    username: String,
}

/// API request for logging in.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct LogInApiRequest {
    /// The username to log in as.
    username: String,
}

/// API request for creating a race.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct OrganizeRaceApiRequest {
    /// The race name.
    name: String,
    /// When the race starts (RFC 3339).
    start_at: String,
}

/// API request for updating a race's description.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct UpdateRaceApiRequest {
    /// A new start time (RFC 3339), or omitted to keep the current one.
    #[serde(skip_serializing_if = "Option::is_none")]
    start_at: Option<String>,
}

/// API request for opening a race for registration.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct OpenRegistrationApiRequest {
    /// The maximum number of participants.
    maximum_participants: u32,
}

/// API response carrying a resolved identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct IdentityResponse {
    /// The user's identifier.
    user_id: String,
    /// The user's username.
    username: String,
}

/// API response for a successful login.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SessionResponse {
    /// The opaque session token.
    session_token: String,
    /// The user's identifier.
    user_id: String,
    /// The user's username.
    username: String,
}

/// API response for race creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RaceCreatedResponse {
    /// Success indicator.
    success: bool,
    /// The new race's identifier.
    race_id: String,
}

/// API response for write operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct WriteResponse {
    /// Success indicator.
    success: bool,
    /// Optional message.
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

/// Error response type.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ErrorResponse {
    /// Error indicator.
    error: bool,
    /// Error message.
    message: String,
}

/// HTTP error wrapper that implements `IntoResponse`.
struct HttpError {
    /// The HTTP status code.
    status: StatusCode,
    /// The error message.
    message: String,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            error: true,
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        let status: StatusCode = match &err {
            ApiError::AuthenticationFailed { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Unauthorized { .. } => StatusCode::FORBIDDEN,
            ApiError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            ApiError::RuleViolation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::ResourceNotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Internal { message } => {
                error!(error = %message, "Internal error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

/// Parses a path segment into a domain identifier.
fn parse_id(value: &str, field: &str) -> Result<Id, HttpError> {
    Id::from_str(value).map_err(|_| HttpError {
        status: StatusCode::BAD_REQUEST,
        message: format!("Invalid {field}: '{value}'"),
    })
}

/// Handler for POST `/users` endpoint.
///
/// Creates a new user account.
async fn handle_sign_up(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<SignUpApiRequest>,
) -> Result<Json<IdentityResponse>, HttpError> {
    info!(username = %req.username, "Handling sign_up request");

    let mut persistence = app_state.persistence.lock().await;
    let identity: Identity = AuthenticationService::sign_up(&mut persistence, &req.username)
        .map_err(ApiError::from)?;
    drop(persistence);

    Ok(Json(IdentityResponse {
        user_id: identity.user_id.to_string(),
        username: identity.username,
    }))
}

/// Handler for POST `/sessions` endpoint.
///
/// Logs a user in and issues a session token.
async fn handle_log_in(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<LogInApiRequest>,
) -> Result<Json<SessionResponse>, HttpError> {
    info!(username = %req.username, "Handling log_in request");

    let mut persistence = app_state.persistence.lock().await;
    let (session_token, identity): (String, Identity) =
        AuthenticationService::log_in(&mut persistence, &req.username).map_err(ApiError::from)?;
    drop(persistence);

    Ok(Json(SessionResponse {
        session_token,
        user_id: identity.user_id.to_string(),
        username: identity.username,
    }))
}

/// Handler for DELETE `/sessions` endpoint.
///
/// Ends the session named by the Authorization header.
async fn handle_log_out(
    AxumState(app_state): AxumState<AppState>,
    headers: HeaderMap,
) -> Result<Json<WriteResponse>, HttpError> {
    let token: &str = headers
        .get("Authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| HttpError {
            status: StatusCode::UNAUTHORIZED,
            message: String::from("Missing or invalid Authorization header"),
        })?;

    let mut persistence = app_state.persistence.lock().await;
    AuthenticationService::log_out(&mut persistence, token).map_err(ApiError::from)?;
    drop(persistence);

    info!("Session ended");
    Ok(Json(WriteResponse {
        success: true,
        message: Some(String::from("Logged out")),
    }))
}

/// Handler for GET `/races` endpoint.
///
/// Lists all races with the viewer's registration flag.
async fn handle_list_races(
    AxumState(app_state): AxumState<AppState>,
    MaybeIdentity(viewer): MaybeIdentity,
) -> Result<Json<Vec<RaceListModel>>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let races: Vec<RaceListModel> = race_list(&mut persistence, viewer.as_ref())?;
    drop(persistence);

    Ok(Json(races))
}

/// Handler for GET `/races/{race_id}` endpoint.
///
/// Returns the detail view of one race with the viewer's capabilities.
async fn handle_get_race(
    AxumState(app_state): AxumState<AppState>,
    MaybeIdentity(viewer): MaybeIdentity,
    Path(race_id): Path<String>,
) -> Result<Json<RaceDetailModel>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let detail: RaceDetailModel = race_detail(&mut persistence, viewer.as_ref(), &race_id)?;
    drop(persistence);

    Ok(Json(detail))
}

/// Handler for POST `/races` endpoint.
///
/// Creates a new race with the requester as its first organizer.
async fn handle_organize_race(
    AxumState(app_state): AxumState<AppState>,
    SessionIdentity(identity): SessionIdentity,
    Json(req): Json<OrganizeRaceApiRequest>,
) -> Result<Json<RaceCreatedResponse>, HttpError> {
    info!(name = %req.name, organizer = %identity.user_id, "Handling organize_race request");

    let request: OrganizeRaceRequest = OrganizeRaceRequest {
        name: req.name,
        start_at: req.start_at,
    };

    let mut persistence = app_state.persistence.lock().await;
    let race_id: Id = organize_race(&mut persistence, &identity, &request)?;
    drop(persistence);

    Ok(Json(RaceCreatedResponse {
        success: true,
        race_id: race_id.to_string(),
    }))
}

/// Handler for PUT `/races/{race_id}` endpoint.
///
/// Updates a race's start time. The cover image is untouched; it has its
/// own endpoints below.
async fn handle_update_race(
    AxumState(app_state): AxumState<AppState>,
    SessionIdentity(identity): SessionIdentity,
    Path(race_id): Path<String>,
    Json(req): Json<UpdateRaceApiRequest>,
) -> Result<Json<WriteResponse>, HttpError> {
    let race_id: Id = parse_id(&race_id, "race_id")?;
    let request: UpdateRaceRequest = UpdateRaceRequest {
        start_at: req.start_at,
        cover_image: CoverImageUpdate::Keep,
    };

    let mut persistence = app_state.persistence.lock().await;
    update_race(
        &mut persistence,
        app_state.files.as_ref(),
        &identity,
        race_id,
        &request,
    )?;
    drop(persistence);

    Ok(Json(WriteResponse {
        success: true,
        message: Some(String::from("Race updated")),
    }))
}

/// Handler for PUT `/races/{race_id}/cover` endpoint.
///
/// Replaces the race's cover image with the raw request body.
async fn handle_replace_cover(
    AxumState(app_state): AxumState<AppState>,
    SessionIdentity(identity): SessionIdentity,
    Path(race_id): Path<String>,
    body: Bytes,
) -> Result<Json<WriteResponse>, HttpError> {
    let race_id: Id = parse_id(&race_id, "race_id")?;
    let request: UpdateRaceRequest = UpdateRaceRequest {
        start_at: None,
        cover_image: CoverImageUpdate::Replace(body.to_vec()),
    };

    let mut persistence = app_state.persistence.lock().await;
    update_race(
        &mut persistence,
        app_state.files.as_ref(),
        &identity,
        race_id,
        &request,
    )?;
    drop(persistence);

    Ok(Json(WriteResponse {
        success: true,
        message: Some(String::from("Cover image replaced")),
    }))
}

/// Handler for DELETE `/races/{race_id}/cover` endpoint.
///
/// Removes the race's cover image.
async fn handle_clear_cover(
    AxumState(app_state): AxumState<AppState>,
    SessionIdentity(identity): SessionIdentity,
    Path(race_id): Path<String>,
) -> Result<Json<WriteResponse>, HttpError> {
    let race_id: Id = parse_id(&race_id, "race_id")?;
    let request: UpdateRaceRequest = UpdateRaceRequest {
        start_at: None,
        cover_image: CoverImageUpdate::Clear,
    };

    let mut persistence = app_state.persistence.lock().await;
    update_race(
        &mut persistence,
        app_state.files.as_ref(),
        &identity,
        race_id,
        &request,
    )?;
    drop(persistence);

    Ok(Json(WriteResponse {
        success: true,
        message: Some(String::from("Cover image removed")),
    }))
}

/// Handler for POST `/races/{race_id}/open` endpoint.
///
/// Opens a race for registration with the given capacity.
async fn handle_open_registration(
    AxumState(app_state): AxumState<AppState>,
    SessionIdentity(identity): SessionIdentity,
    Path(race_id): Path<String>,
    Json(req): Json<OpenRegistrationApiRequest>,
) -> Result<Json<WriteResponse>, HttpError> {
    let race_id: Id = parse_id(&race_id, "race_id")?;

    let mut persistence = app_state.persistence.lock().await;
    open_race_for_registration(&mut persistence, &identity, race_id, req.maximum_participants)?;
    drop(persistence);

    Ok(Json(WriteResponse {
        success: true,
        message: Some(format!(
            "Registration opened for {} participants",
            req.maximum_participants
        )),
    }))
}

/// Handler for POST `/races/{race_id}/register` endpoint.
///
/// Registers the requester for the race.
async fn handle_register(
    AxumState(app_state): AxumState<AppState>,
    SessionIdentity(identity): SessionIdentity,
    Path(race_id): Path<String>,
) -> Result<Json<WriteResponse>, HttpError> {
    let race_id: Id = parse_id(&race_id, "race_id")?;

    let mut persistence = app_state.persistence.lock().await;
    register_for_race(&mut persistence, &identity, race_id)?;
    drop(persistence);

    Ok(Json(WriteResponse {
        success: true,
        message: Some(String::from("Registered")),
    }))
}

/// Handler for GET `/races/{race_id}/registrations` endpoint.
///
/// Lists the race's registrations with per-row capabilities. Organizer only.
async fn handle_list_registrations(
    AxumState(app_state): AxumState<AppState>,
    SessionIdentity(identity): SessionIdentity,
    Path(race_id): Path<String>,
) -> Result<Json<Vec<RaceRegistrationModel>>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let rows: Vec<RaceRegistrationModel> =
        race_registrations(&mut persistence, &identity, &race_id)?;
    drop(persistence);

    Ok(Json(rows))
}

/// Handler for PUT `/races/{race_id}/certificate` endpoint.
///
/// Attaches the raw request body as the requester's medical certificate.
async fn handle_upload_certificate(
    AxumState(app_state): AxumState<AppState>,
    SessionIdentity(identity): SessionIdentity,
    Path(race_id): Path<String>,
    body: Bytes,
) -> Result<Json<WriteResponse>, HttpError> {
    let race_id: Id = parse_id(&race_id, "race_id")?;

    let mut persistence = app_state.persistence.lock().await;
    upload_medical_certificate(
        &mut persistence,
        app_state.files.as_ref(),
        &identity,
        race_id,
        &body,
    )?;
    drop(persistence);

    Ok(Json(WriteResponse {
        success: true,
        message: Some(String::from("Medical certificate uploaded")),
    }))
}

/// Handler for POST `/races/{race_id}/registrations/{user_id}/certificate/approve` endpoint.
///
/// Approves a rider's medical certificate. Organizer only.
async fn handle_approve_certificate(
    AxumState(app_state): AxumState<AppState>,
    SessionIdentity(identity): SessionIdentity,
    Path((race_id, user_id)): Path<(String, String)>,
) -> Result<Json<WriteResponse>, HttpError> {
    let race_id: Id = parse_id(&race_id, "race_id")?;
    let rider: Id = parse_id(&user_id, "user_id")?;

    let mut persistence = app_state.persistence.lock().await;
    approve_medical_certificate(&mut persistence, &identity, race_id, rider)?;
    drop(persistence);

    Ok(Json(WriteResponse {
        success: true,
        message: Some(String::from("Medical certificate approved")),
    }))
}

/// Handler for POST `/races/{race_id}/registrations/{user_id}/approve` endpoint.
///
/// Approves a rider's registration. Organizer only.
async fn handle_approve_registration(
    AxumState(app_state): AxumState<AppState>,
    SessionIdentity(identity): SessionIdentity,
    Path((race_id, user_id)): Path<(String, String)>,
) -> Result<Json<WriteResponse>, HttpError> {
    let race_id: Id = parse_id(&race_id, "race_id")?;
    let rider: Id = parse_id(&user_id, "user_id")?;

    let mut persistence = app_state.persistence.lock().await;
    approve_race_registration(&mut persistence, &identity, race_id, rider)?;
    drop(persistence);

    Ok(Json(WriteResponse {
        success: true,
        message: Some(String::from("Registration approved")),
    }))
}

/// Builds the application router with all endpoints.
fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/users", post(handle_sign_up))
        .route("/sessions", post(handle_log_in))
        .route("/sessions", delete(handle_log_out))
        .route("/races", get(handle_list_races))
        .route("/races", post(handle_organize_race))
        .route("/races/{race_id}", get(handle_get_race))
        .route("/races/{race_id}", put(handle_update_race))
        .route("/races/{race_id}/cover", put(handle_replace_cover))
        .route("/races/{race_id}/cover", delete(handle_clear_cover))
        .route("/races/{race_id}/open", post(handle_open_registration))
        .route("/races/{race_id}/register", post(handle_register))
        .route(
            "/races/{race_id}/registrations",
            get(handle_list_registrations),
        )
        .route(
            "/races/{race_id}/certificate",
            put(handle_upload_certificate),
        )
        .route(
            "/races/{race_id}/registrations/{user_id}/certificate/approve",
            post(handle_approve_certificate),
        )
        .route(
            "/races/{race_id}/registrations/{user_id}/approve",
            post(handle_approve_registration),
        )
        .with_state(app_state)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let args: Args = Args::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing Velo Server");

    // Initialize persistence (in-memory or file-based based on CLI argument)
    let persistence: Persistence = if let Some(db_path) = &args.database {
        info!("Using file-based database at: {}", db_path);
        Persistence::new_with_file(db_path)?
    } else {
        info!("Using in-memory database");
        Persistence::new_in_memory()?
    };

    let files: DiskFileStore = DiskFileStore::new(&args.media_dir)?;
    info!("Storing media files in: {}", args.media_dir);

    let app_state: AppState = AppState {
        persistence: Arc::new(Mutex::new(persistence)),
        files: Arc::new(files),
    };

    // Build router
    let app: Router = build_router(app_state);

    // Bind to address
    let addr: std::net::SocketAddr = format!("127.0.0.1:{}", args.port).parse()?;
    info!("Server listening on {}", addr);

    // Run server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
