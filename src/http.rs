use crate::auth::{authorize, ProfessorAccess, StudentAccess};
use crate::backend::{blocking, AppointmentBackend};
use crate::configuration::Configuration;
use crate::error::AppError;
use crate::types::{Identity, Party, Role};
use crate::AppState;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::middleware;
use axum::{http::StatusCode, response::IntoResponse, Extension, Json};
use axum::{
    routing::{delete, get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;
use validator::Validate;

const REGISTER_FIELDS_REQUIRED: &str = "Username, password and role are required";
const LOGIN_FIELDS_REQUIRED: &str = "Username and password are required";
const INVALID_TIME_SLOTS: &str = "Invalid time slots";
const PROFESSOR_ID_REQUIRED: &str = "Professor ID is required";
const BOOKING_FIELDS_REQUIRED: &str = "Professor ID and time slot are required";

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
struct RegisterRequest {
    #[serde(default)]
    #[validate(length(min = 1))]
    username: String,
    #[serde(default)]
    #[validate(length(min = 1))]
    password: String,
    role: Option<Role>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
struct LoginRequest {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoginResponse {
    token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct AvailabilityRequest {
    #[serde(default)]
    #[validate(length(min = 1))]
    time_slots: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct BookingRequest {
    professor_id: Option<i32>,
    #[serde(default)]
    #[validate(length(min = 1))]
    time_slot: String,
}

pub fn create_app<T: AppointmentBackend, C: Configuration>(backend: T, configuration: &C) -> Router {
    let state = AppState::new(backend, configuration);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let public: Router<AppState<T>> = Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login));

    let students: Router<AppState<T>> = Router::new()
        .route(
            "/students/professors/:id/availability",
            get(get_availability),
        )
        .route(
            "/students/appointments",
            post(book_appointment).get(get_appointments),
        )
        .route("/students/appointments/:id", delete(cancel_appointment))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            authorize::<StudentAccess, T>,
        ));

    let professors: Router<AppState<T>> = Router::new()
        .route("/professors/availability", post(add_availability))
        .route("/professors/appointments", get(get_appointments))
        .route("/professors/appointments/:id", delete(cancel_appointment))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            authorize::<ProfessorAccess, T>,
        ));

    Router::new()
        .merge(public)
        .merge(students)
        .merge(professors)
        .with_state(state)
        .layer(cors)
}

/// Unwraps and validates a JSON body, answering any problem with `message`.
fn parse_body<R: Validate>(
    payload: Result<Json<R>, JsonRejection>,
    message: &str,
) -> Result<R, AppError> {
    let Json(request) = payload.map_err(|rejection| {
        warn!(%rejection, "Malformed request body");
        AppError::InvalidInput(message.into())
    })?;
    request.validate().map_err(|errors| {
        warn!(%errors, "Request body failed validation");
        AppError::InvalidInput(message.into())
    })?;
    Ok(request)
}

async fn register<T: AppointmentBackend>(
    State(state): State<AppState<T>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let request = parse_body(payload, REGISTER_FIELDS_REQUIRED)?;
    let role = request
        .role
        .ok_or_else(|| AppError::InvalidInput(REGISTER_FIELDS_REQUIRED.into()))?;

    state
        .accounts
        .register(request.username, request.password, role)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User registered successfully" })),
    ))
}

async fn login<T: AppointmentBackend>(
    State(state): State<AppState<T>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let request = parse_body(payload, LOGIN_FIELDS_REQUIRED)?;
    let token = state
        .accounts
        .login(&request.username, request.password)
        .await?;
    Ok(Json(LoginResponse { token }))
}

async fn add_availability<T: AppointmentBackend>(
    State(state): State<AppState<T>>,
    Extension(identity): Extension<Identity>,
    payload: Result<Json<AvailabilityRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let request = parse_body(payload, INVALID_TIME_SLOTS)?;
    let booking = state.booking.clone();
    blocking(move || booking.publish_availability(identity.id, request.time_slots)).await?;
    Ok((StatusCode::OK, "Availability added"))
}

async fn get_availability<T: AppointmentBackend>(
    State(state): State<AppState<T>>,
    professor_id: Result<Path<i32>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(professor_id) =
        professor_id.map_err(|_| AppError::InvalidInput(PROFESSOR_ID_REQUIRED.into()))?;
    let booking = state.booking.clone();
    Ok(Json(blocking(move || booking.availability(professor_id)).await?))
}

async fn book_appointment<T: AppointmentBackend>(
    State(state): State<AppState<T>>,
    Extension(identity): Extension<Identity>,
    payload: Result<Json<BookingRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let request = parse_body(payload, BOOKING_FIELDS_REQUIRED)?;
    // An id of 0 counts as absent, any other id goes to the professor lookup.
    let professor_id = request
        .professor_id
        .filter(|id| *id != 0)
        .ok_or_else(|| AppError::InvalidInput(BOOKING_FIELDS_REQUIRED.into()))?;

    let booking = state.booking.clone();
    let appointment =
        blocking(move || booking.book(identity.id, professor_id, request.time_slot)).await?;
    Ok((StatusCode::CREATED, Json(appointment)))
}

/// Lists the caller's appointments, through the column matching their role.
async fn get_appointments<T: AppointmentBackend>(
    State(state): State<AppState<T>>,
    Extension(identity): Extension<Identity>,
) -> Result<impl IntoResponse, AppError> {
    let booking = state.booking.clone();
    Ok(Json(
        blocking(move || booking.appointments(Party::from(identity))).await?,
    ))
}

async fn cancel_appointment<T: AppointmentBackend>(
    State(state): State<AppState<T>>,
    Extension(identity): Extension<Identity>,
    appointment_id: Result<Path<i32>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(appointment_id) = appointment_id.map_err(|_| AppError::AppointmentNotFound)?;
    let booking = state.booking.clone();
    blocking(move || booking.cancel(appointment_id, Party::from(identity))).await?;
    Ok((StatusCode::OK, "Appointment cancelled"))
}
