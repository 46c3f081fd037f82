use crate::api::v1::handler::ApiResponse;
use crate::application_port::*;
use crate::logger::*;
use serde::{Serialize, Serializer};
use std::convert::Infallible;
use thiserror::Error;
use warp::http::StatusCode;
use warp::{Rejection, reject};

pub async fn recover_error(err: Rejection) -> Result<impl warp::Reply, Infallible> {
    let code = if let Some(code) = err.find::<ApiErrorCode>() {
        code.clone()
    } else if err.is_not_found() {
        ApiErrorCode::NotFound
    } else if let Some(e) = err.find::<warp::body::BodyDeserializeError>() {
        ApiErrorCode::Validation(e.to_string())
    } else if let Some(e) = err.find::<reject::InvalidQuery>() {
        ApiErrorCode::Validation(e.to_string())
    } else if err.find::<reject::PayloadTooLarge>().is_some() {
        ApiErrorCode::Validation("Request body too large".to_string())
    } else if err.find::<reject::UnsupportedMediaType>().is_some() {
        ApiErrorCode::Validation("Expected a JSON body".to_string())
    } else if let Some(e) = err.find::<warp::cors::CorsForbidden>() {
        ApiErrorCode::Validation(e.to_string())
    } else if err.find::<reject::MethodNotAllowed>().is_some() {
        ApiErrorCode::MethodNotAllowed
    } else {
        error!("unhandled rejection: {:?}", err);
        ApiErrorCode::InternalError
    };

    let status = code.status();
    let json = warp::reply::json(&ApiResponse::<()>::err(code.clone(), code.to_string()));
    Ok(warp::reply::with_status(json, status))
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: ApiErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiErrorCode {
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Access token not provided")]
    TokenMissing,
    #[error("Invalid access token")]
    TokenInvalid,
    #[error("Access token expired")]
    TokenExpired,
    #[error("Invalid or expired reset token")]
    ResetTokenInvalid,
    #[error("User no longer exists")]
    UserGone,
    #[error("Refresh token not provided")]
    RefreshTokenMissing,
    #[error("Invalid refresh token")]
    RefreshTokenInvalid,
    #[error("Session expired, please log in again")]
    SessionExpired,
    #[error("Squad not found")]
    SquadNotFound,
    #[error("Squad name is required")]
    SquadNameRequired,
    #[error("Employee not found")]
    EmployeeNotFound,
    #[error("Name, estimatedHours and squadId are required")]
    EmployeeFieldsRequired,
    #[error("estimatedHours must be between 1 and 12")]
    EstimatedHoursOutOfRange,
    #[error("Description, employeeId and a positive spentHours are required")]
    ReportFieldsRequired,
    #[error("startDate and endDate are required (YYYY-MM-DD) and endDate must not precede startDate")]
    InvalidPeriod,
    #[error("Record already exists")]
    Duplicate,
    #[error("Database operation failed")]
    StoreError,
    #[error("{0}")]
    Validation(String),
    #[error("Route not found")]
    NotFound,
    #[error("Method not allowed")]
    MethodNotAllowed,
    #[error("Internal error")]
    InternalError,
}

impl ApiErrorCode {
    pub fn internal<E: std::fmt::Display>(error: E) -> ApiErrorCode {
        warn!("Internal error: {}", error);
        ApiErrorCode::InternalError
    }

    fn store<E: std::fmt::Display>(error: E) -> ApiErrorCode {
        error!("Store error: {}", error);
        ApiErrorCode::StoreError
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiErrorCode::InvalidCredentials => "AUTH_001",
            ApiErrorCode::TokenMissing => "AUTH_002",
            ApiErrorCode::TokenInvalid => "AUTH_003",
            ApiErrorCode::TokenExpired => "AUTH_004",
            ApiErrorCode::ResetTokenInvalid => "AUTH_005",
            ApiErrorCode::UserGone => "AUTH_006",
            ApiErrorCode::RefreshTokenMissing => "AUTH_007",
            ApiErrorCode::RefreshTokenInvalid => "AUTH_008",
            ApiErrorCode::SessionExpired => "AUTH_009",
            ApiErrorCode::SquadNotFound => "SQUAD_001",
            ApiErrorCode::SquadNameRequired => "SQUAD_002",
            ApiErrorCode::EmployeeNotFound => "EMPLOYEE_001",
            ApiErrorCode::EmployeeFieldsRequired => "EMPLOYEE_002",
            ApiErrorCode::EstimatedHoursOutOfRange => "EMPLOYEE_003",
            ApiErrorCode::ReportFieldsRequired => "REPORT_002",
            ApiErrorCode::InvalidPeriod => "REPORT_003",
            ApiErrorCode::Duplicate => "DB_001",
            ApiErrorCode::StoreError => "DB_005",
            ApiErrorCode::Validation(_) => "VALIDATION_001",
            ApiErrorCode::NotFound => "NOT_FOUND",
            ApiErrorCode::MethodNotAllowed => "METHOD_NOT_ALLOWED",
            ApiErrorCode::InternalError => "INTERNAL_001",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiErrorCode::InvalidCredentials
            | ApiErrorCode::TokenMissing
            | ApiErrorCode::TokenInvalid
            | ApiErrorCode::TokenExpired
            | ApiErrorCode::UserGone
            | ApiErrorCode::RefreshTokenMissing
            | ApiErrorCode::RefreshTokenInvalid
            | ApiErrorCode::SessionExpired => StatusCode::UNAUTHORIZED,
            ApiErrorCode::ResetTokenInvalid
            | ApiErrorCode::SquadNameRequired
            | ApiErrorCode::EmployeeFieldsRequired
            | ApiErrorCode::EstimatedHoursOutOfRange
            | ApiErrorCode::ReportFieldsRequired
            | ApiErrorCode::InvalidPeriod
            | ApiErrorCode::Validation(_) => StatusCode::BAD_REQUEST,
            ApiErrorCode::SquadNotFound
            | ApiErrorCode::EmployeeNotFound
            | ApiErrorCode::NotFound => StatusCode::NOT_FOUND,
            ApiErrorCode::Duplicate => StatusCode::CONFLICT,
            ApiErrorCode::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiErrorCode::StoreError | ApiErrorCode::InternalError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl Serialize for ApiErrorCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

impl reject::Reject for ApiErrorCode {}

impl From<AuthError> for ApiErrorCode {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::InvalidCredentials => ApiErrorCode::InvalidCredentials,
            AuthError::InvalidInput(message) => ApiErrorCode::Validation(message),
            AuthError::UserExists => ApiErrorCode::Duplicate,
            AuthError::UserNotFound => ApiErrorCode::UserGone,
            AuthError::TokenMissing => ApiErrorCode::TokenMissing,
            AuthError::TokenInvalid => ApiErrorCode::TokenInvalid,
            AuthError::TokenExpired => ApiErrorCode::TokenExpired,
            AuthError::RefreshTokenMissing => ApiErrorCode::RefreshTokenMissing,
            AuthError::RefreshTokenInvalid => ApiErrorCode::RefreshTokenInvalid,
            AuthError::SessionExpired => ApiErrorCode::SessionExpired,
            AuthError::ResetTokenInvalid => ApiErrorCode::ResetTokenInvalid,
            AuthError::Store(e) => ApiErrorCode::store(e),
            AuthError::InternalError(e) => ApiErrorCode::internal(e),
        }
    }
}

impl From<RecordError> for ApiErrorCode {
    fn from(error: RecordError) -> Self {
        match error {
            RecordError::SquadNotFound => ApiErrorCode::SquadNotFound,
            RecordError::SquadNameRequired => ApiErrorCode::SquadNameRequired,
            RecordError::EmployeeNotFound => ApiErrorCode::EmployeeNotFound,
            RecordError::EmployeeFieldsRequired => ApiErrorCode::EmployeeFieldsRequired,
            RecordError::EstimatedHoursOutOfRange => ApiErrorCode::EstimatedHoursOutOfRange,
            RecordError::ReportFieldsRequired => ApiErrorCode::ReportFieldsRequired,
            RecordError::InvalidPeriod => ApiErrorCode::InvalidPeriod,
            RecordError::Duplicate => ApiErrorCode::Duplicate,
            RecordError::Store(e) => ApiErrorCode::store(e),
        }
    }
}
