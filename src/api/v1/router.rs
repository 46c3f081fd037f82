use super::error::*;
use super::handler;
use super::record_handler;
use crate::application_port::AuthService;
use crate::domain_model::UserSummary;
use crate::server::*;
use serde::de::DeserializeOwned;
use std::convert::Infallible;
use std::sync::Arc;
use warp::{Filter, http, reject};

pub fn routes(
    server: Arc<Server>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    auth_routes(server.clone())
        .or(squad_routes(server.clone()))
        .or(employee_routes(server.clone()))
        .or(report_routes(server))
}

// Each route matches its path before its method so that an unknown path
// reads as 404 rather than 405.

fn auth_routes(
    server: Arc<Server>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let login = warp::path!("auth" / "login")
        .and(warp::post())
        .and(warp::body::json())
        .and(with(server.auth_service.clone()))
        .and_then(handler::login);

    let refresh = warp::path!("auth" / "refresh-token")
        .and(warp::post())
        .and(optional_json_body())
        .and(with(server.auth_service.clone()))
        .and_then(handler::refresh_token);

    let logout = warp::path!("auth" / "logout")
        .and(warp::post())
        .and(with_authentication(server.auth_service.clone()))
        .and(with(server.auth_service.clone()))
        .and_then(handler::logout);

    let forgot_password = warp::path!("auth" / "forgot-password")
        .and(warp::post())
        .and(warp::body::json())
        .and(with(server.auth_service.clone()))
        .and_then(handler::forgot_password);

    let reset_password = warp::path!("auth" / "reset-password")
        .and(warp::post())
        .and(warp::body::json())
        .and(with(server.auth_service.clone()))
        .and_then(handler::reset_password);

    login
        .or(refresh)
        .or(logout)
        .or(forgot_password)
        .or(reset_password)
}

fn squad_routes(
    server: Arc<Server>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let authenticated = authenticated(server.auth_service.clone());

    let list = warp::path!("squads")
        .and(warp::get())
        .and(authenticated.clone())
        .and(warp::query::<record_handler::SearchQuery>())
        .and(with(server.squad_service.clone()))
        .and_then(record_handler::list_squads);

    let create = warp::path!("squads")
        .and(warp::post())
        .and(authenticated.clone())
        .and(warp::body::json())
        .and(with(server.squad_service.clone()))
        .and_then(record_handler::create_squad);

    let get = warp::path!("squads" / String)
        .and(warp::get())
        .and(authenticated.clone())
        .and(with(server.squad_service.clone()))
        .and_then(record_handler::get_squad);

    let update = warp::path!("squads" / String)
        .and(warp::put())
        .and(authenticated.clone())
        .and(warp::body::json())
        .and(with(server.squad_service.clone()))
        .and_then(record_handler::update_squad);

    let delete = warp::path!("squads" / String)
        .and(warp::delete())
        .and(authenticated)
        .and(with(server.squad_service.clone()))
        .and_then(record_handler::delete_squad);

    list.or(create).or(get).or(update).or(delete)
}

fn employee_routes(
    server: Arc<Server>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let authenticated = authenticated(server.auth_service.clone());

    let list = warp::path!("employees")
        .and(warp::get())
        .and(authenticated.clone())
        .and(warp::query::<record_handler::SearchQuery>())
        .and(with(server.employee_service.clone()))
        .and_then(record_handler::list_employees);

    let create = warp::path!("employees")
        .and(warp::post())
        .and(authenticated.clone())
        .and(warp::body::json())
        .and(with(server.employee_service.clone()))
        .and_then(record_handler::create_employee);

    let get = warp::path!("employees" / String)
        .and(warp::get())
        .and(authenticated.clone())
        .and(with(server.employee_service.clone()))
        .and_then(record_handler::get_employee);

    let update = warp::path!("employees" / String)
        .and(warp::put())
        .and(authenticated.clone())
        .and(warp::body::json())
        .and(with(server.employee_service.clone()))
        .and_then(record_handler::update_employee);

    let delete = warp::path!("employees" / String)
        .and(warp::delete())
        .and(authenticated)
        .and(with(server.employee_service.clone()))
        .and_then(record_handler::delete_employee);

    list.or(create).or(get).or(update).or(delete)
}

fn report_routes(
    server: Arc<Server>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let authenticated = authenticated(server.auth_service.clone());

    let list = warp::path!("reports")
        .and(warp::get())
        .and(authenticated.clone())
        .and(with(server.report_service.clone()))
        .and_then(record_handler::list_reports);

    let create = warp::path!("reports")
        .and(warp::post())
        .and(authenticated.clone())
        .and(warp::body::json())
        .and(with(server.report_service.clone()))
        .and_then(record_handler::create_report);

    let dashboard = warp::path!("reports" / "dashboard")
        .and(warp::get())
        .and(authenticated.clone())
        .and(with(server.report_service.clone()))
        .and_then(record_handler::dashboard);

    let member_hours = warp::path!("reports" / "squad" / String / "member-hours")
        .and(warp::get())
        .and(authenticated.clone())
        .and(warp::query::<record_handler::PeriodQuery>())
        .and(with(server.report_service.clone()))
        .and_then(record_handler::squad_member_hours);

    let total_hours = warp::path!("reports" / "squad" / String / "total-hours")
        .and(warp::get())
        .and(authenticated.clone())
        .and(warp::query::<record_handler::PeriodQuery>())
        .and(with(server.report_service.clone()))
        .and_then(record_handler::squad_total_hours);

    let average_hours = warp::path!("reports" / "squad" / String / "average-hours")
        .and(warp::get())
        .and(authenticated)
        .and(warp::query::<record_handler::PeriodQuery>())
        .and(with(server.report_service.clone()))
        .and_then(record_handler::squad_average_hours);

    list.or(create)
        .or(dashboard)
        .or(member_hours)
        .or(total_hours)
        .or(average_hours)
}

fn with<ServiceType>(
    service: Arc<ServiceType>,
) -> impl Filter<Extract = (Arc<ServiceType>,), Error = Infallible> + Clone
where
    ServiceType: Send + Sync + ?Sized,
{
    warp::any().map(move || service.clone())
}

/// Like `warp::body::json`, but an empty body deserializes to `T::default()`.
fn optional_json_body<T: DeserializeOwned + Default + Send + 'static>()
-> impl Filter<Extract = (T,), Error = warp::Rejection> + Clone {
    warp::body::bytes().and_then(|bytes: warp::hyper::body::Bytes| async move {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(T::default());
        }
        serde_json::from_slice(&bytes)
            .map_err(|e| reject::custom(ApiErrorCode::Validation(e.to_string())))
    })
}

/// Resolves the `Authorization: Bearer` header to the calling account.
pub fn with_authentication(
    auth_service: Arc<dyn AuthService>,
) -> impl Filter<Extract = (UserSummary,), Error = warp::Rejection> + Clone {
    warp::header::headers_cloned().and_then(move |headers: http::HeaderMap| {
        let auth_service = auth_service.clone();
        async move {
            let token = headers
                .get(http::header::AUTHORIZATION)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.strip_prefix("Bearer "))
                .map(str::trim)
                .filter(|token| !token.is_empty())
                .ok_or_else(|| reject::custom(ApiErrorCode::TokenMissing))?;
            auth_service
                .authenticate(token)
                .await
                .map_err(ApiErrorCode::from)
                .map_err(reject::custom)
        }
    })
}

/// Authentication for routes that do not need the caller's identity.
fn authenticated(
    auth_service: Arc<dyn AuthService>,
) -> impl Filter<Extract = (), Error = warp::Rejection> + Clone {
    with_authentication(auth_service)
        .map(|_: UserSummary| ())
        .untuple_one()
}
