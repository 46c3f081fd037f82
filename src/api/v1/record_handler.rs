use super::error::*;
use super::handler::{ApiResponse, reply};
use crate::application_port::*;
use crate::domain_model::{EmployeeId, SquadId};
use serde::Deserialize;
use std::sync::Arc;
use warp::http::StatusCode;
use warp::{self, reject};

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub search: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl From<PeriodQuery> for PeriodInput {
    fn from(query: PeriodQuery) -> Self {
        PeriodInput {
            start_date: query.start_date,
            end_date: query.end_date,
        }
    }
}

fn parse_squad_id(raw: &str) -> Result<SquadId, warp::Rejection> {
    raw.parse()
        .map_err(|_| reject::custom(ApiErrorCode::SquadNotFound))
}

fn parse_employee_id(raw: &str) -> Result<EmployeeId, warp::Rejection> {
    raw.parse()
        .map_err(|_| reject::custom(ApiErrorCode::EmployeeNotFound))
}

// region squads

#[derive(Debug, Default, Deserialize)]
pub struct SquadRequest {
    pub name: Option<String>,
}

pub async fn list_squads(
    query: SearchQuery,
    squad_service: Arc<dyn SquadService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let squads = squad_service
        .list(query.search.as_deref())
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;
    Ok(warp::reply::json(&ApiResponse::from_cache(squads)))
}

pub async fn get_squad(
    id: String,
    squad_service: Arc<dyn SquadService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let squad_id = parse_squad_id(&id)?;
    let squad = squad_service
        .get(squad_id)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;
    Ok(warp::reply::json(&ApiResponse::from_cache(squad)))
}

pub async fn create_squad(
    body: SquadRequest,
    squad_service: Arc<dyn SquadService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let squad = squad_service
        .create(SquadInput { name: body.name })
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;
    let response = ApiResponse::ok(squad).with_message("Squad created");
    Ok(reply(&response, StatusCode::CREATED))
}

pub async fn update_squad(
    id: String,
    body: SquadRequest,
    squad_service: Arc<dyn SquadService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let squad_id = parse_squad_id(&id)?;
    let squad = squad_service
        .update(squad_id, SquadInput { name: body.name })
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;
    Ok(warp::reply::json(
        &ApiResponse::ok(squad).with_message("Squad updated"),
    ))
}

pub async fn delete_squad(
    id: String,
    squad_service: Arc<dyn SquadService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let squad_id = parse_squad_id(&id)?;
    squad_service
        .delete(squad_id)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;
    Ok(warp::reply::json(&ApiResponse::done("Squad deleted")))
}

// endregion

// region employees

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeRequest {
    pub name: Option<String>,
    pub estimated_hours: Option<i32>,
    pub squad_id: Option<SquadId>,
}

impl From<EmployeeRequest> for EmployeeInput {
    fn from(body: EmployeeRequest) -> Self {
        EmployeeInput {
            name: body.name,
            estimated_hours: body.estimated_hours,
            squad_id: body.squad_id,
        }
    }
}

pub async fn list_employees(
    query: SearchQuery,
    employee_service: Arc<dyn EmployeeService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let employees = employee_service
        .list(query.search.as_deref())
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;
    Ok(warp::reply::json(&ApiResponse::from_cache(employees)))
}

pub async fn get_employee(
    id: String,
    employee_service: Arc<dyn EmployeeService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let employee_id = parse_employee_id(&id)?;
    let employee = employee_service
        .get(employee_id)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;
    Ok(warp::reply::json(&ApiResponse::from_cache(employee)))
}

pub async fn create_employee(
    body: EmployeeRequest,
    employee_service: Arc<dyn EmployeeService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let employee = employee_service
        .create(body.into())
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;
    let response = ApiResponse::ok(employee).with_message("Employee created");
    Ok(reply(&response, StatusCode::CREATED))
}

pub async fn update_employee(
    id: String,
    body: EmployeeRequest,
    employee_service: Arc<dyn EmployeeService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let employee_id = parse_employee_id(&id)?;
    let employee = employee_service
        .update(employee_id, body.into())
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;
    Ok(warp::reply::json(
        &ApiResponse::ok(employee).with_message("Employee updated"),
    ))
}

pub async fn delete_employee(
    id: String,
    employee_service: Arc<dyn EmployeeService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let employee_id = parse_employee_id(&id)?;
    employee_service
        .delete(employee_id)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;
    Ok(warp::reply::json(&ApiResponse::done("Employee deleted")))
}

// endregion

// region reports

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    pub description: Option<String>,
    pub employee_id: Option<EmployeeId>,
    pub spent_hours: Option<i32>,
}

pub async fn list_reports(
    report_service: Arc<dyn ReportService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let reports = report_service
        .list()
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;
    Ok(warp::reply::json(&ApiResponse::from_cache(reports)))
}

pub async fn create_report(
    body: ReportRequest,
    report_service: Arc<dyn ReportService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let input = ReportInput {
        description: body.description,
        employee_id: body.employee_id,
        spent_hours: body.spent_hours,
    };
    let report = report_service
        .create(input)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;
    let response = ApiResponse::ok(report).with_message("Report created");
    Ok(reply(&response, StatusCode::CREATED))
}

pub async fn squad_member_hours(
    id: String,
    query: PeriodQuery,
    report_service: Arc<dyn ReportService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let squad_id = parse_squad_id(&id)?;
    let members = report_service
        .squad_member_hours(squad_id, query.into())
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;
    Ok(warp::reply::json(&ApiResponse::from_cache(members)))
}

pub async fn squad_total_hours(
    id: String,
    query: PeriodQuery,
    report_service: Arc<dyn ReportService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let squad_id = parse_squad_id(&id)?;
    let total = report_service
        .squad_total_hours(squad_id, query.into())
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;
    Ok(warp::reply::json(&ApiResponse::from_cache(total)))
}

pub async fn squad_average_hours(
    id: String,
    query: PeriodQuery,
    report_service: Arc<dyn ReportService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let squad_id = parse_squad_id(&id)?;
    let average = report_service
        .squad_average_hours(squad_id, query.into())
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;
    Ok(warp::reply::json(&ApiResponse::from_cache(average)))
}

pub async fn dashboard(
    report_service: Arc<dyn ReportService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let stats = report_service
        .dashboard()
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;
    Ok(warp::reply::json(&ApiResponse::from_cache(stats)))
}

// endregion
