mod auth_service;
mod cache_service;
mod employee_service;
mod record_error;
mod report_service;
mod squad_service;

pub use auth_service::*;
pub use cache_service::*;
pub use employee_service::*;
pub use record_error::*;
pub use report_service::*;
pub use squad_service::*;
