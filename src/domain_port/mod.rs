// store

mod cache_store;

pub use cache_store::*;

// repo

mod employee_repo;
mod report_repo;
mod squad_repo;
mod user_repo;

pub use employee_repo::*;
pub use report_repo::*;
pub use squad_repo::*;
pub use user_repo::*;

// outbound

mod reset_notifier;

pub use reset_notifier::*;
