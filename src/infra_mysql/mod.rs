mod employee_repo_mysql;
mod report_repo_mysql;
mod squad_repo_mysql;
mod user_repo_mysql;

pub use employee_repo_mysql::*;
pub use report_repo_mysql::*;
pub use squad_repo_mysql::*;
pub use user_repo_mysql::*;

mod util;
