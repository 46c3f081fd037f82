mod clock;
mod employee;
mod period;
mod report;
mod squad;
mod user;

pub use clock::*;
pub use employee::*;
pub use period::*;
pub use report::*;
pub use squad::*;
pub use user::*;
