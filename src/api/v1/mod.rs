mod error;
mod handler;
mod record_handler;
mod router;

pub use error::{ApiErrorCode, recover_error};
pub use handler::{ApiResponse, health};
pub use router::{routes, with_authentication};
