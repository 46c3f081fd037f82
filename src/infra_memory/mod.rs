mod cache_store_memory;
mod glob;
mod reset_notifier_memory;
mod store_memory;

pub use cache_store_memory::*;
pub use glob::*;
pub use reset_notifier_memory::*;
pub use store_memory::*;
