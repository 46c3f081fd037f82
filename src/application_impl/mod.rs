mod auth_service_impl;
mod cache_aside;
mod cache_invalidation;
mod cache_keys;
mod cache_service_impl;
mod credential_hasher_argon2;
mod employee_service_impl;
mod report_service_impl;
mod squad_service_impl;
mod token_codec_jwt;
mod token_digest;

pub use auth_service_impl::*;
pub use cache_aside::*;
pub use cache_invalidation::*;
pub use cache_keys::*;
pub use cache_service_impl::*;
pub use credential_hasher_argon2::*;
pub use employee_service_impl::*;
pub use report_service_impl::*;
pub use squad_service_impl::*;
pub use token_codec_jwt::*;
pub use token_digest::*;
