pub mod v1;

use crate::server::Server;
use std::sync::Arc;
use warp::Filter;

/// Every HTTP route the service exposes, with error rendering, CORS and
/// per-request tracing spans applied.
pub fn routes(
    server: Arc<Server>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = std::convert::Infallible> + Clone {
    let cache = server.cache.clone();
    let health = warp::path!("health")
        .and(warp::get())
        .and(warp::any().map(move || cache.clone()))
        .and_then(v1::health);

    let api_v1 = warp::path("api")
        .and(warp::path("v1"))
        .and(v1::routes(server));

    let cors = warp::cors()
        .allow_any_origin()
        .allow_headers(vec!["authorization", "content-type"])
        .allow_methods(vec!["GET", "POST", "PUT", "DELETE"])
        .build();

    health
        .or(api_v1)
        .with(cors)
        .recover(v1::recover_error)
        .with(warp::trace::request())
}
