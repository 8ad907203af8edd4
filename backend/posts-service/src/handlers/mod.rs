/// HTTP handlers for posts-service
///
/// - posts: the `/api/posts` resource
/// - health: greeting, liveness and readiness probes
pub mod health;
pub mod posts;

use actix_web::web;

/// Register every route the service exposes
pub fn configure(cfg: &mut web::ServiceConfig) {
    health::configure_routes(cfg);
    posts::configure_routes(cfg);
    cfg.route("/metrics", web::get().to(crate::metrics::serve_metrics));
}
