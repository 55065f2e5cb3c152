use axum::{
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::{api::handlers, service::IpamService};

#[derive(Clone)]
pub struct AppState {
    pub service: IpamService,
}

/// Smart-proxy external IPAM routes plus `/health`.
pub fn create_router(service: IpamService) -> Router {
    let state = Arc::new(AppState { service });

    Router::new()
        .route("/health", get(handlers::health))
        .route("/subnet/{address}/{prefix}/next_ip", get(handlers::next_ip))
        .route("/subnet/{address}/{prefix}", get(handlers::get_subnet))
        .route(
            "/subnet/{address}/{prefix}/{ip}",
            get(handlers::check_ip)
                .post(handlers::add_ip)
                .delete(handlers::delete_ip),
        )
        .route("/groups", get(handlers::list_groups))
        .route("/groups/{group}", get(handlers::get_group))
        .route("/groups/{group}/subnets", get(handlers::group_subnets))
        .route(
            "/group/{group}/subnet/{address}/{prefix}",
            get(handlers::subnet_in_group),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
