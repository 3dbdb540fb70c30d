use crate::api::routes;
use crate::config::SharedConfig;
use crate::platform::DynPlatform;
use axum::Router;
use std::future::Future;

#[derive(Clone)]
pub(super) struct AppState {
    pub config: SharedConfig,
    pub platform: DynPlatform,
}

/// The legacy API routes, without a listener.
pub fn router(config: SharedConfig, platform: DynPlatform) -> Router {
    routes::new(AppState { config, platform })
}

pub fn new(
    config: SharedConfig,
    platform: DynPlatform,
) -> impl Future<Output = hyper::Result<()>> {
    let bind_addr = config.api_bind_addr;
    axum::Server::bind(&bind_addr).serve(router(config, platform).into_make_service())
}
