use axum::Router;

use crate::AppState;

pub mod alerts_routes;
pub mod check_routes;
pub mod prices_routes;
pub mod subscribe_routes;

pub fn app(state: AppState) -> Router {
    let router = Router::<AppState>::new();

    let router = alerts_routes::add_routes(router);
    let router = subscribe_routes::add_routes(router);
    let router = prices_routes::add_routes(router);
    let router = check_routes::add_routes(router);

    router.with_state(state)
}
