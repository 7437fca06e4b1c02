use axum::{Router, routing::post};

use crate::{AppState, controllers::subscribe_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router.route(
        "/subscribe",
        post(subscribe_controller::post_subscribe).delete(subscribe_controller::delete_subscribe),
    )
}
