use axum::{Router, routing::get};

use crate::{AppState, controllers::prices_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router.route("/prices", get(prices_controller::get_prices))
}
