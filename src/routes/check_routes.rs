use axum::{Router, routing::get};

use crate::{AppState, controllers::check_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router.route("/check-alerts", get(check_controller::get_check_alerts))
}
