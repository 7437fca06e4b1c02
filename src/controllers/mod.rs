pub mod alerts_controller;
pub mod check_controller;
pub mod prices_controller;
pub mod subscribe_controller;
