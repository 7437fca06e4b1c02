use std::net::SocketAddr;

use coinping::{AppState, config, routes};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let settings = config::load();
    let state = AppState::from_settings(settings.clone());

    let app = routes::app(state);

    let addr = SocketAddr::from((
        settings.host.parse::<std::net::IpAddr>().unwrap(),
        settings.port,
    ));
    tracing::info!("listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
