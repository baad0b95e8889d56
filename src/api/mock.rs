// Local stand-ins for the remote services, used by tests

use crate::api::client::Services;
use crate::core::config::ServicesConfig;
use axum::Router;
use tokio::net::TcpListener;

/// Serve `router` on an ephemeral local port and return its base URL.
pub async fn spawn_upstream(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    format!("http://{}", addr)
}

/// A base URL nothing listens on.
pub fn unreachable_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

pub fn services_config(base: &str) -> ServicesConfig {
    ServicesConfig {
        classroom_url: base.to_string(),
        assignments_url: base.to_string(),
        users_url: base.to_string(),
        stage: "dev".to_string(),
        request_timeout_secs: 5,
    }
}

/// All three services pointed at one mock; their paths do not overlap.
pub fn test_services(base: &str) -> Services {
    Services::with_client(reqwest::Client::new(), &services_config(base))
}
