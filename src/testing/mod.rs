//! Test support: serve a fake upstream router on an ephemeral port.

use axum::Router;

/// Bind the router on a free loopback port and return its base URL. The
/// server task lives for the rest of the test process.
pub async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve test router");
    });
    format!("http://{}", addr)
}
