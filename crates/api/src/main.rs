#[tokio::main]
async fn main() {
    devmart_observability::init();

    let admin_emails: Vec<String> = std::env::var("ADMIN_EMAILS")
        .unwrap_or_default()
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if admin_emails.is_empty() {
        tracing::warn!("ADMIN_EMAILS not set; no admin sign-ins possible");
    }

    let app = devmart_api::app::build_app(admin_emails).await;

    let addr = std::env::var("DEVMART_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {addr}: {e}"));

    tracing::info!("listening on {}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.unwrap();
}
