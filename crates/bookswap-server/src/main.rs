use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use bookswap_api::AppStateInner;
use bookswap_server::routes::create_router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bookswap=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let jwt_secret =
        std::env::var("BOOKSWAP_JWT_SECRET").unwrap_or_else(|_| "dev-secret-change-me".into());
    let db_path = std::env::var("BOOKSWAP_DB_PATH").unwrap_or_else(|_| "bookswap.db".into());
    let uploads_dir =
        std::env::var("BOOKSWAP_UPLOAD_DIR").unwrap_or_else(|_| "uploads".into());
    let host = std::env::var("BOOKSWAP_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("BOOKSWAP_PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()?;

    // Init database
    let db = bookswap_db::Database::open(&PathBuf::from(&db_path))?;

    // Shared state
    let state = Arc::new(AppStateInner {
        db,
        jwt_secret,
        uploads_dir: PathBuf::from(uploads_dir),
    });

    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("BookSwap server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
