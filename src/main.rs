use doc_intake::{
    api, config, documents::InMemoryDocumentStore, fetch::HttpFetcher, intake::IntakeService,
    logging, processing::DocumentPipeline, storage::LocalObjectStorage,
};
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() {
    config::init_config();
    logging::init_tracing();
    let config = config::get_config();

    let (listener, port) = bind_listener().await.expect("Failed to bind listener");
    let public_base_url = config
        .public_base_url
        .clone()
        .unwrap_or_else(|| format!("http://127.0.0.1:{port}"));

    let fetcher = Arc::new(HttpFetcher::from_config().expect("Failed to build HTTP fetcher"));
    let pipeline =
        DocumentPipeline::from_config(fetcher).expect("Failed to initialize summarization model");
    let storage = Arc::new(LocalObjectStorage::new(
        &config.storage_dir,
        public_base_url.clone(),
    ));
    let service = Arc::new(IntakeService::new(
        storage,
        Arc::new(InMemoryDocumentStore::new()),
        pipeline,
        config.pipeline_timeout(),
    ));
    let app = api::create_router(service.clone(), config.max_upload_bytes);

    tracing::info!(
        storage_dir = %config.storage_dir,
        public_base_url = %public_base_url,
        "Listening on http://0.0.0.0:{}",
        port
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
    service.shutdown().await;
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %error, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}

async fn bind_listener() -> Result<(TcpListener, u16), std::io::Error> {
    use std::net::Ipv4Addr;

    let config = config::get_config();
    if let Some(port) = config.server_port {
        return TcpListener::bind((Ipv4Addr::UNSPECIFIED, port))
            .await
            .map(|listener| (listener, port));
    }

    const PORT_RANGE: std::ops::RangeInclusive<u16> = 8000..=8099;
    for port in PORT_RANGE {
        match TcpListener::bind((Ipv4Addr::UNSPECIFIED, port)).await {
            Ok(listener) => {
                tracing::debug!(port, "Bound server port");
                return Ok((listener, port));
            }
            Err(err) if err.kind() == std::io::ErrorKind::AddrInUse => {
                tracing::debug!(port, "Port already in use; trying next");
                continue;
            }
            Err(err) => return Err(err),
        }
    }

    Err(std::io::Error::new(
        std::io::ErrorKind::AddrNotAvailable,
        "No available port found in range 8000-8099",
    ))
}
