//! QA Server binary
//!
//! Run with: cargo run -p qa-system --bin qa-server [config.toml]

use qa_system::{config::QaConfig, server::QaServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "qa_system=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!(
        r#"
╔═══════════════════════════════════════════════════════════╗
║                        QA System                          ║
║         Retriever + Reader Question Answering             ║
╚═══════════════════════════════════════════════════════════╝
"#
    );

    // Load configuration
    let mut config = match std::env::args().nth(1) {
        Some(path) => QaConfig::load(&path)?,
        None => QaConfig::default(),
    };
    config.apply_env();

    tracing::info!("Configuration loaded");
    tracing::info!("  - Elasticsearch: {} (index {})", config.elasticsearch.url, config.elasticsearch.index_name);
    tracing::info!("  - Reader model: {}", config.reader.model);
    tracing::info!("  - Merge strategy: {:?}", config.reader.merge_strategy);
    tracing::info!("  - Documents per question: {}", config.pipeline.n_docs);

    // Create and start server
    let server = QaServer::new(config).await?;

    println!("\nServer starting...");
    println!("  API: http://{}", server.address());
    println!("  Health: http://{}/health", server.address());
    println!("  API Info: http://{}/api/info", server.address());
    println!("\nEndpoints:");
    println!("  POST /api/query     - Ask questions over the index");
    println!("  POST /api/wiki      - Ask questions over Wikipedia");
    println!("  POST /api/documents - Load corpus records");
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}
