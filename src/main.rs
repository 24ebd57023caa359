use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use saneamento_pcj::config::{self, LoadFailureMode};
use saneamento_pcj::ingest;
use saneamento_pcj::query::QueryService;
use saneamento_pcj::schema::pcj_schema;
use saneamento_pcj::server::{self, AppState, cache::ResponseCache};
use saneamento_pcj::types::LoadState;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cfg = config::from_env();
    info!(path = %cfg.data_path, "carregando dados");

    let schema = pcj_schema();
    let state = match ingest::ingest_from_path(&cfg.data_path, &schema, &cfg.ingest) {
        Ok(dataset) => {
            info!(municipios = dataset.len(), "dados carregados, limpos e indexados");
            LoadState::Ready(dataset)
        }
        Err(e) => {
            let message = format!("Erro crítico na inicialização: {e}");
            error!("{message}");
            if cfg.on_load_error == LoadFailureMode::FailFast {
                anyhow::bail!(message);
            }
            LoadState::Failed(message)
        }
    };

    let app = server::router(AppState {
        query: QueryService::new(Arc::new(state)),
        cache: Arc::new(ResponseCache::new(Duration::from_secs(cfg.cache_ttl_secs))),
    });

    let listener = tokio::net::TcpListener::bind(&cfg.bind).await?;
    info!("escutando em http://{}", cfg.bind);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("servidor encerrado");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("falha ao instalar handler de Ctrl+C: {e}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => error!("falha ao instalar handler de SIGTERM: {e}"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Ctrl+C recebido, encerrando"),
        _ = terminate => info!("SIGTERM recebido, encerrando"),
    }
}
