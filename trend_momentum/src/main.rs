use std::net::SocketAddr;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use trend_momentum::routers::create_routes;
use trend_momentum::{load_config, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config()?;

    // Настройка структурированного логирования: stdout + опционально JSON-файл с ротацией
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("trend_momentum=info,tower_http=info,warn"));

    let (file_layer, _log_guard) = match &config.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "trend_momentum.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .json()
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true))
        .with(file_layer)
        .init();

    tracing::info!(keywords = config.keywords.len(), "Конфигурация загружена");

    let state = AppState::from_config(&config);
    let app = create_routes(state);

    let addr: SocketAddr = config.server_addr.parse()?;
    tracing::info!("Сервер запущен на http://{}", addr);
    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await?;
    Ok(())
}
