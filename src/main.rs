use anyhow::Result;
use clap::Parser;
use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info, warn};
mod config;
mod error;
mod events;
mod services;
mod utils;

use config::Config;
use services::{create_badge_renderer, create_platform, IndicatorService};

#[derive(Parser, Debug)]
#[command(name = "ime-badge")]
#[command(about = "Показывает режим IME (K/E) рядом с кареткой или курсором")]
struct Args {
    /// Путь к файлу конфигурации
    #[arg(short, long, default_value = "ime-badge.toml")]
    config: String,

    /// Режим сухого запуска (эмулируемый рабочий стол вместо Win32 API)
    #[arg(long)]
    dry_run: bool,

    /// Уровень логирования (по умолчанию из конфигурации)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Загрузка конфигурации
    let config = Config::load(&args.config)?;

    // Инициализация системы логирования
    let level = args.log_level.as_deref().unwrap_or(&config.logging.level);
    init_tracing(&config, level)?;

    info!("Запуск IME Badge v{}", env!("CARGO_PKG_VERSION"));
    info!("Конфигурация загружена из: {}", args.config);

    if args.dry_run {
        warn!("Режим сухого запуска - рабочий стол эмулируется");
    }

    // Инициализация компонентов
    let platform = create_platform(args.dry_run)?;
    let renderer = create_badge_renderer(&config.badge);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let service = IndicatorService::new(&config, platform, renderer, shutdown_rx);

    info!("Все компоненты инициализированы");

    let service_handle = tokio::spawn(async move {
        if let Err(e) = service.run().await {
            error!("Ошибка в IndicatorService: {}", e);
        }
    });

    // Ожидание сигнала завершения
    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Получен сигнал завершения (Ctrl+C)");
        }
        Err(err) => {
            error!("Ошибка при ожидании сигнала завершения: {}", err);
        }
    }

    info!("Завершение работы...");

    // Просим сервис скрыть значок и выйти из цикла
    if shutdown_tx.send(true).is_err() {
        warn!("IndicatorService уже остановлен");
    }

    // Ожидаем завершения задачи (с таймаутом)
    let shutdown_timeout = tokio::time::Duration::from_secs(5);
    match tokio::time::timeout(shutdown_timeout, service_handle).await {
        Ok(_) => info!("IndicatorService завершил работу корректно"),
        Err(_) => warn!("Таймаут при завершении IndicatorService"),
    }

    info!("IME Badge завершил работу");
    Ok(())
}

fn init_tracing(config: &Config, level: &str) -> Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_directive(level)))?;

    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.format == "full" {
        registry.with(tracing_subscriber::fmt::layer()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer().compact()).init();
    }

    Ok(())
}
