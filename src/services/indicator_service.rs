use crate::config::Config;
use crate::error::Result;
use crate::services::badge_renderer::BadgeRenderer;
use crate::services::desktop::Platform;
use crate::services::tick::TickOrchestrator;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{error, info};

/// Polling loop: one engine tick per interval, result handed to the renderer.
pub struct IndicatorService {
    platform: Arc<dyn Platform>,
    renderer: Box<dyn BadgeRenderer + Send>,
    orchestrator: TickOrchestrator,
    tick_interval: Duration,
    shutdown: watch::Receiver<bool>,
}

impl IndicatorService {
    pub fn new(
        config: &Config,
        platform: Arc<dyn Platform>,
        renderer: Box<dyn BadgeRenderer + Send>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        info!("Инициализация IndicatorService");
        Self {
            platform,
            renderer,
            orchestrator: TickOrchestrator::new(config),
            tick_interval: config.tick_interval(),
            shutdown,
        }
    }

    pub async fn run(mut self) -> Result<()> {
        info!("Опрос состояния IME каждые {}мс", self.tick_interval.as_millis());

        let mut interval = interval(self.tick_interval);
        // Медленный тик (задержка после смены окна) не должен вызывать серию догоняющих
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let platform = Arc::clone(&self.platform);
                    let orchestrator = &mut self.orchestrator;
                    // Тик синхронный и может намеренно подождать settle_delay
                    let command = tokio::task::block_in_place(|| orchestrator.tick(&*platform));

                    if let Err(e) = self.renderer.render(&command) {
                        error!("Не удалось отрисовать значок: {}", e);
                    }
                }
                changed = self.shutdown.changed() => {
                    if changed.is_err() || *self.shutdown.borrow() {
                        info!("IndicatorService получил сигнал остановки");
                        break;
                    }
                }
            }
        }

        self.renderer.hide()
    }
}

impl Drop for IndicatorService {
    fn drop(&mut self) {
        info!("IndicatorService завершает работу");
    }
}
