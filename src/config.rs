use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Предел для смещений значка и сдвига от центра окна, в пикселях
const MAX_OFFSET: i32 = 10_000;
/// Предел для размера значка и отступа от краёв окна
const MAX_BADGE_EXTENT: i32 = 1_000;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub logging: LoggingConfig,
    pub polling: PollingConfig,
    pub detection: DetectionConfig,
    pub anchor: AnchorConfig,
    pub badge: BadgeConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    /// Дополнительные директивы EnvFilter, например "ime_badge::services::tick=trace"
    pub filter: String,
    /// Как часто писать "пульс" состояния, если значок не менялся
    pub heartbeat_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PollingConfig {
    pub tick_interval_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DetectionConfig {
    /// LANGID целевой раскладки (0x0412 = ko-KR)
    pub native_lang_id: u16,
    /// Виртуальный код клавиши переключения (0x15 = VK_HANGUL)
    pub toggle_vk: i32,
    /// Бит режима в conversion-флагах контекста (IME_CMODE_NATIVE)
    pub native_mode_flag: u32,
    pub switch_cooldown_ticks: u32,
    pub settle_delay_ms: u64,
    pub conflict_policy: ConflictPolicy,
}

/// Какой сигнал побеждает, когда контекст IME и клавиша переключения расходятся
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictPolicy {
    /// Клавиша переключения во время переключения приложений, иначе контекст
    ToggleDuringSwitch,
    PreferContext,
    PreferToggle,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnchorConfig {
    pub center_shift_x: i32,
    pub center_shift_y: i32,
    pub window_margin: i32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BadgeConfig {
    pub size: i32,
    pub offset_x: i32,
    pub offset_y: i32,
    pub pointer_offset_x: i32,
    pub pointer_offset_y: i32,
    pub native_label: String,
    pub alpha_label: String,
    pub native_fill: String,
    pub alpha_fill: String,
    pub text_color: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "compact".to_string(),
                filter: String::new(),
                heartbeat_ms: 1000,
            },
            polling: PollingConfig { tick_interval_ms: 80 },
            detection: DetectionConfig {
                native_lang_id: 0x0412,
                toggle_vk: 0x15,
                native_mode_flag: 0x0001,
                switch_cooldown_ticks: 3,
                settle_delay_ms: 20,
                conflict_policy: ConflictPolicy::ToggleDuringSwitch,
            },
            anchor: AnchorConfig {
                center_shift_x: 100,
                center_shift_y: 50,
                window_margin: 20,
            },
            badge: BadgeConfig {
                size: 22,
                offset_x: 6,
                offset_y: 10,
                pointer_offset_x: 25,
                pointer_offset_y: 25,
                native_label: "K".to_string(),
                alpha_label: "E".to_string(),
                native_fill: "#2196F3".to_string(),
                alpha_fill: "#ff9800".to_string(),
                text_color: "white".to_string(),
            },
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let config_path = config_path.as_ref();

        // Файл необязателен: отсутствующие ключи берутся из значений по умолчанию
        let figment = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_path))
            .merge(Env::prefixed("IME_BADGE_").split("__"));

        let config: Config = figment
            .extract()
            .with_context(|| format!("Не удалось загрузить конфигурацию из {:?}", config_path))?;

        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        // Валидация настроек логирования
        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!("Неверный уровень логирования: {}", self.logging.level),
        }

        match self.logging.format.as_str() {
            "compact" | "full" => {}
            _ => anyhow::bail!("Неверный формат логирования: {}", self.logging.format),
        }

        // Валидация опроса
        if !(10..=1000).contains(&self.polling.tick_interval_ms) {
            anyhow::bail!(
                "tick_interval_ms должно быть от 10 до 1000, получено {}",
                self.polling.tick_interval_ms
            );
        }

        // Задержка стабилизации не должна съедать весь тик
        if self.detection.settle_delay_ms >= self.polling.tick_interval_ms {
            anyhow::bail!(
                "settle_delay_ms ({}) должно быть меньше tick_interval_ms ({})",
                self.detection.settle_delay_ms,
                self.polling.tick_interval_ms
            );
        }

        if self.detection.switch_cooldown_ticks > 20 {
            anyhow::bail!("switch_cooldown_ticks должно быть не больше 20");
        }

        if self.detection.native_mode_flag == 0 {
            anyhow::bail!("native_mode_flag не может быть 0");
        }

        if !(0..=MAX_BADGE_EXTENT).contains(&self.anchor.window_margin) {
            anyhow::bail!(
                "window_margin должно быть от 0 до {}, получено {}",
                MAX_BADGE_EXTENT,
                self.anchor.window_margin
            );
        }

        // Валидация значка
        if !(1..=MAX_BADGE_EXTENT).contains(&self.badge.size) {
            anyhow::bail!(
                "Размер значка должен быть от 1 до {}, получено {}",
                MAX_BADGE_EXTENT,
                self.badge.size
            );
        }

        for (name, value) in [
            ("anchor.center_shift_x", self.anchor.center_shift_x),
            ("anchor.center_shift_y", self.anchor.center_shift_y),
            ("badge.offset_x", self.badge.offset_x),
            ("badge.offset_y", self.badge.offset_y),
            ("badge.pointer_offset_x", self.badge.pointer_offset_x),
            ("badge.pointer_offset_y", self.badge.pointer_offset_y),
        ] {
            if !(-MAX_OFFSET..=MAX_OFFSET).contains(&value) {
                anyhow::bail!("{} должно быть в пределах ±{}, получено {}", name, MAX_OFFSET, value);
            }
        }

        if self.badge.native_label.is_empty() || self.badge.alpha_label.is_empty() {
            anyhow::bail!("Подписи значка не могут быть пустыми");
        }

        for (name, fill) in [
            ("native_fill", &self.badge.native_fill),
            ("alpha_fill", &self.badge.alpha_fill),
        ] {
            if !is_hex_color(fill) {
                anyhow::bail!("Неверный цвет {}: '{}', ожидается #rrggbb", name, fill);
            }
        }

        Ok(())
    }

    /// Директива для EnvFilter: уровень плюс дополнительные фильтры
    pub fn log_directive(&self, level: &str) -> String {
        if self.logging.filter.is_empty() {
            level.to_string()
        } else {
            format!("{},{}", level, self.logging.filter)
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.polling.tick_interval_ms)
    }

    pub fn heartbeat(&self) -> Duration {
        Duration::from_millis(self.logging.heartbeat_ms)
    }
}

fn is_hex_color(value: &str) -> bool {
    value.len() == 7
        && value.starts_with('#')
        && value[1..].chars().all(|c| c.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_default_config_validation() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.tick_interval(), Duration::from_millis(80));
        assert_eq!(config.heartbeat(), Duration::from_secs(1));
    }

    #[test]
    fn test_log_directive() {
        let mut config = Config::default();
        assert_eq!(config.log_directive("debug"), "debug");
        config.logging.filter = "ime_badge::services::tick=trace".to_string();
        assert_eq!(config.log_directive("info"), "info,ime_badge::services::tick=trace");
    }

    #[test]
    fn test_load_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ime-badge.toml");
        fs::write(
            &path,
            r##"
[polling]
tick_interval_ms = 120

[detection]
conflict_policy = "prefer_context"

[badge]
size = 30
native_fill = "#00ff00"
"##,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.polling.tick_interval_ms, 120);
        assert_eq!(config.badge.size, 30);
        assert_eq!(config.badge.native_fill, "#00ff00");
        assert_eq!(config.detection.conflict_policy, ConflictPolicy::PreferContext);
        // Не указанное в файле остаётся по умолчанию
        assert_eq!(config.badge.alpha_label, "E");
        assert_eq!(config.detection.native_lang_id, 0x0412);
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.badge.size, 22);
        assert_eq!(config.detection.switch_cooldown_ticks, 3);
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "[polling]\ntick_interval_ms = 5\n").unwrap();
        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = Config::default();
        config.logging.level = "verbose".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.logging.format = "json".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.detection.settle_delay_ms = 80;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.badge.size = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.badge.alpha_fill = "orange".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.badge.native_label.clear();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.anchor.window_margin = -1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_bounds_offsets_and_sizes() {
        let mut config = Config::default();
        config.badge.pointer_offset_x = i32::MAX;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.anchor.center_shift_y = -10_001;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.badge.size = 1_001;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.anchor.window_margin = 1_001;
        assert!(config.validate().is_err());

        // Границы допустимы
        let mut config = Config::default();
        config.badge.offset_x = -10_000;
        config.badge.pointer_offset_y = 10_000;
        config.badge.size = 1_000;
        config.anchor.window_margin = 1_000;
        assert!(config.validate().is_ok());
    }
}
