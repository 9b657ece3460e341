pub mod anchor_resolver;
pub mod badge_renderer;
pub mod desktop;
pub mod focus_locator;
pub mod indicator_service;
pub mod mode_resolver;
pub mod monitor_clamp;
pub mod tick;

pub use badge_renderer::create_badge_renderer;
pub use desktop::create_platform;
pub use indicator_service::IndicatorService;
