mod log_renderer;
mod r#trait;

pub use self::r#trait::{create_badge_renderer, BadgeRenderer};
