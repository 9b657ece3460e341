use crate::config::BadgeConfig;
use crate::error::Result;
use crate::events::{ModeVerdict, RenderCommand};

/// External renderer of the badge: draws a fixed-size badge at the given
/// point or hides itself.
pub trait BadgeRenderer {
    fn render(&mut self, command: &RenderCommand) -> Result<()>;

    fn hide(&mut self) -> Result<()> {
        self.render(&RenderCommand::hidden())
    }
}

/// Подпись и цвета значка для каждого режима
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BadgeStyle {
    pub size: i32,
    pub native_label: String,
    pub alpha_label: String,
    pub native_fill: String,
    pub alpha_fill: String,
    pub text_color: String,
}

impl BadgeStyle {
    pub fn new(config: &BadgeConfig) -> Self {
        Self {
            size: config.size,
            native_label: config.native_label.clone(),
            alpha_label: config.alpha_label.clone(),
            native_fill: config.native_fill.clone(),
            alpha_fill: config.alpha_fill.clone(),
            text_color: config.text_color.clone(),
        }
    }

    pub fn label(&self, glyph: ModeVerdict) -> &str {
        match glyph {
            ModeVerdict::NativeScript => &self.native_label,
            ModeVerdict::Alphanumeric => &self.alpha_label,
        }
    }

    pub fn fill(&self, glyph: ModeVerdict) -> &str {
        match glyph {
            ModeVerdict::NativeScript => &self.native_fill,
            ModeVerdict::Alphanumeric => &self.alpha_fill,
        }
    }
}

/// Factory function for the renderer. Drawing the overlay window itself is
/// left to the host; the shipped renderer reports what it would draw.
pub fn create_badge_renderer(config: &BadgeConfig) -> Box<dyn BadgeRenderer + Send> {
    Box::new(super::log_renderer::LogRenderer::new(BadgeStyle::new(config)))
}
