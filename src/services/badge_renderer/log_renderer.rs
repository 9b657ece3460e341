use super::r#trait::{BadgeRenderer, BadgeStyle};
use crate::error::Result;
use crate::events::RenderCommand;
use crate::trace_if_enabled;
use tracing::info;

/// Renderer that only reports what it would draw.
pub struct LogRenderer {
    style: BadgeStyle,
    last: Option<RenderCommand>,
}

impl LogRenderer {
    pub fn new(style: BadgeStyle) -> Self {
        info!("Инициализация LogRenderer (значок {}px)", style.size);
        Self { style, last: None }
    }

    #[allow(dead_code)]
    pub fn last(&self) -> Option<RenderCommand> {
        self.last
    }
}

impl BadgeRenderer for LogRenderer {
    fn render(&mut self, command: &RenderCommand) -> Result<()> {
        let previous = self.last.replace(*command);

        let changed = previous.map_or(true, |prev| {
            prev.visible != command.visible || (command.visible && prev.glyph != command.glyph)
        });

        if !changed {
            trace_if_enabled!("Значок: {}", command);
            return Ok(());
        }

        if command.visible {
            info!(
                "Значок '{}' ({}, текст {}) в {}",
                self.style.label(command.glyph),
                self.style.fill(command.glyph),
                self.style.text_color,
                command.position
            );
        } else {
            info!("Значок скрыт");
        }
        Ok(())
    }
}
