use super::geometry::Point;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Вердикт режима IME
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModeVerdict {
    NativeScript,
    Alphanumeric,
}

impl ModeVerdict {
    pub fn from_native(native: bool) -> Self {
        if native {
            Self::NativeScript
        } else {
            Self::Alphanumeric
        }
    }
}

/// Откуда взята точка привязки; определяет дополнительное смещение
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnchorSource {
    Caret,
    Pointer,
    WindowCenterFallback,
    PointerFallback,
}

impl AnchorSource {
    /// Точки от курсора мыши получают дополнительный отступ от значка курсора
    pub fn is_pointer_derived(&self) -> bool {
        matches!(self, Self::Pointer | Self::PointerFallback)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnchorPoint {
    pub point: Point,
    pub source: AnchorSource,
}

impl AnchorPoint {
    pub fn new(point: Point, source: AnchorSource) -> Self {
        Self { point, source }
    }
}

impl fmt::Display for AnchorPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{:?}]", self.point, self.source)
    }
}

/// Команда внешнему отрисовщику значка на один тик
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderCommand {
    pub visible: bool,
    pub position: Point,
    pub glyph: ModeVerdict,
}

impl RenderCommand {
    pub fn show(position: Point, glyph: ModeVerdict) -> Self {
        Self {
            visible: true,
            position,
            glyph,
        }
    }

    pub fn hidden() -> Self {
        Self {
            visible: false,
            position: Point::default(),
            glyph: ModeVerdict::Alphanumeric,
        }
    }
}

impl fmt::Display for RenderCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.visible {
            write!(f, "{:?} @ {}", self.glyph, self.position)
        } else {
            write!(f, "hidden")
        }
    }
}
