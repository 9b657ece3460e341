use super::geometry::{Point, Rect};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Непрозрачный идентификатор окна (HWND). Только ключ для запросов к ОС
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WindowHandle(pub isize);

impl fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:x}", self.0)
    }
}

/// Идентификатор потока, владеющего очередью сообщений окна
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ThreadId(pub u32);

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Раскладка клавиатуры потока (HKL); язык лежит в младших 16 битах
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyboardLayout(pub usize);

impl KeyboardLayout {
    pub fn lang_id(&self) -> u16 {
        (self.0 & 0xFFFF) as u16
    }
}

/// Состояние GUI-потока в том виде, в каком его отдаёт ОС
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GuiThreadState {
    pub focus: Option<WindowHandle>,
    pub caret: Option<WindowHandle>,
    /// Прямоугольник каретки в клиентских координатах окна `caret`
    pub caret_rect: Rect,
}

/// Каретка, уже переведённая в экранные координаты
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaretInfo {
    pub owner_window: WindowHandle,
    /// Прямоугольник в клиентских координатах владельца
    pub rect: Rect,
    /// Нижний левый угол каретки на экране
    pub screen_point: Point,
}

/// Результат поиска фокуса ввода за один тик
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FocusSnapshot {
    pub foreground_window: Option<WindowHandle>,
    pub foreground_thread: Option<ThreadId>,
    pub focused_window: Option<WindowHandle>,
    pub caret: Option<CaretInfo>,
}

impl FocusSnapshot {
    /// Снимок без окна переднего плана (например, при смене рабочего стола)
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn has_foreground(&self) -> bool {
        self.foreground_window.is_some()
    }
}

impl fmt::Display for FocusSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |h: Option<WindowHandle>| h.map(|h| h.to_string()).unwrap_or_else(|| "-".to_string());
        write!(
            f,
            "fg={} thread={} focus={} caret={}",
            show(self.foreground_window),
            self.foreground_thread
                .map(|t| t.to_string())
                .unwrap_or_else(|| "-".to_string()),
            show(self.focused_window),
            self.caret
                .map(|c| c.screen_point.to_string())
                .unwrap_or_else(|| "-".to_string())
        )
    }
}
