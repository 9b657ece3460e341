pub mod badge;
pub mod focus;
pub mod geometry;

pub use badge::{AnchorPoint, AnchorSource, ModeVerdict, RenderCommand};
pub use focus::{CaretInfo, FocusSnapshot, GuiThreadState, KeyboardLayout, ThreadId, WindowHandle};
pub use geometry::{Point, Rect};
