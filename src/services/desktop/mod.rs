//! Desktop platform boundary: responsibility and boundaries
//!
//! This module and its submodules only translate host queries (foreground window,
//! caret, pointer, keyboard layout, monitors, IME contexts) into `Option` values.
//! They MUST NOT decide anything about the badge: mode fusion, anchor priority
//! and clamping live in the engine services.

mod context;
mod dry_run;
mod scripted;
mod r#trait;
#[cfg(windows)]
mod win32;

pub use self::context::ContextGuard;
pub use self::r#trait::{create_platform, DesktopApi, ImeApi, Platform};
#[allow(unused_imports)]
pub use self::scripted::{DesktopScene, ScriptStats, ScriptedDesktop};
