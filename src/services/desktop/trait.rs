use crate::error::Result;
use crate::events::{GuiThreadState, KeyboardLayout, Point, Rect, ThreadId, WindowHandle};
use std::sync::Arc;
use std::time::Duration;

/// Window-system query surface.
///
/// Every query is best-effort: a failed OS call, a NULL handle or a FALSE
/// return is reported as `None` and never as an error. Callers treat absence
/// as a normal state.
pub trait DesktopApi {
    fn foreground_window(&self) -> Option<WindowHandle>;
    fn window_thread(&self, window: WindowHandle) -> Option<ThreadId>;
    fn gui_thread_state(&self, thread: ThreadId) -> Option<GuiThreadState>;
    fn client_to_screen(&self, window: WindowHandle, point: Point) -> Option<Point>;
    fn keyboard_layout(&self, thread: ThreadId) -> Option<KeyboardLayout>;
    /// Младший ("toggled") бит состояния клавиши
    fn toggle_key_active(&self, virtual_key: i32) -> bool;
    fn cursor_position(&self) -> Option<Point>;
    fn window_rect(&self, window: WindowHandle) -> Option<Rect>;
    /// Рабочая область монитора, ближайшего к точке
    fn monitor_work_area(&self, point: Point) -> Option<Rect>;
    /// Blocks the current tick for `delay`.
    fn settle(&self, delay: Duration);
}

/// Opaque input-context handle (HIMC).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextHandle(pub isize);

/// Input-method query surface. Use [`ContextGuard`](super::ContextGuard)
/// instead of pairing acquire/release by hand.
pub trait ImeApi {
    fn acquire_context(&self, window: WindowHandle) -> Option<ContextHandle>;
    fn conversion_mode(&self, context: ContextHandle) -> Option<u32>;
    fn release_context(&self, window: WindowHandle, context: ContextHandle);
}

/// Everything the engine needs from the host.
pub trait Platform: DesktopApi + ImeApi + Send + Sync {}

impl<T: DesktopApi + ImeApi + Send + Sync> Platform for T {}

/// Factory function to create the platform backend based on the dry_run flag
pub fn create_platform(dry_run: bool) -> Result<Arc<dyn Platform>> {
    if dry_run {
        Ok(Arc::new(super::dry_run::rotating_demo_desktop()))
    } else {
        create_native_platform()
    }
}

#[cfg(windows)]
fn create_native_platform() -> Result<Arc<dyn Platform>> {
    Ok(Arc::new(super::win32::Win32Platform::new()))
}

#[cfg(not(windows))]
fn create_native_platform() -> Result<Arc<dyn Platform>> {
    crate::error::IndicatorError::service_unavailable(
        "Win32 API доступен только в Windows, используйте --dry-run",
    )
}
