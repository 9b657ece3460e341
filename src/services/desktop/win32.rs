//! Win32 backend: user32 window/caret/monitor queries and IMM32 input contexts.

use super::r#trait::{ContextHandle, DesktopApi, ImeApi};
use crate::events::{GuiThreadState, KeyboardLayout, Point, Rect, ThreadId, WindowHandle};
use std::ffi::c_void;
use std::mem;
use std::time::Duration;
use tracing::info;
use windows::Win32::Foundation::{HWND, POINT, RECT};
use windows::Win32::Globalization::HIMC;
use windows::Win32::Graphics::Gdi::{
    ClientToScreen, GetMonitorInfoW, MonitorFromPoint, MONITORINFO, MONITOR_DEFAULTTONEAREST,
};
use windows::Win32::UI::Input::Ime::{
    ImmGetContext, ImmGetConversionStatus, ImmReleaseContext, IME_CONVERSION_MODE, IME_SENTENCE_MODE,
};
use windows::Win32::UI::Input::KeyboardAndMouse::{GetKeyState, GetKeyboardLayout};
use windows::Win32::UI::WindowsAndMessaging::{
    GetCursorPos, GetForegroundWindow, GetGUIThreadInfo, GetWindowRect, GetWindowThreadProcessId,
    GUITHREADINFO,
};

pub struct Win32Platform;

impl Win32Platform {
    pub fn new() -> Self {
        info!("Инициализация Win32Platform");
        Self
    }
}

fn hwnd(window: WindowHandle) -> HWND {
    HWND(window.0 as *mut c_void)
}

fn handle(hwnd: HWND) -> Option<WindowHandle> {
    if hwnd.0.is_null() {
        None
    } else {
        Some(WindowHandle(hwnd.0 as isize))
    }
}

fn rect(rc: RECT) -> Rect {
    Rect::new(rc.left, rc.top, rc.right, rc.bottom)
}

impl DesktopApi for Win32Platform {
    fn foreground_window(&self) -> Option<WindowHandle> {
        handle(unsafe { GetForegroundWindow() })
    }

    fn window_thread(&self, window: WindowHandle) -> Option<ThreadId> {
        let thread = unsafe { GetWindowThreadProcessId(hwnd(window), None) };
        (thread != 0).then_some(ThreadId(thread))
    }

    fn gui_thread_state(&self, thread: ThreadId) -> Option<GuiThreadState> {
        let mut info = GUITHREADINFO {
            cbSize: mem::size_of::<GUITHREADINFO>() as u32,
            ..Default::default()
        };
        unsafe { GetGUIThreadInfo(thread.0, &mut info) }.ok()?;

        Some(GuiThreadState {
            focus: handle(info.hwndFocus),
            caret: handle(info.hwndCaret),
            caret_rect: rect(info.rcCaret),
        })
    }

    fn client_to_screen(&self, window: WindowHandle, point: Point) -> Option<Point> {
        let mut pt = POINT { x: point.x, y: point.y };
        unsafe { ClientToScreen(hwnd(window), &mut pt) }
            .as_bool()
            .then_some(Point::new(pt.x, pt.y))
    }

    fn keyboard_layout(&self, thread: ThreadId) -> Option<KeyboardLayout> {
        let hkl = unsafe { GetKeyboardLayout(thread.0) };
        (!hkl.0.is_null()).then_some(KeyboardLayout(hkl.0 as usize))
    }

    fn toggle_key_active(&self, virtual_key: i32) -> bool {
        unsafe { GetKeyState(virtual_key) } & 1 != 0
    }

    fn cursor_position(&self) -> Option<Point> {
        let mut pt = POINT::default();
        unsafe { GetCursorPos(&mut pt) }.ok()?;
        Some(Point::new(pt.x, pt.y))
    }

    fn window_rect(&self, window: WindowHandle) -> Option<Rect> {
        let mut rc = RECT::default();
        unsafe { GetWindowRect(hwnd(window), &mut rc) }.ok()?;
        Some(rect(rc))
    }

    fn monitor_work_area(&self, point: Point) -> Option<Rect> {
        let monitor = unsafe { MonitorFromPoint(POINT { x: point.x, y: point.y }, MONITOR_DEFAULTTONEAREST) };
        if monitor.0.is_null() {
            return None;
        }
        let mut info = MONITORINFO {
            cbSize: mem::size_of::<MONITORINFO>() as u32,
            ..Default::default()
        };
        unsafe { GetMonitorInfoW(monitor, &mut info) }
            .as_bool()
            .then_some(rect(info.rcWork))
    }

    fn settle(&self, delay: Duration) {
        std::thread::sleep(delay);
    }
}

impl ImeApi for Win32Platform {
    fn acquire_context(&self, window: WindowHandle) -> Option<ContextHandle> {
        let himc = unsafe { ImmGetContext(hwnd(window)) };
        (!himc.0.is_null()).then_some(ContextHandle(himc.0 as isize))
    }

    fn conversion_mode(&self, context: ContextHandle) -> Option<u32> {
        let mut conversion = IME_CONVERSION_MODE::default();
        let mut sentence = IME_SENTENCE_MODE::default();
        unsafe {
            ImmGetConversionStatus(
                HIMC(context.0 as *mut c_void),
                Some(&mut conversion as *mut _),
                Some(&mut sentence as *mut _),
            )
        }
        .as_bool()
        .then_some(conversion.0)
    }

    fn release_context(&self, window: WindowHandle, context: ContextHandle) {
        let _ = unsafe { ImmReleaseContext(hwnd(window), HIMC(context.0 as *mut c_void)) };
    }
}
