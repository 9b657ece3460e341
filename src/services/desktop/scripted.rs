use super::r#trait::{ContextHandle, DesktopApi, ImeApi};
use crate::events::{GuiThreadState, KeyboardLayout, Point, Rect, ThreadId, WindowHandle};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;
use tracing::info;

/// Монитор сценарного рабочего стола
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptedMonitor {
    pub bounds: Rect,
    pub work_area: Rect,
}

/// Полное состояние эмулируемого рабочего стола.
/// Отсутствие ключа в таблице означает отказ соответствующего запроса.
#[derive(Debug, Clone, Default)]
pub struct DesktopScene {
    pub name: String,
    pub foreground: Option<WindowHandle>,
    pub threads: HashMap<WindowHandle, ThreadId>,
    pub gui: HashMap<ThreadId, GuiThreadState>,
    /// Начало клиентской области окна на экране
    pub client_origins: HashMap<WindowHandle, Point>,
    pub layouts: HashMap<ThreadId, KeyboardLayout>,
    pub toggle_active: bool,
    pub cursor: Option<Point>,
    pub window_rects: HashMap<WindowHandle, Rect>,
    pub monitors: Vec<ScriptedMonitor>,
    /// Окно -> результат чтения conversion-флагов (None = вызов не удался)
    pub contexts: HashMap<WindowHandle, Option<u32>>,
}

impl DesktopScene {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Окно переднего плана со своим потоком, раскладкой и прямоугольником
    pub fn with_window(mut self, window: WindowHandle, thread: ThreadId, layout: KeyboardLayout, rect: Rect) -> Self {
        self.foreground = Some(window);
        self.threads.insert(window, thread);
        self.layouts.insert(thread, layout);
        self.window_rects.insert(window, rect);
        self.client_origins.insert(window, Point::new(rect.left, rect.top));
        self.gui.entry(thread).or_default();
        self
    }

    pub fn with_focus(mut self, thread: ThreadId, focus: WindowHandle) -> Self {
        self.gui.entry(thread).or_default().focus = Some(focus);
        self
    }

    pub fn with_caret(mut self, thread: ThreadId, owner: WindowHandle, caret_rect: Rect) -> Self {
        let state = self.gui.entry(thread).or_default();
        state.caret = Some(owner);
        state.caret_rect = caret_rect;
        self
    }

    pub fn with_monitor(mut self, bounds: Rect, work_area: Rect) -> Self {
        self.monitors.push(ScriptedMonitor { bounds, work_area });
        self
    }

    pub fn with_context(mut self, window: WindowHandle, conversion: Option<u32>) -> Self {
        self.contexts.insert(window, conversion);
        self
    }

    pub fn with_cursor(mut self, cursor: Point) -> Self {
        self.cursor = Some(cursor);
        self
    }

    pub fn with_toggle(mut self, active: bool) -> Self {
        self.toggle_active = active;
        self
    }

    fn nearest_monitor(&self, point: Point) -> Option<&ScriptedMonitor> {
        self.monitors
            .iter()
            .min_by_key(|monitor| squared_distance(monitor.bounds, point))
    }
}

fn squared_distance(rect: Rect, point: Point) -> i64 {
    let axis = |value: i32, low: i32, high: i32| -> i64 {
        let (value, low, high) = (i64::from(value), i64::from(low), i64::from(high));
        if value < low {
            low - value
        } else if value >= high {
            value - high + 1
        } else {
            0
        }
    };
    let dx = axis(point.x, rect.left, rect.right);
    let dy = axis(point.y, rect.top, rect.bottom);
    dx.saturating_mul(dx).saturating_add(dy.saturating_mul(dy))
}

/// Счётчики вызовов, по которым тесты проверяют побочные эффекты движка
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptStats {
    pub acquired: u32,
    pub released: u32,
    pub settles: Vec<Duration>,
    pub foreground_queries: u64,
}

impl ScriptStats {
    #[allow(dead_code)]
    pub fn open_contexts(&self) -> i64 {
        i64::from(self.acquired) - i64::from(self.released)
    }
}

/// In-memory desktop used by dry-run mode and by tests.
///
/// With more than one scene it switches to the next scene every
/// `ticks_per_scene` foreground-window queries (one query per engine tick).
pub struct ScriptedDesktop {
    scenes: Mutex<Vec<DesktopScene>>,
    current: Mutex<usize>,
    ticks_per_scene: u64,
    stats: Mutex<ScriptStats>,
    /// Реально ли спать в settle (dry-run) или только записывать вызов (тесты)
    real_sleep: bool,
}

impl ScriptedDesktop {
    pub fn new(scene: DesktopScene) -> Self {
        Self {
            scenes: Mutex::new(vec![scene]),
            current: Mutex::new(0),
            ticks_per_scene: u64::MAX,
            stats: Mutex::new(ScriptStats::default()),
            real_sleep: false,
        }
    }

    pub fn rotating(mut scenes: Vec<DesktopScene>, ticks_per_scene: u64) -> Self {
        if scenes.is_empty() {
            scenes.push(DesktopScene::named("empty"));
        }
        Self {
            scenes: Mutex::new(scenes),
            current: Mutex::new(0),
            ticks_per_scene: ticks_per_scene.max(1),
            stats: Mutex::new(ScriptStats::default()),
            real_sleep: true,
        }
    }

    /// Изменить текущую сцену (например, эмулировать переключение окна)
    #[allow(dead_code)]
    pub fn update<F: FnOnce(&mut DesktopScene)>(&self, change: F) {
        let index = *self.current.lock();
        if let Some(scene) = self.scenes.lock().get_mut(index) {
            change(scene);
        }
    }

    #[allow(dead_code)]
    pub fn replace(&self, scene: DesktopScene) {
        self.update(|current| *current = scene);
    }

    #[allow(dead_code)]
    pub fn stats(&self) -> ScriptStats {
        self.stats.lock().clone()
    }

    fn with_scene<T>(&self, read: impl FnOnce(&DesktopScene) -> T) -> T {
        let index = *self.current.lock();
        let scenes = self.scenes.lock();
        read(&scenes[index.min(scenes.len() - 1)])
    }

    fn advance_scene(&self) {
        let queries = {
            let mut stats = self.stats.lock();
            stats.foreground_queries += 1;
            stats.foreground_queries
        };

        if queries % self.ticks_per_scene != 0 {
            return;
        }

        let scenes = self.scenes.lock();
        if scenes.len() < 2 {
            return;
        }
        let mut current = self.current.lock();
        *current = (*current + 1) % scenes.len();
        info!("Dry-run: эмулируем сцену '{}'", scenes[*current].name);
    }
}

impl DesktopApi for ScriptedDesktop {
    fn foreground_window(&self) -> Option<WindowHandle> {
        self.advance_scene();
        self.with_scene(|scene| scene.foreground)
    }

    fn window_thread(&self, window: WindowHandle) -> Option<ThreadId> {
        self.with_scene(|scene| scene.threads.get(&window).copied())
    }

    fn gui_thread_state(&self, thread: ThreadId) -> Option<GuiThreadState> {
        self.with_scene(|scene| scene.gui.get(&thread).copied())
    }

    fn client_to_screen(&self, window: WindowHandle, point: Point) -> Option<Point> {
        self.with_scene(|scene| {
            scene
                .client_origins
                .get(&window)
                .map(|origin| point.offset(origin.x, origin.y))
        })
    }

    fn keyboard_layout(&self, thread: ThreadId) -> Option<KeyboardLayout> {
        self.with_scene(|scene| scene.layouts.get(&thread).copied())
    }

    fn toggle_key_active(&self, _virtual_key: i32) -> bool {
        self.with_scene(|scene| scene.toggle_active)
    }

    fn cursor_position(&self) -> Option<Point> {
        self.with_scene(|scene| scene.cursor)
    }

    fn window_rect(&self, window: WindowHandle) -> Option<Rect> {
        self.with_scene(|scene| scene.window_rects.get(&window).copied())
    }

    fn monitor_work_area(&self, point: Point) -> Option<Rect> {
        self.with_scene(|scene| scene.nearest_monitor(point).map(|m| m.work_area))
    }

    fn settle(&self, delay: Duration) {
        self.stats.lock().settles.push(delay);
        if self.real_sleep {
            std::thread::sleep(delay);
        }
    }
}

impl ImeApi for ScriptedDesktop {
    fn acquire_context(&self, window: WindowHandle) -> Option<ContextHandle> {
        let present = self.with_scene(|scene| scene.contexts.contains_key(&window));
        if !present {
            return None;
        }
        self.stats.lock().acquired += 1;
        Some(ContextHandle(window.0))
    }

    fn conversion_mode(&self, context: ContextHandle) -> Option<u32> {
        self.with_scene(|scene| {
            scene
                .contexts
                .get(&WindowHandle(context.0))
                .copied()
                .flatten()
        })
    }

    fn release_context(&self, _window: WindowHandle, _context: ContextHandle) {
        self.stats.lock().released += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_monitors() -> DesktopScene {
        DesktopScene::named("two monitors")
            .with_monitor(Rect::new(-1920, 0, 0, 1080), Rect::new(-1920, 0, 0, 1040))
            .with_monitor(Rect::new(0, 0, 2560, 1440), Rect::new(0, 0, 2560, 1400))
    }

    #[test]
    fn test_nearest_monitor_by_point() {
        let desktop = ScriptedDesktop::new(two_monitors());
        assert_eq!(
            desktop.monitor_work_area(Point::new(-10, 100)),
            Some(Rect::new(-1920, 0, 0, 1040))
        );
        assert_eq!(
            desktop.monitor_work_area(Point::new(200, 100)),
            Some(Rect::new(0, 0, 2560, 1400))
        );
        // За пределами обоих мониторов: ближе правый
        assert_eq!(
            desktop.monitor_work_area(Point::new(3000, 2000)),
            Some(Rect::new(0, 0, 2560, 1400))
        );
    }

    #[test]
    fn test_missing_entries_are_absent() {
        let desktop = ScriptedDesktop::new(DesktopScene::default());
        assert!(desktop.foreground_window().is_none());
        assert!(desktop.window_thread(WindowHandle(1)).is_none());
        assert!(desktop.monitor_work_area(Point::new(0, 0)).is_none());
        assert!(desktop.cursor_position().is_none());
        assert!(!desktop.toggle_key_active(0x15));
    }

    #[test]
    fn test_client_to_screen_uses_origin() {
        let window = WindowHandle(3);
        let scene = DesktopScene::named("editor").with_window(
            window,
            ThreadId(30),
            KeyboardLayout(0x0412_0412),
            Rect::new(100, 200, 900, 800),
        );
        let desktop = ScriptedDesktop::new(scene);
        assert_eq!(
            desktop.client_to_screen(window, Point::new(10, 20)),
            Some(Point::new(110, 220))
        );
    }

    #[test]
    fn test_rotation_follows_foreground_queries() {
        let a = DesktopScene {
            foreground: Some(WindowHandle(1)),
            ..DesktopScene::named("a")
        };
        let b = DesktopScene {
            foreground: Some(WindowHandle(2)),
            ..DesktopScene::named("b")
        };
        let desktop = ScriptedDesktop::rotating(vec![a, b], 2);

        assert_eq!(desktop.foreground_window(), Some(WindowHandle(1)));
        assert_eq!(desktop.foreground_window(), Some(WindowHandle(2)));
        assert_eq!(desktop.foreground_window(), Some(WindowHandle(2)));
        assert_eq!(desktop.foreground_window(), Some(WindowHandle(1)));
    }
}
