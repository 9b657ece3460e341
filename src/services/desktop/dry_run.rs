use super::scripted::{DesktopScene, ScriptedDesktop};
use crate::events::{KeyboardLayout, Point, Rect, ThreadId, WindowHandle};
use tracing::info;

/// Сколько тиков держится одна сцена (около 5 секунд при 80 мс)
const TICKS_PER_SCENE: u64 = 60;

const KOREAN_LAYOUT: KeyboardLayout = KeyboardLayout(0x0412_0412);
const ENGLISH_LAYOUT: KeyboardLayout = KeyboardLayout(0x0409_0409);

/// Рабочий стол для dry-run: по кругу эмулирует типичные ситуации
pub fn rotating_demo_desktop() -> ScriptedDesktop {
    info!("Dry-run режим - рабочий стол эмулируется, Win32 API не используется");
    ScriptedDesktop::rotating(demo_scenes(), TICKS_PER_SCENE)
}

fn with_monitors(scene: DesktopScene) -> DesktopScene {
    scene
        .with_monitor(Rect::new(0, 0, 1920, 1080), Rect::new(0, 0, 1920, 1040))
        .with_monitor(Rect::new(1920, 0, 4480, 1440), Rect::new(1920, 0, 4480, 1400))
}

pub fn demo_scenes() -> Vec<DesktopScene> {
    let notepad = WindowHandle(0x1001);
    let notepad_edit = WindowHandle(0x1002);
    let notepad_thread = ThreadId(101);

    let browser = WindowHandle(0x2001);
    let browser_thread = ThreadId(201);

    let terminal = WindowHandle(0x3001);
    let terminal_thread = ThreadId(301);

    let mut editor = with_monitors(DesktopScene::named("Editor - dry_run (каретка, хангыль)"))
        .with_window(notepad, notepad_thread, KOREAN_LAYOUT, Rect::new(200, 150, 1400, 900))
        .with_focus(notepad_thread, notepad_edit)
        .with_caret(notepad_thread, notepad_edit, Rect::new(40, 60, 42, 78))
        .with_context(notepad_edit, Some(0x0001))
        .with_cursor(Point::new(1700, 300))
        .with_toggle(true);
    editor.threads.insert(notepad_edit, notepad_thread);
    editor.client_origins.insert(notepad_edit, Point::new(210, 230));

    let browser = with_monitors(DesktopScene::named("Browser - dry_run (без каретки)"))
        .with_window(browser, browser_thread, KOREAN_LAYOUT, Rect::new(1920, 0, 4480, 1400))
        .with_focus(browser_thread, browser)
        .with_cursor(Point::new(4470, 1390))
        .with_toggle(false);

    let terminal = with_monitors(DesktopScene::named("Terminal - dry_run (английская раскладка)"))
        .with_window(terminal, terminal_thread, ENGLISH_LAYOUT, Rect::new(100, 100, 900, 700))
        .with_cursor(Point::new(1500, 900))
        .with_toggle(true);

    let transition = with_monitors(DesktopScene::named("Desktop switch - dry_run"));

    vec![editor, browser, terminal, transition]
}
