use crate::events::{CaretInfo, FocusSnapshot};
use crate::services::desktop::DesktopApi;
use crate::trace_if_enabled;

/// Finds the foreground window, its thread, the focused window and the caret.
///
/// Any failed query leaves the corresponding field empty; a missing foreground
/// window yields an empty snapshot.
#[derive(Debug, Default, Clone, Copy)]
pub struct FocusLocator;

impl FocusLocator {
    pub fn new() -> Self {
        Self
    }

    pub fn locate<D: DesktopApi + ?Sized>(&self, desktop: &D) -> FocusSnapshot {
        let Some(foreground) = desktop.foreground_window() else {
            trace_if_enabled!("Нет окна переднего плана");
            return FocusSnapshot::empty();
        };

        let thread = desktop.window_thread(foreground);
        let gui = thread.and_then(|thread| desktop.gui_thread_state(thread));

        // Каретка есть только у нативных текстовых контролов
        let caret = gui.and_then(|gui| {
            let owner = gui.caret?;
            let screen_point = desktop.client_to_screen(owner, gui.caret_rect.bottom_left())?;
            Some(CaretInfo {
                owner_window: owner,
                rect: gui.caret_rect,
                screen_point,
            })
        });

        if let Some(caret) = caret {
            trace_if_enabled!(
                "Каретка {} в окне {} -> {}",
                caret.rect,
                caret.owner_window,
                caret.screen_point
            );
        }

        FocusSnapshot {
            foreground_window: Some(foreground),
            foreground_thread: thread,
            focused_window: gui.and_then(|gui| gui.focus),
            caret,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{KeyboardLayout, Point, Rect, ThreadId, WindowHandle};
    use crate::services::desktop::{DesktopScene, ScriptedDesktop};

    const WINDOW: WindowHandle = WindowHandle(0x10);
    const EDIT: WindowHandle = WindowHandle(0x11);
    const THREAD: ThreadId = ThreadId(42);

    fn editor_scene() -> DesktopScene {
        DesktopScene::named("editor").with_window(
            WINDOW,
            THREAD,
            KeyboardLayout(0x0412_0412),
            Rect::new(100, 100, 900, 700),
        )
    }

    #[test]
    fn test_no_foreground_gives_empty_snapshot() {
        let desktop = ScriptedDesktop::new(DesktopScene::default());
        assert_eq!(FocusLocator::new().locate(&desktop), FocusSnapshot::empty());
    }

    #[test]
    fn test_caret_is_converted_to_screen() {
        let mut scene = editor_scene()
            .with_focus(THREAD, EDIT)
            .with_caret(THREAD, EDIT, Rect::new(30, 40, 32, 58));
        scene.client_origins.insert(EDIT, Point::new(120, 150));
        let desktop = ScriptedDesktop::new(scene);

        let snapshot = FocusLocator::new().locate(&desktop);
        assert_eq!(snapshot.foreground_window, Some(WINDOW));
        assert_eq!(snapshot.foreground_thread, Some(THREAD));
        assert_eq!(snapshot.focused_window, Some(EDIT));

        let caret = snapshot.caret.unwrap();
        assert_eq!(caret.owner_window, EDIT);
        // Нижний левый угол каретки
        assert_eq!(caret.screen_point, Point::new(150, 208));
    }

    #[test]
    fn test_focus_without_caret_is_propagated() {
        let desktop = ScriptedDesktop::new(editor_scene().with_focus(THREAD, WINDOW));
        let snapshot = FocusLocator::new().locate(&desktop);
        assert_eq!(snapshot.focused_window, Some(WINDOW));
        assert!(snapshot.caret.is_none());
    }

    #[test]
    fn test_failed_client_to_screen_drops_caret() {
        // У окна каретки нет начала клиентской области -> ClientToScreen не удался
        let scene = editor_scene()
            .with_focus(THREAD, EDIT)
            .with_caret(THREAD, EDIT, Rect::new(1, 2, 3, 4));
        let desktop = ScriptedDesktop::new(scene);
        let snapshot = FocusLocator::new().locate(&desktop);
        assert!(snapshot.caret.is_none());
        assert_eq!(snapshot.focused_window, Some(EDIT));
    }

    #[test]
    fn test_failed_thread_lookup_keeps_only_foreground() {
        let mut scene = editor_scene();
        scene.threads.clear();
        let desktop = ScriptedDesktop::new(scene);
        let snapshot = FocusLocator::new().locate(&desktop);
        assert_eq!(snapshot.foreground_window, Some(WINDOW));
        assert!(snapshot.foreground_thread.is_none());
        assert!(snapshot.focused_window.is_none());
        assert!(snapshot.caret.is_none());
    }
}
