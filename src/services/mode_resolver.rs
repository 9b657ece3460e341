use crate::config::{ConflictPolicy, DetectionConfig};
use crate::debug_if_enabled;
use crate::events::{FocusSnapshot, ModeVerdict, ThreadId, WindowHandle};
use crate::services::desktop::{ContextGuard, DesktopApi, ImeApi};
use std::time::Duration;

/// Раскладка потока, владеющего фокусом
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutReading {
    pub thread: Option<ThreadId>,
    pub lang_id: Option<u16>,
    pub is_native: bool,
}

/// Decides NativeScript vs Alphanumeric from the per-context conversion flags
/// and the global toggle key.
#[derive(Debug, Clone)]
pub struct ModeResolver {
    native_lang_id: u16,
    toggle_vk: i32,
    native_mode_flag: u32,
    settle_delay: Duration,
    policy: ConflictPolicy,
}

impl ModeResolver {
    pub fn new(config: &DetectionConfig) -> Self {
        Self {
            native_lang_id: config.native_lang_id,
            toggle_vk: config.toggle_vk,
            native_mode_flag: config.native_mode_flag,
            settle_delay: Duration::from_millis(config.settle_delay_ms),
            policy: config.conflict_policy,
        }
    }

    /// Раскладку читаем у потока окна с фокусом, иначе у окна переднего плана
    pub fn read_layout<D: DesktopApi + ?Sized>(&self, desktop: &D, snapshot: &FocusSnapshot) -> LayoutReading {
        let thread = snapshot
            .focused_window
            .or(snapshot.foreground_window)
            .and_then(|window| desktop.window_thread(window));
        let lang_id = thread
            .and_then(|thread| desktop.keyboard_layout(thread))
            .map(|layout| layout.lang_id());

        LayoutReading {
            thread,
            lang_id,
            is_native: lang_id == Some(self.native_lang_id),
        }
    }

    pub fn toggle_active<D: DesktopApi + ?Sized>(&self, desktop: &D) -> bool {
        desktop.toggle_key_active(self.toggle_vk)
    }

    pub fn resolve<P: DesktopApi + ImeApi + ?Sized>(
        &self,
        platform: &P,
        focused_window: Option<WindowHandle>,
        layout_is_native: bool,
        just_switched: bool,
        retry_budget: u32,
    ) -> ModeVerdict {
        // Чужая раскладка: состояние композиции не имеет смысла
        if !layout_is_native {
            return ModeVerdict::Alphanumeric;
        }

        let Some(window) = focused_window else {
            return ModeVerdict::from_native(self.toggle_active(platform));
        };

        let switching = just_switched || retry_budget > 0;
        if switching {
            // Даём приложению время обновить состояние IME после получения фокуса
            platform.settle(self.settle_delay);
        }

        let toggle = self.toggle_active(platform);
        let per_context = self.per_context_signal(platform, window);
        let native = fuse_signals(self.policy, per_context, toggle, switching);

        debug_if_enabled!(
            "Режим IME: окно={} контекст={:?} toggle={} переключение={} -> {}",
            window,
            per_context,
            toggle,
            switching,
            native
        );

        ModeVerdict::from_native(native)
    }

    /// `None`, если контекста нет, статус не читается или флаги нулевые
    fn per_context_signal<I: ImeApi + ?Sized>(&self, ime: &I, window: WindowHandle) -> Option<bool> {
        let guard = ContextGuard::acquire(ime, window)?;
        let conversion = guard.conversion_mode().filter(|flags| *flags != 0)?;
        Some(conversion & self.native_mode_flag != 0)
    }
}

/// Слияние двух сигналов при конфликте
pub fn fuse_signals(policy: ConflictPolicy, per_context: Option<bool>, toggle: bool, switching: bool) -> bool {
    let Some(context) = per_context else {
        return toggle;
    };
    if context == toggle {
        return context;
    }
    match policy {
        ConflictPolicy::ToggleDuringSwitch if switching => toggle,
        ConflictPolicy::ToggleDuringSwitch | ConflictPolicy::PreferContext => context,
        ConflictPolicy::PreferToggle => toggle,
    }
}
