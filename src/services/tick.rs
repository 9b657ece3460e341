use crate::config::{BadgeConfig, Config};
use crate::events::{AnchorPoint, FocusSnapshot, ModeVerdict, Point, RenderCommand, WindowHandle};
use crate::{debug_if_enabled, trace_if_enabled};
use crate::services::anchor_resolver::AnchorResolver;
use crate::services::desktop::Platform;
use crate::services::focus_locator::FocusLocator;
use crate::services::mode_resolver::{LayoutReading, ModeResolver};
use crate::services::monitor_clamp::MonitorClamp;
use std::time::{Duration, Instant};
use tracing::info;

/// The only state that survives between ticks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SwitchState {
    pub last_foreground: Option<WindowHandle>,
    pub cooldown_ticks: u32,
}

/// Параметры переключения для Mode Resolver на текущий тик
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SwitchSignal {
    pub just_switched: bool,
    pub retry_budget: u32,
}

impl SwitchState {
    /// Переход на один тик. Первое увиденное окно (в том числе после тика без окна)
    /// переключением не считается.
    pub fn advance(self, foreground: Option<WindowHandle>, cooldown: u32) -> (Self, SwitchSignal) {
        let Some(window) = foreground else {
            let next = Self {
                last_foreground: None,
                ..self
            };
            return (next, SwitchSignal::default());
        };

        let switched = self.last_foreground.is_some_and(|last| last != window);
        let cooldown_ticks = if switched {
            cooldown
        } else {
            self.cooldown_ticks.saturating_sub(1)
        };

        let next = Self {
            last_foreground: Some(window),
            cooldown_ticks,
        };
        let signal = SwitchSignal {
            just_switched: switched,
            retry_budget: cooldown_ticks,
        };
        (next, signal)
    }
}

/// Ограничитель диагностических логов: событие при смене значка, иначе редкий пульс
#[derive(Debug)]
struct TickLog {
    last_glyph: Option<ModeVerdict>,
    last_heartbeat: Option<Instant>,
    heartbeat: Duration,
    switches: u64,
}

impl TickLog {
    fn new(heartbeat: Duration) -> Self {
        Self {
            last_glyph: None,
            last_heartbeat: None,
            heartbeat,
            switches: 0,
        }
    }

    /// Тик без позиции значка: смену приложения всё равно нужно залогировать
    fn record_hidden(&mut self, snapshot: &FocusSnapshot, switched: bool) {
        if switched {
            info!("Значок скрыт: позиция не определена ({}) [смена приложения]", snapshot);
            self.switches += 1;
            // Следующий видимый значок снова попадёт в info
            self.last_glyph = None;
        } else {
            debug_if_enabled!("Не удалось определить позицию значка: {}", snapshot);
        }
    }

    fn record(&mut self, layout: &LayoutReading, toggle: bool, glyph: ModeVerdict, switched: bool) {
        let lang = layout
            .lang_id
            .map(|id| format!("0x{:04x}", id))
            .unwrap_or_else(|| "-".to_string());
        let thread = layout
            .thread
            .map(|t| t.to_string())
            .unwrap_or_else(|| "-".to_string());

        if self.last_glyph != Some(glyph) || switched {
            let marker = if switched { " [смена приложения]" } else { "" };
            if switched {
                self.switches += 1;
            }
            info!(
                "Поток раскладки={} langid={} toggle={} -> значок={:?}{}",
                thread, lang, toggle, glyph, marker
            );
            self.last_glyph = Some(glyph);
            return;
        }

        let now = Instant::now();
        let due = self
            .last_heartbeat
            .map_or(true, |last| now.duration_since(last) >= self.heartbeat);
        if due {
            debug_if_enabled!("langid={} toggle={} значок={:?}", lang, toggle, glyph);
            self.last_heartbeat = Some(now);
        }
    }
}

/// Runs one detection pass per polling interval:
/// Focus Locator, then Mode and Anchor resolvers, then Monitor Clamp.
pub struct TickOrchestrator {
    locator: FocusLocator,
    mode: ModeResolver,
    anchor: AnchorResolver,
    clamp: MonitorClamp,
    offsets: BadgeOffsets,
    cooldown: u32,
    state: SwitchState,
    log: TickLog,
}

#[derive(Debug, Clone, Copy)]
struct BadgeOffsets {
    rest: (i32, i32),
    pointer: (i32, i32),
}

impl BadgeOffsets {
    fn new(badge: &BadgeConfig) -> Self {
        Self {
            rest: (badge.offset_x, badge.offset_y),
            pointer: (badge.pointer_offset_x, badge.pointer_offset_y),
        }
    }

    /// Всем точкам небольшой отступ; точкам от курсора ещё и отступ от его значка
    fn apply(&self, anchor: AnchorPoint) -> Point {
        let point = anchor.point.offset(self.rest.0, self.rest.1);
        if anchor.source.is_pointer_derived() {
            point.offset(self.pointer.0, self.pointer.1)
        } else {
            point
        }
    }
}

impl TickOrchestrator {
    pub fn new(config: &Config) -> Self {
        Self {
            locator: FocusLocator::new(),
            mode: ModeResolver::new(&config.detection),
            anchor: AnchorResolver::new(&config.anchor, &config.badge),
            clamp: MonitorClamp::new(config.badge.size),
            offsets: BadgeOffsets::new(&config.badge),
            cooldown: config.detection.switch_cooldown_ticks,
            state: SwitchState::default(),
            log: TickLog::new(config.heartbeat()),
        }
    }

    pub fn switch_state(&self) -> SwitchState {
        self.state
    }

    pub fn tick<P: Platform + ?Sized>(&mut self, platform: &P) -> RenderCommand {
        let snapshot = self.locator.locate(platform);
        let (state, signal) = self.state.advance(snapshot.foreground_window, self.cooldown);
        self.state = state;

        if !snapshot.has_foreground() {
            return RenderCommand::hidden();
        }

        let Some(anchor) = self.anchor.resolve(platform, &snapshot) else {
            self.log.record_hidden(&snapshot, signal.just_switched);
            return RenderCommand::hidden();
        };
        trace_if_enabled!("Точка привязки {}", anchor);

        let layout = self.mode.read_layout(platform, &snapshot);
        let glyph = self.mode.resolve(
            platform,
            snapshot.focused_window,
            layout.is_native,
            signal.just_switched,
            signal.retry_budget,
        );

        let toggle = self.mode.toggle_active(platform);
        self.log.record(&layout, toggle, glyph, signal.just_switched);

        let position = self.clamp.clamp(platform, self.offsets.apply(anchor));
        RenderCommand::show(position, glyph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{KeyboardLayout, Rect, ThreadId};
    use crate::services::desktop::{DesktopScene, ScriptedDesktop};

    const A: WindowHandle = WindowHandle(0xA);
    const B: WindowHandle = WindowHandle(0xB);
    const KOREAN: KeyboardLayout = KeyboardLayout(0x0412_0412);
    const ENGLISH: KeyboardLayout = KeyboardLayout(0x0409_0409);

    fn app(window: WindowHandle, layout: KeyboardLayout) -> DesktopScene {
        let thread = ThreadId(window.0 as u32);
        DesktopScene::named("app")
            .with_monitor(Rect::new(0, 0, 1920, 1080), Rect::new(0, 0, 1920, 1040))
            .with_window(window, thread, layout, Rect::new(0, 0, 1000, 1000))
            .with_focus(thread, window)
    }

    #[test]
    fn test_switch_state_cooldown_sequence() {
        let mut state = SwitchState::default();
        let mut signals = Vec::new();
        for window in [A, A, B, B, B, B, B] {
            let (next, signal) = state.advance(Some(window), 3);
            state = next;
            signals.push((signal.just_switched, signal.retry_budget));
        }
        assert_eq!(
            signals,
            vec![(false, 0), (false, 0), (true, 3), (false, 2), (false, 1), (false, 0), (false, 0)]
        );
    }

    #[test]
    fn test_switch_during_cooldown_restarts_it() {
        let (state, _) = SwitchState::default().advance(Some(A), 3);
        let (state, _) = state.advance(Some(B), 3);
        let (state, _) = state.advance(Some(B), 3);
        let (state, signal) = state.advance(Some(A), 3);
        assert!(signal.just_switched);
        assert_eq!(signal.retry_budget, 3);
        assert_eq!(state.cooldown_ticks, 3);
    }

    #[test]
    fn test_window_after_transition_is_not_a_switch() {
        let (state, _) = SwitchState::default().advance(Some(A), 3);
        let (state, signal) = state.advance(None, 3);
        assert_eq!(signal, SwitchSignal::default());
        assert_eq!(state.last_foreground, None);
        let (_, signal) = state.advance(Some(B), 3);
        assert!(!signal.just_switched);
    }

    #[test]
    fn test_no_foreground_hides_badge() {
        let desktop = ScriptedDesktop::new(DesktopScene::default());
        let mut orchestrator = TickOrchestrator::new(&Config::default());
        assert_eq!(orchestrator.tick(&desktop), RenderCommand::hidden());
        assert!(!orchestrator.tick(&desktop).visible);
    }

    #[test]
    fn test_caret_anchor_gets_rest_offset_only() {
        let thread = ThreadId(0xA);
        let scene = app(A, KOREAN)
            .with_caret(thread, A, Rect::new(300, 200, 302, 218))
            .with_context(A, Some(0x0001))
            .with_toggle(true);
        let desktop = ScriptedDesktop::new(scene);
        let mut orchestrator = TickOrchestrator::new(&Config::default());

        let command = orchestrator.tick(&desktop);
        assert_eq!(command, RenderCommand::show(Point::new(306, 228), ModeVerdict::NativeScript));
    }

    #[test]
    fn test_pointer_anchor_gets_extra_offset_and_clamp() {
        let desktop = ScriptedDesktop::new(app(A, ENGLISH).with_cursor(Point::new(500, 500)));
        let mut orchestrator = TickOrchestrator::new(&Config::default());
        assert_eq!(
            orchestrator.tick(&desktop),
            RenderCommand::show(Point::new(531, 535), ModeVerdict::Alphanumeric)
        );

        // У нижнего правого угла рабочей области значок прижимается внутрь
        desktop.update(|scene| scene.cursor = Some(Point::new(1000, 1000)));
        assert_eq!(
            orchestrator.tick(&desktop),
            RenderCommand::show(Point::new(1031, 1018), ModeVerdict::Alphanumeric)
        );
    }

    #[test]
    fn test_app_switch_prefers_toggle_then_settles_back() {
        // A: контекст и toggle согласны
        let desktop = ScriptedDesktop::new(
            app(A, KOREAN)
                .with_cursor(Point::new(10, 10))
                .with_context(A, Some(0x0008))
                .with_toggle(false),
        );
        let mut orchestrator = TickOrchestrator::new(&Config::default());
        assert_eq!(orchestrator.tick(&desktop).glyph, ModeVerdict::Alphanumeric);

        // B: контекст ещё не обновился ("латиница"), toggle уже "хангыль"
        desktop.replace(
            app(B, KOREAN)
                .with_cursor(Point::new(10, 10))
                .with_context(B, Some(0x0008))
                .with_toggle(true),
        );
        let glyphs: Vec<ModeVerdict> = (0..5).map(|_| orchestrator.tick(&desktop).glyph).collect();
        assert_eq!(
            glyphs,
            vec![
                ModeVerdict::NativeScript,
                ModeVerdict::NativeScript,
                ModeVerdict::NativeScript,
                ModeVerdict::Alphanumeric,
                ModeVerdict::Alphanumeric,
            ]
        );

        let stats = desktop.stats();
        assert_eq!(stats.settles.len(), 3);
        assert_eq!(stats.open_contexts(), 0);
        assert_eq!(orchestrator.switch_state().last_foreground, Some(B));
    }

    #[test]
    fn test_non_native_layout_scenario() {
        let desktop = ScriptedDesktop::new(
            app(B, ENGLISH)
                .with_cursor(Point::new(10, 10))
                .with_context(B, Some(0x0001))
                .with_toggle(true),
        );
        let mut orchestrator = TickOrchestrator::new(&Config::default());
        assert_eq!(orchestrator.tick(&desktop).glyph, ModeVerdict::Alphanumeric);
    }

    #[test]
    fn test_extreme_offsets_do_not_overflow() {
        let mut config = Config::default();
        config.badge.pointer_offset_x = i32::MAX;
        config.badge.offset_y = i32::MIN;
        let desktop = ScriptedDesktop::new(app(A, ENGLISH).with_cursor(Point::new(500, 500)));
        let mut orchestrator = TickOrchestrator::new(&config);
        assert_eq!(
            orchestrator.tick(&desktop),
            RenderCommand::show(Point::new(1898, 0), ModeVerdict::Alphanumeric)
        );
    }

    #[test]
    fn test_unresolvable_anchor_hides_badge() {
        let mut scene = app(A, KOREAN);
        scene.window_rects.clear();
        let desktop = ScriptedDesktop::new(scene);
        let mut orchestrator = TickOrchestrator::new(&Config::default());
        assert_eq!(orchestrator.tick(&desktop), RenderCommand::hidden());
        // Окно при этом учтено для отслеживания переключений
        assert_eq!(orchestrator.switch_state().last_foreground, Some(A));
    }

    #[test]
    fn test_switch_is_logged_even_when_badge_is_hidden() {
        let desktop = ScriptedDesktop::new(app(A, ENGLISH).with_cursor(Point::new(10, 10)));
        let mut orchestrator = TickOrchestrator::new(&Config::default());
        assert!(orchestrator.tick(&desktop).visible);
        assert_eq!(orchestrator.log.switches, 0);

        // Переключились на B, но ни каретки, ни курсора, ни прямоугольника окна
        let mut hidden = app(B, ENGLISH);
        hidden.window_rects.clear();
        desktop.replace(hidden);
        assert_eq!(orchestrator.tick(&desktop), RenderCommand::hidden());
        assert_eq!(orchestrator.log.switches, 1);
        assert_eq!(orchestrator.log.last_glyph, None);

        // Позиция снова известна: не переключение, но значок логируется заново
        desktop.replace(app(B, ENGLISH).with_cursor(Point::new(10, 10)));
        assert!(orchestrator.tick(&desktop).visible);
        assert_eq!(orchestrator.log.switches, 1);
        assert_eq!(orchestrator.log.last_glyph, Some(ModeVerdict::Alphanumeric));
    }
}
