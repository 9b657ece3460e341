use crate::config::{AnchorConfig, BadgeConfig};
use crate::events::{AnchorPoint, AnchorSource, FocusSnapshot, Point, Rect};
use crate::services::desktop::DesktopApi;

/// Picks the screen point for the badge.
///
/// Strict priority, first success wins: caret, pointer inside the foreground
/// window, shifted window center, pointer anywhere.
#[derive(Debug, Clone)]
pub struct AnchorResolver {
    center_shift_x: i32,
    center_shift_y: i32,
    window_margin: i32,
    badge_size: i32,
}

impl AnchorResolver {
    pub fn new(anchor: &AnchorConfig, badge: &BadgeConfig) -> Self {
        Self {
            center_shift_x: anchor.center_shift_x,
            center_shift_y: anchor.center_shift_y,
            window_margin: anchor.window_margin,
            badge_size: badge.size,
        }
    }

    /// `None` только без окна переднего плана или если не сработал ни один вариант
    pub fn resolve<D: DesktopApi + ?Sized>(&self, desktop: &D, snapshot: &FocusSnapshot) -> Option<AnchorPoint> {
        let foreground = snapshot.foreground_window?;

        if let Some(caret) = snapshot.caret {
            return Some(AnchorPoint::new(caret.screen_point, AnchorSource::Caret));
        }

        // Курсор над окном: скорее всего, пользователь печатает где-то рядом
        if let Some(cursor) = desktop.cursor_position() {
            let inside = desktop
                .window_rect(foreground)
                .is_some_and(|rect| rect.contains_inclusive(cursor));
            if inside {
                return Some(AnchorPoint::new(cursor, AnchorSource::Pointer));
            }
        }

        let target = snapshot.focused_window.unwrap_or(foreground);
        if let Some(rect) = desktop.window_rect(target) {
            return Some(AnchorPoint::new(
                self.window_center_point(rect),
                AnchorSource::WindowCenterFallback,
            ));
        }

        desktop
            .cursor_position()
            .map(|cursor| AnchorPoint::new(cursor, AnchorSource::PointerFallback))
    }

    /// Левее и выше центра окна, но не ближе `window_margin` к его краям
    fn window_center_point(&self, rect: Rect) -> Point {
        let center = rect.center();
        let x = center.x.saturating_sub(self.center_shift_x);
        let y = center.y.saturating_sub(self.center_shift_y);
        let margin = self.window_margin;
        let far = |edge: i32| edge.saturating_sub(self.badge_size).saturating_sub(margin);
        Point::new(
            x.min(far(rect.right)).max(rect.left.saturating_add(margin)),
            y.min(far(rect.bottom)).max(rect.top.saturating_add(margin)),
        )
    }
}
