use crate::events::{Point, Rect};
use crate::services::desktop::DesktopApi;
use crate::trace_if_enabled;

/// Keeps a fixed-size badge fully inside the work area of the nearest monitor.
#[derive(Debug, Clone, Copy)]
pub struct MonitorClamp {
    size: i32,
}

impl MonitorClamp {
    pub fn new(size: i32) -> Self {
        Self { size }
    }

    /// Без информации о мониторе точка возвращается как есть
    pub fn clamp<D: DesktopApi + ?Sized>(&self, desktop: &D, point: Point) -> Point {
        match desktop.monitor_work_area(point) {
            Some(area) => clamp_to_area(point, area, self.size),
            None => {
                trace_if_enabled!("Монитор для точки {} не найден, без ограничения", point);
                point
            }
        }
    }
}

/// Каждая ось ограничивается независимо: `max(left, min(x, right - size))`
pub fn clamp_to_area(point: Point, area: Rect, size: i32) -> Point {
    Point::new(
        point.x.min(area.right.saturating_sub(size)).max(area.left),
        point.y.min(area.bottom.saturating_sub(size)).max(area.top),
    )
}
