//! Viewport zoom/pan state.

use crate::config::BoardConfig;
use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Zoom and pan applied when rendering the board.
///
/// World coordinates map to screen coordinates as `pan + world * zoom`.
/// Nothing here touches element data or history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Current zoom level (1.0 = 100%).
    pub zoom: f64,
    /// Current translation in screen pixels.
    pub pan: Vec2,
    /// Screen size of the drawing surface.
    pub size: Size,
    min_zoom: f64,
    max_zoom: f64,
    zoom_step: f64,
    fit_padding: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::from_config(&BoardConfig::default())
    }
}

impl Viewport {
    /// Create a viewport with the default zoom bounds and size.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a viewport using the zoom bounds and size from `config`.
    ///
    /// Invalid zoom settings fall back to the defaults.
    pub fn from_config(config: &BoardConfig) -> Self {
        let config = config.clone().normalized();
        Self {
            zoom: 1.0,
            pan: Vec2::ZERO,
            size: Size::new(config.viewport_width, config.viewport_height),
            min_zoom: config.min_zoom,
            max_zoom: config.max_zoom,
            zoom_step: config.zoom_step,
            fit_padding: config.fit_padding,
        }
    }

    /// World-to-screen transform.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.pan) * Affine::scale(self.zoom)
    }

    /// Screen-to-world transform.
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.zoom) * Affine::translate(-self.pan)
    }

    /// Convert a screen point to world coordinates.
    pub fn screen_to_world(&self, screen_point: Point) -> Point {
        self.inverse_transform() * screen_point
    }

    /// Convert a world point to screen coordinates.
    pub fn world_to_screen(&self, world_point: Point) -> Point {
        self.transform() * world_point
    }

    /// Set the zoom level, clamped to the allowed range. Non-finite values are ignored.
    pub fn set_zoom(&mut self, zoom: f64) {
        if !zoom.is_finite() {
            return;
        }
        self.zoom = zoom.clamp(self.min_zoom, self.max_zoom);
    }

    /// Zoom in by one step.
    pub fn zoom_in(&mut self) {
        self.set_zoom(self.snap_to_step(self.zoom + self.zoom_step));
    }

    /// Zoom out by one step.
    pub fn zoom_out(&mut self) {
        self.set_zoom(self.snap_to_step(self.zoom - self.zoom_step));
    }

    /// Change zoom while keeping `screen_point` over the same world point.
    pub fn zoom_at(&mut self, screen_point: Point, zoom: f64) {
        let world_point = self.screen_to_world(screen_point);
        self.set_zoom(zoom);

        let new_screen = self.world_to_screen(world_point);
        self.pan += screen_point - new_screen;
    }

    /// Pan by a delta in screen pixels.
    pub fn pan_by(&mut self, delta: Vec2) {
        self.pan += delta;
    }

    /// Set the pan offset in screen pixels.
    pub fn set_pan(&mut self, x: f64, y: f64) {
        self.pan = Vec2::new(x, y);
    }

    /// Resize the drawing surface.
    pub fn set_size(&mut self, width: f64, height: f64) {
        self.size = Size::new(width, height);
    }

    /// Restore zoom 1 and no pan.
    pub fn reset_view(&mut self) {
        self.zoom = 1.0;
        self.pan = Vec2::ZERO;
    }

    /// Choose zoom and pan so `bounds` is fully visible and centered.
    ///
    /// The zoom is rounded down to the zoom step. A box that is flat on one
    /// axis is fitted on the other; a single point keeps the current zoom.
    /// No content resets the view.
    pub fn zoom_to_fit(&mut self, bounds: Option<Rect>) {
        let Some(bounds) = bounds else {
            self.reset_view();
            return;
        };

        let available = Size::new(
            (self.size.width - self.fit_padding * 2.0).max(1.0),
            (self.size.height - self.fit_padding * 2.0).max(1.0),
        );
        let scale_x = (bounds.width() > 0.0).then(|| available.width / bounds.width());
        let scale_y = (bounds.height() > 0.0).then(|| available.height / bounds.height());
        let scale = match (scale_x, scale_y) {
            (Some(x), Some(y)) => Some(x.min(y)),
            (x, y) => x.or(y),
        };
        if let Some(scale) = scale {
            self.set_zoom(self.floor_to_step(scale));
        }

        let bounds_center = bounds.center();
        let viewport_center = Point::new(self.size.width / 2.0, self.size.height / 2.0);
        self.pan = Vec2::new(
            viewport_center.x - bounds_center.x * self.zoom,
            viewport_center.y - bounds_center.y * self.zoom,
        );
    }

    /// The world-space rectangle currently visible.
    pub fn visible_world_rect(&self) -> Rect {
        let top_left = self.screen_to_world(Point::ZERO);
        let bottom_right =
            self.screen_to_world(Point::new(self.size.width, self.size.height));
        Rect::from_points(top_left, bottom_right)
    }

    fn snap_to_step(&self, zoom: f64) -> f64 {
        (zoom / self.zoom_step).round() * self.zoom_step
    }

    fn floor_to_step(&self, zoom: f64) -> f64 {
        // Tolerance keeps exact multiples like 0.3 from flooring to 0.2.
        ((zoom / self.zoom_step) + 1e-9).floor() * self.zoom_step
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_default_viewport() {
        let viewport = Viewport::new();
        assert_eq!(viewport.pan, Vec2::ZERO);
        assert!((viewport.zoom - 1.0).abs() < EPS);
    }

    #[test]
    fn test_zoom_clamp() {
        let mut viewport = Viewport::new();
        viewport.set_zoom(10.0);
        assert!((viewport.zoom - 5.0).abs() < EPS);
        viewport.set_zoom(-1.0);
        assert!((viewport.zoom - 0.1).abs() < EPS);
        viewport.set_zoom(f64::NAN);
        assert!((viewport.zoom - 0.1).abs() < EPS);
    }

    #[test]
    fn test_zoom_steps() {
        let mut viewport = Viewport::new();
        viewport.zoom_in();
        assert!((viewport.zoom - 1.1).abs() < EPS);
        viewport.zoom_out();
        viewport.zoom_out();
        assert!((viewport.zoom - 0.9).abs() < EPS);

        viewport.set_zoom(0.1);
        viewport.zoom_out();
        assert!((viewport.zoom - 0.1).abs() < EPS);
    }

    #[test]
    fn test_roundtrip_conversion() {
        let mut viewport = Viewport::new();
        viewport.set_pan(30.0, -20.0);
        viewport.set_zoom(1.5);

        let original = Point::new(123.0, 456.0);
        let back = viewport.world_to_screen(viewport.screen_to_world(original));
        assert!((back.x - original.x).abs() < 1e-10);
        assert!((back.y - original.y).abs() < 1e-10);
    }

    #[test]
    fn test_zoom_at_keeps_point_fixed() {
        let mut viewport = Viewport::new();
        let anchor = Point::new(200.0, 100.0);
        let world = viewport.screen_to_world(anchor);
        viewport.zoom_at(anchor, 2.0);
        let after = viewport.world_to_screen(world);
        assert!((after.x - anchor.x).abs() < EPS);
        assert!((after.y - anchor.y).abs() < EPS);
    }

    #[test]
    fn test_zoom_to_fit_shows_whole_box() {
        let mut viewport = Viewport::new();
        let bounds = Rect::new(0.0, 0.0, 1400.0, 1000.0);
        viewport.zoom_to_fit(Some(bounds));

        assert!((viewport.zoom - 0.5).abs() < EPS);
        assert!((viewport.pan.x - 50.0).abs() < EPS);
        assert!((viewport.pan.y - 50.0).abs() < EPS);

        let visible = viewport.visible_world_rect();
        assert!(visible.contains(bounds.origin()));
        assert!(visible.x1 >= bounds.x1 && visible.y1 >= bounds.y1);
    }

    #[test]
    fn test_zoom_to_fit_small_box_clamps() {
        let mut viewport = Viewport::new();
        viewport.zoom_to_fit(Some(Rect::new(10.0, 10.0, 20.0, 20.0)));
        assert!((viewport.zoom - 5.0).abs() < EPS);
    }

    #[test]
    fn test_zoom_to_fit_flat_box_far_from_origin() {
        let mut viewport = Viewport::new();
        let bounds = Rect::new(5000.0, 5000.0, 5000.0, 5300.0);
        viewport.zoom_to_fit(Some(bounds));

        // Fitted on height alone: 500 / 300 floored to the 0.1 step.
        assert!((viewport.zoom - 1.6).abs() < EPS);
        let visible = viewport.visible_world_rect();
        assert!(visible.contains(Point::new(5000.0, 5000.0)));
        assert!(visible.contains(Point::new(5000.0, 5300.0)));
    }

    #[test]
    fn test_zoom_to_fit_point_keeps_zoom() {
        let mut viewport = Viewport::new();
        viewport.set_zoom(2.0);
        viewport.zoom_to_fit(Some(Rect::new(-300.0, 700.0, -300.0, 700.0)));

        assert!((viewport.zoom - 2.0).abs() < EPS);
        let center = viewport.world_to_screen(Point::new(-300.0, 700.0));
        assert!((center.x - 400.0).abs() < EPS);
        assert!((center.y - 300.0).abs() < EPS);
    }

    #[test]
    fn test_invalid_config_falls_back_to_default_zoom() {
        let config = BoardConfig {
            min_zoom: 6.0,
            zoom_step: -1.0,
            ..BoardConfig::default()
        };
        let mut viewport = Viewport::from_config(&config);
        viewport.set_zoom(2.0);
        assert!((viewport.zoom - 2.0).abs() < EPS);
        viewport.zoom_in();
        assert!((viewport.zoom - 2.1).abs() < EPS);
        viewport.set_zoom(10.0);
        assert!((viewport.zoom - 5.0).abs() < EPS);
    }

    #[test]
    fn test_zoom_to_fit_empty_resets() {
        let mut viewport = Viewport::new();
        viewport.set_zoom(3.0);
        viewport.pan_by(Vec2::new(10.0, 10.0));
        viewport.zoom_to_fit(None);
        assert!((viewport.zoom - 1.0).abs() < EPS);
        assert_eq!(viewport.pan, Vec2::ZERO);
    }
}
