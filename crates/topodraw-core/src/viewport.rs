//! Viewport state machine: zoom, pan, interaction mode and cursor.

use crate::config::EditorConfig;
use crate::store::{Store, Subscription};
use crate::tools::{Cursor, InteractionMode, ToolKind, cursor_for};
use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Content extent used by [`ViewportStateMachine::fit_to_screen`].
pub const NOMINAL_CONTENT_SIZE: Size = Size::new(1200.0, 800.0);

/// Zoom limits and step sizes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomConstraints {
    pub min: f64,
    pub max: f64,
    /// Increment used by slider-style zoom controls.
    pub step: f64,
    /// Factor applied by a single zoom in/out or wheel notch. Must be > 1.
    pub wheel_sensitivity: f64,
}

impl Default for ZoomConstraints {
    fn default() -> Self {
        Self {
            min: 0.1,
            max: 5.0,
            step: 0.1,
            wheel_sensitivity: 1.1,
        }
    }
}

impl ZoomConstraints {
    /// Clamp a zoom level into `[min, max]`.
    pub fn clamp(&self, level: f64) -> f64 {
        level.max(self.min).min(self.max)
    }

    /// Repair unusable limits: non-finite or non-positive values fall back
    /// to the defaults, inverted bounds are swapped and a sensitivity that
    /// would not change the level is replaced.
    pub fn normalized(self) -> Self {
        let defaults = Self::default();
        let positive = |value: f64, fallback: f64| {
            if value.is_finite() && value > 0.0 { value } else { fallback }
        };
        let min = positive(self.min, defaults.min);
        let max = positive(self.max, defaults.max);
        let wheel_sensitivity = if self.wheel_sensitivity.is_finite() && self.wheel_sensitivity > 1.0 {
            self.wheel_sensitivity
        } else {
            defaults.wheel_sensitivity
        };
        Self {
            min: min.min(max),
            max: min.max(max),
            step: positive(self.step, defaults.step),
            wheel_sensitivity,
        }
    }
}

/// Rectangle the pan offset is confined to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PanConstraints {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl PanConstraints {
    /// Clamp each axis independently.
    pub fn clamp(&self, point: Point) -> Point {
        Point::new(
            point.x.max(self.min_x).min(self.max_x),
            point.y.max(self.min_y).min(self.max_y),
        )
    }
}

impl From<Rect> for PanConstraints {
    fn from(rect: Rect) -> Self {
        let rect = rect.abs();
        Self {
            min_x: rect.x0,
            max_x: rect.x1,
            min_y: rect.y0,
            max_y: rect.y1,
        }
    }
}

/// Published viewport state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewportState {
    pub zoom_level: f64,
    pub zoom_constraints: ZoomConstraints,
    /// Focus point of the most recent zoom, in screen coordinates.
    pub zoom_center: Option<Point>,
    pub pan_position: Point,
    pub pan_constraints: Option<PanConstraints>,
    pub mode: InteractionMode,
    pub tool: ToolKind,
    pub cursor: Cursor,
    pub viewport_size: Size,
    pub is_panning: bool,
}

impl ViewportState {
    /// Zoom level as a whole percentage for display.
    pub fn zoom_percent(&self) -> i32 {
        (self.zoom_level * 100.0).round() as i32
    }
}

#[derive(Debug, Clone, Copy)]
struct PanGesture {
    /// Pointer position at `start_pan`.
    start: Point,
    /// Pan offset at `start_pan`.
    origin: Point,
}

/// Owns zoom level, pan offset, interaction mode and cursor.
///
/// Every operation is total: out-of-range input is clamped, and calls made
/// in the wrong gesture phase are ignored.
#[derive(Debug)]
pub struct ViewportStateMachine {
    state: Store<ViewportState>,
    gesture: Option<PanGesture>,
}

impl ViewportStateMachine {
    /// Create a viewport for a canvas of the given size. Unusable zoom
    /// limits are repaired with [`ZoomConstraints::normalized`].
    pub fn new(viewport_size: Size, zoom_constraints: ZoomConstraints) -> Self {
        let requested = zoom_constraints;
        let zoom_constraints = requested.normalized();
        if zoom_constraints != requested {
            log::warn!("Repaired zoom constraints {:?} to {:?}", requested, zoom_constraints);
        }
        let mode = InteractionMode::default();
        Self {
            state: Store::new(ViewportState {
                zoom_level: zoom_constraints.clamp(1.0),
                zoom_constraints,
                zoom_center: None,
                pan_position: Point::ZERO,
                pan_constraints: None,
                mode,
                tool: ToolKind::default(),
                cursor: cursor_for(mode),
                viewport_size,
                is_panning: false,
            }),
            gesture: None,
        }
    }

    /// Create a viewport using the zoom limits from `config`.
    pub fn with_config(config: &EditorConfig, viewport_size: Size) -> Self {
        Self::new(viewport_size, config.zoom)
    }

    /// Snapshot of the current state.
    pub fn get_current(&self) -> ViewportState {
        self.state.get_current()
    }

    /// Borrow the current state.
    pub fn state(&self) -> &ViewportState {
        self.state.current()
    }

    /// Observe state changes.
    pub fn subscribe(&self, listener: impl Fn(&ViewportState) + 'static) -> Subscription<ViewportState> {
        self.state.subscribe(listener)
    }

    pub fn zoom_level(&self) -> f64 {
        self.state.current().zoom_level
    }

    pub fn pan_position(&self) -> Point {
        self.state.current().pan_position
    }

    pub fn cursor(&self) -> Cursor {
        self.state.current().cursor
    }

    pub fn zoom_percent(&self) -> i32 {
        self.state.current().zoom_percent()
    }

    /// Centre of the viewport in screen coordinates.
    pub fn viewport_center(&self) -> Point {
        let size = self.state.current().viewport_size;
        Point::new(size.width / 2.0, size.height / 2.0)
    }

    pub fn set_viewport_size(&mut self, size: Size) {
        self.state.update(|s| s.viewport_size = size);
    }

    // --- Zoom ---

    /// Set the zoom level, clamped into the configured range.
    ///
    /// `center` is recorded as the zoom focus; the pan offset is left alone.
    /// Use [`Self::zoom_about`] to keep a screen point fixed.
    pub fn set_zoom(&mut self, level: f64, center: Option<Point>) -> f64 {
        let state = self.state.current();
        let requested = if level.is_finite() { level } else { state.zoom_level };
        let new_level = state.zoom_constraints.clamp(requested);
        self.state.update(|s| {
            s.zoom_level = new_level;
            if center.is_some() {
                s.zoom_center = center;
            }
        });
        new_level
    }

    pub fn zoom_in(&mut self, center: Option<Point>) -> f64 {
        let state = self.state.current();
        let level = state.zoom_level * state.zoom_constraints.wheel_sensitivity;
        self.set_zoom(level, center)
    }

    pub fn zoom_out(&mut self, center: Option<Point>) -> f64 {
        let state = self.state.current();
        let level = state.zoom_level / state.zoom_constraints.wheel_sensitivity;
        self.set_zoom(level, center)
    }

    /// Back to 100% about the viewport centre.
    pub fn reset_zoom(&mut self) -> f64 {
        let center = self.viewport_center();
        self.set_zoom(1.0, Some(center))
    }

    /// Zoom so that [`NOMINAL_CONTENT_SIZE`] fits the viewport.
    pub fn fit_to_screen(&mut self) -> f64 {
        let size = self.state.current().viewport_size;
        let level = (size.width / NOMINAL_CONTENT_SIZE.width)
            .min(size.height / NOMINAL_CONTENT_SIZE.height);
        let center = self.viewport_center();
        self.set_zoom(level, Some(center))
    }

    /// Zoom and pan so `bounds` (world coordinates) fills the viewport,
    /// leaving `padding` screen pixels on each side.
    pub fn fit_to_bounds(&mut self, bounds: Rect, padding: f64) -> f64 {
        if bounds.is_zero_area() {
            let level = self.reset_zoom();
            self.set_pan(Point::ZERO);
            return level;
        }

        let viewport = self.state.current().viewport_size;
        let padded = Size::new(
            (viewport.width - padding * 2.0).max(1.0),
            (viewport.height - padding * 2.0).max(1.0),
        );
        let scale_x = padded.width / bounds.width();
        let scale_y = padded.height / bounds.height();
        let center = self.viewport_center();
        let level = self.set_zoom(scale_x.min(scale_y), Some(center));

        let bounds_center = bounds.center();
        self.set_pan(Point::new(
            center.x - bounds_center.x * level,
            center.y - bounds_center.y * level,
        ));
        level
    }

    /// Zoom to `level` while keeping `screen_point` over the same world point.
    pub fn zoom_about(&mut self, level: f64, screen_point: Point) -> f64 {
        let world_point = self.screen_to_world(screen_point);
        let new_level = self.set_zoom(level, Some(screen_point));
        self.set_pan(Point::new(
            screen_point.x - world_point.x * new_level,
            screen_point.y - world_point.y * new_level,
        ));
        new_level
    }

    /// Handle a wheel notch: negative `delta_y` zooms in.
    pub fn zoom_by_wheel(&mut self, delta_y: f64, screen_point: Point) -> f64 {
        let state = self.state.current();
        if delta_y == 0.0 || !delta_y.is_finite() {
            return state.zoom_level;
        }
        let sensitivity = state.zoom_constraints.wheel_sensitivity;
        let factor = if delta_y < 0.0 { sensitivity } else { 1.0 / sensitivity };
        let level = state.zoom_level * factor;
        self.zoom_about(level, screen_point)
    }

    // --- Pan ---

    /// Set the pan offset, clamped by the pan constraints if any.
    pub fn set_pan(&mut self, position: Point) -> Point {
        let state = self.state.current();
        if !position.is_finite() {
            return state.pan_position;
        }
        let clamped = match state.pan_constraints {
            Some(constraints) => constraints.clamp(position),
            None => position,
        };
        self.state.update(|s| s.pan_position = clamped);
        clamped
    }

    /// Pan by a screen-space delta.
    pub fn pan_by(&mut self, delta: Vec2) -> Point {
        let position = self.pan_position() + delta;
        self.set_pan(position)
    }

    /// Begin a drag-pan gesture at `point`.
    pub fn start_pan(&mut self, point: Point) {
        self.gesture = Some(PanGesture {
            start: point,
            origin: self.pan_position(),
        });
        self.state.update(|s| {
            s.is_panning = true;
            s.cursor = Cursor::Grabbing;
        });
    }

    /// Continue a drag-pan gesture. Ignored without a preceding `start_pan`.
    pub fn update_pan(&mut self, point: Point) {
        let Some(gesture) = self.gesture else {
            return;
        };
        self.set_pan(gesture.origin + (point - gesture.start));
    }

    /// Conclude a drag-pan gesture. Ignored without a preceding `start_pan`.
    pub fn end_pan(&mut self, point: Point) {
        if self.gesture.is_none() {
            return;
        }
        self.update_pan(point);
        self.gesture = None;
        self.state.update(|s| {
            s.is_panning = false;
            s.cursor = cursor_for(s.mode);
        });
    }

    pub fn is_panning(&self) -> bool {
        self.gesture.is_some()
    }

    /// Install pan limits. The current offset is not clamped until the next
    /// `set_pan`.
    pub fn set_pan_constraints(&mut self, constraints: impl Into<PanConstraints>) {
        let constraints = constraints.into();
        self.state.update(|s| s.pan_constraints = Some(constraints));
    }

    pub fn clear_pan_constraints(&mut self) {
        self.state.update(|s| s.pan_constraints = None);
    }

    // --- Mode / tool ---

    pub fn set_mode(&mut self, mode: InteractionMode) {
        log::debug!("Viewport mode -> {:?}", mode);
        let panning = self.gesture.is_some();
        self.state.update(|s| {
            s.mode = mode;
            s.cursor = if panning { Cursor::Grabbing } else { cursor_for(mode) };
        });
    }

    /// Select a tool; the interaction mode follows the tool.
    pub fn set_tool(&mut self, tool: ToolKind) {
        self.state.update(|s| s.tool = tool);
        self.set_mode(tool.mode());
    }

    // --- Coordinate transforms ---

    /// World-to-screen transform.
    pub fn transform(&self) -> Affine {
        let state = self.state.current();
        Affine::translate(state.pan_position.to_vec2()) * Affine::scale(state.zoom_level)
    }

    /// Screen-to-world transform.
    pub fn inverse_transform(&self) -> Affine {
        let state = self.state.current();
        Affine::scale(1.0 / state.zoom_level) * Affine::translate(-state.pan_position.to_vec2())
    }

    pub fn screen_to_world(&self, screen_point: Point) -> Point {
        self.inverse_transform() * screen_point
    }

    pub fn world_to_screen(&self, world_point: Point) -> Point {
        self.transform() * world_point
    }
}

impl Default for ViewportStateMachine {
    fn default() -> Self {
        Self::new(Size::new(800.0, 600.0), ZoomConstraints::default())
    }
}
