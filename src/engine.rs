//! Stroke & mode engine.
//!
//! Owns the canvas, the undo history and every piece of per-stroke state.
//! The outer loop calls [`StrokeEngine::step`] once per camera frame with
//! whatever the detector produced (possibly nothing) and reads back what
//! changed. Nothing here blocks, and nothing here fails: out-of-range
//! coordinates and sizes are clamped, missing hands fade strokes out through
//! the frame-loss counter, and an empty history makes undo a no-op.

use crate::canvas::{BACKGROUND, Canvas};
use crate::config::{EngineConfig, GestureConfig, ToolbarConfig};
use crate::error::{Error, Result};
use crate::gesture::{self, HandFacts};
use crate::history::UndoHistory;
use crate::smoothing::SmoothingBuffer;
use crate::toolbar::{Toolbar, ToolbarAction};
use crate::types::{Handedness, Keypoint, Point, Rect, Rgb};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolMode {
    Draw,
    Erase,
}

/// Frames left before a debounced action may fire again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cooldown {
    remaining: u32,
}

impl Cooldown {
    pub fn is_ready(&self) -> bool {
        self.remaining == 0
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn trigger(&mut self, frames: u32) {
        self.remaining = frames;
    }

    /// Once per frame; floors at zero.
    pub fn tick(&mut self) {
        self.remaining = self.remaining.saturating_sub(1);
    }
}

/// One frame of detector output.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameInput<'a> {
    /// 21 keypoints for a hand, empty when none was found.
    pub keypoints: &'a [Keypoint],
    pub handedness: Option<Handedness>,
}

impl<'a> FrameInput<'a> {
    pub fn no_hand() -> Self {
        Self::default()
    }

    pub fn hand(keypoints: &'a [Keypoint], handedness: Option<Handedness>) -> Self {
        Self { keypoints, handedness }
    }
}

/// What a frame did to the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SurfaceDelta {
    #[default]
    Unchanged,
    /// Ink (or erasure) inside this area.
    Stroked(Rect),
    Cleared,
    /// Replaced by an undo snapshot.
    Restored,
}

/// What a frame did to the tool settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeDelta {
    Color(usize),
    Eraser,
}

/// Which debounced action fired this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Clear,
    NextColor,
    Undo,
    Button(ToolbarAction),
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameOutcome {
    /// Index fingertip, when a hand was seen.
    pub pointer: Option<Point>,
    pub drawing: bool,
    pub erasing: bool,
    pub in_toolbar: bool,
    pub surface: SurfaceDelta,
    pub mode: Option<ModeDelta>,
    pub fired: Option<Trigger>,
}

pub struct StrokeEngine {
    cfg: EngineConfig,
    gesture_cfg: GestureConfig,
    toolbar: Toolbar,
    canvas: Canvas,
    history: UndoHistory,
    smoothing: SmoothingBuffer,

    // Stroke state
    prev_point: Option<Point>,
    stroke_active: bool,
    missing_frames: u32,
    dirty: Option<Rect>,

    // Tool state
    mode: ToolMode,
    color_index: usize,
    brush_size: u32,
    eraser_size: u32,

    gesture_cooldown: Cooldown,
    click_cooldown: Cooldown,
}

impl StrokeEngine {
    /// Engine for a `width`×`height` canvas. The size and the config are
    /// checked once here; a zero-sized canvas is rejected.
    pub fn new(
        width: u32,
        height: u32,
        cfg: EngineConfig,
        gesture_cfg: GestureConfig,
        toolbar_cfg: ToolbarConfig,
    ) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::config(format!("canvas must not be empty, got {width}x{height}")));
        }
        cfg.validate()?;
        Ok(Self {
            toolbar: Toolbar::new(width as i32, cfg.palette.len(), toolbar_cfg),
            canvas: Canvas::new(width, height),
            history: UndoHistory::new(cfg.undo_depth),
            smoothing: SmoothingBuffer::new(cfg.smoothing_window),
            prev_point: None,
            stroke_active: false,
            missing_frames: 0,
            dirty: None,
            mode: ToolMode::Draw,
            color_index: 0,
            brush_size: cfg.brush.initial,
            eraser_size: cfg.eraser.initial,
            gesture_cooldown: Cooldown::default(),
            click_cooldown: Cooldown::default(),
            gesture_cfg,
            cfg,
        })
    }

    pub fn with_defaults(width: u32, height: u32) -> Result<Self> {
        Self::new(width, height, EngineConfig::default(), GestureConfig::default(), ToolbarConfig::default())
    }

    /* ---------- Read-only views for the outer loop ---------- */

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn toolbar(&self) -> &Toolbar {
        &self.toolbar
    }

    pub fn palette(&self) -> &[crate::config::PaletteColor] {
        &self.cfg.palette
    }

    pub fn tool_mode(&self) -> ToolMode {
        self.mode
    }

    pub fn color_index(&self) -> usize {
        self.color_index
    }

    pub fn color_name(&self) -> &str {
        &self.cfg.palette[self.color_index].name
    }

    /// Ink colour of the current tool (background for the eraser).
    pub fn active_color(&self) -> Rgb {
        match self.mode {
            ToolMode::Draw => self.cfg.palette[self.color_index].rgb,
            ToolMode::Erase => BACKGROUND,
        }
    }

    pub fn active_thickness(&self) -> u32 {
        match self.mode {
            ToolMode::Draw => self.brush_size,
            ToolMode::Erase => self.eraser_size,
        }
    }

    pub fn brush_size(&self) -> u32 {
        self.brush_size
    }

    pub fn eraser_size(&self) -> u32 {
        self.eraser_size
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn stroke_active(&self) -> bool {
        self.stroke_active
    }

    /// Last smoothed point of the current stroke.
    pub fn last_point(&self) -> Option<Point> {
        self.prev_point
    }

    pub fn smoothing_len(&self) -> usize {
        self.smoothing.len()
    }

    pub fn missing_frames(&self) -> u32 {
        self.missing_frames
    }

    /// Union of everything touched since the last reset. Advisory only.
    pub fn dirty_region(&self) -> Option<Rect> {
        self.dirty
    }

    pub fn gesture_cooldown(&self) -> u32 {
        self.gesture_cooldown.remaining()
    }

    pub fn click_cooldown(&self) -> u32 {
        self.click_cooldown.remaining()
    }

    /* ---------- Tool setters ---------- */

    pub fn set_tool_mode(&mut self, mode: ToolMode) {
        self.mode = mode;
    }

    /// Pick a palette entry (wrapped into range) and switch to drawing.
    pub fn select_color(&mut self, index: usize) {
        self.color_index = index % self.cfg.palette.len();
        self.mode = ToolMode::Draw;
    }

    pub fn next_color(&mut self) -> usize {
        self.select_color(self.color_index + 1);
        self.color_index
    }

    pub fn set_brush_size(&mut self, n: i64) {
        self.brush_size = self.cfg.brush.clamp(n);
    }

    pub fn set_eraser_size(&mut self, n: i64) {
        self.eraser_size = self.cfg.eraser.clamp(n);
    }

    /* ---------- Stroke lifecycle ---------- */

    fn reset_stroke(&mut self) {
        self.prev_point = None;
        self.smoothing.clear();
        self.stroke_active = false;
        self.dirty = None;
    }

    fn ink(&self, eraser: bool) -> (Rgb, u32) {
        if eraser {
            (BACKGROUND, self.eraser_size)
        } else {
            (self.cfg.palette[self.color_index].rgb, self.brush_size)
        }
    }

    fn grow_dirty(&mut self, r: Rect) {
        self.dirty = Some(self.dirty.map_or(r, |d| d.union(r)));
    }

    /// Extend the current stroke (or start one) at `(x, y)`.
    ///
    /// The point is clamped onto the canvas and smoothed against the recent
    /// samples. The first point of a stroke leaves a dot of diameter
    /// `thickness`; later points draw a segment from the previous smoothed
    /// point. Returns the area that was painted.
    pub fn draw_point(&mut self, x: i32, y: i32, eraser: bool) -> Option<Rect> {
        self.missing_frames = 0;
        let p = self.canvas.clamp(x, y);

        if !self.stroke_active {
            // Nothing worth restoring on a blank canvas.
            if !self.canvas.is_empty() {
                self.history.push(self.canvas.snapshot());
            }
            self.stroke_active = true;
        }

        self.smoothing.push(p);
        let current = self.smoothing.smoothed().unwrap_or(p);
        let (color, thickness) = self.ink(eraser);

        let Some(prev) = self.prev_point else {
            self.prev_point = Some(current);
            let touched = self.canvas.fill_circle(current, (thickness / 2) as i32, color);
            if let Some(r) = touched {
                self.grow_dirty(r);
            }
            return touched;
        };

        self.canvas.draw_segment(prev, current, thickness, color);
        let t = thickness as i32;
        let touched = Rect {
            x0: (prev.x.min(current.x) - t).max(0),
            y0: (prev.y.min(current.y) - t).max(0),
            x1: (prev.x.max(current.x) + t).min(self.canvas.width() as i32),
            y1: (prev.y.max(current.y) + t).min(self.canvas.height() as i32),
        };
        self.grow_dirty(touched);
        self.prev_point = Some(current);
        Some(touched)
    }

    /// Call on every frame without drawing input. After
    /// `frame_loss_threshold` consecutive calls the stroke ends (ink stays).
    /// Returns true on the call that ended it.
    pub fn end_stroke_on_missing_input(&mut self) -> bool {
        self.missing_frames += 1;
        if self.missing_frames < self.cfg.frame_loss_threshold {
            return false;
        }
        self.reset_stroke();
        self.missing_frames = 0;
        true
    }

    /// Wipe the canvas. Always undoable.
    pub fn clear(&mut self) {
        self.history.push(self.canvas.snapshot());
        self.canvas.clear();
        self.reset_stroke();
    }

    /// Restore the most recent snapshot. False (and no change) when the
    /// history is empty.
    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.history.pop() else {
            return false;
        };
        if let Err(e) = self.canvas.restore(snapshot) {
            // Snapshots are only ever taken from this canvas.
            log::error!("Dropping undo snapshot: {e}");
            return false;
        }
        self.reset_stroke();
        true
    }

    /* ---------- Import / export ---------- */

    /// PNG bytes of the canvas.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        self.canvas.encode_png()
    }

    /// Replace the canvas with an encoded image of exactly the same size.
    /// On any error the canvas is left as it was. A successful load can be
    /// undone.
    pub fn deserialize(&mut self, bytes: &[u8]) -> Result<()> {
        let decoded = self.canvas.decode_matching(bytes)?;
        self.history.push(self.canvas.snapshot());
        self.canvas.restore(decoded)?;
        self.reset_stroke();
        Ok(())
    }

    /// Write the canvas; the format follows the file extension.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        self.canvas.image().save(path)?;
        log::info!("Canvas saved to {:?}", path);
        Ok(())
    }

    pub fn load_from_file(&mut self, path: &Path) -> Result<()> {
        let bytes = fs::read(path)?;
        self.deserialize(&bytes)?;
        log::info!("Canvas loaded from {:?}", path);
        Ok(())
    }

    /* ---------- Per-frame gesture → action mapping ---------- */

    fn apply_button(&mut self, action: ToolbarAction, out: &mut FrameOutcome) {
        match action {
            ToolbarAction::SelectColor(i) => {
                self.select_color(i);
                out.mode = Some(ModeDelta::Color(self.color_index));
            }
            ToolbarAction::Eraser => {
                self.mode = ToolMode::Erase;
                out.mode = Some(ModeDelta::Eraser);
            }
            ToolbarAction::Clear => {
                self.clear();
                out.surface = SurfaceDelta::Cleared;
            }
            ToolbarAction::Undo => {
                if self.undo() {
                    out.surface = SurfaceDelta::Restored;
                }
            }
        }
        out.fired = Some(Trigger::Button(action));
        self.click_cooldown.trigger(self.cfg.cooldowns.button_click);
    }

    /// Open palm clears, three fingers cycles colour, thumb+pinky undoes.
    fn apply_one_shot(&mut self, facts: &HandFacts, out: &mut FrameOutcome) {
        let cd = self.cfg.cooldowns;
        if facts.open_palm() {
            log::debug!("Gesture: open palm -> clear");
            self.clear();
            out.surface = SurfaceDelta::Cleared;
            out.fired = Some(Trigger::Clear);
            self.gesture_cooldown.trigger(cd.clear);
        } else if facts.three_fingers() {
            let idx = self.next_color();
            log::debug!("Gesture: three fingers -> colour {}", self.color_name());
            out.mode = Some(ModeDelta::Color(idx));
            out.fired = Some(Trigger::NextColor);
            self.gesture_cooldown.trigger(cd.next_color);
        } else if facts.thumb_and_pinky() {
            let restored = self.undo();
            log::debug!("Gesture: thumb + pinky -> undo (restored: {restored})");
            if restored {
                out.surface = SurfaceDelta::Restored;
            }
            out.fired = Some(Trigger::Undo);
            self.gesture_cooldown.trigger(cd.undo);
        }
    }

    /// Advance one frame.
    pub fn step(&mut self, input: &FrameInput<'_>) -> FrameOutcome {
        let facts = gesture::classify(input.keypoints, input.handedness, &self.gesture_cfg);
        let mut out = FrameOutcome::default();

        match facts.pointer {
            None => {
                self.end_stroke_on_missing_input();
            }
            Some(ptr) => {
                out.pointer = Some(ptr);

                let ps = self.cfg.pinch_sizing;
                if ps.enabled {
                    let size = (facts.pinch_distance / ps.divisor).clamp(ps.min as f32, ps.max as f32);
                    self.set_brush_size(size as i64);
                }

                let in_ui = self.toolbar.in_zone(ptr);
                if facts.pen_down() && in_ui {
                    out.in_toolbar = true;
                    if self.click_cooldown.is_ready() {
                        if let Some(action) = self.toolbar.hit_test(ptr) {
                            self.apply_button(action, &mut out);
                        }
                    }
                } else if self.gesture_cooldown.is_ready() {
                    self.apply_one_shot(&facts, &mut out);
                }

                if facts.pen_down() && !in_ui {
                    let eraser = self.mode == ToolMode::Erase
                        || gesture::is_pinch(input.keypoints, self.cfg.eraser_pinch_threshold);
                    let touched = self.draw_point(ptr.x, ptr.y, eraser);
                    out.drawing = true;
                    out.erasing = eraser;
                    if let (SurfaceDelta::Unchanged, Some(r)) = (out.surface, touched) {
                        out.surface = SurfaceDelta::Stroked(r);
                    }
                } else {
                    self.end_stroke_on_missing_input();
                }
            }
        }

        self.gesture_cooldown.tick();
        self.click_cooldown.tick();
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::{Pose, synthesize_hand};

    const W: u32 = 640;
    const H: u32 = 480;

    fn engine() -> StrokeEngine {
        StrokeEngine::with_defaults(W, H).unwrap()
    }

    /// Engine without pinch-driven brush sizing, for exact-size scenarios.
    fn fixed_size_engine() -> StrokeEngine {
        let mut cfg = EngineConfig::default();
        cfg.pinch_sizing.enabled = false;
        StrokeEngine::new(W, H, cfg, GestureConfig::default(), ToolbarConfig::default()).unwrap()
    }

    fn end_stroke(e: &mut StrokeEngine) {
        for _ in 0..5 {
            e.end_stroke_on_missing_input();
        }
        assert!(!e.stroke_active());
    }

    fn stroke(e: &mut StrokeEngine, from: (i32, i32), to: (i32, i32)) {
        e.draw_point(from.0, from.1, false);
        e.draw_point(to.0, to.1, false);
        end_stroke(e);
    }

    fn pose(e: &mut StrokeEngine, p: Pose, x: i32, y: i32) -> FrameOutcome {
        let kps = synthesize_hand(p, Point::new(x, y), Handedness::Right);
        e.step(&FrameInput::hand(&kps, Some(Handedness::Right)))
    }

    fn pixels(e: &StrokeEngine) -> Vec<u8> {
        e.canvas().image().as_raw().clone()
    }

    #[test]
    fn test_tap_draws_dot_of_half_thickness() {
        let mut e = engine();
        e.set_brush_size(8);
        e.draw_point(10, 10, false);

        let blue = e.active_color();
        assert_eq!(e.canvas().pixel(10, 10), blue);
        assert_eq!(e.canvas().pixel(14, 10), blue);
        assert_eq!(e.canvas().pixel(10, 6), blue);
        assert_eq!(e.canvas().pixel(15, 10), BACKGROUND);
        assert_eq!(e.canvas().pixel(13, 13), BACKGROUND);
        assert_eq!(e.canvas().content_bounds(), Some(Rect { x0: 6, y0: 6, x1: 15, y1: 15 }));
        assert_eq!(e.last_point(), Some(Point::new(10, 10)));
    }

    #[test]
    fn test_second_point_blends_towards_newest() {
        let mut e = engine();
        e.set_brush_size(8);
        e.draw_point(0, 0, false);
        e.draw_point(100, 0, false);

        let p = e.last_point().unwrap();
        assert_eq!(p, Point::new(66, 0));
        assert_eq!(e.canvas().pixel(66, 0), e.active_color());
        assert_eq!(e.canvas().pixel(80, 0), BACKGROUND);
        assert_eq!(e.canvas().pixel(100, 0), BACKGROUND);
    }

    #[test]
    fn test_out_of_bounds_points_are_clamped() {
        let mut e = engine();
        assert!(e.draw_point(-50, 9000, false).is_some());
        assert_eq!(e.last_point(), Some(Point::new(0, H as i32 - 1)));
    }

    #[test]
    fn test_replay_is_deterministic() {
        let path = [(30, 200), (35, 204), (50, 220), (48, 260), (90, 270), (130, 240)];
        let run = || {
            let mut e = engine();
            for (x, y) in path {
                e.draw_point(x, y, false);
            }
            e.draw_point(200, 300, true);
            pixels(&e)
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_smoothing_window_bounded() {
        let mut e = engine();
        for i in 0..20 {
            e.draw_point(100 + i, 100, false);
            assert!(e.smoothing_len() <= 5);
        }
        assert_eq!(e.smoothing_len(), 5);
    }

    #[test]
    fn test_dirty_region_grows_and_resets() {
        let mut e = engine();
        e.set_brush_size(4);
        e.draw_point(100, 100, false);
        e.draw_point(120, 100, false);
        let d = e.dirty_region().unwrap();
        assert!(d.x0 <= 96 && d.x1 >= 110 && d.y0 <= 96 && d.y1 >= 104);

        end_stroke(&mut e);
        assert_eq!(e.dirty_region(), None);

        e.draw_point(10, 10, false);
        assert!(e.dirty_region().is_some());
        e.clear();
        assert_eq!(e.dirty_region(), None);
    }

    #[test]
    fn test_frame_loss_hysteresis() {
        let mut e = engine();
        e.draw_point(50, 50, false);
        for _ in 0..4 {
            assert!(!e.end_stroke_on_missing_input());
            assert!(e.stroke_active());
            assert!(e.last_point().is_some());
        }
        assert!(e.end_stroke_on_missing_input());
        assert!(!e.stroke_active());
        assert_eq!(e.last_point(), None);
        assert_eq!(e.smoothing_len(), 0);
        assert_eq!(e.missing_frames(), 0);
        // Ink stays.
        assert_eq!(e.canvas().pixel(50, 50), e.active_color());
    }

    #[test]
    fn test_drawing_resets_loss_counter() {
        let mut e = engine();
        e.draw_point(50, 50, false);
        for _ in 0..4 {
            e.end_stroke_on_missing_input();
        }
        e.draw_point(52, 50, false);
        for _ in 0..4 {
            e.end_stroke_on_missing_input();
        }
        assert!(e.stroke_active());
    }

    #[test]
    fn test_snapshot_once_per_stroke_and_not_on_blank() {
        let mut e = engine();
        stroke(&mut e, (10, 200), (50, 200));
        assert_eq!(e.history_len(), 0);

        e.draw_point(100, 300, false);
        e.draw_point(120, 300, false);
        e.draw_point(140, 300, false);
        assert_eq!(e.history_len(), 1);
    }

    #[test]
    fn test_undo_restores_pre_stroke_canvas() {
        let mut e = engine();
        stroke(&mut e, (10, 200), (50, 200));
        let before = pixels(&e);
        stroke(&mut e, (300, 300), (400, 350));
        assert_ne!(pixels(&e), before);

        assert!(e.undo());
        assert_eq!(pixels(&e), before);
        assert!(!e.stroke_active());
    }

    #[test]
    fn test_undo_after_clear_is_exact() {
        let mut e = engine();
        stroke(&mut e, (10, 200), (50, 220));
        e.set_tool_mode(ToolMode::Erase);
        e.draw_point(30, 210, true);
        let before = pixels(&e);

        e.clear();
        assert!(e.canvas().is_empty());
        assert!(e.undo());
        assert_eq!(pixels(&e), before);
    }

    #[test]
    fn test_clear_on_blank_still_snapshots() {
        let mut e = engine();
        e.clear();
        assert_eq!(e.history_len(), 1);
    }

    #[test]
    fn test_history_capped_at_depth() {
        let mut e = engine();
        stroke(&mut e, (5, 300), (6, 300));
        let first_snapshot = pixels(&e);

        for i in 0..20 {
            let x = 20 + i * 25;
            stroke(&mut e, (x, 300), (x + 5, 310));
        }
        assert_eq!(e.history_len(), 20);

        // 21st stroke start: still 20, oldest gone.
        stroke(&mut e, (100, 400), (120, 420));
        assert_eq!(e.history_len(), 20);

        let mut undone = 0;
        while e.undo() {
            undone += 1;
            assert_ne!(pixels(&e), first_snapshot);
        }
        assert_eq!(undone, 20);
    }

    #[test]
    fn test_undo_on_empty_history() {
        let mut e = engine();
        e.draw_point(40, 40, false);
        let before = pixels(&e);
        assert!(!e.undo());
        assert_eq!(pixels(&e), before);
    }

    #[test]
    fn test_size_setters_clamp() {
        let mut e = engine();
        e.set_brush_size(0);
        assert_eq!(e.brush_size(), 1);
        e.set_brush_size(99);
        assert_eq!(e.brush_size(), 50);
        e.set_eraser_size(3);
        assert_eq!(e.eraser_size(), 10);
        e.set_eraser_size(500);
        assert_eq!(e.eraser_size(), 100);
        e.set_eraser_size(42);
        assert_eq!(e.eraser_size(), 42);
    }

    #[test]
    fn test_eraser_paints_background() {
        let mut e = engine();
        e.set_brush_size(20);
        e.draw_point(200, 200, false);
        end_stroke(&mut e);
        e.draw_point(200, 200, true);
        assert_eq!(e.canvas().pixel(200, 200), BACKGROUND);
    }

    #[test]
    fn test_color_change_mid_stroke() {
        let mut e = engine();
        stroke(&mut e, (10, 400), (20, 400));
        e.draw_point(100, 100, false);
        let first = e.active_color();
        assert_eq!(e.canvas().pixel(100, 100), first);
        let snapshots = e.history_len();

        e.select_color(2);
        for _ in 0..6 {
            e.draw_point(300, 100, false);
        }
        // Same stroke, new ink from the next segment on.
        assert!(e.stroke_active());
        assert_eq!(e.history_len(), snapshots);
        assert_ne!(first, e.active_color());
        assert_eq!(e.canvas().pixel(300, 100), e.active_color());
        assert_eq!(e.canvas().pixel(200, 100), e.active_color());
    }

    #[test]
    fn test_deserialize_roundtrip_and_mismatch() {
        let mut src = engine();
        stroke(&mut src, (10, 200), (300, 220));
        let bytes = src.serialize().unwrap();

        let mut dst = engine();
        dst.draw_point(500, 400, false);
        let before = pixels(&dst);

        let mut small = StrokeEngine::with_defaults(100, 100).unwrap();
        let small_before = pixels(&small);
        assert!(small.deserialize(&bytes).is_err());
        assert_eq!(pixels(&small), small_before);
        assert!(dst.deserialize(b"garbage").is_err());
        assert_eq!(pixels(&dst), before);

        dst.deserialize(&bytes).unwrap();
        assert_eq!(pixels(&dst), pixels(&src));
        // Loading is undoable.
        assert!(dst.undo());
        assert_eq!(pixels(&dst), before);
    }

    #[test]
    fn test_save_and_load_file() {
        let path = std::env::temp_dir().join(format!("air_canvas_test_{}.png", std::process::id()));
        let mut e = engine();
        stroke(&mut e, (10, 200), (300, 220));
        e.save_to_file(&path).unwrap();

        let mut other = engine();
        other.load_from_file(&path).unwrap();
        assert_eq!(pixels(&other), pixels(&e));
        let _ = fs::remove_file(&path);

        assert!(other.load_from_file(&path).is_err());
    }

    #[test]
    fn test_step_pointing_draws_and_missing_hand_ends_stroke() {
        let mut e = engine();
        let out = pose(&mut e, Pose::Pointing, 300, 300);
        assert!(out.drawing);
        assert!(!out.erasing);
        assert!(matches!(out.surface, SurfaceDelta::Stroked(_)));
        assert_eq!(out.pointer, Some(Point::new(300, 300)));
        // Pinch distance drives the brush size.
        assert_eq!(e.brush_size(), 30);

        for _ in 0..4 {
            let out = e.step(&FrameInput::no_hand());
            assert_eq!(out.surface, SurfaceDelta::Unchanged);
            assert!(e.stroke_active());
        }
        e.step(&FrameInput::no_hand());
        assert!(!e.stroke_active());
    }

    #[test]
    fn test_step_hover_does_not_draw() {
        let mut e = engine();
        let out = pose(&mut e, Pose::Peace, 300, 300);
        assert!(!out.drawing);
        assert!(e.canvas().is_empty());
    }

    #[test]
    fn test_step_pinch_erases() {
        let mut e = fixed_size_engine();
        e.set_brush_size(20);
        pose(&mut e, Pose::Pointing, 300, 300);
        for _ in 0..5 {
            e.step(&FrameInput::no_hand());
        }
        let out = pose(&mut e, Pose::PinchPoint, 300, 300);
        assert!(out.erasing);
        assert_eq!(e.canvas().pixel(300, 300), BACKGROUND);
    }

    #[test]
    fn test_step_toolbar_click_debounced() {
        let mut e = engine();
        let out = pose(&mut e, Pose::Pointing, 80, 40);
        assert!(out.in_toolbar);
        assert!(!out.drawing);
        assert_eq!(out.fired, Some(Trigger::Button(ToolbarAction::SelectColor(1))));
        assert_eq!(out.mode, Some(ModeDelta::Color(1)));
        assert_eq!(e.color_index(), 1);
        assert!(e.canvas().is_empty());

        // Within the click cooldown a different button does nothing.
        let out = pose(&mut e, Pose::Pointing, 30, 40);
        assert_eq!(out.fired, None);
        assert_eq!(e.color_index(), 1);

        for _ in 0..20 {
            e.step(&FrameInput::no_hand());
        }
        assert_eq!(e.click_cooldown(), 0);
        let eraser = e.toolbar().buttons()[8].rect;
        let out = pose(&mut e, Pose::Pointing, eraser.x0 + 2, 40);
        assert_eq!(out.mode, Some(ModeDelta::Eraser));
        assert_eq!(e.tool_mode(), ToolMode::Erase);
        assert_eq!(e.active_color(), BACKGROUND);
    }

    #[test]
    fn test_step_three_fingers_cycles_color() {
        let mut e = engine();
        e.set_tool_mode(ToolMode::Erase);
        let out = pose(&mut e, Pose::ThreeFingers, 300, 300);
        assert_eq!(out.fired, Some(Trigger::NextColor));
        assert_eq!(e.color_index(), 1);
        assert_eq!(e.tool_mode(), ToolMode::Draw);

        for _ in 0..(e.palette().len() * 25) {
            pose(&mut e, Pose::ThreeFingers, 300, 300);
        }
        assert!(e.color_index() < e.palette().len());
    }

    #[test]
    fn test_step_thumb_and_pinky_undoes() {
        let mut e = engine();
        stroke(&mut e, (10, 200), (50, 200));
        let before = pixels(&e);
        stroke(&mut e, (300, 300), (350, 300));

        let out = pose(&mut e, Pose::ThumbAndPinky, 400, 300);
        assert_eq!(out.fired, Some(Trigger::Undo));
        assert_eq!(out.surface, SurfaceDelta::Restored);
        assert_eq!(pixels(&e), before);
    }

    #[test]
    fn test_gesture_cooldown_blocks_repeats() {
        let mut e = engine();
        stroke(&mut e, (10, 200), (50, 200));

        let out = pose(&mut e, Pose::OpenPalm, 300, 300);
        assert_eq!(out.surface, SurfaceDelta::Cleared);
        assert_eq!(e.history_len(), 1);

        // A different one-shot while cooling down changes nothing.
        let before = pixels(&e);
        let out = pose(&mut e, Pose::ThumbAndPinky, 300, 300);
        assert_eq!(out.fired, None);
        assert_eq!(pixels(&e), before);
        assert_eq!(e.history_len(), 1);

        // Non-increasing down to zero while the palm is held.
        let mut last = e.gesture_cooldown();
        let mut clears = 0;
        while e.gesture_cooldown() > 0 {
            let out = pose(&mut e, Pose::OpenPalm, 300, 300);
            if out.fired == Some(Trigger::Clear) {
                clears += 1;
            }
            assert!(e.gesture_cooldown() <= last);
            last = e.gesture_cooldown();
        }
        assert_eq!(clears, 0);

        let out = pose(&mut e, Pose::OpenPalm, 300, 300);
        assert_eq!(out.fired, Some(Trigger::Clear));
    }

    #[test]
    fn test_clear_cooldown_length() {
        let mut e = engine();
        let mut clears = 0;
        for _ in 0..30 {
            if pose(&mut e, Pose::OpenPalm, 300, 300).fired == Some(Trigger::Clear) {
                clears += 1;
            }
        }
        assert_eq!(clears, 1);
        assert_eq!(pose(&mut e, Pose::OpenPalm, 300, 300).fired, Some(Trigger::Clear));
    }

    #[test]
    fn test_zero_sized_canvas_rejected() {
        for (w, h) in [(0, 0), (0, 10), (10, 0)] {
            let err = StrokeEngine::with_defaults(w, h).err();
            assert!(matches!(err, Some(Error::Config(_))));
        }
        // Smallest real canvas: any point clamps onto its single pixel.
        let mut e = StrokeEngine::with_defaults(1, 1).unwrap();
        assert!(e.draw_point(5, 5, false).is_some());
        assert_eq!(e.last_point(), Some(Point::new(0, 0)));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let cfg = EngineConfig { smoothing_window: 0, ..EngineConfig::default() };
        assert!(StrokeEngine::new(10, 10, cfg, GestureConfig::default(), ToolbarConfig::default()).is_err());
    }
}
