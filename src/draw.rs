// Window + software drawing utilities.
// Visual effects provided here:
// 1) A window that shows the camera with your drawing laid over it.
// 2) The toolbar strip, the info / stats / help panels and the hand cursor.
// 3) A debug view of the tracked hand (skeleton, box, gesture name).
// 4) A tiny 5x7 bitmap font to render all of that text.

use crate::engine::{FrameOutcome, StrokeEngine, ToolMode};
use crate::error::Error;
use crate::gamma::GammaLut;
use crate::gesture::{self, GestureKind, HandFacts, SwipeAxis};
use crate::toolbar::ToolbarAction;
use crate::tracker::{self, DetectionStats, HAND_CONNECTIONS, Pose, TrackedHand};
use crate::types::{FrameBuffer, Handedness, Keypoint, Point, Rect, pack_rgb, unpack_rgb};
use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};

const WHITE: u32 = 0x00_FF_FF_FF;
const BLACK: u32 = 0x00_00_00_00;
const YELLOW: u32 = 0x00_FF_CC_33;
const GREY: u32 = 0x00_50_50_58;
const SKELETON: u32 = 0x00_33_DD_66;
const JOINT: u32 = 0x00_FF_44_44;
const BBOX: u32 = 0x00_33_CC_FF;

/// One-shot keyboard commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    ToggleDebug,
    ToggleStats,
    ToggleInstructions,
    ResetStats,
    Help,
    StabilityUp,
    StabilityDown,
    Save,
    Load,
}

const COMMAND_KEYS: [(Key, Command); 11] = [
    (Key::D, Command::ToggleDebug),
    (Key::S, Command::ToggleStats),
    (Key::I, Command::ToggleInstructions),
    (Key::R, Command::ResetStats),
    (Key::H, Command::Help),
    (Key::Equal, Command::StabilityUp),
    (Key::NumPadPlus, Command::StabilityUp),
    (Key::Minus, Command::StabilityDown),
    (Key::NumPadMinus, Command::StabilityDown),
    (Key::W, Command::Save),
    (Key::L, Command::Load),
];

/// Held keys that switch the puppet hand's pose (checked in this order).
const POSE_KEYS: [(Key, Pose); 5] = [
    (Key::P, Pose::PinchPoint),
    (Key::O, Pose::OpenPalm),
    (Key::T, Pose::ThreeFingers),
    (Key::U, Pose::ThumbAndPinky),
    (Key::F, Pose::Fist),
];

/// Help text, shown in the instructions panel and logged on `H`.
pub const HELP_LINES: [&str; 14] = [
    "HOLD LEFT MOUSE - DRAW (POINTING)",
    "MOVE - HOVER (PEACE SIGN)",
    "HOLD P - PINCH: ERASE",
    "HOLD O - OPEN PALM: CLEAR",
    "HOLD T - THREE FINGERS: NEXT COLOR",
    "HOLD U - THUMB+PINKY: UNDO",
    "HOLD F - FIST",
    "D - DEBUG HAND VIEW",
    "S - STATS   I - THIS PANEL",
    "R - RESET STATS   H - HELP TO LOG",
    "+/- STABILITY",
    "W - SAVE   L - LOAD",
    "POINT AT THE TOP BAR TO PICK A TOOL",
    "ESC - QUIT",
];

pub struct Drawer {
    window: Window, // the on-screen window you see
}

impl Drawer {
    /// Create a window sized to the camera feed.
    /// Visual: a new empty window appears with your chosen title.
    pub fn new(title: &str, width: usize, height: usize) -> Result<Self, Error> {
        let window = Window::new(title, width, height, WindowOptions::default())
            .map_err(|e| Error::WindowInit(e.to_string()))?;
        Ok(Self { window })
    }

    /// Push the pixels for this frame to the screen.
    /// Visual: the window immediately displays the new image.
    pub fn present(&mut self, framebuffer: &FrameBuffer) -> Result<(), Error> {
        self.window
            .update_with_buffer(&framebuffer.pixels, framebuffer.width, framebuffer.height)
            .map_err(|e| Error::WindowUpdate(e.to_string()))?;
        Ok(())
    }

    /// Returns false when the user closes the window (so we can stop the loop).
    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    pub fn esc_pressed(&self) -> bool {
        self.window.is_key_down(Key::Escape)
    }

    /// Mouse position in window pixels, `None` while it is outside.
    /// Visual: the puppet hand vanishes when the mouse leaves the window.
    pub fn mouse_pos(&self) -> Option<Point> {
        self.window
            .get_mouse_pos(MouseMode::Discard)
            .map(|(x, y)| Point::new(x as i32, y as i32))
    }

    pub fn left_mouse_down(&self) -> bool {
        self.window.get_mouse_down(MouseButton::Left)
    }

    /// Pose for the puppet hand this frame: a held pose key wins, then the
    /// left button (pointing), otherwise a hovering peace sign.
    pub fn puppet_pose(&self) -> Pose {
        POSE_KEYS
            .iter()
            .find(|(key, _)| self.window.is_key_down(*key))
            .map(|(_, pose)| *pose)
            .unwrap_or(if self.left_mouse_down() { Pose::Pointing } else { Pose::Peace })
    }

    /// Commands whose key went down since the last frame.
    pub fn commands(&self) -> Vec<Command> {
        COMMAND_KEYS
            .iter()
            .filter(|(key, _)| self.window.is_key_pressed(*key, KeyRepeat::No))
            .map(|(_, cmd)| *cmd)
            .collect()
    }
}

/* ---------- Software drawing: pixels, lines, rects, circles ---------- */

/// Put a pixel on the framebuffer if (x,y) is inside bounds.
/// Visual: the exact pixel at (x,y) changes color.
#[inline]
fn put_pixel(fb: &mut FrameBuffer, x: i32, y: i32, color: u32) {
    if x < 0 || y < 0 {
        return;
    }
    let (x, y) = (x as usize, y as usize);
    if x >= fb.width || y >= fb.height {
        return;
    }
    let idx = y * fb.width + x;
    fb.pixels[idx] = color;
}

/// Draw a thin line between (x0,y0) and (x1,y1) using Bresenham.
/// Visual: a straight 1-pixel line appears on top of the camera image.
pub fn draw_line(fb: &mut FrameBuffer, x0: i32, y0: i32, x1: i32, y1: i32, color: u32) {
    let (mut x0, mut y0) = (x0, y0);
    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    loop {
        put_pixel(fb, x0, y0, color);
        if x0 == x1 && y0 == y1 { break; }
        let e2 = 2 * err;
        if e2 >= dy { err += dy; x0 += sx; }
        if e2 <= dx { err += dx; y0 += sy; }
    }
}

/// Small "+" with a gap at the centre.
/// Visual: marks where the fingertip hovers without drawing.
pub fn draw_crosshair(fb: &mut FrameBuffer, cx: i32, cy: i32, size: i32, color: u32) {
    draw_line(fb, cx - size, cy, cx - 2, cy, color);
    draw_line(fb, cx + 2, cy, cx + size, cy, color);
    draw_line(fb, cx, cy - size, cx, cy - 2, color);
    draw_line(fb, cx, cy + 2, cx, cy + size, color);
    put_pixel(fb, cx, cy, color);
}

/// Clip a rect to the framebuffer.
fn clip(fb: &FrameBuffer, r: Rect) -> Rect {
    Rect {
        x0: r.x0.max(0),
        y0: r.y0.max(0),
        x1: r.x1.min(fb.width as i32),
        y1: r.y1.min(fb.height as i32),
    }
}

pub fn fill_rect(fb: &mut FrameBuffer, r: Rect, color: u32) {
    let c = clip(fb, r);
    for y in c.y0..c.y1 {
        let row = y as usize * fb.width;
        for x in c.x0..c.x1 {
            fb.pixels[row + x as usize] = color;
        }
    }
}

/// Translucent fill, blended in linear light.
/// Visual: a dark glass panel the camera still shows through.
pub fn blend_rect(fb: &mut FrameBuffer, r: Rect, color: u32, alpha: f32, lut: &GammaLut) {
    let c = clip(fb, r);
    let src = unpack_rgb(color);
    for y in c.y0..c.y1 {
        let row = y as usize * fb.width;
        for x in c.x0..c.x1 {
            let px = &mut fb.pixels[row + x as usize];
            *px = pack_rgb(lut.mix(unpack_rgb(*px), src, alpha));
        }
    }
}

/// Rectangle border `thickness` pixels wide, drawn inwards.
pub fn draw_rect_outline(fb: &mut FrameBuffer, r: Rect, color: u32, thickness: i32) {
    let t = thickness.max(1);
    fill_rect(fb, Rect { x0: r.x0, y0: r.y0, x1: r.x1, y1: r.y0 + t }, color);
    fill_rect(fb, Rect { x0: r.x0, y0: r.y1 - t, x1: r.x1, y1: r.y1 }, color);
    fill_rect(fb, Rect { x0: r.x0, y0: r.y0, x1: r.x0 + t, y1: r.y1 }, color);
    fill_rect(fb, Rect { x0: r.x1 - t, y0: r.y0, x1: r.x1, y1: r.y1 }, color);
}

/// 1-pixel circle (midpoint algorithm).
pub fn draw_circle(fb: &mut FrameBuffer, c: Point, radius: i32, color: u32) {
    let mut x = radius.max(0);
    let mut y = 0;
    let mut err = 1 - x;
    while x >= y {
        for (dx, dy) in [(x, y), (y, x), (-y, x), (-x, y), (-x, -y), (-y, -x), (y, -x), (x, -y)] {
            put_pixel(fb, c.x + dx, c.y + dy, color);
        }
        y += 1;
        if err < 0 {
            err += 2 * y + 1;
        } else {
            x -= 1;
            err += 2 * (y - x) + 1;
        }
    }
}

pub fn fill_circle(fb: &mut FrameBuffer, c: Point, radius: i32, color: u32) {
    let r = radius.max(0);
    for dy in -r..=r {
        for dx in -r..=r {
            if dx * dx + dy * dy <= r * r {
                put_pixel(fb, c.x + dx, c.y + dy, color);
            }
        }
    }
}

/* ---------- 5x7 bitmap font ---------- */

/// Return a 5x7 glyph bitmap. Lowercase is drawn as uppercase.
/// Each u8 is a row; the low 5 bits are the pixels (bit 4 = leftmost).
fn glyph5x7(ch: char) -> Option<[u8; 7]> {
    macro_rules! g { ($a:expr,$b:expr,$c:expr,$d:expr,$e:expr,$f:expr,$g:expr) => {
        Some([$a,$b,$c,$d,$e,$f,$g])
    }; }

    match ch.to_ascii_uppercase() {
        '0' => g!(0b01110,0b10001,0b10011,0b10101,0b11001,0b10001,0b01110),
        '1' => g!(0b00100,0b01100,0b00100,0b00100,0b00100,0b00100,0b01110),
        '2' => g!(0b01110,0b10001,0b00001,0b00010,0b00100,0b01000,0b11111),
        '3' => g!(0b11110,0b00001,0b00001,0b01110,0b00001,0b00001,0b11110),
        '4' => g!(0b00010,0b00110,0b01010,0b10010,0b11111,0b00010,0b00010),
        '5' => g!(0b11111,0b10000,0b11110,0b00001,0b00001,0b10001,0b01110),
        '6' => g!(0b00110,0b01000,0b10000,0b11110,0b10001,0b10001,0b01110),
        '7' => g!(0b11111,0b00001,0b00010,0b00100,0b01000,0b01000,0b01000),
        '8' => g!(0b01110,0b10001,0b10001,0b01110,0b10001,0b10001,0b01110),
        '9' => g!(0b01110,0b10001,0b10001,0b01111,0b00001,0b00010,0b01100),

        'A' => g!(0b01110,0b10001,0b10001,0b11111,0b10001,0b10001,0b10001),
        'B' => g!(0b11110,0b10001,0b10001,0b11110,0b10001,0b10001,0b11110),
        'C' => g!(0b01110,0b10001,0b10000,0b10000,0b10000,0b10001,0b01110),
        'D' => g!(0b11100,0b10010,0b10001,0b10001,0b10001,0b10010,0b11100),
        'E' => g!(0b11111,0b10000,0b10000,0b11110,0b10000,0b10000,0b11111),
        'F' => g!(0b11111,0b10000,0b10000,0b11110,0b10000,0b10000,0b10000),
        'G' => g!(0b01110,0b10001,0b10000,0b10111,0b10001,0b10001,0b01111),
        'H' => g!(0b10001,0b10001,0b10001,0b11111,0b10001,0b10001,0b10001),
        'I' => g!(0b01110,0b00100,0b00100,0b00100,0b00100,0b00100,0b01110),
        'J' => g!(0b00111,0b00010,0b00010,0b00010,0b00010,0b10010,0b01100),
        'K' => g!(0b10001,0b10010,0b10100,0b11000,0b10100,0b10010,0b10001),
        'L' => g!(0b10000,0b10000,0b10000,0b10000,0b10000,0b10000,0b11111),
        'M' => g!(0b10001,0b11011,0b10101,0b10101,0b10001,0b10001,0b10001),
        'N' => g!(0b10001,0b10001,0b11001,0b10101,0b10011,0b10001,0b10001),
        'O' => g!(0b01110,0b10001,0b10001,0b10001,0b10001,0b10001,0b01110),
        'P' => g!(0b11110,0b10001,0b10001,0b11110,0b10000,0b10000,0b10000),
        'Q' => g!(0b01110,0b10001,0b10001,0b10001,0b10101,0b10010,0b01101),
        'R' => g!(0b11110,0b10001,0b10001,0b11110,0b10100,0b10010,0b10001),
        'S' => g!(0b01111,0b10000,0b10000,0b01110,0b00001,0b00001,0b11110),
        'T' => g!(0b11111,0b00100,0b00100,0b00100,0b00100,0b00100,0b00100),
        'U' => g!(0b10001,0b10001,0b10001,0b10001,0b10001,0b10001,0b01110),
        'V' => g!(0b10001,0b10001,0b10001,0b10001,0b10001,0b01010,0b00100),
        'W' => g!(0b10001,0b10001,0b10001,0b10101,0b10101,0b10101,0b01010),
        'X' => g!(0b10001,0b10001,0b01010,0b00100,0b01010,0b10001,0b10001),
        'Y' => g!(0b10001,0b10001,0b01010,0b00100,0b00100,0b00100,0b00100),
        'Z' => g!(0b11111,0b00001,0b00010,0b00100,0b01000,0b10000,0b11111),

        ' ' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00000,0b00000),
        '|' => g!(0b00100,0b00100,0b00100,0b00100,0b00100,0b00100,0b00100),
        ':' => g!(0b00000,0b00100,0b00000,0b00000,0b00100,0b00000,0b00000),
        '.' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00100,0b00000),
        ',' => g!(0b00000,0b00000,0b00000,0b00000,0b00110,0b00100,0b01000),
        '-' => g!(0b00000,0b00000,0b00000,0b11111,0b00000,0b00000,0b00000),
        '+' => g!(0b00000,0b00100,0b00100,0b11111,0b00100,0b00100,0b00000),
        '=' => g!(0b00000,0b00000,0b11111,0b00000,0b11111,0b00000,0b00000),
        '/' => g!(0b00001,0b00001,0b00010,0b00100,0b01000,0b10000,0b10000),
        '%' => g!(0b11000,0b11001,0b00010,0b00100,0b01000,0b10011,0b00011),
        '(' => g!(0b00010,0b00100,0b01000,0b01000,0b01000,0b00100,0b00010),
        ')' => g!(0b01000,0b00100,0b00010,0b00010,0b00010,0b00100,0b01000),
        '!' => g!(0b00100,0b00100,0b00100,0b00100,0b00100,0b00000,0b00100),
        '?' => g!(0b01110,0b10001,0b00001,0b00010,0b00100,0b00000,0b00100),
        '\'' => g!(0b00100,0b00100,0b01000,0b00000,0b00000,0b00000,0b00000),
        '_' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00000,0b11111),
        '<' => g!(0b00010,0b00100,0b01000,0b10000,0b01000,0b00100,0b00010),
        '>' => g!(0b01000,0b00100,0b00010,0b00001,0b00010,0b00100,0b01000),

        _ => None,
    }
}

/// Draw a single glyph at (x,y), each font pixel `scale`×`scale`.
/// Visual: a glyph with a 1-font-pixel black shadow for contrast.
fn draw_char(fb: &mut FrameBuffer, x: i32, y: i32, ch: char, color: u32, scale: i32) {
    let Some(rows) = glyph5x7(ch) else {
        return;
    };
    for (offset, c) in [(scale, BLACK), (0, color)] {
        for (ry, rowbits) in rows.iter().enumerate() {
            for rx in 0..5 {
                if (rowbits & (1 << (4 - rx))) != 0 {
                    let px = x + rx * scale + offset;
                    let py = y + ry as i32 * scale + offset;
                    fill_rect(fb, Rect { x0: px, y0: py, x1: px + scale, y1: py + scale }, c);
                }
            }
        }
    }
}

/// Width in pixels of `text` at `scale`.
pub fn text_width(text: &str, scale: i32) -> i32 {
    text.chars().count() as i32 * 6 * scale
}

pub fn draw_text(fb: &mut FrameBuffer, mut x: i32, y: i32, text: &str, color: u32, scale: i32) {
    let scale = scale.max(1);
    for ch in text.chars() {
        draw_char(fb, x, y, ch, color, scale);
        x += 6 * scale; // 5 pixels glyph width + 1 pixel spacing
    }
}

/// Draw a text string using 5x7 glyphs at scale 1.
pub fn draw_text_5x7(fb: &mut FrameBuffer, x: i32, y: i32, text: &str, color: u32) {
    draw_text(fb, x, y, text, color, 1);
}

/* ---------- Overlays ---------- */

fn button_label(action: ToolbarAction, engine: &StrokeEngine) -> String {
    match action {
        ToolbarAction::SelectColor(i) => engine.palette()[i].name.clone(),
        ToolbarAction::Eraser => "ERASER".to_string(),
        ToolbarAction::Clear => "CLEAR".to_string(),
        ToolbarAction::Undo => "UNDO".to_string(),
    }
}

/// Button strip along the top.
/// Visual: coloured swatches and ERASER / CLEAR / UNDO on a dark band; the
/// active tool gets a white frame, the button under the fingertip a yellow one.
pub fn render_toolbar(fb: &mut FrameBuffer, engine: &StrokeEngine, pointer: Option<Point>, lut: &GammaLut) {
    let bar = engine.toolbar();
    blend_rect(fb, Rect { x0: 0, y0: 0, x1: fb.width as i32, y1: bar.height() }, BLACK, 0.55, lut);

    let hovered = pointer.and_then(|p| bar.hit_test(p));
    for button in bar.buttons() {
        let fill = match button.action {
            ToolbarAction::SelectColor(i) => pack_rgb(engine.palette()[i].rgb),
            _ => GREY,
        };
        fill_rect(fb, button.rect, fill);

        let active = match button.action {
            ToolbarAction::SelectColor(i) => engine.tool_mode() == ToolMode::Draw && engine.color_index() == i,
            ToolbarAction::Eraser => engine.tool_mode() == ToolMode::Erase,
            _ => false,
        };
        if active {
            draw_rect_outline(fb, button.rect, WHITE, 3);
        } else if hovered == Some(button.action) {
            draw_rect_outline(fb, button.rect, YELLOW, 2);
        }

        let label = button_label(button.action, engine);
        let lx = button.rect.x0 + (button.rect.width() - text_width(&label, 1)).max(0) / 2;
        let ly = button.rect.y1 - 12;
        draw_text_5x7(fb, lx, ly, &label, WHITE);
    }
}

/// Current tool, colour, size and undo depth in the bottom-left corner.
pub fn render_info_panel(fb: &mut FrameBuffer, engine: &StrokeEngine, fps: f32, lut: &GammaLut) {
    let h = fb.height as i32;
    let panel = Rect { x0: 10, y0: h - 100, x1: 230, y1: h - 10 };
    blend_rect(fb, panel, BLACK, 0.6, lut);

    let (tool, size) = match engine.tool_mode() {
        ToolMode::Draw => ("DRAW", engine.brush_size()),
        ToolMode::Erase => ("ERASER", engine.eraser_size()),
    };
    let x = panel.x0 + 10;
    draw_text(fb, x, panel.y0 + 10, &format!("TOOL: {tool}"), WHITE, 2);
    draw_text_5x7(fb, x, panel.y0 + 34, &format!("COLOR: {}", engine.color_name()), WHITE);
    let swatch = Rect { x0: panel.x1 - 40, y0: panel.y0 + 30, x1: panel.x1 - 12, y1: panel.y0 + 44 };
    fill_rect(fb, swatch, pack_rgb(engine.palette()[engine.color_index()].rgb));
    draw_text_5x7(fb, x, panel.y0 + 50, &format!("SIZE: {size}"), WHITE);
    draw_text_5x7(fb, x, panel.y0 + 64, &format!("UNDO: {}", engine.history_len()), WHITE);
    draw_text_5x7(fb, x, panel.y0 + 78, &format!("FPS: {fps:.1}"), WHITE);
}

/// Detection statistics in the top-right, under the toolbar.
pub fn render_stats(fb: &mut FrameBuffer, stats: &DetectionStats, stability: f32, top: i32, lut: &GammaLut) {
    let w = fb.width as i32;
    let panel = Rect { x0: w - 230, y0: top + 10, x1: w - 10, y1: top + 110 };
    blend_rect(fb, panel, BLACK, 0.6, lut);

    let lines = [
        format!("FRAMES: {}", stats.total_frames),
        format!("DETECTED: {}", stats.successful_detections),
        format!("MISSED: {}", stats.failed_detections),
        format!("SUCCESS: {:.1}%", stats.success_rate),
        format!("STABLE: {}", if stats.currently_stable { "YES" } else { "NO" }),
        format!("CONFIDENCE: {:.2}", stats.confidence),
        format!("STABILITY: {stability:.1}"),
    ];
    for (i, line) in lines.iter().enumerate() {
        draw_text_5x7(fb, panel.x0 + 10, panel.y0 + 8 + i as i32 * 13, line, WHITE);
    }
}

/// Help panel centred below the toolbar.
pub fn render_instructions(fb: &mut FrameBuffer, top: i32, lut: &GammaLut) {
    let width = HELP_LINES.iter().map(|l| text_width(l, 1)).max().unwrap_or(0) + 30;
    let height = HELP_LINES.len() as i32 * 13 + 36;
    let x0 = (fb.width as i32 - width).max(0) / 2;
    let panel = Rect { x0, y0: top + 20, x1: x0 + width, y1: top + 20 + height };
    blend_rect(fb, panel, BLACK, 0.7, lut);
    draw_text(fb, panel.x0 + 15, panel.y0 + 8, "AIR CANVAS", YELLOW, 2);
    for (i, line) in HELP_LINES.iter().enumerate() {
        draw_text_5x7(fb, panel.x0 + 15, panel.y0 + 30 + i as i32 * 13, line, WHITE);
    }
}

/// Name of what the hand is doing plus the matching confidence, if any.
fn describe_hand(kps: &[Keypoint], facts: &HandFacts) -> (&'static str, Option<GestureKind>) {
    let f = facts.fingers;
    if gesture::is_fist(f) {
        ("FIST", Some(GestureKind::Fist))
    } else if facts.open_palm() {
        ("OPEN PALM: CLEAR", Some(GestureKind::Palm))
    } else if facts.three_fingers() {
        ("THREE: NEXT COLOR", None)
    } else if facts.thumb_and_pinky() {
        ("THUMB+PINKY: UNDO", None)
    } else if gesture::is_thumbs_up(kps, f) {
        ("THUMBS UP", Some(GestureKind::ThumbsUp))
    } else if facts.pen_down() && facts.pinch {
        ("PINCH: ERASE", Some(GestureKind::Pinch))
    } else if gesture::is_pointing(f) || facts.pen_down() {
        ("POINT: DRAW", Some(GestureKind::Point))
    } else if gesture::is_peace_sign(f) {
        ("PEACE: HOVER", Some(GestureKind::Peace))
    } else {
        ("HAND", None)
    }
}

/// Debug view of the tracked hand.
/// Visual: green bones, red joints, a cyan box around the hand and a caption
/// with handedness, gesture, rotation and any swipe.
pub fn render_hand_debug(
    fb: &mut FrameBuffer,
    hand: &TrackedHand,
    facts: &HandFacts,
    swipe: Option<SwipeAxis>,
    bbox_padding: i32,
) {
    let kps = &hand.keypoints;
    for &(a, b) in HAND_CONNECTIONS.iter() {
        if let (Some(pa), Some(pb)) = (kps.get(a), kps.get(b)) {
            draw_line(fb, pa.x, pa.y, pb.x, pb.y, SKELETON);
        }
    }
    for k in kps {
        fill_circle(fb, k.point(), 3, JOINT);
    }
    if let Some(c) = gesture::palm_center(kps) {
        draw_circle(fb, c, 6, YELLOW);
    }

    let Some(bbox) = tracker::hand_bbox(kps, bbox_padding) else {
        return;
    };
    draw_rect_outline(fb, bbox, BBOX, 2);

    let side = match hand.handedness {
        Some(Handedness::Left) => "LEFT",
        Some(Handedness::Right) => "RIGHT",
        None => "UNKNOWN",
    };
    let (label, kind) = describe_hand(kps, facts);
    let confidence = kind.map(|k| gesture::gesture_confidence(kps, facts.fingers, k)).unwrap_or(0.0);

    let mut lines = vec![
        format!("{side} HAND"),
        format!("{label} {confidence:.2}"),
        format!("ROT {:.0} FINGERS {}", gesture::hand_rotation(kps), facts.fingers.count()),
    ];
    match swipe {
        Some(SwipeAxis::Horizontal) => lines.push("SWIPE LEFT/RIGHT".to_string()),
        Some(SwipeAxis::Vertical) => lines.push("SWIPE UP/DOWN".to_string()),
        None => {}
    }
    let y0 = (bbox.y0 - lines.len() as i32 * 12 - 4).max(0);
    for (i, line) in lines.iter().enumerate() {
        draw_text_5x7(fb, bbox.x0, y0 + i as i32 * 12, line, BBOX);
    }
}

/// Fingertip cursor.
/// Visual: a filled dot in the ink colour while drawing, a white ring the
/// size of the eraser while erasing, a yellow crosshair while hovering.
pub fn render_cursor(fb: &mut FrameBuffer, outcome: &FrameOutcome, engine: &StrokeEngine) {
    let Some(p) = outcome.pointer else {
        return;
    };
    if outcome.drawing && outcome.erasing {
        draw_circle(fb, p, (engine.eraser_size() / 2) as i32, WHITE);
        draw_crosshair(fb, p.x, p.y, 6, WHITE);
    } else if outcome.drawing {
        let r = (engine.brush_size() / 2).max(2) as i32;
        fill_circle(fb, p, r, pack_rgb(engine.active_color()));
        draw_circle(fb, p, r + 1, WHITE);
    } else {
        draw_crosshair(fb, p.x, p.y, 12, YELLOW);
    }
}
