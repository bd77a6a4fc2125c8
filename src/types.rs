// Core types shared by the engine, the classifier and the window.

/// What the window shows each frame (camera + canvas + overlays).
#[derive(Clone)]
pub struct FrameBuffer {
    pub width: usize,      // how wide the frame is on screen (pixels)
    pub height: usize,     // how tall the frame is on screen (pixels)
    pub pixels: Vec<u32>,  // each entry is 0x00RRGGBB for minifb
}

impl FrameBuffer {
    /// A frame filled with one packed colour.
    pub fn filled(width: usize, height: usize, color: u32) -> Self {
        Self { width, height, pixels: vec![color; width * height] }
    }
}

/// 8-bit RGB triplet, the canvas colour unit.
pub type Rgb = [u8; 3];

/// Pack RGB into minifb's 0x00RRGGBB.
#[inline]
pub fn pack_rgb(c: Rgb) -> u32 {
    ((c[0] as u32) << 16) | ((c[1] as u32) << 8) | c[2] as u32
}

/// Split 0x00RRGGBB back into RGB.
#[inline]
pub fn unpack_rgb(px: u32) -> Rgb {
    [((px >> 16) & 0xFF) as u8, ((px >> 8) & 0xFF) as u8, (px & 0xFF) as u8]
}

/// Integer pixel position in canvas space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f32 {
        ((other.x - self.x) as f32).hypot((other.y - self.y) as f32)
    }
}

/// Axis-aligned rectangle, `x0,y0` inclusive and `x1,y1` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

impl Rect {
    pub fn width(&self) -> i32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> i32 {
        self.y1 - self.y0
    }

    /// Smallest rect covering both.
    pub fn union(self, other: Rect) -> Rect {
        Rect {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    /// Inclusive on every edge, matching how toolbar buttons are hit.
    pub fn contains_inclusive(&self, p: Point) -> bool {
        p.x >= self.x0 && p.x <= self.x1 && p.y >= self.y0 && p.y <= self.y1
    }
}

/// One labelled landmark from the hand detector, in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Keypoint {
    pub index: u8,
    pub x: i32,
    pub y: i32,
}

impl Keypoint {
    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Which hand the detector saw. Decides the sign of the thumb test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum Handedness {
    Left,
    #[default]
    Right,
}
