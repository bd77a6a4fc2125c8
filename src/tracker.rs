// Hand tracker boundary.
// The landmark model itself lives outside this crate: anything that can turn
// a frame into 21 normalised points implements `HandDetector`. The tracker
// turns those into pixel keypoints, steadies them with an EMA, and keeps
// detection statistics for the stats overlay.

use crate::config::TrackerConfig;
use crate::gesture::HAND_LANDMARK_COUNT;
use crate::types::{FrameBuffer, Handedness, Keypoint, Point, Rect};
use std::collections::VecDeque;

/// Skeleton edges, for the debug overlay.
pub const HAND_CONNECTIONS: [(usize, usize); 23] = [
    (0, 1), (1, 2), (2, 3), (3, 4),         // thumb
    (0, 5), (5, 6), (6, 7), (7, 8),         // index
    (0, 9), (9, 10), (10, 11), (11, 12),    // middle
    (0, 13), (13, 14), (14, 15), (15, 16),  // ring
    (0, 17), (17, 18), (18, 19), (19, 20),  // pinky
    (5, 9), (9, 13), (13, 17),              // palm
];

/// One detected hand, coordinates normalised to [0,1] of the frame.
#[derive(Debug, Clone, PartialEq)]
pub struct RawHand {
    pub landmarks: Vec<(f32, f32)>,
    pub handedness: Option<Handedness>,
}

/// Source of per-frame hand landmarks. `None` = no hand this frame.
pub trait HandDetector {
    fn detect(&mut self, frame: &FrameBuffer) -> Option<RawHand>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectionStats {
    pub total_frames: u64,
    pub successful_detections: u64,
    pub failed_detections: u64,
    /// Percent, 0..=100.
    pub success_rate: f32,
    pub currently_stable: bool,
    pub confidence: f32,
}

/// A tracked hand in canvas pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedHand {
    pub keypoints: Vec<Keypoint>,
    pub handedness: Option<Handedness>,
}

pub struct HandTracker {
    cfg: TrackerConfig,
    alpha: f32,
    stable: Option<Vec<Keypoint>>,
    handedness: Option<Handedness>,
    history: VecDeque<bool>,
    detections: u64,
    failures: u64,
    hand_now: bool,
}

impl HandTracker {
    pub fn new(cfg: TrackerConfig) -> Self {
        Self {
            alpha: cfg.stability_factor.clamp(0.0, 1.0),
            cfg,
            stable: None,
            handedness: None,
            history: VecDeque::with_capacity(cfg.history_size + 1),
            detections: 0,
            failures: 0,
            hand_now: false,
        }
    }

    /// Run the detector on `frame` and feed the result through `update`.
    pub fn track<D: HandDetector>(&mut self, detector: &mut D, frame: &FrameBuffer) -> Option<TrackedHand> {
        let raw = detector.detect(frame);
        self.update(raw, frame.width, frame.height)
    }

    /// Record one frame's detection result and return the steadied hand.
    pub fn update(&mut self, raw: Option<RawHand>, width: usize, height: usize) -> Option<TrackedHand> {
        let raw = raw.filter(|h| h.landmarks.len() >= HAND_LANDMARK_COUNT);
        self.hand_now = raw.is_some();
        if self.hand_now { self.detections += 1 } else { self.failures += 1 }
        self.history.push_back(self.hand_now);
        while self.history.len() > self.cfg.history_size {
            self.history.pop_front();
        }

        let Some(raw) = raw else {
            self.stable = None;
            self.handedness = None;
            return None;
        };

        let (w, h) = (width as f32, height as f32);
        let fresh: Vec<Keypoint> = raw
            .landmarks
            .iter()
            .take(HAND_LANDMARK_COUNT)
            .enumerate()
            .map(|(i, &(nx, ny))| Keypoint { index: i as u8, x: (nx * w) as i32, y: (ny * h) as i32 })
            .collect();

        // Exponential moving average against the previous steadied hand.
        let a = self.alpha as f64;
        let steadied = match self.stable.take() {
            None => fresh,
            Some(old) => old
                .iter()
                .zip(&fresh)
                .map(|(o, n)| Keypoint {
                    index: n.index,
                    x: (o.x as f64 * (1.0 - a) + n.x as f64 * a) as i32,
                    y: (o.y as f64 * (1.0 - a) + n.y as f64 * a) as i32,
                })
                .collect(),
        };

        self.stable = Some(steadied.clone());
        self.handedness = raw.handedness;
        Some(TrackedHand { keypoints: steadied, handedness: raw.handedness })
    }

    pub fn stability_factor(&self) -> f32 {
        self.alpha
    }

    /// 0.0 = very stable (laggy), 1.0 = raw detector output (jittery).
    pub fn set_stability_factor(&mut self, alpha: f32) {
        self.alpha = alpha.clamp(0.0, 1.0);
    }

    pub fn handedness(&self) -> Option<Handedness> {
        self.handedness
    }

    fn recent_ratio(&self) -> f32 {
        if self.history.is_empty() {
            return 0.0;
        }
        self.history.iter().filter(|d| **d).count() as f32 / self.history.len() as f32
    }

    /// Hand seen in at least `stable_ratio` of a full history window.
    pub fn is_hand_stable(&self) -> bool {
        self.history.len() >= self.cfg.history_size && self.recent_ratio() >= self.cfg.stable_ratio
    }

    pub fn hand_confidence(&self) -> f32 {
        if !self.hand_now {
            return 0.0;
        }
        if self.history.len() < 2 {
            return 0.5;
        }
        self.recent_ratio()
    }

    pub fn statistics(&self) -> DetectionStats {
        let total = self.detections + self.failures;
        DetectionStats {
            total_frames: total,
            successful_detections: self.detections,
            failed_detections: self.failures,
            success_rate: if total > 0 { self.detections as f32 / total as f32 * 100.0 } else { 0.0 },
            currently_stable: self.is_hand_stable(),
            confidence: self.hand_confidence(),
        }
    }

    pub fn reset_statistics(&mut self) {
        self.detections = 0;
        self.failures = 0;
        self.history.clear();
    }

    pub fn bbox_padding(&self) -> i32 {
        self.cfg.bbox_padding
    }
}

/// Bounding box around a hand, padded; the top-left is kept on-screen.
pub fn hand_bbox(kps: &[Keypoint], padding: i32) -> Option<Rect> {
    let x_min = kps.iter().map(|k| k.x).min()?;
    let x_max = kps.iter().map(|k| k.x).max()?;
    let y_min = kps.iter().map(|k| k.y).min()?;
    let y_max = kps.iter().map(|k| k.y).max()?;

    let x0 = (x_min - padding).max(0);
    let y0 = (y_min - padding).max(0);
    Some(Rect { x0, y0, x1: x_max + padding, y1: y_max + padding })
}

/* ---------- Puppet hand: a detector driven by a pointer + pose ---------- */

/// Hand shapes the puppet can make.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pose {
    Pointing,
    PinchPoint,
    Peace,
    OpenPalm,
    ThreeFingers,
    ThumbAndPinky,
    ThumbsUp,
    Fist,
}

impl Pose {
    /// Extended flags: thumb, index, middle, ring, pinky.
    fn extended(self) -> [bool; 5] {
        match self {
            Pose::Pointing | Pose::PinchPoint => [false, true, false, false, false],
            Pose::Peace => [false, true, true, false, false],
            Pose::OpenPalm => [true; 5],
            Pose::ThreeFingers => [false, true, true, true, false],
            Pose::ThumbAndPinky => [true, false, false, false, true],
            Pose::ThumbsUp => [true, false, false, false, false],
            Pose::Fist => [false; 5],
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Pose::Pointing => "POINT",
            Pose::PinchPoint => "PINCH",
            Pose::Peace => "HOVER",
            Pose::OpenPalm => "PALM",
            Pose::ThreeFingers => "THREE",
            Pose::ThumbAndPinky => "THUMB+PINKY",
            Pose::ThumbsUp => "THUMBS UP",
            Pose::Fist => "FIST",
        }
    }
}

// Right-hand skeleton around the wrist at (0,0), palm towards the camera.
// Per finger: extended joints then curled joints (pip, dip, tip).
const THUMB_BASE: [(i32, i32); 3] = [(25, -20), (45, -40), (60, -55)];
const THUMB_TIP_UP: (i32, i32) = (78, -68);
const THUMB_TIP_DOWN: (i32, i32) = (40, -60);

const FINGERS: [((i32, i32), [(i32, i32); 3], [(i32, i32); 3]); 4] = [
    ((20, -80), [(22, -110), (23, -130), (24, -150)], [(22, -100), (20, -85), (18, -75)]),
    ((0, -82), [(0, -117), (0, -140), (0, -162)], [(0, -102), (-2, -87), (-4, -77)]),
    ((-20, -78), [(-21, -108), (-22, -128), (-23, -146)], [(-20, -98), (-20, -84), (-20, -74)]),
    ((-38, -70), [(-41, -93), (-43, -108), (-45, -122)], [(-38, -88), (-37, -77), (-36, -68)]),
];

/// Build a 21-point hand in `pose` whose index fingertip sits at `pointer`.
pub fn synthesize_hand(pose: Pose, pointer: Point, handedness: Handedness) -> Vec<Keypoint> {
    let up = pose.extended();
    let mut pts: Vec<(i32, i32)> = Vec::with_capacity(HAND_LANDMARK_COUNT);

    pts.push((0, 0));
    pts.extend_from_slice(&THUMB_BASE);
    pts.push(if up[0] { THUMB_TIP_UP } else { THUMB_TIP_DOWN });
    for (finger, (mcp, ext, curl)) in FINGERS.iter().enumerate() {
        pts.push(*mcp);
        pts.extend_from_slice(if up[finger + 1] { ext } else { curl });
    }

    if pose == Pose::PinchPoint {
        // Thumb tip folded onto the index tip.
        let (ix, iy) = pts[8];
        pts[4] = (ix + 10, iy + 8);
    }

    let flip = if handedness == Handedness::Left { -1 } else { 1 };
    let (tx, ty) = (pts[8].0 * flip, pts[8].1);
    pts.iter()
        .enumerate()
        .map(|(i, &(x, y))| Keypoint {
            index: i as u8,
            x: pointer.x + x * flip - tx,
            y: pointer.y + y - ty,
        })
        .collect()
}

/// Detector that reports a synthetic hand: the mouse stands in for the
/// camera model in the binary, tests drive it directly.
pub struct PuppetHand {
    pub pose: Option<Pose>,
    pub pointer: Point,
    pub handedness: Handedness,
}

impl PuppetHand {
    pub fn new(handedness: Handedness) -> Self {
        Self { pose: None, pointer: Point::default(), handedness }
    }

    pub fn set(&mut self, pose: Option<Pose>, pointer: Point) {
        self.pose = pose;
        self.pointer = pointer;
    }
}

impl HandDetector for PuppetHand {
    fn detect(&mut self, frame: &FrameBuffer) -> Option<RawHand> {
        let pose = self.pose?;
        let (w, h) = (frame.width.max(1) as f32, frame.height.max(1) as f32);
        // Pixel centres, so truncation maps straight back to the same pixel.
        let landmarks = synthesize_hand(pose, self.pointer, self.handedness)
            .iter()
            .map(|k| ((k.x as f32 + 0.5) / w, (k.y as f32 + 0.5) / h))
            .collect();
        Some(RawHand { landmarks, handedness: Some(self.handedness) })
    }
}
