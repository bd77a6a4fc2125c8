//! Gesture classifier adapter.
//!
//! Pure functions from one frame's keypoints to finger states and named
//! gestures. A frame with no hand (or fewer than 21 keypoints) yields the
//! "no hand" answer everywhere: all fingers down, every predicate false,
//! distances zero.

use crate::config::GestureConfig;
use crate::types::{Handedness, Keypoint, Point};

// ============================================================================
// HAND LANDMARK INDICES
// ============================================================================

pub const WRIST: usize = 0;
pub const THUMB_IP: usize = 3;
pub const THUMB_TIP: usize = 4;
pub const INDEX_MCP: usize = 5;
pub const INDEX_PIP: usize = 6;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_TIP: usize = 12;
pub const RING_MCP: usize = 13;
pub const RING_PIP: usize = 14;
pub const RING_TIP: usize = 16;
pub const PINKY_MCP: usize = 17;
pub const PINKY_PIP: usize = 18;
pub const PINKY_TIP: usize = 20;

pub const HAND_LANDMARK_COUNT: usize = 21;

/// (tip, pip) pairs for the four vertical fingers.
const FINGER_JOINTS: [(usize, usize); 4] = [
    (INDEX_TIP, INDEX_PIP),
    (MIDDLE_TIP, MIDDLE_PIP),
    (RING_TIP, RING_PIP),
    (PINKY_TIP, PINKY_PIP),
];

const PALM_POINTS: [usize; 5] = [WRIST, INDEX_MCP, MIDDLE_MCP, RING_MCP, PINKY_MCP];

// ============================================================================
// FINGER STATE
// ============================================================================

/// Extended/curled flag per finger: thumb, index, middle, ring, pinky.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FingerState(pub [bool; 5]);

impl FingerState {
    pub fn thumb(&self) -> bool { self.0[0] }
    pub fn index(&self) -> bool { self.0[1] }
    pub fn middle(&self) -> bool { self.0[2] }
    pub fn ring(&self) -> bool { self.0[3] }
    pub fn pinky(&self) -> bool { self.0[4] }

    pub fn count(&self) -> usize {
        self.0.iter().filter(|up| **up).count()
    }

    pub fn none(&self) -> bool { self.count() == 0 }
    pub fn all(&self) -> bool { self.count() == 5 }

    /// True when exactly the given fingers are up.
    pub fn is_exactly(&self, pattern: [bool; 5]) -> bool {
        self.0 == pattern
    }
}

/// A usable hand is exactly one full skeleton.
pub fn has_hand(kps: &[Keypoint]) -> bool {
    kps.len() >= HAND_LANDMARK_COUNT
}

fn at(kps: &[Keypoint], idx: usize) -> Option<Point> {
    kps.get(idx).map(Keypoint::point)
}

/// Which fingers are extended.
///
/// A vertical finger is up when its tip sits above its PIP joint by more
/// than `cfg.finger_margin`. The thumb is tested horizontally against its IP
/// joint; the sign depends on which hand it is.
pub fn fingers_up(kps: &[Keypoint], handedness: Handedness, cfg: &GestureConfig) -> FingerState {
    if !has_hand(kps) {
        return FingerState::default();
    }
    let mut out = [false; 5];

    let (tip, ip) = (kps[THUMB_TIP], kps[THUMB_IP]);
    out[0] = match handedness {
        Handedness::Right => tip.x > ip.x,
        Handedness::Left => tip.x < ip.x,
    };

    for (slot, (tip, pip)) in out[1..].iter_mut().zip(FINGER_JOINTS) {
        *slot = kps[tip].y < kps[pip].y - cfg.finger_margin;
    }
    FingerState(out)
}

// ============================================================================
// DISTANCES & POSE HELPERS
// ============================================================================

/// Euclidean distance between two landmarks, 0 when either is missing.
pub fn finger_distance(kps: &[Keypoint], a: usize, b: usize) -> f32 {
    match (at(kps, a), at(kps, b)) {
        (Some(pa), Some(pb)) => pa.distance(pb),
        _ => 0.0,
    }
}

/// Thumb tip to index tip; the continuous "pinch" control value.
pub fn pinch_distance(kps: &[Keypoint]) -> f32 {
    finger_distance(kps, THUMB_TIP, INDEX_TIP)
}

pub fn is_pinch(kps: &[Keypoint], threshold: f32) -> bool {
    if kps.len() <= INDEX_TIP {
        return false;
    }
    pinch_distance(kps) < threshold
}

/// Mean of the wrist and the four knuckle bases.
pub fn palm_center(kps: &[Keypoint]) -> Option<Point> {
    if !has_hand(kps) {
        return None;
    }
    let (sx, sy) = PALM_POINTS
        .iter()
        .fold((0i32, 0i32), |(sx, sy), &i| (sx + kps[i].x, sy + kps[i].y));
    let n = PALM_POINTS.len() as f32;
    Some(Point::new((sx as f32 / n) as i32, (sy as f32 / n) as i32))
}

/// Wrist → middle knuckle angle in degrees (image y grows downwards).
pub fn hand_rotation(kps: &[Keypoint]) -> f32 {
    if !has_hand(kps) {
        return 0.0;
    }
    let dx = (kps[MIDDLE_MCP].x - kps[WRIST].x) as f32;
    let dy = (kps[MIDDLE_MCP].y - kps[WRIST].y) as f32;
    dy.atan2(dx).to_degrees()
}

// ============================================================================
// NAMED GESTURES
// ============================================================================

pub fn is_fist(f: FingerState) -> bool {
    f.none()
}

pub fn is_open_palm(f: FingerState) -> bool {
    f.all()
}

/// Index and middle up, ring and pinky down (thumb ignored).
pub fn is_peace_sign(f: FingerState) -> bool {
    f.index() && f.middle() && !f.ring() && !f.pinky()
}

pub fn is_pointing(f: FingerState) -> bool {
    f.is_exactly([false, true, false, false, false])
}

pub fn is_three_fingers(f: FingerState) -> bool {
    f.is_exactly([false, true, true, true, false])
}

pub fn is_thumb_and_pinky(f: FingerState) -> bool {
    f.is_exactly([true, false, false, false, true])
}

/// Thumb alone, and its tip higher than the wrist.
pub fn is_thumbs_up(kps: &[Keypoint], f: FingerState) -> bool {
    if !has_hand(kps) {
        return false;
    }
    f.is_exactly([true, false, false, false, false]) && kps[THUMB_TIP].y < kps[WRIST].y
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureKind {
    Point,
    Palm,
    Pinch,
    Peace,
    Fist,
    ThumbsUp,
}

/// Heuristic confidence in [0, 1] that the hand is doing `kind`.
pub fn gesture_confidence(kps: &[Keypoint], f: FingerState, kind: GestureKind) -> f32 {
    if !has_hand(kps) {
        return 0.0;
    }
    match kind {
        GestureKind::Point if is_pointing(f) => {
            // How far the index actually reaches above its knuckle.
            let extension = (kps[INDEX_MCP].y - kps[INDEX_TIP].y).abs() as f32;
            (extension / 100.0).min(1.0)
        }
        GestureKind::Palm if f.all() => 1.0,
        GestureKind::Palm if f.count() >= 4 => 0.7,
        _ => 0.0,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeAxis {
    Horizontal,
    Vertical,
}

/// Compare the index tip of the oldest and newest hands in `history`.
/// Entries without a hand (empty slices) break the swipe.
pub fn detect_swipe(history: &[Vec<Keypoint>], axis: SwipeAxis, threshold: i32) -> bool {
    let (Some(first), Some(last)) = (history.first(), history.last()) else {
        return false;
    };
    if history.len() < 2 {
        return false;
    }
    let (Some(a), Some(b)) = (at(first, INDEX_TIP), at(last, INDEX_TIP)) else {
        return false;
    };
    let movement = match axis {
        SwipeAxis::Horizontal => (b.x - a.x).abs(),
        SwipeAxis::Vertical => (b.y - a.y).abs(),
    };
    movement > threshold
}

// ============================================================================
// PER-FRAME BUNDLE
// ============================================================================

/// Everything the engine reads from one frame's hand.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HandFacts {
    pub present: bool,
    pub fingers: FingerState,
    /// Index fingertip, the drawing pointer.
    pub pointer: Option<Point>,
    pub pinch_distance: f32,
    pub pinch: bool,
}

impl HandFacts {
    pub fn open_palm(&self) -> bool { self.present && is_open_palm(self.fingers) }
    pub fn three_fingers(&self) -> bool { self.present && is_three_fingers(self.fingers) }
    pub fn thumb_and_pinky(&self) -> bool { self.present && is_thumb_and_pinky(self.fingers) }

    /// Index up and middle down: the "pen is on" pose (thumb/ring/pinky free).
    pub fn pen_down(&self) -> bool {
        self.present && self.fingers.index() && !self.fingers.middle()
    }
}

/// Classify one frame. `handedness` from the detector wins over the config.
pub fn classify(kps: &[Keypoint], handedness: Option<Handedness>, cfg: &GestureConfig) -> HandFacts {
    if !has_hand(kps) {
        return HandFacts::default();
    }
    let fingers = fingers_up(kps, handedness.unwrap_or(cfg.handedness), cfg);
    let pinch_distance = pinch_distance(kps);
    HandFacts {
        present: true,
        fingers,
        pointer: at(kps, INDEX_TIP),
        pinch_distance,
        pinch: pinch_distance < cfg.pinch_threshold,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::{Pose, synthesize_hand};

    fn cfg() -> GestureConfig {
        GestureConfig::default()
    }

    fn hand(pose: Pose) -> Vec<Keypoint> {
        synthesize_hand(pose, Point::new(400, 300), Handedness::Right)
    }

    fn fingers(pose: Pose) -> FingerState {
        fingers_up(&hand(pose), Handedness::Right, &cfg())
    }

    #[test]
    fn test_no_hand_defaults() {
        let facts = classify(&[], None, &cfg());
        assert_eq!(facts, HandFacts::default());
        assert!(!facts.pen_down());
        assert_eq!(fingers_up(&[], Handedness::Right, &cfg()), FingerState::default());
        assert_eq!(pinch_distance(&[]), 0.0);
        assert_eq!(palm_center(&[]), None);
        assert_eq!(hand_rotation(&[]), 0.0);
        assert!(!is_pinch(&[], 40.0));
        assert!(!is_thumbs_up(&[], FingerState([true, false, false, false, false])));
    }

    #[test]
    fn test_truncated_hand_is_no_hand() {
        let mut kps = hand(Pose::OpenPalm);
        kps.truncate(15);
        assert_eq!(fingers_up(&kps, Handedness::Right, &cfg()), FingerState::default());
        assert!(!classify(&kps, None, &cfg()).present);
    }

    #[test]
    fn test_pose_fingers() {
        assert!(is_pointing(fingers(Pose::Pointing)));
        assert!(is_open_palm(fingers(Pose::OpenPalm)));
        assert!(is_fist(fingers(Pose::Fist)));
        assert!(is_peace_sign(fingers(Pose::Peace)));
        assert!(is_three_fingers(fingers(Pose::ThreeFingers)));
        assert!(is_thumb_and_pinky(fingers(Pose::ThumbAndPinky)));
    }

    #[test]
    fn test_finger_margin_rejects_jitter() {
        let mut kps = hand(Pose::Fist);
        // Tip only 5px above its joint: still down with the default 10px margin.
        kps[INDEX_TIP].y = kps[INDEX_PIP].y - 5;
        assert!(!fingers_up(&kps, Handedness::Right, &cfg()).index());
        kps[INDEX_TIP].y = kps[INDEX_PIP].y - 11;
        assert!(fingers_up(&kps, Handedness::Right, &cfg()).index());
    }

    #[test]
    fn test_thumb_depends_on_handedness() {
        let kps = hand(Pose::OpenPalm);
        assert!(fingers_up(&kps, Handedness::Right, &cfg()).thumb());
        assert!(!fingers_up(&kps, Handedness::Left, &cfg()).thumb());

        let left = synthesize_hand(Pose::OpenPalm, Point::new(400, 300), Handedness::Left);
        assert!(fingers_up(&left, Handedness::Left, &cfg()).thumb());
        // Detector-reported handedness overrides the configured default.
        assert!(classify(&left, Some(Handedness::Left), &cfg()).fingers.all());
    }

    #[test]
    fn test_pinch() {
        let kps = hand(Pose::PinchPoint);
        assert!(is_pinch(&kps, 40.0));
        assert!(pinch_distance(&kps) < 35.0);
        assert!(!is_pinch(&hand(Pose::OpenPalm), 40.0));
        // Pinch-point still counts as pen down (thumb folded onto the index).
        assert!(classify(&kps, None, &cfg()).pen_down());
    }

    #[test]
    fn test_thumbs_up() {
        let kps = hand(Pose::ThumbsUp);
        let f = fingers_up(&kps, Handedness::Right, &cfg());
        assert!(is_thumbs_up(&kps, f));

        let mut low = kps.clone();
        low[THUMB_TIP].y = low[WRIST].y + 5;
        assert!(!is_thumbs_up(&low, f));
    }

    #[test]
    fn test_pointer_is_index_tip() {
        let facts = classify(&hand(Pose::Pointing), None, &cfg());
        assert_eq!(facts.pointer, Some(Point::new(400, 300)));
    }

    #[test]
    fn test_palm_center_and_rotation() {
        let mut kps = vec![Keypoint { index: 0, x: 0, y: 0 }; 21];
        for (n, k) in kps.iter_mut().enumerate() {
            k.index = n as u8;
        }
        kps[WRIST] = Keypoint { index: 0, x: 100, y: 200 };
        kps[INDEX_MCP] = Keypoint { index: 5, x: 110, y: 110 };
        kps[MIDDLE_MCP] = Keypoint { index: 9, x: 100, y: 100 };
        kps[RING_MCP] = Keypoint { index: 13, x: 90, y: 105 };
        kps[PINKY_MCP] = Keypoint { index: 17, x: 80, y: 115 };
        assert_eq!(palm_center(&kps), Some(Point::new(96, 126)));
        // Straight up in image space is -90 degrees.
        assert!((hand_rotation(&kps) + 90.0).abs() < 1e-3);
    }

    #[test]
    fn test_confidence() {
        let point = hand(Pose::Pointing);
        let c = gesture_confidence(&point, fingers(Pose::Pointing), GestureKind::Point);
        assert!(c > 0.5 && c <= 1.0);
        assert_eq!(gesture_confidence(&point, fingers(Pose::Pointing), GestureKind::Palm), 0.0);

        let palm = hand(Pose::OpenPalm);
        assert_eq!(gesture_confidence(&palm, fingers(Pose::OpenPalm), GestureKind::Palm), 1.0);
        let four = FingerState([false, true, true, true, true]);
        assert_eq!(gesture_confidence(&palm, four, GestureKind::Palm), 0.7);
        assert_eq!(gesture_confidence(&[], four, GestureKind::Palm), 0.0);
    }

    #[test]
    fn test_swipe() {
        let a = hand(Pose::Pointing);
        let b = synthesize_hand(Pose::Pointing, Point::new(550, 310), Handedness::Right);
        let history = vec![a.clone(), hand(Pose::Pointing), b];
        assert!(detect_swipe(&history, SwipeAxis::Horizontal, 100));
        assert!(!detect_swipe(&history, SwipeAxis::Vertical, 100));
        assert!(!detect_swipe(&history[..1], SwipeAxis::Horizontal, 100));
        assert!(!detect_swipe(&[a, Vec::new()], SwipeAxis::Horizontal, 0));
    }
}
