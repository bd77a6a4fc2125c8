// Trailing window of raw pointer samples + weighted moving average.
// Visual: damps single-frame landmark jitter while still following the hand,
// because newer samples weigh up to twice as much as the oldest one.

use crate::types::Point;
use std::collections::VecDeque;

pub struct SmoothingBuffer {
    window: usize,
    points: VecDeque<Point>,
}

impl SmoothingBuffer {
    pub fn new(window: usize) -> Self {
        let window = window.max(1);
        Self { window, points: VecDeque::with_capacity(window) }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    /// Append a sample; once full, the oldest one falls out (FIFO).
    pub fn push(&mut self, p: Point) {
        if self.points.len() == self.window {
            self.points.pop_front();
        }
        self.points.push_back(p);
    }

    /// Weights rise linearly from 0.5 (oldest) to 1.0 (newest), normalised.
    /// Coordinates are truncated back to whole pixels.
    pub fn smoothed(&self) -> Option<Point> {
        let n = self.points.len();
        match n {
            0 => None,
            1 => self.points.front().copied(),
            _ => {
                let step = 0.5 / (n - 1) as f64;
                let total: f64 = (0..n).map(|i| 0.5 + step * i as f64).sum();
                let (sx, sy) = self.points.iter().enumerate().fold((0.0, 0.0), |(sx, sy), (i, p)| {
                    let w = 0.5 + step * i as f64;
                    (sx + p.x as f64 * w, sy + p.y as f64 * w)
                });
                Some(Point::new((sx / total) as i32, (sy / total) as i32))
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Point> {
        self.points.iter()
    }
}
