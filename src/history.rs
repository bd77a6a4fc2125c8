// Bounded undo stack of full canvas snapshots.
// Snapshots are owned copies: drawing on the live canvas afterwards never
// reaches into a stored one.

use image::RgbImage;
use std::collections::VecDeque;

pub struct UndoHistory {
    depth: usize,
    snapshots: VecDeque<RgbImage>,
}

impl UndoHistory {
    pub fn new(depth: usize) -> Self {
        let depth = depth.max(1);
        Self { depth, snapshots: VecDeque::with_capacity(depth + 1) }
    }

    /// Store a snapshot; the oldest is dropped when over capacity.
    pub fn push(&mut self, snapshot: RgbImage) {
        self.snapshots.push_back(snapshot);
        while self.snapshots.len() > self.depth {
            self.snapshots.pop_front();
        }
    }

    pub fn pop(&mut self) -> Option<RgbImage> {
        self.snapshots.pop_back()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.depth
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn marked(v: u8) -> RgbImage {
        RgbImage::from_pixel(2, 2, Rgb([v, v, v]))
    }

    #[test]
    fn test_lifo_order() {
        let mut h = UndoHistory::new(3);
        h.push(marked(1));
        h.push(marked(2));
        assert_eq!(h.pop().unwrap().get_pixel(0, 0)[0], 2);
        assert_eq!(h.pop().unwrap().get_pixel(0, 0)[0], 1);
        assert!(h.pop().is_none());
    }

    #[test]
    fn test_oldest_evicted_at_depth() {
        let mut h = UndoHistory::new(20);
        assert_eq!(h.depth(), 20);
        for v in 0..21u8 {
            h.push(marked(v));
            assert!(h.len() <= 20);
        }
        assert_eq!(h.len(), 20);

        let mut last = None;
        while let Some(s) = h.pop() {
            last = Some(s.get_pixel(0, 0)[0]);
        }
        // Snapshot 0 is gone for good.
        assert_eq!(last, Some(1));
    }

    #[test]
    fn test_snapshot_is_independent_copy() {
        let mut live = marked(5);
        let mut h = UndoHistory::new(2);
        h.push(live.clone());
        live.put_pixel(0, 0, Rgb([200, 0, 0]));
        assert_eq!(h.pop().unwrap().get_pixel(0, 0), &Rgb([5, 5, 5]));
    }
}
