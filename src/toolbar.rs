// Reserved UI strip along the top of the frame.
// Layout: one button per palette colour, then ERASER, CLEAR, UNDO.
// Pure geometry; the window module paints it, the engine hit-tests it.

use crate::config::ToolbarConfig;
use crate::types::{Point, Rect};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolbarAction {
    SelectColor(usize),
    Eraser,
    Clear,
    Undo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Button {
    pub rect: Rect,
    pub action: ToolbarAction,
}

pub struct Toolbar {
    cfg: ToolbarConfig,
    buttons: Vec<Button>,
}

impl Toolbar {
    /// Lay out `palette_len + 3` buttons across `frame_width`; buttons
    /// narrow down (never below 1px) when the frame is too small for them.
    pub fn new(frame_width: i32, palette_len: usize, cfg: ToolbarConfig) -> Self {
        let actions: Vec<ToolbarAction> = (0..palette_len)
            .map(ToolbarAction::SelectColor)
            .chain([ToolbarAction::Eraser, ToolbarAction::Clear, ToolbarAction::Undo])
            .collect();

        let n = actions.len() as i32;
        let fit = (frame_width - cfg.margin * (n + 1)) / n.max(1);
        let bw = cfg.button_width.min(fit).max(1);

        let mut x = cfg.margin;
        let buttons = actions
            .into_iter()
            .map(|action| {
                let rect = Rect { x0: x, y0: cfg.top, x1: x + bw, y1: cfg.top + cfg.button_height };
                x += bw + cfg.margin;
                Button { rect, action }
            })
            .collect();

        Self { cfg, buttons }
    }

    pub fn buttons(&self) -> &[Button] {
        &self.buttons
    }

    pub fn height(&self) -> i32 {
        self.cfg.height
    }

    /// Anything above this row belongs to the toolbar, not the drawing area.
    pub fn zone_bottom(&self) -> i32 {
        self.cfg.height + self.cfg.zone_padding
    }

    pub fn in_zone(&self, p: Point) -> bool {
        p.y < self.zone_bottom()
    }

    /// Button under `p`, edges included.
    pub fn hit_test(&self, p: Point) -> Option<ToolbarAction> {
        self.buttons.iter().find(|b| b.rect.contains_inclusive(p)).map(|b| b.action)
    }
}
