//! Cursor and viewport arithmetic over the flattened row list.
//!
//! All moves resolve to a target row index, clamp it into range, then
//! reconcile the viewport in O(1): jumping above the window pins the
//! cursor to the top edge, jumping below leaves a one-row look-ahead
//! margin at the bottom.

use crate::tree::Row;

#[derive(Debug, Clone)]
pub struct Navigator {
    /// Row index of the first visible line.
    pub top: usize,
    /// Offset of the highlighted row within the viewport.
    pub cursor: usize,
    /// Rows available on screen.
    pub height: usize,
}

impl Navigator {
    pub fn new(height: usize) -> Self {
        Self {
            top: 0,
            cursor: 0,
            height,
        }
    }

    /// Absolute index of the highlighted row.
    pub fn selected_index(&self) -> usize {
        self.top + self.cursor
    }

    pub fn selected<'a>(&self, rows: &'a [Row]) -> Option<&'a Row> {
        rows.get(self.selected_index())
    }

    /// Viewport size changed (terminal resize); re-derive scroll state
    /// for the current selection.
    pub fn resize(&mut self, rows: &[Row], height: usize) {
        let target = self.selected_index();
        self.height = height;
        self.top = 0;
        self.cursor = 0;
        self.go(rows, target);
    }

    pub fn move_rel(&mut self, rows: &[Row], delta: isize) {
        let target = self.selected_index().saturating_add_signed(delta);
        self.go(rows, target);
    }

    pub fn move_to_start(&mut self, rows: &[Row]) {
        self.go(rows, 0);
    }

    pub fn move_to_end(&mut self, rows: &[Row]) {
        self.go(rows, usize::MAX);
    }

    /// Jump to the nearest preceding row one level shallower. A
    /// top-level row has no ancestor row, so the jump clamps to index 0.
    pub fn move_to_parent(&mut self, rows: &[Row]) {
        let current = self.selected_index();
        let target = rows
            .get(current)
            .and_then(|row| row.depth.checked_sub(1))
            .and_then(|parent_depth| {
                rows[..current]
                    .iter()
                    .rposition(|row| row.depth == parent_depth)
            })
            .unwrap_or(0);
        self.go(rows, target);
    }

    fn go(&mut self, rows: &[Row], target: usize) {
        let target = target.min(rows.len().saturating_sub(1));
        if target < self.top {
            self.top = target;
            self.cursor = 0;
        } else if target > self.top + self.height.saturating_sub(1) {
            let margin = self.height.saturating_sub(2);
            self.top = target.saturating_sub(margin);
            self.cursor = margin;
        } else {
            self.cursor = target - self.top;
        }
    }
}
