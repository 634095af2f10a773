use ratatui::layout::Rect;
use serde::{Deserialize, Serialize};

/// Fractional pane layout of a window.
///
/// `cols` and `rows` are cumulative boundaries running from 0.0 to 1.0. Each
/// cell is `[col_start, row_start, col_end, row_end]`, indexes into those
/// boundaries, and each cell hosts one group of views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct PaneLayout {
    pub(crate) cols: Vec<f64>,
    pub(crate) rows: Vec<f64>,
    pub(crate) cells: Vec<[usize; 4]>,
}

impl Default for PaneLayout {
    fn default() -> Self {
        Self {
            cols: vec![0.0, 1.0],
            rows: vec![0.0, 1.0],
            cells: vec![[0, 0, 1, 1]],
        }
    }
}

impl PaneLayout {
    pub(crate) fn is_valid(&self) -> bool {
        let bounds_ok = |v: &[f64]| {
            v.len() >= 2
                && v.windows(2).all(|w| w[0] <= w[1])
                && v.iter().all(|x| (0.0..=1.0).contains(x))
        };
        bounds_ok(&self.cols)
            && bounds_ok(&self.rows)
            && !self.cells.is_empty()
            && self.cells.iter().all(|&[c0, r0, c1, r1]| {
                c0 < c1 && r0 < r1 && c1 < self.cols.len() && r1 < self.rows.len()
            })
    }

    /// Squeezes the existing rows upward by `shrink` and adds one
    /// full-width cell in the freed space at the bottom.
    pub(crate) fn with_bottom_row(&self, shrink: f64) -> Self {
        let mut next = self.clone();
        for row in &mut next.rows {
            *row *= shrink;
        }
        next.rows.push(1.0);
        let last_row = next.rows.len() - 1;
        let last_col = next.cols.len().saturating_sub(1);
        next.cells.push([0, last_row - 1, last_col, last_row]);
        next
    }

    pub(crate) fn cell_rects(&self, area: Rect) -> Vec<Rect> {
        let scale = |bounds: &[f64], idx: usize, origin: u16, extent: u16| -> u16 {
            let frac = bounds.get(idx).copied().unwrap_or(1.0).clamp(0.0, 1.0);
            origin.saturating_add((frac * f64::from(extent)).round() as u16)
        };
        self.cells
            .iter()
            .map(|&[c0, r0, c1, r1]| {
                let x0 = scale(&self.cols, c0, area.x, area.width);
                let x1 = scale(&self.cols, c1, area.x, area.width);
                let y0 = scale(&self.rows, r0, area.y, area.height);
                let y1 = scale(&self.rows, r1, area.y, area.height);
                Rect::new(x0, y0, x1.saturating_sub(x0), y1.saturating_sub(y0))
            })
            .collect()
    }
}
