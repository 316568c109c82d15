//! Column sizing and the greedy height-balancing rule.

use html::{Document, NodeKey};
use log::trace;

/// Container classes that switch the grid to the narrow-column variant.
const WIDE_CLASSES: [&str; 2] = ["sixcols", "fullwidth"];

/// Width variant of the grid container.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LayoutVariant {
    /// 264px columns with a 4px gutter.
    Normal,
    /// 175px columns with a 10px gutter, for `sixcols` and `fullwidth` grids.
    Wide,
}

impl LayoutVariant {
    /// Pick the variant from the container's classes.
    ///
    /// # Arguments
    ///
    /// * `doc` - Document holding the container
    /// * `container` - The grid element
    pub fn of_container<D: Document + ?Sized>(doc: &D, container: NodeKey) -> Self {
        if WIDE_CLASSES
            .iter()
            .any(|class| doc.has_class(container, class))
        {
            Self::Wide
        } else {
            Self::Normal
        }
    }

    /// Nominal pixel width per column.
    pub const fn basis(self) -> f64 {
        match self {
            Self::Normal => 264.0,
            Self::Wide => 175.0,
        }
    }

    /// Padding and margin taken out of the basis.
    pub const fn gutter(self) -> f64 {
        match self {
            Self::Normal => 4.0,
            Self::Wide => 10.0,
        }
    }

    /// Width media is scaled to when estimating cell heights.
    pub fn column_width(self) -> f64 {
        self.basis() - self.gutter()
    }

    /// `max(1, floor(width / basis))`.
    pub fn column_count(self, container_width: f64) -> usize {
        let count = (container_width / self.basis()).floor();
        if count.is_finite() && count >= 1.0 {
            count as usize
        } else {
            1
        }
    }
}

/// One realized column and its running height.
#[derive(Clone, Debug, PartialEq)]
pub struct Column {
    /// The `masonry-col` element holding this column's cells.
    pub element: NodeKey,
    /// Sum of the estimated heights placed so far.
    pub outer_height: f64,
}

/// Round-robin column picker that temporarily switches to filling the
/// shortest column when heights drift apart.
#[derive(Clone, Debug)]
pub struct ColumnBalancer {
    columns: Vec<Column>,
    last: Option<usize>,
    fill_target: Option<f64>,
    tolerance: f64,
}

impl ColumnBalancer {
    /// Create a balancer with no columns.
    ///
    /// # Arguments
    ///
    /// * `tolerance` - How far in pixels a fill may overshoot the tallest
    ///   column before rotation resumes
    pub const fn new(tolerance: f64) -> Self {
        Self {
            columns: Vec::new(),
            last: None,
            fill_target: None,
            tolerance,
        }
    }

    /// Replace the column set with empty columns backed by `elements`.
    pub fn reset(&mut self, elements: Vec<NodeKey>) {
        self.columns = elements
            .into_iter()
            .map(|element| Column {
                element,
                outer_height: 0.0,
            })
            .collect();
        self.last = None;
        self.fill_target = None;
    }

    /// Restart rotation at the first column. Heights and fill mode are kept.
    pub fn rewind(&mut self) {
        self.last = None;
    }

    /// Columns in left-to-right order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// True until [`reset`](Self::reset) realizes a column set.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Height being filled towards, when in fill mode.
    pub const fn fill_target(&self) -> Option<f64> {
        self.fill_target
    }

    fn min_height(&self) -> f64 {
        self.columns
            .iter()
            .map(|column| column.outer_height)
            .fold(f64::INFINITY, f64::min)
    }

    fn max_height(&self) -> f64 {
        self.columns
            .iter()
            .map(|column| column.outer_height)
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Pick the column for a cell of `height`. `None` when no columns exist.
    pub fn select_column(&mut self, height: f64) -> Option<usize> {
        if self.columns.is_empty() {
            return None;
        }
        let next = self.last.map_or(0, |last| (last + 1) % self.columns.len());
        let min = self.min_height();
        let mut chosen = next;

        if next == 0 && self.fill_target.is_none() {
            let max = self.max_height();
            // A zero target means every column is empty; nothing to fill.
            if max > 0.0 && max - min >= height - self.tolerance {
                trace!("entering fill mode: target={max} min={min} height={height}");
                self.fill_target = Some(max);
            }
        }

        if let Some(target) = self.fill_target {
            if target - min >= height - self.tolerance {
                chosen = self
                    .columns
                    .iter()
                    .position(|column| column.outer_height <= min)
                    .unwrap_or(0);
            } else {
                trace!("leaving fill mode: target={target} min={min} height={height}");
                self.fill_target = None;
                chosen = 0;
            }
        }

        self.last = Some(chosen);
        Some(chosen)
    }

    /// Add a placed cell's contribution to a column.
    pub fn record(&mut self, index: usize, contribution: f64) {
        if let Some(column) = self.columns.get_mut(index) {
            column.outer_height += contribution;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn balancer(columns: u64) -> ColumnBalancer {
        let mut balancer = ColumnBalancer::new(50.0);
        balancer.reset((0..columns).map(NodeKey).collect());
        balancer
    }

    fn place(balancer: &mut ColumnBalancer, height: f64) -> usize {
        let index = balancer.select_column(height).unwrap();
        balancer.record(index, height);
        index
    }

    #[test]
    fn column_count_is_floor_of_width_over_basis() {
        assert_eq!(LayoutVariant::Normal.column_count(1000.0), 3);
        assert_eq!(LayoutVariant::Normal.column_count(528.0), 2);
        assert_eq!(LayoutVariant::Normal.column_count(100.0), 1);
        assert_eq!(LayoutVariant::Normal.column_count(0.0), 1);
        assert_eq!(LayoutVariant::Wide.column_count(1050.0), 6);
        assert_eq!(LayoutVariant::Wide.column_width(), 165.0);
        assert_eq!(LayoutVariant::Normal.column_width(), 260.0);
    }

    #[test]
    fn equal_heights_rotate_round_robin() {
        let mut balancer = balancer(3);
        let order: Vec<usize> = (0..6).map(|_| place(&mut balancer, 100.0)).collect();

        assert_eq!(order, vec![0, 1, 2, 0, 1, 2]);
        let heights: Vec<f64> = balancer
            .columns()
            .iter()
            .map(|col| col.outer_height)
            .collect();
        assert_eq!(heights, vec![200.0, 200.0, 200.0]);
        assert_eq!(balancer.fill_target(), None);
    }

    #[test]
    fn fill_mode_levels_the_short_column_then_resumes_rotation() {
        let mut balancer = balancer(2);
        assert_eq!(place(&mut balancer, 300.0), 0);
        assert_eq!(place(&mut balancer, 100.0), 1);

        // Wraps with a 200px gap: fill column 1 up to 300.
        assert_eq!(place(&mut balancer, 100.0), 1);
        assert_eq!(balancer.fill_target(), Some(300.0));
        assert_eq!(place(&mut balancer, 100.0), 1);

        // Columns level at 300: the next cell no longer fits the gap.
        assert_eq!(place(&mut balancer, 100.0), 0);
        assert_eq!(balancer.fill_target(), None);
        assert_eq!(place(&mut balancer, 100.0), 1);
    }

    #[test]
    fn fill_mode_never_overshoots_target_by_more_than_the_tolerance() {
        let mut balancer = balancer(3);
        for height in [400.0, 80.0, 120.0, 90.0, 60.0, 150.0, 70.0, 200.0, 110.0] {
            let before = balancer.fill_target();
            let index = place(&mut balancer, height);
            if let (Some(target), Some(_)) = (before, balancer.fill_target()) {
                assert!(balancer.columns()[index].outer_height <= target + 50.0);
            }
        }
    }

    #[test]
    fn small_gaps_do_not_trigger_fill_mode() {
        let mut balancer = balancer(2);
        place(&mut balancer, 120.0);
        place(&mut balancer, 100.0);

        assert_eq!(place(&mut balancer, 100.0), 0);
        assert_eq!(balancer.fill_target(), None);
    }

    #[test]
    fn rewind_restarts_rotation_without_leaving_fill_mode() {
        let mut rotating = balancer(3);
        place(&mut rotating, 100.0);
        place(&mut rotating, 100.0);
        rotating.rewind();
        assert_eq!(place(&mut rotating, 100.0), 0);

        let mut filling = balancer(2);
        place(&mut filling, 300.0);
        place(&mut filling, 100.0);
        assert_eq!(place(&mut filling, 100.0), 1);
        filling.rewind();
        assert_eq!(filling.fill_target(), Some(300.0));
        assert_eq!(place(&mut filling, 100.0), 1);
    }

    #[test]
    fn empty_balancer_selects_nothing() {
        let mut balancer = ColumnBalancer::new(50.0);
        assert_eq!(balancer.select_column(10.0), None);
    }
}
