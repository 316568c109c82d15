use crate::columns::{Column, ColumnBalancer, LayoutVariant};
use crate::config::MasonryConfig;
use crate::focus::RovingFocus;
use crate::measure::{self, Readiness};
use crate::{APPEAR_CLASS, BUTTON_CONTAINER_CLASS, COLUMN_CLASS, COMPLETE_CLASS};
use anyhow::{Result, anyhow};
use core::time::Duration;
use html::{Document, FocusEvent, NodeKey};
use log::{debug, info, trace};
use serde::Serialize;
use std::collections::VecDeque;

/// Where a masonry instance is in its layout pass.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LayoutState {
    Uninitialized,
    /// The container had no width; a retry is pending.
    Measuring,
    /// Columns were (re)built and no cell has been placed yet.
    ColumnsReady,
    /// Cells are being placed, possibly waiting on media.
    Placing,
    Complete,
}

/// Work left over from a suspended or deferred draw.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Continuation {
    generation: u64,
    /// `None` re-runs the full draw.
    work: Option<Vec<NodeKey>>,
}

impl Continuation {
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Cells still to be placed, head first. Empty when the retry is a full
    /// draw.
    pub fn remaining(&self) -> &[NodeKey] {
        self.work.as_deref().unwrap_or_default()
    }
}

/// Result of a [`Masonry::draw`] or [`Masonry::resume`] call.
///
/// Only `Deferred` and `Suspended` carry work; hand their continuation back
/// to [`Masonry::resume`] once the container is measured or the media is
/// ready.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawOutcome {
    /// Column count already matched the container. The document is left
    /// alone and rotation restarts at the first column.
    Unchanged,
    /// The container has no width yet, or explicit cells arrived before any
    /// columns existed. Resume after `delay`.
    Deferred {
        delay: Duration,
        continuation: Continuation,
    },
    /// The head cell's media is still loading. Resume once `waiting_on` is ready.
    Suspended {
        waiting_on: NodeKey,
        continuation: Continuation,
    },
    /// Every cell is placed and the container is marked complete.
    Complete,
    /// The continuation belonged to a layout pass that has since been rebuilt.
    Cancelled,
}

/// Per-column summary of a layout pass.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ColumnReport {
    pub index: usize,
    pub element: NodeKey,
    pub outer_height: f64,
    pub cells: Vec<NodeKey>,
}

enum Setup {
    Unmeasured,
    Unchanged,
    Rebuilt,
}

/// Masonry grid over one container element.
///
/// All mutable layout state lives here; the document is passed in on every
/// call so hosts decide how it is owned.
#[derive(Debug)]
pub struct Masonry {
    container: NodeKey,
    cells: Vec<NodeKey>,
    config: MasonryConfig,
    column_width: f64,
    balancer: ColumnBalancer,
    focus: RovingFocus,
    placements: Vec<(NodeKey, usize)>,
    state: LayoutState,
    generation: u64,
}

impl Masonry {
    /// Create a balancer for `container`. Nothing is touched until the first
    /// [`draw`](Self::draw).
    ///
    /// # Arguments
    ///
    /// * `container` - Element the columns are built in
    /// * `cells` - Cells in input order; this order drives placement and focus
    /// * `config` - Timing and tolerance settings
    pub fn new(container: NodeKey, cells: Vec<NodeKey>, config: MasonryConfig) -> Self {
        Self {
            container,
            focus: RovingFocus::new(cells.clone()),
            cells,
            balancer: ColumnBalancer::new(config.fill_tolerance_px),
            column_width: 0.0,
            config,
            placements: Vec::new(),
            state: LayoutState::Uninitialized,
            generation: 0,
        }
    }

    /// Lay out the element children of `container` as cells.
    pub fn for_container<D: Document + ?Sized>(
        doc: &D,
        container: NodeKey,
        config: MasonryConfig,
    ) -> Self {
        Self::new(container, doc.element_children(container), config)
    }

    /// Current point in the layout pass.
    pub const fn state(&self) -> LayoutState {
        self.state
    }

    /// The grid element.
    pub const fn container(&self) -> NodeKey {
        self.container
    }

    /// Cells in input order.
    pub fn cells(&self) -> &[NodeKey] {
        &self.cells
    }

    /// Settings this instance was created with.
    pub const fn config(&self) -> &MasonryConfig {
        &self.config
    }

    /// Realized columns with their running heights.
    pub fn columns(&self) -> &[Column] {
        self.balancer.columns()
    }

    /// Media width cells are scaled to, set when columns are built.
    pub const fn column_width(&self) -> f64 {
        self.column_width
    }

    /// Cells in placement order with the column each landed in.
    pub fn placements(&self) -> &[(NodeKey, usize)] {
        &self.placements
    }

    /// Bumped whenever the column set is rebuilt.
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Summarize every column with the cells placed into it.
    pub fn report(&self) -> Vec<ColumnReport> {
        self.columns()
            .iter()
            .enumerate()
            .map(|(index, column)| ColumnReport {
                index,
                element: column.element,
                outer_height: column.outer_height,
                cells: self
                    .placements
                    .iter()
                    .filter(|(_, placed)| *placed == index)
                    .map(|(cell, _)| *cell)
                    .collect(),
            })
            .collect()
    }

    /// Distribute cells over the columns.
    ///
    /// With `None`, re-measures the container and starts over with every cell
    /// if the column count changed; an unchanged count only rewinds rotation
    /// to the first column. With `Some`, continues placing the given cells into
    /// the current columns, or defers them while no columns exist.
    ///
    /// # Errors
    /// Only document failures are reported; layout itself never fails.
    pub fn draw<D: Document + ?Sized>(
        &mut self,
        doc: &mut D,
        cells: Option<Vec<NodeKey>>,
    ) -> Result<DrawOutcome> {
        let work = match cells {
            Some(work) if self.balancer.is_empty() => {
                debug!(
                    "masonry {:?}: no columns yet, deferring {} cells",
                    self.container,
                    work.len()
                );
                return Ok(self.defer(Some(work)));
            }
            Some(work) => work,
            None => match self.setup_columns(doc)? {
                Setup::Unmeasured => {
                    debug!("masonry {:?}: container not measured yet", self.container);
                    return Ok(self.defer(None));
                }
                Setup::Unchanged => return Ok(DrawOutcome::Unchanged),
                Setup::Rebuilt => self.cells.clone(),
            },
        };
        self.place_all(doc, work.into())
    }

    fn defer(&mut self, work: Option<Vec<NodeKey>>) -> DrawOutcome {
        self.state = LayoutState::Measuring;
        DrawOutcome::Deferred {
            delay: self.config.retry_delay(),
            continuation: Continuation {
                generation: self.generation,
                work,
            },
        }
    }

    /// Continue a deferred or suspended draw.
    ///
    /// # Errors
    /// Only document failures are reported.
    pub fn resume<D: Document + ?Sized>(
        &mut self,
        doc: &mut D,
        continuation: Continuation,
    ) -> Result<DrawOutcome> {
        if continuation.generation != self.generation {
            debug!(
                "masonry {:?}: dropping continuation from generation {} (now {})",
                self.container, continuation.generation, self.generation
            );
            return Ok(DrawOutcome::Cancelled);
        }
        self.draw(doc, continuation.work)
    }

    /// Route a focus or blur event on a cell to the roving tab stop.
    ///
    /// # Errors
    /// Propagates document failures.
    pub fn handle_focus_event<D: Document + ?Sized>(
        &self,
        doc: &mut D,
        event: FocusEvent,
    ) -> Result<Option<NodeKey>> {
        self.focus.handle(doc, event)
    }

    fn setup_columns<D: Document + ?Sized>(&mut self, doc: &mut D) -> Result<Setup> {
        let width = doc.offset_width(self.container);
        if width <= 0.0 {
            return Ok(Setup::Unmeasured);
        }
        let variant = LayoutVariant::of_container(doc, self.container);
        self.column_width = variant.column_width();
        let count = variant.column_count(width);
        let realized = doc
            .element_children(self.container)
            .into_iter()
            .filter(|child| doc.has_class(*child, COLUMN_CLASS))
            .count();
        if count == realized {
            // Columns and heights stay; rotation starts over at column 0.
            self.balancer.rewind();
            return Ok(Setup::Unchanged);
        }

        debug!(
            "masonry {:?}: width {width} -> {count} {variant:?} columns (had {realized})",
            self.container
        );
        doc.clear_children(self.container)?;
        doc.remove_class(self.container, COMPLETE_CLASS)?;
        let mut elements = Vec::with_capacity(count);
        for _ in 0..count {
            let column = doc.create_element("div");
            doc.set_attribute(column, "class", COLUMN_CLASS)?;
            doc.append_child(self.container, column)?;
            elements.push(column);
        }
        self.balancer.reset(elements);
        self.focus.reset();
        self.placements.clear();
        self.generation += 1;
        self.state = LayoutState::ColumnsReady;
        Ok(Setup::Rebuilt)
    }

    fn place_all<D: Document + ?Sized>(
        &mut self,
        doc: &mut D,
        mut work: VecDeque<NodeKey>,
    ) -> Result<DrawOutcome> {
        self.state = LayoutState::Placing;
        while let Some(&head) = work.front() {
            for cell in work.iter().take(self.config.eager_lookahead) {
                if let Some(image) = measure::picture_image(doc, *cell) {
                    doc.set_attribute(image, "loading", "eager")?;
                }
            }

            let waiting_on = match measure::readiness(doc, head) {
                Readiness::Ready => None,
                Readiness::AwaitingImage(media) | Readiness::AwaitingVideo(media) => Some(media),
            };
            if let Some(media) = waiting_on {
                trace!("masonry {:?}: {head:?} waits on {media:?}", self.container);
                return Ok(DrawOutcome::Suspended {
                    waiting_on: media,
                    continuation: Continuation {
                        generation: self.generation,
                        work: Some(work.into()),
                    },
                });
            }

            self.place(doc, head)?;
            work.pop_front();
        }

        doc.add_class(self.container, COMPLETE_CLASS)?;
        self.state = LayoutState::Complete;
        debug!(
            "masonry {:?}: complete with {} cells",
            self.container,
            self.placements.len()
        );
        Ok(DrawOutcome::Complete)
    }

    fn place<D: Document + ?Sized>(&mut self, doc: &mut D, cell: NodeKey) -> Result<()> {
        let height = measure::estimate(
            doc,
            cell,
            self.column_width,
            self.config.placeholder_margin_px,
        );
        if self.config.debug {
            info!(
                "masonry cell {cell:?}: measured {} computed {}",
                doc.offset_height(cell),
                height.media
            );
        }

        let index = self
            .balancer
            .select_column(height.media)
            .ok_or_else(|| anyhow!("No columns realized in {:?}", self.container))?;
        let column = self
            .balancer
            .columns()
            .get(index)
            .map(|column| column.element)
            .ok_or_else(|| anyhow!("Column {index} missing in {:?}", self.container))?;

        doc.append_child(column, cell)?;
        doc.add_class(cell, APPEAR_CLASS)?;
        self.balancer.record(index, height.contribution);
        if let Some(buttons) = measure::button_container(doc, cell) {
            doc.add_class(buttons, BUTTON_CONTAINER_CLASS)?;
        }
        self.focus.bind(doc, cell)?;
        self.placements.push((cell, index));
        trace!("masonry cell {cell:?} -> column {index} (+{})", height.contribution);
        Ok(())
    }
}
