//! Masonry grid layout for authored image and video tiles.
//!
//! A [`Masonry`] owns the column set of one container and places cells into
//! it one at a time:
//!
//! ```text
//! draw(None) ── width 0 ──▶ Deferred (retry later)
//!     │
//!     ├── column count unchanged ──▶ Unchanged
//!     │
//!     └── rebuild columns ──▶ place head cell ──▶ ... ──▶ Complete
//!                                  │
//!                                  └── media not loaded ──▶ Suspended
//!                                        (resume with the continuation)
//! ```
//!
//! Columns are filled round-robin until their heights drift apart by more
//! than a cell, at which point the balancer fills the shortest column up to
//! the tallest one before rotating again. Placement also wires up a roving
//! tab stop so the grid is a single stop in the page's tab order.
//!
//! The document is injected through [`html::Document`]; [`host::drive`] runs
//! a pass on tokio the way a browser would.

#![allow(
    clippy::module_name_repetitions,
    reason = "Types like ColumnBalancer read better with the module name"
)]
#![allow(
    clippy::missing_inline_in_public_items,
    reason = "Inlining decisions left to compiler for this crate"
)]

pub mod columns;
pub mod config;
mod engine;
pub mod focus;
pub mod host;
pub mod measure;

pub use columns::{Column, ColumnBalancer, LayoutVariant};
pub use config::MasonryConfig;
pub use engine::{ColumnReport, Continuation, DrawOutcome, LayoutState, Masonry};
pub use focus::{FocusRole, RovingFocus};

/// Marks a column container.
pub const COLUMN_CLASS: &str = "masonry-col";
/// Added to a cell once it is placed.
pub const APPEAR_CLASS: &str = "appear";
/// Added to the container when every cell is placed.
pub const COMPLETE_CLASS: &str = "template-list-complete";
/// Added to a cell's second direct `div` child.
pub const BUTTON_CONTAINER_CLASS: &str = "button-container";
/// Cells without media that reserve an authored height.
pub const PLACEHOLDER_CLASS: &str = "placeholder";
/// Focus targets that the first cell lets keep focus on forward blur.
pub const TEMPLATE_CLASS: &str = "template";
