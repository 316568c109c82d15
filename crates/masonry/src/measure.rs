//! Cell inspection: which media a cell holds, whether it has loaded, and how
//! tall the cell will render at column width.

use crate::PLACEHOLDER_CLASS;
use html::{Document, NodeKey, VideoState};

/// What the head of the queue is waiting for, if anything.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Readiness {
    Ready,
    /// The cell's picture image has not finished decoding.
    AwaitingImage(NodeKey),
    /// The cell's video has no metadata yet.
    AwaitingVideo(NodeKey),
}

/// Height figures for one cell.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct CellHeight {
    /// Aspect-ratio height of the cell's media at column width.
    pub media: f64,
    /// Amount added to the column's outer height once placed.
    pub contribution: f64,
}

/// The `img` directly inside a `picture` somewhere in the cell.
pub fn picture_image<D: Document + ?Sized>(doc: &D, cell: NodeKey) -> Option<NodeKey> {
    doc.descendants(cell).into_iter().find(|node| {
        doc.tag_name(*node) == Some("img")
            && doc
                .parent(*node)
                .is_some_and(|parent| doc.tag_name(parent) == Some("picture"))
    })
}

pub fn video<D: Document + ?Sized>(doc: &D, cell: NodeKey) -> Option<NodeKey> {
    doc.descendants(cell)
        .into_iter()
        .find(|node| doc.tag_name(*node) == Some("video"))
}

/// Second direct `div` child of the cell.
pub fn button_container<D: Document + ?Sized>(doc: &D, cell: NodeKey) -> Option<NodeKey> {
    doc.element_children(cell)
        .into_iter()
        .filter(|child| doc.tag_name(*child) == Some("div"))
        .nth(1)
}

pub fn readiness<D: Document + ?Sized>(doc: &D, cell: NodeKey) -> Readiness {
    if let Some(image) = picture_image(doc, cell) {
        if !doc.image_state(image).complete {
            return Readiness::AwaitingImage(image);
        }
    }
    if let Some(node) = video(doc, cell) {
        if doc.video_state(node).ready_state == VideoState::HAVE_NOTHING {
            return Readiness::AwaitingVideo(node);
        }
    }
    Readiness::Ready
}

fn scaled(column_width: f64, width: f64, height: f64) -> f64 {
    if width > 0.0 && height.is_finite() {
        column_width / width * height
    } else {
        0.0
    }
}

fn authored_height<D: Document + ?Sized>(doc: &D, cell: NodeKey) -> Option<f64> {
    doc.style_property(cell, "height")?
        .trim_end_matches("px")
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|height| height.is_finite())
}

/// Estimate a ready cell's height. A video wins over an image when a cell
/// carries both; a media-less placeholder contributes its authored height
/// plus `placeholder_margin`.
pub fn estimate<D: Document + ?Sized>(
    doc: &D,
    cell: NodeKey,
    column_width: f64,
    placeholder_margin: f64,
) -> CellHeight {
    let mut media = 0.0;
    if let Some(image) = picture_image(doc, cell) {
        let state = doc.image_state(image);
        media = scaled(column_width, state.natural_width, state.natural_height);
    }
    if let Some(node) = video(doc, cell) {
        let state = doc.video_state(node);
        media = scaled(column_width, state.video_width, state.video_height);
    }

    let mut contribution = media;
    if media <= 0.0 && doc.has_class(cell, PLACEHOLDER_CLASS) {
        if let Some(height) = authored_height(doc, cell) {
            contribution += height + placeholder_margin;
        }
    }
    CellHeight {
        media,
        contribution,
    }
}
