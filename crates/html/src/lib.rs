//! Document capability shared by the masonry balancer and its hosts.
//!
//! The balancer never talks to a browser directly. Everything it needs from a
//! page (creating column containers, moving cells, toggling classes, reading
//! media dimensions, moving focus) goes through the [`Document`] trait. The
//! [`Dom`] arena in this crate implements it for tests and for the CLI, and
//! [`parse_html`] builds one from authored markup.

#![allow(
    clippy::missing_inline_in_public_items,
    reason = "Inlining decisions left to compiler for this crate"
)]

pub mod dom;
pub mod parser;

pub use dom::{Dom, DomNode, NodeKind};
pub use parser::parse_html;

use anyhow::Result;
use serde::Serialize;

/// A stable key for DOM nodes, valid for the lifetime of the owning document.
#[derive(Copy, Clone, Default, Eq, PartialEq, Hash, Debug, PartialOrd, Ord, Serialize)]
pub struct NodeKey(pub u64);

impl NodeKey {
    /// The document root key (always present).
    pub const ROOT: Self = Self(0);
}

/// Decode state of an `<img>` element.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct ImageState {
    /// Mirrors `HTMLImageElement.complete`.
    pub complete: bool,
    pub natural_width: f64,
    pub natural_height: f64,
}

/// Metadata state of a `<video>` element.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct VideoState {
    /// Mirrors `HTMLMediaElement.readyState`.
    pub ready_state: u8,
    pub video_width: f64,
    pub video_height: f64,
}

impl VideoState {
    /// No information about the media resource is available.
    pub const HAVE_NOTHING: u8 = 0;
    /// Duration and intrinsic dimensions are known.
    pub const HAVE_METADATA: u8 = 1;
}

/// Media readiness notification delivered by the host.
#[derive(Clone, Debug, PartialEq)]
pub enum MediaEvent {
    /// An image finished decoding (`load`).
    Load {
        node: NodeKey,
        natural_width: f64,
        natural_height: f64,
    },
    /// A video exposed its intrinsic size (`loadedmetadata`).
    LoadedMetadata {
        node: NodeKey,
        video_width: f64,
        video_height: f64,
    },
}

impl MediaEvent {
    /// The media element the notification is about.
    pub const fn node(&self) -> NodeKey {
        match *self {
            Self::Load { node, .. } | Self::LoadedMetadata { node, .. } => node,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FocusEventKind {
    Focus,
    Blur,
}

/// A focus change, as seen from `target`.
///
/// `related_target` is the element losing focus for [`FocusEventKind::Focus`]
/// and the element receiving it for [`FocusEventKind::Blur`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FocusEvent {
    pub kind: FocusEventKind,
    pub target: NodeKey,
    pub related_target: Option<NodeKey>,
}

/// The side-effect boundary between layout code and a live document.
///
/// Read accessors are infallible and answer with neutral values for nodes the
/// document does not know. Mutations return an error instead.
pub trait Document {
    /// Key of the document root.
    fn root(&self) -> NodeKey;

    /// Create a detached element.
    fn create_element(&mut self, tag: &str) -> NodeKey;

    /// Append `child` as last child of `parent`, moving it if already attached.
    ///
    /// # Errors
    /// Returns an error for unknown nodes or when `child` is an ancestor of `parent`.
    fn append_child(&mut self, parent: NodeKey, child: NodeKey) -> Result<()>;

    /// Detach every child of `node` (the `innerHTML = ''` idiom). Detached
    /// nodes stay alive and can be re-appended.
    ///
    /// # Errors
    /// Returns an error for unknown nodes.
    fn clear_children(&mut self, node: NodeKey) -> Result<()>;

    fn parent(&self, node: NodeKey) -> Option<NodeKey>;

    /// All child nodes in order, text included.
    fn children(&self, node: NodeKey) -> Vec<NodeKey>;

    /// Lowercase tag name, `None` for non-element nodes.
    fn tag_name(&self, node: NodeKey) -> Option<&str>;

    fn attribute(&self, node: NodeKey, name: &str) -> Option<&str>;

    /// # Errors
    /// Returns an error for unknown or non-element nodes.
    fn set_attribute(&mut self, node: NodeKey, name: &str, value: &str) -> Result<()>;

    /// Rendered width in CSS pixels; 0 when not laid out.
    fn offset_width(&self, node: NodeKey) -> f64;

    /// Rendered height in CSS pixels; 0 when not laid out.
    fn offset_height(&self, node: NodeKey) -> f64;

    fn image_state(&self, node: NodeKey) -> ImageState;

    fn video_state(&self, node: NodeKey) -> VideoState;

    /// Whether `node` comes before `other` in document order.
    fn precedes(&self, node: NodeKey, other: NodeKey) -> bool;

    /// # Errors
    /// Returns an error for unknown nodes.
    fn focus(&mut self, node: NodeKey) -> Result<()>;

    /// Record a media notification so later state queries observe it.
    ///
    /// # Errors
    /// Returns an error when the event targets an unknown or non-media node.
    fn apply_media_event(&mut self, event: &MediaEvent) -> Result<()>;

    /// Element children of `node`, in order.
    fn element_children(&self, node: NodeKey) -> Vec<NodeKey> {
        self.children(node)
            .into_iter()
            .filter(|child| self.tag_name(*child).is_some())
            .collect()
    }

    /// Pre-order descendants of `node`, excluding `node` itself.
    fn descendants(&self, node: NodeKey) -> Vec<NodeKey> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeKey> = self.children(node).into_iter().rev().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).into_iter().rev());
        }
        out
    }

    fn has_class(&self, node: NodeKey, class: &str) -> bool {
        self.attribute(node, "class")
            .is_some_and(|list| list.split_ascii_whitespace().any(|name| name == class))
    }

    /// # Errors
    /// Propagates [`Document::set_attribute`] failures.
    fn add_class(&mut self, node: NodeKey, class: &str) -> Result<()> {
        if self.has_class(node, class) {
            return Ok(());
        }
        let list = match self.attribute(node, "class") {
            Some(existing) if !existing.trim().is_empty() => format!("{} {class}", existing.trim()),
            _ => class.to_owned(),
        };
        self.set_attribute(node, "class", &list)
    }

    /// # Errors
    /// Propagates [`Document::set_attribute`] failures.
    fn remove_class(&mut self, node: NodeKey, class: &str) -> Result<()> {
        if !self.has_class(node, class) {
            return Ok(());
        }
        let list = self
            .attribute(node, "class")
            .unwrap_or_default()
            .split_ascii_whitespace()
            .filter(|name| *name != class)
            .collect::<Vec<_>>()
            .join(" ");
        self.set_attribute(node, "class", &list)
    }

    /// Value of one declaration in the inline `style` attribute.
    fn style_property(&self, node: NodeKey, property: &str) -> Option<&str> {
        self.attribute(node, "style")?.split(';').find_map(|decl| {
            let (name, value) = decl.split_once(':')?;
            name.trim()
                .eq_ignore_ascii_case(property)
                .then(|| value.trim())
                .filter(|value| !value.is_empty())
        })
    }
}
