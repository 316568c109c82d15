mod printing;

use crate::{Document, ImageState, MediaEvent, NodeKey, VideoState};
use anyhow::{Result, anyhow, bail};
use indextree::{Arena, Node, NodeId};
use log::trace;
use smallvec::SmallVec;
use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum NodeKind {
    #[default]
    Document,
    Element { tag: String },
    Text { text: String },
}

/// Media element state tracked alongside the node.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Media {
    Image(ImageState),
    Video(VideoState),
}

#[derive(Debug, Clone, Default)]
pub struct DomNode {
    pub key: NodeKey,
    pub kind: NodeKind,
    pub attrs: SmallVec<(String, String), 4>,
    offset_width: f64,
    offset_height: f64,
    media: Option<Media>,
}

impl DomNode {
    fn new(key: NodeKey, kind: NodeKind) -> Self {
        let media = match &kind {
            NodeKind::Element { tag } if tag == "img" => Some(Media::Image(ImageState::default())),
            NodeKind::Element { tag } if tag == "video" => {
                Some(Media::Video(VideoState::default()))
            }
            _ => None,
        };
        Self {
            key,
            kind,
            media,
            ..Self::default()
        }
    }

    fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(attr, _)| attr == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Arena-backed document. Nodes are never freed: detaching keeps them
/// addressable so they can be moved back into the tree.
pub struct Dom {
    arena: Arena<DomNode>,
    root: NodeId,
    keys: HashMap<NodeKey, NodeId>,
    next_key: u64,
    focused: Option<NodeKey>,
    focus_history: Vec<NodeKey>,
}

impl Default for Dom {
    fn default() -> Self {
        Self::new()
    }
}

impl Dom {
    pub fn new() -> Self {
        let mut arena = Arena::new();
        let root = arena.new_node(DomNode::new(NodeKey::ROOT, NodeKind::Document));
        let mut keys = HashMap::new();
        keys.insert(NodeKey::ROOT, root);
        Self {
            arena,
            root,
            keys,
            next_key: 1,
            focused: None,
            focus_history: Vec::new(),
        }
    }

    fn mint(&mut self, kind: NodeKind) -> NodeKey {
        let key = NodeKey(self.next_key);
        self.next_key += 1;
        let id = self.arena.new_node(DomNode::new(key, kind));
        self.keys.insert(key, id);
        key
    }

    fn id(&self, key: NodeKey) -> Result<NodeId> {
        self.keys
            .get(&key)
            .copied()
            .ok_or_else(|| anyhow!("Unknown node {key:?}"))
    }

    pub(crate) fn node(&self, key: NodeKey) -> Option<&DomNode> {
        let id = self.keys.get(&key)?;
        self.arena.get(*id).map(Node::get)
    }

    fn node_mut(&mut self, key: NodeKey) -> Result<&mut DomNode> {
        let id = self.id(key)?;
        self.arena
            .get_mut(id)
            .map(Node::get_mut)
            .ok_or_else(|| anyhow!("Node {key:?} was removed from the arena"))
    }

    fn element_mut(&mut self, key: NodeKey) -> Result<&mut DomNode> {
        let node = self.node_mut(key)?;
        if !matches!(node.kind, NodeKind::Element { .. }) {
            bail!("Node {key:?} is not an element");
        }
        Ok(node)
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: &str) -> NodeKey {
        self.mint(NodeKind::Text {
            text: text.to_owned(),
        })
    }

    /// Set the rendered width of a node. Stands in for CSS layout.
    ///
    /// # Errors
    /// Returns an error for unknown nodes.
    pub fn set_offset_width(&mut self, key: NodeKey, width: f64) -> Result<()> {
        self.node_mut(key)?.offset_width = width;
        Ok(())
    }

    /// # Errors
    /// Returns an error for unknown nodes.
    pub fn set_offset_height(&mut self, key: NodeKey, height: f64) -> Result<()> {
        self.node_mut(key)?.offset_height = height;
        Ok(())
    }

    /// # Errors
    /// Returns an error when `key` is not an `<img>`.
    pub fn set_image_state(&mut self, key: NodeKey, state: ImageState) -> Result<()> {
        match &mut self.node_mut(key)?.media {
            Some(Media::Image(current)) => {
                *current = state;
                Ok(())
            }
            _ => Err(anyhow!("Node {key:?} is not an image")),
        }
    }

    /// # Errors
    /// Returns an error when `key` is not a `<video>`.
    pub fn set_video_state(&mut self, key: NodeKey, state: VideoState) -> Result<()> {
        match &mut self.node_mut(key)?.media {
            Some(Media::Video(current)) => {
                *current = state;
                Ok(())
            }
            _ => Err(anyhow!("Node {key:?} is not a video")),
        }
    }

    /// Currently focused element.
    pub const fn focused(&self) -> Option<NodeKey> {
        self.focused
    }

    /// Every element passed to [`Document::focus`], oldest first.
    pub fn focus_history(&self) -> &[NodeKey] {
        &self.focus_history
    }

    /// Elements carrying `class`, in document order.
    pub fn elements_with_class(&self, class: &str) -> Vec<NodeKey> {
        self.descendants(NodeKey::ROOT)
            .into_iter()
            .filter(|key| self.has_class(*key, class))
            .collect()
    }

    /// First element carrying `id`.
    pub fn element_by_id(&self, id: &str) -> Option<NodeKey> {
        self.descendants(NodeKey::ROOT)
            .into_iter()
            .find(|key| self.attribute(*key, "id") == Some(id))
    }

    /// First element named `tag`, in document order.
    pub fn first_element(&self, tag: &str) -> Option<NodeKey> {
        self.descendants(NodeKey::ROOT)
            .into_iter()
            .find(|key| self.tag_name(*key) == Some(tag))
    }
}

impl Document for Dom {
    fn root(&self) -> NodeKey {
        NodeKey::ROOT
    }

    fn create_element(&mut self, tag: &str) -> NodeKey {
        self.mint(NodeKind::Element {
            tag: tag.to_ascii_lowercase(),
        })
    }

    fn append_child(&mut self, parent: NodeKey, child: NodeKey) -> Result<()> {
        let parent_id = self.id(parent)?;
        let child_id = self.id(child)?;
        if parent_id
            .ancestors(&self.arena)
            .any(|ancestor| ancestor == child_id)
        {
            bail!("Cannot append {child:?} into its own subtree {parent:?}");
        }
        child_id.detach(&mut self.arena);
        parent_id
            .checked_append(child_id, &mut self.arena)
            .map_err(|err| anyhow!("Failed to append {child:?} to {parent:?}: {err:?}"))?;
        trace!("append_child parent={parent:?} child={child:?}");
        Ok(())
    }

    fn clear_children(&mut self, node: NodeKey) -> Result<()> {
        self.id(node)?.detach_children(&mut self.arena);
        Ok(())
    }

    fn parent(&self, node: NodeKey) -> Option<NodeKey> {
        let id = self.keys.get(&node)?;
        let parent = self.arena.get(*id)?.parent()?;
        self.arena.get(parent).map(|entry| entry.get().key)
    }

    fn children(&self, node: NodeKey) -> Vec<NodeKey> {
        let Some(id) = self.keys.get(&node) else {
            return Vec::new();
        };
        id.children(&self.arena)
            .filter_map(|child| self.arena.get(child).map(|entry| entry.get().key))
            .collect()
    }

    fn tag_name(&self, node: NodeKey) -> Option<&str> {
        match &self.node(node)?.kind {
            NodeKind::Element { tag } => Some(tag.as_str()),
            NodeKind::Document | NodeKind::Text { .. } => None,
        }
    }

    fn attribute(&self, node: NodeKey, name: &str) -> Option<&str> {
        self.node(node)?.attr(name)
    }

    fn set_attribute(&mut self, node: NodeKey, name: &str, value: &str) -> Result<()> {
        let element = self.element_mut(node)?;
        if let Some(slot) = element.attrs.iter_mut().find(|(attr, _)| attr == name) {
            value.clone_into(&mut slot.1);
        } else {
            element.attrs.push((name.to_owned(), value.to_owned()));
        }
        Ok(())
    }

    fn offset_width(&self, node: NodeKey) -> f64 {
        self.node(node).map_or(0.0, |entry| entry.offset_width)
    }

    fn offset_height(&self, node: NodeKey) -> f64 {
        self.node(node).map_or(0.0, |entry| entry.offset_height)
    }

    fn image_state(&self, node: NodeKey) -> ImageState {
        match self.node(node).and_then(|entry| entry.media) {
            Some(Media::Image(state)) => state,
            _ => ImageState::default(),
        }
    }

    fn video_state(&self, node: NodeKey) -> VideoState {
        match self.node(node).and_then(|entry| entry.media) {
            Some(Media::Video(state)) => state,
            _ => VideoState::default(),
        }
    }

    fn precedes(&self, node: NodeKey, other: NodeKey) -> bool {
        if node == other {
            return false;
        }
        let (Ok(first), Ok(second)) = (self.id(node), self.id(other)) else {
            return false;
        };
        self.root
            .descendants(&self.arena)
            .find(|id| *id == first || *id == second)
            .is_some_and(|id| id == first)
    }

    fn focus(&mut self, node: NodeKey) -> Result<()> {
        self.id(node)?;
        trace!("focus {node:?}");
        self.focused = Some(node);
        self.focus_history.push(node);
        Ok(())
    }

    fn apply_media_event(&mut self, event: &MediaEvent) -> Result<()> {
        match *event {
            MediaEvent::Load {
                node,
                natural_width,
                natural_height,
            } => self.set_image_state(
                node,
                ImageState {
                    complete: true,
                    natural_width,
                    natural_height,
                },
            ),
            MediaEvent::LoadedMetadata {
                node,
                video_width,
                video_height,
            } => self.set_video_state(
                node,
                VideoState {
                    ready_state: VideoState::HAVE_METADATA,
                    video_width,
                    video_height,
                },
            ),
        }
    }
}
