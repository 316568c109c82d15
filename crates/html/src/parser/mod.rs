//! Builds a [`Dom`] from authored HTML with html5ever.
//!
//! Media elements are seeded from their attributes: an `<img>` carrying both
//! `width` and `height` starts out decoded with that natural size, a `<video>`
//! with both starts out with metadata loaded. Media without dimensions stays
//! pending until a [`crate::MediaEvent`] arrives.

use crate::{Document as _, Dom, ImageState, NodeKey, VideoState};
use anyhow::{Context as _, Result};
use html5ever::tendril::TendrilSink as _;
use html5ever::tree_builder::TreeBuilderOpts;
use html5ever::{ParseOpts, parse_document};
use log::debug;
use markup5ever_rcdom::{Handle, NodeData, RcDom};

/// Parse a full document or a body fragment.
///
/// # Errors
/// Returns an error if html5ever fails to read the input or the tree cannot be
/// assembled.
pub fn parse_html(html: &str) -> Result<Dom> {
    let opts = ParseOpts {
        tree_builder: TreeBuilderOpts {
            exact_errors: false,
            scripting_enabled: false,
            ..TreeBuilderOpts::default()
        },
        ..ParseOpts::default()
    };
    let parsed = parse_document(RcDom::default(), opts)
        .from_utf8()
        .read_from(&mut html.as_bytes())
        .context("Failed to parse HTML")?;

    let mut dom = Dom::new();
    convert(&mut dom, &parsed.document, NodeKey::ROOT)?;
    debug!("parsed {} bytes of HTML", html.len());
    Ok(dom)
}

fn convert(dom: &mut Dom, handle: &Handle, parent: NodeKey) -> Result<()> {
    match &handle.data {
        NodeData::Document => {
            for child in handle.children.borrow().iter() {
                convert(dom, child, parent)?;
            }
        }
        NodeData::Text { contents } => {
            let text = contents.borrow().to_string();
            if !text.trim().is_empty() {
                let node = dom.create_text(&text);
                dom.append_child(parent, node)?;
            }
        }
        NodeData::Element { name, attrs, .. } => {
            let node = dom.create_element(&name.local);
            for attr in attrs.borrow().iter() {
                dom.set_attribute(node, &attr.name.local, &attr.value)?;
            }
            seed_media(dom, node)?;
            dom.append_child(parent, node)?;
            for child in handle.children.borrow().iter() {
                convert(dom, child, node)?;
            }
        }
        NodeData::Doctype { .. }
        | NodeData::Comment { .. }
        | NodeData::ProcessingInstruction { .. } => {}
    }
    Ok(())
}

fn dimension(dom: &Dom, node: NodeKey, name: &str) -> Option<f64> {
    dom.attribute(node, name)?
        .trim()
        .trim_end_matches("px")
        .parse::<f64>()
        .ok()
        .filter(|value| *value > 0.0)
}

fn seed_media(dom: &mut Dom, node: NodeKey) -> Result<()> {
    let width = dimension(dom, node, "width");
    let Some((width, height)) = width.zip(dimension(dom, node, "height")) else {
        return Ok(());
    };
    let tag = dom.tag_name(node).map(str::to_owned);
    match tag.as_deref() {
        Some("img") => dom.set_image_state(
            node,
            ImageState {
                complete: true,
                natural_width: width,
                natural_height: height,
            },
        ),
        Some("video") => dom.set_video_state(
            node,
            VideoState {
                ready_state: VideoState::HAVE_METADATA,
                video_width: width,
                video_height: height,
            },
        ),
        _ => Ok(()),
    }
}
