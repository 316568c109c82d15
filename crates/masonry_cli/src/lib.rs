//! Lay out the masonry grid of an HTML file at a fixed container width.

#![allow(
    clippy::missing_inline_in_public_items,
    reason = "Inlining decisions left to compiler for this crate"
)]

use anyhow::{Context as _, Result, anyhow, bail};
use html::{Dom, NodeKey, parse_html};
use log::info;
use masonry::{LayoutState, Masonry, MasonryConfig, host};
use serde_json::{Value, json};
use std::path::PathBuf;
use tokio::fs;
use tokio::sync::mpsc;
use url::Url;

const USAGE: &str =
    "usage: masonry <file.html> <width> [--container <#id|.class>] [--url <page-url>]";

/// Class the container is looked up by when no selector is given.
pub const DEFAULT_CONTAINER_CLASS: &str = "template-list";

#[derive(Clone, Debug, PartialEq)]
pub struct Options {
    pub path: PathBuf,
    pub width: f64,
    /// `#id` or `.class`; defaults to the first `.template-list`.
    pub selector: Option<String>,
    pub page_url: Option<Url>,
}

impl Options {
    /// Parse `<file> <width> [--container <sel>] [--url <page-url>]`, without
    /// the program name.
    ///
    /// # Errors
    /// Returns an error for missing positionals, an unparsable width or URL,
    /// or an unknown flag.
    pub fn from_args<I: IntoIterator<Item = String>>(args: I) -> Result<Self> {
        let mut positionals = Vec::new();
        let mut selector = None;
        let mut page_url = None;
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--container" => {
                    selector = Some(args.next().context("--container needs a selector")?);
                }
                "--url" => {
                    let raw = args.next().context("--url needs a value")?;
                    let url = Url::parse(&raw)
                        .with_context(|| format!("Invalid page URL {raw}"))?;
                    page_url = Some(url);
                }
                flag if flag.starts_with("--") => bail!("Unknown flag {flag}"),
                _ => positionals.push(arg),
            }
        }
        let [path, width] = <[String; 2]>::try_from(positionals)
            .map_err(|_| anyhow!(USAGE))?;
        let width = width
            .parse::<f64>()
            .with_context(|| format!("Invalid container width {width}"))?;
        Ok(Self {
            path: PathBuf::from(path),
            width,
            selector,
            page_url,
        })
    }
}

/// Resolve the layout container in `dom`.
///
/// # Errors
/// Returns an error when nothing matches.
pub fn find_container(dom: &Dom, selector: Option<&str>) -> Result<NodeKey> {
    let found = match selector {
        Some(sel) => {
            if let Some(id) = sel.strip_prefix('#') {
                dom.element_by_id(id)
            } else if let Some(class) = sel.strip_prefix('.') {
                dom.elements_with_class(class).first().copied()
            } else {
                bail!("Container selector must start with '#' or '.', got {sel}");
            }
        }
        None => dom
            .elements_with_class(DEFAULT_CONTAINER_CLASS)
            .first()
            .copied(),
    };
    found.ok_or_else(|| {
        anyhow!(
            "No container matching {}",
            selector.unwrap_or(DEFAULT_CONTAINER_CLASS)
        )
    })
}

/// Parse `source`, size its container and run a full layout pass.
///
/// No media loader is attached: images and videos without authored
/// dimensions leave the pass waiting, which is reported as `Placing`.
///
/// # Errors
/// Propagates parse and document failures.
pub async fn layout(
    source: &str,
    options: &Options,
    config: MasonryConfig,
) -> Result<(Dom, Masonry, LayoutState)> {
    let mut dom = parse_html(source)?;
    let container = find_container(&dom, options.selector.as_deref())?;
    dom.set_offset_width(container, options.width)?;

    let config = match &options.page_url {
        Some(url) => config.with_page_url(url),
        None => config,
    };
    let mut masonry = Masonry::for_container(&dom, container, config);
    info!(
        "laying out {} cells at {}px",
        masonry.cells().len(),
        options.width
    );

    let (events, mut receiver) = mpsc::channel(1);
    drop(events);
    let state = host::drive(&mut masonry, &mut dom, &mut receiver).await?;
    Ok((dom, masonry, state))
}

/// JSON summary of a finished pass.
pub fn report(masonry: &Masonry, state: LayoutState) -> Value {
    json!({
        "state": format!("{state:?}"),
        "column_width": masonry.column_width(),
        "columns": masonry.report(),
    })
}

/// Read and lay out the file named by `options`, returning the printed tree
/// followed by the pretty JSON report.
///
/// # Errors
/// Returns I/O, parse and layout failures with context.
pub async fn run(options: &Options) -> Result<String> {
    let source = fs::read_to_string(&options.path)
        .await
        .with_context(|| format!("Failed to read {}", options.path.display()))?;
    let (dom, masonry, state) = layout(&source, options, MasonryConfig::from_env()).await?;
    let summary = serde_json::to_string_pretty(&report(&masonry, state))?;
    Ok(format!("{dom:?}\n{summary}\n"))
}
