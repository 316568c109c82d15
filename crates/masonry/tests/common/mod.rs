#![allow(dead_code, reason = "Each test binary uses a different subset")]

use html::{Document, Dom, ImageState, NodeKey};

pub struct Grid {
    pub dom: Dom,
    pub container: NodeKey,
    pub cells: Vec<NodeKey>,
    /// The `picture > img` of each cell.
    pub images: Vec<NodeKey>,
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A cell holding `<picture><img></picture>`. A zero width leaves the image
/// undecoded.
pub fn image_cell(dom: &mut Dom, parent: NodeKey, width: f64, height: f64) -> (NodeKey, NodeKey) {
    let cell = dom.create_element("div");
    let picture = dom.create_element("picture");
    let img = dom.create_element("img");
    dom.append_child(parent, cell).unwrap();
    dom.append_child(cell, picture).unwrap();
    dom.append_child(picture, img).unwrap();
    if width > 0.0 {
        dom.set_image_state(
            img,
            ImageState {
                complete: true,
                natural_width: width,
                natural_height: height,
            },
        )
        .unwrap();
    }
    (cell, img)
}

/// A `.template-list` container of `container_width` holding one image cell
/// per `(natural_width, natural_height)` pair.
pub fn image_grid(container_width: f64, sizes: &[(f64, f64)]) -> Grid {
    let mut dom = Dom::new();
    let container = dom.create_element("div");
    dom.set_attribute(container, "class", "template-list")
        .unwrap();
    dom.append_child(NodeKey::ROOT, container).unwrap();
    dom.set_offset_width(container, container_width).unwrap();

    let mut cells = Vec::new();
    let mut images = Vec::new();
    for (width, height) in sizes {
        let (cell, img) = image_cell(&mut dom, container, *width, *height);
        cells.push(cell);
        images.push(img);
    }
    Grid {
        dom,
        container,
        cells,
        images,
    }
}

/// Outer heights of the realized columns.
pub fn heights(masonry: &masonry::Masonry) -> Vec<f64> {
    masonry
        .columns()
        .iter()
        .map(|column| column.outer_height)
        .collect()
}
