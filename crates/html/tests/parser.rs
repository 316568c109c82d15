use html::{Document, parse_html};
use serde_json::json;

#[test]
fn parses_cells_and_seeds_media_state() {
    let _ = env_logger::builder().is_test(true).try_init();

    let dom = parse_html(
        r#"<div class="template-list" id="grid">
             <div><picture><img src="a.png" width="400" height="300"></picture></div>
             <div><picture><img src="b.png"></picture></div>
             <div><video width="640" height="360"></video></div>
           </div>"#,
    )
    .unwrap();

    let grid = dom.element_by_id("grid").unwrap();
    let cells = dom.element_children(grid);
    assert_eq!(cells.len(), 3);

    let images: Vec<_> = dom
        .descendants(grid)
        .into_iter()
        .filter(|node| dom.tag_name(*node) == Some("img"))
        .collect();
    assert_eq!(images.len(), 2);
    assert!(dom.image_state(images[0]).complete);
    assert_eq!(dom.image_state(images[0]).natural_height, 300.0);
    assert!(!dom.image_state(images[1]).complete);

    let video = dom.first_element("video").unwrap();
    assert_eq!(dom.video_state(video).video_width, 640.0);
}

#[test]
fn json_snapshot_is_deterministic() {
    let dom = parse_html(r#"<p id="x" class="b a">hi</p>"#).unwrap();
    let para = dom.element_by_id("x").unwrap();

    assert_eq!(
        dom.subtree_json(para),
        json!({
            "type": "element",
            "tag": "p",
            "attrs": { "class": "b a", "id": "x" },
            "children": [ { "type": "text", "text": "hi" } ],
        })
    );
    assert!(dom.to_json_string().contains("\"document\""));
    assert!(format!("{dom:?}").contains("<p class=\"b a\" id=\"x\">"));
}
