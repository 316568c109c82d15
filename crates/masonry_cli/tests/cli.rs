use html::{Document, parse_html};
use masonry::{COMPLETE_CLASS, LayoutState, MasonryConfig};
use masonry_cli::{Options, find_container, layout, report};

const PAGE: &str = r#"<!DOCTYPE html>
<html><body>
  <a href="/">Home</a>
  <div class="template-list" id="list">
    <div><picture><img src="a.png" width="260" height="100"></picture><div>a</div></div>
    <div><picture><img src="b.png" width="260" height="300"></picture><div>b</div></div>
    <div><picture><img src="c.png" width="130" height="50"></picture><div>c</div></div>
  </div>
</body></html>"#;

fn options(args: &[&str]) -> Options {
    Options::from_args(args.iter().map(|arg| (*arg).to_owned()))
        .unwrap()
}

#[test]
fn parses_positionals_and_flags() {
    let parsed = options(&[
        "page.html",
        "800",
        "--container",
        "#list",
        "--url",
        "https://example.com/?debug-template-list",
    ]);
    assert_eq!(parsed.width, 800.0);
    assert_eq!(parsed.selector.as_deref(), Some("#list"));
    assert!(parsed.page_url.is_some());

    assert!(Options::from_args(vec!["page.html".to_owned()]).is_err());
    assert!(Options::from_args(vec!["page.html".to_owned(), "wide".to_owned()]).is_err());
    let unknown_flag = vec!["a".to_owned(), "1".to_owned(), "--bogus".to_owned()];
    assert!(Options::from_args(unknown_flag).is_err());
}

#[test]
fn container_lookup_accepts_ids_and_classes() {
    let dom = parse_html(PAGE).unwrap();
    let by_id = find_container(&dom, Some("#list")).unwrap();
    assert_eq!(find_container(&dom, Some(".template-list")).unwrap(), by_id);
    assert_eq!(find_container(&dom, None).unwrap(), by_id);
    assert!(find_container(&dom, Some("#missing")).is_err());
    assert!(find_container(&dom, Some("list")).is_err());
}

#[tokio::test]
async fn lays_out_authored_images_and_reports_columns() {
    let (dom, masonry, state) =
        layout(PAGE, &options(&["page.html", "600"]), MasonryConfig::default())
            .await
            .unwrap();

    assert_eq!(state, LayoutState::Complete);
    assert!(dom.has_class(masonry.container(), COMPLETE_CLASS));

    let summary = report(&masonry, state);
    assert_eq!(summary["state"], "Complete");
    assert_eq!(summary["column_width"], 260.0);
    let columns = summary["columns"].as_array().unwrap();
    assert_eq!(columns.len(), 2);
    // The short third cell fills the gap under the first.
    assert_eq!(columns[0]["outer_height"], 200.0);
    assert_eq!(columns[1]["outer_height"], 300.0);
    assert_eq!(columns[0]["cells"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn images_without_dimensions_leave_the_pass_waiting() {
    let page = r#"<div class="template-list">
        <div><picture><img src="a.png" width="260" height="100"></picture></div>
        <div><picture><img src="lazy.png"></picture></div>
    </div>"#;

    let (_dom, masonry, state) =
        layout(page, &options(&["page.html", "600"]), MasonryConfig::default())
            .await
            .unwrap();

    assert_eq!(state, LayoutState::Placing);
    assert_eq!(masonry.placements().len(), 1);
}
