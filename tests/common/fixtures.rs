use test_demux::parser::dump_parser::parse;
use test_demux::tree::snapshot::Snapshot;

pub const PACKAGE: &str = "com.example.app";

/// One `<node>` element. `extra` is spliced in verbatim (flags, text, ...).
pub fn node(index: u32, class: &str, bounds: &str, extra: &str, children: &[String]) -> String {
    let open = format!(
        r#"<node index="{}" class="{}" package="{}" content-desc="" bounds="{}" {}"#,
        index, class, PACKAGE, bounds, extra
    );
    if children.is_empty() {
        format!("{}/>", open)
    } else {
        format!("{}>{}</node>", open, children.concat())
    }
}

/// Wrap widgets in the document elements uiautomator writes.
pub fn hierarchy(widgets: &[String]) -> String {
    format!(
        r#"<?xml version='1.0' encoding='UTF-8' standalone='yes' ?><hierarchy rotation="0">{}</hierarchy>"#,
        widgets.concat()
    )
}

pub fn snapshot(xml: &str) -> Snapshot {
    parse(xml).expect("fixture should parse")
}

const CLICKABLE: &str = r#"clickable="true""#;
const SCROLLABLE: &str = r#"scrollable="true""#;

fn frame(children: &[String]) -> String {
    node(0, "android.widget.FrameLayout", "[0,0][400,800]", "", children)
}

/// Root (0,0)-(400,800) with button A at the top and button B at the bottom.
pub fn two_buttons() -> String {
    hierarchy(&[frame(&[
        node(0, "android.widget.Button", "[0,0][400,100]", CLICKABLE, &[]),
        node(1, "android.widget.Button", "[0,700][400,800]", CLICKABLE, &[]),
    ])])
}

/// [`two_buttons`] plus a full-screen overlay C after A and B.
pub fn two_buttons_with_overlay() -> String {
    hierarchy(&[frame(&[
        node(0, "android.widget.Button", "[0,0][400,100]", CLICKABLE, &[]),
        node(1, "android.widget.Button", "[0,700][400,800]", CLICKABLE, &[]),
        node(2, "android.view.View", "[0,0][400,800]", "", &[]),
    ])])
}

/// A scrollable list filling the screen, rendering rows `first..first + count`,
/// each 100px tall and holding a non-clickable label.
pub fn list_page(first: u32, count: u32) -> String {
    let rows: Vec<String> = (first..first + count)
        .map(|i| {
            let top = (i - first) * 100;
            let bounds = format!("[0,{}][400,{}]", top, top + 100);
            let label = node(
                0,
                "android.widget.TextView",
                &format!("[20,{}][380,{}]", top + 10, top + 90),
                &format!(r#"text="Row {}""#, i),
                &[],
            );
            node(i, "android.widget.LinearLayout", &bounds, "", &[label])
        })
        .collect();

    let list = node(
        0,
        "android.widget.ListView",
        "[0,0][400,800]",
        &format!("{} {}", SCROLLABLE, CLICKABLE),
        &rows,
    );
    hierarchy(&[frame(&[list])])
}

/// A scroll view whose button (0.0.0.0) sits behind a bottom toolbar (0.1).
/// `button_top` places the button; it is 100px tall.
pub fn button_behind_toolbar(button_top: u32) -> String {
    let button = node(
        0,
        "android.widget.Button",
        &format!("[0,{}][400,{}]", button_top, button_top + 100),
        CLICKABLE,
        &[],
    );
    let content = node(0, "android.widget.LinearLayout", "[0,0][400,1600]", "", &[button]);
    let scroll = node(0, "android.widget.ScrollView", "[0,0][400,800]", SCROLLABLE, &[content]);
    let toolbar = node(1, "android.widget.Toolbar", "[0,600][400,800]", "", &[]);
    hierarchy(&[frame(&[scroll, toolbar])])
}

fn carousel_strip(first: u32, count: u32) -> String {
    let items: Vec<String> = (first..first + count)
        .map(|i| {
            let left = (i - first) * 100;
            let bounds = format!("[{},0][{},100]", left, left + 100);
            node(i, "android.widget.ImageView", &bounds, CLICKABLE, &[])
        })
        .collect();
    node(0, "android.widget.HorizontalScrollView", "[0,0][400,100]", SCROLLABLE, &items)
}

/// A horizontal strip across the top of the screen, rendering items
/// `first..first + count`, each 100px wide.
pub fn carousel(first: u32, count: u32) -> String {
    hierarchy(&[frame(&[carousel_strip(first, count)])])
}

/// [`carousel`] with a side panel (0.1) covering the rightmost 100px of the screen.
pub fn carousel_under_side_panel(first: u32) -> String {
    let panel = node(1, "android.view.View", "[300,0][400,800]", "", &[]);
    hierarchy(&[frame(&[carousel_strip(first, 4), panel])])
}
