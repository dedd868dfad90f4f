use test_demux::analysis::occlusion::{OcclusionAnalyzer, find_occluders, occludes};
use test_demux::tree::identity::UniqueId;

use crate::common::fixtures::{
    button_behind_toolbar, hierarchy, node, snapshot, two_buttons, two_buttons_with_overlay,
};

mod common;

fn id(s: &str) -> UniqueId {
    s.parse().expect("valid id")
}

#[test]
fn ancestors_and_descendants_never_occlude() {
    // Parent and child share the exact same rectangle.
    let xml = hierarchy(&[node(
        0,
        "android.widget.FrameLayout",
        "[0,0][400,800]",
        "",
        &[node(
            0,
            "android.widget.LinearLayout",
            "[0,0][400,800]",
            "",
            &[node(0, "android.widget.Button", "[0,0][400,800]", "", &[])],
        )],
    )]);
    let snap = snapshot(&xml);
    let mut analyzer = OcclusionAnalyzer::new();

    for target in snap.root().descendants() {
        assert!(
            !analyzer.is_occluded(target, snap.root()),
            "{} reported occluded by its own line",
            target.unique_id()
        );
        for other in snap.root().descendants() {
            assert!(!occludes(target, other));
        }
    }
}

#[test]
fn disjoint_siblings_do_not_occlude() {
    let xml = hierarchy(&[node(
        0,
        "android.widget.FrameLayout",
        "[0,0][100,100]",
        "",
        &[
            node(0, "android.view.View", "[0,0][10,10]", "", &[]),
            node(1, "android.view.View", "[20,20][30,30]", "", &[]),
        ],
    )]);
    let snap = snapshot(&xml);
    let a = snap.find(&id("0.0")).unwrap();
    let b = snap.find(&id("0.1")).unwrap();

    assert!(!occludes(a, b));
    assert!(!OcclusionAnalyzer::new().is_occluded(a, snap.root()));
}

#[test]
fn overlapping_siblings_occlude_each_other() {
    let xml = hierarchy(&[node(
        0,
        "android.widget.FrameLayout",
        "[0,0][100,100]",
        "",
        &[
            node(0, "android.view.View", "[0,0][50,50]", "", &[]),
            node(1, "android.view.View", "[40,40][90,90]", "", &[]),
        ],
    )]);
    let snap = snapshot(&xml);
    let a = snap.find(&id("0.0")).unwrap();
    let b = snap.find(&id("0.1")).unwrap();

    assert!(occludes(a, b));
    assert!(occludes(b, a));
}

#[test]
fn separated_buttons_are_not_occluded() {
    let snap = snapshot(&two_buttons());
    let mut analyzer = OcclusionAnalyzer::new();

    assert!(!analyzer.is_occluded(snap.find(&id("0.0")).unwrap(), snap.root()));
    assert!(!analyzer.is_occluded(snap.find(&id("0.1")).unwrap(), snap.root()));
    assert!(analyzer.occluders().is_empty());
}

#[test]
fn full_screen_overlay_occludes_button() {
    let snap = snapshot(&two_buttons_with_overlay());
    let a = snap.find(&id("0.0")).unwrap();
    let mut analyzer = OcclusionAnalyzer::new();

    assert!(analyzer.is_occluded(a, snap.root()));
    let occluders: Vec<String> = analyzer
        .occluders()
        .iter()
        .map(|o| snap.get(*o).unwrap().unique_id().to_string())
        .collect();
    assert_eq!(occluders, vec!["0.2"]);
}

#[test]
fn occluder_list_is_replaced_on_each_call() {
    let snap = snapshot(&two_buttons_with_overlay());
    let mut analyzer = OcclusionAnalyzer::new();

    assert!(analyzer.is_occluded(snap.find(&id("0.0")).unwrap(), snap.root()));
    assert!(analyzer.is_occluded(snap.find(&id("0.1")).unwrap(), snap.root()));
    assert_eq!(analyzer.occluders().len(), 1);

    // The overlay is covered by both buttons.
    assert!(analyzer.is_occluded(snap.find(&id("0.2")).unwrap(), snap.root()));
    assert_eq!(analyzer.occluders().len(), 2);
}

#[test]
fn toolbar_covers_button_in_scroll_view() {
    let snap = snapshot(&button_behind_toolbar(650));
    let target = snap.find(&id("0.0.0.0")).unwrap();

    let occluders: Vec<String> = find_occluders(target, snap.root())
        .iter()
        .map(|n| n.unique_id().to_string())
        .collect();
    assert_eq!(occluders, vec!["0.1"]);
}

#[test]
fn generations_are_never_mixed() {
    let first = snapshot(&two_buttons_with_overlay());
    let second = snapshot(&two_buttons_with_overlay());
    let target = first.find(&id("0.0")).unwrap();

    assert!(find_occluders(target, second.root()).is_empty());
    // Same-looking node from another generation is not the same node.
    assert_ne!(target, second.find(&id("0.0")).unwrap());
    assert!(target.same_attributes(&second.find(&id("0.0")).unwrap()));
}
