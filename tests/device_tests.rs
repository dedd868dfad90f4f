use test_demux::device::{
    adb::{parse_device_list, parse_screen_size},
    device_model::{ActivityIntent, DragGesture},
};
use test_demux::tree::geometry::Point;

#[test]
fn device_list_keeps_ready_devices() {
    let output = "\
* daemon started successfully
List of devices attached
emulator-5554\tdevice
0123456789ABCDEF\tunauthorized
R58M123ABC\tdevice product:beyond1 model:SM_G973F

";
    assert_eq!(parse_device_list(output), vec!["emulator-5554", "R58M123ABC"]);
    assert!(parse_device_list("List of devices attached\n\n").is_empty());
}

#[test]
fn screen_size_prefers_override() {
    assert_eq!(parse_screen_size("Physical size: 1080x1920\n"), Some((1080, 1920)));
    assert_eq!(
        parse_screen_size("Physical size: 1440x2960\nOverride size: 1080x2220\n"),
        Some((1080, 2220))
    );
    assert_eq!(parse_screen_size("error: closed"), None);
}

#[test]
fn gesture_steps_are_never_zero() {
    let g = DragGesture::new(Point::new(0, 0), Point::new(0, 10), 0, 500);
    assert_eq!(g.steps, 1);

    let g = DragGesture::interpolated(Point::new(0, 0), Point::new(300, 400), 500);
    assert_eq!(g.steps, 125);
}

#[test]
fn intent_maps_onto_am_start_options() {
    let intent = ActivityIntent {
        action: Some("android.intent.action.VIEW".into()),
        component: Some("com.example.app/.MainActivity".into()),
        data: Some("https://example.com".into()),
        mime_type: Some("text/html".into()),
        categories: vec!["android.intent.category.BROWSABLE".into()],
        flags: 0x1000_0000,
    };
    assert_eq!(
        intent.am_start_args(),
        vec![
            "-a", "android.intent.action.VIEW",
            "-d", "https://example.com",
            "-t", "text/html",
            "-c", "android.intent.category.BROWSABLE",
            "-f", "0x10000000",
            "-n", "com.example.app/.MainActivity",
        ]
    );
    assert_eq!(intent.to_string(), "com.example.app/.MainActivity");

    let bare = ActivityIntent {
        action: Some("android.settings.SETTINGS".into()),
        ..ActivityIntent::default()
    };
    assert_eq!(bare.am_start_args(), vec!["-a", "android.settings.SETTINGS"]);
    assert_eq!(bare.to_string(), "android.settings.SETTINGS");
    assert!(ActivityIntent::default().is_empty());
}
