use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use mapview_config::MapViewConfig;
use mapview_core::LoadError;
use mapview_scene::{HoverEvent, MapView, PaneId, PointerEvent, RedrawReason};

const SINGLE_TOKEN: &str = r#"{
    "version": 3,
    "sources": ["a.js"],
    "sourcesContent": ["foo"],
    "names": [],
    "mappings": "AAAA"
}"#;

fn loaded(json: &str, generated: &str) -> Result<MapView> {
    let mut view = MapView::new(MapViewConfig::default());
    view.resize(800, 400);
    view.load_json(json, generated).context("loading map")?;
    Ok(view)
}

#[test]
fn hover_resolves_original_range() -> Result<()> {
    let mut view = loaded(SINGLE_TOKEN, "foo")?;

    let event = view
        .hover_position(PaneId::Generated, 0, 1)
        .context("hover on generated text")?;
    let mapping = event.mapping.context("position is mapped")?;
    assert_eq!(mapping.source(), Some(0));

    let range = view
        .range_of(PaneId::Original(0), &mapping)
        .context("mapping shown in a.js")?;
    assert_eq!((range.start_index, range.end_index), (0, 3));
    assert!(range.is_last);
    assert!(!range.out_of_bounds);
    Ok(())
}

#[test]
fn pointer_and_logical_hover_agree() -> Result<()> {
    let mut view = loaded(SINGLE_TOKEN, "foo")?;
    let logical = view.hover_position(PaneId::Generated, 0, 1);

    view.pointer_leave();
    let pane = view.pane(PaneId::Generated).context("generated pane")?;
    let text = pane.text_rect();
    let cw = pane.metrics().column_width;
    view.pointer_move(PointerEvent::new(text.x + 1.2 * cw, text.y + 1.0));
    let pointer = view.hover().map(|state| state.event());

    assert_eq!(logical, pointer);
    Ok(())
}

#[test]
fn reverse_query_returns_pixel_rect() -> Result<()> {
    let mut view = loaded(SINGLE_TOKEN, "foo")?;
    let mapping = view
        .hover_position(PaneId::Generated, 0, 0)
        .and_then(|event| event.mapping)
        .context("mapped")?;

    let pane = view.pane(PaneId::Original(0)).context("original pane")?;
    let text = pane.text_rect();
    let metrics = pane.metrics();
    let rect = view
        .mapping_rect(PaneId::Original(0), &mapping)
        .context("rect in original pane")?;
    assert_eq!(rect.x, text.x);
    assert_eq!(rect.y, text.y);
    assert_eq!(rect.w, 3.0 * metrics.column_width);
    assert_eq!(rect.h, metrics.line_height);
    Ok(())
}

#[test]
fn wrapped_mapping_spans_rows() -> Result<()> {
    let mut config = MapViewConfig::default();
    config.view.wrap_enabled = true;
    let mut view = MapView::new(config);
    // Narrow enough that the 40-column line wraps.
    view.resize(300, 400);
    view.load_json(SINGLE_TOKEN, "x".repeat(40))?;

    let mapping = view
        .hover_position(PaneId::Generated, 0, 0)
        .and_then(|event| event.mapping)
        .context("mapped")?;
    let rects = view.mapping_rects(PaneId::Generated, &mapping);
    assert!(rects.len() > 1);
    for pair in rects.windows(2) {
        assert!(pair[1].y > pair[0].y);
    }

    // The same position hovered on a later row still resolves.
    let last = view
        .hover_position(PaneId::Generated, 0, 39)
        .context("hover on last column")?;
    assert_eq!(last.mapping, Some(mapping));
    Ok(())
}

#[test]
fn unsupported_version_leaves_prior_state() -> Result<()> {
    let mut view = loaded(SINGLE_TOKEN, "foo")?;
    let t0 = Instant::now();
    view.frame(t0).context("first frame paints")?;

    let err = view
        .load_json(
            r#"{"version":2,"sources":["b.js"],"mappings":"AAAA"}"#,
            "bar",
        )
        .unwrap_err();
    assert!(matches!(err, LoadError::InvalidVersion { found: 2 }));

    let map = view.source_map().context("previous map kept")?;
    assert_eq!(map.sources()[0].name(), "a.js");
    assert_eq!(view.redraw_reasons(), &[RedrawReason::Error]);

    let panel = view.frame(t0 + Duration::from_millis(16)).context("error repaint")?;
    assert!(panel.contains_text("unsupported source map version 2"));
    assert!(!panel.contains_text("foo"));

    view.load_json(SINGLE_TOKEN, "foo")?;
    assert!(view.error().is_none());
    let frame = view.frame(t0 + Duration::from_millis(32)).context("reload repaint")?;
    assert!(frame.contains_text("foo"));
    Ok(())
}

#[test]
fn frame_loop_is_idle_until_something_changes() -> Result<()> {
    let mut view = loaded(SINGLE_TOKEN, "foo")?;
    let t0 = Instant::now();
    assert!(view.frame(t0).is_some());
    assert!(view.frame(t0 + Duration::from_millis(16)).is_none());
    assert!(view.frame(t0 + Duration::from_secs(2)).is_none());

    view.resize(640, 480);
    assert_eq!(view.redraw_reasons(), &[RedrawReason::Resize]);
    assert!(view.frame(t0 + Duration::from_secs(3)).is_some());
    assert!(view.frame(t0 + Duration::from_secs(4)).is_none());
    Ok(())
}

#[test]
fn caret_blinks_when_hover_is_unmapped() -> Result<()> {
    let json = r#"{"version":3,"sources":["a.js"],"sourcesContent":["foo"],"mappings":"GAAA"}"#;
    let mut view = loaded(json, "ab foo")?;
    let t0 = Instant::now();
    view.frame(t0);

    // Column 1 is before the only mapping.
    let event = view
        .hover_position(PaneId::Generated, 0, 1)
        .context("on text")?;
    assert!(event.mapping.is_none());
    assert!(view.frame(t0 + Duration::from_millis(1)).is_some());
    assert!(view.frame(t0 + Duration::from_millis(2)).is_none());
    assert!(view.frame(t0 + Duration::from_secs(1)).is_some());
    Ok(())
}

#[test]
fn click_reveals_mapping_in_other_pane() -> Result<()> {
    let original: String = "x\n".repeat(200);
    // Generated 0:0 maps to a.js line 150.
    let json = format!(
        r#"{{"version":3,"sources":["a.js"],"sourcesContent":[{}],"mappings":"AAsJA"}}"#,
        serde_json_string(&original)
    );
    let mut view = loaded(&json, "x")?;
    let t0 = Instant::now();
    view.frame(t0);

    let pane = view.pane(PaneId::Generated).context("generated pane")?;
    let text = pane.text_rect();
    let cw = pane.metrics().column_width;
    assert!(view.pointer_down(PointerEvent::new(text.x + 0.5 * cw, text.y + 1.0)).is_handled());
    assert!(view.redraw_reasons().contains(&RedrawReason::Animation));

    let start = t0 + Duration::from_millis(10);
    assert!(view.frame(start).is_some());
    let mid = view.frame(start + Duration::from_millis(125));
    assert!(mid.is_some());
    let halfway = view.pane(PaneId::Original(0)).context("original")?.scroll()[1];
    assert!(halfway > 0.0);

    assert!(view.frame(start + Duration::from_millis(300)).is_some());
    let pane = view.pane(PaneId::Original(0)).context("original")?;
    let lh = pane.metrics().line_height;
    let expected = 150.0 * lh + lh * 0.5 - pane.text_rect().h * 0.5;
    assert!((pane.scroll()[1] - expected).abs() < 1e-3);
    assert!(halfway < expected);

    assert!(view.frame(start + Duration::from_millis(320)).is_none());
    Ok(())
}

#[test]
fn hover_stream_reports_changes() -> Result<()> {
    let mut view = loaded(SINGLE_TOKEN, "foo")?;
    let events: Rc<RefCell<Vec<Option<HoverEvent>>>> = Rc::default();
    let sink = Rc::clone(&events);
    view.subscribe(move |event| sink.borrow_mut().push(event.copied()));

    view.hover_position(PaneId::Generated, 0, 1);
    view.hover_position(PaneId::Original(0), 0, 2);
    view.pointer_leave();

    let events = events.borrow();
    assert_eq!(events.len(), 3);
    let first = events[0].context("hover event")?;
    assert_eq!(first.pane_index, None);
    assert_eq!(first.column, 1);
    let second = events[1].context("hover event")?;
    assert_eq!(second.pane_index, Some(0));
    assert_eq!(second.mapping, first.mapping);
    assert!(events[2].is_none());
    Ok(())
}

const UNMAPPED: &str = r#"{"version":3,"sources":["a.js"],"sourcesContent":["a"],"mappings":""}"#;

/// Press on the generated text, drag it up by 40px in two moves and
/// release.
fn fling_generated(view: &mut MapView) -> Result<(f32, f32)> {
    let text = view.pane(PaneId::Generated).context("generated pane")?.text_rect();
    let (x, y) = (text.x + 10.0, text.y + 200.0);
    let before = view.pane(PaneId::Generated).context("generated pane")?.scroll()[1];
    assert!(view.pointer_down(PointerEvent::new(x, y)).is_handled());
    view.pointer_move(PointerEvent::new(x, y - 20.0));
    view.pointer_move(PointerEvent::new(x, y - 40.0));
    let dragged = view.pane(PaneId::Generated).context("generated pane")?.scroll()[1];
    assert_eq!(dragged - before, 40.0);
    assert!(view.pointer_up(PointerEvent::new(x, y - 40.0)).is_handled());
    Ok((x, y))
}

#[test]
fn released_drag_coasts_until_friction_stops_it() -> Result<()> {
    let mut view = loaded(UNMAPPED, &"x\n".repeat(300))?;
    let t0 = Instant::now();
    view.frame(t0);

    fling_generated(&mut view)?;
    assert!(view.redraw_reasons().contains(&RedrawReason::Animation));
    // No caret, so only the fling asks for frames.
    view.pointer_leave();

    let mut previous = 40.0;
    let mut painted = 0;
    for k in 1..200u64 {
        if view.frame(t0 + Duration::from_millis(16 * k)).is_none() {
            break;
        }
        painted += 1;
        let scroll = view.pane(PaneId::Generated).context("generated pane")?.scroll()[1];
        assert!(scroll >= previous);
        previous = scroll;
    }
    assert!(painted > 10 && painted < 199);
    assert!(previous > 60.0);
    assert!(previous < 40.0 + 20.0 * 0.93 / 0.07);
    assert!(!view.pane(PaneId::Generated).context("generated pane")?.is_animating());
    Ok(())
}

#[test]
fn new_hover_or_load_stops_a_fling() -> Result<()> {
    let generated = "x\n".repeat(300);
    let mut view = loaded(UNMAPPED, &generated)?;
    let (x, y) = fling_generated(&mut view)?;
    assert!(view.pane(PaneId::Generated).context("generated pane")?.is_animating());

    view.pointer_move(PointerEvent::new(x, y - 120.0));
    assert!(!view.pane(PaneId::Generated).context("generated pane")?.is_animating());

    fling_generated(&mut view)?;
    view.load_json(UNMAPPED, generated)?;
    assert!(!view.pane(PaneId::Generated).context("generated pane")?.is_animating());
    Ok(())
}

#[test]
fn huge_logical_column_resolves_without_overflow() -> Result<()> {
    let mut view = loaded(UNMAPPED, "\t")?;
    let event = view
        .hover_position(PaneId::Generated, 0, usize::MAX)
        .context("line 0 exists")?;
    assert!(event.mapping.is_none());
    assert!(view.hover_position(PaneId::Generated, usize::MAX, 0).is_none());
    Ok(())
}

fn serde_json_string(text: &str) -> String {
    format!("\"{}\"", text.replace('\n', "\\n"))
}
