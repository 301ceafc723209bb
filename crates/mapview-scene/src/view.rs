//! The visualizer facade.
//!
//! `MapView` owns the loaded map, one pane for the generated text and one per
//! original source, the shared hover state and the redraw queue. The active
//! original pane fills the left half of the view, the generated pane the
//! right half.

use std::time::{Duration, Instant};

use mapview_config::MapViewConfig;
use mapview_core::{KeyOrder, LoadError, MappingRecord, Records, SourceMap};
use mapview_surface::{DisplayList, Rect, Viewport};
use mapview_text::{ClusterWidths, LayoutOptions, TextLayout, TextMetrics, TieBreak, UNBOUNDED};
use tracing::{debug, trace, warn};

use crate::animation::CaretBlink;
use crate::events::{Axis, EventResult, PointerEvent, WheelEvent};
use crate::hover::{HoverEvent, HoverState, HoverSubscribers, SubscriptionId};
use crate::pane::{Pane, PaneId, PaneMetrics};
use crate::query::{self, MappingRange};
use crate::redraw::{RedrawQueue, RedrawReason};
use crate::render::{self, Frame, PaneFrame};
use crate::style::Theme;

/// Scrollbar drag in progress. Exists only between pointer-down on a thumb
/// and the matching pointer-up.
#[derive(Debug, Clone, Copy, PartialEq)]
struct DragState {
    pane: PaneId,
    axis: Axis,
    /// Pointer offset from the thumb's leading edge.
    grab: f32,
}

/// Content drag in progress. Exists only between pointer-down on a pane's
/// text and the matching pointer-up, which hands `velocity` to the pane as
/// a fling.
#[derive(Debug, Clone, Copy, PartialEq)]
struct PanState {
    pane: PaneId,
    last: [f32; 2],
    /// Scroll delta of the latest move, in pixels.
    velocity: [f32; 2],
}

pub struct MapView {
    config: MapViewConfig,
    metrics: PaneMetrics,
    layout_options: LayoutOptions,
    widths: ClusterWidths,
    theme: Theme,
    map: Option<SourceMap>,
    generated: Pane,
    originals: Vec<Pane>,
    active_source: usize,
    viewport: Viewport,
    hover: Option<HoverState>,
    caret: CaretBlink,
    drag: Option<DragState>,
    pan: Option<PanState>,
    error: Option<String>,
    redraw: RedrawQueue,
    subscribers: HoverSubscribers,
}

impl MapView {
    pub fn new(config: MapViewConfig) -> Self {
        Self::with_widths(config, ClusterWidths::default())
    }

    /// Measure clusters through `metrics` instead of the default monospace
    /// estimate.
    pub fn with_text_metrics(config: MapViewConfig, metrics: impl TextMetrics + 'static) -> Self {
        Self::with_widths(config, ClusterWidths::new(metrics))
    }

    fn with_widths(config: MapViewConfig, mut widths: ClusterWidths) -> Self {
        let metrics = PaneMetrics::from(&config.text);
        let layout_options = LayoutOptions {
            tab_width: config.text.tab_width,
        };
        let wrap_enabled = config.view.wrap_enabled;
        let generated = Pane::new(
            PaneId::Generated,
            TextLayout::new(String::new(), layout_options, &mut widths),
            metrics,
            wrap_enabled,
        );
        let caret = CaretBlink::new(Duration::from_millis(config.animation.caret_blink_ms));
        Self {
            config,
            metrics,
            layout_options,
            widths,
            theme: Theme::default(),
            map: None,
            generated,
            originals: Vec::new(),
            active_source: 0,
            viewport: Viewport::default(),
            hover: None,
            caret,
            drag: None,
            pan: None,
            error: None,
            redraw: RedrawQueue::new(),
            subscribers: HoverSubscribers::new(),
        }
    }

    pub fn config(&self) -> &MapViewConfig {
        &self.config
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
        self.redraw.request(RedrawReason::Load);
    }

    pub fn source_map(&self) -> Option<&SourceMap> {
        self.map.as_ref()
    }

    /// Message shown in place of the panes after a rejected document.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn hover(&self) -> Option<&HoverState> {
        self.hover.as_ref()
    }

    pub fn active_source(&self) -> usize {
        self.active_source
    }

    pub fn wrap_enabled(&self) -> bool {
        self.config.view.wrap_enabled
    }

    /// Reasons requested since the last painted frame.
    pub fn redraw_reasons(&self) -> &[RedrawReason] {
        self.redraw.pending()
    }

    pub fn needs_redraw(&self) -> bool {
        self.redraw.is_dirty()
    }

    pub fn pane(&self, id: PaneId) -> Option<&Pane> {
        match id {
            PaneId::Generated => Some(&self.generated),
            PaneId::Original(source) => self.originals.get(source),
        }
    }

    fn pane_mut(&mut self, id: PaneId) -> Option<&mut Pane> {
        match id {
            PaneId::Generated => Some(&mut self.generated),
            PaneId::Original(source) => self.originals.get_mut(source),
        }
    }

    /// Panes currently on screen: the active original (if any) and the
    /// generated pane.
    fn visible_panes(&self) -> Vec<PaneId> {
        let mut panes = Vec::with_capacity(2);
        if self.active_source < self.originals.len() {
            panes.push(PaneId::Original(self.active_source));
        }
        panes.push(PaneId::Generated);
        panes
    }

    // ---------------------------------------------------------------------
    // Loading
    // ---------------------------------------------------------------------

    /// Parse, validate and show a JSON source map with its generated text.
    ///
    /// On error the previously loaded map stays on screen; an unsupported
    /// version additionally replaces the panes with an error panel until the
    /// next successful load.
    pub fn load_json(&mut self, json: &str, generated: impl Into<String>) -> mapview_core::Result<()> {
        match SourceMap::from_json(json) {
            Ok(map) => {
                self.load(map, generated);
                Ok(())
            }
            Err(err) => {
                self.reject(&err);
                Err(err)
            }
        }
    }

    fn reject(&mut self, err: &LoadError) {
        warn!(error = %err, "source map rejected");
        if err.is_full_panel() {
            self.error = Some(err.to_string());
            self.redraw.request(RedrawReason::Error);
        }
    }

    /// Show an already loaded map.
    pub fn load(&mut self, map: SourceMap, generated: impl Into<String>) {
        let wrap_enabled = self.config.view.wrap_enabled;
        let generated = TextLayout::new(generated, self.layout_options, &mut self.widths);
        self.generated.set_layout(generated);
        self.generated.set_scroll([0.0, 0.0]);

        self.originals = map
            .sources()
            .iter()
            .enumerate()
            .map(|(i, source)| {
                let layout = TextLayout::new(source.content(), self.layout_options, &mut self.widths);
                Pane::new(PaneId::Original(i), layout, self.metrics, wrap_enabled)
            })
            .collect();
        self.active_source = self
            .config
            .view
            .active_source_index
            .min(self.originals.len().saturating_sub(1));

        debug!(
            sources = self.originals.len(),
            records = map.forward_index().len(),
            generated_lines = self.generated.layout().line_count(),
            "map view loaded"
        );
        self.map = Some(map);
        self.error = None;
        self.drag = None;
        self.pan = None;
        self.layout_panes();
        self.set_hover(None);
        self.redraw.request(RedrawReason::Load);
    }

    /// Replace the generated text.
    pub fn set_generated_code(&mut self, text: impl Into<String>) {
        let layout = TextLayout::new(text, self.layout_options, &mut self.widths);
        self.generated.set_layout(layout);
        self.set_hover(None);
        self.redraw.request(RedrawReason::Load);
    }

    /// Replace the text of one original source. False when no such source
    /// is loaded.
    pub fn set_original_code(&mut self, source: usize, text: impl Into<String>) -> bool {
        let text = text.into();
        let Some(map) = self.map.as_mut() else {
            return false;
        };
        if !map.set_source_content(source, text.clone()) {
            return false;
        }
        let layout = TextLayout::new(text, self.layout_options, &mut self.widths);
        let Some(pane) = self.originals.get_mut(source) else {
            return false;
        };
        pane.set_layout(layout);
        if self.hover.is_some_and(|hover| hover.pane == PaneId::Original(source)) {
            self.set_hover(None);
        }
        self.redraw.request(RedrawReason::Load);
        true
    }

    // ---------------------------------------------------------------------
    // View settings
    // ---------------------------------------------------------------------

    pub fn resize(&mut self, width: u32, height: u32) {
        let viewport = Viewport { width, height };
        if viewport == self.viewport {
            return;
        }
        self.viewport = viewport;
        self.layout_panes();
        self.redraw.request(RedrawReason::Resize);
    }

    fn layout_panes(&mut self) {
        let width = self.viewport.width as f32;
        let height = self.viewport.height as f32;
        let half = (width * 0.5).floor();
        let left = Rect::new(0.0, 0.0, half, height);
        let right = Rect::new(half, 0.0, width - half, height);
        for pane in &mut self.originals {
            pane.set_bounds(left);
        }
        self.generated.set_bounds(right);
    }

    pub fn set_wrap_enabled(&mut self, enabled: bool) {
        if self.config.view.wrap_enabled == enabled {
            return;
        }
        self.config.view.wrap_enabled = enabled;
        self.generated.set_wrap_enabled(enabled);
        for pane in &mut self.originals {
            pane.set_wrap_enabled(enabled);
        }
        // Rows moved under the pointer.
        self.set_hover(None);
        self.redraw.request(RedrawReason::WrapToggle);
    }

    /// Select the original source shown on the left. False when `index`
    /// addresses no source.
    pub fn set_active_source(&mut self, index: usize) -> bool {
        if index >= self.originals.len() {
            return false;
        }
        if index != self.active_source {
            self.active_source = index;
            self.config.view.active_source_index = index;
            if self.hover.is_some_and(|hover| hover.pane != PaneId::Generated) {
                self.set_hover(None);
            }
            self.redraw.request(RedrawReason::ActiveSource);
        }
        true
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    fn records(&self, id: PaneId) -> Records<'_> {
        records_for(self.map.as_ref(), id)
    }

    fn pane_at(&self, x: f32, y: f32) -> Option<PaneId> {
        self.visible_panes().into_iter().find(|&id| {
            self.pane(id)
                .is_some_and(|pane| pane.bounds().contains(x, y))
        })
    }

    /// Resolve a visual row and absolute fractional column of a pane.
    fn resolve(&self, id: PaneId, row: usize, column: f32) -> Option<HoverState> {
        let pane = self.pane(id)?;
        let records = self.records(id);
        let hit = query::hit_test(pane.layout(), pane.wrap(), records, row, column)?;
        Some(HoverState {
            pane: id,
            line: hit.line,
            row: hit.row,
            caret_index: hit.caret.index,
            caret_column: hit.caret.column,
            index: hit.index,
            mapping: hit.mapping.map(|(record, _)| records.record(record)),
        })
    }

    /// Hover a logical position: `line` and `column` (in mapping units) of
    /// a pane. Goes through the same resolution as pointer movement.
    pub fn hover_position(&mut self, id: PaneId, line: usize, column: usize) -> Option<HoverEvent> {
        let state = self.pane(id).and_then(|pane| {
            let view = pane.layout().line(line)?;
            let display = view.index_to_column(column, TieBreak::Floor);
            let wrap = pane.wrap();
            let across = wrap.columns_across();
            let offset = if across == UNBOUNDED {
                0
            } else {
                (display / across).min(wrap.rows_in_line(line).saturating_sub(1))
            };
            self.resolve(id, wrap.row_for_line(line) + offset, display as f32)
        });
        self.set_hover(state);
        self.hover.as_ref().map(HoverState::event)
    }

    /// Range `record` covers in pane `id`.
    pub fn range_of(&self, id: PaneId, record: &MappingRecord) -> Option<MappingRange> {
        let pane = self.pane(id)?;
        pane.mapping_geometry(self.records(id), record)
            .map(|(range, _)| range)
    }

    /// Pixel rectangles of `record` in pane `id`, one per visual row.
    pub fn mapping_rects(&self, id: PaneId, record: &MappingRecord) -> Vec<Rect> {
        self.pane(id)
            .and_then(|pane| pane.mapping_geometry(self.records(id), record))
            .map(|(_, rects)| rects)
            .unwrap_or_default()
    }

    /// First pixel rectangle of `record` in pane `id`.
    pub fn mapping_rect(&self, id: PaneId, record: &MappingRecord) -> Option<Rect> {
        self.mapping_rects(id, record).into_iter().next()
    }

    // ---------------------------------------------------------------------
    // Hover
    // ---------------------------------------------------------------------

    fn set_hover(&mut self, hover: Option<HoverState>) -> bool {
        if hover == self.hover {
            return false;
        }
        let previous = self.hover.map(|state| state.event());
        self.hover = hover;
        self.caret.reset();
        self.redraw.request(RedrawReason::Hover);
        if self.hover.is_some() {
            for id in self.visible_panes() {
                if let Some(pane) = self.pane_mut(id) {
                    pane.stop_fling();
                }
            }
        }

        let event = self.hover.map(|state| state.event());
        if event != previous {
            trace!(?event, "hover changed");
            self.subscribers.notify(event.as_ref());
        }
        true
    }

    pub fn subscribe(&mut self, callback: impl FnMut(Option<&HoverEvent>) + 'static) -> SubscriptionId {
        self.subscribers.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    // ---------------------------------------------------------------------
    // Input
    // ---------------------------------------------------------------------

    pub fn pointer_move(&mut self, event: PointerEvent) -> EventResult {
        if let Some(drag) = self.drag {
            return self.drag_to(drag, event).into();
        }
        if let Some(pan) = self.pan {
            return self.pan_to(pan, event).into();
        }
        let state = self.pane_at(event.x, event.y).and_then(|id| {
            let (row, column) = self.pane(id)?.locate(event.x, event.y)?;
            self.resolve(id, row, column)
        });
        self.set_hover(state).into()
    }

    /// Press: grab a scrollbar thumb, or start dragging a pane's text and
    /// reveal the hovered mapping in the other pane.
    pub fn pointer_down(&mut self, event: PointerEvent) -> EventResult {
        if let Some(drag) = self.thumb_at(event.x, event.y) {
            debug!(pane = ?drag.pane, axis = ?drag.axis, "scrollbar drag started");
            self.drag = Some(drag);
            return EventResult::Handled;
        }
        self.pointer_move(event);
        let pan = self.pane_at(event.x, event.y).filter(|&id| {
            self.pane(id)
                .is_some_and(|pane| pane.text_rect().contains(event.x, event.y))
        });
        if let Some(id) = pan {
            if let Some(pane) = self.pane_mut(id) {
                pane.stop_fling();
            }
            self.pan = Some(PanState {
                pane: id,
                last: [event.x, event.y],
                velocity: [0.0, 0.0],
            });
        }
        let revealed = match self.hover {
            Some(hover) => self.reveal(&hover),
            None => false,
        };
        (revealed || pan.is_some()).into()
    }

    /// Release: end a thumb drag, or let a text drag keep scrolling with
    /// the speed of its last move.
    pub fn pointer_up(&mut self, _event: PointerEvent) -> EventResult {
        if self.drag.take().is_some() {
            return EventResult::Handled;
        }
        let Some(pan) = self.pan.take() else {
            return EventResult::Ignored;
        };
        let flung = self
            .pane_mut(pan.pane)
            .is_some_and(|pane| pane.fling(pan.velocity));
        if flung {
            debug!(pane = ?pan.pane, velocity = ?pan.velocity, "fling started");
            self.redraw.request(RedrawReason::Animation);
        }
        EventResult::Handled
    }

    pub fn pointer_leave(&mut self) -> EventResult {
        self.set_hover(None).into()
    }

    pub fn wheel(&mut self, event: WheelEvent) -> EventResult {
        match self.pane_at(event.x, event.y) {
            Some(id) => self.scroll_by(id, event.dx, event.dy).into(),
            None => EventResult::Ignored,
        }
    }

    /// Scroll a pane by a pixel delta. True when the offsets changed.
    pub fn scroll_by(&mut self, id: PaneId, dx: f32, dy: f32) -> bool {
        let changed = self
            .pane_mut(id)
            .is_some_and(|pane| pane.scroll_by(dx, dy));
        if changed {
            self.redraw.request(RedrawReason::Scroll);
        }
        changed
    }

    fn thumb_at(&self, x: f32, y: f32) -> Option<DragState> {
        for id in self.visible_panes() {
            let Some(pane) = self.pane(id) else {
                continue;
            };
            for axis in [Axis::Vertical, Axis::Horizontal] {
                let Some(thumb) = pane.thumb(axis) else {
                    continue;
                };
                if thumb.contains(x, y) {
                    let grab = match axis {
                        Axis::Vertical => y - thumb.y,
                        Axis::Horizontal => x - thumb.x,
                    };
                    return Some(DragState { pane: id, axis, grab });
                }
            }
        }
        None
    }

    fn drag_to(&mut self, drag: DragState, event: PointerEvent) -> bool {
        let Some(pane) = self.pane_mut(drag.pane) else {
            return false;
        };
        let (position, axis) = match drag.axis {
            Axis::Vertical => (event.y, 1),
            Axis::Horizontal => (event.x, 0),
        };
        let Some(offset) = pane.scroll_for_thumb(drag.axis, position - drag.grab) else {
            return false;
        };
        let mut scroll = pane.scroll();
        scroll[axis] = offset;
        let changed = pane.set_scroll(scroll);
        if changed {
            self.redraw.request(RedrawReason::Scroll);
        }
        changed
    }

    fn pan_to(&mut self, pan: PanState, event: PointerEvent) -> bool {
        let velocity = [pan.last[0] - event.x, pan.last[1] - event.y];
        self.pan = Some(PanState {
            pane: pan.pane,
            last: [event.x, event.y],
            velocity,
        });
        self.scroll_by(pan.pane, velocity[0], velocity[1])
    }

    /// Scroll the counterpart of `hover`'s pane to its mapping.
    fn reveal(&mut self, hover: &HoverState) -> bool {
        let Some(record) = hover.mapping else {
            return false;
        };
        let target = match hover.pane {
            PaneId::Generated => match record.source() {
                Some(source) => {
                    if !self.set_active_source(source) {
                        return false;
                    }
                    PaneId::Original(source)
                }
                None => return false,
            },
            PaneId::Original(_) => PaneId::Generated,
        };
        self.scroll_to_mapping(target, &record)
    }

    /// Start an eased scroll centring `record` in pane `id`. A scroll
    /// already running in that pane is replaced.
    pub fn scroll_to_mapping(&mut self, id: PaneId, record: &MappingRecord) -> bool {
        let duration = Duration::from_millis(self.config.animation.scroll_duration_ms);
        let records = records_for(self.map.as_ref(), id);
        let pane = match id {
            PaneId::Generated => Some(&mut self.generated),
            PaneId::Original(source) => self.originals.get_mut(source),
        };
        let Some(pane) = pane else {
            return false;
        };
        let Some((range, _)) = pane.mapping_geometry(records, record) else {
            return false;
        };
        let Some((line, _)) = id.position_of(record) else {
            return false;
        };
        let Ok(line) = usize::try_from(line) else {
            return false;
        };
        let spans = query::row_spans(pane.wrap(), line, range.start_column, range.end_column);
        let Some(span) = spans.first() else {
            return false;
        };
        let target = pane.centering_scroll(span.row, span.start_column, span.end_column);
        debug!(pane = ?id, line, row = span.row, ?target, "scrolling to mapping");
        pane.animate_to(target, duration);
        self.redraw.request(RedrawReason::Animation);
        true
    }

    // ---------------------------------------------------------------------
    // Frames
    // ---------------------------------------------------------------------

    /// Advance animations to `now` and paint if anything changed since the
    /// last painted frame. `None` means the view is idle.
    pub fn frame(&mut self, now: Instant) -> Option<DisplayList> {
        for id in self.visible_panes() {
            let animating = self.pane_mut(id).is_some_and(|pane| pane.tick(now));
            if animating {
                self.redraw.request(RedrawReason::Animation);
            }
        }
        let caret_active = self.hover.is_some_and(|hover| hover.mapping.is_none());
        if self.caret.update(now, caret_active) {
            self.redraw.request(RedrawReason::CaretBlink);
        }

        if !self.redraw.is_dirty() {
            return None;
        }
        let reasons = self.redraw.take();
        trace!(?reasons, "painting frame");
        Some(self.paint())
    }

    /// Paint the current state regardless of pending redraw reasons.
    pub fn paint(&self) -> DisplayList {
        let original = self.originals.get(self.active_source).map(|pane| PaneFrame {
            pane,
            records: self.records(pane.id()),
        });
        let frame = Frame {
            viewport: self.viewport,
            theme: &self.theme,
            map: self.map.as_ref(),
            original,
            generated: PaneFrame {
                pane: &self.generated,
                records: self.records(PaneId::Generated),
            },
            hover: self.hover.as_ref(),
            caret_visible: self.caret.visible,
            error: self.error.as_deref(),
        };
        render::paint(&frame)
    }
}

fn records_for(map: Option<&SourceMap>, id: PaneId) -> Records<'_> {
    let records = map.and_then(|map| match id {
        PaneId::Generated => Some(map.forward_index().records()),
        PaneId::Original(source) => map.source(source).map(|s| s.inverse_index().records()),
    });
    records.unwrap_or_else(|| Records::new(&[], match id {
        PaneId::Generated => KeyOrder::Generated,
        PaneId::Original(_) => KeyOrder::Original,
    }))
}

impl std::fmt::Debug for MapView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapView")
            .field("viewport", &self.viewport)
            .field("sources", &self.originals.len())
            .field("active_source", &self.active_source)
            .field("hover", &self.hover)
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    const MAP: &str = r#"{
        "version": 3,
        "sources": ["a.js", "b.js"],
        "sourcesContent": ["let foo = 1;", "bar()"],
        "names": ["foo"],
        "mappings": "AAAA,IAAIA,GAAG;ACAP"
    }"#;
    const GENERATED: &str = "var foo = 1;\nbar()";

    fn view() -> MapView {
        let mut view = MapView::new(MapViewConfig::default());
        view.resize(800, 400);
        view.load_json(MAP, GENERATED).expect("valid map");
        view
    }

    #[test]
    fn test_load_builds_one_pane_per_source() {
        let view = view();
        assert!(view.pane(PaneId::Original(0)).is_some());
        assert!(view.pane(PaneId::Original(1)).is_some());
        assert!(view.pane(PaneId::Original(2)).is_none());
        assert_eq!(view.active_source(), 0);
        assert!(view.redraw_reasons().contains(&RedrawReason::Load));
    }

    #[test]
    fn test_hover_position_resolves_mapping() {
        let mut view = view();
        let event = view.hover_position(PaneId::Generated, 0, 5).expect("on text");
        let mapping = event.mapping.expect("mapped");
        assert_eq!((mapping.generated_line, mapping.generated_column), (0, 4));
        assert_eq!(view.source_map().and_then(|m| m.name_of(&mapping)), Some("foo"));
        let range = view.range_of(PaneId::Original(0), &mapping).expect("in source 0");
        assert_eq!((range.start_index, range.end_index), (4, 7));
    }

    #[test]
    fn test_named_mapping_gets_tooltip_at_its_rect() {
        let mut view = view();
        let event = view.hover_position(PaneId::Generated, 0, 5).expect("on text");
        let mapping = event.mapping.expect("mapped");
        let anchor = view.mapping_rect(PaneId::Generated, &mapping).expect("visible");

        let list = view.paint();
        let tooltip = list.commands.iter().find_map(|command| match command {
            mapview_surface::Command::DrawText { runs, transform }
                if *transform != mapview_surface::Transform2D::identity() =>
            {
                Some((runs, *transform))
            }
            _ => None,
        });
        let (runs, transform) = tooltip.expect("tooltip text");
        assert_eq!(runs[0].text, "foo");
        assert_eq!(transform.apply([0.0, 0.0])[0], anchor.x);
    }

    #[test]
    fn test_pointer_move_hovers_and_leave_clears() {
        let mut view = view();
        let pane = view.pane(PaneId::Generated).expect("generated");
        let text = pane.text_rect();
        let cw = pane.metrics().column_width;
        let x = text.x + 5.5 * cw;
        let y = text.y + 2.0;

        assert!(view.pointer_move(PointerEvent::new(x, y)).is_handled());
        assert!(view.hover().and_then(|h| h.mapping).is_some());
        assert!(!view.pointer_move(PointerEvent::new(x, y)).is_handled());
        assert!(view.pointer_leave().is_handled());
        assert!(view.hover().is_none());
    }

    #[test]
    fn test_subscribers_see_changes_only() {
        let mut view = view();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let id = view.subscribe(move |event| sink.borrow_mut().push(event.copied()));

        view.hover_position(PaneId::Generated, 0, 5);
        view.hover_position(PaneId::Generated, 0, 5);
        view.pointer_leave();
        assert_eq!(seen.borrow().len(), 2);
        assert!(seen.borrow()[1].is_none());

        assert!(view.unsubscribe(id));
        view.hover_position(PaneId::Generated, 0, 5);
        assert_eq!(seen.borrow().len(), 2);
    }

    #[test]
    fn test_reveal_switches_active_source() {
        let mut view = view();
        let pane = view.pane(PaneId::Generated).expect("generated");
        let text = pane.text_rect();
        let lh = pane.metrics().line_height;
        let cw = pane.metrics().column_width;

        // "bar()" on generated line 1 maps into b.js.
        let down = PointerEvent::new(text.x + 1.5 * cw, text.y + lh * 1.5);
        assert!(view.pointer_down(down).is_handled());
        assert_eq!(view.active_source(), 1);
        assert!(view.redraw_reasons().contains(&RedrawReason::ActiveSource));
        assert!(view.redraw_reasons().contains(&RedrawReason::Animation));
    }

    #[test]
    fn test_wrap_toggle_and_active_source_requests() {
        let mut view = view();
        view.frame(Instant::now());
        view.set_wrap_enabled(true);
        assert_eq!(view.redraw_reasons(), &[RedrawReason::WrapToggle]);
        assert!(!view.set_active_source(5));
        assert!(view.set_active_source(1));
        assert!(view.redraw_reasons().contains(&RedrawReason::ActiveSource));
    }

    #[test]
    fn test_frame_is_idle_when_clean() {
        let mut view = view();
        let t0 = Instant::now();
        assert!(view.frame(t0).is_some());
        assert!(view.frame(t0 + Duration::from_millis(16)).is_none());
        view.scroll_by(PaneId::Generated, 0.0, 10.0);
        assert!(view.frame(t0 + Duration::from_millis(32)).is_none());
    }

    #[test]
    fn test_malformed_load_keeps_previous_state() {
        let mut view = view();
        view.frame(Instant::now());
        let err = view
            .load_json(r#"{"version":3,"sources":[],"mappings":"A!"}"#, "x")
            .unwrap_err();
        assert!(matches!(err, LoadError::MalformedVlq { .. }));
        assert!(view.error().is_none());
        assert_eq!(view.source_map().map(|m| m.sources().len()), Some(2));
        assert!(!view.needs_redraw());
    }
}
