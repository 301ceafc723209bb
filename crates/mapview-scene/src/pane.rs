//! One scrollable text pane: the generated text or one original source.

use std::ops::Range;
use std::rc::Rc;
use std::time::{Duration, Instant};

use mapview_config::TextConfig;
use mapview_core::{MappingRecord, Records};
use mapview_surface::Rect;
use mapview_text::{TextLayout, TieBreak, WrapCache, WrapTable, UNBOUNDED, layout::columns_across};

use crate::animation::{Inertia, ScrollAnimation};
use crate::events::Axis;
use crate::query::{self, MappingRange};

/// Thickness of scrollbar tracks.
pub const SCROLLBAR_SIZE: f32 = 8.0;
const MIN_THUMB: f32 = 16.0;

/// Which text a pane shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaneId {
    Generated,
    /// Original source, by index into the map's sources.
    Original(usize),
}

impl PaneId {
    /// Source index, `None` for the generated pane.
    pub fn pane_index(self) -> Option<usize> {
        match self {
            Self::Generated => None,
            Self::Original(source) => Some(source),
        }
    }

    /// `(line, index)` of `record` in this pane's text, if the record
    /// appears in it.
    pub fn position_of(self, record: &MappingRecord) -> Option<(i32, i32)> {
        match self {
            Self::Generated => Some((record.generated_line, record.generated_column)),
            Self::Original(source) if record.source() == Some(source) => {
                Some((record.original_line, record.original_column))
            }
            Self::Original(_) => None,
        }
    }
}

/// Pixel metrics shared by all panes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaneMetrics {
    pub font_size: f32,
    pub line_height: f32,
    pub column_width: f32,
}

impl From<&TextConfig> for PaneMetrics {
    fn from(text: &TextConfig) -> Self {
        Self {
            font_size: text.font_size,
            line_height: text.line_height.max(1.0),
            column_width: text.column_width.max(1.0),
        }
    }
}

impl Default for PaneMetrics {
    fn default() -> Self {
        Self::from(&TextConfig::default())
    }
}

#[derive(Debug)]
pub struct Pane {
    id: PaneId,
    layout: TextLayout,
    wraps: WrapCache,
    wrap: Rc<WrapTable>,
    wrap_enabled: bool,
    metrics: PaneMetrics,
    bounds: Rect,
    scroll: [f32; 2],
    /// Rows reachable by scrolling; more than the text when a scroll-to
    /// target lies past the last line.
    reach_rows: usize,
    animation: Option<ScrollAnimation>,
    fling: Option<Inertia>,
}

impl Pane {
    pub fn new(id: PaneId, layout: TextLayout, metrics: PaneMetrics, wrap_enabled: bool) -> Self {
        let mut wraps = WrapCache::new();
        let wrap = wraps.get(&layout, UNBOUNDED);
        let mut pane = Self {
            id,
            layout,
            wraps,
            wrap,
            wrap_enabled,
            metrics,
            bounds: Rect::default(),
            scroll: [0.0, 0.0],
            reach_rows: 0,
            animation: None,
            fling: None,
        };
        pane.refresh_wrap();
        pane
    }

    pub fn id(&self) -> PaneId {
        self.id
    }

    pub fn layout(&self) -> &TextLayout {
        &self.layout
    }

    pub fn wrap(&self) -> &WrapTable {
        &self.wrap
    }

    pub fn metrics(&self) -> PaneMetrics {
        self.metrics
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn scroll(&self) -> [f32; 2] {
        self.scroll
    }

    pub fn wrap_enabled(&self) -> bool {
        self.wrap_enabled
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some() || self.fling.is_some()
    }

    /// Replace the text. Wrap tables built for the old text are dropped.
    pub fn set_layout(&mut self, layout: TextLayout) {
        self.layout = layout;
        self.wraps.clear();
        self.reach_rows = 0;
        self.stop();
        self.refresh_wrap();
        self.clamp_scroll();
    }

    pub fn set_bounds(&mut self, bounds: Rect) {
        self.bounds = bounds;
        self.refresh_wrap();
        self.clamp_scroll();
    }

    pub fn set_wrap_enabled(&mut self, enabled: bool) {
        self.wrap_enabled = enabled;
        self.refresh_wrap();
        self.clamp_scroll();
    }

    /// Tables are cached per column budget, so this is a lookup unless the
    /// budget is new.
    fn refresh_wrap(&mut self) {
        let across = self.columns_across();
        self.wrap = self.wraps.get(&self.layout, across);
    }

    /// Width of the line-number margin.
    pub fn gutter_width(&self) -> f32 {
        let digits = self.layout.line_count().to_string().len().max(2);
        (digits + 2) as f32 * self.metrics.column_width
    }

    pub fn gutter_rect(&self) -> Rect {
        Rect::new(self.bounds.x, self.bounds.y, self.gutter_width(), self.bounds.h)
    }

    /// Area the text is drawn in: the bounds minus the gutter and the
    /// scrollbar tracks.
    pub fn text_rect(&self) -> Rect {
        let gutter = self.gutter_width();
        let bottom_track = if self.wrap_enabled { 0.0 } else { SCROLLBAR_SIZE };
        Rect::new(
            self.bounds.x + gutter,
            self.bounds.y,
            (self.bounds.w - gutter - SCROLLBAR_SIZE).max(0.0),
            (self.bounds.h - bottom_track).max(0.0),
        )
    }

    pub fn columns_across(&self) -> usize {
        columns_across(self.text_rect().w, self.metrics.column_width, self.wrap_enabled)
    }

    /// Columns shown on one row; the pane width when not wrapping.
    pub fn visible_columns(&self) -> usize {
        (self.text_rect().w / self.metrics.column_width).ceil() as usize
    }

    pub fn content_size(&self) -> [f32; 2] {
        let rows = self.wrap.total_rows().max(self.reach_rows);
        [
            (self.layout.max_columns() + 1) as f32 * self.metrics.column_width,
            rows as f32 * self.metrics.line_height,
        ]
    }

    pub fn max_scroll(&self) -> [f32; 2] {
        let text = self.text_rect();
        let content = self.content_size();
        let x = if self.wrap_enabled {
            0.0
        } else {
            (content[0] - text.w).max(0.0)
        };
        [x, (content[1] - text.h).max(0.0)]
    }

    /// Clamp offsets into `[0, max_scroll]`. True when they changed.
    pub fn clamp_scroll(&mut self) -> bool {
        let max = self.max_scroll();
        let clamped = [
            self.scroll[0].clamp(0.0, max[0]),
            self.scroll[1].clamp(0.0, max[1]),
        ];
        let changed = clamped != self.scroll;
        self.scroll = clamped;
        changed
    }

    pub fn set_scroll(&mut self, scroll: [f32; 2]) -> bool {
        let before = self.scroll;
        self.scroll = scroll;
        self.clamp_scroll();
        self.scroll != before
    }

    /// Relative scroll; supersedes any running animation or fling.
    pub fn scroll_by(&mut self, dx: f32, dy: f32) -> bool {
        self.stop();
        self.set_scroll([self.scroll[0] + dx, self.scroll[1] + dy])
    }

    /// Row and fractional column under a view-space point inside the text
    /// area.
    pub fn locate(&self, x: f32, y: f32) -> Option<(usize, f32)> {
        let text = self.text_rect();
        if !text.contains(x, y) {
            return None;
        }
        let local_y = y - text.y + self.scroll[1];
        let local_x = x - text.x + self.scroll[0];
        let row = (local_y / self.metrics.line_height).floor() as usize;
        let column = self.wrap.first_column_of_row(row) as f32 + local_x / self.metrics.column_width;
        Some((row, column))
    }

    /// View-space top of `row`.
    pub fn row_top(&self, row: usize) -> f32 {
        self.text_rect().y + row as f32 * self.metrics.line_height - self.scroll[1]
    }

    /// View-space left edge of `column` on `row`.
    pub fn column_left(&self, row: usize, column: usize) -> f32 {
        let first = self.wrap.first_column_of_row(row);
        self.text_rect().x + (column as f32 - first as f32) * self.metrics.column_width - self.scroll[0]
    }

    /// Rows intersecting the text area, limited to real rows and phantom
    /// rows a scroll-to target reached.
    pub fn visible_rows(&self) -> Range<usize> {
        let lh = self.metrics.line_height;
        let first = (self.scroll[1] / lh).floor() as usize;
        let last = ((self.scroll[1] + self.text_rect().h) / lh).ceil() as usize;
        let total = self.wrap.total_rows().max(self.reach_rows);
        first.min(total)..last.min(total)
    }

    /// Scroll offsets centring columns `start..end` of `row`.
    pub fn centering_scroll(&mut self, row: usize, start_column: usize, end_column: usize) -> [f32; 2] {
        self.reach_rows = self.reach_rows.max(row + 1);
        let text = self.text_rect();
        let lh = self.metrics.line_height;
        let cw = self.metrics.column_width;
        let y = row as f32 * lh + lh * 0.5 - text.h * 0.5;
        let x = if self.wrap_enabled {
            0.0
        } else {
            (start_column + end_column) as f32 * 0.5 * cw - text.w * 0.5
        };
        let max = self.max_scroll();
        [x.clamp(0.0, max[0]), y.clamp(0.0, max[1])]
    }

    /// Range `record` covers in this pane and one pixel rectangle per
    /// visual row it spans. `None` when the record is not shown here.
    pub fn mapping_geometry(&self, records: Records<'_>, record: &MappingRecord) -> Option<(MappingRange, Vec<Rect>)> {
        let (line, index) = self.id.position_of(record)?;
        let line = usize::try_from(line).ok()?;
        let index = usize::try_from(index).ok()?;
        let analysis = query::analyze_line(&self.layout, records, line, 0.0, TieBreak::Floor);
        let range = analysis.range_of_mapping(analysis.mapping_at(index)?)?;
        let rects = query::row_spans(&self.wrap, line, range.start_column, range.end_column)
            .into_iter()
            .map(|span| {
                Rect::new(
                    self.column_left(span.row, span.start_column),
                    self.row_top(span.row),
                    (span.end_column - span.start_column) as f32 * self.metrics.column_width,
                    self.metrics.line_height,
                )
            })
            .collect();
        Some((range, rects))
    }

    /// Start (or replace) an eased scroll toward `target`.
    pub fn animate_to(&mut self, target: [f32; 2], duration: Duration) {
        self.fling = None;
        self.animation = Some(ScrollAnimation::new(self.scroll, target, duration));
    }

    /// Keep scrolling at `velocity` (pixels per frame) with decaying speed.
    /// False when the release was too slow to fling.
    pub fn fling(&mut self, velocity: [f32; 2]) -> bool {
        self.animation = None;
        self.fling = Inertia::new(velocity);
        self.fling.is_some()
    }

    pub fn stop_fling(&mut self) {
        self.fling = None;
    }

    /// Drop any eased scroll or fling in progress.
    pub fn stop(&mut self) {
        self.animation = None;
        self.fling = None;
    }

    /// Advance the scroll animation or fling. True while the pane is
    /// animating (including the final tick).
    pub fn tick(&mut self, now: Instant) -> bool {
        if let Some(animation) = self.animation.as_mut() {
            let (scroll, finished) = animation.tick(now);
            self.scroll = scroll;
            self.clamp_scroll();
            if finished {
                self.animation = None;
            }
            return true;
        }

        let Some(fling) = self.fling.as_mut() else {
            return false;
        };
        let delta = fling.tick();
        let moved = delta.is_some_and(|[dx, dy]| self.set_scroll([self.scroll[0] + dx, self.scroll[1] + dy]));
        if !moved {
            // Out of speed or against an edge.
            self.fling = None;
        }
        moved
    }

    fn track(&self, axis: Axis) -> Rect {
        let text = self.text_rect();
        match axis {
            Axis::Vertical => Rect::new(self.bounds.right() - SCROLLBAR_SIZE, self.bounds.y, SCROLLBAR_SIZE, text.h),
            Axis::Horizontal => Rect::new(text.x, text.bottom(), text.w, SCROLLBAR_SIZE),
        }
    }

    /// Scrollbar thumb, sized by visible over total length. `None` when the
    /// axis does not scroll.
    pub fn thumb(&self, axis: Axis) -> Option<Rect> {
        let i = axis_index(axis);
        let max = self.max_scroll()[i];
        if max <= 0.0 {
            return None;
        }
        let track = self.track(axis);
        let track_len = axis_len(&track, axis);
        let visible = axis_len(&self.text_rect(), axis);
        let total = self.content_size()[i].max(visible);
        let len = (track_len * visible / total).clamp(MIN_THUMB.min(track_len), track_len);
        let offset = (self.scroll[i] / max) * (track_len - len);
        Some(match axis {
            Axis::Vertical => Rect::new(track.x, track.y + offset, track.w, len),
            Axis::Horizontal => Rect::new(track.x + offset, track.y, len, track.h),
        })
    }

    /// Scroll offset along `axis` that puts the thumb's leading edge at
    /// `thumb_start` (view space).
    pub fn scroll_for_thumb(&self, axis: Axis, thumb_start: f32) -> Option<f32> {
        let i = axis_index(axis);
        let thumb = self.thumb(axis)?;
        let track = self.track(axis);
        let room = axis_len(&track, axis) - axis_len(&thumb, axis);
        if room <= 0.0 {
            return Some(0.0);
        }
        let track_start = match axis {
            Axis::Vertical => track.y,
            Axis::Horizontal => track.x,
        };
        let t = ((thumb_start - track_start) / room).clamp(0.0, 1.0);
        Some(t * self.max_scroll()[i])
    }
}

fn axis_index(axis: Axis) -> usize {
    match axis {
        Axis::Horizontal => 0,
        Axis::Vertical => 1,
    }
}

fn axis_len(rect: &Rect, axis: Axis) -> f32 {
    match axis {
        Axis::Horizontal => rect.w,
        Axis::Vertical => rect.h,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mapview_text::{ClusterWidths, LayoutOptions};

    fn pane(text: &str, wrap: bool) -> Pane {
        let layout = TextLayout::new(text, LayoutOptions::default(), &mut ClusterWidths::default());
        let metrics = PaneMetrics {
            font_size: 12.0,
            line_height: 10.0,
            column_width: 5.0,
        };
        let mut pane = Pane::new(PaneId::Generated, layout, metrics, wrap);
        pane.set_bounds(Rect::new(0.0, 0.0, 100.0, 58.0));
        pane
    }

    fn many_lines(n: usize) -> String {
        (0..n).map(|i| format!("line {i}")).collect::<Vec<_>>().join("\n")
    }

    #[test]
    fn test_geometry() {
        let pane = pane("abc", false);
        // Two-digit gutter plus padding: 4 columns of 5px.
        assert_eq!(pane.gutter_width(), 20.0);
        assert_eq!(pane.text_rect(), Rect::new(20.0, 0.0, 72.0, 50.0));
        assert_eq!(pane.columns_across(), UNBOUNDED);
    }

    #[test]
    fn test_locate_uses_scroll_and_wrap() {
        let mut pane = pane("0123456789abcdefghij0123456789", true);
        // 72px of text at 5px per column.
        assert_eq!(pane.columns_across(), 14);
        assert_eq!(pane.locate(30.0, 15.0), Some((1, 16.0)));
        assert_eq!(pane.locate(5.0, 5.0), None);

        let mut tall = self::pane(&many_lines(20), false);
        assert!(tall.scroll_by(0.0, 25.0));
        let (row, column) = tall.locate(20.0, 0.0).expect("inside");
        assert_eq!(row, 2);
        assert_eq!(column, 0.0);
        pane.set_wrap_enabled(false);
        assert_eq!(pane.columns_across(), UNBOUNDED);
    }

    #[test]
    fn test_scroll_is_clamped() {
        let mut pane = pane(&many_lines(20), false);
        // 200px of content in a 50px text area.
        assert_eq!(pane.max_scroll()[1], 150.0);
        pane.scroll_by(0.0, 1000.0);
        assert_eq!(pane.scroll()[1], 150.0);
        pane.scroll_by(0.0, -1000.0);
        assert_eq!(pane.scroll()[1], 0.0);
        assert!(!pane.scroll_by(0.0, -1.0));
    }

    #[test]
    fn test_visible_rows() {
        let mut pane = pane(&many_lines(20), false);
        assert_eq!(pane.visible_rows(), 0..5);
        pane.scroll_by(0.0, 15.0);
        assert_eq!(pane.visible_rows(), 1..7);
    }

    #[test]
    fn test_thumb_tracks_scroll() {
        let mut pane = pane(&many_lines(20), false);
        let top = pane.thumb(Axis::Vertical).expect("scrollable");
        // 50 of 200 px visible.
        assert_eq!(top.h, 12.5_f32.max(MIN_THUMB));
        assert_eq!(top.y, 0.0);

        pane.scroll_by(0.0, 150.0);
        let bottom = pane.thumb(Axis::Vertical).expect("scrollable");
        assert!((bottom.bottom() - 50.0).abs() < 1e-3);

        let scroll = pane.scroll_for_thumb(Axis::Vertical, 0.0).expect("scrollable");
        assert_eq!(scroll, 0.0);
        assert!(self::pane("short", false).thumb(Axis::Vertical).is_none());
    }

    #[test]
    fn test_animation_reaches_target() {
        let mut pane = pane(&many_lines(40), false);
        let target = pane.centering_scroll(20, 0, 4);
        assert_eq!(target[1], 180.0);
        pane.animate_to(target, Duration::from_millis(250));
        let t0 = Instant::now();
        assert!(pane.tick(t0));
        assert!(pane.tick(t0 + Duration::from_millis(300)));
        assert_eq!(pane.scroll()[1], 180.0);
        assert!(!pane.tick(t0 + Duration::from_millis(320)));
    }

    #[test]
    fn test_phantom_target_extends_reach() {
        let mut pane = pane(&many_lines(3), false);
        assert_eq!(pane.max_scroll()[1], 0.0);
        let target = pane.centering_scroll(30, 0, 1);
        assert!(target[1] > 0.0);
        assert_eq!(pane.max_scroll()[1], 310.0 - 50.0);

        pane.set_scroll(target);
        assert!(pane.visible_rows().contains(&30));
        assert_eq!(pane.visible_rows().end, 31);
    }

    #[test]
    fn test_fling_decays_and_stops() {
        let mut pane = pane(&many_lines(40), false);
        assert!(!pane.fling([0.0, 0.1]));
        assert!(pane.fling([0.0, 10.0]));
        assert!(pane.is_animating());

        let t0 = Instant::now();
        assert!(pane.tick(t0));
        assert!((pane.scroll()[1] - 9.3).abs() < 1e-4);
        let mut frames = 1;
        while pane.tick(t0) {
            frames += 1;
        }
        assert_eq!(frames, 41);
        assert!(!pane.is_animating());
        assert!(pane.scroll()[1] < 10.0 * 0.93 / 0.07);
    }

    #[test]
    fn test_fling_stops_at_edge() {
        let mut pane = pane(&many_lines(40), false);
        assert!(pane.fling([0.0, -20.0]));
        assert!(!pane.tick(Instant::now()));
        assert!(!pane.is_animating());
        assert_eq!(pane.scroll(), [0.0, 0.0]);
    }

    #[test]
    fn test_scroll_to_replaces_fling() {
        let mut pane = pane(&many_lines(40), false);
        pane.fling([0.0, 30.0]);
        pane.animate_to([0.0, 100.0], Duration::from_millis(250));
        let t0 = Instant::now();
        pane.tick(t0);
        pane.tick(t0 + Duration::from_millis(300));
        assert_eq!(pane.scroll()[1], 100.0);
        assert!(!pane.tick(t0 + Duration::from_millis(320)));
    }
}
