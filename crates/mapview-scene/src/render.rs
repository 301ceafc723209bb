//! Paints one frame of the view into a display list.
//!
//! Per pane: coverage, hover halo or caret, text, tooltip, line numbers,
//! scrollbars. Then the divider and, when both panes show the hovered
//! mapping, the arrow joining them.

use mapview_core::{Records, SourceMap};
use mapview_surface::{
    Color, DisplayList, Painter, Path, Rect, RoundedRadii, RoundedRect, Stroke, TextRun, Transform2D,
    Viewport,
};
use mapview_text::{RunKind, TieBreak, UNBOUNDED};

use crate::events::Axis;
use crate::hover::HoverState;
use crate::pane::Pane;
use crate::query::{self, row_spans};
use crate::style::Theme;

const HALO_WIDTH: f32 = 2.0;
const CARET_WIDTH: f32 = 1.5;
const TOOLTIP_PADDING: f32 = 4.0;
const ARROW_HEAD: f32 = 7.0;

/// A pane together with the records it shows.
#[derive(Clone, Copy)]
pub struct PaneFrame<'a> {
    pub pane: &'a Pane,
    pub records: Records<'a>,
}

/// Borrowed view state needed to paint.
#[derive(Clone, Copy)]
pub struct Frame<'a> {
    pub viewport: Viewport,
    pub theme: &'a Theme,
    pub map: Option<&'a SourceMap>,
    pub original: Option<PaneFrame<'a>>,
    pub generated: PaneFrame<'a>,
    pub hover: Option<&'a HoverState>,
    pub caret_visible: bool,
    /// Full-panel error message replacing both panes.
    pub error: Option<&'a str>,
}

pub fn paint(frame: &Frame<'_>) -> DisplayList {
    let mut painter = Painter::begin_frame(frame.viewport);
    painter.clear(frame.theme.background);

    if let Some(message) = frame.error {
        paint_error(&mut painter, frame, message);
        return painter.finish();
    }

    if let Some(original) = frame.original {
        paint_pane(&mut painter, frame, original);
    }
    paint_pane(&mut painter, frame, frame.generated);

    let divider_x = frame.generated.pane.bounds().x;
    painter.rect(
        Rect::new(divider_x - 0.5, 0.0, 1.0, frame.viewport.height as f32),
        frame.theme.divider,
    );

    paint_arrow(&mut painter, frame);
    painter.finish()
}

fn paint_error(painter: &mut Painter, frame: &Frame<'_>, message: &str) {
    let width = frame.viewport.width as f32;
    let height = frame.viewport.height as f32;
    painter.rect(Rect::new(0.0, 0.0, width, height), frame.theme.error_bg);
    let size = frame.generated.pane.metrics().font_size;
    painter.text(TextRun {
        text: message.to_string(),
        pos: [TOOLTIP_PADDING * 4.0, height * 0.5],
        size,
        color: frame.theme.error_text,
    });
}

fn paint_pane(painter: &mut Painter, frame: &Frame<'_>, pane_frame: PaneFrame<'_>) {
    let pane = pane_frame.pane;
    painter.push_clip_rect(pane.bounds());

    painter.push_clip_rect(pane.text_rect());
    paint_coverage(painter, frame.theme, pane_frame);
    paint_hover(painter, frame, pane_frame);
    paint_text(painter, frame.theme, pane);
    painter.pop_clip();

    paint_tooltip(painter, frame, pane_frame);
    paint_gutter(painter, frame.theme, pane);
    paint_scrollbars(painter, frame.theme, pane);

    painter.pop_clip();
}

/// Coverage rectangles of the visible rows, grouped by color bucket.
fn paint_coverage(painter: &mut Painter, theme: &Theme, pane_frame: PaneFrame<'_>) {
    let PaneFrame { pane, records } = pane_frame;
    let rows = pane.visible_rows();
    if rows.is_empty() || records.is_empty() {
        return;
    }
    let layout = pane.layout();
    let wrap = pane.wrap();
    let first_line = wrap.line_index_for_row(rows.start);
    let last_line = wrap.line_index_for_row(rows.end - 1);
    let metrics = pane.metrics();

    let mut batches: Vec<(usize, bool, Rect)> = Vec::new();
    for line in first_line..=last_line {
        let analysis = query::analyze_line(layout, records, line, 0.0, TieBreak::Floor);
        for i in analysis.mappings_on_line() {
            let Some(range) = analysis.range_of_mapping(i) else {
                continue;
            };
            let bucket = Theme::bucket(&records.record(i));
            for span in row_spans(wrap, line, range.start_column, range.end_column) {
                if !rows.contains(&span.row) {
                    continue;
                }
                let rect = Rect::new(
                    pane.column_left(span.row, span.start_column),
                    pane.row_top(span.row),
                    (span.end_column - span.start_column) as f32 * metrics.column_width,
                    metrics.line_height,
                );
                batches.push((bucket, range.out_of_bounds, rect));
            }
        }
    }

    batches.sort_by_key(|&(bucket, out_of_bounds, _)| (bucket, out_of_bounds));
    for (bucket, out_of_bounds, rect) in batches {
        painter.rect(rect, theme.bucket_color(bucket, out_of_bounds));
    }
}

fn paint_hover(painter: &mut Painter, frame: &Frame<'_>, pane_frame: PaneFrame<'_>) {
    let Some(hover) = frame.hover else {
        return;
    };
    let PaneFrame { pane, records } = pane_frame;

    match hover.mapping {
        Some(record) => {
            let Some((_, rects)) = pane.mapping_geometry(records, &record) else {
                return;
            };
            let color = frame.theme.halo_color(Theme::bucket(&record));
            for rect in rects {
                let halo = RoundedRect {
                    rect: rect.inset(-1.0, -1.0),
                    radii: RoundedRadii::uniform(2.0),
                };
                painter.stroke_rounded_rect(halo, Stroke { width: HALO_WIDTH }, color);
            }
        }
        None if hover.pane == pane.id() && frame.caret_visible => {
            let x = pane.column_left(hover.row, hover.caret_column);
            let y = pane.row_top(hover.row);
            let caret = Path::new()
                .move_to([x, y])
                .line_to([x, y + pane.metrics().line_height]);
            painter.stroke_path(caret, Stroke { width: CARET_WIDTH }, frame.theme.caret);
        }
        None => {}
    }
}

/// Visible text in two batches: whitespace markers first, then glyphs.
fn paint_text(painter: &mut Painter, theme: &Theme, pane: &Pane) {
    let layout = pane.layout();
    let wrap = pane.wrap();
    let metrics = pane.metrics();
    let across = wrap.columns_across();
    let baseline = metrics.line_height * 0.5 + metrics.font_size * 0.35;

    // Horizontal culling when not wrapping.
    let scroll_columns = (pane.scroll()[0] / metrics.column_width).floor() as usize;
    let visible_end = scroll_columns + pane.visible_columns() + 1;

    let mut whitespace = Vec::new();
    let mut glyphs = Vec::new();
    for row in pane.visible_rows() {
        let Some(line) = layout.line(wrap.line_index_for_row(row)) else {
            continue;
        };
        let first = wrap.first_column_of_row(row);
        let (window_start, window_end) = if across == UNBOUNDED {
            (scroll_columns, visible_end)
        } else {
            (first, first.saturating_add(across))
        };
        let y = pane.row_top(row) + baseline;

        for run in line.runs() {
            if run.end_column <= window_start || run.start_column >= window_end {
                continue;
            }
            match run.kind {
                RunKind::LineTerminator => {}
                RunKind::Tab => whitespace.push(TextRun {
                    text: "→".to_string(),
                    pos: [pane.column_left(row, run.start_column), y],
                    size: metrics.font_size,
                    color: theme.whitespace,
                }),
                RunKind::Space => {
                    let from = run.start_column.max(window_start);
                    let to = run.end_column.min(window_end);
                    whitespace.push(TextRun {
                        text: "·".repeat(to - from),
                        pos: [pane.column_left(row, from), y],
                        size: metrics.font_size,
                        color: theme.whitespace,
                    });
                }
                RunKind::Printable => {
                    // One byte per column.
                    let from = run.start_column.max(window_start);
                    let to = run.end_column.min(window_end);
                    let bytes = run.bytes.start + (from - run.start_column)..run.bytes.start + (to - run.start_column);
                    glyphs.push(TextRun {
                        text: line.text()[bytes].to_string(),
                        pos: [pane.column_left(row, from), y],
                        size: metrics.font_size,
                        color: theme.text,
                    });
                }
                RunKind::Cluster => glyphs.push(TextRun {
                    text: line.text()[run.bytes.clone()].to_string(),
                    pos: [pane.column_left(row, run.start_column), y],
                    size: metrics.font_size,
                    color: theme.text,
                }),
            }
        }
    }

    painter.text_batch(whitespace);
    painter.text_batch(glyphs);
}

/// Symbol name of the hovered mapping, above its first rectangle in the
/// pane the hover came from.
fn paint_tooltip(painter: &mut Painter, frame: &Frame<'_>, pane_frame: PaneFrame<'_>) {
    let (Some(hover), Some(map)) = (frame.hover, frame.map) else {
        return;
    };
    let PaneFrame { pane, records } = pane_frame;
    if hover.pane != pane.id() {
        return;
    }
    let Some(record) = hover.mapping else {
        return;
    };
    let Some(name) = map.name_of(&record) else {
        return;
    };
    let Some(anchor) = pane
        .mapping_geometry(records, &record)
        .and_then(|(_, rects)| rects.into_iter().next())
    else {
        return;
    };

    let metrics = pane.metrics();
    let width = name.chars().count() as f32 * metrics.column_width + TOOLTIP_PADDING * 2.0;
    let height = metrics.line_height;
    let above = anchor.y - height - TOOLTIP_PADDING;
    let y = if above >= pane.bounds().y {
        above
    } else {
        anchor.bottom() + TOOLTIP_PADDING
    };

    // Bubble contents are laid out relative to its top-left corner.
    painter.push_transform(Transform2D::translate(anchor.x, y));
    painter.rounded_rect(
        RoundedRect {
            rect: Rect::new(0.0, 0.0, width, height),
            radii: RoundedRadii::uniform(3.0),
        },
        frame.theme.tooltip_bg,
    );
    painter.text(TextRun {
        text: name.to_string(),
        pos: [TOOLTIP_PADDING, height * 0.5 + metrics.font_size * 0.35],
        size: metrics.font_size,
        color: frame.theme.tooltip_text,
    });
    painter.pop_transform();
}

/// Line numbers, one per logical line on its first visual row.
fn paint_gutter(painter: &mut Painter, theme: &Theme, pane: &Pane) {
    let gutter = pane.gutter_rect();
    painter.rect(gutter, theme.gutter_bg);

    let wrap = pane.wrap();
    let metrics = pane.metrics();
    let baseline = metrics.line_height * 0.5 + metrics.font_size * 0.35;
    let right = gutter.right() - metrics.column_width;
    let numbers = pane
        .visible_rows()
        .filter_map(|row| {
            let line = wrap.line_index_for_row(row);
            (wrap.row_for_line(line) == row).then_some((row, line))
        })
        .map(|(row, line)| {
            let label = (line + 1).to_string();
            TextRun {
                pos: [
                    right - label.len() as f32 * metrics.column_width,
                    pane.row_top(row) + baseline,
                ],
                text: label,
                size: metrics.font_size,
                color: theme.gutter_text,
            }
        })
        .collect();

    painter.push_clip_rect(gutter);
    painter.text_batch(numbers);
    painter.pop_clip();
}

fn paint_scrollbars(painter: &mut Painter, theme: &Theme, pane: &Pane) {
    for axis in [Axis::Vertical, Axis::Horizontal] {
        if let Some(thumb) = pane.thumb(axis) {
            painter.rounded_rect(
                RoundedRect {
                    rect: thumb.inset(1.0, 1.0),
                    radii: RoundedRadii::uniform(3.0),
                },
                theme.scrollbar_thumb,
            );
        }
    }
}

/// Bezier from the hovering pane's highlight to its counterpart, with the
/// arrowhead on the counterpart.
fn paint_arrow(painter: &mut Painter, frame: &Frame<'_>) {
    let (Some(hover), Some(original)) = (frame.hover, frame.original) else {
        return;
    };
    let Some(record) = hover.mapping else {
        return;
    };
    let visible_rect = |pane_frame: PaneFrame<'_>| -> Option<Rect> {
        let (_, rects) = pane_frame.pane.mapping_geometry(pane_frame.records, &record)?;
        let text = pane_frame.pane.text_rect();
        rects.into_iter().find(|rect| rect.intersects(&text))
    };
    let (Some(left), Some(right)) = (visible_rect(original), visible_rect(frame.generated)) else {
        return;
    };

    // Original pane on the left, generated on the right.
    let left_anchor = [left.right(), left.y + left.h * 0.5];
    let right_anchor = [right.x, right.y + right.h * 0.5];
    let (from, to) = if hover.pane == frame.generated.pane.id() {
        (right_anchor, left_anchor)
    } else {
        (left_anchor, right_anchor)
    };

    let bend = (to[0] - from[0]) * 0.5;
    let curve = Path::new()
        .move_to(from)
        .cubic_to([from[0] + bend, from[1]], [to[0] - bend, to[1]], to);
    let color: Color = frame.theme.arrow;
    painter.stroke_path(curve, Stroke { width: 1.5 }, color);

    // The curve arrives horizontally.
    let dir = if to[0] >= from[0] { 1.0 } else { -1.0 };
    let head = Path::triangle(
        to,
        [to[0] - dir * ARROW_HEAD, to[1] - ARROW_HEAD * 0.5],
        [to[0] - dir * ARROW_HEAD, to[1] + ARROW_HEAD * 0.5],
    );
    painter.fill_path(head, color);
}

#[cfg(test)]
mod tests {
    use super::*;
    use mapview_core::KeyOrder;
    use mapview_surface::Command;
    use mapview_text::{ClusterWidths, LayoutOptions, TextLayout};

    use crate::pane::{PaneId, PaneMetrics};

    fn pane(id: PaneId, text: &str, bounds: Rect) -> Pane {
        let layout = TextLayout::new(text, LayoutOptions::default(), &mut ClusterWidths::default());
        let mut pane = Pane::new(id, layout, PaneMetrics::default(), false);
        pane.set_bounds(bounds);
        pane
    }

    fn frame<'a>(theme: &'a Theme, generated: &'a Pane, data: &'a [i32], error: Option<&'a str>) -> Frame<'a> {
        Frame {
            viewport: Viewport {
                width: 400,
                height: 200,
            },
            theme,
            map: None,
            original: None,
            generated: PaneFrame {
                pane: generated,
                records: Records::new(data, KeyOrder::Generated),
            },
            hover: None,
            caret_visible: true,
            error,
        }
    }

    #[test]
    fn test_text_is_split_into_whitespace_and_glyph_batches() {
        let theme = Theme::default();
        let generated = pane(PaneId::Generated, "a b\tc", Rect::new(200.0, 0.0, 200.0, 200.0));
        let list = paint(&frame(&theme, &generated, &[], None));

        let batches: Vec<&Vec<TextRun>> = list
            .commands
            .iter()
            .filter_map(|command| match command {
                Command::DrawText { runs, .. } => Some(runs),
                _ => None,
            })
            .collect();
        let whitespace: Vec<&str> = batches[0].iter().map(|run| run.text.as_str()).collect();
        let glyphs: Vec<&str> = batches[1].iter().map(|run| run.text.as_str()).collect();
        assert_eq!(whitespace, vec!["·", "→"]);
        assert_eq!(glyphs, vec!["a", "b", "c"]);
        assert!(list.contains_text("1"));
    }

    #[test]
    fn test_coverage_uses_bucket_colors() {
        let theme = Theme::default();
        let generated = pane(PaneId::Generated, "foo bar", Rect::new(200.0, 0.0, 200.0, 200.0));
        let data = [0, 0, 0, 0, 0, -1, 0, 4, 0, 0, 1, -1];
        let list = paint(&frame(&theme, &generated, &data, None));
        let fills: Vec<Color> = list
            .filled_rects()
            .map(|(_, brush)| match brush {
                mapview_surface::Brush::Solid(color) => *color,
            })
            .collect();
        assert!(fills.contains(&theme.bucket_color(0, false)));
        assert!(fills.contains(&theme.bucket_color(1, false)));
    }

    #[test]
    fn test_phantom_target_rows_show_dimmed_coverage() {
        let theme = Theme::default();
        let mut generated = pane(PaneId::Generated, "x", Rect::new(200.0, 0.0, 200.0, 200.0));
        // One mapping on generated line 40, far past the single line of text.
        let data = [40, 0, 0, 0, 0, -1];
        let target = generated.centering_scroll(40, 0, 1);
        generated.set_scroll(target);
        assert!(generated.visible_rows().contains(&40));

        let list = paint(&frame(&theme, &generated, &data, None));
        let dimmed = list.filled_rects().any(|(_, brush)| match brush {
            mapview_surface::Brush::Solid(color) => *color == theme.bucket_color(0, true),
        });
        assert!(dimmed);
        assert!(list.contains_text("41"));
    }

    #[test]
    fn test_error_panel_replaces_panes() {
        let theme = Theme::default();
        let generated = pane(PaneId::Generated, "visible text", Rect::new(200.0, 0.0, 200.0, 200.0));
        let list = paint(&frame(&theme, &generated, &[], Some("unsupported source map version 2")));
        assert!(list.contains_text("unsupported source map version 2"));
        assert!(!list.contains_text("visible"));
    }
}
