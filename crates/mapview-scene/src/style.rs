//! Colors used to paint the view.

use mapview_core::MappingRecord;
use mapview_surface::Color;

/// Number of coverage color buckets.
pub const PALETTE_SIZE: usize = 8;

/// Bucket of generated-only records.
pub const GENERATED_ONLY_BUCKET: usize = PALETTE_SIZE;

/// Opacity applied to mappings that point outside their line.
const OUT_OF_BOUNDS_ALPHA: f32 = 0.35;

#[derive(Debug, Clone)]
pub struct Theme {
    pub background: Color,
    pub text: Color,
    pub whitespace: Color,
    pub gutter_bg: Color,
    pub gutter_text: Color,
    pub divider: Color,
    pub caret: Color,
    pub scrollbar_thumb: Color,
    pub tooltip_bg: Color,
    pub tooltip_text: Color,
    pub arrow: Color,
    pub error_bg: Color,
    pub error_text: Color,
    pub generated_only: Color,
    pub palette: [Color; PALETTE_SIZE],
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: Color::rgb(22, 27, 45),
            text: Color::rgb(220, 225, 240),
            whitespace: Color::rgba(120, 130, 160, 160),
            gutter_bg: Color::rgb(28, 33, 55),
            gutter_text: Color::rgb(110, 118, 145),
            divider: Color::rgb(50, 55, 75),
            caret: Color::rgb(255, 255, 255),
            scrollbar_thumb: Color::rgba(180, 185, 200, 90),
            tooltip_bg: Color::rgb(10, 12, 20),
            tooltip_text: Color::rgb(255, 255, 255),
            arrow: Color::rgb(255, 255, 255),
            error_bg: Color::rgb(60, 20, 24),
            error_text: Color::rgb(255, 190, 190),
            generated_only: Color::rgba(128, 128, 128, 60),
            palette: [
                Color::rgba(239, 68, 68, 80),
                Color::rgba(249, 115, 22, 80),
                Color::rgba(234, 179, 8, 80),
                Color::rgba(34, 197, 94, 80),
                Color::rgba(20, 184, 166, 80),
                Color::rgba(59, 130, 246, 80),
                Color::rgba(139, 92, 246, 80),
                Color::rgba(236, 72, 153, 80),
            ],
        }
    }
}

impl Theme {
    /// Color bucket of a record. Records keep their bucket in every pane,
    /// so a mapping has the same color on both sides.
    pub fn bucket(record: &MappingRecord) -> usize {
        if !record.has_original() {
            return GENERATED_ONLY_BUCKET;
        }
        let key = record.source_index as i64 + record.original_line as i64 + record.original_column as i64;
        key.rem_euclid(PALETTE_SIZE as i64) as usize
    }

    /// Coverage fill for a bucket.
    pub fn bucket_color(&self, bucket: usize, out_of_bounds: bool) -> Color {
        let base = self
            .palette
            .get(bucket)
            .copied()
            .unwrap_or(self.generated_only);
        if out_of_bounds {
            base.with_alpha_scaled(OUT_OF_BOUNDS_ALPHA)
        } else {
            base
        }
    }

    /// Opaque halo drawn around the hovered mapping.
    pub fn halo_color(&self, bucket: usize) -> Color {
        let base = self
            .palette
            .get(bucket)
            .copied()
            .unwrap_or(self.generated_only);
        if base.a <= 0.0 {
            return base;
        }
        // Un-premultiply to full opacity.
        Color {
            r: base.r / base.a,
            g: base.g / base.a,
            b: base.b / base.a,
            a: 1.0,
        }
    }
}
