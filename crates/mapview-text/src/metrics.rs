//! Cluster width measurement.

use core::fmt;

use hashbrown::HashMap;
use unicode_width::UnicodeWidthStr;

/// Pixel measurement of text, supplied by whatever draws the glyphs.
pub trait TextMetrics {
    /// Advance width of `text` in pixels.
    fn measure(&self, text: &str) -> f32;

    /// Advance width of a single space in pixels.
    fn space_width(&self) -> f32;
}

/// Fixed-pitch metrics: every cell is `column_width` pixels and a cluster
/// covers as many cells as its East Asian width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonospaceMetrics {
    pub column_width: f32,
}

impl MonospaceMetrics {
    pub fn new(column_width: f32) -> Self {
        Self { column_width }
    }
}

impl Default for MonospaceMetrics {
    fn default() -> Self {
        Self::new(7.0)
    }
}

impl TextMetrics for MonospaceMetrics {
    fn measure(&self, text: &str) -> f32 {
        UnicodeWidthStr::width(text) as f32 * self.column_width
    }

    fn space_width(&self) -> f32 {
        self.column_width
    }
}

/// Display-column widths of clusters, memoized by cluster text.
pub struct ClusterWidths {
    metrics: Box<dyn TextMetrics>,
    cache: HashMap<String, usize>,
}

impl ClusterWidths {
    pub fn new(metrics: impl TextMetrics + 'static) -> Self {
        Self {
            metrics: Box::new(metrics),
            cache: HashMap::new(),
        }
    }

    /// Columns covered by `cluster`: measured width over the space width,
    /// rounded, and never less than one.
    pub fn columns(&mut self, cluster: &str) -> usize {
        if let Some(&columns) = self.cache.get(cluster) {
            return columns;
        }
        let space = self.metrics.space_width();
        let columns = if space > 0.0 {
            (self.metrics.measure(cluster) / space).round().max(1.0) as usize
        } else {
            1
        };
        self.cache.insert(cluster.to_owned(), columns);
        columns
    }

    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    pub fn clear(&mut self) {
        self.cache.clear();
    }
}

impl Default for ClusterWidths {
    fn default() -> Self {
        Self::new(MonospaceMetrics::default())
    }
}

impl fmt::Debug for ClusterWidths {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClusterWidths")
            .field("space_width", &self.metrics.space_width())
            .field("cached", &self.cache.len())
            .finish()
    }
}
