use crate::scene::*;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Clear { color: ColorLinPremul },
    FillRect { rect: Rect, brush: Brush, transform: Transform2D },
    FillRoundedRect { rrect: RoundedRect, brush: Brush, transform: Transform2D },
    StrokeRoundedRect { rrect: RoundedRect, stroke: Stroke, brush: Brush, transform: Transform2D },
    /// Runs sharing one paint state, drawn together.
    DrawText { runs: Vec<TextRun>, transform: Transform2D },
    FillPath { path: Path, color: ColorLinPremul, transform: Transform2D },
    StrokePath { path: Path, stroke: Stroke, color: ColorLinPremul, transform: Transform2D },
    PushClip(ClipRect),
    PopClip,
    PushTransform(Transform2D),
    PopTransform,
}

/// One recorded frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DisplayList {
    pub viewport: Viewport,
    pub commands: Vec<Command>,
}

impl DisplayList {
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Every filled rectangle, in paint order.
    pub fn filled_rects(&self) -> impl Iterator<Item = (&Rect, &Brush)> {
        self.commands.iter().filter_map(|cmd| match cmd {
            Command::FillRect { rect, brush, .. } => Some((rect, brush)),
            _ => None,
        })
    }

    /// Every text run, in paint order.
    pub fn text_runs(&self) -> impl Iterator<Item = &TextRun> {
        self.commands.iter().flat_map(|cmd| match cmd {
            Command::DrawText { runs, .. } => runs.as_slice(),
            _ => &[][..],
        })
    }

    pub fn contains_text(&self, needle: &str) -> bool {
        self.text_runs().any(|run| run.text.contains(needle))
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.commands.iter().filter_map(|cmd| match cmd {
            Command::FillPath { path, .. } | Command::StrokePath { path, .. } => Some(path),
            _ => None,
        })
    }
}
