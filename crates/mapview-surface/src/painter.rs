use crate::display_list::{Command, DisplayList, Viewport};
use crate::scene::*;

/// Records drawing commands for one frame.
#[derive(Debug)]
pub struct Painter {
    list: DisplayList,
    transform_stack: Vec<Transform2D>,
    clip_depth: usize,
}

impl Painter {
    pub fn begin_frame(viewport: Viewport) -> Self {
        Self {
            list: DisplayList {
                viewport,
                commands: Vec::new(),
            },
            transform_stack: Vec::new(),
            clip_depth: 0,
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.list.viewport
    }

    pub fn current_transform(&self) -> Transform2D {
        self.transform_stack
            .last()
            .copied()
            .unwrap_or_else(Transform2D::identity)
    }

    pub fn push_transform(&mut self, t: Transform2D) {
        // Nested pushes multiply.
        let composed = self.current_transform().concat(t);
        self.list.commands.push(Command::PushTransform(composed));
        self.transform_stack.push(composed);
    }

    pub fn pop_transform(&mut self) {
        if self.transform_stack.pop().is_some() {
            self.list.commands.push(Command::PopTransform);
        }
    }

    pub fn push_clip_rect(&mut self, rect: Rect) {
        self.clip_depth += 1;
        self.list.commands.push(Command::PushClip(ClipRect(rect)));
    }

    pub fn pop_clip(&mut self) {
        if self.clip_depth > 0 {
            self.clip_depth -= 1;
            self.list.commands.push(Command::PopClip);
        }
    }

    pub fn clear(&mut self, color: ColorLinPremul) {
        self.list.commands.push(Command::Clear { color });
    }

    pub fn rect(&mut self, rect: Rect, brush: impl Into<Brush>) {
        let transform = self.current_transform();
        self.list.commands.push(Command::FillRect {
            rect,
            brush: brush.into(),
            transform,
        });
    }

    pub fn rounded_rect(&mut self, rrect: RoundedRect, brush: impl Into<Brush>) {
        let transform = self.current_transform();
        self.list.commands.push(Command::FillRoundedRect {
            rrect,
            brush: brush.into(),
            transform,
        });
    }

    pub fn stroke_rounded_rect(&mut self, rrect: RoundedRect, stroke: Stroke, brush: impl Into<Brush>) {
        let transform = self.current_transform();
        self.list.commands.push(Command::StrokeRoundedRect {
            rrect,
            stroke,
            brush: brush.into(),
            transform,
        });
    }

    pub fn text(&mut self, run: TextRun) {
        self.text_batch(vec![run]);
    }

    /// Draw several runs under one paint state. Empty batches record nothing.
    pub fn text_batch(&mut self, runs: Vec<TextRun>) {
        if runs.is_empty() {
            return;
        }
        let transform = self.current_transform();
        self.list
            .commands
            .push(Command::DrawText { runs, transform });
    }

    pub fn fill_path(&mut self, path: Path, color: ColorLinPremul) {
        let transform = self.current_transform();
        self.list.commands.push(Command::FillPath {
            path,
            color,
            transform,
        });
    }

    pub fn stroke_path(&mut self, path: Path, stroke: Stroke, color: ColorLinPremul) {
        let transform = self.current_transform();
        self.list.commands.push(Command::StrokePath {
            path,
            stroke,
            color,
            transform,
        });
    }

    /// Commands recorded so far.
    pub fn display_list(&self) -> &DisplayList {
        &self.list
    }

    /// Close any clips or transforms left open and hand over the frame.
    pub fn finish(mut self) -> DisplayList {
        while self.clip_depth > 0 {
            self.pop_clip();
        }
        while !self.transform_stack.is_empty() {
            self.pop_transform();
        }
        self.list
    }
}
