// SPDX-License-Identifier: MIT
//
// Differential renderer.
//
// Each tick the clock repaints its windows into the frame buffer, but from
// one second to the next usually only one or two digits actually differ. The
// renderer compares the frame with the one the terminal last showed and
// emits escapes for the changed cells only.
//
//   1. Windows paint into the FrameBuffer.
//   2. render() compares it row by row against the stored previous frame.
//      Identical rows are skipped with one slice comparison.
//   3. Changed cells go through CellWriter into an OutputBuffer.
//   4. flush_to() writes the whole frame with one write().
//
// A tick where nothing changed produces no output at all.

use std::io::{self, Write};

use crate::ansi;
use crate::buffer::FrameBuffer;
use crate::output::{CellWriter, OutputBuffer};

// ─── RenderStats ─────────────────────────────────────────────────────────────

/// What a render pass did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderStats {
    /// Cells that differed from the previous frame.
    pub cells_rendered: usize,
    /// Cells that matched and were skipped.
    pub cells_skipped: usize,
    /// Bytes of ANSI output generated.
    pub bytes_written: usize,
}

// ─── DiffRenderer ────────────────────────────────────────────────────────────

/// Emits ANSI output for the cells that changed since the last render.
pub struct DiffRenderer {
    output: OutputBuffer,
    writer: CellWriter,
    previous: FrameBuffer,
    full_redraw: bool,
}

impl DiffRenderer {
    /// A renderer whose first render draws everything.
    #[must_use]
    pub fn new() -> Self {
        Self {
            output: OutputBuffer::new(),
            writer: CellWriter::new(),
            previous: FrameBuffer::new(0, 0),
            full_redraw: true,
        }
    }

    /// Diff `current` against the previous frame and queue the output.
    pub fn render(&mut self, current: &FrameBuffer) -> RenderStats {
        self.output.clear();
        self.writer.reset_state();

        let width = current.width();
        let height = current.height();
        let mut stats = RenderStats::default();

        let full_redraw = self.full_redraw
            || self.previous.width() != width
            || self.previous.height() != height;

        if width == 0 || height == 0 {
            self.store_frame(current);
            return stats;
        }

        ansi::begin_sync(&mut self.output).ok();

        if full_redraw {
            ansi::reset(&mut self.output).ok();
            ansi::clear_screen(&mut self.output).ok();
        }

        for y in 0..height {
            let (Some(curr_row), prev_row) = (current.row(y), self.previous.row(y)) else {
                continue;
            };

            if !full_redraw && prev_row == Some(curr_row) {
                stats.cells_skipped += curr_row.len();
                continue;
            }

            for (x, cell) in (0..width).zip(curr_row) {
                let unchanged = !full_redraw && prev_row.and_then(|r| r.get(usize::from(x))) == Some(cell);
                if unchanged {
                    stats.cells_skipped += 1;
                } else {
                    self.writer.render_cell(&mut self.output, x, y, cell);
                    stats.cells_rendered += 1;
                }
            }
        }

        if stats.cells_rendered == 0 && !full_redraw {
            self.output.clear();
        } else {
            // Leave the terminal with plain attributes between frames.
            ansi::reset(&mut self.output).ok();
            ansi::end_sync(&mut self.output).ok();
        }

        stats.bytes_written = self.output.len();
        self.store_frame(current);
        stats
    }

    /// The bytes queued by the last render.
    #[must_use]
    pub fn output_bytes(&self) -> &[u8] {
        self.output.as_bytes()
    }

    /// Write the queued output to `w`.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `w` fails.
    pub fn flush_to(&mut self, w: &mut impl Write) -> io::Result<()> {
        self.output.flush_to(w)
    }

    /// Make the next render clear the screen and draw every cell.
    pub fn force_redraw(&mut self) {
        self.full_redraw = true;
    }

    fn store_frame(&mut self, current: &FrameBuffer) {
        self.previous.copy_from(current);
        self.full_redraw = false;
    }
}

impl Default for DiffRenderer {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::{Attr, Cell, Pen};
    use crate::color::CellColor;

    fn render(renderer: &mut DiffRenderer, frame: &FrameBuffer) -> (RenderStats, String) {
        let stats = renderer.render(frame);
        let text = String::from_utf8_lossy(renderer.output_bytes()).into_owned();
        (stats, text)
    }

    #[test]
    fn first_render_draws_every_cell() {
        let mut r = DiffRenderer::new();
        let (stats, out) = render(&mut r, &FrameBuffer::new(4, 3));
        assert_eq!(stats.cells_rendered, 12);
        assert_eq!(stats.cells_skipped, 0);
        assert!(out.starts_with("\x1b[?2026h"));
        assert!(out.contains("\x1b[2J"));
        assert!(out.ends_with("\x1b[0m\x1b[?2026l"));
    }

    #[test]
    fn unchanged_frame_emits_nothing() {
        let mut r = DiffRenderer::new();
        let frame = FrameBuffer::new(10, 5);
        render(&mut r, &frame);
        let (stats, out) = render(&mut r, &frame);
        assert_eq!(stats.cells_rendered, 0);
        assert_eq!(stats.cells_skipped, 50);
        assert!(out.is_empty());
        assert_eq!(stats.bytes_written, 0);
    }

    #[test]
    fn one_changed_cell_renders_one() {
        let mut r = DiffRenderer::new();
        let mut frame = FrameBuffer::new(10, 5);
        render(&mut r, &frame);

        frame.set(3, 2, Cell::new('7'));
        let (stats, out) = render(&mut r, &frame);
        assert_eq!(stats.cells_rendered, 1);
        assert_eq!(stats.cells_skipped, 49);
        assert!(out.contains("\x1b[3;4H"));
        assert!(out.contains('7'));
        assert!(!out.contains("\x1b[2J"));
    }

    #[test]
    fn lit_segment_emits_background() {
        let mut r = DiffRenderer::new();
        let mut frame = FrameBuffer::new(4, 1);
        render(&mut r, &frame);

        let pen = Pen::new(CellColor::Default, CellColor::Ansi256(2)).with_attrs(Attr::BOLD);
        frame.paint_cell(0, 0, ' ', pen, None);
        frame.paint_cell(1, 0, ' ', pen, None);
        let (stats, out) = render(&mut r, &frame);
        assert_eq!(stats.cells_rendered, 2);
        assert!(out.contains("\x1b[1m"));
        assert!(out.contains("\x1b[42m"));
    }

    #[test]
    fn resize_forces_full_redraw() {
        let mut r = DiffRenderer::new();
        render(&mut r, &FrameBuffer::new(10, 5));
        let (stats, out) = render(&mut r, &FrameBuffer::new(12, 6));
        assert_eq!(stats.cells_rendered, 72);
        assert!(out.contains("\x1b[2J"));
    }

    #[test]
    fn force_redraw_repaints_identical_frame() {
        let mut r = DiffRenderer::new();
        let frame = FrameBuffer::new(3, 3);
        render(&mut r, &frame);
        r.force_redraw();
        let (stats, out) = render(&mut r, &frame);
        assert_eq!(stats.cells_rendered, 9);
        assert!(out.contains("\x1b[2J"));

        let (stats, _) = render(&mut r, &frame);
        assert_eq!(stats.cells_rendered, 0);
    }

    #[test]
    fn zero_size_frame_produces_no_output() {
        let mut r = DiffRenderer::new();
        let (stats, out) = render(&mut r, &FrameBuffer::new(0, 0));
        assert_eq!(stats, RenderStats::default());
        assert!(out.is_empty());
    }

    #[test]
    fn flush_to_drains_output() {
        let mut r = DiffRenderer::new();
        r.render(&FrameBuffer::new(2, 1));
        let mut sink = Vec::new();
        r.flush_to(&mut sink).unwrap();
        assert!(!sink.is_empty());
        assert!(r.output_bytes().is_empty());
    }
}
