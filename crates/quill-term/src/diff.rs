// SPDX-License-Identifier: MIT
//
// Differential renderer.
//
// Instead of redrawing the whole screen every frame, the current frame is
// compared against the previous one and escape sequences are emitted only for
// cells that changed. A keystroke in the text area usually touches one row
// plus the status line.
//
// The pipeline per frame:
//
//   1. The app paints into a FrameBuffer.
//   2. `DiffRenderer::render` compares it against the stored previous frame.
//   3. Changed cells go through `CellWriter`, which skips redundant cursor
//      moves and SGR sequences.
//   4. Everything lands in one byte buffer; `flush_to` writes it with a
//      single `write_all`.
//
// Unchanged rows are skipped with one slice comparison. Synchronized output
// (DEC 2026) wraps the frame so the terminal never shows half an update.

use std::io::{self, Write};

use crate::ansi;
use crate::buffer::FrameBuffer;
use crate::cell::{Attr, Cell, Color};

const OUTPUT_CAPACITY: usize = 16_384;

// ─── RenderStats ─────────────────────────────────────────────────────────────

/// What a render pass did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderStats {
    /// Cells that differed from the previous frame.
    pub cells_rendered: usize,
    /// Cells skipped because they matched.
    pub cells_skipped: usize,
    /// Bytes of escape output generated.
    pub bytes_written: usize,
}

// ─── CellWriter ──────────────────────────────────────────────────────────────

/// Tracks the terminal's cursor and SGR state to skip redundant escapes.
///
/// - Cursor moves are skipped when the next cell is directly right of the
///   last one (the terminal auto-advances).
/// - An attribute change resets (SGR 0) and re-emits, which also forgets the
///   tracked colors.
/// - Continuation cells right after their wide char emit nothing.
#[allow(clippy::struct_field_names)]
struct CellWriter {
    last_x: i32,
    last_y: i32,
    last_fg: Option<Color>,
    last_bg: Option<Color>,
    last_attrs: Attr,
}

impl CellWriter {
    const fn new() -> Self {
        Self {
            last_x: -1,
            last_y: -1,
            last_fg: None,
            last_bg: None,
            last_attrs: Attr::empty(),
        }
    }

    fn render_cell(&mut self, out: &mut Vec<u8>, x: u16, y: u16, cell: &Cell) -> io::Result<()> {
        let xi = i32::from(x);
        let yi = i32::from(y);

        if yi != self.last_y || xi != self.last_x + 1 {
            ansi::cursor_to(out, x, y)?;
        }

        if cell.is_continuation() {
            if xi > 0 && self.last_x == xi - 1 && self.last_y == yi {
                self.last_x = xi;
                return Ok(());
            }
            self.apply_style(out, cell)?;
            out.push(b' ');
        } else {
            self.apply_style(out, cell)?;
            let mut enc = [0u8; 4];
            out.extend_from_slice(cell.ch.encode_utf8(&mut enc).as_bytes());
        }

        self.last_x = xi;
        self.last_y = yi;
        Ok(())
    }

    fn apply_style(&mut self, out: &mut Vec<u8>, cell: &Cell) -> io::Result<()> {
        if cell.attrs != self.last_attrs {
            if !self.last_attrs.is_empty() {
                ansi::reset(out)?;
                self.last_fg = None;
                self.last_bg = None;
            }
            self.last_attrs = cell.attrs;
            ansi::attrs(out, cell.attrs)?;
        }
        if self.last_fg != Some(cell.fg) {
            ansi::fg(out, cell.fg)?;
            self.last_fg = Some(cell.fg);
        }
        if self.last_bg != Some(cell.bg) {
            ansi::bg(out, cell.bg)?;
            self.last_bg = Some(cell.bg);
        }
        Ok(())
    }
}

// ─── DiffRenderer ────────────────────────────────────────────────────────────

/// Emits escape output only for cells that changed since the last frame.
///
/// ```
/// use quill_term::buffer::FrameBuffer;
/// use quill_term::diff::DiffRenderer;
///
/// let mut renderer = DiffRenderer::new();
/// let frame = FrameBuffer::new(20, 4);
/// let first = renderer.render(&frame);
/// let second = renderer.render(&frame);
/// assert_eq!(first.cells_rendered, 80);
/// assert_eq!(second.cells_rendered, 0);
/// ```
pub struct DiffRenderer {
    output: Vec<u8>,
    previous: Option<FrameBuffer>,
}

impl DiffRenderer {
    /// A renderer with no previous frame; the first render draws everything.
    #[must_use]
    pub fn new() -> Self {
        Self {
            output: Vec::with_capacity(OUTPUT_CAPACITY),
            previous: None,
        }
    }

    /// Diff `current` against the previous frame into the output buffer.
    pub fn render(&mut self, current: &FrameBuffer) -> RenderStats {
        self.output.clear();
        let mut stats = RenderStats::default();

        if current.width() == 0 || current.height() == 0 {
            self.store_frame(current);
            return stats;
        }

        // Writes into a Vec never fail.
        let _ = self.diff_into(current, &mut stats);
        stats.bytes_written = self.output.len();
        self.store_frame(current);
        stats
    }

    fn diff_into(&mut self, current: &FrameBuffer, stats: &mut RenderStats) -> io::Result<()> {
        let out = &mut self.output;
        let mut writer = CellWriter::new();
        let width = current.width();

        let previous = self
            .previous
            .as_ref()
            .filter(|p| p.width() == width && p.height() == current.height());

        ansi::begin_sync(out)?;
        if previous.is_none() {
            ansi::reset(out)?;
            ansi::clear_screen(out)?;
        }

        for y in 0..current.height() {
            let Some(row) = current.row(y) else { break };
            let prev_row = previous.and_then(|p| p.row(y));
            if prev_row == Some(row) {
                stats.cells_skipped += row.len();
                continue;
            }
            for (x, cell) in (0..width).zip(row) {
                if prev_row.is_some_and(|p| p[usize::from(x)] == *cell) {
                    stats.cells_skipped += 1;
                } else {
                    writer.render_cell(out, x, y, cell)?;
                    stats.cells_rendered += 1;
                }
            }
        }

        ansi::reset(out)?;
        ansi::end_sync(out)
    }

    /// The bytes produced by the last render.
    #[must_use]
    pub fn output_bytes(&self) -> &[u8] {
        &self.output
    }

    /// Write the accumulated output and clear it.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `w` fails.
    pub fn flush_to(&mut self, w: &mut impl Write) -> io::Result<()> {
        if !self.output.is_empty() {
            w.write_all(&self.output)?;
            w.flush()?;
            self.output.clear();
        }
        Ok(())
    }

    /// Forget the previous frame so the next render redraws everything.
    pub fn force_redraw(&mut self) {
        self.previous = None;
    }

    fn store_frame(&mut self, current: &FrameBuffer) {
        match &mut self.previous {
            Some(prev) => prev.copy_from(current),
            None => self.previous = Some(current.clone()),
        }
    }
}

impl Default for DiffRenderer {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
