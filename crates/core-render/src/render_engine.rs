//! RenderEngine: frame diffing and emission.
//!
//! Keeps the last emitted `Frame`. A render compares the candidate frame with
//! it row by row and repaints only differing rows. The full path (screen clear
//! plus every row) runs when there is no previous frame, after `invalidate()`,
//! or when the frame dimensions changed.

use crate::writer::Writer;
use crate::{Frame, RowFlags};
use anyhow::Result;
use core_model::EditorModel;
use std::sync::atomic::{AtomicU64, Ordering::Relaxed};
use std::time::Instant;
use tracing::trace;

#[derive(Debug, Default)]
pub struct RenderMetrics {
    /// Frames rendered (full or partial).
    pub frames: AtomicU64,
    /// Frames that started with a full screen clear.
    pub full_clears: AtomicU64,
    /// Rows rewritten across all frames.
    pub rows_repainted: AtomicU64,
    /// Frames where no row changed (cursor placement only).
    pub cursor_only_frames: AtomicU64,
    /// Explicit invalidations (redraw requests, resizes).
    pub invalidations: AtomicU64,
    pub print_commands: AtomicU64,
    /// Duration (ns) of the most recent render.
    pub last_render_ns: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderMetricsSnapshot {
    pub frames: u64,
    pub full_clears: u64,
    pub rows_repainted: u64,
    pub cursor_only_frames: u64,
    pub invalidations: u64,
    pub print_commands: u64,
    pub last_render_ns: u64,
}

impl RenderMetrics {
    pub fn snapshot(&self) -> RenderMetricsSnapshot {
        RenderMetricsSnapshot {
            frames: self.frames.load(Relaxed),
            full_clears: self.full_clears.load(Relaxed),
            rows_repainted: self.rows_repainted.load(Relaxed),
            cursor_only_frames: self.cursor_only_frames.load(Relaxed),
            invalidations: self.invalidations.load(Relaxed),
            print_commands: self.print_commands.load(Relaxed),
            last_render_ns: self.last_render_ns.load(Relaxed),
        }
    }
}

#[derive(Debug, Default)]
pub struct RenderEngine {
    prev: Option<Frame>,
    metrics: RenderMetrics,
    last_repainted_rows: Vec<u16>,
    last_was_full: bool,
}

impl RenderEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the previous frame so the next render repaints everything.
    pub fn invalidate(&mut self) {
        self.prev = None;
        self.metrics.invalidations.fetch_add(1, Relaxed);
        trace!(target: "render", "invalidate");
    }

    /// Screen rows rewritten by the most recent render.
    pub fn last_repainted_rows(&self) -> &[u16] {
        &self.last_repainted_rows
    }

    pub fn last_was_full(&self) -> bool {
        self.last_was_full
    }

    pub fn metrics(&self) -> &RenderMetrics {
        &self.metrics
    }

    /// Build the frame for `model` and return the bytes that bring the screen
    /// from the previous frame to it.
    pub fn render(&mut self, model: &EditorModel) -> Result<Vec<u8>> {
        let frame = Frame::build(model);
        self.render_frame(frame)
    }

    pub fn render_frame(&mut self, frame: Frame) -> Result<Vec<u8>> {
        let start = Instant::now();
        let prev = self
            .prev
            .take()
            .filter(|p| p.width == frame.width && p.height() == frame.height());
        let full = prev.is_none();

        let mut w = Writer::new();
        w.hide_cursor();
        if full {
            w.clear_all();
        }
        self.last_repainted_rows.clear();
        for (y, row) in frame.rows.iter().enumerate() {
            let changed = match &prev {
                Some(p) => p.rows.get(y) != Some(row),
                None => true,
            };
            if !changed {
                continue;
            }
            let y = y as u16;
            w.move_to(0, y);
            let reverse = row.flags.contains(RowFlags::REVERSE);
            if reverse {
                w.reverse(true);
            }
            w.print(row.text.as_str());
            if reverse {
                w.reverse(false);
            }
            w.clear_to_eol();
            self.last_repainted_rows.push(y);
        }
        w.move_to(frame.cursor.0, frame.cursor.1);
        w.show_cursor();

        let print_cmds = w.print_count() as u64;
        let mut out = Vec::new();
        w.flush_into(&mut out)?;

        let repainted = self.last_repainted_rows.len() as u64;
        self.metrics.frames.fetch_add(1, Relaxed);
        self.metrics.rows_repainted.fetch_add(repainted, Relaxed);
        self.metrics.print_commands.fetch_add(print_cmds, Relaxed);
        if full {
            self.metrics.full_clears.fetch_add(1, Relaxed);
        } else if repainted == 0 {
            self.metrics.cursor_only_frames.fetch_add(1, Relaxed);
        }
        let dur = start.elapsed().as_nanos() as u64;
        self.metrics.last_render_ns.store(dur, Relaxed);
        trace!(
            target: "render",
            full,
            rows = repainted,
            bytes = out.len(),
            ns = dur,
            "frame"
        );

        self.last_was_full = full;
        self.prev = Some(frame);
        Ok(out)
    }
}
