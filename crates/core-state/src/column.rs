//! Rectangular (column block) splices.
//!
//! Both primitives work line by line on the rectangle's rows and replace the
//! affected index range in one splice. Callers detab the region first (see
//! [`crate::detab_column_region`]) so a column never falls inside a tab.

use core_text::{Block, BlockWriter, Line, tabs};
use tracing::trace;

use crate::error::{EditError, EditResult};
use crate::file::File;
use crate::markers::{resync_column_markers, shift_line_markers};
use crate::position::ColumnRegion;

/// How [`delete_column_block_prim`] decides what each line loses.
#[derive(Debug, Clone, Copy)]
pub enum PatternMode<'a> {
    /// Derive the removal from the region and the current policy, and
    /// return a pattern recording exactly what went away.
    Generate,
    /// Strip exactly as many bytes per line as the recorded pattern holds.
    /// Replaying is independent of the policy in force now.
    Replay(&'a Block),
}

/// One rebuilt line: either a sub-span of the current line or text that
/// needs fresh storage.
enum Rebuilt {
    Keep,
    Slice(std::ops::Range<usize>),
    Concat { head: std::ops::Range<usize>, piece: usize, tail: std::ops::Range<usize> },
}

/// Merge a fitted pattern into the lines at the cursor.
///
/// Row `cursor.line + i` receives pattern line `i` at the cursor column:
/// appended when the line ends at or before that column, spliced in
/// otherwise. Rows past the end of the file become new lines holding the
/// pattern. Returns the number of lines appended.
pub fn insert_column_block_prim(file: &mut File, pattern: &Block) -> EditResult<usize> {
    let cursor = file.cursor();
    let n = file.line_count();
    if cursor.line > n {
        return Err(core_text::TextError::LineOutOfRange {
            line: cursor.line,
            count: n,
        }
        .into());
    }
    let first = cursor.line;
    let k = pattern.line_count();
    let ts = file.tab_size();

    let mut plan = Vec::with_capacity(k);
    for (i, piece) in pattern.lines().iter().enumerate() {
        let r = first + i;
        if r >= n {
            plan.push((Rebuilt::Concat { head: 0..0, piece: i, tail: 0..0 }, 0));
            continue;
        }
        if piece.is_empty() {
            plan.push((Rebuilt::Keep, 0));
            continue;
        }
        let text = file.line_text(r);
        let p = tabs::clamp_pos_of_column(text, cursor.col, ts);
        plan.push((
            Rebuilt::Concat {
                head: 0..p,
                piece: i,
                tail: p..text.len(),
            },
            p,
        ));
    }

    let new_lines = rebuild(file, first, &plan, Some(pattern))?;
    let appended = (first + k).saturating_sub(n);
    file.lines_mut().splice(first..(first + k).min(n), new_lines)?;

    for (i, (how, p)) in plan.iter().enumerate() {
        if first + i < n && matches!(how, Rebuilt::Concat { .. }) {
            shift_line_markers(file, first + i, *p, pattern.line(i).len() as isize);
        }
    }
    resync_column_markers(file);
    file.notify_lines_changed(n, appended as isize);
    file.notify_eol_invalidated(first);
    file.notify_rescan();
    file.mark_changed();
    trace!(
        target: "state.block",
        first,
        lines = k,
        col = cursor.col,
        appended,
        "insert_column_block"
    );
    Ok(appended)
}

/// Remove the rectangle `region` from its lines.
///
/// In [`PatternMode::Generate`] each line loses the bytes between the
/// region's columns. When nothing follows the region and the policy asks
/// for it, blanks left dangling before the region are trimmed too. The
/// returned pattern holds, per line, the trimmed blanks followed by the
/// removed bytes, so inserting it back at the region's top-left corner with
/// [`insert_column_block_prim`] restores the lines.
///
/// In [`PatternMode::Replay`] line `i` loses as many bytes as pattern line
/// `i` holds, taken at the region's start column or, when the line is too
/// short for that, from its end. Returns `None`.
pub fn delete_column_block_prim(
    file: &mut File,
    region: ColumnRegion,
    mode: PatternMode<'_>,
) -> EditResult<Option<Block>> {
    if !region.is_valid() {
        return Err(EditError::InvalidColumnRegion(region));
    }
    let n = file.line_count();
    if region.last_line >= n {
        return Err(core_text::TextError::LineOutOfRange {
            line: region.last_line,
            count: n,
        }
        .into());
    }
    if let PatternMode::Replay(p) = mode
        && p.line_count() != region.line_count()
    {
        return Err(EditError::PatternMismatch {
            expected: region.line_count(),
            got: p.line_count(),
        });
    }
    let ts = file.tab_size();
    let strip_blanks = file.policy().remove_trailing_blanks;

    // Per line: rebuilt shape, first changed byte, and the pattern span.
    let mut plan = Vec::with_capacity(region.line_count());
    let mut removed_spans = Vec::with_capacity(region.line_count());
    for (i, r) in region.lines().enumerate() {
        let text = file.line_text(r);
        let p0 = tabs::clamp_pos_of_column(text, region.start_col, ts);
        let (how, changed_at, span) = match mode {
            PatternMode::Generate => {
                let p1 = tabs::clamp_pos_of_column(text, region.end_col, ts);
                let kept = if p1 == text.len() && strip_blanks {
                    tabs::trim_trailing_blanks(&text[..p0])
                } else {
                    p0
                };
                let how = if kept == p1 {
                    Rebuilt::Keep
                } else if p1 == text.len() {
                    Rebuilt::Slice(0..kept)
                } else if kept == 0 {
                    Rebuilt::Slice(p1..text.len())
                } else {
                    Rebuilt::Concat {
                        head: 0..kept,
                        piece: usize::MAX,
                        tail: p1..text.len(),
                    }
                };
                (how, kept, kept..p1)
            }
            PatternMode::Replay(pattern) => {
                let k = pattern.line(i).len().min(text.len());
                let how = if k == 0 {
                    Rebuilt::Keep
                } else if text.len() - k <= p0 {
                    Rebuilt::Slice(0..text.len() - k)
                } else if p0 == 0 {
                    Rebuilt::Slice(k..text.len())
                } else {
                    Rebuilt::Concat {
                        head: 0..p0,
                        piece: usize::MAX,
                        tail: p0 + k..text.len(),
                    }
                };
                let at = if text.len() - k <= p0 { text.len() - k } else { p0 };
                (how, at, at..at + k)
            }
        };
        plan.push((how, changed_at));
        removed_spans.push(span);
    }

    let pattern = match mode {
        PatternMode::Generate => {
            let eol = file.eol();
            let (bytes, count) = BlockWriter::measure(removed_spans.iter().map(|s| s.len()), eol);
            let mut w = BlockWriter::new(file.arena(), eol, bytes, count)?;
            for (r, span) in region.lines().zip(&removed_spans) {
                w.push(&file.line_text(r)[span.clone()]);
                w.end_line();
            }
            Some(w.finish(true)?)
        }
        PatternMode::Replay(_) => None,
    };

    let new_lines = rebuild(file, region.first_line, &plan, None)?;
    file.lines_mut()
        .splice(region.first_line..region.last_line + 1, new_lines)?;

    for (i, ((how, at), span)) in plan.iter().zip(&removed_spans).enumerate() {
        if !matches!(how, Rebuilt::Keep) {
            shift_line_markers(file, region.first_line + i, *at, -(span.len() as isize));
        }
    }
    resync_column_markers(file);
    file.notify_eol_invalidated(region.first_line);
    file.notify_rescan();
    file.mark_changed();
    trace!(
        target: "state.block",
        first = region.first_line,
        last = region.last_line,
        start_col = region.start_col,
        end_col = region.end_col,
        replay = matches!(mode, PatternMode::Replay(_)),
        "delete_column_block"
    );
    Ok(pattern)
}

/// Materialise a plan over lines `first..` into new index entries. All
/// concatenations share one fresh arena block.
fn rebuild(
    file: &File,
    first: usize,
    plan: &[(Rebuilt, usize)],
    pattern: Option<&Block>,
) -> EditResult<Vec<Line>> {
    let piece_of = |i: usize| -> usize {
        match pattern {
            Some(p) if i != usize::MAX => p.line(i).len(),
            _ => 0,
        }
    };
    let concat_lens = plan.iter().filter_map(|(how, _)| match how {
        Rebuilt::Concat { head, piece, tail } => Some(head.len() + piece_of(*piece) + tail.len()),
        _ => None,
    });
    let eol = file.eol();
    let (bytes, count) = BlockWriter::measure(concat_lens, eol);
    let mut concat = if count > 0 {
        let mut w = BlockWriter::new(file.arena(), eol, bytes, count)?;
        for (i, (how, _)) in plan.iter().enumerate() {
            if let Rebuilt::Concat { head, piece, tail } = how {
                let text = file.line_text(first + i);
                w.push(&text[head.clone()]);
                if let Some(p) = pattern
                    && *piece != usize::MAX
                {
                    w.push(p.line(*piece).text());
                }
                w.push(&text[tail.clone()]);
                w.end_line();
            }
        }
        w.finish(false)?.into_lines().into_iter()
    } else {
        Vec::new().into_iter()
    };

    let mut out = Vec::new();
    out.try_reserve_exact(plan.len())
        .map_err(|_| core_text::TextError::OutOfMemory {
            requested: plan.len() * std::mem::size_of::<Line>(),
        })?;
    for (i, (how, _)) in plan.iter().enumerate() {
        let line = match how {
            Rebuilt::Keep => file.line(first + i).cloned(),
            Rebuilt::Slice(range) => file.line(first + i).map(|l| l.slice(range.clone())),
            Rebuilt::Concat { .. } => concat.next(),
        };
        if let Some(mut line) = line {
            line.attr.invalidate_eol_status();
            out.push(line);
        }
    }
    Ok(out)
}
