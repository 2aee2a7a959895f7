//! Tab-aware column arithmetic.
//!
//! Every byte occupies one screen column except `\t`, which advances to the
//! next tab stop. Positions (`pos`) are byte offsets into a line; columns
//! (`col`) are screen cells counted from zero.

use core_config::EditPolicy;

pub const TAB: u8 = b'\t';
pub const SPACE: u8 = b' ';

/// First tab stop strictly after `col`.
#[inline]
pub fn tab_stop(col: usize, tab_size: usize) -> usize {
    (col / tab_size + 1) * tab_size
}

#[inline]
fn advance(col: usize, b: u8, tab_size: usize) -> usize {
    if b == TAB {
        tab_stop(col, tab_size)
    } else {
        col + 1
    }
}

/// Visible width of `text` in columns.
pub fn width(text: &[u8], tab_size: usize) -> usize {
    column_of(text, text.len(), tab_size)
}

/// Column at which byte `pos` is displayed; positions past the end keep
/// counting one column per byte.
pub fn column_of(text: &[u8], pos: usize, tab_size: usize) -> usize {
    let mut col = 0;
    for &b in text.iter().take(pos) {
        col = advance(col, b, tab_size);
    }
    col + pos.saturating_sub(text.len())
}

/// Where a screen column lands inside a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnPos {
    /// `col` is the first column of the byte at `pos` (or the end of line).
    Exact { pos: usize },
    /// `col` falls strictly inside the tab at `pos`, which starts at `tab_col`.
    InsideTab { pos: usize, tab_col: usize },
    /// `col` lies `missing` columns beyond the end of the line.
    PastEnd { pos: usize, missing: usize },
}

impl ColumnPos {
    /// Byte offset, rounding a column inside a tab down to the tab itself.
    pub fn pos(self) -> usize {
        match self {
            ColumnPos::Exact { pos }
            | ColumnPos::InsideTab { pos, .. }
            | ColumnPos::PastEnd { pos, .. } => pos,
        }
    }
}

/// Map a screen column to a byte offset.
pub fn pos_of_column(text: &[u8], col: usize, tab_size: usize) -> ColumnPos {
    let mut c = 0;
    for (i, &b) in text.iter().enumerate() {
        if c == col {
            return ColumnPos::Exact { pos: i };
        }
        let next = advance(c, b, tab_size);
        if next > col {
            return ColumnPos::InsideTab { pos: i, tab_col: c };
        }
        c = next;
    }
    if c == col {
        ColumnPos::Exact { pos: text.len() }
    } else {
        ColumnPos::PastEnd {
            pos: text.len(),
            missing: col - c,
        }
    }
}

/// Byte offset of `col`, clamped to the end of the line.
pub fn clamp_pos_of_column(text: &[u8], col: usize, tab_size: usize) -> usize {
    pos_of_column(text, col, tab_size).pos()
}

/// Blank run filling the columns between two screen positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Blanks {
    pub tabs: usize,
    pub spaces: usize,
}

impl Blanks {
    pub fn spaces(n: usize) -> Self {
        Self { tabs: 0, spaces: n }
    }

    /// Bytes the run occupies.
    pub fn len(self) -> usize {
        self.tabs + self.spaces
    }

    pub fn is_empty(self) -> bool {
        self.len() == 0
    }

    /// Tabs first, then spaces.
    pub fn bytes(self) -> impl Iterator<Item = u8> {
        std::iter::repeat_n(TAB, self.tabs).chain(std::iter::repeat_n(SPACE, self.spaces))
    }

    pub fn write_to(self, out: &mut Vec<u8>) {
        out.extend(self.bytes());
    }
}

/// Blanks needed to move from column `from` to column `to` under `policy`.
///
/// Without `use_tabs` the run is all spaces. With it, `optimal_fill` uses a
/// tab for every tab stop crossed; otherwise tabs are only used when `from`
/// already sits on a tab stop.
pub fn calc_blanks(from: usize, to: usize, policy: &EditPolicy) -> Blanks {
    if to <= from {
        return Blanks::default();
    }
    let ts = policy.tab_size.max(1);
    if !policy.use_tabs || (!policy.optimal_fill && from % ts != 0) {
        return Blanks::spaces(to - from);
    }
    let mut col = from;
    let mut tabs = 0;
    while tab_stop(col, ts) <= to {
        col = tab_stop(col, ts);
        tabs += 1;
    }
    Blanks {
        tabs,
        spaces: to - col,
    }
}

/// Append the blanks moving from `from` to `to` and return the bytes written.
pub fn put_blanks(out: &mut Vec<u8>, from: usize, to: usize, policy: &EditPolicy) -> usize {
    let blanks = calc_blanks(from, to, policy);
    blanks.write_to(out);
    blanks.len()
}

/// Length of `text` after dropping trailing spaces and tabs.
pub fn trim_trailing_blanks(text: &[u8]) -> usize {
    text.iter()
        .rposition(|&b| b != SPACE && b != TAB)
        .map_or(0, |i| i + 1)
}

/// Maximal runs of tabs whose screen span overlaps `[start_col, end_col)`.
///
/// Returns `(pos, count, start_col, end_col)` for each run: the byte offset
/// of the first tab, the number of tabs, and the columns the run covers.
pub fn tab_runs_overlapping(
    text: &[u8],
    start_col: usize,
    end_col: usize,
    tab_size: usize,
) -> Vec<(usize, usize, usize, usize)> {
    let mut runs = Vec::new();
    let mut col = 0;
    let mut i = 0;
    while i < text.len() && col < end_col {
        if text[i] != TAB {
            col += 1;
            i += 1;
            continue;
        }
        let run_pos = i;
        let run_col = col;
        while i < text.len() && text[i] == TAB {
            col = tab_stop(col, tab_size);
            i += 1;
        }
        if col > start_col && run_col < end_col {
            runs.push((run_pos, i - run_pos, run_col, col));
        }
    }
    runs
}
