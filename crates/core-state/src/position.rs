//! Positions, markers and regions inside a file.

/// A byte position: line index and byte offset within that line.
///
/// Ordering is line first, then offset. Ranges built from two positions are
/// half-open: `end` is the first byte *not* covered. `(l, 0)` as an end means
/// the range stops right after the separator ending line `l - 1`, and line
/// `line_count()` is the virtual line past the last one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position {
    pub line: usize,
    pub pos: usize,
}

impl Position {
    pub const fn new(line: usize, pos: usize) -> Self {
        Self { line, pos }
    }

    pub const fn origin() -> Self {
        Self { line: 0, pos: 0 }
    }
}

/// Cursor or block marker: a byte position plus the screen column it was
/// placed at. The column may lie past the end of the line (virtual space).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    pub line: usize,
    pub pos: usize,
    pub col: usize,
}

impl Cursor {
    pub const fn new(line: usize, pos: usize, col: usize) -> Self {
        Self { line, pos, col }
    }

    pub const fn position(&self) -> Position {
        Position::new(self.line, self.pos)
    }
}

/// A rectangle of screen columns `[start_col, end_col)` over the inclusive
/// line range `first_line..=last_line`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColumnRegion {
    pub first_line: usize,
    pub last_line: usize,
    pub start_col: usize,
    pub end_col: usize,
}

impl ColumnRegion {
    pub const fn new(
        first_line: usize,
        last_line: usize,
        start_col: usize,
        end_col: usize,
    ) -> Self {
        Self {
            first_line,
            last_line,
            start_col,
            end_col,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.first_line <= self.last_line && self.start_col <= self.end_col
    }

    pub fn width(&self) -> usize {
        self.end_col - self.start_col
    }

    pub fn line_count(&self) -> usize {
        self.last_line - self.first_line + 1
    }

    pub fn lines(&self) -> std::ops::RangeInclusive<usize> {
        self.first_line..=self.last_line
    }
}

/// The active block selection, built from two markers.
///
/// For a character selection the markers' byte positions delimit the
/// half-open range `[start, end)`. For a column selection their columns give
/// the rectangle `[start.col, end.col)` over lines `start.line..=end.line`.
/// `valid` holds once both markers were placed and are correctly ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    pub start: Cursor,
    pub end: Cursor,
    pub is_column: bool,
    pub valid: bool,
    pub start_set: bool,
    pub end_set: bool,
}

impl Selection {
    /// A placed, validated character selection.
    pub fn chars(start: Cursor, end: Cursor) -> Self {
        let mut sel = Self {
            start,
            end,
            start_set: true,
            end_set: true,
            ..Self::default()
        };
        sel.revalidate();
        sel
    }

    /// A placed, validated column selection.
    pub fn columns(start: Cursor, end: Cursor) -> Self {
        let mut sel = Self {
            start,
            end,
            is_column: true,
            start_set: true,
            end_set: true,
            ..Self::default()
        };
        sel.revalidate();
        sel
    }

    /// Recompute `valid` from the placed markers and their ordering.
    pub fn revalidate(&mut self) {
        self.valid = self.start_set && self.end_set && self.markers_ordered();
    }

    /// Whether the markers are ordered for the current mode.
    pub fn markers_ordered(&self) -> bool {
        if self.is_column {
            self.start.line <= self.end.line && self.start.col <= self.end.col
        } else {
            self.start.position() <= self.end.position()
        }
    }

    /// Character range, if this is a valid character selection.
    pub fn char_range(&self) -> Option<(Position, Position)> {
        (self.valid && !self.is_column).then(|| (self.start.position(), self.end.position()))
    }

    /// Rectangle, if this is a valid column selection.
    pub fn column_region(&self) -> Option<ColumnRegion> {
        (self.valid && self.is_column).then(|| {
            ColumnRegion::new(self.start.line, self.end.line, self.start.col, self.end.col)
        })
    }

    pub fn invalidate(&mut self) {
        self.valid = false;
    }
}
