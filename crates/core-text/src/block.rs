//! Standalone line blocks (clipboard contents, undo payloads, insertion
//! sources) and the construction operations that do not need a file.
//!
//! Every constructor sizes its arena block exactly before writing: a first
//! pass measures, a second pass copies. A [`BlockWriter`] owns the buffer
//! under construction; if any later step fails the writer is dropped and the
//! reservation goes with it.

use std::rc::Rc;

use tracing::trace;

use crate::arena::{Arena, ArenaBlock, ArenaBuf};
use crate::eol::EolType;
use crate::error::{TextError, TextResult};
use crate::line::{Line, LineAttr, distinct_blocks};
use crate::tabs::Blanks;

/// A File-independent snapshot of one or more lines.
///
/// A block always holds at least one line. A character block of `n` lines
/// stands for the text `l0 EOL l1 EOL ... l(n-1)`: the last line is the
/// unterminated tail, so `"abc\n"` is the two lines `"abc"` and `""`. A
/// column block holds one piece per row of a rectangle.
#[derive(Debug, Clone)]
pub struct Block {
    lines: Vec<Line>,
    eol: EolType,
    is_column: bool,
}

impl Block {
    pub fn from_lines(lines: Vec<Line>, eol: EolType, is_column: bool) -> TextResult<Self> {
        if lines.is_empty() {
            return Err(TextError::EmptyBlock);
        }
        Ok(Self {
            lines,
            eol,
            is_column,
        })
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn line(&self, idx: usize) -> &Line {
        &self.lines[idx]
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn last_line(&self) -> &Line {
        // Non-empty by construction.
        &self.lines[self.lines.len() - 1]
    }

    pub fn eol(&self) -> EolType {
        self.eol
    }

    pub fn is_column(&self) -> bool {
        self.is_column
    }

    pub fn set_column(&mut self, is_column: bool) {
        self.is_column = is_column;
    }

    /// True for the single empty line, i.e. no text at all.
    pub fn is_empty(&self) -> bool {
        self.lines.len() == 1 && self.lines[0].is_empty()
    }

    /// Widest line in bytes (the rectangle width of a column block).
    pub fn width(&self) -> usize {
        self.lines.iter().map(Line::len).max().unwrap_or(0)
    }

    /// Text bytes plus separators.
    pub fn text_len(&self) -> usize {
        self.lines.iter().map(Line::len).sum::<usize>()
            + (self.lines.len() - 1) * self.eol.byte_len()
    }

    /// Serialize the lines joined by the block's terminator.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.text_len());
        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 {
                out.extend_from_slice(self.eol.as_bytes());
            }
            out.extend_from_slice(line.text());
        }
        out
    }

    /// Texts of every line, for tests and diagnostics.
    pub fn line_texts(&self) -> Vec<&[u8]> {
        self.lines.iter().map(Line::text).collect()
    }

    /// Distinct arena blocks backing this block.
    pub fn backing(&self) -> Vec<Rc<ArenaBlock>> {
        distinct_blocks(&self.lines)
    }

    pub fn into_lines(self) -> Vec<Line> {
        self.lines
    }
}

/// Two-pass writer laying out lines in one freshly allocated arena block.
pub struct BlockWriter {
    buf: ArenaBuf,
    eol: EolType,
    spans: Vec<(usize, usize)>,
    line_start: usize,
}

impl BlockWriter {
    /// Bytes needed for lines of the given lengths, each followed by `eol`.
    pub fn measure(line_lens: impl IntoIterator<Item = usize>, eol: EolType) -> (usize, usize) {
        let mut bytes = 0;
        let mut count = 0;
        for len in line_lens {
            bytes += len + eol.byte_len();
            count += 1;
        }
        (bytes, count)
    }

    /// Reserve storage for `line_count` lines totalling `byte_size` bytes
    /// (terminators included, as returned by [`BlockWriter::measure`]).
    pub fn new(
        arena: &Arena,
        eol: EolType,
        byte_size: usize,
        line_count: usize,
    ) -> TextResult<Self> {
        let buf = arena.allocate(byte_size)?;
        let mut spans = Vec::new();
        spans
            .try_reserve_exact(line_count)
            .map_err(|_| TextError::OutOfMemory {
                requested: line_count * std::mem::size_of::<Line>(),
            })?;
        Ok(Self {
            buf,
            eol,
            spans,
            line_start: 0,
        })
    }

    /// Length of the line being written so far.
    pub fn current_len(&self) -> usize {
        self.buf.len() - self.line_start
    }

    pub fn push(&mut self, bytes: &[u8]) {
        self.buf.push(bytes);
    }

    pub fn push_repeated(&mut self, b: u8, count: usize) {
        self.buf.push_repeated(b, count);
    }

    pub fn push_blanks(&mut self, blanks: Blanks) {
        for b in blanks.bytes() {
            self.buf.push_byte(b);
        }
    }

    /// Close the current line and write its terminator.
    pub fn end_line(&mut self) {
        let len = self.current_len();
        self.spans.push((self.line_start, len));
        self.buf.push(self.eol.as_bytes());
        self.line_start = self.buf.len();
    }

    pub fn finish(self, is_column: bool) -> TextResult<Block> {
        let BlockWriter {
            buf, eol, spans, ..
        } = self;
        let mut lines = Vec::new();
        lines
            .try_reserve_exact(spans.len())
            .map_err(|_| TextError::OutOfMemory {
                requested: spans.len() * std::mem::size_of::<Line>(),
            })?;
        let block = buf.freeze();
        for (start, len) in spans {
            lines.push(Line::new(block.clone(), start, len, LineAttr::empty()));
        }
        Block::from_lines(lines, eol, is_column)
    }
}

/// Parse an arbitrary byte string into a block.
///
/// The terminator is autodetected (see [`EolType::detect`]), defaulting to
/// LF. Delimiters are located in one pass so the line vector is allocated
/// once, then the lines are populated from a single copy of `text`.
pub fn make_block(arena: &Arena, text: &[u8], attr: LineAttr) -> TextResult<Block> {
    let eol = EolType::detect(text).unwrap_or_default();
    let delims = eol.delimiters(text).count();
    let mut lines = Vec::new();
    lines
        .try_reserve_exact(delims + 1)
        .map_err(|_| TextError::OutOfMemory {
            requested: (delims + 1) * std::mem::size_of::<Line>(),
        })?;
    let mut buf = arena.allocate(text.len())?;
    buf.push(text);
    let block = buf.freeze();
    let mut start = 0;
    for at in eol.delimiters(text) {
        lines.push(Line::new(block.clone(), start, at - start, attr));
        start = at + eol.byte_len();
    }
    lines.push(Line::new(block, start, text.len() - start, attr));
    trace!(target: "text.block", bytes = text.len(), lines = lines.len(), eol = ?eol, "make_block");
    Block::from_lines(lines, eol, false)
}

/// Single-line block of `size` copies of `ch`.
pub fn generate_block(arena: &Arena, ch: u8, size: usize) -> TextResult<Block> {
    let eol = EolType::default();
    let (bytes, count) = BlockWriter::measure([size], eol);
    let mut w = BlockWriter::new(arena, eol, bytes, count)?;
    w.push_repeated(ch, size);
    w.end_line();
    w.finish(false)
}

/// Result of [`duplicate_block`].
#[derive(Debug)]
pub struct Duplicate {
    pub block: Block,
    /// Offset within the last line where the suffix begins.
    pub suffix_position: usize,
    /// Full length of the last line, suffix included.
    pub last_line_len: usize,
}

/// Copy `block` re-encoded with `eol`, fusing `prefix` in front of the first
/// line and `suffix` after the last line within the same allocation.
pub fn duplicate_block(
    arena: &Arena,
    block: &Block,
    eol: EolType,
    prefix: &[u8],
    suffix: &[u8],
) -> TextResult<Duplicate> {
    let n = block.line_count();
    let lens = block.lines().iter().enumerate().map(|(i, l)| {
        let mut len = l.len();
        if i == 0 {
            len += prefix.len();
        }
        if i + 1 == n {
            len += suffix.len();
        }
        len
    });
    let (bytes, count) = BlockWriter::measure(lens, eol);
    let mut w = BlockWriter::new(arena, eol, bytes, count)?;
    let mut suffix_position = 0;
    for (i, line) in block.lines().iter().enumerate() {
        if i == 0 {
            w.push(prefix);
        }
        w.push(line.text());
        if i + 1 == n {
            suffix_position = w.current_len();
            w.push(suffix);
        }
        w.end_line();
    }
    let block = w.finish(block.is_column())?;
    let last_line_len = block.last_line().len();
    trace!(
        target: "text.block",
        lines = n,
        prefix = prefix.len(),
        suffix = suffix.len(),
        "duplicate_block"
    );
    Ok(Duplicate {
        block,
        suffix_position,
        last_line_len,
    })
}
