//! Undo log: an ordered list of invertible edit records.
//!
//! The log only stores; replaying a record is the job of the undo driver,
//! which runs the inverse primitive named by the record's kind and region.
//!
//! An edit reserves room with [`UndoLog::reserve`] before touching the file
//! and appends its record once applied, so a recorded edit is never lost to
//! an allocation failure.
//!
//! Records are appended in edit order. Undo flips the `undone` flag of the
//! newest live group, redo clears it on the oldest undone group, so the
//! undone records always form a suffix of the log. Recording a new edit
//! drops that suffix; reserving room for one does not.
//!
//! Grouping: [`UndoLog::begin_group`] / [`UndoLog::end_group`] nest. Every
//! record made while at least one group is open shares the id of the
//! outermost group and is undone or redone together with it. A record made
//! outside any group forms a group of its own.

use std::ops::Range;

use core_text::{Block, TextError, TextResult};
use tracing::trace;

use crate::position::{ColumnRegion, Cursor, Position, Selection};

/// Cursor and selection state captured around an edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FileStatus {
    pub cursor: Cursor,
    pub selection: Selection,
    pub modified: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UndoKind {
    Insert,
    Delete,
    /// Single byte overwritten (or appended) in place.
    Replace,
    /// Cursor or selection change only; text untouched.
    Rearrange,
}

/// The text range an undo record applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UndoRegion {
    None,
    /// Character range `[start, end)` as it exists after an insert or before
    /// a delete.
    Chars { start: Position, end: Position },
    /// Rectangle touched by a column operation. `appended` counts lines a
    /// column insert added past the end of the file.
    Columns { region: ColumnRegion, appended: usize },
    /// Byte at `at` replaced by `new`; `old` is `None` when `new` was
    /// appended at the end of the line.
    Byte { at: Position, old: Option<u8>, new: u8 },
}

#[derive(Debug, Clone)]
pub struct UndoRecord {
    pub kind: UndoKind,
    pub before: FileStatus,
    pub after: FileStatus,
    /// Text needed to invert the edit: the inserted block, the deleted
    /// block, or the column pattern.
    pub payload: Option<Block>,
    pub region: UndoRegion,
    /// Group nesting depth when the record was made (0 outside any group).
    pub nesting_level: usize,
    pub group: u64,
    pub undone: bool,
}

#[derive(Debug, Default)]
pub struct UndoLog {
    records: Vec<UndoRecord>,
    nesting: usize,
    open_group: Option<u64>,
    next_group: u64,
}

impl UndoLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[UndoRecord] {
        &self.records
    }

    pub fn get(&self, idx: usize) -> Option<&UndoRecord> {
        self.records.get(idx)
    }

    pub fn last(&self) -> Option<&UndoRecord> {
        self.records.last()
    }

    /// Current group nesting depth.
    pub fn nesting_level(&self) -> usize {
        self.nesting
    }

    /// Number of records not undone (they form a prefix of the log).
    pub fn applied(&self) -> usize {
        self.records
            .iter()
            .position(|r| r.undone)
            .unwrap_or(self.records.len())
    }

    pub fn can_undo(&self) -> bool {
        self.applied() > 0
    }

    pub fn can_redo(&self) -> bool {
        self.applied() < self.records.len()
    }

    fn fresh_group(&mut self) -> u64 {
        let id = self.next_group;
        self.next_group += 1;
        id
    }

    /// Open an atomic group; returns the id records will carry.
    pub fn begin_group(&mut self) -> u64 {
        let id = match self.open_group {
            Some(id) => id,
            None => {
                let id = self.fresh_group();
                self.open_group = Some(id);
                id
            }
        };
        self.nesting += 1;
        trace!(target: "state.undo", group = id, nesting = self.nesting, "group_begin");
        id
    }

    pub fn end_group(&mut self) {
        debug_assert!(self.nesting > 0, "end_group without begin_group");
        self.nesting = self.nesting.saturating_sub(1);
        trace!(target: "state.undo", group = ?self.open_group, nesting = self.nesting, "group_end");
        if self.nesting == 0 {
            self.open_group = None;
        }
    }

    /// Make room for one record ahead of an edit, so that recording the
    /// edit once it succeeded cannot fail. The log's contents, redo tail
    /// included, are left alone.
    pub fn reserve(&mut self) -> TextResult<()> {
        self.records
            .try_reserve(1)
            .map_err(|_| TextError::OutOfMemory {
                requested: std::mem::size_of::<UndoRecord>(),
            })
    }

    /// Append a record for an applied edit, dropping any undone records
    /// first. This invalidates redo.
    pub fn record(
        &mut self,
        kind: UndoKind,
        before: FileStatus,
        after: FileStatus,
        region: UndoRegion,
        payload: Option<Block>,
    ) -> TextResult<()> {
        self.reserve()?;
        let applied = self.applied();
        if applied < self.records.len() {
            trace!(
                target: "state.undo",
                dropped = self.records.len() - applied,
                "redo_tail_truncated"
            );
            self.records.truncate(applied);
        }
        let group = match self.open_group {
            Some(id) => id,
            None => self.fresh_group(),
        };
        self.records.push(UndoRecord {
            kind,
            before,
            after,
            payload,
            region,
            nesting_level: self.nesting,
            group,
            undone: false,
        });
        trace!(
            target: "state.undo",
            kind = ?kind,
            group,
            nesting = self.nesting,
            depth = self.records.len(),
            "record"
        );
        Ok(())
    }

    /// Index range of the newest group that can be undone.
    pub fn undo_range(&self) -> Option<Range<usize>> {
        let end = self.applied();
        let group = self.records[..end].last()?.group;
        let start = self.records[..end]
            .iter()
            .rposition(|r| r.group != group)
            .map_or(0, |i| i + 1);
        Some(start..end)
    }

    /// Index range of the oldest undone group.
    pub fn redo_range(&self) -> Option<Range<usize>> {
        let start = self.applied();
        let group = self.records.get(start)?.group;
        let end = self.records[start..]
            .iter()
            .position(|r| r.group != group)
            .map_or(self.records.len(), |i| start + i);
        Some(start..end)
    }

    pub fn set_undone(&mut self, idx: usize, undone: bool) {
        if let Some(rec) = self.records.get_mut(idx) {
            rec.undone = undone;
        }
    }

    /// Forget all history.
    pub fn clear(&mut self) {
        self.records.clear();
        trace!(target: "state.undo", "cleared");
    }
}
