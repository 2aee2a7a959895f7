//! Storage arena: reference-counted byte blocks holding line text.
//!
//! An [`ArenaBlock`] owns the bytes of many lines laid out back to back, each
//! followed by its terminator. Blocks are shared as `Rc<ArenaBlock>`; the only
//! strong references are held by [`crate::Line`]s, so a block's reference
//! count is exactly the number of lines pointing into it and the block is
//! freed the moment the last such line is dropped.
//!
//! Construction goes through [`ArenaBuf`]: [`Arena::allocate`] reserves the
//! exact byte size up front (refusing when the optional byte budget would be
//! exceeded or the allocator reports failure), the caller fills it, and
//! [`ArenaBuf::freeze`] turns it into a shareable block. Dropping an unfrozen
//! buffer disposes of it, which is how a failed build unwinds.
//!
//! Blocks are never mutated after freezing; edits build new blocks.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use tracing::{debug, trace};

use crate::error::{TextError, TextResult};

#[derive(Debug, Default)]
struct ArenaStats {
    live_blocks: Cell<usize>,
    live_bytes: Cell<usize>,
    next_id: Cell<u64>,
    limit: Option<usize>,
}

impl ArenaStats {
    fn release_bytes(&self, n: usize) {
        self.live_bytes.set(self.live_bytes.get().saturating_sub(n));
    }
}

/// Handle to the shared allocation accounting of one editor session.
///
/// Cloning the handle is cheap and every clone sees the same counters.
#[derive(Debug, Clone, Default)]
pub struct Arena {
    stats: Rc<ArenaStats>,
}

impl Arena {
    /// Unbounded arena; only a real allocator failure refuses a request.
    pub fn new() -> Self {
        Self::default()
    }

    /// Arena refusing any allocation that would push live bytes past `limit`.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            stats: Rc::new(ArenaStats {
                limit: Some(limit),
                ..ArenaStats::default()
            }),
        }
    }

    pub fn from_limit(limit: Option<usize>) -> Self {
        match limit {
            Some(l) => Self::with_limit(l),
            None => Self::new(),
        }
    }

    /// Number of frozen blocks still referenced by at least one line.
    pub fn live_blocks(&self) -> usize {
        self.stats.live_blocks.get()
    }

    /// Bytes reserved by live blocks and unfrozen buffers.
    pub fn live_bytes(&self) -> usize {
        self.stats.live_bytes.get()
    }

    pub fn limit(&self) -> Option<usize> {
        self.stats.limit
    }

    /// Reserve a buffer of exactly `size` bytes.
    pub fn allocate(&self, size: usize) -> TextResult<ArenaBuf> {
        let live = self.stats.live_bytes.get();
        if let Some(limit) = self.stats.limit
            && live.saturating_add(size) > limit
        {
            debug!(target: "text.arena", requested = size, live, limit, "arena_limit_refused");
            return Err(TextError::OutOfMemory { requested: size });
        }
        let mut bytes = Vec::new();
        if bytes.try_reserve_exact(size).is_err() {
            debug!(target: "text.arena", requested = size, "arena_alloc_failed");
            return Err(TextError::OutOfMemory { requested: size });
        }
        self.stats.live_bytes.set(live + size);
        trace!(target: "text.arena", size, live_bytes = live + size, "arena_allocate");
        Ok(ArenaBuf {
            bytes,
            size,
            stats: self.stats.clone(),
        })
    }

    /// Same accounting check as [`Arena::allocate`] without reserving anything.
    pub fn can_allocate(&self, size: usize) -> bool {
        match self.stats.limit {
            Some(limit) => self.stats.live_bytes.get().saturating_add(size) <= limit,
            None => true,
        }
    }
}

/// A buffer under construction. Dropping it releases its reservation.
#[derive(Debug)]
pub struct ArenaBuf {
    bytes: Vec<u8>,
    size: usize,
    stats: Rc<ArenaStats>,
}

impl ArenaBuf {
    /// Bytes written so far.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Reserved size.
    pub fn capacity(&self) -> usize {
        self.size
    }

    /// Append bytes; the caller sized the buffer so this never reallocates.
    pub fn push(&mut self, data: &[u8]) {
        debug_assert!(
            self.bytes.len() + data.len() <= self.size,
            "arena buffer overflow: {} + {} > {}",
            self.bytes.len(),
            data.len(),
            self.size
        );
        self.bytes.extend_from_slice(data);
    }

    pub fn push_byte(&mut self, b: u8) {
        debug_assert!(self.bytes.len() < self.size);
        self.bytes.push(b);
    }

    pub fn push_repeated(&mut self, b: u8, count: usize) {
        debug_assert!(self.bytes.len() + count <= self.size);
        self.bytes.resize(self.bytes.len() + count, b);
    }

    /// Finish construction and hand out the first strong reference.
    pub fn freeze(mut self) -> Rc<ArenaBlock> {
        let bytes = std::mem::take(&mut self.bytes);
        let reserved = std::mem::replace(&mut self.size, 0);
        let id = self.stats.next_id.get();
        self.stats.next_id.set(id + 1);
        self.stats.live_blocks.set(self.stats.live_blocks.get() + 1);
        trace!(
            target: "text.arena",
            id,
            reserved,
            used = bytes.len(),
            live_blocks = self.stats.live_blocks.get(),
            "arena_freeze"
        );
        Rc::new(ArenaBlock {
            bytes,
            reserved,
            id,
            stats: self.stats.clone(),
        })
    }
}

impl Drop for ArenaBuf {
    fn drop(&mut self) {
        if self.size > 0 {
            trace!(target: "text.arena", reserved = self.size, "arena_dispose");
            self.stats.release_bytes(self.size);
        }
    }
}

/// Immutable, shared storage for the text of many lines.
pub struct ArenaBlock {
    bytes: Vec<u8>,
    reserved: usize,
    id: u64,
    stats: Rc<ArenaStats>,
}

impl ArenaBlock {
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Reserved bytes never written.
    pub fn free_bytes(&self) -> usize {
        self.reserved - self.bytes.len()
    }

    /// Allocation sequence number, unique within one arena.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Number of lines currently referencing `this`.
    pub fn ref_count(this: &Rc<Self>) -> usize {
        Rc::strong_count(this)
    }
}

impl fmt::Debug for ArenaBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArenaBlock")
            .field("id", &self.id)
            .field("len", &self.bytes.len())
            .field("free", &self.free_bytes())
            .finish()
    }
}

impl Drop for ArenaBlock {
    fn drop(&mut self) {
        self.stats
            .live_blocks
            .set(self.stats.live_blocks.get().saturating_sub(1));
        self.stats.release_bytes(self.reserved);
        trace!(
            target: "text.arena",
            id = self.id,
            reserved = self.reserved,
            live_blocks = self.stats.live_blocks.get(),
            "arena_free"
        );
    }
}
