//! Line storage primitives for the block-editing engine.
//!
//! Text lives in immutable, reference-counted arena blocks ([`ArenaBlock`]).
//! A [`Line`] is a span inside one of them and a [`LineIndex`] is the ordered
//! line array of a file. A [`Block`] is a standalone run of lines used as a
//! clipboard payload, an undo payload, or an insertion source.
//!
//! Everything here is byte oriented: positions are byte offsets and columns
//! are computed by [`tabs`] with one column per byte except `\t`.

pub mod arena;
pub mod block;
pub mod eol;
pub mod error;
pub mod line;
pub mod tabs;

pub use arena::{Arena, ArenaBlock, ArenaBuf};
pub use block::{Block, BlockWriter, Duplicate, duplicate_block, generate_block, make_block};
pub use eol::EolType;
pub use error::{TextError, TextResult};
pub use line::{Line, LineAttr, LineIndex};
