//! Public storyboard resolution.
//!
//! Turns the flat, unordered block collection of a form into the ordered
//! set of blocks a public viewer is allowed to see. Groups without children
//! are hidden, disabled blocks are hidden, and children whose group did not
//! survive are hidden with it.
//!
//! Groups are assumed to nest one level deep: a child is never itself the
//! parent of another block. The filter is therefore a fixed three-pass
//! pipeline rather than a fixed-point iteration.

use std::collections::HashSet;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Block type constants
// ---------------------------------------------------------------------------

/// Block type tag for groups. Children reference a group via `parent_block`.
pub const BLOCK_TYPE_GROUP: &str = "group";

// ---------------------------------------------------------------------------
// Block abstraction
// ---------------------------------------------------------------------------

/// The view of a block the resolver needs.
///
/// Implemented by the database row type so the resolver can run over rows
/// loaded by the caller without copying them into an intermediate struct.
pub trait StoryboardBlock {
    /// Identity of the block, unique within its form.
    fn block_uuid(&self) -> &str;

    /// Identity of the group this block belongs to, if any.
    fn parent_block(&self) -> Option<&str>;

    /// Raw type tag of the block.
    fn block_type(&self) -> &str;

    fn is_disabled(&self) -> bool;

    /// Stored ordering position.
    fn position(&self) -> i32;

    fn is_group(&self) -> bool {
        self.block_type() == BLOCK_TYPE_GROUP
    }
}

/// Visible blocks of a form in display order.
#[derive(Debug, Clone, Serialize)]
pub struct Storyboard<B> {
    pub count: usize,
    pub blocks: Vec<B>,
}

impl<B> Storyboard<B> {
    /// Map every block into a presentation type, keeping count and order.
    pub fn map<T>(self, f: impl FnMut(B) -> T) -> Storyboard<T> {
        Storyboard {
            count: self.count,
            blocks: self.blocks.into_iter().map(f).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Resolve the public storyboard for a form's blocks.
///
/// 1. A group survives only if some other block names it as parent.
/// 2. Disabled blocks are dropped.
/// 3. A block with a parent survives only if that parent survived 1 and 2.
///    A parent that never existed counts as filtered out.
///
/// The surviving blocks are sorted by position; ties keep input order.
pub fn resolve<B: StoryboardBlock + Clone>(blocks: &[B]) -> Storyboard<B> {
    let referenced_parents: HashSet<&str> = blocks
        .iter()
        .filter_map(|b| b.parent_block().filter(|p| *p != b.block_uuid()))
        .collect();

    // Passes 1 and 2.
    let candidates: Vec<&B> = blocks
        .iter()
        .filter(|b| !b.is_group() || referenced_parents.contains(b.block_uuid()))
        .filter(|b| !b.is_disabled())
        .collect();

    // Pass 3 consults the filtered collection, not the original one.
    let surviving_ids: HashSet<&str> = candidates.iter().map(|b| b.block_uuid()).collect();

    let mut visible: Vec<B> = candidates
        .into_iter()
        .filter(|b| match b.parent_block() {
            Some(parent) => surviving_ids.contains(parent),
            None => true,
        })
        .cloned()
        .collect();

    visible.sort_by_key(|b| b.position());

    Storyboard {
        count: visible.len(),
        blocks: visible,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
