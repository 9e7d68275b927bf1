//! Bounded traversal of the PE resource directory.
//!
//! The resource directory is a recursive tree controlled entirely by the
//! input file, so the walk runs on an explicit work stack with a depth
//! bound and a visited-offset set. Malformed or self-referencing trees
//! stop descending the affected branch; they never fail the walk.

use std::collections::HashSet;

use tracing::debug;

use crate::pe::types::*;
use crate::pe::utils::ReadExt;

/// Maximum directory nesting the walker will follow.
pub const MAX_RESOURCE_DEPTH: usize = 32;

/// Maximum entries honored per directory node.
const MAX_DIR_ENTRIES: usize = 4096;

const SUBDIR_BIT: u32 = 0x8000_0000;

/// A leaf data entry of the resource tree.
///
/// `type_id` is the numeric ID of the level-0 (resource type) ancestor, or
/// `None` when the type was named rather than numbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceData {
    pub type_id: Option<u32>,
    pub rva: u32,
    pub size: u32,
}

/// Walk the resource tree rooted at `rsrc` (the buffer starting at the
/// resource directory's file offset) and collect every reachable leaf.
///
/// All offsets inside the tree are relative to the start of `rsrc`.
/// Every per-entry decode failure is skipped silently.
pub fn parse_resource_tree(rsrc: &[u8]) -> Vec<ResourceData> {
    let mut leaves = Vec::new();
    let mut visited: HashSet<u32> = HashSet::new();
    let mut stack: Vec<(usize, Option<u32>, u32)> = vec![(0, None, 0)];

    while let Some((depth, type_id, dir_offset)) = stack.pop() {
        if depth >= MAX_RESOURCE_DEPTH {
            debug!(depth, "resource directory depth bound reached");
            continue;
        }
        if !visited.insert(dir_offset) {
            debug!(offset = dir_offset, "resource directory cycle detected");
            continue;
        }

        let dir = dir_offset as usize;
        let (Some(named), Some(ids)) = (
            rsrc.read_u16_le_at(dir + 12),
            rsrc.read_u16_le_at(dir + 14),
        ) else {
            continue;
        };
        let count = (named as usize + ids as usize).min(MAX_DIR_ENTRIES);

        for i in 0..count {
            let entry = dir + 16 + i * 8;
            let (Some(name_or_id), Some(offset)) = (
                rsrc.read_u32_le_at(entry),
                rsrc.read_u32_le_at(entry + 4),
            ) else {
                break;
            };

            // Level 0 entries carry the resource type; numeric IDs only.
            let entry_type = if depth == 0 {
                (name_or_id & SUBDIR_BIT == 0).then_some(name_or_id)
            } else {
                type_id
            };

            if offset & SUBDIR_BIT != 0 {
                stack.push((depth + 1, entry_type, offset & !SUBDIR_BIT));
            } else if let (Some(rva), Some(size)) = (
                rsrc.read_u32_le_at(offset as usize),
                rsrc.read_u32_le_at(offset as usize + 4),
            ) {
                leaves.push(ResourceData {
                    type_id: entry_type,
                    rva,
                    size,
                });
            }
        }
    }

    leaves
}
