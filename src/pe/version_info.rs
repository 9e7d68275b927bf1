//! Version-information resource decoding.
//!
//! The VS_VERSIONINFO resource is a block-structured format: each block is
//! a u16 length, u16 value length, u16 type, a nul-terminated UTF-16LE
//! key, padding to a 4-byte boundary, an optional value, and child blocks
//! up to the declared length. We only count the `String` entries under
//! `StringFileInfo`/`StringTable` children; values are never retained.
//!
//! Decoding is strictly best-effort: any structural inconsistency yields
//! a count of 0 rather than an error.

use tracing::debug;

use crate::pe::utils::{align4, ReadExt};

const MAX_KEY_CHARS: usize = 64;

/// One decoded block header.
struct Block {
    /// Absolute offset of the block within the version buffer.
    start: usize,
    /// Declared total length, clamped to the buffer.
    len: usize,
    key: String,
    /// Absolute offset where child blocks begin (past the value).
    children: usize,
}

fn read_block(data: &[u8], offset: usize) -> Option<Block> {
    let w_length = data.read_u16_le_at(offset)? as usize;
    let w_value_length = data.read_u16_le_at(offset + 2)? as usize;
    let w_type = data.read_u16_le_at(offset + 4)?;
    if w_length < 6 {
        return None;
    }
    let end = offset.checked_add(w_length)?.min(data.len());

    // Nul-terminated UTF-16LE key.
    let mut key = String::new();
    let mut pos = offset + 6;
    loop {
        if pos + 2 > end {
            return None;
        }
        let unit = data.read_u16_le_at(pos)?;
        pos += 2;
        if unit == 0 {
            break;
        }
        if key.len() >= MAX_KEY_CHARS {
            return None;
        }
        key.push(char::from_u32(unit as u32).unwrap_or('\u{FFFD}'));
    }

    // Text values store their length in 16-bit words, binary in bytes.
    let value_bytes = if w_type == 1 {
        w_value_length * 2
    } else {
        w_value_length
    };
    let children = align4(align4(pos).saturating_add(value_bytes));

    Some(Block {
        start: offset,
        len: end - offset,
        key,
        children,
    })
}

/// Iterate the direct children of `block`.
fn children<'a>(data: &'a [u8], block: &Block) -> impl Iterator<Item = Block> + 'a {
    let end = block.start + block.len;
    let mut pos = block.children;
    std::iter::from_fn(move || {
        if pos >= end {
            return None;
        }
        let child = read_block(data, pos)?;
        if child.start + child.len > end {
            return None;
        }
        pos = align4(child.start + child.len);
        Some(child)
    })
}

/// Count the key/value pairs across all string tables of a version block.
///
/// `data` is the raw bytes of the RT_VERSION resource leaf. Returns 0 for
/// anything that does not decode as VS_VERSIONINFO.
pub fn count_string_table_entries(data: &[u8]) -> usize {
    let Some(root) = read_block(data, 0) else {
        return 0;
    };
    if root.key != "VS_VERSION_INFO" {
        debug!(key = %root.key, "unexpected version resource root key");
        return 0;
    }

    let mut count = 0;
    for file_info in children(data, &root) {
        if file_info.key != "StringFileInfo" {
            continue;
        }
        for table in children(data, &file_info) {
            count += children(data, &table).count();
        }
    }
    count
}
