//! Section table parsing and RVA resolution.

use std::ops::Range;

use crate::entropy::shannon_entropy;
use crate::pe::types::*;
use crate::pe::utils::ReadExt;

/// Parse `count` section table entries at `offset`.
///
/// A section count the buffer cannot hold is an impossible header
/// combination and therefore fatal.
pub fn parse_section_headers(data: &[u8], offset: usize, count: u16) -> Result<Vec<SectionHeader>> {
    let mut sections = Vec::with_capacity(count as usize);

    for i in 0..count as usize {
        let entry = offset + i * SECTION_HEADER_SIZE;
        let truncated = || PeError::TruncatedHeader {
            expected: entry.saturating_add(SECTION_HEADER_SIZE),
            actual: data.len(),
        };

        let name_bytes = data
            .read_slice_at(entry, 8)
            .ok_or_else(truncated)?;
        let mut name = [0u8; 8];
        name.copy_from_slice(name_bytes);

        sections.push(SectionHeader {
            name,
            virtual_size: data.read_u32_le_at(entry + 8).ok_or_else(truncated)?,
            virtual_address: data.read_u32_le_at(entry + 12).ok_or_else(truncated)?,
            size_of_raw_data: data.read_u32_le_at(entry + 16).ok_or_else(truncated)?,
            pointer_to_raw_data: data.read_u32_le_at(entry + 20).ok_or_else(truncated)?,
            characteristics: data.read_u32_le_at(entry + 36).ok_or_else(truncated)?,
        });
    }

    Ok(sections)
}

/// Attach raw byte ranges to section headers. A raw range that would
/// exceed the buffer truncates to an empty section rather than reading out
/// of bounds.
pub fn create_sections(headers: Vec<SectionHeader>, file_len: usize) -> Vec<Section> {
    headers
        .into_iter()
        .map(|header| {
            let start = header.pointer_to_raw_data as usize;
            let end = start.saturating_add(header.size_of_raw_data as usize);
            let data = if end <= file_len { start..end } else { 0..0 };
            Section { header, data }
        })
        .collect()
}

/// Section table with RVA-to-file-offset translation.
#[derive(Debug, Clone)]
pub struct SectionTable {
    sections: Vec<Section>,
}

impl SectionTable {
    pub fn new(sections: Vec<Section>) -> Self {
        Self { sections }
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn section_by_name(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.header.name() == name)
    }

    /// Translate an RVA to a file offset through the containing section.
    pub fn rva_to_offset(&self, rva: u32) -> Option<usize> {
        let section = self
            .sections
            .iter()
            .find(|s| s.header.contains_rva(rva))?;
        let delta = rva - section.header.virtual_address;
        Some(section.header.pointer_to_raw_data as usize + delta as usize)
    }

    /// Translate an RVA + size to a byte range within a `data_len`-byte
    /// buffer. Returns `None` when the RVA falls outside every section or
    /// the computed range would leave the buffer.
    pub fn resolve_rva(&self, rva: u32, size: u32, data_len: usize) -> Option<Range<usize>> {
        let start = self.rva_to_offset(rva)?;
        let end = start.checked_add(size as usize)?;
        if end <= data_len {
            Some(start..end)
        } else {
            None
        }
    }
}

impl Section {
    /// Section contents within the file buffer.
    pub fn data<'a>(&self, file_data: &'a [u8]) -> &'a [u8] {
        file_data.get(self.data.clone()).unwrap_or(&[])
    }

    /// Shannon entropy of the section contents.
    pub fn entropy(&self, file_data: &[u8]) -> f64 {
        shannon_entropy(self.data(file_data))
    }
}
