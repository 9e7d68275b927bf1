//! PE structural parser.
//!
//! [`PeFile`] decodes the mandatory header chain eagerly and fails hard on
//! any violation; resource and version structures are decoded lazily and
//! best-effort on top of the validated section table.

use std::cell::OnceCell;
use std::ops::Range;

pub mod headers;
pub mod resources;
pub mod sections;
pub mod types;
pub mod utils;
pub mod version_info;

use headers::{parse_dos_header, parse_nt_headers};
use resources::{parse_resource_tree, ResourceData};
use sections::{create_sections, parse_section_headers, SectionTable};
pub use types::*;

/// A parsed PE image over a borrowed, immutable file buffer.
pub struct PeFile<'data> {
    data: &'data [u8],
    dos_header: DosHeader,
    coff_header: CoffHeader,
    optional_header: OptionalHeader,
    data_directories: Vec<DataDirectory>,
    section_table: SectionTable,

    resources: OnceCell<Vec<ResourceData>>,
}

impl<'data> PeFile<'data> {
    /// Validate and decode the mandatory header chain.
    pub fn parse(data: &'data [u8]) -> Result<Self> {
        let dos_header = parse_dos_header(data)?;

        let (coff_header, optional_header, data_directories) =
            parse_nt_headers(data, dos_header.e_lfanew as usize)?;

        let section_offset = dos_header.e_lfanew as usize
            + 4
            + COFF_HEADER_SIZE
            + coff_header.size_of_optional_header as usize;
        let section_headers =
            parse_section_headers(data, section_offset, coff_header.number_of_sections)?;

        let sections = create_sections(section_headers, data.len());
        let section_table = SectionTable::new(sections);

        Ok(Self {
            data,
            dos_header,
            coff_header,
            optional_header,
            data_directories,
            section_table,
            resources: OnceCell::new(),
        })
    }

    pub fn data(&self) -> &'data [u8] {
        self.data
    }

    pub fn dos_header(&self) -> &DosHeader {
        &self.dos_header
    }

    pub fn coff_header(&self) -> &CoffHeader {
        &self.coff_header
    }

    pub fn optional_header(&self) -> &OptionalHeader {
        &self.optional_header
    }

    pub fn machine(&self) -> u16 {
        self.coff_header.machine
    }

    pub fn is_64bit(&self) -> bool {
        self.optional_header.is_64bit()
    }

    pub fn entry_point(&self) -> u32 {
        self.optional_header.entry_point()
    }

    pub fn image_base(&self) -> u64 {
        self.optional_header.image_base()
    }

    pub fn sections(&self) -> &[Section] {
        self.section_table.sections()
    }

    /// Shannon entropy of each section's raw contents, in table order.
    pub fn section_entropies(&self) -> Vec<f64> {
        self.sections()
            .iter()
            .map(|s| s.entropy(self.data))
            .collect()
    }

    pub fn data_directory(&self, index: usize) -> Option<&DataDirectory> {
        self.data_directories.get(index)
    }

    pub fn has_resources(&self) -> bool {
        self.data_directory(IMAGE_DIRECTORY_ENTRY_RESOURCE)
            .map(|d| d.is_present())
            .unwrap_or(false)
    }

    /// Translate an RVA to a file offset.
    pub fn rva_to_offset(&self, rva: u32) -> Option<usize> {
        self.section_table.rva_to_offset(rva)
    }

    /// Translate an RVA + size to a byte range within the file buffer.
    pub fn resolve_rva(&self, rva: u32, size: u32) -> Option<Range<usize>> {
        self.section_table.resolve_rva(rva, size, self.data.len())
    }

    /// Leaf entries of the resource directory tree (lazy, best-effort).
    pub fn resources(&self) -> &[ResourceData] {
        self.resources.get_or_init(|| {
            let Some(dir) = self
                .data_directory(IMAGE_DIRECTORY_ENTRY_RESOURCE)
                .filter(|d| d.is_present())
            else {
                return Vec::new();
            };
            let Some(offset) = self.rva_to_offset(dir.virtual_address) else {
                return Vec::new();
            };
            parse_resource_tree(&self.data[offset.min(self.data.len())..])
        })
    }

    /// Raw bytes of one resource leaf, when its range resolves.
    pub fn resource_data(&self, resource: &ResourceData) -> Option<&'data [u8]> {
        let range = self.resolve_rva(resource.rva, resource.size)?;
        self.data.get(range)
    }

    /// Shannon entropy of every decodable resource leaf.
    pub fn resource_entropies(&self) -> Vec<f64> {
        self.resources()
            .iter()
            .filter_map(|r| self.resource_data(r))
            .map(crate::entropy::shannon_entropy)
            .collect()
    }

    /// Number of key/value pairs across the string tables of the version
    /// resource; 0 when absent or undecodable.
    pub fn version_info_entry_count(&self) -> usize {
        self.resources()
            .iter()
            .find(|r| r.type_id == Some(RT_VERSION))
            .and_then(|r| self.resource_data(r))
            .map(version_info::count_string_table_entries)
            .unwrap_or(0)
    }
}
