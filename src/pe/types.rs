//! Core PE data types and structures.

use std::ops::Range;

use thiserror::Error;

// PE constants
pub const DOS_SIGNATURE: u16 = 0x5A4D; // MZ
pub const PE_SIGNATURE: [u8; 4] = *b"PE\0\0";
pub const PE32_MAGIC: u16 = 0x10B;
pub const PE32PLUS_MAGIC: u16 = 0x20B;

/// Offset of `e_lfanew` within the DOS header.
pub const DOS_LFANEW_OFFSET: usize = 60;
/// Minimum DOS header length.
pub const DOS_HEADER_SIZE: usize = 64;
/// COFF file header length.
pub const COFF_HEADER_SIZE: usize = 20;
/// Section table entry length.
pub const SECTION_HEADER_SIZE: usize = 40;

// Data directory indices
pub const IMAGE_DIRECTORY_ENTRY_RESOURCE: usize = 2;
/// Maximum number of data directory entries.
pub const MAX_DATA_DIRECTORIES: usize = 16;

/// Resource type ID of the version-information resource.
pub const RT_VERSION: u32 = 16;

// DLL characteristics
pub const IMAGE_DLLCHARACTERISTICS_HIGH_ENTROPY_VA: u16 = 0x0020;
pub const IMAGE_DLLCHARACTERISTICS_DYNAMIC_BASE: u16 = 0x0040;
pub const IMAGE_DLLCHARACTERISTICS_NX_COMPAT: u16 = 0x0100;
pub const IMAGE_DLLCHARACTERISTICS_GUARD_CF: u16 = 0x4000;

// Section characteristics
pub const IMAGE_SCN_CNT_CODE: u32 = 0x00000020;
pub const IMAGE_SCN_MEM_EXECUTE: u32 = 0x20000000;
pub const IMAGE_SCN_MEM_READ: u32 = 0x40000000;
pub const IMAGE_SCN_MEM_WRITE: u32 = 0x80000000;

/// PE structural parsing errors.
///
/// These cover the mandatory header contract only. Resource and version
/// structures are decoded best-effort and never produce errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PeError {
    #[error("invalid DOS signature")]
    InvalidDosSignature,

    #[error("invalid PE signature")]
    InvalidPeSignature,

    #[error("invalid optional header magic: {0:#06x}")]
    InvalidMagic(u16),

    #[error("truncated header: expected {expected} bytes, got {actual}")]
    TruncatedHeader { expected: usize, actual: usize },
}

pub type Result<T> = std::result::Result<T, PeError>;

/// DOS header, reduced to the fields the PE chain depends on.
#[derive(Debug, Clone, Copy)]
pub struct DosHeader {
    pub e_magic: u16,
    /// File offset of the PE signature.
    pub e_lfanew: u32,
}

/// COFF file header (20 bytes after the PE signature).
#[derive(Debug, Clone, Copy)]
pub struct CoffHeader {
    pub machine: u16,
    pub number_of_sections: u16,
    pub time_date_stamp: u32,
    pub size_of_optional_header: u16,
    pub characteristics: u16,
}

/// Data directory entry.
#[derive(Debug, Clone, Copy, Default)]
pub struct DataDirectory {
    pub virtual_address: u32,
    pub size: u32,
}

impl DataDirectory {
    pub fn is_present(&self) -> bool {
        self.virtual_address != 0 && self.size != 0
    }
}

/// 32-bit optional header (magic 0x10B).
#[derive(Debug, Clone, Copy)]
pub struct OptionalHeader32 {
    pub magic: u16,
    pub address_of_entry_point: u32,
    pub image_base: u32,
    pub major_operating_system_version: u16,
    pub minor_operating_system_version: u16,
    pub major_subsystem_version: u16,
    pub minor_subsystem_version: u16,
    pub subsystem: u16,
    pub dll_characteristics: u16,
    pub number_of_rva_and_sizes: u32,
}

/// 64-bit optional header (magic 0x20B). Image base widens to 64 bits and
/// later fields shift accordingly.
#[derive(Debug, Clone, Copy)]
pub struct OptionalHeader64 {
    pub magic: u16,
    pub address_of_entry_point: u32,
    pub image_base: u64,
    pub major_operating_system_version: u16,
    pub minor_operating_system_version: u16,
    pub major_subsystem_version: u16,
    pub minor_subsystem_version: u16,
    pub subsystem: u16,
    pub dll_characteristics: u16,
    pub number_of_rva_and_sizes: u32,
}

/// Tagged optional header, selected by the leading magic value.
#[derive(Debug, Clone, Copy)]
pub enum OptionalHeader {
    Pe32(OptionalHeader32),
    Pe32Plus(OptionalHeader64),
}

impl OptionalHeader {
    pub fn magic(&self) -> u16 {
        match self {
            Self::Pe32(h) => h.magic,
            Self::Pe32Plus(h) => h.magic,
        }
    }

    pub fn entry_point(&self) -> u32 {
        match self {
            Self::Pe32(h) => h.address_of_entry_point,
            Self::Pe32Plus(h) => h.address_of_entry_point,
        }
    }

    pub fn image_base(&self) -> u64 {
        match self {
            Self::Pe32(h) => h.image_base as u64,
            Self::Pe32Plus(h) => h.image_base,
        }
    }

    pub fn major_operating_system_version(&self) -> u16 {
        match self {
            Self::Pe32(h) => h.major_operating_system_version,
            Self::Pe32Plus(h) => h.major_operating_system_version,
        }
    }

    pub fn major_subsystem_version(&self) -> u16 {
        match self {
            Self::Pe32(h) => h.major_subsystem_version,
            Self::Pe32Plus(h) => h.major_subsystem_version,
        }
    }

    pub fn subsystem(&self) -> u16 {
        match self {
            Self::Pe32(h) => h.subsystem,
            Self::Pe32Plus(h) => h.subsystem,
        }
    }

    pub fn dll_characteristics(&self) -> u16 {
        match self {
            Self::Pe32(h) => h.dll_characteristics,
            Self::Pe32Plus(h) => h.dll_characteristics,
        }
    }

    pub fn number_of_rva_and_sizes(&self) -> u32 {
        match self {
            Self::Pe32(h) => h.number_of_rva_and_sizes,
            Self::Pe32Plus(h) => h.number_of_rva_and_sizes,
        }
    }

    pub fn is_64bit(&self) -> bool {
        matches!(self, Self::Pe32Plus(_))
    }

    pub fn has_aslr(&self) -> bool {
        (self.dll_characteristics() & IMAGE_DLLCHARACTERISTICS_DYNAMIC_BASE) != 0
    }

    pub fn has_nx(&self) -> bool {
        (self.dll_characteristics() & IMAGE_DLLCHARACTERISTICS_NX_COMPAT) != 0
    }
}

/// Section header entry from the section table.
#[derive(Debug, Clone, Copy)]
pub struct SectionHeader {
    pub name: [u8; 8],
    pub virtual_size: u32,
    pub virtual_address: u32,
    pub size_of_raw_data: u32,
    pub pointer_to_raw_data: u32,
    pub characteristics: u32,
}

impl SectionHeader {
    pub fn name(&self) -> String {
        let end = self.name.iter().position(|&b| b == 0).unwrap_or(8);
        String::from_utf8_lossy(&self.name[..end]).to_string()
    }

    pub fn contains_rva(&self, rva: u32) -> bool {
        let size = self.virtual_size.max(self.size_of_raw_data);
        rva >= self.virtual_address && (rva - self.virtual_address) < size
    }

    pub fn is_executable(&self) -> bool {
        (self.characteristics & IMAGE_SCN_MEM_EXECUTE) != 0
    }

    pub fn is_writable(&self) -> bool {
        (self.characteristics & IMAGE_SCN_MEM_WRITE) != 0
    }
}

/// Section with its raw byte range within the file buffer.
///
/// The range is empty when the header's raw pointers fall outside the
/// buffer; no section read ever goes out of bounds.
#[derive(Debug, Clone)]
pub struct Section {
    pub header: SectionHeader,
    pub data: Range<usize>,
}
