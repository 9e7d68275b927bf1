//! PE header chain decoding.
//!
//! DOS header, PE signature, COFF file header, optional header (PE32 and
//! PE32+ layouts) and data directories. Any truncation or bad signature in
//! this chain is fatal; nothing here is best-effort.

use crate::pe::types::*;
use crate::pe::utils::ReadExt;

/// Parse the DOS header: `MZ` signature and the PE header offset.
pub fn parse_dos_header(data: &[u8]) -> Result<DosHeader> {
    if data.len() < DOS_HEADER_SIZE {
        return Err(PeError::TruncatedHeader {
            expected: DOS_HEADER_SIZE,
            actual: data.len(),
        });
    }

    let e_magic = data.read_u16_le_at(0).ok_or(PeError::InvalidDosSignature)?;
    if e_magic != DOS_SIGNATURE {
        return Err(PeError::InvalidDosSignature);
    }

    let e_lfanew = data
        .read_u32_le_at(DOS_LFANEW_OFFSET)
        .ok_or(PeError::TruncatedHeader {
            expected: DOS_HEADER_SIZE,
            actual: data.len(),
        })?;

    Ok(DosHeader { e_magic, e_lfanew })
}

/// Parse the COFF file header at `offset`.
pub fn parse_coff_header(data: &[u8], offset: usize) -> Result<CoffHeader> {
    let truncated = || PeError::TruncatedHeader {
        expected: offset.saturating_add(COFF_HEADER_SIZE),
        actual: data.len(),
    };

    Ok(CoffHeader {
        machine: data.read_u16_le_at(offset).ok_or_else(truncated)?,
        number_of_sections: data.read_u16_le_at(offset + 2).ok_or_else(truncated)?,
        time_date_stamp: data.read_u32_le_at(offset + 4).ok_or_else(truncated)?,
        size_of_optional_header: data.read_u16_le_at(offset + 16).ok_or_else(truncated)?,
        characteristics: data.read_u16_le_at(offset + 18).ok_or_else(truncated)?,
    })
}

/// Parse the optional header at `offset`, branching on the magic value.
pub fn parse_optional_header(data: &[u8], offset: usize, size: u16) -> Result<OptionalHeader> {
    if size < 2 || offset.saturating_add(size as usize) > data.len() {
        return Err(PeError::TruncatedHeader {
            expected: offset.saturating_add(size as usize).max(offset + 2),
            actual: data.len(),
        });
    }

    let magic = data
        .read_u16_le_at(offset)
        .ok_or(PeError::TruncatedHeader {
            expected: offset + 2,
            actual: data.len(),
        })?;

    match magic {
        PE32_MAGIC => parse_optional_header32(data, offset, size),
        PE32PLUS_MAGIC => parse_optional_header64(data, offset, size),
        other => Err(PeError::InvalidMagic(other)),
    }
}

fn parse_optional_header32(data: &[u8], offset: usize, size: u16) -> Result<OptionalHeader> {
    // 96 bytes of fixed PE32 fields precede the data directories.
    if size < 96 {
        return Err(PeError::TruncatedHeader {
            expected: offset + 96,
            actual: offset + size as usize,
        });
    }
    let truncated = || PeError::TruncatedHeader {
        expected: offset + 96,
        actual: data.len(),
    };

    Ok(OptionalHeader::Pe32(OptionalHeader32 {
        magic: data.read_u16_le_at(offset).ok_or_else(truncated)?,
        address_of_entry_point: data.read_u32_le_at(offset + 16).ok_or_else(truncated)?,
        image_base: data.read_u32_le_at(offset + 28).ok_or_else(truncated)?,
        major_operating_system_version: data.read_u16_le_at(offset + 40).ok_or_else(truncated)?,
        minor_operating_system_version: data.read_u16_le_at(offset + 42).ok_or_else(truncated)?,
        major_subsystem_version: data.read_u16_le_at(offset + 48).ok_or_else(truncated)?,
        minor_subsystem_version: data.read_u16_le_at(offset + 50).ok_or_else(truncated)?,
        subsystem: data.read_u16_le_at(offset + 68).ok_or_else(truncated)?,
        dll_characteristics: data.read_u16_le_at(offset + 70).ok_or_else(truncated)?,
        number_of_rva_and_sizes: data.read_u32_le_at(offset + 92).ok_or_else(truncated)?,
    }))
}

fn parse_optional_header64(data: &[u8], offset: usize, size: u16) -> Result<OptionalHeader> {
    // 112 bytes of fixed PE32+ fields precede the data directories. The
    // image base widens to u64 at +24, shifting nothing before +72; the
    // version and subsystem fields keep their PE32 offsets.
    if size < 112 {
        return Err(PeError::TruncatedHeader {
            expected: offset + 112,
            actual: offset + size as usize,
        });
    }
    let truncated = || PeError::TruncatedHeader {
        expected: offset + 112,
        actual: data.len(),
    };

    Ok(OptionalHeader::Pe32Plus(OptionalHeader64 {
        magic: data.read_u16_le_at(offset).ok_or_else(truncated)?,
        address_of_entry_point: data.read_u32_le_at(offset + 16).ok_or_else(truncated)?,
        image_base: data.read_u64_le_at(offset + 24).ok_or_else(truncated)?,
        major_operating_system_version: data.read_u16_le_at(offset + 40).ok_or_else(truncated)?,
        minor_operating_system_version: data.read_u16_le_at(offset + 42).ok_or_else(truncated)?,
        major_subsystem_version: data.read_u16_le_at(offset + 48).ok_or_else(truncated)?,
        minor_subsystem_version: data.read_u16_le_at(offset + 50).ok_or_else(truncated)?,
        subsystem: data.read_u16_le_at(offset + 68).ok_or_else(truncated)?,
        dll_characteristics: data.read_u16_le_at(offset + 70).ok_or_else(truncated)?,
        number_of_rva_and_sizes: data.read_u32_le_at(offset + 108).ok_or_else(truncated)?,
    }))
}

/// Parse up to 16 data directory entries at `offset`. Entries past the end
/// of the buffer are dropped; the result is padded with empty entries so
/// fixed indices stay valid.
pub fn parse_data_directories(data: &[u8], offset: usize, count: u32) -> Vec<DataDirectory> {
    let count = (count as usize).min(MAX_DATA_DIRECTORIES);
    let mut directories = Vec::with_capacity(MAX_DATA_DIRECTORIES);

    for i in 0..count {
        let dir_offset = offset + i * 8;
        let (Some(virtual_address), Some(size)) = (
            data.read_u32_le_at(dir_offset),
            data.read_u32_le_at(dir_offset + 4),
        ) else {
            break;
        };
        directories.push(DataDirectory {
            virtual_address,
            size,
        });
    }

    while directories.len() < MAX_DATA_DIRECTORIES {
        directories.push(DataDirectory::default());
    }

    directories
}

/// Parse the NT headers (PE signature + COFF + optional) at `offset`.
pub fn parse_nt_headers(
    data: &[u8],
    offset: usize,
) -> Result<(CoffHeader, OptionalHeader, Vec<DataDirectory>)> {
    let signature = data
        .read_slice_at(offset, 4)
        .ok_or(PeError::TruncatedHeader {
            expected: offset.saturating_add(4),
            actual: data.len(),
        })?;
    if signature != PE_SIGNATURE {
        return Err(PeError::InvalidPeSignature);
    }

    let coff_header = parse_coff_header(data, offset + 4)?;

    let opt_offset = offset + 4 + COFF_HEADER_SIZE;
    let optional_header =
        parse_optional_header(data, opt_offset, coff_header.size_of_optional_header)?;

    // Data directories follow the fixed optional header fields.
    let dir_offset = opt_offset + if optional_header.is_64bit() { 112 } else { 96 };
    let directories =
        parse_data_directories(data, dir_offset, optional_header.number_of_rva_and_sizes());

    Ok((coff_header, optional_header, directories))
}
