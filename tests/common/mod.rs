//! Shared synthetic PE builders for the integration tests.
//!
//! Every builder produces a complete, self-consistent image so the tests
//! can assert exact feature values. Offsets follow one fixed layout:
//! e_lfanew 0x80, COFF at 0x84, optional header at 0x98, section headers
//! right after the optional header, raw section data from 0x400 up.

#![allow(dead_code)]

pub fn put_u16(buf: &mut [u8], offset: usize, value: u16) {
    buf[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
}

pub fn put_u32(buf: &mut [u8], offset: usize, value: u32) {
    buf[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

pub fn put_u64(buf: &mut [u8], offset: usize, value: u64) {
    buf[offset..offset + 8].copy_from_slice(&value.to_le_bytes());
}

fn put_section(
    buf: &mut [u8],
    offset: usize,
    name: &[u8],
    virtual_address: u32,
    raw_size: u32,
    raw_pointer: u32,
    characteristics: u32,
) {
    buf[offset..offset + name.len()].copy_from_slice(name);
    put_u32(buf, offset + 8, 0x1000); // virtual size
    put_u32(buf, offset + 12, virtual_address);
    put_u32(buf, offset + 16, raw_size);
    put_u32(buf, offset + 20, raw_pointer);
    put_u32(buf, offset + 36, characteristics);
}

/// Byte pattern cycling uniformly through all 256 values.
fn fill_uniform(buf: &mut [u8], range: std::ops::Range<usize>) {
    for (i, b) in buf[range].iter_mut().enumerate() {
        *b = ((i * 7 + 13) & 0xFF) as u8;
    }
}

/// First half zero, second half 0xFF. Entropy exactly 1.0.
fn fill_bimodal(buf: &mut [u8], range: std::ops::Range<usize>) {
    let mid = range.start + (range.end - range.start) / 2;
    for b in buf[mid..range.end].iter_mut() {
        *b = 0xFF;
    }
}

/// DOS header, PE signature, COFF header shared by all PE32 builders.
fn pe32_skeleton(file_size: usize, section_count: u16) -> Vec<u8> {
    let mut data = vec![0u8; file_size];

    data[0] = b'M';
    data[1] = b'Z';
    put_u32(&mut data, 60, 0x80);
    data[0x80..0x84].copy_from_slice(b"PE\0\0");

    put_u16(&mut data, 0x84, 0x014C); // machine: x86
    put_u16(&mut data, 0x86, section_count);
    put_u32(&mut data, 0x88, 0x5F00_0000); // timestamp
    put_u16(&mut data, 0x94, 0xE0); // optional header: 96 + 16 directories
    put_u16(&mut data, 0x96, 0x0102); // EXECUTABLE_IMAGE | 32BIT_MACHINE

    // Optional header, PE32.
    put_u16(&mut data, 0x98, 0x010B);
    put_u32(&mut data, 0x98 + 16, 0x1000); // entry point
    put_u32(&mut data, 0x98 + 28, 0x0040_0000); // image base
    put_u16(&mut data, 0x98 + 40, 4); // major OS version
    put_u16(&mut data, 0x98 + 48, 4); // major subsystem version
    put_u16(&mut data, 0x98 + 68, 3); // console subsystem
    put_u16(&mut data, 0x98 + 70, 0x8140); // dynamic base | NX | TS aware
    put_u32(&mut data, 0x98 + 92, 16); // directory count

    data
}

/// PE32 with a uniform-content `.text` and a bimodal `.data` section and
/// no resource directory.
///
/// Expected features: Machine 332, SizeOfOptionalHeader 224,
/// Characteristics 258, ImageBase 4194304, major versions 4/4,
/// Subsystem 3, DllCharacteristics 33088, section entropy bounds
/// exactly (1.0, 8.0), resource features 0.0.
pub fn minimal_pe32() -> Vec<u8> {
    let mut data = pe32_skeleton(0x800, 2);

    // Section headers at optional header end (0x98 + 0xE0).
    put_section(&mut data, 0x178, b".text", 0x1000, 0x200, 0x400, 0x6000_0020);
    put_section(&mut data, 0x1A0, b".data", 0x2000, 0x200, 0x600, 0xC000_0040);

    fill_uniform(&mut data, 0x400..0x600);
    fill_bimodal(&mut data, 0x600..0x800);
    data
}

/// Serialize one VS_VERSIONINFO block.
fn version_block(key: &str, value: Option<&str>, children: &[Vec<u8>]) -> Vec<u8> {
    let mut body = vec![0u8; 6];
    for unit in key.encode_utf16() {
        body.extend_from_slice(&unit.to_le_bytes());
    }
    body.extend_from_slice(&0u16.to_le_bytes());
    while body.len() % 4 != 0 {
        body.push(0);
    }

    let value_words = match value {
        Some(v) => {
            let mut words = 0u16;
            for unit in v.encode_utf16() {
                body.extend_from_slice(&unit.to_le_bytes());
                words += 1;
            }
            body.extend_from_slice(&0u16.to_le_bytes());
            words + 1
        }
        None => 0,
    };
    while body.len() % 4 != 0 {
        body.push(0);
    }

    for child in children {
        body.extend_from_slice(child);
        while body.len() % 4 != 0 {
            body.push(0);
        }
    }

    let total = body.len() as u16;
    body[0..2].copy_from_slice(&total.to_le_bytes());
    body[2..4].copy_from_slice(&value_words.to_le_bytes());
    let w_type: u16 = if value.is_some() { 1 } else { 0 };
    body[4..6].copy_from_slice(&w_type.to_le_bytes());
    body
}

/// Version resource with `entries` String pairs in one string table.
pub fn version_info_payload(entries: usize) -> Vec<u8> {
    let strings: Vec<Vec<u8>> = (0..entries)
        .map(|i| version_block(&format!("Field{}", i), Some("synthetic"), &[]))
        .collect();
    let table = version_block("040904b0", None, &strings);
    let sfi = version_block("StringFileInfo", None, &[table]);
    version_block("VS_VERSION_INFO", None, &[sfi])
}

/// PE32 carrying a `.rsrc` section with two resource leaves: an
/// RT_VERSION payload holding `version_entries` String pairs, and an
/// RCDATA leaf of 256 uniformly distributed bytes (entropy exactly 8.0).
pub fn pe32_with_resources(version_entries: usize) -> Vec<u8> {
    let mut data = pe32_skeleton(0xC00, 3);

    put_section(&mut data, 0x178, b".text", 0x1000, 0x200, 0x400, 0x6000_0020);
    put_section(&mut data, 0x1A0, b".data", 0x2000, 0x200, 0x600, 0xC000_0040);
    put_section(&mut data, 0x1C8, b".rsrc", 0x3000, 0x400, 0x800, 0x4000_0040);

    fill_uniform(&mut data, 0x400..0x600);
    fill_bimodal(&mut data, 0x600..0x800);

    // Resource data directory (index 2).
    put_u32(&mut data, 0x108, 0x3000);
    put_u32(&mut data, 0x10C, 0x400);

    // Resource tree, offsets relative to the section start at 0x800.
    const SUBDIR: u32 = 0x8000_0000;
    let r = 0x800;
    put_u16(&mut data, r + 14, 2); // root: two ID entries
    put_u32(&mut data, r + 0x10, 16); // RT_VERSION
    put_u32(&mut data, r + 0x14, SUBDIR | 0x30);
    put_u32(&mut data, r + 0x18, 10); // RT_RCDATA
    put_u32(&mut data, r + 0x1C, SUBDIR | 0x48);

    put_u16(&mut data, r + 0x30 + 14, 1); // version: name level
    put_u32(&mut data, r + 0x40, 1);
    put_u32(&mut data, r + 0x44, SUBDIR | 0x60);
    put_u16(&mut data, r + 0x48 + 14, 1); // rcdata: name level
    put_u32(&mut data, r + 0x58, 1);
    put_u32(&mut data, r + 0x5C, SUBDIR | 0x78);

    put_u16(&mut data, r + 0x60 + 14, 1); // version: language level
    put_u32(&mut data, r + 0x70, 0x409);
    put_u32(&mut data, r + 0x74, 0x90);
    put_u16(&mut data, r + 0x78 + 14, 1); // rcdata: language level
    put_u32(&mut data, r + 0x88, 0x409);
    put_u32(&mut data, r + 0x8C, 0xA0);

    let vi = version_info_payload(version_entries);
    assert!(vi.len() <= 0x250, "version payload must fit the layout");
    put_u32(&mut data, r + 0x90, 0x30B0); // version leaf rva
    put_u32(&mut data, r + 0x94, vi.len() as u32);
    put_u32(&mut data, r + 0xA0, 0x3300); // rcdata leaf rva
    put_u32(&mut data, r + 0xA4, 256);

    data[r + 0xB0..r + 0xB0 + vi.len()].copy_from_slice(&vi);
    for i in 0..256usize {
        data[r + 0x300 + i] = i as u8;
    }
    data
}

/// Same shell as [`pe32_with_resources`] but the resource root points
/// back at itself, so the tree has a cycle and no reachable leaves.
pub fn pe32_with_cyclic_resources() -> Vec<u8> {
    let mut data = pe32_skeleton(0xC00, 3);

    put_section(&mut data, 0x178, b".text", 0x1000, 0x200, 0x400, 0x6000_0020);
    put_section(&mut data, 0x1A0, b".data", 0x2000, 0x200, 0x600, 0xC000_0040);
    put_section(&mut data, 0x1C8, b".rsrc", 0x3000, 0x400, 0x800, 0x4000_0040);

    fill_uniform(&mut data, 0x400..0x600);
    fill_bimodal(&mut data, 0x600..0x800);

    put_u32(&mut data, 0x108, 0x3000);
    put_u32(&mut data, 0x10C, 0x400);

    let r = 0x800;
    put_u16(&mut data, r + 14, 1);
    put_u32(&mut data, r + 0x10, 16);
    put_u32(&mut data, r + 0x14, 0x8000_0000); // subdir offset 0: the root
    data
}

/// PE32+ image with one section and a GUI subsystem.
///
/// Expected features: Machine 34404, SizeOfOptionalHeader 240,
/// ImageBase 5368709120, major versions 10/6, Subsystem 2,
/// DllCharacteristics 33120.
pub fn minimal_pe64() -> Vec<u8> {
    let mut data = vec![0u8; 0x600];

    data[0] = b'M';
    data[1] = b'Z';
    put_u32(&mut data, 60, 0x80);
    data[0x80..0x84].copy_from_slice(b"PE\0\0");

    put_u16(&mut data, 0x84, 0x8664); // machine: x86-64
    put_u16(&mut data, 0x86, 1);
    put_u16(&mut data, 0x94, 0xF0); // optional header: 112 + 16 directories
    put_u16(&mut data, 0x96, 0x0022); // EXECUTABLE_IMAGE | LARGE_ADDRESS_AWARE

    put_u16(&mut data, 0x98, 0x020B);
    put_u32(&mut data, 0x98 + 16, 0x1000);
    put_u64(&mut data, 0x98 + 24, 0x1_4000_0000);
    put_u16(&mut data, 0x98 + 40, 10);
    put_u16(&mut data, 0x98 + 48, 6);
    put_u16(&mut data, 0x98 + 68, 2); // GUI subsystem
    put_u16(&mut data, 0x98 + 70, 0x8160);
    put_u32(&mut data, 0x98 + 108, 16);

    // Section header at 0x98 + 0xF0.
    put_section(&mut data, 0x188, b".text", 0x1000, 0x200, 0x400, 0x6000_0020);
    fill_uniform(&mut data, 0x400..0x600);
    data
}
