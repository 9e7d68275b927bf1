//! Bounded file reading.
//!
//! The extractor reads each input exactly once into an immutable buffer
//! and parses with random access; there is no streaming. A size cap
//! rejects oversized inputs before any parsing work happens.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use tracing::{debug, warn};

/// Resource limits for reading input files.
#[derive(Debug, Clone)]
pub struct IoLimits {
    /// Maximum input file size in bytes.
    pub max_file_size: u64,
}

impl Default for IoLimits {
    fn default() -> Self {
        Self {
            max_file_size: 100 * 1024 * 1024, // 100MB
        }
    }
}

/// Read an entire file into memory, enforcing the size cap up front.
pub fn read_file<P: AsRef<Path>>(path: P, limits: &IoLimits) -> io::Result<Vec<u8>> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let size = file.metadata()?.len();

    debug!(path = %path.display(), size_bytes = size, "reading input file");

    if size > limits.max_file_size {
        warn!(
            path = %path.display(),
            size_bytes = size,
            limit = limits.max_file_size,
            "input exceeds size cap"
        );
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "file too large: {} bytes (limit: {})",
                size, limits.max_file_size
            ),
        ));
    }

    let mut data = Vec::with_capacity(size as usize);
    file.take(limits.max_file_size).read_to_end(&mut data)?;
    Ok(data)
}
