//! Feature extraction and vectorization.
//!
//! One extraction call turns a PE file into a map with exactly 13 named
//! numeric features. Header fields are copied verbatim; entropy features
//! summarize section and resource contents; the version-information count
//! summarizes string tables. Only the mandatory header contract can fail
//! the call — every optional sub-feature independently degrades to its
//! documented default.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::{debug, info_span};

use crate::error::{ExtractionError, Result};
use crate::io::{read_file, IoLimits};
use crate::pe::PeFile;

/// Feature names in the order expected by the bundled model. The
/// vectorizer itself accepts any order.
pub const FEATURE_NAMES: [&str; 13] = [
    "Machine",
    "SizeOfOptionalHeader",
    "Characteristics",
    "ImageBase",
    "MajorOperatingSystemVersion",
    "MajorSubsystemVersion",
    "Subsystem",
    "DllCharacteristics",
    "SectionsMinEntropy",
    "SectionsMaxEntropy",
    "ResourcesMinEntropy",
    "ResourcesMaxEntropy",
    "VersionInformationSize",
];

/// Named numeric features for one input file. Always holds exactly the 13
/// [`FEATURE_NAMES`] keys after a successful extraction.
pub type FeatureMap = BTreeMap<String, f64>;

/// Min/max of a (possibly empty) entropy list; `(0.0, 0.0)` when empty.
fn entropy_bounds(entropies: &[f64]) -> (f64, f64) {
    if entropies.is_empty() {
        return (0.0, 0.0);
    }
    let mut lo = f64::MAX;
    let mut hi = f64::MIN;
    for &e in entropies {
        lo = lo.min(e);
        hi = hi.max(e);
    }
    (lo, hi)
}

/// Extract the 13-feature map from a file on disk.
///
/// Fails with [`ExtractionError::NotFound`] when the path does not resolve
/// to a readable file and [`ExtractionError::InvalidFormat`] when the
/// buffer violates the mandatory PE header contract.
pub fn extract_file<P: AsRef<Path>>(path: P) -> Result<FeatureMap> {
    let path = path.as_ref();
    let data = read_file(path, &IoLimits::default()).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ExtractionError::NotFound(path.to_path_buf())
        } else {
            ExtractionError::Io(e)
        }
    })?;

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    extract_bytes(&name, &data)
}

/// Extract the 13-feature map from an in-memory buffer.
///
/// `name` is the display name attached to [`ExtractionError::InvalidFormat`]
/// (for uploaded streams this is whatever the caller wants reported).
pub fn extract_bytes(name: &str, data: &[u8]) -> Result<FeatureMap> {
    let span = info_span!("extract", file = %name, size_bytes = data.len());
    let _guard = span.enter();

    let pe = PeFile::parse(data).map_err(|source| ExtractionError::InvalidFormat {
        name: name.to_string(),
        source,
    })?;

    let mut features = FeatureMap::new();

    // Header fields, verbatim.
    let coff = pe.coff_header();
    let opt = pe.optional_header();
    features.insert("Machine".into(), coff.machine as f64);
    features.insert(
        "SizeOfOptionalHeader".into(),
        coff.size_of_optional_header as f64,
    );
    features.insert("Characteristics".into(), coff.characteristics as f64);
    features.insert("ImageBase".into(), opt.image_base() as f64);
    features.insert(
        "MajorOperatingSystemVersion".into(),
        opt.major_operating_system_version() as f64,
    );
    features.insert(
        "MajorSubsystemVersion".into(),
        opt.major_subsystem_version() as f64,
    );
    features.insert("Subsystem".into(), opt.subsystem() as f64);
    features.insert(
        "DllCharacteristics".into(),
        opt.dll_characteristics() as f64,
    );

    // Section entropy bounds.
    let section_entropies = pe.section_entropies();
    if section_entropies.is_empty() {
        debug!("no sections; section entropy defaults to 0.0");
    }
    let (min, max) = entropy_bounds(&section_entropies);
    features.insert("SectionsMinEntropy".into(), min);
    features.insert("SectionsMaxEntropy".into(), max);

    // Resource entropy bounds (best-effort walk).
    let resource_entropies = pe.resource_entropies();
    if resource_entropies.is_empty() {
        debug!("no decodable resources; resource entropy defaults to 0.0");
    }
    let (min, max) = entropy_bounds(&resource_entropies);
    features.insert("ResourcesMinEntropy".into(), min);
    features.insert("ResourcesMaxEntropy".into(), max);

    // Version information string-table entry count (best-effort).
    features.insert(
        "VersionInformationSize".into(),
        pe.version_info_entry_count() as f64,
    );

    debug_assert_eq!(features.len(), FEATURE_NAMES.len());
    Ok(features)
}

/// Project a feature map into a numeric vector in the requested order.
///
/// Total function: names absent from the map contribute `0.0`; the output
/// length and order always match `ordered_names` exactly.
pub fn vectorize<S: AsRef<str>>(features: &FeatureMap, ordered_names: &[S]) -> Vec<f64> {
    ordered_names
        .iter()
        .map(|name| features.get(name.as_ref()).copied().unwrap_or(0.0))
        .collect()
}
