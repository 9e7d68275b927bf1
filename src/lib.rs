//! Structural PE feature extraction for malware classification.
//!
//! Given bytes claiming to be a Windows PE file, this crate either produces
//! a fixed-shape map of 13 numeric features or fails with a typed error.
//! The mandatory header chain (DOS stub, COFF header, optional header,
//! section table) must be well formed; decorative structures (resource
//! directory, version information) degrade to default feature values when
//! missing or corrupt instead of failing the extraction.
//!
//! The classification model itself is out of scope: callers feed the
//! resulting [`features::FeatureMap`] through [`features::vectorize`] into
//! any [`classifier::Classifier`] implementation.

pub mod classifier;
pub mod entropy;
pub mod error;
pub mod features;
pub mod io;
pub mod logging;
pub mod pe;

pub use classifier::{scan, Classifier, Label, ScanResult};
pub use error::{ExtractionError, Result};
pub use features::{extract_bytes, extract_file, vectorize, FeatureMap, FEATURE_NAMES};
