//! Specification and signature suppliers.
//!
//! Loading concrete spec formats and extracting code signatures are
//! external concerns; the core consumes their normalized outputs
//! through these two traits.

use std::path::Path;
use std::sync::Arc;

use crate::errors::{ScanError, SpecError};
use crate::types::{FileSignatures, Specification};

/// Supplies the loaded specification covering a path, if any.
///
/// `Ok(None)` means the path is simply unspecified, which is not an
/// error. `Err` means a specification should cover the path but could
/// not be loaded; the monitor surfaces that as an informational report,
/// never as an alert.
pub trait SpecificationSource: Send + Sync {
    fn spec_for(&self, path: &Path) -> Result<Option<Arc<Specification>>, SpecError>;
}

/// Extracts the normalized signature set for one file.
/// Invoked once per changed file per scan.
pub trait SignatureExtractor: Send + Sync {
    fn extract(&self, path: &Path) -> Result<FileSignatures, ScanError>;
}
