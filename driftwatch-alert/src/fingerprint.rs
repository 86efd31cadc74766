//! Alert fingerprints.

use driftwatch_core::types::{AlertKind, DriftKind};
use xxhash_rust::xxh3::xxh3_64;

/// Stable dedup key over (kind, file, spec, drift kind).
///
/// The pipe separator keeps distinct component splits from colliding;
/// none of the components may contain one that matters since the hash
/// only has to be stable, not reversible.
pub fn fingerprint(
    kind: AlertKind,
    file: &str,
    spec_ref: &str,
    drift_kind: Option<DriftKind>,
) -> String {
    let drift = drift_kind.map(|k| k.as_str()).unwrap_or("-");
    let material = format!("{}|{}|{}|{}", kind.as_str(), file, spec_ref, drift);
    format!("{:016x}", xxh3_64(material.as_bytes()))
}
