//! Shared data model for the monitoring core.

pub mod alert;
pub mod baseline;
pub mod change;
pub mod drift;
pub mod severity;
pub mod signatures;
pub mod spec;
pub mod suggestion;

pub use alert::{Alert, AlertEvent, AlertKind, DeliveryRecord};
pub use baseline::{BaselineSnapshot, PathBaseline};
pub use change::{ChangeEvent, ChangeKind};
pub use drift::{DriftItem, DriftKind, DriftReport};
pub use severity::{AlertSeverity, DriftSeverity};
pub use signatures::{FileSignatures, ObservedSignature};
pub use spec::{DeclaredDependency, ExpectedElement, Specification};
pub use suggestion::{Suggestion, SuggestionCategory};
