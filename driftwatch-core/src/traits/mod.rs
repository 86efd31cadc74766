//! Capability traits at the seams to external collaborators.

pub mod cancellation;
pub mod channel;
pub mod enricher;
pub mod resources;
pub mod source;

pub use cancellation::{Cancellable, CancellationToken};
pub use channel::ChannelHandler;
pub use enricher::SuggestionEnricher;
pub use resources::{NullProbe, ResourceProbe, ResourceSample};
pub use source::{SignatureExtractor, SpecificationSource};
