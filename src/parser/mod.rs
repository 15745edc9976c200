//! Decoders for subscription payloads: scheme links, Clash documents, and
//! the normalizer that routes raw text to them.

pub mod explodes;
pub mod subparser;
pub mod yaml;

pub use explodes::explode;
pub use subparser::{normalize, CandidateSink, ProfileCollector};
pub use yaml::clash::{parse_clash_yaml, ClashDocument};
