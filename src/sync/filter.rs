//! Set filters over profile lists.
//!
//! Every filter keeps the order of `src`. Lists are small (a subscription
//! rarely carries more than a few hundred profiles), so pairwise comparison
//! is used instead of hashing.

use crate::models::Profile;

/// Elements of `src` whose identity does not appear in `dst`.
pub fn only_in_src_by_identity(src: &[Profile], dst: &[Profile]) -> Vec<Profile> {
    src.iter()
        .filter(|s| !dst.iter().any(|d| s.same_identity(d)))
        .cloned()
        .collect()
}

/// Elements of `src` with no content-equal counterpart in `dst`.
pub fn only_in_src(src: &[Profile], dst: &[Profile]) -> Vec<Profile> {
    src.iter()
        .filter(|s| !dst.iter().any(|d| s.content_eq(d)))
        .cloned()
        .collect()
}

/// Elements of `src` that have a content-equal counterpart in `dst`.
pub fn common(src: &[Profile], dst: &[Profile]) -> Vec<Profile> {
    src.iter()
        .filter(|s| dst.iter().any(|d| s.content_eq(d)))
        .cloned()
        .collect()
}
