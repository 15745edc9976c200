use log::debug;

use super::filter::{common, only_in_src, only_in_src_by_identity};
use crate::models::Profile;

/// Partitions computed from a group's profiles before and after new
/// profiles were inserted.
#[derive(Debug, Clone, Default)]
pub struct Reconciliation {
    /// Records inserted during this sync (identity not present before).
    pub after_new: Vec<Profile>,
    /// Inserted records whose content was not stored before.
    pub added: Vec<Profile>,
    /// Previously stored records the subscription no longer offers.
    pub removed: Vec<Profile>,
    /// Inserted records whose content was already stored.
    pub duplicates: Vec<Profile>,
    /// `duplicates` followed by `removed`.
    pub to_delete: Vec<Profile>,
}

/// Compute what to delete so the group converges to one stored profile per
/// offered content, given the group snapshot `before` the sync and the
/// snapshot `after_all` taken once decoded profiles were inserted.
///
/// Newly inserted records are only compared with `before`, never with each
/// other: a subscription listing the same proxy twice keeps both copies.
pub fn reconcile(before: &[Profile], after_all: &[Profile]) -> Reconciliation {
    let after_new = only_in_src_by_identity(after_all, before);
    let removed = only_in_src(before, &after_new);
    let added = only_in_src(&after_new, before);
    let duplicates = common(&after_new, before);

    let mut to_delete = duplicates.clone();
    to_delete.extend(removed.iter().cloned());

    debug!(
        "reconcile: before={} after_all={} after_new={} added={} removed={} duplicates={}",
        before.len(),
        after_all.len(),
        after_new.len(),
        added.len(),
        removed.len(),
        duplicates.len()
    );

    Reconciliation {
        after_new,
        added,
        removed,
        duplicates,
        to_delete,
    }
}
