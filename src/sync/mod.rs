//! Subscription synchronization: decode a payload into a group and reconcile
//! the group so it mirrors what the subscription currently offers.

pub mod filter;
pub mod reconcile;
mod updater;

pub use reconcile::{reconcile, Reconciliation};
pub use updater::{
    ChannelReporter, Fetcher, FixedPrompt, Prompt, RawUpdater, Reporter, SyncOutcome, SyncSummary,
    UpdateMode,
};
