use std::fmt;
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use log::{debug, info, warn};

use super::reconcile::reconcile;
use crate::error::{DocumentError, FetchError, SyncError};
use crate::models::{GroupId, Profile};
use crate::parser::subparser::{normalize_with_depth, CandidateSink};
use crate::settings::Settings;
use crate::store::ProfileStore;

/// How a payload without a group is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateMode {
    /// The payload is a URL whose body is the content.
    AsSubscription,
    /// The payload itself is the content.
    AsLink,
}

/// Network fetch collaborator.
pub trait Fetcher: Send + Sync {
    fn http_get(&self, url: &str) -> Result<String, FetchError>;
}

/// Asks the user whether an ad-hoc URL is a subscription or a link.
/// `None` means the question was dismissed.
pub trait Prompt {
    fn choose(&self, url: &str) -> Option<UpdateMode>;
}

/// Prompt with a preset answer.
#[derive(Debug, Clone, Copy)]
pub struct FixedPrompt(pub Option<UpdateMode>);

impl Prompt for FixedPrompt {
    fn choose(&self, _url: &str) -> Option<UpdateMode> {
        self.0
    }
}

pub type SyncOutcome = Result<SyncSummary, SyncError>;

/// Receives the outcome of a background sync.
pub trait Reporter: Send + Sync {
    fn report(&self, outcome: SyncOutcome);

    /// Diagnostic trace, no delivery guarantee.
    fn log_line(&self, line: &str) {
        debug!("{}", line);
    }
}

/// Forwards outcomes to the thread holding the receiving end.
#[derive(Debug, Clone)]
pub struct ChannelReporter {
    sender: Sender<SyncOutcome>,
}

impl ChannelReporter {
    pub fn new(sender: Sender<SyncOutcome>) -> Self {
        ChannelReporter { sender }
    }
}

impl Reporter for ChannelReporter {
    fn report(&self, outcome: SyncOutcome) {
        if self.sender.send(outcome).is_err() {
            warn!("Sync finished but nobody is listening for the result");
        }
    }
}

/// Result of one sync.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncSummary {
    /// Insertions minus deletions.
    pub updated_count: i64,
    /// Whether the payload was reconciled against an existing group.
    pub subscription: bool,
    pub added: Vec<String>,
    pub removed: Vec<String>,
    /// Document level failures, one line each.
    pub warnings: Vec<String>,
}

impl fmt::Display for SyncSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for warning in &self.warnings {
            writeln!(f, "Warning: {}", warning)?;
        }
        if !self.subscription {
            return write!(f, "Imported {} profiles", self.updated_count);
        }
        write!(f, "Change of {} profiles", self.updated_count)?;
        if !self.added.is_empty() {
            write!(f, "\nAdded {} profiles:", self.added.len())?;
            for label in &self.added {
                write!(f, "\n{}", label)?;
            }
        }
        if !self.removed.is_empty() {
            write!(f, "\nDeleted {} profiles:", self.removed.len())?;
            for label in &self.removed {
                write!(f, "\n{}", label)?;
            }
        }
        Ok(())
    }
}

fn lock<S>(store: &Mutex<S>) -> MutexGuard<'_, S> {
    store.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Inserts every decoded profile as soon as it is produced.
struct StoreSink<'a, S> {
    store: &'a Mutex<S>,
    group_id: Option<GroupId>,
    updated_count: i64,
    warnings: Vec<String>,
}

impl<S: ProfileStore> CandidateSink for StoreSink<'_, S> {
    fn accept(&mut self, profile: Profile) {
        lock(self.store).add_profile(profile, self.group_id);
        self.updated_count += 1;
    }

    fn document_failed(&mut self, error: DocumentError) {
        self.warnings.push(error.to_string());
    }
}

/// Everything a sync needs, cheap to clone into a worker thread.
struct SyncContext<S> {
    store: Arc<Mutex<S>>,
    fetcher: Arc<dyn Fetcher>,
    reporter: Arc<dyn Reporter>,
    settings: Arc<Settings>,
}

impl<S> Clone for SyncContext<S> {
    fn clone(&self) -> Self {
        SyncContext {
            store: Arc::clone(&self.store),
            fetcher: Arc::clone(&self.fetcher),
            reporter: Arc::clone(&self.reporter),
            settings: Arc::clone(&self.settings),
        }
    }
}

impl<S: ProfileStore> SyncContext<S> {
    fn run(&self, payload: &str, group_id: Option<GroupId>, mode: UpdateMode) -> SyncOutcome {
        let group = group_id.and_then(|gid| lock(&self.store).get_group(gid));

        let content = match mode {
            UpdateMode::AsSubscription => {
                self.reporter.log_line(&format!("URL={}", payload));
                let body = self.fetcher.http_get(payload)?;
                self.reporter.log_line(&format!("Content={}", body));
                body
            }
            UpdateMode::AsLink => payload.to_string(),
        };

        let before = match &group {
            Some(group) => lock(&self.store).group_profiles(group.id),
            None => Vec::new(),
        };

        let mut sink = StoreSink {
            store: self.store.as_ref(),
            group_id,
            updated_count: 0,
            warnings: Vec::new(),
        };
        normalize_with_depth(&content, self.settings.max_decode_depth, &mut sink);

        let mut summary = SyncSummary {
            updated_count: sink.updated_count,
            subscription: group.is_some(),
            warnings: sink.warnings,
            ..Default::default()
        };

        if let Some(group) = group {
            let after_all = lock(&self.store).group_profiles(group.id);
            let result = reconcile(&before, &after_all);

            for profile in &result.to_delete {
                if let Some(id) = profile.id {
                    lock(&self.store).delete_profile(id);
                    summary.updated_count -= 1;
                }
            }

            summary.added = result.added.iter().map(Profile::display_type_and_name).collect();
            summary.removed = result.removed.iter().map(Profile::display_type_and_name).collect();
            info!(
                "Group {} updated: {} added, {} removed, {} duplicates dropped",
                group.id,
                summary.added.len(),
                summary.removed.len(),
                result.duplicates.len()
            );
        } else {
            info!("Imported {} profiles", summary.updated_count);
        }

        Ok(summary)
    }
}

/// Drives a sync: fetch, decode, insert, reconcile, report.
pub struct RawUpdater<S> {
    ctx: SyncContext<S>,
    prompt: Box<dyn Prompt>,
}

impl<S: ProfileStore + Send + 'static> RawUpdater<S> {
    pub fn new(
        store: Arc<Mutex<S>>,
        fetcher: Arc<dyn Fetcher>,
        prompt: Box<dyn Prompt>,
        reporter: Arc<dyn Reporter>,
        settings: Arc<Settings>,
    ) -> Self {
        RawUpdater {
            ctx: SyncContext {
                store,
                fetcher,
                reporter,
                settings,
            },
            prompt,
        }
    }

    /// Run a sync on the calling thread.
    ///
    /// With [`UpdateMode::AsSubscription`] the body behind `payload` is
    /// fetched first; a fetch failure aborts before the store is touched.
    /// When `group_id` names an existing group, the group is reconciled
    /// afterwards so it holds one profile per offered configuration.
    pub fn sync(&self, payload: &str, group_id: Option<GroupId>, mode: UpdateMode) -> SyncOutcome {
        self.ctx.run(payload.trim(), group_id, mode)
    }

    /// Decide how to treat `payload`, asking the prompt for bare http(s)
    /// URLs without a group. `None` if the user dismissed the question.
    pub fn resolve_mode(&self, payload: &str, group_id: Option<GroupId>) -> Option<UpdateMode> {
        if group_id.is_some() {
            return Some(UpdateMode::AsSubscription);
        }
        if payload.starts_with("http://") || payload.starts_with("https://") {
            return self.prompt.choose(payload);
        }
        Some(UpdateMode::AsLink)
    }

    /// Start a sync on a background thread and return immediately. The
    /// outcome goes to the reporter. Returns `None` without side effects
    /// when the user cancels the prompt.
    pub fn async_update(&self, payload: &str, group_id: Option<GroupId>) -> Option<JoinHandle<()>> {
        let payload = payload.trim().to_string();
        let Some(mode) = self.resolve_mode(&payload, group_id) else {
            debug!("Update of '{}' cancelled", payload);
            return None;
        };

        let ctx = self.ctx.clone();
        Some(thread::spawn(move || {
            let outcome = ctx.run(&payload, group_id, mode);
            ctx.reporter.report(outcome);
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProfileKind;
    use crate::store::MemoryStore;
    use crate::utils::base64::url_safe_base64_encode;
    use std::sync::mpsc;

    struct StaticFetcher(Result<String, u16>);

    impl Fetcher for StaticFetcher {
        fn http_get(&self, _url: &str) -> Result<String, FetchError> {
            self.0.clone().map_err(FetchError::Status)
        }
    }

    fn ss_link(name: &str, port: u16) -> String {
        format!(
            "ss://{}@example.com:{}#{}",
            url_safe_base64_encode("aes-256-gcm:pw"),
            port,
            name
        )
    }

    fn updater(
        store: Arc<Mutex<MemoryStore>>,
        body: Result<String, u16>,
        answer: Option<UpdateMode>,
    ) -> (RawUpdater<MemoryStore>, mpsc::Receiver<SyncOutcome>) {
        let (tx, rx) = mpsc::channel();
        let updater = RawUpdater::new(
            store,
            Arc::new(StaticFetcher(body)),
            Box::new(FixedPrompt(answer)),
            Arc::new(ChannelReporter::new(tx)),
            Arc::new(Settings::default()),
        );
        (updater, rx)
    }

    #[test]
    fn test_resolve_mode() {
        let store = Arc::new(Mutex::new(MemoryStore::new()));
        let (u, _rx) = updater(store, Ok(String::new()), None);
        assert_eq!(
            u.resolve_mode("https://a.com/sub", Some(GroupId(1))),
            Some(UpdateMode::AsSubscription)
        );
        assert_eq!(u.resolve_mode("https://a.com/sub", None), None);
        assert_eq!(u.resolve_mode("ss://abc", None), Some(UpdateMode::AsLink));
    }

    #[test]
    fn test_subscription_sync_reconciles() {
        let store = Arc::new(Mutex::new(MemoryStore::new()));
        let gid = lock(&store).add_group("sub", "https://a.com/sub");
        let body = format!("{}\n{}", ss_link("a", 1001), ss_link("b", 1002));
        let (u, _rx) = updater(Arc::clone(&store), Ok(body), None);

        let first = u.sync("https://a.com/sub", Some(gid), UpdateMode::AsSubscription).unwrap();
        assert!(first.subscription);
        assert_eq!(first.updated_count, 2);
        assert_eq!(first.added.len(), 2);
        assert!(first.removed.is_empty());

        let second = u.sync("https://a.com/sub", Some(gid), UpdateMode::AsSubscription).unwrap();
        assert_eq!(second.updated_count, 0);
        assert!(second.added.is_empty());
        assert_eq!(lock(&store).group_profiles(gid).len(), 2);
    }

    #[test]
    fn test_unparsable_document_empties_subscription_group() {
        let store = Arc::new(Mutex::new(MemoryStore::new()));
        let gid = lock(&store).add_group("sub", "https://a.com/sub");
        let (u, _rx) = updater(Arc::clone(&store), Ok(ss_link("a", 1001)), None);
        u.sync("https://a.com/sub", Some(gid), UpdateMode::AsSubscription).unwrap();
        assert_eq!(lock(&store).group_profiles(gid).len(), 1);

        // Nothing decodes, so every stored profile counts as no longer offered
        let (u, _rx) = updater(
            Arc::clone(&store),
            Ok("proxies:\n  - [unclosed\n".to_string()),
            None,
        );
        let summary = u.sync("https://a.com/sub", Some(gid), UpdateMode::AsSubscription).unwrap();
        assert_eq!(summary.warnings.len(), 1);
        assert_eq!(summary.removed, vec!["[Shadowsocks] a"]);
        assert_eq!(summary.updated_count, -1);
        assert!(lock(&store).group_profiles(gid).is_empty());
    }

    #[test]
    fn test_fetch_failure_leaves_store_untouched() {
        let store = Arc::new(Mutex::new(MemoryStore::new()));
        let gid = lock(&store).add_group("sub", "https://a.com/sub");
        let (u, _rx) = updater(Arc::clone(&store), Err(503), None);

        let result = u.sync("https://a.com/sub", Some(gid), UpdateMode::AsSubscription);
        assert!(matches!(result, Err(SyncError::Fetch(FetchError::Status(503)))));
        assert!(lock(&store).profiles().is_empty());
    }

    #[test]
    fn test_async_update_reports() {
        let store = Arc::new(Mutex::new(MemoryStore::new()));
        let (u, rx) = updater(Arc::clone(&store), Ok(String::new()), None);

        let handle = u.async_update(&format!("  {}  ", ss_link("a", 1001)), None).unwrap();
        handle.join().unwrap();
        let summary = rx.recv().unwrap().unwrap();
        assert!(!summary.subscription);
        assert_eq!(summary.updated_count, 1);
        assert_eq!(lock(&store).profiles()[0].kind(), ProfileKind::Shadowsocks);
    }

    #[test]
    fn test_cancelled_prompt_has_no_side_effects() {
        let store = Arc::new(Mutex::new(MemoryStore::new()));
        let (u, rx) = updater(Arc::clone(&store), Ok(ss_link("a", 1001)), None);
        assert!(u.async_update("https://a.com/sub", None).is_none());
        assert!(rx.try_recv().is_err());
        assert!(lock(&store).profiles().is_empty());
    }

    #[test]
    fn test_summary_display() {
        let summary = SyncSummary {
            updated_count: 0,
            subscription: true,
            added: vec!["[Trojan] new".to_string()],
            removed: vec!["[VMess] old".to_string()],
            warnings: Vec::new(),
        };
        assert_eq!(
            summary.to_string(),
            "Change of 0 profiles\nAdded 1 profiles:\n[Trojan] new\nDeleted 1 profiles:\n[VMess] old"
        );

        let import = SyncSummary {
            updated_count: 3,
            ..Default::default()
        };
        assert_eq!(import.to_string(), "Imported 3 profiles");
    }
}
