//! SyncEngine — remote-first reads and writes with a local cache fallback.
//!
//! Every operation goes to the remote store first. After a successful
//! mutation the touched collection is re-read from the remote store and
//! mirrored into the cache (read-after-write). When the remote store fails,
//! the change is applied to the in-memory snapshot and the cache directly and
//! the engine stays degraded until the next successful remote call.
//!
//! Public methods never return `Err`; absorbed failures are collected in
//! `SyncOutcome.errors`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::Mutex as TokioMutex;

use crate::backup::Backup;
use crate::cache::local::{LocalCache, DEFAULT_KEY_PREFIX};
use crate::error::{CacheError, RemoteError};
use crate::remote::RemoteStore;
use crate::types::{
    sanitize_chat_ids, sort_by_timestamp, Collection, ContestFields, EliteEntry, EliteFields,
    Entry, Loser, Record, Winner, MAX_CHAT_IDS,
};

use super::identity::IdMapping;
use super::types::*;

// ============================================================================
// In-memory state
// ============================================================================

struct EngineState {
    winners: Arc<[Winner]>,
    losers: Arc<[Loser]>,
    elite_entries: Arc<[EliteEntry]>,
}

/// Maps a field set to its slot in `EngineState`.
///
/// `ContestFields` backs both winners and losers, so the collection picks
/// the slot; elite entries have a slot of their own.
trait Slotted: Entry {
    fn slot(state: &EngineState, collection: Collection) -> &Arc<[Record<Self>]>;
    fn slot_mut(state: &mut EngineState, collection: Collection) -> &mut Arc<[Record<Self>]>;
}

impl Slotted for ContestFields {
    fn slot(state: &EngineState, collection: Collection) -> &Arc<[Record<Self>]> {
        match collection {
            Collection::Losers => &state.losers,
            _ => &state.winners,
        }
    }

    fn slot_mut(state: &mut EngineState, collection: Collection) -> &mut Arc<[Record<Self>]> {
        match collection {
            Collection::Losers => &mut state.losers,
            _ => &mut state.winners,
        }
    }
}

impl Slotted for EliteFields {
    fn slot(state: &EngineState, _collection: Collection) -> &Arc<[Record<Self>]> {
        &state.elite_entries
    }

    fn slot_mut(state: &mut EngineState, _collection: Collection) -> &mut Arc<[Record<Self>]> {
        &mut state.elite_entries
    }
}

type RestoreFailure = (Collection, RemoteError);

// ============================================================================
// SyncEngine
// ============================================================================

pub struct SyncEngine {
    remote: Arc<dyn RemoteStore>,
    cache: LocalCache,
    chat_id_limit: usize,
    on_error: Option<Arc<SyncErrorCallback>>,
    state: Mutex<EngineState>,
    /// Held for the whole of each operation so a reload can never be
    /// reordered ahead of the mutation it follows.
    op_lock: TokioMutex<()>,
    degraded: AtomicBool,
}

impl SyncEngine {
    pub fn new(options: SyncEngineOptions) -> Self {
        let prefix = options
            .key_prefix
            .unwrap_or_else(|| DEFAULT_KEY_PREFIX.to_string());
        Self {
            remote: options.remote,
            cache: LocalCache::new(options.cache, prefix),
            chat_id_limit: options
                .chat_id_limit
                .unwrap_or(MAX_CHAT_IDS)
                .clamp(1, MAX_CHAT_IDS),
            on_error: options.on_error,
            state: Mutex::new(EngineState {
                winners: Arc::from(Vec::new()),
                losers: Arc::from(Vec::new()),
                elite_entries: Arc::from(Vec::new()),
            }),
            op_lock: TokioMutex::new(()),
            degraded: AtomicBool::new(false),
        }
    }

    // -----------------------------------------------------------------------
    // Snapshots
    // -----------------------------------------------------------------------

    pub fn winners(&self) -> Arc<[Winner]> {
        self.state.lock().winners.clone()
    }

    pub fn losers(&self) -> Arc<[Loser]> {
        self.state.lock().losers.clone()
    }

    pub fn elite_entries(&self) -> Arc<[EliteEntry]> {
        self.state.lock().elite_entries.clone()
    }

    pub fn collections(&self) -> Collections {
        let state = self.state.lock();
        Collections {
            winners: state.winners.clone(),
            losers: state.losers.clone(),
            elite_entries: state.elite_entries.clone(),
        }
    }

    /// True after a remote failure, until the next successful remote call.
    pub fn is_degraded(&self) -> bool {
        self.degraded.load(Ordering::Acquire)
    }

    /// The cache this engine mirrors into.
    pub fn cache(&self) -> &LocalCache {
        &self.cache
    }

    /// All three collections as a backup document, pending records included.
    pub fn export_backup(&self) -> Backup {
        let snapshot = self.collections();
        Backup::new(
            snapshot.winners.to_vec(),
            Some(snapshot.losers.to_vec()),
            Some(snapshot.elite_entries.to_vec()),
        )
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Load all three collections. Used at startup.
    pub async fn load_all(&self) -> SyncOutcome<Collections> {
        let _guard = self.op_lock.lock().await;
        let mut errors = Vec::new();
        let mut source = DataSource::Remote;
        for collection in Collection::ALL {
            source = worst(source, self.load_any(collection, &mut errors).await);
        }
        SyncOutcome {
            data: self.collections(),
            source,
            errors,
        }
    }

    /// Load a single collection.
    pub async fn load(&self, collection: Collection) -> SyncOutcome<Collections> {
        let _guard = self.op_lock.lock().await;
        let mut errors = Vec::new();
        let source = self.load_any(collection, &mut errors).await;
        SyncOutcome {
            data: self.collections(),
            source,
            errors,
        }
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    pub async fn create_winner(&self, fields: ContestFields) -> SyncOutcome<Arc<[Winner]>> {
        let _guard = self.op_lock.lock().await;
        self.create_impl(Collection::Winners, fields, Vec::new()).await
    }

    pub async fn create_loser(&self, fields: ContestFields) -> SyncOutcome<Arc<[Loser]>> {
        let _guard = self.op_lock.lock().await;
        self.create_impl(Collection::Losers, fields, Vec::new()).await
    }

    /// Create an elite entry. A `winner_id` that does not name a winner in
    /// the current snapshot is cleared and reported, never stored dangling.
    pub async fn create_elite_entry(
        &self,
        mut fields: EliteFields,
    ) -> SyncOutcome<Arc<[EliteEntry]>> {
        let _guard = self.op_lock.lock().await;
        let mut errors = Vec::new();
        if let Some(winner_ref) = fields.winner_id.take() {
            let winners = self.winners();
            if winner_ref.resolve(&winners).is_some() {
                fields.winner_id = Some(winner_ref);
            } else {
                tracing::warn!(
                    winner_id = %winner_ref,
                    "elite entry references an unknown winner; storing it unlinked"
                );
                errors.push(self.make_error(
                    SyncPhase::Create,
                    Collection::EliteEntries,
                    Some(winner_ref.as_str()),
                    format!("winner \"{winner_ref}\" not found"),
                    SyncErrorKind::DanglingReference,
                ));
            }
        }
        self.create_impl(Collection::EliteEntries, fields, errors).await
    }

    pub async fn delete_winner(&self, id: &str) -> SyncOutcome<Arc<[Winner]>> {
        let _guard = self.op_lock.lock().await;
        self.delete_impl::<ContestFields>(Collection::Winners, id).await
    }

    pub async fn delete_loser(&self, id: &str) -> SyncOutcome<Arc<[Loser]>> {
        let _guard = self.op_lock.lock().await;
        self.delete_impl::<ContestFields>(Collection::Losers, id).await
    }

    pub async fn delete_elite_entry(&self, id: &str) -> SyncOutcome<Arc<[EliteEntry]>> {
        let _guard = self.op_lock.lock().await;
        self.delete_impl::<EliteFields>(Collection::EliteEntries, id).await
    }

    /// Destructively replace the remote collections with the given records.
    ///
    /// Elite entries are purged first, then losers (only when `losers` is
    /// given), then winners. Elite entries are purged even when
    /// `elite_entries` is `None`: their winner ids are about to be reissued,
    /// so restoring a winners-only backup deletes every elite entry.
    ///
    /// Winners are re-inserted one at a time and their new ids recorded so
    /// each elite entry's `winner_id` can be rewritten; references that
    /// cannot be remapped become `None`. Individual insert failures are
    /// reported and skipped. If a purge or the final reload fails, the given
    /// collections become the local truth and nothing is rolled back
    /// remotely. In that case elite links that name none of the given
    /// winners are cleared and reported as
    /// [`SyncErrorKind::DanglingReference`].
    pub async fn restore_all(
        &self,
        winners: Vec<Winner>,
        losers: Option<Vec<Loser>>,
        elite_entries: Option<Vec<EliteEntry>>,
    ) -> SyncOutcome<Collections> {
        let _guard = self.op_lock.lock().await;
        let mut errors = Vec::new();

        let winners = self.sanitize_records(winners);
        let losers = losers.map(|l| self.sanitize_records(l));
        let elite_entries = elite_entries.map(|e| self.sanitize_records(e));

        let remote_result = match self
            .restore_remote(&winners, losers.as_deref(), elite_entries.as_deref(), &mut errors)
            .await
        {
            Ok(()) => self.fetch_all().await,
            Err(failure) => Err(failure),
        };

        let source = match remote_result {
            Ok((fresh_winners, fresh_losers, fresh_elite)) => {
                self.adopt(Collection::Winners, fresh_winners, SyncPhase::Restore, &mut errors);
                self.adopt(Collection::Losers, fresh_losers, SyncPhase::Restore, &mut errors);
                self.adopt(Collection::EliteEntries, fresh_elite, SyncPhase::Restore, &mut errors);
                tracing::debug!("restore completed against remote store");
                DataSource::Remote
            }
            Err((collection, e)) => {
                errors.push(self.remote_failure(SyncPhase::Restore, collection, None, &e));
                tracing::warn!(
                    collection = %collection,
                    error = %e,
                    "restore failed remotely; adopting restored collections locally"
                );
                // Elite entries are replaced as on the remote path: absent
                // means none survive, and links must name a restored winner.
                let elite_entries = self.unlink_unknown_winners(
                    elite_entries.unwrap_or_default(),
                    &winners,
                    &mut errors,
                );
                self.adopt_local(Collection::Winners, winners, SyncPhase::Restore, &mut errors);
                if let Some(losers) = losers {
                    self.adopt_local(Collection::Losers, losers, SyncPhase::Restore, &mut errors);
                }
                self.adopt_local(
                    Collection::EliteEntries,
                    elite_entries,
                    SyncPhase::Restore,
                    &mut errors,
                );
                DataSource::Cache
            }
        };

        SyncOutcome {
            data: self.collections(),
            source,
            errors,
        }
    }

    /// Restore from a backup document. See [`SyncEngine::restore_all`].
    pub async fn restore_backup(&self, backup: Backup) -> SyncOutcome<Collections> {
        self.restore_all(backup.winners, backup.losers, backup.elite_entries)
            .await
    }

    // -----------------------------------------------------------------------
    // Load Implementation
    // -----------------------------------------------------------------------

    async fn load_any(
        &self,
        collection: Collection,
        errors: &mut Vec<SyncErrorEvent>,
    ) -> DataSource {
        match collection {
            Collection::EliteEntries => self.load_impl::<EliteFields>(collection, errors).await,
            _ => self.load_impl::<ContestFields>(collection, errors).await,
        }
    }

    async fn load_impl<F: Slotted>(
        &self,
        collection: Collection,
        errors: &mut Vec<SyncErrorEvent>,
    ) -> DataSource {
        match self.fetch::<F>(collection).await {
            Ok(records) => {
                self.adopt(collection, records, SyncPhase::Load, errors);
                DataSource::Remote
            }
            Err(e) => {
                errors.push(self.remote_failure(SyncPhase::Load, collection, None, &e));
                let records = self.read_cache::<F>(collection, SyncPhase::Load, errors);
                self.replace(collection, records);
                DataSource::Cache
            }
        }
    }

    async fn fetch<F: Entry>(&self, collection: Collection) -> Result<Vec<Record<F>>, RemoteError> {
        let rows = self.remote.select_all(collection).await?;
        self.mark_online();
        let mut records: Vec<Record<F>> = rows.into_iter().map(Record::from_stored).collect();
        sort_by_timestamp(&mut records);
        Ok(records)
    }

    async fn fetch_all(
        &self,
    ) -> Result<(Vec<Winner>, Vec<Loser>, Vec<EliteEntry>), RestoreFailure> {
        let winners = self
            .fetch::<ContestFields>(Collection::Winners)
            .await
            .map_err(|e| (Collection::Winners, e))?;
        let losers = self
            .fetch::<ContestFields>(Collection::Losers)
            .await
            .map_err(|e| (Collection::Losers, e))?;
        let elite_entries = self
            .fetch::<EliteFields>(Collection::EliteEntries)
            .await
            .map_err(|e| (Collection::EliteEntries, e))?;
        Ok((winners, losers, elite_entries))
    }

    // -----------------------------------------------------------------------
    // Mutation Implementation
    // -----------------------------------------------------------------------

    async fn create_impl<F: Slotted>(
        &self,
        collection: Collection,
        mut fields: F,
        mut errors: Vec<SyncErrorEvent>,
    ) -> SyncOutcome<Arc<[Record<F>]>> {
        self.sanitize(&mut fields);

        let source = match self.remote.insert(collection, &fields.to_row()).await {
            Ok(stored) => {
                self.mark_online();
                tracing::debug!(collection = %collection, id = %stored.id, "record inserted");
                // Reload instead of trusting the insert response.
                self.load_impl::<F>(collection, &mut errors).await
            }
            Err(e) => {
                errors.push(self.remote_failure(SyncPhase::Create, collection, None, &e));
                let mut records = self.snapshot::<F>(collection).to_vec();
                records.push(Record::Pending(fields));
                sort_by_timestamp(&mut records);
                self.write_cache(collection, &records, SyncPhase::Create, &mut errors);
                self.replace(collection, records);
                DataSource::Cache
            }
        };

        SyncOutcome {
            data: self.snapshot(collection),
            source,
            errors,
        }
    }

    async fn delete_impl<F: Slotted>(
        &self,
        collection: Collection,
        id: &str,
    ) -> SyncOutcome<Arc<[Record<F>]>> {
        let mut errors = Vec::new();

        let source = match self.remote.delete_by_id(collection, id).await {
            Ok(()) => {
                self.mark_online();
                tracing::debug!(collection = %collection, id = %id, "record deleted");
                self.load_impl::<F>(collection, &mut errors).await
            }
            Err(e) => {
                errors.push(self.remote_failure(SyncPhase::Delete, collection, Some(id), &e));
                let records: Vec<Record<F>> = self
                    .snapshot::<F>(collection)
                    .iter()
                    .filter(|r| r.id() != Some(id))
                    .cloned()
                    .collect();
                self.write_cache(collection, &records, SyncPhase::Delete, &mut errors);
                self.replace(collection, records);
                DataSource::Cache
            }
        };

        SyncOutcome {
            data: self.snapshot(collection),
            source,
            errors,
        }
    }

    async fn restore_remote(
        &self,
        winners: &[Winner],
        losers: Option<&[Loser]>,
        elite_entries: Option<&[EliteEntry]>,
        errors: &mut Vec<SyncErrorEvent>,
    ) -> Result<(), RestoreFailure> {
        // Dependents before owners.
        self.purge(Collection::EliteEntries).await?;
        if losers.is_some() {
            self.purge(Collection::Losers).await?;
        }
        self.purge(Collection::Winners).await?;
        self.mark_online();

        let mut mapping = IdMapping::new();
        for winner in winners {
            match self
                .remote
                .insert(Collection::Winners, &winner.fields().to_row())
                .await
            {
                Ok(stored) => {
                    if let Some(old_id) = winner.id() {
                        mapping.record(old_id, stored.id);
                    }
                }
                Err(e) => {
                    errors.push(self.remote_failure(
                        SyncPhase::Restore,
                        Collection::Winners,
                        winner.id(),
                        &e,
                    ));
                }
            }
        }
        tracing::debug!(remapped = mapping.len(), "restore re-inserted winners");

        for loser in losers.unwrap_or(&[]) {
            if let Err(e) = self
                .remote
                .insert(Collection::Losers, &loser.fields().to_row())
                .await
            {
                errors.push(self.remote_failure(
                    SyncPhase::Restore,
                    Collection::Losers,
                    loser.id(),
                    &e,
                ));
            }
        }

        for entry in elite_entries.unwrap_or(&[]) {
            let mut fields = entry.fields().clone();
            let remapped = mapping.remap(fields.winner_id.as_ref());
            if let (Some(old), None) = (&fields.winner_id, &remapped) {
                tracing::debug!(
                    winner_id = %old,
                    "elite entry reference has no restored winner; unlinking"
                );
            }
            fields.winner_id = remapped;
            if let Err(e) = self
                .remote
                .insert(Collection::EliteEntries, &fields.to_row())
                .await
            {
                errors.push(self.remote_failure(
                    SyncPhase::Restore,
                    Collection::EliteEntries,
                    entry.id(),
                    &e,
                ));
            }
        }

        Ok(())
    }

    /// Clear every `winner_id` that does not resolve against `winners`,
    /// reporting each one.
    fn unlink_unknown_winners(
        &self,
        entries: Vec<EliteEntry>,
        winners: &[Winner],
        errors: &mut Vec<SyncErrorEvent>,
    ) -> Vec<EliteEntry> {
        entries
            .into_iter()
            .map(|mut entry| {
                let fields = match &mut entry {
                    Record::Pending(fields) | Record::Persisted { fields, .. } => fields,
                };
                let dangling = match &fields.winner_id {
                    Some(winner_ref) if winner_ref.resolve(winners).is_none() => {
                        Some(winner_ref.clone())
                    }
                    _ => None,
                };
                if let Some(winner_ref) = dangling {
                    fields.winner_id = None;
                    tracing::warn!(
                        winner_id = %winner_ref,
                        "restored elite entry references an unknown winner; unlinking"
                    );
                    errors.push(self.make_error(
                        SyncPhase::Restore,
                        Collection::EliteEntries,
                        entry.id(),
                        format!("winner \"{winner_ref}\" not found"),
                        SyncErrorKind::DanglingReference,
                    ));
                }
                entry
            })
            .collect()
    }

    async fn purge(&self, collection: Collection) -> Result<(), RestoreFailure> {
        self.remote
            .delete_all(collection)
            .await
            .map_err(|e| (collection, e))
    }

    // -----------------------------------------------------------------------
    // State & Cache Helpers
    // -----------------------------------------------------------------------

    fn snapshot<F: Slotted>(&self, collection: Collection) -> Arc<[Record<F>]> {
        let state = self.state.lock();
        F::slot(&state, collection).clone()
    }

    fn replace<F: Slotted>(&self, collection: Collection, records: Vec<Record<F>>) {
        let mut state = self.state.lock();
        *F::slot_mut(&mut state, collection) = Arc::from(records);
    }

    /// Mirror an authoritative collection into memory and the cache.
    fn adopt<F: Slotted>(
        &self,
        collection: Collection,
        records: Vec<Record<F>>,
        phase: SyncPhase,
        errors: &mut Vec<SyncErrorEvent>,
    ) {
        tracing::debug!(collection = %collection, count = records.len(), "collection reloaded");
        self.write_cache(collection, &records, phase, errors);
        self.replace(collection, records);
    }

    /// Like `adopt`, for caller-supplied records that still need ordering.
    fn adopt_local<F: Slotted>(
        &self,
        collection: Collection,
        mut records: Vec<Record<F>>,
        phase: SyncPhase,
        errors: &mut Vec<SyncErrorEvent>,
    ) {
        sort_by_timestamp(&mut records);
        self.write_cache(collection, &records, phase, errors);
        self.replace(collection, records);
    }

    /// Last cached snapshot, sorted. Missing or unreadable slots yield an
    /// empty collection.
    fn read_cache<F: Entry>(
        &self,
        collection: Collection,
        phase: SyncPhase,
        errors: &mut Vec<SyncErrorEvent>,
    ) -> Vec<Record<F>> {
        match self.cache.read::<F>(collection) {
            Ok(Some(mut records)) => {
                sort_by_timestamp(&mut records);
                records
            }
            Ok(None) => Vec::new(),
            Err(e) => {
                let kind = match e {
                    CacheError::MalformedSnapshot { .. } => SyncErrorKind::MalformedCacheSnapshot,
                    _ => SyncErrorKind::CacheRead,
                };
                let message = describe(&e);
                tracing::warn!(
                    collection = %collection,
                    error = %message,
                    "unreadable cache snapshot; using an empty collection"
                );
                errors.push(self.make_error(phase, collection, None, message, kind));
                Vec::new()
            }
        }
    }

    fn write_cache<F: Entry>(
        &self,
        collection: Collection,
        records: &[Record<F>],
        phase: SyncPhase,
        errors: &mut Vec<SyncErrorEvent>,
    ) {
        if let Err(e) = self.cache.write(collection, records) {
            let message = describe(&e);
            tracing::warn!(
                collection = %collection,
                error = %message,
                "failed to write cache snapshot"
            );
            errors.push(self.make_error(
                phase,
                collection,
                None,
                message,
                SyncErrorKind::CacheWrite,
            ));
        }
    }

    fn sanitize<F: Entry>(&self, fields: &mut F) {
        let contest = fields.contest_mut();
        let ids = std::mem::take(&mut contest.chat_ids);
        contest.chat_ids = sanitize_chat_ids(ids, self.chat_id_limit);
    }

    fn sanitize_records<F: Entry>(&self, records: Vec<Record<F>>) -> Vec<Record<F>> {
        records
            .into_iter()
            .map(|mut record| {
                match &mut record {
                    Record::Pending(fields) | Record::Persisted { fields, .. } => {
                        self.sanitize(fields)
                    }
                }
                record
            })
            .collect()
    }

    // -----------------------------------------------------------------------
    // Degraded Mode & Errors
    // -----------------------------------------------------------------------

    fn mark_online(&self) {
        if self.degraded.swap(false, Ordering::AcqRel) {
            tracing::info!("remote store reachable again; leaving cache-only mode");
        }
    }

    fn remote_failure(
        &self,
        phase: SyncPhase,
        collection: Collection,
        id: Option<&str>,
        error: &RemoteError,
    ) -> SyncErrorEvent {
        if !self.degraded.swap(true, Ordering::AcqRel) {
            tracing::info!("remote store unavailable; entering cache-only mode");
        }
        tracing::warn!(
            phase = ?phase,
            collection = %collection,
            id = ?id,
            kind = ?error.kind,
            error = %error,
            "remote call failed; falling back to local cache"
        );
        self.make_error(
            phase,
            collection,
            id,
            error.message.clone(),
            SyncErrorKind::RemoteUnavailable,
        )
    }

    fn make_error(
        &self,
        phase: SyncPhase,
        collection: Collection,
        id: Option<&str>,
        error: String,
        kind: SyncErrorKind,
    ) -> SyncErrorEvent {
        let event = SyncErrorEvent {
            phase,
            collection,
            id: id.map(|s| s.to_string()),
            error,
            kind,
        };
        if let Some(ref on_error) = self.on_error {
            // A panicking callback must not abort the operation
            let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                on_error(&event);
            }));
        }
        event
    }
}

fn worst(a: DataSource, b: DataSource) -> DataSource {
    if a == DataSource::Cache || b == DataSource::Cache {
        DataSource::Cache
    } else {
        DataSource::Remote
    }
}

/// Error message followed by its source chain.
fn describe(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(inner) = source {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        source = inner.source();
    }
    message
}
