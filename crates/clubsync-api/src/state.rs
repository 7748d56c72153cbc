//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers
//! via the `State` extractor.
//!
//! ## Storage Model
//!
//! Reads are served from in-memory [`Store`]s. Every mutation is applied to
//! the store first and then committed (see [`crate::persist`]) to whichever
//! durable backends are configured:
//!
//! - **Postgres** (`DATABASE_URL`): row-level write-through. The stores are
//!   hydrated from the database on startup.
//! - **Snapshot file** (`CLUBSYNC_SNAPSHOT_PATH`): the full state rewritten
//!   atomically after each mutation. Used for hydration when no database is
//!   configured.
//!
//! With neither configured the service runs in memory only. Sessions are
//! never persisted; a restart signs everyone out.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::Duration;
use clubsync_club::{
    AttendanceRecord, Club, ClubData, Event, HourEntry, JoinRequest, MeetingNote, Member,
    Snapshot, Task, User,
};
use parking_lot::RwLock;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::Session;

// -- Generic In-Memory Store --------------------------------------------------

/// Thread-safe, cloneable in-memory key-value store.
///
/// All operations are synchronous (the RwLock is `parking_lot`, not `tokio::sync`)
/// because we never hold the lock across `.await` points.
#[derive(Debug)]
pub struct Store<T: Clone + Send + Sync> {
    data: Arc<RwLock<HashMap<Uuid, T>>>,
}

impl<T: Clone + Send + Sync> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
        }
    }
}

impl<T: Clone + Send + Sync> Store<T> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Insert a record, returning the previous value if the key existed.
    pub fn insert(&self, id: Uuid, value: T) -> Option<T> {
        self.data.write().insert(id, value)
    }

    /// Insert a record unless an existing one clashes with it.
    ///
    /// `clashes(existing, new)` is evaluated against every stored record
    /// under the same write lock as the insert, so two concurrent callers
    /// cannot both pass the check. On a clash the existing record is
    /// returned and nothing is inserted.
    pub fn insert_unique(
        &self,
        id: Uuid,
        value: T,
        clashes: impl Fn(&T, &T) -> bool,
    ) -> Result<(), T> {
        let mut guard = self.data.write();
        if let Some(existing) = guard.values().find(|e| clashes(e, &value)) {
            return Err(existing.clone());
        }
        guard.insert(id, value);
        Ok(())
    }

    /// Retrieve a record by ID.
    pub fn get(&self, id: &Uuid) -> Option<T> {
        self.data.read().get(id).cloned()
    }

    /// List all records.
    pub fn list(&self) -> Vec<T> {
        self.data.read().values().cloned().collect()
    }

    /// List the records matching a predicate.
    pub fn filter(&self, pred: impl Fn(&T) -> bool) -> Vec<T> {
        self.data.read().values().filter(|v| pred(v)).cloned().collect()
    }

    /// First record matching a predicate, in no particular order.
    pub fn find(&self, pred: impl Fn(&T) -> bool) -> Option<T> {
        self.data.read().values().find(|v| pred(v)).cloned()
    }

    /// Update a record in place. Returns the updated record, or `None` if not found.
    pub fn update(&self, id: &Uuid, f: impl FnOnce(&mut T)) -> Option<T> {
        let mut guard = self.data.write();
        if let Some(entry) = guard.get_mut(id) {
            f(entry);
            Some(entry.clone())
        } else {
            None
        }
    }

    /// Atomically read-validate-update a record.
    ///
    /// The closure may inspect the current state, validate preconditions,
    /// mutate the record, and return `Ok(R)` or `Err(E)`, all under a single
    /// write lock. Returns `None` if the record doesn't exist.
    pub fn try_update<R, E>(
        &self,
        id: &Uuid,
        f: impl FnOnce(&mut T) -> Result<R, E>,
    ) -> Option<Result<R, E>> {
        self.data.write().get_mut(id).map(f)
    }

    /// Run `f` with exclusive access to the whole map.
    ///
    /// For invariants spanning several records of the same store, such as
    /// "a club keeps at least one officer".
    pub fn with_write<R>(&self, f: impl FnOnce(&mut HashMap<Uuid, T>) -> R) -> R {
        f(&mut self.data.write())
    }

    /// Remove a record by ID.
    pub fn remove(&self, id: &Uuid) -> Option<T> {
        self.data.write().remove(id)
    }

    /// Remove every record matching a predicate and return them.
    pub fn remove_where(&self, pred: impl Fn(&T) -> bool) -> Vec<T> {
        let mut guard = self.data.write();
        let ids: Vec<Uuid> = guard
            .iter()
            .filter(|(_, v)| pred(v))
            .map(|(k, _)| *k)
            .collect();
        ids.iter().filter_map(|id| guard.remove(id)).collect()
    }

    /// Check if a record exists.
    pub fn contains(&self, id: &Uuid) -> bool {
        self.data.read().contains_key(id)
    }

    /// Return the number of records.
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Clone + Send + Sync> Default for Store<T> {
    fn default() -> Self {
        Self::new()
    }
}

// -- Configuration ------------------------------------------------------------

/// Application configuration, read once at startup.
///
/// Custom `Debug` redacts the database URL, which usually embeds a password.
#[derive(Clone)]
pub struct AppConfig {
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Postgres connection string. `None` disables database persistence.
    pub database_url: Option<String>,
    /// JSON snapshot file. `None` disables the snapshot backend.
    pub snapshot_path: Option<PathBuf>,
    /// Lifetime of a session token.
    pub session_ttl: Duration,
    /// Requests allowed per client per minute.
    pub rate_limit_per_minute: u64,
    /// Whether request counters are collected and served at `/metrics`.
    pub metrics_enabled: bool,
    /// Emit logs as JSON lines instead of human-readable text.
    pub log_json: bool,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("port", &self.port)
            .field(
                "database_url",
                &self.database_url.as_ref().map(|_| "[REDACTED]"),
            )
            .field("snapshot_path", &self.snapshot_path)
            .field("session_ttl_hours", &self.session_ttl.num_hours())
            .field("rate_limit_per_minute", &self.rate_limit_per_minute)
            .field("metrics_enabled", &self.metrics_enabled)
            .field("log_json", &self.log_json)
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            database_url: None,
            snapshot_path: None,
            session_ttl: Duration::hours(168),
            rate_limit_per_minute: 600,
            metrics_enabled: true,
            log_json: false,
        }
    }
}

impl AppConfig {
    /// Build configuration from environment variables, falling back to
    /// defaults for anything unset or unparseable.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let parsed = |key: &str| lookup(key).and_then(|v| v.trim().parse::<u64>().ok());
        let flag = |key: &str, default: bool| match lookup(key).as_deref().map(str::trim) {
            Some("1") | Some("true") | Some("yes") | Some("on") => true,
            Some("0") | Some("false") | Some("no") | Some("off") => false,
            _ => default,
        };
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            port: lookup("PORT")
                .and_then(|p| p.trim().parse().ok())
                .unwrap_or(defaults.port),
            database_url: non_empty("DATABASE_URL"),
            snapshot_path: non_empty("CLUBSYNC_SNAPSHOT_PATH").map(PathBuf::from),
            session_ttl: parsed("CLUBSYNC_SESSION_TTL_HOURS")
                .filter(|h| *h > 0)
                .and_then(|h| i64::try_from(h).ok())
                .map(Duration::hours)
                .unwrap_or(defaults.session_ttl),
            rate_limit_per_minute: parsed("CLUBSYNC_RATE_LIMIT_PER_MINUTE")
                .filter(|n| *n > 0)
                .unwrap_or(defaults.rate_limit_per_minute),
            metrics_enabled: flag("CLUBSYNC_METRICS_ENABLED", defaults.metrics_enabled),
            log_json: lookup("LOG_FORMAT")
                .is_some_and(|f| f.trim().eq_ignore_ascii_case("json")),
        }
    }
}

// -- Application State --------------------------------------------------------

/// Shared application state accessible to all route handlers.
///
/// Clone-friendly via `Arc` internals in each `Store`.
#[derive(Debug, Clone)]
pub struct AppState {
    pub users: Store<User>,
    pub sessions: Store<Session>,
    pub clubs: Store<Club>,
    pub members: Store<Member>,
    pub notes: Store<MeetingNote>,
    pub attendance: Store<AttendanceRecord>,
    pub hours: Store<HourEntry>,
    pub events: Store<Event>,
    pub tasks: Store<Task>,
    pub join_requests: Store<JoinRequest>,

    /// PostgreSQL connection pool. When `None`, nothing is written to a
    /// database.
    pub db_pool: Option<PgPool>,

    /// Serializes snapshot rewrites so that a slower, older write can never
    /// land after a newer one. `tokio::sync::Mutex` because the guard is held
    /// across the blocking write.
    pub snapshot_lock: Arc<tokio::sync::Mutex<()>>,

    pub config: AppConfig,
}

impl AppState {
    /// Create a new application state with default configuration.
    pub fn new() -> Self {
        Self::with_config(AppConfig::default(), None)
    }

    /// Create a new application state with the given configuration and
    /// optional database pool.
    pub fn with_config(config: AppConfig, db_pool: Option<PgPool>) -> Self {
        Self {
            users: Store::new(),
            sessions: Store::new(),
            clubs: Store::new(),
            members: Store::new(),
            notes: Store::new(),
            attendance: Store::new(),
            hours: Store::new(),
            events: Store::new(),
            tasks: Store::new(),
            join_requests: Store::new(),
            db_pool,
            snapshot_lock: Arc::new(tokio::sync::Mutex::new(())),
            config,
        }
    }

    /// Every record of one club, for analytics.
    pub fn club_data(&self, club_id: Uuid) -> ClubData {
        ClubData {
            members: self.members.filter(|m| m.club_id == club_id),
            notes: self.notes.filter(|n| n.club_id == club_id),
            attendance: self.attendance.filter(|a| a.club_id == club_id),
            hours: self.hours.filter(|h| h.club_id == club_id),
            events: self.events.filter(|e| e.club_id == club_id),
            tasks: self.tasks.filter(|t| t.club_id == club_id),
            join_requests: self.join_requests.filter(|r| r.club_id == club_id),
        }
    }

    /// Copy the persistent stores into a snapshot document.
    pub fn to_snapshot(&self) -> Snapshot {
        Snapshot {
            users: self.users.list(),
            clubs: self.clubs.list(),
            members: self.members.list(),
            notes: self.notes.list(),
            attendance: self.attendance.list(),
            hours: self.hours.list(),
            events: self.events.list(),
            tasks: self.tasks.list(),
            join_requests: self.join_requests.list(),
            ..Snapshot::default()
        }
    }

    /// Replace store contents with the records in `snapshot`.
    pub fn load_snapshot(&self, snapshot: Snapshot) {
        fn fill<T: Clone + Send + Sync>(store: &Store<T>, items: Vec<T>, id: impl Fn(&T) -> Uuid) {
            store.with_write(|map| {
                map.clear();
                map.extend(items.into_iter().map(|item| (id(&item), item)));
            });
        }
        fill(&self.users, snapshot.users, |r| r.id);
        fill(&self.clubs, snapshot.clubs, |r| r.id);
        fill(&self.members, snapshot.members, |r| r.id);
        fill(&self.notes, snapshot.notes, |r| r.id);
        fill(&self.attendance, snapshot.attendance, |r| r.id);
        fill(&self.hours, snapshot.hours, |r| r.id);
        fill(&self.events, snapshot.events, |r| r.id);
        fill(&self.tasks, snapshot.tasks, |r| r.id);
        fill(&self.join_requests, snapshot.join_requests, |r| r.id);
    }

    /// Hydrate in-memory stores from the configured durable backend.
    ///
    /// Postgres takes precedence when both backends are configured. The
    /// snapshot file, if any, is rewritten from the database on the next
    /// mutation.
    pub async fn hydrate(&self) -> Result<(), String> {
        if self.db_pool.is_some() {
            return self.hydrate_from_db().await;
        }
        if let Some(path) = &self.config.snapshot_path {
            let snapshot = Snapshot::read_or_default(path).map_err(|e| e.to_string())?;
            for issue in snapshot.check() {
                tracing::warn!(%issue, "snapshot integrity issue");
            }
            tracing::info!(
                path = %path.display(),
                clubs = snapshot.clubs.len(),
                users = snapshot.users.len(),
                "Hydrated in-memory stores from snapshot"
            );
            self.load_snapshot(snapshot);
        }
        Ok(())
    }

    /// Hydrate in-memory stores from the database.
    pub async fn hydrate_from_db(&self) -> Result<(), String> {
        let pool = match &self.db_pool {
            Some(pool) => pool,
            None => return Ok(()),
        };

        let snapshot = Snapshot {
            users: crate::db::users::load_all(pool)
                .await
                .map_err(|e| format!("failed to load users: {e}"))?,
            clubs: crate::db::clubs::load_all(pool)
                .await
                .map_err(|e| format!("failed to load clubs: {e}"))?,
            members: crate::db::members::load_all(pool)
                .await
                .map_err(|e| format!("failed to load members: {e}"))?,
            notes: crate::db::notes::load_all(pool)
                .await
                .map_err(|e| format!("failed to load meeting notes: {e}"))?,
            attendance: crate::db::attendance::load_all(pool)
                .await
                .map_err(|e| format!("failed to load attendance: {e}"))?,
            hours: crate::db::hours::load_all(pool)
                .await
                .map_err(|e| format!("failed to load hour entries: {e}"))?,
            events: crate::db::events::load_all(pool)
                .await
                .map_err(|e| format!("failed to load events: {e}"))?,
            tasks: crate::db::tasks::load_all(pool)
                .await
                .map_err(|e| format!("failed to load tasks: {e}"))?,
            join_requests: crate::db::join_requests::load_all(pool)
                .await
                .map_err(|e| format!("failed to load join requests: {e}"))?,
            ..Snapshot::default()
        };

        tracing::info!(
            users = snapshot.users.len(),
            clubs = snapshot.clubs.len(),
            members = snapshot.members.len(),
            notes = snapshot.notes.len(),
            attendance = snapshot.attendance.len(),
            hours = snapshot.hours.len(),
            events = snapshot.events.len(),
            tasks = snapshot.tasks.len(),
            join_requests = snapshot.join_requests.len(),
            "Hydrated in-memory stores from database"
        );
        self.load_snapshot(snapshot);
        Ok(())
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
