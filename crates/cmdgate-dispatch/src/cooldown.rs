//! Per-user command cooldowns.

use cmdgate_common::UserId;
use moka::sync::Cache;
use moka::Expiry;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

use crate::clock::{Clock, SystemClock};
use crate::command::Command;

/// Cooldown key: (command name, user id).
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
struct CooldownKey {
    command: String,
    user: UserId,
}

/// An active cooldown window.
#[derive(Debug, Clone, Copy)]
struct CooldownWindow {
    /// Unix millis at which the window closes.
    expires_at: i64,
    /// Window length, used as the cache entry's time to live.
    length: Duration,
}

impl CooldownWindow {
    fn starting_at(now: i64, length: Duration) -> Self {
        let millis = i64::try_from(length.as_millis()).unwrap_or(i64::MAX);
        Self {
            expires_at: now.saturating_add(millis),
            length,
        }
    }
}

/// Evicts a window once its cooldown has elapsed.
struct WindowExpiry;

impl Expiry<CooldownKey, CooldownWindow> for WindowExpiry {
    fn expire_after_create(
        &self,
        _key: &CooldownKey,
        value: &CooldownWindow,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.length)
    }

    fn expire_after_update(
        &self,
        _key: &CooldownKey,
        value: &CooldownWindow,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.length)
    }
}

/// Tracks cooldown windows per command and user.
///
/// Windows live in an expiring cache and are evicted once they close, so the
/// table only ever holds open windows and does not grow with the number of
/// users ever seen. The cache has no size bound: an open window is never
/// dropped to make room for another. Whether a window is
/// still open is decided against the injected [`Clock`]; an entry the cache has
/// not evicted yet but whose expiry has passed counts as absent.
pub struct CooldownTracker {
    windows: Cache<CooldownKey, CooldownWindow>,
    clock: Arc<dyn Clock>,
}

impl CooldownTracker {
    /// Creates a tracker using the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Creates a tracker reading time from `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        let windows = Cache::builder()
            .expire_after(WindowExpiry)
            .build();
        Self { windows, clock }
    }

    /// Checks whether `user` is throttled on `command`.
    ///
    /// Returns the remaining whole seconds (rounded up) while a window is
    /// open, without extending it. Otherwise opens a new window of the
    /// command's cooldown and returns `None`. Commands without a cooldown are
    /// never throttled.
    pub fn check(&self, user: UserId, command: &dyn Command) -> Option<u64> {
        let cooldown = command.cooldown().filter(|cooldown| !cooldown.is_zero())?;
        self.check_window(user, command.name(), cooldown)
    }

    /// [`check`](Self::check) with an explicit command name and cooldown.
    pub fn check_window(&self, user: UserId, command: &str, cooldown: Duration) -> Option<u64> {
        if cooldown.is_zero() {
            return None;
        }

        let now = self.clock.now_millis();
        let key = CooldownKey {
            command: command.to_string(),
            user,
        };
        let fresh = CooldownWindow::starting_at(now, cooldown);

        let entry = self.windows.entry(key.clone()).or_insert(fresh);
        if entry.is_fresh() {
            trace!(command, %user, "Opened cooldown window");
            return None;
        }

        let current = entry.into_value();
        if current.expires_at <= now {
            self.windows.insert(key, fresh);
            trace!(command, %user, "Reopened expired cooldown window");
            return None;
        }

        let remaining_ms = u64::try_from(current.expires_at - now).unwrap_or(0);
        let remaining = remaining_ms.div_ceil(1000);
        debug!(command, %user, remaining, "User is on cooldown");
        Some(remaining)
    }

    /// Closes the window for one user and command.
    pub fn reset(&self, user: UserId, command: &str) {
        self.windows.invalidate(&CooldownKey {
            command: command.to_string(),
            user,
        });
    }

    /// Clear all cooldowns for a specific command
    pub fn clear_command(&self, command: &str) {
        let keys: Vec<Arc<CooldownKey>> = self
            .windows
            .iter()
            .filter(|(key, _)| key.command == command)
            .map(|(key, _)| key)
            .collect();

        for key in keys {
            self.windows.invalidate(key.as_ref());
        }

        debug!("Cleared all cooldowns for command '{}'", command);
    }

    /// Clear all cooldowns for a specific user
    pub fn clear_user(&self, user: UserId) {
        let keys: Vec<Arc<CooldownKey>> = self
            .windows
            .iter()
            .filter(|(key, _)| key.user == user)
            .map(|(key, _)| key)
            .collect();

        for key in keys {
            self.windows.invalidate(key.as_ref());
        }

        debug!("Cleared all cooldowns for user {}", user);
    }

    /// Approximate number of tracked windows.
    pub fn active_windows(&self) -> u64 {
        self.windows.entry_count()
    }

    /// Runs the cache's pending eviction work now.
    pub fn run_pending_tasks(&self) {
        self.windows.run_pending_tasks();
    }
}

impl Default for CooldownTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CooldownTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CooldownTracker")
            .field("active_windows", &self.active_windows())
            .field("clock", &self.clock)
            .finish()
    }
}
