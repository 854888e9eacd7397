//! The abuse guard: in-memory submission limits for the registration forms.
//!
//! Tracks three kinds of facts in process memory: the last accepted
//! submission per (client, endpoint) pair, a per-client session tally, and
//! the last registration per normalized email. Handlers ask [`AbuseGuard::decide`]
//! before processing a submission and [`AbuseGuard::record`] after one
//! validates. Everything is transient; a process restart starts over from
//! empty maps.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Utc;

use crate::constants::{COOLDOWN_SECS, EMAIL_SUPPRESSION_SECS, RETENTION_SECS, SESSION_CAP};

/// Outcome of a pre-submission check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// The submission may proceed.
    Allowed,
    /// The submission is limited with a reason.
    Limited(LimitReason),
}

impl Decision {
    pub fn is_limited(&self) -> bool {
        matches!(self, Decision::Limited(_))
    }

    /// User-facing message; empty for allowed submissions.
    pub fn message(&self) -> String {
        match self {
            Decision::Allowed => String::new(),
            Decision::Limited(reason) => reason.message(),
        }
    }
}

/// Why a submission was turned away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LimitReason {
    /// The same client hit the same endpoint less than a minute ago.
    Cooldown { wait_secs: i64 },
    /// The client reached the per-session registration cap.
    SessionCap,
}

impl LimitReason {
    pub fn message(&self) -> String {
        match self {
            LimitReason::Cooldown { wait_secs } => {
                format!("Please wait {} seconds before submitting again", wait_secs)
            }
            LimitReason::SessionCap => {
                "Maximum 5 registrations allowed per session. Please refresh and try later."
                    .to_string()
            }
        }
    }
}

/// Outcome of recording an accepted submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// Counters updated; the submission counts against future checks.
    Recorded,
    /// The email already registered within the suppression window; nothing
    /// was written.
    DuplicateEmail,
}

impl RecordOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, RecordOutcome::Recorded)
    }
}

/// Per-client registration tally within the retention horizon.
#[derive(Debug, Clone, Copy)]
struct SessionRecord {
    count: u32,
    first_seen: i64,
}

/// Live entry counts across the three maps, for health reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuardStats {
    pub endpoint_entries: usize,
    pub sessions: usize,
    pub emails: usize,
}

#[derive(Debug, Default)]
struct GuardState {
    /// `"{client_id}:{endpoint}"` -> last accepted submission (epoch seconds).
    /// At most one entry per pair; refreshed in place, never accumulated.
    endpoint_last_submit: HashMap<String, i64>,
    /// Client id -> session tally, keyed off the first submission time.
    sessions: HashMap<String, SessionRecord>,
    /// Normalized email -> last registration (epoch seconds). Not swept;
    /// the suppression window outlives the retention horizon and stale
    /// entries age out on read.
    email_last_registered: HashMap<String, i64>,
}

/// Process-wide abuse prevention state.
///
/// One instance per process, injected into handlers (construct it where the
/// router is built and share it). All three maps sit behind a single mutex
/// so the three writes in [`AbuseGuard::record`] become visible together.
#[derive(Debug, Default)]
pub struct AbuseGuard {
    state: Mutex<GuardState>,
}

impl AbuseGuard {
    /// Create a guard with empty maps.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether a submission from `client_id` to `endpoint` may proceed.
    ///
    /// Runs the eviction sweep, then evaluates the per-endpoint cooldown and
    /// the per-session cap, in that order. Never advances counters: calling
    /// this repeatedly without a matching [`AbuseGuard::record`] leaves the
    /// guard unchanged.
    pub fn decide(&self, client_id: &str, endpoint: &str) -> Decision {
        self.decide_at(client_id, endpoint, Utc::now().timestamp())
    }

    /// [`AbuseGuard::decide`] against an explicit timestamp (epoch seconds).
    pub fn decide_at(&self, client_id: &str, endpoint: &str, now: i64) -> Decision {
        let mut state = self.lock();
        Self::evict_stale(&mut state, now);

        if let Some(&last) = state.endpoint_last_submit.get(&endpoint_key(client_id, endpoint)) {
            let elapsed = now - last;
            if elapsed < COOLDOWN_SECS {
                let wait_secs = (COOLDOWN_SECS - elapsed).max(0);
                tracing::debug!(
                    "client {} inside cooldown on {} ({}s left)",
                    client_id,
                    endpoint,
                    wait_secs
                );
                return Decision::Limited(LimitReason::Cooldown { wait_secs });
            }
        }

        if let Some(session) = state.sessions.get(client_id) {
            if session.count >= SESSION_CAP {
                tracing::debug!(
                    "client {} at session cap ({} registrations)",
                    client_id,
                    session.count
                );
                return Decision::Limited(LimitReason::SessionCap);
            }
        }

        Decision::Allowed
    }

    /// Record an accepted submission.
    ///
    /// Re-checks the duplicate-email rule on its own, independent of any
    /// earlier [`AbuseGuard::decide`]: the rule is about the submitted
    /// content, not the submitting client, so it holds across clients and
    /// regardless of caller ordering. A duplicate rejection writes nothing.
    /// On acceptance the endpoint timestamp, the email timestamp and the
    /// session count are updated together under the one lock.
    pub fn record(&self, client_id: &str, endpoint: &str, email: &str) -> RecordOutcome {
        self.record_at(client_id, endpoint, email, Utc::now().timestamp())
    }

    /// [`AbuseGuard::record`] against an explicit timestamp (epoch seconds).
    pub fn record_at(
        &self,
        client_id: &str,
        endpoint: &str,
        email: &str,
        now: i64,
    ) -> RecordOutcome {
        let normalized = normalize_email(email);
        let mut state = self.lock();

        if let Some(&last) = state.email_last_registered.get(&normalized) {
            if now - last < EMAIL_SUPPRESSION_SECS {
                tracing::debug!("duplicate email on {} within suppression window", endpoint);
                return RecordOutcome::DuplicateEmail;
            }
        }

        state
            .endpoint_last_submit
            .insert(endpoint_key(client_id, endpoint), now);
        state.email_last_registered.insert(normalized, now);
        let session = state
            .sessions
            .entry(client_id.to_string())
            .or_insert(SessionRecord {
                count: 0,
                first_seen: now,
            });
        session.count += 1;

        RecordOutcome::Recorded
    }

    /// Evict endpoint and session entries older than the retention horizon.
    ///
    /// [`AbuseGuard::decide`] runs this on every call; it is public so a
    /// background ticker could drive eviction instead without touching the
    /// decision logic. The email map is not swept.
    pub fn sweep(&self) {
        self.sweep_at(Utc::now().timestamp());
    }

    /// [`AbuseGuard::sweep`] against an explicit timestamp (epoch seconds).
    pub fn sweep_at(&self, now: i64) {
        let mut state = self.lock();
        Self::evict_stale(&mut state, now);
    }

    /// Session count for a client, if a session record exists.
    pub fn session_count(&self, client_id: &str) -> Option<u32> {
        self.lock().sessions.get(client_id).map(|record| record.count)
    }

    /// Live entry counts across the three maps.
    pub fn stats(&self) -> GuardStats {
        let state = self.lock();
        GuardStats {
            endpoint_entries: state.endpoint_last_submit.len(),
            sessions: state.sessions.len(),
            emails: state.email_last_registered.len(),
        }
    }

    fn evict_stale(state: &mut GuardState, now: i64) {
        let before = state.endpoint_last_submit.len() + state.sessions.len();
        state
            .endpoint_last_submit
            .retain(|_, &mut last| now - last < RETENTION_SECS);
        state
            .sessions
            .retain(|_, record| now - record.first_seen < RETENTION_SECS);
        let evicted = before - state.endpoint_last_submit.len() - state.sessions.len();
        if evicted > 0 {
            tracing::debug!("evicted {} stale rate-limit entries", evicted);
        }
    }

    // No operation panics while holding the lock, so a poisoned mutex still
    // guards a consistent state.
    fn lock(&self) -> MutexGuard<'_, GuardState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Composite key for the per-(client, endpoint) cooldown map.
fn endpoint_key(client_id: &str, endpoint: &str) -> String {
    format!("{}:{}", client_id, endpoint)
}

/// Lowercase and trim an email for duplicate tracking.
fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
