//! Tourney Guard - Abuse prevention for the tournament registration site
//!
//! Provides protection against:
//! - Rapid resubmission (per-endpoint cooldown)
//! - Bulk registration (per-session cap)
//! - Duplicate sign-ups (cross-client email suppression)
//!
//! State lives in process memory and resets on restart. The hosting
//! platform's request handlers share one [`AbuseGuard`] instance: call
//! [`AbuseGuard::decide`] before processing a submission and
//! [`AbuseGuard::record`] once it validates. Routing, JSON parsing, CORS
//! and email delivery stay with the handlers; this crate only consumes a
//! derived client id, an endpoint name and the submitted email.

pub mod client;
pub mod constants;
pub mod guard;
pub mod validation;

pub use client::{derive_client_id, forwarded_client_ip};
pub use guard::{AbuseGuard, Decision, GuardStats, LimitReason, RecordOutcome};
pub use validation::{required_fields, validate_payload, ValidationError};
