//! Fixed policy constants for the abuse guard.
//!
//! These are the only knobs the guard recognizes; there is no runtime
//! configuration.

/// Minimum spacing between accepted submissions from the same client to the
/// same endpoint (seconds).
pub const COOLDOWN_SECS: i64 = 60;

/// Maximum accepted submissions per client within the retention horizon.
pub const SESSION_CAP: u32 = 5;

/// Window during which a normalized email cannot register again (seconds).
pub const EMAIL_SUPPRESSION_SECS: i64 = 86_400;

/// Age threshold after which endpoint and session entries are evicted
/// (seconds).
pub const RETENTION_SECS: i64 = 3_600;

/// Endpoint name for the player registration form.
pub const ENDPOINT_PLAYER: &str = "register-player";

/// Endpoint name for the team registration form.
pub const ENDPOINT_TEAM: &str = "register-team";

/// Endpoint name for the sponsor registration form.
pub const ENDPOINT_SPONSOR: &str = "register-sponsor";

/// All registration endpoints.
pub const ENDPOINTS: [&str; 3] = [ENDPOINT_PLAYER, ENDPOINT_TEAM, ENDPOINT_SPONSOR];
