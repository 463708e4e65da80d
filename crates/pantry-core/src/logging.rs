//! Structured logging field names for pantry.
//!
//! Spans declare these fields as empty and fill them in with
//! `Span::record` once the value is known, so log aggregation can query
//! by the same names across subsystems. Every event also carries the
//! `subsystem`, `component` and `op` identity fields.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires operator attention |
//! | WARN  | Recoverable issue, automatic fallback applied |
//! | INFO  | Lifecycle events (startup, seeding, migrations) |
//! | DEBUG | Tier decisions, intermediate values, config choices |
//! | TRACE | Per-candidate data (scores, similarities) |

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Normalized item text being categorized.
pub const ITEM: &str = "item";

/// Category identifier produced by a resolution.
pub const CATEGORY_ID: &str = "category_id";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";
