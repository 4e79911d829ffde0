//! Metric names. The host service installs its own recorder/exporter;
//! this crate only records.

// ── RED metrics (request-driven) ────────────────────────────────

/// Counter: reserve outcomes. Labels: outcome (held, slot_unavailable,
/// invalid_argument, not_found, store_unavailable).
pub const RESERVATIONS_TOTAL: &str = "fieldbook_reservations_total";

/// Counter: confirm outcomes. Labels: outcome (confirmed, expired).
pub const CONFIRMATIONS_TOTAL: &str = "fieldbook_confirmations_total";

/// Counter: travel checks by worst warning. Labels: outcome (conflict,
/// tight, ok, unresolvable).
pub const TRAVEL_CHECKS_TOTAL: &str = "fieldbook_travel_checks_total";

/// Counter: provider estimates absorbed under the fail-open policy.
pub const TRAVEL_PROVIDER_FAILURES_TOTAL: &str = "fieldbook_travel_provider_failures_total";

// ── Latency / volume ────────────────────────────────────────────

/// Histogram: slot generation latency in seconds.
pub const SLOT_GENERATION_DURATION_SECONDS: &str = "fieldbook_slot_generation_duration_seconds";

/// Histogram: slots emitted per generate call.
pub const SLOTS_PER_QUERY: &str = "fieldbook_slots_per_query";
