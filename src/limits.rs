//! Hard bounds on inputs. Anything past these is a malformed request,
//! not a business-rule rejection.

use crate::model::{Ms, DAY_MS, HOUR_MS};

/// 2000-01-01T00:00:00Z. Timestamps before this are garbage input.
pub const MIN_VALID_TIMESTAMP_MS: Ms = 946_684_800_000;

/// 3000-01-01T00:00:00Z.
pub const MAX_VALID_TIMESTAMP_MS: Ms = 32_503_680_000_000;

/// A single appointment never spans more than a day.
pub const MAX_APPOINTMENT_DURATION_MS: Ms = DAY_MS;

/// How far around a proposed appointment the advisor searches for
/// adjacent confirmed appointments.
pub const ADJACENCY_WINDOW_MS: Ms = 24 * HOUR_MS;

pub const MAX_CREATED_BY_LEN: usize = 128;
