//! The shared availability surface every operation coordinates through.
//!
//! The trait is the narrow seam the surrounding service implements against
//! its real database. [`InMemoryStore`] is the bundled implementation used
//! by tests and by hosts that keep scheduling state in process.

use std::collections::HashMap;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::RwLock;
use ulid::Ulid;

use crate::engine::now_ms;
use crate::model::{Appointment, AppointmentStatus, Job, Ms, ServiceLocation, Span};

#[derive(Debug)]
pub enum StoreError {
    /// Transient infrastructure failure. Safe to retry with backoff.
    Unavailable(String),
    /// An exclusion constraint rejected the write; the conflicting
    /// appointment's id is attached.
    Conflict(Ulid),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Unavailable(msg) => write!(f, "store unavailable: {msg}"),
            StoreError::Conflict(id) => write!(f, "conflicts with appointment: {id}"),
        }
    }
}

impl std::error::Error for StoreError {}

/// A conditional status change: applied only when the row's *effective*
/// status matches `expect` at write time.
///
/// Effective means the lazy-expiry predicate is part of the match: a
/// tentative row whose hold has lapsed does not match `expect: Tentative`.
#[derive(Debug, Clone, Copy)]
pub struct StatusTransition {
    pub expect: AppointmentStatus,
    pub set: AppointmentStatus,
    pub clear_hold: bool,
}

impl StatusTransition {
    /// The one transition this core performs: tentative → confirmed.
    pub fn confirm() -> Self {
        Self {
            expect: AppointmentStatus::Tentative,
            set: AppointmentStatus::Confirmed,
            clear_hold: true,
        }
    }
}

/// Read/write query surface over appointments plus the job and location
/// directories they reference.
#[async_trait]
pub trait AvailabilityStore: Send + Sync {
    /// Appointments in `scope_id` whose span overlaps `window`, restricted
    /// to `statuses`. When `Tentative` is requested, only rows whose hold
    /// is still alive at `now` are returned; expired holds are invisible
    /// to every reader. Results are ordered by start time.
    async fn query_appointments(
        &self,
        scope_id: Ulid,
        statuses: &[AppointmentStatus],
        window: Span,
        now: Ms,
    ) -> Result<Vec<Appointment>, StoreError>;

    /// Insert a tentative appointment. Stores enforcing an exclusion
    /// constraint fail `Conflict` when the span overlaps an active
    /// appointment in the same scope.
    async fn insert_tentative(&self, appointment: Appointment) -> Result<Ulid, StoreError>;

    /// Conditionally transition an appointment's status. Returns the
    /// number of rows affected (0 or 1).
    async fn update_if_status(
        &self,
        id: Ulid,
        transition: StatusTransition,
        now: Ms,
    ) -> Result<u64, StoreError>;

    async fn get_job(&self, id: Ulid) -> Result<Option<Job>, StoreError>;

    async fn get_location(&self, id: Ulid) -> Result<Option<ServiceLocation>, StoreError>;
}

/// In-process store. Jobs and locations are read-mostly directory tables;
/// the appointment table sits behind one write lock so check-and-insert
/// and conditional updates are atomic.
pub struct InMemoryStore {
    appointments: RwLock<HashMap<Ulid, Appointment>>,
    jobs: DashMap<Ulid, Job>,
    locations: DashMap<Ulid, ServiceLocation>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            appointments: RwLock::new(HashMap::new()),
            jobs: DashMap::new(),
            locations: DashMap::new(),
        }
    }

    pub fn put_job(&self, job: Job) {
        self.jobs.insert(job.id, job);
    }

    pub fn put_location(&self, location: ServiceLocation) {
        self.locations.insert(location.id, location);
    }

    /// Insert or replace an appointment row directly, bypassing the
    /// exclusion constraint. Seeding and migration only.
    pub async fn put_appointment(&self, appointment: Appointment) {
        self.appointments
            .write()
            .await
            .insert(appointment.id, appointment);
    }

    pub async fn get(&self, id: &Ulid) -> Option<Appointment> {
        self.appointments.read().await.get(id).cloned()
    }

    pub async fn appointment_count(&self) -> usize {
        self.appointments.read().await.len()
    }

    /// Drop tentative rows whose hold has lapsed. Storage hygiene for an
    /// external janitor; correctness never depends on it running.
    pub async fn purge_expired(&self, now: Ms) -> usize {
        let mut table = self.appointments.write().await;
        let before = table.len();
        table.retain(|_, appt| !appt.is_expired_hold(now));
        before - table.len()
    }

    /// Scope match: the key names either the appointment's technician or
    /// the owning job's team. One opaque routing key serves both the
    /// team-level generator query and the technician-level advisor query.
    fn in_scope(&self, appointment: &Appointment, scope_id: Ulid) -> bool {
        if appointment.technician_id == Some(scope_id) {
            return true;
        }
        self.jobs
            .get(&appointment.job_id)
            .is_some_and(|job| job.team_id == scope_id)
    }
}

#[async_trait]
impl AvailabilityStore for InMemoryStore {
    async fn query_appointments(
        &self,
        scope_id: Ulid,
        statuses: &[AppointmentStatus],
        window: Span,
        now: Ms,
    ) -> Result<Vec<Appointment>, StoreError> {
        let table = self.appointments.read().await;
        let mut hits: Vec<Appointment> = table
            .values()
            .filter(|appt| appt.span.overlaps(&window))
            .filter(|appt| statuses.contains(&appt.status))
            .filter(|appt| {
                appt.status != AppointmentStatus::Tentative || !appt.is_expired_hold(now)
            })
            .filter(|appt| self.in_scope(appt, scope_id))
            .cloned()
            .collect();
        hits.sort_by_key(|appt| (appt.span.start, appt.id));
        Ok(hits)
    }

    async fn insert_tentative(&self, appointment: Appointment) -> Result<Ulid, StoreError> {
        let now = now_ms();
        let scopes: Vec<Ulid> = appointment
            .technician_id
            .into_iter()
            .chain(
                self.jobs
                    .get(&appointment.job_id)
                    .map(|job| job.team_id),
            )
            .collect();

        let mut table = self.appointments.write().await;
        // Exclusion constraint: no active row in the same scope may overlap.
        for existing in table.values() {
            if existing.blocks(now)
                && existing.span.overlaps(&appointment.span)
                && scopes.iter().any(|s| self.in_scope(existing, *s))
            {
                return Err(StoreError::Conflict(existing.id));
            }
        }
        let id = appointment.id;
        table.insert(id, appointment);
        Ok(id)
    }

    async fn update_if_status(
        &self,
        id: Ulid,
        transition: StatusTransition,
        now: Ms,
    ) -> Result<u64, StoreError> {
        let mut table = self.appointments.write().await;
        let Some(appt) = table.get_mut(&id) else {
            return Ok(0);
        };
        if appt.status != transition.expect {
            return Ok(0);
        }
        if transition.expect == AppointmentStatus::Tentative && appt.is_expired_hold(now) {
            return Ok(0);
        }
        appt.status = transition.set;
        if transition.clear_hold {
            appt.hold_expires_at = None;
        }
        Ok(1)
    }

    async fn get_job(&self, id: Ulid) -> Result<Option<Job>, StoreError> {
        Ok(self.jobs.get(&id).map(|entry| entry.value().clone()))
    }

    async fn get_location(&self, id: Ulid) -> Result<Option<ServiceLocation>, StoreError> {
        Ok(self.locations.get(&id).map(|entry| entry.value().clone()))
    }
}
