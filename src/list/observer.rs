//! Per-row measurement lifecycle with debounced resize commits.
//!
//! Each mounted row owns at most one pending measurement. A resize observation
//! (re)arms the row's deadline with the latest height; [`ResizeObserverBridge::take_due`]
//! hands back every measurement whose quiet period elapsed. Detaching a row
//! drops its observation and its pending timer together, so a late callback
//! for that row finds nothing to commit.
//!
//! Timers are deadlines polled by the owner, never threads or blocking waits.

use super::types::RowHeight;
use crate::model::MessageId;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Measurement lifecycle of a row.
///
/// `Estimated → Measuring → Measured ⇄ Remeasuring`, and `Detached` once the
/// row unmounts. Rows are estimated as they enter the list, so there is no
/// observable state before `Estimated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowPhase {
    /// Laid out with an estimated height, never mounted since the last reset.
    Estimated,
    /// Mounted, observer attached, first measurement not committed yet.
    Measuring,
    /// Mounted with a committed measurement.
    Measured,
    /// Mounted with a debounced size change waiting to commit.
    Remeasuring,
    /// Unmounted after being measured; the cached height is left stale.
    Detached,
}

/// A measurement whose debounce window elapsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DueMeasurement {
    /// Row identity.
    pub id: MessageId,
    /// Latest observed height.
    pub height: RowHeight,
}

#[derive(Debug, Clone, Copy)]
struct PendingTimer {
    height: RowHeight,
    deadline: Instant,
    /// Arm order, breaks deadline ties.
    seq: u64,
}

#[derive(Debug, Clone, Copy)]
struct Observation {
    phase: RowPhase,
    pending: Option<PendingTimer>,
}

/// Observers and debounce timers for mounted rows, keyed by row identity.
#[derive(Debug, Clone)]
pub struct ResizeObserverBridge {
    rows: HashMap<MessageId, Observation>,
    debounce: Duration,
    next_seq: u64,
}

impl ResizeObserverBridge {
    /// Create a bridge with the given debounce window.
    pub fn new(debounce: Duration) -> Self {
        Self {
            rows: HashMap::new(),
            debounce,
            next_seq: 0,
        }
    }

    /// Attach an observer. Returns false if the row was already attached.
    pub fn attach(&mut self, id: &MessageId) -> bool {
        if self.rows.contains_key(id) {
            return false;
        }
        self.rows.insert(
            id.clone(),
            Observation {
                phase: RowPhase::Measuring,
                pending: None,
            },
        );
        true
    }

    /// Mark the synchronous first measurement as committed.
    pub fn mark_measured(&mut self, id: &MessageId) {
        if let Some(obs) = self.rows.get_mut(id) {
            if obs.pending.is_none() {
                obs.phase = RowPhase::Measured;
            }
        }
    }

    /// Disconnect the observer and cancel its pending timer in one step.
    ///
    /// Returns true if a pending measurement was discarded.
    pub fn detach(&mut self, id: &MessageId) -> bool {
        self.rows
            .remove(id)
            .is_some_and(|obs| obs.pending.is_some())
    }

    /// Arm (or re-arm) the debounce timer with the latest observed height.
    ///
    /// Returns false, doing nothing, if the row is not attached.
    pub fn schedule(&mut self, id: &MessageId, height: RowHeight, now: Instant) -> bool {
        let Some(obs) = self.rows.get_mut(id) else {
            return false;
        };
        obs.pending = Some(PendingTimer {
            height,
            deadline: now + self.debounce,
            seq: self.next_seq,
        });
        obs.phase = RowPhase::Remeasuring;
        self.next_seq += 1;
        true
    }

    /// Drop a pending timer without detaching (the observed size settled back).
    pub fn cancel_pending(&mut self, id: &MessageId) {
        if let Some(obs) = self.rows.get_mut(id) {
            if obs.pending.take().is_some() {
                obs.phase = RowPhase::Measured;
            }
        }
    }

    /// Remove and return every measurement due at `now`, ordered by deadline then arm order.
    pub fn take_due(&mut self, now: Instant) -> Vec<DueMeasurement> {
        let mut due: Vec<(Instant, u64, DueMeasurement)> = Vec::new();
        for (id, obs) in self.rows.iter_mut() {
            let Some(timer) = obs.pending else {
                continue;
            };
            if timer.deadline <= now {
                obs.pending = None;
                obs.phase = RowPhase::Measured;
                due.push((
                    timer.deadline,
                    timer.seq,
                    DueMeasurement {
                        id: id.clone(),
                        height: timer.height,
                    },
                ));
            }
        }
        due.sort_by_key(|(deadline, seq, _)| (*deadline, *seq));
        due.into_iter().map(|(_, _, m)| m).collect()
    }

    /// Earliest pending deadline, for the owner's poll timeout.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.rows
            .values()
            .filter_map(|obs| obs.pending.map(|t| t.deadline))
            .min()
    }

    /// Cancel every pending timer; attached rows go back to `Measuring`
    /// until the binding measures them again.
    pub fn reset_measurements(&mut self) {
        for obs in self.rows.values_mut() {
            obs.pending = None;
            obs.phase = RowPhase::Measuring;
        }
    }

    /// Whether the row has an attached observer.
    pub fn is_attached(&self, id: &MessageId) -> bool {
        self.rows.contains_key(id)
    }

    /// Phase of an attached row; `None` when not attached.
    pub fn phase(&self, id: &MessageId) -> Option<RowPhase> {
        self.rows.get(id).map(|obs| obs.phase)
    }

    /// Ids of attached rows, in no particular order.
    pub fn attached_ids(&self) -> impl Iterator<Item = &MessageId> {
        self.rows.keys()
    }
}
