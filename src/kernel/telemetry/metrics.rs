use std::collections::VecDeque;

use super::event::{DiscardReason, TelemetryEvent};
use crate::kernel::session::SessionKind;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TelemetrySnapshot {
    pub session_stats: SessionStats,
    pub auth_stats: AuthStats,
    pub summary_stats: SummaryStats,
    pub discard_stats: DiscardStats,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionStats {
    pub transitions: u64,
    pub sign_ins_observed: u64,
    pub sign_outs_observed: u64,
    pub navigations: u64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthStats {
    pub attempts: u64,
    pub accepted: u64,
    pub rejected: u64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SummaryStats {
    pub requested: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub success_ratio: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiscardStats {
    pub unmounted: u64,
    pub superseded: u64,
}

pub fn compute_snapshot(events: &VecDeque<TelemetryEvent>) -> TelemetrySnapshot {
    let mut snap = TelemetrySnapshot::default();

    for event in events {
        match event {
            TelemetryEvent::SessionResolved { from, to } => {
                snap.session_stats.transitions += 1;
                match (from, to) {
                    (_, SessionKind::Authenticated) => snap.session_stats.sign_ins_observed += 1,
                    (SessionKind::Authenticated, SessionKind::Unauthenticated) => {
                        snap.session_stats.sign_outs_observed += 1
                    }
                    _ => {}
                }
            }
            TelemetryEvent::Navigated { .. } => snap.session_stats.navigations += 1,
            TelemetryEvent::AuthAttempted { .. } => snap.auth_stats.attempts += 1,
            TelemetryEvent::AuthSettled { code, .. } => match code {
                None => snap.auth_stats.accepted += 1,
                Some(_) => snap.auth_stats.rejected += 1,
            },
            TelemetryEvent::SummaryRequested { .. } => snap.summary_stats.requested += 1,
            TelemetryEvent::SummarySettled { ok, .. } => {
                if *ok {
                    snap.summary_stats.succeeded += 1;
                } else {
                    snap.summary_stats.failed += 1;
                }
            }
            TelemetryEvent::CompletionDiscarded { reason } => match reason {
                DiscardReason::Unmounted => snap.discard_stats.unmounted += 1,
                DiscardReason::Superseded => snap.discard_stats.superseded += 1,
            },
        }
    }

    let settled = snap.summary_stats.succeeded + snap.summary_stats.failed;
    if settled > 0 {
        snap.summary_stats.success_ratio = snap.summary_stats.succeeded as f64 / settled as f64;
    }

    snap
}
