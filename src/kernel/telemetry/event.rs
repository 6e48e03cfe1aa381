use serde::{Deserialize, Serialize};

use crate::auth::FormMode;
use crate::kernel::session::{Route, SessionKind};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TelemetryEvent {
    SessionResolved {
        from: SessionKind,
        to: SessionKind,
    },
    Navigated {
        to: Route,
    },
    AuthAttempted {
        mode: FormMode,
    },
    AuthSettled {
        mode: FormMode,
        /// `None` on success.
        code: Option<String>,
    },
    SummaryRequested {
        seq: u64,
    },
    SummarySettled {
        seq: u64,
        ok: bool,
    },
    CompletionDiscarded {
        reason: DiscardReason,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiscardReason {
    /// The view that issued the call is gone.
    Unmounted,
    /// A newer summarization request superseded this one.
    Superseded,
}
