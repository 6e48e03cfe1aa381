use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tokio::sync::watch;
use tracing::info;

use crate::auth::{FormMode, Identity};

/// The client's belief about who is signed in.
/// Starts at `Checking` and only moves on identity emissions.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub enum SessionStatus {
    #[default]
    Checking,
    Unauthenticated,
    Authenticated(Identity),
}

/// `SessionStatus` without the identity, for logs and telemetry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionKind {
    Checking,
    Unauthenticated,
    Authenticated,
}

impl SessionStatus {
    pub fn kind(&self) -> SessionKind {
        match self {
            SessionStatus::Checking => SessionKind::Checking,
            SessionStatus::Unauthenticated => SessionKind::Unauthenticated,
            SessionStatus::Authenticated(_) => SessionKind::Authenticated,
        }
    }

    pub fn identity(&self) -> Option<&Identity> {
        match self {
            SessionStatus::Authenticated(identity) => Some(identity),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Route {
    Root,
    Login,
    Signup,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown route: {0}")]
pub struct RouteParseError(pub String);

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Route::Root => "/",
            Route::Login => "/login",
            Route::Signup => "/signup",
        }
    }
}

impl FromStr for Route {
    type Err = RouteParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_end_matches('/') {
            "" => Ok(Route::Root),
            "/login" | "login" => Ok(Route::Login),
            "/signup" | "signup" => Ok(Route::Signup),
            other => Err(RouteParseError(other.to_string())),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl FormMode {
    pub fn route(self) -> Route {
        match self {
            FormMode::SignIn => Route::Login,
            FormMode::SignUp => Route::Signup,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum View {
    /// Neutral indicator while the session is unresolved.
    Waiting,
    Workflow,
    Form(FormMode),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    Render(View),
    Redirect(Route),
}

/// Pure routing policy: (status, destination) -> what to show.
pub fn route(status: &SessionStatus, destination: Route) -> RouteDecision {
    use RouteDecision::*;
    use SessionKind::*;

    match (status.kind(), destination) {
        (Checking, Route::Root) => Render(View::Waiting),
        (Authenticated, Route::Root) => Render(View::Workflow),
        (Unauthenticated, Route::Root) => Redirect(Route::Login),

        (Authenticated, Route::Login | Route::Signup) => Redirect(Route::Root),
        (Checking | Unauthenticated, Route::Login) => Render(View::Form(FormMode::SignIn)),
        (Checking | Unauthenticated, Route::Signup) => Render(View::Form(FormMode::SignUp)),
    }
}

/// Owns the session status cell. One writer (the identity relay, through `observe`),
/// any number of readers through `watch`.
#[derive(Debug)]
pub struct SessionGate {
    cell: watch::Sender<SessionStatus>,
}

impl Default for SessionGate {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionGate {
    pub fn new() -> Self {
        let (cell, _rx) = watch::channel(SessionStatus::Checking);
        Self { cell }
    }

    pub fn current_status(&self) -> SessionStatus {
        self.cell.borrow().clone()
    }

    pub fn kind(&self) -> SessionKind {
        self.cell.borrow().kind()
    }

    pub fn watch(&self) -> watch::Receiver<SessionStatus> {
        self.cell.subscribe()
    }

    /// Applies one identity emission. Returns `(from, to)` when the status changed.
    pub fn observe(&self, identity: Option<Identity>) -> Option<(SessionKind, SessionKind)> {
        let next = match identity {
            Some(identity) => SessionStatus::Authenticated(identity),
            None => SessionStatus::Unauthenticated,
        };
        let from = self.kind();
        let changed = self.cell.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });

        if changed {
            let to = self.kind();
            info!(?from, ?to, "Session status changed");
            Some((from, to))
        } else {
            None
        }
    }

    pub fn resolve(&self, destination: Route) -> RouteDecision {
        route(&self.cell.borrow(), destination)
    }
}
