use tokio::sync::mpsc;
use tracing::{debug, info};

use super::event::{Event, MountId, UserInput};
use super::session::{Route, RouteDecision, SessionGate, SessionKind, SessionStatus, View};
use super::telemetry::{DiscardReason, TelemetryEvent, TelemetryRecorder};
use crate::auth::{AuthAttempt, AuthError, CredentialForm, FormOutcome, Identity};
use crate::services::SummarizeError;
use crate::workflow::{RequestSeq, SummarizationWorkflow, SummaryRequest, SAMPLE_NOTES};

/// Redirects never chain more than root -> login or login -> root.
const MAX_REDIRECTS: usize = 2;

#[derive(Debug, Clone)]
pub struct ReactorConfig {
    pub sample_notes: String,
    pub telemetry_capacity: usize,
}

impl Default for ReactorConfig {
    fn default() -> Self {
        Self {
            sample_notes: SAMPLE_NOTES.to_string(),
            telemetry_capacity: super::telemetry::recorder::MAX_EVENTS,
        }
    }
}

/// Work the reactor wants done outside itself. Executed by the driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SideEffect {
    Authenticate { mount: MountId, attempt: AuthAttempt },
    RequestSummary { mount: MountId, request: SummaryRequest },
    SignOut,
}

#[derive(Debug, Clone)]
pub enum Screen {
    Waiting,
    Form(CredentialForm),
    Workflow(SummarizationWorkflow),
}

impl Screen {
    pub fn view(&self) -> View {
        match self {
            Screen::Waiting => View::Waiting,
            Screen::Form(form) => View::Form(form.mode()),
            Screen::Workflow(_) => View::Workflow,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MountedView {
    pub id: MountId,
    pub screen: Screen,
}

/// The client kernel. Owns the session gate, the current location and the one mounted
/// view; consumes events and returns side effects. Never awaits I/O.
pub struct Reactor {
    pub receiver: mpsc::Receiver<Event>,
    pub gate: SessionGate,
    pub telemetry: TelemetryRecorder,
    config: ReactorConfig,
    location: Route,
    view: MountedView,
    next_mount: u64,
}

impl Reactor {
    pub fn new(receiver: mpsc::Receiver<Event>, initial: Route, config: ReactorConfig) -> Self {
        let telemetry = TelemetryRecorder::with_capacity(config.telemetry_capacity);
        let mut reactor = Self {
            receiver,
            gate: SessionGate::new(),
            telemetry,
            config,
            location: initial,
            view: MountedView {
                id: MountId(0),
                screen: Screen::Waiting,
            },
            next_mount: 1,
        };
        reactor.reconcile();
        reactor
    }

    pub fn location(&self) -> Route {
        self.location
    }

    pub fn view(&self) -> &MountedView {
        &self.view
    }

    pub fn session(&self) -> SessionStatus {
        self.gate.current_status()
    }

    pub fn session_kind(&self) -> SessionKind {
        self.gate.kind()
    }

    pub fn form(&self) -> Option<&CredentialForm> {
        match &self.view.screen {
            Screen::Form(form) => Some(form),
            _ => None,
        }
    }

    pub fn workflow(&self) -> Option<&SummarizationWorkflow> {
        match &self.view.screen {
            Screen::Workflow(workflow) => Some(workflow),
            _ => None,
        }
    }

    /// Applies a batch of events in arrival order.
    pub fn tick_step(&mut self, events: Vec<Event>) -> Vec<SideEffect> {
        let mut effects = Vec::new();
        for event in events {
            effects.extend(self.step(event));
        }
        effects
    }

    pub fn step(&mut self, event: Event) -> Vec<SideEffect> {
        match event {
            Event::Input(input) => self.handle_input(input),
            Event::IdentityChanged(identity) => {
                if let Some((from, to)) = self.gate.observe(identity) {
                    self.telemetry
                        .record(TelemetryEvent::SessionResolved { from, to });
                    self.reconcile();
                }
                Vec::new()
            }
            Event::AuthSettled { mount, outcome } => {
                self.settle_auth(mount, outcome);
                Vec::new()
            }
            Event::SummarySettled { mount, seq, outcome } => {
                self.settle_summary(mount, seq, outcome);
                Vec::new()
            }
        }
    }

    fn handle_input(&mut self, input: UserInput) -> Vec<SideEffect> {
        match input {
            UserInput::Navigate(to) => {
                info!(from = %self.location, %to, "Navigate");
                self.location = to;
                self.telemetry.record(TelemetryEvent::Navigated { to });
                self.reconcile();
                return Vec::new();
            }
            UserInput::SignOut => {
                if self.gate.kind() == SessionKind::Authenticated {
                    return vec![SideEffect::SignOut];
                }
                return Vec::new();
            }
            _ => {}
        }

        let mount = self.view.id;
        match (input, &mut self.view.screen) {
            (UserInput::EditEmail(email), Screen::Form(form)) => form.edit_email(email),
            (UserInput::EditPassword(password), Screen::Form(form)) => form.edit_password(password),
            (UserInput::TogglePasswordVisibility, Screen::Form(form)) => {
                form.toggle_password_visibility()
            }
            (UserInput::SubmitCredentials, Screen::Form(form)) => {
                if let Some(attempt) = form.begin_submit() {
                    self.telemetry
                        .record(TelemetryEvent::AuthAttempted { mode: attempt.mode });
                    return vec![SideEffect::Authenticate { mount, attempt }];
                }
            }

            (UserInput::EditNotes(text), Screen::Workflow(workflow)) => {
                workflow.set_note_text(text);
            }
            (UserInput::LoadSample, Screen::Workflow(workflow)) => workflow.load_sample(),
            (UserInput::Summarize, Screen::Workflow(workflow)) => {
                // The submit control is disabled while pending.
                if !workflow.can_submit() {
                    return Vec::new();
                }
                if let Some(request) = workflow.begin_submit() {
                    self.telemetry
                        .record(TelemetryEvent::SummaryRequested { seq: request.seq.0 });
                    return vec![SideEffect::RequestSummary { mount, request }];
                }
            }

            (input, screen) => {
                debug!(?input, view = ?screen.view(), "Input not handled by current view");
            }
        }
        Vec::new()
    }

    fn settle_auth(&mut self, mount: MountId, outcome: Result<Identity, AuthError>) {
        let form = match &mut self.view.screen {
            Screen::Form(form) if self.view.id == mount => form,
            _ => {
                debug!(?mount, "Auth completion for unmounted view dropped");
                self.telemetry.record(TelemetryEvent::CompletionDiscarded {
                    reason: DiscardReason::Unmounted,
                });
                return;
            }
        };

        let mode = form.mode();
        let code = outcome.as_ref().err().map(|e| e.code.as_str().to_string());
        if let FormOutcome::Rejected(message) = form.complete(outcome) {
            debug!(?mode, message, "Form error shown");
        }
        self.telemetry
            .record(TelemetryEvent::AuthSettled { mode, code });
    }

    fn settle_summary(
        &mut self,
        mount: MountId,
        seq: RequestSeq,
        outcome: Result<String, SummarizeError>,
    ) {
        let workflow = match &mut self.view.screen {
            Screen::Workflow(workflow) if self.view.id == mount => workflow,
            _ => {
                debug!(?mount, seq = seq.0, "Summary for unmounted view dropped");
                self.telemetry.record(TelemetryEvent::CompletionDiscarded {
                    reason: DiscardReason::Unmounted,
                });
                return;
            }
        };

        let ok = outcome.as_ref().map(|s| !s.is_empty()).unwrap_or(false);
        if workflow.complete(seq, outcome) {
            self.telemetry
                .record(TelemetryEvent::SummarySettled { seq: seq.0, ok });
        } else {
            self.telemetry.record(TelemetryEvent::CompletionDiscarded {
                reason: DiscardReason::Superseded,
            });
        }
    }

    /// Re-evaluates the routing policy for the current location and remounts the view if
    /// the rendered kind changed. A view whose kind is unchanged keeps its state.
    fn reconcile(&mut self) {
        let mut target = None;
        for _ in 0..=MAX_REDIRECTS {
            match self.gate.resolve(self.location) {
                RouteDecision::Render(view) => {
                    target = Some(view);
                    break;
                }
                RouteDecision::Redirect(to) => {
                    info!(from = %self.location, %to, "Redirect");
                    self.location = to;
                }
            }
        }
        let target = target.unwrap_or(View::Waiting);

        if self.view.screen.view() == target {
            return;
        }

        let screen = match target {
            View::Waiting => Screen::Waiting,
            View::Form(mode) => Screen::Form(CredentialForm::new(mode)),
            View::Workflow => {
                Screen::Workflow(SummarizationWorkflow::with_sample(self.config.sample_notes.clone()))
            }
        };
        let id = MountId(self.next_mount);
        self.next_mount += 1;
        debug!(?id, view = ?target, "Mounted view");
        self.view = MountedView { id, screen };
    }
}
