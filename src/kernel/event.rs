use crate::auth::{AuthError, Identity};
use crate::kernel::session::Route;
use crate::services::SummarizeError;
use crate::workflow::RequestSeq;

/// Identity of one mounted view instance. A view that is navigated away from never gets
/// its id back, so late completions addressed to it can be recognised and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MountId(pub u64);

#[derive(Debug, Clone)]
pub enum Event {
    /// Something the user did.
    Input(UserInput),
    /// Relayed from the identity provider's notifier.
    IdentityChanged(Option<Identity>),
    AuthSettled {
        mount: MountId,
        outcome: Result<Identity, AuthError>,
    },
    SummarySettled {
        mount: MountId,
        seq: RequestSeq,
        outcome: Result<String, SummarizeError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserInput {
    Navigate(Route),
    EditEmail(String),
    EditPassword(String),
    TogglePasswordVisibility,
    SubmitCredentials,
    EditNotes(String),
    LoadSample,
    Summarize,
    SignOut,
}

impl From<UserInput> for Event {
    fn from(input: UserInput) -> Self {
        Event::Input(input)
    }
}
