use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{AuthError, AuthErrorCode, Identity, IdentityProvider};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FormMode {
    SignIn,
    SignUp,
}

impl FormMode {
    /// Exactly one message per failure; codes outside the mode's table fall back to the
    /// generic message for the mode.
    pub fn message_for(self, code: &AuthErrorCode) -> &'static str {
        use AuthErrorCode::*;
        match (self, code) {
            (FormMode::SignIn, UserNotFound) => "No account found with this email address.",
            (FormMode::SignIn, WrongPassword) => "Incorrect password. Please try again.",
            (FormMode::SignIn, InvalidEmail) => "Please enter a valid email address.",
            (FormMode::SignIn, UserDisabled) => "This account has been disabled.",
            (FormMode::SignIn, TooManyRequests) => {
                "Too many failed login attempts. Please try again later."
            }
            (FormMode::SignIn, NetworkRequestFailed) => {
                "Network error. Please check your connection."
            }
            (FormMode::SignIn, _) => "Login failed. Please try again.",

            (FormMode::SignUp, EmailAlreadyInUse) => "An account with this email already exists.",
            (FormMode::SignUp, InvalidEmail) => "Please enter a valid email address.",
            (FormMode::SignUp, WeakPassword) => "Password should be at least 6 characters.",
            (FormMode::SignUp, _) => "Signup failed. Please try again.",
        }
    }

    pub fn submit_label(self) -> &'static str {
        match self {
            FormMode::SignIn => "Sign In",
            FormMode::SignUp => "Sign Up",
        }
    }

    pub fn pending_label(self) -> &'static str {
        match self {
            FormMode::SignIn => "Signing in...",
            FormMode::SignUp => "Creating account...",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialInput {
    pub email: String,
    pub password: String,
}

impl CredentialInput {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.email.is_empty() && !self.password.is_empty()
    }
}

/// One attempt handed to the driver. Carries the credentials by value so the form can
/// keep being edited while the provider works.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthAttempt {
    pub mode: FormMode,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormOutcome {
    /// Submission refused locally: a field is empty or an attempt is already running.
    Blocked,
    /// Provider accepted; navigation follows once the session gate observes the identity.
    Accepted(Identity),
    Rejected(&'static str),
}

/// Sign-in and sign-up share this one state machine; `FormMode` decides which provider
/// operation runs and which message table applies.
#[derive(Debug, Clone)]
pub struct CredentialForm {
    mode: FormMode,
    input: CredentialInput,
    error: Option<&'static str>,
    pending: bool,
    password_visible: bool,
}

impl CredentialForm {
    pub fn new(mode: FormMode) -> Self {
        Self {
            mode,
            input: CredentialInput::default(),
            error: None,
            pending: false,
            password_visible: false,
        }
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn input(&self) -> &CredentialInput {
        &self.input
    }

    pub fn error(&self) -> Option<&'static str> {
        self.error
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn can_submit(&self) -> bool {
        !self.pending && self.input.is_complete()
    }

    pub fn edit_email(&mut self, email: impl Into<String>) {
        self.input.email = email.into();
        self.error = None;
    }

    pub fn edit_password(&mut self, password: impl Into<String>) {
        self.input.password = password.into();
        self.error = None;
    }

    pub fn toggle_password_visibility(&mut self) {
        self.password_visible = !self.password_visible;
    }

    pub fn password_visible(&self) -> bool {
        self.password_visible
    }

    pub fn display_password(&self) -> String {
        if self.password_visible {
            self.input.password.clone()
        } else {
            "•".repeat(self.input.password.chars().count())
        }
    }

    /// Enters Pending and hands out the attempt, or `None` when submission is blocked.
    pub fn begin_submit(&mut self) -> Option<AuthAttempt> {
        if !self.can_submit() {
            return None;
        }
        self.pending = true;
        self.error = None;
        Some(AuthAttempt {
            mode: self.mode,
            email: self.input.email.clone(),
            password: self.input.password.clone(),
        })
    }

    /// Leaves Pending whatever the outcome. Success changes nothing else locally.
    pub fn complete(&mut self, outcome: Result<Identity, AuthError>) -> FormOutcome {
        self.pending = false;
        match outcome {
            Ok(identity) => {
                info!(mode = ?self.mode, "Credentials accepted");
                FormOutcome::Accepted(identity)
            }
            Err(err) => {
                warn!(mode = ?self.mode, code = %err.code, "Credentials rejected");
                let message = self.mode.message_for(&err.code);
                self.error = Some(message);
                FormOutcome::Rejected(message)
            }
        }
    }

    pub async fn submit(&mut self, provider: &dyn IdentityProvider) -> FormOutcome {
        let Some(attempt) = self.begin_submit() else {
            return FormOutcome::Blocked;
        };
        let outcome = attempt.run(provider).await;
        self.complete(outcome)
    }
}

impl AuthAttempt {
    pub async fn run(&self, provider: &dyn IdentityProvider) -> Result<Identity, AuthError> {
        match self.mode {
            FormMode::SignIn => provider.sign_in(&self.email, &self.password).await,
            FormMode::SignUp => provider.create_account(&self.email, &self.password).await,
        }
    }
}
