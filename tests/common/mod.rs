#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use notewise::auth::{AuthError, AuthErrorCode, Identity, IdentityNotifier, IdentityProvider};
use notewise::services::{SummarizeError, Summarizer};

/// Provider that answers every call with a fixed error code, or signs in `ok@test.com`.
pub struct ScriptedProvider {
    pub failure: Option<AuthErrorCode>,
    pub notifier: IdentityNotifier,
    pub calls: Mutex<Vec<(String, String, &'static str)>>,
}

impl ScriptedProvider {
    pub fn failing(code: AuthErrorCode) -> Self {
        let notifier = IdentityNotifier::new();
        notifier.publish(None);
        Self {
            failure: Some(code),
            notifier,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn accepting() -> Self {
        let notifier = IdentityNotifier::new();
        notifier.publish(None);
        Self {
            failure: None,
            notifier,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn answer(&self, email: &str, password: &str, op: &'static str) -> Result<Identity, AuthError> {
        self.calls
            .lock()
            .unwrap()
            .push((email.to_string(), password.to_string(), op));
        match &self.failure {
            Some(code) => Err(AuthError::new(code.clone())),
            None => {
                let identity = Identity::new("uid-ok", Some(email.to_string()));
                self.notifier.publish(Some(identity.clone()));
                Ok(identity)
            }
        }
    }
}

#[async_trait]
impl IdentityProvider for ScriptedProvider {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        self.answer(email, password, "sign_in")
    }

    async fn create_account(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        self.answer(email, password, "create_account")
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.notifier.publish(None);
        Ok(())
    }

    fn notifier(&self) -> IdentityNotifier {
        self.notifier.clone()
    }
}

/// Summarizer that replays queued outcomes in order and records what it was sent.
#[derive(Default)]
pub struct ScriptedSummarizer {
    outcomes: Mutex<VecDeque<Result<String, SummarizeError>>>,
    pub sent: Mutex<Vec<String>>,
}

impl ScriptedSummarizer {
    pub fn new(outcomes: Vec<Result<String, SummarizeError>>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into()),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Summarizer for ScriptedSummarizer {
    async fn summarize(&self, text: &str) -> Result<String, SummarizeError> {
        self.sent.lock().unwrap().push(text.to_string());
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(SummarizeError::MissingSummary))
    }
}
