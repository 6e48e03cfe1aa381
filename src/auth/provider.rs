use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use super::{AuthError, AuthErrorCode, Identity, IdentityNotifier};

pub const MIN_PASSWORD_LEN: usize = 6;
pub const MAX_FAILED_SIGN_INS: u32 = 5;

/// The two imperative operations the client consumes, plus sign-out. Successful calls
/// are reflected through `notifier()`, never through the return value alone.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError>;
    async fn create_account(&self, email: &str, password: &str) -> Result<Identity, AuthError>;
    async fn sign_out(&self) -> Result<(), AuthError>;
    fn notifier(&self) -> IdentityNotifier;
}

#[derive(Debug, Clone)]
struct Account {
    uid: String,
    password: String,
    disabled: bool,
    failed_attempts: u32,
}

/// Local accounts table. Used for development runs and tests; behaves like a hosted
/// provider as far as error classification goes.
#[derive(Debug)]
pub struct InMemoryIdentityProvider {
    accounts: Mutex<HashMap<String, Account>>,
    notifier: IdentityNotifier,
}

impl Default for InMemoryIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryIdentityProvider {
    /// The notifier stays unresolved until `start()`, mirroring a provider that is still
    /// restoring its persisted session.
    pub fn new() -> Self {
        Self {
            accounts: Mutex::new(HashMap::new()),
            notifier: IdentityNotifier::new(),
        }
    }

    /// Resolves the initial emission. There is never a persisted session here.
    pub fn start(&self) {
        if self.notifier.current().is_none() {
            self.notifier.publish(None);
        }
    }

    /// Seeds an account without touching the current session. Replaces any existing
    /// account for the same email.
    pub fn register(&self, email: &str, password: &str) -> Identity {
        let key = normalize(email);
        let uid = insert_account(&mut self.lock(), &key, password);
        Identity::new(uid, Some(key))
    }

    pub fn disable(&self, email: &str) {
        if let Some(account) = self.lock().get_mut(&normalize(email)) {
            account.disabled = true;
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Account>> {
        // A poisoned table is still a consistent table: every mutation is a single insert
        // or field write.
        self.accounts.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn check_sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthErrorCode> {
        if !looks_like_email(email) {
            return Err(AuthErrorCode::InvalidEmail);
        }
        let key = normalize(email);
        let mut accounts = self.lock();
        let account = accounts.get_mut(&key).ok_or(AuthErrorCode::UserNotFound)?;

        if account.disabled {
            return Err(AuthErrorCode::UserDisabled);
        }
        if account.failed_attempts >= MAX_FAILED_SIGN_INS {
            return Err(AuthErrorCode::TooManyRequests);
        }
        if account.password != password {
            account.failed_attempts += 1;
            return Err(AuthErrorCode::WrongPassword);
        }

        account.failed_attempts = 0;
        Ok(Identity::new(account.uid.clone(), Some(key)))
    }
}

#[async_trait]
impl IdentityProvider for InMemoryIdentityProvider {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        match self.check_sign_in(email, password) {
            Ok(identity) => {
                info!(uid = identity.uid(), "Signed in");
                self.notifier.publish(Some(identity.clone()));
                Ok(identity)
            }
            Err(code) => {
                debug!(%code, "Sign-in rejected");
                Err(AuthError::new(code))
            }
        }
    }

    async fn create_account(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        if !looks_like_email(email) {
            return Err(AuthErrorCode::InvalidEmail.into());
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthErrorCode::WeakPassword.into());
        }
        let key = normalize(email);
        let identity = {
            let mut accounts = self.lock();
            if accounts.contains_key(&key) {
                return Err(AuthErrorCode::EmailAlreadyInUse.into());
            }
            let uid = insert_account(&mut accounts, &key, password);
            Identity::new(uid, Some(key))
        };
        info!(uid = identity.uid(), "Account created");
        // Creating an account also signs the new user in.
        self.notifier.publish(Some(identity.clone()));
        Ok(identity)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.notifier.publish(None);
        Ok(())
    }

    fn notifier(&self) -> IdentityNotifier {
        self.notifier.clone()
    }
}

fn insert_account(accounts: &mut HashMap<String, Account>, key: &str, password: &str) -> String {
    let uid = Uuid::new_v4().to_string();
    accounts.insert(
        key.to_string(),
        Account {
            uid: uid.clone(),
            password: password.to_string(),
            disabled: false,
            failed_attempts: 0,
        },
    );
    uid
}

fn normalize(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

fn looks_like_email(email: &str) -> bool {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && domain.contains('.')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    }
}
