//! Sign-up, login and the bearer sessions that gate the notes endpoints.

pub mod sessions;
pub mod store;

use serde::Deserialize;

use crate::error::AccountError;

pub use sessions::{LoginSession, SessionRegistry};
pub use store::{User, UserStore};

pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SignupForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl SignupForm {
    /// Collects every problem instead of stopping at the first.
    pub fn problems(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.username.trim().is_empty() {
            errors.push("Username is required".to_string());
        }
        if self.email.trim().is_empty() {
            errors.push("Email is required".to_string());
        } else if !self.email.contains('@') {
            errors.push("Invalid email format".to_string());
        }
        if self.password.is_empty() {
            errors.push("Password is required".to_string());
        } else if self.password.chars().count() < MIN_PASSWORD_LEN {
            errors.push(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LEN
            ));
        }
        if self.password != self.confirm_password {
            errors.push("Passwords do not match".to_string());
        }
        errors
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub remember: bool,
}

pub struct Accounts {
    users: UserStore,
    sessions: SessionRegistry,
}

impl Accounts {
    pub fn new(users: UserStore, sessions: SessionRegistry) -> Self {
        Self { users, sessions }
    }

    pub fn signup(&self, form: &SignupForm) -> Result<User, AccountError> {
        let mut errors = form.problems();

        let username = form.username.trim();
        let email = form.email.trim();
        if !username.is_empty() || !email.is_empty() {
            let (username_taken, email_taken) = self.users.conflicts(username, email)?;
            if username_taken {
                errors.push("Username already exists".to_string());
            }
            if email_taken {
                errors.push("Email already exists".to_string());
            }
        }

        if !errors.is_empty() {
            return Err(AccountError::Validation(errors));
        }

        let user = self.users.insert(username, email, &form.password)?;
        log::info!("Created account '{}'", user.username);
        Ok(user)
    }

    pub fn login(&self, form: &LoginForm) -> Result<LoginSession, AccountError> {
        let user = self.users.verify(form.username.trim(), &form.password)?;
        Ok(self.sessions.issue(user.id, &user.username, form.remember))
    }

    pub fn logout(&self, token: &str) -> bool {
        self.sessions.revoke(token)
    }

    pub fn authenticate(&self, token: &str) -> Result<LoginSession, AccountError> {
        self.sessions
            .resolve(token)
            .ok_or(AccountError::Unauthenticated)
    }

    pub fn active_sessions(&self) -> usize {
        self.sessions.active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn accounts() -> Accounts {
        Accounts::new(
            UserStore::in_memory().unwrap(),
            SessionRegistry::new(Duration::hours(12), Duration::days(30)),
        )
    }

    fn form(username: &str, email: &str, password: &str, confirm: &str) -> SignupForm {
        SignupForm {
            username: username.into(),
            email: email.into(),
            password: password.into(),
            confirm_password: confirm.into(),
        }
    }

    #[test]
    fn empty_form_reports_every_missing_field() {
        let problems = SignupForm::default().problems();
        assert_eq!(
            problems,
            vec!["Username is required", "Email is required", "Password is required"]
        );
    }

    #[test]
    fn malformed_form_reports_each_rule() {
        let problems = form("ada", "ada.example.com", "short", "shorter").problems();
        assert!(problems.contains(&"Invalid email format".to_string()));
        assert!(problems.contains(&"Password must be at least 8 characters".to_string()));
        assert!(problems.contains(&"Passwords do not match".to_string()));
    }

    #[test]
    fn duplicate_signup_is_rejected() {
        let accounts = accounts();
        accounts
            .signup(&form("ada", "ada@example.com", "analytical", "analytical"))
            .unwrap();

        let err = accounts
            .signup(&form("ada", "ada@example.com", "analytical", "analytical"))
            .unwrap_err();
        match err {
            AccountError::Validation(errors) => {
                assert!(errors.contains(&"Username already exists".to_string()));
                assert!(errors.contains(&"Email already exists".to_string()));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn login_then_logout() {
        let accounts = accounts();
        accounts
            .signup(&form("ada", "ada@example.com", "analytical", "analytical"))
            .unwrap();

        let session = accounts
            .login(&LoginForm {
                username: "ada".into(),
                password: "analytical".into(),
                remember: false,
            })
            .unwrap();
        assert_eq!(accounts.authenticate(&session.token).unwrap().username, "ada");

        assert!(accounts.logout(&session.token));
        assert!(matches!(
            accounts.authenticate(&session.token),
            Err(AccountError::Unauthenticated)
        ));
    }

    #[test]
    fn bad_password_is_invalid_credentials() {
        let accounts = accounts();
        accounts
            .signup(&form("ada", "ada@example.com", "analytical", "analytical"))
            .unwrap();
        let err = accounts
            .login(&LoginForm {
                username: "ada".into(),
                password: "engine".into(),
                remember: true,
            })
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid username or password");
    }
}
