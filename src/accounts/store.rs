use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use parking_lot::Mutex;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use serde::Serialize;
use std::path::Path;

use crate::error::AccountError;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
}

/// SQLite-backed user table.
pub struct UserStore {
    conn: Mutex<Connection>,
}

impl UserStore {
    pub fn open(db_path: &Path) -> Result<Self, AccountError> {
        Self::init(Connection::open(db_path)?)
    }

    pub fn in_memory() -> Result<Self, AccountError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, AccountError> {
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL UNIQUE,
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL
            );
            ",
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Returns `(username_taken, email_taken)`.
    pub fn conflicts(&self, username: &str, email: &str) -> Result<(bool, bool), AccountError> {
        let conn = self.conn.lock();
        let mut stmt =
            conn.prepare("SELECT username, email FROM users WHERE username = ?1 OR email = ?2")?;
        let rows = stmt.query_map(params![username, email], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut taken = (false, false);
        for row in rows {
            let (u, e) = row?;
            taken.0 |= u == username;
            taken.1 |= e == email;
        }
        Ok(taken)
    }

    pub fn insert(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<User, AccountError> {
        let hash = hash_password(password)?;
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO users (username, email, password_hash) VALUES (?1, ?2, ?3)",
            params![username, email, hash],
        )
        .map_err(unique_violation)?;
        Ok(User {
            id: conn.last_insert_rowid(),
            username: username.to_string(),
            email: email.to_string(),
        })
    }

    /// Look the user up and check the password; both failures look the same
    /// to the caller.
    pub fn verify(&self, username: &str, password: &str) -> Result<User, AccountError> {
        let row = {
            let conn = self.conn.lock();
            conn.query_row(
                "SELECT id, username, email, password_hash FROM users WHERE username = ?1",
                params![username],
                |row| {
                    Ok((
                        User {
                            id: row.get(0)?,
                            username: row.get(1)?,
                            email: row.get(2)?,
                        },
                        row.get::<_, String>(3)?,
                    ))
                },
            )
            .optional()?
        };

        let (user, stored) = row.ok_or(AccountError::InvalidCredentials)?;
        if verify_password(password, &stored) {
            Ok(user)
        } else {
            Err(AccountError::InvalidCredentials)
        }
    }

    #[cfg(test)]
    fn get(&self, id: i64) -> Result<Option<User>, AccountError> {
        let conn = self.conn.lock();
        let user = conn
            .query_row(
                "SELECT id, username, email FROM users WHERE id = ?1",
                params![id],
                |row| {
                    Ok(User {
                        id: row.get(0)?,
                        username: row.get(1)?,
                        email: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(user)
    }
}

/// A concurrent signup can slip past `conflicts`; the UNIQUE index still
/// catches it and the caller gets the same message either way.
fn unique_violation(err: rusqlite::Error) -> AccountError {
    match &err {
        rusqlite::Error::SqliteFailure(e, msg) if e.code == ErrorCode::ConstraintViolation => {
            let detail = msg.as_deref().unwrap_or_default();
            let message = if detail.contains("users.email") {
                "Email already exists"
            } else {
                "Username already exists"
            };
            AccountError::Validation(vec![message.to_string()])
        }
        _ => AccountError::Storage(err),
    }
}

fn hash_password(password: &str) -> Result<String, AccountError> {
    let salt = SaltString::encode_b64(uuid::Uuid::new_v4().as_bytes())
        .map_err(|e| AccountError::Hashing(e.to_string()))?;
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AccountError::Hashing(e.to_string()))
}

fn verify_password(password: &str, stored: &str) -> bool {
    match PasswordHash::new(stored) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            log::error!("Stored password hash is unreadable: {}", e);
            false
        }
    }
}
