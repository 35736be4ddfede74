//! UserStore: account lookup and administration
//!
//! Writes that touch more than one table (user + parent detail, deactivation
//! + session revocation) always run in one transaction. Partial updates go
//! through [`UpdateBuilder`], which only accepts columns from the static
//! [`UserColumn`] whitelist and only ever binds values as parameters.

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, Value, ValueRef};
use rusqlite::{params, params_from_iter, OptionalExtension, Row, Transaction};
use tracing::info;

use crate::error::{AuthError, Result};
use crate::store::{from_unix, unix_now, Database};

use super::password::PasswordHasher;
use super::types::{NewUser, ParentProfile, Role, UserRecord, UserSummary, UserUpdate};

const USER_COLUMNS: &str = "id, email, name, role, is_active, created_at, updated_at";

impl FromSql for Role {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let s = value.as_str()?;
        Role::parse(s).ok_or_else(|| FromSqlError::Other(format!("unknown role: {s}").into()))
    }
}

impl ToSql for Role {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<UserRecord> {
    Ok(UserRecord {
        id: row.get(0)?,
        email: row.get(1)?,
        name: row.get(2)?,
        role: row.get(3)?,
        is_active: row.get(4)?,
        created_at: from_unix(row.get(5)?),
        updated_at: from_unix(row.get(6)?),
    })
}

// ─── Update Builder ───

/// Columns an account update may touch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserColumn {
    Name,
    Email,
    Role,
    PasswordHash,
    IsActive,
}

impl UserColumn {
    fn as_sql(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Role => "role",
            Self::PasswordHash => "password_hash",
            Self::IsActive => "is_active",
        }
    }
}

/// Parameterized `UPDATE users` statement
#[derive(Debug, Default)]
pub struct UpdateBuilder {
    sets: Vec<(UserColumn, Value)>,
}

impl UpdateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a column. Setting the same column twice keeps the last value.
    pub fn set(mut self, column: UserColumn, value: impl Into<Value>) -> Self {
        self.sets.retain(|(c, _)| *c != column);
        self.sets.push((column, value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// SQL and bind values for updating user `id`; `updated_at` is always set
    pub fn build(self, id: i64, now: i64) -> (String, Vec<Value>) {
        let mut assignments = Vec::with_capacity(self.sets.len() + 1);
        let mut values = Vec::with_capacity(self.sets.len() + 2);

        for (column, value) in self.sets {
            values.push(value);
            assignments.push(format!("{} = ?{}", column.as_sql(), values.len()));
        }
        values.push(Value::Integer(now));
        assignments.push(format!("updated_at = ?{}", values.len()));
        values.push(Value::Integer(id));

        let sql = format!("UPDATE users SET {} WHERE id = ?{}", assignments.join(", "), values.len());
        (sql, values)
    }
}

// ─── Validation ───

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(AuthError::Validation("Name is required".into()));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<()> {
    if email.trim().is_empty() || !email.contains('@') {
        return Err(AuthError::Validation("Invalid email address".into()));
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<()> {
    if password.is_empty() {
        return Err(AuthError::Validation("Password is required".into()));
    }
    Ok(())
}

// ─── Transaction Helpers ───

fn email_taken(tx: &Transaction<'_>, email: &str, except_id: Option<i64>) -> Result<bool> {
    let found: Option<i64> = tx
        .query_row(
            "SELECT id FROM users WHERE email = ?1 AND id != ?2",
            params![email, except_id.unwrap_or(-1)],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

fn load_user(tx: &Transaction<'_>, id: i64) -> Result<UserRecord> {
    tx.query_row(
        &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
        params![id],
        user_from_row,
    )
    .optional()?
    .ok_or(AuthError::UserNotFound(id))
}

fn insert_parent(tx: &Transaction<'_>, user_id: i64, profile: &ParentProfile) -> Result<()> {
    tx.execute(
        "INSERT OR IGNORE INTO parents (user_id, cnic, phone, address, occupation, emergency_contact)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            user_id,
            profile.cnic,
            profile.phone,
            profile.address,
            profile.occupation,
            profile.emergency_contact,
        ],
    )?;
    Ok(())
}

/// Map a UNIQUE violation on `users.email` to `UserAlreadyExists`
fn map_unique(err: rusqlite::Error, email: &str) -> AuthError {
    match err {
        rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation => {
            AuthError::UserAlreadyExists(email.to_string())
        }
        other => other.into(),
    }
}

/// Stored credentials for sign-in. Never leaves the crate.
#[derive(Debug, Clone)]
pub(crate) struct StoredCredentials {
    pub user: UserRecord,
    pub password_hash: String,
}

// ─── Store ───

#[derive(Clone, Debug)]
pub struct UserStore {
    db: Database,
    hasher: PasswordHasher,
}

impl UserStore {
    pub fn new(db: Database, hasher: PasswordHasher) -> Self {
        Self { db, hasher }
    }

    /// Active user with this exact (case-sensitive) email, with its hash
    pub(crate) async fn find_active_by_email(&self, email: &str) -> Result<Option<StoredCredentials>> {
        let email = email.to_string();
        self.db
            .run(move |conn| {
                Ok(conn
                    .query_row(
                        &format!(
                            "SELECT {USER_COLUMNS}, password_hash FROM users
                             WHERE email = ?1 AND is_active = 1"
                        ),
                        params![email],
                        |row| {
                            Ok(StoredCredentials {
                                user: user_from_row(row)?,
                                password_hash: row.get(7)?,
                            })
                        },
                    )
                    .optional()?)
            })
            .await
    }

    /// User by id, active or not
    pub async fn get(&self, id: i64) -> Result<Option<UserRecord>> {
        self.db
            .run(move |conn| {
                Ok(conn
                    .query_row(
                        &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
                        params![id],
                        user_from_row,
                    )
                    .optional()?)
            })
            .await
    }

    /// User by exact email, active or not
    pub async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        let email = email.to_string();
        self.db
            .run(move |conn| {
                Ok(conn
                    .query_row(
                        &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"),
                        params![email],
                        user_from_row,
                    )
                    .optional()?)
            })
            .await
    }

    /// Create an account; parents also get their detail row, atomically
    pub async fn create(&self, new: NewUser) -> Result<UserRecord> {
        validate_name(&new.name)?;
        validate_email(&new.email)?;
        validate_password(&new.password)?;

        let password_hash = self.hasher.hash_blocking(new.password.clone()).await?;

        let user = self
            .db
            .transaction(move |tx| {
                if email_taken(tx, &new.email, None)? {
                    return Err(AuthError::UserAlreadyExists(new.email.clone()));
                }

                let now = unix_now();
                tx.execute(
                    "INSERT INTO users (email, name, role, password_hash, is_active, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, 1, ?5, ?5)",
                    params![new.email, new.name.trim(), new.role, password_hash, now],
                )
                .map_err(|e| map_unique(e, &new.email))?;
                let id = tx.last_insert_rowid();

                if new.role == Role::Parent {
                    insert_parent(tx, id, &new.parent)?;
                }

                load_user(tx, id)
            })
            .await?;

        info!(user_id = user.id, role = %user.role, "User created");
        Ok(user)
    }

    /// Create the account unless one with this email already exists.
    /// Returns the user and whether it was created.
    pub async fn ensure(&self, new: NewUser) -> Result<(UserRecord, bool)> {
        if let Some(existing) = self.find_by_email(&new.email).await? {
            return Ok((existing, false));
        }
        match self.create(new.clone()).await {
            Ok(user) => Ok((user, true)),
            // lost a race with a concurrent create
            Err(AuthError::UserAlreadyExists(_)) => self
                .find_by_email(&new.email)
                .await?
                .map(|u| (u, false))
                .ok_or(AuthError::UserAlreadyExists(new.email)),
            Err(e) => Err(e),
        }
    }

    /// Apply a partial update
    pub async fn update(&self, id: i64, update: UserUpdate) -> Result<UserRecord> {
        if update.is_empty() {
            return Err(AuthError::Validation("Nothing to update".into()));
        }
        if let Some(name) = &update.name {
            validate_name(name)?;
        }
        if let Some(email) = &update.email {
            validate_email(email)?;
        }

        let password_hash = match update.new_password() {
            Some(pw) => {
                validate_password(pw)?;
                Some(self.hasher.hash_blocking(pw.to_string()).await?)
            }
            None => None,
        };

        let user = self
            .db
            .transaction(move |tx| {
                load_user(tx, id)?;

                let mut builder = UpdateBuilder::new();
                if let Some(name) = update.name {
                    builder = builder.set(UserColumn::Name, name.trim().to_string());
                }
                if let Some(email) = update.email.clone() {
                    if email_taken(tx, &email, Some(id))? {
                        return Err(AuthError::UserAlreadyExists(email));
                    }
                    builder = builder.set(UserColumn::Email, email);
                }
                if let Some(role) = update.role {
                    builder = builder.set(UserColumn::Role, role.as_str().to_string());
                }
                if let Some(hash) = password_hash {
                    builder = builder.set(UserColumn::PasswordHash, hash);
                }

                let (sql, values) = builder.build(id, unix_now());
                tx.execute(&sql, params_from_iter(values)).map_err(|e| {
                    map_unique(e, update.email.as_deref().unwrap_or_default())
                })?;

                if update.role == Some(Role::Parent) {
                    insert_parent(tx, id, &ParentProfile::default())?;
                }

                load_user(tx, id)
            })
            .await?;

        info!(user_id = id, "User updated");
        Ok(user)
    }

    /// Soft-delete: clear the active flag and revoke all sessions
    pub async fn deactivate(&self, actor_id: i64, id: i64) -> Result<()> {
        if actor_id == id {
            return Err(AuthError::Validation("Cannot deactivate your own account".into()));
        }

        let revoked = self
            .db
            .transaction(move |tx| {
                let (sql, values) = UpdateBuilder::new()
                    .set(UserColumn::IsActive, false)
                    .build(id, unix_now());
                if tx.execute(&sql, params_from_iter(values))? == 0 {
                    return Err(AuthError::UserNotFound(id));
                }
                Ok(tx.execute("DELETE FROM user_sessions WHERE user_id = ?1", params![id])?)
            })
            .await?;

        info!(user_id = id, actor_id, revoked, "User deactivated");
        Ok(())
    }

    /// All users, newest first, with parent details where present
    pub async fn list(&self) -> Result<Vec<UserSummary>> {
        self.db
            .run(|conn| {
                let mut stmt = conn.prepare(
                    "SELECT u.id, u.email, u.name, u.role, u.is_active, u.created_at, u.updated_at,
                            p.user_id, p.cnic, p.phone, p.address, p.occupation, p.emergency_contact
                     FROM users u
                     LEFT JOIN parents p ON u.id = p.user_id
                     ORDER BY u.created_at DESC, u.id DESC",
                )?;
                let rows = stmt.query_map([], |row| {
                    let parent = match row.get::<_, Option<i64>>(7)? {
                        Some(_) => Some(ParentProfile {
                            cnic: row.get(8)?,
                            phone: row.get(9)?,
                            address: row.get(10)?,
                            occupation: row.get(11)?,
                            emergency_contact: row.get(12)?,
                        }),
                        None => None,
                    };
                    Ok(UserSummary { user: user_from_row(row)?, parent })
                })?;
                Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
            })
            .await
    }

    /// Parent detail row for `user_id`
    pub async fn parent_profile(&self, user_id: i64) -> Result<Option<ParentProfile>> {
        self.db
            .run(move |conn| {
                Ok(conn
                    .query_row(
                        "SELECT cnic, phone, address, occupation, emergency_contact
                         FROM parents WHERE user_id = ?1",
                        params![user_id],
                        |row| {
                            Ok(ParentProfile {
                                cnic: row.get(0)?,
                                phone: row.get(1)?,
                                address: row.get(2)?,
                                occupation: row.get(3)?,
                                emergency_contact: row.get(4)?,
                            })
                        },
                    )
                    .optional()?)
            })
            .await
    }
}
