//! SQLite schema for the auth tables
//!
//! Each table has a name constant and idempotent DDL applied by
//! [`Database::open`](crate::store::Database::open). Timestamps are Unix
//! seconds.

// ─── Table Names (constants) ───

pub const TABLE_USERS: &str = "users";
pub const TABLE_PARENTS: &str = "parents";
pub const TABLE_SESSIONS: &str = "user_sessions";

/// Connection-level pragmas, applied to every pooled connection
pub const CONNECTION_PRAGMAS: &str = "PRAGMA foreign_keys = ON;";

/// Database-level pragmas, applied once at open
pub const DATABASE_PRAGMAS: &str = "PRAGMA journal_mode = WAL;
     PRAGMA synchronous = NORMAL;";

// ─── Users Table ───

/// `users`: identity records. `email` keeps the default BINARY collation, so
/// uniqueness and lookups are case-sensitive.
pub const USERS_DDL: &str = "CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        email TEXT NOT NULL UNIQUE,
        name TEXT NOT NULL,
        role TEXT NOT NULL CHECK (role IN
            ('admin', 'principal', 'society_member', 'accountant', 'parent', 'student')),
        password_hash TEXT NOT NULL,
        is_active INTEGER NOT NULL DEFAULT 1,
        created_at INTEGER NOT NULL,
        updated_at INTEGER NOT NULL
    );";

// ─── Parents Table ───

/// `parents`: role-detail record for parent accounts
pub const PARENTS_DDL: &str = "CREATE TABLE IF NOT EXISTS parents (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL UNIQUE REFERENCES users(id) ON DELETE CASCADE,
        cnic TEXT,
        phone TEXT,
        address TEXT,
        occupation TEXT,
        emergency_contact TEXT
    );";

// ─── Sessions Table ───

/// `user_sessions`: one row per sign-in. Stores a SHA-256 digest of the
/// session token, never the token.
pub const SESSIONS_DDL: &str = "CREATE TABLE IF NOT EXISTS user_sessions (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        token_hash TEXT NOT NULL UNIQUE,
        created_at INTEGER NOT NULL,
        expires_at INTEGER NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_user_sessions_user ON user_sessions(user_id);
    CREATE INDEX IF NOT EXISTS idx_user_sessions_expires ON user_sessions(expires_at);";

/// Table definition used by schema initialization
pub struct TableDef {
    pub name: &'static str,
    pub ddl: &'static str,
}

/// Get all table definitions, parents before children
pub fn all_tables() -> Vec<TableDef> {
    vec![
        TableDef { name: TABLE_USERS, ddl: USERS_DDL },
        TableDef { name: TABLE_PARENTS, ddl: PARENTS_DDL },
        TableDef { name: TABLE_SESSIONS, ddl: SESSIONS_DDL },
    ]
}
