//! Auth domain types: Role, UserRecord, PublicUser, JwtClaims
//!
//! Serializable, cloneable, and cheap to pass around.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Landing page for roles without a dedicated dashboard
pub const DEFAULT_LANDING_PATH: &str = "/dashboard";

/// User roles. A closed set; there is no hierarchy, access is decided per
/// operation by [`Operation::allowed_roles`](super::guard::Operation::allowed_roles).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Principal,
    SocietyMember,
    Accountant,
    Parent,
    Student,
}

impl Role {
    pub const ALL: [Role; 6] = [
        Role::Admin,
        Role::Principal,
        Role::SocietyMember,
        Role::Accountant,
        Role::Parent,
        Role::Student,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Principal => "principal",
            Self::SocietyMember => "society_member",
            Self::Accountant => "accountant",
            Self::Parent => "parent",
            Self::Student => "student",
        }
    }

    /// Parse a stored role. Unknown strings are `None`, never a default role.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(Self::Admin),
            "principal" => Some(Self::Principal),
            "society_member" => Some(Self::SocietyMember),
            "accountant" => Some(Self::Accountant),
            "parent" => Some(Self::Parent),
            "student" => Some(Self::Student),
            _ => None,
        }
    }

    /// Default page after sign-in
    pub fn landing_path(&self) -> &'static str {
        match self {
            Self::Admin => "/admin/dashboard",
            Self::Principal => "/principal/dashboard",
            Self::SocietyMember => "/society/dashboard",
            Self::Accountant => "/accountant/dashboard",
            Self::Parent => "/parent/dashboard",
            Self::Student => DEFAULT_LANDING_PATH,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unknown role: {s}"))
    }
}

/// Landing page for an optional role string (e.g. one read from an
/// unverified source). Anything unrecognised lands on the generic page.
pub fn landing_path_for(role: Option<&str>) -> &'static str {
    role.and_then(Role::parse)
        .map(|r| r.landing_path())
        .unwrap_or(DEFAULT_LANDING_PATH)
}

/// Full user record as stored in the `users` table, minus the password hash
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRecord {
    pub fn to_public(&self) -> PublicUser {
        PublicUser {
            id: self.id,
            email: self.email.clone(),
            name: self.name.clone(),
            role: self.role,
        }
    }
}

/// The only user projection that leaves the auth core
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub role: Role,
}

/// Joined session + user projection returned by the session store
#[derive(Debug, Clone, PartialEq)]
pub struct SessionUser {
    pub user_id: i64,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub expires_at: DateTime<Utc>,
}

impl From<SessionUser> for PublicUser {
    fn from(s: SessionUser) -> Self {
        PublicUser {
            id: s.user_id,
            email: s.email,
            name: s.name,
            role: s.role,
        }
    }
}

/// Parent-specific details stored in the `parents` table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentProfile {
    pub cnic: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub occupation: Option<String>,
    pub emergency_contact: Option<String>,
}

/// Admin listing row: user plus parent details when present
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    #[serde(flatten)]
    pub user: UserRecord,
    pub parent: Option<ParentProfile>,
}

/// Input for account creation
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub role: Role,
    pub password: String,
    /// Only used when `role` is [`Role::Parent`]
    #[serde(flatten)]
    pub parent: ParentProfile,
}

/// Partial account update; `None` leaves the column untouched
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub password: Option<String>,
}

impl UserUpdate {
    /// Replacement password, if any. An empty string keeps the current hash.
    pub fn new_password(&self) -> Option<&str> {
        self.password.as_deref().filter(|pw| !pw.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.role.is_none()
            && self.new_password().is_none()
    }
}

/// JWT claims for session tokens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject (user id)
    pub sub: String,
    pub email: String,
    pub role: Role,
    /// Expiry (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
    /// Unique token id; keeps tokens minted in the same second distinct
    pub jti: String,
}

impl JwtClaims {
    pub fn user_id(&self) -> Option<i64> {
        self.sub.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        for role in Role::ALL {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("owner"), None);
        assert_eq!(Role::parse("Admin"), None);
    }

    #[test]
    fn test_role_serialization() {
        let json = serde_json::to_string(&Role::SocietyMember).unwrap();
        assert_eq!(json, "\"society_member\"");
        let parsed: Role = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, Role::SocietyMember);
    }

    #[test]
    fn test_blank_password_update_keeps_hash() {
        let blank = UserUpdate {
            password: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(blank.new_password(), None);
        assert!(blank.is_empty());

        let rename = UserUpdate {
            name: Some("Renamed".into()),
            password: Some(String::new()),
            ..Default::default()
        };
        assert!(!rename.is_empty());
        assert_eq!(rename.new_password(), None);
    }

    #[test]
    fn test_landing_paths() {
        assert_eq!(Role::Admin.landing_path(), "/admin/dashboard");
        assert_eq!(Role::Principal.landing_path(), "/principal/dashboard");
        assert_eq!(Role::SocietyMember.landing_path(), "/society/dashboard");
        assert_eq!(Role::Accountant.landing_path(), "/accountant/dashboard");
        assert_eq!(Role::Parent.landing_path(), "/parent/dashboard");
        assert_eq!(Role::Student.landing_path(), "/dashboard");
    }

    #[test]
    fn test_landing_path_for_unknown() {
        assert_eq!(landing_path_for(Some("admin")), "/admin/dashboard");
        assert_eq!(landing_path_for(Some("owner")), DEFAULT_LANDING_PATH);
        assert_eq!(landing_path_for(None), DEFAULT_LANDING_PATH);
    }

    #[test]
    fn test_new_user_parent_fields_flatten() {
        let json = r#"{"name":"Ayesha","email":"a@example.com","role":"parent",
                       "password":"pw","phone":"0300-1234567"}"#;
        let user: NewUser = serde_json::from_str(json).unwrap();
        assert_eq!(user.role, Role::Parent);
        assert_eq!(user.parent.phone.as_deref(), Some("0300-1234567"));
        assert!(user.parent.cnic.is_none());
    }
}
