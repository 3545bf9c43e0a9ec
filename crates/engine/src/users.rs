//! User records.
//!
//! Users are plain data: the engine records *who* performed a mutation but
//! runs no authentication of its own. The store is seeded with a built-in
//! administrator that cannot be deleted.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

/// Fixed id of the seeded administrator account.
pub const ADMIN_ID: &str = "admin-id";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Operator,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub login: String,
    pub password: String,
    pub role: Role,
    pub name: String,
}

impl User {
    pub fn new(login: &str, password: &str, role: Role, name: &str) -> ResultEngine<Self> {
        let login = login.trim();
        if login.is_empty() {
            return Err(EngineError::InvalidUser(
                "login must not be blank".to_string(),
            ));
        }

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            login: login.to_string(),
            password: password.to_string(),
            role,
            name: name.trim().to_string(),
        })
    }

    /// The administrator seeded into every empty store.
    pub fn builtin_admin() -> Self {
        Self {
            id: ADMIN_ID.to_string(),
            login: "ADM".to_string(),
            password: "ADM".to_string(),
            role: Role::Admin,
            name: "Administrator".to_string(),
        }
    }

    pub fn is_builtin_admin(&self) -> bool {
        self.id == ADMIN_ID
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_blank_login() {
        let err = User::new("   ", "pw", Role::Operator, "Nobody").unwrap_err();
        assert_eq!(
            err,
            EngineError::InvalidUser("login must not be blank".to_string())
        );
    }

    #[test]
    fn builtin_admin_is_recognized() {
        let admin = User::builtin_admin();
        assert!(admin.is_builtin_admin());
        assert_eq!(admin.role, Role::Admin);
        assert_eq!(admin.login, "ADM");
    }
}
