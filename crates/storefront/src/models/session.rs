//! Session-related types.
//!
//! Types stored in the session for authentication state.

use serde::{Deserialize, Serialize};

use holycat_core::model::User;
use holycat_core::{UserId, UserRole};

/// Session-stored user identity.
///
/// A snapshot of `GET /auth/me` taken at login and refreshed on profile
/// updates; used for the header and the admin gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: UserRole,
}

impl CurrentUser {
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// First word of the name, for the header greeting.
    #[must_use]
    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or(&self.name)
    }
}

impl From<&User> for CurrentUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the backend bearer token.
    pub const API_TOKEN: &str = "api_token";

    /// Key for the email awaiting OTP verification.
    pub const PENDING_OTP_EMAIL: &str = "pending_otp_email";

    /// Key for the one-shot flash message.
    pub const FLASH: &str = "flash";
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_user_and_first_name() {
        let user: User = serde_json::from_value(serde_json::json!({
            "id": 9,
            "name": "Siti Rahmawati",
            "email": "siti@example.com",
            "role": "ADMIN"
        }))
        .unwrap();
        let current = CurrentUser::from(&user);
        assert!(current.is_admin());
        assert_eq!(current.first_name(), "Siti");
    }
}
