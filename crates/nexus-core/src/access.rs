//! # Access Policy
//!
//! Decides what a signed-in identity may do.
//!
//! Sign-in itself is handled by the hosted identity provider; this module only
//! sees the identity it returns.
//!
//! ```text
//! Identity { email, roles } ──► AccessPolicy::role_of ──► Customer | Admin
//!                                        │
//!                   admin_emails (case-insensitive) OR admin_role claim
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// The identity returned by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    #[serde(default)]
    pub uid: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
    /// Role claims attached by the provider.
    #[serde(default)]
    pub roles: Vec<String>,
}

impl Identity {
    pub fn new(email: impl Into<String>) -> Self {
        Identity {
            email: email.into(),
            ..Identity::default()
        }
    }

    /// Display name, falling back to the email.
    pub fn name(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.email)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Customer,
    Admin,
}

/// Who counts as an administrator.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AccessPolicy {
    /// Emails granted the admin role.
    #[serde(default)]
    pub admin_emails: Vec<String>,
    /// A provider role claim that grants the admin role.
    #[serde(default)]
    pub admin_role: Option<String>,
}

impl AccessPolicy {
    pub fn new(admin_emails: Vec<String>, admin_role: Option<String>) -> Self {
        AccessPolicy {
            admin_emails,
            admin_role,
        }
    }

    /// Resolves an identity to its role.
    pub fn role_of(&self, identity: &Identity) -> Role {
        let email = identity.email.trim();
        let by_email = !email.is_empty()
            && self
                .admin_emails
                .iter()
                .any(|admin| admin.trim().eq_ignore_ascii_case(email));

        let by_claim = self
            .admin_role
            .as_deref()
            .map(str::trim)
            .filter(|role| !role.is_empty())
            .is_some_and(|role| identity.roles.iter().any(|r| r.trim() == role));

        if by_email || by_claim {
            Role::Admin
        } else {
            Role::Customer
        }
    }

    pub fn is_admin(&self, identity: &Identity) -> bool {
        self.role_of(identity) == Role::Admin
    }

    /// Fails with [`CoreError::AccessDenied`] unless the identity is an admin.
    pub fn require_admin(&self, identity: &Identity) -> CoreResult<()> {
        if self.is_admin(identity) {
            Ok(())
        } else {
            Err(CoreError::AccessDenied {
                email: if identity.email.is_empty() {
                    "anonymous".to_string()
                } else {
                    identity.email.clone()
                },
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> AccessPolicy {
        AccessPolicy::new(
            vec!["Owner@AutoNexus.lk ".to_string()],
            Some("admin".to_string()),
        )
    }

    #[test]
    fn test_admin_by_email_ignores_case_and_spaces() {
        let identity = Identity::new(" owner@autonexus.lk");
        assert_eq!(policy().role_of(&identity), Role::Admin);
    }

    #[test]
    fn test_admin_by_role_claim() {
        let mut identity = Identity::new("staff@autonexus.lk");
        assert_eq!(policy().role_of(&identity), Role::Customer);

        identity.roles.push("admin".to_string());
        assert_eq!(policy().role_of(&identity), Role::Admin);
    }

    #[test]
    fn test_empty_policy_grants_nobody() {
        let policy = AccessPolicy::default();
        let mut identity = Identity::new("");
        identity.roles.push(String::new());
        assert_eq!(policy.role_of(&identity), Role::Customer);
    }

    #[test]
    fn test_require_admin_names_email() {
        let err = policy()
            .require_admin(&Identity::new("guest@gmail.com"))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Access denied for guest@gmail.com: administrator role required"
        );
        assert!(policy().require_admin(&Identity::new("owner@autonexus.lk")).is_ok());
    }

    #[test]
    fn test_identity_name_falls_back_to_email() {
        let mut identity = Identity::new("a@b.lk");
        assert_eq!(identity.name(), "a@b.lk");
        identity.display_name = Some("Kasun".to_string());
        assert_eq!(identity.name(), "Kasun");
    }
}
