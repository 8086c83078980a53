use serde::{Deserialize, Serialize};

pub const EMAIL_MAX_LEN: usize = 255;
pub const ROLE_NAME_MAX_LEN: usize = 50;
pub const PASSWORD_MIN_LEN: usize = 3;

/// Role attached to every account. `role_name` is denormalized display
/// information; authorization compares against it, identity is the id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
    #[serde(rename = "roleid")]
    pub role_id: i32,
    #[serde(rename = "rolename", skip_serializing_if = "Option::is_none")]
    pub role_name: Option<String>,
}

/// Account as exposed over the wire. The credential record is a separate,
/// never-serialized row related 1:1 by account id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    #[serde(rename = "accountid")]
    pub account_id: i32,
    pub email: String,
    pub role: Role,
}

impl Account {
    /// Schema check applied both to inbound payloads and to rows read back
    /// from the store; a stored row failing this indicates corruption.
    pub fn validate(&self) -> Result<(), String> {
        if self.account_id < 1 {
            return Err("accountid must be a positive integer".to_string());
        }
        validate_email_format(&self.email)?;
        if self.role.role_id < 1 {
            return Err("roleid must be a positive integer".to_string());
        }
        if let Some(name) = &self.role.role_name {
            if name.is_empty() || name.len() > ROLE_NAME_MAX_LEN {
                return Err(format!(
                    "rolename must be between 1 and {} characters",
                    ROLE_NAME_MAX_LEN
                ));
            }
        }
        Ok(())
    }
}

/// Login / account-creation payload
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn validate(&self) -> Result<(), String> {
        validate_email_format(&self.email)?;
        validate_password_format(&self.password)
    }
}

/// Validate email format
pub fn validate_email_format(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("email cannot be empty".to_string());
    }

    if email.len() > EMAIL_MAX_LEN {
        return Err(format!("email must be at most {} characters", EMAIL_MAX_LEN));
    }

    // Basic email format check
    if !email.contains('@') || !email.contains('.') {
        return Err("invalid email format".to_string());
    }

    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return Err("invalid email format".to_string());
    }

    Ok(())
}

/// Validate raw password requirements (applies before hashing)
pub fn validate_password_format(password: &str) -> Result<(), String> {
    if password.len() < PASSWORD_MIN_LEN {
        return Err(format!(
            "password must be at least {} characters",
            PASSWORD_MIN_LEN
        ));
    }
    Ok(())
}
