//! Cookie representation and header helpers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// `SameSite` cookie attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl fmt::Display for SameSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SameSite::Strict => write!(f, "Strict"),
            SameSite::Lax => write!(f, "Lax"),
            SameSite::None => write!(f, "None"),
        }
    }
}

/// A cookie as written by the client.
///
/// No domain attribute is carried, so the cookie is scoped to the current host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    /// Lifetime in seconds. Zero expires the cookie immediately.
    pub max_age: u64,
    pub path: String,
    pub same_site: SameSite,
}

impl Cookie {
    /// Identity cookie: path `/`, `SameSite=Strict`.
    pub fn identity(name: impl Into<String>, value: impl Into<String>, max_age: u64) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            max_age,
            path: "/".to_string(),
            same_site: SameSite::Strict,
        }
    }

    /// A cookie that removes `name` when set.
    pub fn expired(name: impl Into<String>) -> Self {
        Self::identity(name, String::new(), 0)
    }

    pub fn is_expired(&self) -> bool {
        self.max_age == 0
    }

    /// Render as a `Set-Cookie` style string.
    pub fn to_set_cookie(&self) -> String {
        format!(
            "{}={}; max-age={}; path={}; SameSite={}",
            self.name, self.value, self.max_age, self.path, self.same_site
        )
    }

    /// Render as a `Cookie` request header pair.
    pub fn to_header_pair(&self) -> String {
        format!("{}={}", self.name, self.value)
    }
}

/// Extract the value of `name` from a `Cookie` header (`a=b; c=d`).
///
/// Returns `None` when the cookie is missing, empty, or present more than once.
pub fn parse_cookie_header(header: &str, name: &str) -> Option<String> {
    let mut found = None;
    for pair in header.split(';') {
        let Some((key, value)) = pair.trim().split_once('=') else {
            continue;
        };
        if key.trim() == name {
            if found.is_some() {
                return None;
            }
            found = Some(value.trim().to_string());
        }
    }
    found.filter(|value| !value.is_empty())
}
