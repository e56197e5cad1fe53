//! Jabber ID parsing and rendering.
//!
//! A JID is `user@domain/resource` with the user and resource parts
//! optional. Parsing is purely structural: the first `@` splits off the
//! user, the first `/` of the remainder splits off the resource, and the
//! rest is the domain. No stringprep or character-set validation happens
//! here; the parts are opaque strings to this layer.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

/// A JID could not be split into its parts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed JID: no domain in {input:?}")]
pub struct MalformedJidError {
    /// The offending input string
    pub input: String,
}

/// A structured Jabber ID.
///
/// The domain is always present; user and resource are independently
/// optional. Serialized forms omit absent parts entirely rather than
/// emitting null keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Jid {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    pub domain: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
}

impl Jid {
    /// A domain-only JID (`example.com`).
    pub fn domain(domain: impl Into<String>) -> Self {
        Self {
            user: None,
            domain: domain.into(),
            resource: None,
        }
    }

    /// A bare JID (`user@example.com`).
    pub fn bare(user: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            user: Some(user.into()),
            domain: domain.into(),
            resource: None,
        }
    }

    /// A full JID (`user@example.com/resource`).
    pub fn full(
        user: impl Into<String>,
        domain: impl Into<String>,
        resource: impl Into<String>,
    ) -> Self {
        Self {
            user: Some(user.into()),
            domain: domain.into(),
            resource: Some(resource.into()),
        }
    }

    /// The bare form of this JID, dropping any resource.
    pub fn to_bare(&self) -> Jid {
        Jid {
            user: self.user.clone(),
            domain: self.domain.clone(),
            resource: None,
        }
    }
}

impl FromStr for Jid {
    type Err = MalformedJidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (user, rest) = match s.split_once('@') {
            Some((user, rest)) => (non_empty(user), rest),
            None => (None, s),
        };
        let (domain, resource) = match rest.split_once('/') {
            Some((domain, resource)) => (domain, non_empty(resource)),
            None => (rest, None),
        };
        if domain.is_empty() {
            return Err(MalformedJidError {
                input: s.to_string(),
            });
        }
        Ok(Jid {
            user,
            domain: domain.to_string(),
            resource,
        })
    }
}

impl fmt::Display for Jid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref user) = self.user {
            write!(f, "{}@", user)?;
        }
        write!(f, "{}", self.domain)?;
        if let Some(ref resource) = self.resource {
            write!(f, "/{}", resource)?;
        }
        Ok(())
    }
}

fn non_empty(part: &str) -> Option<String> {
    if part.is_empty() {
        None
    } else {
        Some(part.to_string())
    }
}
