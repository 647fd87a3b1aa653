//! Repository identifier parsing

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Repository identifier as `owner/name`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoId {
    /// Repository owner (user or organization)
    pub owner: String,
    /// Repository name
    pub name: String,
}

impl RepoId {
    /// Parse an `owner/name` string.
    ///
    /// Exactly one `/` is required. Parts are kept as given: no trimming and
    /// no case folding, and empty parts are not rejected here.
    pub fn parse(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split('/').collect();
        if parts.len() != 2 {
            return Err(Error::InvalidRepository(format!(
                "invalid or missing repository {:?}. eg octocat/hello-world",
                s
            )));
        }

        Ok(Self {
            owner: parts[0].to_string(),
            name: parts[1].to_string(),
        })
    }
}

impl FromStr for RepoId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}
