//! Core type definitions

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Extra build parameters, keyed by name
///
/// Ordered so that query strings are stable across runs.
pub type Params = BTreeMap<String, String>;

/// Event reported by the build server for pull request builds
pub const EVENT_PULL_REQUEST: &str = "pull_request";

/// Event sent to the build server when triggering a deployment
pub const EVENT_DEPLOYMENT: &str = "deployment";

/// Prefix the build server puts in front of tag names in `ref`
pub const TAG_REF_PREFIX: &str = "refs/tags/";

/// A build record as returned by the build server
///
/// Only the fields used for selection are interpreted; everything else the
/// server sends is kept in `extra` so verbose output shows the full record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Build {
    /// Server-side identifier
    pub id: u64,
    /// Build number, unique per repository
    pub number: u64,
    /// Number of the build this one was restarted from
    pub parent: u64,
    /// Trigger event (push, tag, pull_request, deployment, ...)
    pub event: String,
    /// Build status (success, failure, running, ...)
    pub status: String,
    /// Environment this build deployed to, empty for non-deployments
    #[serde(rename = "deploy_to")]
    pub deploy: String,
    /// Commit SHA
    pub commit: String,
    /// Branch name (the base branch for pull requests)
    pub branch: String,
    /// Git reference, `refs/tags/<tag>` for tag builds
    #[serde(rename = "ref")]
    pub git_ref: String,
    /// Commit message
    pub message: String,
    /// Commit author
    pub author: String,
    /// Link to the commit or change on the forge
    pub link_url: String,
    /// Creation time (unix seconds)
    pub created_at: i64,
    /// Start time (unix seconds)
    pub started_at: i64,
    /// Finish time (unix seconds)
    pub finished_at: i64,
    /// Fields not modelled above
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// What to do with the matched build
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Restart the matched build
    Start {
        /// Ask the server for a fresh build number instead of reusing the old one
        fork: bool,
    },
    /// Deploy the matched build to an environment
    Deploy {
        /// Target environment
        environment: String,
    },
}

impl Action {
    /// Choose the action from the optional deploy target and the fork flag.
    ///
    /// A deploy target always wins; `fork` only applies to restarts.
    pub fn from_options(deploy_to: Option<String>, fork: bool) -> Self {
        match deploy_to {
            Some(environment) => Action::Deploy { environment },
            None => Action::Start { fork },
        }
    }
}

impl Default for Action {
    fn default() -> Self {
        Action::Start { fork: false }
    }
}

/// Result of triggering one repository
#[derive(Debug, Clone)]
pub struct Triggered {
    /// Repository the build was triggered for
    pub repo: crate::repo::RepoId,
    /// Number of the build that matched the filters
    pub matched: u64,
    /// Build record created by the server
    pub build: Build,
    /// Where to follow the new build
    pub url: String,
}
