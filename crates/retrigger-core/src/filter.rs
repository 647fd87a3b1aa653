//! Build filter matching
//!
//! A [`FilterSet`] decides whether a build record is the one the caller wants
//! to replay. Status always gates, event narrows, and at most one selector
//! (number, commit, tag, deployed-to, branch) picks the build. With no
//! selector the first build passing the gates wins.

use crate::error::{Error, Result};
use crate::types::{Build, EVENT_PULL_REQUEST, TAG_REF_PREFIX};

/// Status matched when the caller does not ask for one
pub const DEFAULT_STATUS: &str = "success";

/// Criteria for selecting the build to replay
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSet {
    /// Required build status
    pub status: String,
    /// Required trigger event
    pub event: Option<String>,
    /// Exact build number, strongest selector
    pub number: Option<u64>,
    /// Commit SHA
    pub commit: Option<String>,
    /// Tag name, compared against `refs/tags/<tag>`
    pub tag: Option<String>,
    /// Branch name, never matches pull request builds
    pub branch: Option<String>,
    /// Environment the build was deployed to
    pub deployed_to: Option<String>,
}

impl Default for FilterSet {
    fn default() -> Self {
        Self {
            status: DEFAULT_STATUS.to_string(),
            event: None,
            number: None,
            commit: None,
            tag: None,
            branch: None,
            deployed_to: None,
        }
    }
}

impl FilterSet {
    /// Names of the mutually exclusive selectors that are set
    pub fn exclusive_selectors(&self) -> Vec<&'static str> {
        [
            ("tag", self.tag.is_some()),
            ("branch", self.branch.is_some()),
            ("commit", self.commit.is_some()),
            ("deployed-to", self.deployed_to.is_some()),
        ]
        .into_iter()
        .filter_map(|(name, set)| set.then_some(name))
        .collect()
    }

    /// Reject filter sets with more than one of tag, branch, commit and
    /// deployed-to.
    pub fn validate(&self) -> Result<()> {
        let set = self.exclusive_selectors();
        if set.len() > 1 {
            return Err(Error::Config(format!(
                "tag, branch, commit or deployed-to cannot be set at the same time, pick one filter (got {})",
                set.join(", ")
            )));
        }
        Ok(())
    }

    /// Decide whether `build` satisfies the filters.
    ///
    /// The first applicable rule decides:
    /// 1. status mismatch rejects
    /// 2. event mismatch rejects (when an event is requested)
    /// 3. number, then commit, tag, deployed-to, branch: the first one set
    ///    decides alone
    /// 4. nothing set: accept
    pub fn matches(&self, build: &Build) -> bool {
        if build.status != self.status {
            return false;
        }
        if let Some(ref event) = self.event {
            if build.event != *event {
                return false;
            }
        }

        if let Some(number) = self.number {
            return build.number == number;
        }
        if let Some(ref commit) = self.commit {
            return build.commit == *commit;
        }
        if let Some(ref tag) = self.tag {
            return build
                .git_ref
                .strip_prefix(TAG_REF_PREFIX)
                .is_some_and(|t| t == tag);
        }
        if let Some(ref env) = self.deployed_to {
            return build.deploy == *env;
        }
        // Pull request builds report the base branch, not the head branch.
        if let Some(ref branch) = self.branch {
            return build.branch == *branch && build.event != EVENT_PULL_REQUEST;
        }

        true
    }
}
