//! Trigger dispatch
//!
//! For each repository: list builds, select the one matching the filters,
//! then restart or deploy it. Repositories are handled one at a time in the
//! order given and the first failure stops the run.

use crate::config::TriggerConfig;
use crate::error::Result;
use crate::filter::FilterSet;
use crate::finder;
use crate::params::FORK_PARAM;
use crate::repo::RepoId;
use crate::traits::BuildServer;
use crate::types::{Action, Params, Triggered};
use std::borrow::Cow;

/// Join server address, repository and build number into a browsable URL.
///
/// Slashes are collapsed at the joins only, so `https://` survives.
pub fn follow_url(server: &str, repo: &RepoId, number: u64) -> String {
    format!(
        "{}/{}/{}/{}",
        server.trim_end_matches('/'),
        repo.owner.trim_matches('/'),
        repo.name.trim_matches('/'),
        number
    )
}

/// Drives the find-then-trigger flow against a [`BuildServer`]
pub struct Dispatcher<'a, S> {
    server: &'a S,
    base_url: &'a str,
}

impl<'a, S: BuildServer> Dispatcher<'a, S> {
    /// Create a dispatcher; `base_url` is only used for follow-up URLs
    pub fn new(server: &'a S, base_url: &'a str) -> Self {
        Self { server, base_url }
    }

    /// Find the matching build for one repository and trigger it
    pub async fn trigger(
        &self,
        repo: &RepoId,
        filters: &FilterSet,
        action: &Action,
        params: &Params,
    ) -> Result<Triggered> {
        let builds = self.server.list_builds(repo).await?;
        let matched = finder::select(repo, &builds, filters)?.number;

        let build = match action {
            Action::Deploy { environment } => {
                tracing::info!(repo = %repo, build = matched, environment = %environment, "deploying build");
                self.server
                    .deploy(repo, matched, environment, params)
                    .await?
            }
            Action::Start { fork } => {
                let params = if *fork {
                    let mut forked = params.clone();
                    forked.insert(FORK_PARAM.to_string(), "true".to_string());
                    Cow::Owned(forked)
                } else {
                    Cow::Borrowed(params)
                };
                tracing::info!(repo = %repo, build = matched, fork = *fork, "restarting build");
                self.server.start_build(repo, matched, &params).await?
            }
        };

        let url = follow_url(self.base_url, repo, build.number);
        Ok(Triggered {
            repo: repo.clone(),
            matched,
            build,
            url,
        })
    }

    /// Trigger every configured repository in order.
    ///
    /// `report` sees each result as soon as it is available, so builds that
    /// were triggered before a later failure are still reported. The first
    /// error, from the server or from `report`, ends the run.
    pub async fn trigger_all<F>(
        &self,
        config: &TriggerConfig,
        mut report: F,
    ) -> Result<Vec<Triggered>>
    where
        F: FnMut(&Triggered) -> Result<()>,
    {
        let mut triggered = Vec::with_capacity(config.repos.len());
        for repo in &config.repos {
            let result = self
                .trigger(repo, &config.filters, &config.action, &config.params)
                .await?;
            report(&result)?;
            triggered.push(result);
        }
        Ok(triggered)
    }
}
