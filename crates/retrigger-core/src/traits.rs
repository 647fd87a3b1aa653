//! Build server trait used by the dispatcher
//!
//! Methods return `impl Future` so implementations are resolved at compile
//! time: no boxing, no dynamic dispatch.

use crate::error::Result;
use crate::repo::RepoId;
use crate::types::{Build, Params};
use std::future::Future;

/// Operations the trigger flow needs from a CI build server
pub trait BuildServer {
    /// List builds for a repository, most recent first
    fn list_builds<'a>(
        &'a self,
        repo: &'a RepoId,
    ) -> impl Future<Output = Result<Vec<Build>>> + Send + 'a;

    /// Restart build `number`, returning the newly created build
    fn start_build<'a>(
        &'a self,
        repo: &'a RepoId,
        number: u64,
        params: &'a Params,
    ) -> impl Future<Output = Result<Build>> + Send + 'a;

    /// Deploy build `number` to `environment`, returning the deployment build
    fn deploy<'a>(
        &'a self,
        repo: &'a RepoId,
        number: u64,
        environment: &'a str,
        params: &'a Params,
    ) -> impl Future<Output = Result<Build>> + Send + 'a;
}
