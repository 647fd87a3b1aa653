//! # Retrigger Core
//!
//! Replays a previous CI build as a new build or a deployment.
//!
//! The flow for every repository is:
//! - list builds from the build server, most recent first
//! - pick the first one accepted by a [`FilterSet`]
//! - restart it (optionally forked) or deploy it, passing extra parameters
//!
//! ## Example
//!
//! ```no_run
//! use retrigger_core::{RawOptions, TriggerConfig};
//!
//! # async fn example() -> retrigger_core::Result<()> {
//! let raw = RawOptions {
//!     server: Some("https://drone.example.com".into()),
//!     token: Some("token".into()),
//!     repos: vec!["octocat/hello-world".into()],
//!     branch: Some("main".into()),
//!     ..Default::default()
//! };
//! let config = TriggerConfig::from_env(&raw)?;
//!
//! let triggered = retrigger_core::trigger(&config, |t| {
//!     eprintln!("{}", retrigger_core::output::follow_message(t));
//!     Ok(())
//! })
//! .await?;
//! println!("Triggered {} builds", triggered.len());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs, rust_2018_idioms)]

pub mod config;
pub mod dispatch;
pub mod error;
pub mod filter;
pub mod finder;
pub mod http;
pub mod output;
pub mod params;
pub mod repo;
pub mod traits;
pub mod types;

pub use config::{RawOptions, Resolver, TriggerConfig};
pub use dispatch::Dispatcher;
pub use error::{Error, ErrorKind, Result};
pub use filter::FilterSet;
pub use repo::RepoId;
pub use traits::BuildServer;
pub use types::{Action, Build, Params, Triggered};

/// Trigger builds for every repository in `config` against its Drone server.
///
/// `report` is called after each successful trigger; see
/// [`Dispatcher::trigger_all`].
pub async fn trigger<F>(config: &TriggerConfig, report: F) -> Result<Vec<Triggered>>
where
    F: FnMut(&Triggered) -> Result<()>,
{
    let client = http::DroneClient::new(&config.server, config.token.clone())?;
    Dispatcher::new(&client, &config.server)
        .trigger_all(config, report)
        .await
}

/// Synchronous variant of [`trigger`]
///
/// Creates a single-threaded Tokio runtime and blocks on the async version;
/// requests are issued one at a time either way.
pub fn trigger_sync<F>(config: &TriggerConfig, report: F) -> Result<Vec<Triggered>>
where
    F: FnMut(&Triggered) -> Result<()>,
{
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| Error::Runtime(e.to_string()))?
        .block_on(trigger(config, report))
}
