//! Configuration resolution
//!
//! Every option can come from an explicit flag or from one of several
//! environment variables (the plain name and the `PLUGIN_` name set by
//! pipeline plugins). [`Resolver`] applies one policy to all of them: the
//! flag wins, then each variable in the listed order. Empty values count as
//! unset, whether they come from a variable or an explicit flag, since
//! pipelines export empty strings for settings left blank. `--tag ""` is
//! therefore the same as leaving `--tag` off and never conflicts with
//! another selector.

use crate::error::{Error, Result};
use crate::filter::{FilterSet, DEFAULT_STATUS};
use crate::params::parse_pairs;
use crate::repo::RepoId;
use crate::types::{Action, Params};

/// An option and the environment variables it can be read from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionSource {
    /// Human readable option name used in error messages
    pub name: &'static str,
    /// Environment variables in priority order
    pub env: &'static [&'static str],
}

macro_rules! option_source {
    ($ident:ident, $name:literal, [$($env:literal),+]) => {
        #[doc = concat!("Sources for the ", $name, " option")]
        pub const $ident: OptionSource = OptionSource {
            name: $name,
            env: &[$($env),+],
        };
    };
}

option_source!(SERVER, "drone server", ["DRONE_SERVER", "PLUGIN_DRONE_SERVER"]);
option_source!(TOKEN, "drone token", ["DRONE_TOKEN", "PLUGIN_DRONE_TOKEN"]);
option_source!(REPO, "repo", ["REPO", "PLUGIN_REPO"]);
option_source!(COMMIT, "commit", ["FILTER_COMMIT", "PLUGIN_COMMIT"]);
option_source!(TAG, "tag", ["FILTER_TAG", "PLUGIN_TAG"]);
option_source!(BRANCH, "branch", ["FILTER_BRANCH", "PLUGIN_BRANCH"]);
option_source!(STATUS, "status", ["FILTER_STATUS", "PLUGIN_STATUS"]);
option_source!(NUMBER, "number", ["FILTER_NUMBER", "PLUGIN_NUMBER"]);
option_source!(EVENT, "event", ["FILTER_EVENT", "PLUGIN_EVENT"]);
option_source!(DEPLOYED_TO, "deployed-to", ["FILTER_DEPLOYED_TO", "PLUGIN_DEPLOYED_TO"]);
option_source!(DEPLOY_TO, "deploy-to", ["DEPLOY_TO", "PLUGIN_DEPLOY_TO"]);
option_source!(FORK, "fork", ["FORK", "PLUGIN_FORK"]);
option_source!(VERBOSE, "verbose", ["VERBOSE", "PLUGIN_VERBOSE"]);
option_source!(PARAMS, "param", ["PARAMS", "PLUGIN_PARAMS"]);

/// Resolves options from explicit values and an environment lookup
pub struct Resolver<F> {
    lookup: F,
}

impl Resolver<fn(&str) -> Option<String>> {
    /// Resolver backed by the process environment
    pub fn from_env() -> Self {
        fn lookup(name: &str) -> Option<String> {
            std::env::var(name).ok()
        }
        Self { lookup }
    }
}

impl<F> Resolver<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Resolver backed by an arbitrary lookup function
    pub fn new(lookup: F) -> Self {
        Self { lookup }
    }

    /// First non-empty value among the flag and the option's variables
    pub fn value(&self, explicit: Option<&str>, source: &OptionSource) -> Option<String> {
        if let Some(v) = explicit.filter(|v| !v.is_empty()) {
            return Some(v.to_string());
        }
        source
            .env
            .iter()
            .filter_map(|name| (self.lookup)(*name))
            .find(|v| !v.is_empty())
    }

    /// Like [`Resolver::value`] but missing is an [`Error::Missing`]
    pub fn require(&self, explicit: Option<&str>, source: &OptionSource) -> Result<String> {
        self.value(explicit, source)
            .ok_or_else(|| Error::Missing(format!("{} is not set", source.name)))
    }

    /// List option: explicit values, or a comma separated variable
    pub fn list(&self, explicit: &[String], source: &OptionSource) -> Vec<String> {
        let explicit: Vec<String> = explicit
            .iter()
            .filter(|v| !v.is_empty())
            .cloned()
            .collect();
        if !explicit.is_empty() {
            return explicit;
        }
        self.value(None, source)
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Boolean option: the flag, or a truthy variable
    pub fn flag(&self, explicit: bool, source: &OptionSource) -> Result<bool> {
        if explicit {
            return Ok(true);
        }
        match self.value(None, source) {
            None => Ok(false),
            Some(v) => parse_bool(&v).ok_or_else(|| {
                Error::Config(format!("invalid value {:?} for {}", v, source.name))
            }),
        }
    }
}

fn parse_bool(v: &str) -> Option<bool> {
    match v.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Options as collected from the command line, before environment fallback
#[derive(Debug, Clone, Default)]
pub struct RawOptions {
    /// Build server URL
    pub server: Option<String>,
    /// Auth token
    pub token: Option<String>,
    /// Repository identifiers
    pub repos: Vec<String>,
    /// Commit filter
    pub commit: Option<String>,
    /// Tag filter
    pub tag: Option<String>,
    /// Branch filter
    pub branch: Option<String>,
    /// Status filter
    pub status: Option<String>,
    /// Build number filter, unparsed
    pub number: Option<String>,
    /// Event filter
    pub event: Option<String>,
    /// Deployed-to filter
    pub deployed_to: Option<String>,
    /// Deployment target
    pub deploy_to: Option<String>,
    /// Fork flag
    pub fork: bool,
    /// Verbose flag
    pub verbose: bool,
    /// `KEY=VALUE` parameters
    pub params: Vec<String>,
}

/// Validated configuration for one invocation
#[derive(Clone)]
pub struct TriggerConfig {
    /// Build server URL
    pub server: String,
    /// Auth token
    pub token: String,
    /// Repositories to process, in order
    pub repos: Vec<RepoId>,
    /// Build selection criteria
    pub filters: FilterSet,
    /// Start or deploy
    pub action: Action,
    /// Extra build parameters
    pub params: Params,
    /// Print the new build record
    pub verbose: bool,
}

impl std::fmt::Debug for TriggerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TriggerConfig")
            .field("server", &self.server)
            .field("token", &"<redacted>")
            .field("repos", &self.repos)
            .field("filters", &self.filters)
            .field("action", &self.action)
            .field("params", &self.params)
            .field("verbose", &self.verbose)
            .finish()
    }
}

impl TriggerConfig {
    /// Resolve and validate options from the process environment
    pub fn from_env(raw: &RawOptions) -> Result<Self> {
        Self::resolve(raw, &Resolver::from_env())
    }

    /// Resolve and validate options.
    ///
    /// Fails with [`Error::Missing`] when server, token or repository is
    /// missing, and with a configuration error when more than one of tag,
    /// branch, commit and deployed-to is set or an option value is malformed.
    /// Every repository identifier is parsed here, so one bad identifier
    /// fails the whole run before any repository is triggered.
    pub fn resolve<F>(raw: &RawOptions, resolver: &Resolver<F>) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let server = resolver.require(raw.server.as_deref(), &SERVER)?;
        let token = resolver.require(raw.token.as_deref(), &TOKEN)?;

        let repo_names = resolver.list(&raw.repos, &REPO);
        if repo_names.is_empty() {
            return Err(Error::Missing(format!("{} is not set", REPO.name)));
        }

        let number = resolver
            .value(raw.number.as_deref(), &NUMBER)
            .map(|n| {
                n.trim().parse::<u64>().map_err(|_| {
                    Error::Config(format!("invalid build number {:?}", n))
                })
            })
            .transpose()?;

        let filters = FilterSet {
            status: resolver
                .value(raw.status.as_deref(), &STATUS)
                .unwrap_or_else(|| DEFAULT_STATUS.to_string()),
            event: resolver.value(raw.event.as_deref(), &EVENT),
            number,
            commit: resolver.value(raw.commit.as_deref(), &COMMIT),
            tag: resolver.value(raw.tag.as_deref(), &TAG),
            branch: resolver.value(raw.branch.as_deref(), &BRANCH),
            deployed_to: resolver.value(raw.deployed_to.as_deref(), &DEPLOYED_TO),
        };
        filters.validate()?;

        let repos = repo_names
            .iter()
            .map(|r| RepoId::parse(r))
            .collect::<Result<Vec<_>>>()?;

        let action = Action::from_options(
            resolver.value(raw.deploy_to.as_deref(), &DEPLOY_TO),
            resolver.flag(raw.fork, &FORK)?,
        );

        Ok(Self {
            server,
            token,
            repos,
            filters,
            action,
            params: parse_pairs(resolver.list(&raw.params, &PARAMS)),
            verbose: resolver.flag(raw.verbose, &VERBOSE)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> Resolver<impl Fn(&str) -> Option<String>> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Resolver::new(move |name: &str| map.get(name).cloned())
    }

    fn required() -> RawOptions {
        RawOptions {
            server: Some("https://drone.example.com".into()),
            token: Some("secret".into()),
            repos: vec!["octocat/hello-world".into()],
            ..Default::default()
        }
    }

    #[test]
    fn test_flag_beats_env() {
        let r = env(&[("DRONE_SERVER", "https://env")]);
        assert_eq!(
            r.value(Some("https://flag"), &SERVER).as_deref(),
            Some("https://flag")
        );
        assert_eq!(r.value(None, &SERVER).as_deref(), Some("https://env"));
    }

    #[test]
    fn test_env_priority_order() {
        let r = env(&[("DRONE_TOKEN", "first"), ("PLUGIN_DRONE_TOKEN", "second")]);
        assert_eq!(r.value(None, &TOKEN).as_deref(), Some("first"));

        let r = env(&[("PLUGIN_DRONE_TOKEN", "second")]);
        assert_eq!(r.value(None, &TOKEN).as_deref(), Some("second"));
    }

    #[test]
    fn test_empty_values_are_unset() {
        let r = env(&[("FILTER_TAG", ""), ("PLUGIN_TAG", "v1")]);
        assert_eq!(r.value(Some(""), &TAG).as_deref(), Some("v1"));

        let r = env(&[("FILTER_TAG", "")]);
        assert_eq!(r.value(None, &TAG), None);
    }

    #[test]
    fn test_list_splits_env_on_commas() {
        let r = env(&[("PLUGIN_REPO", "a/b, c/d,,")]);
        assert_eq!(r.list(&[], &REPO), vec!["a/b", "c/d"]);
        assert_eq!(r.list(&["x/y".to_string()], &REPO), vec!["x/y"]);
    }

    #[test]
    fn test_flag_parsing() {
        let r = env(&[("PLUGIN_FORK", "TRUE"), ("VERBOSE", "0")]);
        assert!(r.flag(false, &FORK).unwrap());
        assert!(!r.flag(false, &VERBOSE).unwrap());
        assert!(r.flag(true, &VERBOSE).unwrap());

        let r = env(&[("FORK", "maybe")]);
        assert_eq!(r.flag(false, &FORK).unwrap_err().kind(), ErrorKind::Config);
    }

    #[test]
    fn test_missing_required() {
        let r = env(&[]);
        for (raw, missing) in [
            (
                RawOptions {
                    server: None,
                    ..required()
                },
                "drone server is not set",
            ),
            (
                RawOptions {
                    token: None,
                    ..required()
                },
                "drone token is not set",
            ),
            (
                RawOptions {
                    repos: vec![],
                    ..required()
                },
                "repo is not set",
            ),
        ] {
            let err = TriggerConfig::resolve(&raw, &r).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Missing);
            assert_eq!(err.message(), missing);
        }
    }

    #[test]
    fn test_required_from_env() {
        let r = env(&[
            ("PLUGIN_DRONE_SERVER", "https://drone"),
            ("DRONE_TOKEN", "t"),
            ("REPO", "a/b,c/d"),
        ]);
        let cfg = TriggerConfig::resolve(&RawOptions::default(), &r).unwrap();
        assert_eq!(cfg.server, "https://drone");
        assert_eq!(cfg.repos.len(), 2);
        assert_eq!(cfg.repos[1].to_string(), "c/d");
        assert_eq!(cfg.filters, FilterSet::default());
        assert_eq!(cfg.action, Action::Start { fork: false });
    }

    #[test]
    fn test_conflicting_filters_from_mixed_sources() {
        let r = env(&[("PLUGIN_BRANCH", "main")]);
        let raw = RawOptions {
            tag: Some("v1".into()),
            ..required()
        };
        let err = TriggerConfig::resolve(&raw, &r).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn test_missing_is_distinct_from_invalid_input() {
        let raw = RawOptions {
            status: Some("is not set".into()),
            number: Some("is not set".into()),
            ..required()
        };
        let err = TriggerConfig::resolve(&raw, &env(&[])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);

        let raw = RawOptions {
            token: Some(String::new()),
            ..required()
        };
        let err = TriggerConfig::resolve(&raw, &env(&[])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Missing);
    }

    #[test]
    fn test_empty_flag_does_not_conflict() {
        let raw = RawOptions {
            tag: Some(String::new()),
            branch: Some("main".into()),
            status: Some(String::new()),
            ..required()
        };
        let cfg = TriggerConfig::resolve(&raw, &env(&[])).unwrap();
        assert_eq!(cfg.filters.tag, None);
        assert_eq!(cfg.filters.branch.as_deref(), Some("main"));
        assert_eq!(cfg.filters.status, DEFAULT_STATUS);
    }

    #[test]
    fn test_invalid_number() {
        let r = env(&[("FILTER_NUMBER", "abc")]);
        let err = TriggerConfig::resolve(&required(), &r).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);

        let r = env(&[("FILTER_NUMBER", "42")]);
        let cfg = TriggerConfig::resolve(&required(), &r).unwrap();
        assert_eq!(cfg.filters.number, Some(42));
    }

    #[test]
    fn test_invalid_repository() {
        let raw = RawOptions {
            repos: vec!["a/b".into(), "broken".into()],
            ..required()
        };
        let err = TriggerConfig::resolve(&raw, &env(&[])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRepository);
        assert!(err.message().contains("broken"));
    }

    #[test]
    fn test_deploy_and_params() {
        let r = env(&[("PLUGIN_PARAMS", "A=1,B=2,BAD"), ("PLUGIN_DEPLOY_TO", "prod")]);
        let cfg = TriggerConfig::resolve(&required(), &r).unwrap();
        assert_eq!(
            cfg.action,
            Action::Deploy {
                environment: "prod".into()
            }
        );
        assert_eq!(cfg.params.len(), 2);
        assert_eq!(cfg.params.get("B").map(String::as_str), Some("2"));
    }

    #[test]
    fn test_debug_redacts_token() {
        let cfg = TriggerConfig::resolve(&required(), &env(&[])).unwrap();
        let debug = format!("{:?}", cfg);
        assert!(!debug.contains("secret"));
        assert!(debug.contains("<redacted>"));
    }
}
