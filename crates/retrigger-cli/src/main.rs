#[cfg(target_env = "musl")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use clap::{CommandFactory, Parser};
use retrigger_core::error::EXIT_USAGE;
use retrigger_core::output::{build_json, follow_message};
use retrigger_core::{ErrorKind, RawOptions, Resolver, Triggered, TriggerConfig};
use std::io::Write;
use tracing_subscriber::{filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt};
use tracing_subscriber::{EnvFilter, Layer};

/// Trigger drone builds or deployments
///
/// Every option can also be set through the environment variables listed
/// with it; the flag wins when both are present.
#[derive(Parser)]
#[command(name = "retrigger", version, about = "Trigger drone builds or deployments")]
struct Cli {
    /// Verbose output [env: VERBOSE, PLUGIN_VERBOSE]
    #[arg(long)]
    verbose: bool,

    /// Drone server URL [env: DRONE_SERVER, PLUGIN_DRONE_SERVER]
    #[arg(short = 's', long, value_name = "URL")]
    drone_server: Option<String>,

    /// Drone auth token [env: DRONE_TOKEN, PLUGIN_DRONE_TOKEN]
    #[arg(short = 't', long, value_name = "TOKEN")]
    drone_token: Option<String>,

    /// Repository, eg. foo/bar; repeatable or comma-separated [env: REPO, PLUGIN_REPO]
    #[arg(short = 'r', long, value_name = "REPO", value_delimiter = ',')]
    repo: Vec<String>,

    /// Filter by commit sha [env: FILTER_COMMIT, PLUGIN_COMMIT]
    #[arg(short = 'c', long)]
    commit: Option<String>,

    /// Filter by tag [env: FILTER_TAG, PLUGIN_TAG]
    #[arg(long)]
    tag: Option<String>,

    /// Filter by branch [env: FILTER_BRANCH, PLUGIN_BRANCH]
    #[arg(short = 'b', long)]
    branch: Option<String>,

    /// Filter by build status, default "success" [env: FILTER_STATUS, PLUGIN_STATUS]
    #[arg(long)]
    status: Option<String>,

    /// Filter by build number [env: FILTER_NUMBER, PLUGIN_NUMBER]
    #[arg(long)]
    number: Option<String>,

    /// Filter by trigger event [env: FILTER_EVENT, PLUGIN_EVENT]
    #[arg(long)]
    event: Option<String>,

    /// Filter by environment deployed to [env: FILTER_DEPLOYED_TO, PLUGIN_DEPLOYED_TO]
    #[arg(long)]
    deployed_to: Option<String>,

    /// Environment to deploy to; if set a deployment is triggered [env: DEPLOY_TO, PLUGIN_DEPLOY_TO]
    #[arg(short = 'd', long)]
    deploy_to: Option<String>,

    /// Start the build under a new build number [env: FORK, PLUGIN_FORK]
    #[arg(long)]
    fork: bool,

    /// Custom parameter in KEY=value format; repeatable [env: PARAMS, PLUGIN_PARAMS]
    #[arg(short = 'p', long = "param", value_name = "KEY=VALUE")]
    params: Vec<String>,
}

impl Cli {
    fn into_raw(self) -> RawOptions {
        RawOptions {
            server: self.drone_server,
            token: self.drone_token,
            repos: self.repo,
            commit: self.commit,
            tag: self.tag,
            branch: self.branch,
            status: self.status,
            number: self.number,
            event: self.event,
            deployed_to: self.deployed_to,
            deploy_to: self.deploy_to,
            fork: self.fork,
            verbose: self.verbose,
            params: self.params,
        }
    }
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            std::process::exit(if e.use_stderr() { EXIT_USAGE } else { 0 });
        }
    };
    std::process::exit(run(cli.into_raw()));
}

/// Install the stderr tracing subscriber; `RUST_LOG` overrides the default level
fn init_tracing(verbose: bool) {
    let default_level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    let env_filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_filter(env_filter),
        )
        .try_init();
}

fn run(raw: RawOptions) -> i32 {
    let resolver = Resolver::from_env();
    let config = match TriggerConfig::resolve(&raw, &resolver) {
        Ok(config) => config,
        Err(e) => {
            // Missing required input: show usage before the error
            if e.kind() == ErrorKind::Missing {
                let _ = Cli::command().write_help(&mut std::io::stderr());
                eprintln!();
            }
            eprintln!("error: {}", e.message());
            return e.exit_code();
        }
    };

    init_tracing(config.verbose);
    tracing::debug!(?config, "resolved configuration");

    let verbose = config.verbose;
    let result = retrigger_core::trigger_sync(&config, |t: &Triggered| {
        eprintln!("{}", follow_message(t));
        if verbose {
            let json = build_json(&t.build)?;
            let stdout = std::io::stdout();
            let mut lock = stdout.lock();
            writeln!(lock, "{}", json)?;
        }
        Ok(())
    });

    match result {
        Ok(_) => 0,
        Err(e) => {
            eprintln!("error: {}", e);
            e.exit_code()
        }
    }
}
