use std::time::Duration;

use clap::Parser;
use jiff::Timestamp;

mod config;
mod data;
#[cfg(test)]
mod fake;
mod github;
mod output;
mod paging;
mod report;
mod transport;

use config::{Config, ConfigError, required};
use github::GitHub;
use output::{fatal, write_report};
use transport::HttpTransport;

/// Summarize recent pull request and commit activity on a GitHub repository
#[derive(Parser)]
#[command(name = "gh-activity", version)]
#[command(about = "Summarize recent pull request and commit activity on a GitHub repository as JSON")]
#[command(long_about = r#"gh-activity - Summarize recent GitHub repository activity as JSON

Lists pull requests updated and commits authored on the default branch within
the last day (see --hours) and prints a JSON document to stdout.

REQUIREMENTS:
    GITHUB_REPOSITORY   repository in OWNER/NAME form
    GITHUB_TOKEN        token with read access to the repository

Set RUST_LOG (e.g. RUST_LOG=gh_activity=debug) to control diagnostics on stderr."#)]
struct Args {
    /// Repository to summarize
    #[arg(long, env = "GITHUB_REPOSITORY", value_name = "OWNER/NAME")]
    repo: Option<String>,

    /// GitHub access token
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// REST API root
    #[arg(long, env = "GITHUB_API_URL", default_value = "https://api.github.com")]
    api_url: String,

    /// Length of the activity window in hours
    #[arg(long, default_value_t = 24, value_parser = clap::value_parser!(u32).range(1..))]
    hours: u32,

    /// Read commits from this branch instead of the default branch
    #[arg(short, long)]
    branch: Option<String>,

    /// Skip the per-item requests for line, file and commit counts
    #[arg(long)]
    no_details: bool,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 30, value_name = "SECONDS")]
    timeout: u64,

    /// Print the report on a single line
    #[arg(long)]
    compact: bool,
}

impl Args {
    fn into_config(self) -> Result<Config, ConfigError> {
        let repo = required(self.repo, "GITHUB_REPOSITORY")?.parse()?;
        let token = required(self.token, "GITHUB_TOKEN")?;
        Ok(Config {
            repo,
            token,
            api_url: self.api_url,
            hours: self.hours,
            branch: self.branch,
            fetch_details: !self.no_details,
            timeout: Duration::from_secs(self.timeout),
            compact: self.compact,
        })
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("gh_activity=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Args::parse().into_config().unwrap_or_else(|err| fatal(err));

    let since = report::cutoff(Timestamp::now(), config.hours).unwrap_or_else(|err| fatal(err));

    let transport = HttpTransport::new(&config.api_url, &config.token, config.timeout)
        .unwrap_or_else(|err| fatal(err));
    let github = GitHub::new(transport).fetch_details(config.fetch_details);

    let report = github
        .collect_activity(&config.repo, since, config.branch.as_deref())
        .unwrap_or_else(|err| fatal(err));

    if let Err(err) = write_report(std::io::stdout().lock(), &report, config.compact) {
        fatal(format_args!("failed to write report: {err}"));
    }
}
