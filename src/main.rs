mod config;
mod fetch;
mod github;
mod history;
mod metrics;
mod prompt;
mod report;

use std::time::Duration;

use chrono::Utc;
use clap::Parser;
use indicatif::ProgressBar;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use github::GitHubClient;
use history::SnapshotStore;
use metrics::status;
use metrics::MetricsRecord;

/// pr-pulse — analyzes a repository's open GitHub pull requests for one
/// author: per-PR metrics, status filtering, and changes since the
/// previous run.
#[derive(Parser, Debug)]
#[command(name = "pr-pulse", version, about)]
struct Cli {
    /// GitHub token (overrides GITHUB_TOKEN env var and config file)
    #[arg(long)]
    token: Option<String>,

    /// Repository owner (overrides GITHUB_REPO_OWNER env var)
    #[arg(long)]
    repo_owner: Option<String>,

    /// Repository name (overrides GITHUB_REPO_NAME env var)
    #[arg(long)]
    repo_name: Option<String>,

    /// GitHub username to analyze (skips interactive selection)
    #[arg(long)]
    user: Option<String>,

    /// Comma-separated PR statuses to include (ALL selects everything)
    #[arg(long)]
    status: Option<String>,

    /// Field to sort by, descending (default: Days Open)
    #[arg(long)]
    sort: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,

    /// Disable progress bars
    #[arg(long)]
    no_progress: bool,

    /// Run without prompts (requires --user)
    #[arg(long, requires = "user")]
    non_interactive: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    info!("loading configuration");
    let mut config = config::Config::load()?;
    if cli.token.is_some() {
        config.github.token = cli.token.clone();
    }
    if cli.repo_owner.is_some() {
        config.github.owner = cli.repo_owner.clone();
    }
    if cli.repo_name.is_some() {
        config.github.repo = cli.repo_name.clone();
    }

    let token = config
        .github
        .token
        .clone()
        .ok_or("Missing GitHub token. Provide via --token or GITHUB_TOKEN env var")?;
    let owner = config
        .github
        .owner
        .clone()
        .ok_or("Missing repository owner. Provide via --repo-owner or GITHUB_REPO_OWNER env var")?;
    let repo = config
        .github
        .repo
        .clone()
        .ok_or("Missing repository name. Provide via --repo-name or GITHUB_REPO_NAME env var")?;

    debug!(%owner, %repo, "resolved repository");
    let client = GitHubClient::new(token, owner, repo);
    let store = SnapshotStore::new(&config.history.path);

    run(&cli, &config, &client, &store).await
}

/// The full pipeline: select user, list PRs, batch-fetch details, filter by
/// status, summarize, sort, diff against the previous snapshot, persist,
/// render. Empty result sets at any stage end the run with a notice rather
/// than an error.
async fn run(
    cli: &Cli,
    config: &config::Config,
    client: &GitHubClient,
    store: &SnapshotStore,
) -> Result<(), Box<dyn std::error::Error>> {
    let user = match &cli.user {
        Some(user) => user.clone(),
        None => {
            info!("listing PR authors for interactive selection");
            let authors = client.list_authors().await?;
            if authors.is_empty() {
                report::notice("No open PRs found");
                return Ok(());
            }
            match prompt::select_one("Select user", &authors, None)? {
                Some(user) => user,
                None => return Ok(()),
            }
        }
    };

    info!(%user, "fetching open PRs");
    let spinner = (!cli.no_progress).then(|| {
        let spinner = ProgressBar::new_spinner();
        spinner.set_message("Fetching PRs...");
        spinner.enable_steady_tick(Duration::from_millis(100));
        spinner
    });
    let prs = client.list_pull_requests_by_user(&user).await;
    if let Some(spinner) = &spinner {
        spinner.finish_and_clear();
    }
    let prs = prs?;

    if prs.is_empty() {
        report::notice(&format!("No PRs found for user {user}"));
        return Ok(());
    }

    info!(
        prs = prs.len(),
        batch_size = config.fetch.batch_size,
        "fetching PR details"
    );
    let bar = (!cli.no_progress).then(|| ProgressBar::new(prs.len() as u64));
    let details = fetch::fetch_all_details(
        client,
        &prs,
        config.fetch.batch_size,
        config.fetch.pause(),
        bar.as_ref(),
    )
    .await;
    if let Some(bar) = &bar {
        bar.finish_and_clear();
    }
    let details = details?;

    let available = status::aggregate_statuses(&prs, &details);
    let selected = match &cli.status {
        Some(raw) => raw
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        None if cli.non_interactive => vec![status::ALL_MARKER.to_string()],
        None => prompt::select_many(
            "Select PR statuses (ALL selects everything)",
            &available,
            status::ALL_MARKER,
        )?,
    };
    if selected.is_empty() {
        report::notice("No statuses selected");
        return Ok(());
    }
    let selected = status::expand_selection(&selected, &available);
    debug!(?selected, "status filter");

    let now = Utc::now();
    let mut records: Vec<MetricsRecord> = prs
        .iter()
        .zip(&details)
        .filter(|(pr, detail)| status::matches(pr, &detail.reviews, &selected))
        .map(|(pr, detail)| metrics::summarize(pr, detail, now))
        .collect();

    if records.is_empty() {
        report::notice("No PRs found matching selected statuses");
        return Ok(());
    }

    let sort_field = match &cli.sort {
        Some(field) => field.clone(),
        None if cli.non_interactive => metrics::DEFAULT_SORT_FIELD.to_string(),
        None => {
            let fields: Vec<String> = metrics::FIELDS.iter().map(|s| s.to_string()).collect();
            prompt::select_one("Sort by", &fields, Some(metrics::DEFAULT_SORT_FIELD))?
                .unwrap_or_else(|| metrics::DEFAULT_SORT_FIELD.to_string())
        }
    };
    metrics::sort_by_field(&mut records, &sort_field)?;
    info!(records = records.len(), sort_field = %sort_field, "summarized PRs");

    let mut history = store.load();
    let previous = history
        .get(&user)
        .map(|snapshot| snapshot.data.clone())
        .unwrap_or_default();
    let rows = history::diff::diff(&records, &previous);

    // Persist before rendering: a failed save must abort the run without
    // emitting partial table/JSON output.
    history.record(&user, records);
    store.save(&history)?;

    match cli.output {
        OutputFormat::Json => report::print_json(&rows)?,
        OutputFormat::Table => report::print_table(&rows),
    }
    info!("done");

    Ok(())
}
