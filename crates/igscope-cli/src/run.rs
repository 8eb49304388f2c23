//! `run` command: resolve inputs, fetch every profile, report and persist.
//!
//! Per-profile failures are reported on the progress line and never abort
//! the run. Only an empty username list, bad configuration, or a sink write
//! error stops the process.

use std::path::PathBuf;
use std::time::Duration;

use igscope_core::{normalize_username, AppConfig, RunInput};
use igscope_scraper::{
    BatchRunner, DirectEgress, ProfileClient, ProfileFetcher, ProxyUrlTemplate, RetryPolicy,
    SessionAllocator,
};

use crate::sink::JsonlSink;

/// Arguments of the `run` subcommand after clap parsing.
#[derive(Debug, Default)]
pub(crate) struct RunArgs {
    pub usernames: Vec<String>,
    pub input: Option<PathBuf>,
    pub concurrency: Option<usize>,
    pub output: Option<PathBuf>,
    pub dry_run: bool,
}

/// Fetches every requested profile.
///
/// # Errors
///
/// Returns an error if no usernames were supplied, the input file cannot be
/// read, the proxy template is invalid, the HTTP client cannot be built, or a
/// result cannot be written to the sink.
pub(crate) async fn run_profiles(config: &AppConfig, args: RunArgs) -> anyhow::Result<()> {
    let file_input = match &args.input {
        Some(path) => Some(read_input_file(path).await?),
        None => None,
    };
    let input = merge_input(args.usernames, file_input);
    input.validate()?;

    let concurrency = resolve_concurrency(args.concurrency, input.concurrency, config)?;

    if args.dry_run {
        let names: Vec<String> = input
            .usernames
            .iter()
            .filter_map(|u| normalize_username(u))
            .collect();
        println!(
            "dry-run: would fetch {} profiles with concurrency {concurrency}: [{}]",
            names.len(),
            names.join(", ")
        );
        return Ok(());
    }

    let client = ProfileClient::with_base_url(
        config.request_timeout_secs,
        &config.app_id,
        &config.user_agent,
        &config.api_base_url,
    )
    .map_err(|e| anyhow::anyhow!("failed to build profile client: {e}"))?;
    let policy = RetryPolicy::with_base_delay(Duration::from_secs(config.retry_base_delay_secs));
    let output = args.output.unwrap_or_else(|| config.output_path.clone());

    match &config.proxy_url {
        Some(template) => {
            let allocator = ProxyUrlTemplate::new(template)
                .map_err(|e| anyhow::anyhow!("IGSCOPE_PROXY_URL: {e}"))?;
            execute(client, allocator, policy, concurrency, &input.usernames, output).await
        }
        None => {
            tracing::info!("no proxy configured; using direct egress");
            execute(client, DirectEgress, policy, concurrency, &input.usernames, output).await
        }
    }
}

async fn execute<A>(
    client: ProfileClient,
    allocator: A,
    policy: RetryPolicy,
    concurrency: usize,
    usernames: &[String],
    output: PathBuf,
) -> anyhow::Result<()>
where
    A: SessionAllocator + 'static,
{
    let mut sink = JsonlSink::open(output).await?;
    let runner = BatchRunner::new(ProfileFetcher::new(client, allocator, policy), concurrency);
    let mut batch = runner.run(usernames);

    while let Some(completion) = batch.next().await {
        tracing::info!(progress = %completion, "profile processed");
        println!("{completion}");
        if let Some(metrics) = completion.outcome.metrics() {
            sink.append(metrics).await?;
        }
    }

    println!(
        "done: {} succeeded, {} failed, {} records written to {}",
        batch.succeeded(),
        batch.failed(),
        sink.written(),
        sink.path().display()
    );
    Ok(())
}

async fn read_input_file(path: &std::path::Path) -> anyhow::Result<RunInput> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| anyhow::anyhow!("failed to read input file {}: {e}", path.display()))?;
    Ok(RunInput::from_json_str(&raw)?)
}

/// Positional usernames come first, followed by those from the input file.
fn merge_input(positional: Vec<String>, file_input: Option<RunInput>) -> RunInput {
    let mut usernames = positional;
    let mut concurrency = None;
    if let Some(file_input) = file_input {
        usernames.extend(file_input.usernames);
        concurrency = file_input.concurrency;
    }
    RunInput {
        usernames,
        concurrency,
    }
}

/// Flag beats input file beats environment. Only the winning value is
/// checked, so a valid flag overrides `IGSCOPE_CONCURRENCY=0`.
fn resolve_concurrency(
    flag: Option<usize>,
    from_input: Option<usize>,
    config: &AppConfig,
) -> anyhow::Result<usize> {
    let (concurrency, source) = match (flag, from_input) {
        (Some(n), _) => (n, "--concurrency"),
        (None, Some(n)) => (n, "input file concurrency"),
        (None, None) => (config.concurrency, "IGSCOPE_CONCURRENCY"),
    };
    if concurrency == 0 {
        anyhow::bail!("{source} must be at least 1");
    }
    Ok(concurrency)
}
