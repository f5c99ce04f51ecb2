use chrono::{DateTime, Local};
use clap::{Parser, Subcommand};
use ecobrowse::app::{Event, Notice};
use ecobrowse::notifier::StoreWatcher;
use ecobrowse::observability::init_tracing;
use ecobrowse::report::{Report, ReportFormat};
use ecobrowse::scoring::{benchmark, BenchmarkOutcome, HeuristicScorer, SiteBenchmark, POPULAR_SITES};
use ecobrowse::{initialize, Config, Dashboard, EcoBrowseError, Result, Timeframe};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "ecobrowse", version)]
#[command(about = "Track website eco-efficiency scores and report on them by week, month or year")]
struct Cli {
    /// Configuration file (default: platform config location)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the score history
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Score a website and add it to the history
    Analyze {
        /// Website URL; https:// is assumed when no scheme is given
        url: String,
        /// Skip tips and greener alternatives
        #[arg(long)]
        no_advice: bool,
    },

    /// Print aggregated statistics
    Report {
        /// weekly, monthly or annual (default: from config)
        #[arg(short, long)]
        timeframe: Option<Timeframe>,
    },

    /// Write the aggregated report to a file
    Export {
        #[arg(short, long)]
        timeframe: Option<Timeframe>,
        /// markdown, csv or text
        #[arg(short, long, default_value = "markdown")]
        format: ReportFormat,
        /// Output directory (default: from config, else current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List stored records, newest first
    History {
        /// Maximum number of records to show
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// Delete every stored record
    Clear {
        /// Confirm deletion
        #[arg(long)]
        yes: bool,
    },

    /// Score well-known websites for comparison, best first
    Popular {
        /// Sites to score instead of the built-in list
        sites: Vec<String>,
    },

    /// Reprint the report whenever the history changes
    Watch {
        #[arg(short, long)]
        timeframe: Option<Timeframe>,
        /// Polling interval in milliseconds
        #[arg(long, default_value = "1000")]
        interval_ms: u64,
        /// Stop after this many polls (default: run until interrupted)
        #[arg(long)]
        iterations: Option<u64>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let _guard = init_tracing(&config, config.resolved_data_dir(), cli.verbose.then_some("debug"));

    match run(cli.command, config) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::load()?,
    };
    if let Some(dir) = &cli.data_dir {
        config.data_dir = Some(dir.to_string_lossy().into_owned());
    }
    Ok(config)
}

/// Runs one command; `Ok(false)` means it finished but reported an error notice.
fn run(command: Command, mut config: Config) -> Result<bool> {
    if let Command::Export {
        output: Some(dir), ..
    } = &command
    {
        config.export_dir = Some(dir.to_string_lossy().into_owned());
    }

    let mut services = initialize(&config)?;
    let dashboard = &mut services.dashboard;
    dashboard.mount()?;

    match command {
        Command::Analyze { url, no_advice } => {
            dashboard.state_mut().advice_enabled = !no_advice;
            dashboard.dispatch(Event::AnalyzeRequested { input: url })?;
            print_analysis(dashboard);
        }
        Command::Report { timeframe } => {
            select(dashboard, timeframe)?;
            print_report(dashboard)?;
        }
        Command::Export {
            timeframe, format, ..
        } => {
            select(dashboard, timeframe)?;
            dashboard.dispatch(Event::ExportRequested { format })?;
            if let Some(path) = &dashboard.state().last_export {
                println!("{}", path.display());
            }
        }
        Command::History { limit } => {
            print_history(dashboard, limit);
        }
        Command::Clear { yes } => {
            if !yes {
                return Err(EcoBrowseError::Config(
                    "refusing to clear without --yes".to_string(),
                ));
            }
            dashboard.dispatch(Event::ClearRequested)?;
        }
        Command::Popular { sites } => {
            if !print_popular(&sites) {
                report_notices(dashboard);
                return Ok(false);
            }
        }
        Command::Watch {
            timeframe,
            interval_ms,
            iterations,
        } => {
            select(dashboard, timeframe)?;
            watch(&services.notifier, services.store_path.clone(), dashboard, interval_ms, iterations)?;
        }
    }

    Ok(report_notices(dashboard))
}

fn select(dashboard: &mut Dashboard, timeframe: Option<Timeframe>) -> Result<()> {
    if let Some(timeframe) = timeframe {
        dashboard.dispatch(Event::TimeframeSelected(timeframe))?;
    }
    Ok(())
}

/// Prints pending notices to stderr; returns false if any was an error.
fn report_notices(dashboard: &mut Dashboard) -> bool {
    let notices: Vec<Notice> = dashboard.take_notices();
    for notice in &notices {
        eprintln!("{notice}");
    }
    !notices.iter().any(Notice::is_error)
}

fn print_analysis(dashboard: &Dashboard) {
    let state = dashboard.state();
    let Some(analysis) = &state.last_analysis else {
        return;
    };

    println!("{}", analysis.url);
    println!(
        "  Score:        {}/100 ({} efficiency, higher is better)",
        (analysis.score * 100.0).round(),
        analysis.rating()
    );
    #[allow(clippy::cast_precision_loss)]
    let megabytes = analysis.data_transfer_bytes as f64 / 1024.0 / 1024.0;
    println!("  Transfer:     {megabytes:.2} MB");
    println!("  Server:       {:.1}% efficient", analysis.server_efficiency * 100.0);
    println!("  Renewables:   {:.1}%", analysis.renewable_share * 100.0);
    println!("  {}", analysis.calculation_notes);

    if let Some(advice) = &state.advice {
        if !advice.suggestions.is_empty() {
            println!("\nTips to reduce footprint:");
            for tip in &advice.suggestions {
                println!("  - {tip}");
            }
        }
        if !advice.alternative_websites.is_empty() {
            println!("\nGreener alternatives:");
            for site in &advice.alternative_websites {
                println!("  - {site}");
            }
        }
    }
}

fn print_report(dashboard: &Dashboard) -> Result<()> {
    let state = dashboard.state();
    match Report::build(&state.summaries, state.timeframe, Local::now().date_naive()) {
        Ok(report) => print!("{}", report.render(ReportFormat::Text)),
        Err(EcoBrowseError::NoData) => println!("No data for the {} view yet.", state.timeframe),
        Err(e) => return Err(e),
    }
    Ok(())
}

/// Prints the benchmark table; returns false if any site failed.
fn print_popular(sites: &[String]) -> bool {
    let sites: Vec<&str> = if sites.is_empty() {
        POPULAR_SITES.to_vec()
    } else {
        sites.iter().map(String::as_str).collect()
    };

    let rows = benchmark(&HeuristicScorer, &sites);
    for (rank, row) in rows.iter().enumerate() {
        match (&row.outcome, row.rounded()) {
            (BenchmarkOutcome::Failed(error), _) => println!("{:>2}  {:<24}  error: {error}", rank + 1, row.site),
            (_, score) => println!("{:>2}  {:<24}  {:>3}", rank + 1, row.site, score.unwrap_or_default()),
        }
    }
    println!("\nScores range from 0 (worst) to 100 (best).");
    !rows.iter().any(SiteBenchmark::is_failed)
}

fn print_history(dashboard: &Dashboard, limit: Option<usize>) {
    let records = &dashboard.state().records;
    if records.is_empty() {
        println!("No records.");
        return;
    }

    for record in records.iter().take(limit.unwrap_or(usize::MAX)) {
        let when = DateTime::from_timestamp_millis(record.timestamp).map_or_else(
            || record.timestamp.to_string(),
            |utc| utc.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string(),
        );
        println!("{when}  {:>3}  {}", (record.score * 100.0).round(), record.website_url);
    }
}

fn watch(
    notifier: &ecobrowse::notifier::ChangeNotifier,
    store_path: PathBuf,
    dashboard: &mut Dashboard,
    interval_ms: u64,
    iterations: Option<u64>,
) -> Result<()> {
    let mut watcher = StoreWatcher::new(store_path);
    let interval = Duration::from_millis(interval_ms);

    print_report(dashboard)?;
    let mut polls = 0_u64;
    let mut last_error: Option<String> = None;
    while iterations.map_or(true, |limit| polls < limit) {
        std::thread::sleep(interval);
        polls += 1;

        match watcher.poll(dashboard.store(), notifier) {
            Ok(_) => last_error = None,
            Err(e) => {
                let error = e.to_string();
                // Report once per failure streak; the view keeps its last good state.
                if last_error.as_ref() != Some(&error) {
                    dashboard.dispatch(Event::RecordsLoaded {
                        records: Vec::new(),
                        error: Some(error.clone()),
                    })?;
                    last_error = Some(error);
                }
            }
        }
        if dashboard.sync()? {
            println!();
            print_report(dashboard)?;
        }
        report_notices(dashboard);
    }
    Ok(())
}
