// src/cli.rs
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Result, eyre};

use crate::config::consts::STORE_DIR;
use crate::config::options::{
    AppOptions, ExportFormat, GithubOptions, NotifyOptions, RetentionPolicy, StoreOptions,
    TelegramOptions, dashboard_url,
};
use crate::core::Stamp;
use crate::notify::{self, NullNotifier, Notifier};
use crate::progress::ConsoleProgress;
use crate::report;
use crate::runner::{self, RunOutcome};
use crate::source::JsonFileSource;
use crate::store::{self, RunLock};

/// Menu availability monitor.
#[derive(Debug, Parser)]
#[command(name = "menu_watch", version, about = "Menu availability monitor: snapshot diff, status history, alerts")]
pub struct Cli {
    /// Working directory: lock file, debug log and the local store
    #[arg(long, global = true, default_value = STORE_DIR)]
    store_dir: PathBuf,

    /// Keep snapshot and ledger in this GitHub repository ("owner/name")
    #[arg(long, global = true, env = "GITHUB_REPOSITORY")]
    github_repo: Option<String>,

    /// Token for the GitHub contents API
    #[arg(long, global = true, env = "GITHUB_TOKEN", hide_env_values = true)]
    github_token: Option<String>,

    /// Use the local store even when GitHub settings are present
    #[arg(long, global = true)]
    local: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// One monitoring run over the extraction output
    Run {
        /// JSON array of scraped records, or `-` for stdin
        #[arg(long, short)]
        input: PathBuf,

        /// Log the alert instead of sending it
        #[arg(long)]
        no_notify: bool,

        #[arg(long, env = "TELEGRAM_TOKEN", hide_env_values = true)]
        telegram_token: Option<String>,

        #[arg(long, env = "TELEGRAM_CHAT_ID")]
        telegram_chat_id: Option<String>,

        /// Owner of the Pages dashboard linked from the alert
        #[arg(long, env = "GITHUB_ACTOR")]
        github_actor: Option<String>,

        /// Keep only the last N transitions per item
        #[arg(long)]
        keep_last: Option<usize>,

        #[command(flatten)]
        export: ExportArgs,
    },

    /// Print per-item statistics from the stored ledger
    Stats {
        /// Only items of this section
        #[arg(long)]
        section: Option<String>,
    },

    /// Write a report from the stored ledger
    Export {
        #[arg(long, value_enum, default_value = "history")]
        table: TableArg,

        #[command(flatten)]
        export: ExportArgs,
    },
}

#[derive(Debug, Args)]
struct ExportArgs {
    /// Output directory
    #[arg(long, short)]
    out: Option<PathBuf>,

    #[arg(long, value_enum, default_value = "csv")]
    format: FormatArg,

    /// File name without extension
    #[arg(long)]
    name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    Csv,
    Tsv,
}

impl From<FormatArg> for ExportFormat {
    fn from(f: FormatArg) -> Self {
        match f {
            FormatArg::Csv => ExportFormat::Csv,
            FormatArg::Tsv => ExportFormat::Tsv,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum TableArg {
    History,
    Status,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let opts = build_options(&cli);
    crate::log::init(&opts.log_path());
    logd!("options: {opts:?}");

    match &cli.command {
        Command::Run { input, no_notify, .. } => monitor(&opts, input.clone(), *no_notify),
        Command::Stats { section } => print_stats(&opts, section.as_deref()),
        Command::Export { table, .. } => export(&opts, *table),
    }
}

/// Resolve flags and environment into one explicit options value.
fn build_options(cli: &Cli) -> AppOptions {
    let mut opts = AppOptions { work_dir: cli.store_dir.clone(), ..AppOptions::default() };

    opts.store = match (&cli.github_repo, &cli.github_token) {
        (Some(repo), Some(token)) if !cli.local => StoreOptions::Github(GithubOptions::new(repo, token)),
        _ => StoreOptions::Local { dir: cli.store_dir.clone() },
    };

    let export_args = match &cli.command {
        Command::Run { export, .. } | Command::Export { export, .. } => Some(export),
        Command::Stats { .. } => None,
    };
    if let Some(args) = export_args {
        opts.export.format = args.format.into();
        if let Some(dir) = &args.out {
            opts.export.set_dir(dir);
        }
        if let Some(name) = &args.name {
            opts.export.set_stem(name);
        }
    }

    if let Command::Run { no_notify, telegram_token, telegram_chat_id, github_actor, keep_last, .. } = &cli.command {
        let telegram = match (telegram_token, telegram_chat_id) {
            (Some(token), Some(chat)) if !no_notify => Some(TelegramOptions::new(token, chat)),
            _ => None,
        };
        opts.notify = NotifyOptions {
            telegram,
            dashboard_url: dashboard_url(github_actor.as_deref(), cli.github_repo.as_deref()),
        };
        if let Some(n) = keep_last {
            opts.retention = RetentionPolicy::KeepLast(*n);
        }
    }

    opts
}

fn monitor(opts: &AppOptions, input: PathBuf, no_notify: bool) -> Result<()> {
    let mut lock = RunLock::new(&opts.work_dir)?;
    let _guard = lock.acquire()?;

    let store = store::open(&opts.store);
    let notifier: Box<dyn Notifier> = if no_notify {
        Box::new(NullNotifier)
    } else {
        notify::from_options(&opts.notify)
    };
    if opts.notify.telegram.is_none() && !no_notify {
        logw!("no Telegram token/chat configured; the alert will only be logged");
    }
    logf!("run started: store {}", store.describe());

    let mut source = JsonFileSource::new(input);
    let mut progress = ConsoleProgress::default();
    let outcome = runner::run(
        opts,
        &mut source,
        store.as_ref(),
        notifier.as_ref(),
        Stamp::now(),
        Some(&mut progress),
    );

    match outcome {
        RunOutcome::Completed(rep) => {
            let t = &rep.summary.totals;
            println!(
                "{} items: {} ON, {} OFF ({} disappeared); {} changes",
                t.total,
                t.on,
                t.off,
                t.disappeared,
                rep.summary.changes.len()
            );
            if let Some(path) = &rep.report {
                println!("Wrote {}", path.display());
            }
            if !rep.ledger_saved || !rep.snapshot_saved {
                eprintln!("warning: state was not fully saved, see {}", opts.log_path().display());
            }
            Ok(())
        }
        RunOutcome::Failed { reason } => Err(eyre!("run failed: {reason}")),
    }
}

fn print_stats(opts: &AppOptions, section: Option<&str>) -> Result<()> {
    let store = store::open(&opts.store);
    let ledger = runner::load_ledger(store.as_ref())?;
    let lines = report::stats_lines(&ledger, section);
    if lines.is_empty() {
        println!("No history recorded yet.");
    }
    for line in lines {
        println!("{line}");
    }
    Ok(())
}

fn export(opts: &AppOptions, table: TableArg) -> Result<()> {
    let store = store::open(&opts.store);
    let ledger = runner::load_ledger(store.as_ref())?;
    let table = match table {
        TableArg::History => report::history_table(&ledger),
        TableArg::Status => report::status_table(&ledger),
    };
    let path = crate::file::write_export(&opts.export, &table)?;
    println!("Wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("menu_watch").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn run_flags_reach_options() {
        let cli = parse(&[
            "run", "--input", "scrape.json", "--local", "--store-dir", "state", "--no-notify",
            "--keep-last", "50", "--format", "tsv", "--out", "reports", "--name", "semana 1",
        ]);
        let opts = build_options(&cli);
        assert_eq!(opts.work_dir, PathBuf::from("state"));
        assert_eq!(opts.store, StoreOptions::Local { dir: PathBuf::from("state") });
        assert_eq!(opts.retention, RetentionPolicy::KeepLast(50));
        assert_eq!(opts.notify.telegram, None);
        assert_eq!(opts.export.out_path(), PathBuf::from("reports").join("semana_1.tsv"));
    }

    #[test]
    fn github_store_needs_repo_and_token() {
        let cli = parse(&["stats", "--github-repo", "maria/cardapio", "--github-token", "t0k"]);
        match build_options(&cli).store {
            StoreOptions::Github(gh) => assert_eq!(gh.repo, "maria/cardapio"),
            other => panic!("expected GitHub store, got {other:?}"),
        }
    }

    #[test]
    fn export_table_choice() {
        let cli = parse(&["export", "--table", "status"]);
        assert!(matches!(cli.command, Command::Export { table: TableArg::Status, .. }));
    }

    #[test]
    fn run_requires_input() {
        assert!(Cli::try_parse_from(["menu_watch", "run"]).is_err());
    }
}
