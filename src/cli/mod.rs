pub mod date_arg;
pub mod report;

use std::{
    io::{IsTerminal, Write},
    path::PathBuf,
};

use anyhow::Result;
use clap::{Parser, Subcommand};
use date_arg::DateArgs;
use report::{format_list_line, format_stats_line, format_streak_line};
use tracing::level_filters::LevelFilter;

use crate::{
    calendar::{mini_calendar, MAX_CALENDAR_DAYS},
    config::Config,
    storage::task_storage::{JsonTaskStorage, TaskStorage},
    tracker::{DoneOutcome, Tracker},
    utils::{
        clock::{Clock, DefaultClock},
        dir::application_path,
        logging::{enable_logging, resolve_level},
        time::format_day,
    },
};

#[derive(Parser, Debug)]
#[command(name = "streaks", version, about = "Track daily tasks and streaks", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(long, global = true, help = "Print logs to the console, everything down to trace")]
    log: bool,
    #[arg(
        long = "log-filter",
        global = true,
        help = "Log level, e.g. debug or off. Overrides --log and log_level from config.toml"
    )]
    log_filter: Option<LevelFilter>,
    #[arg(
        long,
        global = true,
        help = "Application directory. By default uses $XDG_STATE_HOME or $HOME/.local/state"
    )]
    dir: Option<PathBuf>,
}

/// Task names may be given as several words, so quoting is optional.
#[derive(Debug, Clone, clap::Args)]
struct TaskName {
    #[arg(required = true, value_name = "NAME")]
    words: Vec<String>,
}

impl TaskName {
    fn joined(&self) -> String {
        self.words.join(" ")
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(about = "Add a task, e.g. add \"Write code\"")]
    Add {
        #[command(flatten)]
        name: TaskName,
    },
    #[command(about = "List tasks with current/best streaks")]
    List,
    #[command(about = "Mark task done for today, e.g. done \"Write code\"")]
    Done {
        #[command(flatten)]
        name: TaskName,
        #[command(flatten)]
        date: DateArgs,
    },
    #[command(about = "Undo a completion, today by default")]
    Undo {
        #[command(flatten)]
        name: TaskName,
        #[command(flatten)]
        date: DateArgs,
    },
    #[command(about = "Clear every completion of a task. The task itself is kept")]
    Reset {
        #[command(flatten)]
        name: TaskName,
    },
    #[command(
        alias = "streak",
        about = "Show streaks for a task or the best streak overall"
    )]
    Streaks {
        #[arg(value_name = "NAME")]
        words: Vec<String>,
    },
    #[command(about = "Mini calendar for a task over the last days")]
    Calendar {
        #[command(flatten)]
        name: TaskName,
        #[arg(
            long,
            value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_CALENDAR_DAYS)),
            help = "Number of days to show. Defaults to calendar_days from config.toml"
        )]
        days: Option<u32>,
    },
    #[command(about = "Totals per task")]
    Stats,
    #[command(about = "Tasks completed on a day, today by default")]
    Completed {
        #[command(flatten)]
        date: DateArgs,
    },
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let application_path = application_path(args.dir)?;

    let config = Config::load(&application_path)?;

    let level = resolve_level(args.log_filter, args.log, config.log_level);
    enable_logging(&application_path, level, args.log)?;
    let config = Config {
        color: config.color && std::io::stdout().is_terminal(),
        ..config
    };

    let tracker = Tracker::new(JsonTaskStorage::new(&application_path)?, DefaultClock)
        .with_grace_days(config.grace_days);

    process_command(args.commands, &tracker, &config, &mut std::io::stdout()).await
}

async fn process_command<S: TaskStorage, C: Clock>(
    command: Commands,
    tracker: &Tracker<S, C>,
    config: &Config,
    out: &mut impl Write,
) -> Result<()> {
    let today = tracker.today();
    match command {
        Commands::Add { name } => {
            let name = tracker.add(&name.joined()).await?;
            writeln!(out, "Added task: {name}")?;
        }
        Commands::List => {
            let summaries = tracker.summaries().await?;
            if summaries.is_empty() {
                writeln!(out, "No tasks yet. Add one with: streaks add \"Write code\"")?;
            } else {
                writeln!(out, "Tasks:")?;
                for summary in &summaries {
                    writeln!(out, "{}", format_list_line(summary))?;
                }
            }
        }
        Commands::Done { name, date } => {
            let day = date.resolve(today)?.unwrap_or(today);
            let (name, outcome) = tracker.done(&name.joined(), Some(day)).await?;
            match outcome {
                DoneOutcome::Marked => {
                    writeln!(out, "Marked done for {name} on {}", format_day(day))?
                }
                DoneOutcome::AlreadyDone => writeln!(
                    out,
                    "Already marked done on {} for: {name}",
                    format_day(day)
                )?,
            }
        }
        Commands::Undo { name, date } => {
            let day = date.resolve(today)?.unwrap_or(today);
            let (name, removed) = tracker.undo(&name.joined(), Some(day)).await?;
            if removed {
                writeln!(out, "Removed completion of {name} on {}", format_day(day))?;
            } else {
                writeln!(out, "Nothing to undo for {}.", format_day(day))?;
            }
        }
        Commands::Reset { name } => {
            let (name, removed) = tracker.reset(&name.joined()).await?;
            writeln!(out, "Cleared {removed} completion(s) for {name}")?;
        }
        Commands::Streaks { words } if !words.is_empty() => {
            let summary = tracker.task_summary(&words.join(" ")).await?;
            writeln!(out, "{}", format_streak_line(&summary))?;
            writeln!(
                out,
                "{}",
                mini_calendar(
                    &summary.done_days,
                    today,
                    config.calendar_days,
                    config.color
                )
            )?;
        }
        Commands::Streaks { .. } => {
            let best = tracker.overall_best().await?;
            writeln!(out, "Overall best streak across tasks: {best}")?;
        }
        Commands::Calendar { name, days } => {
            let summary = tracker.task_summary(&name.joined()).await?;
            writeln!(out, "{}", summary.name)?;
            writeln!(
                out,
                "{}",
                mini_calendar(
                    &summary.done_days,
                    today,
                    days.unwrap_or(config.calendar_days),
                    config.color
                )
            )?;
        }
        Commands::Stats => {
            writeln!(out, "Total checkmarks: {}", tracker.total_marks().await?)?;
            for summary in tracker.summaries().await? {
                writeln!(out, "{}", format_stats_line(&summary))?;
            }
        }
        Commands::Completed { date } => {
            let (day, names) = tracker.completed_on(date.resolve(today)?).await?;
            if names.is_empty() {
                writeln!(out, "Nothing completed on {}.", format_day(day))?;
            } else {
                writeln!(out, "Completed on {}:", format_day(day))?;
                for name in names {
                    writeln!(out, " - {name}")?;
                }
            }
        }
    }
    Ok(())
}
