mod logic;
mod profile;
mod scenario;
mod util;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use mindgym_core::{Difficulty, GameId};
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::time::Instant;

use logic::{ScenarioResult, ScenarioRunner};
use scenario::{expand_scenarios, find_scenario, list_scenarios};
use util::{parse_seeds, split_csv};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Action {
    /// Run scripted multi-day scenarios against an in-memory profile
    Scenarios,
    /// Record one finished game into the profile under --data-dir
    Record,
    /// Show the dashboard for the profile under --data-dir
    Dashboard,
    /// Wipe the profile under --data-dir
    Reset,
}

#[derive(Debug, Parser)]
#[command(name = "mindgym-tester", version = "0.1.0")]
#[command(about = "Scenario runner and profile inspector for the MindGym progress engine")]
struct Args {
    /// What to do
    #[arg(long, value_enum, default_value_t = Action::Scenarios)]
    action: Action,

    /// Scenarios to run (comma-separated, `all` for the whole catalogue)
    #[arg(long, default_value = "smoke")]
    scenarios: String,

    /// List all available scenarios and exit
    #[arg(long)]
    list_scenarios: bool,

    /// Seeds to run (comma-separated, decimal or 0x hex)
    #[arg(long, alias = "seed", default_value = "1337")]
    seeds: String,

    /// Number of iterations per scenario and seed
    #[arg(long, default_value_t = 3)]
    iterations: usize,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "markdown", "console"])]
    report: String,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    // Profile options
    /// Directory holding the file-backed profile
    #[arg(long, default_value = "target/mindgym-profile")]
    data_dir: PathBuf,

    /// JSON tracker configuration (key_prefix, history_cap, recent_days)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Game id to record (e.g. memory-match)
    #[arg(long)]
    game: Option<String>,

    /// Score to record
    #[arg(long, allow_negative_numbers = true)]
    score: Option<i64>,

    /// Difficulty to record (easy, medium, hard)
    #[arg(long, default_value = "medium")]
    difficulty: Difficulty,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if maybe_list_scenarios(&args)? {
        return Ok(());
    }

    announce_banner();

    match args.action {
        Action::Scenarios => {
            let start_time = Instant::now();
            let results = run_scenarios(&args)?;
            write_reports(&args, &results, start_time)?;
            if results.iter().any(|r| !r.passed) {
                std::process::exit(1);
            }
            Ok(())
        }
        Action::Record => record_game(&args),
        Action::Dashboard => show_dashboard(&args),
        Action::Reset => reset_profile(&args),
    }
}

fn maybe_list_scenarios(args: &Args) -> Result<bool> {
    if !args.list_scenarios {
        return Ok(false);
    }
    let mut output_target = OutputTarget::new(args.output.clone())?;
    writeln!(output_target.writer(), "Available scenarios:")?;
    for (key, description) in list_scenarios() {
        writeln!(output_target.writer(), "  {key:22} - {description}")?;
    }
    output_target.flush_inner()?;
    Ok(true)
}

fn announce_banner() {
    println!("{}", "🧠 MindGym Progress Tester".bright_cyan().bold());
    println!("{}", "==========================".cyan());
}

fn run_scenarios(args: &Args) -> Result<Vec<ScenarioResult>> {
    let seeds = parse_seeds(&args.seeds)?;
    let runner = ScenarioRunner::new(args.verbose);
    let mut results = Vec::new();

    println!("{}", "🧪 Running Scenarios".bright_yellow().bold());
    println!("{}", "-".repeat(30).yellow());

    for name in expand_scenarios(&split_csv(&args.scenarios)) {
        if let Some(scenario) = find_scenario(&name) {
            results.extend(runner.run_scenario(&scenario, &seeds, args.iterations));
        } else {
            eprintln!("⚠️  Unknown scenario: {}", name.yellow());
        }
    }

    Ok(results)
}

fn write_reports(args: &Args, results: &[ScenarioResult], start_time: Instant) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;

    match args.report.as_str() {
        "json" => logic::reports::generate_json_report(&mut output_target, results)?,
        "markdown" => {
            if results.is_empty() {
                writeln!(
                    &mut output_target,
                    "# MindGym Scenario Results\n\n_No scenarios executed._"
                )?;
            } else {
                logic::reports::generate_markdown_report(&mut output_target, results)?;
            }
        }
        _ => {
            if results.is_empty() {
                writeln!(&mut output_target, "No scenarios executed.")?;
            } else {
                logic::reports::generate_console_report(
                    &mut output_target,
                    results,
                    start_time.elapsed(),
                )?;
            }
            writeln!(&mut output_target)?;
            writeln!(
                &mut output_target,
                "🏁 Total time: {:?}",
                start_time.elapsed()
            )?;
        }
    }

    output_target.flush_inner()?;
    Ok(())
}

fn record_game(args: &Args) -> Result<()> {
    let game = args
        .game
        .as_deref()
        .context("--game is required with --action record")?;
    let score = args
        .score
        .context("--score is required with --action record")?;
    let config = profile::load_config(args.config.as_deref())?;
    let mut tracker = profile::open_profile(&args.data_dir, config)?;
    let record = profile::record(&mut tracker, game, score, args.difficulty)?;

    let mut output_target = OutputTarget::new(args.output.clone())?;
    if args.report == "json" {
        serde_json::to_writer_pretty(&mut output_target, &record)?;
        writeln!(&mut output_target)?;
    } else {
        writeln!(
            &mut output_target,
            "✅ Recorded {} for {} ({}) on {}",
            record.score,
            GameId::from(game).label(),
            record.difficulty,
            record.date
        )?;
        writeln!(
            &mut output_target,
            "   Best: {}  Streak: {}",
            tracker.best_score(game, None),
            tracker.current_streak()
        )?;
    }
    output_target.flush_inner()?;
    Ok(())
}

fn show_dashboard(args: &Args) -> Result<()> {
    let config = profile::load_config(args.config.as_deref())?;
    let tracker = profile::open_profile(&args.data_dir, config)?;
    let dashboard = tracker.dashboard();

    let mut output_target = OutputTarget::new(args.output.clone())?;
    match args.report.as_str() {
        "json" => profile::write_dashboard_json(&mut output_target, &dashboard)?,
        "markdown" => profile::write_dashboard_markdown(&mut output_target, &dashboard)?,
        _ => profile::write_dashboard_console(&mut output_target, &dashboard)?,
    }
    output_target.flush_inner()?;
    Ok(())
}

fn reset_profile(args: &Args) -> Result<()> {
    let config = profile::load_config(args.config.as_deref())?;
    let mut tracker = profile::open_profile(&args.data_dir, config)?;
    profile::reset(&mut tracker)?;
    println!("🧹 Profile at {} reset", args.data_dir.display());
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn temp_path(label: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "mindgym-main-{label}-{}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        ))
    }

    fn base_args() -> Args {
        Args {
            action: Action::Scenarios,
            scenarios: "smoke".to_string(),
            list_scenarios: false,
            seeds: "1337".to_string(),
            iterations: 1,
            report: "json".to_string(),
            verbose: false,
            output: None,
            data_dir: temp_path("profile"),
            config: None,
            game: None,
            score: None,
            difficulty: Difficulty::Medium,
        }
    }

    fn sample_result(passed: bool) -> ScenarioResult {
        ScenarioResult {
            scenario_name: "First Recorded Game".to_string(),
            seed: 1337,
            passed,
            iterations_run: 1,
            successful_iterations: usize::from(passed),
            failures: if passed {
                Vec::new()
            } else {
                vec!["failure".to_string()]
            },
            average_duration: Duration::from_millis(1),
            performance_data: vec![Duration::from_millis(1)],
        }
    }

    #[test]
    fn parses_negative_scores_for_validation() {
        let args = Args::try_parse_from([
            "mindgym-tester",
            "--action",
            "record",
            "--game",
            "memory-match",
            "--score",
            "-5",
            "--difficulty",
            "hard",
        ])
        .unwrap();
        assert_eq!(args.action, Action::Record);
        assert_eq!(args.score, Some(-5));
        assert_eq!(args.difficulty, Difficulty::Hard);
        assert!(Args::try_parse_from(["mindgym-tester", "--difficulty", "extreme"]).is_err());
    }

    #[test]
    fn run_scenarios_skips_unknown_names() {
        let args = Args {
            scenarios: "smoke,not-a-scenario".to_string(),
            ..base_args()
        };
        let results = run_scenarios(&args).unwrap();
        assert_eq!(results.len(), 1);
        assert!(results[0].passed);
    }

    #[test]
    fn run_scenarios_rejects_bad_seeds() {
        let args = Args {
            seeds: "xyz".to_string(),
            ..base_args()
        };
        assert!(run_scenarios(&args).is_err());
    }

    #[test]
    fn write_reports_emits_json_output() {
        let temp = temp_path("report.json");
        let args = Args {
            output: Some(temp.clone()),
            ..base_args()
        };
        write_reports(&args, &[sample_result(true)], Instant::now()).unwrap();
        let content = std::fs::read_to_string(&temp).unwrap();
        let parsed: Vec<ScenarioResult> = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed[0].scenario_name, "First Recorded Game");
        let _ = std::fs::remove_file(temp);
    }

    #[test]
    fn write_reports_markdown_empty_results() {
        let temp = temp_path("report.md");
        let args = Args {
            report: "markdown".to_string(),
            output: Some(temp.clone()),
            ..base_args()
        };
        write_reports(&args, &[], Instant::now()).unwrap();
        let content = std::fs::read_to_string(&temp).unwrap();
        assert!(content.contains("No scenarios executed"));
        let _ = std::fs::remove_file(temp);
    }

    #[test]
    fn write_reports_console_lists_failures() {
        let temp = temp_path("report.txt");
        let args = Args {
            report: "console".to_string(),
            output: Some(temp.clone()),
            ..base_args()
        };
        write_reports(&args, &[sample_result(false)], Instant::now()).unwrap();
        let content = std::fs::read_to_string(&temp).unwrap();
        assert!(content.contains("First Recorded Game"));
        assert!(content.contains("Total time"));
        let _ = std::fs::remove_file(temp);
    }

    #[test]
    fn maybe_list_scenarios_writes_output() {
        let temp = temp_path("scenarios.txt");
        let args = Args {
            list_scenarios: true,
            output: Some(temp.clone()),
            ..base_args()
        };
        assert!(maybe_list_scenarios(&args).unwrap());
        let content = std::fs::read_to_string(&temp).unwrap();
        assert!(content.contains("Available scenarios"));
        assert!(content.contains("daily-streak"));
        let _ = std::fs::remove_file(temp);
    }

    #[test]
    fn maybe_list_scenarios_returns_false_when_disabled() {
        assert!(!maybe_list_scenarios(&base_args()).unwrap());
    }

    #[test]
    fn record_then_dashboard_round_trip() {
        let output = temp_path("dashboard.json");
        let record_args = Args {
            action: Action::Record,
            game: Some("sequence-recall".to_string()),
            score: Some(12),
            output: Some(temp_path("record.json")),
            ..base_args()
        };
        record_game(&record_args).unwrap();

        let dashboard_args = Args {
            action: Action::Dashboard,
            output: Some(output.clone()),
            data_dir: record_args.data_dir.clone(),
            ..base_args()
        };
        show_dashboard(&dashboard_args).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(value["totalCount"], 1);
        assert_eq!(value["streak"], 1);
        let _ = std::fs::remove_dir_all(&record_args.data_dir);
    }

    #[test]
    fn record_requires_game_and_valid_score() {
        let args = Args {
            action: Action::Record,
            score: Some(10),
            ..base_args()
        };
        assert!(record_game(&args).is_err());

        let args = Args {
            action: Action::Record,
            game: Some("memory-match".to_string()),
            score: Some(-3),
            ..base_args()
        };
        let err = record_game(&args).unwrap_err();
        assert!(format!("{err:#}").contains("negative"));
    }
}
