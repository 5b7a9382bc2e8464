use anyhow::{Context, Result, bail};
use colored::Colorize;
use log::info;
use mindgym_core::{
    DashboardSummary, Difficulty, FileStore, ProgressTracker, ScoreRecord, SystemClock,
    TrackerConfig,
};
use std::io::Write;
use std::path::Path;

pub type ProfileTracker = ProgressTracker<FileStore, SystemClock>;

/// Read a tracker configuration file, or defaults when no path is given.
pub fn load_config(path: Option<&Path>) -> Result<TrackerConfig> {
    let Some(path) = path else {
        return Ok(TrackerConfig::default());
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    TrackerConfig::from_json(&json).with_context(|| format!("invalid config {}", path.display()))
}

/// Open the profile stored under `data_dir`.
pub fn open_profile(data_dir: &Path, config: TrackerConfig) -> Result<ProfileTracker> {
    let store = FileStore::open(data_dir)
        .with_context(|| format!("failed to open profile at {}", data_dir.display()))?;
    ProgressTracker::load_with_config(store, SystemClock, config)
        .context("failed to load profile")
}

/// Validate a raw command-line score; scores are whole, non-negative points.
pub fn parse_score(raw: i64) -> Result<u32> {
    if raw < 0 {
        bail!("invalid score {raw}: scores must not be negative");
    }
    u32::try_from(raw).with_context(|| format!("invalid score {raw}: out of range"))
}

pub fn record(
    tracker: &mut ProfileTracker,
    game: &str,
    raw_score: i64,
    difficulty: Difficulty,
) -> Result<ScoreRecord> {
    let score = parse_score(raw_score)?;
    let record = tracker
        .record_outcome(game, score, difficulty)
        .with_context(|| format!("failed to record {game}"))?;
    info!("Recorded {score} for {game} ({difficulty})");
    Ok(record)
}

pub fn reset(tracker: &mut ProfileTracker) -> Result<()> {
    tracker.reset_all().context("failed to reset profile")
}

pub fn write_dashboard_console(out: &mut impl Write, dashboard: &DashboardSummary) -> Result<()> {
    writeln!(out, "{}", "🧠 MindGym Progress".bright_cyan().bold())?;
    writeln!(out, "{}", "===================".cyan())?;
    writeln!(
        out,
        "🔥 Streak: {} day(s)",
        dashboard.streak.to_string().bright_yellow()
    )?;
    writeln!(out, "Today: {} game(s)", dashboard.today_count)?;
    writeln!(out, "Total: {} game(s)", dashboard.total_count)?;
    writeln!(out)?;
    for summary in &dashboard.games {
        let stats = &summary.stats;
        if stats.played == 0 {
            writeln!(out, "  {:18} {}", summary.label, "not played yet".dimmed())?;
            continue;
        }
        let last = stats
            .last_played
            .map_or_else(String::new, |date| date.to_string());
        writeln!(
            out,
            "  {:18} played {:3}  best {:6}  avg {:6}  last {last}",
            summary.label.bold(),
            stats.played,
            stats.best_score.to_string().green(),
            stats.average_score
        )?;
    }
    Ok(())
}

pub fn write_dashboard_markdown(out: &mut impl Write, dashboard: &DashboardSummary) -> Result<()> {
    writeln!(out, "# MindGym Progress\n")?;
    writeln!(out, "- **Streak**: {}", dashboard.streak)?;
    writeln!(out, "- **Today**: {}", dashboard.today_count)?;
    writeln!(out, "- **Total**: {}\n", dashboard.total_count)?;
    writeln!(out, "| Game | Played | Best | Average | Last played |")?;
    writeln!(out, "|---|---|---|---|---|")?;
    for summary in &dashboard.games {
        let stats = &summary.stats;
        let last = stats
            .last_played
            .map_or_else(|| "-".to_string(), |date| date.to_string());
        writeln!(
            out,
            "| {} | {} | {} | {} | {last} |",
            summary.label, stats.played, stats.best_score, stats.average_score
        )?;
    }
    Ok(())
}

pub fn write_dashboard_json(out: &mut impl Write, dashboard: &DashboardSummary) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, dashboard)?;
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mindgym_core::{GameKind, StoreKey};

    fn temp_dir(label: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!(
            "mindgym-profile-{label}-{}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        ))
    }

    #[test]
    fn negative_and_oversized_scores_are_rejected() {
        assert_eq!(parse_score(0).unwrap(), 0);
        assert_eq!(parse_score(450).unwrap(), 450);
        assert!(parse_score(-1).unwrap_err().to_string().contains("negative"));
        assert!(parse_score(i64::from(u32::MAX) + 1).is_err());
    }

    #[test]
    fn recorded_games_survive_reopen() {
        let dir = temp_dir("reopen");
        {
            let mut tracker = open_profile(&dir, TrackerConfig::default()).unwrap();
            record(&mut tracker, "memory-match", 320, Difficulty::Hard).unwrap();
            record(&mut tracker, "memory-match", 280, Difficulty::Hard).unwrap();
        }
        let tracker = open_profile(&dir, TrackerConfig::default()).unwrap();
        let stats = tracker.stats_for(GameKind::MemoryMatch.id());
        assert_eq!(stats.played, 2);
        assert_eq!(stats.best_score, 320);
        assert_eq!(stats.average_score, 300);
        assert_eq!(tracker.current_streak(), 1);
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn reset_removes_profile_files() {
        let dir = temp_dir("reset");
        let config = TrackerConfig::default();
        let mut tracker = open_profile(&dir, config.clone()).unwrap();
        record(&mut tracker, "color-clash", 10, Difficulty::Easy).unwrap();
        let scores_path = tracker.store().path_for(&config.key(StoreKey::Scores));
        assert!(scores_path.exists());
        reset(&mut tracker).unwrap();
        assert!(!scores_path.exists());
        assert_eq!(tracker.total_count(), 0);
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn config_file_overrides_defaults() {
        let dir = temp_dir("config");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.json");
        std::fs::write(&path, r#"{ "history_cap": 3 }"#).unwrap();
        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.history_cap, 3);
        assert_eq!(config.recent_days, 7);

        std::fs::write(&path, r#"{ "history_cap": 0 }"#).unwrap();
        assert!(load_config(Some(&path)).is_err());
        assert_eq!(load_config(None).unwrap(), TrackerConfig::default());
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn dashboard_renderers_include_every_game() {
        let dir = temp_dir("render");
        let mut tracker = open_profile(&dir, TrackerConfig::default()).unwrap();
        record(&mut tracker, "pattern-logic", 77, Difficulty::Medium).unwrap();
        let dashboard = tracker.dashboard();

        let mut markdown = Vec::new();
        write_dashboard_markdown(&mut markdown, &dashboard).unwrap();
        let markdown = String::from_utf8(markdown).unwrap();
        for kind in GameKind::ALL {
            assert!(markdown.contains(kind.display_name()));
        }
        assert!(markdown.contains("| 1 | 77 | 77 |"));

        let mut json = Vec::new();
        write_dashboard_json(&mut json, &dashboard).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&json).unwrap();
        assert_eq!(value["totalCount"], 1);
        assert_eq!(value["streak"], 1);

        let mut console = Vec::new();
        write_dashboard_console(&mut console, &dashboard).unwrap();
        assert!(String::from_utf8(console).unwrap().contains("not played yet"));
        let _ = std::fs::remove_dir_all(dir);
    }
}
