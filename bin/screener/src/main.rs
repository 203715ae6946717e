use std::sync::Arc;

use anyhow::{bail, Context};
use chrono::{Local, NaiveDate};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use common::{parse_day, FetchWindow, ScreenerConfig, Symbol};
use engine::{Screener, TracingObserver};

const DEFAULT_UNIVERSE_PATH: &str = "config/universe.txt";
const DEFAULT_CALENDAR_PATH: &str = "config/trade_calendar.txt";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── Logging ──────────────────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    // ── Config ────────────────────────────────────────────────────────────────
    let cfg = ScreenerConfig::from_env().context("loading screener config")?;
    info!(
        provider = %cfg.data_source.provider,
        strategies = ?cfg.enabled_strategies(),
        "Screener starting"
    );

    // ── Inputs ────────────────────────────────────────────────────────────────
    let universe_path = env_or("SCREENER_UNIVERSE_PATH", DEFAULT_UNIVERSE_PATH);
    let universe = parse_universe(
        &std::fs::read_to_string(&universe_path)
            .with_context(|| format!("reading universe file '{universe_path}'"))?,
    )?;
    if universe.is_empty() {
        warn!(path = %universe_path, "Universe is empty");
    }

    let window = match (optional_env("SCREENER_START"), optional_env("SCREENER_END")) {
        (Some(start), Some(end)) => FetchWindow::new(
            day_arg("SCREENER_START", &start)?,
            day_arg("SCREENER_END", &end)?,
        )?,
        _ => {
            let calendar_path = env_or("SCREENER_CALENDAR_PATH", DEFAULT_CALENDAR_PATH);
            let calendar = parse_calendar(
                &std::fs::read_to_string(&calendar_path)
                    .with_context(|| format!("reading trading calendar '{calendar_path}'"))?,
            )?;
            FetchWindow::from_calendar(&calendar, Local::now().date_naive(), cfg.defaults.check_days)?
        }
    };

    let targets = match optional_env("SCREENER_TARGETS") {
        Some(raw) => parse_targets(&raw)?,
        None => window.default_targets(),
    };
    info!(
        symbols = universe.len(),
        start = %window.start,
        end = %window.end,
        targets = targets.len(),
        "Inputs loaded"
    );

    // ── Run ───────────────────────────────────────────────────────────────────
    let screener = Screener::from_config(&cfg)?.with_observer(Arc::new(TracingObserver));
    let report = screener.run(universe, window, &targets).await;

    if report.matches.is_empty() {
        println!("No symbols matched any enabled strategy.");
    } else {
        for m in &report.matches {
            println!("{m}");
        }
    }
    if report.failed > 0 {
        warn!(failed = ?report.failed_symbols, "Some symbols could not be fetched");
    }
    Ok(())
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_or(key: &str, default: &str) -> String {
    optional_env(key).unwrap_or_else(|| default.to_string())
}

fn day_arg(name: &str, raw: &str) -> anyhow::Result<NaiveDate> {
    parse_day(raw).with_context(|| format!("{name} must be YYYYMMDD or YYYY-MM-DD, got '{raw}'"))
}

/// `code,name` per line. Blank lines and `#` comments are skipped.
fn parse_universe(content: &str) -> anyhow::Result<Vec<Symbol>> {
    let mut symbols = Vec::new();
    for (lineno, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (code, name) = line.split_once(',').unwrap_or((line, ""));
        let code = code.trim();
        if code.is_empty() {
            bail!("universe line {}: missing symbol code", lineno + 1);
        }
        let name = match name.trim() {
            "" => code,
            n => n,
        };
        symbols.push(Symbol::new(code, name));
    }
    Ok(symbols)
}

/// One trading date per line, returned ascending.
fn parse_calendar(content: &str) -> anyhow::Result<Vec<NaiveDate>> {
    let mut days = content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(|l| day_arg("calendar entry", l))
        .collect::<anyhow::Result<Vec<_>>>()?;
    days.sort();
    days.dedup();
    Ok(days)
}

fn parse_targets(raw: &str) -> anyhow::Result<Vec<NaiveDate>> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| day_arg("SCREENER_TARGETS entry", t))
        .collect()
}
