//! league-runner: headless runner for the league simulator.
//!
//! Usage:
//!   league-runner --seed 12345 --seasons 3 --db league.db
//!   league-runner --import saved.json --seasons 1
//!   league-runner --seed 12345 --ipc-mode

use anyhow::Result;
use league_core::{
    command::LeagueCommand,
    config::LeagueSetup,
    engine::LeagueEngine,
    event::{EventLogEntry, SimEvent},
    season::SeasonSummary,
    store::SimStore,
};
use std::env;
use std::io::{self, BufRead, Write};
use std::path::Path;

/// Control lines understood in IPC mode besides league commands.
#[derive(serde::Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
enum IpcControl {
    GetState,
    Quit,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let seasons = parse_arg(&args, "--seasons", 1u32);
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let db = flag_value(&args, "--db").unwrap_or(":memory:");
    let data_dir = flag_value(&args, "--data-dir").unwrap_or("./data");
    let import = flag_value(&args, "--import");

    if !ipc_mode {
        println!("league-runner");
        println!("  seed:      {seed}");
        println!("  seasons:   {seasons}");
        println!("  db:        {db}");
        println!("  data_dir:  {data_dir}");
        if let Some(path) = import {
            println!("  import:    {path}");
        }
        println!();
    }

    let mut store = SimStore::open(db)?;
    store.migrate()?;
    let run_id = format!("run-{}", uuid::Uuid::new_v4());
    store.insert_run(&run_id, seed, env!("CARGO_PKG_VERSION"))?;

    let (mut engine, initial_events) = match import {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
            LeagueEngine::from_json(&json, seed)?
        }
        None => (LeagueEngine::build(&load_setup(data_dir), seed), Vec::new()),
    };
    persist(&mut store, &run_id, &engine, &initial_events)?;

    if ipc_mode {
        run_ipc_loop(&mut engine, &mut store, &run_id)?;
    } else {
        for _ in 0..seasons {
            let cup_winner = run_season(&mut engine, &mut store, &run_id)?;
            if let Some(summary) = engine.snapshot().history.last() {
                print_summary(&engine, summary, cup_winner.as_deref());
            }
        }
        let stored = store.events_for_run(&run_id)?.len();
        println!("=== RUN ===");
        println!("  run_id:         {run_id}");
        println!("  finished at:    {}", chrono::Utc::now().format("%Y-%m-%d %H:%M:%S"));
        println!("  events logged:  {stored}");
    }

    Ok(())
}

fn load_setup(data_dir: &str) -> LeagueSetup {
    if !Path::new(data_dir).join("league.json").exists() {
        log::info!("no league.json under {data_dir}; using the built-in league");
        return LeagueSetup::default_setup();
    }
    match LeagueSetup::load(data_dir) {
        Ok(setup) => setup,
        Err(e) => {
            log::warn!("{e}; using the built-in league");
            LeagueSetup::default_setup()
        }
    }
}

/// Play out the league, the cup if it is open, then close the season.
/// Returns the cup winner, if a cup was decided.
fn run_season(engine: &mut LeagueEngine, store: &mut SimStore, run_id: &str) -> Result<Option<String>> {
    let mut commands = vec![LeagueCommand::PlayAllDivisions];
    if engine.cup_unlocked() && !engine.cup().is_idle() {
        commands.push(LeagueCommand::PlayCupAll);
    }
    commands.push(LeagueCommand::CloseSeason);

    let mut cup_winner = None;
    for command in &commands {
        let events = engine.apply(command)?;
        persist(store, run_id, engine, &events)?;
        cup_winner = cup_winner.or_else(|| {
            events.iter().find_map(|e| match e {
                SimEvent::CupWon { team_id, .. } => Some(team_id.clone()),
                _ => None,
            })
        });
    }
    Ok(cup_winner)
}

/// Write a command's events and the resulting state.
fn persist(store: &mut SimStore, run_id: &str, engine: &LeagueEngine, events: &[SimEvent]) -> Result<()> {
    let season = engine.season();
    let entries = events
        .iter()
        .map(|e| EventLogEntry::from_event(run_id, season, e))
        .collect::<Result<Vec<_>, _>>()?;
    store.append_events(&entries)?;
    store.save_snapshot(run_id, season, &engine.to_json()?)?;
    Ok(())
}

fn run_ipc_loop(engine: &mut LeagueEngine, store: &mut SimStore, run_id: &str) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }
        let line = buffer.trim();
        if line.is_empty() {
            continue;
        }

        if let Ok(control) = serde_json::from_str::<IpcControl>(line) {
            match control {
                IpcControl::Quit => break,
                IpcControl::GetState => writeln!(stdout, "{}", engine.to_json()?)?,
            }
            stdout.flush()?;
            continue;
        }

        let reply = match serde_json::from_str::<LeagueCommand>(line) {
            Ok(command) => match engine.apply(&command) {
                Ok(events) => {
                    persist(store, run_id, engine, &events)?;
                    engine.to_json()?
                }
                Err(e) => error_json(&e.to_string()),
            },
            Err(e) => error_json(&e.to_string()),
        };
        writeln!(stdout, "{reply}")?;
        stdout.flush()?;
    }
    Ok(())
}

fn error_json(message: &str) -> String {
    serde_json::json!({ "error": message }).to_string()
}

fn print_summary(engine: &LeagueEngine, summary: &SeasonSummary, cup_winner: Option<&str>) {
    println!("=== SEASON {} ===", summary.season);
    for division in &summary.divisions {
        let how = if division.decided_by_playoff { " (playoff)" } else { "" };
        let champion = if division.champion_name.is_empty() { "-" } else { division.champion_name.as_str() };
        println!("  {:<12} champion: {champion}{how}", division.name);
        for (pos, row) in division.table.iter().enumerate() {
            println!(
                "    {:>2}. {:<12} P{:>3} W{:>3} D{:>3} L{:>3} GF{:>4} GA{:>4} GD{:>+4} Pts{:>4}",
                pos + 1, row.name, row.played, row.won, row.drawn, row.lost,
                row.goals_for, row.goals_against, row.goal_diff, row.points
            );
        }
    }

    let scorers = engine.top_scorers(summary.season, 5);
    if !scorers.is_empty() {
        println!("  top scorers:");
        for row in scorers {
            println!("    {:<22} {:<12} {:>3}", row.name, row.team_name, row.goals);
        }
    }

    if let Some(champion) = cup_winner {
        let name = engine.team(champion).map(|t| t.name.as_str()).unwrap_or(champion);
        println!("  cup winner: {name}");
    }

    for movement in &summary.movements {
        println!("  {} moves {} -> {}", movement.team_name, movement.from, movement.to);
    }
    println!();
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2).find(|w| w[0] == flag).map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
