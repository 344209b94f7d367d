//! Headless Siege Runner
//!
//! Runs seeded sieges against an AI-held territory and prints the result as
//! JSON or text. With `--sims` it runs many seeds in parallel and reports
//! the win rate.

use std::path::PathBuf;
use std::sync::Arc;

use citadel_siege::core::error::Result;
use citadel_siege::core::types::PlayerId;
use citadel_siege::core::{ManualClock, SiegeConfig};
use citadel_siege::roster::Unit;
use citadel_siege::siege::{
    estimate_success_pct, BattleOutcome, SeededDraws, SiegeCoordinator, Strategy,
};
use citadel_siege::store::MemoryStore;
use citadel_siege::territory::{Territory, TerritoryTier};
use clap::Parser;
use rayon::prelude::*;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

/// Headless Siege Runner - resolve sieges from the command line
#[derive(Parser, Debug)]
#[command(name = "citadel-siege")]
#[command(about = "Run seeded territory sieges and print the outcome")]
struct Args {
    /// TOML file overriding the default siege tuning
    #[arg(long)]
    config: Option<PathBuf>,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Territory tier: common, rare or epic
    #[arg(long, default_value = "common")]
    tier: TerritoryTier,

    /// Attacker stance for every round
    #[arg(long, default_value = "balanced")]
    strategy: Strategy,

    /// Power of each squad member, comma separated
    #[arg(long, value_delimiter = ',', default_values_t = vec![110, 100, 90])]
    power: Vec<u32>,

    /// Send the strongest unit to scout before round 1
    #[arg(long)]
    scout: bool,

    /// Retreat once the attacker trails after this many rounds
    #[arg(long)]
    retreat_after: Option<u32>,

    /// Number of seeded sieges to run
    #[arg(long, default_value_t = 1)]
    sims: u64,

    /// Output format: json or text
    #[arg(long, default_value = "json")]
    format: String,

    /// Log every phase change
    #[arg(long, short = 'v')]
    verbose: bool,
}

/// JSON output for one siege
#[derive(Serialize)]
struct SiegeSummary {
    seed: u64,
    tier: TerritoryTier,
    strategy: Strategy,
    estimated_success_pct: u8,
    scouted: bool,
    scout_bonus_pct: u8,
    outcome: Option<BattleOutcome>,
    rounds: Vec<RoundLine>,
    attacker_score: f64,
    defender_score: f64,
    final_energy: Vec<u8>,
}

#[derive(Serialize)]
struct RoundLine {
    round: u32,
    defender_strategy: Strategy,
    success_probability: f64,
    attacker_won: bool,
}

/// JSON output for a batch of sieges
#[derive(Serialize)]
struct BatchSummary {
    sims: u64,
    first_seed: u64,
    victories: u64,
    defeats: u64,
    retreats: u64,
    win_rate: f64,
    average_rounds: f64,
}

fn run_siege(args: &Args, config: &SiegeConfig, seed: u64) -> Result<SiegeSummary> {
    let store = Arc::new(MemoryStore::new());
    let attacker = PlayerId::new();

    let territory = Territory::new("Ashen Ford", args.tier);
    let territory_id = territory.id;
    store.insert_territory(territory);

    let squad: Vec<Unit> = args
        .power
        .iter()
        .enumerate()
        .map(|(i, power)| Unit::new(attacker, format!("Raider {}", i + 1), *power))
        .collect();
    let unit_ids: Vec<_> = squad.iter().map(|u| u.id).collect();
    let strongest = squad.iter().max_by_key(|u| u.power).map(|u| u.id);
    for unit in squad {
        store.insert_unit(unit);
    }

    let coordinator = SiegeCoordinator::new(config.clone(), store.clone())
        .with_clock(Arc::new(ManualClock::new(0)))
        .with_draws(SeededDraws::new(seed));

    let start = coordinator.init_battle(attacker, territory_id, &unit_ids)?;
    let attack_power: u64 = start.attackers.iter().map(|u| u.power as u64).sum();
    let defense_power: u64 = start.defenders.iter().map(|u| u.power as u64).sum();

    let mut scout_bonus_pct = 0;
    match strongest {
        Some(scout) if args.scout => {
            let intel = coordinator.scout(start.battle_id, scout)?;
            scout_bonus_pct = intel.attack_bonus_pct;
        }
        _ => coordinator.skip_scouting(start.battle_id)?,
    }

    loop {
        let report = coordinator.execute_round(start.battle_id, Some(args.strategy), scout_bonus_pct)?;
        if report.battle_complete {
            break;
        }

        let session = coordinator.session(start.battle_id)?;
        let trailing = session.attacker_score <= session.defender_score;
        if trailing && args.retreat_after.is_some_and(|after| report.round.round >= after) {
            coordinator.retreat(start.battle_id)?;
            break;
        }
        coordinator.continue_battle(start.battle_id)?;
    }

    let session = coordinator.session(start.battle_id)?;
    Ok(SiegeSummary {
        seed,
        tier: args.tier,
        strategy: args.strategy,
        estimated_success_pct: estimate_success_pct(attack_power, defense_power),
        scouted: session.scout_attempted,
        scout_bonus_pct,
        outcome: session.outcome,
        rounds: session
            .rounds
            .iter()
            .map(|r| RoundLine {
                round: r.round,
                defender_strategy: r.defender_strategy,
                success_probability: r.success_probability(),
                attacker_won: r.attacker_won,
            })
            .collect(),
        attacker_score: session.attacker_score,
        defender_score: session.defender_score,
        final_energy: session.attackers.iter().map(|u| u.energy).collect(),
    })
}

fn summarize(results: &[SiegeSummary], first_seed: u64) -> BatchSummary {
    let count = |outcome: BattleOutcome| {
        results.iter().filter(|r| r.outcome == Some(outcome)).count() as u64
    };
    let sims = results.len() as u64;
    let victories = count(BattleOutcome::Victory);
    let total_rounds: usize = results.iter().map(|r| r.rounds.len()).sum();

    BatchSummary {
        sims,
        first_seed,
        victories,
        defeats: count(BattleOutcome::Defeat),
        retreats: count(BattleOutcome::Retreated),
        win_rate: if sims > 0 { victories as f64 / sims as f64 } else { 0.0 },
        average_rounds: if sims > 0 { total_rounds as f64 / sims as f64 } else { 0.0 },
    }
}

fn print_siege(summary: &SiegeSummary) {
    println!("=== Siege ({} tier, seed {}) ===", summary.tier.name(), summary.seed);
    println!("Estimated success: {}%", summary.estimated_success_pct);
    if summary.scouted {
        println!("Scout bonus: +{}%", summary.scout_bonus_pct);
    }
    for round in &summary.rounds {
        println!(
            "  Round {}: {} vs {} at {:.0}% -> {}",
            round.round,
            summary.strategy.name(),
            round.defender_strategy.name(),
            round.success_probability * 100.0,
            if round.attacker_won { "won" } else { "lost" }
        );
    }
    println!(
        "Outcome: {:?} (score {:.2} vs {:.2})",
        summary.outcome, summary.attacker_score, summary.defender_score
    );
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose {
        "citadel_siege=debug"
    } else if args.sims > 1 {
        "citadel_siege=warn"
    } else {
        "citadel_siege=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match &args.config {
        Some(path) => SiegeConfig::load(path)?,
        None => SiegeConfig::default(),
    };

    let seed = args.seed.unwrap_or_else(rand::random);

    if args.sims <= 1 {
        let summary = run_siege(&args, &config, seed)?;
        if args.format == "json" {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        } else {
            print_siege(&summary);
        }
        return Ok(());
    }

    let results = (0..args.sims)
        .into_par_iter()
        .map(|i| run_siege(&args, &config, seed.wrapping_add(i)))
        .collect::<Result<Vec<_>>>()?;
    let batch = summarize(&results, seed);

    if args.format == "json" {
        println!("{}", serde_json::to_string_pretty(&batch)?);
    } else {
        println!("=== {} sieges from seed {} ===", batch.sims, batch.first_seed);
        println!(
            "Victories: {}  Defeats: {}  Retreats: {}",
            batch.victories, batch.defeats, batch.retreats
        );
        println!("Win rate: {:.1}%", batch.win_rate * 100.0);
        println!("Average rounds: {:.2}", batch.average_rounds);
    }

    Ok(())
}
