#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Headless harness that runs a scenario file and prints the squad's trace.

mod scenario;
mod simulation;

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;
use theseus_core::PhysicsBody;
use theseus_system_control::EnemyReport;
use tracing_subscriber::EnvFilter;

use crate::{scenario::Scenario, simulation::Simulation};

/// Runs enemy AI scenarios without a renderer.
#[derive(Debug, Parser)]
#[command(name = "theseus", about = "Raft of Theseus enemy AI harness", version)]
struct Args {
    /// Scenario TOML describing the level, enemies and player script.
    #[arg(long)]
    scenario: PathBuf,
    /// Number of ticks to simulate.
    #[arg(long, default_value_t = 600)]
    ticks: u32,
    /// Seconds of simulation time per tick.
    #[arg(long, default_value_t = 1.0 / 30.0)]
    dt: f32,
    /// Seed for the player's movement jitter.
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

/// Entry point for the Raft of Theseus command-line harness.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    if !(args.dt.is_finite() && args.dt > 0.0) {
        bail!("--dt must be a positive number of seconds (got {})", args.dt);
    }

    let level = Scenario::load(&args.scenario)?.build()?;
    tracing::info!(
        scenario = %args.scenario.display(),
        enemies = level.squad.len(),
        "scenario loaded"
    );

    let mut simulation = Simulation::new(level, args.seed);
    let summary = simulation.run(args.ticks, args.dt, |tick, reports| {
        for report in reports {
            if let Some(line) = describe(report) {
                println!("[{tick:>5}] {line}");
            }
        }
    });

    println!(
        "{} ticks: {} transitions, {} shots, {} strikes, {} searches",
        summary.ticks, summary.transitions, summary.shots, summary.strikes, summary.searches
    );
    println!(
        "player at ({:.2}, {:.2})",
        summary.player.x, summary.player.y
    );
    for member in simulation.level().squad.members() {
        let position = member.body.position();
        println!(
            "{:?} #{} {} at ({:.2}, {:.2})",
            member.enemy.kind(),
            member.enemy.id().get(),
            member.enemy.state(),
            position.x,
            position.y
        );
    }
    Ok(())
}

fn describe(report: &EnemyReport) -> Option<String> {
    let mut parts = Vec::new();
    if let Some(previous) = report.previous {
        parts.push(format!("{previous} -> {}", report.state));
    }
    if let Some(intent) = report.intent {
        parts.push(format!("{intent:?}"));
    }
    if parts.is_empty() {
        return None;
    }
    Some(format!(
        "{:?} #{}: {} (v = {:.2}, {:.2}; J = {:.2}, {:.2}; perceived {}, searched {})",
        report.kind,
        report.id.get(),
        parts.join(", "),
        report.desired_velocity.x,
        report.desired_velocity.y,
        report.impulse.x,
        report.impulse.y,
        report.perceived,
        report.searched
    ))
}
