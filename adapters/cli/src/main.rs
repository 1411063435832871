#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Headless command-line runner for the Crowd Rush simulation.
//!
//! Boots a world, wires the systems into the command/event loop, and runs
//! a fixed number of ticks, tracing notable events to stdout. Useful for
//! watching a seed play out and for eyeballing determinism between runs.

use std::time::Duration;

use anyhow::Result;
use clap::Parser;

use crowd_rush_core::{Command, Event};
use crowd_rush_enemy_ai::EnemyAi;
use crowd_rush_shooting::Shooting;
use crowd_rush_wave_director::{WaveConfig, WaveDirector};
use crowd_rush_world::{apply, query, World};

/// Command-line options for the headless runner.
#[derive(Debug, Parser)]
#[command(name = "crowd-rush", about = "Run the Crowd Rush simulation headless")]
struct Args {
    /// Seed driving gate selection and enemy patrols.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Number of fixed ticks to simulate.
    #[arg(long, default_value_t = 600)]
    ticks: u32,

    /// Length of one tick in milliseconds.
    #[arg(long = "dt-ms", default_value_t = 100)]
    dt_ms: u64,

    /// Delay between crowd volleys in milliseconds.
    #[arg(long = "fire-ms", default_value_t = 500)]
    fire_ms: u64,

    /// Print every event instead of the notable ones.
    #[arg(long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    println!("{}", query::welcome_banner());

    let mut world = World::new();
    let lane = query::lane(&world);
    let mut director = WaveDirector::new(WaveConfig { lane, ..WaveConfig::default() }, args.seed)?;
    let mut ai = EnemyAi::new(lane, args.seed);
    let mut shooting = Shooting::new(Duration::from_millis(args.fire_ms));

    let dt = Duration::from_millis(args.dt_ms);
    let mut commands: Vec<Command> = Vec::new();
    let mut events: Vec<Event> = Vec::new();

    director.spawn_opening(query::population(&world), &mut commands);

    for tick in 0..args.ticks {
        commands.push(Command::Tick { dt });

        events.clear();
        for command in commands.drain(..) {
            apply(&mut world, command, &mut events);
        }

        trace(tick, &events, args.verbose);

        let units = query::unit_view(&world);
        let enemies = query::enemy_view(&world);
        director.handle(&events, &mut commands);
        ai.handle(&events, &enemies, &units, &mut commands);
        shooting.handle(&events, &units, &mut commands);

        if director.finished() {
            println!("tick {tick:4}: level complete");
            break;
        }
        if query::population(&world) == 0 {
            println!("tick {tick:4}: crowd wiped out");
            break;
        }
    }

    println!(
        "final population {} of {}, {} projectile(s) in flight",
        query::population(&world),
        query::capacity(&world),
        query::projectiles_in_flight(&world),
    );
    Ok(())
}

/// Prints the tick's events, keeping the quiet path readable.
fn trace(tick: u32, events: &[Event], verbose: bool) {
    for event in events {
        let notable = !matches!(
            event,
            Event::TimeAdvanced { .. } | Event::ProjectileFired { .. }
        );
        if verbose || notable {
            println!("tick {tick:4}: {event:?}");
        }
    }
}
