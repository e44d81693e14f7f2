use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use elevator_sim::simulation::{
    Direction, ElevatorSystem, Floor, HallCallGenerator, ManualClock, StopLog, SystemConfig,
};

#[derive(Parser)]
#[command(name = "elevator_sim")]
#[command(about = "Multi-car elevator bank simulation")]
struct Cli {
    /// Number of floors in the building
    #[arg(long, default_value = "13")]
    floors: u32,

    /// Number of elevator cars
    #[arg(long, default_value = "3")]
    cars: usize,

    /// Number of simulation ticks to run
    #[arg(long, default_value = "20")]
    ticks: u32,

    /// Simulated seconds per tick
    #[arg(long, default_value = "1.0", value_parser = parse_secs)]
    delta: f64,

    /// Seconds a door stays open before it may close
    #[arg(long, default_value = "2.0", value_parser = parse_secs)]
    door_open_secs: f64,

    /// Hall call as FLOOR:DIRECTION, e.g. `7:up`. May be repeated.
    #[arg(long = "call", value_parser = parse_call)]
    calls: Vec<(Floor, Direction)>,

    /// Probability of a random hall call each tick
    #[arg(long, default_value = "0.0", value_parser = parse_probability)]
    random_calls: f64,

    /// Seed for random hall calls
    #[arg(long)]
    seed: Option<u64>,

    /// Wall-clock pause between ticks in milliseconds
    #[arg(long, default_value = "0")]
    delay_ms: u64,

    /// Print the shafts every N ticks, 0 to print only the final state
    #[arg(long, default_value = "1")]
    print_every: u32,

    /// SQLite file to restore from and save to (needs the `sqlite` feature)
    #[arg(long)]
    db: Option<PathBuf>,
}

fn parse_call(s: &str) -> Result<(Floor, Direction), String> {
    let (floor, direction) = s
        .split_once(':')
        .ok_or_else(|| format!("expected FLOOR:DIRECTION, got '{s}'"))?;
    let floor = floor
        .trim()
        .parse::<Floor>()
        .map_err(|e| format!("bad floor '{floor}': {e}"))?;
    let direction = match direction.trim().to_ascii_lowercase().as_str() {
        "up" | "u" => Direction::Up,
        "down" | "d" => Direction::Down,
        other => return Err(format!("direction must be up or down, got '{other}'")),
    };
    Ok((floor, direction))
}

/// A non-negative, finite number of seconds that fits in a `Duration`
fn parse_secs(s: &str) -> Result<f64, String> {
    let secs = s
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("bad number of seconds '{s}': {e}"))?;
    Duration::try_from_secs_f64(secs).map_err(|e| format!("bad number of seconds '{s}': {e}"))?;
    Ok(secs)
}

fn parse_probability(s: &str) -> Result<f64, String> {
    let p = s
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("bad probability '{s}': {e}"))?;
    if (0.0..=1.0).contains(&p) {
        Ok(p)
    } else {
        Err(format!("probability must be between 0 and 1, got '{s}'"))
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    run_headless(cli)
}

/// Run the simulation in headless mode
fn run_headless(cli: Cli) -> Result<()> {
    info!(
        "Running elevator simulation: {} floors, {} cars, {} ticks, {}s per tick",
        cli.floors, cli.cars, cli.ticks, cli.delta
    );

    let config = SystemConfig::new(cli.floors, cli.cars)
        .with_door_open_duration(Duration::from_secs_f64(cli.door_open_secs));
    let clock = ManualClock::new();

    let mut system = build_system(&cli, config, &clock)?;

    let stop_log = Rc::new(RefCell::new(StopLog::new()));
    system.add_observer(Box::new(Rc::clone(&stop_log)));

    let calls = if cli.calls.is_empty() && cli.random_calls <= 0.0 {
        vec![(7, Direction::Up), (3, Direction::Down), (9, Direction::Up)]
    } else {
        cli.calls.clone()
    };
    for (floor, direction) in calls {
        system
            .call_elevator(floor, direction)
            .with_context(|| format!("Failed to place hall call {floor}:{direction}"))?;
    }

    let mut generator = match cli.seed {
        Some(seed) => HallCallGenerator::with_seed(cli.floors, cli.random_calls, seed),
        None => HallCallGenerator::new(cli.floors, cli.random_calls),
    };

    println!("Initial state:");
    print!("{}", system.summary());
    print!("{}", system.render());
    println!();

    for _ in 0..cli.ticks {
        if let Some((floor, direction)) = generator.next_call() {
            system
                .call_elevator(floor, direction)
                .context("Random hall call rejected")?;
        }

        let report = system.tick();
        clock.advance_secs(cli.delta);

        if cli.print_every > 0 && report.tick % u64::from(cli.print_every) == 0 {
            println!(
                "--- After tick {} ({:.1}s simulated time) ---",
                report.tick,
                report.tick as f64 * cli.delta
            );
            print!("{}", system.summary());
            print!("{}", system.render());
            println!();
        }

        if cli.delay_ms > 0 {
            std::thread::sleep(Duration::from_millis(cli.delay_ms));
        }
    }

    println!("=== Final State ===");
    print!("{}", system.summary());
    print!("{}", system.render());

    let stops = stop_log.borrow();
    info!("=== SIMULATION COMPLETE ===");
    info!("Ticks run: {}", stops.ticks);
    info!("Stops served: {}", stops.stops.len());
    for car in system.cars() {
        info!("Stops by {}: {}", car.id(), stops.stops_for(car.id()));
    }
    info!(
        "Pending hall calls: {}",
        system.up_requests().len() + system.down_requests().len()
    );

    if let Some(path) = &cli.db {
        save_system(&system, path)?;
    }

    Ok(())
}

fn build_system(cli: &Cli, config: SystemConfig, clock: &ManualClock) -> Result<ElevatorSystem> {
    let clock = Rc::new(clock.clone());
    match &cli.db {
        Some(path) => restore_system(path, config, clock),
        None => ElevatorSystem::new(config, clock).context("Failed to build elevator system"),
    }
}

#[cfg(feature = "sqlite")]
fn restore_system(
    path: &std::path::Path,
    config: SystemConfig,
    clock: Rc<ManualClock>,
) -> Result<ElevatorSystem> {
    use elevator_sim::simulation::{Clock, ClosestCarStrategy, SqliteStore};

    let store = SqliteStore::open(path)
        .with_context(|| format!("Failed to open database {}", path.display()))?;
    let system = ElevatorSystem::restore(
        config,
        &store,
        Rc::clone(&clock) as Rc<dyn Clock>,
        Box::new(ClosestCarStrategy::new()),
    )
    .with_context(|| format!("Failed to restore state from {}", path.display()))?;

    // Door timestamps are readings of the previous run's clock
    clock.set(system.resume_time());
    info!("Resuming at {:.1}s simulated time", clock.now().as_secs_f64());
    Ok(system)
}

#[cfg(not(feature = "sqlite"))]
fn restore_system(
    _path: &std::path::Path,
    _config: SystemConfig,
    _clock: Rc<ManualClock>,
) -> Result<ElevatorSystem> {
    anyhow::bail!("--db needs the sqlite feature. Rebuild with --features sqlite")
}

#[cfg(feature = "sqlite")]
fn save_system(system: &ElevatorSystem, path: &std::path::Path) -> Result<()> {
    use elevator_sim::simulation::SqliteStore;

    let mut store = SqliteStore::open(path)
        .with_context(|| format!("Failed to open database {}", path.display()))?;
    system
        .save(&mut store)
        .with_context(|| format!("Failed to save state to {}", path.display()))?;
    info!("Saved state to {}", path.display());
    Ok(())
}

#[cfg(not(feature = "sqlite"))]
fn save_system(_system: &ElevatorSystem, _path: &std::path::Path) -> Result<()> {
    anyhow::bail!("--db needs the sqlite feature. Rebuild with --features sqlite")
}
