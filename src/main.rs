use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};

use lift_sim::simulation::{
    build_controller, random_scenario, ControllerConfig, ControllerStrategy, EngineConfig,
    IdleParkingMode, MechanicalStatus, RunStats, SimEngine, SimulationRun,
};

#[derive(Parser)]
#[command(name = "lift_sim")]
#[command(about = "Single-car lift simulation with pluggable dispatch")]
#[command(allow_negative_numbers = true)]
struct Cli {
    /// Number of ticks to simulate
    #[arg(long, default_value = "300")]
    ticks: u64,

    /// Dispatch strategy
    #[arg(long, value_enum, default_value_t = ControllerStrategy::DirectionalScan)]
    strategy: ControllerStrategy,

    /// Lowest served floor
    #[arg(long, default_value = "0")]
    min_floor: i32,

    /// Highest served floor
    #[arg(long, default_value = "9")]
    max_floor: i32,

    /// Ticks to travel one floor
    #[arg(long, default_value = "1")]
    travel_ticks: u32,

    /// Ticks for the doors to open or close
    #[arg(long, default_value = "2")]
    door_transition_ticks: u32,

    /// Ticks the doors stay open
    #[arg(long, default_value = "3")]
    door_dwell_ticks: u32,

    /// Ticks into a closing sequence during which doors may reopen
    #[arg(long, default_value = "2")]
    door_reopen_window_ticks: u32,

    /// Floor the car starts at and parks at
    #[arg(long, default_value = "0")]
    home_floor: i32,

    /// Idle ticks before parking
    #[arg(long, default_value = "10")]
    idle_timeout_ticks: u32,

    /// What to do once the idle timeout expires
    #[arg(long, value_enum, default_value_t = IdleParkingMode::ParkToHomeFloor)]
    parking: IdleParkingMode,

    /// Seed for the generated scenario
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Number of passenger calls to generate
    #[arg(long, default_value = "25")]
    calls: usize,

    /// Take the car out of service at this tick
    #[arg(long)]
    out_of_service_at: Option<u64>,

    /// Return the car to service at this tick
    #[arg(long)]
    return_at: Option<u64>,

    /// Print the car's position every this many ticks
    #[arg(long, default_value = "25")]
    report_every: u64,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    run_headless(&cli)
}

/// Run the simulation in headless mode
fn run_headless(cli: &Cli) -> Result<()> {
    let engine_config = EngineConfig {
        min_floor: cli.min_floor,
        max_floor: cli.max_floor,
        travel_ticks_per_floor: cli.travel_ticks,
        door_transition_ticks: cli.door_transition_ticks,
        door_dwell_ticks: cli.door_dwell_ticks,
        door_reopen_window_ticks: cli.door_reopen_window_ticks,
    };
    let controller_config = ControllerConfig {
        home_floor: cli.home_floor,
        idle_timeout_ticks: cli.idle_timeout_ticks,
        idle_parking_mode: cli.parking,
    };

    let controller = build_controller(cli.strategy, controller_config);
    let engine = SimEngine::new(engine_config, controller)
        .context("Invalid simulation configuration")?;

    let events = random_scenario(cli.seed, &engine_config, cli.calls, cli.ticks);
    info!(
        "Running {:?} for {} ticks over floors {}..={} with {} scenario events",
        cli.strategy,
        cli.ticks,
        cli.min_floor,
        cli.max_floor,
        events.len()
    );

    let mut run = SimulationRun::new(engine, events);
    let report_every = cli.report_every.max(1);

    for tick in 0..cli.ticks {
        if cli.out_of_service_at == Some(tick) {
            run.engine_mut()
                .set_out_of_service()
                .context("Could not take car out of service")?;
        }
        if cli.return_at == Some(tick) {
            if run.engine().state().status() == MechanicalStatus::OutOfService {
                run.engine_mut()
                    .return_to_service()
                    .context("Could not return car to service")?;
            } else {
                warn!("Car not out of service at tick {}, ignoring return", tick);
            }
        }

        run.step();

        if (tick + 1) % report_every == 0 {
            let engine = run.engine();
            println!(
                "--- After tick {} --- {} | {} pending request(s)",
                tick + 1,
                engine.state(),
                engine.requests().count()
            );
        }
    }

    RunStats::collect(run.engine()).log_summary();
    Ok(())
}
