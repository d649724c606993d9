//! Cue engine headless runner.
//!
//! Loads a scenario of entities with scripted timers and media clips, then
//! drives the process scheduler at a fixed frame delta until every process
//! has finished or the frame limit is reached. Bytecode entry points are not
//! executed; every invocation is traced instead.
//!
//! # Main Loop
//!
//! 1. Read `engine.ini` (or `--config`) into [`EngineConfig`]
//! 2. Build the ECS world: clock, script context, trace VM, media, scheduler
//! 3. Spawn the scenario
//! 4. Each frame: advance [`WorldTime`], tick processes, drop released media
//! 5. Abort whatever is still alive and report
//!
//! # Running
//!
//! ```sh
//! cargo run -- --scenario demos/door.json
//! ```

use bevy_ecs::observer::Observer;
use bevy_ecs::prelude::*;
use clap::Parser;
use std::path::PathBuf;

use cueengine::events::process::ProcessEndedEvent;
use cueengine::resources::engineconfig::EngineConfig;
use cueengine::resources::media::MediaPlayers;
use cueengine::resources::scheduler::ProcessScheduler;
use cueengine::resources::scripting::{Bytecode, ScriptContext, TraceVm};
use cueengine::resources::worldtime::WorldTime;
use cueengine::scenario::Scenario;
use cueengine::systems::media::release_finished_players;
use cueengine::systems::processes::run_processes;
use cueengine::systems::time::update_world_time;

/// Cue engine: scripted timer and playback scheduler
#[derive(Parser)]
#[command(version, about = "Runs a timer/playback scenario headless and traces script calls.")]
struct Cli {
    /// Scenario JSON file to run.
    #[arg(long, value_name = "PATH")]
    scenario: Option<PathBuf>,

    /// INI configuration file (default: ./engine.ini).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Override `clock.max_frames`.
    #[arg(long, value_name = "N")]
    frames: Option<u64>,

    /// Write the effective configuration to the config path and exit.
    #[arg(long)]
    write_config: bool,
}

fn log_process_end(trigger: On<ProcessEndedEvent>, time: Res<WorldTime>) {
    let event = trigger.event();
    log::info!(
        "[t={:.3}] process {} '{}' {} (entity {:?})",
        time.elapsed,
        event.id.get(),
        event.name,
        event.outcome,
        event.entity
    );
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = match cli.config {
        Some(path) => EngineConfig::with_path(path),
        None => EngineConfig::new(),
    };
    if let Err(e) = config.load_from_file() {
        log::warn!("{}; using defaults", e);
    }
    if let Some(frames) = cli.frames {
        config.max_frames = frames;
    }

    // Early-exit: write config and quit
    if cli.write_config {
        if let Err(e) = config.save_to_file() {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
        return;
    }

    let scenario = match cli.scenario {
        Some(path) => match Scenario::load_from_file(&path.to_string_lossy()) {
            Ok(scenario) => scenario,
            Err(e) => {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        },
        None => {
            log::warn!("no --scenario given, nothing to run");
            Scenario::default()
        }
    };

    // --------------- ECS world + resources ---------------
    let trace_vm = TraceVm::new(config.trace_scripts);
    let trace = trace_vm.log();

    let mut world = World::new();
    world.insert_resource(WorldTime::default().with_time_scale(config.time_scale));
    world.insert_resource(ScriptContext::new());
    world.insert_resource(Bytecode::new(trace_vm));
    world.insert_resource(MediaPlayers::new());
    world.insert_resource(ProcessScheduler::new());
    world.insert_resource(config.clone());
    world.spawn(Observer::new(log_process_end));
    world.flush();

    scenario.spawn(&mut world);

    let mut update = Schedule::default();
    update.add_systems((run_processes, release_finished_players).chain());

    // --------------- Main loop ---------------
    while world.resource::<WorldTime>().frame_count < config.max_frames
        && !world.resource::<ProcessScheduler>().is_empty()
    {
        update_world_time(&mut world, config.fixed_delta);
        update.run(&mut world);
        world.clear_trackers();
    }

    let leftover = world.resource_scope(|world, mut scheduler: Mut<ProcessScheduler>| {
        let count = scheduler.abort_all();
        scheduler.reap(world);
        count
    });
    world.resource_mut::<MediaPlayers>().collect_released();
    if leftover > 0 {
        log::warn!(
            "frame limit {} reached, aborted {} process(es)",
            config.max_frames,
            leftover
        );
    }

    let wt = world.resource::<WorldTime>();
    log::info!(
        "done after {} frame(s), t={:.3}, {} script call(s)",
        wt.frame_count,
        wt.elapsed,
        trace.len()
    );
}
