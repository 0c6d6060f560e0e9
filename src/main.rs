//! NaSch Orbits entry point
//!
//! Headless runner: builds the scene from settings, advances it at the fixed
//! timestep and reports traffic statistics.

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::PathBuf;
    use std::process::ExitCode;

    use clap::Parser;

    use nasch_orbits::consts::SIM_DT;
    use nasch_orbits::road::RoadKind;
    use nasch_orbits::sim::{SimState, TickInput, tick};
    use nasch_orbits::{Settings, SimResult};

    /// Ticks between statistics log lines (one simulated second)
    const REPORT_INTERVAL: u64 = 60;

    #[derive(Parser)]
    #[clap(version, about)]
    pub struct Options {
        /// JSON settings file; defaults apply when omitted.
        pub settings: Option<PathBuf>,

        /// Number of fixed timesteps to simulate.
        #[clap(long, default_value_t = 600)]
        pub ticks: u64,

        /// Road shape, overriding the settings file (circle, oval, noise, spiral).
        #[clap(long, value_parser = parse_road)]
        pub road: Option<RoadKind>,

        /// Print a JSON snapshot of every track to stdout when done.
        #[clap(long)]
        pub snapshot: bool,

        /// Write the effective settings to this path before running.
        #[clap(long)]
        pub save_settings: Option<PathBuf>,
    }

    fn parse_road(s: &str) -> Result<RoadKind, String> {
        RoadKind::from_str(s).ok_or_else(|| format!("unknown road kind '{s}'"))
    }

    pub fn run(options: Options) -> SimResult<()> {
        let mut settings = Settings::load_or_default(options.settings.as_deref())?;
        if let Some(road) = options.road {
            settings.road = road;
        }
        if let Some(path) = &options.save_settings {
            settings.save(path)?;
        }

        let mut state = SimState::new(settings)?;
        let mut input = TickInput {
            start: true,
            ..Default::default()
        };

        for _ in 0..options.ticks {
            tick(&mut state, &input, SIM_DT);
            input = TickInput::default();

            if state.time_ticks % REPORT_INTERVAL == 0 {
                for (index, track) in state.tracks.iter().enumerate() {
                    let stats = track.stats();
                    log::info!(
                        "t={:.1}s track {}: {} vehicles, mean v {:.2}, stopped {}, flow {:.3}",
                        state.elapsed,
                        index,
                        stats.vehicles,
                        stats.mean_velocity,
                        stats.stopped,
                        stats.flow
                    );
                }
            }
        }

        log::info!(
            "Finished {} ticks, {} vehicles remain",
            state.time_ticks,
            state.vehicle_count()
        );

        if options.snapshot {
            println!("{}", serde_json::to_string_pretty(&state.snapshot())?);
        }
        Ok(())
    }

    pub fn main() -> ExitCode {
        env_logger::init();
        log::info!("NaSch Orbits starting...");

        match run(Options::parse()) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                log::error!("{}", e);
                eprintln!("error: {e}");
                ExitCode::FAILURE
            }
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    native::main()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Library-only on the web; embed `nasch_orbits::sim` from a host page instead
}
