//! Reef Arena - native headless runner
//!
//! Drives the simulation with the fixed-step accumulator a real frontend
//! would use. The autopilot plays unless `--no-autopilot` is given.

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    use anyhow::{Context, Result};
    use clap::Parser;

    use reef_arena::Tuning;
    use reef_arena::consts::{MAX_FRAME_DT, MAX_SUBSTEPS, SIM_DT};
    use reef_arena::sim::{EntityKind, GameEvent, GamePhase, GameState, TickInput, tick};

    #[derive(Parser)]
    #[command(name = "reef-arena")]
    #[command(about = "Run the Reef Arena simulation headless")]
    struct Cli {
        /// Run seed (defaults to the current time)
        #[arg(long)]
        seed: Option<u64>,
        /// Tuning JSON file; missing fields keep their defaults
        #[arg(long)]
        tuning: Option<PathBuf>,
        /// Simulated seconds to run for
        #[arg(long, default_value_t = 180.0)]
        seconds: f32,
        /// Simulated frame rate fed into the accumulator
        #[arg(long, default_value_t = 60.0)]
        fps: f32,
        /// Leave the player idle instead of letting the AI play
        #[arg(long)]
        no_autopilot: bool,
        /// Print the default tuning as JSON and exit
        #[arg(long)]
        dump_tuning: bool,
    }

    /// Totals gathered from the event stream
    #[derive(Debug, Default)]
    struct Tally {
        enemies_spawned: u32,
        despawns: u32,
        bullets_fired: u32,
        dashes: u32,
        damage_taken: f32,
    }

    struct Runner {
        state: GameState,
        accumulator: f32,
        input: TickInput,
        tally: Tally,
    }

    impl Runner {
        fn new(seed: u64, tuning: Tuning, autopilot: bool) -> Self {
            Self {
                state: GameState::with_tuning(seed, tuning),
                accumulator: 0.0,
                input: TickInput {
                    idle_mode: autopilot,
                    ..Default::default()
                },
                tally: Tally::default(),
            }
        }

        /// Run simulation ticks for one frame
        fn update(&mut self, dt: f32) {
            let dt = dt.min(MAX_FRAME_DT);
            self.accumulator += dt;

            let mut substeps = 0;
            while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                tick(&mut self.state, &self.input, SIM_DT);
                self.accumulator -= SIM_DT;
                substeps += 1;

                // Clear one-shot inputs after processing
                self.input.events.clear();
                self.input.pause = false;
            }

            for event in self.state.take_events() {
                self.record(event);
            }
        }

        fn record(&mut self, event: GameEvent) {
            match event {
                GameEvent::Spawned { kind, .. } => {
                    if matches!(kind, EntityKind::RangedOrbiter | EntityKind::MeleeStriker) {
                        self.tally.enemies_spawned += 1;
                    }
                }
                GameEvent::Despawned { .. } => self.tally.despawns += 1,
                GameEvent::PlayerDamaged { amount, health } => {
                    self.tally.damage_taken += amount;
                    log::debug!("Player hit for {} ({} left)", amount, health);
                }
                GameEvent::DashStarted => self.tally.dashes += 1,
                GameEvent::Shot { count } => self.tally.bullets_fired += count,
                GameEvent::LevelComplete { level } => {
                    log::info!("Level {} cleared at {:.1}s", level, self.state.clock);
                }
                GameEvent::LevelStarted { level } => log::info!("Level {} started", level),
                GameEvent::GameComplete => log::info!("Game complete"),
                GameEvent::GameOver => log::info!("Game over"),
            }
        }

        fn finished(&self) -> bool {
            matches!(self.state.phase, GamePhase::GameOver | GamePhase::Complete)
        }
    }

    fn default_seed() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }

    pub fn run() -> Result<()> {
        env_logger::init();
        let cli = Cli::parse();

        if cli.dump_tuning {
            println!("{}", Tuning::default().to_json()?);
            return Ok(());
        }

        let tuning = match &cli.tuning {
            Some(path) => Tuning::load(path)
                .with_context(|| format!("Failed to load tuning from {}", path.display()))?,
            None => Tuning::default(),
        };
        if cli.fps <= 0.0 {
            anyhow::bail!("--fps must be positive, got {}", cli.fps);
        }

        let seed = cli.seed.unwrap_or_else(default_seed);
        log::info!("Reef Arena (native) starting with seed {}", seed);

        let mut runner = Runner::new(seed, tuning, !cli.no_autopilot);
        let frame_dt = 1.0 / cli.fps;
        let frames = (cli.seconds * cli.fps).ceil() as u64;
        for _ in 0..frames {
            runner.update(frame_dt);
            if runner.finished() {
                break;
            }
        }

        let hud = runner.state.hud;
        let tally = &runner.tally;
        println!("seed:            {}", seed);
        println!("phase:           {:?}", runner.state.phase);
        println!("time:            {:.2}s ({} ticks)", runner.state.clock, runner.state.time_ticks);
        println!("level:           {}", hud.level);
        println!("health:          {} ({:?})", hud.health, hud.health_band());
        println!("enemies left:    {}", hud.enemies_remaining);
        println!("enemies spawned: {}", tally.enemies_spawned);
        println!("despawns:        {}", tally.despawns);
        println!("bullets fired:   {}", tally.bullets_fired);
        println!("dashes:          {}", tally.dashes);
        println!("damage taken:    {}", tally.damage_taken);
        println!("{}", hud.dash_label());
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    native::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The simulation is embedded by a frontend on the web
}
