//! Falling Words entry point
//!
//! Native: runs a headless session on the rapier solver, presses the armed
//! word as soon as it is offered, and logs how the run went.
//! Web: the host drives `falling_words::web::WebSession` directly.

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::{Path, PathBuf};

    use anyhow::{Context, Result};
    use clap::Parser;

    use falling_words::consts::SIM_DT_MS;
    use falling_words::headless::{HeadlessAudio, HeadlessStage};
    use falling_words::sim::{Phase, RapierPhysics, Session};
    use falling_words::surface::Outputs;
    use falling_words::{ConfigFile, Viewport};

    /// Give up after this much simulated time
    const MAX_RUN_MS: f64 = 120_000.0;
    /// Keep running this long after detonation so the post sequence plays out
    const TAIL_MS: f64 = 30_000.0;

    /// Headless Falling Words session
    #[derive(Parser, Debug)]
    #[command(name = "falling-words")]
    #[command(about = "Drop words into a pile, detonate the chosen one, log the run", long_about = None)]
    #[command(version)]
    pub struct Cli {
        /// JSON config file with optional `base` and `mobile` sections
        #[arg(long, value_name = "PATH")]
        pub config: Option<PathBuf>,

        /// Seed for drop placement and blast jitter
        #[arg(long, default_value_t = 1)]
        pub seed: u64,

        /// Viewport width in px
        #[arg(long, default_value_t = 1280.0)]
        pub width: f32,

        /// Viewport height in px
        #[arg(long, default_value_t = 720.0)]
        pub height: f32,
    }

    fn load_config(path: Option<&Path>) -> Result<ConfigFile> {
        let Some(path) = path else {
            return Ok(ConfigFile::default());
        };
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        ConfigFile::from_json(&json).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn run(cli: Cli) -> Result<()> {
        let file = load_config(cli.config.as_deref())?;
        let viewport = Viewport::new(cli.width, cli.height);
        let config = file.resolve(&viewport);

        let mut session = Session::new(config, viewport, RapierPhysics::new(), cli.seed);
        let mut stage = HeadlessStage::new();
        let mut audio = HeadlessAudio::default();
        log::info!(
            "Session {}x{} created with seed {}",
            viewport.width,
            viewport.height,
            cli.seed
        );

        let mut out = Outputs::new(&mut stage, &mut audio);
        session.start(&mut out);

        while session.now_ms() < MAX_RUN_MS {
            session.update(SIM_DT_MS, &mut out);
            match session.phase() {
                Phase::Armed => {
                    session.activate(&mut out);
                }
                Phase::NoCandidate => break,
                Phase::PostSequence => {
                    let done = session
                        .summary()
                        .detonated_at_ms
                        .is_some_and(|at| session.now_ms() >= at + TAIL_MS);
                    if done {
                        break;
                    }
                }
                _ => {}
            }
        }

        let summary = serde_json::to_string(&session.summary()).context("serializing summary")?;
        log::info!("Summary: {summary}");
        log::info!(
            "{} presentation commands, {} sounds played",
            stage.commands().len(),
            audio.played.len()
        );
        Ok(())
    }

}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    use clap::Parser;

    env_logger::init();
    log::info!("Falling Words (native, headless) starting...");
    native::run(native::Cli::parse())
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is the library's start function, this is just to satisfy the compiler
}
