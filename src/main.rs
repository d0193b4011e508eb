use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use swarmtrail_core::init_logging;
use swarmtrail_lib::app::{App, RunOptions, ShutdownManager};

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless swarm trajectory recorder", long_about = None)]
struct Args {
    /// Custom config file path
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Stop after this many seconds of simulated time
    #[arg(short, long)]
    duration: Option<f64>,

    /// Number of synthetic drones
    #[arg(long, default_value_t = 12)]
    drones: usize,

    /// Seed for the synthetic swarm
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Scene label used in the log and its file name
    #[arg(long, default_value = "Synthetic Swarm")]
    scene: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();

    let duration = match args.duration {
        Some(secs) if secs.is_finite() && secs > 0.0 => Some(Duration::from_secs_f64(secs)),
        Some(secs) => anyhow::bail!("--duration must be a positive number of seconds, got {secs}"),
        None => None,
    };

    let options = RunOptions {
        config_path: args.config,
        drones: args.drones,
        seed: args.seed,
        scene: args.scene,
        duration,
        ..RunOptions::default()
    };

    let mut app = App::new(options)?;
    let mut shutdown = ShutdownManager::new();
    shutdown.set_save_on_exit(app.recorder.config().persistence.save_on_exit);

    let res = app.run(&shutdown).await;
    if let Err(e) = res {
        eprintln!("Recorder error: {e:#}");
        shutdown.set_exit_code(1);
    } else {
        println!(
            "Exited clean after {} ticks ({:.1} s recorded).",
            app.tick_count,
            app.recorder.run_time()
        );
    }

    std::process::exit(shutdown.exit_code());
}
