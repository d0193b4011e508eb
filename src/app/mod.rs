pub mod shutdown;
pub mod state;

pub use shutdown::ShutdownManager;
pub use state::{App, RunOptions};

use anyhow::Result;
use std::sync::atomic::Ordering;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::time::{interval, MissedTickBehavior};

/// Operator commands read from stdin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Save,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim().to_ascii_lowercase().as_str() {
            "save" | "s" => Some(Self::Save),
            "quit" | "q" | "exit" => Some(Self::Quit),
            _ => None,
        }
    }
}

impl App {
    pub async fn run(&mut self, shutdown: &ShutdownManager) -> Result<()> {
        let mut ticker = interval(self.options.tick_rate);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        // Setup shutdown handler
        let flag = shutdown.flag();
        tokio::spawn(async move {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("Ctrl+C received, initiating graceful shutdown...");
            flag.store(true, Ordering::SeqCst);
        });

        let (tx, mut commands) = mpsc::unbounded_channel();
        tokio::spawn(async move {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                match Command::parse(&line) {
                    Some(cmd) => {
                        if tx.send(cmd).is_err() {
                            break;
                        }
                    }
                    None if line.trim().is_empty() => {}
                    None => tracing::warn!("Unknown command: {}", line.trim()),
                }
            }
        });

        tracing::info!(
            drones = self.options.drones,
            seed = self.options.seed,
            "Recording synthetic swarm (type 'save' to save now, 'quit' to stop)"
        );

        while self.running && !shutdown.is_shutdown_requested() {
            tokio::select! {
                _ = ticker.tick() => self.step(),
                Some(cmd) = commands.recv() => match cmd {
                    Command::Save => {
                        if let Some(path) = self.recorder.save_now() {
                            println!("Saved {}", path.display());
                        }
                    }
                    Command::Quit => shutdown.request_shutdown(),
                },
            }
        }

        if let Some(path) = shutdown.cleanup(&mut self.recorder) {
            println!("Saved {}", path.display());
        }
        Ok(())
    }
}
