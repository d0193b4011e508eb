use anyhow::Context;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::PathBuf;
use swarmtrail_core::analysis::{centroid_error, main_group_centroid, reference_path};
use swarmtrail_io::{latest_log, load_log};

#[derive(Parser, Debug)]
#[command(author, version, about = "Main-group centroid analysis of a trajectory log", long_about = None)]
struct Args {
    /// Log file to analyze
    #[arg(short, long, conflicts_with = "dir")]
    input: Option<PathBuf>,

    /// Analyze the most recent *_traj.json in this directory
    #[arg(short, long, default_value = "Data/Trajectories")]
    dir: PathBuf,

    /// TOML file with the reference route (`scale` and `steps`)
    #[arg(short, long)]
    reference: Option<PathBuf>,

    /// Overrides the reference route's scale
    #[arg(short, long)]
    scale: Option<f64>,

    #[arg(short, long, default_value = "centroid.csv")]
    output: PathBuf,
}

/// Reference route as relative `(dx, dz)` steps from the origin.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
struct ReferenceRoute {
    scale: f64,
    steps: Vec<(f64, f64)>,
}

impl Default for ReferenceRoute {
    fn default() -> Self {
        Self {
            scale: 0.3,
            steps: vec![
                (0.0, 140.0),
                (-140.0, 0.0),
                (0.0, 100.0),
                (100.0, 0.0),
                (0.0, 160.0),
                (-100.0, 0.0),
                (0.0, 100.0),
                (-140.0, 0.0),
                (0.0, -160.0),
                (-200.0, 0.0),
                (0.0, 100.0),
                (100.0, 0.0),
            ],
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let path = match args.input {
        Some(path) => path,
        None => latest_log(&args.dir)?,
    };
    println!("Analyzing {}...", path.display());
    let log = load_log(&path)?;

    let mut route = match &args.reference {
        Some(file) => {
            let text = std::fs::read_to_string(file)
                .with_context(|| format!("reading reference route {}", file.display()))?;
            toml::from_str::<ReferenceRoute>(&text)
                .with_context(|| format!("parsing reference route {}", file.display()))?
        }
        None => ReferenceRoute::default(),
    };
    if let Some(scale) = args.scale {
        anyhow::ensure!(scale.is_finite() && scale > 0.0, "--scale must be positive");
        route.scale = scale;
    }
    let polyline = reference_path(&route.steps, route.scale);

    let centroids = main_group_centroid(&log);
    anyhow::ensure!(!centroids.is_empty(), "log contains no frames");
    let (errors, summary) = centroid_error(&centroids, &polyline);

    let mut csv = String::from("t,x,z,members,error\n");
    for (c, err) in centroids.iter().zip(&errors) {
        writeln!(csv, "{:.3},{:.4},{:.4},{},{:.4}", c.t, c.x, c.z, c.members, err)?;
    }
    std::fs::write(&args.output, csv)
        .with_context(|| format!("writing {}", args.output.display()))?;

    let grouped_frames = log
        .trajectories
        .iter()
        .flat_map(|t| t.frames.iter())
        .filter(|f| f.in_main_group)
        .count();

    println!("Scene:        {}", log.scene_label);
    println!(
        "Participant:  {} ({}, {})",
        log.participant_id,
        log.haptics_tag(),
        log.order_tag()
    );
    println!("Drones:       {}", log.trajectories.len());
    println!(
        "Frames:       {} ({} in main group)",
        log.frame_count(),
        grouped_frames
    );
    println!("Centroids:    {}", centroids.len());
    if let Some(summary) = summary {
        println!("Mean error:   {:.3}", summary.mean);
        println!("Max error:    {:.3}", summary.max);
    }
    println!("Centroid track written to {}", args.output.display());

    Ok(())
}
