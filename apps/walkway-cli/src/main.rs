use anyhow::Context;
use clap::{Parser, Subcommand};
use glam::Vec3;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use walkway_input::{Intent, Key, KeyEvent};
use walkway_kernel::Scene;
use walkway_motion::{Controller, MovementConfig, MovementLoop, PointerLockController, ProbeRing};
use walkway_render::{DebugTextRenderer, RenderView, Renderer};

/// Frame rate scripted walks assume when advancing scene animation.
const FRAMES_PER_SECOND: f32 = 60.0;

#[derive(Parser)]
#[command(name = "walkway-cli", about = "Headless tools for the walkway scene")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// JSON file overriding movement tuning
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Where the player stands and faces.
#[derive(clap::Args)]
struct Pose {
    /// Player X position
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    x: f32,
    /// Player Z position
    #[arg(long, default_value = "19", allow_hyphen_values = true)]
    z: f32,
    /// Yaw in degrees; 0 faces -Z, positive turns left
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    yaw: f32,
}

impl Pose {
    fn controller(&self, config: &MovementConfig) -> PointerLockController {
        let mut controller = PointerLockController::new(Vec3::new(self.x, 0.0, self.z))
            .with_sensitivity(config.look_sensitivity);
        controller.yaw = self.yaw.to_radians();
        controller
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print version, movement tuning and a dump of the scene
    Info,
    /// Cast the probe ring once and report what each probe sees
    Probe {
        #[command(flatten)]
        pose: Pose,
        /// Scene time in seconds (the cube spins with time)
        #[arg(long, default_value = "0")]
        time: f32,
    },
    /// Hold keys for a number of frames and report where the player ends up
    Walk {
        #[command(flatten)]
        pose: Pose,
        /// Frames to simulate
        #[arg(short, long, default_value = "60")]
        frames: u32,
        /// Keys held for the whole walk, e.g. `w,d` or `up,left`
        #[arg(short, long, value_delimiter = ',', value_parser = parse_key, default_value = "w")]
        keys: Vec<Key>,
    },
}

fn parse_key(name: &str) -> Result<Key, String> {
    Key::parse(name).ok_or_else(|| format!("unknown movement key '{name}'"))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = match &cli.config {
        Some(path) => MovementConfig::from_json_file(path)
            .with_context(|| format!("loading movement config {}", path.display()))?,
        None => MovementConfig::default(),
    };
    let mut scene = Scene::walkway().context("building walkway scene")?;

    match cli.command {
        Commands::Info => {
            println!("walkway-cli v{}", env!("CARGO_PKG_VERSION"));
            println!(
                "movement: speed={} strafe={} probes=[{}, {}] block<={} height={}",
                config.speed,
                config.strafe_speed(),
                config.probe_near,
                config.probe_far,
                config.block_distance,
                config.probe_height
            );
            let view = RenderView::default();
            print!("{}", DebugTextRenderer::new().render(&scene, &view));
        }
        Commands::Probe { pose, time } => {
            scene.advance(time);
            let controller = pose.controller(&config);
            let ring = ProbeRing::around(controller.position(), controller.ground_forward(), &config);
            let hits = ring.cast(&scene);

            println!(
                "Probes from ({:.2}, {:.2}) yaw {}°:",
                pose.x, pose.z, pose.yaw
            );
            for (probe, hit) in ring.probes().iter().zip(hits) {
                let dir = probe.caster.ray.direction;
                let status = match hit {
                    Some(d) if d <= config.block_distance => format!("{d:.3}  BLOCKED"),
                    Some(d) => format!("{d:.3}"),
                    None => "clear".to_string(),
                };
                println!(
                    "  {:<12} ({:+.2}, {:+.2})  {status}",
                    probe.heading.label(),
                    dir.x,
                    dir.z
                );
            }
        }
        Commands::Walk { pose, frames, keys } => {
            let movement = MovementLoop::new(config);
            let mut controller = pose.controller(movement.config());
            let mut intent = Intent::new();
            let start = controller.position();
            let mut blocked_frames = 0u32;
            let mut last_blocked = Vec::new();

            for frame in 0..frames {
                scene.advance(frame as f32 / FRAMES_PER_SECOND);
                // Held keys auto-repeat, so every frame re-presses them.
                for key in &keys {
                    intent.apply(KeyEvent::Down(*key));
                }
                let report = movement.tick(&mut intent, &mut controller, &scene);
                tracing::trace!(frame, x = controller.position.x, z = controller.position.z);
                if !report.blocked.is_empty() {
                    blocked_frames += 1;
                }
                if report.blocked != last_blocked {
                    let labels: Vec<&str> = report.blocked.iter().map(|h| h.label()).collect();
                    println!("frame {frame:>4}: blocked [{}]", labels.join(", "));
                    last_blocked = report.blocked;
                }
            }

            let end = controller.position();
            println!(
                "Walked {frames} frames: ({:.3}, {:.3}) -> ({:.3}, {:.3}), distance {:.3}",
                start.x,
                start.z,
                end.x,
                end.z,
                start.distance(end)
            );
            println!("Blocked on {blocked_frames} of {frames} frames");
        }
    }

    Ok(())
}
