//! Tether chain CLI.
//!
//! Provides three modes of operation:
//! - `inspect`: Print a profile summary (or JSON)
//! - `lod`: Resolve LOD selections for observer distances
//! - `simulate`: Build a chain in rapier, step it, print link positions

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use bevy::log::LogPlugin;
use bevy::prelude::*;
use clap::{Parser, Subcommand};
use serde::Serialize;

use tether_core::prelude::*;
use tether_physics::prelude::*;

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

/// Procedural chain and rope construction.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a profile summary.
    Inspect {
        /// Profile TOML file.
        profile: PathBuf,

        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Resolve LOD selections for observer distances.
    Lod {
        /// Profile TOML file.
        profile: PathBuf,

        /// Observer distances.
        #[arg(short, long, num_args = 1.., required = true)]
        distance: Vec<f32>,
    },

    /// Build a chain in rapier, step it and print link positions.
    Simulate {
        /// Profile TOML file.
        profile: PathBuf,

        /// Start anchor `x,y,z`.
        #[arg(long, value_parser = parse_vec3, default_value = "0,0,1000")]
        start: Vec3,

        /// End anchor `x,y,z`. Omit for a loose end.
        #[arg(long, value_parser = parse_vec3)]
        end: Option<Vec3>,

        /// Frames to step.
        #[arg(short, long, default_value_t = 120)]
        steps: u32,

        /// Joint to break after the first frame.
        #[arg(long = "break")]
        break_link: Option<usize>,

        /// Physics config TOML file.
        #[arg(long)]
        physics: Option<PathBuf>,
    },
}

fn parse_vec3(s: &str) -> Result<Vec3, String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    let [x, y, z] = parts.as_slice() else {
        return Err(format!("expected x,y,z, got '{s}'"));
    };
    let parse = |v: &str| v.parse::<f32>().map_err(|e| format!("'{v}': {e}"));
    Ok(Vec3::new(parse(x)?, parse(y)?, parse(z)?))
}

// ---------------------------------------------------------------------------
// Mode implementations
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct InspectReport<'a> {
    profile: &'a ChainProfile,
    base_segment_count: usize,
    segment_length: f32,
    replication: ReplicationPlan,
}

fn run_inspect(path: &Path, json: bool) -> Result<(), TetherError> {
    let profile = ChainProfile::from_file(path)?;
    let count = profile.base_segment_count();
    let report = InspectReport {
        profile: &profile,
        base_segment_count: count,
        segment_length: profile.segment_length(),
        replication: ReplicationPlan::for_chain(&profile.network, count),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("profile '{}' ({:?})", profile.name, profile.chain_type);
    println!(
        "  segments={}, length={}, segment_length={:.2}",
        count,
        profile.base_length(),
        report.segment_length
    );
    println!(
        "  loose_end={}, dynamic_length={}, world_rest_pose={}",
        profile.supports_loose_end,
        profile.allow_dynamic_length_change,
        profile.use_world_space_rest_pose
    );
    println!("  lod levels:");
    for (i, level) in profile.lod_levels.iter().enumerate() {
        println!(
            "    [{i}] {}..={} override={} simulate={} collisions={} rate={}",
            level.min_distance,
            level.max_distance,
            level.segment_count_override,
            level.simulate_physics,
            level.enable_collisions,
            level.simulation_rate_factor
        );
    }
    println!(
        "  replication: {:?} links {:?}",
        report.replication.mode, report.replication.link_indices
    );
    Ok(())
}

fn run_lod(path: &Path, distances: &[f32]) -> Result<(), TetherError> {
    let profile = ChainProfile::from_file(path)?;
    for &d in distances {
        let lod = select_lod(&profile, d);
        let level = lod
            .index
            .map_or_else(|| "none".to_owned(), |i| i.to_string());
        println!(
            "distance={d}: level={level} segments={} simulate={} collisions={} rate={}",
            lod.segment_count, lod.simulate_physics, lod.enable_collisions, lod.simulation_rate_factor
        );
    }
    Ok(())
}

struct SimulateArgs {
    start: Vec3,
    end: Option<Vec3>,
    steps: u32,
    break_link: Option<usize>,
}

const START_ATTACHMENT: AttachmentId = AttachmentId(1);
const END_ATTACHMENT: AttachmentId = AttachmentId(2);

fn run_simulate(
    path: &Path,
    physics: Option<&Path>,
    args: &SimulateArgs,
) -> Result<(), TetherError> {
    let mut profile = ChainProfile::from_file(path)?;
    let config = physics
        .map(PhysicsConfig::from_file)
        .transpose()?
        .unwrap_or_default();

    let mut app = App::new();
    app.add_plugins(LogPlugin::default());
    app.insert_resource(config);
    app.add_plugins((TetherCorePlugin, TetherPhysicsPlugin::new(RapierBackend)));
    app.finish();
    app.cleanup();

    // Anchors are kinematic attachments so both ends hold in place.
    let end_anchor = {
        let mut ctx = app.world_mut().resource_mut::<RapierContext>();
        ctx.register_attachment(START_ATTACHMENT, Transform::from_translation(args.start));
        match args.end {
            Some(end) => {
                ctx.register_attachment(END_ATTACHMENT, Transform::from_translation(end));
                profile.supports_loose_end = false;
                Anchor::attachment(END_ATTACHMENT)
            }
            None => Anchor::default(),
        }
    };

    let instance = ChainInstance::new(Arc::new(profile))
        .with_anchors(Anchor::attachment(START_ATTACHMENT), end_anchor);
    let chain = app.world_mut().spawn(Chain::new(instance)).id();
    app.update();

    if let Some(index) = args.break_link {
        app.world_mut()
            .resource_scope(|world, mut ctx: Mut<RapierContext>| {
                if let Some(mut c) = world.get_mut::<Chain>(chain) {
                    c.instance.break_link(&mut *ctx, index);
                }
            });
    }

    for _ in 0..args.steps {
        app.update();
    }

    let world = app.world();
    let ctx = world.resource::<RapierContext>();
    let Some(c) = world.get::<Chain>(chain) else {
        return Ok(());
    };
    println!(
        "chain: {} links, {} joints after {} frames",
        c.instance.segment_count(),
        c.instance.joints().len(),
        args.steps
    );
    for (i, link) in c.instance.links().iter().enumerate() {
        if let Some(t) = ctx.link_transform(*link) {
            let p = t.translation;
            println!("  link {i}: ({:.2}, {:.2}, {:.2})", p.x, p.y, p.z);
        }
    }
    for i in 0..c.instance.joints().len() {
        if c.instance.is_link_broken(ctx, i) {
            println!("  joint {i}: broken");
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Inspect { profile, json } => run_inspect(&profile, json),
        Commands::Lod { profile, distance } => run_lod(&profile, &distance),
        Commands::Simulate {
            profile,
            start,
            end,
            steps,
            break_link,
            physics,
        } => run_simulate(
            &profile,
            physics.as_deref(),
            &SimulateArgs {
                start,
                end,
                steps,
                break_link,
            },
        ),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
