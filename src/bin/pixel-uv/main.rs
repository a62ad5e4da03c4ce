//! pixel-uv CLI - pixel-perfect UV editing from the command line.
//!
//! Usage: pixel-uv <COMMAND> [OPTIONS] <INPUT> [OUTPUT]
//!
//! Every command loads an OBJ file, runs one operator as if invoked from the
//! 3D viewport on a fully selected mesh, and writes the result.
//! Set `RUST_LOG=debug` for per-island details.

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Parser, Subcommand, ValueEnum};

use pixel_uv::algo::follow_quads::EdgeLengthMode;
use pixel_uv::algo::islands::{partition, Delimit};
use pixel_uv::io;
use pixel_uv::prelude::*;

type CliResult = std::result::Result<(), Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "pixel-uv")]
#[command(author, version, about = "Pixel-perfect UV editing CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display mesh and UV information
    Info {
        /// Input mesh file
        input: PathBuf,
    },

    /// Move all UVs by whole pixels
    Move {
        /// Input mesh file
        input: PathBuf,

        /// Output mesh file
        output: PathBuf,

        /// Texture width and height
        #[arg(short, long, default_value = "256")]
        resolution: u32,

        /// Pixels along U
        #[arg(long, default_value = "0", allow_negative_numbers = true)]
        dx: i32,

        /// Pixels along V
        #[arg(long, default_value = "0", allow_negative_numbers = true)]
        dy: i32,
    },

    /// Resize all UVs to whole pixels plus a pixel delta
    Scale {
        /// Input mesh file
        input: PathBuf,

        /// Output mesh file
        output: PathBuf,

        /// Texture width and height
        #[arg(short, long, default_value = "256")]
        resolution: u32,

        /// Pixels added to the width
        #[arg(long, default_value = "1", allow_negative_numbers = true)]
        dx: i32,

        /// Pixels added to the height
        #[arg(long, default_value = "1", allow_negative_numbers = true)]
        dy: i32,
    },

    /// Snap every UV to the nearest pixel corner
    Snap {
        /// Input mesh file
        input: PathBuf,

        /// Output mesh file
        output: PathBuf,

        /// Texture width and height
        #[arg(short, long, default_value = "256")]
        resolution: u32,
    },

    /// Snap the bounds of each UV island to whole pixels
    SnapIslands {
        /// Input mesh file
        input: PathBuf,

        /// Output mesh file
        output: PathBuf,

        /// Texture width and height
        #[arg(short, long, default_value = "256")]
        resolution: u32,
    },

    /// Lay out UV islands with a margin given in pixels
    Pack {
        /// Input mesh file
        input: PathBuf,

        /// Output mesh file
        output: PathBuf,

        /// Texture width and height
        #[arg(short, long, default_value = "256")]
        resolution: u32,

        /// Margin around each island in pixels
        #[arg(short, long, default_value = "2")]
        margin: u32,
    },

    /// Project over the sides and caps of a regular polygon cylinder
    Project {
        /// Input mesh file
        input: PathBuf,

        /// Output mesh file
        output: PathBuf,

        /// Number of cylinder sides
        #[arg(short, long, default_value = "4")]
        vertices: usize,

        /// Cap penalty in degrees (0 to 90)
        #[arg(short, long, default_value = "0")]
        cap_penalty: u32,

        /// Group faces by existing seams instead of projection sides
        #[arg(long)]
        use_seams: bool,
    },

    /// Straighten each UV island around its most rectangular quad
    FollowQuads {
        /// Input mesh file
        input: PathBuf,

        /// Output mesh file
        output: PathBuf,

        /// Edge length mode
        #[arg(short, long, value_enum, default_value = "even")]
        mode: LengthMode,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum LengthMode {
    /// Space all UVs evenly
    Even,
    /// Space UVs by the edge length of each quad
    Length,
    /// Space UVs by the average edge length of each ring
    LengthAverage,
}

impl From<LengthMode> for EdgeLengthMode {
    fn from(mode: LengthMode) -> Self {
        match mode {
            LengthMode::Even => EdgeLengthMode::Even,
            LengthMode::Length => EdgeLengthMode::Length,
            LengthMode::LengthAverage => EdgeLengthMode::LengthAverage,
        }
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> CliResult {
    let ctx = EditContext::viewport();

    match cli.command {
        Commands::Info { input } => {
            cmd_info(&input)?;
        }

        Commands::Move {
            input,
            output,
            resolution,
            dx,
            dy,
        } => {
            let options = MoveOptions::default()
                .with_resolution(resolution)
                .with_delta(dx, dy);
            println!("Moving UVs by ({}, {}) px at {}...", dx, dy, resolution);
            apply(&input, &output, |mesh| move_uvs_by_pixels(mesh, &ctx, &options))?;
        }

        Commands::Scale {
            input,
            output,
            resolution,
            dx,
            dy,
        } => {
            let options = ScaleOptions::default()
                .with_resolution(resolution)
                .with_delta(dx, dy);
            println!("Scaling UVs by ({}, {}) px at {}...", dx, dy, resolution);
            apply(&input, &output, |mesh| scale_uvs_by_pixels(mesh, &ctx, &options))?;
        }

        Commands::Snap {
            input,
            output,
            resolution,
        } => {
            let options = SnapOptions::default().with_resolution(resolution);
            println!("Snapping UVs to a {} px grid...", resolution);
            apply(&input, &output, |mesh| snap_uvs_to_pixels(mesh, &ctx, &options))?;
        }

        Commands::SnapIslands {
            input,
            output,
            resolution,
        } => {
            let options = SnapOptions::default().with_resolution(resolution);
            println!("Snapping UV island bounds to a {} px grid...", resolution);
            apply(&input, &output, |mesh| {
                snap_uv_island_bounds_to_pixels(mesh, &ctx, &options)
            })?;
        }

        Commands::Pack {
            input,
            output,
            resolution,
            margin,
        } => {
            let options = PackOptions::default()
                .with_resolution(resolution)
                .with_margin(margin);
            println!("Packing UV islands with a {} px margin at {}...", margin, resolution);
            apply(&input, &output, |mesh| {
                pack_islands_pixel_margin(mesh, &ctx, &options)
            })?;
        }

        Commands::Project {
            input,
            output,
            vertices,
            cap_penalty,
            use_seams,
        } => {
            let options = ProjectOptions::default()
                .with_vertices(vertices)
                .with_cap_penalty(cap_penalty)
                .with_use_seams(use_seams);
            println!(
                "Projecting over a {}-sided cylinder (cap penalty {}°)...",
                vertices, cap_penalty
            );
            apply(&input, &output, |mesh| regular_polygon_project(mesh, &ctx, &options))?;
        }

        Commands::FollowQuads {
            input,
            output,
            mode,
        } => {
            let options = FollowQuadsOptions::default().with_mode(mode.into());
            println!("Following quads ({:?})...", options.mode);
            apply(&input, &output, |mesh| smart_follow_quads(mesh, &ctx, &options))?;
        }
    }

    Ok(())
}

/// Load, run one operator, save.
fn apply<F>(input: &Path, output: &Path, op: F) -> CliResult
where
    F: FnOnce(&mut EditMesh) -> pixel_uv::Result<()>,
{
    let mut mesh: EditMesh = io::load(input)?;
    println!("Loaded: {} vertices, {} faces", mesh.num_vertices(), mesh.num_faces());

    let start = Instant::now();
    op(&mut mesh)?;
    let elapsed = start.elapsed();

    io::save(&mesh, output)?;
    println!("Saved: {} ({:.2?})", output.display(), elapsed);
    Ok(())
}

fn cmd_info(input: &Path) -> CliResult {
    let mesh: EditMesh = io::load(input)?;

    println!("File: {}", input.display());
    println!("Vertices: {}", mesh.num_vertices());
    println!("Faces: {}", mesh.num_faces());
    println!("Edges: {}", mesh.num_edges());

    let quads = mesh.face_ids().filter(|&f| mesh.face_degree(f) == 4).count();
    println!("Quads: {}", quads);

    if let Some((min, max)) = mesh.bounding_box() {
        println!(
            "Bounding box: ({:.3}, {:.3}, {:.3}) to ({:.3}, {:.3}, {:.3})",
            min.x, min.y, min.z, max.x, max.y, max.z
        );
    }

    let faces: Vec<FaceId> = mesh.face_ids().collect();
    let loops = mesh.loops_of(&faces);
    if let Some(bounds) = mesh.uv_layer().bounds(&loops) {
        println!(
            "UV bounds: ({:.4}, {:.4}) to ({:.4}, {:.4})",
            bounds.min.x, bounds.min.y, bounds.max.x, bounds.max.y
        );
    }

    let islands = partition(&mesh, &faces, Delimit::Uv);
    println!("UV islands: {}", islands.len());

    let seams = mesh.edge_ids().filter(|&e| mesh.is_seam(e)).count();
    println!("Seams: {}", seams);

    Ok(())
}
