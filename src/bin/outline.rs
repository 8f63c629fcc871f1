//! Prints the maximal solid boxes of a voxel mesh.
//!
//! Usage: cargo run --release --bin outline -- [OPTIONS] [MESH_FILE]
//!
//! Options:
//!   --sphere <RADIUS>   Outline a generated sphere instead of a file
//!   --config <PATH>     JSON mesh config (min_leaf, chunk_size)
//!   --save <PATH>       Save the outlined mesh to PATH
//!   --quiet             Print totals only

use std::process::ExitCode;

use voxmesh::core::{MeshConfig, Result};
use voxmesh::io::disk_io;
use voxmesh::meshing::build_cubic_mesh;
use voxmesh::voxel::{OctreeOutlineWalker, OutlineBox, ShapeVoxelMesh, Voxel, VoxelMesh};

fn main() -> ExitCode {
    voxmesh::core::logging::init();

    let args: Vec<String> = std::env::args().collect();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &[String]) -> Result<()> {
    let config = match parse_str_arg(args, "--config") {
        Some(path) => MeshConfig::load(path)?,
        None => MeshConfig::default(),
    };
    let quiet = args.iter().any(|a| a == "--quiet");

    let mesh: Box<dyn VoxelMesh> = if let Some(radius) = parse_u32_arg(args, "--sphere") {
        log::info!("Generating sphere of radius {}", radius);
        Box::new(ShapeVoxelMesh::sphere(radius, Voxel::rgb(200, 60, 40)))
    } else if let Some(path) = positional(args) {
        log::info!("Loading {}", path);
        Box::new(disk_io::load_mesh(path, config.builder().as_ref())?)
    } else {
        eprintln!("Usage: outline [--sphere <RADIUS> | MESH_FILE] [--config <PATH>] [--save <PATH>] [--quiet]");
        return Ok(());
    };

    println!("=== Voxel Outline ===");
    println!("Start:      {}", mesh.start());
    println!("Dimensions: {}", mesh.dimensions());

    let mut walker = OctreeOutlineWalker::new(mesh.as_ref());
    let mut boxes = 0usize;
    let mut cells = 0usize;
    for volume in walker.by_ref() {
        let solid = OutlineBox::from(&volume);
        boxes += 1;
        cells += solid.dimensions.volume();
        if !quiet {
            println!("  {} .. {} ({})", solid.start, solid.end(), solid.dimensions);
        }
    }
    println!("Boxes:   {}", boxes);
    println!("Solid:   {} cells", cells);
    println!("Visited: {} regions", walker.visited());

    let cubic = build_cubic_mesh(mesh.as_ref());
    println!("Faces:   {}", cubic.face_count());

    if let Some(path) = parse_str_arg(args, "--save") {
        disk_io::save_mesh(&path, mesh.as_ref())?;
        println!("Saved:   {}", path);
    }
    Ok(())
}

/// First argument that is neither a flag nor a flag's value
fn positional(args: &[String]) -> Option<&str> {
    const VALUED: [&str; 3] = ["--sphere", "--config", "--save"];
    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        if VALUED.contains(&arg.as_str()) {
            iter.next();
        } else if !arg.starts_with("--") {
            return Some(arg);
        }
    }
    None
}

fn parse_u32_arg(args: &[String], flag: &str) -> Option<u32> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_str_arg(args: &[String], flag: &str) -> Option<String> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}
