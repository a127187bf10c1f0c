//! Voxel report binary - voxelizes a procedural row of rooms and prints volume statistics.
//!
//! Usage: cargo run --release --bin voxel_report -- [OPTIONS]
//!
//! Options:
//!   --rooms <N>         Number of rooms in the row (default: 4)
//!   --room-size <M>     Room edge length (default: 3.0)
//!   --voxel <SIZE>      Voxel edge length (default: 0.1)
//!   --chunk <CELLS>     Chunk edge in cells (default: from config)
//!   --budget-mb <MB>    Resident chunk budget (default: from config)
//!   --spill <DIR>       Spill evicted chunks under DIR
//!   --config <FILE>     Grid configuration as JSON
//!
//! The report is written to stdout as JSON.

use std::path::PathBuf;
use std::time::Instant;

use serde_json::json;

use fastvoxel::core::logging;
use fastvoxel::raster::shapes;
use fastvoxel::{DVec3, Error, GridConfig, Result, Voxelizer};

fn main() {
    logging::init_with_timestamps();

    if let Err(e) = run() {
        eprintln!("voxel_report: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let rooms = parse_usize_arg(&args, "--rooms").unwrap_or(4).max(1);
    let room_size = parse_f64_arg(&args, "--room-size").unwrap_or(3.0);
    let voxel = parse_f64_arg(&args, "--voxel").unwrap_or(0.1);

    let mut config = match parse_str_arg(&args, "--config") {
        Some(path) => {
            let text = std::fs::read_to_string(&path)?;
            serde_json::from_str::<GridConfig>(&text)
                .map_err(|e| Error::Configuration(format!("{}: {}", path, e)))?
        }
        None => GridConfig::default(),
    };
    if let Some(edge) = parse_u32_arg(&args, "--chunk") {
        config.chunk_edge = edge;
    }
    if let Some(mb) = parse_usize_arg(&args, "--budget-mb") {
        config = config.with_budget_mb(mb);
    }
    if let Some(dir) = parse_str_arg(&args, "--spill") {
        config.spill_dir = Some(PathBuf::from(dir));
    }

    eprintln!("=== FastVoxel Report ===");
    eprintln!("Rooms:  {} x {}m", rooms, room_size);
    eprintln!("Voxel:  {}", voxel);
    eprintln!("Chunks: {}^3, budget {} bytes", config.chunk_edge, config.memory_budget_bytes);
    eprintln!();

    let triangles = shapes::room_row(DVec3::ZERO, rooms, room_size, 1);
    let max = DVec3::new(rooms as f64 * room_size, room_size, room_size);

    let start = Instant::now();
    let mut vox = Voxelizer::new(config)?;
    vox.configure(DVec3::ZERO, max, voxel)?;
    vox.push_triangles(&triangles)?;
    let ingest_secs = start.elapsed().as_secs_f64();
    vox.segment()?;
    let total_secs = start.elapsed().as_secs_f64();

    let dims = vox.dims()?;
    let report = json!({
        "dims": [dims.x, dims.y, dims.z],
        "voxel_size": voxel,
        "first_volume_index": vox.first_volume_index()?,
        "volume_count": vox.volume_count()?,
        "enclosed_volume_count": vox.enclosed_volume_count()?,
        "volumes": vox.volume_stats()?,
        "ingest": vox.ingest_stats()?,
        "grid": vox.grid_stats()?,
        "timing": {
            "ingest_secs": ingest_secs,
            "total_secs": total_secs,
        },
    });

    let text = serde_json::to_string_pretty(&report)
        .map_err(|e| Error::Storage(format!("failed to encode report: {}", e)))?;
    println!("{}", text);
    Ok(())
}

fn parse_f64_arg(args: &[String], flag: &str) -> Option<f64> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_u32_arg(args: &[String], flag: &str) -> Option<u32> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_usize_arg(args: &[String], flag: &str) -> Option<usize> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_str_arg(args: &[String], flag: &str) -> Option<String> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}
