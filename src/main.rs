use std::path::PathBuf;
use std::process;
use std::time::Instant;

use clap::Parser;

use biome_mapper::ascii::{self, AsciiMode};
use biome_mapper::world::{World, WorldParams};

#[derive(Parser, Debug)]
#[command(name = "biome_mapper")]
#[command(about = "Generate procedural biome maps partitioned into Voronoi regions")]
struct Args {
    /// Width of the map in tiles
    #[arg(short = 'W', long, default_value = "240")]
    width: usize,

    /// Height of the map in tiles
    #[arg(short = 'H', long, default_value = "120")]
    height: usize,

    /// Random seed (uses random seed if not specified)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Number of Voronoi sites (overrides the parameter file)
    #[arg(long)]
    sites: Option<usize>,

    /// JSON parameter file; missing fields keep their defaults
    #[arg(long)]
    params: Option<PathBuf>,

    /// What to draw
    #[arg(short, long, value_enum, default_value_t = AsciiMode::Biome)]
    mode: AsciiMode,

    /// Write the map and statistics to a text file instead of stdout
    #[arg(long)]
    export: Option<PathBuf>,

    /// Print details of one tile, given as "x,y"
    #[arg(long, value_parser = parse_coords)]
    inspect: Option<(usize, usize)>,

    /// Print the default parameters as JSON and exit
    #[arg(long)]
    dump_params: bool,
}

fn parse_coords(s: &str) -> Result<(usize, usize), String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected x,y but got '{}'", s))?;
    let x = x.trim().parse().map_err(|e| format!("bad x '{}': {}", x, e))?;
    let y = y.trim().parse().map_err(|e| format!("bad y '{}': {}", y, e))?;
    Ok((x, y))
}

fn main() {
    let args = Args::parse();

    if args.dump_params {
        match serde_json::to_string_pretty(&WorldParams::default()) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Failed to serialize parameters: {}", e);
                process::exit(1);
            }
        }
        return;
    }

    let mut params = match &args.params {
        Some(path) => match WorldParams::from_json_file(path) {
            Ok(params) => {
                println!("Loaded parameters from {}", path.display());
                params
            }
            Err(e) => {
                eprintln!("{}", e);
                process::exit(1);
            }
        },
        None => WorldParams::default(),
    };
    if let Some(sites) = args.sites {
        params.site_count = sites;
    }

    println!("Map size: {}x{}", args.width, args.height);
    println!("Generating world ({} sites, moisture rule: {})...", params.site_count, params.climate.moisture_rule);

    let start = Instant::now();
    let world = match World::with_params(args.width, args.height, args.seed, params) {
        Ok(world) => world,
        Err(e) => {
            eprintln!("Failed to generate world: {}", e);
            process::exit(1);
        }
    };
    println!("Generated in {:.2?}", start.elapsed());
    println!("Seeds: {}", world.seeds);

    let (min_h, max_h) = world.elevation.min_max();
    println!(
        "Elevation range: {:.1} to {:.1} ({:.1}% above sea level)",
        min_h,
        max_h,
        100.0 * world.land_fraction()
    );
    match world.water_distance.max_distance {
        Some(d) => println!("Farthest land from water: {:.2} steps", d),
        None => println!("No water on this map"),
    }
    println!("Temperature bounds: {:?}", world.classifier.temperature.bounds());
    println!("Moisture bounds: {:?}", world.classifier.moisture.bounds());

    let stats = world.regions.stats();
    println!("Regions: {} over {} sites", stats.region_count, stats.site_count);
    if let Some((id, size)) = stats.largest {
        println!("  Largest: #{} {} ({} sites)", id.0, world.regions.region(id).biome, size);
    }
    for (category, count) in &stats.per_category {
        println!("  {:20} {}", category.display_name(), count);
    }

    if let Some((x, y)) = args.inspect {
        if x < world.width && y < world.height {
            let info = world.tile_info(x, y);
            println!("Tile ({}, {}):", info.x, info.y);
            println!("  Biome: {}", info.biome);
            println!("  Elevation: {:.1}", info.elevation);
            println!("  Temperature: {} (tier {})", info.temperature_str(), info.temperature_bin);
            println!("  Rainfall: {} (tier {})", info.rainfall_str(), info.moisture_bin);
            println!("  Distance to water: {:.2}", info.water_distance);
            if let Some(region) = info.region {
                println!("  Region: #{}", region.0);
            }
        } else {
            eprintln!("Tile ({}, {}) is outside the {}x{} map", x, y, world.width, world.height);
        }
    }

    match &args.export {
        Some(path) => {
            println!("Exporting {} map...", args.mode.name());
            if let Err(e) = ascii::export_ascii(&world, args.mode, path) {
                eprintln!("Failed to export map: {}", e);
                process::exit(1);
            }
            println!("Saved to: {}", path.display());
        }
        None => {
            println!();
            ascii::print_ascii(&world, args.mode);
            println!();
            print!("{}", ascii::gradient_legend(args.mode));
        }
    }
}
