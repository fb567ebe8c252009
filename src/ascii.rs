//! ASCII rendering and export module for world maps
//!
//! Renders a finished world as plain text, one character per tile.

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use chrono::Local;

use crate::biomes::{Biome, BiomeCategory};
use crate::regions::RegionId;
use crate::tilemap::Tilemap;
use crate::world::World;

/// ASCII rendering modes
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum AsciiMode {
    /// Show biome characters
    #[default]
    Biome,
    /// Show elevation gradient
    Height,
    /// Show temperature gradient
    Temperature,
    /// Show moisture gradient
    Moisture,
    /// Show which region each tile's Voronoi cell belongs to
    Regions,
}

impl AsciiMode {
    pub fn name(&self) -> &'static str {
        match self {
            AsciiMode::Biome => "Biome",
            AsciiMode::Height => "Height",
            AsciiMode::Temperature => "Temperature",
            AsciiMode::Moisture => "Moisture",
            AsciiMode::Regions => "Regions",
        }
    }

    pub fn all() -> &'static [AsciiMode] {
        &[
            AsciiMode::Biome,
            AsciiMode::Height,
            AsciiMode::Temperature,
            AsciiMode::Moisture,
            AsciiMode::Regions,
        ]
    }
}

/// Get ASCII character for a biome category
pub fn biome_char(category: BiomeCategory) -> char {
    match category {
        // Elevation overrides
        BiomeCategory::Ocean => '~',
        BiomeCategory::Glacier => '#',
        BiomeCategory::Beach => '.',
        BiomeCategory::Mountain => '^',

        // Cold
        BiomeCategory::Arctic => '*',
        BiomeCategory::Tundra => ':',
        BiomeCategory::BorealForest => 'B',

        // Dry
        BiomeCategory::Desert => 'd',
        BiomeCategory::Shrubland => 's',
        BiomeCategory::Savanna => ';',
        BiomeCategory::Grasslands => '"',

        // Forests
        BiomeCategory::TemperateForest => 'T',
        BiomeCategory::Rainforest => 'R',
        BiomeCategory::TropicalForest => 't',
        BiomeCategory::TropicalRainforest => 'r',
    }
}

/// Get ASCII character for elevation on [0, 255]
pub fn height_char(elevation: f32) -> char {
    const CHARS: &[char] = &['~', '.', '-', '=', '+', '*', '#', '%', '^', 'A', 'M'];
    let normalized = (elevation / 255.0).clamp(0.0, 1.0);
    let idx = (normalized * (CHARS.len() - 1) as f32) as usize;
    CHARS[idx.min(CHARS.len() - 1)]
}

/// Get ASCII character for normalized temperature
pub fn temperature_char(temp: f32) -> char {
    // cold to hot
    const CHARS: &[char] = &['#', '=', '-', '.', ',', ';', ':', '+', '*', '@'];
    let normalized = temp.clamp(0.0, 1.0);
    let idx = (normalized * (CHARS.len() - 1) as f32) as usize;
    CHARS[idx.min(CHARS.len() - 1)]
}

/// Get ASCII character for normalized moisture
pub fn moisture_char(moisture: f32) -> char {
    const CHARS: &[char] = &['_', '.', '-', ':', ';', '=', '+', '#', '%', '~'];
    let normalized = moisture.clamp(0.0, 1.0);
    let idx = (normalized * (CHARS.len() - 1) as f32) as usize;
    CHARS[idx.min(CHARS.len() - 1)]
}

/// Get ASCII character for a region. Ids cycle through letters and digits,
/// so distant regions may share a character.
pub fn region_char(region: Option<RegionId>) -> char {
    const CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    match region {
        Some(id) => CHARS[id.0 as usize % CHARS.len()] as char,
        None => ' ',
    }
}

/// Render a world to an ASCII string, one line per row
pub fn render_ascii(world: &World, mode: AsciiMode) -> String {
    let mut result = String::with_capacity((world.width + 1) * world.height);

    // Per-tile maps are built in parallel up front, only for the mode drawn
    let biomes = (mode == AsciiMode::Biome).then(|| world.biome_map());
    let regions = (mode == AsciiMode::Regions).then(|| world.region_map());

    for y in 0..world.height {
        for x in 0..world.width {
            let ch = match mode {
                AsciiMode::Biome => biomes.as_ref().map_or(' ', |m| biome_char(m.get(x, y).category)),
                AsciiMode::Height => height_char(world.elevation_at(x, y)),
                AsciiMode::Temperature => temperature_char(world.temperature_at(x, y)),
                AsciiMode::Moisture => moisture_char(world.moisture_at(x, y)),
                AsciiMode::Regions => regions.as_ref().map_or(' ', |m| region_char(*m.get(x, y))),
            };
            result.push(ch);
        }
        result.push('\n');
    }

    result
}

/// Generate legend for biome characters
pub fn biome_legend() -> String {
    let mut legend = String::new();
    legend.push_str("=== BIOME LEGEND ===\n");
    for (i, category) in BiomeCategory::all().iter().enumerate() {
        legend.push_str(&format!("  {} {:20}", biome_char(*category), category.display_name()));
        if i % 3 == 2 {
            legend.push('\n');
        }
    }
    if !legend.ends_with('\n') {
        legend.push('\n');
    }
    legend
}

/// Generate legend for gradient modes
pub fn gradient_legend(mode: AsciiMode) -> String {
    match mode {
        AsciiMode::Height => "=== HEIGHT LEGEND ===\n\
             Sea floor -> High peaks:\n\
             ~ . - = + * # % ^ A M\n\
             (0)             (255)\n"
            .to_string(),
        AsciiMode::Temperature => "=== TEMPERATURE LEGEND ===\n\
             Cold -> Hot:\n\
             # = - . , ; : + * @\n\
             (-20°C)         (50°C)\n"
            .to_string(),
        AsciiMode::Moisture => "=== MOISTURE LEGEND ===\n\
             Dry -> Wet:\n\
             _ . - : ; = + # % ~\n\
             (0mm)           (3500mm)\n"
            .to_string(),
        AsciiMode::Regions => "=== REGION LEGEND ===\n\
             One character per region id (A-Z, a-z, 0-9, repeating)\n"
            .to_string(),
        AsciiMode::Biome => biome_legend(),
    }
}

/// Count tiles per biome category
pub fn calculate_biome_stats(biomes: &Tilemap<Biome>) -> HashMap<BiomeCategory, usize> {
    let mut stats = HashMap::new();
    for (_, _, biome) in biomes.iter() {
        *stats.entry(biome.category).or_insert(0) += 1;
    }
    stats
}

/// Export a rendered map plus summary statistics to a text file
pub fn export_ascii(world: &World, mode: AsciiMode, path: &Path) -> io::Result<()> {
    let mut file = File::create(path)?;
    let total = world.width * world.height;

    // Header
    writeln!(file, "=== BIOME MAPPER WORLD FILE ===")?;
    writeln!(file, "Seed: {}", world.seed())?;
    writeln!(file, "Size: {}x{}", world.width, world.height)?;
    writeln!(file, "Generated: {}", Local::now().format("%Y-%m-%d %H:%M:%S"))?;
    writeln!(file)?;

    writeln!(file, "=== MAP ({} View) ===", mode.name())?;
    write!(file, "{}", render_ascii(world, mode))?;
    writeln!(file)?;

    write!(file, "{}", gradient_legend(mode))?;
    writeln!(file)?;

    // Statistics
    writeln!(file, "=== STATISTICS ===")?;
    writeln!(file, "Total tiles: {}", total)?;
    let land = world.land_fraction() as f64;
    writeln!(file, "Land: {:.1}%  Water: {:.1}%", 100.0 * land, 100.0 * (1.0 - land))?;
    writeln!(file)?;

    writeln!(file, "Biome Distribution:")?;
    let stats = calculate_biome_stats(&world.biome_map());
    let mut sorted_stats: Vec<_> = stats.iter().collect();
    sorted_stats.sort_by(|a, b| b.1.cmp(a.1).then(a.0.cmp(b.0)));
    for (category, count) in sorted_stats {
        let pct = 100.0 * *count as f64 / total as f64;
        writeln!(file, "  {:20} {} {:>6} ({:>5.1}%)", category.display_name(), biome_char(*category), count, pct)?;
    }
    writeln!(file)?;

    let region_stats = world.regions.stats();
    writeln!(file, "Regions: {} over {} sites", region_stats.region_count, region_stats.site_count)?;
    if let Some((id, size)) = region_stats.largest {
        writeln!(file, "  Largest: #{} ({}, {} sites)", id.0, world.regions.region(id).biome, size)?;
    }
    for (category, count) in &region_stats.per_category {
        writeln!(file, "  {:20} {:>6}", category.display_name(), count)?;
    }

    Ok(())
}

/// Print ASCII map to stdout
pub fn print_ascii(world: &World, mode: AsciiMode) {
    print!("{}", render_ascii(world, mode));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::WorldParams;

    fn small_world() -> World {
        let params = WorldParams { site_count: 80, ..Default::default() };
        World::with_params(24, 12, Some(31), params).expect("world")
    }

    #[test]
    fn test_render_dimensions_for_every_mode() {
        let world = small_world();
        for &mode in AsciiMode::all() {
            let text = render_ascii(&world, mode);
            let lines: Vec<&str> = text.lines().collect();
            assert_eq!(lines.len(), 12, "{}", mode.name());
            assert!(lines.iter().all(|l| l.chars().count() == 24), "{}", mode.name());
        }
    }

    #[test]
    fn test_biome_render_matches_classification() {
        let world = small_world();
        let text = render_ascii(&world, AsciiMode::Biome);
        for (y, line) in text.lines().enumerate() {
            for (x, ch) in line.chars().enumerate() {
                assert_eq!(ch, biome_char(world.classify(x, y).category));
            }
        }
    }

    #[test]
    fn test_biome_chars_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for category in BiomeCategory::all() {
            assert!(seen.insert(biome_char(*category)), "{}", category);
        }
    }

    #[test]
    fn test_gradient_chars_clamp() {
        assert_eq!(height_char(-10.0), '~');
        assert_eq!(height_char(0.0), '~');
        assert_eq!(height_char(255.0), 'M');
        assert_eq!(height_char(1000.0), 'M');
        assert_eq!(temperature_char(0.0), '#');
        assert_eq!(temperature_char(1.0), '@');
        assert_eq!(moisture_char(-1.0), '_');
        assert_eq!(moisture_char(1.0), '~');
    }

    #[test]
    fn test_region_chars_cycle() {
        assert_eq!(region_char(None), ' ');
        assert_eq!(region_char(Some(RegionId(0))), 'A');
        assert_eq!(region_char(Some(RegionId(26))), 'a');
        assert_eq!(region_char(Some(RegionId(62))), 'A');
    }

    #[test]
    fn test_legend_lists_every_category() {
        let legend = biome_legend();
        for category in BiomeCategory::all() {
            assert!(legend.contains(category.display_name()));
        }
    }

    #[test]
    fn test_export_writes_header_and_map() {
        let world = small_world();
        let path = std::env::temp_dir().join(format!("biome_mapper_export_{}.txt", std::process::id()));

        export_ascii(&world, AsciiMode::Height, &path).expect("export");
        let text = std::fs::read_to_string(&path).expect("read back");
        std::fs::remove_file(&path).ok();

        assert!(text.starts_with("=== BIOME MAPPER WORLD FILE ==="));
        assert!(text.contains("Seed: 31"));
        assert!(text.contains("Size: 24x12"));
        assert!(text.contains(&render_ascii(&world, AsciiMode::Height)));
        assert!(text.contains("Biome Distribution:"));
    }
}
