//! World data container module
//!
//! Runs the whole generation pipeline synchronously and owns everything it
//! produces. After construction the world is read-only.

use std::path::Path;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::biomes::{Biome, BiomeClassifier, BiomeParams, ClimateTable};
use crate::climate::{self, ClimateParams};
use crate::heightmap::{self, ElevationParams};
use crate::hydrology::{self, WaterDistance};
use crate::quantiles::{QuantileThresholds, MOISTURE_PERCENTILES, TEMPERATURE_PERCENTILES};
use crate::regions::{self, Region, RegionId, RegionPartition, SiteGraph};
use crate::seeds::WorldSeeds;
use crate::tilemap::{ScalarField, Tilemap};

// =============================================================================
// PARAMETERS & ERRORS
// =============================================================================

/// Everything that shapes a world besides its size and seed
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldParams {
    /// Number of random sites in the region decomposition
    pub site_count: usize,
    pub elevation: ElevationParams,
    pub climate: ClimateParams,
    pub biomes: BiomeParams,
}

impl Default for WorldParams {
    fn default() -> Self {
        Self {
            site_count: 2000,
            elevation: ElevationParams::default(),
            climate: ClimateParams::default(),
            biomes: BiomeParams::default(),
        }
    }
}

impl WorldParams {
    /// Load parameters from a JSON file. Missing fields keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, WorldError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| WorldError::Params(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, WorldError> {
        serde_json::from_str(text).map_err(|e| WorldError::Params(e.to_string()))
    }
}

/// Errors that can occur while building a world
#[derive(Debug, Clone, PartialEq)]
pub enum WorldError {
    /// Width or height is zero
    InvalidDimension { width: usize, height: usize },
    /// The site set could not be turned into a Voronoi diagram
    Decomposition { sites: usize },
    /// A parameter file could not be read or parsed
    Params(String),
}

impl std::fmt::Display for WorldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorldError::InvalidDimension { width, height } => {
                write!(f, "Invalid world size {}x{}: both dimensions must be positive", width, height)
            }
            WorldError::Decomposition { sites } => {
                write!(f, "Could not build a Voronoi decomposition from {} sites", sites)
            }
            WorldError::Params(e) => write!(f, "Invalid parameters: {}", e),
        }
    }
}

impl std::error::Error for WorldError {}

// =============================================================================
// WORLD
// =============================================================================

/// All generated world data bundled together
pub struct World {
    /// Seeds used for generation (allows recreation)
    pub seeds: WorldSeeds,
    pub width: usize,
    pub height: usize,
    pub params: WorldParams,
    /// Elevation on [0, 255]; below `params.biomes.sea_level` is water
    pub elevation: ScalarField,
    /// Temperature on [0, 1]
    pub temperature: ScalarField,
    /// Moisture on [0, 1]
    pub moisture: ScalarField,
    /// Graph distance to the nearest water cell
    pub water_distance: WaterDistance,
    pub classifier: BiomeClassifier,
    pub sites: SiteGraph,
    pub regions: RegionPartition,
}

impl World {
    /// Generate a world with default parameters. A missing seed is drawn at random.
    pub fn new(width: usize, height: usize, seed: Option<u64>) -> Result<Self, WorldError> {
        Self::with_params(width, height, seed, WorldParams::default())
    }

    pub fn with_params(
        width: usize,
        height: usize,
        seed: Option<u64>,
        params: WorldParams,
    ) -> Result<Self, WorldError> {
        if width == 0 || height == 0 {
            return Err(WorldError::InvalidDimension { width, height });
        }

        let seeds = WorldSeeds::from_master(seed.unwrap_or_else(rand::random));
        let sea_level = params.biomes.sea_level;

        let elevation = heightmap::generate_elevation(width, height, &params.elevation, seeds.elevation);
        let water_distance = hydrology::distance_from_water(&elevation, sea_level);
        let moisture = climate::generate_moisture(&elevation, &water_distance, &params.climate, seeds.moisture);
        let temperature = climate::generate_temperature(&elevation, &params.climate, seeds.temperature);

        let is_land = |x: usize, y: usize| *elevation.get(x, y) >= sea_level;
        let classifier = BiomeClassifier::new(
            params.biomes.clone(),
            ClimateTable::default(),
            QuantileThresholds::compute(&temperature, is_land, &TEMPERATURE_PERCENTILES),
            QuantileThresholds::compute(&moisture, is_land, &MOISTURE_PERCENTILES),
        );

        let sites = if params.site_count == 0 {
            SiteGraph::default()
        } else {
            let mut rng = ChaCha8Rng::seed_from_u64(seeds.sites);
            SiteGraph::random(params.site_count, width, height, &mut rng)
                .ok_or(WorldError::Decomposition { sites: params.site_count })?
        };

        let mut world = Self {
            seeds,
            width,
            height,
            params,
            elevation,
            temperature,
            moisture,
            water_distance,
            classifier,
            sites,
            regions: RegionPartition::default(),
        };
        world.regions = regions::partition(&world.sites, |p| world.classify_point(p));

        Ok(world)
    }

    /// Convenience accessor for master seed
    pub fn seed(&self) -> u64 {
        self.seeds.master
    }

    pub fn elevation_at(&self, x: usize, y: usize) -> f32 {
        *self.elevation.get(x, y)
    }

    pub fn temperature_at(&self, x: usize, y: usize) -> f32 {
        *self.temperature.get(x, y)
    }

    pub fn moisture_at(&self, x: usize, y: usize) -> f32 {
        *self.moisture.get(x, y)
    }

    pub fn is_water(&self, x: usize, y: usize) -> bool {
        self.classifier.is_water(self.elevation_at(x, y))
    }

    /// Biome of the tile at (x, y).
    pub fn classify(&self, x: usize, y: usize) -> Biome {
        self.classifier.classify(
            self.elevation_at(x, y),
            self.temperature_at(x, y),
            self.moisture_at(x, y),
        )
    }

    /// Biome at a continuous map position, rounded to the nearest tile and
    /// clamped onto the map.
    pub fn classify_point(&self, (px, py): (f64, f64)) -> Biome {
        let (x, y) = self.nearest_tile(px, py);
        self.classify(x, y)
    }

    fn nearest_tile(&self, px: f64, py: f64) -> (usize, usize) {
        let clamp = |v: f64, len: usize| {
            let v = v.round();
            if v.is_nan() || v <= 0.0 {
                0
            } else {
                (v as usize).min(len - 1)
            }
        };
        (clamp(px, self.width), clamp(py, self.height))
    }

    /// Classify every tile. Rows are independent and filled in parallel.
    pub fn biome_map(&self) -> Tilemap<Biome> {
        let width = self.width;
        let mut cells = vec![Biome::OCEAN; width * self.height];

        cells
            .par_chunks_mut(width)
            .enumerate()
            .for_each(|(y, row)| {
                for (x, cell) in row.iter_mut().enumerate() {
                    *cell = self.classify(x, y);
                }
            });

        Tilemap::from_vec(width, self.height, cells)
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions.regions
    }

    pub fn sites(&self) -> &SiteGraph {
        &self.sites
    }

    pub fn classifier(&self) -> &BiomeClassifier {
        &self.classifier
    }

    /// Region whose Voronoi cell contains the center of tile (x, y)
    pub fn region_at(&self, x: usize, y: usize) -> Option<RegionId> {
        self.sites
            .nearest((x as f64, y as f64))
            .map(|site| self.regions.region_of(site))
    }

    /// Region id for every tile (None when the world has no sites).
    /// Costs one [`SiteGraph::nearest`] scan per tile.
    pub fn region_map(&self) -> Tilemap<Option<RegionId>> {
        let width = self.width;
        let mut cells = vec![None; width * self.height];

        cells
            .par_chunks_mut(width)
            .enumerate()
            .for_each(|(y, row)| {
                for (x, cell) in row.iter_mut().enumerate() {
                    *cell = self.region_at(x, y);
                }
            });

        Tilemap::from_vec(width, self.height, cells)
    }

    /// Fraction of tiles above sea level
    pub fn land_fraction(&self) -> f32 {
        let land = self.elevation.iter().filter(|&(x, y, _)| !self.is_water(x, y)).count();
        land as f32 / (self.width * self.height) as f32
    }

    /// Get tile info at coordinates
    pub fn tile_info(&self, x: usize, y: usize) -> TileInfo {
        TileInfo {
            x,
            y,
            elevation: self.elevation_at(x, y),
            temperature: self.temperature_at(x, y),
            moisture: self.moisture_at(x, y),
            temperature_bin: self.classifier.temperature.bin_of(self.temperature_at(x, y)),
            moisture_bin: self.classifier.moisture.bin_of(self.moisture_at(x, y)),
            water_distance: self.water_distance.get(x, y),
            biome: self.classify(x, y),
            region: self.region_at(x, y),
        }
    }
}

/// Information about a single tile
#[derive(Clone, Debug)]
pub struct TileInfo {
    pub x: usize,
    pub y: usize,
    pub elevation: f32,
    pub temperature: f32,
    pub moisture: f32,
    pub temperature_bin: usize,
    pub moisture_bin: usize,
    pub water_distance: f32,
    pub biome: Biome,
    pub region: Option<RegionId>,
}

impl TileInfo {
    /// Normalized temperature mapped onto a -20..50 °C display scale
    pub fn temperature_celsius(&self) -> f32 {
        self.temperature * 70.0 - 20.0
    }

    /// Normalized moisture mapped onto 0..3500 mm of yearly rainfall
    pub fn rainfall_mm(&self) -> f32 {
        self.moisture * 3500.0
    }

    pub fn temperature_str(&self) -> String {
        format!("{:.1}°C", self.temperature_celsius())
    }

    pub fn rainfall_str(&self) -> String {
        format!("approx {:.0}mm/year", self.rainfall_mm())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_invalid_dimensions() {
        assert_eq!(
            World::new(0, 10, Some(1)).err(),
            Some(WorldError::InvalidDimension { width: 0, height: 10 })
        );
        assert!(World::new(10, 0, Some(1)).is_err());
    }

    #[test]
    fn test_fixed_seed_is_reproducible() {
        let a = World::new(100, 100, Some(4242)).expect("world");
        let b = World::new(100, 100, Some(4242)).expect("world");

        for &(x, y) in &[(0, 0), (50, 50), (99, 99), (13, 77), (71, 28)] {
            assert_eq!(a.elevation_at(x, y), b.elevation_at(x, y));
            assert_eq!(a.temperature_at(x, y), b.temperature_at(x, y));
            assert_eq!(a.moisture_at(x, y), b.moisture_at(x, y));
            assert_eq!(a.classify(x, y), b.classify(x, y));
        }

        let regions = |w: &World| -> BTreeSet<Vec<u32>> {
            w.regions().iter().map(|r| {
                let mut ids: Vec<u32> = r.sites.iter().map(|s| s.0).collect();
                ids.sort();
                ids
            }).collect()
        };
        assert_eq!(regions(&a), regions(&b));
    }

    /// Sampled state of one tile, stored in the seed-4242 fixture
    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct PinnedTile {
        x: usize,
        y: usize,
        elevation: f32,
        temperature: f32,
        moisture: f32,
        biome: Biome,
    }

    const PINNED_COORDS: [(usize, usize); 3] = [(50, 50), (13, 77), (71, 28)];

    /// Compares seed 4242 against `src/testdata/world_4242.json`. When the
    /// fixture is absent the current output is recorded into it; commit that
    /// file so later runs catch drift in seeding, noise or classification.
    #[test]
    fn test_seed_4242_matches_pinned_tiles() {
        let world = World::new(100, 100, Some(4242)).expect("world");
        let tiles: Vec<PinnedTile> = PINNED_COORDS
            .iter()
            .map(|&(x, y)| PinnedTile {
                x,
                y,
                elevation: world.elevation_at(x, y),
                temperature: world.temperature_at(x, y),
                moisture: world.moisture_at(x, y),
                biome: world.classify(x, y),
            })
            .collect();

        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("src/testdata/world_4242.json");
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(_) => {
                std::fs::create_dir_all(path.parent().expect("fixture dir")).expect("create testdata");
                let json = serde_json::to_string_pretty(&tiles).expect("serialize");
                std::fs::write(&path, &json).expect("write fixture");
                println!("Recorded pinned tiles to {}", path.display());
                json
            }
        };

        let pinned: Vec<PinnedTile> = serde_json::from_str(&text).expect("parse fixture");
        assert_eq!(pinned.len(), tiles.len());
        for (want, got) in pinned.iter().zip(&tiles) {
            assert_eq!((want.x, want.y), (got.x, got.y));
            assert!((want.elevation - got.elevation).abs() < 1e-3, "elevation at ({}, {})", got.x, got.y);
            assert!((want.temperature - got.temperature).abs() < 1e-5, "temperature at ({}, {})", got.x, got.y);
            assert!((want.moisture - got.moisture).abs() < 1e-5, "moisture at ({}, {})", got.x, got.y);
            assert_eq!(want.biome, got.biome, "biome at ({}, {})", got.x, got.y);
        }
    }

    #[test]
    fn test_fields_are_in_range() {
        let world = World::new(64, 48, Some(7)).expect("world");
        assert_eq!(world.elevation.min_max(), (0.0, 255.0));
        assert_eq!(world.temperature.min_max(), (0.0, 1.0));
        assert_eq!(world.moisture.min_max(), (0.0, 1.0));
        assert_eq!(world.classifier.temperature.len(), TEMPERATURE_PERCENTILES.len());
        assert_eq!(world.classifier.moisture.len(), MOISTURE_PERCENTILES.len());
    }

    #[test]
    fn test_biome_map_matches_classify() {
        let world = World::new(40, 30, Some(5)).expect("world");
        let map = world.biome_map();
        for (x, y, biome) in map.iter() {
            assert_eq!(*biome, world.classify(x, y));
        }
    }

    #[test]
    fn test_regions_cover_every_site() {
        let world = World::new(60, 40, Some(21)).expect("world");
        let total: usize = world.regions().iter().map(|r| r.len()).sum();
        assert_eq!(total, world.sites().len());

        for region in world.regions() {
            for site in &region.sites {
                let biome = world.classify_point(world.sites.site(*site).position);
                assert_eq!(biome, region.biome);
            }
        }
    }

    #[test]
    fn test_region_map_agrees_with_region_at() {
        let params = WorldParams { site_count: 150, ..Default::default() };
        let world = World::with_params(40, 20, Some(12), params).expect("world");
        let map = world.region_map();
        for (x, y, region) in map.iter() {
            assert_eq!(*region, world.region_at(x, y));
            assert!(region.is_some());
        }
    }

    #[test]
    fn test_classify_point_clamps() {
        let world = World::new(20, 10, Some(3)).expect("world");
        assert_eq!(world.classify_point((-3.0, -0.4)), world.classify(0, 0));
        assert_eq!(world.classify_point((19.6, 9.5)), world.classify(19, 9));
        assert_eq!(world.classify_point((4.4, 5.5)), world.classify(4, 6));
    }

    #[test]
    fn test_no_sites_means_no_regions() {
        let params = WorldParams { site_count: 0, ..Default::default() };
        let world = World::with_params(16, 16, Some(1), params).expect("world");
        assert!(world.regions().is_empty());
        assert_eq!(world.region_at(3, 3), None);
    }

    #[test]
    fn test_params_json_roundtrip_with_defaults() {
        let params = WorldParams::from_json(r#"{ "site_count": 500, "biomes": { "sea_level": 70.0 } }"#)
            .expect("params");
        assert_eq!(params.site_count, 500);
        assert_eq!(params.biomes.sea_level, 70.0);
        assert_eq!(params.biomes.beach_end, BiomeParams::default().beach_end);
        assert_eq!(params.climate, ClimateParams::default());

        assert!(matches!(WorldParams::from_json("{ nope"), Err(WorldError::Params(_))));
    }

    #[test]
    fn test_tile_info_display_scales() {
        let world = World::new(30, 30, Some(8)).expect("world");
        let info = world.tile_info(15, 15);
        assert!((info.temperature_celsius() - (info.temperature * 70.0 - 20.0)).abs() < 1e-6);
        assert!(info.rainfall_mm() >= 0.0 && info.rainfall_mm() <= 3500.0);
        assert_eq!(info.biome, world.classify(15, 15));
    }
}
