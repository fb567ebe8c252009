//! Biome classification
//!
//! Water, beach and mountain are decided by elevation alone. Everything else
//! comes from a temperature tier x moisture tier table of life zones, each of
//! which generalizes to a coarse display category.

use serde::{Deserialize, Serialize};

use crate::quantiles::QuantileThresholds;

/// Number of temperature tiers (polar .. tropical)
pub const TEMPERATURE_TIERS: usize = 7;
/// Number of moisture tiers (superarid .. superhumid)
pub const MOISTURE_TIERS: usize = 8;

// =============================================================================
// BIOME TYPES
// =============================================================================

/// Coarse biome category used for display and region grouping
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BiomeCategory {
    Glacier,
    Ocean,
    Beach,
    Mountain,
    Arctic,
    Tundra,
    Desert,
    Shrubland,
    Savanna,
    Grasslands,
    BorealForest,
    TemperateForest,
    Rainforest,
    TropicalForest,
    TropicalRainforest,
}

impl BiomeCategory {
    pub fn all() -> &'static [Self] {
        &[
            Self::Glacier,
            Self::Ocean,
            Self::Beach,
            Self::Mountain,
            Self::Arctic,
            Self::Tundra,
            Self::Desert,
            Self::Shrubland,
            Self::Savanna,
            Self::Grasslands,
            Self::BorealForest,
            Self::TemperateForest,
            Self::Rainforest,
            Self::TropicalForest,
            Self::TropicalRainforest,
        ]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Glacier => "Glacier",
            Self::Ocean => "Ocean",
            Self::Beach => "Beach",
            Self::Mountain => "Mountain",
            Self::Arctic => "Arctic",
            Self::Tundra => "Tundra",
            Self::Desert => "Desert",
            Self::Shrubland => "Shrubland",
            Self::Savanna => "Savanna",
            Self::Grasslands => "Grasslands",
            Self::BorealForest => "Boreal Forest",
            Self::TemperateForest => "Temperate Forest",
            Self::Rainforest => "Rainforest",
            Self::TropicalForest => "Tropical Forest",
            Self::TropicalRainforest => "Tropical Rainforest",
        }
    }

    pub fn is_water(&self) -> bool {
        matches!(self, Self::Ocean | Self::Glacier)
    }
}

impl std::fmt::Display for BiomeCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Fine-grained life zone, one per (temperature tier, moisture tier) cell
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubBiome {
    PolarDesert,
    PolarIce,

    SubpolarDryTundra,
    SubpolarMoistTundra,
    SubpolarWetTundra,
    SubpolarRainTundra,

    BorealDesert,
    BorealDryScrub,
    BorealMoistForest,
    BorealWetForest,
    BorealRainForest,

    CoolDesert,
    CoolDesertScrub,
    CoolSteppe,
    CoolMoistForest,
    CoolWetForest,
    CoolRainForest,

    WarmDesert,
    WarmDesertScrub,
    WarmThornSteppe,
    WarmDryForest,
    WarmMoistForest,
    WarmWetForest,
    WarmRainForest,

    SubtropicalDesert,
    SubtropicalDesertScrub,
    SubtropicalThornWoodland,
    SubtropicalDryForest,
    SubtropicalMoistForest,
    SubtropicalWetForest,
    SubtropicalRainForest,

    TropicalDesert,
    TropicalDesertScrub,
    TropicalThornWoodland,
    TropicalVeryDryForest,
    TropicalDryForest,
    TropicalMoistForest,
    TropicalWetForest,
    TropicalRainForest,
}

impl SubBiome {
    /// Generalize to the coarse display category.
    pub fn category(&self) -> BiomeCategory {
        use BiomeCategory as C;
        match self {
            Self::PolarDesert | Self::PolarIce => C::Arctic,

            Self::SubpolarDryTundra
            | Self::SubpolarMoistTundra
            | Self::SubpolarWetTundra
            | Self::SubpolarRainTundra => C::Tundra,

            Self::BorealDesert => C::Tundra,
            Self::BorealDryScrub => C::Shrubland,
            Self::BorealMoistForest | Self::BorealWetForest | Self::BorealRainForest => {
                C::BorealForest
            }

            Self::CoolDesert => C::Desert,
            Self::CoolDesertScrub => C::Shrubland,
            Self::CoolSteppe => C::Grasslands,
            Self::CoolMoistForest | Self::CoolWetForest => C::TemperateForest,
            Self::CoolRainForest => C::Rainforest,

            Self::WarmDesert => C::Desert,
            Self::WarmDesertScrub => C::Shrubland,
            Self::WarmThornSteppe => C::Grasslands,
            Self::WarmDryForest | Self::WarmMoistForest => C::TemperateForest,
            Self::WarmWetForest | Self::WarmRainForest => C::Rainforest,

            Self::SubtropicalDesert => C::Desert,
            Self::SubtropicalDesertScrub => C::Shrubland,
            Self::SubtropicalThornWoodland => C::Savanna,
            Self::SubtropicalDryForest | Self::SubtropicalMoistForest => C::TropicalForest,
            Self::SubtropicalWetForest => C::Rainforest,
            Self::SubtropicalRainForest => C::TropicalRainforest,

            Self::TropicalDesert => C::Desert,
            Self::TropicalDesertScrub => C::Shrubland,
            Self::TropicalThornWoodland | Self::TropicalVeryDryForest => C::Savanna,
            Self::TropicalDryForest | Self::TropicalMoistForest => C::TropicalForest,
            Self::TropicalWetForest | Self::TropicalRainForest => C::TropicalRainforest,
        }
    }
}

/// A classification result: coarse category plus the life zone it came from,
/// if any. Elevation overrides (ocean, beach, mountain, glacier) carry no sub-biome.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Biome {
    pub category: BiomeCategory,
    pub sub: Option<SubBiome>,
}

impl Biome {
    pub const OCEAN: Biome = Biome::coarse(BiomeCategory::Ocean);
    pub const GLACIER: Biome = Biome::coarse(BiomeCategory::Glacier);
    pub const BEACH: Biome = Biome::coarse(BiomeCategory::Beach);
    pub const MOUNTAIN: Biome = Biome::coarse(BiomeCategory::Mountain);

    pub const fn coarse(category: BiomeCategory) -> Self {
        Self { category, sub: None }
    }

    pub fn from_sub(sub: SubBiome) -> Self {
        Self { category: sub.category(), sub: Some(sub) }
    }
}

impl std::fmt::Display for Biome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.sub {
            Some(sub) => write!(f, "{} ({:?})", self.category, sub),
            None => write!(f, "{}", self.category),
        }
    }
}

// =============================================================================
// CLASSIFICATION TABLE
// =============================================================================

/// Temperature tier x moisture tier lookup. Rows run polar -> tropical,
/// columns superarid -> superhumid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClimateTable {
    pub cells: [[SubBiome; MOISTURE_TIERS]; TEMPERATURE_TIERS],
}

impl Default for ClimateTable {
    fn default() -> Self {
        use SubBiome::*;
        Self {
            cells: [
                // Polar
                [PolarDesert, PolarDesert, PolarDesert, PolarDesert, PolarIce, PolarIce, PolarIce, PolarIce],
                // Subpolar
                [
                    SubpolarDryTundra, SubpolarDryTundra, SubpolarDryTundra, SubpolarMoistTundra,
                    SubpolarMoistTundra, SubpolarWetTundra, SubpolarRainTundra, SubpolarRainTundra,
                ],
                // Boreal
                [
                    BorealDesert, BorealDesert, BorealDryScrub, BorealDryScrub,
                    BorealMoistForest, BorealWetForest, BorealRainForest, BorealRainForest,
                ],
                // Cool temperate
                [
                    CoolDesert, CoolDesertScrub, CoolSteppe, CoolSteppe,
                    CoolMoistForest, CoolWetForest, CoolRainForest, CoolRainForest,
                ],
                // Warm temperate
                [
                    WarmDesert, WarmDesertScrub, WarmThornSteppe, WarmDryForest,
                    WarmMoistForest, WarmWetForest, WarmRainForest, WarmRainForest,
                ],
                // Subtropical
                [
                    SubtropicalDesert, SubtropicalDesertScrub, SubtropicalThornWoodland, SubtropicalDryForest,
                    SubtropicalMoistForest, SubtropicalWetForest, SubtropicalRainForest, SubtropicalRainForest,
                ],
                // Tropical
                [
                    TropicalDesert, TropicalDesertScrub, TropicalThornWoodland, TropicalVeryDryForest,
                    TropicalDryForest, TropicalMoistForest, TropicalWetForest, TropicalRainForest,
                ],
            ],
        }
    }
}

impl ClimateTable {
    /// Life zone for a pair of bins, `None` if either is outside the table.
    pub fn lookup(&self, temperature_bin: usize, moisture_bin: usize) -> Option<SubBiome> {
        self.cells
            .get(temperature_bin)
            .and_then(|row| row.get(moisture_bin))
            .copied()
    }
}

// =============================================================================
// CLASSIFIER
// =============================================================================

/// Elevation and temperature cut-offs for the override rules
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BiomeParams {
    /// Cells strictly below this are water
    pub sea_level: f32,
    /// Land strictly below this is beach
    pub beach_end: f32,
    /// Land strictly above this is mountain
    pub mountain_level: f32,
    /// Water strictly colder than this (normalized temperature) is glacier
    pub glacial_temperature: f32,
}

impl Default for BiomeParams {
    fn default() -> Self {
        Self {
            sea_level: 60.0,
            beach_end: 65.0,
            mountain_level: 200.0,
            glacial_temperature: 0.06,
        }
    }
}

/// Pure per-cell classifier built once per world
#[derive(Clone, Debug)]
pub struct BiomeClassifier {
    pub params: BiomeParams,
    pub table: ClimateTable,
    pub temperature: QuantileThresholds,
    pub moisture: QuantileThresholds,
}

impl BiomeClassifier {
    pub fn new(
        params: BiomeParams,
        table: ClimateTable,
        temperature: QuantileThresholds,
        moisture: QuantileThresholds,
    ) -> Self {
        Self { params, table, temperature, moisture }
    }

    pub fn is_water(&self, elevation: f32) -> bool {
        elevation < self.params.sea_level
    }

    /// Classify a cell from its raw field values.
    pub fn classify(&self, elevation: f32, temperature: f32, moisture: f32) -> Biome {
        self.classify_binned(
            elevation,
            temperature,
            self.temperature.bin_of(temperature),
            self.moisture.bin_of(moisture),
        )
    }

    /// Classify a cell whose temperature and moisture are already binned.
    /// The raw temperature is still needed to freeze water.
    pub fn classify_binned(
        &self,
        elevation: f32,
        temperature: f32,
        temperature_bin: usize,
        moisture_bin: usize,
    ) -> Biome {
        let p = &self.params;

        if elevation < p.sea_level {
            return if temperature < p.glacial_temperature { Biome::GLACIER } else { Biome::OCEAN };
        }
        if elevation < p.beach_end {
            return Biome::BEACH;
        }
        if elevation > p.mountain_level {
            return Biome::MOUNTAIN;
        }

        self.table
            .lookup(temperature_bin, moisture_bin)
            .map(Biome::from_sub)
            .unwrap_or(Biome::OCEAN)
    }
}
