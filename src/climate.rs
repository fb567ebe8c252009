//! Climate system for generating temperature and moisture maps
//! Based on noise, latitude, elevation, and distance from water

use serde::{Deserialize, Serialize};

use crate::heightmap::{NoiseLayer, PlaneBounds, MAX_ELEVATION};
use crate::hydrology::{self, WaterDistance};
use crate::seeds::WorldSeeds;
use crate::tilemap::ScalarField;

// =============================================================================
// CLIMATE CONFIGURATION
// =============================================================================

/// How moisture is conditioned on the terrain
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MoistureRule {
    /// Add a bonus that shrinks with graph distance from the nearest water
    #[default]
    DistanceFromWater,
    /// Blend toward the inverse of normalized elevation (dry highlands)
    InverseElevation,
}

impl std::fmt::Display for MoistureRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DistanceFromWater => write!(f, "distance-from-water"),
            Self::InverseElevation => write!(f, "inverse-elevation"),
        }
    }
}

/// Parameters for temperature and moisture derivation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClimateParams {
    pub temperature_noise: NoiseLayer,
    pub moisture_noise: NoiseLayer,
    /// Elevation above which temperature starts falling
    pub altitude_knee: f32,
    /// Elevation above which only `altitude_residual` of the temperature remains
    pub altitude_ceiling: f32,
    pub altitude_residual: f32,
    /// Weight of the latitude gradient in the final temperature blend
    pub latitude_weight: f32,
    /// Weight of the noise-derived temperature in the final blend
    pub noise_weight: f32,
    pub moisture_rule: MoistureRule,
    /// Blend coefficient for [`MoistureRule::InverseElevation`]
    pub inverse_elevation_blend: f32,
    /// Extra drying toward the poles (0.0 disables)
    pub polar_drying: f32,
}

impl Default for ClimateParams {
    fn default() -> Self {
        Self {
            temperature_noise: NoiseLayer {
                frequency: 0.6,
                persistence: 0.03,
                octaves: 8,
                exponent: Some(1.3),
                bounds: PlaneBounds::new(0.0, 10.0, 0.0, 5.0),
            },
            moisture_noise: NoiseLayer {
                frequency: 1.0,
                persistence: 0.2,
                octaves: 8,
                exponent: Some(1.3),
                bounds: PlaneBounds::new(6.0, 10.0, 1.0, 5.0),
            },
            altitude_knee: 160.0,
            altitude_ceiling: 210.0,
            altitude_residual: 0.03,
            latitude_weight: 5.0,
            noise_weight: 4.0,
            moisture_rule: MoistureRule::DistanceFromWater,
            inverse_elevation_blend: 0.5,
            polar_drying: 0.0,
        }
    }
}

// =============================================================================
// TEMPERATURE GENERATION
// =============================================================================

/// Multiplier applied to temperature at a given elevation.
pub fn altitude_factor(elevation: f32, params: &ClimateParams) -> f32 {
    if elevation <= params.altitude_knee {
        1.0
    } else if elevation > params.altitude_ceiling {
        params.altitude_residual
    } else {
        let span = params.altitude_ceiling - params.altitude_knee;
        1.0 - (elevation - params.altitude_knee) / span
    }
}

/// Latitude gradient: 1.0 on the middle row, falling to 0.0 at the top and bottom.
pub fn latitude_gradient(y: usize, height: usize) -> f32 {
    1.0 - (y as f32 / height as f32 - 0.5).abs() * 2.0
}

/// Generate the temperature field on [0, 1]
pub fn generate_temperature(
    elevation: &ScalarField,
    params: &ClimateParams,
    seed: u64,
) -> ScalarField {
    let height = elevation.height;
    let mut temperature = params.temperature_noise.sample(
        WorldSeeds::noise_seed(seed),
        elevation.width,
        height,
    );
    temperature.normalize(0.0, 1.0);

    // Colder with altitude
    temperature.for_each_cell(|x, y, t| {
        *t *= altitude_factor(*elevation.get(x, y), params);
    });

    // Warmer toward the middle row
    let total_weight = params.latitude_weight + params.noise_weight;
    temperature.for_each_cell(|_, y, t| {
        let grad = latitude_gradient(y, height);
        *t = (grad * params.latitude_weight + *t * params.noise_weight) / total_weight;
    });

    temperature.normalize(0.0, 1.0);
    temperature
}

// =============================================================================
// MOISTURE GENERATION
// =============================================================================

/// Generate the moisture field on [0, 1].
///
/// `water` is only consulted by [`MoistureRule::DistanceFromWater`].
pub fn generate_moisture(
    elevation: &ScalarField,
    water: &WaterDistance,
    params: &ClimateParams,
    seed: u64,
) -> ScalarField {
    let mut moisture = params.moisture_noise.sample(
        WorldSeeds::noise_seed(seed),
        elevation.width,
        elevation.height,
    );
    moisture.normalize(0.0, 1.0);

    match params.moisture_rule {
        MoistureRule::DistanceFromWater => hydrology::apply_to_moisture(&mut moisture, water),
        MoistureRule::InverseElevation => {
            let mut relief = elevation.clone();
            relief.for_each_cell(|_, _, h| *h /= MAX_ELEVATION);
            moisture.blend_toward_inverse(&relief, params.inverse_elevation_blend);
        }
    }

    if params.polar_drying > 0.0 {
        moisture.scale_by_latitude_band(params.polar_drying);
    }

    moisture.normalize(0.0, 1.0);
    moisture
}
