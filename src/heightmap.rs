use noise::{Fbm, MultiFractal, NoiseFn, Perlin, RidgedMulti};
use serde::{Deserialize, Serialize};

use crate::seeds::WorldSeeds;
use crate::tilemap::{ScalarField, Tilemap};

// =============================================================================
// NOISE LAYERS
// =============================================================================

/// Rectangle of noise space a map is sampled over. The map's columns span
/// `[lower_x, upper_x)` and its rows span `[lower_y, upper_y)`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlaneBounds {
    pub lower_x: f64,
    pub upper_x: f64,
    pub lower_y: f64,
    pub upper_y: f64,
}

impl PlaneBounds {
    pub const fn new(lower_x: f64, upper_x: f64, lower_y: f64, upper_y: f64) -> Self {
        Self { lower_x, upper_x, lower_y, upper_y }
    }

    /// Noise-space coordinate of the tile at (x, y) in a width x height map.
    fn point(&self, x: usize, y: usize, width: usize, height: usize) -> [f64; 2] {
        let dx = (self.upper_x - self.lower_x) / width as f64;
        let dy = (self.upper_y - self.lower_y) / height as f64;
        [self.lower_x + x as f64 * dx, self.lower_y + y as f64 * dy]
    }
}

/// One multi-octave Perlin layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseLayer {
    /// Base frequency (higher = smaller features)
    pub frequency: f64,
    /// Amplitude decay per octave
    pub persistence: f64,
    /// Number of octaves
    pub octaves: usize,
    /// Optional power curve applied to the [-1, 1] output
    pub exponent: Option<f64>,
    pub bounds: PlaneBounds,
}

impl Default for NoiseLayer {
    fn default() -> Self {
        Self {
            frequency: 1.0,
            persistence: 0.5,
            octaves: 6,
            exponent: None,
            bounds: PlaneBounds::new(6.0, 10.0, 1.0, 5.0),
        }
    }
}

impl NoiseLayer {
    fn fbm(&self, seed: u32) -> Fbm<Perlin> {
        Fbm::<Perlin>::new(seed)
            .set_octaves(self.octaves)
            .set_frequency(self.frequency)
            .set_persistence(self.persistence)
    }

    /// Sample this layer into a fresh field.
    pub fn sample(&self, seed: u32, width: usize, height: usize) -> ScalarField {
        let noise = self.fbm(seed);
        let exponent = self.exponent;
        sample_plane(width, height, &self.bounds, |p| {
            let v = noise.get(p);
            match exponent {
                Some(e) => apply_exponent(v, e),
                None => v,
            }
        })
    }
}

/// Map a [-1, 1] noise value through a power curve, keeping it in [-1, 1].
fn apply_exponent(value: f64, exponent: f64) -> f64 {
    ((value + 1.0) / 2.0).abs().powf(exponent) * 2.0 - 1.0
}

/// Evaluate `source` at every tile of a width x height map laid over `bounds`.
pub fn sample_plane<F>(width: usize, height: usize, bounds: &PlaneBounds, source: F) -> ScalarField
where
    F: Fn([f64; 2]) -> f64,
{
    let mut field = Tilemap::new_with(width, height, 0.0f32);
    field.for_each_cell(|x, y, v| {
        *v = source(bounds.point(x, y, width, height)) as f32;
    });
    field
}

// =============================================================================
// ELEVATION
// =============================================================================

/// Upper end of the elevation scale; sea level and biome cut-offs live on it.
pub const MAX_ELEVATION: f32 = 255.0;

/// Parameters for elevation synthesis
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElevationParams {
    /// Rolling base terrain
    pub base: NoiseLayer,
    /// Ridged mountain noise frequency
    pub ridge_frequency: f64,
    /// Ridged mountain octaves
    pub ridge_octaves: usize,
    /// Multiplier on the ridge layer before it is added to the base
    pub ridge_scale: f64,
    /// Offset added to the ridge layer
    pub ridge_bias: f64,
    /// Island falloff radius (1.0 = touches the map edges)
    pub gradient_radius: f32,
    /// Minimum falloff factor at the map edges
    pub gradient_floor: f32,
}

impl Default for ElevationParams {
    fn default() -> Self {
        Self {
            base: NoiseLayer {
                frequency: 0.8,
                persistence: 0.6,
                octaves: 6,
                exponent: None,
                bounds: PlaneBounds::new(6.0, 10.0, 1.0, 5.0),
            },
            ridge_frequency: 1.0,
            ridge_octaves: 6,
            ridge_scale: 1.2,
            ridge_bias: 0.3,
            gradient_radius: 1.0,
            gradient_floor: 0.15,
        }
    }
}

/// Generate the elevation field on `[0, MAX_ELEVATION]`:
/// 1. fBm base terrain plus scaled ridged multifractal
/// 2. normalize to [0, 1]
/// 3. radial falloff so land gathers toward the center
/// 4. normalize to the elevation scale
pub fn generate_elevation(
    width: usize,
    height: usize,
    params: &ElevationParams,
    seed: u64,
) -> ScalarField {
    let noise_seed = WorldSeeds::noise_seed(seed);
    let base = params.base.fbm(noise_seed);
    let ridge = RidgedMulti::<Perlin>::new(noise_seed.wrapping_add(1))
        .set_frequency(params.ridge_frequency)
        .set_octaves(params.ridge_octaves);

    let mut elevation = sample_plane(width, height, &params.base.bounds, |p| {
        base.get(p) + ridge.get(p) * params.ridge_scale + params.ridge_bias
    });

    elevation.normalize(0.0, 1.0);
    elevation.scale_by_radial_gradient(params.gradient_radius, params.gradient_floor);
    elevation.normalize(0.0, MAX_ELEVATION);
    elevation
}
