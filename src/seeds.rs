//! Seed management for world generation
//!
//! Every stochastic stage gets its own seed, derived from one master seed, so
//! a world can be recreated from a single number.

/// Seeds for all world generation stages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct WorldSeeds {
    /// Master seed (used for display/reference)
    pub master: u64,
    /// Base terrain and ridge noise
    pub elevation: u64,
    /// Temperature noise
    pub temperature: u64,
    /// Moisture noise
    pub moisture: u64,
    /// Site placement for the region decomposition
    pub sites: u64,
}

impl WorldSeeds {
    /// Create seeds from a master seed, deriving all sub-seeds deterministically.
    pub fn from_master(master: u64) -> Self {
        Self {
            master,
            elevation: derive_seed(master, Stage::Elevation),
            temperature: derive_seed(master, Stage::Temperature),
            moisture: derive_seed(master, Stage::Moisture),
            sites: derive_seed(master, Stage::Sites),
        }
    }

    /// Noise generators take 32-bit seeds.
    pub fn noise_seed(seed: u64) -> u32 {
        (seed ^ (seed >> 32)) as u32
    }
}

impl Default for WorldSeeds {
    fn default() -> Self {
        Self::from_master(rand::random())
    }
}

/// Generation stages, in stream order. Reordering changes every world.
#[derive(Clone, Copy)]
enum Stage {
    Elevation = 0,
    Temperature = 1,
    Moisture = 2,
    Sites = 3,
}

const GOLDEN_GAMMA: u64 = 0x9E37_79B9_7F4A_7C15;

/// SplitMix64 output for stream `stage` of `master`. Identical on every
/// platform and toolchain.
fn derive_seed(master: u64, stage: Stage) -> u64 {
    let mut z = master.wrapping_add(GOLDEN_GAMMA.wrapping_mul(stage as u64 + 1));
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

impl std::fmt::Display for WorldSeeds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "WorldSeeds {{ master: {}, elevation: {}, temperature: {}, moisture: {}, sites: {} }}",
            self.master, self.elevation, self.temperature, self.moisture, self.sites,
        )
    }
}
