//! Biome map generation library
//!
//! Builds elevation, temperature and moisture fields, classifies tiles into
//! biomes and groups Voronoi sites into same-biome regions.

pub mod ascii;
pub mod biomes;
pub mod climate;
pub mod heightmap;
pub mod hydrology;
pub mod quantiles;
pub mod regions;
pub mod seeds;
pub mod tilemap;
pub mod world;
