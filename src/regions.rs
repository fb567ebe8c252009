//! Region partitioning over a Voronoi decomposition
//!
//! Random sites split the map into convex cells. Neighboring cells whose
//! centers classify to the same biome are flood-filled into one region, so
//! the regions are disjoint and cover every site exactly once.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use voronoice::{BoundingBox, Point, VoronoiBuilder};

use crate::biomes::{Biome, BiomeCategory};

/// Site identifier (index into [`SiteGraph::sites`])
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct SiteId(pub u32);

/// Region identifier (index into [`RegionPartition::regions`])
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct RegionId(pub u32);

/// One decomposition cell: its generating point and adjacent cells
#[derive(Clone, Debug, PartialEq)]
pub struct Site {
    pub id: SiteId,
    /// Position in map coordinates (x in [0, width), y in [0, height))
    pub position: (f64, f64),
    pub neighbors: Vec<SiteId>,
}

/// The planar decomposition: sites plus their adjacency
#[derive(Clone, Debug, Default)]
pub struct SiteGraph {
    pub sites: Vec<Site>,
}

impl SiteGraph {
    /// Sample `count` points uniformly over a width x height rectangle and build
    /// their Voronoi diagram. Returns `None` when the points can't be
    /// triangulated (too few, or all collinear).
    pub fn random(count: usize, width: usize, height: usize, rng: &mut ChaCha8Rng) -> Option<Self> {
        let (w, h) = (width as f64, height as f64);
        let points: Vec<(f64, f64)> = (0..count)
            .map(|_| (rng.gen_range(0.0..w), rng.gen_range(0.0..h)))
            .collect();
        Self::voronoi(&points, width, height)
    }

    /// Build the Voronoi diagram of `points` clipped to a width x height rectangle.
    pub fn voronoi(points: &[(f64, f64)], width: usize, height: usize) -> Option<Self> {
        let (w, h) = (width as f64, height as f64);
        let sites: Vec<Point> = points.iter().map(|&(x, y)| Point { x, y }).collect();

        let diagram = VoronoiBuilder::default()
            .set_sites(sites)
            .set_bounding_box(BoundingBox::new(Point { x: w / 2.0, y: h / 2.0 }, w, h))
            .set_lloyd_relaxation_iterations(0)
            .build()?;

        let sites = (0..diagram.sites().len())
            .map(|i| {
                let cell = diagram.cell(i);
                let position = cell.site_position();
                let mut neighbors: Vec<SiteId> =
                    cell.iter_neighbors().map(|n| SiteId(n as u32)).collect();
                neighbors.sort();
                neighbors.dedup();
                Site {
                    id: SiteId(i as u32),
                    position: (position.x, position.y),
                    neighbors,
                }
            })
            .collect();

        Some(Self { sites })
    }

    /// Build a graph from explicit adjacency lists (one per position).
    /// Adjacency is made symmetric.
    pub fn from_adjacency(positions: &[(f64, f64)], neighbors: &[Vec<usize>]) -> Self {
        assert_eq!(positions.len(), neighbors.len(), "one adjacency list per site");

        let mut links: Vec<BTreeSet<u32>> = vec![BTreeSet::new(); positions.len()];
        for (i, list) in neighbors.iter().enumerate() {
            for &n in list {
                if n != i && n < positions.len() {
                    links[i].insert(n as u32);
                    links[n].insert(i as u32);
                }
            }
        }

        let sites = positions
            .iter()
            .zip(links)
            .enumerate()
            .map(|(i, (&position, links))| Site {
                id: SiteId(i as u32),
                position,
                neighbors: links.into_iter().map(SiteId).collect(),
            })
            .collect();

        Self { sites }
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    pub fn site(&self, id: SiteId) -> &Site {
        &self.sites[id.0 as usize]
    }

    /// Site whose generating point is closest to `point`, i.e. the Voronoi
    /// cell containing it. Ties go to the lower id.
    ///
    /// Linear in the number of sites. Per-tile callers pay width x height x
    /// sites; bucket the sites on a coarse grid before using this on maps
    /// much larger than a few hundred tiles a side.
    pub fn nearest(&self, (px, py): (f64, f64)) -> Option<SiteId> {
        self.sites
            .iter()
            .map(|s| {
                let (dx, dy) = (s.position.0 - px, s.position.1 - py);
                (dx * dx + dy * dy, s.id)
            })
            .min_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)))
            .map(|(_, id)| id)
    }
}

/// A maximal connected group of sites sharing one biome
#[derive(Clone, Debug, PartialEq)]
pub struct Region {
    pub id: RegionId,
    pub biome: Biome,
    /// Member sites in discovery order
    pub sites: Vec<SiteId>,
}

impl Region {
    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }
}

/// All regions plus a site -> region lookup
#[derive(Clone, Debug, Default)]
pub struct RegionPartition {
    pub regions: Vec<Region>,
    site_region: Vec<RegionId>,
}

impl RegionPartition {
    pub fn region_of(&self, site: SiteId) -> RegionId {
        self.site_region[site.0 as usize]
    }

    pub fn region(&self, id: RegionId) -> &Region {
        &self.regions[id.0 as usize]
    }

    pub fn stats(&self) -> RegionStats {
        let mut per_category: BTreeMap<BiomeCategory, usize> = BTreeMap::new();
        for region in &self.regions {
            *per_category.entry(region.biome.category).or_default() += 1;
        }

        RegionStats {
            region_count: self.regions.len(),
            site_count: self.site_region.len(),
            largest: self.regions.iter().max_by_key(|r| r.len()).map(|r| (r.id, r.len())),
            per_category,
        }
    }
}

/// Summary of a partition
#[derive(Clone, Debug, PartialEq)]
pub struct RegionStats {
    pub region_count: usize,
    pub site_count: usize,
    /// Largest region and its site count
    pub largest: Option<(RegionId, usize)>,
    /// Number of regions per coarse category
    pub per_category: BTreeMap<BiomeCategory, usize>,
}

/// Flood-fill same-biome neighbors into regions.
///
/// Each site is classified once, in parallel, at its generating point.
/// Regions are seeded from the lowest unprocessed site id, so discovery order
/// is stable for a given graph.
pub fn partition<F>(graph: &SiteGraph, classify: F) -> RegionPartition
where
    F: Fn((f64, f64)) -> Biome + Sync,
{
    let biomes: Vec<Biome> = graph
        .sites
        .par_iter()
        .map(|site| classify(site.position))
        .collect();

    let mut unprocessed: BTreeSet<SiteId> = graph.sites.iter().map(|s| s.id).collect();
    let mut site_region = vec![RegionId(u32::MAX); graph.len()];
    let mut regions = Vec::new();
    let mut queue: VecDeque<SiteId> = VecDeque::new();

    while let Some(seed) = unprocessed.pop_first() {
        let id = RegionId(regions.len() as u32);
        let biome = biomes[seed.0 as usize];
        let mut members = Vec::new();

        queue.push_back(seed);
        while let Some(current) = queue.pop_front() {
            members.push(current);
            site_region[current.0 as usize] = id;

            for &neighbor in &graph.site(current).neighbors {
                if biomes[neighbor.0 as usize] == biome && unprocessed.remove(&neighbor) {
                    queue.push_back(neighbor);
                }
            }
        }

        regions.push(Region { id, biome, sites: members });
    }

    RegionPartition { regions, site_region }
}
