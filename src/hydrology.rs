//! Distance-from-water transform
//!
//! Multi-source relaxation outward from every coast. Only two step costs
//! exist, so a FIFO queue that re-enqueues a cell whenever its distance
//! improves converges to the exact weighted shortest path without a heap.

use std::collections::VecDeque;

use crate::tilemap::{ScalarField, Tilemap};

/// Cost of a horizontal or vertical step
pub const ORTHOGONAL_STEP: f32 = 1.0;
/// Cost of a diagonal step
pub const DIAGONAL_STEP: f32 = 1.33;
/// Distance of a cell no water can reach (a world without water)
pub const UNREACHED: f32 = f32::INFINITY;

/// Distance from every cell to its nearest water cell
#[derive(Clone, Debug)]
pub struct WaterDistance {
    /// 0.0 on water, step-weighted distance on land, [`UNREACHED`] without water
    pub distances: Tilemap<f32>,
    /// Largest distance observed, `None` when the map has no water
    pub max_distance: Option<f32>,
}

impl WaterDistance {
    pub fn get(&self, x: usize, y: usize) -> f32 {
        *self.distances.get(x, y)
    }

    pub fn has_water(&self) -> bool {
        self.max_distance.is_some()
    }
}

fn step_cost(diagonal: bool) -> f32 {
    if diagonal { DIAGONAL_STEP } else { ORTHOGONAL_STEP }
}

/// Compute graph distance from water (`elevation < sea_level`) for every cell.
pub fn distance_from_water(elevation: &ScalarField, sea_level: f32) -> WaterDistance {
    let width = elevation.width;
    let height = elevation.height;
    let is_water = |x: usize, y: usize| *elevation.get(x, y) < sea_level;

    let mut distances = Tilemap::new_with(width, height, UNREACHED);
    let mut queue: VecDeque<(usize, usize)> = VecDeque::new();
    let mut any_water = false;

    for y in 0..height {
        for x in 0..width {
            if is_water(x, y) {
                distances.set(x, y, 0.0);
                any_water = true;
            }
        }
    }

    if !any_water {
        return WaterDistance { distances, max_distance: None };
    }

    // Seed the coast: land cells touching water take their cheapest step
    for y in 0..height {
        for x in 0..width {
            if is_water(x, y) {
                continue;
            }
            let coast = elevation
                .neighbors_8(x, y)
                .into_iter()
                .filter(|&(nx, ny, _)| is_water(nx, ny))
                .map(|(_, _, diagonal)| step_cost(diagonal))
                .fold(UNREACHED, f32::min);

            if coast < UNREACHED {
                distances.set(x, y, coast);
                queue.push_back((x, y));
            }
        }
    }

    // Relax outward. Distances only ever decrease, so each cell is
    // re-enqueued a bounded number of times.
    while let Some((x, y)) = queue.pop_front() {
        let here = *distances.get(x, y);
        for (nx, ny, diagonal) in distances.neighbors_8(x, y) {
            let candidate = here + step_cost(diagonal);
            if candidate < *distances.get(nx, ny) {
                distances.set(nx, ny, candidate);
                queue.push_back((nx, ny));
            }
        }
    }

    let max_distance = distances
        .iter()
        .map(|(_, _, &d)| d)
        .filter(|d| d.is_finite())
        .fold(0.0f32, f32::max);

    WaterDistance { distances, max_distance: Some(max_distance) }
}

/// Wet the moisture field near water: each cell gains
/// `(max - d) * 2 / max`, so coasts gain 2.0 and the farthest land nothing.
/// Scaling by the maximum keeps the effect independent of map resolution.
pub fn apply_to_moisture(moisture: &mut ScalarField, water: &WaterDistance) {
    let max = match water.max_distance {
        Some(max) if max > 0.0 => max,
        _ => return,
    };

    moisture.for_each_cell(|x, y, v| {
        let d = water.get(x, y);
        if d.is_finite() {
            *v += (max - d) * 2.0 / max;
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEA: f32 = 60.0;

    fn land_with_water_at(width: usize, height: usize, water: &[(usize, usize)]) -> ScalarField {
        let mut elevation = Tilemap::new_with(width, height, 100.0f32);
        for &(x, y) in water {
            elevation.set(x, y, 10.0);
        }
        elevation
    }

    /// Cheapest path on an 8-connected grid between opposite corners
    fn corner_path(width: usize, height: usize) -> f32 {
        let dx = width - 1;
        let dy = height - 1;
        let diagonal = dx.min(dy) as f32;
        let straight = (dx.max(dy) - dx.min(dy)) as f32;
        diagonal * DIAGONAL_STEP + straight * ORTHOGONAL_STEP
    }

    #[test]
    fn test_single_corner_water_square() {
        let elevation = land_with_water_at(12, 12, &[(0, 0)]);
        let water = distance_from_water(&elevation, SEA);

        let far = water.get(11, 11);
        assert!((far - corner_path(12, 12)).abs() < 1e-3, "got {}", far);
        assert!((water.max_distance.unwrap() - far).abs() < 1e-3);
    }

    #[test]
    fn test_single_corner_water_rectangle() {
        for (w, h) in [(20, 7), (5, 31), (2, 2), (1, 9)] {
            let elevation = land_with_water_at(w, h, &[(0, 0)]);
            let water = distance_from_water(&elevation, SEA);
            let far = water.get(w - 1, h - 1);
            assert!((far - corner_path(w, h)).abs() < 1e-3, "{}x{}: got {}", w, h, far);
        }
    }

    #[test]
    fn test_coast_step_costs() {
        let elevation = land_with_water_at(5, 5, &[(2, 2)]);
        let water = distance_from_water(&elevation, SEA);

        assert_eq!(water.get(2, 2), 0.0);
        assert_eq!(water.get(2, 1), ORTHOGONAL_STEP);
        assert_eq!(water.get(1, 1), DIAGONAL_STEP);
        assert!((water.get(0, 2) - 2.0).abs() < 1e-6);
        // Orthogonal neighbor wins over a diagonal one
        let elevation = land_with_water_at(3, 3, &[(0, 0), (1, 0)]);
        let water = distance_from_water(&elevation, SEA);
        assert_eq!(water.get(1, 1), ORTHOGONAL_STEP);
    }

    #[test]
    fn test_no_water_is_noop() {
        let elevation = Tilemap::new_with(6, 4, 200.0f32);
        let water = distance_from_water(&elevation, SEA);
        assert!(!water.has_water());
        assert!(water.distances.iter().all(|(_, _, &d)| d == UNREACHED));

        let mut moisture = Tilemap::new_with(6, 4, 0.3f32);
        apply_to_moisture(&mut moisture, &water);
        assert!(moisture.iter().all(|(_, _, &m)| m == 0.3));
    }

    #[test]
    fn test_sea_level_cell_is_land() {
        let mut elevation = Tilemap::new_with(3, 1, 100.0f32);
        elevation.set(0, 0, SEA - 0.01);
        elevation.set(1, 0, SEA);
        let water = distance_from_water(&elevation, SEA);
        assert_eq!(water.get(0, 0), 0.0);
        assert_eq!(water.get(1, 0), ORTHOGONAL_STEP);
    }

    #[test]
    fn test_moisture_wetter_near_water() {
        let elevation = land_with_water_at(10, 1, &[(0, 0)]);
        let water = distance_from_water(&elevation, SEA);

        let mut moisture = Tilemap::new_with(10, 1, 0.0f32);
        apply_to_moisture(&mut moisture, &water);

        assert!((*moisture.get(0, 0) - 2.0).abs() < 1e-6);
        assert!(moisture.get(9, 0).abs() < 1e-6);
        for x in 1..10 {
            assert!(moisture.get(x, 0) < moisture.get(x - 1, 0));
        }
    }

    #[test]
    fn test_all_water_leaves_moisture_alone() {
        let elevation = Tilemap::new_with(4, 4, 0.0f32);
        let water = distance_from_water(&elevation, SEA);
        assert_eq!(water.max_distance, Some(0.0));

        let mut moisture = Tilemap::new_with(4, 4, 0.5f32);
        apply_to_moisture(&mut moisture, &water);
        assert!(moisture.iter().all(|(_, _, &m)| m == 0.5));
    }
}
