/// A fixed-size 2D grid stored row-major. Coordinates outside the grid are a
/// programming error and panic.
#[derive(Clone, Debug, PartialEq)]
pub struct Tilemap<T> {
    pub width: usize,
    pub height: usize,
    data: Vec<T>,
}

/// A grid of real values (elevation, temperature, moisture).
pub type ScalarField = Tilemap<f32>;

impl<T: Clone> Tilemap<T> {
    pub fn new_with(width: usize, height: usize, value: T) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    /// Build a map from row-major data. Panics if the length doesn't match.
    pub fn from_vec(width: usize, height: usize, data: Vec<T>) -> Self {
        assert_eq!(data.len(), width * height, "tilemap data length mismatch");
        Self { width, height, data }
    }

    fn index(&self, x: usize, y: usize) -> usize {
        assert!(
            x < self.width && y < self.height,
            "tile ({}, {}) outside {}x{} map",
            x,
            y,
            self.width,
            self.height
        );
        y * self.width + x
    }

    pub fn get(&self, x: usize, y: usize) -> &T {
        &self.data[self.index(x, y)]
    }

    pub fn set(&mut self, x: usize, y: usize, value: T) {
        let idx = self.index(x, y);
        self.data[idx] = value;
    }

    /// Whether signed coordinates fall inside the map.
    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    /// 8-connected neighbors that lie inside the map, paired with whether the
    /// step is diagonal. Edges don't wrap.
    pub fn neighbors_8(&self, x: usize, y: usize) -> Vec<(usize, usize, bool)> {
        let mut result = Vec::with_capacity(8);

        for dy in -1i64..=1 {
            for dx in -1i64..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let nx = x as i64 + dx;
                let ny = y as i64 + dy;
                if self.contains(nx, ny) {
                    result.push((nx as usize, ny as usize, dx != 0 && dy != 0));
                }
            }
        }

        result
    }

    /// Iterate over all cells with their coordinates.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &T)> {
        let width = self.width;
        self.data.iter().enumerate().map(move |(idx, val)| {
            (idx % width, idx / width, val)
        })
    }
}

// =============================================================================
// SCALAR FIELD OPERATIONS
// =============================================================================

/// Lower bound applied by [`Tilemap::scale_by_latitude_band`].
const LATITUDE_BAND_FLOOR: f32 = 0.1;

impl Tilemap<f32> {
    /// Smallest and largest value in the field.
    pub fn min_max(&self) -> (f32, f32) {
        self.data.iter().fold((f32::MAX, f32::MIN), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        })
    }

    /// Affinely rescale so the current min/max map onto `[new_min, new_max]`.
    /// A constant field has no spread to stretch, so every cell becomes `new_min`.
    pub fn normalize(&mut self, new_min: f32, new_max: f32) {
        let (cur_min, cur_max) = self.min_max();
        let spread = cur_max - cur_min;

        if spread <= 0.0 || !spread.is_finite() {
            self.data.fill(new_min);
            return;
        }

        let target = new_max - new_min;
        for v in self.data.iter_mut() {
            *v = if *v >= cur_max {
                new_max
            } else {
                (new_min + (*v - cur_min) / spread * target).clamp(new_min, new_max)
            };
        }
    }

    /// Attenuate values by distance from the map center, biasing land toward
    /// the middle. `floor` keeps the edges from vanishing entirely.
    pub fn scale_by_radial_gradient(&mut self, radius: f32, floor: f32) {
        let (width, height) = (self.width as f32, self.height as f32);
        let r2 = radius * radius;
        let outside = 1.0 - radius.powf(2.5);

        self.for_each_cell(|x, y, v| {
            let nx = 2.0 * x as f32 / width - 1.0;
            let ny = 2.0 * y as f32 / height - 1.0;
            let dist = nx * nx + ny * ny;
            let falloff = if dist > r2 { outside } else { 1.0 - dist.sqrt().powf(2.5) };
            *v *= falloff.max(floor);
        });
    }

    /// Scale values down toward the top and bottom edges.
    pub fn scale_by_latitude_band(&mut self, bias_strength: f32) {
        let height = self.height as f32;

        self.for_each_cell(|_, y, v| {
            let band = 2.0 * (y as f32 / height - 0.5).abs();
            *v *= (1.0 - bias_strength * band * band).max(LATITUDE_BAND_FLOOR);
        });
    }

    /// Move each cell toward `1 - other[cell]` by `coefficient` (0 = unchanged,
    /// 1 = fully inverted `other`).
    pub fn blend_toward_inverse(&mut self, other: &Tilemap<f32>, coefficient: f32) {
        assert!(
            self.width == other.width && self.height == other.height,
            "blend_toward_inverse: {}x{} vs {}x{}",
            self.width,
            self.height,
            other.width,
            other.height
        );

        for (v, &o) in self.data.iter_mut().zip(other.data.iter()) {
            *v += ((1.0 - o) - *v) * coefficient;
        }
    }

    /// Run `f(x, y, &mut value)` on every cell.
    pub fn for_each_cell<F>(&mut self, mut f: F)
    where
        F: FnMut(usize, usize, &mut f32),
    {
        let width = self.width;
        for (idx, v) in self.data.iter_mut().enumerate() {
            f(idx % width, idx / width, v);
        }
    }
}
