use serde::{Deserialize, Serialize};

/// TravelMatrices holds the raw distances (meters) between every pair of points.
/// Stored as a flat row-major vector: `index = from * num_points + to`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct TravelMatrices {
    pub distances: Vec<f64>,
    pub num_points: usize,
}

impl TravelMatrices {
    pub fn new(distances: Vec<f64>, num_points: usize) -> Self {
        TravelMatrices {
            distances,
            num_points,
        }
    }

    pub fn from_rows(rows: Vec<Vec<f64>>) -> Self {
        let num_points = rows.len();
        TravelMatrices {
            distances: rows.into_iter().flatten().collect(),
            num_points,
        }
    }

    pub fn is_square(&self) -> bool {
        self.distances.len() == self.num_points * self.num_points
    }

    #[inline(always)]
    pub fn distance(&self, from: usize, to: usize) -> f64 {
        self.distances[from * self.num_points + to]
    }

    pub fn row(&self, from: usize) -> &[f64] {
        let start = from * self.num_points;
        &self.distances[start..start + self.num_points]
    }

    /// Keeps only the given points, in the given order.
    pub fn project(&self, retained: &[usize]) -> TravelMatrices {
        let mut distances = Vec::with_capacity(retained.len() * retained.len());
        for &from in retained {
            for &to in retained {
                distances.push(self.distance(from, to));
            }
        }

        TravelMatrices {
            distances,
            num_points: retained.len(),
        }
    }
}

impl std::hash::Hash for TravelMatrices {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        state.write_usize(self.num_points);
        for d in &self.distances {
            state.write_u64(d.to_bits());
        }
    }
}
