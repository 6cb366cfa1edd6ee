use geo::{Distance, Geodesic};
use rayon::prelude::*;

use crate::travel_matrices::TravelMatrices;

/// Ellipsoidal (WGS84) distance in meters between two points.
pub fn geodesic_distance<P>(from: &P, to: &P) -> f64
where
    for<'a> &'a P: Into<geo_types::Point>,
{
    let from: geo_types::Point = from.into();
    let to: geo_types::Point = to.into();

    Geodesic.distance(from, to)
}

pub fn geodesic_matrices<P>(points: &[P]) -> TravelMatrices
where
    for<'a> &'a P: Into<geo_types::Point>,
{
    let points: Vec<geo_types::Point> = points.iter().map(|point| point.into()).collect();
    let num_points = points.len();
    let mut distances: Vec<f64> = vec![0.0; num_points * num_points];

    if num_points == 0 {
        return TravelMatrices::new(distances, 0);
    }

    distances
        .par_chunks_mut(num_points)
        .enumerate()
        .for_each(|(i, row)| {
            for (j, to) in points.iter().enumerate() {
                if i != j {
                    row[j] = Geodesic.distance(points[i], *to);
                }
            }
        });

    TravelMatrices::new(distances, num_points)
}
