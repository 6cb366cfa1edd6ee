use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    cache::{MatricesCache, NoCache},
    geodesic::geodesic_matrices,
    osrm_table::{OsrmError, OsrmTableClient},
    travel_matrices::TravelMatrices,
    travel_matrix_provider::TravelMatrixProvider,
};

#[derive(Debug, Error)]
pub enum MatrixProviderError {
    #[error("Matrix service error: {0}")]
    Osrm(#[from] OsrmError),

    #[error("Matrix service is not configured")]
    ServiceUnavailable,

    #[error("Matrix has {actual} entries, expected {expected}")]
    Shape { expected: usize, actual: usize },
}

pub struct TravelMatrixClient<C = NoCache> {
    osrm_client: Option<OsrmTableClient>,
    cache: C,
}

impl Default for TravelMatrixClient<NoCache> {
    fn default() -> Self {
        Self {
            osrm_client: None,
            cache: NoCache,
        }
    }
}

impl<C> TravelMatrixClient<C>
where
    C: MatricesCache,
{
    pub fn new(cache: C, osrm_client: Option<OsrmTableClient>) -> Self {
        Self { osrm_client, cache }
    }

    pub fn has_matrix_service(&self) -> bool {
        self.osrm_client.is_some()
    }

    pub async fn fetch_matrix<P>(
        &self,
        points: &[P],
        provider: TravelMatrixProvider,
    ) -> Result<TravelMatrices, MatrixProviderError>
    where
        for<'a> &'a P: Into<geo_types::Point>,
    {
        let matrices = match provider {
            TravelMatrixProvider::Geodesic => geodesic_matrices(points),
            TravelMatrixProvider::OsrmTable => self.fetch_service_matrix(points, provider).await?,
        };

        let expected = points.len() * points.len();
        if matrices.num_points != points.len() || !matrices.is_square() {
            return Err(MatrixProviderError::Shape {
                expected,
                actual: matrices.distances.len(),
            });
        }

        Ok(matrices)
    }

    async fn fetch_service_matrix<P>(
        &self,
        points: &[P],
        provider: TravelMatrixProvider,
    ) -> Result<TravelMatrices, MatrixProviderError>
    where
        for<'a> &'a P: Into<geo_types::Point>,
    {
        match self.cache.get_cached(provider, points) {
            Ok(Some(matrices)) => {
                debug!(points = points.len(), "Using cached matrix");
                return Ok(matrices);
            }
            Ok(None) => {}
            Err(err) => warn!("Failed to read cached matrix: {err}"),
        }

        let osrm_client = self
            .osrm_client
            .as_ref()
            .ok_or(MatrixProviderError::ServiceUnavailable)?;

        let matrices = osrm_client.fetch_matrix(points).await?;

        if let Err(err) = self.cache.cache(provider, points, &matrices) {
            warn!("Failed to cache matrix: {err}");
        }

        Ok(matrices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CannedCache(TravelMatrices);

    impl MatricesCache for CannedCache {
        fn cache<P>(
            &self,
            _provider: TravelMatrixProvider,
            _points: &[P],
            _matrices: &TravelMatrices,
        ) -> anyhow::Result<()>
        where
            for<'a> &'a P: Into<geo_types::Point>,
        {
            Ok(())
        }

        fn get_cached<P>(
            &self,
            _provider: TravelMatrixProvider,
            _points: &[P],
        ) -> anyhow::Result<Option<TravelMatrices>>
        where
            for<'a> &'a P: Into<geo_types::Point>,
        {
            Ok(Some(self.0.clone()))
        }
    }

    fn points() -> Vec<geo_types::Point> {
        vec![
            geo_types::Point::new(106.7, 10.77),
            geo_types::Point::new(106.66, 10.76),
        ]
    }

    #[tokio::test]
    async fn test_geodesic_needs_no_service() {
        let client = TravelMatrixClient::default();
        let matrices = client
            .fetch_matrix(&points(), TravelMatrixProvider::Geodesic)
            .await
            .unwrap();

        assert_eq!(matrices.num_points, 2);
        assert!(matrices.distance(0, 1) > 0.0);
    }

    #[tokio::test]
    async fn test_service_unavailable_without_client() {
        let client = TravelMatrixClient::default();
        let result = client
            .fetch_matrix(&points(), TravelMatrixProvider::OsrmTable)
            .await;

        assert!(matches!(
            result,
            Err(MatrixProviderError::ServiceUnavailable)
        ));
    }

    #[tokio::test]
    async fn test_cached_matrix_is_used() {
        let canned = TravelMatrices::from_rows(vec![vec![0.0, 7.0], vec![9.0, 0.0]]);
        let client = TravelMatrixClient::new(CannedCache(canned.clone()), None);

        let matrices = client
            .fetch_matrix(&points(), TravelMatrixProvider::OsrmTable)
            .await
            .unwrap();

        assert_eq!(matrices, canned);
    }

    #[tokio::test]
    async fn test_wrong_shape_is_rejected() {
        let canned = TravelMatrices::from_rows(vec![vec![0.0]]);
        let client = TravelMatrixClient::new(CannedCache(canned), None);

        let result = client
            .fetch_matrix(&points(), TravelMatrixProvider::OsrmTable)
            .await;

        assert!(matches!(
            result,
            Err(MatrixProviderError::Shape {
                expected: 4,
                actual: 1
            })
        ));
    }
}
