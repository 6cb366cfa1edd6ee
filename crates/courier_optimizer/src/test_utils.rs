use std::{sync::Arc, time::Duration};

use courier_matrix_providers::{
    cache::MatricesCache,
    geodesic::geodesic_matrices,
    osrm_table::{MatrixServiceParams, OsrmTableClient},
    travel_matrices::TravelMatrices,
    travel_matrix_client::TravelMatrixClient,
    travel_matrix_provider::TravelMatrixProvider,
};

use crate::{
    distance::distance_matrix::DistanceMatrix,
    problem::{
        location::Location,
        order::Order,
        routing_problem::{RoutingProblem, RoutingProblemBuilder},
    },
};

/// Builds a problem with one vehicle. Each order lists its pickup first; the
/// delivery of leg `n` (1-based) carries `100 * n` of cash and one parcel.
pub fn create_problem(
    depot: (f64, f64),
    orders: Vec<Vec<(f64, f64)>>,
    configure: impl FnOnce(&mut RoutingProblemBuilder),
) -> RoutingProblem {
    let mut builder = RoutingProblemBuilder::default();
    builder
        .set_depot(Location::from_lat_lon(depot.0, depot.1))
        .set_vehicle_num(1);

    for locations in orders {
        let (pickup, deliveries) = locations.split_first().unwrap();
        let deliveries = deliveries
            .iter()
            .enumerate()
            .map(|(index, &(lat, lon))| {
                Location::from_lat_lon(lat, lon).with_cod(100.0 * (index + 1) as f64)
            })
            .collect();

        builder.add_order(Order::new(
            Location::from_lat_lon(pickup.0, pickup.1),
            deliveries,
        ));
    }

    configure(&mut builder);
    builder.build().unwrap()
}

pub fn geodesic_matrix(problem: &RoutingProblem) -> Arc<DistanceMatrix> {
    let matrices = geodesic_matrices(problem.nodes());
    Arc::new(DistanceMatrix::new(&matrices, problem.transport_mode()))
}

/// Serves a fixed matrix for any request, standing in for the matrix service.
pub struct CannedMatricesCache {
    matrices: Option<TravelMatrices>,
}

impl CannedMatricesCache {
    pub fn new(matrices: TravelMatrices) -> Self {
        CannedMatricesCache {
            matrices: Some(matrices),
        }
    }

    pub fn empty() -> Self {
        CannedMatricesCache { matrices: None }
    }
}

impl MatricesCache for CannedMatricesCache {
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
        Ok(self.matrices.clone())
    }
}

/// A client that believes a matrix service is configured. The address is never
/// reached as long as the cache answers first.
pub fn service_client(cache: CannedMatricesCache) -> TravelMatrixClient<CannedMatricesCache> {
    let osrm_client = OsrmTableClient::new(MatrixServiceParams {
        osrm_url: String::from("http://127.0.0.1:9"),
        timeout: Duration::from_millis(200),
    })
    .unwrap();

    TravelMatrixClient::new(cache, Some(osrm_client))
}
