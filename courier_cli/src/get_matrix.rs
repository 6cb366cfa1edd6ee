use std::path::PathBuf;

use clap::Args;
use courier_matrix_providers::{cache::FileCache, travel_matrix_provider::TravelMatrixProvider};
use courier_optimizer::{
    distance::distance_provider::DistanceProvider, json::request::JsonRoutingRequest,
    solver::solver_params::SolveParams,
};
use tracing::info;

use crate::solve::matrix_client;

#[derive(Args)]
pub struct GetMatrixArgs {
    /// The request file whose matrix is fetched
    #[arg(short = 'i', long)]
    input: PathBuf,

    /// Cache folder, defaults to COURIER_CACHE_FOLDER
    #[arg(long)]
    cache: Option<PathBuf>,
}

/// Only matrix service responses go through the cache.
fn ensure_cacheable(provider: TravelMatrixProvider) -> anyhow::Result<()> {
    if provider == TravelMatrixProvider::Geodesic {
        anyhow::bail!(
            "Geodesic matrices are computed locally and never cached, \
             request the matrix service or configure COURIER_OSRM_URL for auto"
        );
    }

    Ok(())
}

pub async fn run(args: GetMatrixArgs) -> anyhow::Result<()> {
    let cache = match args.cache {
        Some(folder) => FileCache::new(folder)?,
        None => FileCache::from_env()?,
    };
    let client = matrix_client(cache)?;
    let params = SolveParams::default();

    let content = std::fs::read_to_string(&args.input)?;
    let request = JsonRoutingRequest::from_json_str(&content)?;
    let problem = request
        .build_problem_within(params.distance.matrix_service_max_nodes)?
        .problem;

    let provider = DistanceProvider::new(&client, &params.distance)
        .resolve_provider(problem.distance_calculation(), problem.num_nodes())?;
    ensure_cacheable(provider)?;

    let matrices = client.fetch_matrix(problem.nodes(), provider).await?;

    info!(
        ?provider,
        points = matrices.num_points,
        "Matrix cached"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geodesic_matrices_are_not_cached() {
        assert!(ensure_cacheable(TravelMatrixProvider::Geodesic).is_err());
        assert!(ensure_cacheable(TravelMatrixProvider::OsrmTable).is_ok());
    }
}
