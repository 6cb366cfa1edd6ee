use std::path::PathBuf;

use clap::Args;
use comfy_table::{Table, presets::UTF8_FULL};
use courier_matrix_providers::{
    cache::{FileCache, MatricesCache, NoCache},
    osrm_table::{MatrixServiceParams, OsrmTableClient},
    travel_matrix_client::TravelMatrixClient,
};
use courier_optimizer::{
    decoder::decoded_route::DecodedSolution,
    json::{
        request::JsonRoutingRequest,
        response::{GatewayResponse, RoutingResponse},
    },
    service::RoutingService,
    solver::{
        insertion_engine::{InsertionSearchEngine, InsertionSearchParams},
        solver_params::SolveParams,
    },
};
use tracing::info;

use crate::parsers;

#[derive(Args)]
pub struct SolveArgs {
    /// The request file to solve
    #[arg(short = 'i', long)]
    input: PathBuf,

    /// Budget of the hard attempt, the soft attempt gets twice as much (e.g., "25s", "PT1M")
    #[arg(short, long, value_parser = parsers::parse_duration, default_value = "25s")]
    timeout: jiff::SignedDuration,

    #[arg(long)]
    seed: Option<u64>,

    /// Cost added to arcs above the cluster distance threshold on large requests
    #[arg(long)]
    cluster_surcharge: Option<f64>,

    /// Folder used to cache matrix service responses
    #[arg(long)]
    cache: Option<PathBuf>,
}

pub fn matrix_client<C>(cache: C) -> anyhow::Result<TravelMatrixClient<C>>
where
    C: MatricesCache,
{
    let osrm_client = match MatrixServiceParams::from_env() {
        Some(params) => {
            info!(url = %params.osrm_url, "Matrix service configured");
            Some(OsrmTableClient::new(params)?)
        }
        None => None,
    };

    Ok(TravelMatrixClient::new(cache, osrm_client))
}

fn route_table(solution: &DecodedSolution) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec![
        "Vehicle",
        "Stops",
        "Distance (m)",
        "Parcels",
        "Peak load",
        "Peak COD",
        "Violations",
    ]);

    for route in solution.routes() {
        let violations = route
            .violations
            .iter()
            .map(|violation| format!("{violation:?}"))
            .collect::<Vec<_>>()
            .join(", ");

        table.add_row(vec![
            route.vehicle.to_string(),
            route.stops.len().to_string(),
            format!("{:.0}", route.distance),
            route.parcels.to_string(),
            route.peak_load.to_string(),
            route.peak_cod.to_string(),
            violations,
        ]);
    }

    table
}

async fn solve<C>(client: TravelMatrixClient<C>, args: &SolveArgs) -> anyhow::Result<()>
where
    C: MatricesCache,
{
    let content = std::fs::read_to_string(&args.input)?;

    let mut params = SolveParams::default();
    params.escalation.hard_time_budget = args.timeout;
    if let Some(surcharge) = args.cluster_surcharge {
        params.distance.cluster.surcharge = surcharge;
    }

    let mut engine_params = InsertionSearchParams::default();
    if let Some(seed) = args.seed {
        engine_params.seed = seed;
    }

    let service = RoutingService::new(InsertionSearchEngine::new(engine_params), client, params);

    let result = match JsonRoutingRequest::from_json_str(&content) {
        Ok(request) => service.solve(request).await,
        Err(error) => Err(error.into()),
    };

    if let Ok(RoutingResponse::Solved(solution)) = &result {
        info!(
            routes = solution.cluster.len(),
            violated_routes = solution.violated_cluster.len(),
            violated_points = solution.violated_points.len(),
            "Finished"
        );
        println!("{}", route_table(solution));
    }

    let response = GatewayResponse::from_result(&result);
    println!("{}", serde_json::to_string_pretty(&response)?);

    Ok(())
}

pub async fn run(args: SolveArgs) -> anyhow::Result<()> {
    match &args.cache {
        Some(folder) => solve(matrix_client(FileCache::new(folder)?)?, &args).await,
        None => match FileCache::from_env() {
            Ok(cache) => solve(matrix_client(cache)?, &args).await,
            Err(_) => solve(matrix_client(NoCache)?, &args).await,
        },
    }
}
