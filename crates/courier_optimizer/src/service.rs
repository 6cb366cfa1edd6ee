use std::{sync::Arc, time::Instant};

use courier_matrix_providers::{
    cache::{MatricesCache, NoCache},
    travel_matrix_client::TravelMatrixClient,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    decoder::{decoded_route::DecodedSolution, solution_decoder::SolutionDecoder},
    distance::distance_provider::{DistanceOutcome, DistanceProvider},
    error::Error,
    json::{
        request::{JsonRoutingRequest, ValidatedRequest},
        response::{GatewayResponse, RoutingResponse},
    },
    model::constraint_model_builder::ConstraintModelBuilder,
    solver::{
        engine::RouteSolverEngine,
        escalation::{EscalationController, EscalationOutcome},
        solver_params::SolveParams,
    },
};

/// Runs one request through validation, distances, escalation and decoding.
pub struct RoutingService<E, C = NoCache> {
    engine: E,
    client: TravelMatrixClient<C>,
    params: SolveParams,
}

impl<E, C> RoutingService<E, C>
where
    E: RouteSolverEngine,
    C: MatricesCache,
{
    pub fn new(engine: E, client: TravelMatrixClient<C>, params: SolveParams) -> Self {
        RoutingService {
            engine,
            client,
            params,
        }
    }

    pub fn params(&self) -> &SolveParams {
        &self.params
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn client(&self) -> &TravelMatrixClient<C> {
        &self.client
    }

    #[instrument(skip_all, fields(request_id = %Uuid::new_v4()))]
    pub async fn solve(&self, request: JsonRoutingRequest) -> Result<RoutingResponse, Error> {
        let start = Instant::now();

        let ValidatedRequest {
            mut problem,
            result_mode,
        } = request.build_problem_within(self.params.distance.matrix_service_max_nodes)?;

        info!(
            nodes = problem.num_nodes(),
            vehicles = problem.fleet_size(),
            "Problem built"
        );

        let DistanceOutcome {
            matrix,
            violated_points,
        } = DistanceProvider::new(&self.client, &self.params.distance)
            .build(&mut problem)
            .await?;

        if !problem.has_jobs() {
            info!(
                violated = violated_points.len(),
                "No job left to route after filtering"
            );
            return Ok(RoutingResponse::Solved(DecodedSolution::without_routes(
                violated_points,
            )));
        }

        let builder =
            ConstraintModelBuilder::new(&problem, Arc::clone(&matrix), &self.params.model);
        let outcome =
            EscalationController::new(&self.engine, &builder, &self.params.escalation).run();

        let response = match outcome {
            EscalationOutcome::Resolved {
                mode, assignment, ..
            } => {
                let solution = SolutionDecoder::new(&problem, &matrix, result_mode)
                    .decode(&assignment, violated_points);

                info!(
                    ?mode,
                    routes = solution.cluster.len(),
                    violated_routes = solution.violated_cluster.len(),
                    violated_points = solution.violated_points.len(),
                    elapsed = ?start.elapsed(),
                    "Request solved"
                );

                RoutingResponse::Solved(solution)
            }
            EscalationOutcome::Infeasible => {
                info!(elapsed = ?start.elapsed(), "Request infeasible");
                RoutingResponse::NoSolution
            }
        };

        Ok(response)
    }

    /// Parses a raw request body and wraps the outcome, errors included.
    pub async fn solve_json(&self, input: &str) -> GatewayResponse {
        let result = match JsonRoutingRequest::from_json_str(input) {
            Ok(request) => self.solve(request).await,
            Err(error) => Err(error.into()),
        };

        GatewayResponse::from_result(&result)
    }
}
