use std::time::{Duration, Instant};

use jiff::SignedDuration;
use rand::{Rng, SeedableRng, rngs::SmallRng, seq::SliceRandom};
use tracing::{debug, info};

use crate::{
    model::routing_model::RoutingModel,
    problem::node::{Job, NodeIdx},
    solver::{
        assignment::Assignment,
        engine::{EngineOutcome, RouteSolverEngine},
        route_evaluation::evaluate_route,
        score::Score,
    },
};

#[derive(Debug, Clone)]
pub struct InsertionSearchParams {
    pub max_iterations: usize,
    pub max_iterations_without_improvement: usize,
    /// Construction retries with shuffled job orders when the first attempt fails.
    pub construction_attempts: usize,
    /// Upper share of the jobs removed by a random ruin.
    pub ruin_fraction: f64,
    /// Probability of ruining a whole route instead of random jobs.
    pub ruin_route_probability: f64,
    pub seed: u64,
}

impl Default for InsertionSearchParams {
    fn default() -> Self {
        InsertionSearchParams {
            max_iterations: 50_000,
            max_iterations_without_improvement: 2_000,
            construction_attempts: 20,
            ruin_fraction: 0.3,
            ruin_route_probability: 0.2,
            seed: 42,
        }
    }
}

/// Best insertion construction followed by ruin and recreate with greedy acceptance.
#[derive(Default)]
pub struct InsertionSearchEngine {
    params: InsertionSearchParams,
}

impl InsertionSearchEngine {
    pub fn new(params: InsertionSearchParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &InsertionSearchParams {
        &self.params
    }
}

#[derive(Debug, Clone, Copy)]
struct Insertion {
    route: usize,
    first_position: usize,
    /// Position of a pair's delivery in the route once its pickup is placed.
    last_position: usize,
    score: Score,
    delta: Score,
}

#[derive(Debug, Clone)]
struct SearchSolution {
    routes: Vec<Vec<NodeIdx>>,
    scores: Vec<Score>,
}

impl SearchSolution {
    fn empty(num_vehicles: usize) -> Self {
        SearchSolution {
            routes: vec![vec![]; num_vehicles],
            scores: vec![Score::ZERO; num_vehicles],
        }
    }

    fn total(&self) -> Score {
        self.scores.iter().copied().sum()
    }

    fn apply(&mut self, job: &Job, insertion: &Insertion) {
        let route = &mut self.routes[insertion.route];
        match job {
            Job::Stop(node) => route.insert(insertion.first_position, *node),
            Job::Pair(pair) => {
                route.insert(insertion.last_position, pair.delivery);
                route.insert(insertion.first_position, pair.pickup);
            }
        }
        self.scores[insertion.route] = insertion.score;
    }

    /// Removes every node of the given jobs. Returns `false` when a shortened
    /// route breaks a hard band, which non-metric matrices allow.
    fn remove_jobs(&mut self, model: &RoutingModel, jobs: &[Job]) -> bool {
        let mut removed = vec![false; model.num_nodes()];
        for node in jobs.iter().flat_map(Job::nodes) {
            removed[node.get()] = true;
        }

        for (route, score) in self.routes.iter_mut().zip(self.scores.iter_mut()) {
            let before = route.len();
            route.retain(|node| !removed[node.get()]);

            if route.len() != before {
                match evaluate_route(model, route) {
                    Some(new_score) => *score = new_score,
                    None => return false,
                }
            }
        }

        true
    }

    fn into_assignment(self) -> Assignment {
        let objective = self.total().soft_score;
        Assignment::from_visits(self.routes, objective)
    }
}

/// Cheapest position of `job` over all routes. Only the first empty route is
/// tried since empty routes are interchangeable.
fn best_insertion(model: &RoutingModel, solution: &SearchSolution, job: &Job) -> Option<Insertion> {
    let mut best: Option<Insertion> = None;
    let mut tried_empty_route = false;
    let mut candidate: Vec<NodeIdx> = Vec::new();

    for (route_index, visits) in solution.routes.iter().enumerate() {
        if visits.is_empty() {
            if tried_empty_route {
                continue;
            }
            tried_empty_route = true;
        }

        let current_score = solution.scores[route_index];

        for first_position in 0..=visits.len() {
            let last_positions = match job {
                Job::Stop(_) => first_position..=first_position,
                Job::Pair(_) => first_position..=visits.len(),
            };

            for last_position in last_positions {
                candidate.clear();
                candidate.extend_from_slice(&visits[..first_position]);
                candidate.push(job.first());
                candidate.extend_from_slice(&visits[first_position..last_position]);
                if let Job::Pair(pair) = job {
                    candidate.push(pair.delivery);
                }
                candidate.extend_from_slice(&visits[last_position..]);

                let Some(score) = evaluate_route(model, &candidate) else {
                    continue;
                };

                let delta = score - current_score;
                if best.is_none_or(|best| delta < best.delta) {
                    best = Some(Insertion {
                        route: route_index,
                        first_position,
                        last_position,
                        score,
                        delta,
                    });
                }
            }
        }
    }

    best
}

fn insert_all(
    model: &RoutingModel,
    solution: &mut SearchSolution,
    jobs: &[Job],
    deadline: Instant,
) -> bool {
    for job in jobs {
        if Instant::now() >= deadline {
            return false;
        }

        match best_insertion(model, solution, job) {
            Some(insertion) => solution.apply(job, &insertion),
            None => return false,
        }
    }

    true
}

/// Jobs ending far from the depot come first.
fn sort_far_first(model: &RoutingModel, jobs: &mut [Job]) {
    let depot = model.depot();
    let remoteness = |job: &Job| {
        model
            .arc_cost(depot, job.last())
            .max(model.arc_cost(job.last(), depot))
    };

    jobs.sort_by(|a, b| remoteness(b).total_cmp(&remoteness(a)));
}

impl InsertionSearchEngine {
    fn construct(
        &self,
        model: &RoutingModel,
        rng: &mut SmallRng,
        deadline: Instant,
    ) -> Option<SearchSolution> {
        let mut jobs = model.jobs().to_vec();
        sort_far_first(model, &mut jobs);

        let mut best: Option<SearchSolution> = None;

        for attempt in 0..self.params.construction_attempts.max(1) {
            if attempt > 0 {
                jobs.shuffle(rng);
            }

            let mut solution = SearchSolution::empty(model.num_vehicles());
            if !insert_all(model, &mut solution, &jobs, deadline) {
                if Instant::now() >= deadline {
                    break;
                }
                continue;
            }

            let total = solution.total();
            debug!(attempt, ?total, "Constructed initial solution");

            if best
                .as_ref()
                .is_none_or(|best| total < best.total())
            {
                best = Some(solution);
            }

            if !total.is_failure() {
                break;
            }
        }

        best
    }

    fn ruin(
        &self,
        model: &RoutingModel,
        solution: &mut SearchSolution,
        rng: &mut SmallRng,
    ) -> Option<Vec<Job>> {
        let non_empty: Vec<usize> = solution
            .routes
            .iter()
            .enumerate()
            .filter(|(_, route)| !route.is_empty())
            .map(|(index, _)| index)
            .collect();

        if non_empty.is_empty() {
            return None;
        }

        let removed: Vec<Job> = if rng.random_bool(self.params.ruin_route_probability) {
            let route = non_empty[rng.random_range(0..non_empty.len())];
            solution.routes[route]
                .iter()
                .filter_map(|&node| model.job_of(node).filter(|job| job.first() == node))
                .copied()
                .collect()
        } else {
            let num_jobs = model.jobs().len();
            let max_removed = ((num_jobs as f64 * self.params.ruin_fraction) as usize).max(1);
            let count = rng.random_range(1..=max_removed);

            let mut jobs = model.jobs().to_vec();
            jobs.shuffle(rng);
            jobs.truncate(count);
            jobs
        };

        if !solution.remove_jobs(model, &removed) {
            return None;
        }

        Some(removed)
    }

    fn recreate(
        &self,
        model: &RoutingModel,
        solution: &mut SearchSolution,
        mut removed: Vec<Job>,
        rng: &mut SmallRng,
        deadline: Instant,
    ) -> bool {
        if rng.random_bool(0.5) {
            sort_far_first(model, &mut removed);
        } else {
            removed.shuffle(rng);
        }

        insert_all(model, solution, &removed, deadline)
    }
}

impl RouteSolverEngine for InsertionSearchEngine {
    fn solve(&self, model: &RoutingModel, budget: SignedDuration) -> EngineOutcome {
        let start = Instant::now();
        let deadline = start + Duration::try_from(budget).unwrap_or_default();
        let mut rng = SmallRng::seed_from_u64(self.params.seed);

        if model.jobs().is_empty() {
            return EngineOutcome::Assignment(
                SearchSolution::empty(model.num_vehicles()).into_assignment(),
            );
        }

        let unroutable = model
            .jobs()
            .iter()
            .find(|job| evaluate_route(model, &job.nodes().collect::<Vec<_>>()).is_none());

        if let Some(job) = unroutable {
            debug!(
                first = %job.first(),
                last = %job.last(),
                "Job cannot be served even by a dedicated vehicle"
            );
            return EngineOutcome::Infeasible;
        }

        let Some(mut best) = self.construct(model, &mut rng, deadline) else {
            info!(mode = ?model.mode(), "No initial solution found");
            return EngineOutcome::Infeasible;
        };

        let mut current = best.clone();
        let mut iterations = 0;
        let mut iterations_without_improvement = 0;

        while iterations < self.params.max_iterations
            && iterations_without_improvement < self.params.max_iterations_without_improvement
            && Instant::now() < deadline
        {
            iterations += 1;
            iterations_without_improvement += 1;

            let mut candidate = current.clone();
            let Some(removed) = self.ruin(model, &mut candidate, &mut rng) else {
                continue;
            };

            if !self.recreate(model, &mut candidate, removed, &mut rng, deadline) {
                continue;
            }

            if candidate.total() < current.total() {
                current = candidate;

                if current.total() < best.total() {
                    best = current.clone();
                    iterations_without_improvement = 0;
                }
            }
        }

        let total = best.total();
        info!(
            mode = ?model.mode(),
            iterations,
            hard_score = total.hard_score,
            soft_score = total.soft_score,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Search finished"
        );

        if total.is_failure() {
            return EngineOutcome::Infeasible;
        }

        EngineOutcome::Assignment(best.into_assignment())
    }
}
