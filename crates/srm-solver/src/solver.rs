use crate::error::SolverResult;
use crate::solution::Solution;
use srm_model::Problem;

/// Anything that can take an assembled problem to an optimum.
pub trait Solver {
    /// Solve starting from `start` (SI, one value per problem variable).
    fn solve_from(&self, problem: &Problem, start: &[f64]) -> SolverResult<Solution>;

    /// Solve from the default start of 1 (SI) for every variable.
    fn solve(&self, problem: &Problem) -> SolverResult<Solution> {
        self.solve_from(problem, &vec![1.0; problem.variables.len()])
    }
}
