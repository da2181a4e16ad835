//! Exact branch-and-bound search over boolean variables.
//!
//! Depth-first in variable-index order, trying value 1 before 0, with an
//! optimistic objective bound and per-constraint feasibility pruning. The
//! incumbent is replaced only on strict improvement, so among optimal
//! assignments the first one found wins: the solver deterministically
//! prefers setting the earliest variable to 1.

use std::time::{Duration, Instant};

use tracing::{debug, debug_span};

use crate::settings::settings;

use super::{IlpError, IlpProblem, IlpSolution, IlpSolver, Sense};

pub struct BranchBoundSolver {
    max_nodes: u64,
    deadline: Duration,
}

impl BranchBoundSolver {
    /// Solver with budgets from the global settings.
    pub fn new() -> Self {
        let s = settings();
        Self {
            max_nodes: s.solver.max_nodes,
            deadline: Duration::from_millis(s.solver.deadline_ms),
        }
    }

    /// Solver with explicit budgets.
    pub fn with_limits(max_nodes: u64, deadline: Duration) -> Self {
        Self {
            max_nodes,
            deadline,
        }
    }
}

impl Default for BranchBoundSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl IlpSolver for BranchBoundSolver {
    fn solve(&self, problem: &IlpProblem) -> Result<IlpSolution, IlpError> {
        let n = problem.num_variables();
        let _span = debug_span!("ilp_solve", vars = n, constraints = problem.constraints().len())
            .entered();

        let mut search = Search {
            problem,
            assignment: vec![false; n],
            best: None,
            nodes: 0,
            max_nodes: self.max_nodes,
            started: Instant::now(),
            deadline: self.deadline,
        };
        search.dfs(0, 0.0)?;

        match search.best {
            Some((values, objective)) => {
                debug!(objective, nodes = search.nodes);
                Ok(IlpSolution { values, objective })
            }
            None => Err(IlpError::Infeasible),
        }
    }
}

struct Search<'a> {
    problem: &'a IlpProblem,
    assignment: Vec<bool>,
    best: Option<(Vec<bool>, f64)>,
    nodes: u64,
    max_nodes: u64,
    started: Instant,
    deadline: Duration,
}

impl Search<'_> {
    fn dfs(&mut self, idx: usize, objective: f64) -> Result<(), IlpError> {
        self.nodes += 1;
        if self.nodes > self.max_nodes {
            return Err(IlpError::NodeLimit {
                limit: self.max_nodes,
            });
        }
        // Checking the clock every 1024 nodes keeps the hot path cheap.
        if self.nodes % 1024 == 0 && self.started.elapsed() > self.deadline {
            return Err(IlpError::Deadline {
                ms: self.deadline.as_millis() as u64,
            });
        }

        if !self.feasible_so_far(idx) {
            return Ok(());
        }
        if let Some((_, best_obj)) = &self.best {
            if self.optimistic_bound(idx, objective) <= *best_obj {
                return Ok(());
            }
        }
        if idx == self.assignment.len() {
            self.best = Some((self.assignment.clone(), objective));
            return Ok(());
        }

        let coeff = self.problem.objective()[idx];
        self.assignment[idx] = true;
        self.dfs(idx + 1, objective + coeff)?;
        self.assignment[idx] = false;
        self.dfs(idx + 1, objective)
    }

    /// Best objective still reachable from this node.
    fn optimistic_bound(&self, idx: usize, objective: f64) -> f64 {
        objective
            + self.problem.objective()[idx..]
                .iter()
                .filter(|&&c| c > 0.0)
                .sum::<f64>()
    }

    /// Interval check: with variables below `idx` fixed, can each constraint
    /// still be satisfied by some completion?
    fn feasible_so_far(&self, idx: usize) -> bool {
        for constraint in self.problem.constraints() {
            let mut min = 0.0;
            let mut max = 0.0;
            for (&var, &coeff) in constraint.indices.iter().zip(&constraint.coeffs) {
                if var < idx {
                    if self.assignment[var] {
                        min += coeff;
                        max += coeff;
                    }
                } else if coeff > 0.0 {
                    max += coeff;
                } else {
                    min += coeff;
                }
            }
            const EPS: f64 = 1e-9;
            let ok = match constraint.sense {
                Sense::Eq => min <= constraint.bound + EPS && max >= constraint.bound - EPS,
                Sense::Ge => max >= constraint.bound - EPS,
                Sense::Le => min <= constraint.bound + EPS,
            };
            if !ok {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solver() -> BranchBoundSolver {
        BranchBoundSolver::with_limits(1_000_000, Duration::from_secs(5))
    }

    #[test]
    fn test_unconstrained_takes_positive_coefficients() {
        let mut p = IlpProblem::new();
        p.add_boolean_variable(2.0);
        p.add_boolean_variable(-1.0);
        p.add_boolean_variable(0.5);
        let sol = solver().solve(&p).unwrap();
        assert_eq!(sol.values(), &[true, false, true]);
        assert!((sol.objective_value() - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_exactly_one_picks_best() {
        let mut p = IlpProblem::new();
        let a = p.add_boolean_variable(1.0);
        let b = p.add_boolean_variable(3.0);
        let c = p.add_boolean_variable(2.0);
        p.add_equality_constraint(vec![a, b, c], vec![1.0, 1.0, 1.0], 1.0);
        let sol = solver().solve(&p).unwrap();
        assert_eq!(sol.values(), &[false, true, false]);
    }

    #[test]
    fn test_clause_constraint_forces_variable() {
        // Maximize -x0 subject to x0 >= 1.
        let mut p = IlpProblem::new();
        let x = p.add_boolean_variable(-1.0);
        p.add_greater_than_constraint(vec![x], vec![1.0], 1.0);
        let sol = solver().solve(&p).unwrap();
        assert!(sol.value(0));
        assert!((sol.objective_value() + 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_infeasible() {
        let mut p = IlpProblem::new();
        let x = p.add_boolean_variable(1.0);
        p.add_greater_than_constraint(vec![x], vec![1.0], 1.0);
        p.add_less_than_constraint(vec![x], vec![1.0], 0.0);
        assert!(matches!(solver().solve(&p), Err(IlpError::Infeasible)));
    }

    #[test]
    fn test_tie_break_prefers_earliest_variable() {
        // Two variables, equal weight, exactly one allowed: the earlier
        // variable wins.
        let mut p = IlpProblem::new();
        let a = p.add_boolean_variable(1.0);
        let b = p.add_boolean_variable(1.0);
        p.add_equality_constraint(vec![a, b], vec![1.0, 1.0], 1.0);
        let sol = solver().solve(&p).unwrap();
        assert_eq!(sol.values(), &[true, false]);
    }

    #[test]
    fn test_node_limit() {
        let mut p = IlpProblem::new();
        for _ in 0..20 {
            p.add_boolean_variable(0.0);
        }
        // All-zero objective makes pruning ineffective beyond the first
        // incumbent improvement check, so a tiny budget trips.
        let tight = BranchBoundSolver::with_limits(5, Duration::from_secs(5));
        assert!(matches!(
            tight.solve(&p),
            Err(IlpError::NodeLimit { limit: 5 })
        ));
    }

    #[test]
    fn test_empty_problem() {
        let p = IlpProblem::new();
        let sol = solver().solve(&p).unwrap();
        assert!(sol.values().is_empty());
        assert_eq!(sol.objective_value(), 0.0);
    }

    #[test]
    fn test_negative_coefficient_constraint() {
        // x0 - x1 >= 0 with objective favoring x1: forces both on.
        let mut p = IlpProblem::new();
        let a = p.add_boolean_variable(0.1);
        let b = p.add_boolean_variable(1.0);
        p.add_greater_than_constraint(vec![a, b], vec![1.0, -1.0], 0.0);
        let sol = solver().solve(&p).unwrap();
        assert_eq!(sol.values(), &[true, true]);
    }
}
