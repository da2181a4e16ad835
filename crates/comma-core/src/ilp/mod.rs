//! Integer-linear-program representation and solving.
//!
//! `IlpProblem` collects boolean variables with objective coefficients and
//! linear constraints; `IlpSolver` is the seam behind which a solver sits.
//! The in-process default is [`BranchBoundSolver`].

mod solver;

pub use solver::BranchBoundSolver;

/// Constraint sense: dot-product compared against the bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    Eq,
    Ge,
    Le,
}

/// `sum(coeffs[k] * x[indices[k]]) <sense> bound`.
#[derive(Debug, Clone)]
pub struct LinearConstraint {
    pub indices: Vec<usize>,
    pub coeffs: Vec<f64>,
    pub sense: Sense,
    pub bound: f64,
}

/// A maximization problem over boolean variables.
#[derive(Debug, Default, Clone)]
pub struct IlpProblem {
    objective: Vec<f64>,
    constraints: Vec<LinearConstraint>,
}

impl IlpProblem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a boolean variable with the given objective coefficient,
    /// returning its index.
    pub fn add_boolean_variable(&mut self, coefficient: f64) -> usize {
        self.objective.push(coefficient);
        self.objective.len() - 1
    }

    pub fn num_variables(&self) -> usize {
        self.objective.len()
    }

    pub fn objective(&self) -> &[f64] {
        &self.objective
    }

    pub fn constraints(&self) -> &[LinearConstraint] {
        &self.constraints
    }

    fn add_constraint(
        &mut self,
        indices: Vec<usize>,
        coeffs: Vec<f64>,
        sense: Sense,
        bound: f64,
    ) {
        assert_eq!(indices.len(), coeffs.len(), "index/coefficient length mismatch");
        assert!(
            indices.iter().all(|&i| i < self.objective.len()),
            "constraint references unknown variable"
        );
        self.constraints.push(LinearConstraint {
            indices,
            coeffs,
            sense,
            bound,
        });
    }

    pub fn add_equality_constraint(&mut self, indices: Vec<usize>, coeffs: Vec<f64>, bound: f64) {
        self.add_constraint(indices, coeffs, Sense::Eq, bound);
    }

    pub fn add_greater_than_constraint(
        &mut self,
        indices: Vec<usize>,
        coeffs: Vec<f64>,
        bound: f64,
    ) {
        self.add_constraint(indices, coeffs, Sense::Ge, bound);
    }

    pub fn add_less_than_constraint(&mut self, indices: Vec<usize>, coeffs: Vec<f64>, bound: f64) {
        self.add_constraint(indices, coeffs, Sense::Le, bound);
    }
}

/// A feasible assignment maximizing the objective.
#[derive(Debug, Clone)]
pub struct IlpSolution {
    values: Vec<bool>,
    objective: f64,
}

impl IlpSolution {
    pub fn value(&self, index: usize) -> bool {
        self.values[index]
    }

    pub fn values(&self) -> &[bool] {
        &self.values
    }

    pub fn objective_value(&self) -> f64 {
        self.objective
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum IlpError {
    #[error("problem is infeasible")]
    Infeasible,

    #[error("search-node budget exhausted ({limit} nodes)")]
    NodeLimit { limit: u64 },

    #[error("solve deadline exceeded ({ms} ms)")]
    Deadline { ms: u64 },
}

/// Solves Integer Linear Programming problems.
pub trait IlpSolver: Send + Sync {
    fn solve(&self, problem: &IlpProblem) -> Result<IlpSolution, IlpError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_problem_builder() {
        let mut p = IlpProblem::new();
        let a = p.add_boolean_variable(1.0);
        let b = p.add_boolean_variable(-0.5);
        assert_eq!((a, b), (0, 1));
        assert_eq!(p.num_variables(), 2);
        p.add_equality_constraint(vec![a, b], vec![1.0, 1.0], 1.0);
        assert_eq!(p.constraints().len(), 1);
        assert_eq!(p.constraints()[0].sense, Sense::Eq);
    }

    #[test]
    #[should_panic(expected = "unknown variable")]
    fn test_rejects_unknown_variable() {
        let mut p = IlpProblem::new();
        p.add_boolean_variable(1.0);
        p.add_greater_than_constraint(vec![3], vec![1.0], 1.0);
    }
}
