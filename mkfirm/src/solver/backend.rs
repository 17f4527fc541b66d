//! [`MilpSolver`] backed by the `good_lp` modelling layer.
//!
//! Declarations and rows are buffered until
//! [`optimize`](MilpSolver::optimize), which builds a fresh `good_lp` problem
//! from them on every call, because `good_lp` consumes the variable set when
//! the objective turns it into a problem.  The bundled backend is the
//! pure-Rust `microlp` branch-and-bound solver; it takes no product terms, so
//! models must use [`ProductEncoding::Linearized`](crate::config::ProductEncoding).

use good_lp::{
    constraint, default_solver, variable, Expression, ProblemVariables, ResolutionError, Solution,
    SolverModel, Variable,
};
use tracing::{debug, warn};

use super::{Direction, MilpSolver, SolverError, Status};
use crate::model::Relation;

struct Row {
    terms: Vec<(usize, f64)>,
    relation: Relation,
    bound: f64,
    name: String,
}

pub struct GoodLpSolver {
    names: Vec<String>,
    rows: Vec<Row>,
    objective: Vec<(usize, f64)>,
    values: Option<Vec<f64>>,
}

fn expression(handles: &[Variable], terms: &[(usize, f64)]) -> Expression {
    let mut expr = Expression::from(0.0);
    for &(var, coeff) in terms {
        expr.add_mul(coeff, handles[var]);
    }
    expr
}

impl GoodLpSolver {
    pub fn new() -> Self {
        Self {
            names: Vec::new(),
            rows: Vec::new(),
            objective: Vec::new(),
            values: None,
        }
    }
}

impl Default for GoodLpSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl MilpSolver for GoodLpSolver {
    /// Index into the declared variables.
    type Var = usize;

    fn declare_binary(&mut self, name: &str) -> usize {
        self.names.push(name.to_string());
        self.names.len() - 1
    }

    fn add_linear_constraint(
        &mut self,
        terms: &[(usize, f64)],
        relation: Relation,
        bound: f64,
        name: &str,
    ) {
        self.rows.push(Row {
            terms: terms.to_vec(),
            relation,
            bound,
            name: name.to_string(),
        });
    }

    fn set_objective(&mut self, terms: &[(usize, f64)], direction: Direction) {
        match direction {
            Direction::Minimize => self.objective = terms.to_vec(),
        }
    }

    fn optimize(&mut self) -> Result<Status, SolverError> {
        self.values = None;

        let mut vars = ProblemVariables::new();
        let handles: Vec<Variable> = self
            .names
            .iter()
            .map(|name| vars.add(variable().binary().name(name.as_str())))
            .collect();

        let objective = expression(&handles, &self.objective);
        let mut problem = vars.minimise(objective).using(default_solver);

        for row in &self.rows {
            let lhs = expression(&handles, &row.terms);
            let bound = row.bound;
            problem = problem.with(match row.relation {
                Relation::LessEq => constraint!(lhs <= bound),
                Relation::Eq => constraint!(lhs == bound),
                Relation::GreaterEq => constraint!(lhs >= bound),
            });
        }
        debug!(
            variables = handles.len(),
            rows = self.rows.len(),
            first = self.rows.first().map(|r| r.name.as_str()),
            "good_lp problem built"
        );

        match problem.solve() {
            Ok(solution) => {
                self.values = Some(handles.iter().map(|&v| solution.value(v)).collect());
                Ok(Status::Optimal)
            }
            Err(ResolutionError::Infeasible) => Ok(Status::Infeasible),
            Err(ResolutionError::Unbounded) => Ok(Status::Unbounded),
            Err(e) => {
                warn!(error = %e, "good_lp backend failed");
                Err(SolverError::Backend(e.to_string()))
            }
        }
    }

    fn value_of(&self, var: usize) -> Option<f64> {
        self.values.as_ref()?.get(var).copied()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
