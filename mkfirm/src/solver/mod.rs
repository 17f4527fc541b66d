//! The MILP solver collaborator.
//!
//! [`MilpSolver`] is the narrow interface the model is handed to: declare
//! binaries, add rows, set the objective, optimise, read values back.
//! [`solve`] drives any implementation through that sequence and turns the
//! raw values into a [`Solution`].
//!
//! ```text
//! Model ──solve()──► declare_binary × |vars| ──► add_*_constraint × |rows|
//!                    ──► set_objective ──► optimize ──► value_of × |vars| ──► Outcome
//! ```
//!
//! The bundled backend is [`backend::GoodLpSolver`].

pub mod backend;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::model::{Model, ModelConstructionError, ModelError, Relation, VarId};

// ── Collaborator interface ────────────────────────────────────────────────────

/// Objective sense.  The partitioning model only ever minimises.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Minimize,
}

/// Terminal status of [`MilpSolver::optimize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Optimal,
    Infeasible,
    Unbounded,
    /// The backend stopped without a proven optimum (limit hit, numerical
    /// trouble, …).
    Failed,
}

#[derive(Debug, Error)]
pub enum SolverError {
    /// The model cannot be handed to this solver.
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("solver does not accept binary products (constraint {constraint})")]
    ProductsUnsupported { constraint: String },

    #[error("solver backend failed: {0}")]
    Backend(String),

    #[error("no value for variable {variable} after an optimal solve")]
    MissingValue { variable: String },

    /// `X[i,·]` is zero on every processor although C1 forces exactly one.
    #[error("optimal solution leaves task {task} without a processor")]
    Unassigned { task: usize },
}

/// A generic MILP solver.
///
/// Implementations own their variable handles; the model only ever sees
/// `Self::Var` values it got back from [`declare_binary`](Self::declare_binary).
pub trait MilpSolver {
    type Var: Copy;

    fn declare_binary(&mut self, name: &str) -> Self::Var;

    fn add_linear_constraint(
        &mut self,
        terms: &[(Self::Var, f64)],
        relation: Relation,
        bound: f64,
        name: &str,
    );

    /// Whether [`add_product_constraint`](Self::add_product_constraint)
    /// accepts binary·binary terms.
    fn supports_binary_products(&self) -> bool {
        false
    }

    fn add_product_constraint(
        &mut self,
        _terms: &[(Self::Var, f64)],
        _products: &[(Self::Var, Self::Var, f64)],
        _relation: Relation,
        _bound: f64,
        name: &str,
    ) -> Result<(), SolverError> {
        Err(SolverError::ProductsUnsupported {
            constraint: name.to_string(),
        })
    }

    fn set_objective(&mut self, terms: &[(Self::Var, f64)], direction: Direction);

    fn optimize(&mut self) -> Result<Status, SolverError>;

    /// Value of `var` in the last solution.  `None` unless the last
    /// [`optimize`](Self::optimize) returned [`Status::Optimal`].
    fn value_of(&self, var: Self::Var) -> Option<f64>;
}

// ── Results ───────────────────────────────────────────────────────────────────

/// Decoded optimal solution.  Indices are 0-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    /// Number of active processors (`Σ Z[l]`).
    pub processors_used: usize,

    /// `assignment[i]` = processor hosting task `i`.
    pub assignment: Vec<usize>,

    /// `accepted[i][j]` = job `j` of task `i` is accepted.
    pub accepted: Vec<Vec<bool>>,

    /// `active[l]` = `Z[l]`.
    pub active: Vec<bool>,
}

impl Solution {
    pub fn processor_of(&self, task: usize) -> usize {
        self.assignment[task]
    }

    pub fn is_accepted(&self, task: usize, job: usize) -> bool {
        self.accepted[task][job]
    }

    /// Tasks hosted by `processor`, in index order.
    pub fn tasks_on(&self, processor: usize) -> Vec<usize> {
        self.assignment
            .iter()
            .enumerate()
            .filter(|&(_, &l)| l == processor)
            .map(|(i, _)| i)
            .collect()
    }
}

/// Result of [`solve`].  Anything other than an optimum means no admissible
/// assignment exists (or none was found) at the given processor count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Optimal(Solution),
    Infeasible(Status),
}

impl Outcome {
    pub fn solution(&self) -> Option<&Solution> {
        match self {
            Outcome::Optimal(s) => Some(s),
            Outcome::Infeasible(_) => None,
        }
    }
}

// ── Driver ────────────────────────────────────────────────────────────────────

/// Hand `model` to `solver`, optimise and decode the result.
///
/// # Errors
/// * [`ModelConstructionError::UnlinearizedProduct`] (wrapped) if the model
///   still has product terms and the solver cannot take them.  Checked before
///   anything is declared.
/// * Backend and readback failures as [`SolverError`].
pub fn solve<S: MilpSolver>(model: &Model, solver: &mut S) -> Result<Outcome, SolverError> {
    if !solver.supports_binary_products() {
        if let Some(c) = model.constraints.iter().find(|c| !c.expr.is_linear()) {
            return Err(ModelError::from(ModelConstructionError::UnlinearizedProduct {
                constraint: c.id.to_string(),
            })
            .into());
        }
    }

    let variables = model.variables();
    let handles: Vec<S::Var> = variables
        .iter()
        .map(|v| solver.declare_binary(&v.to_string()))
        .collect();
    let handle = |id: VarId| handles[id.0];

    for c in &model.constraints {
        let terms: Vec<(S::Var, f64)> = c
            .expr
            .terms
            .iter()
            .map(|&(v, coeff)| (handle(v), coeff as f64))
            .collect();
        let name = c.id.to_string();
        if c.expr.is_linear() {
            solver.add_linear_constraint(&terms, c.relation, c.rhs as f64, &name);
        } else {
            let products: Vec<(S::Var, S::Var, f64)> = c
                .expr
                .products
                .iter()
                .map(|&(a, b, coeff)| (handle(a), handle(b), coeff as f64))
                .collect();
            solver.add_product_constraint(&terms, &products, c.relation, c.rhs as f64, &name)?;
        }
    }

    let objective: Vec<(S::Var, f64)> = model
        .objective
        .terms
        .iter()
        .map(|&(v, coeff)| (handle(v), coeff as f64))
        .collect();
    solver.set_objective(&objective, Direction::Minimize);

    debug!(
        variables = handles.len(),
        constraints = model.constraints.len(),
        "Model handed to solver"
    );

    let status = solver.optimize()?;
    info!(status = ?status, "Solver finished");
    if status != Status::Optimal {
        warn!(status = ?status, "No feasible assignment at the given processor count");
        return Ok(Outcome::Infeasible(status));
    }

    let value = |id: VarId| -> Result<bool, SolverError> {
        solver
            .value_of(handle(id))
            .map(|x| x > 0.5)
            .ok_or_else(|| SolverError::MissingValue {
                variable: variables[id.0].to_string(),
            })
    };

    let vars = &model.vars;
    let mut assignment = Vec::with_capacity(vars.tasks());
    for task in 0..vars.tasks() {
        let mut chosen = None;
        for l in 0..vars.processors() {
            if value(vars.x(task, l))? {
                chosen = Some(l);
                break;
            }
        }
        assignment.push(chosen.ok_or(SolverError::Unassigned { task: task + 1 })?);
    }

    let accepted = (0..vars.tasks())
        .map(|task| {
            (0..vars.jobs(task))
                .map(|job| value(vars.y(task, job)))
                .collect::<Result<Vec<bool>, _>>()
        })
        .collect::<Result<Vec<_>, _>>()?;

    let active = (0..vars.processors())
        .map(|l| value(vars.z(l)))
        .collect::<Result<Vec<bool>, _>>()?;

    let solution = Solution {
        processors_used: active.iter().filter(|&&a| a).count(),
        assignment,
        accepted,
        active,
    };

    info!(
        processors_used = solution.processors_used,
        accepted_jobs = solution.accepted.iter().flatten().filter(|&&a| a).count(),
        total_jobs = model.hyperperiod.total_jobs(),
        "Solution decoded"
    );
    for (i, l) in solution.assignment.iter().enumerate() {
        debug!(task = i + 1, processor = l + 1, "  assignment");
    }

    Ok(Outcome::Optimal(solution))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::backend::GoodLpSolver;
    use super::*;
    use crate::config::{ModelConfig, ProductEncoding, WindowPolicy};
    use crate::feasibility;
    use crate::model::build_model;
    use crate::task::{Instance, Task};

    /// Records every call and answers with canned values.
    #[derive(Default)]
    struct RecordingSolver {
        names: Vec<String>,
        rows: Vec<(String, Relation, f64, usize)>,
        objective: Vec<(usize, f64)>,
        products: bool,
        status: Option<Status>,
        values: Vec<f64>,
        optimized: bool,
    }

    impl MilpSolver for RecordingSolver {
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
            self.rows.push((name.to_string(), relation, bound, terms.len()));
        }

        fn supports_binary_products(&self) -> bool {
            self.products
        }

        fn add_product_constraint(
            &mut self,
            terms: &[(usize, f64)],
            products: &[(usize, usize, f64)],
            relation: Relation,
            bound: f64,
            name: &str,
        ) -> Result<(), SolverError> {
            self.rows
                .push((name.to_string(), relation, bound, terms.len() + products.len()));
            Ok(())
        }

        fn set_objective(&mut self, terms: &[(usize, f64)], direction: Direction) {
            assert_eq!(direction, Direction::Minimize);
            self.objective = terms.to_vec();
        }

        fn optimize(&mut self) -> Result<Status, SolverError> {
            self.optimized = true;
            Ok(self.status.unwrap_or(Status::Infeasible))
        }

        fn value_of(&self, var: usize) -> Option<f64> {
            self.values.get(var).copied()
        }
    }

    fn worked_example(processors: usize) -> Instance {
        Instance::new(vec![Task::new(2, 4, 1, 2), Task::new(5, 6, 1, 2)], processors)
    }

    fn solve_with_good_lp(instance: &Instance) -> Outcome {
        let model = build_model(instance, &ModelConfig::default()).unwrap();
        solve(&model, &mut GoodLpSolver::new()).unwrap()
    }

    // ── Collaborator contract ─────────────────────────────────────────────────

    #[test]
    fn every_variable_and_row_is_handed_over_once() {
        let model = build_model(&worked_example(2), &ModelConfig::default()).unwrap();
        let mut rec = RecordingSolver::default();
        let outcome = solve(&model, &mut rec).unwrap();

        assert_eq!(outcome, Outcome::Infeasible(Status::Infeasible));
        assert!(rec.optimized);
        assert_eq!(rec.names.len(), model.vars.len());
        assert_eq!(rec.names[0], "X[1,1]");
        assert_eq!(rec.rows.len(), model.constraints.len());
        assert_eq!(rec.rows[0].0, "C1_task_1");
        assert_eq!(rec.objective.len(), 2);
    }

    #[test]
    fn products_are_rejected_before_anything_is_declared() {
        let config = ModelConfig {
            product_encoding: ProductEncoding::Native,
            ..Default::default()
        };
        let model = build_model(&worked_example(2), &config).unwrap();
        let mut rec = RecordingSolver::default();
        let err = solve(&model, &mut rec).unwrap_err();

        assert!(matches!(
            err,
            SolverError::Model(ModelError::Construction(
                ModelConstructionError::UnlinearizedProduct { .. }
            ))
        ));
        assert!(rec.names.is_empty());
        assert!(!rec.optimized);
    }

    #[test]
    fn products_reach_a_solver_that_supports_them() {
        let config = ModelConfig {
            product_encoding: ProductEncoding::Native,
            ..Default::default()
        };
        let model = build_model(&worked_example(2), &config).unwrap();
        let mut rec = RecordingSolver {
            products: true,
            ..Default::default()
        };
        solve(&model, &mut rec).unwrap();
        assert_eq!(rec.rows.len(), model.constraints.len());
    }

    #[test]
    fn readback_decodes_assignment_and_acceptance() {
        let instance = Instance::new(vec![Task::new(2, 4, 1, 1)], 2);
        let model = build_model(&instance, &ModelConfig::default()).unwrap();
        let mut values = vec![0.0; model.vars.len()];
        values[model.vars.x(0, 1).0] = 1.0;
        values[model.vars.y(0, 0).0] = 1.0;
        values[model.vars.z(1).0] = 1.0;
        let mut rec = RecordingSolver {
            status: Some(Status::Optimal),
            values,
            ..Default::default()
        };
        let Outcome::Optimal(sol) = solve(&model, &mut rec).unwrap() else {
            panic!("expected optimal outcome");
        };
        assert_eq!(sol.processors_used, 1);
        assert_eq!(sol.assignment, vec![1]);
        assert_eq!(sol.accepted, vec![vec![true]]);
        assert_eq!(sol.tasks_on(1), vec![0]);
        assert!(sol.tasks_on(0).is_empty());
    }

    #[test]
    fn readback_without_assignment_is_an_error() {
        let instance = Instance::new(vec![Task::new(2, 4, 1, 1)], 1);
        let model = build_model(&instance, &ModelConfig::default()).unwrap();
        let mut rec = RecordingSolver {
            status: Some(Status::Optimal),
            values: vec![0.0; model.vars.len()],
            ..Default::default()
        };
        assert!(matches!(
            solve(&model, &mut rec),
            Err(SolverError::Unassigned { task: 1 })
        ));
    }

    #[test]
    fn readback_missing_value_is_an_error() {
        let instance = Instance::new(vec![Task::new(2, 4, 1, 1)], 1);
        let model = build_model(&instance, &ModelConfig::default()).unwrap();
        let mut rec = RecordingSolver {
            status: Some(Status::Optimal),
            ..Default::default()
        };
        assert!(matches!(
            solve(&model, &mut rec),
            Err(SolverError::MissingValue { .. })
        ));
    }

    // ── End-to-end with good_lp ───────────────────────────────────────────────

    #[test]
    fn scenario_a_uses_one_processor_and_accepts_the_job() {
        let outcome = solve_with_good_lp(&Instance::new(vec![Task::new(2, 4, 1, 1)], 1));
        let sol = outcome.solution().expect("scenario A is feasible");
        assert_eq!(sol.processors_used, 1);
        assert_eq!(sol.assignment, vec![0]);
        assert!(sol.is_accepted(0, 0));
    }

    #[test]
    fn scenario_b_packs_both_tasks_onto_one_processor() {
        let instance = worked_example(2);
        let model = build_model(&instance, &ModelConfig::default()).unwrap();
        let outcome = solve(&model, &mut GoodLpSolver::new()).unwrap();
        let sol = outcome.solution().expect("worked example is feasible");

        assert_eq!(sol.processors_used, 1);
        assert_eq!(sol.processor_of(0), sol.processor_of(1));

        let violations = feasibility::verify(&model, sol);
        assert!(
            violations.iter().all(|v| v.is_wrap_around()),
            "unexpected violations: {violations:?}"
        );
        assert!(feasibility::simulate_all(&model, sol).is_empty());
    }

    #[test]
    fn scenario_b_with_wrap_around_windows_is_still_feasible() {
        let config = ModelConfig {
            window_policy: WindowPolicy::WrapAround,
            ..Default::default()
        };
        let model = build_model(&worked_example(2), &config).unwrap();
        let outcome = solve(&model, &mut GoodLpSolver::new()).unwrap();
        let sol = outcome.solution().expect("feasible with wrap-around windows");
        assert!(feasibility::verify(&model, sol).is_empty());
        assert!(feasibility::simulate_all(&model, sol).is_empty());
    }

    #[test]
    fn zero_slack_task_cannot_share_a_processor() {
        // (4,4,1,1) fills every period; (1,4,1,1) needs one more unit
        let tasks = vec![Task::new(4, 4, 1, 1), Task::new(1, 4, 1, 1)];

        let one = solve_with_good_lp(&Instance::new(tasks.clone(), 1));
        assert_eq!(one, Outcome::Infeasible(Status::Infeasible));

        let two = solve_with_good_lp(&Instance::new(tasks, 2));
        let sol = two.solution().expect("two processors suffice");
        assert_eq!(sol.processors_used, 2);
        assert_ne!(sol.processor_of(0), sol.processor_of(1));
    }

    #[test]
    fn zero_slack_task_shares_when_the_other_job_can_be_dropped() {
        // (1,4,1,2) only needs every other job, but with h = 4 it has a single
        // job and no window, so it can be dropped entirely
        let tasks = vec![Task::new(4, 4, 1, 1), Task::new(1, 4, 1, 2)];
        let model = build_model(&Instance::new(tasks, 1), &ModelConfig::default()).unwrap();
        let outcome = solve(&model, &mut GoodLpSolver::new()).unwrap();
        let sol = outcome.solution().expect("second task's job can be rejected");
        assert_eq!(sol.processors_used, 1);
        assert!(sol.is_accepted(0, 0));
        assert!(!sol.is_accepted(1, 0));
    }

    #[test]
    fn overloaded_instance_needs_more_processors() {
        // three tasks each with U = 0.75 and k = m = 1: at most one per processor
        let tasks = vec![Task::new(3, 4, 1, 1); 3];
        assert_eq!(
            solve_with_good_lp(&Instance::new(tasks.clone(), 2)),
            Outcome::Infeasible(Status::Infeasible)
        );
        let sol = solve_with_good_lp(&Instance::new(tasks, 3));
        assert_eq!(sol.solution().map(|s| s.processors_used), Some(3));
    }
}
