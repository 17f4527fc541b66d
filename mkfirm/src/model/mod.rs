//! Model assembler: turns an [`Instance`] into a finished MILP [`Model`].
//!
//! [`build_model`] is the single entry point.  It validates the instance,
//! computes the hyperperiod once, lays out the variables, and asks each
//! generator for its constraint family.  No generator mutates shared state:
//! each one borrows an immutable [`BuildContext`] and returns its rows, which
//! the assembler concatenates in a fixed order:
//!
//! | Order | Family | Generator |
//! |---|---|---|
//! | 1 | C1 task assignment | [`assignment::task_assignment`] |
//! | 2 | C2 (m,k) windows | [`window::generate`] |
//! | 3 | C3 processor demand | [`demand::generate`] |
//! | 4 | C6 `W = X ∧ Y` | [`demand::linearize`] |
//! | 5 | C4 / C5 processor linkage | [`assignment::processor_linkage`] |
//!
//! The objective is always `minimize Σ_l Z[l]`.
//!
//! # Example
//! ```rust
//! use mkfirm::config::ModelConfig;
//! use mkfirm::model::build_model;
//! use mkfirm::task::{Instance, Task};
//!
//! let instance = Instance::new(vec![Task::new(2, 4, 1, 1)], 1);
//! let model = build_model(&instance, &ModelConfig::default()).unwrap();
//! assert_eq!(model.hyperperiod.hyperperiod, 4);
//! ```

pub mod assignment;
pub mod constraint;
pub mod demand;
pub mod error;
pub mod timepoints;
pub mod vars;
pub mod window;

pub use constraint::{AndSide, Constraint, ConstraintId, Expr, Family, Relation};
pub use error::{InvalidInputError, ModelConstructionError, ModelError};
pub use vars::{Var, VarId, VarTable};

use tracing::info;

use crate::config::{ModelConfig, ProductEncoding};
use crate::hyperperiod::{self, HyperperiodInfo};
use crate::task::{Instance, Task, Time};

// ── Build context ─────────────────────────────────────────────────────────────

/// Read-only inputs shared by all constraint generators of one build.
#[derive(Debug, Clone, Copy)]
pub struct BuildContext<'a> {
    pub tasks: &'a [Task],
    pub info: &'a HyperperiodInfo,
    pub vars: &'a VarTable,
    pub config: &'a ModelConfig,
}

// ── Model ─────────────────────────────────────────────────────────────────────

/// A complete, immutable MILP formulation of one instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Model {
    pub tasks: Vec<Task>,
    pub hyperperiod: HyperperiodInfo,
    pub time_points: Vec<Time>,
    pub vars: VarTable,
    pub constraints: Vec<Constraint>,
    /// Minimised.
    pub objective: Expr,
}

impl Model {
    pub fn processors(&self) -> usize {
        self.vars.processors()
    }

    /// Every declared variable in [`VarId`] order.
    pub fn variables(&self) -> Vec<Var> {
        self.vars.all()
    }

    pub fn family(&self, family: Family) -> impl Iterator<Item = &Constraint> {
        self.constraints
            .iter()
            .filter(move |c| c.id.family() == family)
    }

    pub fn count(&self, family: Family) -> usize {
        self.family(family).count()
    }

    /// `true` when no row carries a product term.
    pub fn is_linear(&self) -> bool {
        self.constraints.iter().all(|c| c.expr.is_linear())
    }
}

// ── Assembler ─────────────────────────────────────────────────────────────────

/// Build the full model for `instance`.
///
/// # Errors
/// * [`ModelError::EmptyInstance`]: no tasks or no processors.
/// * [`ModelError::InvalidInput`]: a task fails validation, or the
///   hyperperiod overflows / exceeds `config.hyperperiod_limit`.
/// * [`ModelError::Construction`]: see [`window::generate`].
///
/// Validation happens before any constraint is generated; an error never
/// leaves a partial model behind.
pub fn build_model(instance: &Instance, config: &ModelConfig) -> Result<Model, ModelError> {
    let tasks = &instance.tasks;
    if tasks.is_empty() || instance.processors == 0 {
        return Err(ModelError::EmptyInstance {
            tasks: tasks.len(),
            processors: instance.processors,
        });
    }
    for (i, task) in tasks.iter().enumerate() {
        task.validate(i)?;
    }

    let info = hyperperiod::enumerate(tasks, config.hyperperiod_limit)?;
    let vars = VarTable::new(
        &info.job_counts,
        instance.processors,
        config.product_encoding == ProductEncoding::Linearized,
    );
    let ctx = BuildContext {
        tasks,
        info: &info,
        vars: &vars,
        config,
    };

    let windows = window::generate(&ctx)?;
    let time_points = timepoints::build(tasks, &info.job_counts);

    let mut constraints = assignment::task_assignment(&ctx);
    constraints.extend(windows);
    constraints.extend(demand::generate(&ctx, &time_points));
    constraints.extend(demand::linearize(&ctx));
    constraints.extend(assignment::processor_linkage(&ctx));

    let objective = Expr::sum((0..instance.processors).map(|l| vars.z(l)));

    info!(
        tasks = tasks.len(),
        processors = instance.processors,
        hyperperiod = info.hyperperiod,
        max_jobs = info.max_jobs(),
        variables = vars.len(),
        constraints = constraints.len(),
        time_points = time_points.len(),
        "Model assembled"
    );

    Ok(Model {
        tasks: tasks.clone(),
        hyperperiod: info,
        time_points,
        vars,
        constraints,
        objective,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
