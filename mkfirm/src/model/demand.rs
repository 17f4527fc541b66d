//! EDF processor-demand constraints (family C3) and the AND-linearization of
//! their product terms (family C6).
//!
//! For processor `l` and critical points `t1 < t2`:
//!
//! ```text
//! J(t1,t2) = { (i,j) : release(i,j) ≥ t1  ∧  deadline(i,j) ≤ t2 }
//!
//!   Σ_{(i,j) ∈ J}  e_i · X[i,l] · Y[i,j]   ≤   t2 − t1
//! ```
//!
//! Under [`ProductEncoding::Linearized`] every product is replaced by
//! `W[i,j,l]` together with
//!
//! ```text
//! W ≤ X      W ≤ Y      W ≥ X + Y − 1
//! ```
//!
//! Intervals whose job set is empty would only ever read `0 ≤ t2 − t1` and
//! are not emitted.

use tracing::debug;

use super::constraint::{AndSide, Constraint, ConstraintId, Expr, Relation};
use super::BuildContext;
use crate::config::ProductEncoding;
use crate::task::Time;

/// One candidate interval with the jobs confined to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemandInterval {
    pub t1: Time,
    pub t2: Time,
    /// `(task, job)` pairs, ordered by task then job.
    pub jobs: Vec<(usize, usize)>,
}

/// Every `t1 < t2` pair from `points` whose job set is non-empty.
///
/// The job sets do not depend on the processor, so they are computed once
/// and shared by all processors.
pub fn intervals(ctx: &BuildContext<'_>, points: &[Time]) -> Vec<DemandInterval> {
    let mut out = Vec::new();
    for (a, &t1) in points.iter().enumerate() {
        for &t2 in &points[a + 1..] {
            let jobs: Vec<(usize, usize)> = ctx
                .tasks
                .iter()
                .enumerate()
                .flat_map(|(i, task)| {
                    task.jobs_within(t1, t2, ctx.info.job_counts[i])
                        .map(move |j| (i, j))
                })
                .collect();
            if !jobs.is_empty() {
                out.push(DemandInterval { t1, t2, jobs });
            }
        }
    }
    out
}

/// Generate the C3 rows for every processor.
pub fn generate(ctx: &BuildContext<'_>, points: &[Time]) -> Vec<Constraint> {
    let candidates = intervals(ctx, points);
    let encoding = ctx.config.product_encoding;
    let mut out = Vec::with_capacity(candidates.len() * ctx.vars.processors());

    for processor in 0..ctx.vars.processors() {
        for interval in &candidates {
            let mut expr = Expr::new();
            for &(task, job) in &interval.jobs {
                let e = ctx.tasks[task].execution_time as i64;
                match encoding {
                    ProductEncoding::Linearized => {
                        expr.add(ctx.vars.w(task, job, processor), e);
                    }
                    ProductEncoding::Native => {
                        expr.add_product(
                            ctx.vars.x(task, processor),
                            ctx.vars.y(task, job),
                            e,
                        );
                    }
                }
            }
            out.push(Constraint::new(
                ConstraintId::Demand {
                    processor,
                    t1: interval.t1,
                    t2: interval.t2,
                },
                expr,
                Relation::LessEq,
                (interval.t2 - interval.t1) as i64,
            ));
        }
    }

    debug!(
        count = out.len(),
        intervals = candidates.len(),
        time_points = points.len(),
        encoding = ?encoding,
        "C3 demand constraints"
    );
    out
}

/// Generate the three C6 rows tying each `W[i,j,l]` to `X[i,l] ∧ Y[i,j]`.
///
/// Returns nothing under [`ProductEncoding::Native`].
pub fn linearize(ctx: &BuildContext<'_>) -> Vec<Constraint> {
    if ctx.config.product_encoding != ProductEncoding::Linearized {
        return Vec::new();
    }
    let vars = ctx.vars;
    let mut out = Vec::new();

    for task in 0..vars.tasks() {
        for job in 0..vars.jobs(task) {
            for processor in 0..vars.processors() {
                let w = vars.w(task, job, processor);
                let x = vars.x(task, processor);
                let y = vars.y(task, job);
                let id = |side| ConstraintId::AcceptedOn {
                    task,
                    job,
                    processor,
                    side,
                };

                let mut le_x = Expr::new();
                le_x.add(w, 1).add(x, -1);
                out.push(Constraint::new(id(AndSide::Assign), le_x, Relation::LessEq, 0));

                let mut le_y = Expr::new();
                le_y.add(w, 1).add(y, -1);
                out.push(Constraint::new(id(AndSide::Accept), le_y, Relation::LessEq, 0));

                let mut ge_xy = Expr::new();
                ge_xy.add(w, 1).add(x, -1).add(y, -1);
                out.push(Constraint::new(id(AndSide::Both), ge_xy, Relation::GreaterEq, -1));
            }
        }
    }

    debug!(count = out.len(), "C6 linearization constraints");
    out
}

// ── Tests ─────────────────────────────────────────────────────────────────────
