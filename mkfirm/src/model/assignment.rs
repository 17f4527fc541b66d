//! Task-to-processor assignment (C1) and processor activation (C4, C5).
//!
//! ```text
//! C1:  Σ_l X[i,l] = 1                 every task on exactly one processor
//! C4:  Σ_i X[i,l] − M·Z[l] ≤ 0        a used processor is active
//! C5:  Z[l] − Σ_i X[i,l] ≤ 0          an active processor is used
//! ```
//!
//! `M = n + 1` is strictly larger than the number of tasks any processor can
//! host, so C4 never binds when `Z[l] = 1`.

use tracing::debug;

use super::constraint::{Constraint, ConstraintId, Expr, Relation};
use super::BuildContext;

/// Big-M of the activation linkage for `tasks` tasks.
pub fn big_m(tasks: usize) -> i64 {
    tasks as i64 + 1
}

/// One C1 row per task.
pub fn task_assignment(ctx: &BuildContext<'_>) -> Vec<Constraint> {
    let vars = ctx.vars;
    let out: Vec<Constraint> = (0..vars.tasks())
        .map(|task| {
            Constraint::new(
                ConstraintId::TaskAssignment { task },
                Expr::sum((0..vars.processors()).map(|l| vars.x(task, l))),
                Relation::Eq,
                1,
            )
        })
        .collect();
    debug!(count = out.len(), "C1 assignment constraints");
    out
}

/// C4 and C5 rows, interleaved per processor.
pub fn processor_linkage(ctx: &BuildContext<'_>) -> Vec<Constraint> {
    let vars = ctx.vars;
    let m = big_m(vars.tasks());
    let mut out = Vec::with_capacity(2 * vars.processors());

    for processor in 0..vars.processors() {
        let hosted = || Expr::sum((0..vars.tasks()).map(|i| vars.x(i, processor)));

        let mut usage = hosted();
        usage.add(vars.z(processor), -m);
        out.push(Constraint::new(
            ConstraintId::ProcessorUsage { processor },
            usage,
            Relation::LessEq,
            0,
        ));

        let mut activation = Expr::new();
        activation.add(vars.z(processor), 1);
        for (x, _) in hosted().terms {
            activation.add(x, -1);
        }
        out.push(Constraint::new(
            ConstraintId::ProcessorActivation { processor },
            activation,
            Relation::LessEq,
            0,
        ));
    }

    debug!(count = out.len(), big_m = m, "C4/C5 processor linkage constraints");
    out
}

// ── Tests ─────────────────────────────────────────────────────────────────────
