//! (m,k)-firm window constraints (family C2).
//!
//! For task `i` with `n_i` jobs per hyperperiod, every run of `k_i`
//! consecutive jobs must contain at least `m_i` accepted ones:
//!
//! ```text
//! Σ_{j = z}^{z + k_i − 1} Y[i,j] ≥ m_i        z = 0 ..= n_i − k_i
//! ```
//!
//! Under [`WindowPolicy::WrapAround`] the windows whose tail runs past the
//! last job are added too, with job indices taken modulo `n_i` (the next
//! hyperperiod repeats the same acceptance pattern).

use std::ops::Range;

use tracing::{debug, warn};

use super::constraint::{Constraint, ConstraintId, Expr, Relation};
use super::error::{InvalidInputError, ModelConstructionError, ModelError};
use super::BuildContext;
use crate::config::WindowPolicy;

/// Start indices of the windows that fit inside one hyperperiod.
///
/// Empty when `k > jobs` (or `k == 0`).
pub fn window_starts(jobs: usize, k: usize) -> Range<usize> {
    if k == 0 || k > jobs {
        0..0
    } else {
        0..jobs - k + 1
    }
}

/// Start indices of the windows that cross into the next hyperperiod.
pub fn wrapping_starts(jobs: usize, k: usize) -> Range<usize> {
    if k <= 1 {
        return 0..0;
    }
    window_starts(jobs, k).end..jobs
}

/// `Σ Y` over the `k` jobs starting at `start`, wrapping modulo `jobs`.
///
/// A job covered more than once (only possible when `k > jobs`) gets its
/// multiplicity as coefficient.
fn window_expr(ctx: &BuildContext<'_>, task: usize, start: usize, k: usize, jobs: usize) -> Expr {
    let mut counts = vec![0i64; jobs];
    for j in start..start + k {
        counts[j % jobs] += 1;
    }
    let mut expr = Expr::new();
    for (job, &c) in counts.iter().enumerate() {
        if c > 0 {
            expr.add(ctx.vars.y(task, job), c);
        }
    }
    expr
}

/// Generate all C2 rows for every task.
///
/// # Errors
/// * [`InvalidInputError::MExceedsK`] if a task has `m > k`.
/// * [`ModelConstructionError::WindowExceedsHyperperiod`] if `k > n_i` under
///   [`WindowPolicy::RejectShort`].
pub fn generate(ctx: &BuildContext<'_>) -> Result<Vec<Constraint>, ModelError> {
    let policy = ctx.config.window_policy;
    let mut out = Vec::new();

    for (i, task) in ctx.tasks.iter().enumerate() {
        if task.m > task.k {
            return Err(InvalidInputError::MExceedsK {
                task: i + 1,
                m: task.m,
                k: task.k,
            }
            .into());
        }
        let jobs = ctx.info.job_counts[i];

        if task.k > jobs {
            match policy {
                WindowPolicy::RejectShort => {
                    return Err(ModelConstructionError::WindowExceedsHyperperiod {
                        task: i + 1,
                        k: task.k,
                        jobs,
                    }
                    .into());
                }
                WindowPolicy::WithinHyperperiod => {
                    warn!(
                        task = i + 1,
                        k = task.k,
                        jobs,
                        "window longer than the hyperperiod, (m,k) guarantee left unconstrained"
                    );
                }
                WindowPolicy::WrapAround => {}
            }
        }

        let rhs = task.m as i64;
        for start in window_starts(jobs, task.k) {
            out.push(Constraint::new(
                ConstraintId::Window {
                    task: i,
                    start,
                    wraps: false,
                },
                window_expr(ctx, i, start, task.k, jobs),
                Relation::GreaterEq,
                rhs,
            ));
        }
        if policy == WindowPolicy::WrapAround {
            for start in wrapping_starts(jobs, task.k) {
                out.push(Constraint::new(
                    ConstraintId::Window {
                        task: i,
                        start,
                        wraps: true,
                    },
                    window_expr(ctx, i, start, task.k, jobs),
                    Relation::GreaterEq,
                    rhs,
                ));
            }
        }
    }

    debug!(count = out.len(), policy = ?policy, "C2 window constraints");
    Ok(out)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelConfig;
    use crate::hyperperiod::{self, HyperperiodInfo};
    use crate::model::vars::VarTable;
    use crate::task::Task;

    struct Fixture {
        tasks: Vec<Task>,
        info: HyperperiodInfo,
        vars: VarTable,
        config: ModelConfig,
    }

    impl Fixture {
        fn new(tasks: Vec<Task>, window_policy: WindowPolicy) -> Self {
            let info = hyperperiod::enumerate(&tasks, 1_000_000).unwrap();
            let vars = VarTable::new(&info.job_counts, 1, false);
            let config = ModelConfig {
                window_policy,
                ..Default::default()
            };
            Self {
                tasks,
                info,
                vars,
                config,
            }
        }

        fn ctx(&self) -> BuildContext<'_> {
            BuildContext {
                tasks: &self.tasks,
                info: &self.info,
                vars: &self.vars,
                config: &self.config,
            }
        }
    }

    fn job_indices(f: &Fixture, task: usize, c: &Constraint) -> Vec<usize> {
        c.expr
            .terms
            .iter()
            .map(|&(v, _)| {
                (0..f.vars.jobs(task))
                    .find(|&j| f.vars.y(task, j) == v)
                    .expect("window term is not a Y of its task")
            })
            .collect()
    }

    #[test]
    fn window_starts_cover_every_fitting_window() {
        assert_eq!(window_starts(3, 2), 0..2);
        assert_eq!(window_starts(3, 3), 0..1);
        assert!(window_starts(2, 3).is_empty());
        assert_eq!(window_starts(5, 1), 0..5);
    }

    #[test]
    fn wrapping_starts_count() {
        // k ≤ n → k − 1 wrapping windows
        assert_eq!(wrapping_starts(5, 3), 3..5);
        assert!(wrapping_starts(5, 1).is_empty());
        // k > n → every start wraps
        assert_eq!(wrapping_starts(2, 3), 0..2);
    }

    #[test]
    fn worked_example_windows() {
        let f = Fixture::new(
            vec![Task::new(2, 4, 1, 2), Task::new(5, 6, 1, 2)],
            WindowPolicy::WithinHyperperiod,
        );
        let rows = generate(&f.ctx()).unwrap();
        // task 1: 3 jobs → 2 windows; task 2: 2 jobs → 1 window
        assert_eq!(rows.len(), 3);

        let t1: Vec<Vec<usize>> = rows
            .iter()
            .filter(|c| matches!(c.id, ConstraintId::Window { task: 0, .. }))
            .map(|c| job_indices(&f, 0, c))
            .collect();
        assert_eq!(t1, vec![vec![0, 1], vec![1, 2]]);

        for c in &rows {
            assert_eq!(c.relation, Relation::GreaterEq);
            assert_eq!(c.rhs, 1);
        }
    }

    #[test]
    fn every_window_spans_k_consecutive_jobs() {
        let f = Fixture::new(
            vec![Task::new(1, 2, 2, 3), Task::new(1, 12, 1, 1), Task::new(1, 3, 1, 4)],
            WindowPolicy::WithinHyperperiod,
        );
        let rows = generate(&f.ctx()).unwrap();
        for c in &rows {
            let ConstraintId::Window { task, start, wraps } = c.id else {
                panic!("unexpected family {:?}", c.id);
            };
            assert!(!wraps);
            let k = f.tasks[task].k;
            let n = f.info.job_counts[task];
            assert!(start + k <= n, "window {start} of task {task} overruns");
            assert_eq!(job_indices(&f, task, c), (start..start + k).collect::<Vec<_>>());
        }
        // task 3 (k = 4, n = 4) must still get exactly one window
        assert_eq!(
            rows.iter()
                .filter(|c| matches!(c.id, ConstraintId::Window { task: 2, .. }))
                .count(),
            1
        );
    }

    #[test]
    fn window_equal_to_job_count_yields_exactly_one_row() {
        let f = Fixture::new(vec![Task::new(1, 4, 1, 1)], WindowPolicy::WithinHyperperiod);
        let rows = generate(&f.ctx()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].expr.terms, vec![(f.vars.y(0, 0), 1)]);
    }

    #[test]
    fn window_longer_than_hyperperiod_emits_nothing() {
        let f = Fixture::new(vec![Task::new(1, 4, 1, 3)], WindowPolicy::WithinHyperperiod);
        assert!(generate(&f.ctx()).unwrap().is_empty());
    }

    #[test]
    fn reject_short_policy_fails_on_long_window() {
        let f = Fixture::new(vec![Task::new(1, 4, 1, 3)], WindowPolicy::RejectShort);
        assert_eq!(
            generate(&f.ctx()),
            Err(ModelError::Construction(
                ModelConstructionError::WindowExceedsHyperperiod {
                    task: 1,
                    k: 3,
                    jobs: 1
                }
            ))
        );
    }

    #[test]
    fn m_above_k_is_invalid_input() {
        let f = Fixture::new(vec![Task::new(1, 4, 1, 1)], WindowPolicy::WithinHyperperiod);
        let tasks = vec![Task::new(1, 4, 2, 1)];
        let ctx = BuildContext {
            tasks: &tasks,
            ..f.ctx()
        };
        assert!(matches!(
            generate(&ctx),
            Err(ModelError::InvalidInput(InvalidInputError::MExceedsK { .. }))
        ));
    }

    #[test]
    fn wrap_around_adds_boundary_windows() {
        // 3 jobs, k = 2 → windows {1,2}, {2,3} plus wrapping {3,1}
        let f = Fixture::new(
            vec![Task::new(2, 4, 1, 2), Task::new(1, 12, 1, 1)],
            WindowPolicy::WrapAround,
        );
        let all = generate(&f.ctx()).unwrap();
        let rows: Vec<&Constraint> = all
            .iter()
            .filter(|c| matches!(c.id, ConstraintId::Window { task: 0, .. }))
            .collect();
        assert_eq!(rows.len(), 3);
        let last = rows[2];
        assert!(matches!(last.id, ConstraintId::Window { start: 2, wraps: true, .. }));
        let mut jobs = job_indices(&f, 0, last);
        jobs.sort_unstable();
        assert_eq!(jobs, vec![0, 2]);
    }

    #[test]
    fn wrap_around_counts_repeated_jobs_when_k_exceeds_n() {
        // 1 job per hyperperiod, (m,k) = (2,3): every window is the same job
        // seen three times → 3·Y ≥ 2
        let f = Fixture::new(vec![Task::new(1, 4, 2, 3)], WindowPolicy::WrapAround);
        let rows = generate(&f.ctx()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].expr.terms, vec![(f.vars.y(0, 0), 3)]);
        assert_eq!(rows[0].rhs, 2);
    }
}
