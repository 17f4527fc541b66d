//! Hyperperiod and per-task job counts.
//!
//! The hyperperiod `h` of a periodic task set is the least common multiple of
//! all periods.  The schedule repeats every `h` time units, so every constraint
//! family of the model is generated over exactly one hyperperiod: task `i`
//! contributes `h / p_i` jobs.
//!
//! | Failure | Variant |
//! |---------|---------|
//! | empty task list | [`InvalidInputError::NoTasks`] |
//! | zero period | [`InvalidInputError::ZeroPeriod`] |
//! | `u64` overflow while folding the LCM | [`InvalidInputError::HyperperiodOverflow`] |
//! | `h` above the configured limit | [`InvalidInputError::HyperperiodTooLarge`] |

pub mod math;

use tracing::{debug, info, warn};

use crate::model::error::InvalidInputError;
use crate::task::{Task, Time};
use math::lcm_all;

// ── Constants ─────────────────────────────────────────────────────────────────

/// Default upper limit on the hyperperiod.
///
/// The demand generator is quadratic in the number of distinct release and
/// deadline instants, which in turn grows with `h`.  Callers that want a
/// different limit pass it through [`crate::config::ModelConfig`].
pub const DEFAULT_HYPERPERIOD_LIMIT: Time = 1_000_000;

// ── HyperperiodInfo ───────────────────────────────────────────────────────────

/// Hyperperiod of one instance plus the job count of every task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HyperperiodInfo {
    /// `lcm` of all periods.
    pub hyperperiod: Time,

    /// `job_counts[i] = hyperperiod / tasks[i].period`.
    pub job_counts: Vec<usize>,
}

impl HyperperiodInfo {
    /// Largest job count over all tasks.
    pub fn max_jobs(&self) -> usize {
        self.job_counts.iter().copied().max().unwrap_or(0)
    }

    /// Total number of jobs in one hyperperiod.
    pub fn total_jobs(&self) -> usize {
        self.job_counts.iter().sum()
    }
}

/// Compute the hyperperiod of `tasks` and the job count of each task.
///
/// # Errors
/// See the module table.  Periods are checked before any arithmetic, so the
/// LCM never sees a zero.
pub fn enumerate(tasks: &[Task], limit: Time) -> Result<HyperperiodInfo, InvalidInputError> {
    if tasks.is_empty() {
        warn!("No tasks to compute a hyperperiod for");
        return Err(InvalidInputError::NoTasks);
    }
    if let Some(idx) = tasks.iter().position(|t| t.period == 0) {
        return Err(InvalidInputError::ZeroPeriod { task: idx + 1 });
    }

    let mut unique: Vec<Time> = tasks.iter().map(|t| t.period).collect();
    unique.sort_unstable();
    unique.dedup();

    let hyperperiod = lcm_all(&unique)?;

    if hyperperiod > limit {
        warn!(hyperperiod, limit, "Hyperperiod exceeds configured limit");
        return Err(InvalidInputError::HyperperiodTooLarge {
            value: hyperperiod,
            limit,
        });
    }

    let job_counts: Vec<usize> = tasks
        .iter()
        .map(|t| (hyperperiod / t.period) as usize)
        .collect();

    info!(
        hyperperiod,
        task_count = tasks.len(),
        unique_periods = unique.len(),
        total_jobs = job_counts.iter().sum::<usize>(),
        "Calculated hyperperiod"
    );
    for (i, n) in job_counts.iter().enumerate() {
        debug!(task = i + 1, period = tasks[i].period, jobs = n, "  job count");
    }

    Ok(HyperperiodInfo {
        hyperperiod,
        job_counts,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
