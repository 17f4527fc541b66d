//! Critical time points of the EDF processor-demand test.
//!
//! With implicit deadlines the demand over `[t1, t2]` can only change when
//! `t1` crosses a release or `t2` crosses a deadline, so the interval
//! endpoints worth testing are exactly
//!
//! ```text
//! T = { j·p_i } ∪ { (j+1)·p_i }     over every task i and job j < n_i
//! ```
//!
//! i.e. all multiples of each period from `0` to the hyperperiod.

use std::collections::BTreeSet;

use crate::task::{Task, Time};

/// Sorted, duplicate-free set of releases and absolute deadlines.
pub fn build(tasks: &[Task], job_counts: &[usize]) -> Vec<Time> {
    let mut points = BTreeSet::new();
    for (task, &jobs) in tasks.iter().zip(job_counts) {
        for j in 0..jobs {
            points.insert(task.release(j));
            points.insert(task.deadline(j));
        }
    }
    points.into_iter().collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
