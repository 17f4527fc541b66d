/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Post-solve feasibility checks.
//!
//! The MILP already encodes every requirement, so these checks are an
//! independent cross-check of a decoded [`Solution`] against the instance:
//!
//! * [`verify`] re-evaluates the processor-demand criterion over every pair of
//!   critical time points and every (m,k) window, wrapping windows included.
//! * [`simulate`] runs the accepted jobs of one processor through a
//!   preemptive EDF schedule over one hyperperiod and reports deadline misses.
//!
//! Windows that wrap past the hyperperiod are only constraints under
//! [`WindowPolicy::WrapAround`](crate::config::WindowPolicy); a shortfall there
//! is reported with `wraps = true` so the caller can tell it apart.

use tracing::{debug, info, warn};

use crate::model::window::{window_starts, wrapping_starts};
use crate::model::Model;
use crate::solver::Solution;
use crate::task::{jobs_of, Time};

// ── Violations ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// Accepted work confined to `[t1, t2]` exceeds the interval length.
    Demand {
        processor: usize,
        t1: Time,
        t2: Time,
        demand: Time,
    },
    /// Fewer than `m` accepted jobs in the `k`-window starting at `start`.
    Window {
        task: usize,
        start: usize,
        accepted: usize,
        required: usize,
        wraps: bool,
    },
}

impl Violation {
    pub fn is_wrap_around(&self) -> bool {
        matches!(self, Violation::Window { wraps: true, .. })
    }
}

/// A job that completed after its deadline in [`simulate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeadlineMiss {
    pub processor: usize,
    pub task: usize,
    pub job: usize,
    pub deadline: Time,
    pub completion: Time,
}

// ── Demand and window check ───────────────────────────────────────────────────

/// Work of the accepted jobs on `processor` that lie fully inside `[t1, t2]`.
pub fn demand(model: &Model, solution: &Solution, processor: usize, t1: Time, t2: Time) -> Time {
    solution
        .tasks_on(processor)
        .into_iter()
        .map(|i| {
            let task = &model.tasks[i];
            let accepted = task
                .jobs_within(t1, t2, model.hyperperiod.job_counts[i])
                .filter(|&j| solution.is_accepted(i, j))
                .count() as Time;
            accepted * task.execution_time
        })
        .sum()
}

/// Every demand or window requirement `solution` breaks.
pub fn verify(model: &Model, solution: &Solution) -> Vec<Violation> {
    let mut out = Vec::new();
    let points = &model.time_points;

    for processor in 0..model.processors() {
        for (a, &t1) in points.iter().enumerate() {
            for &t2 in &points[a + 1..] {
                let d = demand(model, solution, processor, t1, t2);
                if d > t2 - t1 {
                    out.push(Violation::Demand {
                        processor,
                        t1,
                        t2,
                        demand: d,
                    });
                }
            }
        }
    }

    for (i, task) in model.tasks.iter().enumerate() {
        let jobs = model.hyperperiod.job_counts[i];
        let starts = window_starts(jobs, task.k)
            .map(|s| (s, false))
            .chain(wrapping_starts(jobs, task.k).map(|s| (s, true)));
        for (start, wraps) in starts {
            // a window longer than the job count revisits jobs; count each visit
            let accepted = (start..start + task.k)
                .filter(|&j| solution.is_accepted(i, j % jobs))
                .count();
            if accepted < task.m {
                out.push(Violation::Window {
                    task: i,
                    start,
                    accepted,
                    required: task.m,
                    wraps,
                });
            }
        }
    }

    for v in &out {
        if v.is_wrap_around() {
            debug!(violation = ?v, "Wrapping window not met");
        } else {
            warn!(violation = ?v, "Solution violates a requirement");
        }
    }
    out
}

// ── EDF simulation ────────────────────────────────────────────────────────────

struct Pending {
    task: usize,
    job: usize,
    release: Time,
    deadline: Time,
    remaining: Time,
}

/// Preemptive EDF over the accepted jobs on `processor`.
///
/// Ties on the deadline go to the lower task index, then the earlier job.
pub fn simulate(model: &Model, solution: &Solution, processor: usize) -> Vec<DeadlineMiss> {
    let mut pending: Vec<Pending> = solution
        .tasks_on(processor)
        .into_iter()
        .flat_map(|i| {
            let task = &model.tasks[i];
            jobs_of(i, task, model.hyperperiod.job_counts[i])
                .filter(move |job| solution.is_accepted(job.task, job.job))
                .map(move |job| Pending {
                    task: job.task,
                    job: job.job,
                    release: job.release,
                    deadline: job.deadline,
                    remaining: task.execution_time,
                })
        })
        .collect();
    // latest release last, so pop() yields the next arrival
    pending.sort_by_key(|p| std::cmp::Reverse((p.release, p.task, p.job)));

    let mut ready: Vec<Pending> = Vec::new();
    let mut misses = Vec::new();
    let mut now: Time = 0;

    loop {
        while pending.last().is_some_and(|p| p.release <= now) {
            if let Some(p) = pending.pop() {
                ready.push(p);
            }
        }
        let Some(pos) = ready
            .iter()
            .enumerate()
            .min_by_key(|(_, p)| (p.deadline, p.task, p.job))
            .map(|(pos, _)| pos)
        else {
            match pending.last() {
                Some(next) => {
                    now = next.release;
                    continue;
                }
                None => break,
            }
        };

        let next_arrival = pending.last().map_or(Time::MAX, |p| p.release);
        let job = &mut ready[pos];
        let run = job.remaining.min(next_arrival - now);
        now += run;
        job.remaining -= run;

        if job.remaining == 0 {
            let done = ready.swap_remove(pos);
            if now > done.deadline {
                misses.push(DeadlineMiss {
                    processor,
                    task: done.task,
                    job: done.job,
                    deadline: done.deadline,
                    completion: now,
                });
            }
        }
    }

    misses
}

/// [`simulate`] on every active processor.
pub fn simulate_all(model: &Model, solution: &Solution) -> Vec<DeadlineMiss> {
    let misses: Vec<DeadlineMiss> = (0..model.processors())
        .filter(|&l| solution.active[l])
        .flat_map(|l| simulate(model, solution, l))
        .collect();
    if misses.is_empty() {
        info!(
            processors = solution.processors_used,
            hyperperiod = model.hyperperiod.hyperperiod,
            "EDF simulation: all accepted jobs meet their deadlines"
        );
    } else {
        warn!(misses = misses.len(), "EDF simulation: deadline misses");
    }
    misses
}

// ── Tests ─────────────────────────────────────────────────────────────────────
