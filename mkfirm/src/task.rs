/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Core task data structures for the (m,k)-firm partitioning model.
//!
//! Two layers model the two sides of the formulation:
//!
//! ```text
//! input file  ──►  Instance { tasks, processors }  ──(hyperperiod)──►  Job stream per task
//!                   ↑ immutable                                          ↑ derived, never stored
//! ```
//!
//! # Indexing
//! All indices in the Rust API are 0-based.  Job `j` of a task with period
//! `p` is released at `j·p` and has its absolute deadline at `(j+1)·p`
//! (implicit deadlines).  Textual names and reports add one, so the first job
//! of the first task prints as `Y[1,1]`.

use std::ops::Range;

use crate::model::error::InvalidInputError;

/// Discrete time, in whatever unit the input file uses.
pub type Time = u64;

// ── Task ──────────────────────────────────────────────────────────────────────

/// One periodic task with an (m,k)-firm guarantee.
///
/// At least `m` of every `k` consecutive jobs must be accepted, and every
/// accepted job must finish within its period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Task {
    /// Worst-case execution time of each job.
    pub execution_time: Time,

    /// Period, which is also the relative deadline.
    pub period: Time,

    /// Minimum number of accepted jobs per window.
    pub m: usize,

    /// Window length in jobs.
    pub k: usize,
}

impl Task {
    pub fn new(execution_time: Time, period: Time, m: usize, k: usize) -> Self {
        Self {
            execution_time,
            period,
            m,
            k,
        }
    }

    /// Check `0 < e ≤ p` and `0 < m ≤ k`.
    ///
    /// `index` is the 0-based position of the task in its instance and is
    /// only used to label the error.
    pub fn validate(&self, index: usize) -> Result<(), InvalidInputError> {
        let task = index + 1;
        if self.period == 0 {
            return Err(InvalidInputError::ZeroPeriod { task });
        }
        if self.execution_time == 0 {
            return Err(InvalidInputError::ZeroExecutionTime { task });
        }
        if self.execution_time > self.period {
            return Err(InvalidInputError::ExecutionExceedsPeriod {
                task,
                execution_time: self.execution_time,
                period: self.period,
            });
        }
        if self.m == 0 {
            return Err(InvalidInputError::ZeroM { task });
        }
        if self.m > self.k {
            return Err(InvalidInputError::MExceedsK {
                task,
                m: self.m,
                k: self.k,
            });
        }
        Ok(())
    }

    /// Processor utilisation `e / p`.  Returns `0.0` for a zero period.
    pub fn utilization(&self) -> f64 {
        if self.period == 0 {
            0.0
        } else {
            self.execution_time as f64 / self.period as f64
        }
    }

    /// Release time of job `job`.
    pub fn release(&self, job: usize) -> Time {
        job as Time * self.period
    }

    /// Absolute deadline of job `job`.
    pub fn deadline(&self, job: usize) -> Time {
        (job as Time + 1) * self.period
    }

    /// Jobs whose whole `[release, deadline]` span lies inside `[t1, t2]`.
    ///
    /// The first candidate is `ceil(t1 / p)`; the last is the one whose
    /// deadline is the largest multiple of `p` not after `t2`.  The range is
    /// further clipped to `jobs` so callers never see an index past the
    /// hyperperiod.
    pub fn jobs_within(&self, t1: Time, t2: Time, jobs: usize) -> Range<usize> {
        if self.period == 0 || t2 <= t1 {
            return 0..0;
        }
        let first = t1.div_ceil(self.period) as usize;
        let end = ((t2 / self.period) as usize).min(jobs);
        if first >= end {
            0..0
        } else {
            first..end
        }
    }
}

// ── Job ───────────────────────────────────────────────────────────────────────

/// The `job`-th instance of task `task` within one hyperperiod.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Job {
    pub task: usize,
    pub job: usize,
    pub release: Time,
    pub deadline: Time,
}

/// Enumerate the `jobs` jobs of `task` (at index `index`) in release order.
pub fn jobs_of(index: usize, task: &Task, jobs: usize) -> impl Iterator<Item = Job> + '_ {
    (0..jobs).map(move |j| Job {
        task: index,
        job: j,
        release: task.release(j),
        deadline: task.deadline(j),
    })
}

// ── Instance ──────────────────────────────────────────────────────────────────

/// A complete problem instance: the task set plus the number of identical
/// processors available.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Instance {
    pub tasks: Vec<Task>,
    pub processors: usize,
}

impl Instance {
    pub fn new(tasks: Vec<Task>, processors: usize) -> Self {
        Self { tasks, processors }
    }

    /// Total utilisation if every job were accepted.
    pub fn total_utilization(&self) -> f64 {
        self.tasks.iter().map(Task::utilization).sum()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
