/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Structured error types for model construction.
//!
//! Three enums model the three failure layers:
//!
//! * [`InvalidInputError`]: a task parameter is out of range, or the
//!   hyperperiod cannot be represented.  Detected before any constraint is
//!   generated.
//! * [`ModelConstructionError`]: the inputs are valid but the requested
//!   formulation cannot be built or handed to the chosen solver.
//! * [`ModelError`]: top-level failure returned from
//!   [`build_model()`](super::build_model); also carries
//!   [`ModelError::EmptyInstance`].
//!
//! Task numbers in these errors are 1-based, matching the input file.
//!
//! An infeasible instance is **not** an error: it is reported as
//! [`Outcome::Infeasible`](crate::solver::Outcome::Infeasible).

use thiserror::Error;

use crate::task::Time;

// ── Input validation ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidInputError {
    #[error("no tasks given, cannot compute a hyperperiod")]
    NoTasks,

    #[error("task {task} has a zero period")]
    ZeroPeriod { task: usize },

    #[error("task {task} has a zero execution time")]
    ZeroExecutionTime { task: usize },

    #[error("task {task} needs {execution_time} time units per job but its period is only {period}")]
    ExecutionExceedsPeriod {
        task: usize,
        execution_time: Time,
        period: Time,
    },

    #[error("task {task} has m = 0; at least one job per window must be accepted")]
    ZeroM { task: usize },

    #[error("task {task} has m = {m} > k = {k}")]
    MExceedsK { task: usize, m: usize, k: usize },

    /// Contains the two operands so the caller can log which periods caused
    /// it.
    #[error("LCM overflow computing lcm({a}, {b})")]
    HyperperiodOverflow { a: Time, b: Time },

    #[error("hyperperiod {value} exceeds limit {limit}")]
    HyperperiodTooLarge { value: Time, limit: Time },
}

// ── Construction ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelConstructionError {
    /// A constraint still contains an `X·Y` product but the solver only
    /// accepts linear rows.  Raised before anything is sent to the solver.
    #[error("constraint {constraint} contains a binary product but the solver accepts only linear constraints; use the linearized product encoding")]
    UnlinearizedProduct { constraint: String },

    /// `k` is larger than the number of jobs in one hyperperiod and the
    /// `reject_short` window policy is active.
    #[error("task {task}: window of k = {k} jobs does not fit in a hyperperiod of {jobs} jobs")]
    WindowExceedsHyperperiod { task: usize, k: usize, jobs: usize },
}

// ── Top-level ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),

    #[error("empty instance: {tasks} task(s), {processors} processor(s)")]
    EmptyInstance { tasks: usize, processors: usize },

    #[error("model construction failed: {0}")]
    Construction(#[from] ModelConstructionError),
}
