/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Instance file parsing.
//!
//! ```text
//! # n m
//! 2 2
//! # e p m k
//! 2 4 1 2
//! 5 6 1 2
//! ```
//!
//! The first record holds the task count `n` and processor count `m`; the
//! next `n` records each describe one task.  `#` starts a comment that runs to
//! the end of the line, and blank lines are skipped.  Values are only parsed
//! here; range checks happen in [`Task::validate`](crate::task::Task::validate)
//! when the model is built.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use thiserror::Error;
use tracing::{debug, info};

use crate::task::{Instance, Task};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("input is empty")]
    Empty,

    #[error("line {line}: expected {expected} fields, found {found}")]
    FieldCount {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("line {line}: '{value}' is not a non-negative integer")]
    NotANumber { line: usize, value: String },

    #[error("header declares {declared} task(s) but {found} task line(s) follow")]
    TaskCount { declared: usize, found: usize },
}

/// Non-empty records as `(1-based line number, fields)`.
fn records(content: &str) -> impl Iterator<Item = (usize, Vec<&str>)> {
    content.lines().enumerate().filter_map(|(n, raw)| {
        let text = raw.split('#').next().unwrap_or_default();
        let fields: Vec<&str> = text.split_whitespace().collect();
        (!fields.is_empty()).then_some((n + 1, fields))
    })
}

fn numbers<const N: usize>(line: usize, fields: &[&str]) -> Result<[u64; N], InputError> {
    if fields.len() != N {
        return Err(InputError::FieldCount {
            line,
            expected: N,
            found: fields.len(),
        });
    }
    let mut out = [0u64; N];
    for (slot, field) in out.iter_mut().zip(fields) {
        *slot = field.parse().map_err(|_| InputError::NotANumber {
            line,
            value: field.to_string(),
        })?;
    }
    Ok(out)
}

fn count(line: usize, value: u64) -> Result<usize, InputError> {
    usize::try_from(value).map_err(|_| InputError::NotANumber {
        line,
        value: value.to_string(),
    })
}

/// Parse an instance from text.
pub fn parse_instance(content: &str) -> Result<Instance, InputError> {
    let mut records = records(content);
    let (line, header) = records.next().ok_or(InputError::Empty)?;
    let [n, procs] = numbers::<2>(line, &header)?;
    let declared = count(line, n)?;
    let processors = count(line, procs)?;

    let mut tasks = Vec::with_capacity(declared);
    for (line, fields) in records {
        let [e, p, m, k] = numbers::<4>(line, &fields)?;
        tasks.push(Task::new(e, p, count(line, m)?, count(line, k)?));
    }
    if tasks.len() != declared {
        return Err(InputError::TaskCount {
            declared,
            found: tasks.len(),
        });
    }

    debug!(tasks = tasks.len(), processors, "Instance parsed");
    Ok(Instance::new(tasks, processors))
}

/// Read and parse an instance file.
pub fn load_instance(path: &Path) -> Result<Instance> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Cannot read instance file: {}", path.display()))?;
    let instance = parse_instance(&content)
        .with_context(|| format!("Malformed instance file: {}", path.display()))?;
    info!(
        path = %path.display(),
        tasks = instance.tasks.len(),
        processors = instance.processors,
        utilization = instance.total_utilization(),
        "Instance loaded"
    );
    Ok(instance)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
