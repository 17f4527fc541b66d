//! Decision variables and their index layout.
//!
//! Every variable is binary.  Variables are stored densely, block by block:
//!
//! ```text
//! [ X[i,l] : n·m ][ Y[i,j] : Σ n_i ][ Z[l] : m ][ W[i,j,l] : m·Σ n_i  (linearized only) ]
//! ```
//!
//! [`VarTable`] maps a structured index to its [`VarId`] in O(1) and is
//! built once per model; generators only ever read it.

use std::fmt;

/// Dense handle of one decision variable inside a [`Model`](super::Model).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VarId(pub usize);

/// What a binary decision variable means.  Indices are 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Var {
    /// `X[i,l]`: task `task` is assigned to `processor`.
    Assign { task: usize, processor: usize },
    /// `Y[i,j]`: job `job` of task `task` is accepted.
    Accept { task: usize, job: usize },
    /// `Z[l]`: `processor` hosts at least one task.
    Active { processor: usize },
    /// `W[i,j,l] = X[i,l] ∧ Y[i,j]`.
    AcceptedOn {
        task: usize,
        job: usize,
        processor: usize,
    },
}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Var::Assign { task, processor } => write!(f, "X[{},{}]", task + 1, processor + 1),
            Var::Accept { task, job } => write!(f, "Y[{},{}]", task + 1, job + 1),
            Var::Active { processor } => write!(f, "Z[{}]", processor + 1),
            Var::AcceptedOn {
                task,
                job,
                processor,
            } => write!(f, "W[{},{},{}]", task + 1, job + 1, processor + 1),
        }
    }
}

/// Index layout of all decision variables of one model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarTable {
    tasks: usize,
    processors: usize,
    /// `job_offsets[i]` = number of jobs of tasks `0..i`; one extra entry at
    /// the end holds the total.
    job_offsets: Vec<usize>,
    with_products: bool,
}

impl VarTable {
    /// Lay out variables for `job_counts.len()` tasks on `processors`
    /// processors.  `with_products` adds the `W` block.
    pub fn new(job_counts: &[usize], processors: usize, with_products: bool) -> Self {
        let mut job_offsets = Vec::with_capacity(job_counts.len() + 1);
        let mut acc = 0;
        job_offsets.push(0);
        for n in job_counts {
            acc += n;
            job_offsets.push(acc);
        }
        Self {
            tasks: job_counts.len(),
            processors,
            job_offsets,
            with_products,
        }
    }

    pub fn tasks(&self) -> usize {
        self.tasks
    }

    pub fn processors(&self) -> usize {
        self.processors
    }

    pub fn jobs(&self, task: usize) -> usize {
        self.job_offsets[task + 1] - self.job_offsets[task]
    }

    fn total_jobs(&self) -> usize {
        self.job_offsets[self.tasks]
    }

    pub fn has_products(&self) -> bool {
        self.with_products
    }

    fn y_base(&self) -> usize {
        self.tasks * self.processors
    }

    fn z_base(&self) -> usize {
        self.y_base() + self.total_jobs()
    }

    fn w_base(&self) -> usize {
        self.z_base() + self.processors
    }

    pub fn x(&self, task: usize, processor: usize) -> VarId {
        debug_assert!(task < self.tasks && processor < self.processors);
        VarId(task * self.processors + processor)
    }

    pub fn y(&self, task: usize, job: usize) -> VarId {
        debug_assert!(job < self.jobs(task));
        VarId(self.y_base() + self.job_offsets[task] + job)
    }

    pub fn z(&self, processor: usize) -> VarId {
        debug_assert!(processor < self.processors);
        VarId(self.z_base() + processor)
    }

    /// `W[i,j,l]`.  Only valid when the table was built `with_products`.
    pub fn w(&self, task: usize, job: usize, processor: usize) -> VarId {
        debug_assert!(self.with_products, "W requested from a table without products");
        debug_assert!(job < self.jobs(task) && processor < self.processors);
        VarId(self.w_base() + (self.job_offsets[task] + job) * self.processors + processor)
    }

    pub fn len(&self) -> usize {
        let w = if self.with_products {
            self.total_jobs() * self.processors
        } else {
            0
        };
        self.w_base() + w
    }

    /// All variables in [`VarId`] order.
    pub fn all(&self) -> Vec<Var> {
        let mut out = Vec::with_capacity(self.len());
        for task in 0..self.tasks {
            for processor in 0..self.processors {
                out.push(Var::Assign { task, processor });
            }
        }
        for task in 0..self.tasks {
            for job in 0..self.jobs(task) {
                out.push(Var::Accept { task, job });
            }
        }
        for processor in 0..self.processors {
            out.push(Var::Active { processor });
        }
        if self.with_products {
            for task in 0..self.tasks {
                for job in 0..self.jobs(task) {
                    for processor in 0..self.processors {
                        out.push(Var::AcceptedOn {
                            task,
                            job,
                            processor,
                        });
                    }
                }
            }
        }
        out
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
