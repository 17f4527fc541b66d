//! Constraint rows and their structured identifiers.

use std::fmt;

use super::vars::VarId;
use crate::task::Time;

/// Comparison between a row's left-hand side and its bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    LessEq,
    Eq,
    GreaterEq,
}

impl Relation {
    /// Does `lhs <relation> rhs` hold?
    pub fn holds(self, lhs: i64, rhs: i64) -> bool {
        match self {
            Relation::LessEq => lhs <= rhs,
            Relation::Eq => lhs == rhs,
            Relation::GreaterEq => lhs >= rhs,
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Relation::LessEq => "<=",
            Relation::Eq => "=",
            Relation::GreaterEq => ">=",
        })
    }
}

/// Left-hand side of a row: `Σ c·v + Σ c·(u·v)`.
///
/// `products` is only populated by the native product encoding of the demand
/// family; every other row is purely linear.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Expr {
    pub terms: Vec<(VarId, i64)>,
    pub products: Vec<(VarId, VarId, i64)>,
}

impl Expr {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sum of `vars`, each with coefficient 1.
    pub fn sum(vars: impl IntoIterator<Item = VarId>) -> Self {
        Self {
            terms: vars.into_iter().map(|v| (v, 1)).collect(),
            products: Vec::new(),
        }
    }

    pub fn add(&mut self, var: VarId, coeff: i64) -> &mut Self {
        self.terms.push((var, coeff));
        self
    }

    pub fn add_product(&mut self, a: VarId, b: VarId, coeff: i64) -> &mut Self {
        self.products.push((a, b, coeff));
        self
    }

    pub fn is_linear(&self) -> bool {
        self.products.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty() && self.products.is_empty()
    }

    /// Every variable referenced by this expression, in term order.
    pub fn vars(&self) -> impl Iterator<Item = VarId> + '_ {
        self.terms
            .iter()
            .map(|&(v, _)| v)
            .chain(self.products.iter().flat_map(|&(a, b, _)| [a, b]))
    }

    /// Evaluate under a 0/1 assignment given by `value`.
    pub fn eval(&self, value: impl Fn(VarId) -> bool) -> i64 {
        let linear: i64 = self
            .terms
            .iter()
            .filter(|&&(v, _)| value(v))
            .map(|&(_, c)| c)
            .sum();
        let products: i64 = self
            .products
            .iter()
            .filter(|&&(a, b, _)| value(a) && value(b))
            .map(|&(_, _, c)| c)
            .sum();
        linear + products
    }
}

// ── Identifiers ───────────────────────────────────────────────────────────────

/// Which conjunct of `W = X ∧ Y` a linearization row encodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AndSide {
    /// `W ≤ X`
    Assign,
    /// `W ≤ Y`
    Accept,
    /// `W ≥ X + Y − 1`
    Both,
}

/// Structured name of a constraint row: its family plus the indices that
/// generated it.  Indices are 0-based; [`fmt::Display`] prints them 1-based
/// except for time instants, which print as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintId {
    /// C1: task assigned to exactly one processor.
    TaskAssignment { task: usize },
    /// C2: (m,k) window starting at job `start`.  `wraps` marks windows
    /// that run past the last job of the hyperperiod.
    Window {
        task: usize,
        start: usize,
        wraps: bool,
    },
    /// C3: processor demand over `[t1, t2]`.
    Demand {
        processor: usize,
        t1: Time,
        t2: Time,
    },
    /// C4: `Σ X ≤ M·Z`.
    ProcessorUsage { processor: usize },
    /// C5: `Z ≤ Σ X`.
    ProcessorActivation { processor: usize },
    /// C6: AND-linearization of `W[i,j,l]`.
    AcceptedOn {
        task: usize,
        job: usize,
        processor: usize,
        side: AndSide,
    },
}

/// Constraint family tag, for counting and filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Family {
    C1,
    C2,
    C3,
    C4,
    C5,
    C6,
}

impl ConstraintId {
    pub fn family(&self) -> Family {
        match self {
            ConstraintId::TaskAssignment { .. } => Family::C1,
            ConstraintId::Window { .. } => Family::C2,
            ConstraintId::Demand { .. } => Family::C3,
            ConstraintId::ProcessorUsage { .. } => Family::C4,
            ConstraintId::ProcessorActivation { .. } => Family::C5,
            ConstraintId::AcceptedOn { .. } => Family::C6,
        }
    }
}

impl fmt::Display for ConstraintId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            ConstraintId::TaskAssignment { task } => write!(f, "C1_task_{}", task + 1),
            ConstraintId::Window { task, start, wraps } => {
                write!(f, "C2_task_{}_window_{}", task + 1, start + 1)?;
                if wraps {
                    f.write_str("_wrap")?;
                }
                Ok(())
            }
            ConstraintId::Demand { processor, t1, t2 } => {
                write!(f, "C3_proc_{}_interval_{}_{}", processor + 1, t1, t2)
            }
            ConstraintId::ProcessorUsage { processor } => {
                write!(f, "C4_proc_{}_usage", processor + 1)
            }
            ConstraintId::ProcessorActivation { processor } => {
                write!(f, "C5_proc_{}_assignment", processor + 1)
            }
            ConstraintId::AcceptedOn {
                task,
                job,
                processor,
                side,
            } => {
                let side = match side {
                    AndSide::Assign => "le_x",
                    AndSide::Accept => "le_y",
                    AndSide::Both => "ge_xy",
                };
                write!(
                    f,
                    "C6_task_{}_job_{}_proc_{}_{}",
                    task + 1,
                    job + 1,
                    processor + 1,
                    side
                )
            }
        }
    }
}

// ── Constraint ────────────────────────────────────────────────────────────────

/// One write-once row `expr <relation> rhs`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    pub id: ConstraintId,
    pub expr: Expr,
    pub relation: Relation,
    pub rhs: i64,
}

impl Constraint {
    pub fn new(id: ConstraintId, expr: Expr, relation: Relation, rhs: i64) -> Self {
        Self {
            id,
            expr,
            relation,
            rhs,
        }
    }

    /// Does the row hold under the 0/1 assignment `value`?
    pub fn is_satisfied(&self, value: impl Fn(VarId) -> bool) -> bool {
        self.relation.holds(self.expr.eval(value), self.rhs)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_family_naming() {
        assert_eq!(ConstraintId::TaskAssignment { task: 0 }.to_string(), "C1_task_1");
        assert_eq!(
            ConstraintId::Window {
                task: 1,
                start: 0,
                wraps: false
            }
            .to_string(),
            "C2_task_2_window_1"
        );
        assert_eq!(
            ConstraintId::Window {
                task: 0,
                start: 2,
                wraps: true
            }
            .to_string(),
            "C2_task_1_window_3_wrap"
        );
        assert_eq!(
            ConstraintId::Demand {
                processor: 0,
                t1: 0,
                t2: 4
            }
            .to_string(),
            "C3_proc_1_interval_0_4"
        );
        assert_eq!(
            ConstraintId::ProcessorUsage { processor: 1 }.to_string(),
            "C4_proc_2_usage"
        );
    }

    #[test]
    fn eval_counts_linear_and_product_terms() {
        let mut e = Expr::new();
        e.add(VarId(0), 2).add(VarId(1), 3).add_product(VarId(0), VarId(2), 5);
        fn on(ids: &'static [usize]) -> impl Fn(VarId) -> bool {
            move |v| ids.contains(&v.0)
        }
        assert_eq!(e.eval(on(&[])), 0);
        assert_eq!(e.eval(on(&[0])), 2);
        assert_eq!(e.eval(on(&[0, 2])), 7);
        assert_eq!(e.eval(on(&[0, 1, 2])), 10);
        assert!(!e.is_linear());
    }

    #[test]
    fn relation_holds() {
        assert!(Relation::LessEq.holds(3, 3));
        assert!(!Relation::LessEq.holds(4, 3));
        assert!(Relation::Eq.holds(1, 1));
        assert!(Relation::GreaterEq.holds(2, 1));
        assert!(!Relation::GreaterEq.holds(0, 1));
    }
}
