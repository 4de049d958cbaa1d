//! Core types and traits for the SyncBB protocol

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Identity of an agent, shared by the single variable it owns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct AgentId(pub u32);

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "A{}", self.0)
    }
}

/// Core trait that domain values must implement
///
/// Automatically implemented for any type that satisfies the bounds.
pub trait Value: Clone + Debug + PartialEq {}

impl<T> Value for T where T: Clone + Debug + PartialEq {}

/// Result of drawing from a domain cursor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DomainValue<V> {
    Value(V),
    /// The cursor has yielded every element of the domain
    Exhausted,
}

impl<V> DomainValue<V> {
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted)
    }

    pub fn value(&self) -> Option<&V> {
        match self {
            Self::Value(v) => Some(v),
            Self::Exhausted => None,
        }
    }
}

/// One agent's contribution to the accumulated partial assignment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathElement<V> {
    pub var_label: AgentId,
    pub value: V,
    /// Number of downstream agents whose candidate conflicts with this element
    pub violations: u32,
}

impl<V: Clone> PathElement<V> {
    pub fn new(var_label: AgentId, value: V, violations: u32) -> Self {
        Self {
            var_label,
            value,
            violations,
        }
    }

    /// Copy of this element carrying one more violation
    pub fn with_violation(&self) -> Self {
        Self {
            var_label: self.var_label,
            value: self.value.clone(),
            violations: self.violations + 1,
        }
    }
}

/// Accumulated partial assignment, in agent order
pub type Path<V> = Vec<PathElement<V>>;

/// Cost of a path: the largest violation count carried by any of its elements
pub fn path_cost<V>(path: &[PathElement<V>]) -> u32 {
    path.iter().map(|e| e.violations).max().unwrap_or(0)
}

/// Upper bound on tolerable violations
///
/// `Finite` sorts before `Unbounded`, so the derived ordering matches the numeric one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub enum Bound {
    Finite(u32),
    #[default]
    Unbounded,
}

impl Bound {
    /// True when `violations` is at or above the bound, i.e. the candidate must be pruned
    pub fn reached_by(&self, violations: u32) -> bool {
        match self {
            Self::Finite(bound) => violations >= *bound,
            Self::Unbounded => false,
        }
    }
}

impl From<u32> for Bound {
    fn from(v: u32) -> Self {
        Bound::Finite(v)
    }
}

impl std::fmt::Display for Bound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Finite(v) => write!(f, "{}", v),
            Self::Unbounded => write!(f, "inf"),
        }
    }
}

/// A full assignment recorded by the last agent in order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solution<V> {
    pub path: Path<V>,
    pub cost: u32,
}

impl<V> Solution<V> {
    pub fn new(path: Path<V>, cost: u32) -> Self {
        Self { path, cost }
    }

    /// Value assigned to `label`, if the path covers it
    pub fn value_of(&self, label: AgentId) -> Option<&V> {
        self.path
            .iter()
            .find(|e| e.var_label == label)
            .map(|e| &e.value)
    }

    pub fn assignment(&self) -> impl Iterator<Item = (AgentId, &V)> {
        self.path.iter().map(|e| (e.var_label, &e.value))
    }
}

/// Payload carried between neighbouring agents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message<V> {
    pub path: Path<V>,
    pub upper_bound: Bound,
}

/// Constraint predicate supplied by the problem instance
///
/// Returns `Ok(true)` when every constraint between the two assignments is
/// satisfied. Implementations must not depend on the order or history of
/// previous calls. An `Err` aborts the run and is returned unchanged.
pub trait ConstraintChecker<V> {
    fn check(&self, lhs: (AgentId, &V), rhs: (AgentId, &V)) -> Result<bool>;
}

impl<V, C: ConstraintChecker<V> + ?Sized> ConstraintChecker<V> for Box<C> {
    fn check(&self, lhs: (AgentId, &V), rhs: (AgentId, &V)) -> Result<bool> {
        (**self).check(lhs, rhs)
    }
}

impl<V, C: ConstraintChecker<V> + ?Sized> ConstraintChecker<V> for &C {
    fn check(&self, lhs: (AgentId, &V), rhs: (AgentId, &V)) -> Result<bool> {
        (**self).check(lhs, rhs)
    }
}

/// Adapter turning an infallible closure into a [`ConstraintChecker`]
#[derive(Clone, Copy)]
pub struct FnChecker<F>(F);

impl<F> std::fmt::Debug for FnChecker<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("FnChecker")
    }
}

/// Wrap a closure as a constraint checker
pub fn checker_fn<V, F>(f: F) -> FnChecker<F>
where
    F: Fn((AgentId, &V), (AgentId, &V)) -> bool,
{
    FnChecker(f)
}

impl<V, F> ConstraintChecker<V> for FnChecker<F>
where
    F: Fn((AgentId, &V), (AgentId, &V)) -> bool,
{
    fn check(&self, lhs: (AgentId, &V), rhs: (AgentId, &V)) -> Result<bool> {
        Ok((self.0)(lhs, rhs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bound_ordering_and_pruning() {
        assert!(Bound::Finite(u32::MAX) < Bound::Unbounded);
        assert!(Bound::Finite(2).reached_by(2));
        assert!(Bound::Finite(2).reached_by(3));
        assert!(!Bound::Finite(2).reached_by(1));
        assert!(!Bound::Unbounded.reached_by(u32::MAX));
        assert_eq!(Bound::default(), Bound::Unbounded);
    }

    #[test]
    fn test_path_cost_is_max_violation() {
        let path = vec![
            PathElement::new(AgentId(1), 'a', 2),
            PathElement::new(AgentId(2), 'b', 5),
            PathElement::new(AgentId(3), 'c', 0),
        ];
        assert_eq!(path_cost(&path), 5);
        assert_eq!(path_cost::<char>(&[]), 0);
    }

    #[test]
    fn test_with_violation_keeps_identity() {
        let element = PathElement::new(AgentId(4), 7, 1);
        let bumped = element.with_violation();
        assert_eq!(bumped.var_label, AgentId(4));
        assert_eq!(bumped.value, 7);
        assert_eq!(bumped.violations, 2);
        assert_eq!(element.violations, 1);
    }

    #[test]
    fn test_fn_checker() {
        let checker = checker_fn(|a: (AgentId, &i32), b: (AgentId, &i32)| a.1 != b.1);
        assert_eq!(checker.check((AgentId(1), &1), (AgentId(2), &2)), Ok(true));
        assert_eq!(checker.check((AgentId(1), &1), (AgentId(2), &1)), Ok(false));

        let boxed: Box<dyn ConstraintChecker<i32>> = Box::new(checker);
        assert_eq!(boxed.check((AgentId(1), &3), (AgentId(2), &3)), Ok(false));
    }

    #[test]
    fn test_solution_lookup() {
        let solution = Solution::new(
            vec![
                PathElement::new(AgentId(1), 10, 0),
                PathElement::new(AgentId(2), 20, 0),
            ],
            0,
        );
        assert_eq!(solution.value_of(AgentId(2)), Some(&20));
        assert_eq!(solution.value_of(AgentId(3)), None);
        let pairs: Vec<_> = solution.assignment().collect();
        assert_eq!(pairs, vec![(AgentId(1), &10), (AgentId(2), &20)]);
    }
}
