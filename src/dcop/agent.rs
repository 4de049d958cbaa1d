//! Single-variable agents and their search state

use super::types::{AgentId, Bound, DomainValue, Path, Value};
use super::variable::Variable;

/// Mutable search state of one agent
///
/// Only the engine touches it, and only during that agent's turn. Other
/// agents see copies of the paths through messages.
#[derive(Debug, Clone)]
pub struct SearchState<V> {
    pub upper_bound: Bound,
    /// Violations accumulated while testing the current candidate
    pub counter: u32,
    /// Path this agent proposes downstream
    pub new_path: Path<V>,
    /// Path most recently received from upstream
    pub previous_path: Path<V>,
}

impl<V> Default for SearchState<V> {
    fn default() -> Self {
        Self {
            upper_bound: Bound::Unbounded,
            counter: 0,
            new_path: Vec::new(),
            previous_path: Vec::new(),
        }
    }
}

/// A DCOP agent owning exactly one variable
#[derive(Debug, Clone)]
pub struct Agent<V> {
    pub state: SearchState<V>,
    pub variable: Variable<V>,
}

impl<V: Value> Agent<V> {
    pub fn new(label: AgentId, domain: Vec<V>) -> Self {
        Self {
            state: SearchState::default(),
            variable: Variable::new(label, domain),
        }
    }

    pub fn id(&self) -> AgentId {
        self.variable.label()
    }

    pub fn current(&self) -> Option<&DomainValue<V>> {
        self.variable.current()
    }

    pub fn current_value(&self) -> Option<&V> {
        self.variable.current_value()
    }

    pub fn is_exhausted(&self) -> bool {
        self.variable.is_exhausted()
    }
}

impl<V: Value> std::fmt::Display for Agent<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}
