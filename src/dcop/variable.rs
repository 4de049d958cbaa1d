//! DCOP variable with a forward-only domain cursor

use super::types::{AgentId, DomainValue, Value};

/// A finite-domain variable owned by exactly one agent
///
/// The cursor only moves forward between explicit [`reset`](Variable::reset)
/// calls. Once every element has been yielded, [`next`](Variable::next) keeps
/// returning [`DomainValue::Exhausted`] without changing state.
#[derive(Debug, Clone)]
pub struct Variable<V> {
    label: AgentId,
    domain: Vec<V>,
    cursor: usize,
    current: Option<DomainValue<V>>,
}

impl<V: Value> Variable<V> {
    pub fn new(label: AgentId, domain: Vec<V>) -> Self {
        Self {
            label,
            domain,
            cursor: 0,
            current: None,
        }
    }

    pub fn label(&self) -> AgentId {
        self.label
    }

    /// Copy of the domain, in draw order
    pub fn domain(&self) -> Vec<V> {
        self.domain.clone()
    }

    /// Replace the whole domain with a copy of `domain`; the cursor is left where it is
    pub fn set_domain(&mut self, domain: &[V]) {
        self.domain = domain.to_vec();
    }

    pub fn len(&self) -> usize {
        self.domain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domain.is_empty()
    }

    /// Number of elements drawn since the last reset
    pub fn position(&self) -> usize {
        self.cursor
    }

    /// Last value produced by [`next`](Variable::next), `None` before the first draw
    pub fn current(&self) -> Option<&DomainValue<V>> {
        self.current.as_ref()
    }

    pub fn current_value(&self) -> Option<&V> {
        self.current.as_ref().and_then(DomainValue::value)
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self.current, Some(DomainValue::Exhausted))
    }

    pub fn next(&mut self) -> DomainValue<V> {
        let drawn = match self.domain.get(self.cursor) {
            Some(value) => {
                self.cursor += 1;
                DomainValue::Value(value.clone())
            }
            None => DomainValue::Exhausted,
        };
        self.current = Some(drawn.clone());
        drawn
    }

    /// Rewind the cursor to the start of the domain
    pub fn reset(&mut self) {
        self.cursor = 0;
    }
}
