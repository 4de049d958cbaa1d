//! Agent ordering (a pseudo-tree degenerated to a chain)

use super::agent::Agent;
use super::types::{AgentId, Value};
use crate::error::{Error, Result};

/// Fixed total order over the agents of a run, plus a traversal cursor
///
/// "Parent" means earlier in the order. Only the cursor moves during a run.
#[derive(Debug, Clone)]
pub struct AgentOrder<V> {
    agents: Vec<Agent<V>>,
    /// `None` until the first call to [`next`](AgentOrder::next)
    cursor: Option<usize>,
}

impl<V: Value> AgentOrder<V> {
    pub fn new(agents: Vec<Agent<V>>) -> Result<Self> {
        if agents.is_empty() {
            return Err(Error::EmptyOrder);
        }
        for (i, agent) in agents.iter().enumerate() {
            if agents[..i].iter().any(|a| a.id() == agent.id()) {
                return Err(Error::DuplicateAgent(agent.id()));
            }
        }
        Ok(Self {
            agents,
            cursor: None,
        })
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn agents(&self) -> &[Agent<V>] {
        &self.agents
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Agent<V>> {
        self.agents.iter()
    }

    pub fn position(&self, id: AgentId) -> Option<usize> {
        self.agents.iter().position(|a| a.id() == id)
    }

    fn index_of(&self, id: AgentId) -> Result<usize> {
        self.position(id).ok_or(Error::UnknownAgent(id))
    }

    // Cursor movement

    /// Advance the cursor and return the agent under it
    ///
    /// Returns `None` without moving once the cursor sits on the last agent.
    pub fn next(&mut self) -> Option<&Agent<V>> {
        let target = self.cursor.map_or(0, |i| i + 1);
        if target < self.agents.len() {
            self.cursor = Some(target);
            self.agents.get(target)
        } else {
            None
        }
    }

    /// Retreat the cursor and return the agent under it, `None` at the start
    pub fn previous(&mut self) -> Option<&Agent<V>> {
        match self.cursor {
            Some(i) if i > 0 => {
                self.cursor = Some(i - 1);
                self.agents.get(i - 1)
            }
            _ => None,
        }
    }

    pub fn current(&self) -> Option<&Agent<V>> {
        self.cursor.and_then(|i| self.agents.get(i))
    }

    pub fn current_index(&self) -> Option<usize> {
        self.cursor
    }

    // Pure lookups, independent of the cursor

    /// Successor of `id` in the order
    pub fn next_to(&self, id: AgentId) -> Result<Option<&Agent<V>>> {
        let index = self.index_of(id)?;
        Ok(self.agents.get(index + 1))
    }

    /// Predecessor of `id` in the order
    pub fn previous_to(&self, id: AgentId) -> Result<Option<&Agent<V>>> {
        let index = self.index_of(id)?;
        Ok(index.checked_sub(1).and_then(|i| self.agents.get(i)))
    }

    /// True if `parent` comes before `child` in the order
    pub fn is_parent(&self, parent: AgentId, child: AgentId) -> Result<bool> {
        Ok(self.index_of(parent)? < self.index_of(child)?)
    }

    pub fn is_first(&self, id: AgentId) -> Result<bool> {
        Ok(self.index_of(id)? == 0)
    }

    pub fn is_last(&self, id: AgentId) -> Result<bool> {
        Ok(self.index_of(id)? + 1 == self.agents.len())
    }

    pub fn first(&self) -> &Agent<V> {
        &self.agents[0]
    }

    pub fn last(&self) -> &Agent<V> {
        &self.agents[self.agents.len() - 1]
    }

    pub fn get(&self, id: AgentId) -> Option<&Agent<V>> {
        self.agents.iter().find(|a| a.id() == id)
    }

    pub fn get_mut(&mut self, id: AgentId) -> Option<&mut Agent<V>> {
        self.agents.iter_mut().find(|a| a.id() == id)
    }
}
