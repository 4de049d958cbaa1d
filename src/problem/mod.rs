//! Problem instances that construct agents and constraint checkers for a run

pub mod coloring;
pub mod queens;
pub mod report;

pub use coloring::*;
pub use queens::*;
pub use report::*;

use crate::dcop::agent::Agent;
use crate::dcop::order::AgentOrder;
use crate::dcop::engine::{Config, Outcome, SyncBB};
use crate::dcop::types::{AgentId, ConstraintChecker, Value, checker_fn};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Where a demo takes its problem data from
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SourceMode {
    Random,
    File,
}

/// A constraint problem that can be solved by SyncBB
///
/// Implementors only describe the problem. Agent order follows the order of
/// [`agents`](ProblemInstance::agents).
pub trait ProblemInstance {
    type Value: Value;
    type Checker: ConstraintChecker<Self::Value>;

    fn agents(&self) -> Vec<Agent<Self::Value>>;

    fn checker(&self) -> Result<Self::Checker>;

    fn max_cost(&self) -> u32;

    /// Reject instances that cannot produce a meaningful run
    fn validate(&self) -> Result<()> {
        Ok(())
    }

    fn engine_config(&self) -> Config {
        Config::default().with_max_cost(self.max_cost())
    }

    fn build(&self) -> Result<SyncBB<Self::Value, Self::Checker>> {
        self.build_with(self.engine_config())
    }

    /// Build an engine with an explicit configuration
    fn build_with(&self, config: Config) -> Result<SyncBB<Self::Value, Self::Checker>> {
        self.validate()?;
        let order = AgentOrder::new(self.agents())?;
        Ok(SyncBB::new(self.checker()?, order, config))
    }

    fn resolve(&self) -> Result<Outcome<Self::Value>> {
        self.build()?.run()
    }
}

/// Boxed checker over integer values, as returned by [`checker_by_name`]
pub type IntChecker = Box<dyn ConstraintChecker<i32>>;

/// Resolve a named integer checker
///
/// Known names are `not_equal`, `equal`, `always` and `never`.
pub fn checker_by_name(name: &str) -> Result<IntChecker> {
    let checker: IntChecker = match name {
        "not_equal" => Box::new(checker_fn(|a: (AgentId, &i32), b: (AgentId, &i32)| a.1 != b.1)),
        "equal" => Box::new(checker_fn(|a: (AgentId, &i32), b: (AgentId, &i32)| a.1 == b.1)),
        "always" => Box::new(checker_fn(|_: (AgentId, &i32), _: (AgentId, &i32)| true)),
        "never" => Box::new(checker_fn(|_: (AgentId, &i32), _: (AgentId, &i32)| false)),
        other => return Err(Error::InvalidChecker(other.to_string())),
    };
    Ok(checker)
}

/// Integer chain problem with explicit domains and a named pairwise checker
///
/// Agent `i` (1-based) owns `domains[i - 1]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainProblem {
    pub domains: Vec<Vec<i32>>,
    pub checker: String,
    #[serde(default)]
    pub max_cost: u32,
}

impl ProblemInstance for ChainProblem {
    type Value = i32;
    type Checker = IntChecker;

    fn agents(&self) -> Vec<Agent<i32>> {
        self.domains
            .iter()
            .enumerate()
            .map(|(i, domain)| Agent::new(AgentId(i as u32 + 1), domain.clone()))
            .collect()
    }

    fn checker(&self) -> Result<IntChecker> {
        checker_by_name(&self.checker)
    }

    fn max_cost(&self) -> u32 {
        self.max_cost
    }

    fn validate(&self) -> Result<()> {
        if self.domains.is_empty() {
            return Err(Error::EmptyOrder);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dcop::engine::Termination;

    #[test]
    fn test_checker_by_name() {
        let not_equal = checker_by_name("not_equal").unwrap();
        assert_eq!(not_equal.check((AgentId(1), &1), (AgentId(2), &2)), Ok(true));
        assert_eq!(not_equal.check((AgentId(1), &1), (AgentId(2), &1)), Ok(false));

        let never = checker_by_name("never").unwrap();
        assert_eq!(never.check((AgentId(1), &1), (AgentId(2), &2)), Ok(false));
    }

    #[test]
    fn test_unknown_checker_name() {
        assert!(matches!(
            checker_by_name("sometimes"),
            Err(Error::InvalidChecker(name)) if name == "sometimes"
        ));
    }

    #[test]
    fn test_chain_problem_resolve() {
        let problem = ChainProblem {
            domains: vec![vec![1, 2], vec![1, 2]],
            checker: "not_equal".to_string(),
            max_cost: 0,
        };
        let outcome = problem.resolve().unwrap();

        assert_eq!(outcome.termination, Termination::Satisfied);
        let solution = outcome.solution.unwrap();
        assert_eq!(solution.value_of(AgentId(1)), Some(&1));
        assert_eq!(solution.value_of(AgentId(2)), Some(&2));
    }

    #[test]
    fn test_chain_problem_invalid_checker_fails_build() {
        let problem = ChainProblem {
            domains: vec![vec![1]],
            checker: "bogus".to_string(),
            max_cost: 0,
        };
        assert!(matches!(problem.build(), Err(Error::InvalidChecker(_))));
    }

    #[test]
    fn test_chain_problem_without_agents() {
        let problem = ChainProblem {
            domains: vec![],
            checker: "always".to_string(),
            max_cost: 0,
        };
        assert!(matches!(problem.resolve(), Err(Error::EmptyOrder)));
    }
}
