//! Synchronous Branch-and-Bound (SyncBB) engine
//!
//! A single path token travels along the [`AgentOrder`]. Each agent extends
//! the path with a candidate value that keeps every carried violation count
//! under its upper bound and forwards it; an agent whose domain runs out sends
//! the token back so its predecessor advances instead. The last agent sweeps
//! its remaining values, comparing each full assignment against `max_cost`.

pub mod logging;

pub use logging::*;

use crate::dcop::agent::Agent;
use crate::dcop::mailbox::{Envelope, Mailbox};
use crate::dcop::order::AgentOrder;
use crate::dcop::types::{
    AgentId, Bound, ConstraintChecker, DomainValue, Message, PathElement, Solution, Value,
    path_cost,
};
use crate::error::{Error, Result};
use crate::{syncbb_debug, syncbb_info};
use serde::{Deserialize, Serialize};

/// Configuration for a SyncBB run
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// A full assignment with cost at or under this value ends the search
    pub max_cost: u32,

    /// Maximum number of driving-loop turns, 0 means unbounded
    pub max_steps: u64,
}

impl Config {
    pub fn with_max_cost(mut self, max_cost: u32) -> Self {
        self.max_cost = max_cost;
        self
    }

    pub fn with_max_steps(mut self, max_steps: u64) -> Self {
        self.max_steps = max_steps;
        self
    }
}

/// Why a run stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Termination {
    /// The last agent found an assignment at or under `max_cost`
    Satisfied,
    /// The first agent ran out of values
    Exhausted,
    /// `max_steps` turns elapsed before the protocol terminated
    StepLimitReached,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    pub steps: u64,
    pub forward_messages: u64,
    pub backtrack_messages: u64,
    pub constraint_checks: u64,
    pub pruned_candidates: u64,
}

/// Result of [`SyncBB::run`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome<V> {
    /// Last recorded solution, `None` if the last agent never completed a path
    pub solution: Option<Solution<V>>,
    pub termination: Termination,
    pub stats: RunStats,
}

impl<V> Outcome<V> {
    /// True when the recorded solution is within the cost bound
    pub fn is_satisfied(&self) -> bool {
        self.termination == Termination::Satisfied
    }
}

/// SyncBB protocol engine
///
/// Owns the agent order, the mailbox and the constraint checker of exactly one
/// run. All agent state is mutated here, one agent turn at a time.
///
/// # Type Parameters
///
/// * `V` - Domain value type
/// * `C` - Constraint checker comparing two `(label, value)` assignments
///
/// # Examples
///
/// ```
/// use syncbb::*;
///
/// let agents = vec![
///     Agent::new(AgentId(1), vec![1, 2]),
///     Agent::new(AgentId(2), vec![1, 2]),
/// ];
/// let order = AgentOrder::new(agents).unwrap();
/// let checker = checker_fn(|a: (AgentId, &i32), b: (AgentId, &i32)| a.1 != b.1);
///
/// let mut engine = SyncBB::new(checker, order, Config::default());
/// let outcome = engine.run().unwrap();
///
/// assert!(outcome.is_satisfied());
/// assert_eq!(outcome.solution.unwrap().cost, 0);
/// ```
#[derive(Debug)]
pub struct SyncBB<V, C> {
    checker: C,
    order: AgentOrder<V>,
    mailbox: Mailbox<V>,
    config: Config,
    terminate: bool,
    termination: Option<Termination>,
    sol: Option<Solution<V>>,
    stats: RunStats,
    started: bool,
}

impl<V: Value, C: ConstraintChecker<V>> SyncBB<V, C> {
    pub fn new(checker: C, order: AgentOrder<V>, config: Config) -> Self {
        Self {
            checker,
            order,
            mailbox: Mailbox::new(),
            config,
            terminate: false,
            termination: None,
            sol: None,
            stats: RunStats::default(),
            started: false,
        }
    }

    pub fn is_terminated(&self) -> bool {
        self.terminate
    }

    pub fn termination(&self) -> Option<Termination> {
        self.termination
    }

    pub fn solution(&self) -> Option<&Solution<V>> {
        self.sol.as_ref()
    }

    pub fn order(&self) -> &AgentOrder<V> {
        &self.order
    }

    pub fn mailbox(&self) -> &Mailbox<V> {
        &self.mailbox
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    pub fn max_cost(&self) -> u32 {
        self.config.max_cost
    }

    pub fn agent(&self, id: AgentId) -> Option<&Agent<V>> {
        self.order.get(id)
    }

    /// Drive the protocol until it terminates
    ///
    /// Seeds the first agent, then alternates `receive` / `send_message` on
    /// the agent under the order cursor. An engine runs once.
    pub fn run(&mut self) -> Result<Outcome<V>> {
        if self.started {
            return Err(Error::ValidationError(
                "engine has already been started".to_string(),
            ));
        }
        let first = self.order.next().map(Agent::id).ok_or(Error::EmptyOrder)?;
        syncbb_info!(
            "Starting SyncBB over {} agents with max cost {}",
            self.order.len(),
            self.config.max_cost
        );

        self.initiate(first)?;
        while !self.terminate {
            if self.config.max_steps > 0 && self.stats.steps >= self.config.max_steps {
                syncbb_info!("Step limit {} reached", self.config.max_steps);
                self.termination = Some(Termination::StepLimitReached);
                break;
            }
            let current = self.order.current().map(Agent::id).ok_or(Error::EmptyOrder)?;
            self.stats.steps += 1;
            self.receive(current)?;
            self.send_message(current)?;
        }

        let outcome = Outcome {
            solution: self.sol.clone(),
            termination: self.termination.unwrap_or(Termination::Exhausted),
            stats: self.stats.clone(),
        };
        log_outcome(&outcome);
        Ok(outcome)
    }

    /// Draw the first feasible value for `id` and pass the token on
    pub fn initiate(&mut self, id: AgentId) -> Result<()> {
        self.started = true;
        self.get_next(id)?;
        self.send_message(id)
    }

    /// Draw the next value of `id` that survives [`check`](SyncBB::check)
    /// against its previous path
    pub fn get_next(&mut self, id: AgentId) -> Result<DomainValue<V>> {
        let agent = self.order.get_mut(id).ok_or(Error::UnknownAgent(id))?;
        draw_candidate(&self.checker, &mut self.stats, agent)
    }

    /// Extend the new path of `id` with `path`, applying the constraint and
    /// bound checks to each element left to right
    ///
    /// Returns `Ok(false)` as soon as the candidate is pruned.
    pub fn check(&mut self, path: &[PathElement<V>], id: AgentId) -> Result<bool> {
        let agent = self.order.get_mut(id).ok_or(Error::UnknownAgent(id))?;
        check_path(&self.checker, &mut self.stats, path, agent)
    }

    pub fn send_message(&mut self, id: AgentId) -> Result<()> {
        let is_first = self.order.is_first(id)?;
        let is_last = self.order.is_last(id)?;
        let agent = self.order.get_mut(id).ok_or(Error::UnknownAgent(id))?;

        let exhausted = agent.current().map(DomainValue::is_exhausted);
        match exhausted {
            None => Err(Error::ValidationError(format!(
                "agent {} has not drawn a value",
                id
            ))),
            Some(true) => {
                if is_first {
                    syncbb_debug!("{} exhausted its domain, search space exhausted", id);
                    self.finish(Termination::Exhausted);
                    Ok(())
                } else {
                    self.send_to_previous(id)
                }
            }
            Some(false) if is_last => {
                let max_cost = self.config.max_cost;

                let held_cost = path_cost(&agent.state.new_path);
                if held_cost <= max_cost {
                    self.sol = Some(Solution::new(agent.state.new_path.clone(), held_cost));
                    syncbb_debug!("{} completed a path with cost {}", id, held_cost);
                    self.finish(Termination::Satisfied);
                    return Ok(());
                }

                // The bound sent upstream is never below the cost already seen
                let mut cost = held_cost;
                while !draw_candidate(&self.checker, &mut self.stats, agent)?.is_exhausted() {
                    cost = path_cost(&agent.state.new_path);
                    self.sol = Some(Solution::new(agent.state.new_path.clone(), cost));
                    if cost <= max_cost {
                        syncbb_debug!("{} completed a path with cost {}", id, cost);
                        self.terminate = true;
                        self.termination = Some(Termination::Satisfied);
                        break;
                    }
                    syncbb_debug!("{} recorded a path with cost {} over the bound", id, cost);
                }
                agent.state.upper_bound = Bound::Finite(cost);

                if is_first {
                    // Single-agent chain: nobody to backtrack to.
                    if !self.terminate {
                        self.finish(Termination::Exhausted);
                    }
                    Ok(())
                } else {
                    self.send_to_previous(id)
                }
            }
            Some(false) => self.send_to_next(id),
        }
    }

    /// Forward the new path of `id` to the next agent in order
    pub fn send_to_next(&mut self, id: AgentId) -> Result<()> {
        let agent = self.order.get(id).ok_or(Error::UnknownAgent(id))?;
        let message = Message {
            path: agent.state.new_path.clone(),
            upper_bound: agent.state.upper_bound,
        };
        if let Some(recipient) = self.order.next().map(Agent::id) {
            syncbb_debug!(
                "{} -> {} forward, {} elements, bound {}",
                id,
                recipient,
                message.path.len(),
                message.upper_bound
            );
            self.post(id, recipient, message);
            self.stats.forward_messages += 1;
        }
        Ok(())
    }

    /// Send the previous path of `id` back so the predecessor advances
    pub fn send_to_previous(&mut self, id: AgentId) -> Result<()> {
        let agent = self.order.get(id).ok_or(Error::UnknownAgent(id))?;
        let message = Message {
            path: agent.state.previous_path.clone(),
            upper_bound: agent.state.upper_bound,
        };
        if let Some(recipient) = self.order.previous().map(Agent::id) {
            syncbb_debug!(
                "{} -> {} backtrack, bound {}",
                id,
                recipient,
                message.upper_bound
            );
            self.post(id, recipient, message);
            self.stats.backtrack_messages += 1;
        }
        Ok(())
    }

    /// Consume the pending message of `id` and draw a new candidate
    ///
    /// A message from a later agent is a backtrack: the agent adopts the bound
    /// and advances its own value. A message from an earlier agent carries a
    /// new upstream path: the agent restarts its domain against it.
    pub fn receive(&mut self, id: AgentId) -> Result<()> {
        let Envelope { sender, message } = self.mailbox.receive(id)?;
        let from_downstream = self.order.is_parent(id, sender)?;
        let agent = self.order.get_mut(id).ok_or(Error::UnknownAgent(id))?;

        if from_downstream {
            let tail_violations = message.path.last().map_or(0, |e| e.violations);
            agent.state.upper_bound = message.upper_bound;
            if let DomainValue::Value(value) =
                draw_candidate(&self.checker, &mut self.stats, agent)?
            {
                agent.state.new_path.pop();
                agent
                    .state
                    .new_path
                    .push(PathElement::new(id, value, tail_violations));
            }
        } else {
            agent.variable.reset();
            agent.state.previous_path = message.path;
            agent.state.upper_bound = message.upper_bound;
            draw_candidate(&self.checker, &mut self.stats, agent)?;
        }
        Ok(())
    }

    fn post(&mut self, sender: AgentId, recipient: AgentId, message: Message<V>) {
        if let Some(unread) = self.mailbox.send(sender, recipient, message) {
            tracing::warn!(
                target: "syncbb",
                "Unread message from {} to {} overwritten",
                unread.sender,
                recipient
            );
        }
    }

    fn finish(&mut self, termination: Termination) {
        self.terminate = true;
        self.termination = Some(termination);
    }
}

/// Draw values until one passes [`check_path`] or the domain runs out
fn draw_candidate<V: Value, C: ConstraintChecker<V>>(
    checker: &C,
    stats: &mut RunStats,
    agent: &mut Agent<V>,
) -> Result<DomainValue<V>> {
    loop {
        let drawn = agent.variable.next();
        if drawn.is_exhausted() {
            syncbb_debug!("{} exhausted its domain", agent);
            return Ok(drawn);
        }

        agent.state.new_path.clear();
        agent.state.counter = 0;

        let previous_path = std::mem::take(&mut agent.state.previous_path);
        let accepted = check_path(checker, stats, &previous_path, agent);
        agent.state.previous_path = previous_path;

        if accepted? {
            return Ok(drawn);
        }
        stats.pruned_candidates += 1;
    }
}

fn check_path<V: Value, C: ConstraintChecker<V>>(
    checker: &C,
    stats: &mut RunStats,
    path: &[PathElement<V>],
    agent: &mut Agent<V>,
) -> Result<bool> {
    let label = agent.id();
    let value = agent.current_value().cloned().ok_or_else(|| {
        Error::ValidationError(format!("agent {} has no candidate to check", label))
    })?;

    for head in path {
        stats.constraint_checks += 1;
        if checker.check((head.var_label, &head.value), (label, &value))? {
            agent.state.new_path.push(head.clone());
            continue;
        }

        agent.state.counter += 1;
        let bound = agent.state.upper_bound;
        if bound.reached_by(agent.state.counter) || bound.reached_by(head.violations + 1) {
            syncbb_debug!("{} pruned {:?} against {}", label, value, head.var_label);
            return Ok(false);
        }
        agent.state.new_path.push(head.with_violation());
    }

    agent.state.new_path.push(PathElement::new(label, value, 0));
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dcop::types::checker_fn;

    fn chain(domains: &[Vec<i32>]) -> AgentOrder<i32> {
        let agents = domains
            .iter()
            .enumerate()
            .map(|(i, d)| Agent::new(AgentId(i as u32 + 1), d.clone()))
            .collect();
        AgentOrder::new(agents).unwrap()
    }

    fn not_equal() -> impl ConstraintChecker<i32> {
        checker_fn(|a: (AgentId, &i32), b: (AgentId, &i32)| a.1 != b.1)
    }

    #[test]
    fn test_check_first_agent_always_succeeds() {
        let mut engine = SyncBB::new(
            checker_fn(|_: (AgentId, &i32), _: (AgentId, &i32)| false),
            chain(&[vec![5], vec![6]]),
            Config::default(),
        );
        engine.order.get_mut(AgentId(1)).unwrap().variable.next();

        assert_eq!(engine.check(&[], AgentId(1)), Ok(true));
        let path = &engine.agent(AgentId(1)).unwrap().state.new_path;
        assert_eq!(path, &vec![PathElement::new(AgentId(1), 5, 0)]);
    }

    #[test]
    fn test_check_carries_violations() {
        let mut engine = SyncBB::new(not_equal(), chain(&[vec![1], vec![1], vec![1]]), Config::default());
        engine.order.get_mut(AgentId(3)).unwrap().variable.next();

        let upstream = vec![
            PathElement::new(AgentId(1), 1, 1),
            PathElement::new(AgentId(2), 2, 0),
        ];
        assert_eq!(engine.check(&upstream, AgentId(3)), Ok(true));

        let agent = engine.agent(AgentId(3)).unwrap();
        assert_eq!(agent.state.counter, 1);
        assert_eq!(
            agent.state.new_path,
            vec![
                PathElement::new(AgentId(1), 1, 2),
                PathElement::new(AgentId(2), 2, 0),
                PathElement::new(AgentId(3), 1, 0),
            ]
        );
    }

    #[test]
    fn test_check_prunes_on_counter() {
        let mut engine = SyncBB::new(not_equal(), chain(&[vec![1], vec![1], vec![1]]), Config::default());
        let agent = engine.order.get_mut(AgentId(3)).unwrap();
        agent.variable.next();
        agent.state.upper_bound = Bound::Finite(2);

        let upstream = vec![
            PathElement::new(AgentId(1), 1, 0),
            PathElement::new(AgentId(2), 1, 0),
        ];
        assert_eq!(engine.check(&upstream, AgentId(3)), Ok(false));
        assert_eq!(engine.agent(AgentId(3)).unwrap().state.counter, 2);
    }

    #[test]
    fn test_check_prunes_on_carried_violations() {
        let mut engine = SyncBB::new(not_equal(), chain(&[vec![1], vec![1]]), Config::default());
        let agent = engine.order.get_mut(AgentId(2)).unwrap();
        agent.variable.next();
        agent.state.upper_bound = Bound::Finite(3);

        let upstream = vec![PathElement::new(AgentId(1), 1, 2)];
        assert_eq!(engine.check(&upstream, AgentId(2)), Ok(false));
        assert_eq!(engine.agent(AgentId(2)).unwrap().state.counter, 1);
    }

    #[test]
    fn test_get_next_skips_pruned_values() {
        let mut engine = SyncBB::new(not_equal(), chain(&[vec![1], vec![1, 1, 2]]), Config::default());
        let agent = engine.order.get_mut(AgentId(2)).unwrap();
        agent.state.previous_path = vec![PathElement::new(AgentId(1), 1, 0)];
        agent.state.upper_bound = Bound::Finite(1);

        assert_eq!(engine.get_next(AgentId(2)), Ok(DomainValue::Value(2)));
        assert_eq!(engine.stats().pruned_candidates, 2);
        assert_eq!(engine.get_next(AgentId(2)), Ok(DomainValue::Exhausted));
    }

    #[test]
    fn test_two_agents_not_equal() {
        let mut engine = SyncBB::new(not_equal(), chain(&[vec![1, 2], vec![1, 2]]), Config::default());
        let outcome = engine.run().unwrap();

        assert!(engine.is_terminated());
        assert_eq!(outcome.termination, Termination::Satisfied);
        let solution = outcome.solution.unwrap();
        assert_eq!(solution.cost, 0);
        assert_eq!(solution.value_of(AgentId(1)), Some(&1));
        assert_eq!(solution.value_of(AgentId(2)), Some(&2));
    }

    #[test]
    fn test_always_reject_exhausts_without_solution() {
        let mut engine = SyncBB::new(
            checker_fn(|_: (AgentId, &i32), _: (AgentId, &i32)| false),
            chain(&[vec![1], vec![1]]),
            Config::default(),
        );
        let outcome = engine.run().unwrap();

        assert!(engine.is_terminated());
        assert_eq!(outcome.termination, Termination::Exhausted);
        assert!(outcome.solution.is_none());
        assert_eq!(outcome.stats.backtrack_messages, 1);
        // The over-bound candidate the last agent held still sets its bound
        assert_eq!(
            engine.agent(AgentId(2)).unwrap().state.upper_bound,
            Bound::Finite(1)
        );
    }

    #[test]
    fn test_tolerated_violation_found_after_backtrack() {
        let mut engine = SyncBB::new(
            not_equal(),
            chain(&[vec![1, 2], vec![1], vec![1]]),
            Config::default().with_max_cost(1),
        );
        let outcome = engine.run().unwrap();

        assert_eq!(outcome.termination, Termination::Satisfied);
        let solution = outcome.solution.unwrap();
        assert_eq!(solution.cost, 1);
        assert_eq!(solution.value_of(AgentId(1)), Some(&2));
        assert_eq!(solution.value_of(AgentId(2)), Some(&1));
        assert_eq!(solution.value_of(AgentId(3)), Some(&1));
    }

    #[test]
    fn test_tolerated_violation_exceeded() {
        let mut engine = SyncBB::new(
            not_equal(),
            chain(&[vec![1, 2], vec![1], vec![1]]),
            Config::default(),
        );
        let outcome = engine.run().unwrap();

        assert_eq!(outcome.termination, Termination::Exhausted);
        assert!(outcome.solution.is_none());
    }

    #[test]
    fn test_single_agent_chain() {
        let mut engine = SyncBB::new(not_equal(), chain(&[vec![7, 8]]), Config::default());
        let outcome = engine.run().unwrap();

        assert!(outcome.is_satisfied());
        assert_eq!(outcome.solution.unwrap().path, vec![PathElement::new(AgentId(1), 7, 0)]);
    }

    #[test]
    fn test_empty_first_domain_exhausts() {
        let mut engine = SyncBB::new(not_equal(), chain(&[vec![], vec![1]]), Config::default());
        let outcome = engine.run().unwrap();

        assert_eq!(outcome.termination, Termination::Exhausted);
        assert!(outcome.solution.is_none());
        assert_eq!(outcome.stats.steps, 0);
    }

    #[test]
    fn test_receive_without_message_fails() {
        let mut engine = SyncBB::new(not_equal(), chain(&[vec![1], vec![2]]), Config::default());
        assert_eq!(engine.receive(AgentId(2)), Err(Error::MailboxEmpty(AgentId(2))));
    }

    #[test]
    fn test_engine_runs_once() {
        let mut engine = SyncBB::new(not_equal(), chain(&[vec![1, 2], vec![1, 2]]), Config::default());
        engine.run().unwrap();
        assert!(matches!(engine.run(), Err(Error::ValidationError(_))));
    }

    #[test]
    fn test_step_limit() {
        let mut engine = SyncBB::new(
            checker_fn(|_: (AgentId, &i32), _: (AgentId, &i32)| false),
            chain(&[vec![1, 2, 3], vec![1, 2, 3], vec![1, 2, 3]]),
            Config::default().with_max_steps(2),
        );
        let outcome = engine.run().unwrap();

        assert_eq!(outcome.termination, Termination::StepLimitReached);
        assert_eq!(outcome.stats.steps, 2);
        assert!(!engine.is_terminated());
    }

    struct FailingChecker;

    impl ConstraintChecker<i32> for FailingChecker {
        fn check(&self, _lhs: (AgentId, &i32), _rhs: (AgentId, &i32)) -> Result<bool> {
            Err(Error::Checker("board unavailable".to_string()))
        }
    }

    #[test]
    fn test_checker_failure_aborts_run() {
        let mut engine = SyncBB::new(FailingChecker, chain(&[vec![1], vec![1]]), Config::default());
        assert_eq!(
            engine.run(),
            Err(Error::Checker("board unavailable".to_string()))
        );
    }
}
