use super::Outcome;
use crate::dcop::order::AgentOrder;
use crate::dcop::types::{Solution, Value};

#[macro_export]
macro_rules! syncbb_info {
    ($($arg:tt)+) => {
        tracing::info!(target: "syncbb", $($arg)+)
    }
}

#[macro_export]
macro_rules! syncbb_debug {
    ($($arg:tt)+) => {
        tracing::debug!(target: "syncbb", $($arg)+)
    }
}

/// Log every agent's current candidate, bound and proposed path
pub fn log_order_status<V: Value>(order: &AgentOrder<V>) {
    syncbb_info!("Agent order status:");
    for agent in order.iter() {
        let path_str = agent
            .state
            .new_path
            .iter()
            .map(|e| format!("{}={:?}/{}", e.var_label, e.value, e.violations))
            .collect::<Vec<_>>()
            .join(", ");
        match agent.current_value() {
            Some(value) => syncbb_info!(
                "  {} value {:?} bound {} path [{}]",
                agent,
                value,
                agent.state.upper_bound,
                path_str
            ),
            None => syncbb_info!(
                "  {} has no candidate, bound {}",
                agent,
                agent.state.upper_bound
            ),
        }
    }
}

/// Log the result of a finished run
pub fn log_outcome<V: Value>(outcome: &Outcome<V>) {
    syncbb_info!(
        "Run finished ({:?}) after {} steps, {} forward / {} backtrack messages, {} checks, {} pruned",
        outcome.termination,
        outcome.stats.steps,
        outcome.stats.forward_messages,
        outcome.stats.backtrack_messages,
        outcome.stats.constraint_checks,
        outcome.stats.pruned_candidates
    );
    match &outcome.solution {
        Some(solution) => log_solution(solution),
        None => syncbb_info!("No solution recorded"),
    }
}

pub fn log_solution<V: Value>(solution: &Solution<V>) {
    syncbb_info!("Solution with cost {}:", solution.cost);
    for (label, value) in solution.assignment() {
        syncbb_info!("  {}: {:?}", label, value);
    }
}
