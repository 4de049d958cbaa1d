use crate::dcop::engine::{Outcome, RunStats, Termination};
use crate::dcop::types::Value;
use serde::Serialize;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Debug, Serialize)]
pub struct AssignmentRecord {
    pub agent_id: u32,
    pub value: String,
    pub violations: u32,
}

#[derive(Debug, Serialize)]
pub struct RunReport {
    pub agent_count: usize,
    pub max_cost: u32,
    pub termination: Termination,
    /// Cost of the recorded solution, absent when none was recorded
    pub cost: Option<u32>,
    pub assignment: Vec<AssignmentRecord>,
    pub stats: RunStats,
    pub duration_ms: f64,
}

pub fn build_report<V: Value>(
    outcome: &Outcome<V>,
    agent_count: usize,
    max_cost: u32,
    run_start: Instant,
) -> RunReport {
    let assignment = outcome
        .solution
        .iter()
        .flat_map(|s| s.path.iter())
        .map(|e| AssignmentRecord {
            agent_id: e.var_label.0,
            value: format!("{:?}", e.value),
            violations: e.violations,
        })
        .collect();

    RunReport {
        agent_count,
        max_cost,
        termination: outcome.termination,
        cost: outcome.solution.as_ref().map(|s| s.cost),
        assignment,
        stats: outcome.stats.clone(),
        duration_ms: run_start.elapsed().as_secs_f64() * 1000.0,
    }
}

pub fn write_report_json<P: AsRef<Path>>(
    report: &RunReport,
    result_dir: P,
) -> std::io::Result<PathBuf> {
    let summary_path = result_dir.as_ref().join("summary.json");
    let mut summary_file = File::create(&summary_path)?;
    serde_json::to_writer_pretty(&mut summary_file, report)?;
    Ok(summary_path)
}
