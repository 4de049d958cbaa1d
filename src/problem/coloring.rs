//! Graph coloring as a distributed constraint problem
//!
//! Each node is an agent choosing a color from `0..colors`. Adjacent nodes
//! must not share a color.

use super::ProblemInstance;
use crate::dcop::agent::Agent;
use crate::dcop::types::{AgentId, ConstraintChecker};
use crate::error::{Error, Result};
use anyhow::Context;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColoringProblem {
    pub nodes: Vec<AgentId>,
    pub edges: Vec<(AgentId, AgentId)>,
    pub colors: u32,
    #[serde(default)]
    pub max_cost: u32,
}

/// Rejects equal colors across an edge and accepts every non-adjacent pair
#[derive(Debug, Clone, Default)]
pub struct NotEqualChecker {
    adjacent: HashSet<(AgentId, AgentId)>,
}

impl NotEqualChecker {
    pub fn new(edges: &[(AgentId, AgentId)]) -> Self {
        let adjacent = edges
            .iter()
            .flat_map(|&(a, b)| [(a, b), (b, a)])
            .collect();
        Self { adjacent }
    }

    pub fn is_adjacent(&self, a: AgentId, b: AgentId) -> bool {
        self.adjacent.contains(&(a, b))
    }
}

impl ConstraintChecker<u32> for NotEqualChecker {
    fn check(&self, lhs: (AgentId, &u32), rhs: (AgentId, &u32)) -> Result<bool> {
        Ok(!self.is_adjacent(lhs.0, rhs.0) || lhs.1 != rhs.1)
    }
}

impl ColoringProblem {
    /// Number of edges whose endpoints share a color in `assignment`
    pub fn conflicts<'a>(&self, assignment: impl IntoIterator<Item = (AgentId, &'a u32)>) -> usize {
        let colors: std::collections::HashMap<AgentId, u32> =
            assignment.into_iter().map(|(id, c)| (id, *c)).collect();
        self.edges
            .iter()
            .filter(|(a, b)| matches!((colors.get(a), colors.get(b)), (Some(x), Some(y)) if x == y))
            .count()
    }
}

impl ProblemInstance for ColoringProblem {
    type Value = u32;
    type Checker = NotEqualChecker;

    fn agents(&self) -> Vec<Agent<u32>> {
        let domain: Vec<u32> = (0..self.colors).collect();
        self.nodes
            .iter()
            .map(|&id| Agent::new(id, domain.clone()))
            .collect()
    }

    fn checker(&self) -> Result<NotEqualChecker> {
        Ok(NotEqualChecker::new(&self.edges))
    }

    fn max_cost(&self) -> u32 {
        self.max_cost
    }

    fn validate(&self) -> Result<()> {
        if self.colors == 0 {
            return Err(Error::ValidationError("colors must be positive".to_string()));
        }
        let nodes: HashSet<AgentId> = self.nodes.iter().copied().collect();
        for &(a, b) in &self.edges {
            if a == b {
                return Err(Error::ValidationError(format!("self-loop on node {}", a)));
            }
            for end in [a, b] {
                if !nodes.contains(&end) {
                    return Err(Error::UnknownAgent(end));
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ColoringGenParams {
    pub nodes: usize,
    /// Probability that any pair of nodes is joined by an edge
    pub edge_probability: f64,
    pub colors: u32,
    pub max_cost: u32,
    /// Seed for reproducible graphs, OS entropy when absent
    pub seed: Option<u64>,
}

impl Default for ColoringGenParams {
    fn default() -> Self {
        Self {
            nodes: 6,
            edge_probability: 0.4,
            colors: 3,
            max_cost: 0,
            seed: None,
        }
    }
}

pub fn generate_random_coloring(params: &ColoringGenParams) -> Result<ColoringProblem> {
    if !(0.0..=1.0).contains(&params.edge_probability) {
        return Err(Error::ConfigurationError(format!(
            "edge_probability must be within [0, 1], got {}",
            params.edge_probability
        )));
    }
    let mut rng = match params.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let nodes: Vec<AgentId> = (1..=params.nodes).map(|i| AgentId(i as u32)).collect();
    let mut edges = Vec::new();
    for (i, &a) in nodes.iter().enumerate() {
        for &b in &nodes[i + 1..] {
            if rng.random_bool(params.edge_probability) {
                edges.push((a, b));
            }
        }
    }

    Ok(ColoringProblem {
        nodes,
        edges,
        colors: params.colors,
        max_cost: params.max_cost,
    })
}

pub fn load_coloring(path: &Path) -> anyhow::Result<ColoringProblem> {
    let json = fs::read_to_string(path).context("Failed to read coloring file")?;
    let problem: ColoringProblem =
        serde_json::from_str(&json).context("Failed to parse coloring json")?;
    Ok(problem)
}

pub fn save_coloring(problem: &ColoringProblem, path: &Path) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(problem).context("Failed to serialize coloring")?;
    fs::write(path, json).context("Failed to write coloring file")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dcop::engine::Termination;

    fn triangle(colors: u32, max_cost: u32) -> ColoringProblem {
        let nodes = vec![AgentId(1), AgentId(2), AgentId(3)];
        ColoringProblem {
            edges: vec![
                (nodes[0], nodes[1]),
                (nodes[1], nodes[2]),
                (nodes[0], nodes[2]),
            ],
            nodes,
            colors,
            max_cost,
        }
    }

    #[test]
    fn test_checker_ignores_non_adjacent() {
        let checker = NotEqualChecker::new(&[(AgentId(1), AgentId(2))]);
        assert_eq!(checker.check((AgentId(2), &0), (AgentId(1), &0)), Ok(false));
        assert_eq!(checker.check((AgentId(1), &0), (AgentId(3), &0)), Ok(true));
        assert_eq!(checker.check((AgentId(1), &0), (AgentId(2), &1)), Ok(true));
    }

    #[test]
    fn test_triangle_three_colors() {
        let problem = triangle(3, 0);
        let outcome = problem.resolve().unwrap();

        assert_eq!(outcome.termination, Termination::Satisfied);
        let solution = outcome.solution.unwrap();
        let colors: Vec<u32> = solution.assignment().map(|(_, c)| *c).collect();
        assert_eq!(colors, vec![0, 1, 2]);
        assert_eq!(problem.conflicts(solution.assignment()), 0);
    }

    #[test]
    fn test_triangle_two_colors_exhausts() {
        let outcome = triangle(2, 0).resolve().unwrap();

        assert_eq!(outcome.termination, Termination::Exhausted);
        assert_eq!(outcome.solution.unwrap().cost, 1);
    }

    #[test]
    fn test_triangle_two_colors_tolerated() {
        let outcome = triangle(2, 1).resolve().unwrap();

        assert_eq!(outcome.termination, Termination::Satisfied);
        assert_eq!(outcome.solution.unwrap().cost, 1);
    }

    #[test]
    fn test_validate() {
        let mut problem = triangle(0, 0);
        assert!(matches!(problem.validate(), Err(Error::ValidationError(_))));

        problem.colors = 2;
        problem.edges.push((AgentId(1), AgentId(9)));
        assert_eq!(problem.validate(), Err(Error::UnknownAgent(AgentId(9))));

        problem.edges.pop();
        problem.edges.push((AgentId(2), AgentId(2)));
        assert!(matches!(problem.validate(), Err(Error::ValidationError(_))));
    }

    #[test]
    fn test_seeded_generation_is_reproducible() {
        let params = ColoringGenParams {
            nodes: 8,
            seed: Some(7),
            ..Default::default()
        };
        let a = generate_random_coloring(&params).unwrap();
        let b = generate_random_coloring(&params).unwrap();

        assert_eq!(a, b);
        assert_eq!(a.nodes.len(), 8);
        assert!(a.edges.iter().all(|(x, y)| x < y));
        assert!(a.validate().is_ok());
    }

    #[test]
    fn test_generated_extremes() {
        let complete = generate_random_coloring(&ColoringGenParams {
            nodes: 4,
            edge_probability: 1.0,
            seed: Some(1),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(complete.edges.len(), 6);

        let empty = generate_random_coloring(&ColoringGenParams {
            nodes: 4,
            edge_probability: 0.0,
            seed: Some(1),
            ..Default::default()
        })
        .unwrap();
        assert!(empty.edges.is_empty());

        let invalid = generate_random_coloring(&ColoringGenParams {
            edge_probability: 1.5,
            ..Default::default()
        });
        assert!(matches!(invalid, Err(Error::ConfigurationError(_))));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.json");
        let problem = triangle(3, 1);

        save_coloring(&problem, &path).unwrap();
        assert_eq!(load_coloring(&path).unwrap(), problem);
    }

    #[test]
    fn test_load_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.json");
        fs::write(&path, "{ not json").unwrap();

        let err = load_coloring(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse coloring json"));
    }
}
