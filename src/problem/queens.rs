//! N-Queens as a distributed constraint satisfaction problem
//!
//! Every agent places one queen and may pick any cell of the board. Two
//! placements violate their constraint when they share a cell, row, column or
//! diagonal.

use super::ProblemInstance;
use crate::dcop::agent::Agent;
use crate::dcop::types::{AgentId, ConstraintChecker};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Board cell, zero-based
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    pub row: u32,
    pub col: u32,
}

impl Cell {
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// True if a queen on `self` and one on `other` attack each other
    pub fn attacks(&self, other: &Cell) -> bool {
        self.row == other.row
            || self.col == other.col
            || self.row.abs_diff(other.row) == self.col.abs_diff(other.col)
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

impl From<(u32, u32)> for Cell {
    fn from((row, col): (u32, u32)) -> Self {
        Self::new(row, col)
    }
}

/// Pairwise non-attacking predicate
#[derive(Debug, Clone, Copy, Default)]
pub struct QueensChecker;

impl ConstraintChecker<Cell> for QueensChecker {
    fn check(&self, lhs: (AgentId, &Cell), rhs: (AgentId, &Cell)) -> Result<bool> {
        Ok(!lhs.1.attacks(rhs.1))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Queens {
    pub num_agents: u32,
    pub board_size: u32,
    pub max_cost: u32,
}

impl Default for Queens {
    fn default() -> Self {
        Self::four()
    }
}

impl Queens {
    pub fn new(num_agents: u32, board_size: u32, max_cost: u32) -> Result<Self> {
        let queens = Self {
            num_agents,
            board_size,
            max_cost,
        };
        queens.validate()?;
        Ok(queens)
    }

    /// Four queens on a 4x4 board, no violations tolerated
    pub fn four() -> Self {
        Self {
            num_agents: 4,
            board_size: 4,
            max_cost: 0,
        }
    }

    /// All cells in row-major order
    pub fn cells(&self) -> Vec<Cell> {
        (0..self.board_size)
            .flat_map(|row| (0..self.board_size).map(move |col| Cell::new(row, col)))
            .collect()
    }
}

impl ProblemInstance for Queens {
    type Value = Cell;
    type Checker = QueensChecker;

    fn agents(&self) -> Vec<Agent<Cell>> {
        let cells = self.cells();
        (1..=self.num_agents)
            .map(|i| Agent::new(AgentId(i), cells.clone()))
            .collect()
    }

    fn checker(&self) -> Result<QueensChecker> {
        Ok(QueensChecker)
    }

    fn max_cost(&self) -> u32 {
        self.max_cost
    }

    fn validate(&self) -> Result<()> {
        if self.num_agents == 0 {
            return Err(Error::ValidationError(
                "num_agents must be positive".to_string(),
            ));
        }
        if self.board_size == 0 {
            return Err(Error::ValidationError(
                "board_size must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
