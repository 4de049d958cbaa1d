//! N-Queens solved by SyncBB, one agent per queen

use clap::Parser;
use syncbb::logger;
use syncbb::problem::{ProblemInstance, Queens};
use syncbb::Termination;

#[derive(Parser)]
#[command(author, version, about = "N-Queens DCSP simulation", long_about = None)]
struct Cli {
    /// Number of agents (queens)
    #[arg(long, short = 'n', default_value_t = 4)]
    num_agents: u32,

    /// Board side length
    #[arg(long, default_value_t = 4)]
    board_size: u32,

    /// Highest tolerated violation count
    #[arg(long, default_value_t = 0)]
    max_cost: u32,

    /// Log filter, e.g. "info" or "syncbb=debug"
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logger::init_stdout(&cli.log_level)?;

    let queens = Queens::new(cli.num_agents, cli.board_size, cli.max_cost)?;
    let outcome = queens.resolve()?;

    match (&outcome.solution, outcome.termination) {
        (Some(solution), Termination::Satisfied) => {
            println!("Solution with cost {}:", solution.cost);
            for (label, cell) in solution.assignment() {
                println!("  {}: {}", label, cell);
            }
        }
        (Some(solution), _) => {
            println!(
                "No solution under bound {}, last candidate had cost {}",
                queens.max_cost, solution.cost
            );
        }
        (None, _) => println!("No solution under bound {}", queens.max_cost),
    }

    Ok(())
}
