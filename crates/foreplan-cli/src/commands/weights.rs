//! Adaptive weight state commands for CLI.

use clap::Subcommand;
use foreplan_core::storage::Database;

#[derive(Subcommand)]
pub enum WeightsAction {
    /// Show the learned base weights and counters
    Show,
    /// Reset the weight state to the balanced default
    Reset,
}

pub fn run(action: WeightsAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;

    match action {
        WeightsAction::Show => {
            let state = db.weight_state()?;
            println!("projects evaluated: {}", state.projects_evaluated);
            println!("outcome samples: {}", state.samples.len());
            println!("base weights:");
            for (name, value) in state.base.entries() {
                println!("  {name:<30} {value:.4}");
            }
        }
        WeightsAction::Reset => {
            db.reset_weight_state()?;
            println!("Weights reset to balanced");
        }
    }
    Ok(())
}
