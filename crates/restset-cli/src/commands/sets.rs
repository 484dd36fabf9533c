use clap::Subcommand;
use restset_core::session::format_sets;

use super::open_headless;

#[derive(Subcommand)]
pub enum SetsAction {
    /// Show completed and target sets
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Reset the completed count to zero
    Reset,
}

pub fn run(action: SetsAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut controller = open_headless()?;
    match action {
        SetsAction::Show { json } => {
            let progress = controller.progress();
            if json {
                println!("{}", serde_json::to_string_pretty(&progress)?);
            } else {
                println!("{}", format_sets(progress.current, progress.target));
            }
        }
        SetsAction::Reset => {
            controller.reset_sets();
            let progress = controller.progress();
            println!("{}", format_sets(progress.current, progress.target));
        }
    }
    Ok(())
}
