// plan.rs — Plan subcommands: show.

use std::path::Path;

use clap::Subcommand;
use vigil_intent::resolve_plan;

#[derive(Subcommand)]
pub enum PlanCommands {
    /// Show the resolved plan file and its declared scope.
    Show,
}

pub fn execute(cmd: &PlanCommands, project_root: &Path) -> anyhow::Result<()> {
    match cmd {
        PlanCommands::Show => {
            let Some(plan) = resolve_plan(project_root)? else {
                println!("No plan file found.");
                return Ok(());
            };

            println!("Plan: {}", plan.path.display());
            if plan.declared_scope.is_empty() {
                println!("Declared scope: none (writes are unrestricted)");
            } else {
                println!("Declared scope:");
                for entry in &plan.declared_scope {
                    println!("  {}", entry.display());
                }
            }
            println!();
            println!("{}", plan.raw_text_preview);
        }
    }

    Ok(())
}
