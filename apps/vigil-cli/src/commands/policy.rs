// policy.rs — Policy subcommands: init, show, set-profile, plus lock/unlock.

use std::path::Path;

use clap::Subcommand;
use vigil_policy::{ExecutionProfile, PolicyDocument, PolicyStore};

#[derive(Subcommand)]
pub enum PolicyCommands {
    /// Write a default policy document to .vigil/policy.yaml.
    Init,
    /// Print the current policy document as YAML.
    Show,
    /// Set the execution profile (dev, standard, execution-only, gateway-only).
    SetProfile {
        /// Profile name. `locked` is not accepted here; use `vigil lock`.
        profile: String,
    },
}

pub fn execute(cmd: &PolicyCommands, project_root: &Path) -> anyhow::Result<()> {
    let store = PolicyStore::for_project(project_root);

    match cmd {
        PolicyCommands::Init => {
            if store.path().exists() {
                println!("Policy already exists at {}", store.path().display());
                return Ok(());
            }
            store.init(&PolicyDocument::default())?;
            println!("Wrote default policy to {}", store.path().display());
        }

        PolicyCommands::Show => {
            let policy = store.load()?;
            print!("{}", serde_yaml::to_string(&policy.document)?);
        }

        PolicyCommands::SetProfile { profile } => {
            let profile = match profile.as_str() {
                "dev" => ExecutionProfile::Dev,
                "standard" => ExecutionProfile::Standard,
                "execution-only" => ExecutionProfile::ExecutionOnly,
                "gateway-only" => ExecutionProfile::GatewayOnly,
                "locked" => anyhow::bail!("use `vigil lock` to engage the panic lock"),
                other => anyhow::bail!("unknown profile '{}'", other),
            };
            store.set_profile(profile)?;
            println!("Execution profile set to {}", profile);
        }
    }

    Ok(())
}

pub fn lock(project_root: &Path) -> anyhow::Result<()> {
    let store = PolicyStore::for_project(project_root);
    store.lock()?;
    println!("Panic lock engaged. Every gate will refuse until `vigil unlock`.");
    Ok(())
}

pub fn unlock(project_root: &Path) -> anyhow::Result<()> {
    let store = PolicyStore::for_project(project_root);
    store.unlock()?;
    println!("Panic lock released; execution profile is now standard.");
    Ok(())
}
