// classify.rs — Score a prompt's intent from the command line.

use std::path::Path;

use vigil_intent::classify;
use vigil_policy::PolicyStore;

pub fn execute(prompt: &str, project_root: &Path) -> anyhow::Result<()> {
    let policy = PolicyStore::for_project(project_root).load()?;
    let classification = classify(prompt, &policy);

    println!("category:   {}", classification.category);
    println!(
        "confidence: {:.2}{}",
        classification.confidence,
        if classification.high_confidence {
            ""
        } else {
            " (below threshold)"
        },
    );
    println!();
    for (category, score) in &classification.scores {
        println!("  {:<12} {:.1}", category.to_string(), score);
    }

    Ok(())
}
