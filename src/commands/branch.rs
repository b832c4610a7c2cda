use anyhow::Result;
use colored::Colorize;

use crate::config::ConfigStore;
use crate::provider::{self, ProviderError};
use crate::{fallback, git};

use super::spinner;

pub fn run(provider_name: Option<&str>, context: Option<&str>) -> Result<()> {
    let spinner = spinner("Analyzing repository...");

    let store = ConfigStore::new()?;
    let config = store.load()?;

    let repo = git::repository_info()?;
    let context_path = store.find_context_file(context)?;

    spinner.set_message("Reading context...");
    let context_file = store.read_context_file(context_path)?;

    spinner.set_message("Generating branch name...");
    let name = provider_name.unwrap_or(&config.default_provider);
    let prompt = provider::branch_prompt(&repo, context_file.as_ref());

    let suggestions = match provider::create(name, &config)
        .and_then(|backend| backend.generate_branch_name(&prompt))
    {
        Ok(suggestions) => suggestions,
        Err(err @ ProviderError::Configuration(_)) => {
            spinner.finish_and_clear();
            return Err(err.into());
        }
        Err(err) => {
            log::warn!("AI provider unavailable, using basic branch name: {err}");
            fallback::branch_fallback(&repo)
        }
    };

    spinner.finish_and_clear();

    println!("{}", "Branch name suggestions:".green());
    println!();

    for (index, suggestion) in suggestions.iter().enumerate() {
        println!("{}", format!("{}. {}", index + 1, suggestion.name).cyan());
        if let Some(description) = &suggestion.description {
            println!("{}", format!("   {description}").bright_black());
        }
        println!();
    }

    println!("{}", "Tips:".yellow());
    println!("{}", "- Copy the branch name you prefer".bright_black());
    println!(
        "{}",
        "- Create with: git checkout -b <branch-name>".bright_black()
    );
    println!();

    Ok(())
}
