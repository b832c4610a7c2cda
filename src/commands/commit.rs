use anyhow::{Result, bail};
use colored::Colorize;

use crate::config::ConfigStore;
use crate::provider::{self, ProviderError};
use crate::{fallback, git};

use super::{prompt_input, spinner};

pub fn run(provider_name: Option<&str>, context: Option<&str>, auto_stage: bool) -> Result<()> {
    let status = spinner("Analyzing changes...");

    let store = ConfigStore::new()?;
    let config = store.load()?;

    if auto_stage {
        status.set_message("Staging changes...");
        git::stage_all()?;
    }

    let mut staged = git::staged_changes()?;
    let mut diff = git::detailed_diff(true)?;
    let recent = git::recent_commits(5)?;
    let context_path = store.find_context_file(context)?;

    if staged.is_empty() {
        status.finish_and_clear();
        println!("{}", "No staged changes found.".yellow());

        let unstaged = git::unstaged_changes()?;
        if unstaged.is_empty() {
            bail!("Nothing to commit. Stage some changes first.");
        }

        println!("{}", "Unstaged changes detected:".bright_black());
        for change in &unstaged {
            println!(
                "{}",
                format!("  {}: {}", change.status.as_str(), change.file).bright_black()
            );
        }
        println!();

        let answer = prompt_input("Stage all changes and generate commit message? [Y/n]: ")?;
        if !answer.is_empty()
            && !answer.eq_ignore_ascii_case("y")
            && !answer.eq_ignore_ascii_case("yes")
        {
            bail!("Nothing to commit. Stage some changes first.");
        }

        git::stage_all()?;
        staged = git::staged_changes()?;
        diff = git::detailed_diff(true)?;
    }

    status.finish_and_clear();
    let status = spinner("Generating commit message...");
    let context_file = store.read_context_file(context_path)?;
    let prompt = provider::commit_prompt(&staged, &diff, &recent, context_file.as_ref());
    let name = provider_name.unwrap_or(&config.default_provider);

    let suggestions = match provider::create(name, &config)
        .and_then(|backend| backend.generate_commit_message(&prompt))
    {
        Ok(suggestions) => suggestions,
        Err(err @ ProviderError::Configuration(_)) => {
            status.finish_and_clear();
            return Err(err.into());
        }
        Err(err) => {
            log::warn!("AI provider unavailable, using basic commit message: {err}");
            fallback::commit_fallback(&staged)
        }
    };

    status.finish_and_clear();

    println!("{}", "Commit message suggestions:".green());
    println!();

    for (index, suggestion) in suggestions.iter().enumerate() {
        println!("{}", format!("{}. {}", index + 1, suggestion.message).cyan());
        if let Some(body) = &suggestion.body {
            println!("{}", "   Body:".bright_black());
            for line in body.lines() {
                println!("{}", format!("   {line}").bright_black());
            }
        }
        if let Some(kind) = suggestion.kind {
            println!("{}", format!("   Type: {kind}").bright_black());
        }
        println!();
    }

    println!("{}", "Staged changes:".yellow());
    for change in &staged {
        println!(
            "{}",
            format!("  {}: {}", change.status.as_str(), change.file).bright_black()
        );
    }
    println!();

    println!("{}", "Tips:".yellow());
    println!("{}", "- Copy the commit message you prefer".bright_black());
    println!(
        "{}",
        "- Commit with: git commit -m \"<message>\"".bright_black()
    );
    println!(
        "{}",
        "- Or use: git commit and paste in your editor".bright_black()
    );
    println!();

    Ok(())
}
