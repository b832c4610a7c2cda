use anyhow::{Result, bail};
use colored::Colorize;
use serde_json::Value;

use crate::config::ConfigStore;

use super::prompt_input;

pub fn run(set: Option<&str>, get: Option<&str>, list: bool) -> Result<()> {
    let store = ConfigStore::new()?;

    if list {
        return list_config(&store);
    }
    if let Some(key) = get {
        return get_value(&store, key);
    }
    if let Some(pair) = set {
        return set_value(&store, pair);
    }

    interactive(&store)
}

fn list_config(store: &ConfigStore) -> Result<()> {
    let config = store.load()?;

    println!("{}", "Current configuration:".green());
    println!();
    println!("{}", "Providers:".cyan());

    for (name, settings) in &config.providers {
        let state = if settings.enabled {
            "enabled".green()
        } else {
            "disabled".red()
        };
        println!("  {name}: {state}");
        if let Some(command) = &settings.command {
            println!("{}", format!("    command: {command}").bright_black());
        }
        if let Some(endpoint) = &settings.endpoint {
            println!("{}", format!("    endpoint: {endpoint}").bright_black());
        }
    }

    println!();
    println!("{}", "Settings:".cyan());
    println!(
        "{}",
        format!("  Default provider: {}", config.default_provider).bright_black()
    );
    println!(
        "{}",
        format!("  Context file: {}", config.context_files.default_file).bright_black()
    );
    println!(
        "{}",
        format!("  Branch max length: {}", config.branch.max_length).bright_black()
    );
    println!(
        "{}",
        format!("  Commit max length: {}", config.commit.max_length).bright_black()
    );
    println!(
        "{}",
        format!(
            "  Conventional commits: {}",
            if config.commit.conventional_commits {
                "yes"
            } else {
                "no"
            }
        )
        .bright_black()
    );
    println!();

    Ok(())
}

fn get_value(store: &ConfigStore, key: &str) -> Result<()> {
    match store.get(key)? {
        None => println!(
            "{}",
            format!("Configuration key '{key}' not found").yellow()
        ),
        Some(value) => {
            println!("{}", format!("{key}:").green());
            match value {
                Value::String(text) => println!("{text}"),
                other => println!("{}", serde_json::to_string_pretty(&other)?),
            }
        }
    }
    Ok(())
}

fn set_value(store: &ConfigStore, pair: &str) -> Result<()> {
    let Some((key, raw_value)) = pair.split_once('=') else {
        bail!("Invalid format. Use: key=value");
    };
    if key.is_empty() {
        bail!("Invalid format. Use: key=value");
    }

    // Values that parse as JSON keep their type; anything else is a string.
    let value =
        serde_json::from_str(raw_value).unwrap_or_else(|_| Value::String(raw_value.to_string()));

    store.set(key, value.clone())?;
    println!(
        "{}",
        format!("Set {key} = {}", serde_json::to_string(&value)?).green()
    );
    Ok(())
}

fn interactive(store: &ConfigStore) -> Result<()> {
    println!("{}", "Interactive configuration".green());

    loop {
        println!();
        println!("What would you like to configure?");
        println!("  1) Default AI provider");
        println!("  2) Claude Code provider");
        println!("  3) Gemini CLI provider");
        println!("  4) API endpoint provider");
        println!("  5) View current configuration");
        println!("  q) Quit");

        match prompt_input("Enter choice: ")?.as_str() {
            "1" => configure_default_provider(store)?,
            "2" => configure_subprocess(store, "claude", "Claude Code")?,
            "3" => configure_subprocess(store, "gemini", "Gemini CLI")?,
            "4" => configure_api(store)?,
            "5" => list_config(store)?,
            "q" | "Q" | "" => return Ok(()),
            other => println!("{}", format!("Unknown choice: {other}").yellow()),
        }
    }
}

fn configure_default_provider(store: &ConfigStore) -> Result<()> {
    let config = store.load()?;
    let choice = prompt_input(&format!(
        "Default provider (claude/gemini/api) [{}]: ",
        config.default_provider
    ))?;

    if choice.is_empty() {
        return Ok(());
    }
    if !config.providers.contains_key(&choice) {
        println!("{}", format!("Unknown provider: {choice}").yellow());
        return Ok(());
    }

    store.set("defaultProvider", Value::String(choice.clone()))?;
    println!("{}", format!("Default provider set to: {choice}").green());
    Ok(())
}

fn configure_subprocess(store: &ConfigStore, name: &str, label: &str) -> Result<()> {
    let config = store.load()?;
    let current = config
        .providers
        .get(name)
        .and_then(|p| p.command.clone())
        .unwrap_or_default();

    let command = prompt_input(&format!("{label} command [{current}]: "))?;
    if !command.is_empty() {
        store.set(&format!("providers.{name}.command"), Value::String(command))?;
    }

    let enabled = prompt_input(&format!("Enable {label} provider? [Y/n]: "))?;
    let enabled = enabled.is_empty() || enabled.eq_ignore_ascii_case("y");
    store.set(&format!("providers.{name}.enabled"), Value::Bool(enabled))?;

    println!("{}", format!("{label} configuration updated").green());
    Ok(())
}

fn configure_api(store: &ConfigStore) -> Result<()> {
    let config = store.load()?;
    let settings = config.providers.get("api").cloned().unwrap_or_default();

    let endpoint = prompt_input(&format!(
        "API endpoint URL [{}]: ",
        settings.endpoint.as_deref().unwrap_or("")
    ))?;
    if !endpoint.is_empty() {
        store.set("providers.api.endpoint", Value::String(endpoint))?;
    }

    let api_key = prompt_input("API key (optional, enter to keep): ")?;
    if !api_key.is_empty() {
        store.set("providers.api.apiKey", Value::String(api_key))?;
    }

    let model = prompt_input(&format!(
        "Model name [{}]: ",
        settings.model.as_deref().unwrap_or("")
    ))?;
    if !model.is_empty() {
        store.set("providers.api.model", Value::String(model))?;
    }

    let enabled = prompt_input("Enable API provider? [Y/n]: ")?;
    let enabled = enabled.is_empty() || enabled.eq_ignore_ascii_case("y");
    store.set("providers.api.enabled", Value::Bool(enabled))?;

    println!("{}", "API configuration updated".green());
    Ok(())
}
