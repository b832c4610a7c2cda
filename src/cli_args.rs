use clap::{ArgAction, Parser, Subcommand};

/// CLI options
#[derive(Parser, Debug)]
#[command(
    name = "committer",
    version,
    about = "AI-powered branch name and commit message generator"
)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate a branch name based on git history and context
    Branch {
        /// AI provider (claude, gemini, api)
        #[arg(short, long)]
        provider: Option<String>,

        /// Context file (.md) for additional information
        #[arg(short, long)]
        context: Option<String>,
    },

    /// Generate a commit message based on staged changes
    Commit {
        /// AI provider (claude, gemini, api)
        #[arg(short, long)]
        provider: Option<String>,

        /// Context file (.md) for additional information
        #[arg(short, long)]
        context: Option<String>,

        /// Automatically stage all changes before generating commit
        #[arg(short = 'a', long)]
        auto_stage: bool,
    },

    /// Configure AI providers and settings
    Config {
        /// Set configuration value (key=value, dotted keys allowed)
        #[arg(short, long, value_name = "KEY=VALUE")]
        set: Option<String>,

        /// Get configuration value by dotted key
        #[arg(short, long, value_name = "KEY")]
        get: Option<String>,

        /// List all configuration
        #[arg(short, long)]
        list: bool,
    },
}
