use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::core::Engine;

#[derive(Parser)]
#[command(name = "apiscope")]
#[command(about = "API entry-point discovery and call-chain scoping for code audits")]
#[command(version)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Code model file to analyze (overrides configuration)
    #[arg(short, long)]
    pub model: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List supported frameworks and their annotations
    Frameworks,

    /// Discover API endpoints
    Discover {
        /// Restrict discovery to one framework by name
        #[arg(short, long)]
        framework: Option<String>,

        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Build and print the call chain for a method
    Chain {
        /// Method reference, e.g. com.example.UserController.getUser
        method: String,

        /// Emit JSON instead of a tree
        #[arg(long)]
        json: bool,
    },

    /// Build the analysis context for a method's call chain
    Context {
        /// Method reference, e.g. com.example.UserController.getUser
        method: String,
    },

    /// List all callers of a method
    Callers {
        /// Method reference, e.g. com.example.UserService.findUser
        method: String,
    },

    /// List direct and transitive subtypes of a type
    Subtypes {
        /// Qualified type name, e.g. com.example.BaseController
        type_name: String,
    },

    /// Discover all endpoints and pre-build their call chains
    Prewarm,
}

impl Cli {
    pub async fn execute(self, engine: Engine) -> Result<()> {
        match self.command {
            Commands::Frameworks => engine.frameworks().await?,
            Commands::Discover { framework, json } => engine.discover(framework, json).await?,
            Commands::Chain { method, json } => engine.chain(&method, json).await?,
            Commands::Context { method } => engine.context(&method).await?,
            Commands::Callers { method } => engine.callers(&method).await?,
            Commands::Subtypes { type_name } => engine.subtypes(&type_name).await?,
            Commands::Prewarm => engine.prewarm().await?,
        }
        Ok(())
    }
}
