//! CLI module for the churn gateway

pub mod serve;

use clap::{Parser, Subcommand};

/// Churn Gateway - customer churn inference with A/B variant routing
#[derive(Parser)]
#[command(name = "churn-gateway")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the prediction API server
    Serve,
}
