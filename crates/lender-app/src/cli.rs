use clap::Parser;

/// Lender: terminal front end for the AI lending assistant.
#[derive(Parser, Debug)]
#[command(name = "lender", version, about)]
pub struct Args {
    /// Resume an existing session (e.g. from a shared link).
    #[arg(short = 's', long)]
    pub session: Option<String>,

    /// Config file path override.
    #[arg(long)]
    pub config: Option<String>,

    /// Backend base URL override.
    #[arg(long)]
    pub base_url: Option<String>,

    /// Log filter directive override (e.g. `lender=debug`).
    #[arg(long)]
    pub log_level: Option<String>,
}

pub fn parse() -> Args {
    Args::parse()
}
