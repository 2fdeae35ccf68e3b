use clap::Parser;

#[derive(Parser)]
#[command(name = "cloudsift")]
#[command(about = "Sift stdin hostnames for CloudFront origins left exposed in AWS IP space.")]
pub struct CommandLine {
    /// Set the concurrency level
    #[arg(short = 'c', long, default_value_t = 20)]
    pub concurrency: usize,

    /// Show every probed URL with its status code
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
