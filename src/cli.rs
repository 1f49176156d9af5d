//! Command-line interface definitions

use clap::Parser;

/// Serve the prediction page backed by a pre-fitted model bundle
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config/config.toml")]
    pub config: String,

    /// Override the configured listen port
    #[arg(short, long)]
    pub port: Option<u16>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_args() {
        let args = Args::parse_from(["ml-prediction-app"]);
        assert_eq!(args.config, "config/config.toml");
        assert_eq!(args.port, None);
    }

    #[test]
    fn test_port_override() {
        let args = Args::parse_from(["ml-prediction-app", "--config", "demo.toml", "-p", "9000"]);
        assert_eq!(args.config, "demo.toml");
        assert_eq!(args.port, Some(9000));
    }
}
