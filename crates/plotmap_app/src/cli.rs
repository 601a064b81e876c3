use std::path::PathBuf;

use clap::Parser;
use plotmap_logging::LogDestination;

#[derive(Debug, Parser)]
#[command(name = "plotmap")]
#[command(about = "Upload plot geometry and samples, then show the interpolated surface", long_about = None)]
pub struct Cli {
    /// RON configuration file (default: ./plotmap.ron when present)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Analysis service base URL
    #[arg(long)]
    pub api_url: Option<String>,

    /// Directory the downloaded overlay is written to
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Save the overlay after a completed analysis
    #[arg(long)]
    pub download: bool,

    /// Log destination (terminal/file/both)
    #[arg(long)]
    pub log: Option<LogDestination>,

    /// Plot geometry files and the sample table, in any order
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flags_and_files() {
        let cli = Cli::try_parse_from([
            "plotmap",
            "--api-url",
            "http://analysis.local/",
            "--download",
            "--log",
            "both",
            "plots.geojson",
            "samples.csv",
        ])
        .unwrap();
        assert_eq!(cli.api_url.as_deref(), Some("http://analysis.local/"));
        assert!(cli.download);
        assert_eq!(cli.log, Some(LogDestination::Both));
        assert_eq!(
            cli.files,
            vec![PathBuf::from("plots.geojson"), PathBuf::from("samples.csv")]
        );
    }

    #[test]
    fn requires_at_least_one_file() {
        assert!(Cli::try_parse_from(["plotmap"]).is_err());
        assert!(Cli::try_parse_from(["plotmap", "--log", "syslog", "a.csv"]).is_err());
    }
}
