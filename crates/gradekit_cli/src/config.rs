use std::path::PathBuf;

use clap::Parser;

/// Render an evaluation payload (JSON) into an XLSX workbook.
#[derive(Debug, Parser, Clone)]
#[clap(name = "gradekit", version)]
pub struct Config {
    /// Payload JSON file; `-` or absent reads stdin.
    #[clap(long, env = "GRADEKIT_INPUT")]
    pub input: Option<PathBuf>,

    /// Output workbook path; defaults to the suggested file name.
    #[clap(long, env = "GRADEKIT_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Render options JSON file.
    #[clap(long, env = "GRADEKIT_OPTIONS")]
    pub options: Option<PathBuf>,

    #[clap(long, env = "GRADEKIT_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Config {
    /// Whether the payload comes from stdin.
    pub fn if_read_stdin(&self) -> bool {
        self.input
            .as_deref()
            .is_none_or(|path| path.as_os_str() == "-")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dash_input_reads_stdin() {
        let config = Config::parse_from(["gradekit", "--input", "-"]);
        assert!(config.if_read_stdin());
        assert_eq!(config.log_level, "info");

        let config = Config::parse_from(["gradekit", "--input", "payload.json", "--log-level", "debug"]);
        assert!(!config.if_read_stdin());
        assert_eq!(config.log_level, "debug");
    }
}
