/// Parsed command-line arguments.
pub struct CliArgs {
    /// Path to configuration file, if provided via `--config-path` or `-c`.
    pub config_path: Option<String>,
    /// Whether help was requested.
    pub help_requested: bool,
    /// Validate configuration, print the effective (secret-free) values and exit.
    pub check_config: bool,
}

impl CliArgs {
    /// Parse command-line arguments.
    ///
    /// Supported flags:
    /// - `--config-path <path>` or `--config-path=<path>` or `-c <path>`: Path to config file
    /// - `--check-config`: Validate configuration and exit
    /// - `--help` or `-h`: Print help and exit
    pub fn parse() -> Self {
        let args: Vec<String> = std::env::args().collect();
        Self::from_args(&args)
    }

    fn from_args(args: &[String]) -> Self {
        Self {
            config_path: Self::extract_config_path(args),
            help_requested: args.iter().any(|a| a == "--help" || a == "-h"),
            check_config: args.iter().any(|a| a == "--check-config"),
        }
    }

    /// Print usage information to stderr.
    pub fn print_help() {
        eprintln!(
            "Usage: talenthub-backend [--config-path PATH] [--check-config] [--help]\n\n\
             --config-path, -c    Path to configuration file (overrides TALENTHUB_CONFIG_PATH env var)\n\
             --check-config       Validate configuration, print it without secrets and exit"
        );
    }

    fn extract_config_path(args: &[String]) -> Option<String> {
        let mut i = 1usize;
        while i < args.len() {
            let a = &args[i];
            if let Some(stripped) = a.strip_prefix("--config-path=") {
                return Some(stripped.to_string());
            } else if a == "--config-path" || a == "-c" {
                return args.get(i + 1).cloned();
            } else if let Some(stripped) = a.strip_prefix("-c=") {
                return Some(stripped.to_string());
            }
            i += 1;
        }
        None
    }
}
