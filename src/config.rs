use std::net::SocketAddr;
use std::path::PathBuf;
use std::thread;

use anagram_core::ProcessorOptions;
use anagram_corpus::LoadMode;
use anagram_types::DEFAULT_SEPARATOR;
use anyhow::{Context, Result, ensure};
use clap::{Args, ValueEnum};

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_MAX_TEXT_BYTES: usize = 1024 * 1024;

/// Input path meaning "read standard input as the only partition".
pub const STDIN_INPUT: &str = "-";

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    /// `<key><separator>[w1, w2, ...]`
    #[default]
    Text,
    /// One JSON object per line: `{"key": ..., "words": [...]}`
    Json,
}

/// Options of the `run` subcommand.
#[derive(Debug, Args)]
pub struct RunArgs {
    /// File or directory of partitions to read (`-` for standard input).
    pub input: PathBuf,
    /// Directory to create for the results; must not exist yet.
    pub output: PathBuf,
    /// Comma-separated word list to exclude; enables skip filtering.
    #[arg(long, env = "ANAGRAMS_SKIP_FILE")]
    pub skip: Option<PathBuf>,
    /// Accepted for compatibility; words are always compared lowercased.
    #[arg(long, env = "ANAGRAMS_CASE_SENSITIVE")]
    pub case_sensitive: bool,
    /// How partitions are loaded: `mmap` or `owned`.
    #[arg(long, env = "ANAGRAMS_LOAD_MODE", default_value = "mmap")]
    pub load_mode: LoadMode,
    /// Partitions processed at once (defaults to available parallelism).
    #[arg(long, env = "ANAGRAMS_WORKERS")]
    pub workers: Option<usize>,
    /// Number of reducers, and so of `part-r-*` output files.
    #[arg(long, env = "ANAGRAMS_REDUCERS", default_value_t = 1)]
    pub reducers: usize,
    #[arg(long, env = "ANAGRAMS_FORMAT", value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
    /// Text between key and word list; `\t` is accepted as an escape.
    #[arg(long, env = "ANAGRAMS_SEPARATOR", default_value = DEFAULT_SEPARATOR)]
    pub separator: String,
}

/// Options of the `serve` subcommand.
#[derive(Debug, Args)]
pub struct ServeArgs {
    #[arg(long, env = "HOST", default_value = DEFAULT_HOST)]
    pub host: String,
    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,
    /// Largest accepted request text, in bytes.
    #[arg(long, env = "ANAGRAMS_MAX_TEXT_BYTES", default_value_t = DEFAULT_MAX_TEXT_BYTES)]
    pub max_text_bytes: usize,
}

impl ServeArgs {
    pub fn addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }
}

/// Everything a batch job needs, validated.
#[derive(Clone, Debug)]
pub struct JobConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub case_sensitive: bool,
    pub skip_patterns: bool,
    pub skip_file: Option<PathBuf>,
    pub load_mode: LoadMode,
    pub workers: usize,
    pub reducers: usize,
    pub format: OutputFormat,
    pub separator: String,
}

impl JobConfig {
    /// Defaults for reading `input` and writing `output`.
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            case_sensitive: false,
            skip_patterns: false,
            skip_file: None,
            load_mode: LoadMode::default(),
            workers: default_workers(),
            reducers: 1,
            format: OutputFormat::default(),
            separator: DEFAULT_SEPARATOR.to_string(),
        }
    }

    pub fn with_skip_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.skip_patterns = true;
        self.skip_file = Some(path.into());
        self
    }

    pub fn reads_stdin(&self) -> bool {
        self.input.as_os_str() == STDIN_INPUT
    }

    /// Options handed to every partition processor; `skip_locator` is the
    /// name the skip file is staged under.
    pub fn processor_options(&self, skip_locator: Option<String>) -> ProcessorOptions {
        ProcessorOptions {
            case_sensitive: self.case_sensitive,
            skip_patterns: self.skip_patterns,
            skip_locator,
        }
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(self.workers >= 1, "workers must be >= 1");
        ensure!(self.reducers >= 1, "reducers must be >= 1");
        ensure!(!self.separator.is_empty(), "separator must not be empty");
        Ok(())
    }
}

impl TryFrom<RunArgs> for JobConfig {
    type Error = anyhow::Error;

    fn try_from(args: RunArgs) -> Result<Self> {
        let mut config = JobConfig::new(args.input, args.output);
        if let Some(skip) = args.skip {
            config = config.with_skip_file(skip);
        }
        config.case_sensitive = args.case_sensitive;
        config.load_mode = args.load_mode;
        if let Some(workers) = args.workers {
            config.workers = workers;
        }
        config.reducers = args.reducers;
        config.format = args.format;
        config.separator = unescape_separator(&args.separator);
        config.validate()?;
        Ok(config)
    }
}

fn default_workers() -> usize {
    thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

fn unescape_separator(raw: &str) -> String {
    raw.replace("\\t", "\t")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        run: RunArgs,
    }

    fn parse(args: &[&str]) -> Result<JobConfig> {
        let harness = Harness::try_parse_from(std::iter::once("anagrams").chain(args.iter().copied()))?;
        JobConfig::try_from(harness.run)
    }

    #[test]
    fn skip_flag_enables_filtering() {
        let config = parse(&["in", "out", "--skip", "lists/skip.txt"]).unwrap();
        assert!(config.skip_patterns);
        assert_eq!(config.skip_file, Some(PathBuf::from("lists/skip.txt")));

        let config = parse(&["in", "out"]).unwrap();
        assert!(!config.skip_patterns);
        assert!(config.processor_options(None).skip_locator.is_none());
    }

    #[test]
    fn parses_job_options() {
        let config = parse(&[
            "in",
            "out",
            "--load-mode",
            "owned",
            "--workers",
            "3",
            "--reducers",
            "2",
            "--format",
            "json",
            "--separator",
            "\\t|",
            "--case-sensitive",
        ])
        .unwrap();
        assert_eq!(config.load_mode, LoadMode::Owned);
        assert_eq!(config.workers, 3);
        assert_eq!(config.reducers, 2);
        assert_eq!(config.format, OutputFormat::Json);
        assert_eq!(config.separator, "\t|");
        assert!(config.case_sensitive);
    }

    #[test]
    fn rejects_zero_reducers_and_bad_modes() {
        assert!(parse(&["in", "out", "--reducers", "0"]).is_err());
        assert!(parse(&["in", "out", "--workers", "0"]).is_err());
        assert!(parse(&["in", "out", "--load-mode", "heap"]).is_err());
    }

    #[test]
    fn dash_reads_stdin() {
        assert!(JobConfig::new("-", "out").reads_stdin());
        assert!(!JobConfig::new("corpus", "out").reads_stdin());
    }
}
