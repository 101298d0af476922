//! Command-line interface for salesq
//!
//! This module defines the argument parser and the [`CliConfig`] flattened
//! from it, which the configuration layer applies on top of files and
//! environment variables.

use clap::{Parser, Subcommand, ValueEnum};
use salesq_core::RankBy;

use std::path::PathBuf;

/// salesq - descriptive sales statistics and reports
///
/// salesq loads a sales CSV, groups and ranks it by region, category,
/// segment, time and shipping mode, and prints narrative reports, dashboard
/// contexts or chart grids.
#[derive(Parser, Debug)]
#[command(name = "salesq")]
#[command(author, version, about)]
#[command(
    long_about = "salesq - descriptive sales statistics and reports\n\n\
    salesq loads a sales CSV into typed records and answers every question with\n\
    group-by, aggregate and sort operations: key insights, an exploratory overview,\n\
    top-N rankings, dashboard views and SVG chart grids."
)]
#[command(after_help = "EXAMPLES:\n  \
    # Key business insights report\n  \
    salesq --input train.csv report\n\n  \
    # Top 10 states by total sales\n  \
    salesq -i train.csv top --by state -n 10\n\n  \
    # Average order value by region and year\n  \
    salesq -i train.csv top --by region,year --metric mean\n\n  \
    # Dashboard view as JSON\n  \
    salesq -i train.csv dashboard --view insights\n\n  \
    # Write both chart grids\n  \
    salesq -i train.csv export --out-dir charts/")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Sales CSV to read (defaults to the configured input path)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Configuration file to use
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// CSV field separator (default: ,)
    #[arg(long, global = true, value_name = "SEP")]
    pub separator: Option<String>,

    /// Date format of Order Date and Ship Date (default: %d/%m/%Y)
    #[arg(long, global = true, value_name = "FORMAT")]
    pub date_format: Option<String>,

    /// Refuse inputs with more data rows than this
    #[arg(long, global = true, value_name = "N")]
    pub max_rows: Option<usize>,

    /// Increase verbosity (can be used multiple times)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Subcommands
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Print the key business insights report (the default)
    #[command(after_help = "EXAMPLES:\n  \
        salesq -i train.csv report\n  \
        salesq -i train.csv report --top 10 --label-width 40")]
    Report {
        /// Entries in every top-N listing
        #[arg(long, value_name = "N")]
        top: Option<usize>,

        /// Longest label shown before truncation
        #[arg(long, value_name = "N")]
        label_width: Option<usize>,
    },

    /// Print the exploratory overview of the dataset
    Overview {
        /// Longest label shown before truncation
        #[arg(long, value_name = "N")]
        label_width: Option<usize>,
    },

    /// Rank groups of one or more columns
    #[command(after_help = "EXAMPLES:\n  \
        salesq -i train.csv top --by category\n  \
        salesq -i train.csv top --by \"ship mode\" --metric count\n  \
        salesq -i train.csv top --by region,category -n 3")]
    Top {
        /// Column(s) to group by, comma separated
        #[arg(long, required = true, value_delimiter = ',', value_name = "COLUMN")]
        by: Vec<String>,

        /// Number of groups to show
        #[arg(short = 'n', long, default_value_t = 5)]
        n: usize,

        /// Value to rank by
        #[arg(long, value_enum, default_value = "sales")]
        metric: TopMetric,
    },

    /// Print a dashboard view as JSON
    Dashboard {
        /// Which view to build
        #[arg(long, value_enum, default_value = "summary")]
        view: View,

        /// Use compact output (no pretty-printing)
        #[arg(short, long)]
        compact: bool,
    },

    /// Write the overview and detail chart grids as SVG
    Export {
        /// Directory to write into
        #[arg(long, value_name = "DIR")]
        out_dir: Option<PathBuf>,

        /// Bins of the sales histogram
        #[arg(long, value_name = "N")]
        bins: Option<usize>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

impl Default for Commands {
    fn default() -> Self {
        Commands::Report {
            top: None,
            label_width: None,
        }
    }
}

/// Configuration management subcommands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Create default configuration file
    Init {
        /// Path to create config file
        #[arg(default_value = "salesq.toml")]
        path: PathBuf,

        /// Force overwrite if file exists
        #[arg(short, long)]
        force: bool,
    },

    /// Validate configuration file
    Check {
        /// Configuration file to check
        path: PathBuf,
    },
}

/// Ranking value for the `top` subcommand
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TopMetric {
    /// Total sales
    Sales,
    /// Average order value
    Mean,
    /// Number of orders
    Count,
}

impl From<TopMetric> for RankBy {
    fn from(metric: TopMetric) -> Self {
        match metric {
            TopMetric::Sales => RankBy::Sum,
            TopMetric::Mean => RankBy::Mean,
            TopMetric::Count => RankBy::Count,
        }
    }
}

/// Dashboard view selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum View {
    /// Headline metrics and four charts
    Summary,
    /// Grouped tables and leading customers and states
    Insights,
}

/// CLI configuration derived from parsed arguments
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CliConfig {
    // Input options
    pub input: Option<PathBuf>,
    pub separator: Option<String>,
    pub date_format: Option<String>,
    pub max_rows: Option<usize>,

    // Report options
    pub top: Option<usize>,
    pub label_width: Option<usize>,

    // Export options
    pub out_dir: Option<PathBuf>,
    pub histogram_bins: Option<usize>,

    // Debug options
    pub verbose: u8,
    pub quiet: bool,

    pub config_file: Option<PathBuf>,
}

impl From<&Cli> for CliConfig {
    fn from(cli: &Cli) -> Self {
        let mut config = CliConfig {
            input: cli.input.clone(),
            separator: cli.separator.clone(),
            date_format: cli.date_format.clone(),
            max_rows: cli.max_rows,
            verbose: cli.verbose,
            quiet: cli.quiet,
            config_file: cli.config.clone(),
            ..CliConfig::default()
        };

        match &cli.command {
            Some(Commands::Report { top, label_width }) => {
                config.top = *top;
                config.label_width = *label_width;
            }
            Some(Commands::Overview { label_width }) => {
                config.label_width = *label_width;
            }
            Some(Commands::Export { out_dir, bins }) => {
                config.out_dir.clone_from(out_dir);
                config.histogram_bins = *bins;
            }
            _ => {}
        }

        config.validate_and_warn();
        config
    }
}

impl CliConfig {
    /// Warn about contradictory options
    fn validate_and_warn(&self) {
        if self.quiet && self.verbose > 0 {
            eprintln!("Warning: --quiet and --verbose are contradictory");
        }

        if let Some(input) = &self.input {
            let is_csv = input
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("csv") || ext.eq_ignore_ascii_case("tsv"));
            if !is_csv && !self.quiet {
                eprintln!("Warning: {} may not be a CSV file", input.display());
            }
        }
    }
}

/// Parse command-line arguments
pub fn parse_args() -> Cli {
    Cli::parse()
}

/// Parse command-line arguments from a vector (for testing)
pub fn parse_args_from<I, T>(args: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(args)
}
