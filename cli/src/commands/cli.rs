use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};

use cortex_core::api::SettingsOverrides;

#[derive(Parser, Debug)]
#[command(
    name = "cortex",
    version,
    about = "Run declarative AI agent workflows with dependency-aware scheduling"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Execute one or more workflow files
    Run(RunArgs),
    /// Check a workflow file and print its execution plan
    Validate(ValidateArgs),
    /// List past runs or show one of them
    Sessions(SessionsArgs),
    /// Write a starter Cortexfile.yml
    Init(InitArgs),
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Jsonl,
}

impl OutputFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Jsonl => "jsonl",
        }
    }
}

#[derive(ClapArgs, Debug, Clone)]
pub struct RunArgs {
    /// Workflow files or glob patterns; repeatable. Defaults to the Cortexfile in the current directory.
    #[arg(short = 'f', long = "file", action = clap::ArgAction::Append)]
    pub files: Vec<String>,

    /// Run independent tasks concurrently.
    #[arg(long, conflicts_with = "sequential")]
    pub parallel: bool,

    /// Run one task at a time, stopping at the first failure.
    #[arg(long)]
    pub sequential: bool,

    /// Maximum concurrent tasks per level (0 = one per CPU).
    #[arg(long)]
    pub max_parallel: Option<usize>,

    #[arg(short, long)]
    pub verbose: bool,

    /// Echo agent output to the terminal while tasks run.
    #[arg(short, long, conflicts_with = "no_stream")]
    pub stream: bool,

    #[arg(long)]
    pub no_stream: bool,

    #[arg(long)]
    pub no_color: bool,

    /// Show progress bars instead of the task log (terminal only).
    #[arg(long)]
    pub progress: bool,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,

    /// Do not persist results to the session store.
    #[arg(long)]
    pub no_save: bool,
}

impl RunArgs {
    /// Command-line layer of the settings merge; unset flags defer to the files.
    pub fn overrides(&self) -> SettingsOverrides {
        SettingsOverrides {
            parallel: if self.sequential {
                Some(false)
            } else if self.parallel {
                Some(true)
            } else {
                None
            },
            max_parallel: self.max_parallel,
            verbose: self.verbose.then_some(true),
            stream: if self.no_stream {
                Some(false)
            } else if self.stream {
                Some(true)
            } else {
                None
            },
        }
    }
}

#[derive(ClapArgs, Debug, Clone)]
pub struct ValidateArgs {
    #[arg(short = 'f', long = "file")]
    pub file: Option<String>,

    /// Also check that every tool the workflow uses is installed.
    #[arg(long)]
    pub check_tools: bool,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct SessionsArgs {
    #[arg(long)]
    pub project: Option<String>,

    #[arg(long, default_value_t = 10)]
    pub limit: usize,

    /// Only failed runs.
    #[arg(long)]
    pub failed: bool,

    /// Show the task results of one run.
    #[arg(long, value_name = "RUN_ID")]
    pub show: Option<String>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct InitArgs {
    #[arg(long)]
    pub minimal: bool,

    /// Overwrite an existing file.
    #[arg(long)]
    pub force: bool,
}
