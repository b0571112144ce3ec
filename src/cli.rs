//! CLI argument parsing for xattrtest

use clap::{ArgAction, Parser, ValueEnum};
use std::path::PathBuf;

use crate::config::{RunConfig, DEFAULT_HOOK, DEFAULT_PATH};

/// Output format for phase timings
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One line per phase as it completes (default)
    Text,
    /// Single JSON document after the run
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "xattrtest")]
#[command(version)]
#[command(about = "On N files, set M xattrs of size S, read them back and time each phase", long_about = None)]
pub struct Cli {
    /// Increase verbosity (repeatable)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Verify xattr contents on read
    #[arg(short = 'y', long)]
    pub verify: bool,

    /// Print every nth file
    #[arg(short, long, value_name = "NTH", default_value_t = 0)]
    pub nth: usize,

    /// Set xattrs on N files
    #[arg(short, long, value_name = "FILES", default_value_t = 1000)]
    pub files: usize,

    /// Set N xattrs on each file
    #[arg(short = 'x', long, value_name = "XATTRS", default_value_t = 1)]
    pub xattrs: usize,

    /// Set N bytes per xattr (maximum when --random is given)
    #[arg(short, long, value_name = "BYTES", default_value_t = 1)]
    pub size: usize,

    /// Path to files
    #[arg(short, long, value_name = "PATH", default_value = DEFAULT_PATH)]
    pub path: PathBuf,

    /// Sync to disk after each phase
    #[arg(short = 'c', long = "sync")]
    pub sync: bool,

    /// Drop caches after each phase (requires root)
    #[arg(short = 'd', long = "drop")]
    pub drop_caches: bool,

    /// Executable run after each phase with the argument "post"
    #[arg(short = 't', long = "script", value_name = "SCRIPT", default_value = DEFAULT_HOOK)]
    pub script: PathBuf,

    /// Seed for random xattr sizes (default: current time)
    #[arg(short = 'e', long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Randomize xattr sizes between 16 and --size bytes
    #[arg(short, long)]
    pub random: bool,

    /// Don't unlink files at the end
    #[arg(short, long)]
    pub keep: bool,

    /// Report format
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: OutputFormat,
}

impl Cli {
    /// Build the run configuration, using `default_seed` when none was given
    pub fn to_config(&self, default_seed: u64) -> RunConfig {
        RunConfig::new()
            .with_files(self.files)
            .with_xattrs(self.xattrs)
            .with_size(self.size)
            .with_random(self.random)
            .with_seed(self.seed.unwrap_or(default_seed))
            .with_path(&self.path)
            .with_verify(self.verify)
            .with_sync(self.sync)
            .with_drop_caches(self.drop_caches)
            .with_hook(&self.script)
            .with_nth(self.nth)
            .with_keep(self.keep)
    }
}
