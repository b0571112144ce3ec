//! Run configuration
//!
//! Built once before the run (from the CLI or the builder below) and
//! passed by shared reference to every component. Nothing mutates it
//! after [`RunConfig::validate`] succeeds.

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::error::{BenchError, Result};
use crate::payload::MIN_RANDOM_SIZE;

/// Largest value the kernel accepts for a single extended attribute
pub const XATTR_SIZE_MAX: usize = 65536;

/// Default corpus root
pub const DEFAULT_PATH: &str = "/tmp/xattrtest";

/// Default post-phase hook: a no-op executable
pub const DEFAULT_HOOK: &str = "/bin/true";

/// Benchmark run parameters
///
/// # Example
/// ```
/// use xattrtest::config::RunConfig;
///
/// let config = RunConfig::new()
///     .with_files(10)
///     .with_xattrs(4)
///     .with_size(128)
///     .with_random(true)
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct RunConfig {
    /// Number of corpus files
    pub files: usize,
    /// Attributes set on each file
    pub xattrs: usize,
    /// Value size in bytes (upper bound when `random` is set)
    pub size: usize,
    /// Draw each value size uniformly from `[16, size]`
    pub random: bool,
    /// Seed for the size generator
    pub seed: u64,
    /// Corpus root directory
    pub path: PathBuf,
    /// Compare value contents on read
    pub verify: bool,
    /// Flush dirty data after each phase
    pub sync: bool,
    /// Drop kernel caches after each phase
    pub drop_caches: bool,
    /// Executable run after each phase with the phase token as argument
    pub hook: PathBuf,
    /// Print every nth path (0 disables progress output)
    pub nth: usize,
    /// Skip the unlink phase
    pub keep: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            files: 1000,
            xattrs: 1,
            size: 1,
            random: false,
            seed: 0,
            path: PathBuf::from(DEFAULT_PATH),
            verify: false,
            sync: false,
            drop_caches: false,
            hook: PathBuf::from(DEFAULT_HOOK),
            nth: 0,
            keep: false,
        }
    }
}

impl RunConfig {
    /// Create a configuration with the default parameters
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_files(mut self, files: usize) -> Self {
        self.files = files;
        self
    }

    pub fn with_xattrs(mut self, xattrs: usize) -> Self {
        self.xattrs = xattrs;
        self
    }

    pub fn with_size(mut self, size: usize) -> Self {
        self.size = size;
        self
    }

    pub fn with_random(mut self, random: bool) -> Self {
        self.random = random;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = path.into();
        self
    }

    pub fn with_verify(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    pub fn with_sync(mut self, sync: bool) -> Self {
        self.sync = sync;
        self
    }

    pub fn with_drop_caches(mut self, drop_caches: bool) -> Self {
        self.drop_caches = drop_caches;
        self
    }

    pub fn with_hook(mut self, hook: impl Into<PathBuf>) -> Self {
        self.hook = hook.into();
        self
    }

    pub fn with_nth(mut self, nth: usize) -> Self {
        self.nth = nth;
        self
    }

    pub fn with_keep(mut self, keep: bool) -> Self {
        self.keep = keep;
        self
    }

    /// Check the parameter constraints the phases rely on
    pub fn validate(&self) -> Result<()> {
        if self.files == 0 {
            return Err(BenchError::Config("files must be >= 1".into()));
        }
        if self.xattrs == 0 {
            return Err(BenchError::Config("xattrs must be >= 1".into()));
        }
        if self.size == 0 {
            return Err(BenchError::Config("size must be >= 1".into()));
        }
        if self.size > XATTR_SIZE_MAX {
            return Err(BenchError::Config(format!(
                "size must be <= {}, got {}",
                XATTR_SIZE_MAX, self.size
            )));
        }
        if self.random && self.size < MIN_RANDOM_SIZE {
            return Err(BenchError::Config(format!(
                "size must be >= {} when random sizes are enabled, got {}",
                MIN_RANDOM_SIZE, self.size
            )));
        }
        reject_nul("path", &self.path)?;
        reject_nul("script", &self.hook)?;
        Ok(())
    }

    /// Print the effective parameters, one per line
    pub fn print(&self) {
        println!("verify:      {}", self.verify as u8);
        println!("nth:         {}", self.nth);
        println!("files:       {}", self.files);
        println!("xattrs:      {}", self.xattrs);
        println!("size:        {}", self.size);
        println!("path:        {}", self.path.display());
        println!("synccaches:  {}", self.sync as u8);
        println!("dropcaches:  {}", self.drop_caches as u8);
        println!("script:      {}", self.hook.display());
        println!("seed:        {}", self.seed);
        println!("random size: {}", self.random as u8);
        println!("keep files:  {}", self.keep as u8);
        println!();
    }
}

fn reject_nul(field: &str, path: &Path) -> Result<()> {
    use std::os::unix::ffi::OsStrExt;

    if path.as_os_str().as_bytes().contains(&0) {
        return Err(BenchError::Config(format!("{} contains a NUL byte", field)));
    }
    Ok(())
}
