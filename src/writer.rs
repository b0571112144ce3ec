//! setxattr phase: attach `xattrs` values to every corpus entry

use crate::buffers::{self, CName, NAME_CAPACITY, PATH_CAPACITY};
use crate::config::RunConfig;
use crate::corpus::{report_progress, ENTRY_STEM};
use crate::error::{BenchError, Result};
use crate::payload::{self, SizeSampler};
use crate::phase::Phase;
use crate::xattr::{XattrOps, NAME_PREFIX};

/// Sets `user.1..=user.<xattrs>` on each entry in index order
pub struct AttrWriter<'a, X: XattrOps + ?Sized> {
    config: &'a RunConfig,
    xattr: &'a X,
}

impl<'a, X: XattrOps + ?Sized> AttrWriter<'a, X> {
    pub fn new(config: &'a RunConfig, xattr: &'a X) -> Self {
        Self { config, xattr }
    }

    /// Set every slot, drawing sizes from `sampler` file-major
    ///
    /// Stops at the first failed set; earlier slots keep their values.
    pub fn run(&self, sampler: &mut SizeSampler) -> Result<()> {
        let config = self.config;
        let mut value = buffers::acquire("xattr value", config.size, 0)?;
        let mut path = CName::acquire("file name", PATH_CAPACITY)?;
        let mut name = CName::acquire("xattr name", NAME_CAPACITY)?;

        if !config.random {
            payload::encode_fixed(&mut value);
        }

        for index in 1..=config.files {
            path.set_joined(&config.path, ENTRY_STEM, index);
            report_progress(Phase::Write, index, config.nth, &path);

            for attr in 1..=config.xattrs {
                name.set_indexed(NAME_PREFIX, attr);

                let len = if config.random {
                    let size = sampler.next_size();
                    payload::encode_random(&mut value, size)
                } else {
                    config.size
                };

                self.xattr
                    .set(path.as_cstr(), name.as_cstr(), &value[..len])
                    .map_err(|errno| {
                        BenchError::attr_io(
                            "lsetxattr",
                            path.as_path(),
                            name.display(),
                            errno.into(),
                        )
                    })?;
            }
        }

        tracing::debug!(
            files = config.files,
            xattrs = config.xattrs,
            "attributes set"
        );
        Ok(())
    }
}
