//! getxattr phase: read back every slot and check it
//!
//! Under fixed sizing the returned length must equal the nominal size even
//! without `--verify`. Under randomized sizing the length varies, and with
//! `--verify` each value is checked against the encoding its own header
//! describes.

use crate::buffers::{self, CName, NAME_CAPACITY, PATH_CAPACITY};
use crate::config::{RunConfig, XATTR_SIZE_MAX};
use crate::corpus::{report_progress, ENTRY_STEM};
use crate::error::{BenchError, Result};
use crate::payload::{self, Mismatch, FILLER};
use crate::phase::Phase;
use crate::xattr::{XattrOps, NAME_PREFIX};

/// Reads `user.1..=user.<xattrs>` from each entry in index order
pub struct AttrReader<'a, X: XattrOps + ?Sized> {
    config: &'a RunConfig,
    xattr: &'a X,
}

impl<'a, X: XattrOps + ?Sized> AttrReader<'a, X> {
    pub fn new(config: &'a RunConfig, xattr: &'a X) -> Self {
        Self { config, xattr }
    }

    /// Read and check every slot, stopping at the first failure
    pub fn run(&self) -> Result<()> {
        let config = self.config;
        let mut value = buffers::acquire("xattr value", XATTR_SIZE_MAX, 0)?;
        let mut path = CName::acquire("file name", PATH_CAPACITY)?;
        let mut name = CName::acquire("xattr name", NAME_CAPACITY)?;

        // Fixed sizing compares against this buffer, which is never written
        // after acquisition; randomized sizing rebuilds into it per slot.
        let mut expected = if config.random {
            let len = if config.verify { XATTR_SIZE_MAX } else { 0 };
            buffers::acquire("xattr verify", len, 0)?
        } else {
            buffers::acquire("xattr verify", config.size, FILLER)?
        };

        for index in 1..=config.files {
            path.set_joined(&config.path, ENTRY_STEM, index);
            report_progress(Phase::Read, index, config.nth, &path);

            for attr in 1..=config.xattrs {
                name.set_indexed(NAME_PREFIX, attr);

                let len = self
                    .xattr
                    .get(path.as_cstr(), name.as_cstr(), &mut value)
                    .map_err(|errno| {
                        BenchError::attr_io(
                            "lgetxattr",
                            path.as_path(),
                            name.display(),
                            errno.into(),
                        )
                    })?;
                let actual = &value[..len];

                let outcome = if config.random {
                    if config.verify {
                        payload::verify_random(&mut expected, actual)
                    } else {
                        Ok(())
                    }
                } else if len != config.size || config.verify {
                    payload::verify_fixed(&expected, actual)
                } else {
                    Ok(())
                };

                if let Err(mismatch) = outcome {
                    return Err(verify_error(
                        &path,
                        &name,
                        &mismatch,
                        expected_rendering(config, &mut expected, actual),
                        actual,
                    ));
                }
            }
        }

        tracing::debug!(
            files = config.files,
            xattrs = config.xattrs,
            verify = config.verify,
            "attributes read"
        );
        Ok(())
    }
}

/// Expected bytes for a failed slot, for the diagnostic
fn expected_rendering<'b>(config: &RunConfig, expected: &'b mut [u8], actual: &[u8]) -> &'b [u8] {
    if !config.random {
        return expected;
    }
    match payload::decode_header(actual) {
        Some((declared, header)) if declared >= header && declared <= expected.len() => {
            payload::encode_random(expected, declared);
            &expected[..declared]
        }
        _ => &b"size=<N> ..."[..],
    }
}

fn verify_error(
    path: &CName,
    name: &CName,
    mismatch: &Mismatch,
    expected: &[u8],
    actual: &[u8],
) -> BenchError {
    BenchError::Verify {
        path: path.as_path().to_path_buf(),
        name: name.display(),
        detail: mismatch.to_string(),
        expected: String::from_utf8_lossy(expected).into_owned(),
        actual: String::from_utf8_lossy(actual).into_owned(),
    }
}
