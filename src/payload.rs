//! Attribute value encoding
//!
//! Fixed sizing stores `size` filler bytes. Randomized sizing stores a
//! self-describing value: the ASCII header `size=<N> ` followed by filler
//! out to a total of exactly `N` bytes, so a reader can rebuild the
//! expected value from the returned bytes alone.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;
use std::io::Write;

use crate::config::RunConfig;

/// Byte used for every non-header position
pub const FILLER: u8 = b'x';

/// Smallest randomized value; reserves room for the header
pub const MIN_RANDOM_SIZE: usize = 16;

const HEADER_TAG: &[u8] = b"size=";

/// Draws per-slot effective sizes in file-major, attribute-minor order
///
/// Seeded once; two samplers built from the same seed and bound yield the
/// same sequence.
#[derive(Debug, Clone)]
pub struct SizeSampler {
    rng: StdRng,
    max: usize,
    random: bool,
}

impl SizeSampler {
    pub fn new(seed: u64, max: usize, random: bool) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            max,
            random,
        }
    }

    pub fn from_config(config: &RunConfig) -> Self {
        Self::new(config.seed, config.size, config.random)
    }

    /// Effective size of the next slot
    pub fn next_size(&mut self) -> usize {
        if self.random {
            self.rng.gen_range(MIN_RANDOM_SIZE..=self.max)
        } else {
            self.max
        }
    }
}

/// Fill `buf` as a fixed-size value
pub fn encode_fixed(buf: &mut [u8]) {
    buf.fill(FILLER);
}

/// Encode a randomized value of `size` bytes into the front of `buf`
///
/// Returns the number of bytes written, which is `size`. `buf` must hold at
/// least `size` bytes and `size` must be at least [`MIN_RANDOM_SIZE`].
pub fn encode_random(buf: &mut [u8], size: usize) -> usize {
    let value = &mut buf[..size];
    let header = {
        let mut cursor = &mut value[..];
        let before = cursor.len();
        // The header of any size up to XATTR_SIZE_MAX fits in 16 bytes
        let _ = write!(cursor, "size={} ", size);
        before - cursor.len()
    };
    value[header..].fill(FILLER);
    size
}

/// Parse the `size=<N> ` header, returning `(N, header_len)`
pub fn decode_header(bytes: &[u8]) -> Option<(usize, usize)> {
    let rest = bytes.strip_prefix(HEADER_TAG)?;
    let digits = rest.iter().take_while(|b| b.is_ascii_digit()).count();
    if digits == 0 || rest.get(digits) != Some(&b' ') {
        return None;
    }
    let size = std::str::from_utf8(&rest[..digits]).ok()?.parse().ok()?;
    Some((size, HEADER_TAG.len() + digits + 1))
}

/// Why a returned value does not match its expected encoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mismatch {
    /// No parseable `size=<N> ` header
    Header,
    /// Returned length disagrees with the expected length
    Length { expected: usize, returned: usize },
    /// First differing byte
    Content { offset: usize },
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mismatch::Header => write!(f, "missing or malformed size header"),
            Mismatch::Length { expected, returned } => {
                write!(f, "length {} != expected {}", returned, expected)
            }
            Mismatch::Content { offset } => write!(f, "content differs at byte {}", offset),
        }
    }
}

fn compare(expected: &[u8], actual: &[u8]) -> Result<(), Mismatch> {
    if expected.len() != actual.len() {
        return Err(Mismatch::Length {
            expected: expected.len(),
            returned: actual.len(),
        });
    }
    match expected.iter().zip(actual).position(|(e, a)| e != a) {
        Some(offset) => Err(Mismatch::Content { offset }),
        None => Ok(()),
    }
}

/// Check a fixed-size value against `expected` (filler of the nominal size)
pub fn verify_fixed(expected: &[u8], actual: &[u8]) -> Result<(), Mismatch> {
    compare(expected, actual)
}

/// Check a randomized value using only its own header
///
/// The expected encoding is rebuilt into `scratch` on every call; on
/// success and on a content mismatch the rebuilt value is
/// `&scratch[..N]`.
pub fn verify_random(scratch: &mut [u8], actual: &[u8]) -> Result<(), Mismatch> {
    let (declared, header) = decode_header(actual).ok_or(Mismatch::Header)?;
    if declared != actual.len() || declared > scratch.len() || declared < header {
        return Err(Mismatch::Length {
            expected: declared,
            returned: actual.len(),
        });
    }
    encode_random(scratch, declared);
    compare(&scratch[..declared], actual)
}
