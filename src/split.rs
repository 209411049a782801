use crate::config::REMAINDER_FILE;
use anyhow::{bail, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quota {
    Limited(u64),
    Unbounded,
}

impl Quota {
    /// True once `count` items have filled this quota
    pub fn is_filled(self, count: u64) -> bool {
        match self {
            Quota::Limited(limit) => count >= limit,
            Quota::Unbounded => false,
        }
    }
}

/// A quota paired with the output file it fills
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub quota: Quota,
    pub file_name: String,
}

impl Split {
    pub fn numbered(index: usize, quota: u64) -> Self {
        Self {
            quota: Quota::Limited(quota),
            file_name: format!("split{}.txt", index + 1),
        }
    }

    pub fn remainder() -> Self {
        Self {
            quota: Quota::Unbounded,
            file_name: REMAINDER_FILE.to_string(),
        }
    }
}

/// How output is partitioned across files
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SplitPlan {
    /// `split1.txt ... splitK.txt` with the given quotas, then `remainder.txt`
    Quotas(Vec<u64>),
    /// Endless `split1.txt, split2.txt, ...` of equal size; no remainder file
    Chunked(u64),
}

impl SplitPlan {
    /// Builds a plan from CLI arguments; explicit sizes and chunking are exclusive.
    pub fn from_args(sizes: Vec<u64>, chunk: Option<u64>) -> Result<Self> {
        match chunk {
            Some(_) if !sizes.is_empty() => {
                bail!("--splits and --chunk are mutually exclusive")
            }
            Some(0) => bail!("--chunk must be greater than zero"),
            Some(size) => Ok(SplitPlan::Chunked(size)),
            None => Ok(SplitPlan::Quotas(sizes)),
        }
    }

    pub fn splits(&self) -> Box<dyn Iterator<Item = Split> + Send + '_> {
        match self {
            SplitPlan::Quotas(sizes) => Box::new(
                sizes
                    .iter()
                    .enumerate()
                    .map(|(i, &size)| Split::numbered(i, size))
                    .chain(std::iter::once(Split::remainder())),
            ),
            SplitPlan::Chunked(size) => {
                let size = *size;
                Box::new((0..).map(move |i| Split::numbered(i, size)))
            }
        }
    }
}
