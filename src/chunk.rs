//! Byte-range chunk planning for parallel ingestion.
//!
//! A large input file is divided into contiguous byte windows of roughly the
//! configured size. Every window boundary except the final one is then moved
//! forward to the start of the next question separator (a numbered-list
//! marker or a `---`/`***` line) when one exists within a bounded lookahead;
//! otherwise the raw boundary stands. The final chunk always extends to end
//! of file. A question longer than the lookahead cap can therefore still be
//! split across two chunks; that is an accepted approximation, logged and
//! never fatal.

use regex::bytes::Regex;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use thiserror::Error;

/// Maximum distance in bytes scanned past a raw boundary for a separator.
const LOOKAHEAD_CAP: usize = 10 * 1024;

static SEPARATOR_AT_LINE_START: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^(?:\d+\.\s|[ \t]*---[ \t]*$|[ \t]*\*\*\*[ \t]*$)")
        .expect("separator pattern")
});

/// Half-open byte range of the source file assigned to one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk {
    /// First byte of the range.
    pub start: u64,
    /// One past the last byte of the range.
    pub end: u64,
}

impl Chunk {
    /// Length of the range in bytes.
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    /// True when the range covers no bytes.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Errors raised while planning chunks.
#[derive(Debug, Error)]
pub enum ChunkPlanError {
    /// Requested chunk size does not cover at least one byte.
    #[error("chunk size must be greater than zero")]
    InvalidChunkSize,
    /// The source file could not be inspected or read.
    #[error("failed to read source file: {0}")]
    Io(#[from] std::io::Error),
}

/// Plans boundary-aligned chunks over one source file.
pub struct ChunkPlanner {
    path: PathBuf,
    target_size: u64,
}

impl ChunkPlanner {
    /// Create a planner targeting windows of `chunk_size_mb` megabytes.
    pub fn new(path: &Path, chunk_size_mb: f64) -> Result<Self, ChunkPlanError> {
        let target_size = (chunk_size_mb * 1024.0 * 1024.0) as u64;
        if chunk_size_mb <= 0.0 || target_size == 0 {
            return Err(ChunkPlanError::InvalidChunkSize);
        }
        Ok(Self {
            path: path.to_path_buf(),
            target_size,
        })
    }

    /// Compute the chunk list for the file.
    ///
    /// The result is contiguous, non-overlapping, strictly increasing, and
    /// its union is exactly `[0, file_size)`. An empty file yields an empty
    /// plan.
    pub fn plan(&self) -> Result<Vec<Chunk>, ChunkPlanError> {
        let file_size = std::fs::metadata(&self.path)?.len();
        if file_size == 0 {
            return Ok(Vec::new());
        }

        let mut file = File::open(&self.path)?;
        let mut boundaries = vec![0u64];

        let mut raw = self.target_size;
        while raw < file_size {
            let aligned = self.align_boundary(&mut file, raw, file_size)?;
            let previous = *boundaries.last().expect("at least the zero boundary");
            if aligned > previous && aligned < file_size {
                boundaries.push(aligned);
            }
            raw += self.target_size;
        }
        boundaries.push(file_size);

        let chunks: Vec<Chunk> = boundaries
            .windows(2)
            .map(|pair| Chunk {
                start: pair[0],
                end: pair[1],
            })
            .filter(|chunk| !chunk.is_empty())
            .collect();

        tracing::debug!(
            path = %self.path.display(),
            file_size,
            target_size = self.target_size,
            chunks = chunks.len(),
            "Planned chunks"
        );
        Ok(chunks)
    }

    /// Move a raw boundary forward to the next separator within the
    /// lookahead cap. Without a separator the raw position is kept, nudged
    /// past any UTF-8 continuation bytes so both neighboring chunks remain
    /// valid UTF-8 when the file is.
    fn align_boundary(
        &self,
        file: &mut File,
        raw: u64,
        file_size: u64,
    ) -> Result<u64, ChunkPlanError> {
        let window_len = LOOKAHEAD_CAP.min((file_size - raw) as usize);
        let mut window = vec![0u8; window_len];
        file.seek(SeekFrom::Start(raw))?;
        file.read_exact(&mut window)?;

        if let Some(found) = SEPARATOR_AT_LINE_START.find(&window) {
            return Ok(raw + found.start() as u64);
        }

        tracing::debug!(
            boundary = raw,
            lookahead = window_len,
            "No separator within lookahead; keeping raw chunk boundary"
        );
        let nudge = window
            .iter()
            .position(|byte| byte & 0b1100_0000 != 0b1000_0000)
            .unwrap_or(window_len);
        Ok(raw + nudge as u64)
    }
}
