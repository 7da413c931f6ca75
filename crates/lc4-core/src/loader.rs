//! Object-file loader for the big-endian tagged segment format.
//!
//! A file is a sequence of segments, each introduced by a 16-bit tag:
//!
//! | Tag | Segment | Body |
//! |---|---|---|
//! | `0xCADE` | code | `addr`, `n`, `n` words |
//! | `0xDADA` | data | `addr`, `n`, `n` words |
//! | `0xC3B7` | symbol | `addr`, `n`, `n` name bytes |
//! | `0xF17E` | file name | `n`, `n` name bytes |
//! | `0x715E` | line number | `addr`, `line`, `file_index` |
//!
//! Only code and data segments touch memory. Parsing stops cleanly at end of input on
//! a segment boundary; any other end of input, or an unknown tag, is an error.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::Memory;

/// Segment tag for code words.
pub const TAG_CODE: u16 = 0xCADE;
/// Segment tag for data words.
pub const TAG_DATA: u16 = 0xDADA;
/// Segment tag for a symbol name.
pub const TAG_SYMBOL: u16 = 0xC3B7;
/// Segment tag for a source file name.
pub const TAG_FILE: u16 = 0xF17E;
/// Segment tag for a line-number record.
pub const TAG_LINE: u16 = 0x715E;

/// One decoded object-file segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectSegment {
    /// Instruction words stored from `addr` upward.
    Code {
        /// First address written.
        addr: u16,
        /// Words in address order.
        words: Vec<u16>,
    },
    /// Data words stored from `addr` upward.
    Data {
        /// First address written.
        addr: u16,
        /// Words in address order.
        words: Vec<u16>,
    },
    /// Symbol name bound to an address.
    Symbol {
        /// Address the symbol labels.
        addr: u16,
        /// Raw name bytes.
        name: Vec<u8>,
    },
    /// Source file name referenced by line records.
    FileName {
        /// Raw name bytes.
        name: Vec<u8>,
    },
    /// Source line associated with an address.
    Line {
        /// Instruction address.
        addr: u16,
        /// Source line number.
        line: u16,
        /// Index into the file-name segments.
        file_index: u16,
    },
}

impl ObjectSegment {
    /// Short segment name used in diagnostics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Code { .. } => "code",
            Self::Data { .. } => "data",
            Self::Symbol { .. } => "symbol",
            Self::FileName { .. } => "file",
            Self::Line { .. } => "line",
        }
    }
}

/// Errors raised while reading or parsing an object file.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The file could not be read.
    #[error("cannot read object file `{}`: {source}", path.display())]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// A segment began with a tag outside the format.
    #[error("unknown segment tag {tag:#06X} at byte {offset}")]
    UnknownTag {
        /// Tag value read.
        tag: u16,
        /// Byte offset of the tag.
        offset: usize,
    },
    /// Input ended inside a segment.
    #[error("truncated {segment} segment at byte {offset}")]
    Truncated {
        /// Segment being read.
        segment: &'static str,
        /// Byte offset where the segment started.
        offset: usize,
    },
}

/// Totals for one loaded object image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    /// Segments parsed, of any kind.
    pub segments: usize,
    /// Memory words written by code and data segments.
    pub words: usize,
}

struct SegmentReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> SegmentReader<'a> {
    const fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    const fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn take(&mut self, len: usize) -> Option<&'a [u8]> {
        let end = self.pos.checked_add(len)?;
        let slice = self.bytes.get(self.pos..end)?;
        self.pos = end;
        Some(slice)
    }

    fn word(&mut self) -> Option<u16> {
        self.take(2).map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
    }

    fn words(&mut self, count: usize) -> Option<Vec<u16>> {
        let raw = self.take(count.checked_mul(2)?)?;
        Some(
            raw.chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect(),
        )
    }
}

const fn segment_kind(tag: u16) -> Option<&'static str> {
    match tag {
        TAG_CODE => Some("code"),
        TAG_DATA => Some("data"),
        TAG_SYMBOL => Some("symbol"),
        TAG_FILE => Some("file"),
        TAG_LINE => Some("line"),
        _ => None,
    }
}

fn read_body(reader: &mut SegmentReader<'_>, tag: u16) -> Option<ObjectSegment> {
    let segment = match tag {
        TAG_CODE | TAG_DATA => {
            let addr = reader.word()?;
            let count = reader.word()?;
            let words = reader.words(usize::from(count))?;
            if tag == TAG_CODE {
                ObjectSegment::Code { addr, words }
            } else {
                ObjectSegment::Data { addr, words }
            }
        }
        TAG_SYMBOL => {
            let addr = reader.word()?;
            let len = reader.word()?;
            ObjectSegment::Symbol {
                addr,
                name: reader.take(usize::from(len))?.to_vec(),
            }
        }
        TAG_FILE => {
            let len = reader.word()?;
            ObjectSegment::FileName {
                name: reader.take(usize::from(len))?.to_vec(),
            }
        }
        TAG_LINE => ObjectSegment::Line {
            addr: reader.word()?,
            line: reader.word()?,
            file_index: reader.word()?,
        },
        _ => return None,
    };
    Some(segment)
}

/// Parses an object image into its segments without touching memory.
///
/// # Errors
///
/// Returns [`LoadError::UnknownTag`] or [`LoadError::Truncated`] for malformed input.
pub fn parse_object(bytes: &[u8]) -> Result<Vec<ObjectSegment>, LoadError> {
    let mut reader = SegmentReader::new(bytes);
    let mut segments = Vec::new();

    while !reader.at_end() {
        let offset = reader.pos;
        let tag = reader.word().ok_or(LoadError::Truncated {
            segment: "tag",
            offset,
        })?;
        let kind = segment_kind(tag).ok_or(LoadError::UnknownTag { tag, offset })?;
        let segment = read_body(&mut reader, tag).ok_or(LoadError::Truncated {
            segment: kind,
            offset,
        })?;

        debug!(kind, offset, "parsed segment");
        segments.push(segment);
    }

    Ok(segments)
}

/// Writes parsed segments into `memory`; later writes overwrite earlier ones.
///
/// Addresses wrap from `0xFFFF` to `0x0000`.
pub fn apply_segments(memory: &mut Memory, segments: &[ObjectSegment]) -> LoadSummary {
    let mut summary = LoadSummary {
        segments: segments.len(),
        words: 0,
    };

    for segment in segments {
        if let ObjectSegment::Code { addr, words } | ObjectSegment::Data { addr, words } = segment
        {
            let mut target = *addr;
            for &word in words {
                memory.write(target, word);
                target = target.wrapping_add(1);
            }
            summary.words += words.len();
        }
    }

    summary
}

/// Parses `bytes` and loads the result into `memory`.
///
/// Memory is only modified when the whole image parses.
///
/// # Errors
///
/// Returns the parse error for malformed input.
pub fn load_object_bytes(memory: &mut Memory, bytes: &[u8]) -> Result<LoadSummary, LoadError> {
    let segments = parse_object(bytes)?;
    Ok(apply_segments(memory, &segments))
}

/// Reads the file at `path` and loads it into `memory`.
///
/// # Errors
///
/// Returns [`LoadError::Io`] when the file cannot be read, or a parse error.
pub fn load_object_file(
    memory: &mut Memory,
    path: impl AsRef<Path>,
) -> Result<LoadSummary, LoadError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let summary = load_object_bytes(memory, &bytes)?;
    debug!(
        path = %path.display(),
        segments = summary.segments,
        words = summary.words,
        "loaded object file"
    );
    Ok(summary)
}
