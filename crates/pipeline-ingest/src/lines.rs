//! Decompressing line reader.
//!
//! Turns a byte source with arbitrary chunk boundaries into a lazy sequence of
//! UTF-8 lines. Lines are assembled from raw bytes and decoded only once a full
//! line is available, so a multi-byte character split across two chunks is
//! never mangled.
//!
//! # Usage
//!
//! ```ignore
//! use pipeline_ingest::LineReader;
//!
//! let lines = LineReader::new(body, true)?;
//! for line in lines {
//!     println!("{}", line?);
//! }
//! ```

use std::collections::VecDeque;
use std::io::{self, Chain, Cursor, Read};

use flate2::read::{MultiGzDecoder, ZlibDecoder};

use crate::error::{IngestError, Result};

/// Bytes requested from the source per read.
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Adapts an iterator of byte chunks to [`Read`].
///
/// A chunk is pulled from the iterator only when the previous one is fully
/// consumed.
pub struct ChunkSource<I> {
    chunks: I,
    current: Vec<u8>,
    pos: usize,
}

impl<I> ChunkSource<I>
where
    I: Iterator<Item = io::Result<Vec<u8>>>,
{
    pub fn new(chunks: impl IntoIterator<IntoIter = I>) -> Self {
        Self {
            chunks: chunks.into_iter(),
            current: Vec::new(),
            pos: 0,
        }
    }
}

impl<I> Read for ChunkSource<I>
where
    I: Iterator<Item = io::Result<Vec<u8>>>,
{
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        while self.pos >= self.current.len() {
            match self.chunks.next() {
                Some(chunk) => {
                    self.current = chunk?;
                    self.pos = 0;
                }
                None => return Ok(0),
            }
        }
        let available = &self.current[self.pos..];
        let n = available.len().min(buf.len());
        buf[..n].copy_from_slice(&available[..n]);
        self.pos += n;
        Ok(n)
    }
}

type Sniffed<R> = Chain<Cursor<Vec<u8>>, R>;

enum Source<R: Read> {
    Plain(R),
    Gzip(MultiGzDecoder<Sniffed<R>>),
    Zlib(ZlibDecoder<Sniffed<R>>),
    Empty,
}

impl<R: Read> Source<R> {
    fn compressed(mut reader: R) -> Result<Self> {
        let mut magic = Vec::with_capacity(GZIP_MAGIC.len());
        let mut byte = [0u8; 1];
        while magic.len() < GZIP_MAGIC.len() {
            match reader.read(&mut byte) {
                Ok(0) => break,
                Ok(_) => magic.push(byte[0]),
                Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
                Err(source) => return Err(IngestError::Read { source }),
            }
        }
        if magic.is_empty() {
            return Ok(Source::Empty);
        }

        let is_gzip = magic == GZIP_MAGIC;
        let sniffed = Cursor::new(magic).chain(reader);
        if is_gzip {
            tracing::debug!("detected gzip container");
            Ok(Source::Gzip(MultiGzDecoder::new(sniffed)))
        } else {
            tracing::debug!("no gzip header, decoding as zlib");
            Ok(Source::Zlib(ZlibDecoder::new(sniffed)))
        }
    }

    fn is_compressed(&self) -> bool {
        matches!(self, Source::Gzip(_) | Source::Zlib(_))
    }
}

impl<R: Read> Read for Source<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Source::Plain(reader) => reader.read(buf),
            Source::Gzip(decoder) => decoder.read(buf),
            Source::Zlib(decoder) => decoder.read(buf),
            Source::Empty => Ok(0),
        }
    }
}

/// Lazy, single-pass sequence of decoded lines without terminators.
///
/// At most one chunk of (decompressed) bytes is held ahead of the consumer,
/// plus the carry: the bytes after the last `\n` seen so far.
pub struct LineReader<R: Read> {
    source: Source<R>,
    buffer: Vec<u8>,
    carry: Vec<u8>,
    ready: VecDeque<Vec<u8>>,
    line_number: usize,
    finished: bool,
}

impl<R: Read> LineReader<R> {
    /// Create a reader over `reader`.
    ///
    /// With `gzipped` set, the container is detected from the first bytes:
    /// gzip (including multi-member files) or zlib. Plain sources are read
    /// as already line-delimited text; blank lines are skipped and a trailing
    /// `\r` is dropped.
    pub fn new(reader: R, gzipped: bool) -> Result<Self> {
        Self::with_chunk_size(reader, gzipped, DEFAULT_CHUNK_SIZE)
    }

    pub fn with_chunk_size(reader: R, gzipped: bool, chunk_size: usize) -> Result<Self> {
        let source = if gzipped {
            Source::compressed(reader)?
        } else {
            Source::Plain(reader)
        };
        Ok(Self {
            source,
            buffer: vec![0; chunk_size.max(1)],
            carry: Vec::new(),
            ready: VecDeque::new(),
            line_number: 0,
            finished: false,
        })
    }

    /// Pull one chunk and move every complete line into `ready`.
    fn fill(&mut self) -> Result<()> {
        let read = loop {
            match self.source.read(&mut self.buffer) {
                Ok(n) => break n,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
                Err(source) if self.source.is_compressed() => {
                    return Err(IngestError::Decompress { source });
                }
                Err(source) => return Err(IngestError::Read { source }),
            }
        };

        if read == 0 {
            self.finished = true;
            if !self.carry.is_empty() {
                self.ready.push_back(std::mem::take(&mut self.carry));
            }
            return Ok(());
        }

        let mut data = std::mem::take(&mut self.carry);
        data.extend_from_slice(&self.buffer[..read]);
        let mut pieces: Vec<&[u8]> = data.split(|&b| b == b'\n').collect();
        // `split` always yields at least one piece; the last one is unfinished.
        let tail = pieces.pop().unwrap_or_default();
        self.ready.extend(pieces.into_iter().map(<[u8]>::to_vec));
        self.carry = tail.to_vec();
        Ok(())
    }

    fn decode(&self, mut line: Vec<u8>) -> Result<String> {
        if matches!(self.source, Source::Plain(_)) && line.last() == Some(&b'\r') {
            line.pop();
        }
        String::from_utf8(line).map_err(|source| IngestError::Utf8 {
            line: self.line_number,
            source,
        })
    }
}

impl<I> LineReader<ChunkSource<I>>
where
    I: Iterator<Item = io::Result<Vec<u8>>>,
{
    /// Create a reader over an iterator of byte chunks.
    pub fn from_chunks(
        chunks: impl IntoIterator<IntoIter = I>,
        gzipped: bool,
    ) -> Result<Self> {
        Self::new(ChunkSource::new(chunks), gzipped)
    }
}

impl<R: Read> Iterator for LineReader<R> {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(line) = self.ready.pop_front() {
                self.line_number += 1;
                let skip = matches!(self.source, Source::Plain(_))
                    && (line.is_empty() || line == b"\r");
                if skip {
                    continue;
                }
                return Some(self.decode(line));
            }
            if self.finished {
                return None;
            }
            if let Err(err) = self.fill() {
                self.finished = true;
                self.ready.clear();
                return Some(Err(err));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use flate2::Compression;
    use flate2::write::{GzEncoder, ZlibEncoder};

    use super::*;

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    fn chunks_of(data: &[u8], size: usize) -> Vec<io::Result<Vec<u8>>> {
        data.chunks(size).map(|c| Ok(c.to_vec())).collect()
    }

    fn collect<R: Read>(reader: LineReader<R>) -> Vec<String> {
        reader.collect::<Result<Vec<_>>>().expect("read lines")
    }

    #[test]
    fn plain_lines_skip_blanks() {
        let reader = LineReader::new(Cursor::new(b"a;b\n\n1;2\r\n3;4".to_vec()), false)
            .expect("create reader");
        assert_eq!(collect(reader), vec!["a;b", "1;2", "3;4"]);
    }

    #[test]
    fn gzip_keeps_blank_lines() {
        let compressed = gzip(b"a\n\nb\n");
        let reader = LineReader::from_chunks(chunks_of(&compressed, 3), true).expect("reader");
        assert_eq!(collect(reader), vec!["a", "", "b"]);
    }

    #[test]
    fn zlib_is_detected() {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"x,y\n1,2").unwrap();
        let compressed = encoder.finish().unwrap();

        let reader = LineReader::new(Cursor::new(compressed), true).expect("reader");
        assert_eq!(collect(reader), vec!["x,y", "1,2"]);
    }

    #[test]
    fn multi_member_gzip_is_read_fully() {
        let mut compressed = gzip(b"first\n");
        compressed.extend(gzip(b"second\n"));
        let reader = LineReader::new(Cursor::new(compressed), true).expect("reader");
        assert_eq!(collect(reader), vec!["first", "second"]);
    }

    #[test]
    fn empty_compressed_source_yields_nothing() {
        let reader = LineReader::new(Cursor::new(Vec::new()), true).expect("reader");
        assert!(collect(reader).is_empty());
    }

    #[test]
    fn corrupt_stream_is_a_decompression_error() {
        let mut compressed = gzip(b"some text that compresses\n");
        let len = compressed.len();
        compressed[len / 2] ^= 0xff;
        compressed[len / 2 + 1] ^= 0xff;
        let results: Vec<_> = LineReader::new(Cursor::new(compressed), true)
            .expect("reader")
            .collect();
        assert!(
            results
                .iter()
                .any(|r| matches!(r, Err(IngestError::Decompress { .. })))
        );
    }

    #[test]
    fn invalid_utf8_reports_line_number() {
        let reader = LineReader::new(Cursor::new(b"ok\n\xff\xfe\n".to_vec()), false).unwrap();
        let results: Vec<_> = reader.collect();
        assert_eq!(results.len(), 2);
        assert!(matches!(results[1], Err(IngestError::Utf8 { line: 2, .. })));
    }

    #[test]
    fn reader_stops_after_error() {
        let chunks: Vec<io::Result<Vec<u8>>> = vec![
            Ok(b"a\nb".to_vec()),
            Err(io::Error::other("connection reset")),
            Ok(b"c\n".to_vec()),
        ];
        let results: Vec<_> = LineReader::from_chunks(chunks, false).unwrap().collect();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].as_deref().ok(), Some("a"));
        assert!(matches!(results[1], Err(IngestError::Read { .. })));
    }
}
