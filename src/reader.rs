//! ## Chunk reader
//! Cuts an input byte stream into chunks of at most `chunk_size` bytes (plus a carried
//! partial line in line-aligned mode) and sends them, in input order, through a bounded
//! channel. The channel is closed when the reader is done so workers can drain and stop.
//!
//! A read error ends the stream: everything read so far is still delivered and
//! [`ReadStats::interrupted`] is set. The resulting count covers only that prefix.

use std::io::{self, Read};

use crossbeam_channel::Sender;

use crate::config::ChunkBoundary;
use crate::error::{Error, Result};

/// Outcome of a reader run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadStats {
    /// Number of chunks sent
    pub chunks: usize,
    /// Number of bytes read from the input
    pub bytes: u64,
    /// Whether reading stopped on an I/O error rather than end-of-stream
    pub interrupted: bool,
}

/// Fixed-size chunk reader
pub struct ChunkReader<R> {
    input: R,
    chunk_size: usize,
    boundary: ChunkBoundary,
}

impl<R: Read> ChunkReader<R> {
    /// Creates new `ChunkReader`, failing with `Error::InvalidConfig` if `chunk_size` is zero
    pub fn new(input: R, chunk_size: usize, boundary: ChunkBoundary) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::InvalidConfig("chunk size must be positive".into()));
        }
        Ok(Self {
            input,
            chunk_size,
            boundary,
        })
    }

    /// Read the whole input, sending chunks to `tx`. Dropping `tx` on return closes the
    /// channel.
    pub fn run(mut self, tx: Sender<Vec<u8>>) -> ReadStats {
        let mut stats = ReadStats::default();
        // partial line carried over from the previous chunk
        let mut pending = Vec::new();

        loop {
            // the carried bytes stay in place, only the fresh chunk is appended
            let mut buf = std::mem::take(&mut pending);
            let start = buf.len();
            buf.resize(start + self.chunk_size, 0);

            let (n, err) = fill(&mut self.input, &mut buf[start..]);
            buf.truncate(start + n);
            stats.bytes += n as u64;

            if let Some(err) = err {
                tracing::warn!(
                    error = %err,
                    bytes = stats.bytes,
                    "read failed, counting the input read so far"
                );
                stats.interrupted = true;
            }
            if n == 0 || stats.interrupted {
                if !buf.is_empty() && tx.send(buf).is_ok() {
                    stats.chunks += 1;
                }
                break;
            }

            if self.boundary == ChunkBoundary::LineAligned {
                // carried bytes hold no newline, so only the fresh ones are scanned
                match buf[start..].iter().rposition(|&b| b == b'\n') {
                    Some(pos) => pending = buf.split_off(start + pos + 1),
                    None => {
                        // no line ends in this chunk yet, keep accumulating
                        pending = buf;
                        continue;
                    }
                }
            }

            if tx.send(buf).is_err() {
                // every worker is gone, nobody is left to count
                break;
            }
            stats.chunks += 1;
        }

        tracing::debug!(
            chunks = stats.chunks,
            bytes = stats.bytes,
            interrupted = stats.interrupted,
            "reader finished"
        );
        stats
    }
}

/// Read until `buf` is full, end-of-stream, or an error.
/// Returns number of bytes read along with the error that stopped reading, if any.
fn fill<R: Read>(input: &mut R, buf: &mut [u8]) -> (usize, Option<io::Error>) {
    let mut filled = 0;
    while filled < buf.len() {
        match input.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return (filled, Some(e)),
        }
    }
    (filled, None)
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crossbeam_channel::unbounded;
    use test_case::test_case;

    fn read_chunks(input: &[u8], chunk_size: usize, boundary: ChunkBoundary) -> Vec<Vec<u8>> {
        let (tx, rx) = unbounded();
        let stats = ChunkReader::new(input, chunk_size, boundary).unwrap().run(tx);
        let chunks: Vec<Vec<u8>> = rx.iter().collect();
        assert_eq!(stats.chunks, chunks.len());
        assert_eq!(stats.bytes, input.len() as u64);
        assert!(!stats.interrupted);
        chunks
    }

    #[test_case(ChunkBoundary::LineAligned; "line aligned")]
    #[test_case(ChunkBoundary::Split; "split")]
    fn test_preserves_bytes(boundary: ChunkBoundary) {
        let input = b"10.0.0.1\n10.0.0.2\n192.168.1.1\n1.2.3.4";
        for chunk_size in [1, 3, 8, 9, 16, 1024] {
            let chunks = read_chunks(input, chunk_size, boundary);
            assert_eq!(chunks.concat(), input.to_vec(), "chunk size {}", chunk_size);
        }
    }

    #[test]
    fn test_split_ignores_lines() {
        let chunks = read_chunks(b"10.0.0.1\n10.0.0.2\n", 6, ChunkBoundary::Split);
        assert_eq!(
            chunks,
            vec![b"10.0.0".to_vec(), b".1\n10.".to_vec(), b"0.0.2\n".to_vec()]
        );
    }

    #[test]
    fn test_line_aligned_chunks_end_on_newline() {
        let input = b"10.0.0.1\n10.0.0.2\n10.0.0.3";
        let chunks = read_chunks(input, 6, ChunkBoundary::LineAligned);
        assert_eq!(
            chunks,
            vec![
                b"10.0.0.1\n".to_vec(),
                b"10.0.0.2\n".to_vec(),
                b"10.0.0.3".to_vec()
            ]
        );
    }

    #[test]
    fn test_long_line_spans_many_chunks() {
        let padding = 4 << 20;
        let mut input = vec![b' '; padding];
        input.extend_from_slice(b"10.0.0.1\n10.0.0.2\n");

        let started = std::time::Instant::now();
        let chunks = read_chunks(&input, 1024, ChunkBoundary::LineAligned);
        assert!(
            started.elapsed() < std::time::Duration::from_secs(5),
            "took {:?}",
            started.elapsed()
        );

        // the padded line is delivered whole, followed by the rest of the input
        assert_eq!(chunks.concat(), input);
        assert_eq!(chunks[0].len(), padding + b"10.0.0.1\n10.0.0.2\n".len());
        assert!(chunks[0].ends_with(b"\n"));
    }

    #[test]
    fn test_zero_chunk_size_is_rejected() {
        assert!(matches!(
            ChunkReader::new(&b"10.0.0.1\n"[..], 0, ChunkBoundary::Split),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_empty_input() {
        assert!(read_chunks(b"", 4, ChunkBoundary::LineAligned).is_empty());
    }

    /// Yields `data` in one read, then fails
    struct FailingReader<'a> {
        data: &'a [u8],
    }

    impl Read for FailingReader<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.data.is_empty() {
                return Err(io::Error::new(io::ErrorKind::Other, "disk on fire"));
            }
            let n = self.data.read(buf)?;
            Ok(n)
        }
    }

    #[test]
    fn test_read_error_ends_stream() {
        let (tx, rx) = unbounded();
        let input = FailingReader {
            data: b"10.0.0.1\n10.0.0.2",
        };
        let stats = ChunkReader::new(input, 1024, ChunkBoundary::LineAligned)
            .unwrap()
            .run(tx);
        assert!(stats.interrupted);
        assert_eq!(stats.bytes, 17);
        assert_eq!(rx.iter().flatten().collect::<Vec<u8>>(), b"10.0.0.1\n10.0.0.2".to_vec());
    }

    /// Fails with `Interrupted` on every other read
    struct InterruptedReader<'a> {
        data: &'a [u8],
        interrupt: bool,
    }

    impl Read for InterruptedReader<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.interrupt = !self.interrupt;
            if self.interrupt {
                return Err(io::ErrorKind::Interrupted.into());
            }
            let len = buf.len().min(2);
            self.data.read(&mut buf[..len])
        }
    }

    #[test]
    fn test_interrupted_reads_are_retried() {
        let (tx, rx) = unbounded();
        let input = InterruptedReader {
            data: b"1.1.1.1\n2.2.2.2\n",
            interrupt: false,
        };
        let stats = ChunkReader::new(input, 5, ChunkBoundary::Split)
            .unwrap()
            .run(tx);
        assert!(!stats.interrupted);
        assert_eq!(rx.iter().flatten().collect::<Vec<u8>>(), b"1.1.1.1\n2.2.2.2\n".to_vec());
    }
}
