//! Input/output plumbing
//!
//! Opens record and chain files with transparent gzip/bzip2 decompression,
//! memory-maps large plain files, and hands out buffered writers for the
//! converted and unmapped outputs.

use memmap2::Mmap;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Default buffer size for BufReader (128KB)
pub const DEFAULT_BUFFER_SIZE: usize = 128 * 1024;

/// Large buffer size for high-throughput I/O (1MB)
pub const LARGE_BUFFER_SIZE: usize = 1024 * 1024;

/// Threshold for using memory mapping (100MB)
pub const MMAP_THRESHOLD: u64 = 100 * 1024 * 1024;

/// Compression format of an input file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionFormat {
    /// Plain text (uncompressed)
    Plain,
    /// Gzip compressed (.gz), including bgzip
    Gzip,
    /// Bzip2 compressed (.bz2)
    Bzip2,
}

impl CompressionFormat {
    /// Classify a file from its extension and leading bytes
    pub fn sniff(extension: &str, magic: &[u8]) -> Self {
        if extension == "gz" || magic.starts_with(&[0x1f, 0x8b]) {
            CompressionFormat::Gzip
        } else if extension == "bz2" || magic.starts_with(b"BZh") {
            CompressionFormat::Bzip2
        } else {
            CompressionFormat::Plain
        }
    }
}

/// Detect compression format from file path and/or content
pub fn detect_compression(path: &Path) -> io::Result<CompressionFormat> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    let mut file = File::open(path)?;
    let mut magic = [0u8; 3];
    let mut filled = 0;
    while filled < magic.len() {
        let n = file.read(&mut magic[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }

    Ok(CompressionFormat::sniff(extension, &magic[..filled]))
}

/// Open a text file for line reading, decompressing if needed
pub fn open_input(path: &Path) -> io::Result<Box<dyn BufRead>> {
    let reader: Box<dyn BufRead> = match detect_compression(path)? {
        CompressionFormat::Gzip => {
            let decoder = flate2::read::MultiGzDecoder::new(File::open(path)?);
            Box::new(BufReader::with_capacity(DEFAULT_BUFFER_SIZE, decoder))
        }
        CompressionFormat::Bzip2 => {
            let decoder = bzip2::read::BzDecoder::new(File::open(path)?);
            Box::new(BufReader::with_capacity(DEFAULT_BUFFER_SIZE, decoder))
        }
        CompressionFormat::Plain => open_plain(path, MMAP_THRESHOLD)?,
    };
    Ok(reader)
}

/// Create a buffered writer on a file, or on stdout when no path is given
pub fn create_output(path: Option<&Path>) -> io::Result<Box<dyn Write>> {
    let writer: Box<dyn Write> = match path {
        Some(p) => Box::new(BufWriter::with_capacity(DEFAULT_BUFFER_SIZE, File::create(p)?)),
        None => Box::new(BufWriter::with_capacity(DEFAULT_BUFFER_SIZE, io::stdout())),
    };
    Ok(writer)
}

/// Open an uncompressed file, mapping it into memory once it reaches
/// `mmap_threshold` bytes
fn open_plain(path: &Path, mmap_threshold: u64) -> io::Result<Box<dyn BufRead>> {
    let file = File::open(path)?;
    let size = file.metadata()?.len();

    if size >= mmap_threshold {
        return Ok(Box::new(MappedFile::new(&file)?));
    }
    let capacity = if size > 10 * 1024 * 1024 {
        LARGE_BUFFER_SIZE
    } else {
        DEFAULT_BUFFER_SIZE
    };
    Ok(Box::new(BufReader::with_capacity(capacity, file)))
}

/// Read cursor over a memory-mapped file
struct MappedFile {
    mmap: Mmap,
    position: usize,
}

impl MappedFile {
    fn new(file: &File) -> io::Result<Self> {
        // SAFETY: input files are not modified while a conversion reads them
        let mmap = unsafe { Mmap::map(file)? };
        Ok(Self { mmap, position: 0 })
    }
}

impl Read for MappedFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = {
            let available = self.fill_buf()?;
            let n = buf.len().min(available.len());
            buf[..n].copy_from_slice(&available[..n]);
            n
        };
        self.consume(n);
        Ok(n)
    }
}

impl BufRead for MappedFile {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        Ok(&self.mmap[self.position..])
    }

    fn consume(&mut self, amt: usize) {
        self.position = (self.position + amt).min(self.mmap.len());
    }
}

/// Line iterator that reuses a buffer to avoid allocations
///
/// Lines are handed out without their `\n` / `\r\n` terminator but are
/// otherwise untouched.
pub struct LineIterator<R: BufRead> {
    reader: R,
    buffer: String,
}

impl<R: BufRead> LineIterator<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buffer: String::with_capacity(1024),
        }
    }

    /// Read the next line into the internal buffer
    /// Returns None at EOF, Some(Ok(&str)) on success, Some(Err) on error
    pub fn next_line(&mut self) -> Option<io::Result<&str>> {
        self.buffer.clear();
        match self.reader.read_line(&mut self.buffer) {
            Ok(0) => None,
            Ok(_) => {
                if self.buffer.ends_with('\n') {
                    self.buffer.pop();
                    if self.buffer.ends_with('\r') {
                        self.buffer.pop();
                    }
                }
                Some(Ok(&self.buffer))
            }
            Err(e) => Some(Err(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn read_all(path: &Path) -> io::Result<String> {
        let mut content = String::new();
        open_input(path)?.read_to_string(&mut content)?;
        Ok(content)
    }

    #[test]
    fn test_sniff_by_extension_and_magic() {
        assert_eq!(CompressionFormat::sniff("gz", b""), CompressionFormat::Gzip);
        assert_eq!(CompressionFormat::sniff("bz2", b""), CompressionFormat::Bzip2);
        assert_eq!(CompressionFormat::sniff("", &[0x1f, 0x8b, 0x08]), CompressionFormat::Gzip);
        assert_eq!(CompressionFormat::sniff("tab", b"BZh"), CompressionFormat::Bzip2);
        assert_eq!(CompressionFormat::sniff("junc", b"chr"), CompressionFormat::Plain);
        assert_eq!(CompressionFormat::sniff("", b"\x1f"), CompressionFormat::Plain);
    }

    #[test]
    fn test_open_input_plain() -> io::Result<()> {
        let mut temp = NamedTempFile::new()?;
        temp.write_all(b"chr1\t10\t20\n")?;
        temp.flush()?;

        assert_eq!(read_all(temp.path())?, "chr1\t10\t20\n");
        Ok(())
    }

    #[test]
    fn test_open_input_gzip_without_extension() -> io::Result<()> {
        use flate2::write::GzEncoder;
        use flate2::Compression;

        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"chr1\t10\t20\tJ1\t3\t+\n")?;
        let mut temp = NamedTempFile::new()?;
        temp.write_all(&encoder.finish()?)?;
        temp.flush()?;

        assert_eq!(detect_compression(temp.path())?, CompressionFormat::Gzip);
        assert_eq!(read_all(temp.path())?, "chr1\t10\t20\tJ1\t3\t+\n");
        Ok(())
    }

    #[test]
    fn test_open_input_bzip2() -> io::Result<()> {
        use bzip2::write::BzEncoder;
        use bzip2::Compression;

        let mut encoder = BzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"chr2\t5\t9\n")?;
        let mut temp = tempfile::Builder::new().suffix(".bz2").tempfile()?;
        temp.write_all(&encoder.finish()?)?;
        temp.flush()?;

        assert_eq!(read_all(temp.path())?, "chr2\t5\t9\n");
        Ok(())
    }

    #[test]
    fn test_plain_file_mapped_above_threshold() -> io::Result<()> {
        let mut temp = NamedTempFile::new()?;
        temp.write_all(b"chr1\t1\t2\nchr2\t3\t4")?;
        temp.flush()?;

        let lines: Vec<String> = open_plain(temp.path(), 0)?.lines().collect::<io::Result<_>>()?;
        assert_eq!(lines, vec!["chr1\t1\t2", "chr2\t3\t4"]);

        let mut content = String::new();
        open_plain(temp.path(), 0)?.read_to_string(&mut content)?;
        assert_eq!(content, "chr1\t1\t2\nchr2\t3\t4");
        Ok(())
    }

    #[test]
    fn test_empty_plain_file() -> io::Result<()> {
        let temp = NamedTempFile::new()?;
        assert_eq!(read_all(temp.path())?, "");
        Ok(())
    }

    #[test]
    fn test_line_iterator_strips_terminators_only() -> io::Result<()> {
        let data: &[u8] = b"line1\r\n  line2 \t\n\nlast";
        let mut iter = LineIterator::new(data);

        assert_eq!(iter.next_line().unwrap()?, "line1");
        assert_eq!(iter.next_line().unwrap()?, "  line2 \t");
        assert_eq!(iter.next_line().unwrap()?, "");
        assert_eq!(iter.next_line().unwrap()?, "last");
        assert!(iter.next_line().is_none());
        Ok(())
    }
}
