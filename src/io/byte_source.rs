//! Byte sources backing a RAW container
//!
//! A byte source is the random-access stream a container reads from. The
//! container owns its source exclusively for the duration of a decode
//! session; sources are never shared between concurrent decodes.

use std::fs::File;
use std::io::{self, BufReader, Cursor, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use log::{debug, trace};

/// Random-access readable stream
pub trait ByteSource {
    /// Prepare the source for reading
    fn open(&mut self) -> io::Result<()>;

    /// Move the read cursor
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64>;

    /// Read up to `buf.len()` bytes, returning how many were read
    ///
    /// Fewer bytes than requested are only returned at the end of the
    /// stream.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Release the underlying resource
    fn close(&mut self);

    /// Total size of the stream in bytes
    ///
    /// The cursor position is preserved.
    fn size(&mut self) -> io::Result<u64> {
        let current = self.seek(SeekFrom::Current(0))?;
        let size = self.seek(SeekFrom::End(0))?;
        self.seek(SeekFrom::Start(current))?;
        Ok(size)
    }
}

/// Reads until `buf` is full or the reader reports end of stream
fn read_fully(reader: &mut dyn Read, buf: &mut [u8]) -> io::Result<usize> {
    let mut total = 0;
    while total < buf.len() {
        match reader.read(&mut buf[total..]) {
            Ok(0) => break,
            Ok(n) => total += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(total)
}

/// Byte source over a file on disk
///
/// The file is only opened when [`ByteSource::open`] is called.
pub struct FileSource {
    path: PathBuf,
    file: Option<BufReader<File>>,
}

impl FileSource {
    /// Create a source for the given path
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        FileSource {
            path: path.as_ref().to_path_buf(),
            file: None,
        }
    }

    /// Path this source reads from
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn file(&mut self) -> io::Result<&mut BufReader<File>> {
        self.file.as_mut().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotConnected, "file source is not open")
        })
    }
}

impl ByteSource for FileSource {
    fn open(&mut self) -> io::Result<()> {
        if self.file.is_none() {
            debug!("Opening file source: {}", self.path.display());
            let file = File::open(&self.path)?;
            self.file = Some(BufReader::with_capacity(1024 * 1024, file)); // 1MB buffer
        }
        Ok(())
    }

    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.file()?.seek(pos)
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let file = self.file()?;
        read_fully(file, buf)
    }

    fn close(&mut self) {
        if self.file.take().is_some() {
            debug!("Closed file source: {}", self.path.display());
        }
    }
}

/// Reader a [`StreamSource`] can wrap
pub trait SeekableReader: Read + Seek + Send + Sync {}

impl<T: Read + Seek + Send + Sync> SeekableReader for T {}

/// Byte source over any seekable reader
pub struct StreamSource<R: SeekableReader> {
    inner: R,
}

impl<R: SeekableReader> StreamSource<R> {
    /// Wrap a reader
    pub fn new(inner: R) -> Self {
        StreamSource { inner }
    }
}

impl StreamSource<Cursor<Vec<u8>>> {
    /// In-memory source over an owned buffer
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        StreamSource::new(Cursor::new(bytes))
    }
}

impl<R: SeekableReader> ByteSource for StreamSource<R> {
    fn open(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.inner.seek(pos)
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = read_fully(&mut self.inner, buf)?;
        if n < buf.len() {
            trace!("Stream source short read: {} of {} bytes", n, buf.len());
        }
        Ok(n)
    }

    fn close(&mut self) {}
}
