/*!
# Burn Baby Burn: Data Sources
*/

use crate::BurnError;
use std::{
	fs::File,
	io::{
		ErrorKind,
		Read,
	},
	path::Path,
};



/// # Data Source.
///
/// Track payloads are pulled from a source a buffer at a time while sectors
/// are being formatted.
pub trait Source: Send + Sync {
	/// # Read.
	///
	/// Fill as much of `buf` as possible, returning the number of bytes
	/// written. Zero means the source is exhausted.
	///
	/// ## Errors
	///
	/// Implementations should return `BurnError::Source` for I/O failures.
	fn read(&mut self, buf: &mut [u8]) -> Result<usize, BurnError>;

	/// # Size.
	///
	/// The total number of bytes this source will produce, if known ahead of
	/// time. Open-ended sources return `None`.
	fn size(&self) -> Option<u64>;
}

impl std::fmt::Debug for dyn Source {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Source")
			.field("size", &self.size())
			.finish_non_exhaustive()
	}
}



#[derive(Debug)]
/// # File Source.
///
/// This reads from a regular file, or anything that quacks like one (a
/// pipe, STDIN). Size is only known for regular files.
pub struct FileSource<R: Read + Send + Sync> {
	src: R,
	size: Option<u64>,
}

impl FileSource<File> {
	/// # From Path.
	///
	/// ## Errors
	///
	/// This will return an error if the file cannot be opened.
	pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, BurnError> {
		let path = path.as_ref();
		let file = File::open(path)
			.map_err(|e| BurnError::Source(format!("{}: {e}", path.display())))?;
		let size = file.metadata()
			.ok()
			.and_then(|m| if m.is_file() { Some(m.len()) } else { None });

		Ok(Self { src: file, size })
	}
}

impl FileSource<std::io::Stdin> {
	#[must_use]
	/// # From STDIN.
	///
	/// The result is open-ended.
	pub fn stdin() -> Self {
		Self { src: std::io::stdin(), size: None }
	}
}

impl<R: Read + Send + Sync> FileSource<R> {
	#[must_use]
	/// # From Reader.
	///
	/// Wrap an arbitrary reader, with or without a known size.
	pub const fn from_reader(src: R, size: Option<u64>) -> Self { Self { src, size } }
}

impl<R: Read + Send + Sync> Source for FileSource<R> {
	fn read(&mut self, buf: &mut [u8]) -> Result<usize, BurnError> {
		let mut done = 0;
		while done < buf.len() {
			match self.src.read(&mut buf[done..]) {
				Ok(0) => break,
				Ok(n) => { done += n; },
				Err(e) if e.kind() == ErrorKind::Interrupted => {},
				Err(e) => return Err(BurnError::Source(e.to_string())),
			}
		}
		Ok(done)
	}

	fn size(&self) -> Option<u64> { self.size }
}



#[derive(Debug, Clone, Default)]
/// # Buffer Source.
///
/// An in-memory source.
pub struct BufferSource {
	buf: Vec<u8>,
	pos: usize,
}

impl From<Vec<u8>> for BufferSource {
	#[inline]
	fn from(buf: Vec<u8>) -> Self { Self { buf, pos: 0 } }
}

impl From<&[u8]> for BufferSource {
	#[inline]
	fn from(buf: &[u8]) -> Self { Self::from(buf.to_vec()) }
}

impl Source for BufferSource {
	fn read(&mut self, buf: &mut [u8]) -> Result<usize, BurnError> {
		let rest = self.buf.get(self.pos..).unwrap_or_default();
		let len = rest.len().min(buf.len());
		buf[..len].copy_from_slice(&rest[..len]);
		self.pos += len;
		Ok(len)
	}

	fn size(&self) -> Option<u64> { u64::try_from(self.buf.len()).ok() }
}



#[derive(Debug, Clone, Copy)]
/// # Zero Source.
///
/// A source of `len` null bytes.
pub struct ZeroSource {
	len: u64,
	pos: u64,
}

impl ZeroSource {
	#[must_use]
	/// # New.
	pub const fn new(len: u64) -> Self { Self { len, pos: 0 } }
}

impl Source for ZeroSource {
	#[allow(clippy::cast_possible_truncation)] // It's no bigger than buf.len().
	fn read(&mut self, buf: &mut [u8]) -> Result<usize, BurnError> {
		let rest = self.len.saturating_sub(self.pos);
		let len = rest.min(buf.len() as u64) as usize;
		buf[..len].fill(0);
		self.pos += len as u64;
		Ok(len)
	}

	fn size(&self) -> Option<u64> { Some(self.len) }
}



#[cfg(test)]
mod test {
	use super::*;
	use std::io::Write;

	#[test]
	fn t_buffer() {
		let mut src = BufferSource::from(vec![1_u8, 2, 3, 4, 5]);
		assert_eq!(src.size(), Some(5));

		let mut buf = [0_u8; 3];
		assert_eq!(src.read(&mut buf), Ok(3));
		assert_eq!(buf, [1, 2, 3]);
		assert_eq!(src.read(&mut buf), Ok(2));
		assert_eq!(&buf[..2], &[4, 5]);
		assert_eq!(src.read(&mut buf), Ok(0), "The source should be exhausted.");
	}

	#[test]
	fn t_zero() {
		let mut src = ZeroSource::new(5);
		let mut buf = [9_u8; 4];
		assert_eq!(src.read(&mut buf), Ok(4));
		assert_eq!(buf, [0; 4]);
		assert_eq!(src.read(&mut buf), Ok(1));
		assert_eq!(src.read(&mut buf), Ok(0));
	}

	#[test]
	fn t_file() {
		let mut tmp = tempfile::NamedTempFile::new().expect("Tempfile failed.");
		tmp.write_all(&[7_u8; 3000]).expect("Write failed.");
		tmp.flush().expect("Flush failed.");

		let mut src = FileSource::from_path(tmp.path()).expect("Open failed.");
		assert_eq!(src.size(), Some(3000), "Regular files should have a size.");

		let mut buf = [0_u8; 2048];
		assert_eq!(src.read(&mut buf), Ok(2048));
		assert_eq!(src.read(&mut buf), Ok(952));
		assert_eq!(src.read(&mut buf), Ok(0));

		assert!(matches!(
			FileSource::from_path("/this/path/does/not/exist.iso"),
			Err(BurnError::Source(_)),
		));
	}

	#[test]
	fn t_reader() {
		let mut src = FileSource::from_reader(&[1_u8, 2, 3][..], None);
		assert_eq!(src.size(), None, "Readers are open-ended unless told otherwise.");
		let mut buf = [0_u8; 8];
		assert_eq!(src.read(&mut buf), Ok(3));
	}
}
