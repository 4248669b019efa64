/*!
# Burn Baby Burn: Track Feed
*/

use crate::{
	BurnError,
	Source,
	Track,
};
use crc32fast::Hasher;



/// # Track Feed.
///
/// This is a track's payload as the writer sees it: the leading zeroes, the
/// source, then the trailing zeroes, pulled a sector (or less) at a time.
///
/// Bytes read from the source are hashed along the way so a checksum can be
/// reported once the track is done.
pub(super) struct Feed {
	offset: u64,
	src: Option<Box<dyn Source>>,
	tail: u64,
	hasher: Hasher,
	read: u64,
}

impl std::fmt::Debug for Feed {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Feed")
			.field("offset", &self.offset)
			.field("tail", &self.tail)
			.field("read", &self.read)
			.finish_non_exhaustive()
	}
}

impl Feed {
	/// # New.
	///
	/// Note this takes the source from the track.
	pub(super) fn new(track: &mut Track) -> Self {
		Self {
			offset: u64::from(track.offset()),
			src: track.take_source(),
			tail: u64::from(track.tail()),
			hasher: Hasher::new(),
			read: 0,
		}
	}

	/// # Fill.
	///
	/// Copy as much of the payload into `buf` as is left, returning the
	/// number of bytes written. Zero means the feed is exhausted.
	///
	/// ## Errors
	///
	/// Source read failures are passed through.
	pub(super) fn fill(&mut self, buf: &mut [u8]) -> Result<usize, BurnError> {
		let mut pos = zeroes(&mut self.offset, buf);

		while pos < buf.len() {
			let Some(src) = self.src.as_mut() else { break; };
			let len = src.read(&mut buf[pos..])?;
			if len == 0 {
				self.src = None;
				break;
			}
			self.hasher.update(&buf[pos..pos + len]);
			self.read += len as u64;
			pos += len;
		}

		if self.src.is_none() {
			pos += zeroes(&mut self.tail, &mut buf[pos..]);
		}

		Ok(pos)
	}

	/// # Summary.
	///
	/// Return the number of source bytes read and their CRC32.
	pub(super) fn summary(&self) -> (u64, u32) {
		(self.read, self.hasher.clone().finalize())
	}
}



/// # Zero Fill.
///
/// Zero up to `left` bytes at the start of `buf`, decrementing the count
/// and returning the number written.
fn zeroes(left: &mut u64, buf: &mut [u8]) -> usize {
	let len = usize::try_from(*left).map_or(buf.len(), |l| l.min(buf.len()));
	buf[..len].fill(0);
	*left -= len as u64;
	len
}



#[cfg(test)]
mod test {
	use super::*;
	use crate::{
		BufferSource,
		TrackMode,
	};

	#[test]
	fn t_fill() {
		let mut track = Track::new(TrackMode::MODE1)
			.with_source(Box::new(BufferSource::from(vec![7_u8; 10])));
		assert!(track.define_data(3, 4, true, TrackMode::MODE1).is_ok());

		let mut feed = Feed::new(&mut track);
		assert!(! track.has_source(), "The feed should own the source now.");

		let mut buf = [0xFF_u8; 8];
		assert_eq!(feed.fill(&mut buf).expect("Fill failed."), 8);
		assert_eq!(buf, [0, 0, 0, 7, 7, 7, 7, 7]);

		assert_eq!(feed.fill(&mut buf).expect("Fill failed."), 8);
		assert_eq!(buf, [7, 7, 7, 7, 7, 0, 0, 0]);

		buf.fill(0xFF);
		assert_eq!(feed.fill(&mut buf).expect("Fill failed."), 1);
		assert_eq!(buf[0], 0);
		assert_eq!(feed.fill(&mut buf).expect("Fill failed."), 0);

		let (read, crc) = feed.summary();
		assert_eq!(read, 10, "Padding does not count.");
		assert_eq!(crc, crc32fast::hash(&[7_u8; 10]));
	}
}
