/*!
# Burn Baby Burn: Sector Buffer
*/

use crate::BUFFER_SIZE;



#[derive(Debug)]
/// # Sector Buffer.
///
/// Sectors are queued here until the next one would not fit, or would be a
/// different size, then sent to the drive with a single WRITE.
///
/// A WRITE can only describe a run of same-sized sectors, so callers should
/// check `fits` before each `next` and flush when it says no.
pub(crate) struct SectorBuffer {
	buf: Vec<u8>,
	sector_len: usize,
	sectors: u16,
}

impl SectorBuffer {
	/// # New Instance.
	pub(crate) fn new() -> Self {
		Self {
			buf: Vec::with_capacity(BUFFER_SIZE),
			sector_len: 0,
			sectors: 0,
		}
	}

	/// # Fits?
	///
	/// Returns `true` if a sector of this length can be appended.
	pub(crate) fn fits(&self, len: usize) -> bool {
		self.sectors == 0 ||
		(self.sector_len == len && self.buf.len() + len <= BUFFER_SIZE)
	}

	/// # Next Sector.
	///
	/// Append a zeroed sector of the given length and return it for
	/// writing.
	pub(crate) fn next(&mut self, len: usize) -> &mut [u8] {
		let start = self.buf.len();
		self.buf.resize(start + len, 0);
		self.sector_len = len;
		self.sectors += 1;
		&mut self.buf[start..]
	}

	/// # Clear.
	pub(crate) fn clear(&mut self) {
		self.buf.clear();
		self.sectors = 0;
	}
}

/// # Getters.
impl SectorBuffer {
	/// # As Slice.
	pub(crate) fn as_slice(&self) -> &[u8] { &self.buf }

	/// # Empty?
	pub(crate) const fn is_empty(&self) -> bool { self.sectors == 0 }

	/// # Sector Count.
	pub(crate) const fn sectors(&self) -> u16 { self.sectors }
}



#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn t_fits() {
		let mut buf = SectorBuffer::new();
		assert!(buf.is_empty());
		assert!(buf.fits(2352));

		// Thirteen raw sectors fit; a fourteenth does not.
		for _ in 0..13 {
			assert!(buf.fits(2352));
			buf.next(2352).fill(1);
		}
		assert_eq!(buf.sectors(), 13);
		assert_eq!(buf.as_slice().len(), 13 * 2352);
		assert!(! buf.fits(2352));

		// Size changes need a flush too.
		buf.clear();
		buf.next(2048);
		assert!(! buf.fits(2352), "Mixed sizes cannot share a WRITE.");
		assert!(buf.fits(2048));

		// New sectors start out zeroed.
		buf.clear();
		assert!(buf.next(2048).iter().all(|b| 0 == *b));
	}
}
