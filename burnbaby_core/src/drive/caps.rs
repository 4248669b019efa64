/*!
# Burn Baby Burn: Drive Capabilities
*/

use crate::{
	BlockType,
	WriteType,
};
use serde::Serialize;
use trimothy::TrimSliceMatches;



/// # READ: CD-R.
const READ_CDR: u8 =     0b0000_0001;

/// # READ: CD-RW.
const READ_CDRW: u8 =    0b0000_0010;

/// # READ: DVD-ROM.
const READ_DVDROM: u8 =  0b0000_1000;

/// # READ: DVD-R.
const READ_DVDR: u8 =    0b0001_0000;

/// # READ: DVD-RAM.
const READ_DVDRAM: u8 =  0b0010_0000;

/// # WRITE: CD-R.
const WRITE_CDR: u8 =    0b0000_0001;

/// # WRITE: CD-RW.
const WRITE_CDRW: u8 =   0b0000_0010;

/// # WRITE: Simulate.
const WRITE_SIMULATE: u8 = 0b0000_0100;



#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize)]
/// # Drive Info.
///
/// The identity and capabilities of a drive, collected when it is opened.
pub struct DriveInfo {
	vendor: String,
	product: String,
	revision: String,
	caps: Capabilities,
}

impl DriveInfo {
	#[must_use]
	/// # From Inquiry.
	///
	/// Parse the standard INQUIRY response. Capabilities are filled in
	/// separately.
	pub fn from_inquiry(src: &[u8]) -> Self {
		Self {
			vendor: inquiry_str(src.get(8..16)),
			product: inquiry_str(src.get(16..32)),
			revision: inquiry_str(src.get(32..36)),
			caps: Capabilities::default(),
		}
	}

	/// # Set Capabilities.
	pub(crate) fn set_caps(&mut self, caps: Capabilities) { self.caps = caps; }

	#[must_use]
	/// # Vendor.
	pub fn vendor(&self) -> &str { &self.vendor }

	#[must_use]
	/// # Product.
	pub fn product(&self) -> &str { &self.product }

	#[must_use]
	/// # Revision.
	pub fn revision(&self) -> &str { &self.revision }

	#[must_use]
	/// # Capabilities.
	pub const fn caps(&self) -> &Capabilities { &self.caps }
}



#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Serialize)]
/// # Capabilities.
///
/// Media support, speeds and buffer size come from the MMC capabilities mode
/// page (0x2A); the supported block types for each write type are worked
/// out by probing.
pub struct Capabilities {
	read: u8,
	write: u8,
	underrun_proof: bool,
	c2: bool,
	buffer_size: u16,
	max_read: u16,
	cur_read: u16,
	max_write: u16,
	cur_write: u16,
	block_types: [u16; 3],
}

impl Capabilities {
	#[must_use]
	/// # From Mode Page.
	///
	/// Parse the capabilities page itself, i.e. the mode sense response
	/// minus its eight-byte header. Short pages yield the default.
	pub fn from_page(page: &[u8]) -> Self {
		if page.len() < 22 || page[0] & 0x3F != 0x2A { return Self::default(); }
		let be = |idx: usize| u16::from_be_bytes([page[idx], page[idx + 1]]);

		Self {
			read: page[2],
			write: page[3] & (WRITE_CDR | WRITE_CDRW | WRITE_SIMULATE),
			underrun_proof: 0 != page[4] & 0x80,
			c2: 0 != page[5] & 0x10,
			max_read: be(8),
			buffer_size: be(12),
			cur_read: be(14),
			max_write: be(18),
			cur_write: be(20),
			block_types: [0; 3],
		}
	}

	/// # Set Supported Block Types.
	pub(crate) fn set_block_types(&mut self, write_type: WriteType, bits: u16) {
		self.block_types[write_type as usize] = bits;
	}
}

impl Capabilities {
	#[must_use]
	/// # Reads CD-R?
	pub const fn read_cdr(&self) -> bool { READ_CDR == self.read & READ_CDR }

	#[must_use]
	/// # Reads CD-RW?
	pub const fn read_cdrw(&self) -> bool { READ_CDRW == self.read & READ_CDRW }

	#[must_use]
	/// # Reads DVD-ROM?
	pub const fn read_dvdrom(&self) -> bool { READ_DVDROM == self.read & READ_DVDROM }

	#[must_use]
	/// # Reads DVD-R?
	pub const fn read_dvdr(&self) -> bool { READ_DVDR == self.read & READ_DVDR }

	#[must_use]
	/// # Reads DVD-RAM?
	pub const fn read_dvdram(&self) -> bool { READ_DVDRAM == self.read & READ_DVDRAM }

	#[must_use]
	/// # Writes CD-R?
	pub const fn write_cdr(&self) -> bool { WRITE_CDR == self.write & WRITE_CDR }

	#[must_use]
	/// # Writes CD-RW?
	pub const fn write_cdrw(&self) -> bool { WRITE_CDRW == self.write & WRITE_CDRW }

	#[must_use]
	/// # Writer?
	pub const fn writer(&self) -> bool { 0 != self.write & (WRITE_CDR | WRITE_CDRW) }

	#[must_use]
	/// # Simulated Writes?
	pub const fn simulate(&self) -> bool { WRITE_SIMULATE == self.write & WRITE_SIMULATE }

	#[must_use]
	/// # Buffer Underrun Protection?
	pub const fn underrun_proof(&self) -> bool { self.underrun_proof }

	#[must_use]
	/// # C2 Error Pointers?
	pub const fn c2(&self) -> bool { self.c2 }

	#[must_use]
	/// # Buffer Size (KiB).
	pub const fn buffer_size(&self) -> u16 { self.buffer_size }

	#[must_use]
	/// # Maximum Read Speed (kB/s).
	pub const fn max_read(&self) -> u16 { self.max_read }

	#[must_use]
	/// # Current Read Speed (kB/s).
	pub const fn cur_read(&self) -> u16 { self.cur_read }

	#[must_use]
	/// # Maximum Write Speed (kB/s).
	pub const fn max_write(&self) -> u16 { self.max_write }

	#[must_use]
	/// # Current Write Speed (kB/s).
	pub const fn cur_write(&self) -> u16 { self.cur_write }

	#[must_use]
	/// # Supported Block Types.
	///
	/// A bit set of `BlockType::bit` values.
	pub const fn block_types(&self, write_type: WriteType) -> u16 {
		self.block_types[write_type as usize]
	}

	#[must_use]
	/// # Supports Combination?
	pub const fn supports(&self, write_type: WriteType, block_type: BlockType) -> bool {
		let bit = block_type.bit();
		bit == self.block_types(write_type) & bit
	}
}



/// # Inquiry String.
///
/// The fields are space-padded ASCII; anything else is dropped.
fn inquiry_str(src: Option<&[u8]>) -> String {
	src.map(|s| s.trim_matches(|b| b.is_ascii_whitespace() || b == 0))
		.map(|s| s.iter().filter(|b| b.is_ascii_graphic() || **b == b' ').map(|&b| char::from(b)).collect())
		.unwrap_or_default()
}



#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn t_inquiry() {
		let mut raw = [0_u8; 36];
		raw[8..16].copy_from_slice(b"HL-DT-ST");
		raw[16..32].copy_from_slice(b"DVDRAM GH24NSD1 ");
		raw[32..36].copy_from_slice(b"LG00");
		let info = DriveInfo::from_inquiry(&raw);
		assert_eq!(info.vendor(), "HL-DT-ST");
		assert_eq!(info.product(), "DVDRAM GH24NSD1", "Trailing padding should be trimmed.");
		assert_eq!(info.revision(), "LG00");

		// Short responses yield empty strings.
		let info = DriveInfo::from_inquiry(&raw[..20]);
		assert_eq!(info.vendor(), "HL-DT-ST");
		assert_eq!(info.product(), "");
	}

	#[test]
	fn t_page() {
		let mut page = [0_u8; 30];
		page[0] = 0x2A;
		page[2] = READ_CDR | READ_CDRW | READ_DVDROM;
		page[3] = WRITE_CDR | WRITE_SIMULATE;
		page[4] = 0x80;
		page[8..10].copy_from_slice(&7056_u16.to_be_bytes());
		page[12..14].copy_from_slice(&2048_u16.to_be_bytes());
		page[18..20].copy_from_slice(&5645_u16.to_be_bytes());

		let caps = Capabilities::from_page(&page);
		assert!(caps.read_cdr() && caps.read_cdrw() && caps.read_dvdrom());
		assert!(! caps.read_dvdr());
		assert!(caps.write_cdr());
		assert!(! caps.write_cdrw());
		assert!(caps.writer());
		assert!(caps.simulate());
		assert!(caps.underrun_proof());
		assert!(! caps.c2());
		assert_eq!(caps.max_read(), 7056);
		assert_eq!(caps.buffer_size(), 2048);
		assert_eq!(caps.max_write(), 5645);

		// Wrong page.
		page[0] = 0x05;
		assert_eq!(Capabilities::from_page(&page), Capabilities::default());
	}

	#[test]
	fn t_block_types() {
		let mut caps = Capabilities::default();
		caps.set_block_types(WriteType::Sao, BlockType::Sao.bit() | BlockType::Mode1.bit());
		assert!(caps.supports(WriteType::Sao, BlockType::Sao));
		assert!(caps.supports(WriteType::Sao, BlockType::Mode1));
		assert!(! caps.supports(WriteType::Sao, BlockType::Raw96R));
		assert!(! caps.supports(WriteType::Tao, BlockType::Mode1));
	}
}
