/*!
# Burn Baby Burn: Transport
*/

use crate::BurnError;
use std::time::Duration;



#[derive(Debug, Clone, Copy, Eq, Hash, PartialEq)]
/// # Transfer Direction.
pub enum Direction {
	/// # No Data.
	None,

	/// # From the Drive.
	In,

	/// # To the Drive.
	Out,
}



#[derive(Debug)]
/// # Payload.
///
/// The data page, if any, accompanying a command.
pub enum Payload<'a> {
	/// # No Data.
	None,

	/// # Data Going to the Drive.
	Out(&'a [u8]),

	/// # Buffer for Data Coming From the Drive.
	In(&'a mut [u8]),
}

impl Payload<'_> {
	#[must_use]
	/// # Direction.
	pub const fn direction(&self) -> Direction {
		match self {
			Self::None => Direction::None,
			Self::Out(_) => Direction::Out,
			Self::In(_) => Direction::In,
		}
	}

	#[must_use]
	/// # Length.
	pub fn len(&self) -> usize {
		match self {
			Self::None => 0,
			Self::Out(b) => b.len(),
			Self::In(b) => b.len(),
		}
	}

	#[must_use]
	/// # Is Empty?
	pub fn is_empty(&self) -> bool { self.len() == 0 }

	/// # Reborrow.
	///
	/// Commands may be sent more than once; this hands out a shorter-lived
	/// copy of the payload for each attempt.
	pub fn reborrow(&mut self) -> Payload<'_> {
		match self {
			Self::None => Payload::None,
			Self::Out(b) => Payload::Out(b),
			Self::In(b) => Payload::In(&mut **b),
		}
	}
}



#[derive(Debug, Clone, Copy, Eq, Hash, PartialEq)]
/// # Verdict.
///
/// What to do about a command the drive rejected.
pub enum Verdict {
	/// # Try Again.
	Retry,

	/// # Give Up.
	Fail,

	/// # Give Up; There's No Disc.
	FailEmpty,
}



#[derive(Debug, Clone, Copy, Eq, Hash, PartialEq)]
/// # Sense Data.
///
/// The parts of a drive's error report that matter: the sense key, the
/// additional sense code and qualifier, and, for long-running operations
/// like blanking, a progress indicator.
pub struct Sense {
	key: u8,
	asc: u8,
	ascq: u8,
	progress: Option<u16>,
}

impl Sense {
	#[must_use]
	/// # New.
	pub const fn new(key: u8, asc: u8, ascq: u8) -> Self {
		Self { key: key & 0x0F, asc, ascq, progress: None }
	}

	#[must_use]
	/// # With Progress.
	pub const fn with_progress(self, progress: u16) -> Self {
		Self { progress: Some(progress), ..self }
	}

	#[must_use]
	/// # From Bytes.
	///
	/// Parse fixed-format (`0x70`/`0x71`) or descriptor-format
	/// (`0x72`/`0x73`) sense data. Returns `None` if the buffer is empty,
	/// too short, or of some other format.
	pub fn from_bytes(src: &[u8]) -> Option<Self> {
		match src.first()? & 0x7F {
			0x70 | 0x71 if 14 <= src.len() => {
				let mut out = Self::new(src[2], src[12], src[13]);
				if 18 <= src.len() && 0 != src[15] & 0x80 {
					out.progress = Some(u16::from_be_bytes([src[16], src[17]]));
				}
				Some(out)
			},
			0x72 | 0x73 if 4 <= src.len() => Some(Self::new(src[1], src[2], src[3])),
			_ => None,
		}
	}

	#[must_use]
	/// # To Bytes.
	///
	/// Return fixed-format sense data.
	pub fn to_bytes(&self) -> [u8; 18] {
		let mut out = [0_u8; 18];
		out[0] = 0x70;
		out[2] = self.key;
		out[7] = 10;
		out[12] = self.asc;
		out[13] = self.ascq;
		if let Some(p) = self.progress {
			out[15] = 0x80;
			out[16..].copy_from_slice(&p.to_be_bytes());
		}
		out
	}

	#[must_use]
	/// # Sense Key.
	pub const fn key(&self) -> u8 { self.key }

	#[must_use]
	/// # Additional Sense Code.
	pub const fn asc(&self) -> u8 { self.asc }

	#[must_use]
	/// # Additional Sense Code Qualifier.
	pub const fn ascq(&self) -> u8 { self.ascq }

	#[must_use]
	/// # Progress.
	///
	/// Blanking and formatting report progress out of `0x1_0000`.
	pub const fn progress(&self) -> Option<u16> { self.progress }

	#[must_use]
	/// # Verdict.
	///
	/// Conditions that clear up on their own (becoming ready, seek not yet
	/// complete, nothing wrong at all) are worth retrying; so is a unit
	/// attention about the medium changing. Everything else is fatal, and a
	/// missing medium additionally means the disc is gone.
	pub const fn verdict(&self) -> Verdict {
		match self.asc {
			0x00 | 0x02 | 0x04 => Verdict::Retry,
			0x28 if self.key == 6 => Verdict::Retry,
			0x3A => Verdict::FailEmpty,
			_ => Verdict::Fail,
		}
	}

	#[must_use]
	/// # Description.
	pub const fn describe(&self) -> &'static str {
		match (self.asc, self.ascq) {
			(0x00, _) => "no additional sense",
			(0x02, _) => "no seek complete",
			(0x04, 0x07) => "operation in progress",
			(0x04, 0x08) => "long write in progress",
			(0x04, _) => "drive not ready",
			(0x0C, _) => "write error",
			(0x11, _) => "unrecovered read error",
			(0x20, _) => "invalid command operation code",
			(0x21, _) => "logical block address out of range",
			(0x24, _) => "invalid field in CDB",
			(0x26, _) => "invalid field in parameter list",
			(0x27, _) => "write protected",
			(0x28, _) => "medium may have changed",
			(0x29, _) => "drive was reset",
			(0x2C, _) => "command sequence error",
			(0x30, _) => "incompatible medium",
			(0x3A, _) => "medium not present",
			(0x63, _) => "end of user area encountered",
			(0x64, _) => "illegal mode for this track",
			(0x72, _) => "session fixation error",
			(0x73, _) => "power calibration area error",
			_ => match self.key {
				1 => "recovered error",
				2 => "not ready",
				3 => "medium error",
				4 => "hardware error",
				5 => "illegal request",
				6 => "unit attention",
				7 => "data protect",
				0xB => "aborted command",
				_ => "unknown sense condition",
			},
		}
	}
}



/// # Transport Backend.
///
/// This is the boundary between the library and the operating system: it
/// ships command descriptor blocks and data pages to a device and brings
/// back the outcome. The handle is closed when the transport is dropped.
pub trait Transport: Send {
	/// # Device Address.
	fn address(&self) -> &str;

	/// # Transmit.
	///
	/// Send a command to the drive, returning `Ok(None)` on success, or the
	/// sense data if the drive reported an error.
	///
	/// ## Errors
	///
	/// An `Err` means the command could not be delivered at all.
	fn transmit(&mut self, cdb: &[u8], payload: Payload<'_>, timeout: Duration)
	-> Result<Option<Sense>, BurnError>;
}

impl std::fmt::Debug for dyn Transport {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Transport")
			.field("address", &self.address())
			.finish_non_exhaustive()
	}
}

/// # Device Enumerator.
pub trait Enumerator: Send {
	/// # Addresses.
	///
	/// List the addresses of all candidate optical drives.
	fn addresses(&mut self) -> Vec<String>;

	/// # Open.
	///
	/// ## Errors
	///
	/// Returns an error if the device cannot be opened.
	fn open(&mut self, address: &str) -> Result<Box<dyn Transport>, BurnError>;
}

impl std::fmt::Debug for dyn Enumerator {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Enumerator").finish_non_exhaustive()
	}
}
