/*!
# Burn Baby Burn: Commands
*/

use crate::Direction;
use std::ops::Deref;



#[derive(Debug, Clone, Copy, Eq, Hash, PartialEq)]
/// # Command.
///
/// One kind of exchange with the drive. Each kind knows its own opcode
/// layout; allocation and parameter lengths are filled in from the size of
/// the accompanying payload when the descriptor block is built.
pub enum Command {
	/// # Test Unit Ready.
	TestUnitReady,

	/// # Request Sense.
	RequestSense,

	/// # Inquiry.
	Inquiry,

	/// # Load Tray.
	Load,

	/// # Eject Tray.
	Eject,

	/// # Prevent Medium Removal.
	Prevent,

	/// # Allow Medium Removal.
	Allow,

	/// # Mode Sense (10).
	ModeSense(u8),

	/// # Mode Select (10).
	ModeSelect,

	/// # Read TOC (Full, Format 2).
	ReadToc,

	/// # Read Disc Information.
	DiscInfo,

	/// # Read Track Information (Invisible Track).
	TrackInfo,

	/// # Read Buffer Capacity.
	BufferCapacity,

	/// # Write (10).
	Write {
		/// # Start LBA.
		lba: i32,

		/// # Sector Count.
		sectors: u16,
	},

	/// # Synchronize Cache.
	SyncCache,

	/// # Close Track.
	CloseTrack(u16),

	/// # Close Session.
	CloseSession,

	/// # Send Cue Sheet.
	SendCueSheet,

	/// # Blank.
	Blank {
		/// # Minimal Blank?
		fast: bool,
	},

	/// # Send OPC Information.
	SendOpc,

	/// # Set CD Speed.
	SetSpeed {
		/// # Read Speed (kB/s).
		read: u16,

		/// # Write Speed (kB/s).
		write: u16,
	},
}

impl Command {
	#[must_use]
	/// # Name.
	pub const fn name(self) -> &'static str {
		match self {
			Self::TestUnitReady => "TEST UNIT READY",
			Self::RequestSense => "REQUEST SENSE",
			Self::Inquiry => "INQUIRY",
			Self::Load => "LOAD MEDIUM",
			Self::Eject => "EJECT MEDIUM",
			Self::Prevent => "PREVENT MEDIUM REMOVAL",
			Self::Allow => "ALLOW MEDIUM REMOVAL",
			Self::ModeSense(_) => "MODE SENSE",
			Self::ModeSelect => "MODE SELECT",
			Self::ReadToc => "READ TOC",
			Self::DiscInfo => "READ DISC INFORMATION",
			Self::TrackInfo => "READ TRACK INFORMATION",
			Self::BufferCapacity => "READ BUFFER CAPACITY",
			Self::Write { .. } => "WRITE",
			Self::SyncCache => "SYNCHRONIZE CACHE",
			Self::CloseTrack(_) => "CLOSE TRACK",
			Self::CloseSession => "CLOSE SESSION",
			Self::SendCueSheet => "SEND CUE SHEET",
			Self::Blank { .. } => "BLANK",
			Self::SendOpc => "SEND OPC INFORMATION",
			Self::SetSpeed { .. } => "SET CD SPEED",
		}
	}

	#[must_use]
	/// # Opcode.
	pub const fn opcode(self) -> u8 {
		match self {
			Self::TestUnitReady => 0x00,
			Self::RequestSense => 0x03,
			Self::Inquiry => 0x12,
			Self::Load | Self::Eject => 0x1B,
			Self::Prevent | Self::Allow => 0x1E,
			Self::ModeSense(_) => 0x5A,
			Self::ModeSelect => 0x55,
			Self::ReadToc => 0x43,
			Self::DiscInfo => 0x51,
			Self::TrackInfo => 0x52,
			Self::BufferCapacity => 0x5C,
			Self::Write { .. } => 0x2A,
			Self::SyncCache => 0x35,
			Self::CloseTrack(_) | Self::CloseSession => 0x5B,
			Self::SendCueSheet => 0x5D,
			Self::Blank { .. } => 0xA1,
			Self::SendOpc => 0x54,
			Self::SetSpeed { .. } => 0xBB,
		}
	}

	#[must_use]
	/// # Direction.
	pub const fn direction(self) -> Direction {
		match self {
			Self::RequestSense | Self::Inquiry | Self::ModeSense(_) |
			Self::ReadToc | Self::DiscInfo | Self::TrackInfo |
			Self::BufferCapacity => Direction::In,

			Self::ModeSelect | Self::Write { .. } | Self::SendCueSheet => Direction::Out,

			_ => Direction::None,
		}
	}

	#[must_use]
	/// # Retry Permitted?
	///
	/// Polling commands report the drive's condition rather than act on it;
	/// retrying them would hide what the caller is asking about.
	pub const fn retry(self) -> bool {
		! matches!(self, Self::TestUnitReady | Self::RequestSense)
	}

	#[must_use]
	/// # Command Descriptor Block.
	///
	/// Build the wire bytes for this command. `xfer` is the size of the
	/// payload, used for the allocation or parameter list length fields.
	pub fn cdb(self, xfer: usize) -> Cdb {
		let len16 = u16::try_from(xfer).unwrap_or(u16::MAX).to_be_bytes();
		let len8 = u8::try_from(xfer).unwrap_or(u8::MAX);
		let mut out = Cdb::new(self.opcode(), self.cdb_len());

		match self {
			Self::TestUnitReady | Self::Prevent | Self::Allow | Self::SyncCache |
			Self::SendOpc => {
				if matches!(self, Self::Prevent) { out.buf[4] = 1; }
				if matches!(self, Self::SendOpc) { out.buf[1] = 1; }
			},
			Self::RequestSense | Self::Inquiry => { out.buf[4] = len8; },
			Self::Load => { out.buf[4] = 3; },
			Self::Eject => { out.buf[4] = 2; },
			Self::ModeSense(page) => {
				out.buf[2] = page & 0x3F;
				out.buf[7..9].copy_from_slice(&len16);
			},
			Self::ModeSelect => {
				out.buf[1] = 0x10;
				out.buf[7..9].copy_from_slice(&len16);
			},
			Self::ReadToc => {
				out.buf[1] = 2;
				out.buf[2] = 2;
				out.buf[7..9].copy_from_slice(&len16);
			},
			Self::DiscInfo | Self::BufferCapacity => {
				out.buf[7..9].copy_from_slice(&len16);
			},
			Self::TrackInfo => {
				out.buf[1] = 1;
				out.buf[5] = 0xFF;
				out.buf[7..9].copy_from_slice(&len16);
			},
			Self::Write { lba, sectors } => {
				out.buf[2..6].copy_from_slice(&lba.to_be_bytes());
				out.buf[7..9].copy_from_slice(&sectors.to_be_bytes());
			},
			Self::CloseTrack(track) => {
				out.buf[2] = 1;
				out.buf[4..6].copy_from_slice(&track.to_be_bytes());
			},
			Self::CloseSession => { out.buf[2] = 2; },
			Self::SendCueSheet => {
				let len = u32::try_from(xfer).unwrap_or(0x00FF_FFFF) & 0x00FF_FFFF;
				out.buf[6..9].copy_from_slice(&len.to_be_bytes()[1..]);
			},
			Self::Blank { fast } => { out.buf[1] = 0x10 | u8::from(fast); },
			Self::SetSpeed { read, write } => {
				out.buf[2..4].copy_from_slice(&read.to_be_bytes());
				out.buf[4..6].copy_from_slice(&write.to_be_bytes());
			},
		}

		out
	}

	/// # CDB Length.
	const fn cdb_len(self) -> u8 {
		match self.opcode() {
			0x00..=0x1F => 6,
			0xA0..=0xBF => 12,
			_ => 10,
		}
	}
}



#[derive(Debug, Clone, Copy, Eq, Hash, PartialEq)]
/// # Command Descriptor Block.
pub struct Cdb {
	buf: [u8; 12],
	len: u8,
}

impl Deref for Cdb {
	type Target = [u8];
	fn deref(&self) -> &Self::Target { &self.buf[..usize::from(self.len)] }
}

impl Cdb {
	/// # New.
	const fn new(opcode: u8, len: u8) -> Self {
		let mut buf = [0_u8; 12];
		buf[0] = opcode;
		Self { buf, len }
	}
}
