/*!
# Burn Baby Burn: Track Modes, Block Types, Write Types
*/

use crate::{
	SECTOR_MODE1,
	SECTOR_RAW,
};
use serde::{
	Deserialize,
	Serialize,
};
use std::ops::BitOr;



#[derive(Debug, Clone, Copy, Default, Eq, Hash, PartialEq, Deserialize, Serialize)]
/// # Track Mode.
///
/// This is a small bit set describing a track's payload: the main format
/// (audio, mode 1, raw), a few audio flags, and which sub-channel layout,
/// if any, rides along with each sector.
///
/// ```
/// use burnbaby_core::TrackMode;
///
/// let mode = TrackMode::AUDIO | TrackMode::PREEMPHASIS;
/// assert_eq!(mode.ctrl(), Some(1));
/// assert_eq!(mode.sector_len(), Some(2352));
///
/// assert_eq!(TrackMode::MODE1.form(), Some(0x10));
/// assert_eq!(TrackMode::MODE1.sector_len(), Some(2048));
/// ```
pub struct TrackMode(u16);

impl BitOr for TrackMode {
	type Output = Self;
	#[inline]
	fn bitor(self, rhs: Self) -> Self { Self(self.0 | rhs.0) }
}

impl From<TrackMode> for u16 {
	#[inline]
	fn from(src: TrackMode) -> Self { src.0 }
}

/// ## Flags.
impl TrackMode {
	/// # Mode 0 (unsupported).
	pub const MODE0: Self =       Self(1 << 0);

	/// # Raw 2352-byte sectors.
	pub const MODE_RAW: Self =    Self(1 << 1);

	/// # Mode 1 data.
	pub const MODE1: Self =       Self(1 << 2);

	/// # Mode 2 data (unsupported).
	pub const MODE2: Self =       Self(1 << 3);

	/// # Mode 2, Form 1.
	pub const FORM1: Self =       Self(1 << 4);

	/// # Mode 2, Form 2.
	pub const FORM2: Self =       Self(1 << 5);

	/// # Audio.
	pub const AUDIO: Self =       Self(1 << 6);

	/// # Four-Channel Audio.
	pub const FOUR_CH: Self =     Self(1 << 7);

	/// # Digital Copy Permitted.
	pub const COPY: Self =        Self(1 << 8);

	/// # Pre-emphasis.
	pub const PREEMPHASIS: Self = Self(1 << 9);

	/// # 16-byte P/Q Sub-channel.
	pub const SUBCODE_P16: Self = Self(1 << 10);

	/// # 96-byte Interleaved Sub-channel.
	pub const SUBCODE_P96: Self = Self(1 << 11);

	/// # 96-byte Raw R-W Sub-channel.
	pub const SUBCODE_R96: Self = Self(1 << 12);
}

impl TrackMode {
	#[must_use]
	/// # From Raw Bits.
	pub const fn from_bits(bits: u16) -> Self { Self(bits) }

	#[must_use]
	/// # Raw Bits.
	pub const fn bits(self) -> u16 { self.0 }

	#[must_use]
	/// # Contains?
	pub const fn contains(self, other: Self) -> bool { other.0 == self.0 & other.0 }

	#[must_use]
	/// # Audio?
	pub const fn is_audio(self) -> bool { self.contains(Self::AUDIO) }

	#[must_use]
	/// # Data?
	pub const fn is_data(self) -> bool {
		0 != self.0 & (Self::MODE0.0 | Self::MODE1.0 | Self::MODE2.0)
	}

	#[must_use]
	/// # Control Nibble.
	///
	/// Data tracks get `4`; audio tracks get `8` for four channels and `1`
	/// for pre-emphasis; either way `2` marks copying as permitted.
	///
	/// Returns `None` if the mode is neither audio nor data.
	pub const fn ctrl(self) -> Option<u8> {
		let mut ctrl =
			if self.is_data() { 4 }
			else if self.is_audio() {
				let mut ctrl = 0;
				if self.contains(Self::FOUR_CH) { ctrl |= 8; }
				if self.contains(Self::PREEMPHASIS) { ctrl |= 1; }
				ctrl
			}
			else { return None; };

		if self.contains(Self::COPY) { ctrl |= 2; }
		Some(ctrl)
	}

	#[must_use]
	/// # Control/ADR Byte.
	///
	/// The control nibble shifted into place, with a zero ADR. Callers OR in
	/// the ADR they need.
	pub const fn ctladr(self) -> Option<u8> {
		match self.ctrl() {
			Some(c) => Some(c << 4),
			None => None,
		}
	}

	#[must_use]
	/// # Cue Sheet Data Form.
	///
	/// Returns `None` for the modes that cannot be written (mode 0, mode 2,
	/// or anything without a control nibble).
	pub const fn form(self) -> Option<u8> {
		if
			self.ctrl().is_none() ||
			self.contains(Self::MODE0) ||
			self.contains(Self::MODE2)
		{
			return None;
		}

		let mut form =
			if self.contains(Self::MODE_RAW) || self.is_audio() { 0 }
			else if self.contains(Self::MODE1) { 0x10 }
			else { return None; };

		if self.contains(Self::SUBCODE_P16) { form |= 0x40; }
		if self.contains(Self::SUBCODE_P96) { form |= 0xC0; }
		if self.contains(Self::SUBCODE_R96) { form |= 0x40; }

		Some(form)
	}

	#[must_use]
	/// # Sector Length.
	///
	/// This is the number of payload bytes consumed from the data source per
	/// sector: 2352 for audio and raw, 2048 for mode 1.
	pub const fn sector_len(self) -> Option<u16> {
		if self.is_audio() || self.contains(Self::MODE_RAW) { Some(SECTOR_RAW) }
		else if self.contains(Self::MODE1) { Some(SECTOR_MODE1) }
		else { None }
	}

	#[must_use]
	/// # Sub-channel Length.
	pub const fn subcode_len(self) -> u16 {
		if self.contains(Self::SUBCODE_P16) { 16 }
		else if self.contains(Self::SUBCODE_P96) || self.contains(Self::SUBCODE_R96) { 96 }
		else { 0 }
	}

	#[must_use]
	/// # Subcode Layout.
	pub(crate) const fn subcode(self) -> Subcode {
		if self.contains(Self::SUBCODE_P16) { Subcode::P16 }
		else if self.contains(Self::SUBCODE_P96) { Subcode::P96 }
		else if self.contains(Self::SUBCODE_R96) { Subcode::R96 }
		else { Subcode::None }
	}

	#[must_use]
	/// # Is Valid?
	///
	/// A mode is usable when it has a cue sheet form and a sector length.
	pub const fn is_valid(self) -> bool {
		self.form().is_some() && self.sector_len().is_some()
	}
}



#[derive(Debug, Clone, Copy, Eq, Hash, PartialEq)]
/// # Sub-channel Layout.
pub(crate) enum Subcode {
	/// # Nothing.
	None,

	/// # 16-byte formatted Q, plus P.
	P16,

	/// # 96-byte interleaved P-W.
	P96,

	/// # 96-byte packed R-W.
	R96,
}

impl Subcode {
	#[must_use]
	/// # Length.
	pub(crate) const fn len(self) -> usize {
		match self {
			Self::None => 0,
			Self::P16 => 16,
			Self::P96 | Self::R96 => 96,
		}
	}
}



#[derive(Debug, Clone, Copy, Default, Eq, Hash, PartialEq, Deserialize, Serialize)]
/// # Write Type.
pub enum WriteType {
	#[default]
	/// # Track At Once.
	Tao,

	/// # Session At Once.
	Sao,

	/// # Raw.
	Raw,
}

impl WriteType {
	/// # All Types.
	pub const ALL: [Self; 3] = [Self::Tao, Self::Sao, Self::Raw];

	#[must_use]
	/// # MMC Write Type Code.
	pub const fn code(self) -> u8 {
		match self {
			Self::Tao => 1,
			Self::Sao => 2,
			Self::Raw => 3,
		}
	}

	#[must_use]
	/// # As Str.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Tao => "TAO",
			Self::Sao => "SAO",
			Self::Raw => "RAW",
		}
	}
}



#[derive(Debug, Clone, Copy, Eq, Hash, PartialEq, Deserialize, Serialize)]
/// # Block Type.
///
/// This is the data block layout the drive is told to expect.
pub enum BlockType {
	/// # Raw, no sub-channel (2352).
	Raw0,

	/// # Raw with 16 bytes of P/Q (2368).
	Raw16,

	/// # Raw with 96 bytes of interleaved P-W (2448).
	Raw96P,

	/// # Raw with 96 bytes of packed R-W (2448).
	Raw96R,

	/// # Mode 1 (2048).
	Mode1,

	/// # Mode 2 raw (2336).
	Mode2R,

	/// # Mode 2 form 1 (2048).
	Mode2Pathetic,

	/// # Mode 2 form 1 with subheader (2056).
	Mode2Lame,

	/// # Mode 2 form 2 (2324).
	Mode2Obscure,

	/// # Mode 2 mixed form with subheader (2332).
	Mode2Ok,

	/// # Session At Once (layout follows each track's mode).
	Sao,
}

impl BlockType {
	/// # All Types.
	pub const ALL: [Self; 11] = [
		Self::Raw0, Self::Raw16, Self::Raw96P, Self::Raw96R,
		Self::Mode1, Self::Mode2R, Self::Mode2Pathetic, Self::Mode2Lame,
		Self::Mode2Obscure, Self::Mode2Ok, Self::Sao,
	];

	#[must_use]
	/// # MMC Data Block Type Code.
	pub const fn code(self) -> u8 {
		match self {
			Self::Raw0 | Self::Sao => 0,
			Self::Raw16 => 1,
			Self::Raw96P => 2,
			Self::Raw96R => 3,
			Self::Mode1 => 8,
			Self::Mode2R => 9,
			Self::Mode2Pathetic => 10,
			Self::Mode2Lame => 11,
			Self::Mode2Obscure => 12,
			Self::Mode2Ok => 13,
		}
	}

	#[must_use]
	/// # From Code.
	///
	/// Note that code zero resolves to `Raw0`; `Sao` shares it but is never
	/// probed by number.
	pub const fn from_code(code: u8) -> Option<Self> {
		match code {
			0 => Some(Self::Raw0),
			1 => Some(Self::Raw16),
			2 => Some(Self::Raw96P),
			3 => Some(Self::Raw96R),
			8 => Some(Self::Mode1),
			9 => Some(Self::Mode2R),
			10 => Some(Self::Mode2Pathetic),
			11 => Some(Self::Mode2Lame),
			12 => Some(Self::Mode2Obscure),
			13 => Some(Self::Mode2Ok),
			_ => None,
		}
	}

	#[must_use]
	/// # Bit.
	///
	/// Drives report supported block types as a bit set, one bit per type.
	pub const fn bit(self) -> u16 {
		match self {
			Self::Sao => 1 << 14,
			_ => 1 << self.code(),
		}
	}

	#[must_use]
	/// # Raw?
	pub const fn is_raw(self) -> bool {
		matches!(self, Self::Raw0 | Self::Raw16 | Self::Raw96P | Self::Raw96R)
	}

	#[must_use]
	/// # Raw Sub-channel Layout.
	pub(crate) const fn subcode(self) -> Subcode {
		match self {
			Self::Raw16 => Subcode::P16,
			Self::Raw96P => Subcode::P96,
			Self::Raw96R => Subcode::R96,
			_ => Subcode::None,
		}
	}
}



#[derive(Debug, Clone, Copy, Default, Eq, Hash, PartialEq, Deserialize, Serialize)]
/// # Disc Format.
///
/// This ends up in the lead-in (point A0) and the session format field of
/// the write parameters.
pub enum DiscFormat {
	#[default]
	/// # CD-DA or CD-ROM.
	CdRom,

	/// # CD-i.
	Cdi,

	/// # CD-ROM XA.
	CdXa,
}

impl DiscFormat {
	#[must_use]
	/// # Format Code.
	pub const fn code(self) -> u8 {
		match self {
			Self::CdRom => 0x00,
			Self::Cdi => 0x10,
			Self::CdXa => 0x20,
		}
	}
}



#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn t_ctrl() {
		assert_eq!(TrackMode::MODE1.ctrl(), Some(4));
		assert_eq!((TrackMode::MODE1 | TrackMode::COPY).ctrl(), Some(6));
		assert_eq!(TrackMode::AUDIO.ctrl(), Some(0));
		assert_eq!((TrackMode::AUDIO | TrackMode::FOUR_CH).ctrl(), Some(8));
		assert_eq!((TrackMode::AUDIO | TrackMode::PREEMPHASIS | TrackMode::COPY).ctrl(), Some(3));
		assert_eq!(TrackMode::MODE_RAW.ctrl(), None, "Raw alone has no control.");
		assert_eq!(TrackMode::MODE1.ctladr(), Some(0x40));
	}

	#[test]
	fn t_form() {
		assert_eq!(TrackMode::AUDIO.form(), Some(0));
		assert_eq!(TrackMode::MODE1.form(), Some(0x10));
		assert_eq!((TrackMode::MODE1 | TrackMode::MODE_RAW).form(), Some(0));
		assert_eq!((TrackMode::AUDIO | TrackMode::SUBCODE_P16).form(), Some(0x40));
		assert_eq!((TrackMode::AUDIO | TrackMode::SUBCODE_P96).form(), Some(0xC0));
		assert_eq!((TrackMode::AUDIO | TrackMode::SUBCODE_R96).form(), Some(0x40));
		assert_eq!(TrackMode::MODE0.form(), None);
		assert_eq!(TrackMode::MODE2.form(), None);
		assert_eq!((TrackMode::MODE2 | TrackMode::FORM1).form(), None);
	}

	#[test]
	fn t_lengths() {
		assert_eq!(TrackMode::AUDIO.sector_len(), Some(2352));
		assert_eq!((TrackMode::MODE1 | TrackMode::MODE_RAW).sector_len(), Some(2352));
		assert_eq!(TrackMode::MODE1.sector_len(), Some(2048));
		assert_eq!(TrackMode::MODE2.sector_len(), None);

		assert_eq!(TrackMode::AUDIO.subcode_len(), 0);
		assert_eq!((TrackMode::AUDIO | TrackMode::SUBCODE_P16).subcode_len(), 16);
		assert_eq!((TrackMode::AUDIO | TrackMode::SUBCODE_R96).subcode_len(), 96);

		assert!(TrackMode::AUDIO.is_valid());
		assert!(TrackMode::MODE1.is_valid());
		assert!(! TrackMode::MODE0.is_valid());
		assert!(! TrackMode::default().is_valid());
	}

	#[test]
	fn t_block_types() {
		for b in BlockType::ALL {
			if b != BlockType::Sao {
				assert_eq!(BlockType::from_code(b.code()), Some(b), "Code mismatch for {b:?}.");
			}
		}
		assert_eq!(BlockType::Raw0.bit(), 1);
		assert_eq!(BlockType::Raw96R.bit(), 8);
		assert_eq!(BlockType::Mode1.bit(), 256);
		assert_eq!(BlockType::Mode2R.bit(), 512);
		assert_eq!(BlockType::Sao.bit(), 16_384);
		assert_eq!(BlockType::from_code(4), None);
	}
}
