/*!
# Burn Baby Burn: Disc Structure
*/

use crate::{
	BurnError,
	msf_to_lba,
	POS_END,
	Source,
	TocEntry,
	TrackMode,
};
use std::sync::atomic::{
	AtomicU64,
	Ordering::Relaxed,
};



/// # Maximum Tracks.
pub const MAX_TRACKS: usize = 99;

/// # Identity Counter.
static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// # Next ID.
fn next_id() -> u64 { NEXT_ID.fetch_add(1, Relaxed) }



#[derive(Debug, Clone, Copy, Eq, Hash, PartialEq)]
/// # Track ID.
///
/// An opaque handle used to remove a specific track from its session.
pub struct TrackId(u64);

#[derive(Debug, Clone, Copy, Eq, Hash, PartialEq)]
/// # Session ID.
///
/// An opaque handle used to remove a specific session from its disc.
pub struct SessionId(u64);



#[derive(Debug, Clone, Copy, Eq, Hash, PartialEq)]
/// # ISRC.
///
/// An International Standard Recording Code, written into the track's
/// sub-channel by the drive.
pub struct Isrc {
	country: [u8; 2],
	owner: [u8; 3],
	year: u8,
	serial: u32,
}

impl Isrc {
	/// # New.
	///
	/// ## Errors
	///
	/// The country must be two ASCII alphanumerics, the owner three, the
	/// year no more than 99, and the serial no more than 99999.
	pub fn new(country: &str, owner: &str, year: u8, serial: u32) -> Result<Self, BurnError> {
		let country: [u8; 2] = country.as_bytes().try_into().map_err(|_| BurnError::Isrc)?;
		let owner: [u8; 3] = owner.as_bytes().try_into().map_err(|_| BurnError::Isrc)?;
		if
			country.iter().chain(owner.iter()).all(u8::is_ascii_alphanumeric) &&
			year <= 99 &&
			serial <= 99_999
		{
			Ok(Self { country, owner, year, serial })
		}
		else { Err(BurnError::Isrc) }
	}

	#[must_use]
	/// # As ASCII.
	///
	/// Return the twelve-character form, e.g. `USABC9912345`.
	pub fn to_ascii(&self) -> [u8; 12] {
		let mut out = [b'0'; 12];
		out[..2].copy_from_slice(&self.country);
		out[2..5].copy_from_slice(&self.owner);
		out[5..7].copy_from_slice(format!("{:02}", self.year).as_bytes());
		out[7..].copy_from_slice(format!("{:05}", self.serial).as_bytes());
		out
	}
}



#[derive(Debug)]
/// # Track.
///
/// One track's worth of write parameters, plus the source its payload will
/// be pulled from.
pub struct Track {
	id: u64,
	offset: u32,
	tail: u32,
	pad: bool,
	mode: TrackMode,
	pregap1: bool,
	pregap2: bool,
	postgap: bool,
	isrc: Option<Isrc>,
	entry: Option<TocEntry>,
	source: Option<Box<dyn Source>>,
}

impl Default for Track {
	fn default() -> Self {
		Self {
			id: next_id(),
			offset: 0,
			tail: 0,
			pad: true,
			mode: TrackMode::MODE1,
			pregap1: false,
			pregap2: false,
			postgap: false,
			isrc: None,
			entry: None,
			source: None,
		}
	}
}

impl Track {
	#[must_use]
	/// # New.
	///
	/// Create a track with the given mode and otherwise default settings.
	/// The mode is not validated until it is written; use
	/// [`Track::define_data`] to check it up front.
	pub fn new(mode: TrackMode) -> Self {
		Self { mode, ..Self::default() }
	}

	/// # Define Data.
	///
	/// Set the leading and trailing zero padding, whether or not the final
	/// sector should be padded out independently, and the track mode.
	///
	/// ## Errors
	///
	/// Modes that cannot be written are rejected, leaving the track
	/// unchanged.
	pub fn define_data(&mut self, offset: u32, tail: u32, pad: bool, mode: TrackMode)
	-> Result<(), BurnError> {
		if ! mode.is_valid() { return Err(BurnError::TrackMode(mode.bits())); }
		self.offset = offset;
		self.tail = tail;
		self.pad = pad;
		self.mode = mode;
		Ok(())
	}

	#[must_use]
	/// # With Source.
	pub fn with_source(mut self, src: Box<dyn Source>) -> Self {
		self.source = Some(src);
		self
	}

	/// # Set Source.
	///
	/// Bind a data source, returning the previous one, if any.
	pub fn set_source(&mut self, src: Box<dyn Source>) -> Option<Box<dyn Source>> {
		self.source.replace(src)
	}

	/// # Set ISRC.
	///
	/// ## Errors
	///
	/// Invalid codes are rejected without changing the track.
	pub fn set_isrc(&mut self, country: &str, owner: &str, year: u8, serial: u32)
	-> Result<(), BurnError> {
		let isrc = Isrc::new(country, owner, year, serial)?;
		self.isrc.replace(isrc);
		Ok(())
	}

	/// # Clear ISRC.
	pub fn clear_isrc(&mut self) { self.isrc = None; }

	/// # Set Gaps.
	///
	/// Request a one-second pregap written in the previous track's format,
	/// a two-second pregap in this track's format, and/or a two-second
	/// postgap.
	pub fn set_gaps(&mut self, pregap1: bool, pregap2: bool, postgap: bool) {
		self.pregap1 = pregap1;
		self.pregap2 = pregap2;
		self.postgap = postgap;
	}

	/// # Set Fixed TOC Entry.
	pub fn set_entry(&mut self, entry: TocEntry) { self.entry.replace(entry); }

	/// # Take Source.
	pub(crate) fn take_source(&mut self) -> Option<Box<dyn Source>> { self.source.take() }
}

impl Track {
	#[must_use]
	/// # ID.
	pub const fn id(&self) -> TrackId { TrackId(self.id) }

	#[must_use]
	/// # Mode.
	pub const fn mode(&self) -> TrackMode { self.mode }

	#[must_use]
	/// # Leading Zeroes.
	pub const fn offset(&self) -> u32 { self.offset }

	#[must_use]
	/// # Trailing Zeroes.
	pub const fn tail(&self) -> u32 { self.tail }

	#[must_use]
	/// # Pad Final Sector?
	pub const fn pad(&self) -> bool { self.pad }

	#[must_use]
	/// # Gaps.
	///
	/// Returns the one-second pregap, two-second pregap and postgap flags, in
	/// that order.
	pub const fn gaps(&self) -> (bool, bool, bool) { (self.pregap1, self.pregap2, self.postgap) }

	#[must_use]
	/// # ISRC.
	pub const fn isrc(&self) -> Option<&Isrc> { self.isrc.as_ref() }

	#[must_use]
	/// # Fixed TOC Entry.
	pub const fn entry(&self) -> Option<&TocEntry> { self.entry.as_ref() }

	#[must_use]
	/// # Has Source?
	pub const fn has_source(&self) -> bool { self.source.is_some() }

	#[must_use]
	/// # Content Size.
	///
	/// This is the leading padding, source size, and trailing padding, in
	/// bytes. Returns `None` if no source is bound or its size is unknown.
	pub fn size(&self) -> Option<u64> {
		let src = self.source.as_ref()?.size()?;
		Some(u64::from(self.offset) + src + u64::from(self.tail))
	}

	#[must_use]
	/// # Sector Count.
	///
	/// The number of sectors needed to hold the content when the final
	/// sector is padded out.
	pub fn sectors(&self) -> Option<u32> {
		let size = self.size()?;
		let len = u64::from(self.mode.sector_len()?);
		u32::try_from(size.div_ceil(len)).ok()
	}

	#[must_use]
	/// # Shortage.
	///
	/// The number of bytes missing from the final sector.
	pub fn shortage(&self) -> Option<u32> {
		let size = self.size()?;
		let len = u64::from(self.mode.sector_len()?);
		let rem = size % len;
		if rem == 0 { Some(0) }
		else { u32::try_from(len - rem).ok() }
	}
}



#[derive(Debug)]
/// # Session.
pub struct Session {
	id: u64,
	tracks: Vec<Track>,
	hide_first: bool,
	leadout: Option<TocEntry>,
}

impl Default for Session {
	fn default() -> Self {
		Self {
			id: next_id(),
			tracks: Vec::new(),
			hide_first: false,
			leadout: None,
		}
	}
}

impl Session {
	#[must_use]
	/// # New.
	pub fn new() -> Self { Self::default() }

	/// # Add Track.
	///
	/// Insert a track at `pos`, or append it if `pos` is `POS_END`.
	///
	/// ## Errors
	///
	/// Returns an error if the position is out of range or the session is
	/// already full.
	pub fn add_track(&mut self, track: Track, pos: usize) -> Result<TrackId, BurnError> {
		let pos = insert_pos(pos, self.tracks.len())?;
		if self.tracks.len() >= MAX_TRACKS { return Err(BurnError::TrackCount); }
		let id = track.id();
		self.tracks.insert(pos, track);
		Ok(id)
	}

	/// # Remove Track.
	///
	/// Returns the track if it belonged to this session.
	pub fn remove_track(&mut self, id: TrackId) -> Option<Track> {
		let idx = self.tracks.iter().position(|t| t.id() == id)?;
		Some(self.tracks.remove(idx))
	}

	/// # Hide First Track.
	///
	/// When enabled, and the session has at least two tracks, the first
	/// track is written as the index-zero pregap of the second.
	pub fn set_hide_first(&mut self, v: bool) { self.hide_first = v; }

	/// # Set Lead-out Entry.
	pub fn set_leadout(&mut self, entry: TocEntry) { self.leadout.replace(entry); }

	/// # Tracks (Mutable).
	pub fn tracks_mut(&mut self) -> &mut [Track] { &mut self.tracks }
}

impl Session {
	#[must_use]
	/// # ID.
	pub const fn id(&self) -> SessionId { SessionId(self.id) }

	#[must_use]
	/// # Tracks.
	pub fn tracks(&self) -> &[Track] { &self.tracks }

	#[must_use]
	/// # Track Count.
	pub fn len(&self) -> usize { self.tracks.len() }

	#[must_use]
	/// # Is Empty?
	pub fn is_empty(&self) -> bool { self.tracks.is_empty() }

	#[must_use]
	/// # Hide First Track?
	pub fn hide_first(&self) -> bool { self.hide_first && 1 < self.tracks.len() }

	#[must_use]
	/// # Lead-out Entry.
	pub const fn leadout(&self) -> Option<&TocEntry> { self.leadout.as_ref() }
}



#[derive(Debug, Default)]
/// # Disc.
///
/// An ordered collection of sessions. Burns consume the disc; read-back
/// discs are shared behind an `Arc`.
pub struct Disc {
	sessions: Vec<Session>,
}

impl Disc {
	#[must_use]
	/// # New.
	pub fn new() -> Self { Self::default() }

	/// # Add Session.
	///
	/// Insert a session at `pos`, or append it if `pos` is `POS_END`.
	///
	/// ## Errors
	///
	/// Returns an error if the position is out of range.
	pub fn add_session(&mut self, session: Session, pos: usize) -> Result<SessionId, BurnError> {
		let pos = insert_pos(pos, self.sessions.len())?;
		let id = session.id();
		self.sessions.insert(pos, session);
		Ok(id)
	}

	/// # Remove Session.
	///
	/// Returns the session if it belonged to this disc.
	pub fn remove_session(&mut self, id: SessionId) -> Option<Session> {
		let idx = self.sessions.iter().position(|s| s.id() == id)?;
		Some(self.sessions.remove(idx))
	}

	/// # Sessions (Mutable).
	pub fn sessions_mut(&mut self) -> &mut [Session] { &mut self.sessions }

	#[must_use]
	/// # From TOC Entries.
	///
	/// Rebuild the layout of a disc from its full table of contents. The
	/// resulting tracks carry their TOC entries but no data.
	pub fn from_toc(entries: &[TocEntry]) -> Self {
		let mut out = Self::default();
		let mut last: Option<u8> = None;
		for e in entries {
			if last != Some(e.session) {
				out.sessions.push(Session::default());
				last = Some(e.session);
			}

			let Some(session) = out.sessions.last_mut() else { continue; };
			match e.point {
				1..=99 => {
					let mode =
						if 0 == e.control & 4 { TrackMode::AUDIO }
						else { TrackMode::MODE1 };
					let mut track = Track::new(mode);
					track.set_entry(*e);
					session.tracks.push(track);
				},
				0xA2 => { session.leadout.replace(*e); },
				_ => {},
			}
		}

		// Drop any sessions that turned out to be empty.
		out.sessions.retain(|s| ! s.tracks.is_empty());
		out
	}
}

impl Disc {
	#[must_use]
	/// # Sessions.
	pub fn sessions(&self) -> &[Session] { &self.sessions }

	#[must_use]
	/// # Session Count.
	pub fn len(&self) -> usize { self.sessions.len() }

	#[must_use]
	/// # Is Empty?
	pub fn is_empty(&self) -> bool { self.sessions.is_empty() }

	#[must_use]
	/// # Track Count.
	pub fn tracks(&self) -> usize { self.sessions.iter().map(Session::len).sum() }

	#[must_use]
	/// # Track Start LBAs.
	///
	/// Only tracks with fixed TOC entries are included.
	pub fn track_starts(&self) -> Vec<i32> {
		self.sessions.iter()
			.flat_map(|s| s.tracks.iter())
			.filter_map(|t| t.entry().map(|e| msf_to_lba(e.pmin, e.psec, e.pframe)))
			.collect()
	}

	#[must_use]
	/// # Lead-out LBA.
	///
	/// The lead-out of the last session, if known.
	pub fn leadout(&self) -> Option<i32> {
		let e = self.sessions.last()?.leadout()?;
		Some(msf_to_lba(e.pmin, e.psec, e.pframe))
	}
}



/// # Resolve Insert Position.
const fn insert_pos(pos: usize, len: usize) -> Result<usize, BurnError> {
	if pos == POS_END { Ok(len) }
	else if POS_END < pos || len < pos { Err(BurnError::Position(pos)) }
	else { Ok(pos) }
}



#[cfg(test)]
mod test {
	use super::*;
	use crate::BufferSource;

	#[test]
	fn t_sectors() {
		let track = Track::new(TrackMode::MODE1)
			.with_source(Box::new(BufferSource::from(vec![0_u8; 5000])));
		assert_eq!(track.size(), Some(5000));
		assert_eq!(track.sectors(), Some(3), "5000 bytes of mode 1 should take three sectors.");
		assert_eq!(track.shortage(), Some(6144 - 5000));

		let mut track = Track::new(TrackMode::AUDIO)
			.with_source(Box::new(BufferSource::from(vec![0_u8; 2352])));
		assert_eq!(track.sectors(), Some(1));
		assert_eq!(track.shortage(), Some(0));

		// Offset and tail count toward the total.
		assert!(track.define_data(100, 2252, true, TrackMode::AUDIO).is_ok());
		assert_eq!(track.sectors(), Some(2));

		// No source, no size.
		assert_eq!(Track::default().sectors(), None);
	}

	#[test]
	fn t_define_data() {
		let mut track = Track::default();
		assert_eq!(track.mode(), TrackMode::MODE1);
		assert!(track.pad());
		assert_eq!(
			track.define_data(5, 5, false, TrackMode::MODE2),
			Err(BurnError::TrackMode(TrackMode::MODE2.bits())),
		);
		assert_eq!(track.offset(), 0, "Bad modes should leave the track alone.");
		assert!(track.pad());
	}

	#[test]
	fn t_isrc() {
		let mut track = Track::default();
		assert!(track.set_isrc("US", "ABC", 99, 12_345).is_ok());
		assert_eq!(track.isrc().map(Isrc::to_ascii), Some(*b"USABC9912345"));

		// Bad codes leave the old value alone.
		assert_eq!(track.set_isrc("U$", "ABC", 1, 1), Err(BurnError::Isrc));
		assert_eq!(track.set_isrc("US", "ABCD", 1, 1), Err(BurnError::Isrc));
		assert_eq!(track.set_isrc("US", "ABC", 100, 1), Err(BurnError::Isrc));
		assert_eq!(track.set_isrc("US", "ABC", 1, 100_000), Err(BurnError::Isrc));
		assert_eq!(track.isrc().map(Isrc::to_ascii), Some(*b"USABC9912345"));

		assert_eq!(Isrc::new("GB", "x1z", 4, 7).map(|i| i.to_ascii()), Ok(*b"GBx1z0400007"));
	}

	#[test]
	fn t_positions() {
		let mut session = Session::new();
		let a = session.add_track(Track::default(), POS_END).expect("Append failed.");
		let b = session.add_track(Track::default(), 0).expect("Insert failed.");
		let c = session.add_track(Track::default(), 2).expect("Insert at end failed.");
		assert_eq!(
			session.tracks().iter().map(Track::id).collect::<Vec<_>>(),
			vec![b, a, c],
		);

		assert_eq!(session.add_track(Track::default(), 4), Err(BurnError::Position(4)));
		assert_eq!(session.add_track(Track::default(), POS_END + 1), Err(BurnError::Position(POS_END + 1)));

		assert!(session.remove_track(a).is_some());
		assert!(session.remove_track(a).is_none(), "Tracks can only be removed once.");
		assert_eq!(session.len(), 2);

		let mut disc = Disc::new();
		let s1 = disc.add_session(session, POS_END).expect("Append failed.");
		let s2 = disc.add_session(Session::new(), 0).expect("Insert failed.");
		assert_eq!(disc.sessions()[0].id(), s2);
		assert_eq!(disc.tracks(), 2);
		assert!(disc.remove_session(s1).is_some());
		assert_eq!(disc.len(), 1);
	}

	#[test]
	fn t_max_tracks() {
		let mut session = Session::new();
		for _ in 0..MAX_TRACKS {
			assert!(session.add_track(Track::default(), POS_END).is_ok());
		}
		assert_eq!(session.add_track(Track::default(), POS_END), Err(BurnError::TrackCount));
	}

	#[test]
	fn t_hide_first() {
		let mut session = Session::new();
		session.set_hide_first(true);
		assert!(! session.hide_first(), "Hiding needs a second track.");
		assert!(session.add_track(Track::default(), POS_END).is_ok());
		assert!(session.add_track(Track::default(), POS_END).is_ok());
		assert!(session.hide_first());
	}

	#[test]
	fn t_from_toc() {
		let entries = [
			TocEntry::new(1, 1, 0, 0xA0, (1, 0, 0)),
			TocEntry::new(1, 1, 0, 0xA1, (2, 0, 0)),
			TocEntry::new(1, 1, 0, 0xA2, (10, 0, 0)),
			TocEntry::new(1, 1, 0, 1, (0, 2, 0)),
			TocEntry::new(1, 1, 4, 2, (5, 0, 0)),
			TocEntry::new(2, 1, 4, 0xA2, (20, 0, 0)),
			TocEntry::new(2, 1, 4, 3, (12, 0, 0)),
		];
		let disc = Disc::from_toc(&entries);
		assert_eq!(disc.len(), 2);
		assert_eq!(disc.tracks(), 3);
		assert_eq!(disc.sessions()[0].tracks()[0].mode(), TrackMode::AUDIO);
		assert_eq!(disc.sessions()[0].tracks()[1].mode(), TrackMode::MODE1);
		assert_eq!(disc.track_starts(), vec![0, 22_350, 53_850]);
		assert_eq!(disc.leadout(), Some(89_850));
	}
}
