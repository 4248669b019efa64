/*!
# Burn Baby Burn: TOC and Cue Sheet
*/

use crate::{
	BurnError,
	CD_LEADIN,
	DiscFormat,
	lba_to_msf,
	Session,
	TrackMode,
	WriteType,
};
use serde::{
	Deserialize,
	Serialize,
};



/// # One-Second Pregap.
pub(crate) const PREGAP1: u32 = 75;

/// # Two-Second Pregap.
pub(crate) const PREGAP2: u32 = 150;

/// # Postgap.
pub(crate) const POSTGAP: u32 = 150;

/// # Lead-in (Later Sessions).
pub(crate) const LEADIN_NEXT: i32 = 4500;

/// # Lead-out (First Session).
pub(crate) const LEADOUT_FIRST: i32 = 6750;

/// # Lead-out (Later Sessions).
pub(crate) const LEADOUT_NEXT: i32 = 2250;



#[derive(Debug, Clone, Copy, Default, Eq, Hash, PartialEq, Deserialize, Serialize)]
/// # TOC Entry.
///
/// This mirrors the eleven-byte records of a full (format 2) table of
/// contents. Times are binary, not BCD.
pub struct TocEntry {
	/// # Session Number.
	pub session: u8,

	/// # ADR.
	pub adr: u8,

	/// # Control Nibble.
	pub control: u8,

	/// # Track Number (Always Zero in the Lead-in).
	pub tno: u8,

	/// # Point.
	pub point: u8,

	/// # Running Minute.
	pub min: u8,

	/// # Running Second.
	pub sec: u8,

	/// # Running Frame.
	pub frame: u8,

	/// # Zero.
	pub zero: u8,

	/// # Point Minute.
	pub pmin: u8,

	/// # Point Second.
	pub psec: u8,

	/// # Point Frame.
	pub pframe: u8,
}

impl From<[u8; 11]> for TocEntry {
	fn from(src: [u8; 11]) -> Self {
		Self {
			session: src[0],
			adr: src[1] >> 4,
			control: src[1] & 0x0F,
			tno: src[2],
			point: src[3],
			min: src[4],
			sec: src[5],
			frame: src[6],
			zero: src[7],
			pmin: src[8],
			psec: src[9],
			pframe: src[10],
		}
	}
}

impl From<TocEntry> for [u8; 11] {
	fn from(src: TocEntry) -> Self {
		[
			src.session,
			(src.adr << 4) | (src.control & 0x0F),
			src.tno,
			src.point,
			src.min,
			src.sec,
			src.frame,
			src.zero,
			src.pmin,
			src.psec,
			src.pframe,
		]
	}
}

impl TocEntry {
	#[must_use]
	/// # New.
	///
	/// Create an entry pointing at the given (binary) timecode.
	pub const fn new(session: u8, adr: u8, control: u8, point: u8, pmsf: (u8, u8, u8))
	-> Self {
		Self {
			session,
			adr,
			control,
			tno: 0,
			point,
			min: 0,
			sec: 0,
			frame: 0,
			zero: 0,
			pmin: pmsf.0,
			psec: pmsf.1,
			pframe: pmsf.2,
		}
	}

	#[must_use]
	/// # Parse Full TOC.
	///
	/// Parse the response to a READ TOC (format 2) command: a four-byte
	/// header, the first two bytes of which give the length of what
	/// follows, then the entries.
	pub fn parse_full(data: &[u8]) -> Vec<Self> {
		if data.len() < 4 { return Vec::new(); }
		let len = usize::from(u16::from_be_bytes([data[0], data[1]])) + 2;
		let end = len.min(data.len());
		data.get(4..end).unwrap_or_default()
			.chunks_exact(11)
			.filter_map(|c| <[u8; 11]>::try_from(c).ok())
			.map(Self::from)
			.collect()
	}
}



#[derive(Debug, Clone, Copy, Eq, Hash, PartialEq)]
/// # Cue Sheet Entry.
///
/// Times are binary, relative to the start of the lead-in pregap.
pub struct CueEntry {
	/// # Control/ADR.
	pub ctladr: u8,

	/// # Track Number.
	pub tno: u8,

	/// # Index.
	pub index: u8,

	/// # Data Form.
	pub form: u8,

	/// # SCMS.
	pub scms: u8,

	/// # Minute.
	pub min: u8,

	/// # Second.
	pub sec: u8,

	/// # Frame.
	pub frame: u8,
}

impl From<CueEntry> for [u8; 8] {
	fn from(src: CueEntry) -> Self {
		[src.ctladr, src.tno, src.index, src.form, src.scms, src.min, src.sec, src.frame]
	}
}

#[derive(Debug, Clone, Default, Eq, PartialEq)]
/// # Cue Sheet.
pub struct CueSheet(Vec<CueEntry>);

impl CueSheet {
	/// # Add Entry.
	fn push(&mut self, ctladr: u8, tno: u8, index: u8, form: u8, lba: i32) {
		let (min, sec, frame) = lba_to_msf(lba);
		self.0.push(CueEntry { ctladr, tno, index, form, scms: 0, min, sec, frame });
	}

	#[must_use]
	/// # Entries.
	pub fn entries(&self) -> &[CueEntry] { &self.0 }

	#[must_use]
	/// # Length.
	pub fn len(&self) -> usize { self.0.len() }

	#[must_use]
	/// # Is Empty?
	pub fn is_empty(&self) -> bool { self.0.is_empty() }

	#[must_use]
	/// # To Bytes.
	pub fn to_bytes(&self) -> Vec<u8> {
		self.0.iter().flat_map(|&e| <[u8; 8]>::from(e)).collect()
	}
}



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Track Plan.
///
/// The computed layout of one track.
pub struct TrackPlan {
	/// # Track Number.
	///
	/// Hidden tracks share the number of the track they precede.
	pub tno: u8,

	/// # Mode.
	pub mode: TrackMode,

	/// # Control Nibble.
	pub control: u8,

	/// # Data Form.
	pub form: u8,

	/// # Sector Length.
	pub sector_len: u16,

	/// # Write a One-Second Pregap?
	pub pregap1: bool,

	/// # Write a Two-Second Pregap?
	pub pregap2: bool,

	/// # Write a Postgap?
	pub postgap: bool,

	/// # Hidden?
	pub hidden: bool,

	/// # Start LBA.
	pub start: i32,

	/// # Data Sectors.
	pub sectors: u32,

	/// # Content Bytes.
	///
	/// Leading padding, source, and trailing padding. Zero for open-ended
	/// tracks.
	pub content: u64,

	/// # Bytes Consumed by the Previous Track.
	pub carry_in: u64,

	/// # Bytes Taken From the Next Track.
	pub carry_out: u64,

	/// # Unknown Size?
	pub open_ended: bool,
}

impl TrackPlan {
	#[must_use]
	#[allow(clippy::cast_possible_wrap)] // Sector counts are bound by the disc size.
	/// # End LBA.
	///
	/// The first sector after this track's data.
	pub const fn end(&self) -> i32 { self.start + self.sectors as i32 }

	#[must_use]
	/// # Chained?
	pub const fn chained(&self) -> bool { self.carry_out != 0 }
}



#[derive(Debug, Clone)]
/// # Session Layout.
pub struct SessionLayout {
	entries: Vec<TocEntry>,
	cue: CueSheet,
	tracks: Vec<TrackPlan>,
	start: i32,
	leadout: i32,
}

impl SessionLayout {
	#[must_use]
	/// # TOC Entries.
	///
	/// The lead-in points (A0, A1, A2) followed by one entry per visible
	/// track.
	pub fn entries(&self) -> &[TocEntry] { &self.entries }

	#[must_use]
	/// # Cue Sheet.
	pub const fn cue_sheet(&self) -> &CueSheet { &self.cue }

	#[must_use]
	/// # Track Plans.
	pub fn tracks(&self) -> &[TrackPlan] { &self.tracks }

	#[must_use]
	/// # Program Start LBA.
	pub const fn start(&self) -> i32 { self.start }

	#[must_use]
	/// # Lead-out LBA.
	pub const fn leadout(&self) -> i32 { self.leadout }

	#[must_use]
	/// # Lead-out Entry.
	pub fn leadout_entry(&self) -> Option<TocEntry> {
		self.entries.iter().find(|e| e.point == 0xA2).copied()
	}
}



#[derive(Debug, Clone, Copy)]
/// # TOC Builder.
///
/// Work out the layout of a session: where each track starts, how many
/// sectors it takes, its lead-in TOC entries, and the cue sheet a drive
/// needs to write it session-at-once.
///
/// ```
/// use burnbaby_core::{BufferSource, Session, TocBuilder, Track, TrackMode, POS_END};
///
/// let mut session = Session::new();
/// session.add_track(
///     Track::new(TrackMode::MODE1)
///         .with_source(Box::new(BufferSource::from(vec![0_u8; 5000]))),
///     POS_END,
/// ).unwrap();
///
/// let layout = TocBuilder::default().build(&session).unwrap();
/// assert_eq!(layout.tracks()[0].start, 0);
/// assert_eq!(layout.tracks()[0].sectors, 3);
/// assert_eq!(layout.leadout(), 3);
/// ```
pub struct TocBuilder {
	write_type: WriteType,
	format: DiscFormat,
	session_no: u8,
	start: i32,
	first_tno: u8,
	fill_to: Option<i32>,
}

impl Default for TocBuilder {
	fn default() -> Self {
		Self {
			write_type: WriteType::Sao,
			format: DiscFormat::CdRom,
			session_no: 1,
			start: -CD_LEADIN,
			first_tno: 1,
			fill_to: None,
		}
	}
}

impl TocBuilder {
	#[must_use]
	/// # New.
	pub fn new(write_type: WriteType, format: DiscFormat) -> Self {
		Self { write_type, format, ..Self::default() }
	}

	#[must_use]
	/// # With Session Placement.
	///
	/// Set the session number, the LBA the session's program area (including
	/// its first pregap) begins at, and the number of its first track.
	pub const fn with_session(self, session_no: u8, start: i32, first_tno: u8) -> Self {
		Self { session_no, start, first_tno, ..self }
	}

	#[must_use]
	/// # With Fill.
	///
	/// Extend the last track so the lead-out begins at this LBA.
	pub const fn with_fill(self, fill_to: Option<i32>) -> Self {
		Self { fill_to, ..self }
	}

	/// # Build.
	///
	/// ## Errors
	///
	/// Returns an error if the session has no tracks or would push the disc
	/// past track 99, a track mode is unsuitable, or a track has no known
	/// size and the write type is not TAO.
	pub fn build(&self, session: &Session) -> Result<SessionLayout, BurnError> {
		let len = session.len();
		if len == 0 || crate::MAX_TRACKS < usize::from(self.first_tno) + len - 1 {
			return Err(BurnError::TrackCount);
		}

		let plans = self.plan_tracks(session)?;
		let mut layout = SessionLayout {
			entries: Vec::with_capacity(plans.len() + 3),
			cue: CueSheet::default(),
			tracks: plans,
			start: self.start,
			leadout: self.start,
		};
		self.place(&mut layout);
		self.finish(&mut layout);
		Ok(layout)
	}

	/// # Plan Tracks.
	///
	/// Work out the per-track sizes, without positions.
	fn plan_tracks(&self, session: &Session) -> Result<Vec<TrackPlan>, BurnError> {
		let tracks = session.tracks();
		let hide_first = session.hide_first();
		let mut out: Vec<TrackPlan> = Vec::with_capacity(tracks.len());
		let mut tno = self.first_tno;

		for (idx, t) in tracks.iter().enumerate() {
			let mode = t.mode();
			let (Some(control), Some(form), Some(sector_len)) = (mode.ctrl(), mode.form(), mode.sector_len())
				else { return Err(BurnError::TrackMode(mode.bits())); };

			let hidden = hide_first && idx == 0;
			let size = t.size();
			if size.is_none() && self.write_type != WriteType::Tao {
				return Err(BurnError::OpenEnded(tno));
			}

			// Two-second pregaps are forced at the start of the session and
			// whenever the data form changes, except directly after a hidden
			// track, which is itself the pregap.
			let (pregap1, mut pregap2, postgap) = t.gaps();
			match out.last() {
				None => { pregap2 = true; },
				Some(p) if ! p.hidden && p.form != form => { pregap2 = true; },
				_ => {},
			}

			out.push(TrackPlan {
				tno,
				mode,
				control,
				form,
				sector_len,
				pregap1: pregap1 && idx != 0,
				pregap2,
				postgap,
				hidden,
				start: 0,
				sectors: 0,
				content: size.unwrap_or(0),
				carry_in: 0,
				carry_out: 0,
				open_ended: size.is_none(),
			});

			if ! hidden { tno += 1; }
		}

		// Sector counts and carries.
		let mut carry_in = 0_u64;
		for idx in 0..out.len() {
			let next = out.get(idx + 1).copied();
			let plan = &mut out[idx];
			plan.carry_in = carry_in;

			let own = plan.content.saturating_sub(carry_in);
			let len = u64::from(plan.sector_len);

			// A track only slips a sector once the bytes lent to the previous
			// track plus its own shortage run past a whole sector. Either way,
			// it keeps at least one.
			let nominal = plan.content.div_ceil(len);
			let slack = nominal * len - plan.content + carry_in;
			let mut sectors = if len < slack { nominal.saturating_sub(1) } else { nominal };
			if ! plan.open_ended { sectors = sectors.max(1); }

			plan.sectors = u32::try_from(sectors).map_err(|_| BurnError::TrackCount)?;
			let shortage = sectors * len - own;

			let chain = next.filter(|n|
				self.write_type != WriteType::Tao &&
				! tracks[idx].pad() &&
				! plan.open_ended &&
				! n.open_ended &&
				n.sector_len == plan.sector_len &&
				! n.pregap1 && ! n.pregap2
			);
			carry_in = chain.map_or(0, |n| shortage.min(n.content));
			plan.carry_out = carry_in;
		}

		Ok(out)
	}

	#[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)] // Sector counts are bound by the disc size.
	/// # Place Tracks.
	///
	/// Assign start positions and build the cue sheet alongside.
	fn place(&self, layout: &mut SessionLayout) {
		let mut runtime = self.start;
		let Some(first) = layout.tracks.first() else { return; };

		// Lead-in.
		layout.cue.push((first.control << 4) | 1, 0, 0, 1, runtime);

		for plan in &mut layout.tracks {
			let ctladr = (plan.control << 4) | 1;
			if plan.pregap1 || plan.pregap2 {
				layout.cue.push(ctladr, plan.tno, 0, plan.form, runtime);
				if plan.pregap1 { runtime += PREGAP1 as i32; }
				if plan.pregap2 { runtime += PREGAP2 as i32; }
			}

			plan.start = runtime;
			layout.cue.push(ctladr, plan.tno, u8::from(! plan.hidden), plan.form, runtime);
			runtime += plan.sectors as i32;

			if plan.postgap { runtime += POSTGAP as i32; }
		}

		// Fill up.
		if let Some(fill) = self.fill_to {
			if runtime < fill {
				if let Some(last) = layout.tracks.last_mut() {
					last.sectors += (fill - runtime) as u32;
					runtime = fill;
				}
			}
		}

		if let Some(last) = layout.tracks.last() {
			layout.cue.push((last.control << 4) | 1, 0xAA, 1, 1, runtime);
		}
		layout.leadout = runtime;
	}

	/// # TOC Entries.
	fn finish(&self, layout: &mut SessionLayout) {
		let visible = || layout.tracks.iter().filter(|p| ! p.hidden);
		let (Some(first), Some(last)) = (visible().next(), visible().last()) else { return; };

		let mut entries = vec![
			TocEntry::new(self.session_no, 1, first.control, 0xA0, (first.tno, self.format.code(), 0)),
			TocEntry::new(self.session_no, 1, last.control, 0xA1, (last.tno, 0, 0)),
			TocEntry::new(self.session_no, 1, last.control, 0xA2, lba_to_msf(layout.leadout)),
		];
		entries.extend(visible().map(|p|
			TocEntry::new(self.session_no, 1, p.control, p.tno, lba_to_msf(p.start))
		));
		layout.entries = entries;
	}
}



#[cfg(test)]
mod test {
	use super::*;
	use crate::{
		BufferSource,
		POS_END,
		Track,
	};

	/// # Make a Track.
	fn track(mode: TrackMode, len: usize, pad: bool) -> Track {
		let mut t = Track::new(mode).with_source(Box::new(BufferSource::from(vec![1_u8; len])));
		assert!(t.define_data(0, 0, pad, mode).is_ok());
		t
	}

	/// # Make a Session.
	fn session(tracks: Vec<Track>) -> Session {
		let mut s = Session::new();
		for t in tracks {
			assert!(s.add_track(t, POS_END).is_ok());
		}
		s
	}

	#[test]
	fn t_single() {
		let s = session(vec![track(TrackMode::MODE1, 5000, true)]);
		let layout = TocBuilder::default().build(&s).expect("Build failed.");

		assert_eq!(layout.tracks().len(), 1);
		assert_eq!(layout.tracks()[0].sectors, 3);
		assert_eq!(layout.tracks()[0].start, 0, "The first track should follow the lead-in pregap.");
		assert_eq!(layout.leadout(), 3);

		// A0, A1, A2, plus the track.
		let e = layout.entries();
		assert_eq!(e.len(), 4);
		assert_eq!((e[0].point, e[0].pmin, e[0].control), (0xA0, 1, 4));
		assert_eq!((e[1].point, e[1].pmin), (0xA1, 1));
		assert_eq!((e[2].point, e[2].pmin, e[2].psec, e[2].pframe), (0xA2, 0, 2, 3));
		assert_eq!((e[3].point, e[3].pmin, e[3].psec, e[3].pframe), (1, 0, 2, 0));

		// Lead-in, pregap, index one, lead-out.
		let cue = layout.cue_sheet().to_bytes();
		assert_eq!(
			cue,
			vec![
				0x41, 0,    0, 1,    0, 0, 0, 0,
				0x41, 1,    0, 0x10, 0, 0, 0, 0,
				0x41, 1,    1, 0x10, 0, 0, 2, 0,
				0x41, 0xAA, 1, 1,    0, 0, 2, 3,
			],
		);
	}

	#[test]
	fn t_form_change() {
		let s = session(vec![
			track(TrackMode::AUDIO, 2352 * 10, true),
			track(TrackMode::AUDIO, 2352 * 10, true),
			track(TrackMode::MODE1, 2048 * 10, true),
		]);
		let layout = TocBuilder::default().build(&s).expect("Build failed.");
		let p = layout.tracks();
		assert_eq!(p[0].start, 0);
		assert_eq!(p[1].start, 10, "Same form, no gap.");
		assert_eq!(p[2].start, 170, "Form change, two-second gap.");
		assert!(p[2].pregap2);
		assert_eq!(layout.leadout(), 180);

		// Each pregap gets an index-zero entry.
		let zeros = layout.cue_sheet().entries().iter().filter(|c| c.index == 0 && c.tno != 0).count();
		assert_eq!(zeros, 2);
	}

	#[test]
	fn t_monotonic() {
		let mut tracks = Vec::new();
		for (idx, len) in [1_usize, 2352, 99_999, 4096, 3, 70_000, 2048].into_iter().enumerate() {
			let mode = if idx % 3 == 0 { TrackMode::AUDIO } else { TrackMode::MODE1 };
			let mut t = track(mode, len, idx % 2 == 0);
			t.set_gaps(idx == 4, false, idx == 5);
			tracks.push(t);
		}
		let s = session(tracks);

		for wt in WriteType::ALL {
			let layout = TocBuilder::new(wt, DiscFormat::CdRom).build(&s).expect("Build failed.");
			let p = layout.tracks();
			for pair in p.windows(2) {
				assert!(
					pair[0].end() <= pair[1].start,
					"Track {} ends after track {} starts.", pair[0].tno, pair[1].tno,
				);
			}
			let last = p.last().expect("Missing tracks.");
			let expected = last.end() + if last.postgap { 150 } else { 0 };
			assert_eq!(layout.leadout(), expected, "Lead-out should follow the last track.");
			assert_eq!(
				layout.leadout_entry().map(|e| (e.pmin, e.psec, e.pframe)),
				Some(lba_to_msf(expected)),
			);
		}
	}

	#[test]
	fn t_carry() {
		// Three unpadded mode 1 tracks of 3000 bytes apiece.
		let s = session(vec![
			track(TrackMode::MODE1, 3000, false),
			track(TrackMode::MODE1, 3000, false),
			track(TrackMode::MODE1, 3000, false),
		]);
		let layout = TocBuilder::default().build(&s).expect("Build failed.");
		let p = layout.tracks();

		// Track one: 2 sectors, borrows 1096 bytes from track two.
		assert_eq!((p[0].sectors, p[0].carry_out), (2, 1096));
		// Track two: 1904 bytes left, 1 sector, borrows 144 from track three.
		assert_eq!((p[1].carry_in, p[1].sectors, p[1].carry_out), (1096, 1, 144));
		// Track three: 2856 bytes left; it's last, so it pads.
		assert_eq!((p[2].carry_in, p[2].sectors, p[2].carry_out), (144, 2, 0));

		// Start positions match the byte stream exactly.
		let mut bytes = 0_u64;
		for plan in p {
			let expected = i64::from(p[0].start) + i64::try_from(bytes.div_ceil(2048)).expect("Overflow.");
			assert_eq!(i64::from(plan.start), expected, "Track {} is misplaced.", plan.tno);
			bytes += plan.content;
		}

		// The total is the minimum possible.
		assert_eq!(layout.leadout() - p[0].start, 5, "9000 bytes should fit in five sectors.");

		// TAO never chains.
		let layout = TocBuilder::new(WriteType::Tao, DiscFormat::CdRom).build(&s).expect("Build failed.");
		assert!(layout.tracks().iter().all(|p| ! p.chained() && p.sectors == 2));
	}

	#[test]
	fn t_carry_exact() {
		// Two tiny unpadded tracks. The second lends everything it has to the
		// first, but still gets a sector of its own.
		let s = session(vec![
			track(TrackMode::MODE1, 1024, false),
			track(TrackMode::MODE1, 1024, false),
		]);
		let layout = TocBuilder::default().build(&s).expect("Build failed.");
		let p = layout.tracks();
		assert_eq!((p[0].sectors, p[0].carry_out), (1, 1024));
		assert_eq!((p[1].carry_in, p[1].sectors, p[1].carry_out), (1024, 1, 0));
		assert_eq!(p[1].start, p[0].start + 1, "Track two should start after track one.");
		assert_eq!(layout.leadout(), p[1].start + 1, "Track two should have one sector.");

		// Here the 1024 bytes lent to track one plus track two's own 1024-byte
		// shortage add up to exactly one sector, so nothing slips.
		let s = session(vec![
			track(TrackMode::MODE1, 1024, false),
			track(TrackMode::MODE1, 3072, false),
			track(TrackMode::MODE1, 2048, true),
		]);
		let layout = TocBuilder::default().build(&s).expect("Build failed.");
		let p = layout.tracks();
		assert_eq!((p[0].sectors, p[0].carry_out), (1, 1024));
		assert_eq!((p[1].carry_in, p[1].sectors, p[1].carry_out), (1024, 2, 2048));
		assert_eq!((p[2].carry_in, p[2].sectors), (2048, 1));
		assert!(
			p.windows(2).all(|w| w[0].start < w[1].start),
			"Every track should have its own start.",
		);
	}

	#[test]
	fn t_carry_over() {
		// One byte more than a sector of slack slips track two by one.
		let s = session(vec![
			track(TrackMode::MODE1, 1023, false),
			track(TrackMode::MODE1, 3072, false),
			track(TrackMode::MODE1, 2048, true),
		]);
		let layout = TocBuilder::default().build(&s).expect("Build failed.");
		let p = layout.tracks();
		assert_eq!((p[0].sectors, p[0].carry_out), (1, 1025));
		assert_eq!((p[1].carry_in, p[1].sectors, p[1].carry_out), (1025, 1, 1));
		assert_eq!((p[2].carry_in, p[2].sectors), (1, 1));
		assert_eq!(layout.leadout() - p[0].start, 3, "6143 bytes should fit in three sectors.");
	}

	#[test]
	fn t_hidden() {
		let mut s = session(vec![
			track(TrackMode::AUDIO, 2352 * 4, true),
			track(TrackMode::AUDIO, 2352 * 4, true),
		]);
		s.set_hide_first(true);
		let layout = TocBuilder::default().build(&s).expect("Build failed.");
		let p = layout.tracks();
		assert!(p[0].hidden);
		assert_eq!(p[0].tno, 1);
		assert_eq!(p[1].tno, 1, "The hidden track should not take a number.");
		assert!(! p[1].pregap2);
		assert_eq!(p[1].start, 4);

		// Only one track entry.
		assert_eq!(layout.entries().len(), 4);
		assert_eq!(layout.entries()[3].psec, 2);
		assert_eq!(layout.entries()[3].pframe, 4);
	}

	#[test]
	fn t_later_session() {
		let s = session(vec![track(TrackMode::MODE1, 2048, true)]);
		let layout = TocBuilder::default()
			.with_session(2, 10_000, 3)
			.build(&s)
			.expect("Build failed.");
		assert_eq!(layout.tracks()[0].tno, 3);
		assert_eq!(layout.tracks()[0].start, 10_150);
		assert_eq!(layout.entries()[0].session, 2);
		assert_eq!(layout.entries()[0].pmin, 3, "A0 should point to the first track number.");

		assert_eq!(
			TocBuilder::default().with_session(2, 0, 99).build(&session(vec![
				track(TrackMode::MODE1, 1, true),
				track(TrackMode::MODE1, 1, true),
			])).map(|_| ()),
			Err(BurnError::TrackCount),
		);
	}

	#[test]
	fn t_fill() {
		let s = session(vec![track(TrackMode::MODE1, 2048, true)]);
		let layout = TocBuilder::default().with_fill(Some(1000)).build(&s).expect("Build failed.");
		assert_eq!(layout.tracks()[0].sectors, 1000);
		assert_eq!(layout.leadout(), 1000);
	}

	#[test]
	fn t_open_ended() {
		let s = session(vec![Track::new(TrackMode::MODE1)]);
		assert_eq!(
			TocBuilder::default().build(&s).map(|_| ()),
			Err(BurnError::OpenEnded(1)),
		);
		let layout = TocBuilder::new(WriteType::Tao, DiscFormat::CdRom).build(&s).expect("Build failed.");
		assert!(layout.tracks()[0].open_ended);

		assert_eq!(
			TocBuilder::default().build(&Session::new()).map(|_| ()),
			Err(BurnError::TrackCount),
		);
	}

	#[test]
	fn t_parse_full() {
		let a = TocEntry::new(1, 1, 4, 0xA0, (1, 0, 0));
		let b = TocEntry::new(1, 1, 4, 1, (0, 2, 0));
		let mut raw = vec![0, 24, 1, 1];
		raw.extend_from_slice(&<[u8; 11]>::from(a));
		raw.extend_from_slice(&<[u8; 11]>::from(b));
		raw.extend_from_slice(&[0xFF; 7]); // Junk past the declared length.
		assert_eq!(TocEntry::parse_full(&raw), vec![a, b]);
		assert!(TocEntry::parse_full(&[0, 1]).is_empty());
	}
}
