/*!
# Burn Baby Burn: Writing
*/

mod buf;
mod feed;
pub(crate) mod opts;
mod sector;

use buf::SectorBuffer;
use crate::{
	BlockType,
	BurnError,
	CD_LEADIN,
	Disc,
	DiscStatus,
	Drive,
	DriveStatus,
	Isrc,
	Link,
	MAX_TRACKS,
	MSG_BURN_FAILED,
	MSG_CLOSING,
	MSG_DEBUG,
	MSG_PADDING,
	MSG_TRACK_DONE,
	MSG_TRACK_MODE,
	Progress,
	SECTOR_MODE1,
	SECTOR_RAW,
	Session,
	SessionLayout,
	Severity,
	Subcode,
	TocBuilder,
	TrackMode,
	TrackPlan,
	WriteType,
};
use crate::drive::mmc::WriteParams;
use crate::toc::{
	LEADIN_NEXT,
	LEADOUT_FIRST,
	LEADOUT_NEXT,
	POSTGAP,
	PREGAP1,
	PREGAP2,
};
use dactyl::{
	NiceU32,
	NiceU64,
};
use feed::Feed;
use opts::WriteOptions;
use sector::Position;



/// # Minimum TAO Track Length (Sectors).
const TAO_MIN: u32 = 300;

/// # Sectors Flagged Ahead of the Lead-out.
const LEADOUT_WARN: u32 = 150;

/// # Buffer Capacity Check Interval (Sectors).
const CAPACITY_EVERY: u32 = 64;

/// # Padding Sectors Per WRITE.
const PAD_STEP: u16 = 8;



/// # Write Precheck.
///
/// Make sure the drive, the disc in it, and the layout to be burned all
/// agree with one another before anything is sent.
///
/// ## Errors
///
/// The drive must be grabbed and idle, and hold a blank disc (or an
/// appendable one, for anything but raw writing). The layout must have at
/// least one track, no empty sessions, and no more than 99 tracks counting
/// those already on the disc. The drive must support the write type, and
/// every track needs a writable mode and a data source. Tracks of unknown
/// size can only be written TAO.
pub fn precheck(drive: &Drive, opts: &WriteOptions, disc: &Disc) -> Result<(), BurnError> {
	if drive.released() { return Err(BurnError::DriveReleased); }
	if drive.state() != DriveStatus::Idle { return Err(BurnError::DriveBusy); }

	match drive.disc_status() {
		DiscStatus::Blank => {},
		DiscStatus::Appendable =>
			if opts.write_type() == WriteType::Raw { return Err(BurnError::WriteType); },
		s => return Err(BurnError::DiscStatus(s)),
	}

	check_layout(drive, opts, disc)
}

/// # Burn.
///
/// Write the layout to the disc, blocking until it is done, fails, or is
/// cancelled via the drive's kill switch.
///
/// Track sources are consumed along the way, so a layout can only be burned
/// once.
///
/// ## Errors
///
/// Returns an error if the precheck fails or anything goes wrong during the
/// write. Failures are also reported to the drive's message sink.
pub fn burn(drive: &Drive, opts: &WriteOptions, disc: &mut Disc) -> Result<(), BurnError> {
	precheck(drive, opts, disc)?;
	burn_unchecked(drive, opts, disc)
}

/// # Burn (Without Checks).
///
/// The drive's cache is synchronized on the way out regardless of outcome,
/// unless the transport has failed. Successful burns re-probe the disc.
pub(crate) fn burn_unchecked(drive: &Drive, opts: &WriteOptions, disc: &mut Disc)
-> Result<(), BurnError> {
	drive.set_state(DriveStatus::Writing);
	drive.reset_progress(Progress {
		sessions: u8::try_from(disc.len()).unwrap_or(u8::MAX),
		indices: 1,
		..Progress::default()
	});

	let mut link = Link::new(drive);
	let res = Writer::new(&mut link, *opts).run(disc);

	if ! drive.released() { let _res = link.sync_cache(); }
	match res {
		Ok(()) => { link.probe_disc(); },
		Err(_) => { drive.msg(MSG_BURN_FAILED, Severity::Fatal, "Burn run failed."); },
	}
	drop(link);

	drive.set_state(DriveStatus::Idle);
	res
}



/// # Check Layout.
fn check_layout(drive: &Drive, opts: &WriteOptions, disc: &Disc) -> Result<(), BurnError> {
	if disc.is_empty() { return Err(BurnError::Noop); }
	let existing = drive.get_disc().map_or(0, |d| d.tracks());
	if disc.sessions().iter().any(Session::is_empty) || MAX_TRACKS < existing + disc.tracks() {
		return Err(BurnError::TrackCount);
	}

	let caps = drive.info().caps();
	let write_type = opts.write_type();
	let supported = match write_type {
		WriteType::Tao => true,
		WriteType::Sao => caps.supports(WriteType::Sao, BlockType::Sao),
		WriteType::Raw =>
			opts.block_type().is_raw() &&
			caps.supports(WriteType::Raw, opts.block_type()),
	};
	if ! supported { return Err(BurnError::WriteType); }

	let mut tno = u8::try_from(existing).unwrap_or(u8::MAX);
	for (sno, session) in disc.sessions().iter().enumerate() {
		for track in session.tracks() {
			tno = tno.saturating_add(1);
			let mode = track.mode();
			if ! track_mode_ok(write_type, mode) {
				drive.msg(
					MSG_TRACK_MODE,
					Severity::Fatal,
					&format!(
						"Unsuitable track mode {:#06x} in track {tno} of session {}.",
						mode.bits(),
						sno + 1,
					),
				);
				return Err(BurnError::TrackMode(mode.bits()));
			}

			if write_type == WriteType::Tao && ! caps.supports(WriteType::Tao, track_block(mode)) {
				return Err(BurnError::WriteType);
			}

			if ! track.has_source() {
				return Err(BurnError::Source(format!("track {tno} has no source")));
			}

			if track.size().is_none() && write_type != WriteType::Tao {
				return Err(BurnError::OpenEnded(tno));
			}
		}
	}

	Ok(())
}

/// # Track Mode OK?
///
/// The host never supplies sub-channel data, and pass-through sectors only
/// make sense when the host is formatting everything else too.
const fn track_mode_ok(write_type: WriteType, mode: TrackMode) -> bool {
	mode.is_valid() &&
	mode.subcode_len() == 0 &&
	(matches!(write_type, WriteType::Raw) || ! mode.contains(TrackMode::MODE_RAW))
}

/// # TAO Block Type.
const fn track_block(mode: TrackMode) -> BlockType {
	if mode.is_audio() || mode.contains(TrackMode::MODE_RAW) { BlockType::Raw0 }
	else { BlockType::Mode1 }
}

/// # Copy Into.
///
/// Copy as much of `src` as fits into `dst`.
fn copy_into(dst: &mut [u8], src: &[u8]) {
	let len = dst.len().min(src.len());
	dst[..len].copy_from_slice(&src[..len]);
}



#[derive(Debug)]
/// # Writer.
///
/// The state of a single burn run.
struct Writer<'a, 'l> {
	link: &'l mut Link<'a>,
	drive: &'a Drive,
	opts: WriteOptions,
	buf: SectorBuffer,
	nwa: i32,
	subcode: Subcode,
}

impl<'a, 'l> Writer<'a, 'l> {
	/// # New.
	fn new(link: &'l mut Link<'a>, opts: WriteOptions) -> Self {
		let drive = link.drive();
		Self {
			link,
			drive,
			opts,
			buf: SectorBuffer::new(),
			nwa: 0,
			subcode: opts.block_type().subcode(),
		}
	}

	/// # Run.
	fn run(&mut self, disc: &mut Disc) -> Result<(), BurnError> {
		let write_type = self.opts.write_type();
		let (base_sessions, base_tracks) = self.drive.get_disc()
			.map_or((0, 0), |d| (d.len(), d.tracks()));
		let mut session_no = u8::try_from(base_sessions + 1).map_err(|_| BurnError::TrackCount)?;
		let mut first_tno = u8::try_from(base_tracks + 1).map_err(|_| BurnError::TrackCount)?;

		self.link.set_speed(self.opts.speed())?;
		if self.opts.opc() && ! self.opts.simulate() { self.link.send_opc()?; }

		// Session-wide writes only need the parameters set once.
		if write_type != WriteType::Tao {
			let params = self.params(self.opts.control(), self.opts.block_type(), None);
			self.link.write_params(params)?;
			let nwa = self.link.next_writable()?;
			self.debug(&format!("Inquired NWA: {nwa}."));
			self.nwa =
				if write_type == WriteType::Sao { nwa - CD_LEADIN }
				else { self.drive.lba_range().0 };
		}

		let sessions = disc.len();
		for (idx, session) in disc.sessions_mut().iter_mut().enumerate() {
			let first = base_sessions == 0 && idx == 0;
			let last = idx + 1 == sessions;
			let tracks = u8::try_from(session.len()).unwrap_or(u8::MAX);
			self.drive.progress(|p| {
				p.session = u8::try_from(idx).unwrap_or(u8::MAX);
				p.tracks = tracks;
				p.track = 0;
			});

			// Where the program area (starting with the first pregap) goes.
			let start =
				if write_type == WriteType::Raw && first { -CD_LEADIN }
				else if idx == 0 || write_type == WriteType::Tao { self.nwa }
				else { self.nwa + LEADIN_NEXT };

			let fill = (self.opts.fill() && last && write_type != WriteType::Tao)
				.then(|| self.drive.lba_range().1);
			let layout = TocBuilder::new(write_type, self.opts.format())
				.with_session(session_no, start, first_tno)
				.with_fill(fill)
				.build(session)?;

			match write_type {
				WriteType::Tao => {},
				WriteType::Sao => {
					self.link.send_cue_sheet(&layout.cue_sheet().to_bytes())?;
					self.nwa = start;
				},
				WriteType::Raw => { self.leadin(&layout, start)?; },
			}

			// The layout is settled, so the sources can be handed over.
			let isrcs: Vec<Option<[u8; 12]>> = session.tracks().iter()
				.map(|t| t.isrc().map(Isrc::to_ascii))
				.collect();
			let mut feeds: Vec<Feed> = session.tracks_mut().iter_mut()
				.map(Feed::new)
				.collect();

			let plans = layout.tracks();
			for t in 0..plans.len() {
				let isrc = isrcs.get(t).copied().flatten();
				self.track(plans, t, &mut feeds, isrc, last && t + 1 == plans.len())?;
			}

			let leadout = if first { LEADOUT_FIRST } else { LEADOUT_NEXT };
			match write_type {
				WriteType::Tao => {
					self.closing("Closing session.");
					self.link.close_session()?;
				},
				WriteType::Sao => {
					self.flush()?;
					self.link.sync_cache()?;
					self.nwa += leadout;
				},
				WriteType::Raw => { self.leadout(plans, leadout)?; },
			}

			session_no = session_no.saturating_add(1);
			let visible = plans.iter().filter(|p| ! p.hidden).count();
			first_tno = first_tno.saturating_add(u8::try_from(visible).unwrap_or(u8::MAX));
			self.drive.progress(|p| {
				p.start_sector = 0;
				p.sectors = 0;
				p.sector = 0;
			});
		}

		if write_type == WriteType::Raw {
			self.flush()?;
			self.link.sync_cache()?;
		}

		Ok(())
	}

	/// # Lead-in.
	///
	/// Raw writes produce their own lead-in, cycling through the session's
	/// TOC entries, each repeated three times.
	fn leadin(&mut self, layout: &SessionLayout, start: i32) -> Result<(), BurnError> {
		let Some(mode) = layout.tracks().first().map(|p| p.mode) else { return Ok(()); };
		let count = u32::try_from(start - self.cursor()).unwrap_or(0);
		let entries = layout.entries()
			.iter()
			.flat_map(|e| std::iter::repeat(*e).take(3))
			.cycle();

		self.unit(DriveStatus::WritingLeadIn, count);
		for (rel, entry) in (0..count).zip(entries) {
			self.put(mode, Position::LeadIn { entry, rel }, &[])?;
			self.drive.progress(|p| p.sector = rel + 1);
		}

		self.drive.set_state(DriveStatus::Writing);
		Ok(())
	}

	/// # Lead-out.
	///
	/// Raw writes produce their own lead-out too, in the mode of the last
	/// track.
	fn leadout(&mut self, plans: &[TrackPlan], count: i32) -> Result<(), BurnError> {
		let Some(last) = plans.last() else { return Ok(()); };
		let count = u32::try_from(count).unwrap_or(0);

		self.unit(DriveStatus::WritingLeadOut, count);
		for rel in 0..count {
			self.put(last.mode, Position::LeadOut { control: last.control, rel }, &[])?;
			self.drive.progress(|p| p.sector = rel + 1);
		}

		self.drive.set_state(DriveStatus::Writing);
		Ok(())
	}

	/// # Write a Track.
	fn track(
		&mut self,
		plans: &[TrackPlan],
		idx: usize,
		feeds: &mut [Feed],
		isrc: Option<[u8; 12]>,
		last: bool,
	) -> Result<(), BurnError> {
		let plan = plans[idx];
		let tao = self.opts.write_type() == WriteType::Tao;
		self.drive.progress(|p| p.track = u8::try_from(idx).unwrap_or(u8::MAX));

		// TAO tracks each get their own parameters and address.
		if tao {
			let params = self.params(plan.control, track_block(plan.mode), isrc);
			self.link.write_params(params)?;
			self.nwa = self.link.next_writable()?;
			self.debug(&format!("Track {:02} NWA: {}.", plan.tno, self.nwa));
		}
		else { self.pregaps(plans, idx)?; }

		let mut sectors = plan.sectors;
		if tao && last && self.opts.fill() {
			let room = u32::try_from(self.drive.lba_range().1 - self.nwa).unwrap_or(0);
			sectors = sectors.max(room);
		}

		let open = plan.open_ended;
		let warn_from = if last { sectors.saturating_sub(LEADOUT_WARN) } else { u32::MAX };
		let carry = usize::try_from(plan.carry_out).unwrap_or(usize::MAX);
		let mut payload = vec![0_u8; usize::from(plan.sector_len)];
		let mut done = 0_u32;

		self.unit(DriveStatus::Writing, sectors);
		while open || done < sectors {
			if done % CAPACITY_EVERY == 0 { let _res = self.link.buffer_capacity(); }

			payload.fill(0);
			let len = feeds[idx].fill(&mut payload)?;
			if open && len == 0 { break; }

			// A chained track tops up its final sector from the next one.
			if 0 != carry && done + 1 == sectors && len < payload.len() {
				if let Some(next) = feeds.get_mut(idx + 1) {
					let end = payload.len().min(len.saturating_add(carry));
					next.fill(&mut payload[len..end])?;
				}
			}

			self.put(
				plan.mode,
				Position::Track {
					control: plan.control,
					tno: plan.tno,
					index: u8::from(! plan.hidden),
					rel: done,
					pause: warn_from <= done,
				},
				&payload,
			)?;

			done += 1;
			self.drive.progress(|p| {
				p.sector = done;
				if open { p.sectors = done; }
			});
		}

		let (bytes, crc) = feeds[idx].summary();
		self.drive.msg(
			MSG_TRACK_DONE,
			Severity::Note,
			&format!(
				"Track {:02}: {} sectors, {} bytes, CRC32 {crc:08x}.",
				plan.tno,
				NiceU32::from(done),
				NiceU64::from(bytes),
			),
		);

		if ! tao && plan.postgap {
			for rel in done..done + POSTGAP {
				self.put(
					plan.mode,
					Position::Track {
						control: plan.control,
						tno: plan.tno,
						index: 1,
						rel,
						pause: false,
					},
					&[],
				)?;
			}
		}

		match self.opts.write_type() {
			WriteType::Tao => self.close_track(plan, done),
			WriteType::Sao => self.flush(),
			WriteType::Raw => Ok(()),
		}
	}

	/// # Pregaps.
	///
	/// The one-second pregap keeps the previous track's format; the
	/// two-second pregap uses the new one. Relative times count down to the
	/// start of the track.
	fn pregaps(&mut self, plans: &[TrackPlan], idx: usize) -> Result<(), BurnError> {
		let plan = plans[idx];
		let mut left =
			(if plan.pregap1 { PREGAP1 } else { 0 }) +
			(if plan.pregap2 { PREGAP2 } else { 0 });
		if left == 0 { return Ok(()); }

		self.unit(DriveStatus::Writing, left);
		if plan.pregap1 {
			let (mode, control) = idx.checked_sub(1)
				.and_then(|i| plans.get(i))
				.map_or((plan.mode, plan.control), |p| (p.mode, p.control));
			for _ in 0..PREGAP1 {
				let pos = Position::Track { control, tno: plan.tno, index: 0, rel: left, pause: true };
				self.put(mode, pos, &[])?;
				left -= 1;
			}
		}

		if plan.pregap2 {
			for _ in 0..PREGAP2 {
				let pos = Position::Track {
					control: plan.control,
					tno: plan.tno,
					index: 0,
					rel: left,
					pause: true,
				};
				self.put(plan.mode, pos, &[])?;
				left -= 1;
			}
		}

		Ok(())
	}

	/// # Close Track (TAO).
	///
	/// Flush everything, pad the track up to the minimum length if needed,
	/// then close it.
	fn close_track(&mut self, plan: TrackPlan, written: u32) -> Result<(), BurnError> {
		self.flush()?;
		self.link.sync_cache()?;

		if self.opts.pad() && written < TAO_MIN {
			let mut left = TAO_MIN - written;
			self.drive.msg(
				MSG_PADDING,
				Severity::Note,
				&format!("Padding up track to minimum size (+ {left} sectors)."),
			);

			let len = usize::from(plan.sector_len);
			let zeroes = vec![0_u8; len * usize::from(PAD_STEP)];
			while 0 != left {
				let step = u16::try_from(left).map_or(PAD_STEP, |l| l.min(PAD_STEP));
				self.link.write(self.nwa, step, &zeroes[..len * usize::from(step)])?;
				self.nwa += i32::from(step);
				left -= u32::from(step);
			}
		}

		self.closing(&format!("Closing track {:02}.", plan.tno));
		self.link.close_track(0xFF)
	}
}

/// # Sectors.
impl Writer<'_, '_> {
	/// # Cursor.
	///
	/// The address of the next sector to be queued.
	fn cursor(&self) -> i32 { self.nwa + i32::from(self.buf.sectors()) }

	/// # Queue a Sector.
	///
	/// Build a sector around the payload, zero-padded as needed, and add it
	/// to the buffer, flushing first if it won't fit.
	fn put(&mut self, mode: TrackMode, pos: Position, payload: &[u8]) -> Result<(), BurnError> {
		if self.drive.killed() { return Err(BurnError::Killed); }

		let raw = self.opts.write_type() == WriteType::Raw;
		let len =
			if raw { usize::from(SECTOR_RAW) + self.subcode.len() }
			else { usize::from(mode.sector_len().unwrap_or(SECTOR_MODE1)) };
		if ! self.buf.fits(len) { self.flush()?; }

		let lba = self.cursor();
		let subcode = self.subcode;
		let dst = self.buf.next(len);
		if raw {
			let (main, sub) = dst.split_at_mut(usize::from(SECTOR_RAW));
			if mode.is_audio() || mode.contains(TrackMode::MODE_RAW) {
				copy_into(main, payload);
			}
			else {
				copy_into(&mut main[16..16 + usize::from(SECTOR_MODE1)], payload);
				sector::mode1(main, lba);
			}
			sector::subcode(sub, subcode, &pos.q(lba), pos.p());
		}
		else { copy_into(dst, payload); }

		Ok(())
	}

	/// # Flush.
	///
	/// Send whatever is buffered to the drive. Nothing is sent once the
	/// burn has been cancelled.
	fn flush(&mut self) -> Result<(), BurnError> {
		if self.buf.is_empty() { return Ok(()); }
		if self.drive.killed() { return Err(BurnError::Killed); }

		let sectors = self.buf.sectors();
		self.link.write(self.nwa, sectors, self.buf.as_slice())?;
		self.nwa += i32::from(sectors);
		self.buf.clear();
		Ok(())
	}
}

/// # Helpers.
impl Writer<'_, '_> {
	/// # Write Parameters.
	fn params(&self, control: u8, block: BlockType, isrc: Option<[u8; 12]>) -> WriteParams {
		WriteParams {
			write_type: self.opts.write_type(),
			block: block.code(),
			simulate: self.opts.simulate(),
			underrun_proof: self.opts.underrun_proof(),
			multi: self.opts.multi(),
			control,
			format: self.opts.format(),
			mcn: self.opts.mcn(),
			isrc,
		}
	}

	/// # New Unit.
	///
	/// Update the state and reset the sector progress for a new stretch of
	/// writing.
	fn unit(&self, state: DriveStatus, sectors: u32) {
		self.drive.set_state(state);
		let start = self.cursor();
		self.drive.progress(|p| {
			p.start_sector = start;
			p.sectors = sectors;
			p.sector = 0;
		});
	}

	/// # Debug Message.
	fn debug(&self, text: &str) { self.drive.msg(MSG_DEBUG, Severity::Debug, text); }

	/// # Closing Message.
	fn closing(&self, text: &str) { self.drive.msg(MSG_CLOSING, Severity::Debug, text); }
}



#[cfg(test)]
mod test {
	use super::*;
	use crate::{
		BufferSource,
		CommandTiming,
		MockMedia,
		MockTransport,
		MsgLog,
		POS_END,
		Sense,
		Track,
	};
	use std::{
		sync::Arc,
		time::Duration,
	};

	/// # Fast Timing.
	const fn fast() -> CommandTiming {
		CommandTiming::new()
			.with_timeout(Duration::from_millis(200))
			.with_backoff(Duration::from_millis(1), Duration::from_millis(1))
			.with_poll(Duration::from_millis(1))
	}

	/// # Open and Grab a Mock Drive.
	fn grabbed(mock: &MockTransport) -> (Drive, Arc<MsgLog>) {
		let log = Arc::new(MsgLog::default());
		let drive = Drive::open(0, Box::new(mock.clone()), log.clone(), fast())
			.expect("Open failed.");
		drive.grab(false).expect("Grab failed.");
		mock.clear();
		log.drain();
		(drive, log)
	}

	/// # Test Data.
	fn data(len: usize) -> Vec<u8> {
		(0..len).map(|i| (i % 253) as u8).collect()
	}

	/// # Make a Track.
	fn track(mode: TrackMode, src: Vec<u8>) -> Track {
		Track::new(mode).with_source(Box::new(BufferSource::from(src)))
	}

	/// # Make a Single-Session Disc.
	fn disc(tracks: Vec<Track>) -> Disc {
		let mut session = Session::new();
		for t in tracks { session.add_track(t, POS_END).expect("Add track failed."); }
		let mut disc = Disc::new();
		disc.add_session(session, POS_END).expect("Add session failed.");
		disc
	}

	#[test]
	fn t_precheck() {
		let mock = MockTransport::default();
		let (drive, log) = grabbed(&mock);
		let opts = WriteOptions::default();

		assert_eq!(precheck(&drive, &opts, &Disc::new()), Err(BurnError::Noop));

		let mut empty = Disc::new();
		empty.add_session(Session::new(), POS_END).expect("Add session failed.");
		assert_eq!(precheck(&drive, &opts, &empty), Err(BurnError::TrackCount));

		// Missing source.
		let d = disc(vec![Track::new(TrackMode::MODE1)]);
		assert!(matches!(precheck(&drive, &opts, &d), Err(BurnError::Source(_))));

		// Sub-channel modes are never accepted.
		let mode = TrackMode::AUDIO | TrackMode::SUBCODE_P16;
		let d = disc(vec![track(mode, data(100))]);
		assert_eq!(precheck(&drive, &opts, &d), Err(BurnError::TrackMode(mode.bits())));
		assert!(log.contains(MSG_TRACK_MODE));

		// Pass-through sectors only work raw.
		let mode = TrackMode::MODE1 | TrackMode::MODE_RAW;
		let d = disc(vec![track(mode, data(2352))]);
		assert_eq!(precheck(&drive, &opts, &d), Err(BurnError::TrackMode(mode.bits())));
		let raw = WriteOptions::default().with_write_type(WriteType::Raw, BlockType::Raw96R);
		assert!(precheck(&drive, &raw, &d).is_ok());

		// Raw needs a raw block type.
		let bad = WriteOptions::default().with_write_type(WriteType::Raw, BlockType::Mode1);
		assert_eq!(precheck(&drive, &bad, &d), Err(BurnError::WriteType));

		// Open-ended tracks are TAO-only.
		let d = disc(vec![
			Track::new(TrackMode::MODE1).with_source(Box::new(crate::FileSource::stdin())),
		]);
		assert!(precheck(&drive, &opts, &d).is_ok());
		let sao = WriteOptions::default().with_write_type(WriteType::Sao, BlockType::Sao);
		assert_eq!(precheck(&drive, &sao, &d), Err(BurnError::OpenEnded(1)));

		// Busy or released drives are no good.
		let d = disc(vec![track(TrackMode::MODE1, data(100))]);
		drive.set_state(DriveStatus::Erasing);
		assert_eq!(precheck(&drive, &opts, &d), Err(BurnError::DriveBusy));
		drive.set_state(DriveStatus::Idle);
		assert!(drive.release(false).is_ok());
		assert_eq!(precheck(&drive, &opts, &d), Err(BurnError::DriveReleased));
	}

	#[test]
	fn t_precheck_full() {
		let mock = MockTransport::default()
			.with_media(MockMedia::new(DiscStatus::Full, false, -11_634, 359_849));
		let (drive, _log) = grabbed(&mock);
		let d = disc(vec![track(TrackMode::MODE1, data(100))]);
		assert_eq!(
			precheck(&drive, &WriteOptions::default(), &d),
			Err(BurnError::DiscStatus(DiscStatus::Full)),
		);
	}

	#[test]
	fn t_tao() {
		let mock = MockTransport::default();
		let (drive, log) = grabbed(&mock);

		let a = data(6144);
		let b = data(3072);
		let mut d = disc(vec![
			track(TrackMode::MODE1, a.clone()),
			track(TrackMode::MODE1, b.clone()),
		]);
		let opts = WriteOptions::default().with_pad(false);
		assert!(burn(&drive, &opts, &mut d).is_ok());

		let track_ops = [0x55, 0x52, 0x5C, 0x2A, 0x35, 0x5B];
		let mut expected = vec![0xBB, 0x54];
		expected.extend_from_slice(&track_ops);
		expected.extend_from_slice(&track_ops);
		expected.extend_from_slice(&[0x5B, 0x35, 0x51, 0x43]);
		assert_eq!(mock.opcodes(), expected);

		assert_eq!(mock.writes(), vec![(0, 3, 6144), (3, 2, 4096)]);
		let calls = mock.calls();
		let writes: Vec<_> = calls.iter().filter(|c| c.opcode() == 0x2A).collect();
		assert_eq!(writes[0].data, a);
		assert_eq!(&writes[1].data[..3072], b.as_slice());
		assert!(writes[1].data[3072..].iter().all(|v| 0 == *v), "Short sectors should be zero-padded.");

		assert_eq!(drive.state(), DriveStatus::Idle);
		assert_eq!(drive.disc_status(), DiscStatus::Full);
		assert!(log.contains(MSG_CLOSING));
		assert!(! log.contains(MSG_BURN_FAILED));

		let crc = format!("{:08x}", crc32fast::hash(&b));
		assert!(
			log.drain().iter().any(|m| m.code() == MSG_TRACK_DONE && m.text().contains(&crc)),
			"Missing track summary.",
		);
	}

	#[test]
	fn t_tao_pad() {
		let mock = MockTransport::default();
		let (drive, log) = grabbed(&mock);

		let mut d = disc(vec![track(TrackMode::MODE1, data(2048 * 10))]);
		assert!(burn(&drive, &WriteOptions::default(), &mut d).is_ok());

		let writes = mock.writes();
		assert_eq!(writes[0], (0, 10, 20_480));
		let padding: u32 = writes[1..].iter().map(|(_, n, _)| u32::from(*n)).sum();
		assert_eq!(padding, 290, "The track should be padded to 300 sectors.");
		assert!(writes[1..].iter().all(|(_, n, _)| *n <= 8));
		assert_eq!(writes.last().map(|(lba, n, _)| lba + i32::from(*n)), Some(300));
		assert!(log.contains(MSG_PADDING));
	}

	#[test]
	fn t_sao() {
		let mock = MockTransport::default();
		let (drive, _log) = grabbed(&mock);

		let mut d = disc(vec![
			track(TrackMode::AUDIO, data(2352 * 10)),
			track(TrackMode::MODE1, data(2048 * 5)),
		]);
		let opts = WriteOptions::default().with_write_type(WriteType::Sao, BlockType::Sao);
		assert!(burn(&drive, &opts, &mut d).is_ok());

		let ops = mock.opcodes();
		assert!(ops.starts_with(&[0xBB, 0x54, 0x55, 0x52, 0x5D]), "{ops:02x?}");
		assert!(ops.ends_with(&[0x35, 0x35, 0x51]), "{ops:02x?}");

		// Lead-in, two pregaps and two tracks (the form changes), lead-out.
		let calls = mock.calls();
		let cue = calls.iter().find(|c| c.opcode() == 0x5D).expect("Missing cue sheet.");
		assert_eq!(cue.data.len(), 6 * 8);
		assert_eq!(cue.data[41], 0xAA);

		let writes = mock.writes();
		assert_eq!(writes.first().map(|w| w.0), Some(-150));
		let total: u32 = writes.iter().map(|(_, n, _)| u32::from(*n)).sum();
		assert_eq!(total, 150 + 10 + 150 + 5);
		let bytes: usize = writes.iter().map(|(_, _, b)| *b).sum();
		assert_eq!(bytes, 160 * 2352 + 155 * 2048);
		assert_eq!(writes.last().map(|(lba, n, _)| lba + i32::from(*n)), Some(165));

		// Writes never mix sector sizes.
		for (_, n, b) in writes {
			assert!(b == usize::from(n) * 2352 || b == usize::from(n) * 2048);
		}
	}

	#[test]
	fn t_sao_carry() {
		let mock = MockTransport::default();
		let (drive, _log) = grabbed(&mock);

		// The first track is 1.5 sectors, the second 1 sector, both unpadded.
		let mut a = track(TrackMode::AUDIO, vec![1_u8; 3528]);
		let mut b = track(TrackMode::AUDIO, vec![2_u8; 2352]);
		assert!(a.define_data(0, 0, false, TrackMode::AUDIO).is_ok());
		assert!(b.define_data(0, 0, false, TrackMode::AUDIO).is_ok());
		let mut d = disc(vec![a, b]);
		let opts = WriteOptions::default().with_write_type(WriteType::Sao, BlockType::Sao);
		assert!(burn(&drive, &opts, &mut d).is_ok());

		let calls = mock.calls();
		let data: Vec<u8> = calls.iter()
			.filter(|c| c.opcode() == 0x2A)
			.flat_map(|c| c.data.iter().copied())
			.collect();

		// Skip the pregap; the second sector borrows half of track two.
		let data = &data[150 * 2352..];
		assert_eq!(data.len(), 3 * 2352);
		assert!(data[..3528].iter().all(|v| *v == 1));
		assert!(data[3528..4704].iter().all(|v| *v == 2));
		assert!(data[4704..5880].iter().all(|v| *v == 2));
		assert!(data[5880..].iter().all(|v| *v == 0));
	}

	#[test]
	fn t_raw() {
		let mock = MockTransport::default()
			.with_media(MockMedia::new(DiscStatus::Blank, true, -300, 359_849));
		let (drive, _log) = grabbed(&mock);
		assert_eq!(drive.lba_range().0, -300);

		let src = data(6144);
		let mut d = disc(vec![track(TrackMode::MODE1, src.clone())]);
		let opts = WriteOptions::default().with_write_type(WriteType::Raw, BlockType::Raw16);
		assert!(burn(&drive, &opts, &mut d).is_ok());

		// Lead-in, pregap, data, lead-out, all 2368 bytes wide.
		let writes = mock.writes();
		assert_eq!(writes.first().map(|w| w.0), Some(-300));
		let total: u32 = writes.iter().map(|(_, n, _)| u32::from(*n)).sum();
		assert_eq!(total, 150 + 150 + 3 + 6750);
		assert!(writes.iter().all(|(_, n, b)| usize::from(*n) * 2368 == *b));

		let calls = mock.calls();
		let stream: Vec<u8> = calls.iter()
			.filter(|c| c.opcode() == 0x2A)
			.flat_map(|c| c.data.iter().copied())
			.collect();
		let sector = |lba: i32| {
			let start = usize::try_from(lba + 300).expect("Bad LBA.") * 2368;
			&stream[start..start + 2368]
		};

		// The first lead-in sector carries point A0.
		let s = sector(-300);
		assert_eq!(s[2352], 0x41);
		assert_eq!(s[2354], 0xA0);
		assert_eq!(s[2359], 0x01, "The first track is one.");
		let s = sector(-297);
		assert_eq!(s[2354], 0xA1);

		// The first data sector.
		let s = sector(0);
		assert_eq!(&s[..12], &[0, 255, 255, 255, 255, 255, 255, 255, 255, 255, 255, 0]);
		assert_eq!(&s[12..16], &[0x00, 0x02, 0x00, 0x01]);
		assert_eq!(&s[16..2064], &src[..2048]);
		assert_eq!(
			u32::from_le_bytes([s[2064], s[2065], s[2066], s[2067]]),
			sector::edc(&s[..2064]),
		);
		assert_eq!(&s[2352..2355], &[0x41, 0x01, 0x01]);
		assert_eq!(&s[2359..2362], &[0x00, 0x02, 0x00]);
		assert_eq!(
			u16::from_be_bytes([s[2362], s[2363]]),
			! sector::crc16(&s[2352..2362]),
		);
		assert_eq!(s[2367], 0x80, "The final stretch of the last track is flagged.");

		// The lead-out.
		let s = sector(3);
		assert_eq!(s[2353], 0xAA);

		assert_eq!(mock.opcodes().last(), Some(&0x51));
	}

	#[test]
	fn t_cancel() {
		let mock = MockTransport::default();
		let (drive, log) = grabbed(&mock);
		mock.kill_on_write(1, drive.kill_switch());

		let mut d = disc(vec![track(TrackMode::MODE1, data(2048 * 100))]);
		assert_eq!(burn(&drive, &WriteOptions::default(), &mut d), Err(BurnError::Killed));

		assert_eq!(mock.writes().len(), 1, "Nothing more should be written once killed.");
		let ops = mock.opcodes();
		assert_eq!(ops.last(), Some(&0x35), "The cache should still be synchronized.");
		assert!(! ops.contains(&0x5B), "Failed tracks are not closed.");
		assert!(log.contains(MSG_BURN_FAILED));
		assert_eq!(drive.state(), DriveStatus::Idle);
	}

	#[test]
	fn t_transport_fail() {
		let mock = MockTransport::default();
		let (drive, log) = grabbed(&mock);
		mock.fail_transport(0x2A, 1);

		let mut d = disc(vec![track(TrackMode::MODE1, data(2048))]);
		assert_eq!(
			burn(&drive, &WriteOptions::default(), &mut d),
			Err(BurnError::Transport("WRITE")),
		);
		assert!(drive.released(), "Transport failures release the drive.");
		assert_eq!(mock.opcodes().last(), Some(&0x2A), "No cache sync without a transport.");
		assert!(log.contains(MSG_BURN_FAILED));
	}

	#[test]
	fn t_write_fail() {
		let mock = MockTransport::default();
		let (drive, _log) = grabbed(&mock);
		mock.fail_sense(0x2A, Sense::new(3, 0x0C, 0), 1);

		let mut d = disc(vec![track(TrackMode::MODE1, data(2048))]);
		assert!(matches!(
			burn(&drive, &WriteOptions::default(), &mut d),
			Err(BurnError::Sense("WRITE", _)),
		));
		assert!(! drive.released());
		assert_eq!(mock.opcodes().last(), Some(&0x35));
		assert_eq!(drive.state(), DriveStatus::Idle);
	}
}
