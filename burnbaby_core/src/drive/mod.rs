/*!
# Burn Baby Burn: Drives
*/

mod caps;
pub(crate) mod mmc;

pub use caps::{
	Capabilities,
	DriveInfo,
};

use cdtoc::Toc;
use crate::{
	BlockType,
	BurnError,
	CD_LEADIN,
	Disc,
	KillSwitch,
	Link,
	MSG_DEBUG,
	MsgSink,
	Severity,
	TocEntry,
	Transport,
	WriteType,
};
use serde::Serialize;
use std::{
	sync::{
		Arc,
		atomic::{
			AtomicBool,
			AtomicU8,
			Ordering::{
				Acquire,
				Release,
			},
		},
		Mutex,
		MutexGuard,
		PoisonError,
	},
	time::Duration,
};



#[derive(Debug, Clone, Copy, Default, Eq, Hash, PartialEq, Serialize)]
/// # Drive Status.
///
/// What a drive is busy doing, if anything.
pub enum DriveStatus {
	#[default]
	/// # Nothing.
	Idle,

	/// # An Operation is About to Start.
	Spawning,

	/// # Reading.
	Reading,

	/// # Writing Track Data.
	Writing,

	/// # Writing the Lead-in.
	WritingLeadIn,

	/// # Writing the Lead-out.
	WritingLeadOut,

	/// # Blanking.
	Erasing,

	/// # Being Grabbed.
	Grabbing,
}

impl DriveStatus {
	/// # All Statuses.
	const ALL: [Self; 8] = [
		Self::Idle, Self::Spawning, Self::Reading, Self::Writing,
		Self::WritingLeadIn, Self::WritingLeadOut, Self::Erasing, Self::Grabbing,
	];

	#[must_use]
	/// # As Str.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Idle => "idle",
			Self::Spawning => "spawning",
			Self::Reading => "reading",
			Self::Writing => "writing",
			Self::WritingLeadIn => "writing lead-in",
			Self::WritingLeadOut => "writing lead-out",
			Self::Erasing => "erasing",
			Self::Grabbing => "grabbing",
		}
	}

	#[must_use]
	/// # Busy?
	pub const fn is_busy(self) -> bool { ! matches!(self, Self::Idle) }

	/// # From U8.
	fn from_u8(src: u8) -> Self {
		Self::ALL.get(usize::from(src)).copied().unwrap_or_default()
	}
}



#[derive(Debug, Clone, Copy, Default, Eq, Hash, PartialEq, Serialize)]
/// # Disc Status.
pub enum DiscStatus {
	#[default]
	/// # Not Yet Known.
	Unready,

	/// # Blank.
	Blank,

	/// # No Disc.
	Empty,

	/// # Written, Room for More Sessions.
	Appendable,

	/// # Written and Closed.
	Full,
}

impl DiscStatus {
	/// # All Statuses.
	const ALL: [Self; 5] = [Self::Unready, Self::Blank, Self::Empty, Self::Appendable, Self::Full];

	#[must_use]
	/// # As Str.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Unready => "unready",
			Self::Blank => "blank",
			Self::Empty => "empty",
			Self::Appendable => "appendable",
			Self::Full => "full",
		}
	}

	/// # From U8.
	fn from_u8(src: u8) -> Self {
		Self::ALL.get(usize::from(src)).copied().unwrap_or_default()
	}
}



#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Serialize)]
/// # Progress.
///
/// A snapshot of how far along the current operation is. Sessions, tracks
/// and indices are zero-based.
pub struct Progress {
	/// # Current Session.
	pub session: u8,

	/// # Total Sessions.
	pub sessions: u8,

	/// # Current Track.
	pub track: u8,

	/// # Total Tracks (in the Current Session).
	pub tracks: u8,

	/// # Current Index.
	pub index: u8,

	/// # Total Indices.
	pub indices: u8,

	/// # First Sector of the Current Unit.
	pub start_sector: i32,

	/// # Sectors in the Current Unit.
	pub sectors: u32,

	/// # Sectors Done.
	pub sector: u32,

	/// # Drive Buffer Capacity.
	pub buffer_capacity: u32,

	/// # Drive Buffer Available.
	pub buffer_available: u32,
}



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Command Timing.
///
/// The per-command time limit (retries included), the retry back-off, and
/// the polling interval for long operations like blanking.
pub struct CommandTiming {
	timeout: Duration,
	base: Duration,
	step: Duration,
	poll: Duration,
}

impl Default for CommandTiming {
	fn default() -> Self { Self::new() }
}

impl CommandTiming {
	#[must_use]
	/// # New.
	pub const fn new() -> Self {
		Self {
			timeout: Duration::from_secs(200),
			base: Duration::from_millis(100),
			step: Duration::from_millis(100),
			poll: Duration::from_secs(1),
		}
	}

	#[must_use]
	/// # With Timeout.
	pub const fn with_timeout(self, timeout: Duration) -> Self {
		Self { timeout, ..self }
	}

	#[must_use]
	/// # With Back-off.
	///
	/// The `n`th retry waits `base + n * step`.
	pub const fn with_backoff(self, base: Duration, step: Duration) -> Self {
		Self { base, step, ..self }
	}

	#[must_use]
	/// # With Poll Interval.
	pub const fn with_poll(self, poll: Duration) -> Self {
		Self { poll, ..self }
	}

	#[must_use]
	/// # Timeout.
	pub const fn timeout(&self) -> Duration { self.timeout }

	#[must_use]
	/// # Back-off.
	pub fn backoff(&self, tries: u32) -> Duration {
		self.base.saturating_add(self.step.saturating_mul(tries))
	}

	#[must_use]
	/// # Poll Interval.
	pub const fn poll(&self) -> Duration { self.poll }
}



#[derive(Debug)]
/// # Drive I/O State.
///
/// Everything only a link holder may touch.
pub(crate) struct DriveIo {
	/// # Transport.
	pub(crate) transport: Box<dyn Transport>,

	/// # Write Parameters Page Length.
	pub(crate) write_page_len: u8,
}

#[derive(Debug, Default)]
/// # Media State.
///
/// What is known about the disc in the drive.
struct Media {
	toc: Vec<TocEntry>,
	disc: Option<Arc<Disc>>,
	start_lba: i32,
	end_lba: i32,
	erasable: bool,
}



#[derive(Debug)]
/// # Drive.
///
/// One optical drive. Drives are shared between the caller and whatever
/// worker is operating on them, so the busy state, disc status and cancel
/// flag are all safe to read and set from any thread.
///
/// Opened drives start out released; `grab` them before doing anything
/// else.
pub struct Drive {
	index: usize,
	address: String,
	info: DriveInfo,
	state: AtomicU8,
	released: AtomicBool,
	disc_status: AtomicU8,
	cancel: KillSwitch,
	progress: Mutex<Progress>,
	media: Mutex<Media>,
	io: Mutex<DriveIo>,
	msgs: Arc<dyn MsgSink>,
	timing: CommandTiming,
}

impl Drive {
	/// # Open.
	///
	/// Connect to a drive through its transport, asking it who it is and
	/// what it can do. Writers are additionally probed for the write and
	/// block types they will accept.
	///
	/// ## Errors
	///
	/// Returns an error if the drive does not answer the initial INQUIRY.
	pub fn open(
		index: usize,
		transport: Box<dyn Transport>,
		msgs: Arc<dyn MsgSink>,
		timing: CommandTiming,
	) -> Result<Self, BurnError> {
		let address = transport.address().to_owned();
		let mut out = Self {
			index,
			address,
			info: DriveInfo::default(),
			state: AtomicU8::new(DriveStatus::Idle as u8),
			released: AtomicBool::new(true),
			disc_status: AtomicU8::new(DiscStatus::Unready as u8),
			cancel: KillSwitch::default(),
			progress: Mutex::default(),
			media: Mutex::default(),
			io: Mutex::new(DriveIo { transport, write_page_len: 0x32 }),
			msgs,
			timing,
		};

		let info = {
			let mut link = Link::new(&out);
			let mut info = link.inquiry()?;
			let mut caps = link.capabilities();
			if caps.writer() {
				link.write_page_len();
				for wt in WriteType::ALL {
					let mut bits = link.probe_block_types(wt);
					if wt == WriteType::Sao && bits != 0 { bits |= BlockType::Sao.bit(); }
					caps.set_block_types(wt, bits);
				}
			}
			info.set_caps(caps);
			info
		};

		out.msg(
			MSG_DEBUG,
			Severity::Debug,
			&format!("Opened {} {} {}.", info.vendor(), info.product(), info.revision()),
		);
		out.info = info;
		Ok(out)
	}

	/// # Grab.
	///
	/// Take control of the drive: optionally load the tray, lock it, and
	/// take stock of the disc.
	///
	/// ## Errors
	///
	/// Returns an error if the drive is already grabbed, or the load or lock
	/// commands fail.
	pub fn grab(&self, load: bool) -> Result<(), BurnError> {
		if ! self.released() { return Err(BurnError::DriveGrabbed); }
		self.set_state(DriveStatus::Grabbing);
		self.set_released(false);

		let mut link = Link::new(self);
		let res =
			if load { link.load() }
			else { Ok(()) }
			.and_then(|()| link.prevent());

		if let Err(e) = res {
			drop(link);
			self.set_released(true);
			self.set_state(DriveStatus::Idle);
			return Err(e);
		}

		link.probe_disc();
		drop(link);
		self.set_state(DriveStatus::Idle);
		Ok(())
	}

	/// # Release.
	///
	/// Unlock the tray, optionally ejecting the disc, and forget what was
	/// known about the disc.
	///
	/// ## Errors
	///
	/// Returns an error if the drive is not grabbed, or is busy.
	pub fn release(&self, eject: bool) -> Result<(), BurnError> {
		if self.released() { return Err(BurnError::DriveReleased); }
		if self.state() != DriveStatus::Idle { return Err(BurnError::DriveBusy); }

		// Failures here are reported, but there's nothing to undo.
		let mut link = Link::new(self);
		let _res = link.allow();
		if eject { let _res = link.eject(); }
		drop(link);

		self.set_released(true);
		self.set_disc_status(DiscStatus::Unready);
		self.forget_disc();
		Ok(())
	}

	/// # Erase.
	///
	/// Blank the disc, fully or minimally, blocking until the drive finishes
	/// or the operation is cancelled.
	///
	/// ## Errors
	///
	/// Returns an error if the drive is not ready to erase, the disc cannot
	/// be erased, the drive refuses, or the wait is cancelled.
	pub fn erase(&self, fast: bool) -> Result<(), BurnError> {
		self.erase_precheck()?;
		self.erase_unchecked(fast)
	}

	/// # Erase Precheck.
	///
	/// ## Errors
	///
	/// The drive must be grabbed and idle, holding an erasable disc that has
	/// something on it.
	pub fn erase_precheck(&self) -> Result<(), BurnError> {
		if self.released() { return Err(BurnError::DriveReleased); }
		if self.state() != DriveStatus::Idle { return Err(BurnError::DriveBusy); }
		let status = self.disc_status();
		if ! matches!(status, DiscStatus::Full | DiscStatus::Appendable) {
			return Err(BurnError::DiscStatus(status));
		}
		if ! self.media().erasable { return Err(BurnError::Erasable); }
		Ok(())
	}

	/// # Erase (Without Checks).
	pub(crate) fn erase_unchecked(&self, fast: bool) -> Result<(), BurnError> {
		self.set_state(DriveStatus::Erasing);
		self.reset_progress(Progress { sessions: 1, tracks: 1, indices: 1, sectors: 0x1_0000, ..Progress::default() });

		let mut link = Link::new(self);
		let res = link.blank(fast).and_then(|()| link.wait_ready());
		link.probe_disc();
		drop(link);

		self.set_state(DriveStatus::Idle);
		res
	}

	/// # Cancel.
	///
	/// Ask whatever is running on the drive to stop. Writes and erases check
	/// between units of work; a command already sent to the drive runs to
	/// completion first.
	pub fn cancel(&self) { self.cancel.kill(); }
}

impl Drive {
	#[must_use]
	/// # Index.
	pub const fn index(&self) -> usize { self.index }

	#[must_use]
	/// # Address.
	pub fn address(&self) -> &str { &self.address }

	#[must_use]
	/// # Info.
	pub const fn info(&self) -> &DriveInfo { &self.info }

	#[must_use]
	/// # Status.
	///
	/// Return the busy state along with a snapshot of the progress counters.
	pub fn status(&self) -> (DriveStatus, Progress) {
		let progress = *self.progress.lock().unwrap_or_else(PoisonError::into_inner);
		(self.state(), progress)
	}

	#[must_use]
	/// # Busy State.
	pub fn state(&self) -> DriveStatus { DriveStatus::from_u8(self.state.load(Acquire)) }

	#[must_use]
	/// # Released?
	pub fn released(&self) -> bool { self.released.load(Acquire) }

	#[must_use]
	/// # Disc Status.
	pub fn disc_status(&self) -> DiscStatus {
		DiscStatus::from_u8(self.disc_status.load(Acquire))
	}

	#[must_use]
	/// # Kill Switch.
	///
	/// Return a handle to the drive's cancellation flag.
	pub fn kill_switch(&self) -> KillSwitch { self.cancel.clone() }

	#[must_use]
	/// # Disc.
	///
	/// Return the layout of the disc in the drive, as of the last time it
	/// was read.
	pub fn get_disc(&self) -> Option<Arc<Disc>> { self.media().disc.clone() }

	#[must_use]
	/// # Table of Contents.
	pub fn toc(&self) -> Vec<TocEntry> { self.media().toc.clone() }

	#[must_use]
	/// # Usable LBA Range.
	///
	/// Return the lead-in start and the last possible lead-out start, as
	/// reported by the drive.
	pub fn lba_range(&self) -> (i32, i32) {
		let media = self.media();
		(media.start_lba, media.end_lba)
	}

	#[must_use]
	/// # Erasable?
	pub fn erasable(&self) -> bool { self.media().erasable }

	/// # Audio TOC.
	///
	/// Summarize the disc's layout in the form used by online metadata
	/// services.
	///
	/// ## Errors
	///
	/// Returns an error if the disc has not been read, or its layout is not
	/// something `cdtoc` understands.
	pub fn cdtoc(&self) -> Result<Toc, BurnError> {
		let disc = self.get_disc().ok_or(BurnError::DiscStatus(self.disc_status()))?;
		let leadout = disc.leadout().ok_or(BurnError::DiscStatus(self.disc_status()))?;

		let mut audio = Vec::new();
		let mut data = None;
		for t in disc.sessions().iter().flat_map(|s| s.tracks()) {
			let Some(e) = t.entry() else { continue; };
			let start = crate::msf_to_lba(e.pmin, e.psec, e.pframe) + CD_LEADIN;
			let start = u32::try_from(start).map_err(|_| BurnError::Bug("Negative track start."))?;
			if t.mode().is_audio() { audio.push(start); }
			else { data.replace(start); }
		}

		let leadout = u32::try_from(leadout + CD_LEADIN)
			.map_err(|_| BurnError::Bug("Negative lead-out."))?;
		Ok(Toc::from_parts(audio, data, leadout)?)
	}
}

impl Drive {
	/// # I/O Mutex.
	pub(crate) const fn io(&self) -> &Mutex<DriveIo> { &self.io }

	/// # Timing.
	pub(crate) const fn timing(&self) -> CommandTiming { self.timing }

	/// # Cancelled?
	pub(crate) fn killed(&self) -> bool { self.cancel.killed() }

	/// # Submit Message.
	pub(crate) fn msg(&self, code: u32, severity: Severity, text: &str) {
		self.msgs.submit(Some(self.index), code, severity, text);
	}

	/// # Set State.
	pub(crate) fn set_state(&self, state: DriveStatus) { self.state.store(state as u8, Release); }

	/// # Set Released.
	pub(crate) fn set_released(&self, v: bool) { self.released.store(v, Release); }

	/// # Set Disc Status.
	pub(crate) fn set_disc_status(&self, status: DiscStatus) {
		self.disc_status.store(status as u8, Release);
	}

	/// # Update Progress.
	pub(crate) fn progress<F: FnOnce(&mut Progress)>(&self, cb: F) {
		cb(&mut self.progress.lock().unwrap_or_else(PoisonError::into_inner));
	}

	/// # Reset Progress.
	pub(crate) fn reset_progress(&self, progress: Progress) {
		*self.progress.lock().unwrap_or_else(PoisonError::into_inner) = progress;
	}

	/// # Media State.
	fn media(&self) -> MutexGuard<'_, Media> {
		self.media.lock().unwrap_or_else(PoisonError::into_inner)
	}

	/// # Set Media Details.
	pub(crate) fn set_media(&self, start_lba: i32, end_lba: i32, erasable: bool) {
		let mut media = self.media();
		media.start_lba = start_lba;
		media.end_lba = end_lba;
		media.erasable = erasable;
	}

	/// # Set TOC.
	///
	/// Store the table of contents and the disc layout derived from it.
	pub(crate) fn set_toc(&self, toc: Vec<TocEntry>) {
		let disc = Disc::from_toc(&toc);
		let mut media = self.media();
		media.toc = toc;
		media.disc = if disc.is_empty() { None } else { Some(Arc::new(disc)) };
	}

	/// # Forget Disc.
	pub(crate) fn forget_disc(&self) {
		let mut media = self.media();
		media.toc.clear();
		media.disc = None;
	}
}
