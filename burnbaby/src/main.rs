/*!
# Burn Baby Burn!
*/

#![forbid(unsafe_code)]

#![deny(
	clippy::allow_attributes_without_reason,
	clippy::correctness,
	unreachable_pub,
)]

#![warn(
	clippy::complexity,
	clippy::nursery,
	clippy::pedantic,
	clippy::perf,
	clippy::style,

	clippy::allow_attributes,
	clippy::clone_on_ref_ptr,
	clippy::create_dir,
	clippy::filetype_is_file,
	clippy::format_push_string,
	clippy::get_unwrap,
	clippy::impl_trait_in_params,
	clippy::lossy_float_literal,
	clippy::missing_assert_message,
	clippy::missing_docs_in_private_items,
	clippy::needless_raw_strings,
	clippy::panic_in_result_fn,
	clippy::pub_without_shorthand,
	clippy::rest_pat_in_fully_bound_structs,
	clippy::semicolon_inside_block,
	clippy::str_to_string,
	clippy::string_to_string,
	clippy::todo,
	clippy::undocumented_unsafe_blocks,
	clippy::unneeded_field_pattern,
	clippy::unseparated_literal_suffix,
	clippy::unwrap_in_result,

	macro_use_extern_crate,
	missing_copy_implementations,
	missing_docs,
	non_ascii_idents,
	trivial_casts,
	trivial_numeric_casts,
	unused_crate_dependencies,
	unused_extern_crates,
	unused_import_braces,
)]

#![expect(clippy::redundant_pub_crate, reason = "Unresolvable.")]



mod cli;

use burnbaby_core::{
	BurnError,
	CdioEnumerator,
	CommandTiming,
	Disc,
	Drive,
	DriveStatus,
	Executor,
	FileSource,
	MsgEntry,
	MsgLog,
	MsgSink,
	Operation,
	Outcome,
	POS_END,
	PrintSink,
	Session,
	Severity,
	Source,
	Ticket,
	Track,
	TrackMode,
	WriteType,
};
use cli::Settings;
use dactyl::{
	NiceU32,
	NiceU64,
};
use fyi_msg::{
	fyi_ansi::{
		ansi,
		bold,
	},
	Msg,
	Progless,
};
use oxford_join::JoinFmt;
use std::{
	process::ExitCode,
	sync::Arc,
	time::Duration,
};
use utc2k::FmtUtc2k;



/// # Divider.
///
/// This frames each drive's vendor/model in the scan listing.
const DIVIDER: &str = "------------------------------------------------";

/// # Status Poll Interval.
const POLL: Duration = Duration::from_millis(100);



/// # Message Tee.
///
/// Messages are printed as they arrive, and kept for the report at the end.
struct Tee {
	/// # Live Output.
	print: PrintSink,

	/// # Kept Copy.
	log: Arc<MsgLog>,
}

impl MsgSink for Tee {
	fn submit(&self, drive: Option<usize>, code: u32, severity: Severity, text: &str) {
		self.print.submit(drive, code, severity, text);
		self.log.submit(drive, code, severity, text);
	}
}



/// # Main.
///
/// This lets us bubble up startup errors so they can be pretty-printed.
fn main() -> ExitCode {
	match main__() {
		Ok(()) => ExitCode::SUCCESS,
		Err(e @ (BurnError::PrintHelp | BurnError::PrintVersion)) => {
			println!("{e}");
			ExitCode::SUCCESS
		},
		Err(e) => {
			Msg::from(e).eprint();
			ExitCode::FAILURE
		},
	}
}

#[inline]
/// # Actual Main.
///
/// This does all the stuff.
fn main__() -> Result<(), BurnError> {
	let settings = cli::parse()?;
	let log = Arc::new(MsgLog::default());
	let msgs: Arc<dyn MsgSink> = Arc::new(Tee {
		print: PrintSink::from(
			if settings.verbose { Severity::Debug } else { Severity::Note }
		),
		log: Arc::clone(&log),
	});

	let res = run(settings, msgs);
	report(&log);
	res
}

/// # Run.
///
/// Find the drive and put it to work.
fn run(mut settings: Settings, msgs: Arc<dyn MsgSink>) -> Result<(), BurnError> {
	// Find the drives.
	let exec = Executor::default();
	let ticket = exec.spawn(Operation::Scan {
		enumerator: Box::new(CdioEnumerator),
		msgs,
		timing: CommandTiming::default(),
	})?;
	let Outcome::Drives(mut drives) = exec.join(ticket)? else {
		return Err(BurnError::Bug("The scan returned something else."));
	};

	if settings.scan { return scan_summary(&drives); }

	// Pick one.
	let idx = match settings.dev.as_deref() {
		Some(dev) => drives.iter()
			.position(|d| d.address() == dev)
			.ok_or_else(|| BurnError::Device(dev.to_owned()))?,
		None =>
			if drives.is_empty() { return Err(BurnError::NoDrive); }
			else { 0 },
	};
	let drive = Arc::new(drives.swap_remove(idx));
	drop(drives);

	// Settle the raw block type.
	if settings.opts.write_type() == WriteType::Raw {
		let block = Settings::raw_block(drive.info().caps()).ok_or(BurnError::WriteType)?;
		settings.opts = settings.opts.with_write_type(WriteType::Raw, block);
	}

	// Let CTRL+C stop the drive gracefully.
	let switch = drive.kill_switch();
	let _res = ctrlc::set_handler(move || { switch.kill(); });

	drive.grab(true)?;
	if settings.verbose { log_header(&drive, &settings); }

	let res = burn(&exec, &drive, &settings);
	let _res = drive.release(settings.eject);

	if res.is_ok() && drive.kill_switch().killed() { Err(BurnError::Killed) }
	else { res }
}

/// # Erase and/or Burn.
fn burn(exec: &Executor, drive: &Arc<Drive>, settings: &Settings)
-> Result<(), BurnError> {
	if let Some(blank) = settings.blank {
		let ticket = exec.spawn(Operation::Erase {
			drive: Arc::clone(drive),
			fast: blank.fast(),
		})?;
		watch(exec, ticket, drive, "Erasing")?;
		Msg::success("The disc has been erased.").eprint();
		if settings.paths.is_empty() { return Ok(()); }
	}

	let disc = build_disc(settings)?;
	burn_summary(drive, settings, &disc);

	let ticket = exec.spawn(Operation::Write {
		drive: Arc::clone(drive),
		opts: settings.opts,
		disc,
	})?;
	watch(exec, ticket, drive, "Burning")?;

	Msg::success(
		if settings.opts.simulate() { "The simulated burn went swimmingly." }
		else { "The disc has been burned." }
	).eprint();
	Ok(())
}

/// # Build Disc.
///
/// One session, one track per path.
fn build_disc(settings: &Settings) -> Result<Disc, BurnError> {
	if settings.paths.is_empty() { return Err(BurnError::Noop); }

	let mode =
		if settings.audio { TrackMode::AUDIO }
		else { TrackMode::MODE1 };

	let mut session = Session::new();
	for path in &settings.paths {
		let src: Box<dyn Source> =
			if path.as_os_str() == "-" { Box::new(FileSource::stdin()) }
			else { Box::new(FileSource::from_path(path)?) };

		let mut track = Track::new(mode).with_source(src);
		track.define_data(0, 0, true, mode)?;
		session.add_track(track, POS_END)?;
	}

	let mut disc = Disc::new();
	disc.add_session(session, POS_END)?;
	Ok(disc)
}

/// # Watch.
///
/// Show a progress bar until the operation finishes, then return its
/// result.
fn watch(exec: &Executor, ticket: Ticket, drive: &Drive, label: &str)
-> Result<Outcome, BurnError> {
	let progress = Progless::default();
	let mut unit = (0_u8, 0_u32);
	let mut done = 0_u32;

	loop {
		if let Some(res) = exec.poll(ticket) {
			progress.finish();
			return res;
		}

		let (state, p) = drive.status();
		if state != DriveStatus::Spawning && 0 != p.sectors {
			if unit != (p.track, p.sectors) {
				unit = (p.track, p.sectors);
				done = 0;
				let _res = progress.reset(p.sectors);
				progress.set_title(Some(Msg::custom(
					label,
					199,
					&if p.tracks <= 1 { state.as_str().to_owned() }
					else { format!("Track {}/{}", p.track, p.tracks) },
				)));
			}
			if done < p.sector {
				progress.increment_n(p.sector - done);
				done = p.sector;
			}
		}

		std::thread::sleep(POLL);
	}
}



/// # Problems.
///
/// Pull the warnings and failures out of the log, oldest first.
fn problems(log: &MsgLog) -> Vec<MsgEntry> {
	log.drain()
		.into_iter()
		.filter(|e| Severity::Warning <= e.severity())
		.collect()
}

/// # Report.
///
/// Recap whatever went wrong along the way, if anything.
fn report(log: &MsgLog) {
	let list = problems(log);
	if list.is_empty() { return; }

	eprintln!(
		concat!(ansi!((bold, 199) "Problems:"), " {}"),
		NiceU32::from(u32::try_from(list.len()).unwrap_or(u32::MAX)),
	);
	for e in list {
		let drive = e.drive().map_or_else(String::new, |n| format!("[drive {n}] "));
		eprintln!(
			concat!("  ", ansi!((dim) "{}"), " ", bold!("{:<7}"), " {}{}"),
			e.when(),
			e.severity().as_str(),
			drive,
			e.text(),
		);
	}
	eprintln!();
}

/// # Scan Summary.
///
/// List the drives and what they can do.
fn scan_summary(drives: &[Drive]) -> Result<(), BurnError> {
	if drives.is_empty() { return Err(BurnError::NoDrive); }

	for d in drives {
		let info = d.info();
		let vm = format!("{} {} {}", info.vendor(), info.product(), info.revision());
		let len = vm.len().min(DIVIDER.len());
		eprintln!(
			concat!(
				ansi!((dim, cyan) "{}\n"),
				ansi!((bold, cyan) "{vm}\n"),
				ansi!((dim, cyan) "{}"),
			),
			&DIVIDER[..len],
			&DIVIDER[..len],
			vm=vm,
		);

		let caps = info.caps();
		let media: Vec<&str> = [
			(caps.write_cdr(), "CD-R"),
			(caps.write_cdrw(), "CD-RW"),
		].into_iter().filter_map(|(ok, s)| ok.then_some(s)).collect();
		let types: Vec<&str> = WriteType::ALL.into_iter()
			.filter(|w| 0 != caps.block_types(*w))
			.map(WriteType::as_str)
			.collect();

		eprintln!(concat!("  Address:     ", bold!("{}")), d.address());
		if media.is_empty() {
			eprintln!(ansi!((dim) "  Writes:      Nothing"));
		}
		else {
			eprintln!(
				concat!("  Writes:      ", bold!("{}")),
				JoinFmt::new(media.iter(), ", "),
			);
			eprintln!(
				concat!("  Write Types: ", bold!("{}")),
				JoinFmt::new(types.iter(), ", "),
			);
			eprintln!(
				concat!("  Max Speed:   ", bold!("{} KB/s")),
				NiceU32::from(u32::from(caps.max_write())),
			);
		}
		eprintln!();
	}

	Ok(())
}

/// # Burn Summary.
///
/// Describe what's about to happen.
fn burn_summary(drive: &Drive, settings: &Settings, disc: &Disc) {
	let opts = settings.opts;
	let bytes: u64 = disc.sessions().iter()
		.flat_map(|s| s.tracks().iter())
		.filter_map(Track::size)
		.sum();
	let open = disc.sessions().iter()
		.flat_map(|s| s.tracks().iter())
		.any(|t| t.size().is_none());

	let set = [
		("Drive:", drive.address().to_owned(), true),
		("Tracks:", format!(
			"{} {}",
			disc.tracks(),
			if settings.audio { "Audio" } else { "Data" },
		), true),
		("Size:", format!(
			"{} bytes{}",
			NiceU64::from(bytes),
			if open { " (+ STDIN)" } else { "" },
		), true),
		("Write Type:", opts.write_type().as_str().to_owned(), true),
		("Speed:", format!("{} KB/s", opts.speed()), 0 != opts.speed()),
		("Simulate:", "Yes".to_owned(), opts.simulate()),
		("Multi-Session:", "Yes".to_owned(), opts.multi()),
		("Fill:", "Yes".to_owned(), opts.fill()),
		("Pad:", "No".to_owned(), ! opts.pad()),
		("OPC:", "No".to_owned(), ! opts.opc()),
	];
	let max_label = set.iter().map(|(k, _, _)| k.len()).max().unwrap_or(0);

	eprintln!(ansi!((bold, 199) "Burn Baby Burn…"));
	for (k, v, enabled) in set {
		if enabled {
			eprintln!(
				concat!("  {k:max_label$} ", bold!("{v}")),
				k=k,
				v=v,
				max_label=max_label,
			);
		}
	}
	eprintln!();
}

/// # Log Header.
///
/// Print a few basic setup details. Only applies when -v/--verbose is set.
fn log_header(drive: &Drive, settings: &Settings) {
	use std::io::Write;

	let writer = std::io::stdout();
	let mut handle = writer.lock();

	let info = drive.info();
	let _res = writeln!(
		&mut handle,
		concat!("#####
## Burn Baby Burn! v", env!("CARGO_PKG_VERSION"), "
## Drive: [{}] {} {}
## Dev:   {}
## Disc:  {}
## Date:  {}
## STDIN: {}
#####"),
		info.vendor(),
		info.product(),
		info.revision(),
		drive.address(),
		drive.disc_status().as_str(),
		FmtUtc2k::now(),
		if settings.stdin() { "Yes" } else { "No" },
	);

	let _res = handle.flush();
}



#[cfg(test)]
mod test {
	use super::*;
	use burnbaby_core::{
		MSG_BURN_FAILED,
		MSG_DEBUG,
		MSG_SCSI,
	};

	#[test]
	fn t_tee() {
		let log = Arc::new(MsgLog::default());
		let tee = Tee {
			print: PrintSink::from(Severity::Fatal),
			log: Arc::clone(&log),
		};

		tee.submit(None, MSG_DEBUG, Severity::Debug, "Chatter.");
		tee.submit(Some(0), MSG_SCSI, Severity::Warning, "Recovered error.");
		tee.submit(Some(0), MSG_BURN_FAILED, Severity::Failure, "Burn failed.");
		assert_eq!(log.len(), 3, "Everything should be kept.");
		assert!(log.contains(MSG_SCSI), "The warning should be logged.");

		// Only the warning and failure make the report.
		let list = problems(&log);
		assert_eq!(
			list.iter().map(MsgEntry::code).collect::<Vec<_>>(),
			[MSG_SCSI, MSG_BURN_FAILED],
			"The report should skip the chatter.",
		);
		assert!(log.is_empty(), "The log should be drained.");
	}
}
