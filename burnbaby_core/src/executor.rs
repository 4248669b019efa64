/*!
# Burn Baby Burn: Executor
*/

use ahash::RandomState;
use crate::{
	AHASHER,
	BurnError,
	CommandTiming,
	Disc,
	Drive,
	DriveStatus,
	Enumerator,
	MSG_DEBUG,
	MsgSink,
	Severity,
	WriteOptions,
};
use crate::write::{
	burn_unchecked,
	precheck,
};
use std::{
	collections::HashMap,
	fmt,
	sync::{
		Arc,
		atomic::{
			AtomicU64,
			Ordering::Relaxed,
		},
		Condvar,
		Mutex,
		MutexGuard,
		PoisonError,
	},
	thread::JoinHandle,
};



#[derive(Debug, Clone, Copy, Eq, Hash, PartialEq, Ord, PartialOrd)]
/// # Ticket.
///
/// A handle for an operation started by an [`Executor`], used to poll or
/// join it.
pub struct Ticket(u64);

impl fmt::Display for Ticket {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "#{}", self.0)
	}
}



/// # Operation.
///
/// A long-running job for an [`Executor`] to run in the background.
pub enum Operation {
	/// # Scan for Drives.
	///
	/// Open every address the enumerator knows about. Addresses that fail
	/// to open are reported to the sink and skipped.
	Scan {
		/// # Enumerator.
		enumerator: Box<dyn Enumerator>,

		/// # Message Sink for the Drives.
		msgs: Arc<dyn MsgSink>,

		/// # Command Timing for the Drives.
		timing: CommandTiming,
	},

	/// # Erase a Disc.
	Erase {
		/// # Drive.
		drive: Arc<Drive>,

		/// # Fast?
		fast: bool,
	},

	/// # Burn a Disc.
	Write {
		/// # Drive.
		drive: Arc<Drive>,

		/// # Options.
		opts: WriteOptions,

		/// # Layout.
		disc: Disc,
	},
}

impl fmt::Debug for Operation {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Scan { .. } => f.write_str("Scan"),
			Self::Erase { drive, fast } => f.debug_struct("Erase")
				.field("drive", &drive.index())
				.field("fast", fast)
				.finish(),
			Self::Write { drive, opts, .. } => f.debug_struct("Write")
				.field("drive", &drive.index())
				.field("opts", opts)
				.finish_non_exhaustive(),
		}
	}
}

impl Operation {
	/// # Drive.
	const fn drive(&self) -> Option<&Arc<Drive>> {
		match self {
			Self::Scan { .. } => None,
			Self::Erase { drive, .. } | Self::Write { drive, .. } => Some(drive),
		}
	}

	/// # Run.
	fn run(self) -> Result<Outcome, BurnError> {
		match self {
			Self::Scan { mut enumerator, msgs, timing } => {
				let mut out = Vec::new();
				for address in enumerator.addresses() {
					let res = enumerator.open(&address).and_then(|t|
						Drive::open(out.len(), t, Arc::clone(&msgs), timing)
					);
					match res {
						Ok(drive) => { out.push(drive); },
						Err(e) => msgs.submit(
							None,
							MSG_DEBUG,
							Severity::Debug,
							&format!("Skipping {address}: {e}"),
						),
					}
				}
				Ok(Outcome::Drives(out))
			},
			Self::Erase { drive, fast } =>
				drive.erase_unchecked(fast).map(|()| Outcome::Erased),
			Self::Write { drive, opts, mut disc } =>
				burn_unchecked(&drive, &opts, &mut disc).map(|()| Outcome::Written),
		}
	}
}



#[derive(Debug)]
/// # Outcome.
///
/// What a successful operation has to show for itself.
pub enum Outcome {
	/// # Scanned Drives.
	Drives(Vec<Drive>),

	/// # Disc Erased.
	Erased,

	/// # Disc Written.
	Written,
}



#[derive(Debug)]
/// # Registry.
///
/// Outstanding operations (keyed by ticket, with their drive, if any),
/// finished results waiting to be collected, and the worker threads.
struct Registry {
	active: HashMap<Ticket, Option<Arc<Drive>>, RandomState>,
	done: HashMap<Ticket, Result<Outcome, BurnError>, RandomState>,
	handles: HashMap<Ticket, JoinHandle<()>, RandomState>,
}

impl Default for Registry {
	fn default() -> Self {
		Self {
			active: HashMap::with_hasher(AHASHER),
			done: HashMap::with_hasher(AHASHER),
			handles: HashMap::with_hasher(AHASHER),
		}
	}
}

impl Registry {
	/// # Scanning?
	fn scanning(&self) -> bool { self.active.values().any(Option::is_none) }

	/// # Drive Busy?
	fn has_drive(&self, drive: &Drive) -> bool {
		self.active.values().any(|d| d.as_deref().is_some_and(|d| std::ptr::eq(d, drive)))
	}
}

/// # Shared Registry.
type Shared = Arc<(Mutex<Registry>, Condvar)>;

/// # Lock.
fn lock(shared: &Shared) -> MutexGuard<'_, Registry> {
	shared.0.lock().unwrap_or_else(PoisonError::into_inner)
}



#[derive(Debug, Default)]
/// # Executor.
///
/// This runs long operations (scans, erases, burns) each on a thread of its
/// own, keeping track of what is outstanding so that a drive never has two
/// operations at once, and scans never overlap with anything else.
///
/// Dropping the executor blocks until every outstanding operation has
/// finished.
///
/// ```
/// use burnbaby_core::{
///     CommandTiming,
///     Executor,
///     MockEnumerator,
///     MockTransport,
///     MsgLog,
///     Operation,
///     Outcome,
/// };
/// use std::sync::Arc;
///
/// let exec = Executor::default();
/// let ticket = exec.spawn(Operation::Scan {
///     enumerator: Box::new(MockEnumerator::from(vec![MockTransport::default()])),
///     msgs: Arc::new(MsgLog::default()),
///     timing: CommandTiming::default(),
/// }).unwrap();
///
/// match exec.join(ticket) {
///     Ok(Outcome::Drives(drives)) => assert_eq!(drives.len(), 1),
///     _ => panic!("The scan failed."),
/// }
/// ```
pub struct Executor {
	shared: Shared,
	next: AtomicU64,
}

impl Drop for Executor {
	fn drop(&mut self) { self.join_all(); }
}

impl Executor {
	/// # Spawn.
	///
	/// Validate and start an operation in the background, returning a
	/// ticket for it.
	///
	/// A fresh operation starts with the drive's kill switch lowered. Burns
	/// are prechecked before anything is started.
	///
	/// ## Errors
	///
	/// Scans are refused while anything else is outstanding; drive
	/// operations are refused while a scan is outstanding, or if the same
	/// drive already has an operation outstanding. Erases and burns are
	/// also refused if their prechecks fail. No thread is started in any of
	/// these cases.
	pub fn spawn(&self, op: Operation) -> Result<Ticket, BurnError> {
		let mut reg = lock(&self.shared);

		match &op {
			Operation::Scan { .. } =>
				if reg.scanning() { return Err(BurnError::ScanOutstanding); }
				else if ! reg.active.is_empty() { return Err(BurnError::DriveBusy); },
			Operation::Erase { drive, .. } => {
				check_drive(&reg, drive)?;
				drive.erase_precheck()?;
				drive.kill_switch().reset();
			},
			Operation::Write { drive, opts, disc } => {
				check_drive(&reg, drive)?;
				let switch = drive.kill_switch();
				switch.set(true);
				let res = precheck(drive, opts, disc);
				switch.set(false);
				res?;
			},
		}

		let ticket = Ticket(self.next.fetch_add(1, Relaxed));
		let drive = op.drive().cloned();
		if let Some(d) = &drive { d.set_state(DriveStatus::Spawning); }
		reg.active.insert(ticket, drive.clone());

		let shared = Arc::clone(&self.shared);
		let res = std::thread::Builder::new()
			.name(format!("burnbaby {ticket}"))
			.spawn(move || {
				let mut guard = Finish { shared, ticket, drive, res: None };
				guard.res.replace(op.run());
			});

		match res {
			Ok(handle) => {
				reg.handles.insert(ticket, handle);
				Ok(ticket)
			},
			Err(_) => {
				if let Some(Some(d)) = reg.active.remove(&ticket) {
					d.set_state(DriveStatus::Idle);
				}
				Err(BurnError::Spawn)
			},
		}
	}

	#[must_use]
	/// # Poll.
	///
	/// Return the result of the operation if it has finished, or `None` if
	/// it is still running. Results can only be collected once.
	pub fn poll(&self, ticket: Ticket) -> Option<Result<Outcome, BurnError>> {
		let mut reg = lock(&self.shared);
		if reg.active.contains_key(&ticket) { return None; }

		let res = reg.done.remove(&ticket).unwrap_or(Err(BurnError::Bug("Unknown ticket.")));
		let handle = reg.handles.remove(&ticket);
		drop(reg);

		if let Some(h) = handle { let _res = h.join(); }
		Some(res)
	}

	/// # Join.
	///
	/// Block until the operation finishes, then return its result.
	///
	/// ## Errors
	///
	/// Returns the operation's error, if any, or a bug error if the ticket
	/// is unknown or was already collected.
	pub fn join(&self, ticket: Ticket) -> Result<Outcome, BurnError> {
		let mut reg = lock(&self.shared);
		while reg.active.contains_key(&ticket) {
			reg = self.shared.1.wait(reg).unwrap_or_else(PoisonError::into_inner);
		}

		let res = reg.done.remove(&ticket).unwrap_or(Err(BurnError::Bug("Unknown ticket.")));
		let handle = reg.handles.remove(&ticket);
		drop(reg);

		if let Some(h) = handle { let _res = h.join(); }
		res
	}

	/// # Join All.
	///
	/// Block until nothing is outstanding. Uncollected results are kept
	/// for `poll` or `join`.
	pub fn join_all(&self) {
		let mut reg = lock(&self.shared);
		while ! reg.active.is_empty() {
			reg = self.shared.1.wait(reg).unwrap_or_else(PoisonError::into_inner);
		}

		let handles: Vec<JoinHandle<()>> = reg.handles.drain().map(|(_, h)| h).collect();
		drop(reg);

		for h in handles { let _res = h.join(); }
	}

	#[must_use]
	/// # Drive Busy?
	///
	/// Returns `true` if the drive has an operation outstanding.
	pub fn is_busy(&self, drive: &Drive) -> bool { lock(&self.shared).has_drive(drive) }

	#[must_use]
	/// # Scanning?
	pub fn scanning(&self) -> bool { lock(&self.shared).scanning() }
}



/// # Check Drive.
///
/// Make sure a drive operation can be registered.
fn check_drive(reg: &Registry, drive: &Drive) -> Result<(), BurnError> {
	if reg.scanning() { Err(BurnError::ScanOutstanding) }
	else if reg.has_drive(drive) { Err(BurnError::DuplicateOperation) }
	else { Ok(()) }
}



/// # Finish.
///
/// This moves a worker's result into the registry when the worker ends,
/// however it ends.
struct Finish {
	shared: Shared,
	ticket: Ticket,
	drive: Option<Arc<Drive>>,
	res: Option<Result<Outcome, BurnError>>,
}

impl Drop for Finish {
	fn drop(&mut self) {
		let res = self.res.take().unwrap_or_else(|| {
			if let Some(d) = &self.drive { d.set_state(DriveStatus::Idle); }
			Err(BurnError::Bug("The worker thread panicked."))
		});

		let mut reg = lock(&self.shared);
		reg.active.remove(&self.ticket);
		reg.done.insert(self.ticket, res);
		drop(reg);
		self.shared.1.notify_all();
	}
}
