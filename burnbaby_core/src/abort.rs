/*!
# Burn Baby Burn: Kill Switch
*/

use std::sync::{
	Arc,
	atomic::{
		AtomicBool,
		Ordering::{
			Acquire,
			Release,
		},
	},
};



#[derive(Debug, Clone, Default)]
/// # Kill Switch.
///
/// This is a short-circuit for long-running drive operations. Each drive
/// carries its own switch; any thread holding a clone can trip it, and the
/// worker doing the actual writing or erasing checks it between sectors.
///
/// Tripping the switch never interrupts a command already in flight, so a
/// cancelled burn still takes as long as its current command needs.
pub struct KillSwitch(Arc<AtomicBool>);

impl From<Arc<AtomicBool>> for KillSwitch {
	#[inline]
	fn from(src: Arc<AtomicBool>) -> Self { Self(src) }
}

impl KillSwitch {
	#[must_use]
	/// # New.
	pub fn new() -> Self { Self::default() }

	/// # Kill!
	pub fn kill(&self) { self.0.store(true, Release); }

	#[must_use]
	/// # Dead?
	pub fn killed(&self) -> bool { self.0.load(Acquire) }

	/// # Reset.
	///
	/// Clear the switch so the next operation can run.
	pub fn reset(&self) { self.0.store(false, Release); }

	/// # Set.
	pub(crate) fn set(&self, v: bool) { self.0.store(v, Release); }
}



#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn t_killswitch() {
		let ks = KillSwitch::new();
		let other = ks.clone();
		assert!(! ks.killed(), "New switches should be alive.");

		other.kill();
		assert!(ks.killed(), "Clones should share state.");

		ks.reset();
		assert!(! other.killed(), "Reset should carry over.");

		ks.set(true);
		assert!(other.killed());
	}
}
