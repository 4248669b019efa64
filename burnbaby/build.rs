/*!
# Burn Baby Burn: Build
*/

use argyle::KeyWordsBuilder;
use std::path::PathBuf;



/// # Burner Keywords.
///
/// Compile the burner's switches and options into a keyword list for
/// argyle. The CLI parser `include!`s it from `OUT_DIR`.
fn main() {
	println!("cargo:rerun-if-env-changed=CARGO_PKG_VERSION");

	let mut builder = KeyWordsBuilder::default();
	builder.push_keys([
		// Write type and track format.
		"--audio",
		"--raw",
		"--sao",
		"--tao",

		// Burn settings.
		"--dummy",
		"--fill",
		"--multi",
		"--no-opc",
		"--no-pad",

		// Media and drive handling.
		"--blank",
		"--blank-fast",
		"--eject",
		"--scan",

		// Misc.
		"-h", "--help",
		"-v", "--verbose",
		"-V", "--version",
	]);

	// The device path and write speed (KB/s) take values.
	builder.push_keys_with_values([
		"-d", "--dev",
		"-s", "--speed",
	]);
	builder.save(out_path("argyle.rs"));
}

/// # Output Path.
///
/// Where the generated keyword file goes.
fn out_path(stub: &str) -> PathBuf {
	std::fs::canonicalize(std::env::var("OUT_DIR").expect("Missing OUT_DIR."))
		.expect("Missing OUT_DIR.")
		.join(stub)
}
