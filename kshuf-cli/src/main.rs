//! `kshuf`: shuffle sequences while preserving k-let composition, and count
//! k-lets.
//!
//! ```bash
//! # Shuffle preserving dinucleotide counts
//! echo ACGTTGCAAGT | kshuf shuffle -k 2 -s 42
//!
//! # Count 3-lets of a large file in a single pass
//! kshuf count -k 3 -a ACGT -i chr1.txt -n
//!
//! # Save a table and generate from it
//! kshuf count -k 3 -i chr1.txt --save
//! kshuf generate -t chr1.bin -l 1000
//!
//! # 500 GC-rich random letters
//! kshuf seqgen -a ACGT -w 1,2,2,1 -l 500
//! ```

mod commands;

use clap::{Parser, Subcommand};
use kshuf_core::Method;
use std::path::PathBuf;

/// K-let preserving sequence shuffler.
///
/// All whitespace is removed from sequence input. Input defaults to stdin and
/// output to stdout.
#[derive(Parser, Debug)]
#[command(name = "kshuf")]
#[command(version, about, long_about = None)]
pub struct Cli {
	/// Log progress (debug level); RUST_LOG overrides
	#[arg(short, long, global = true)]
	pub verbose: bool,

	#[command(subcommand)]
	pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
	/// Shuffle a sequence
	Shuffle {
		/// Input file
		#[arg(short, long)]
		input: Option<PathBuf>,

		/// Output file
		#[arg(short, long)]
		output: Option<PathBuf>,

		/// K-let size
		#[arg(short, default_value_t = 1)]
		k: usize,

		/// RNG seed, defaults to the current time in seconds
		#[arg(short, long)]
		seed: Option<u64>,

		/// Shuffling method for k > 1: euler, markov or linear
		#[arg(short, long, default_value = "euler")]
		method: Method,
	},

	/// Count k-lets, printed as KLET<TAB>COUNT
	Count {
		/// Input file
		#[arg(short, long)]
		input: Option<PathBuf>,

		/// Output file
		#[arg(short, long)]
		output: Option<PathBuf>,

		/// K-let size
		#[arg(short, default_value_t = 1)]
		k: usize,

		/// Every letter of the sequence; enables single-pass streaming counting
		#[arg(short, long)]
		alphabet: Option<String>,

		/// Don't print k-lets with a count of zero
		#[arg(short, long)]
		nozero: bool,

		/// Also write the table (postcard) to this path; without a value the
		/// input path with a `.bin` extension is used
		#[arg(long, num_args = 0..=1)]
		save: Option<Option<PathBuf>>,
	},

	/// Count k-lets in sliding windows, printed as START STOP LET COUNT
	Countwin {
		/// Input file
		#[arg(short, long)]
		input: Option<PathBuf>,

		/// Output file
		#[arg(short, long)]
		output: Option<PathBuf>,

		/// Every letter of the sequence
		#[arg(short, long)]
		alphabet: String,

		/// K-let size
		#[arg(short, default_value_t = 1)]
		k: usize,

		/// Window size, defaults to k
		#[arg(short, long)]
		window: Option<usize>,

		/// Step size, defaults to the window size
		#[arg(short, long)]
		step: Option<usize>,

		/// Don't print rows whose count is zero
		#[arg(short, long)]
		nozero: bool,
	},

	/// Generate a sequence from a saved k-let table (Markov chain)
	Generate {
		/// Table written by `kshuf count --save`
		#[arg(short, long)]
		table: PathBuf,

		/// Output length
		#[arg(short, long)]
		length: usize,

		/// RNG seed, defaults to the current time in seconds
		#[arg(short, long)]
		seed: Option<u64>,

		/// Output file
		#[arg(short, long)]
		output: Option<PathBuf>,
	},

	/// Generate a random sequence from a set of letters
	Seqgen {
		/// Letters, one per character, or comma-separated for longer letters
		#[arg(short, long)]
		alphabet: String,

		/// Comma-separated letter weights in the same order; uniform if missing
		#[arg(short, long)]
		weights: Option<String>,

		/// Number of letters to draw
		#[arg(short, long)]
		length: usize,

		/// RNG seed, defaults to the current time in seconds
		#[arg(short, long)]
		seed: Option<u64>,

		/// Output file
		#[arg(short, long)]
		output: Option<PathBuf>,
	},
}

fn main() {
	let cli = Cli::parse();

	let level = if cli.verbose { "debug" } else { "warn" };
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

	if let Err(e) = commands::execute(cli.command) {
		log::error!("{}", e);
		std::process::exit(1);
	}
}
