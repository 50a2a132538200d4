//! Subcommand implementations.

use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufWriter, IsTerminal, Write};
use std::path::{Path, PathBuf};

use kshuf_core::io::{build_output_path, open_buffered, read_sequence, read_sequence_from};
use kshuf_core::klet::{WindowCounts, count_windows};
use kshuf_core::shuffle::{LetterSet, MarkovSampler, default_seed};
use kshuf_core::{Alphabet, KletTable, Method, Shuffler};
use log::debug;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::Commands;

type CliResult = Result<(), Box<dyn Error>>;

pub fn execute(command: Commands) -> CliResult {
	match command {
		Commands::Shuffle { input, output, k, seed, method } => cmd_shuffle(input, output, k, seed, method),
		Commands::Count { input, output, k, alphabet, nozero, save } => {
			cmd_count(input, output, k, alphabet, nozero, save)
		}
		Commands::Countwin { input, output, alphabet, k, window, step, nozero } => {
			cmd_countwin(input, output, &alphabet, k, window, step, nozero)
		}
		Commands::Generate { table, length, seed, output } => cmd_generate(&table, length, seed, output),
		Commands::Seqgen { alphabet, weights, length, seed, output } => {
			cmd_seqgen(&alphabet, weights.as_deref(), length, seed, output)
		}
	}
}

/// Reads the whole input sequence, refusing an interactive stdin.
fn read_input(input: Option<&Path>) -> Result<String, Box<dyn Error>> {
	match input {
		Some(path) => Ok(read_sequence(path)?),
		None => {
			let stdin = io::stdin();
			if stdin.is_terminal() {
				return Err("missing input: pass -i <file> or pipe a sequence".into());
			}
			Ok(read_sequence_from(stdin.lock())?)
		}
	}
}

fn open_output(output: Option<&Path>) -> io::Result<Box<dyn Write>> {
	Ok(match output {
		Some(path) => Box::new(BufWriter::new(File::create(path)?)),
		None => Box::new(BufWriter::new(io::stdout().lock())),
	})
}

fn cmd_shuffle(input: Option<PathBuf>, output: Option<PathBuf>, k: usize, seed: Option<u64>, method: Method) -> CliResult {
	let sequence = read_input(input.as_deref())?;
	let seed = seed.unwrap_or_else(default_seed);

	debug!("character count: {}", sequence.chars().count());
	debug!("k-let size: {}", k);
	debug!("RNG seed: {}", seed);
	if k > 1 {
		debug!("shuffling method: {}", method);
	}
	if log::log_enabled!(log::Level::Debug) {
		if let Ok(before) = KletTable::count(&sequence, 1) {
			debug!("letter counts before shuffling:\n{}", format_rows(&before, false));
		}
	}

	let shuffled = Shuffler::new(k, method).with_seed(seed).shuffle(&sequence)?;

	if log::log_enabled!(log::Level::Debug) {
		if let Ok(after) = KletTable::count(&shuffled, 1) {
			debug!("letter counts after shuffling:\n{}", format_rows(&after, false));
		}
	}

	let mut out = open_output(output.as_deref())?;
	writeln!(out, "{}", shuffled)?;
	out.flush()?;
	Ok(())
}

fn cmd_count(
	input: Option<PathBuf>,
	output: Option<PathBuf>,
	k: usize,
	alphabet: Option<String>,
	nozero: bool,
	save: Option<Option<PathBuf>>,
) -> CliResult {
	let save = match save {
		Some(Some(path)) => Some(path),
		Some(None) => match &input {
			Some(path) => Some(build_output_path(path, "bin")?),
			None => return Err("--save without a path needs -i <file>".into()),
		},
		None => None,
	};

	let table = match alphabet {
		// Only k symbols are held at a time.
		Some(letters) => {
			let alphabet = Alphabet::from_symbols(&letters)?;
			let reader: Box<dyn BufRead> = match &input {
				Some(path) => open_buffered(path)?,
				None => {
					if io::stdin().is_terminal() {
						return Err("missing input: pass -i <file> or pipe a sequence".into());
					}
					Box::new(io::stdin().lock())
				}
			};
			KletTable::count_reader(alphabet, k, reader)?
		}
		None => KletTable::count_parallel(&read_input(input.as_deref())?, k)?,
	};

	if let Some(path) = save {
		table.save(&path)?;
		debug!("table saved to {}", path.display());
	}

	let mut out = open_output(output.as_deref())?;
	out.write_all(format_rows(&table, nozero).as_bytes())?;
	out.flush()?;
	Ok(())
}

fn cmd_countwin(
	input: Option<PathBuf>,
	output: Option<PathBuf>,
	alphabet: &str,
	k: usize,
	window: Option<usize>,
	step: Option<usize>,
	nozero: bool,
) -> CliResult {
	let alphabet = Alphabet::from_symbols(alphabet)?;
	let sequence = read_input(input.as_deref())?;
	let symbols = alphabet.encode(&sequence)?;

	let window = window.unwrap_or(k);
	let step = step.unwrap_or(window);
	let rows = count_windows(&alphabet, &symbols, k, window, step)?;

	let mut out = open_output(output.as_deref())?;
	out.write_all(format_window_rows(&alphabet, k, &rows, nozero).as_bytes())?;
	out.flush()?;
	Ok(())
}

fn cmd_generate(table: &Path, length: usize, seed: Option<u64>, output: Option<PathBuf>) -> CliResult {
	let table = KletTable::load(table)?;
	let seed = seed.unwrap_or_else(default_seed);
	debug!("generating {} symbols from a {}-let table, seed {}", length, table.k(), seed);

	let sampler = MarkovSampler::new(table)?;
	let sequence = sampler.generate_string(length, &mut StdRng::seed_from_u64(seed))?;

	let mut out = open_output(output.as_deref())?;
	writeln!(out, "{}", sequence)?;
	out.flush()?;
	Ok(())
}

fn cmd_seqgen(letters: &str, weights: Option<&str>, length: usize, seed: Option<u64>, output: Option<PathBuf>) -> CliResult {
	if length == 0 {
		return Err("please ask for a sequence length above 0".into());
	}
	let set = LetterSet::parse(letters, weights)?;
	let seed = seed.unwrap_or_else(default_seed);
	debug!("drawing {} of {} letters, seed {}", length, set.letters().len(), seed);

	let sequence = set.generate(length, &mut StdRng::seed_from_u64(seed))?;

	let mut out = open_output(output.as_deref())?;
	writeln!(out, "{}", sequence)?;
	out.flush()?;
	Ok(())
}

/// `KLET\tCOUNT` lines in index order.
pub fn format_rows(table: &KletTable, nozero: bool) -> String {
	let mut out = String::new();
	for (label, count) in table.rows().filter(|(_, count)| *count > 0 || !nozero) {
		out += &format!("{}\t{}\n", label, count);
	}
	out
}

/// Header plus `START\tSTOP\tLET\tCOUNT` lines.
pub fn format_window_rows(alphabet: &Alphabet, k: usize, rows: &[WindowCounts], nozero: bool) -> String {
	let mut out = String::from("START\tSTOP\tLET\tCOUNT\n");
	for row in rows {
		for (id, &count) in row.counts.iter().enumerate() {
			if count > 0 || !nozero {
				out += &format!("{}\t{}\t{}\t{}\n", row.start, row.stop, alphabet.klet_label(id, k), count);
			}
		}
	}
	out
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn rows_skip_zeros_on_request() {
		let table = KletTable::count("AABABAB", 2).unwrap();
		assert_eq!(format_rows(&table, false), "AA\t1\nAB\t3\nBA\t2\nBB\t0\n");
		assert_eq!(format_rows(&table, true), "AA\t1\nAB\t3\nBA\t2\n");
	}

	#[test]
	fn window_rows_carry_coordinates() {
		let alphabet = Alphabet::from_symbols("AB").unwrap();
		let symbols = alphabet.encode("ABBA").unwrap();
		let rows = count_windows(&alphabet, &symbols, 1, 2, 2).unwrap();
		assert_eq!(
			format_window_rows(&alphabet, 1, &rows, true),
			"START\tSTOP\tLET\tCOUNT\n1\t2\tA\t1\n1\t2\tB\t1\n3\t4\tA\t1\n3\t4\tB\t1\n"
		);
	}

	#[test]
	fn shuffle_writes_to_file() {
		let dir = tempfile::tempdir().unwrap();
		let input = dir.path().join("seq.txt");
		let output = dir.path().join("out.txt");
		std::fs::write(&input, "AABA\nBAB\n").unwrap();

		cmd_shuffle(Some(input), Some(output.clone()), 2, Some(3), Method::Euler).unwrap();

		let shuffled = std::fs::read_to_string(output).unwrap();
		let shuffled = shuffled.trim_end();
		assert_eq!(KletTable::count(shuffled, 2).unwrap(), KletTable::count("AABABAB", 2).unwrap());
	}

	#[test]
	fn seqgen_writes_weighted_letters() {
		let dir = tempfile::tempdir().unwrap();
		let output = dir.path().join("rand.txt");
		cmd_seqgen("A,CC", Some("0,1"), 7, Some(9), Some(output.clone())).unwrap();
		assert_eq!(std::fs::read_to_string(output).unwrap(), format!("{}\n", "CC".repeat(7)));
		assert!(cmd_seqgen("AC", None, 0, Some(9), None).is_err());
	}

	#[test]
	fn generate_rejects_absurd_lengths() {
		let dir = tempfile::tempdir().unwrap();
		let table = dir.path().join("t.bin");
		KletTable::count("ACGTTGCA", 2).unwrap().save(&table).unwrap();
		assert!(cmd_generate(&table, usize::MAX, Some(1), Some(dir.path().join("out.txt"))).is_err());
	}

	#[test]
	fn saved_table_feeds_generate() {
		let dir = tempfile::tempdir().unwrap();
		let input = dir.path().join("seq.txt");
		let table = dir.path().join("seq.bin");
		let counts = dir.path().join("counts.tsv");
		let generated = dir.path().join("gen.txt");
		std::fs::write(&input, "ACGTACGGTCA").unwrap();

		cmd_count(Some(input), Some(counts), 2, None, true, Some(None)).unwrap();
		cmd_generate(&table, 25, Some(1), Some(generated.clone())).unwrap();

		assert_eq!(std::fs::read_to_string(generated).unwrap().trim_end().len(), 25);
	}
}
