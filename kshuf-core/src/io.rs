use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::{env, fs, io};

/// Reads a whole sequence from any reader and drops every whitespace character.
///
/// Line breaks, spaces and tabs are all removed, so wrapped sequence files
/// come back as a single run of symbols.
pub fn read_sequence_from<R: Read>(mut reader: R) -> io::Result<String> {
	let mut contents = String::new();
	reader.read_to_string(&mut contents)?;
	Ok(strip_whitespace(&contents))
}

/// Reads a sequence file, see [`read_sequence_from`].
pub fn read_sequence<P: AsRef<Path>>(filename: P) -> io::Result<String> {
	read_sequence_from(File::open(filename)?)
}

/// Opens a file for line-by-line reading (streaming counters).
pub fn open_buffered<P: AsRef<Path>>(filename: P) -> io::Result<Box<dyn BufRead>> {
	Ok(Box::new(BufReader::new(File::open(filename)?)))
}

pub fn strip_whitespace(s: &str) -> String {
	s.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Path of the saved k-let table for a sequence file: same directory and
/// stem, extension swapped, e.g. `reads/sample.fa` with `"bin"` gives
/// `reads/sample.bin`.
///
/// # Errors
/// `InvalidInput` when the sequence path has no file name to keep.
pub fn build_output_path<P: AsRef<Path>>(sequence_path: P, extension: &str) -> io::Result<PathBuf> {
	let sequence_path = sequence_path.as_ref();
	if sequence_path.file_stem().is_none() {
		return Err(io::Error::new(io::ErrorKind::InvalidInput, "sequence path has no file name"));
	}
	Ok(sequence_path.with_extension(extension))
}

/// Resolves the table directory given to the server.
///
/// `.` becomes the working directory so it can be logged unambiguously;
/// anything else is kept verbatim.
pub fn normalize_folder(dir: &str) -> PathBuf {
	match dir {
		"." | "./" => env::current_dir().unwrap_or_else(|_| PathBuf::from(dir)),
		_ => PathBuf::from(dir),
	}
}

/// Lists the stems of all files with a given extension in a directory, sorted.
///
/// A table directory holding `sample.bin` and `notes.txt`, listed with `"bin"`, gives `["sample"]`.
pub fn list_files<P: AsRef<Path>>(dir: P, extension: &str) -> io::Result<Vec<String>> {
	let mut files = Vec::new();

	for entry in fs::read_dir(dir)? {
		let path = entry?.path();

		if path.is_file() && path.extension() == Some(std::ffi::OsStr::new(extension)) {
			if let Some(stem) = path.file_stem() {
				files.push(stem.to_string_lossy().to_string());
			}
		}
	}

	files.sort();
	Ok(files)
}
