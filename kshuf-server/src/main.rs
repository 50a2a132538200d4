use std::path::PathBuf;
use std::sync::Mutex;

use actix_web::{App, HttpResponse, HttpServer, Responder, get, put, web};

use kshuf_core::io::{list_files, normalize_folder};
use kshuf_core::shuffle::{MarkovSampler, default_seed};
use kshuf_core::{Alphabet, KletTable, Method, ShuffleError, Shuffler};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Deserialize;

/// Largest k-let table a single request may build.
const MAX_REQUEST_TABLE: usize = 1 << 20;

/// Longest sequence a single request may generate.
const MAX_REQUEST_LENGTH: usize = 1 << 20;

/// Query parameters for the `/v1/shuffle` endpoint
#[derive(Deserialize)]
struct ShuffleParams {
	sequence: String,
	k: Option<usize>,
	method: Option<Method>,
	seed: Option<u64>,
}

/// Query parameters for the `/v1/count` endpoint
#[derive(Deserialize)]
struct CountParams {
	sequence: String,
	k: Option<usize>,
	nozero: Option<bool>,
}

/// Query parameters for the `/v1/generate` endpoint
#[derive(Deserialize)]
struct GenerateParams {
	length: usize,
	seed: Option<u64>,
}

#[derive(Deserialize)]
struct TableQuery {
	name: Option<String>,
}

struct SharedData {
	data_dir: PathBuf,
	sampler: Option<MarkovSampler>,
}

/// Input problems are the caller's fault, everything else is ours.
fn error_response(e: ShuffleError) -> HttpResponse {
	if e.is_input_error() {
		HttpResponse::BadRequest().body(e.to_string())
	} else {
		log::error!("{}", e);
		HttpResponse::InternalServerError().body(e.to_string())
	}
}

/// Rejects requests whose k-let table would exceed [`MAX_REQUEST_TABLE`].
fn check_table_size(sequence: &str, k: usize) -> Result<(), ShuffleError> {
	let alphabet = Alphabet::from_sequence(sequence)?;
	match alphabet.klet_space(k)? {
		n if n > MAX_REQUEST_TABLE => Err(ShuffleError::TableTooLarge { alphabet: alphabet.len(), k }),
		_ => Ok(()),
	}
}

/// Shuffles the given sequence; whitespace in it is ignored.
#[get("/v1/shuffle")]
async fn get_shuffled(query: web::Query<ShuffleParams>) -> impl Responder {
	let sequence = kshuf_core::io::strip_whitespace(&query.sequence);
	let k = query.k.unwrap_or(1);
	let method = query.method.unwrap_or_default();
	let seed = query.seed.unwrap_or_else(default_seed);

	if let Err(e) = check_table_size(&sequence, k) {
		return error_response(e);
	}
	match Shuffler::new(k, method).with_seed(seed).shuffle(&sequence) {
		Ok(result) => HttpResponse::Ok().body(result),
		Err(e) => error_response(e),
	}
}

/// Returns `KLET\tCOUNT` lines.
#[get("/v1/count")]
async fn get_counts(query: web::Query<CountParams>) -> impl Responder {
	let sequence = kshuf_core::io::strip_whitespace(&query.sequence);
	let nozero = query.nozero.unwrap_or(false);
	let k = query.k.unwrap_or(1);

	if let Err(e) = check_table_size(&sequence, k) {
		return error_response(e);
	}
	let table = match KletTable::count(&sequence, k) {
		Ok(t) => t,
		Err(e) => return error_response(e),
	};

	let body: String = table
		.rows()
		.filter(|(_, count)| *count > 0 || !nozero)
		.map(|(label, count)| format!("{}\t{}\n", label, count))
		.collect();
	HttpResponse::Ok().body(body)
}

#[get("/v1/tables")]
async fn get_tables(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	let data_dir = match data.lock() {
		Ok(m) => m.data_dir.clone(),
		Err(_) => return HttpResponse::InternalServerError().body("Table lock failed"),
	};
	match list_files(&data_dir, "bin") {
		Ok(files) => HttpResponse::Ok().body(files.join("\n")),
		Err(_) => HttpResponse::InternalServerError().body("Failed to list tables"),
	}
}

#[put("/v1/load_table")]
async fn put_table(data: web::Data<Mutex<SharedData>>, query: web::Query<TableQuery>) -> impl Responder {
	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Table lock failed"),
	};

	let name = match &query.name {
		Some(s) if !s.trim().is_empty() => s.trim(),
		_ => return HttpResponse::BadRequest().body("Missing or empty table name"),
	};
	if name.contains(['/', '\\']) || name.contains("..") {
		return HttpResponse::BadRequest().body("Table name must be a plain file stem");
	}

	let path = shared_data.data_dir.join(format!("{}.bin", name));
	match KletTable::load(&path).and_then(MarkovSampler::new) {
		Ok(sampler) => {
			log::info!("loaded {}-let table '{}'", sampler.k(), name);
			shared_data.sampler = Some(sampler);
			HttpResponse::Ok().body("Table loaded successfully")
		}
		Err(e) => error_response(e),
	}
}

/// Generates a sequence from the loaded table with the Markov sampler.
#[get("/v1/generate")]
async fn get_generated(data: web::Data<Mutex<SharedData>>, query: web::Query<GenerateParams>) -> impl Responder {
	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Table lock failed"),
	};
	let sampler = match &shared_data.sampler {
		Some(s) => s,
		None => return HttpResponse::BadRequest().body("No table loaded"),
	};
	if query.length > MAX_REQUEST_LENGTH {
		return error_response(ShuffleError::LengthTooLarge { length: query.length, limit: MAX_REQUEST_LENGTH });
	}

	let mut rng = StdRng::seed_from_u64(query.seed.unwrap_or_else(default_seed));
	match sampler.generate_string(query.length, &mut rng) {
		Ok(result) => HttpResponse::Ok().body(result),
		Err(e) => error_response(e),
	}
}

fn configure(cfg: &mut web::ServiceConfig) {
	cfg.service(get_shuffled)
		.service(get_counts)
		.service(get_tables)
		.service(put_table)
		.service(get_generated);
}

/// Main entry point for the server.
///
/// # Notes
/// - Binds to `KSHUF_BIND`, default 127.0.0.1:5000.
/// - Tables are read from `KSHUF_DATA`, default `./data`.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

	let bind = std::env::var("KSHUF_BIND").unwrap_or_else(|_| "127.0.0.1:5000".to_owned());
	let data_dir = normalize_folder(&std::env::var("KSHUF_DATA").unwrap_or_else(|_| "./data".to_owned()));
	log::info!("serving tables from {} on {}", data_dir.display(), bind);

	let shared_data = web::Data::new(Mutex::new(SharedData { data_dir, sampler: None }));

	HttpServer::new(move || App::new().app_data(shared_data.clone()).configure(configure))
		.bind(bind)?
		.run()
		.await
}
