#[macro_use]
extern crate clap;

use clap::Arg;
use std::io::{self, Write};
use std::path::Path;
use std::process;

use tinker_sim::SimError;

fn main() {
    let matches = app_from_crate!()
        .arg(
            Arg::with_name("IMAGE")
                .required(true)
                .index(1)
                .help("Assembled Tinker image (.tko)"),
        )
        .get_matches();

    let image_path = matches.value_of("IMAGE").unwrap();

    let stdin = io::stdin();
    let mut stdin_lock = stdin.lock();
    let stdout = io::stdout();
    let mut stdout_lock = io::BufWriter::new(stdout.lock());

    let result = tinker_sim::run_file(Path::new(image_path), &mut stdin_lock, &mut stdout_lock);
    stdout_lock.flush().ok();

    match result {
        Ok(exit_code) if exit_code.is_success() => process::exit(0),
        Ok(_) => {
            eprintln!("Simulation error");
            process::exit(1);
        }
        Err(SimError::Open(_)) => {
            eprintln!("Invalid tinker filepath");
            process::exit(1);
        }
        Err(SimError::Read(_)) | Err(SimError::Load(_)) => {
            eprintln!("Simulation error");
            process::exit(1);
        }
    }
}
