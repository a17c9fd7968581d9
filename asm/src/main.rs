#[macro_use]
extern crate clap;

use clap::Arg;
use std::fs;
use std::path::Path;
use std::process;

fn main() {
    let matches = app_from_crate!()
        .arg(
            Arg::with_name("INPUT")
                .required(true)
                .index(1)
                .help("Tinker assembly source (.tk)"),
        )
        .arg(
            Arg::with_name("OUTPUT")
                .required(true)
                .index(2)
                .help("Assembled image output (.tko)"),
        )
        .get_matches();

    let input_path = matches.value_of("INPUT").unwrap();
    let output_path = matches.value_of("OUTPUT").unwrap();

    if let Err(err) = run(input_path, output_path) {
        eprintln!("Error: {}", err);
        process::exit(1);
    }
}

fn run(input_path: &str, output_path: &str) -> Result<(), tinker_asm::AssembleError> {
    let source = fs::read_to_string(Path::new(input_path))?;
    let image = tinker_asm::assemble(&source)?;
    tinker_image::write_file(output_path, &image)?;
    Ok(())
}
