//! Thin glue between a `.tko` image on disk and [`tinker_vm::Processor`].
//!
//! Kept separate from `main.rs` so the load/run path can be exercised
//! without going through a subprocess.

use std::fs::File;
use std::io::{self, BufRead, Write};
use std::path::Path;

use tinker_vm::{ExitCode, LoadError, Processor};

/// Distinguishes "couldn't even open the file" from every other failure,
/// since the CLI prints a different message for each.
#[derive(Debug)]
pub enum SimError {
    Open(io::Error),
    Read(io::Error),
    Load(LoadError),
}

pub fn run_file<R: BufRead, W: Write>(
    path: &Path,
    stdin: &mut R,
    stdout: &mut W,
) -> Result<ExitCode, SimError> {
    let file = File::open(path).map_err(SimError::Open)?;
    let mut reader = io::BufReader::new(file);
    let image = tinker_image::read(&mut reader).map_err(SimError::Read)?;
    run_image(&image, stdin, stdout)
}

pub fn run_image<R: BufRead, W: Write>(
    image: &tinker_image::TkoImage,
    stdin: &mut R,
    stdout: &mut W,
) -> Result<ExitCode, SimError> {
    let mut processor = Processor::new();
    processor
        .load(image.file_type, image.code_begin, image.data_begin, &image.code, &image.data)
        .map_err(SimError::Load)?;
    Ok(processor.run(stdin, stdout))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn run_image_halts_on_a_trivial_program() {
        let image = tinker_asm::assemble(".code\n\thalt\n").unwrap();
        let mut stdin = Cursor::new(Vec::new());
        let mut stdout = Vec::new();
        let exit = run_image(&image, &mut stdin, &mut stdout).unwrap();
        assert_eq!(exit, ExitCode::Halted);
    }

    #[test]
    fn run_image_reports_a_load_error_for_a_bad_header() {
        let mut image = tinker_asm::assemble(".code\n\thalt\n").unwrap();
        image.code_begin = 0;
        let mut stdin = Cursor::new(Vec::new());
        let mut stdout = Vec::new();
        let err = run_image(&image, &mut stdin, &mut stdout).unwrap_err();
        assert!(matches!(err, SimError::Load(_)));
    }
}
