//! Reads and writes the `.tko` image format produced by `hw5-asm` and
//! consumed by `hw5-sim`.
//!
//! A `.tko` file is a fixed 40-byte header of five little-endian `u64`
//! fields — `file_type`, `code_begin`, `code_size`, `data_begin`,
//! `data_size` — followed by `code_size` bytes of instruction words and
//! `data_size` bytes of data doublewords. This crate only reads and writes
//! the bytes; it does not validate header semantics (fixed base addresses,
//! alignment, region overlap) — that belongs to the VM that loads the image.

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::fs::File;
use std::io::prelude::*;
use std::io::{BufReader, BufWriter};
use std::path::Path;


/// The parsed contents of a `.tko` file: header fields plus the raw code and
/// data byte payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TkoImage {
    pub file_type: u64,
    pub code_begin: u64,
    pub data_begin: u64,
    pub code: Vec<u8>,
    pub data: Vec<u8>,
}

impl TkoImage {
    pub fn new(code_begin: u64, data_begin: u64, code: Vec<u8>, data: Vec<u8>) -> TkoImage {
        TkoImage {
            file_type: 0,
            code_begin,
            data_begin,
            code,
            data,
        }
    }
}

pub fn read<R: Read>(reader: &mut R) -> std::io::Result<TkoImage> {
    let file_type = reader.read_u64::<LittleEndian>()?;
    let code_begin = reader.read_u64::<LittleEndian>()?;
    let code_size = reader.read_u64::<LittleEndian>()?;
    let data_begin = reader.read_u64::<LittleEndian>()?;
    let data_size = reader.read_u64::<LittleEndian>()?;

    let mut code = vec![0u8; code_size as usize];
    reader.read_exact(&mut code)?;

    let mut data = vec![0u8; data_size as usize];
    reader.read_exact(&mut data)?;

    Ok(TkoImage {
        file_type,
        code_begin,
        data_begin,
        code,
        data,
    })
}

pub fn write<W: Write>(writer: &mut W, image: &TkoImage) -> std::io::Result<()> {
    writer.write_u64::<LittleEndian>(image.file_type)?;
    writer.write_u64::<LittleEndian>(image.code_begin)?;
    writer.write_u64::<LittleEndian>(image.code.len() as u64)?;
    writer.write_u64::<LittleEndian>(image.data_begin)?;
    writer.write_u64::<LittleEndian>(image.data.len() as u64)?;
    writer.write_all(&image.code)?;
    writer.write_all(&image.data)?;
    Ok(())
}

pub trait ReadTkoExt: Read + Sized {
    fn read_tko(&mut self) -> std::io::Result<TkoImage> {
        read(self)
    }
}

impl<R: Read + Sized> ReadTkoExt for R {}

pub trait WriteTkoExt: Write + Sized {
    fn write_tko(&mut self, image: &TkoImage) -> std::io::Result<()> {
        write(self, image)
    }
}

impl<W: Write + Sized> WriteTkoExt for W {}

pub fn read_file<P: AsRef<Path>>(path: P) -> std::io::Result<TkoImage> {
    BufReader::new(File::open(path)?).read_tko()
}

pub fn write_file<P: AsRef<Path>>(path: P, image: &TkoImage) -> std::io::Result<()> {
    BufWriter::new(File::create(path)?).write_tko(image)
}
