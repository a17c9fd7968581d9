mod logic;

use crate::constants;
use crate::memory::Memory;
use std::error::Error as StdError;
use std::fmt;
use std::io::{BufRead, Write};

use self::logic::TickResult;

/// Why the VM stopped running.
///
/// `Halted` is the only success outcome; every other variant is a fault. The
/// CLI collapses all fault variants to the single diagnostic `Simulation
/// error`, but they are kept distinct here so tests can assert on the exact
/// failure.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ExitCode {
    Halted,
    IllegalInstruction,
    DivisionByZero,
    BadMemoryAccess,
    BadPrivOperation,
    BadStdinToken,
}

impl ExitCode {
    pub fn is_success(self) -> bool {
        self == ExitCode::Halted
    }
}

/// A malformed `.tko` image: wrong header fields, truncated payload, or
/// overlapping code/data regions.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum LoadError {
    WrongFileType,
    WrongCodeBase,
    WrongDataBase,
    MisalignedCodeSize,
    MisalignedDataSize,
    CodeExceedsMemory,
    DataExceedsMemory,
    RegionsOverlap,
    Truncated,
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let msg = match self {
            LoadError::WrongFileType => "wrong file_type",
            LoadError::WrongCodeBase => "wrong code_begin",
            LoadError::WrongDataBase => "wrong data_begin",
            LoadError::MisalignedCodeSize => "code_size is not a multiple of 4",
            LoadError::MisalignedDataSize => "data_size is not a multiple of 8",
            LoadError::CodeExceedsMemory => "code region exceeds memory",
            LoadError::DataExceedsMemory => "data region exceeds memory",
            LoadError::RegionsOverlap => "code and data regions overlap",
            LoadError::Truncated => "image file is truncated",
        };
        f.write_str(msg)
    }
}

impl StdError for LoadError {}

/// The Tinker virtual machine: 32 general-purpose 64-bit registers, a flat
/// 512 KiB memory, and a program counter.
pub struct Processor {
    registers: [u64; constants::REGISTER_COUNT],
    memory: Memory,
    pc: u64,
}

fn validate_header(
    file_type: u64,
    code_begin: u64,
    code_size: u64,
    data_begin: u64,
    data_size: u64,
) -> Result<(), LoadError> {
    if file_type != 0 {
        return Err(LoadError::WrongFileType);
    }
    if code_begin != constants::CODE_BEGIN {
        return Err(LoadError::WrongCodeBase);
    }
    if data_begin != constants::DATA_BEGIN {
        return Err(LoadError::WrongDataBase);
    }
    if code_size % constants::WORD_BYTES != 0 {
        return Err(LoadError::MisalignedCodeSize);
    }
    if data_size % constants::DWORD_BYTES != 0 {
        return Err(LoadError::MisalignedDataSize);
    }

    let code_end = code_begin
        .checked_add(code_size)
        .ok_or(LoadError::CodeExceedsMemory)?;
    if code_end > constants::MEMORY_SIZE {
        return Err(LoadError::CodeExceedsMemory);
    }

    let data_end = data_begin
        .checked_add(data_size)
        .ok_or(LoadError::DataExceedsMemory)?;
    if data_end > constants::MEMORY_SIZE {
        return Err(LoadError::DataExceedsMemory);
    }

    if code_size != 0 && data_size != 0 && code_begin < data_end && data_begin < code_end {
        return Err(LoadError::RegionsOverlap);
    }

    Ok(())
}

impl Processor {
    /// Constructs a VM with a zeroed memory array, `pc` at the code base,
    /// and `r31` initialised to `memory_size` (the stack-pointer
    /// convention).
    pub fn new() -> Processor {
        let mut registers = [0u64; constants::REGISTER_COUNT];
        registers[constants::STACK_POINTER] = constants::MEMORY_SIZE;
        Processor {
            registers,
            memory: Memory::new(),
            pc: constants::CODE_BEGIN,
        }
    }

    /// Validates a raw `.tko` header (already split into its five fields)
    /// and copies `code`/`data` bytes into memory at their fixed bases.
    pub fn load(
        &mut self,
        file_type: u64,
        code_begin: u64,
        data_begin: u64,
        code: &[u8],
        data: &[u8],
    ) -> Result<(), LoadError> {
        validate_header(
            file_type,
            code_begin,
            code.len() as u64,
            data_begin,
            data.len() as u64,
        )?;

        self.memory
            .load_bytes(code_begin, code)
            .map_err(|_| LoadError::CodeExceedsMemory)?;
        self.memory
            .load_bytes(data_begin, data)
            .map_err(|_| LoadError::DataExceedsMemory)?;

        self.pc = code_begin;
        Ok(())
    }

    pub fn register(&self, id: usize) -> u64 {
        self.registers[id]
    }

    pub fn set_register(&mut self, id: usize, value: u64) {
        self.registers[id] = value;
    }

    pub fn program_counter(&self) -> u64 {
        self.pc
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    /// Runs the fetch-decode-execute loop until halt or fault.
    pub fn run<R: BufRead, W: Write>(&mut self, stdin: &mut R, stdout: &mut W) -> ExitCode {
        loop {
            let word = match self.memory.read_word(self.pc) {
                Ok(word) => word,
                Err(_) => return ExitCode::BadMemoryAccess,
            };

            match logic::tick(&mut self.registers, &mut self.memory, self.pc, word, stdin, stdout)
            {
                TickResult::Next => self.pc = self.pc.wrapping_add(constants::WORD_BYTES),
                TickResult::Jump(target) => self.pc = target,
                TickResult::Stop(code) => return code,
            }
        }
    }
}

impl Default for Processor {
    fn default() -> Processor {
        Processor::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_processor_has_stack_pointer_at_top_of_memory() {
        let processor = Processor::new();
        assert_eq!(processor.register(constants::STACK_POINTER), constants::MEMORY_SIZE);
        assert_eq!(processor.program_counter(), constants::CODE_BEGIN);
    }

    #[test]
    fn load_rejects_wrong_file_type() {
        let mut processor = Processor::new();
        let err = processor
            .load(1, constants::CODE_BEGIN, constants::DATA_BEGIN, &[], &[])
            .unwrap_err();
        assert_eq!(err, LoadError::WrongFileType);
    }

    #[test]
    fn load_rejects_wrong_data_base() {
        let mut processor = Processor::new();
        let code = vec![0u8; 4];
        let data = vec![0u8; 8];
        let err = processor.load(0, 0x2000, 0x2000, &code, &data).unwrap_err();
        assert_eq!(err, LoadError::WrongDataBase);
    }

    #[test]
    fn validate_header_rejects_overlapping_regions() {
        // code runs [0x2000, 0x10008), just past the fixed data base at
        // 0x10000; code_begin/data_begin are otherwise both legal, so only
        // the overlap check can reject this.
        let err = validate_header(0, constants::CODE_BEGIN, 0xE008, constants::DATA_BEGIN, 8)
            .unwrap_err();
        assert_eq!(err, LoadError::RegionsOverlap);
    }

    #[test]
    fn load_accepts_empty_program() {
        let mut processor = Processor::new();
        processor
            .load(0, constants::CODE_BEGIN, constants::DATA_BEGIN, &[], &[])
            .unwrap();
    }
}
