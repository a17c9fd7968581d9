//! The Tinker virtual machine core: a flat 512 KiB memory, 32 general-purpose
//! 64-bit registers, and a fetch-decode-execute loop over the fixed 32-bit
//! instruction encoding shared with the `asm` and `image` crates.

extern crate num;
#[macro_use]
extern crate num_derive;

pub mod constants;
pub mod memory;
pub mod opcode;
pub mod processor;

pub use processor::{ExitCode, LoadError, Processor};
