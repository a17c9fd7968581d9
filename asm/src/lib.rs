//! Assembles Tinker `.tk` source into a `.tko` image.
//!
//! Assembly is a three-pass pipeline over [`builder::build`]'s output:
//!
//! 1. [`builder::build`] walks the source line by line, expanding macros
//!    (`clr`, `halt`, `in`, `out`, `push`, `pop`, and `ld` with a literal)
//!    into plain instruction text, and recording `ld rd, :label` as a
//!    [`records::Record::DeferredLoad`] reserving 48 bytes up front.
//! 2. [`expand_deferred_loads`] turns every `DeferredLoad` into the same
//!    12-instruction load-64 sequence a literal `ld` would produce, now
//!    that every label in the file has a known address.
//! 3. [`encoder::encode_instruction`] turns each instruction's text into
//!    its final 32-bit word, and data records are resolved to their final
//!    little-endian bytes.

mod builder;
mod encoder;
mod error;
mod labels;
mod lexer;
mod macros;
mod numeric;
mod records;

pub use error::AssembleError;

use labels::SymbolTable;
use records::{DataValue, Record};
use tinker_image::TkoImage;
use tinker_vm::constants::{CODE_BEGIN, DATA_BEGIN};

pub fn assemble(source: &str) -> Result<TkoImage, AssembleError> {
    let assembled = builder::build(source)?;
    let code_records = expand_deferred_loads(assembled.code, &assembled.symbols)?;

    let mut code = Vec::with_capacity(code_records.len() * 4);
    for record in &code_records {
        match record {
            Record::Instruction { address, text } => {
                let word = encoder::encode_instruction(text, *address, &assembled.symbols)?;
                code.extend_from_slice(&word.to_le_bytes());
            }
            Record::DeferredLoad { .. } => {
                unreachable!("deferred loads are expanded before encoding")
            }
            Record::Data { .. } => unreachable!("data records never appear in the code stream"),
        }
    }

    let mut data = Vec::with_capacity(assembled.data.len() * 8);
    for record in &assembled.data {
        match record {
            Record::Data { value, .. } => {
                let resolved = match value {
                    DataValue::Literal(v) => *v,
                    DataValue::LabelRef(name) => assembled.symbols.resolve(name)?,
                };
                data.extend_from_slice(&resolved.to_le_bytes());
            }
            _ => unreachable!("only data records appear in the data stream"),
        }
    }

    Ok(TkoImage::new(CODE_BEGIN, DATA_BEGIN, code, data))
}

fn expand_deferred_loads(records: Vec<Record>, symbols: &SymbolTable) -> Result<Vec<Record>, AssembleError> {
    let mut expanded = Vec::with_capacity(records.len());
    for record in records {
        match record {
            Record::DeferredLoad { address, rd, label } => {
                let target = symbols.resolve(&label)?;
                let mut addr = address;
                for text in macros::load64(rd, target) {
                    expanded.push(Record::Instruction { address: addr, text });
                    addr += 4;
                }
            }
            other => expanded.push(other),
        }
    }
    Ok(expanded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assembles_a_minimal_program() {
        let image = assemble(".code\n\thalt\n").unwrap();
        assert_eq!(image.code.len(), 4);
        assert_eq!(image.data.len(), 0);
        assert_eq!(image.code_begin, CODE_BEGIN);
        assert_eq!(image.data_begin, DATA_BEGIN);
    }

    #[test]
    fn resolves_a_forward_deferred_load() {
        let source = ".code\n\tld r1, :value\n\thalt\n.data\n:value\n\t99\n";
        let image = assemble(source).unwrap();
        // xor/addi/shftli * 12 instructions + halt = 13 words.
        assert_eq!(image.code.len(), 13 * 4);
        assert_eq!(image.data, 99u64.to_le_bytes());
    }

    #[test]
    fn assembling_is_idempotent_on_its_own_reserialized_source() {
        let source = ".code\n\tin r1, r0\n\tout r1, r1\n\thalt\n";
        let first = assemble(source).unwrap();
        let second = assemble(source).unwrap();
        assert_eq!(first.code, second.code);
        assert_eq!(first.data, second.data);
    }

    #[test]
    fn unknown_mnemonic_is_reported() {
        let err = assemble(".code\n\tfrobnicate r1, r2, r3\n").unwrap_err();
        assert!(matches!(err, AssembleError::UnknownMnemonic(_)));
    }
}
