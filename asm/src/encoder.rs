//! Turns one fully-expanded instruction's text into its 32-bit word. By the
//! time text reaches here every macro has already been expanded into plain
//! instructions, so this module only has to know the base instruction set.

use tinker_vm::opcode::{self, Opcode};

use crate::error::AssembleError;
use crate::labels::SymbolTable;
use crate::lexer::split_words;
use crate::numeric::{parse_i12, parse_register, parse_u12};

const IMM12_MIN: i64 = -2048;
const IMM12_MAX: i64 = 2047;

pub fn encode_instruction(text: &str, address: u64, symbols: &SymbolTable) -> Result<u32, AssembleError> {
    let words = split_words(text);
    let mnemonic = match words.first() {
        Some(first) => first.to_ascii_lowercase(),
        None => return Err(AssembleError::EmptyInstruction),
    };
    let operands = &words[1..];

    match mnemonic.as_str() {
        "and" => encode_r(Opcode::And, operands),
        "or" => encode_r(Opcode::Or, operands),
        "xor" => encode_r(Opcode::Xor, operands),
        "shftr" => encode_r(Opcode::Shftr, operands),
        "shftl" => encode_r(Opcode::Shftl, operands),
        "addf" => encode_r(Opcode::Addf, operands),
        "subf" => encode_r(Opcode::Subf, operands),
        "mulf" => encode_r(Opcode::Mulf, operands),
        "divf" => encode_r(Opcode::Divf, operands),
        "add" => encode_r(Opcode::Add, operands),
        "sub" => encode_r(Opcode::Sub, operands),
        "mul" => encode_r(Opcode::Mul, operands),
        "div" => encode_r(Opcode::Div, operands),
        "brgt" => encode_r(Opcode::Brgt, operands),
        "not" => encode_not(operands),
        "addi" => encode_i(Opcode::Addi, operands),
        "subi" => encode_i(Opcode::Subi, operands),
        "shftri" => encode_i(Opcode::Shftri, operands),
        "shftli" => encode_i(Opcode::Shftli, operands),
        "br" => encode_br(operands),
        "brr" => encode_brr(operands, address, symbols),
        "brnz" => encode_brnz(operands),
        "call" => encode_call(operands),
        "return" => encode_return(operands),
        "priv" => encode_priv(operands),
        "mov" => encode_mov(operands),
        other => Err(AssembleError::UnknownMnemonic(other.to_owned())),
    }
}

fn encode_r(op: Opcode, operands: &[&str]) -> Result<u32, AssembleError> {
    match operands {
        [rd, rs, rt] => Ok(opcode::pack(
            op,
            parse_register(rd)?,
            parse_register(rs)?,
            parse_register(rt)?,
            0,
        )),
        _ => Err(AssembleError::WrongOperandCount { expected: 3, found: operands.len() }),
    }
}

fn encode_not(operands: &[&str]) -> Result<u32, AssembleError> {
    match operands {
        [rd, rs] => Ok(opcode::pack(Opcode::Not, parse_register(rd)?, parse_register(rs)?, 0, 0)),
        _ => Err(AssembleError::WrongOperandCount { expected: 2, found: operands.len() }),
    }
}

fn encode_i(op: Opcode, operands: &[&str]) -> Result<u32, AssembleError> {
    match operands {
        [rd, imm] => Ok(opcode::pack(op, parse_register(rd)?, 0, 0, parse_u12(imm)?)),
        _ => Err(AssembleError::WrongOperandCount { expected: 2, found: operands.len() }),
    }
}

fn encode_br(operands: &[&str]) -> Result<u32, AssembleError> {
    match operands {
        [rd] => Ok(opcode::pack(Opcode::Br, parse_register(rd)?, 0, 0, 0)),
        _ => Err(AssembleError::WrongOperandCount { expected: 1, found: operands.len() }),
    }
}

fn encode_brnz(operands: &[&str]) -> Result<u32, AssembleError> {
    match operands {
        [rd, rs] => Ok(opcode::pack(Opcode::Brnz, parse_register(rd)?, parse_register(rs)?, 0, 0)),
        _ => Err(AssembleError::WrongOperandCount { expected: 2, found: operands.len() }),
    }
}

fn encode_call(operands: &[&str]) -> Result<u32, AssembleError> {
    match operands {
        [rd] => Ok(opcode::pack(Opcode::Call, parse_register(rd)?, 0, 0, 0)),
        _ => Err(AssembleError::WrongOperandCount { expected: 1, found: operands.len() }),
    }
}

fn encode_return(operands: &[&str]) -> Result<u32, AssembleError> {
    match operands {
        [] => Ok(opcode::pack(Opcode::Return, 0, 0, 0, 0)),
        _ => Err(AssembleError::WrongOperandCount { expected: 0, found: operands.len() }),
    }
}

fn encode_priv(operands: &[&str]) -> Result<u32, AssembleError> {
    match operands {
        [rd, rs, rt, imm] => Ok(opcode::pack(
            Opcode::Priv,
            parse_register(rd)?,
            parse_register(rs)?,
            parse_register(rt)?,
            parse_u12(imm)?,
        )),
        _ => Err(AssembleError::WrongOperandCount { expected: 4, found: operands.len() }),
    }
}

/// `brr` takes exactly one operand, which is either a register (relative
/// jump by the register's value), a `:label`/`@label` (relative jump to
/// that label, range-checked against the signed 12-bit field at assemble
/// time), or a bare signed immediate.
fn encode_brr(operands: &[&str], address: u64, symbols: &SymbolTable) -> Result<u32, AssembleError> {
    let operand = match operands {
        [operand] => *operand,
        _ => return Err(AssembleError::WrongOperandCount { expected: 1, found: operands.len() }),
    };

    if let Ok(rd) = parse_register(operand) {
        return Ok(opcode::pack(Opcode::BrrReg, rd, 0, 0, 0));
    }

    if let Some(name) = operand.strip_prefix(':').or_else(|| operand.strip_prefix('@')) {
        if !name.is_empty() {
            let target = symbols.resolve(name)?;
            let delta = target as i64 - address as i64;
            if !(IMM12_MIN..=IMM12_MAX).contains(&delta) {
                return Err(AssembleError::BranchOutOfRange { label: name.to_owned(), delta });
            }
            return Ok(opcode::pack(Opcode::BrrImm, 0, 0, 0, (delta as i32 as u32) & 0xFFF));
        }
    }

    let imm = parse_i12(operand)?;
    Ok(opcode::pack(Opcode::BrrImm, 0, 0, 0, (imm as u32) & 0xFFF))
}

/// `mov` has four forms, distinguished by which side (if either) is a
/// parenthesized memory operand: store, load, register-to-register, or
/// immediate-to-low-12-bits.
fn encode_mov(operands: &[&str]) -> Result<u32, AssembleError> {
    let (left, right) = match operands {
        [l, r] => (*l, *r),
        _ => return Err(AssembleError::WrongOperandCount { expected: 2, found: operands.len() }),
    };

    if left.starts_with('(') {
        let (base, imm) = parse_mem_operand(left)?;
        let src = parse_register(right)?;
        return Ok(opcode::pack(Opcode::MovStore, base, src, 0, (imm as u32) & 0xFFF));
    }

    if right.starts_with('(') {
        let dst = parse_register(left)?;
        let (base, imm) = parse_mem_operand(right)?;
        return Ok(opcode::pack(Opcode::MovLoad, dst, base, 0, (imm as u32) & 0xFFF));
    }

    let dst = parse_register(left)?;
    if let Ok(src) = parse_register(right) {
        return Ok(opcode::pack(Opcode::MovReg, dst, src, 0, 0));
    }

    let imm = parse_u12(right)?;
    Ok(opcode::pack(Opcode::MovImm, dst, 0, 0, imm))
}

/// Parses `(rBASE)(IMM)`, requiring `IMM` to be a multiple of 8. The
/// legacy unparenthesized `rX+imm` spelling is deliberately not accepted.
fn parse_mem_operand(token: &str) -> Result<(u32, i32), AssembleError> {
    let malformed = || AssembleError::MalformedMemoryOperand(token.to_owned());

    let rest = token.strip_prefix('(').ok_or_else(malformed)?;
    let (reg_part, rest) = rest.split_once(')').ok_or_else(malformed)?;
    let rest = rest.strip_prefix('(').ok_or_else(malformed)?;
    let (imm_part, trailing) = rest.split_once(')').ok_or_else(malformed)?;

    if !trailing.is_empty() || reg_part.is_empty() || imm_part.is_empty() {
        return Err(malformed());
    }

    let base = parse_register(reg_part)?;
    let imm = parse_i12(imm_part)?;
    if imm % 8 != 0 {
        return Err(AssembleError::UnalignedMemoryOffset(imm));
    }
    Ok((base, imm))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symbols() -> SymbolTable {
        SymbolTable::new()
    }

    #[test]
    fn encodes_a_simple_r_type_instruction() {
        let word = encode_instruction("add r3, r1, r2", 0x2000, &symbols()).unwrap();
        assert_eq!(word, opcode::pack(Opcode::Add, 3, 1, 2, 0));
    }

    #[test]
    fn mov_store_requires_an_eight_aligned_offset() {
        assert!(encode_instruction("mov (r31)(-8), r2", 0x2000, &symbols()).is_ok());
        assert!(encode_instruction("mov (r31)(-3), r2", 0x2000, &symbols()).is_err());
    }

    #[test]
    fn mov_immediate_form_is_distinguished_from_register_form() {
        let word = encode_instruction("mov r1, 10", 0x2000, &symbols()).unwrap();
        assert_eq!(word, opcode::pack(Opcode::MovImm, 1, 0, 0, 10));

        let word = encode_instruction("mov r1, r2", 0x2000, &symbols()).unwrap();
        assert_eq!(word, opcode::pack(Opcode::MovReg, 1, 2, 0, 0));
    }

    #[test]
    fn brr_label_is_encoded_pc_relative() {
        let mut symbols = symbols();
        symbols.define("top", 0x2000).unwrap();
        let word = encode_instruction("brr :top", 0x2010, &symbols).unwrap();
        let fields = tinker_vm::opcode::Fields::decode(word);
        assert_eq!(fields.imm12_signed(), 0x2000i64 - 0x2010i64);
    }

    #[test]
    fn brr_out_of_range_label_is_rejected() {
        let mut symbols = symbols();
        symbols.define("far", 0x2000 + 4096).unwrap();
        assert!(encode_instruction("brr :far", 0x2000, &symbols).is_err());
    }

    #[test]
    fn legacy_unparenthesized_memory_operand_is_rejected() {
        assert!(encode_instruction("mov r1, r2+8", 0x2000, &symbols()).is_err());
    }
}
