use std::io::{BufRead, Read, Write};

use num_traits::FromPrimitive;

use crate::constants;
use crate::memory::Memory;
use crate::opcode::{Fields, Opcode};
use crate::processor::ExitCode;

pub enum TickResult {
    Next,
    Jump(u64),
    Stop(ExitCode),
}

fn bad_memory() -> TickResult {
    TickResult::Stop(ExitCode::BadMemoryAccess)
}

/// Reads one whitespace-delimited token from `stdin` and parses it as an
/// unsigned base-10 integer, rejecting a leading sign or any non-digit
/// character — the "strict" stdin convention of `priv rd, rs, r0, 3`.
fn read_stdin_u64<R: BufRead>(stdin: &mut R) -> Option<u64> {
    let mut bytes = stdin.bytes();
    let mut token = Vec::new();

    let first = loop {
        match bytes.next() {
            Some(Ok(b)) if (b as char).is_whitespace() => continue,
            Some(Ok(b)) => break b,
            _ => return None,
        }
    };
    token.push(first);

    loop {
        match bytes.next() {
            Some(Ok(b)) if (b as char).is_whitespace() => break,
            Some(Ok(b)) => token.push(b),
            _ => break,
        }
    }

    let text = std::str::from_utf8(&token).ok()?;
    if text.is_empty() || !text.bytes().all(|c| c.is_ascii_digit()) {
        return None;
    }
    text.parse::<u64>().ok()
}

#[allow(clippy::too_many_arguments)]
pub fn tick<R: BufRead, W: Write>(
    registers: &mut [u64; constants::REGISTER_COUNT],
    memory: &mut Memory,
    pc: u64,
    word: u32,
    stdin: &mut R,
    stdout: &mut W,
) -> TickResult {
    let fields = Fields::decode(word);
    let opcode = match Opcode::from_u32(fields.opcode) {
        Some(opcode) => opcode,
        None => return TickResult::Stop(ExitCode::IllegalInstruction),
    };

    let rd = fields.rd as usize;
    let rs = fields.rs as usize;
    let rt = fields.rt as usize;
    let imm_signed = fields.imm12_signed();
    let imm_raw = fields.imm12 as u64;

    match opcode {
        Opcode::And => registers[rd] = registers[rs] & registers[rt],
        Opcode::Or => registers[rd] = registers[rs] | registers[rt],
        Opcode::Xor => registers[rd] = registers[rs] ^ registers[rt],
        Opcode::Not => registers[rd] = !registers[rs],

        Opcode::Shftr => registers[rd] = registers[rs] >> (registers[rt] & 63),
        Opcode::Shftri => registers[rd] >>= imm_raw & 63,
        Opcode::Shftl => registers[rd] = registers[rs] << (registers[rt] & 63),
        Opcode::Shftli => registers[rd] <<= imm_raw & 63,

        Opcode::Br => return TickResult::Jump(registers[rd]),
        Opcode::BrrReg => return TickResult::Jump(pc.wrapping_add(registers[rd])),
        Opcode::BrrImm => return TickResult::Jump(pc.wrapping_add(imm_signed as u64)),
        Opcode::Brnz => {
            if registers[rs] != 0 {
                return TickResult::Jump(registers[rd]);
            }
        }
        Opcode::Call => {
            let slot = registers[constants::STACK_POINTER].wrapping_sub(8);
            if memory.write_dword(slot, pc.wrapping_add(4)).is_err() {
                return bad_memory();
            }
            return TickResult::Jump(registers[rd]);
        }
        Opcode::Return => {
            let slot = registers[constants::STACK_POINTER].wrapping_sub(8);
            match memory.read_dword(slot) {
                Ok(target) => return TickResult::Jump(target),
                Err(_) => return bad_memory(),
            }
        }
        Opcode::Brgt => {
            if (registers[rs] as i64) > (registers[rt] as i64) {
                return TickResult::Jump(registers[rd]);
            }
        }

        Opcode::Priv => return priv_op(registers, rd, rs, imm_raw, stdin, stdout),

        Opcode::MovLoad => {
            let address = registers[rs].wrapping_add(imm_signed as u64);
            match memory.read_dword(address) {
                Ok(value) => registers[rd] = value,
                Err(_) => return bad_memory(),
            }
        }
        Opcode::MovReg => registers[rd] = registers[rs],
        Opcode::MovImm => registers[rd] = (registers[rd] & !0xFFF) | (imm_raw & 0xFFF),
        Opcode::MovStore => {
            let address = registers[rd].wrapping_add(imm_signed as u64);
            if memory.write_dword(address, registers[rs]).is_err() {
                return bad_memory();
            }
        }

        Opcode::Addf => registers[rd] = (f64::from_bits(registers[rs]) + f64::from_bits(registers[rt])).to_bits(),
        Opcode::Subf => registers[rd] = (f64::from_bits(registers[rs]) - f64::from_bits(registers[rt])).to_bits(),
        Opcode::Mulf => registers[rd] = (f64::from_bits(registers[rs]) * f64::from_bits(registers[rt])).to_bits(),
        Opcode::Divf => {
            let divisor = f64::from_bits(registers[rt]);
            if divisor == 0.0 {
                return TickResult::Stop(ExitCode::DivisionByZero);
            }
            registers[rd] = (f64::from_bits(registers[rs]) / divisor).to_bits();
        }

        Opcode::Add => registers[rd] = (registers[rs] as i64).wrapping_add(registers[rt] as i64) as u64,
        Opcode::Sub => registers[rd] = (registers[rs] as i64).wrapping_sub(registers[rt] as i64) as u64,
        Opcode::Mul => registers[rd] = (registers[rs] as i64).wrapping_mul(registers[rt] as i64) as u64,
        Opcode::Div => {
            if registers[rt] == 0 {
                return TickResult::Stop(ExitCode::DivisionByZero);
            }
            registers[rd] = ((registers[rs] as i64).wrapping_div(registers[rt] as i64)) as u64;
        }

        Opcode::Addi => registers[rd] = registers[rd].wrapping_add(imm_raw),
        Opcode::Subi => registers[rd] = registers[rd].wrapping_sub(imm_raw),
    }

    TickResult::Next
}

fn priv_op<R: BufRead, W: Write>(
    registers: &mut [u64; constants::REGISTER_COUNT],
    rd: usize,
    rs: usize,
    imm: u64,
    stdin: &mut R,
    stdout: &mut W,
) -> TickResult {
    match imm {
        0 => TickResult::Stop(ExitCode::Halted),
        3 => {
            if registers[rs] == 0 {
                match read_stdin_u64(stdin) {
                    Some(value) => registers[rd] = value,
                    None => return TickResult::Stop(ExitCode::BadStdinToken),
                }
            }
            TickResult::Next
        }
        4 => {
            match registers[rd] {
                1 => {
                    if write!(stdout, "{}\n", registers[rs]).is_err() {
                        return TickResult::Stop(ExitCode::BadMemoryAccess);
                    }
                }
                3 => {
                    let byte = [registers[rs] as u8];
                    if stdout.write_all(&byte).is_err() {
                        return TickResult::Stop(ExitCode::BadMemoryAccess);
                    }
                }
                _ => {}
            }
            TickResult::Next
        }
        _ => TickResult::Stop(ExitCode::BadPrivOperation),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn run_one(word: u32, registers: &mut [u64; constants::REGISTER_COUNT]) -> TickResult {
        let mut memory = Memory::new();
        let mut stdin = Cursor::new(Vec::new());
        let mut stdout = Vec::new();
        tick(registers, &mut memory, constants::CODE_BEGIN, word, &mut stdin, &mut stdout)
    }

    #[test]
    fn add_wraps_on_overflow() {
        let mut registers = [0u64; constants::REGISTER_COUNT];
        registers[1] = i64::MAX as u64;
        registers[2] = 1;
        let word = crate::opcode::pack(Opcode::Add, 3, 1, 2, 0);
        run_one(word, &mut registers);
        assert_eq!(registers[3] as i64, i64::MIN);
    }

    #[test]
    fn div_by_zero_faults() {
        let mut registers = [0u64; constants::REGISTER_COUNT];
        registers[1] = 10;
        registers[2] = 0;
        let word = crate::opcode::pack(Opcode::Div, 3, 1, 2, 0);
        match run_one(word, &mut registers) {
            TickResult::Stop(ExitCode::DivisionByZero) => {}
            _ => panic!("expected division-by-zero fault"),
        }
    }

    #[test]
    fn addi_is_in_place_and_unsigned() {
        let mut registers = [0u64; constants::REGISTER_COUNT];
        registers[5] = 10;
        let word = crate::opcode::pack(Opcode::Addi, 5, 0, 0, 7);
        run_one(word, &mut registers);
        assert_eq!(registers[5], 17);
    }

    #[test]
    fn mov_imm_preserves_high_bits() {
        let mut registers = [0u64; constants::REGISTER_COUNT];
        registers[2] = 0xFFFF_FFFF_FFFF_F000;
        let word = crate::opcode::pack(Opcode::MovImm, 2, 0, 0, 0x0AB);
        run_one(word, &mut registers);
        assert_eq!(registers[2], 0xFFFF_FFFF_FFFF_F0AB);
    }

    #[test]
    fn brr_imm_is_pc_relative_not_pc_plus_4() {
        let mut registers = [0u64; constants::REGISTER_COUNT];
        let word = crate::opcode::pack(Opcode::BrrImm, 0, 0, 0, 0x004);
        match run_one(word, &mut registers) {
            TickResult::Jump(target) => assert_eq!(target, constants::CODE_BEGIN + 4),
            _ => panic!("expected a jump"),
        }
    }

    #[test]
    fn call_does_not_modify_stack_pointer() {
        let mut registers = [0u64; constants::REGISTER_COUNT];
        registers[constants::STACK_POINTER] = constants::MEMORY_SIZE;
        registers[4] = 0x2100;
        let word = crate::opcode::pack(Opcode::Call, 4, 0, 0, 0);
        let sp_before = registers[constants::STACK_POINTER];
        match run_one(word, &mut registers) {
            TickResult::Jump(target) => assert_eq!(target, 0x2100),
            _ => panic!("expected a jump"),
        }
        assert_eq!(registers[constants::STACK_POINTER], sp_before);
    }

    #[test]
    fn priv_output_port_one_writes_decimal_line() {
        let mut registers = [0u64; constants::REGISTER_COUNT];
        registers[1] = 1; // port selector in rd
        registers[2] = 42; // value in rs
        let mut memory = Memory::new();
        let mut stdin = Cursor::new(Vec::new());
        let mut stdout = Vec::new();
        let word = crate::opcode::pack(Opcode::Priv, 1, 2, 0, 4);
        tick(&mut registers, &mut memory, constants::CODE_BEGIN, word, &mut stdin, &mut stdout);
        assert_eq!(stdout, b"42\n");
    }

    #[test]
    fn priv_input_rejects_signed_token() {
        let mut registers = [0u64; constants::REGISTER_COUNT];
        registers[2] = 0; // port selector in rs, must be 0
        let mut memory = Memory::new();
        let mut stdin = Cursor::new(b"-5\n".to_vec());
        let mut stdout = Vec::new();
        let word = crate::opcode::pack(Opcode::Priv, 1, 2, 0, 3);
        match tick(&mut registers, &mut memory, constants::CODE_BEGIN, word, &mut stdin, &mut stdout) {
            TickResult::Stop(ExitCode::BadStdinToken) => {}
            _ => panic!("expected bad stdin token fault"),
        }
    }
}
