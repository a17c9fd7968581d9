//! Pass 1 of the assembler: walks the source line by line, expanding
//! pseudo-instructions as it goes, and produces a flat list of code/data
//! records plus the (possibly still-incomplete) symbol table. Deferred
//! `ld rd, :label` loads and data-section label references are resolved
//! by later passes in `lib.rs`.

use crate::error::AssembleError;
use crate::labels::{PendingLabels, SymbolTable};
use crate::lexer::{self, Line, Section};
use crate::macros;
use crate::numeric::{parse_register, parse_u64};
use crate::records::{DataValue, Record};
use tinker_vm::constants::{CODE_BEGIN, DATA_BEGIN};

const CODE_WORD_BYTES: u64 = 4;
const DATA_WORD_BYTES: u64 = 8;
const LOAD64_BYTES: u64 = 48;

fn comma_count_for(mnemonic: &str) -> usize {
    match mnemonic {
        "halt" | "br" | "brr" | "call" | "return" | "clr" | "push" | "pop" => 0,
        "not" | "addi" | "subi" | "shftri" | "shftli" | "brnz" | "mov" | "in" | "out" | "ld" => 1,
        "priv" => 3,
        _ => 2,
    }
}

pub struct Assembled {
    pub code: Vec<Record>,
    pub data: Vec<Record>,
    pub symbols: SymbolTable,
}

struct Builder {
    section: Option<Section>,
    code_pc: u64,
    data_pc: u64,
    pending: PendingLabels,
    symbols: SymbolTable,
    code: Vec<Record>,
    data: Vec<Record>,
    saw_code: bool,
}

impl Builder {
    fn new() -> Builder {
        Builder {
            section: None,
            code_pc: CODE_BEGIN,
            data_pc: DATA_BEGIN,
            pending: PendingLabels::new(),
            symbols: SymbolTable::new(),
            code: Vec::new(),
            data: Vec::new(),
            saw_code: false,
        }
    }

    fn push_instruction(&mut self, text: String) -> Result<(), AssembleError> {
        self.pending.attach(self.code_pc, &mut self.symbols)?;
        self.code.push(Record::Instruction { address: self.code_pc, text });
        self.code_pc += CODE_WORD_BYTES;
        Ok(())
    }

    fn push_deferred_load(&mut self, rd: u32, label: String) -> Result<(), AssembleError> {
        self.pending.attach(self.code_pc, &mut self.symbols)?;
        self.code.push(Record::DeferredLoad { address: self.code_pc, rd, label });
        self.code_pc += LOAD64_BYTES;
        Ok(())
    }

    fn push_data_literal(&mut self, value: u64) -> Result<(), AssembleError> {
        self.pending.attach(self.data_pc, &mut self.symbols)?;
        self.data.push(Record::Data { address: self.data_pc, value: DataValue::Literal(value) });
        self.data_pc += DATA_WORD_BYTES;
        Ok(())
    }

    fn push_data_label(&mut self, name: String) -> Result<(), AssembleError> {
        self.pending.attach(self.data_pc, &mut self.symbols)?;
        self.data.push(Record::Data { address: self.data_pc, value: DataValue::LabelRef(name) });
        self.data_pc += DATA_WORD_BYTES;
        Ok(())
    }

    fn handle_code_line(&mut self, raw: &str) -> Result<(), AssembleError> {
        let words = lexer::split_words(raw);
        let mnemonic = match words.first() {
            Some(first) => first.to_ascii_lowercase(),
            None => return Ok(()),
        };

        let commas = lexer::count_commas(raw);
        let expected = comma_count_for(&mnemonic);
        if commas != expected {
            return Err(AssembleError::BadCommaCount { mnemonic, expected, found: commas });
        }

        let operands = &words[1..];
        match mnemonic.as_str() {
            "clr" => match operands {
                [rd] => self.push_instruction(macros::clr(parse_register(rd)?)),
                _ => Err(AssembleError::WrongOperandCount { expected: 1, found: operands.len() }),
            },
            "halt" => match operands {
                [] => self.push_instruction(macros::halt()),
                _ => Err(AssembleError::WrongOperandCount { expected: 0, found: operands.len() }),
            },
            "in" => match operands {
                [rd, rs] => self.push_instruction(macros::input(parse_register(rd)?, parse_register(rs)?)),
                _ => Err(AssembleError::WrongOperandCount { expected: 2, found: operands.len() }),
            },
            "out" => match operands {
                [rd, rs] => self.push_instruction(macros::output(parse_register(rd)?, parse_register(rs)?)),
                _ => Err(AssembleError::WrongOperandCount { expected: 2, found: operands.len() }),
            },
            "push" => match operands {
                [rd] => {
                    let rd = parse_register(rd)?;
                    for text in macros::push(rd) {
                        self.push_instruction(text)?;
                    }
                    Ok(())
                }
                _ => Err(AssembleError::WrongOperandCount { expected: 1, found: operands.len() }),
            },
            "pop" => match operands {
                [rd] => {
                    let rd = parse_register(rd)?;
                    for text in macros::pop(rd) {
                        self.push_instruction(text)?;
                    }
                    Ok(())
                }
                _ => Err(AssembleError::WrongOperandCount { expected: 1, found: operands.len() }),
            },
            "ld" => match operands {
                [rd, value] => {
                    let rd = parse_register(rd)?;
                    if let Some(name) = value.strip_prefix(':').or_else(|| value.strip_prefix('@')) {
                        if !name.is_empty() {
                            return self.push_deferred_load(rd, name.to_owned());
                        }
                    }
                    let literal = parse_u64(value)?;
                    for text in macros::load64(rd, literal) {
                        self.push_instruction(text)?;
                    }
                    Ok(())
                }
                _ => Err(AssembleError::WrongOperandCount { expected: 2, found: operands.len() }),
            },
            _ => self.push_instruction(raw.to_owned()),
        }
    }

    fn handle_data_line(&mut self, item: &str) -> Result<(), AssembleError> {
        if let Some(name) = item.strip_prefix(':').or_else(|| item.strip_prefix('@')) {
            if !name.is_empty() {
                return self.push_data_label(name.to_owned());
            }
        }
        let value = parse_u64(item).map_err(|_| AssembleError::MalformedDataItem(item.to_owned()))?;
        self.push_data_literal(value)
    }
}

pub fn build(input: &str) -> Result<Assembled, AssembleError> {
    let mut builder = Builder::new();

    for raw_line in input.lines() {
        let line = lexer::strip_comment_and_trim(raw_line);
        match lexer::classify(line)? {
            Line::Blank => {}
            Line::Section(Section::Code) => {
                builder.section = Some(Section::Code);
                builder.saw_code = true;
            }
            Line::Section(Section::Data) => builder.section = Some(Section::Data),
            Line::LabelDef(name) => builder.pending.push(name.to_owned()),
            Line::Item(item) => {
                if item.is_empty() {
                    continue;
                }
                match builder.section {
                    None => return Err(AssembleError::ItemBeforeSection),
                    Some(Section::Code) => builder.handle_code_line(item)?,
                    Some(Section::Data) => builder.handle_data_line(item)?,
                }
            }
        }
    }

    if !builder.pending.is_empty() {
        return Err(AssembleError::PendingLabelAtEof);
    }
    if !builder.saw_code {
        return Err(AssembleError::MissingCodeSection);
    }

    Ok(Assembled { code: builder.code, data: builder.data, symbols: builder.symbols })
}
