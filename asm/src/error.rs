use std::fmt;

/// Everything that can go wrong while turning `.tk` source into a `.tko`
/// image. The CLI folds every variant into a single `Error: {msg}` line.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum AssembleError {
    UnknownMnemonic(String),
    BadCommaCount {
        mnemonic: String,
        expected: usize,
        found: usize,
    },
    WrongOperandCount {
        expected: usize,
        found: usize,
    },
    InvalidRegister(String),
    InvalidImmediate(String),
    UndefinedLabel(String),
    DuplicateLabel(String),
    BranchOutOfRange {
        label: String,
        delta: i64,
    },
    MalformedLabel(String),
    MalformedMemoryOperand(String),
    UnalignedMemoryOffset(i32),
    MalformedDataItem(String),
    PendingLabelAtEof,
    MissingCodeSection,
    ItemBeforeSection,
    SyntaxError(String),
    EmptyInstruction,
    Io(String),
}

impl fmt::Display for AssembleError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AssembleError::UnknownMnemonic(m) => write!(f, "unknown instruction mnemonic '{}'", m),
            AssembleError::BadCommaCount { mnemonic, expected, found } => write!(
                f,
                "'{}' expects {} comma(s) on its line, found {}",
                mnemonic, expected, found
            ),
            AssembleError::WrongOperandCount { expected, found } => {
                write!(f, "expected {} operand(s), found {}", expected, found)
            }
            AssembleError::InvalidRegister(t) => write!(f, "invalid register '{}'", t),
            AssembleError::InvalidImmediate(t) => write!(f, "invalid immediate '{}'", t),
            AssembleError::UndefinedLabel(name) => write!(f, "undefined label '{}'", name),
            AssembleError::DuplicateLabel(name) => write!(f, "duplicate label '{}'", name),
            AssembleError::BranchOutOfRange { label, delta } => write!(
                f,
                "brr target '{}' is out of signed 12-bit range (delta {})",
                label, delta
            ),
            AssembleError::MalformedLabel(line) => write!(f, "malformed label '{}'", line),
            AssembleError::MalformedMemoryOperand(t) => {
                write!(f, "malformed memory operand '{}'", t)
            }
            AssembleError::UnalignedMemoryOffset(imm) => {
                write!(f, "memory offset {} is not a multiple of 8", imm)
            }
            AssembleError::MalformedDataItem(t) => write!(
                f,
                "malformed data item '{}'; expected an unsigned 64-bit integer or a label reference",
                t
            ),
            AssembleError::PendingLabelAtEof => {
                write!(f, "label at end of file with no following instruction or data item")
            }
            AssembleError::MissingCodeSection => write!(f, "program has no .code section"),
            AssembleError::ItemBeforeSection => {
                write!(f, "instruction or data item before any .code or .data directive")
            }
            AssembleError::SyntaxError(line) => write!(f, "unrecognized line '{}'", line),
            AssembleError::EmptyInstruction => write!(f, "empty instruction"),
            AssembleError::Io(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for AssembleError {}

impl From<std::io::Error> for AssembleError {
    fn from(err: std::io::Error) -> AssembleError {
        AssembleError::Io(err.to_string())
    }
}
