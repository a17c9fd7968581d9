/// Total size of VM main memory, in bytes (512 KiB).
pub const MEMORY_SIZE: u64 = 524_288;

/// Fixed base address at which code is loaded.
pub const CODE_BEGIN: u64 = 0x2000;

/// Fixed base address at which data is loaded.
pub const DATA_BEGIN: u64 = 0x10000;

/// Number of general-purpose registers.
pub const REGISTER_COUNT: usize = 32;

/// Register conventionally used as the stack pointer.
pub const STACK_POINTER: usize = 31;

/// Size in bytes of an encoded instruction word.
pub const WORD_BYTES: u64 = 4;

/// Size in bytes of a data doubleword / load-store granularity.
pub const DWORD_BYTES: u64 = 8;

/// Size in bytes of the `.tko` image header.
pub const HEADER_BYTES: u64 = 40;

pub const OPCODE_WIDTH: u32 = 5;
pub const REG_FIELD_WIDTH: u32 = 5;
pub const IMM12_WIDTH: u32 = 12;

pub const OPCODE_OFFSET: u32 = 27;
pub const RD_OFFSET: u32 = 22;
pub const RS_OFFSET: u32 = 17;
pub const RT_OFFSET: u32 = 12;
pub const IMM12_OFFSET: u32 = 0;

pub const OPCODE_MASK: u32 = 0b1111_1000_0000_0000_0000_0000_0000_0000;
pub const RD_MASK: u32 = 0b0000_0111_1100_0000_0000_0000_0000_0000;
pub const RS_MASK: u32 = 0b0000_0000_0011_1110_0000_0000_0000_0000;
pub const RT_MASK: u32 = 0b0000_0000_0000_0001_1111_0000_0000_0000;
pub const IMM12_MASK: u32 = 0b0000_0000_0000_0000_0000_1111_1111_1111;

/// Highest value representable by a signed 12-bit field.
pub const IMM12_SIGNED_MAX: i32 = 2047;
/// Lowest value representable by a signed 12-bit field.
pub const IMM12_SIGNED_MIN: i32 = -2048;
