/// A data item's value, resolved to bytes only in the final pass.
#[derive(Clone, Debug)]
pub enum DataValue {
    Literal(u64),
    LabelRef(String),
}

/// A single slot reserved during the line-by-line walk of the source file.
/// Addresses are assigned as each record is created, before any label that
/// could only be known later (a forward `:label` reference) is resolved.
#[derive(Clone, Debug)]
pub enum Record {
    /// A fully-textual instruction, ready for `encoder::encode_instruction`
    /// once every label is known.
    Instruction { address: u64, text: String },
    /// `ld rd, :label` with the label not yet resolvable. Reserves the full
    /// 48 bytes of the load-64 macro up front so later addresses in the
    /// file don't shift once the deferred load is expanded.
    DeferredLoad { address: u64, rd: u32, label: String },
    Data { address: u64, value: DataValue },
}
