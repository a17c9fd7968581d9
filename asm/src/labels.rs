use std::collections::HashMap;

use crate::error::AssembleError;

/// Maps label names to the address they were defined at.
///
/// A label is only ever entered once: re-defining an existing name is a
/// `DuplicateLabel` error, detected the moment the pending queue is
/// attached to an address, not when the `:name` line itself is read.
#[derive(Default)]
pub struct SymbolTable {
    addresses: HashMap<String, u64>,
}

impl SymbolTable {
    pub fn new() -> SymbolTable {
        SymbolTable::default()
    }

    pub fn define(&mut self, name: &str, address: u64) -> Result<(), AssembleError> {
        if self.addresses.contains_key(name) {
            return Err(AssembleError::DuplicateLabel(name.to_owned()));
        }
        self.addresses.insert(name.to_owned(), address);
        Ok(())
    }

    pub fn resolve(&self, name: &str) -> Result<u64, AssembleError> {
        self.addresses
            .get(name)
            .copied()
            .ok_or_else(|| AssembleError::UndefinedLabel(name.to_owned()))
    }
}

/// Label names seen via `:name`/`@name` definition lines that have not yet
/// been attached to an address. Several definition lines may queue up
/// before the next instruction or data item resolves all of them to the
/// same address at once.
#[derive(Default)]
pub struct PendingLabels(Vec<String>);

impl PendingLabels {
    pub fn new() -> PendingLabels {
        PendingLabels::default()
    }

    pub fn push(&mut self, name: String) {
        self.0.push(name);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Defines every queued label at `address`, then empties the queue.
    pub fn attach(&mut self, address: u64, symbols: &mut SymbolTable) -> Result<(), AssembleError> {
        for name in self.0.drain(..) {
            symbols.define(&name, address)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_label_is_rejected_at_attach_time() {
        let mut symbols = SymbolTable::new();
        let mut pending = PendingLabels::new();
        pending.push("loop".to_owned());
        pending.attach(0x2000, &mut symbols).unwrap();

        let mut pending = PendingLabels::new();
        pending.push("loop".to_owned());
        let err = pending.attach(0x2004, &mut symbols).unwrap_err();
        assert_eq!(err, AssembleError::DuplicateLabel("loop".to_owned()));
    }

    #[test]
    fn several_pending_labels_attach_to_the_same_address() {
        let mut symbols = SymbolTable::new();
        let mut pending = PendingLabels::new();
        pending.push("a".to_owned());
        pending.push("b".to_owned());
        pending.attach(0x2000, &mut symbols).unwrap();

        assert_eq!(symbols.resolve("a").unwrap(), 0x2000);
        assert_eq!(symbols.resolve("b").unwrap(), 0x2000);
    }

    #[test]
    fn undefined_label_fails_to_resolve() {
        let symbols = SymbolTable::new();
        assert_eq!(
            symbols.resolve("nope").unwrap_err(),
            AssembleError::UndefinedLabel("nope".to_owned())
        );
    }
}
