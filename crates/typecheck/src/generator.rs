use smol_str::{format_smolstr, SmolStr};

/// Monotonic counter handing out ids and `T<n>` symbols, starting at 0.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    current: i64,
}

impl IdGenerator {
    pub fn next_id(&mut self) -> i64 {
        let id = self.current;
        self.current += 1;
        id
    }

    pub fn next(&mut self) -> SmolStr {
        format_smolstr!("T{}", self.next_id())
    }
}
