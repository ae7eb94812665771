use std::collections::HashSet;

/// The literal operators and punctuation recognized before language scanning.
#[derive(Clone, Debug)]
pub struct SymbolTable {
    symbols: HashSet<Vec<u8>>,
    // every byte used by any symbol, not just the first ones
    alphabet: [bool; 256],
    longest: usize,
}

impl Default for SymbolTable {
    fn default() -> Self {
        SymbolTable::new(std::iter::empty::<&str>())
    }
}

impl SymbolTable {
    pub fn new<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut table = SymbolTable {
            symbols: HashSet::new(),
            alphabet: [false; 256],
            longest: 0,
        };

        for symbol in symbols {
            table.insert(symbol.as_ref());
        }

        table
    }

    fn insert(&mut self, symbol: &str) {
        if symbol.is_empty() {
            return;
        }

        for &c in symbol.as_bytes() {
            self.alphabet[c as usize] = true;
        }

        self.longest = self.longest.max(symbol.len());
        self.symbols.insert(symbol.as_bytes().to_vec());
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.symbols.contains(symbol.as_bytes())
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn in_alphabet(&self, c: u8) -> bool {
        self.alphabet[c as usize]
    }

    /// Length of the longest symbol that prefixes `rest`, 0 when none does.
    pub fn longest_match(&self, rest: &[u8]) -> usize {
        let run = rest
            .iter()
            .take(self.longest)
            .take_while(|&&c| self.in_alphabet(c))
            .count();

        (1..=run)
            .rev()
            .find(|&n| self.symbols.contains(&rest[..n]))
            .unwrap_or(0)
    }
}
