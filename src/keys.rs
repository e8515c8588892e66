//! API key rotation.

/// An ordered list of API keys and a cursor over them.
///
/// The cursor only moves forward. Once it runs past the last key the rotator
/// is exhausted for the rest of the run; there is no wraparound.
#[derive(Debug)]
pub struct KeyRotator {
    keys: Vec<String>,
    index: usize,
}

impl KeyRotator {
    pub fn new(keys: Vec<String>) -> Self {
        KeyRotator { keys, index: 0 }
    }

    /// The key the cursor points at, or `None` once every key has been
    /// rotated past.
    pub fn current(&self) -> Option<&str> {
        self.keys.get(self.index).map(String::as_str)
    }

    /// Moves the cursor to the next key.
    pub fn advance(&mut self) {
        self.index += 1;
    }

    /// Zero-based position of the cursor, for log context.
    pub fn position(&self) -> usize {
        self.index
    }
}

// -- Tests -------------------------------------------------------------------
