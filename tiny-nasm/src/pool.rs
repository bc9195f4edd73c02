//! Deduplicated string literal constants.

use std::collections::HashMap;
use std::fmt;

/// Maps literal text to a `Pool_<n>` label, numbering labels in first-seen order.
#[derive(Debug, Default)]
pub struct StringPool {
    /// Literal texts in first-seen order. The label of `literals[n]` is `Pool_n`.
    literals: Vec<String>,
    index: HashMap<String, usize>,
}

impl StringPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the label of `text`, interning it on first use.
    pub fn label(&mut self, text: &str) -> String {
        let n = match self.index.get(text) {
            Some(&n) => n,
            None => {
                let n = self.literals.len();
                self.literals.push(text.to_string());
                self.index.insert(text.to_string(), n);
                n
            }
        };
        Self::label_of(n)
    }

    fn label_of(n: usize) -> String {
        format!("Pool_{}", n)
    }

    pub fn len(&self) -> usize {
        self.literals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }
}

/// One zero-terminated `DB` constant per literal.
impl fmt::Display for StringPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (n, text) in self.literals.iter().enumerate() {
            writeln!(f, "{}: DB \"{}\",00h", Self::label_of(n), text)?;
        }
        Ok(())
    }
}
