// Touches de l'instrument et leur ordre de déclaration

use thiserror::Error;

/// One labeled control of the instrument.
///
/// A `Key` remembers its position in the layout it came from; the position
/// drives the pitch offset in the note registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Key {
    index: usize,
    label: char,
}

impl Key {
    /// Zero-based declaration index
    pub fn index(&self) -> usize {
        self.index
    }

    /// Uppercase label
    pub fn label(&self) -> char {
        self.label
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("Key set is empty")]
    Empty,

    #[error("Key '{0}' is declared more than once")]
    Duplicate(char),

    #[error("Key label cannot be whitespace or a control character ({0:?})")]
    Unprintable(char),
}

/// Uppercase a character when it maps to exactly one uppercase character.
/// Characters without a single-char uppercase form are kept as-is.
pub fn normalize(ch: char) -> char {
    let mut upper = ch.to_uppercase();
    match (upper.next(), upper.next()) {
        (Some(single), None) => single,
        _ => ch,
    }
}

/// Fixed, ordered set of keys. Built once at startup, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyLayout {
    keys: Vec<Key>,
}

impl KeyLayout {
    pub fn new<I>(labels: I) -> Result<Self, LayoutError>
    where
        I: IntoIterator<Item = char>,
    {
        let mut keys: Vec<Key> = Vec::new();

        for raw in labels {
            if raw.is_whitespace() || raw.is_control() {
                return Err(LayoutError::Unprintable(raw));
            }

            let label = normalize(raw);
            if keys.iter().any(|k| k.label == label) {
                return Err(LayoutError::Duplicate(label));
            }

            keys.push(Key {
                index: keys.len(),
                label,
            });
        }

        if keys.is_empty() {
            return Err(LayoutError::Empty);
        }

        Ok(Self { keys })
    }

    /// Case-insensitive search for the key labeled `ch`
    pub fn find(&self, ch: char) -> Option<Key> {
        let wanted = normalize(ch);
        self.keys.iter().copied().find(|k| k.label == wanted)
    }

    pub fn get(&self, index: usize) -> Option<Key> {
        self.keys.get(index).copied()
    }

    /// True when `key` was produced by this layout
    pub fn contains(&self, key: Key) -> bool {
        self.get(key.index) == Some(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = Key> + '_ {
        self.keys.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
