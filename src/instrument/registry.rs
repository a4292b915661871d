// Registre des notes - touche vers hauteur MIDI

use super::key::{Key, KeyLayout};

/// MIDI pitch sent to the audio backend
pub type Note = u8;

/// Highest valid MIDI note number
pub const MAX_NOTE: Note = 127;

/// Immutable key → note mapping.
///
/// The note of the key declared at position `i` is `base_pitch + i`. A key
/// whose pitch would fall outside the MIDI range has no note.
#[derive(Debug, Clone)]
pub struct NoteRegistry {
    layout: KeyLayout,
    base_pitch: Note,
}

impl NoteRegistry {
    pub fn new(layout: KeyLayout, base_pitch: Note) -> Self {
        Self { layout, base_pitch }
    }

    /// Resolve a raw character (any case). `None` when the character is not
    /// one of the keys or the key has no valid pitch.
    pub fn resolve(&self, ch: char) -> Option<Note> {
        self.layout.find(ch).and_then(|key| self.resolve_key(key))
    }

    pub fn resolve_key(&self, key: Key) -> Option<Note> {
        if !self.layout.contains(key) {
            return None;
        }

        let offset = u8::try_from(key.index()).ok()?;
        self.base_pitch
            .checked_add(offset)
            .filter(|note| *note <= MAX_NOTE)
    }

    /// Reverse lookup used when a note-off has to be matched back to its key
    pub fn key_for_note(&self, note: Note) -> Option<Key> {
        self.layout
            .iter()
            .find(|key| self.resolve_key(*key) == Some(note))
    }

    pub fn layout(&self) -> &KeyLayout {
        &self.layout
    }

    pub fn base_pitch(&self) -> Note {
        self.base_pitch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_registry() -> NoteRegistry {
        NoteRegistry::new(KeyLayout::new("AUGCT".chars()).unwrap(), 60)
    }

    #[test]
    fn test_note_is_base_plus_index() {
        let registry = reference_registry();

        assert_eq!(registry.resolve('A'), Some(60));
        assert_eq!(registry.resolve('U'), Some(61));
        assert_eq!(registry.resolve('G'), Some(62));
        assert_eq!(registry.resolve('C'), Some(63));
        assert_eq!(registry.resolve('T'), Some(64));
    }

    #[test]
    fn test_resolve_is_pure() {
        let registry = reference_registry();

        for key in registry.layout().iter() {
            let first = registry.resolve_key(key);
            for _ in 0..10 {
                assert_eq!(registry.resolve_key(key), first);
            }
            assert_eq!(first, Some(60 + key.index() as u8));
        }
    }

    #[test]
    fn test_resolve_normalizes_case() {
        let registry = reference_registry();
        assert_eq!(registry.resolve('g'), Some(62));
        assert_eq!(registry.resolve('t'), registry.resolve('T'));
    }

    #[test]
    fn test_unknown_character_is_not_found() {
        let registry = reference_registry();
        assert_eq!(registry.resolve('x'), None);
        assert_eq!(registry.resolve('1'), None);
    }

    #[test]
    fn test_pitch_above_midi_range_is_not_found() {
        let registry = NoteRegistry::new(KeyLayout::new("AUGCT".chars()).unwrap(), 125);

        assert_eq!(registry.resolve('A'), Some(125));
        assert_eq!(registry.resolve('G'), Some(127));
        assert_eq!(registry.resolve('C'), None);
        assert_eq!(registry.resolve('T'), None);
    }

    #[test]
    fn test_foreign_key_is_not_found() {
        let registry = reference_registry();
        let other = KeyLayout::new("ZA".chars()).unwrap();

        assert_eq!(registry.resolve_key(other.get(1).unwrap()), None);
    }

    #[test]
    fn test_key_for_note() {
        let registry = reference_registry();
        assert_eq!(registry.key_for_note(63).map(|k| k.label()), Some('C'));
        assert_eq!(registry.key_for_note(59), None);
    }
}
