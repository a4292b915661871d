// Journal des notes jouées (ajout seulement)

/// Receives the text of each activation. The dispatcher never reads it back.
pub trait LogSink {
    fn append(&mut self, text: &str);
}

impl LogSink for String {
    fn append(&mut self, text: &str) {
        self.push_str(text);
    }
}

/// Text shown on the instrument display
#[derive(Debug, Default, Clone)]
pub struct NoteLog {
    text: String,
    entries: usize,
}

impl NoteLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of appends received
    pub fn entries(&self) -> usize {
        self.entries
    }
}

impl LogSink for NoteLog {
    fn append(&mut self, text: &str) {
        self.text.push_str(text);
        self.entries += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_log_appends_in_order() {
        let mut log = NoteLog::new();
        log.append("G ");
        log.append("A ");

        assert_eq!(log.text(), "G A ");
        assert_eq!(log.entries(), 2);
    }

    #[test]
    fn test_string_is_a_sink() {
        let mut text = String::from("> ");
        LogSink::append(&mut text, "T ");
        assert_eq!(text, "> T ");
    }
}
