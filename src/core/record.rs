use uuid::Uuid;

/// One unit of content flowing through the pipeline.
///
/// Identity is distinct from content: rewriting the content preserves the
/// id. The surrounding pipeline owns record lifecycle; the stage only reads
/// the content and, on success, replaces it.
#[derive(Debug, Clone)]
pub struct Record {
    id: Uuid,
    content: Vec<u8>,
}

impl Record {
    #[must_use]
    pub fn new(content: impl Into<Vec<u8>>) -> Self {
        Self {
            id: Uuid::new_v4(),
            content: content.into(),
        }
    }

    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    #[must_use]
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Buffers the full content as text, line by line, with a trailing
    /// newline appended to every line read, the last one included.
    ///
    /// Reading has no side effects and is repeatable within an invocation.
    #[must_use]
    pub fn read_text(&self) -> String {
        let raw = String::from_utf8_lossy(&self.content);
        let mut text = String::with_capacity(raw.len() + 1);
        for line in raw.lines() {
            text.push_str(line);
            text.push('\n');
        }
        text
    }

    /// Replaces the entire content with the reply bytes.
    pub fn rewrite(&mut self, reply: &str) {
        self.content = reply.as_bytes().to_vec();
    }
}
