/// Which source form produced an occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OccurrenceKind {
    /// `AI_Output(speaker, listener, "ID"); //spoken text`
    OutputCall,
    /// `name = "SVM_...";`
    SvmAssignment,
}

/// One reference to a dialogue identifier found in a script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogueOccurrence {
    pub identifier: String,
    /// 0-based.
    pub line_number: usize,
    /// Text of the trailing comment; empty when there is none.
    pub expected_text: String,
    pub kind: OccurrenceKind,
}

impl DialogueOccurrence {
    /// Only occurrences with a transcript to compare against can be verified.
    pub fn is_verifiable(&self) -> bool {
        !self.expected_text.is_empty()
    }

    /// 1-based line number, as shown to users.
    pub fn display_line(&self) -> usize {
        self.line_number + 1
    }
}
