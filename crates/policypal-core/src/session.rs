use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::PolicyError;

/// Upload position for a policy document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Slot {
    #[serde(rename = "policy_1")]
    First,
    #[serde(rename = "policy_2")]
    Second,
}

impl Slot {
    pub const ALL: [Slot; 2] = [Slot::First, Slot::Second];

    /// Slot for a zero-based upload index, if there is one.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    fn index(self) -> usize {
        match self {
            Self::First => 0,
            Self::Second => 1,
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::First => f.write_str("Policy 1"),
            Self::Second => f.write_str("Policy 2"),
        }
    }
}

/// Extracted text of an uploaded policy. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Document {
    slot: Slot,
    source: String,
    text: String,
}

impl Document {
    pub fn new(slot: Slot, source: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            slot,
            source: source.into(),
            text: text.into(),
        }
    }

    pub fn slot(&self) -> Slot {
        self.slot
    }

    /// File name or other label the text came from.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

#[derive(Debug, Default, Clone)]
struct SlotState {
    document: Option<Document>,
    summary: Option<String>,
}

/// Per-session store of uploaded policies and their generated summaries.
///
/// A session starts empty, `upload` replaces a slot (dropping its cached
/// summary) and `reset` clears everything. Mutation needs `&mut self`, so a
/// caller that shares a session across tasks must serialise access itself.
#[derive(Debug, Default, Clone)]
pub struct Session {
    slots: [SlotState; 2],
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store extracted text in `slot`, replacing any previous upload.
    pub fn upload(&mut self, slot: Slot, source: impl Into<String>, text: impl Into<String>) {
        let document = Document::new(slot, source, text);
        info!(
            %slot,
            source = document.source(),
            chars = document.text().chars().count(),
            "policy uploaded"
        );
        self.slots[slot.index()] = SlotState {
            document: Some(document),
            summary: None,
        };
    }

    /// Run a fallible extraction and store its output; on failure the slot
    /// keeps whatever it held before.
    pub fn upload_with<F>(
        &mut self,
        slot: Slot,
        source: impl Into<String>,
        extract: F,
    ) -> Result<&Document, PolicyError>
    where
        F: FnOnce() -> Result<String, PolicyError>,
    {
        let source = source.into();
        let text = extract()?;
        self.upload(slot, source, text);
        self.document(slot)
    }

    pub fn document(&self, slot: Slot) -> Result<&Document, PolicyError> {
        self.slots[slot.index()]
            .document
            .as_ref()
            .ok_or(PolicyError::MissingDocument(slot))
    }

    pub fn is_loaded(&self, slot: Slot) -> bool {
        self.slots[slot.index()].document.is_some()
    }

    /// Uploaded documents in slot order.
    pub fn documents(&self) -> impl Iterator<Item = &Document> {
        self.slots.iter().filter_map(|state| state.document.as_ref())
    }

    /// Both policies, or the first missing slot.
    pub fn pair(&self) -> Result<(&Document, &Document), PolicyError> {
        Ok((self.document(Slot::First)?, self.document(Slot::Second)?))
    }

    /// Cache a summary for an uploaded slot, overwriting any earlier one.
    pub fn set_summary(&mut self, slot: Slot, summary: impl Into<String>) -> Result<(), PolicyError> {
        let state = &mut self.slots[slot.index()];
        if state.document.is_none() {
            return Err(PolicyError::MissingDocument(slot));
        }
        state.summary = Some(summary.into());
        debug!(%slot, "summary cached");
        Ok(())
    }

    pub fn summary(&self, slot: Slot) -> Option<&str> {
        self.slots[slot.index()].summary.as_deref()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
        debug!("session cleared");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn upload_logs_character_count() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::INFO)
            .finish();
        tracing::subscriber::with_default(subscriber, || {
            Session::new().upload(Slot::First, "prämie.txt", "Prämie fällig");
        });
        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("policy uploaded"), "{output}");
        assert!(output.contains("chars=13"), "{output}");
    }

    #[test]
    fn empty_session_reports_missing_documents() {
        let session = Session::new();
        assert!(!session.is_loaded(Slot::First));
        assert!(matches!(
            session.document(Slot::First),
            Err(PolicyError::MissingDocument(Slot::First))
        ));
        assert_eq!(session.documents().count(), 0);
    }

    #[test]
    fn pair_requires_both_slots() {
        let mut session = Session::new();
        session.upload(Slot::First, "a.pdf", "text a");
        assert!(matches!(
            session.pair(),
            Err(PolicyError::MissingDocument(Slot::Second))
        ));
        session.upload(Slot::Second, "b.pdf", "text b");
        let (first, second) = session.pair().unwrap();
        assert_eq!(first.text(), "text a");
        assert_eq!(second.source(), "b.pdf");
    }

    #[test]
    fn reupload_replaces_text_and_drops_summary() {
        let mut session = Session::new();
        session.upload(Slot::First, "old.pdf", "old");
        session.set_summary(Slot::First, "old summary").unwrap();
        assert_eq!(session.summary(Slot::First), Some("old summary"));

        session.upload(Slot::First, "new.pdf", "new");
        assert_eq!(session.document(Slot::First).unwrap().text(), "new");
        assert_eq!(session.summary(Slot::First), None);
    }

    #[test]
    fn failed_upload_keeps_previous_document() {
        let mut session = Session::new();
        session.upload(Slot::Second, "good.pdf", "kept");
        let err = session
            .upload_with(Slot::Second, "bad.pdf", || {
                Err(PolicyError::MalformedInput("not a pdf".into()))
            })
            .unwrap_err();
        assert!(matches!(err, PolicyError::MalformedInput(_)));
        assert_eq!(session.document(Slot::Second).unwrap().text(), "kept");
    }

    #[test]
    fn summary_requires_uploaded_slot() {
        let mut session = Session::new();
        let err = session.set_summary(Slot::Second, "x").unwrap_err();
        assert!(matches!(err, PolicyError::MissingDocument(Slot::Second)));
    }

    #[test]
    fn reset_clears_everything() {
        let mut session = Session::new();
        session.upload(Slot::First, "a", "a");
        session.set_summary(Slot::First, "s").unwrap();
        session.reset();
        assert!(!session.is_loaded(Slot::First));
        assert_eq!(session.summary(Slot::First), None);
    }

    #[test]
    fn slot_names_and_indices() {
        assert_eq!(Slot::First.to_string(), "Policy 1");
        assert_eq!(Slot::from_index(1), Some(Slot::Second));
        assert_eq!(Slot::from_index(2), None);
    }
}
