mod message;
mod printer;


pub use message::{Category, DiagnosticKind, DiagnosticMessage, Severity};
pub use printer::DiagnosticsPrinter;

use crate::Error;

/// Diagnostics collected during a build.
///
/// Passed by `&mut` through every stage; fatal conditions are recorded here
/// before the stage returns its `Err`.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    messages: Vec<DiagnosticMessage>,
    hide_pedantic: bool,
}

#[must_use = "diagnostic not emitted, call .emit() or .fail()"]
pub struct DiagnosticBuilder<'a> {
    diagnostics: &'a mut Diagnostics,
    message: DiagnosticMessage,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop pedantic warnings instead of recording them.
    pub fn set_hide_pedantic(&mut self, hide: bool) {
        self.hide_pedantic = hide;
    }

    /// Create a diagnostic with the given kind.
    ///
    /// Uses the kind's default message. Call `.message()` on the builder to add detail.
    pub fn report(&mut self, kind: DiagnosticKind) -> DiagnosticBuilder<'_> {
        DiagnosticBuilder {
            diagnostics: self,
            message: DiagnosticMessage::new(kind),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn has_errors(&self) -> bool {
        self.messages.iter().any(|d| d.is_error())
    }

    pub fn has_warnings(&self) -> bool {
        self.messages.iter().any(|d| d.is_warning())
    }

    pub fn error_count(&self) -> usize {
        self.messages.iter().filter(|d| d.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.messages.iter().filter(|d| d.is_warning()).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DiagnosticMessage> {
        self.messages.iter()
    }

    /// Whether any message of `kind` was recorded.
    pub fn contains(&self, kind: DiagnosticKind) -> bool {
        self.messages.iter().any(|m| m.kind == kind)
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.messages.extend(other.messages);
    }

    pub fn render(&self) -> String {
        self.printer().render()
    }

    pub fn render_colored(&self, colored: bool) -> String {
        self.printer().colored(colored).render()
    }
}

impl<'a> DiagnosticBuilder<'a> {
    /// Detail appended to the kind's message.
    pub fn message(mut self, detail: impl Into<String>) -> Self {
        let detail = detail.into();
        self.message.message = self.message.kind.message(Some(&detail));
        self
    }

    /// Tag this diagnostic is about.
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.message.tag = Some(tag.into());
        self
    }

    pub fn emit(self) {
        if self.diagnostics.hide_pedantic && self.message.severity == Severity::Pedantic {
            return;
        }
        self.diagnostics.messages.push(self.message);
    }

    /// Record the diagnostic and return the matching build error.
    pub fn fail(self) -> Error {
        let text = match &self.message.tag {
            Some(tag) => format!("{} ({tag})", self.message.message),
            None => self.message.message.clone(),
        };
        let category = self.message.kind.category();
        self.emit();
        match category {
            Category::Consistency => Error::Consistency(text),
            Category::Capacity => Error::Capacity(text),
            Category::PostCondition => Error::PostCondition(text),
            Category::Input | Category::Warning => Error::Input(text),
        }
    }
}
