//! Builder-pattern printer for rendering diagnostics.

use std::fmt::Write;

use mapforge_core::Colors;

use super::Diagnostics;
use super::message::Severity;

/// Builder for rendering diagnostics with various options.
pub struct DiagnosticsPrinter<'d> {
    diagnostics: &'d Diagnostics,
    colored: bool,
}

impl<'d> DiagnosticsPrinter<'d> {
    pub fn new(diagnostics: &'d Diagnostics) -> Self {
        Self {
            diagnostics,
            colored: false,
        }
    }

    pub fn colored(mut self, value: bool) -> Self {
        self.colored = value;
        self
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = self.format(&mut out);
        out
    }

    /// One line per diagnostic, with the tag on an indented second line.
    pub fn format(&self, w: &mut impl Write) -> std::fmt::Result {
        let c = Colors::new(self.colored);
        for diag in self.diagnostics.iter() {
            let color = match diag.severity() {
                Severity::Error => c.red,
                Severity::Warning => c.yellow,
                Severity::Pedantic => c.dim,
            };
            writeln!(
                w,
                "{color}{}{}: {}",
                diag.severity(),
                c.reset,
                diag.message()
            )?;
            if let Some(tag) = diag.tag() {
                writeln!(w, "  {}-->{} {}{tag}{}", c.dim, c.reset, c.blue, c.reset)?;
            }
        }
        Ok(())
    }
}

impl Diagnostics {
    pub fn printer(&self) -> DiagnosticsPrinter<'_> {
        DiagnosticsPrinter::new(self)
    }
}
