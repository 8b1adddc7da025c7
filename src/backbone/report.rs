//! Human-readable backbone listing: one `+name` or `-name` line per literal,
//! in discovery order. Variables without a name are shown by id.

use crate::backbone::Backbone;
use crate::sat::cnf::VariableMap;
use crate::sat::literal::Literal;
use std::io::{self, Write};

#[must_use]
pub fn format_literal(lit: Literal, names: &VariableMap) -> String {
    let sign = if lit.polarity() { '+' } else { '-' };
    format!("{sign}{}", names.display_name(lit))
}

/// # Errors
///
/// Propagates write failures of `writer`.
pub fn write_report<W: Write>(writer: &mut W, backbone: &Backbone, names: &VariableMap) -> io::Result<()> {
    for &lit in backbone.iter() {
        writeln!(writer, "{}", format_literal(lit, names))?;
    }
    Ok(())
}

#[must_use]
pub fn render(backbone: &Backbone, names: &VariableMap) -> String {
    backbone
        .iter()
        .map(|&lit| format_literal(lit, names) + "\n")
        .collect()
}
