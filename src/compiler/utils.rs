//! Utility functions for formatting HLSL literals and identifiers.

use super::types::ValueType;

/// Format a float the way the shader text expects it: shortest round-trip form, no
/// exponent, no trailing `.0` (`2`, `0.25`, `0.04`).
pub fn fmt_f32(v: f32) -> String {
    if !v.is_finite() || v == 0.0 {
        return "0".to_string();
    }
    format!("{v}")
}

/// Format a float that must stay a floating point literal in HLSL (`2.0`, `0.25`).
pub fn fmt_float_literal(v: f32) -> String {
    let s = fmt_f32(v);
    if s.contains('.') { s } else { format!("{s}.0") }
}

/// `half`/`halfN` constructor over the given components; a single component is emitted bare.
pub fn vector_literal(values: &[f32]) -> String {
    if values.len() == 1 {
        return fmt_f32(values[0]);
    }
    let parts: Vec<String> = values.iter().copied().map(fmt_f32).collect();
    format!("half{}({})", values.len(), parts.join(", "))
}

/// Broadcast a scalar to a literal of the given type.
pub fn splat_literal(v: f32, ty: ValueType) -> String {
    vector_literal(&vec![v; ty.components()])
}

/// Sanitize a string to be a valid HLSL identifier.
pub fn sanitize_hlsl_ident(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 1);
    if s.chars().next().is_none_or(|c| c.is_ascii_digit()) {
        out.push('_');
    }
    for ch in s.chars() {
        if ch.is_ascii_alphanumeric() || ch == '_' {
            out.push(ch);
        } else {
            out.push('_');
        }
    }
    out
}
