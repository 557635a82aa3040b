//! `%(key)s` interpolation for endpoint templates.
//!
//! Templates follow the printf-style mapping syntax operators already use in
//! their settings, e.g. `http://cinder:8776/v2/%(project_id)s`. Only the `s`
//! conversion is supported; `%%` renders a literal percent sign.

use std::collections::BTreeMap;

use super::ClientError;

/// Substitutes every `%(key)s` placeholder with the matching value.
///
/// # Errors
///
/// Returns [`ClientError::Template`] for unknown keys, unterminated
/// placeholders, unsupported conversions, or a dangling `%`.
pub fn interpolate(
    template: &str,
    values: &BTreeMap<String, String>,
) -> Result<String, ClientError> {
    let mut rendered = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(index) = rest.find('%') {
        let (literal, tail) = rest.split_at(index);
        rendered.push_str(literal);
        let after_percent = tail.get(1..).unwrap_or_default();

        if let Some(remaining) = after_percent.strip_prefix('%') {
            rendered.push('%');
            rest = remaining;
            continue;
        }

        let Some(placeholder) = after_percent.strip_prefix('(') else {
            return Err(template_error(format!(
                "unsupported format sequence in '{template}'"
            )));
        };
        let Some((key, after_key)) = placeholder.split_once(')') else {
            return Err(template_error(format!(
                "unterminated placeholder in '{template}'"
            )));
        };
        let Some(remaining) = after_key.strip_prefix('s') else {
            return Err(template_error(format!(
                "placeholder '{key}' must use the 's' conversion"
            )));
        };
        let value = values
            .get(key)
            .ok_or_else(|| template_error(format!("unknown key '{key}'")))?;
        rendered.push_str(value);
        rest = remaining;
    }

    rendered.push_str(rest);
    Ok(rendered)
}

fn template_error(message: String) -> ClientError {
    ClientError::Template { message }
}
