//! GRUB config support
//!
//! GRUB fetches a config script over HTTP and shows its menu entries. The
//! built-in template boots the Profile's kernel through an EFI entry and
//! falls back to a BIOS entry when the EFI loaders are unavailable.

use crate::error::{Result, ScriptError};

/// Built-in template for the Profile GRUB menu
pub const GRUB_TEMPLATE: &str = r#"default=0
fallback=1
timeout=1
menuentry "{{ profile.name or profile.id }}" {
echo "Loading kernel"
linuxefi "{{ profile.boot.kernel }}"{% for arg in profile.boot.args %} {{ arg }}{% endfor %}
{% if profile.boot.initrd %}echo "Loading initrd"
initrdefi{% for initrd in profile.boot.initrd %} "{{ initrd }}"{% endfor %}
{% endif %}}
menuentry "{{ profile.name or profile.id }} (BIOS)" {
echo "Loading kernel"
linux "{{ profile.boot.kernel }}"{% for arg in profile.boot.args %} {{ arg }}{% endfor %}
{% if profile.boot.initrd %}echo "Loading initrd"
initrd{% for initrd in profile.boot.initrd %} "{{ initrd }}"{% endfor %}
{% endif %}}
"#;

/// Loader commands that take a file argument
const GRUB_LOADERS: &[&str] = &[
    "linux", "linux16", "linuxefi", "initrd", "initrd16", "initrdefi", "chainloader",
];

/// Check that a rendered config is well formed for GRUB
///
/// Verifies quoting per line, brace balance across the script, that every
/// `menuentry` carries a quoted title and opens a block, and that loader
/// commands name a file. At least one `menuentry` is required.
pub fn validate_grub(script: &str) -> Result<()> {
    let mut depth: usize = 0;
    let mut entries = 0;
    let mut last_line = 0;

    for (index, raw) in script.lines().enumerate() {
        let line_no = index + 1;
        last_line = line_no;
        let line = raw.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let (opens, closes) = count_braces(line).ok_or(ScriptError::UnterminatedQuote(line_no))?;

        let mut tokens = line.split_whitespace();
        let command = tokens.next().unwrap_or_default();

        if command == "menuentry" {
            let title = tokens.next().unwrap_or_default();
            if !(title.starts_with('"') || title.starts_with('\'')) {
                return Err(ScriptError::MissingArgument {
                    line: line_no,
                    command: command.to_string(),
                });
            }
            if !line.ends_with('{') {
                return Err(ScriptError::UnbalancedBraces(line_no));
            }
            entries += 1;
        }

        if GRUB_LOADERS.contains(&command) {
            match tokens.next() {
                None | Some("\"\"") | Some("''") => {
                    return Err(ScriptError::MissingArgument {
                        line: line_no,
                        command: command.to_string(),
                    });
                }
                Some(_) => {}
            }
        }

        depth += opens;
        depth = depth
            .checked_sub(closes)
            .ok_or(ScriptError::UnbalancedBraces(line_no))?;
    }

    if depth != 0 {
        return Err(ScriptError::UnbalancedBraces(last_line));
    }

    if entries == 0 {
        return Err(ScriptError::NoMenuEntry);
    }

    Ok(())
}

/// Count block braces on a line, ignoring quoted text and `${...}` variables
///
/// Single-quoted text is literal up to the next `'`. Inside double quotes
/// and bare words a backslash escapes the following character. Returns
/// `None` when a quote is left open.
fn count_braces(line: &str) -> Option<(usize, usize)> {
    let mut opens = 0;
    let mut closes = 0;
    let mut quote: Option<char> = None;
    let mut in_variable = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match (quote, c) {
            (Some('\''), '\'') => quote = None,
            (Some('\''), _) => {}
            (_, '\\') => {
                chars.next();
            }
            (Some('"'), '"') => quote = None,
            (None, '"' | '\'') => quote = Some(c),
            (_, '$') if chars.peek() == Some(&'{') => {
                chars.next();
                in_variable = true;
            }
            (_, '}') if in_variable => in_variable = false,
            (None, '{') => opens += 1,
            (None, '}') => closes += 1,
            _ => {}
        }
    }

    match quote {
        Some(_) => None,
        None => Some((opens, closes)),
    }
}
