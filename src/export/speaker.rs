//! Speaker names, made safe for archive paths and CSV fields.

/// Used when a name sanitizes to nothing usable.
pub const DEFAULT_SPEAKER: &str = "Speaker";

/// Restrict `name` to `[A-Za-z0-9_-]`.
///
/// Each whitespace character becomes `_`; each run of any other disallowed
/// characters collapses to a single `_`.  A result without a single ASCII
/// letter or digit is replaced by [`DEFAULT_SPEAKER`].
///
/// ```
/// use voice_dataset_studio::export::sanitize_speaker_name;
///
/// assert_eq!(sanitize_speaker_name("Ashan!! 2024"), "Ashan__2024");
/// assert_eq!(sanitize_speaker_name("???"), "Speaker");
/// ```
pub fn sanitize_speaker_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_run = false;

    for c in name.trim().chars() {
        if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
            out.push(c);
            in_run = false;
        } else if c.is_whitespace() {
            out.push('_');
            in_run = false;
        } else if !in_run {
            out.push('_');
            in_run = true;
        }
    }

    if out.chars().any(|c| c.is_ascii_alphanumeric()) {
        out
    } else {
        DEFAULT_SPEAKER.to_owned()
    }
}
