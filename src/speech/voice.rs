/// A voice offered by the speech engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voice {
    /// Identifier passed back to the engine.
    pub id: String,
    pub name: String,
    /// BCP 47 language tag, e.g. `en-US`.
    pub lang: String,
}

/// Tags match exactly (ignoring case and `_` vs `-`), or on the primary
/// subtag when either side has no region.
pub fn language_matches(voice_lang: &str, target: &str) -> bool {
    let norm = |tag: &str| tag.trim().replace('_', "-").to_ascii_lowercase();
    let (a, b) = (norm(voice_lang), norm(target));
    if a.is_empty() || b.is_empty() {
        return false;
    }
    if a == b {
        return true;
    }

    let (a_primary, a_rest) = a.split_once('-').unwrap_or((a.as_str(), ""));
    let (b_primary, b_rest) = b.split_once('-').unwrap_or((b.as_str(), ""));
    a_primary == b_primary && (a_rest.is_empty() || b_rest.is_empty())
}

/// The user's pick if it speaks the target language, else the first voice
/// that does, else none (engine default).
pub fn select_voice<'a>(voices: &'a [Voice], preferred: Option<&str>, lang: &str) -> Option<&'a Voice> {
    let speaks = |v: &&Voice| language_matches(&v.lang, lang);

    preferred
        .and_then(|id| voices.iter().filter(speaks).find(|v| v.id == id))
        .or_else(|| voices.iter().find(speaks))
}
