//! Text normalization applied to extracted page text.

/// Typographic ligatures PDF text extraction commonly leaves behind.
/// `œ`/`Œ` are real French letters and are intentionally not expanded.
const LIGATURES: &[(char, &str)] = &[
    ('\u{FB00}', "ff"),
    ('\u{FB01}', "fi"),
    ('\u{FB02}', "fl"),
    ('\u{FB03}', "ffi"),
    ('\u{FB04}', "ffl"),
    ('\u{FB05}', "ft"),
    ('\u{FB06}', "st"),
];

/// Expand typographic ligatures (ﬁ → fi, ﬂ → fl, …) so marker matching and
/// snippet text behave the same across embedded fonts.
pub fn expand_ligatures(text: &str) -> String {
    if !text.chars().any(|c| LIGATURES.iter().any(|(l, _)| *l == c)) {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match LIGATURES.iter().find(|(l, _)| *l == c) {
            Some((_, replacement)) => out.push_str(replacement),
            None => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_common_ligatures() {
        assert_eq!(expand_ligatures("scientiﬁque et reﬂet"), "scientifique et reflet");
        assert_eq!(expand_ligatures("diﬃcile"), "difficile");
    }

    #[test]
    fn leaves_plain_text_untouched() {
        let text = "un résumé sans ligatures, avec œuvre";
        assert_eq!(expand_ligatures(text), text);
    }
}
