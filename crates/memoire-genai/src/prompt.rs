//! Bounded prompt assembly for the extraction call.
//!
//! The prompt is an instruction block followed by named page-text sections,
//! each truncated to a character budget so token cost stays bounded no
//! matter what the PDF contains.

/// Fixed instruction block. The schema itself travels separately as the
/// response schema; this block carries the domain rules the schema cannot
/// express.
pub const INSTRUCTION_BLOCK: &str = "\
You are extracting catalog metadata from the front matter of an academic \
thesis (French, English or Arabic, often mixed). Fill the JSON response \
schema from the page text below. Rules:
- Copy titles verbatim in their original language; never translate.
- Dates: normalize to YYYY-MM-DD when a full date is printed; otherwise \
leave defense_date null and fill academic_year (e.g. 2019/2020).
- Institution hierarchy: university > faculty > school > department. Put \
each name at its own level; use the acronym field for sigles (USTHB, ENP).
- Persons: one entry per person with role one of author, supervisor, \
president, examiner, jury-member. Set external to true and fill \
external_institution when the jury member belongs to another institution.
- language.primary is the ISO 639-1 code of the body text; list other \
languages appearing in the front matter in language.secondary.
- Abstracts: only text explicitly marked as resume/abstract/melakhas; do \
not summarize the document yourself.
- Leave any field you cannot read as null or an empty list. Never invent \
values.
";

/// Named page-text sections fed after the instruction block.
#[derive(Debug, Clone, Default)]
pub struct PromptSections<'a> {
    /// Text of the leading pages (cover, title page, jury page).
    pub first_pages: &'a str,
    /// Optional follow-up pages when the title page spills over.
    pub early_pages: Option<&'a str>,
}

/// Assemble the full prompt, truncating each section to `max_chars`.
pub fn build_prompt(sections: &PromptSections<'_>, max_chars: usize) -> String {
    let mut prompt = String::from(INSTRUCTION_BLOCK);
    push_section(&mut prompt, "FIRST PAGES", sections.first_pages, max_chars);
    if let Some(text) = sections.early_pages {
        push_section(&mut prompt, "PAGES 2-3", text, max_chars);
    }
    prompt
}

fn push_section(prompt: &mut String, name: &str, text: &str, max_chars: usize) {
    let text = text.trim();
    if text.is_empty() {
        return;
    }
    prompt.push_str("\n--- ");
    prompt.push_str(name);
    prompt.push_str(" ---\n");
    prompt.push_str(truncate_chars(text, max_chars));
    prompt.push('\n');
}

/// Truncate to a character count without splitting a UTF-8 code point.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}
