//! Query-term highlighting for search results.
//!
//! [`prepare_content`] re-renders a document body for the frontend: every token
//! whose lower-cased form appears in the tokenized query is wrapped in `<b>`,
//! tokens are re-joined with single spaces and line breaks become `<br />`.
//! Original spacing around punctuation is not preserved.

pub mod tokenizer;

use std::collections::HashSet;

pub use tokenizer::word_tokenize;

/// Markup inserted between paragraphs.
pub const PARAGRAPH_BREAK: &str = "<br />";

/// Lower-cased, tokenized words of a search query.
pub fn query_tokens(query: &str) -> HashSet<String> {
    word_tokenize(&query.to_lowercase()).into_iter().collect()
}

/// Bolds query terms in `text` and joins paragraphs with [`PARAGRAPH_BREAK`].
pub fn prepare_content(text: &str, query: &str) -> String {
    let needles = query_tokens(query);

    text.split('\n')
        .map(|paragraph| highlight_paragraph(paragraph, &needles))
        .collect::<Vec<_>>()
        .join(PARAGRAPH_BREAK)
}

fn highlight_paragraph(paragraph: &str, needles: &HashSet<String>) -> String {
    word_tokenize(paragraph)
        .into_iter()
        .map(|token| {
            if needles.contains(&token.to_lowercase()) {
                format!("<b>{token}</b>")
            } else {
                token
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
