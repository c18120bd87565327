//! Penn-Treebank style word tokenizer.
//!
//! Text is first split into sentences (period/question/exclamation followed by
//! whitespace, except after known abbreviations and initials), then every
//! sentence runs through an ordered list of regex rewrites that pad punctuation
//! with spaces. The result is split on whitespace.
//!
//! Quote characters are kept literally; they are never rewritten to `` or ''.

use std::sync::OnceLock;

use regex::{Captures, Regex};

/// Lower-cased words after which a period does not end a sentence.
const ABBREVIATIONS: &[&str] = &[
    "mr", "mrs", "ms", "dr", "prof", "st", "jr", "sr", "vs", "etc", "e.g", "i.e", "inc",
    "ltd", "co", "no", "fig",
];

/// Suffixes that stay glued to a leading apostrophe (`'s`, `'re`, ...).
const CLITICS: &[&str] = &["s", "m", "d", "t", "n", "re", "ve", "ll"];

/// Characters that may trail a sentence terminator (`"Stop!"`, `(see above.)`).
const CLOSERS: &[char] = &['"', '\'', ')', ']', '}', '>'];

struct Rule {
    re: Regex,
    rep: &'static str,
}

fn rule(pattern: &str, rep: &'static str) -> Rule {
    Rule {
        re: Regex::new(pattern).expect("static tokenizer pattern"),
        rep,
    }
}

struct Rules {
    /// Quotes, punctuation, brackets and dashes.
    punctuation: Vec<Rule>,
    /// Applied to the space-padded sentence.
    ending: Vec<Rule>,
}

fn rules() -> &'static Rules {
    static RULES: OnceLock<Rules> = OnceLock::new();
    RULES.get_or_init(|| Rules {
        punctuation: vec![
            // starting quotes
            rule(r#"^""#, r#" " "#),
            rule(r#"([ (\[{<])("|'')"#, r#"${1} ${2} "#),
            // final period, commas and colons not inside numbers
            rule(r#"([^.])(\.)([\]\)}>"']*)\s*$"#, "${1} ${2} ${3} "),
            rule(r"([:,])([^\d])", " ${1} ${2}"),
            rule(r"([:,])$", " ${1} "),
            rule(r"\.{2,}", " ${0} "),
            rule(r"[;@#$%&]", " ${0} "),
            rule(r"[?!]", " ${0} "),
            rule(r"([^'])' ", "${1} ' "),
            rule(r"[*]", " ${0} "),
            // brackets
            rule(r"[\]\[\(\)\{\}<>]", " ${0} "),
            rule(r"--", " -- "),
        ],
        ending: vec![
            rule(r"''", " '' "),
            rule(r#"""#, r#" " "#),
            rule(r"([^' ])('[sS]|'[mM]|'[dD]|') ", "${1} ${2} "),
            rule(r"([^' ])('ll|'LL|'re|'RE|'ve|'VE|n't|N'T) ", "${1} ${2} "),
            // fused contractions
            rule(r"(?i)\b(can)(not)\b", " ${1} ${2} "),
            rule(r"(?i)\b(gim)(me)\b", " ${1} ${2} "),
            rule(r"(?i)\b(gon)(na)\b", " ${1} ${2} "),
            rule(r"(?i)\b(got)(ta)\b", " ${1} ${2} "),
            rule(r"(?i)\b(lem)(me)\b", " ${1} ${2} "),
            rule(r"(?i)\b(wan)(na)\b", " ${1} ${2} "),
        ],
    })
}

/// Splits `text` into word and punctuation tokens.
///
/// ```
/// use text_highlight::tokenizer::word_tokenize;
/// assert_eq!(word_tokenize("Hello, World!"), vec!["Hello", ",", "World", "!"]);
/// ```
pub fn word_tokenize(text: &str) -> Vec<String> {
    sentences(text)
        .iter()
        .flat_map(|s| treebank(s))
        .collect()
}

/// Tokenizes one sentence.
fn treebank(sentence: &str) -> Vec<String> {
    let rules = rules();
    let mut s = sentence.to_string();
    for r in &rules.punctuation {
        s = r.re.replace_all(&s, r.rep).into_owned();
    }
    s = split_opening_quotes(&s);
    s = format!(" {s} ");
    for r in &rules.ending {
        s = r.re.replace_all(&s, r.rep).into_owned();
    }
    s.split_whitespace().map(str::to_string).collect()
}

/// Detaches an opening `'` from the word it quotes (`'quick` -> `' quick`),
/// unless the word is itself a clitic such as `'s` or `'ll`.
fn split_opening_quotes(s: &str) -> String {
    static OPENING: OnceLock<Regex> = OnceLock::new();
    let re = OPENING.get_or_init(|| {
        Regex::new(r"(^|[\s(\[{<])'(\w+)").expect("static opening quote pattern")
    });
    re.replace_all(s, |caps: &Captures| {
        let word = &caps[2];
        if CLITICS.contains(&word.to_lowercase().as_str()) {
            caps[0].to_string()
        } else {
            format!("{}' {}", &caps[1], word)
        }
    })
    .into_owned()
}

/// Groups whitespace-separated words into sentences.
fn sentences(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for word in text.split_whitespace() {
        current.push(word);
        if ends_sentence(word) {
            out.push(current.join(" "));
            current.clear();
        }
    }
    if !current.is_empty() {
        out.push(current.join(" "));
    }
    out
}

fn ends_sentence(word: &str) -> bool {
    let core = word.trim_end_matches(CLOSERS);
    if core.ends_with('?') || core.ends_with('!') {
        return true;
    }
    let Some(stem) = core.strip_suffix('.') else {
        return false;
    };
    if stem.ends_with('.') {
        // ellipsis
        return false;
    }
    let stem = stem.trim_start_matches(|c: char| !c.is_alphanumeric());
    if stem.is_empty() {
        return false;
    }
    let lower = stem.to_lowercase();
    let is_initial = stem.chars().count() == 1 && stem.chars().all(char::is_alphabetic);
    !(ABBREVIATIONS.contains(&lower.as_str()) || is_initial || stem.contains('.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(s: &str) -> Vec<String> {
        word_tokenize(s)
    }

    #[test]
    fn splits_punctuation() {
        assert_eq!(toks("Hello, World!"), vec!["Hello", ",", "World", "!"]);
        assert_eq!(toks("(see: here)"), vec!["(", "see", ":", "here", ")"]);
        assert_eq!(toks("cost $5 & 50%"), vec!["cost", "$", "5", "&", "50", "%"]);
    }

    #[test]
    fn keeps_numbers_together() {
        assert_eq!(toks("1,000 and 3.14"), vec!["1,000", "and", "3.14"]);
    }

    #[test]
    fn splits_clitics_and_contractions() {
        assert_eq!(toks("I don't know"), vec!["I", "do", "n't", "know"]);
        assert_eq!(toks("it's John's"), vec!["it", "'s", "John", "'s"]);
        assert_eq!(toks("we'll see"), vec!["we", "'ll", "see"]);
        assert_eq!(toks("I cannot"), vec!["I", "can", "not"]);
    }

    #[test]
    fn splits_sentence_final_periods() {
        assert_eq!(
            toks("It works. Then stops."),
            vec!["It", "works", ".", "Then", "stops", "."]
        );
    }

    #[test]
    fn keeps_abbreviation_periods() {
        assert_eq!(
            toks("Mr. Smith went to the U.S. today."),
            vec!["Mr.", "Smith", "went", "to", "the", "U.S.", "today", "."]
        );
    }

    #[test]
    fn keeps_quotes_literal() {
        assert_eq!(
            toks(r#"He said "hi" twice"#),
            vec!["He", "said", "\"", "hi", "\"", "twice"]
        );
    }

    #[test]
    fn single_quoted_word_is_detached() {
        assert_eq!(toks("say 'quick' now"), vec!["say", "'", "quick", "'", "now"]);
        assert_eq!(toks("('fox')"), vec!["(", "'", "fox", "'", ")"]);
        assert_eq!(toks("the boys 's game"), vec!["the", "boys", "'s", "game"]);
        assert_eq!(toks("rock 'n roll"), vec!["rock", "'n", "roll"]);
    }

    #[test]
    fn ellipsis_and_dashes() {
        assert_eq!(toks("wait... no--yes"), vec!["wait", "...", "no", "--", "yes"]);
    }

    #[test]
    fn empty_and_whitespace_only() {
        assert!(toks("").is_empty());
        assert!(toks(" \t\r ").is_empty());
    }
}
