use std::{collections::BTreeMap, sync::LazyLock};

use jieba_rs::Jieba;
use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

/// Anything that is neither a word character nor whitespace.
static PUNCTUATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^\w\s]").expect("punctuation pattern is valid")
});

/// Dictionary segmenter for Han runs; loading the dictionary is not cheap.
static JIEBA: LazyLock<Jieba> = LazyLock::new(Jieba::new);

/// Split text into lowercase terms.
///
/// Punctuation is blanked out first, then the remainder is segmented on
/// Unicode word boundaries (UAX #29). UAX #29 yields one segment per
/// ideograph, so consecutive Han segments are joined and cut into words
/// with a dictionary segmenter instead. Order and duplicates are preserved.
///
/// # Examples
///
/// ```
/// use fuzzdoc::tokenizer::tokenize;
///
/// assert_eq!(tokenize("Cat, dog!"), vec!["cat", "dog"]);
/// ```
pub fn tokenize(text: &str) -> Vec<String> {
    let cleaned = PUNCTUATION.replace_all(text, " ");
    let mut tokens = Vec::new();
    let mut han_run = String::new();

    for segment in cleaned.split_word_bounds() {
        if segment.chars().all(is_han) {
            han_run.push_str(segment);
            continue;
        }
        flush_han_run(&mut han_run, &mut tokens);

        let segment = segment.trim();
        if !segment.is_empty() {
            tokens.push(segment.to_lowercase());
        }
    }
    flush_han_run(&mut han_run, &mut tokens);

    tokens
}

fn flush_han_run(run: &mut String, tokens: &mut Vec<String>) {
    if run.is_empty() {
        return;
    }
    tokens.extend(JIEBA.cut(run, true).into_iter().map(str::to_owned));
    run.clear();
}

/// CJK unified ideographs, their extensions and compatibility forms.
fn is_han(c: char) -> bool {
    matches!(
        c,
        '\u{3400}'..='\u{4DBF}'
            | '\u{4E00}'..='\u{9FFF}'
            | '\u{F900}'..='\u{FAFF}'
            | '\u{20000}'..='\u{2EBEF}'
            | '\u{30000}'..='\u{3134F}'
    )
}

/// Count occurrences of each term.
pub fn term_frequencies<I, S>(tokens: I) -> BTreeMap<String, u32>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut freq = BTreeMap::new();
    for token in tokens {
        *freq.entry(token.into()).or_insert(0) += 1;
    }
    freq
}
