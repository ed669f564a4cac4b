use crate::nlp::lemmatizer::lemmatize;
use crate::nlp::stopwords::is_stop_word;
use crate::nlp::tokenizer::tokenize;

/// Normalize text for downstream modeling.
///
/// Lowercases, tokenizes, drops punctuation and stop words, lemmatizes what is
/// left and joins the lemmas with single spaces.
#[must_use]
pub fn enhanced_preprocess_text(text: &str) -> String {
    let lower = text.to_lowercase();
    tokenize(&lower)
        .into_iter()
        .filter(|t| !t.is_punct() && !is_stop_word(t.text))
        .map(|t| lemmatize(t.text))
        .collect::<Vec<_>>()
        .join(" ")
}
