/// Glue single-character tokens onto the token before them.
///
/// Repairs stray letters left by chunk or layout boundaries ("th e cat" becomes
/// "the cat"). A single character with no predecessor is kept as-is.
#[must_use]
pub fn stitch_fragments(text: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    for word in text.split_whitespace() {
        match words.last_mut() {
            Some(prev) if word.chars().count() == 1 => prev.push_str(word),
            _ => words.push(word.to_string()),
        }
    }
    words.join(" ")
}

/// Collapse every run of the same character into one occurrence.
#[must_use]
pub fn reduce_duplicates(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev = None;
    for ch in text.chars() {
        if prev != Some(ch) {
            out.push(ch);
        }
        prev = Some(ch);
    }
    out
}

/// Clean one page of extracted text according to the extraction settings.
///
/// Newlines always become spaces so the page is stored as one line.
#[must_use]
pub fn clean_page_text(text: &str, stitch: bool, dedupe: bool) -> String {
    let mut page = text.replace('\n', " ");
    if dedupe {
        page = reduce_duplicates(&page);
    }
    if stitch {
        page = stitch_fragments(&page);
    }
    page
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stitch_merges_fragments() {
        let out = stitch_fragments("auto m obile");
        assert_eq!(out, "autom obile");
        assert_eq!(out.split(' ').collect::<String>(), "automobile");
        assert_eq!(stitch_fragments("th e cat"), "the cat");
        assert_eq!(stitch_fragments("the car t runs"), "the cart runs");
    }

    #[test]
    fn stitch_keeps_leading_single_char() {
        assert_eq!(stitch_fragments("a dog barks"), "a dog barks");
        assert_eq!(stitch_fragments("x y z"), "xyz");
    }

    #[test]
    fn stitch_never_leaves_single_char_with_predecessor() {
        let out = stitch_fragments("in t he b e ginning q");
        let tokens: Vec<_> = out.split(' ').collect();
        assert!(tokens.iter().skip(1).all(|t| t.chars().count() > 1));
        assert_eq!(out, "int hebe ginningq");
    }

    #[test]
    fn reduce_duplicates_collapses_runs() {
        assert_eq!(reduce_duplicates("HHeelllloo"), "Helo");
        assert_eq!(reduce_duplicates(""), "");
        assert_eq!(reduce_duplicates("abab"), "abab");
    }

    #[test]
    fn clean_page_joins_lines() {
        assert_eq!(clean_page_text("one\ntwo", false, false), "one two");
        assert_eq!(clean_page_text("TThe\ncar", false, true), "The car");
        assert_eq!(clean_page_text("th\ne cat", true, false), "the cat");
    }
}
