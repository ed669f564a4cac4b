use std::collections::HashSet;
use std::sync::OnceLock;

/// English stop words, lowercase.
const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "across", "after", "afterwards", "again", "against", "all", "almost",
    "alone", "along", "already", "also", "although", "always", "am", "among", "amongst", "an",
    "and", "another", "any", "anyhow", "anyone", "anything", "anyway", "anywhere", "are",
    "around", "as", "at", "back", "be", "became", "because", "become", "becomes", "becoming",
    "been", "before", "beforehand", "behind", "being", "below", "beside", "besides", "between",
    "beyond", "both", "bottom", "but", "by", "ca", "call", "can", "can't", "cannot", "could",
    "couldn't", "did", "didn't", "do", "does", "doesn't", "doing", "don't", "done", "down", "due",
    "during", "each", "eight", "either", "eleven", "else", "elsewhere", "empty", "enough",
    "even", "ever", "every", "everyone", "everything", "everywhere", "except", "few", "fifteen",
    "fifty", "first", "five", "for", "former", "formerly", "forty", "four", "from", "front",
    "full", "further", "get", "give", "go", "had", "has", "hasn't", "have", "haven't", "he",
    "he's", "hence", "her", "here", "hereafter", "hereby", "herein", "hereupon", "hers",
    "herself", "him", "himself", "his", "how", "however", "hundred", "i", "i'd", "i'll", "i'm",
    "i've", "if", "in", "indeed", "into", "is", "isn't", "it", "it's", "its", "itself", "just",
    "keep", "last", "latter", "latterly", "least", "less", "made", "make", "many", "may", "me",
    "meanwhile", "might", "mine", "more", "moreover", "most", "mostly", "move", "much", "must",
    "my", "myself", "name", "namely", "neither", "never", "nevertheless", "next", "nine", "no",
    "nobody", "none", "noone", "nor", "not", "nothing", "now", "nowhere", "of", "off", "often",
    "on", "once", "one", "only", "onto", "or", "other", "others", "otherwise", "our", "ours",
    "ourselves", "out", "over", "own", "part", "per", "perhaps", "please", "put", "quite",
    "rather", "re", "really", "regarding", "same", "say", "see", "seem", "seemed", "seeming",
    "seems", "serious", "several", "she", "she's", "should", "shouldn't", "show", "side",
    "since", "six", "sixty", "so", "some", "somehow", "someone", "something", "sometime",
    "sometimes", "somewhere", "still", "such", "take", "ten", "than", "that", "that's", "the",
    "their", "theirs", "them", "themselves", "then", "thence", "there", "there's", "thereafter",
    "thereby", "therefore", "therein", "thereupon", "these", "they", "they're", "third", "this",
    "those", "though", "three", "through", "throughout", "thru", "thus", "to", "together", "too",
    "top", "toward", "towards", "twelve", "twenty", "two", "under", "unless", "until", "up",
    "upon", "us", "used", "using", "various", "very", "via", "was", "wasn't", "we", "we're",
    "well", "were", "weren't", "what", "whatever", "when", "whence", "whenever", "where",
    "whereafter", "whereas", "whereby", "wherein", "whereupon", "wherever", "whether", "which",
    "while", "whither", "who", "whoever", "whole", "whom", "whose", "why", "will", "with",
    "within", "without", "won't", "would", "wouldn't", "yet", "you", "you'd", "you'll",
    "you're", "you've", "your", "yours", "yourself", "yourselves",
];

fn stop_set() -> &'static HashSet<&'static str> {
    static SET: OnceLock<HashSet<&'static str>> = OnceLock::new();
    SET.get_or_init(|| STOP_WORDS.iter().copied().collect())
}

/// Whether a lowercase token is a stop word. Curly apostrophes count as straight ones.
#[must_use]
pub fn is_stop_word(token: &str) -> bool {
    if token.contains('\u{2019}') {
        return stop_set().contains(token.replace('\u{2019}', "'").as_str());
    }
    stop_set().contains(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn common_function_words_are_stop_words() {
        for w in ["the", "a", "are", "is", "and", "don't", "don\u{2019}t"] {
            assert!(is_stop_word(w), "{w}");
        }
    }

    #[test]
    fn content_words_are_not() {
        for w in ["cat", "running", "dog", "barks", "dollar", "january"] {
            assert!(!is_stop_word(w), "{w}");
        }
    }

    #[test]
    fn list_is_lowercase_and_unique() {
        assert!(STOP_WORDS.iter().all(|w| w.to_lowercase() == *w));
        assert_eq!(stop_set().len(), STOP_WORDS.len());
    }
}
