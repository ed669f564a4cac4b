use std::collections::HashMap;
use std::sync::OnceLock;

/// Irregular forms that suffix rules get wrong.
const IRREGULAR: &[(&str, &str)] = &[
    ("am", "be"),
    ("are", "be"),
    ("is", "be"),
    ("was", "be"),
    ("were", "be"),
    ("been", "be"),
    ("being", "be"),
    ("has", "have"),
    ("had", "have"),
    ("having", "have"),
    ("does", "do"),
    ("did", "do"),
    ("done", "do"),
    ("doing", "do"),
    ("went", "go"),
    ("gone", "go"),
    ("goes", "go"),
    ("ran", "run"),
    ("took", "take"),
    ("taken", "take"),
    ("made", "make"),
    ("said", "say"),
    ("got", "get"),
    ("came", "come"),
    ("knew", "know"),
    ("known", "know"),
    ("thought", "think"),
    ("found", "find"),
    ("gave", "give"),
    ("given", "give"),
    ("told", "tell"),
    ("felt", "feel"),
    ("brought", "bring"),
    ("began", "begin"),
    ("begun", "begin"),
    ("kept", "keep"),
    ("held", "hold"),
    ("wrote", "write"),
    ("written", "write"),
    ("stood", "stand"),
    ("heard", "hear"),
    ("meant", "mean"),
    ("met", "meet"),
    ("paid", "pay"),
    ("spoke", "speak"),
    ("spoken", "speak"),
    ("led", "lead"),
    ("grew", "grow"),
    ("lost", "lose"),
    ("sent", "send"),
    ("built", "build"),
    ("understood", "understand"),
    ("broke", "break"),
    ("broken", "break"),
    ("spent", "spend"),
    ("drove", "drive"),
    ("bought", "buy"),
    ("chose", "choose"),
    ("used", "use"),
    ("children", "child"),
    ("men", "man"),
    ("women", "woman"),
    ("mice", "mouse"),
    ("feet", "foot"),
    ("teeth", "tooth"),
    ("geese", "goose"),
    ("people", "person"),
    ("analyses", "analysis"),
    ("criteria", "criterion"),
];

fn irregular() -> &'static HashMap<&'static str, &'static str> {
    static MAP: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    MAP.get_or_init(|| IRREGULAR.iter().copied().collect())
}

fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u')
}

/// Short consonant-vowel-consonant stems lost a silent "e" ("mak" from "making").
fn restore_e(stem: &str) -> String {
    let c: Vec<char> = stem.chars().collect();
    if c.len() == 3
        && !is_vowel(c[0])
        && is_vowel(c[1])
        && !is_vowel(c[2])
        && !matches!(c[2], 'w' | 'x' | 'y')
    {
        format!("{stem}e")
    } else {
        stem.to_string()
    }
}

/// Strip a verb suffix ("ing"/"ed") and repair the stem, if the stem is plausible.
fn strip_verb_suffix(word: &str, suffix: &str) -> Option<String> {
    let stem = word.strip_suffix(suffix)?;
    if stem.chars().count() < 3 || !stem.chars().any(is_vowel) {
        return None;
    }
    let chars: Vec<char> = stem.chars().collect();
    let n = chars.len();
    // Doubled final consonant: running -> run, stopped -> stop
    if chars[n - 1] == chars[n - 2] && !is_vowel(chars[n - 1]) && !matches!(chars[n - 1], 'l' | 's' | 'z') {
        return Some(chars[..n - 1].iter().collect());
    }
    Some(restore_e(stem))
}

/// Reduce a lowercase word to its dictionary form with English suffix rules.
///
/// Tokens containing anything but ASCII letters are returned unchanged.
#[must_use]
pub fn lemmatize(word: &str) -> String {
    if let Some(lemma) = irregular().get(word) {
        return (*lemma).to_string();
    }
    if word.len() <= 3 || !word.chars().all(|c| c.is_ascii_lowercase()) {
        return word.to_string();
    }

    if let Some(stem) = word.strip_suffix("ies") {
        return format!("{stem}y");
    }
    if let Some(stem) = word.strip_suffix("ied") {
        return format!("{stem}y");
    }
    if word.ends_with("sses") || ["xes", "ches", "shes", "zzes"].iter().any(|s| word.ends_with(s)) {
        return word[..word.len() - 2].to_string();
    }
    if word.ends_with("ing") {
        if let Some(stem) = strip_verb_suffix(word, "ing") {
            return stem;
        }
        return word.to_string();
    }
    if word.ends_with("ed") && !word.ends_with("eed") {
        if let Some(stem) = strip_verb_suffix(word, "ed") {
            return stem;
        }
        return word.to_string();
    }
    if word.ends_with('s') && !["ss", "us", "is"].iter().any(|s| word.ends_with(s)) {
        return word[..word.len() - 1].to_string();
    }
    word.to_string()
}
