use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Term dictionary mapping tokens to dense IDs in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    terms: Vec<String>,
    index: HashMap<String, usize>,
}

impl Dictionary {
    /// Build a dictionary over tokenized documents.
    #[must_use]
    pub fn from_documents<S: AsRef<str>>(docs: &[Vec<S>]) -> Self {
        let mut dict = Self::default();
        for doc in docs {
            for token in doc {
                let token = token.as_ref();
                if !dict.index.contains_key(token) {
                    dict.index.insert(token.to_string(), dict.terms.len());
                    dict.terms.push(token.to_string());
                }
            }
        }
        dict
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    #[must_use]
    pub fn term(&self, id: usize) -> Option<&str> {
        self.terms.get(id).map(String::as_str)
    }

    /// Bag-of-words for one document: `(term id, count)` sorted by term id.
    /// Tokens missing from the dictionary are skipped.
    #[must_use]
    pub fn doc2bow<S: AsRef<str>>(&self, doc: &[S]) -> Vec<(usize, usize)> {
        let mut counts: HashMap<usize, usize> = HashMap::new();
        for token in doc {
            if let Some(&id) = self.index.get(token.as_ref()) {
                *counts.entry(id).or_default() += 1;
            }
        }
        let mut bow: Vec<(usize, usize)> = counts.into_iter().collect();
        bow.sort_unstable();
        bow
    }
}

/// LDA hyperparameters.
#[derive(Debug, Clone)]
pub struct LdaConfig {
    pub num_topics: usize,
    /// Gibbs sampling sweeps over the corpus.
    pub iterations: usize,
    pub seed: u64,
    /// Document-topic prior.
    pub alpha: f64,
    /// Topic-word prior.
    pub beta: f64,
}

impl Default for LdaConfig {
    fn default() -> Self {
        Self {
            num_topics: 20,
            iterations: 200,
            seed: 42,
            alpha: 0.1,
            beta: 0.01,
        }
    }
}

/// Latent Dirichlet allocation fitted with collapsed Gibbs sampling.
pub struct LdaModel {
    dictionary: Dictionary,
    /// Word counts per topic, `topic_word[k][w]`.
    topic_word: Vec<Vec<usize>>,
    topic_totals: Vec<usize>,
    beta: f64,
}

impl LdaModel {
    /// Fit a model to a bag-of-words corpus built with `dictionary`.
    #[must_use]
    pub fn fit(corpus: &[Vec<(usize, usize)>], dictionary: Dictionary, config: &LdaConfig) -> Self {
        let k = config.num_topics.max(1);
        let v = dictionary.len();
        let mut rng = StdRng::seed_from_u64(config.seed);

        // Expand bags into token streams with random initial topics.
        let docs: Vec<Vec<usize>> = corpus
            .iter()
            .map(|bow| {
                bow.iter()
                    .flat_map(|&(w, n)| std::iter::repeat(w).take(n))
                    .collect()
            })
            .collect();
        let mut assignments: Vec<Vec<usize>> = docs
            .iter()
            .map(|doc| doc.iter().map(|_| rng.gen_range(0..k)).collect())
            .collect();

        let mut doc_topic = vec![vec![0usize; k]; docs.len()];
        let mut topic_word = vec![vec![0usize; v]; k];
        let mut topic_totals = vec![0usize; k];
        for (d, doc) in docs.iter().enumerate() {
            for (i, &w) in doc.iter().enumerate() {
                let z = assignments[d][i];
                doc_topic[d][z] += 1;
                topic_word[z][w] += 1;
                topic_totals[z] += 1;
            }
        }

        let v_beta = v as f64 * config.beta;
        let mut weights = vec![0f64; k];
        for _ in 0..config.iterations {
            for (d, doc) in docs.iter().enumerate() {
                for (i, &w) in doc.iter().enumerate() {
                    let old = assignments[d][i];
                    doc_topic[d][old] -= 1;
                    topic_word[old][w] -= 1;
                    topic_totals[old] -= 1;

                    let mut total = 0.0;
                    for (t, weight) in weights.iter_mut().enumerate() {
                        *weight = (doc_topic[d][t] as f64 + config.alpha)
                            * (topic_word[t][w] as f64 + config.beta)
                            / (topic_totals[t] as f64 + v_beta);
                        total += *weight;
                    }
                    let mut draw = rng.gen::<f64>() * total;
                    let mut new = k - 1;
                    for (t, weight) in weights.iter().enumerate() {
                        if draw < *weight {
                            new = t;
                            break;
                        }
                        draw -= weight;
                    }

                    assignments[d][i] = new;
                    doc_topic[d][new] += 1;
                    topic_word[new][w] += 1;
                    topic_totals[new] += 1;
                }
            }
        }

        Self {
            dictionary,
            topic_word,
            topic_totals,
            beta: config.beta,
        }
    }

    #[must_use]
    pub fn num_topics(&self) -> usize {
        self.topic_word.len()
    }

    /// The `n` most probable terms of `topic` with their probabilities.
    #[must_use]
    pub fn topic_terms(&self, topic: usize, n: usize) -> Vec<(&str, f64)> {
        let Some(counts) = self.topic_word.get(topic) else {
            return Vec::new();
        };
        let denom = self.topic_totals[topic] as f64 + self.dictionary.len() as f64 * self.beta;
        let mut terms: Vec<(usize, f64)> = counts
            .iter()
            .enumerate()
            .map(|(w, &c)| (w, (c as f64 + self.beta) / denom))
            .collect();
        // Highest probability first; ties keep dictionary order.
        terms.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        terms
            .into_iter()
            .take(n)
            .filter_map(|(w, p)| self.dictionary.term(w).map(|t| (t, p)))
            .collect()
    }

    /// One summary string per topic, e.g. `0.045*"cat" + 0.030*"dog"`.
    #[must_use]
    pub fn print_topics(&self, num_words: usize) -> Vec<String> {
        (0..self.num_topics())
            .map(|k| {
                self.topic_terms(k, num_words)
                    .iter()
                    .map(|(term, p)| format!("{p:.3}*\"{term}\""))
                    .collect::<Vec<_>>()
                    .join(" + ")
            })
            .collect()
    }
}
