use anyhow::Result;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::info;

/// English stop words filtered out before frequency ranking. Single letters
/// cover the fragments left behind when contractions are split on the
/// apostrophe ("don't" -> "don", "t").
const DEFAULT_STOP_WORDS: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "your", "yours",
    "yourself", "yourselves", "he", "him", "his", "himself", "she", "her", "hers", "herself",
    "it", "its", "itself", "they", "them", "their", "theirs", "themselves", "what", "which",
    "who", "whom", "this", "that", "these", "those", "am", "is", "are", "was", "were", "be",
    "been", "being", "have", "has", "had", "having", "do", "does", "did", "doing", "a", "an",
    "the", "and", "but", "if", "or", "because", "as", "until", "while", "of", "at", "by",
    "for", "with", "about", "against", "between", "into", "through", "during", "before",
    "after", "above", "below", "to", "from", "up", "down", "in", "out", "on", "off", "over",
    "under", "again", "further", "then", "once", "here", "there", "when", "where", "why",
    "how", "all", "any", "both", "each", "few", "more", "most", "other", "some", "such",
    "no", "nor", "not", "only", "own", "same", "so", "than", "too", "very", "s", "t", "can",
    "will", "just", "don", "should", "now", "d", "ll", "m", "o", "re", "ve", "y", "ain",
    "aren", "couldn", "didn", "doesn", "hadn", "hasn", "haven", "isn", "ma", "mightn",
    "mustn", "needn", "shan", "shouldn", "wasn", "weren", "won", "wouldn",
];

/// Extracts representative keywords from free transcript text by
/// tokenization, stop-word filtering, and frequency ranking.
#[derive(Debug, Clone)]
pub struct TopicExtractor {
    stop_words: HashSet<String>,
}

impl TopicExtractor {
    /// Create an extractor with the built-in English stop-word set
    pub fn new() -> Self {
        Self {
            stop_words: DEFAULT_STOP_WORDS.iter().map(|w| w.to_string()).collect(),
        }
    }

    /// Create an extractor with extra stop words merged in from a plain-text
    /// file: one word per line, `#` starts a comment
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = tokio::fs::read_to_string(path.as_ref()).await?;
        let mut extractor = Self::new();
        extractor.parse_stop_words(&content);
        info!(
            "📚 Loaded extra stop words from {} ({} total)",
            path.as_ref().display(),
            extractor.stop_word_count()
        );
        Ok(extractor)
    }

    /// Add a stop word; matching is case-insensitive
    pub fn add_stop_word(&mut self, word: &str) {
        self.stop_words.insert(word.to_lowercase());
    }

    pub fn is_stop_word(&self, word: &str) -> bool {
        self.stop_words.contains(&word.to_lowercase())
    }

    pub fn stop_word_count(&self) -> usize {
        self.stop_words.len()
    }

    /// Extract the `count` most frequent keywords from `text`.
    ///
    /// The text is lower-cased and split into alphanumeric word units; stop
    /// words are discarded and the rest ranked by frequency. Ties are broken
    /// by first-encountered order. Degenerate input (empty or all-stop-word
    /// text) yields an empty list, not an error.
    pub fn extract_keywords(&self, text: &str, count: usize) -> Vec<String> {
        let lowered = text.to_lowercase();

        // word -> (frequency, index of first occurrence)
        let mut frequencies: HashMap<&str, (usize, usize)> = HashMap::new();
        let mut next_index = 0usize;

        for token in lowered.split(|c: char| !c.is_alphanumeric()) {
            if token.is_empty() || self.stop_words.contains(token) {
                continue;
            }
            let entry = frequencies.entry(token).or_insert_with(|| {
                let slot = (0, next_index);
                next_index += 1;
                slot
            });
            entry.0 += 1;
        }

        let mut ranked: Vec<(&str, usize, usize)> = frequencies
            .into_iter()
            .map(|(word, (freq, first))| (word, freq, first))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));

        ranked
            .into_iter()
            .take(count)
            .map(|(word, _, _)| word.to_string())
            .collect()
    }

    fn parse_stop_words(&mut self, content: &str) {
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            self.add_stop_word(line);
        }
    }
}

impl Default for TopicExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frequency_ranking_with_stop_words() {
        let extractor = TopicExtractor::new();
        let keywords = extractor.extract_keywords("the the the quick quick fox", 2);
        assert_eq!(keywords, vec!["quick".to_string(), "fox".to_string()]);
    }

    #[test]
    fn test_empty_input_yields_empty_list() {
        let extractor = TopicExtractor::new();
        assert!(extractor.extract_keywords("", 5).is_empty());
    }

    #[test]
    fn test_all_stop_words_yields_empty_list() {
        let extractor = TopicExtractor::new();
        assert!(extractor.extract_keywords("the and of a an", 5).is_empty());
    }

    #[test]
    fn test_tie_broken_by_first_occurrence() {
        let extractor = TopicExtractor::new();
        let keywords = extractor.extract_keywords("guard sweep guard sweep mount", 3);
        assert_eq!(
            keywords,
            vec!["guard".to_string(), "sweep".to_string(), "mount".to_string()]
        );
    }

    #[test]
    fn test_punctuation_and_case_are_ignored() {
        let extractor = TopicExtractor::new();
        let keywords = extractor.extract_keywords("Rust, rust! RUST... tokio; tokio", 2);
        assert_eq!(keywords, vec!["rust".to_string(), "tokio".to_string()]);
    }

    #[test]
    fn test_contractions_leave_no_fragments() {
        let extractor = TopicExtractor::new();
        let keywords = extractor.extract_keywords("don't panic panic", 5);
        assert_eq!(keywords, vec!["panic".to_string()]);
    }

    #[test]
    fn test_count_caps_result_length() {
        let extractor = TopicExtractor::new();
        let keywords = extractor.extract_keywords("alpha beta gamma delta", 2);
        assert_eq!(keywords.len(), 2);
    }

    #[test]
    fn test_from_file_merges_extra_stop_words() {
        tokio_test::block_on(async {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("stop_words.txt");
            tokio::fs::write(&path, "# channel jargon\ntutorial\nepisode\n")
                .await
                .unwrap();

            let base_count = TopicExtractor::new().stop_word_count();
            let extractor = TopicExtractor::from_file(&path).await.unwrap();
            assert_eq!(extractor.stop_word_count(), base_count + 2);
            assert!(extractor.is_stop_word("tutorial"));
            assert_eq!(
                extractor.extract_keywords("tutorial episode rust", 5),
                vec!["rust".to_string()]
            );
        });
    }

    #[test]
    fn test_extra_stop_words() {
        let mut extractor = TopicExtractor::new();
        extractor.add_stop_word("Tutorial");
        assert!(extractor.is_stop_word("tutorial"));
        let keywords = extractor.extract_keywords("tutorial tutorial rust", 5);
        assert_eq!(keywords, vec!["rust".to_string()]);
    }
}
