use tracing::debug;

pub const DEFAULT_CATEGORIES: [&str; 3] = ["Hobi", "Zabava", "Faks"];

/// Fixed, ordered set of category labels. Built once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRegistry {
    labels: Vec<String>,
}

impl Default for CategoryRegistry {
    fn default() -> Self {
        Self::from_labels(DEFAULT_CATEGORIES)
    }
}

impl CategoryRegistry {
    /// Labels are trimmed; blanks and repeats are dropped, first one wins.
    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out: Vec<String> = Vec::new();
        for label in labels {
            let label = label.as_ref().trim();
            if label.is_empty() {
                continue;
            }
            if out.iter().any(|existing| existing == label) {
                debug!(label, "dropping duplicate category label");
                continue;
            }
            out.push(label.to_string());
        }

        Self { labels: out }
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn contains(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
