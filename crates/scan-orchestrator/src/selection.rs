use scanner_core::ScoreRecord;
use std::collections::HashSet;

/// Records with data, best score first. Equal scores keep their input order.
pub fn rank(records: &[ScoreRecord]) -> Vec<ScoreRecord> {
    let mut ranked: Vec<ScoreRecord> = records.iter().filter(|r| !r.is_sentinel()).cloned().collect();
    ranked.sort_by(|a, b| b.score.cmp(&a.score));
    ranked
}

/// Chooses which symbols get the forecast ensemble: the `top_n` best ranked
/// plus every mandatory symbol, each exactly once.
#[derive(Debug, Clone)]
pub struct SelectionPolicy {
    mandatory: Vec<String>,
}

impl SelectionPolicy {
    pub fn new(mandatory: Vec<String>) -> Self {
        Self { mandatory }
    }

    /// `ranked` comes from [`rank`]; `all` holds every record of the scan, sentinels included.
    /// A mandatory symbol missing from `all` is represented by a sentinel record.
    pub fn select(&self, ranked: &[ScoreRecord], all: &[ScoreRecord], top_n: usize) -> Vec<ScoreRecord> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut selection = Vec::with_capacity(top_n + self.mandatory.len());

        for record in ranked.iter().take(top_n) {
            if seen.insert(record.symbol.as_str()) {
                selection.push(record.clone());
            }
        }

        for symbol in &self.mandatory {
            if !seen.insert(symbol.as_str()) {
                continue;
            }
            let record = all
                .iter()
                .find(|r| &r.symbol == symbol)
                .cloned()
                .unwrap_or_else(|| ScoreRecord::insufficient(symbol.as_str()));
            selection.push(record);
        }

        selection
    }
}
