use common::{error::ConversionError, utils::config::OverflowPolicy};
use indexmap::{map::Iter, IndexMap};

pub const FAKE_DOC_ID: &str = "00000000";
pub const FAKE_DOC_TEXT: &str = "FAKE DOCUMENT";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub doc_id: String,
    pub doc_text: String,
    pub label: i64,
}

impl Candidate {
    pub fn sentinel() -> Self {
        Self {
            doc_id: FAKE_DOC_ID.to_string(),
            doc_text: FAKE_DOC_TEXT.to_string(),
            label: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateList {
    /// First query id seen for this query text.
    pub query_id: String,
    pub candidates: Vec<Candidate>,
}

impl CandidateList {
    pub fn positive_labels(&self) -> usize {
        self.candidates.iter().filter(|c| c.label == 1).count()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PadOutcome {
    pub padded_documents: usize,
    pub truncated_queries: usize,
}

/// Candidates keyed by exact query text, in first-seen order.
#[derive(Debug, Default)]
pub struct CandidateTable {
    lists: IndexMap<String, CandidateList>,
}

impl CandidateTable {
    pub fn push(&mut self, query_id: &str, query: &str, candidate: Candidate) {
        self.lists
            .entry(query.to_string())
            .or_insert_with(|| CandidateList {
                query_id: query_id.to_string(),
                candidates: Vec::new(),
            })
            .candidates
            .push(candidate);
    }

    /// Fills every list up to `target` with sentinel candidates. Lists already
    /// longer than `target` are cut down only under [`OverflowPolicy::Truncate`].
    pub fn pad_to(&mut self, target: usize, policy: OverflowPolicy) -> PadOutcome {
        let mut outcome = PadOutcome::default();
        for list in self.lists.values_mut() {
            let len = list.candidates.len();
            if len > target && policy == OverflowPolicy::Truncate {
                list.candidates.truncate(target);
                outcome.truncated_queries += 1;
            }
            let missing = target.saturating_sub(len);
            list.candidates
                .extend(std::iter::repeat_with(Candidate::sentinel).take(missing));
            outcome.padded_documents += missing;
        }
        outcome
    }

    /// Every list must hold exactly `target` candidates.
    pub fn verify_uniform(&self, target: usize) -> Result<(), ConversionError> {
        match self
            .lists
            .iter()
            .find(|(_, list)| list.candidates.len() != target)
        {
            Some((query, list)) => Err(ConversionError::InvariantViolation(format!(
                "not all queries have {target} docs: query {} ('{query}') has {}",
                list.query_id,
                list.candidates.len()
            ))),
            None => Ok(()),
        }
    }

    /// Relevant candidates currently held, sentinels excluded.
    pub fn positive_labels(&self) -> usize {
        self.lists.values().map(CandidateList::positive_labels).sum()
    }

    pub fn len(&self) -> usize {
        self.lists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }

    pub fn iter(&self) -> Iter<'_, String, CandidateList> {
        self.lists.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(doc_id: &str, label: i64) -> Candidate {
        Candidate {
            doc_id: doc_id.to_string(),
            doc_text: format!("text of {doc_id}"),
            label,
        }
    }

    #[test]
    fn groups_by_query_text_in_first_seen_order() {
        let mut table = CandidateTable::default();
        table.push("2", "second query", candidate("d1", 0));
        table.push("1", "first query", candidate("d2", 1));
        table.push("2", "second query", candidate("d3", 0));

        let queries: Vec<&str> = table.iter().map(|(query, _)| query.as_str()).collect();
        assert_eq!(queries, vec!["second query", "first query"]);
        let (_, first) = table.iter().next().unwrap();
        assert_eq!(first.query_id, "2");
        assert_eq!(first.candidates.len(), 2);
    }

    #[test]
    fn identical_text_collapses_and_keeps_first_id() {
        let mut table = CandidateTable::default();
        table.push("100", "what is ai", candidate("d1", 0));
        table.push("200", "what is ai", candidate("d2", 0));
        table.push("300", "What is ai", candidate("d3", 0));

        assert_eq!(table.len(), 2);
        let (_, first) = table.iter().next().unwrap();
        assert_eq!(first.query_id, "100");
        assert_eq!(first.candidates.len(), 2);
    }

    #[test]
    fn pads_short_lists_with_sentinels() {
        let mut table = CandidateTable::default();
        for doc in ["d1", "d2", "d3"] {
            table.push("q1", "q1", candidate(doc, 0));
        }

        let outcome = table.pad_to(5, OverflowPolicy::Reject);

        assert_eq!(outcome.padded_documents, 2);
        table.verify_uniform(5).unwrap();
        let (_, list) = table.iter().next().unwrap();
        assert_eq!(list.candidates[2].doc_id, "d3");
        assert_eq!(
            &list.candidates[3..],
            &[Candidate::sentinel(), Candidate::sentinel()]
        );
        assert_eq!(list.candidates[4].doc_id, FAKE_DOC_ID);
        assert_eq!(list.candidates[4].doc_text, FAKE_DOC_TEXT);
        assert_eq!(list.candidates[4].label, 0);
    }

    #[test]
    fn overflow_is_rejected_by_default() {
        let mut table = CandidateTable::default();
        table.push("q1", "short", candidate("d1", 0));
        for doc in ["d1", "d2", "d3"] {
            table.push("q2", "long", candidate(doc, 0));
        }

        table.pad_to(2, OverflowPolicy::Reject);
        let err = table.verify_uniform(2).unwrap_err();

        assert!(matches!(
            err,
            ConversionError::InvariantViolation(message) if message.contains("q2")
        ));
    }

    #[test]
    fn overflow_can_be_truncated_in_input_order() {
        let mut table = CandidateTable::default();
        for doc in ["d1", "d2", "d3"] {
            table.push("q2", "long", candidate(doc, 0));
        }

        let outcome = table.pad_to(2, OverflowPolicy::Truncate);

        assert_eq!(outcome.truncated_queries, 1);
        assert_eq!(outcome.padded_documents, 0);
        table.verify_uniform(2).unwrap();
        let (_, list) = table.iter().next().unwrap();
        let ids: Vec<&str> = list.candidates.iter().map(|c| c.doc_id.as_str()).collect();
        assert_eq!(ids, vec!["d1", "d2"]);
    }

    #[test]
    fn positives_dropped_by_truncation_are_not_counted() {
        let mut table = CandidateTable::default();
        table.push("q1", "long", candidate("d1", 0));
        table.push("q1", "long", candidate("d2", 1));
        table.push("q1", "long", candidate("d3", 1));
        assert_eq!(table.positive_labels(), 2);

        table.pad_to(2, OverflowPolicy::Truncate);

        assert_eq!(table.positive_labels(), 1);
    }
}
