use std::collections::{BTreeMap, HashSet};

use crate::aggregate::SourceAggregate;
use crate::classroom::ClassroomRoster;
use crate::model::IdentityKey;

/// Identity keys present in the canonical roster. Lives for one
/// reconciliation call.
#[derive(Debug, Default)]
pub struct MatchLedger {
    keys: HashSet<IdentityKey>,
}

impl MatchLedger {
    pub fn from_roster(roster: &ClassroomRoster) -> Self {
        Self {
            keys: roster.records().map(|r| r.identity.clone()).collect(),
        }
    }

    pub fn contains(&self, key: &IdentityKey) -> bool {
        self.keys.contains(key)
    }

    /// Distinct identities on the roster.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Source aggregates whose identity is absent from the ledger, in key order.
/// Each identity appears once regardless of how many rows named it.
pub fn unmatched_sources<'a>(
    aggregates: &'a BTreeMap<IdentityKey, SourceAggregate>,
    ledger: &MatchLedger,
) -> Vec<&'a SourceAggregate> {
    aggregates
        .values()
        .filter(|agg| !ledger.contains(&agg.identity))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate_sources;
    use crate::model::{Origin, SourceRecord};

    fn roster(names: &[(&str, &str)]) -> ClassroomRoster {
        let mut rows: Vec<Vec<String>> = vec![
            vec!["Room 1".into()],
            vec!["LASTNAME".into(), "FIRSTNAME".into()],
        ];
        rows.extend(names.iter().map(|(l, f)| vec![l.to_string(), f.to_string()]));
        let input: Vec<(&str, &[Vec<String>])> = vec![("Room 1", rows.as_slice())];
        ClassroomRoster::load(input)
    }

    fn source(last: &str, first: &str, origin: Origin) -> SourceRecord {
        SourceRecord {
            identity: IdentityKey::from_parts(last, first).unwrap(),
            aig_math: true,
            aig_reading: false,
            origin,
            grade: None,
            student_id: None,
            td_only: false,
        }
    }

    #[test]
    fn ledger_membership_is_by_normalized_key() {
        let ledger = MatchLedger::from_roster(&roster(&[("Lee", "Amy"), ("lee", " amy ")]));
        assert_eq!(ledger.len(), 1);
        assert!(ledger.contains(&IdentityKey::from_parts("LEE", "AMY").unwrap()));
        assert!(!ledger.contains(&IdentityKey::from_parts("LEE", "AMELIA").unwrap()));
    }

    #[test]
    fn unmatched_is_deduplicated() {
        let ledger = MatchLedger::from_roster(&roster(&[("Lee", "Amy")]));
        let records = vec![
            source("Park", "Sam", Origin::PdfSource),
            source("Lee", "Amy", Origin::PdfSource),
            source("Park", "Sam", Origin::DocxSource),
        ];
        let aggregates = aggregate_sources(&records);
        let missing = unmatched_sources(&aggregates, &ledger);
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].identity.last, "PARK");
        assert_eq!(missing[0].source_rows, 2);
    }
}
