use std::collections::{BTreeMap, BTreeSet};

use crate::model::{AigFlags, IdentityKey, Origin, SourceRecord};

/// Every source row naming one identity, folded together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceAggregate {
    pub identity: IdentityKey,
    pub flags: AigFlags,
    pub origins: BTreeSet<Origin>,
    /// First non-empty value observed.
    pub student_id: Option<String>,
    pub grade: Option<String>,
    pub source_rows: usize,
    /// Every folded row was TD-only.
    pub td_only: bool,
}

impl SourceAggregate {
    fn new(identity: IdentityKey) -> Self {
        Self {
            identity,
            flags: AigFlags::NONE,
            origins: BTreeSet::new(),
            student_id: None,
            grade: None,
            source_rows: 0,
            td_only: true,
        }
    }

    fn absorb(&mut self, record: &SourceRecord) {
        self.flags = self.flags.merge(record.flags());
        self.origins.insert(record.origin);
        if self.student_id.is_none() {
            self.student_id = record.student_id.clone();
        }
        if self.grade.is_none() {
            self.grade = record.grade.clone();
        }
        self.source_rows += 1;
        self.td_only &= record.td_only;
    }
}

/// Group source records by identity, OR-merging flags across rows and
/// origins. Order of `records` does not affect the merged flags.
pub fn aggregate_sources(records: &[SourceRecord]) -> BTreeMap<IdentityKey, SourceAggregate> {
    let mut groups: BTreeMap<IdentityKey, SourceAggregate> = BTreeMap::new();

    for record in records {
        groups
            .entry(record.identity.clone())
            .or_insert_with(|| SourceAggregate::new(record.identity.clone()))
            .absorb(record);
    }

    groups
}
