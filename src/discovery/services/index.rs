//! Inverted indexes over the canonical record set.
#![expect(
    clippy::float_arithmetic,
    reason = "relevance scores are weighted sums"
)]

use crate::agent::domain::{AgentId, AgentRecord, Protocol};
use crate::discovery::domain::{IndexStats, MatchedField, tokenize};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::hash::Hash;
use std::ops::Bound;

/// Factor applied to a field weight when a query token is only a prefix of
/// the indexed token.
const PREFIX_FACTOR: f64 = 0.5;

type Postings = BTreeMap<AgentId, BTreeSet<MatchedField>>;

/// Index-side copy of the record fields used for filtering and ordering.
#[derive(Debug, Clone)]
pub(super) struct IndexedAgent {
    protocol: Protocol,
    skills: BTreeSet<String>,
    tags: BTreeSet<String>,
    tokens: BTreeSet<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl IndexedAgent {
    pub(super) const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub(super) const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

/// Accumulated relevance of one agent for a text query.
#[derive(Debug, Clone, Default)]
pub(super) struct Relevance {
    pub(super) score: f64,
    pub(super) fields: BTreeSet<MatchedField>,
}

/// All discovery indexes, mutated together under one lock.
#[derive(Debug, Default)]
pub(super) struct IndexState {
    entries: HashMap<AgentId, IndexedAgent>,
    by_skill: HashMap<String, BTreeSet<AgentId>>,
    by_protocol: HashMap<Protocol, BTreeSet<AgentId>>,
    by_tag: HashMap<String, BTreeSet<AgentId>>,
    tokens: BTreeMap<String, Postings>,
}

impl IndexState {
    pub(super) fn from_records<'a>(records: impl IntoIterator<Item = &'a AgentRecord>) -> Self {
        let mut state = Self::default();
        for record in records {
            state.insert(record);
        }
        state
    }

    /// Indexes a record, replacing any previous entry for the same id.
    pub(super) fn insert(&mut self, record: &AgentRecord) {
        let id = record.id();
        self.remove(id);

        let mut field_tokens: BTreeMap<String, BTreeSet<MatchedField>> = BTreeMap::new();
        let mut collect = |text: &str, field: MatchedField| {
            for token in tokenize(text) {
                field_tokens.entry(token).or_default().insert(field);
            }
        };
        collect(record.name(), MatchedField::Name);
        collect(record.description(), MatchedField::Description);
        for tag in record.tags() {
            collect(tag, MatchedField::Tags);
        }
        for skill in record.skills() {
            collect(skill.name(), MatchedField::Skills);
        }

        let skills: BTreeSet<String> = record
            .skills()
            .iter()
            .map(|skill| normalize_key(skill.name()))
            .collect();
        let tags: BTreeSet<String> = record.tags().iter().map(|tag| normalize_key(tag)).collect();

        for skill in &skills {
            add_to(&mut self.by_skill, skill.clone(), id);
        }
        for tag in &tags {
            add_to(&mut self.by_tag, tag.clone(), id);
        }
        add_to(&mut self.by_protocol, record.protocol(), id);
        for (token, fields) in &field_tokens {
            self.tokens
                .entry(token.clone())
                .or_default()
                .insert(id.clone(), fields.clone());
        }

        self.entries.insert(
            id.clone(),
            IndexedAgent {
                protocol: record.protocol(),
                skills,
                tags,
                tokens: field_tokens.into_keys().collect(),
                created_at: record.created_at(),
                updated_at: record.updated_at(),
            },
        );
    }

    /// Removes every index entry for `id`. Returns whether it was indexed.
    pub(super) fn remove(&mut self, id: &AgentId) -> bool {
        let Some(entry) = self.entries.remove(id) else {
            return false;
        };
        for skill in &entry.skills {
            remove_from(&mut self.by_skill, skill, id);
        }
        for tag in &entry.tags {
            remove_from(&mut self.by_tag, tag, id);
        }
        remove_from(&mut self.by_protocol, &entry.protocol, id);
        for token in &entry.tokens {
            if let Some(postings) = self.tokens.get_mut(token) {
                postings.remove(id);
                if postings.is_empty() {
                    self.tokens.remove(token);
                }
            }
        }
        true
    }

    pub(super) fn entry(&self, id: &AgentId) -> Option<&IndexedAgent> {
        self.entries.get(id)
    }

    pub(super) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Ids matching every supplied filter, in ascending id order.
    ///
    /// Evaluation starts from the smallest matching bucket and probes the
    /// others; without filters every indexed id is returned.
    pub(super) fn filter(
        &self,
        skill: Option<&str>,
        protocol: Option<Protocol>,
        tags: &[String],
    ) -> Vec<AgentId> {
        let mut buckets: Vec<&BTreeSet<AgentId>> = Vec::new();
        if let Some(name) = skill {
            match self.by_skill.get(&normalize_key(name)) {
                Some(bucket) => buckets.push(bucket),
                None => return Vec::new(),
            }
        }
        if let Some(wanted) = protocol {
            match self.by_protocol.get(&wanted) {
                Some(bucket) => buckets.push(bucket),
                None => return Vec::new(),
            }
        }
        for tag in tags.iter().map(|tag| normalize_key(tag)) {
            if tag.is_empty() {
                continue;
            }
            match self.by_tag.get(&tag) {
                Some(bucket) => buckets.push(bucket),
                None => return Vec::new(),
            }
        }

        buckets.sort_by_key(|bucket| bucket.len());
        let Some((smallest, rest)) = buckets.split_first() else {
            let mut all: Vec<AgentId> = self.entries.keys().cloned().collect();
            all.sort();
            return all;
        };
        smallest
            .iter()
            .filter(|id| rest.iter().all(|bucket| bucket.contains(*id)))
            .cloned()
            .collect()
    }

    /// Scores every agent matching at least one query token.
    ///
    /// Each query token contributes its best field match per agent: the
    /// field weight for an exact token, half of it for a prefix.
    pub(super) fn rank(&self, query_tokens: &BTreeSet<String>) -> HashMap<AgentId, Relevance> {
        let mut relevance: HashMap<AgentId, Relevance> = HashMap::new();
        for token in query_tokens {
            let mut best: HashMap<&AgentId, f64> = HashMap::new();
            let matches = self
                .tokens
                .range::<str, _>((Bound::Included(token.as_str()), Bound::Unbounded))
                .take_while(|(indexed, _)| indexed.starts_with(token.as_str()));
            for (indexed, postings) in matches {
                let factor = if indexed == token { 1.0 } else { PREFIX_FACTOR };
                for (id, fields) in postings {
                    let weight = fields
                        .iter()
                        .map(|field| field.weight())
                        .fold(0.0, f64::max)
                        * factor;
                    let slot = best.entry(id).or_insert(0.0);
                    *slot = slot.max(weight);
                    relevance
                        .entry(id.clone())
                        .or_default()
                        .fields
                        .extend(fields.iter().copied());
                }
            }
            for (id, weight) in best {
                if let Some(entry) = relevance.get_mut(id) {
                    entry.score += weight;
                }
            }
        }
        relevance.retain(|_, entry| entry.score > 0.0);
        relevance
    }

    pub(super) fn stats(&self) -> IndexStats {
        IndexStats {
            agents: self.entries.len(),
            skills: self.by_skill.len(),
            protocols: self.by_protocol.len(),
            tags: self.by_tag.len(),
            tokens: self.tokens.len(),
        }
    }
}

fn normalize_key(value: &str) -> String {
    value.trim().to_lowercase()
}

fn add_to<K>(buckets: &mut HashMap<K, BTreeSet<AgentId>>, key: K, id: &AgentId)
where
    K: Eq + Hash,
{
    buckets.entry(key).or_default().insert(id.clone());
}

fn remove_from<K>(buckets: &mut HashMap<K, BTreeSet<AgentId>>, key: &K, id: &AgentId)
where
    K: Eq + Hash,
{
    if let Some(bucket) = buckets.get_mut(key) {
        bucket.remove(id);
        if bucket.is_empty() {
            buckets.remove(key);
        }
    }
}
