//! Capability discovery service.
//!
//! Provides [`DiscoveryService`], which keeps the inverted indexes in step
//! with the record set and answers filtered and ranked lookups.

use super::index::{IndexState, Relevance};
use crate::agent::domain::{AgentId, AgentRecord};
use crate::discovery::domain::{
    DiscoveryQuery, IndexStats, Ordering, SearchHit, SortKey, SortOrder, tokenize,
};
use crate::discovery::ports::RankingSignals;
use std::cmp::Ordering as CmpOrdering;
use std::collections::BTreeSet;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

/// Discovery index over the canonical record set.
///
/// Each mutation runs under one write lock, so readers always observe an
/// index that matches some prefix of the applied mutations. The index is
/// derived state; [`DiscoveryService::rebuild`] restores it from records.
#[derive(Debug, Default)]
pub struct DiscoveryService {
    state: RwLock<IndexState>,
}

impl DiscoveryService {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Indexes a record, replacing any previous entry for the same id.
    pub fn index(&self, record: &AgentRecord) {
        self.write().insert(record);
        debug!(agent_id = %record.id(), "agent indexed");
    }

    /// Removes a record from every index. Returns whether it was indexed.
    pub fn deindex(&self, id: &AgentId) -> bool {
        let removed = self.write().remove(id);
        if removed {
            debug!(agent_id = %id, "agent deindexed");
        }
        removed
    }

    /// Replaces the whole index with one built from `records`.
    pub fn rebuild<'a>(&self, records: impl IntoIterator<Item = &'a AgentRecord>) {
        let rebuilt = IndexState::from_records(records);
        let agents = rebuilt.len();
        *self.write() = rebuilt;
        debug!(agents, "discovery index rebuilt");
    }

    /// Returns whether an agent is indexed.
    #[must_use]
    pub fn contains(&self, id: &AgentId) -> bool {
        self.read().entry(id).is_some()
    }

    /// Returns the number of indexed agents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Returns whether the index is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the size of each index.
    #[must_use]
    pub fn stats(&self) -> IndexStats {
        self.read().stats()
    }

    /// Runs a filtered lookup and returns one page of matching ids.
    ///
    /// Queries whose text yields tokens are ranked by relevance, then by
    /// `updated_at` descending, then by id. Other queries follow
    /// `query.ordering` with ties broken by ascending id.
    #[must_use]
    pub fn query(&self, query: &DiscoveryQuery, signals: &impl RankingSignals) -> Vec<AgentId> {
        let text_tokens = query_tokens(query.text.as_deref());
        let candidates = {
            let state = self.read();
            let ids = state.filter(query.skill.as_deref(), query.protocol, &query.tags);
            if text_tokens.is_empty() {
                Candidates::Unranked(
                    ids.into_iter()
                        .filter_map(|id| {
                            state
                                .entry(&id)
                                .map(|entry| (id, entry.created_at(), entry.updated_at()))
                        })
                        .collect(),
                )
            } else {
                let mut relevance = state.rank(&text_tokens);
                Candidates::Ranked(
                    ids.into_iter()
                        .filter_map(|id| {
                            let scored = relevance.remove(&id)?;
                            let updated_at = state.entry(&id)?.updated_at();
                            Some(Ranked {
                                id,
                                relevance: scored,
                                updated_at,
                            })
                        })
                        .collect(),
                )
            }
        };

        let page = |ids: Vec<AgentId>| -> Vec<AgentId> {
            ids.into_iter()
                .skip(query.offset)
                .take(query.limit)
                .collect()
        };

        match candidates {
            Candidates::Ranked(mut ranked) => {
                if query.healthy_only {
                    ranked.retain(|hit| signals.is_healthy(&hit.id));
                }
                sort_ranked(&mut ranked);
                page(ranked.into_iter().map(|hit| hit.id).collect())
            }
            Candidates::Unranked(mut rows) => {
                if query.healthy_only {
                    rows.retain(|(id, _, _)| signals.is_healthy(id));
                }
                page(sort_unranked(rows, query.ordering, signals))
            }
        }
    }

    /// Ranks every agent against free text with no other filter.
    ///
    /// Text without any alphanumeric token, or matching nothing, yields an
    /// empty list.
    #[must_use]
    pub fn search(&self, text: &str, limit: usize) -> Vec<SearchHit> {
        let text_tokens = query_tokens(Some(text));
        if text_tokens.is_empty() {
            return Vec::new();
        }
        let mut ranked: Vec<Ranked> = {
            let state = self.read();
            state
                .rank(&text_tokens)
                .into_iter()
                .filter_map(|(id, relevance)| {
                    let updated_at = state.entry(&id)?.updated_at();
                    Some(Ranked {
                        id,
                        relevance,
                        updated_at,
                    })
                })
                .collect()
        };
        sort_ranked(&mut ranked);
        ranked
            .into_iter()
            .take(limit)
            .map(|hit| SearchHit {
                id: hit.id,
                score: hit.relevance.score,
                matched_fields: hit.relevance.fields.into_iter().collect(),
            })
            .collect()
    }

    fn read(&self) -> RwLockReadGuard<'_, IndexState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, IndexState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

pub(crate) type UnrankedRow = (AgentId, chrono::DateTime<chrono::Utc>, chrono::DateTime<chrono::Utc>);

enum Candidates {
    Ranked(Vec<Ranked>),
    Unranked(Vec<UnrankedRow>),
}

struct Ranked {
    id: AgentId,
    relevance: Relevance,
    updated_at: chrono::DateTime<chrono::Utc>,
}

fn query_tokens(text: Option<&str>) -> BTreeSet<String> {
    text.map(tokenize).unwrap_or_default().into_iter().collect()
}

fn sort_ranked(ranked: &mut [Ranked]) {
    ranked.sort_by(|left, right| {
        right
            .relevance
            .score
            .total_cmp(&left.relevance.score)
            .then_with(|| right.updated_at.cmp(&left.updated_at))
            .then_with(|| left.id.cmp(&right.id))
    });
}

/// Orders rows by `ordering`, breaking ties by ascending id.
pub(crate) fn sort_unranked(
    rows: Vec<UnrankedRow>,
    ordering: Ordering,
    signals: &impl RankingSignals,
) -> Vec<AgentId> {
    let mut keyed: Vec<(AgentId, SortValue)> = rows
        .into_iter()
        .map(|(id, created_at, updated_at)| {
            let value = match ordering.key {
                SortKey::TrustScore => SortValue::Float(signals.trust_score(&id)),
                SortKey::UpdatedAt => SortValue::Time(updated_at),
                SortKey::CreatedAt => SortValue::Time(created_at),
                SortKey::Invocations => SortValue::Count(signals.invocations(&id)),
            };
            (id, value)
        })
        .collect();
    keyed.sort_by(|(left_id, left), (right_id, right)| {
        let primary = match ordering.order {
            SortOrder::Asc => left.compare(right),
            SortOrder::Desc => right.compare(left),
        };
        primary.then_with(|| left_id.cmp(right_id))
    });
    keyed.into_iter().map(|(id, _)| id).collect()
}

enum SortValue {
    Float(f64),
    Time(chrono::DateTime<chrono::Utc>),
    Count(u64),
}

impl SortValue {
    fn compare(&self, other: &Self) -> CmpOrdering {
        match (self, other) {
            (Self::Float(left), Self::Float(right)) => left.total_cmp(right),
            (Self::Time(left), Self::Time(right)) => left.cmp(right),
            (Self::Count(left), Self::Count(right)) => left.cmp(right),
            _ => CmpOrdering::Equal,
        }
    }
}
