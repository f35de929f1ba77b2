use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use crate::catalog::SortOrder;
use crate::domain::{Activation, Priority, Source};

/// Per-call accumulator of pathway activations and advisory notes.
///
/// Registering an id twice merges the two entries: the stronger status and priority win and the
/// reasons are joined in registration order. Status and priority are therefore independent of
/// the order in which rules register; only the reason text is not.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActivationRegistry {
    activations: BTreeMap<String, Activation>,
    notes: BTreeMap<String, Activation>,
}

impl ActivationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, activation: Activation) {
        match self.activations.get_mut(&activation.id) {
            Some(existing) => merge_into(existing, activation),
            None => {
                self.activations.insert(activation.id.clone(), activation);
            }
        }
    }

    /// Record an advisory note. Notes are never merged; the first note with a given id wins.
    pub fn note(&mut self, note: Activation) {
        self.notes.entry(note.id.clone()).or_insert(note);
    }

    /// Raise every registered activation listed in `forced` to CRITICAL and append `note` to its
    /// reason. Returns the escalated ids in ascending order.
    pub fn escalate(&mut self, forced: &BTreeSet<String>, note: &str) -> Vec<String> {
        let mut escalated = Vec::new();
        for (id, activation) in self.activations.iter_mut() {
            if !forced.contains(id) {
                continue;
            }
            activation.priority = Priority::Critical;
            activation.reason = join_reason(&activation.reason, note);
            escalated.push(id.clone());
        }
        escalated
    }

    pub fn get(&self, id: &str) -> Option<&Activation> {
        self.activations.get(id)
    }

    pub fn get_note(&self, id: &str) -> Option<&Activation> {
        self.notes.get(id)
    }

    pub fn activations(&self) -> impl Iterator<Item = &Activation> {
        self.activations.values()
    }

    pub fn notes(&self) -> impl Iterator<Item = &Activation> {
        self.notes.values()
    }

    pub fn len(&self) -> usize {
        self.activations.len() + self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.activations.is_empty() && self.notes.is_empty()
    }

    /// Activations followed by notes, ordered by priority, status, publisher, name, then id.
    pub fn into_sorted(self, order: &SortOrder) -> Vec<Activation> {
        let mut entries: Vec<Activation> = self
            .activations
            .into_values()
            .chain(self.notes.into_values())
            .collect();
        entries.sort_by(|left, right| compare(left, right, order));
        entries
    }
}

fn merge_into(existing: &mut Activation, incoming: Activation) {
    existing.status = existing.status.max(incoming.status);
    existing.priority = existing.priority.max(incoming.priority);
    existing.reason = join_reason(&existing.reason, &incoming.reason);
}

fn join_reason(existing: &str, addition: &str) -> String {
    if existing.is_empty() {
        addition.to_string()
    } else {
        format!("{existing}; {addition}")
    }
}

fn chop_rank(source: Source, order: &SortOrder) -> u8 {
    match (order.chop_first, source) {
        (true, Source::Chop) | (false, _) => 0,
        (true, _) => 1,
    }
}

fn compare(left: &Activation, right: &Activation, order: &SortOrder) -> Ordering {
    order
        .priority_rank(left.priority)
        .cmp(&order.priority_rank(right.priority))
        .then_with(|| {
            order
                .status_rank(left.status)
                .cmp(&order.status_rank(right.status))
        })
        .then_with(|| chop_rank(left.source, order).cmp(&chop_rank(right.source, order)))
        .then_with(|| left.name.to_lowercase().cmp(&right.name.to_lowercase()))
        .then_with(|| left.id.cmp(&right.id))
}
