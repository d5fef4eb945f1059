//! Population registry: live agents, births pending until tick end, and
//! agents marked for removal.

use crate::grid::AgentId;
use crate::organism::Agent;
use std::collections::{BTreeMap, BTreeSet};

/// Everything that changed when a tick was committed
#[derive(Debug, Default)]
pub struct Settlement {
    /// Ids of newborns that joined the live set
    pub born: Vec<AgentId>,
    /// Agents removed, in id order
    pub died: Vec<Agent>,
}

/// Owns every agent. Iteration follows id order, which is creation order.
#[derive(Debug, Default)]
pub struct PopulationRegistry {
    live: BTreeMap<AgentId, Agent>,
    nursery: BTreeMap<AgentId, Agent>,
    doomed: BTreeSet<AgentId>,
}

impl PopulationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an agent to the live set immediately
    pub fn insert(&mut self, agent: Agent) {
        self.live.insert(agent.id, agent);
    }

    /// Hold a newborn until the tick is settled
    pub fn defer_birth(&mut self, agent: Agent) {
        self.nursery.insert(agent.id, agent);
    }

    /// Look up a live or newborn agent
    pub fn get(&self, id: AgentId) -> Option<&Agent> {
        self.live.get(&id).or_else(|| self.nursery.get(&id))
    }

    pub fn get_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        match self.live.get_mut(&id) {
            Some(agent) => Some(agent),
            None => self.nursery.get_mut(&id),
        }
    }

    /// Flag an agent for removal at tick end. Returns false if it was
    /// already flagged or is unknown.
    pub fn mark_dead(&mut self, id: AgentId) -> bool {
        self.get(id).is_some() && self.doomed.insert(id)
    }

    #[inline]
    pub fn is_marked_dead(&self, id: AgentId) -> bool {
        self.doomed.contains(&id)
    }

    /// Known and not flagged for removal
    pub fn is_alive(&self, id: AgentId) -> bool {
        self.get(id).is_some() && !self.is_marked_dead(id)
    }

    /// Snapshot of live ids in iteration order
    pub fn ids(&self) -> Vec<AgentId> {
        self.live.keys().copied().collect()
    }

    /// Live agents in id order; newborns appear after `settle`
    pub fn iter(&self) -> impl Iterator<Item = &Agent> + '_ {
        self.live.values()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.live.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    pub fn pending_births(&self) -> usize {
        self.nursery.len()
    }

    /// Remove flagged agents and commit newborns
    pub fn settle(&mut self) -> Settlement {
        let mut settlement = Settlement::default();

        for id in std::mem::take(&mut self.doomed) {
            if let Some(agent) = self.live.remove(&id).or_else(|| self.nursery.remove(&id)) {
                settlement.died.push(agent);
            }
        }

        for (id, agent) in std::mem::take(&mut self.nursery) {
            settlement.born.push(id);
            self.live.insert(id, agent);
        }

        settlement
    }

    pub fn clear(&mut self) {
        self.live.clear();
        self.nursery.clear();
        self.doomed.clear();
    }
}
