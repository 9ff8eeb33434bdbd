use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::model::{Item, ItemId};

//
// ─── GROUP ─────────────────────────────────────────────────────────────────────
//

/// Ordered batch of items, stored as a contiguous slice of the session's items.
///
/// Every group produced by the builder is a run of neighbouring items: the
/// initial partition is consecutive and merges only join adjacent groups.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Group {
    start: usize,
    end: usize,
}

impl Group {
    pub(crate) fn new(range: Range<usize>) -> Self {
        debug_assert!(range.start < range.end, "groups are never empty");
        Self {
            start: range.start,
            end: range.end,
        }
    }

    /// Concatenates `self` with the group immediately following it.
    pub(crate) fn joined(&self, next: &Group) -> Self {
        debug_assert_eq!(self.end, next.start, "only adjacent groups merge");
        Self {
            start: self.start,
            end: next.end,
        }
    }

    /// Index range of this group's items within `Session::items`.
    #[must_use]
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Always false; kept for parity with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

//
// ─── STAGE ─────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    /// First partition of the item list.
    Initial,
    /// Pairwise combination of the previous stage's groups.
    Merge,
}

/// One round of groups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    kind: StageKind,
    level: usize,
    groups: Vec<Group>,
}

impl Stage {
    pub(crate) fn new(kind: StageKind, level: usize, groups: Vec<Group>) -> Self {
        Self {
            kind,
            level,
            groups,
        }
    }

    #[must_use]
    pub fn kind(&self) -> StageKind {
        self.kind
    }

    #[must_use]
    pub fn level(&self) -> usize {
        self.level
    }

    #[must_use]
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    #[must_use]
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// Location of a group in stage-then-group order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupSlot {
    pub stage_index: usize,
    pub group_index: usize,
}

/// Immutable stage/group plan for one study attempt.
///
/// Built once by `SessionBuilder`; rebuild to retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session<P> {
    items: Vec<Item<P>>,
    stages: Vec<Stage>,
    steps_per_group: usize,
    total_steps: usize,
    slots: Vec<GroupSlot>,
}

impl<P> Session<P> {
    /// `total_steps` must equal `steps_per_group` times the group count; the
    /// builder computes it with overflow checking.
    pub(crate) fn new(
        items: Vec<Item<P>>,
        stages: Vec<Stage>,
        steps_per_group: usize,
        total_steps: usize,
    ) -> Self {
        let slots = stages
            .iter()
            .enumerate()
            .flat_map(|(stage_index, stage)| {
                (0..stage.group_count()).map(move |group_index| GroupSlot {
                    stage_index,
                    group_index,
                })
            })
            .collect();

        Self {
            items,
            stages,
            steps_per_group,
            total_steps,
            slots,
        }
    }

    #[must_use]
    pub fn items(&self) -> &[Item<P>] {
        &self.items
    }

    #[must_use]
    pub fn item_ids(&self) -> Vec<ItemId> {
        self.items.iter().map(|item| item.id.clone()).collect()
    }

    #[must_use]
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Total number of groups across every stage.
    #[must_use]
    pub fn group_count(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn steps_per_group(&self) -> usize {
        self.steps_per_group
    }

    /// `steps_per_group` times the number of groups in all stages.
    #[must_use]
    pub fn total_steps(&self) -> usize {
        self.total_steps
    }

    /// Every group in stage order, then group order.
    #[must_use]
    pub fn group_slots(&self) -> &[GroupSlot] {
        &self.slots
    }

    /// The final stage, which always holds exactly one group.
    #[must_use]
    pub fn terminal_stage(&self) -> &Stage {
        // The builder never produces a session without stages.
        &self.stages[self.stages.len() - 1]
    }

    #[must_use]
    pub fn group(&self, stage_index: usize, group_index: usize) -> Option<&Group> {
        self.stages
            .get(stage_index)
            .and_then(|stage| stage.groups.get(group_index))
    }

    /// Position of a group in stage-then-group order.
    #[must_use]
    pub fn ordinal_of(&self, stage_index: usize, group_index: usize) -> Option<usize> {
        let stage = self.stages.get(stage_index)?;
        if group_index >= stage.group_count() {
            return None;
        }
        let before: usize = self.stages[..stage_index]
            .iter()
            .map(Stage::group_count)
            .sum();
        Some(before + group_index)
    }

    #[must_use]
    pub fn items_of(&self, group: &Group) -> &[Item<P>] {
        &self.items[group.range()]
    }
}
