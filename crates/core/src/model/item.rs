use serde::{Deserialize, Serialize};

use crate::model::ids::ItemId;

/// Atomic unit of study content.
///
/// The scheduler only ever reads `id`; `payload` is carried through untouched
/// so callers can attach display text, locations or anything else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item<P> {
    pub id: ItemId,
    pub payload: P,
}

impl<P> Item<P> {
    #[must_use]
    pub fn new(id: impl Into<ItemId>, payload: P) -> Self {
        Self {
            id: id.into(),
            payload,
        }
    }

    #[must_use]
    pub fn id(&self) -> &ItemId {
        &self.id
    }

    #[must_use]
    pub fn payload(&self) -> &P {
        &self.payload
    }
}

impl Item<String> {
    /// Builds an item whose payload is its own label.
    #[must_use]
    pub fn text(label: impl Into<String>) -> Self {
        let label = label.into();
        Self {
            id: ItemId::new(label.clone()),
            payload: label,
        }
    }
}
