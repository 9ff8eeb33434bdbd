mod ids;
mod item;
mod session;
mod settings;

pub use ids::{ItemId, MarkerId, ParseItemIdError};
pub use item::Item;
pub use session::{Group, GroupSlot, Session, Stage, StageKind};
pub use settings::{DEFAULT_STEPS_PER_GROUP, SettingsError, StudySettings};
