pub mod events;
pub mod models;

pub use events::{CommentEvent, InboundEvent, LikeEvent};
pub use models::{ActivityRecord, ActivityStatus, ActivityType};
