pub mod entity;
pub mod enums;
pub mod error;
pub mod patch;
pub mod query;
pub mod records;

// Re-export the core types to provide a clean public API.
pub use entity::{Audit, Entity};
pub use enums::{EntityKind, Role};
pub use error::CoreError;
pub use query::{Condition, Direction, Filter, Sort, SortKey, Value, Window};
pub use records::{
    Department, DepartmentDraft, DepartmentPatch, Schedule, ScheduleDraft, SchedulePatch, Shift,
    ShiftDraft, ShiftPatch, ShiftTemplate, ShiftTemplateDraft, ShiftTemplatePatch, ShiftType,
    ShiftTypeDraft, ShiftTypePatch, Team, TeamDraft, TeamMember, TeamMemberDraft, TeamMemberPatch,
    TeamPatch, User, UserDraft, UserPatch, WEEKDAY_COLUMNS,
};
