pub mod types;
pub mod slot_utils;
pub mod occupancy;
pub mod adjacency;
pub mod policy;
pub mod inputs;
pub mod generator;
mod repair;
pub mod snapshot;

pub use types::{
    Assignment, AssignmentRecord, CellKey, ClassId, Day, Period, PeriodKind, PlacedSubject,
    SchoolClass, Subject, SubjectId, TeacherId, TeacherRef, TeacherRoster, FRIDAY,
};
pub use slot_utils::PeriodGrid;
pub use occupancy::OccupancyTracker;
pub use adjacency::violates_adjacency;
pub use policy::{PlacementPolicy, RotationCursor, CEREMONIAL_TOKEN};
pub use inputs::{Directory, GenerationInputs, TemplateSource};
pub use generator::{GenerationReport, Scheduler};
pub use snapshot::PlanSession;
