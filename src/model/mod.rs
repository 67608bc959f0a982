pub mod attendance;
pub mod role;
pub mod school_class;
pub mod staff;
pub mod timetable;
