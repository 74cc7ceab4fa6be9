pub mod class_room;
pub mod lesson_report;
pub mod school;
pub mod student;
