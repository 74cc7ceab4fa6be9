pub mod attention_entry;
pub mod class_room;
pub mod lesson_report;
pub mod school;
pub mod student;
pub mod unrecognized_entry;

pub use attention_entry::Entity as AttentionEntry;
pub use class_room::Entity as ClassRoom;
pub use lesson_report::Entity as LessonReport;
pub use school::Entity as School;
pub use student::Entity as Student;
pub use unrecognized_entry::Entity as UnrecognizedEntry;
