pub mod job;
pub mod language;
pub mod match_record;
pub mod resume;
