pub mod verification_record;
pub mod verification_reporter;
pub mod verify_dialogues_use_case;
