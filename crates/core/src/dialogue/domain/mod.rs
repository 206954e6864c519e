pub mod character_fixup;
pub mod comment_classifier;
pub mod dialogue_extractor;
pub mod dialogue_occurrence;
pub mod text_comparison;
