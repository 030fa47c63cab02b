use serde::{Deserialize, Serialize};

/// Structured form of a free-text CV, produced by keyword extraction.
///
/// Held as the "last parsed CV" singleton in the store and overwritten by
/// each parse request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredCv {
    pub skills: Vec<String>,
    pub experience_years: u32,
    pub diplomas: Vec<String>,
    pub has_rare_skill: bool,
}

impl StructuredCv {
    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
            && self.diplomas.is_empty()
            && self.experience_years == 0
            && !self.has_rare_skill
    }
}
