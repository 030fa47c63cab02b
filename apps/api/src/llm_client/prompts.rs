// Shared prompt constants. Prompts that belong to a single route family
// live here with it; cross-cutting fragments stay at the top.

use crate::models::cv::StructuredCv;

/// System prompt seeded into every new conversation.
pub const CONVERSATION_SYSTEM: &str = "\
    Tu es l'assistant CVNU, un conseiller carrière francophone. \
    Tu aides l'utilisateur à construire et valoriser son CV numérique universel : \
    compétences, années d'expérience, diplômes. \
    Réponds de façon concise et concrète, en français.";

/// System prompt for one-shot /api/generate completions.
pub const GENERATE_SYSTEM: &str = "\
    Tu es l'assistant CVNU. Réponds à la demande de l'utilisateur de façon \
    utile et concise, en français sauf si la demande est dans une autre langue.";

/// System prompt for rendering a structured CV as an HTML snippet.
pub const RENDER_HTML_SYSTEM: &str = "\
    You render structured CV data as a clean, self-contained HTML snippet. \
    Respond with HTML only: one top-level <section> element, semantic markup, \
    no <html> or <body> wrapper, no scripts, no external resources, \
    no markdown code fences.";

/// Builds the user prompt for the HTML render call.
pub fn render_html_prompt(cv: &StructuredCv) -> String {
    let cv_json = serde_json::to_string_pretty(cv).unwrap_or_else(|_| "{}".to_string());
    format!(
        "Render this structured CV as an HTML snippet. \
         Section order: skills, experience, diplomas. \
         Mention the rare-skill distinction only when it is set.\n\n{cv_json}"
    )
}
