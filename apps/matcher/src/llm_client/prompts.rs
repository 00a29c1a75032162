// Cross-cutting prompt fragments. Each service that talks to the LLM keeps its
// own prompts.rs alongside it; only the JSON discipline is shared.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Sent as an extra system message after a reply that was not a bare JSON object.
pub const TIGHTEN_JSON_SYSTEM: &str = "Your previous reply was rejected because it \
    contained text outside a single JSON object. Reply again with ONLY the JSON object: \
    the first character must be '{' and the last character must be '}'.";
