// Shared prompt fragments.
// Each module that calls the LLM defines its own prompts.rs alongside it;
// only cross-cutting fragments live here.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You MUST respond with a single valid JSON object only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Instruction that keeps the model inside the closed skill taxonomy.
pub const TAXONOMY_ONLY_INSTRUCTION: &str = "\
    CRITICAL: Use ONLY skill names and categories that appear verbatim in the provided taxonomy. \
    Do NOT invent, rename, or merge skills. \
    Evidence must be keyword-level: copy terms from the skill's keyword list, not sentences.";
