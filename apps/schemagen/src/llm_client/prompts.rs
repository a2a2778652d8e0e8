// Prompt constants for the bundled use cases.

/// System prompt for resume extraction.
pub const RESUME_SYSTEM: &str = "You are a precise resume parser. \
    Extract the candidate's details from the provided resume text into the given structure. \
    Use only information present in the text; leave optional fields null when they are absent.";

/// System prompt for synthetic resume generation (the all-fields-required variant).
pub const RESUME_JSON_MODE_SYSTEM: &str = "Generate a realistic resume using this schema. \
    Every field must be filled in.";

/// System prompt for step-by-step math tutoring.
pub const MATH_TUTOR_SYSTEM: &str =
    "You are a helpful math tutor. Guide the user through the solution step by step.";

/// Question asked when the math use case gets no prompt from the caller.
pub const MATH_DEFAULT_QUESTION: &str = "how can I solve 8x + 7 = -23";

/// System prompt for caller-supplied schemas.
pub const CUSTOM_SCHEMA_SYSTEM: &str = "You are a precise, structured assistant. \
    Fill out the JSON object using the provided schema and the user's input.";
