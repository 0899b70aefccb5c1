// Fixed text and generation parameters. Nothing here is user-controlled.

/// Persona sent as the system message of every consultation.
pub const SYSTEM_PROMPT: &str = "You are an expert business consultant with years of experience helping companies grow and succeed. You provide actionable, specific advice tailored to each business. You are professional, insightful, and solution-oriented.";

/// Appended to the templated user message.
pub const ADVICE_INSTRUCTION: &str = "Please provide detailed, actionable advice for this business. Include specific strategies, steps they can take, and best practices relevant to their industry.";

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
pub const TEMPERATURE: f32 = 0.7;
pub const MAX_TOKENS: u32 = 1000;

// Caller-facing error strings returned by the gateway.
pub const MISSING_FIELDS_ERROR: &str = "Missing required fields";
pub const INVALID_BODY_ERROR: &str = "Invalid request body";
pub const API_KEY_MISSING_ERROR: &str = "OpenAI API key not configured";
pub const API_KEY_PLACEHOLDER: &str =
    "Please add your OPENAI_API_KEY to the environment variables to enable AI consultations.";
pub const GENERATION_FAILED_ERROR: &str = "Failed to generate response";
pub const GENERATION_FALLBACK: &str = "I apologize, but I encountered an error processing your request. Please make sure your OpenAI API key is configured correctly.";

/// Shown by the requester when the gateway cannot be reached or answers with a non-success status.
pub const CLIENT_FALLBACK: &str = "I apologize, but I encountered an error processing your request. Please make sure your OpenAI API key is configured correctly in your environment variables.";

pub const WELCOME_TEXT: &str = "Welcome to Firm AI";
pub const WELCOME_CHAR_DELAY_MS: u64 = 80;
pub const RESPONSE_CHAR_DELAY_MS: u64 = 20;

pub const QUERY_SUGGESTIONS: [&str; 6] = [
    "How do I grow my network?",
    "How do I create a marketplace for my business?",
    "What should be my target to earn every month in this business?",
    "What marketing strategies should I use?",
    "How can I improve my business operations?",
    "What are the key metrics I should track?",
];

pub const SHARE_BASE_URL: &str = "https://wa.me/";

// Environment variables read by the CLI (see `main.rs`).
pub const ENV_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_API_BASE: &str = "OPENAI_BASE_URL";
pub const ENV_MODEL: &str = "FIRM_AI_MODEL";
pub const ENV_WEBHOOK_URL: &str = "SHEETS_WEBHOOK_URL";
pub const ENV_PORT: &str = "FIRM_AI_PORT";
