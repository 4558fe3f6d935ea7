pub mod ai;
pub mod count;
pub mod http;
pub mod pipeline;
pub mod preset;
pub mod settings;
pub mod trim;
pub mod verbose;

pub use ai::{
    AiCallError, AiOutcome, AiProcessor, DEFAULT_AI_ENDPOINT, DEFAULT_REWRITE_PROMPT,
    OpenAiCompatibleProcessor,
};
pub use count::effective_chars;
pub use pipeline::{Cancelled, ProcessResult, process_simple, process_with_ai};
pub use preset::{PresetLookup, PresetLookupError, PresetRule, PresetTable};
pub use settings::{PostProcessSettings, Settings};
pub use trim::trim_trailing;
pub use verbose::set_verbose;
