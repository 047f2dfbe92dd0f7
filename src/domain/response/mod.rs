//! Response module - structured text returned to the caller.
//!
//! A [`FormattedResponse`] is an ordered list of [`Section`]s. Its markdown
//! render is the only text protocol; plain, JSON and YAML are projections
//! of the same sections.

pub mod cli;
pub mod compose;
mod errors;
mod formatted;
mod section;
mod template;

pub use cli::{wrap_text, CliLimits};
pub use errors::CompositionError;
pub use formatted::{
    FormattedResponse, RenderFormat, ResponseMetadata, SECTION_SEPARATOR, TRUNCATION_NOTICE,
    WORDS_PER_MINUTE,
};
pub use section::Section;
pub use template::ResponseTemplate;
