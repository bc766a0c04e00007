//! Display-ready strings derived from presentation state. Rendering itself
//! belongs to the template collaborator; it only reads these.

pub mod labels;
pub mod time_format;
