pub mod autocomplete;
pub mod message;
pub mod pagination;

pub use autocomplete::{AutocompleteService, Candidates};
pub use message::{MessageError, MessageService};
pub use pagination::{HistoryRequest, PaginationService};
