pub mod logger;

pub use logger::trace_id::TraceId;
pub use logger::{child_span, init_logger, root_span};
