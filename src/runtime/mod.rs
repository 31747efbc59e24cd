/// Batch querying and superset synthesis - Gateway
mod batch;
mod output;
mod progress;
mod superset;
mod workflow;

pub use batch::{query_all_models, section_header, BatchReport, SectionReport};
pub use output::ResponseStore;
pub use progress::{fragment_progress, model_progress};
pub use superset::{create_superset_document, superset_messages, SupersetReport};
pub use workflow::{run_query_workflow, run_superset_workflow, QueryOptions};
