pub mod controller;
pub mod export;
pub mod requests;
pub mod state;
pub mod view;

pub use controller::{WorkflowController, WorkflowError, WorkflowNotice};
pub use export::{export_file_name, ExportDocument};
pub use requests::RequestKey;
pub use state::{AppState, StateDelta, UploadDraft};
pub use view::{View, ViewCommand};
