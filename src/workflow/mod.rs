pub mod compose_form;
pub mod file_selection;
pub mod search_panel;

pub use compose_form::{ComposeForm, SubmitState};
pub use file_selection::FileSelection;
pub use search_panel::SearchPanel;
