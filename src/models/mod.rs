pub mod filter;
pub mod loaders;
pub mod paper;

pub use filter::SearchFilter;
pub use loaders::{load_all_toml_files, load_toml_to_sheet, SubmissionSheet};
pub use paper::{
    ApprovedPaper, Difficulty, ExamType, PaperDraft, QuestionType, SourceFile,
    SubmissionRequest, PDF_MEDIA_TYPE,
};
