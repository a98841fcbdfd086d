pub mod repository;
pub mod schema;
pub mod walk;

pub use repository::{
    load_dir, load_file, tree_files, InMemoryTreeRepository, TreeRepository, TreeSummary,
};
pub use schema::{Answer, AnswerOption, AnswerParseError, DecisionTree, Outcome, Question};
pub use walk::{next_step, WalkStep};
