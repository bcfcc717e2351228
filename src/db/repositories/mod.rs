mod lesson_repository;
mod progress_repository;
mod quiz_repository;
mod user_repository;

pub use lesson_repository::LessonRepository;
pub use progress_repository::ProgressRepository;
pub use quiz_repository::QuizRepository;
pub use user_repository::UserRepository;
