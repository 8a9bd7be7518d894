#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod progress_service;
pub mod sessions;

pub use progress_core::Clock;

pub use app_services::AppServices;
pub use error::{AppServicesError, ProgressServiceError};
pub use progress_service::{ProgressService, ProgressSettings};

pub use sessions::{
    QuizLoopService, QuizProgress, QuizResult, QuizSession, TheoryLoopService, TheoryPageSession,
};
