mod engine;
pub mod format;
mod model;
pub mod palette;
mod repository;

pub use engine::{CompletionHook, TickEngine, TickReport};
pub use format::{format_duration, parse_duration, progress_percentage};
pub use model::{NewTimer, Timer, TimerId, TimerStatus};
pub use palette::{category_color, FALLBACK_COLOR, PREDEFINED_CATEGORIES};
pub use repository::TimerRepository;
