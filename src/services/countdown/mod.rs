mod display;
mod engine;
mod notifications;

pub use display::{format_countdown, AT_TARGET_TEXT, COUNTING_DOWN_PREFIX, COUNTING_UP_PREFIX};
pub use engine::{
    CountdownEngine, FETCH_FAILED_TEXT, LOADING_TEXT, NOT_AVAILABLE_TEXT, PARSE_FAILED_TEXT,
};
