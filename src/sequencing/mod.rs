// Purpose: the pattern, the playhead, and what the grid shows
// This layer knows nothing about where clock edges come from

pub mod display;
pub mod pattern;
pub mod sequencer;
pub mod state;

pub use display::{render, LedFrame};
pub use pattern::{Pattern, NUM_ROWS, NUM_STEPS};
pub use state::SequencerState;
