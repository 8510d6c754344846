//! Synthetic input used to advance content between shots.
//!
//! A scroll is either one wheel event or one key press of a navigation key.
//! Synthesis is fire-and-forget: there is no way to confirm the target
//! application processed the event.

pub mod keys;
pub mod scroll;
pub mod synthesizer;

pub use keys::NavigationKey;
pub use scroll::{ScrollPolicy, ScrollSpec, SyntheticEvent};
pub use synthesizer::{InputError, InputSynthesizer, YdotoolSynthesizer};
