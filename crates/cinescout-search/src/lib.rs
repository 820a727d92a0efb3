//! Turns raw search input into catalog fetches and trending updates.
//!
//! Keystrokes go into [`QueryController::set_input`]; after the input has
//! been quiet for the debounce window the settled value is fetched, and the
//! newest answer lands in the published [`SearchState`].

pub mod controller;
pub mod debounce;
pub mod state;

pub use controller::{QueryController, SearchSettings};
pub use debounce::spawn_debouncer;
pub use state::{SearchMode, SearchState, BROWSE_EMPTY_MESSAGE, FETCH_FAILED_MESSAGE};
