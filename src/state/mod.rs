//! State Module - Component-local state.
//!
//! - **Hooks** - `use_state`, hook records carried across generations, and the
//!   render request raised by setters

mod hooks;

pub use hooks::*;
pub(crate) use hooks::render_with_hooks;
