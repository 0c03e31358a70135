pub mod tick;
pub use tick::{SymbolId, Tick};
