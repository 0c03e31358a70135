mod block;
mod ring;
mod spmc;

pub use block::BLOCK_CAPACITY;
pub use ring::RingConfig;
pub use spmc::{Reader, SpmcRing, Writer};
