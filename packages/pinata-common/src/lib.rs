pub mod random;
pub mod types;

pub use random::{derive_random_value, winning_position, winning_positions};
pub use types::{RoundStatus, Role};
