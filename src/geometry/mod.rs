pub mod hit_testing;

pub use hit_testing::{LINE_HIT_TOLERANCE, contains, topmost_hit};
