pub mod stream;

pub use stream::{StreamParams, StreamQuery};
