pub mod audio;
pub mod constants;
pub mod crossing;
pub mod geometry;
pub mod music;
pub mod protocol;
pub mod registry;
pub mod session;
pub mod trail;

pub use audio::*;
pub use constants::*;
pub use crossing::*;
pub use geometry::*;
pub use music::*;
pub use protocol::*;
pub use registry::*;
pub use session::*;
pub use trail::*;
