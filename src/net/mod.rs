pub mod frame;
pub mod messages;
pub mod peer;

pub use frame::{read_frame, write_frame, FrameError, MAX_FRAME_SIZE};
pub use messages::{GameSnapshot, Message, PlayerZones};
pub use peer::{NetError, PeerConnection};
