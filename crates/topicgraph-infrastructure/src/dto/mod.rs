//! Versioned persistence shapes.

mod session;

pub use session::{
    LinkEndpointV1_0_0, LinkV1_0_0, LinkV1_1_0, MessageV1_0_0, MessageV1_1_0, NodeV1_0_0,
    SenderV1_0_0, SessionV1_0_0, SessionV1_1_0, TopicV1_1_0, create_session_migrator,
};
