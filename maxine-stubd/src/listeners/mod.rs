//! Socket responders for the fast discovery channels

pub mod tcp;
pub mod udp;
