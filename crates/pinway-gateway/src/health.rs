use std::fmt;

/// What the gateway knows about its storage node.
///
/// An unreachable node is a normal state, not an error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeHealth {
    Connected(String),
    NotConnected,
}

impl NodeHealth {
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected(_))
    }
}

impl fmt::Display for NodeHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connected(id) => write!(f, "connected to: {id}"),
            Self::NotConnected => write!(f, "not connected"),
        }
    }
}
