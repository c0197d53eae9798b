use parse_display::Display;

/// Lifecycle of a room subscription.
///
/// Written only by the session task itself; everyone else gets a read handle.
#[derive(Clone, Copy, Debug, Default, Display, PartialEq, Eq)]
#[display(style = "lowercase")]
pub enum State {
    #[default]
    Disconnected,
    Connecting,
    Authenticating,
    Live,
    Reconnecting,
    Closed,
}

impl State {
    pub fn is_live(&self) -> bool {
        matches!(self, State::Live)
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, State::Closed)
    }
}
