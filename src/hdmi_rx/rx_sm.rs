//! States, events and the transition table of the receiver state machine.
use strum_macros::{Display, EnumCount, EnumIter};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Display, EnumIter, EnumCount)]
pub enum State {
    #[strum(serialize = "dis-connected")]
    Disconnected,
    #[strum(serialize = "connected")]
    Connected,
    #[strum(serialize = "no-stream")]
    NoStream,
    #[strum(serialize = "stream-initialized")]
    StreamInitialized,
    #[strum(serialize = "stream-on")]
    StreamOn,
    #[strum(serialize = "stream-off")]
    StreamOff,
    #[strum(serialize = "phy-reset")]
    PhyReset,
    #[strum(serialize = "frl-config")]
    FrlConfig,
    #[strum(serialize = "frl-start")]
    FrlStart,
    #[strum(serialize = "tmds-config")]
    TmdsConfig,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Display, EnumIter, EnumCount)]
pub enum Event {
    #[strum(serialize = "dis-connected")]
    Disconnected,
    #[strum(serialize = "connected")]
    Connected,
    #[strum(serialize = "stream-initialize")]
    StreamInit,
    #[strum(serialize = "stream-up")]
    StreamUp,
    #[strum(serialize = "stream-down")]
    StreamDown,
    #[strum(serialize = "poll")]
    Poll,
    #[strum(serialize = "phy-reset")]
    PhyReset,
    #[strum(serialize = "frl-config")]
    FrlConfig,
    #[strum(serialize = "frl-start")]
    FrlStart,
    #[strum(serialize = "tmds-config")]
    TmdsConfig,
}

impl Event {
    /// State an event leads to from any connected state, before per-state exceptions.
    fn target(self) -> Option<State> {
        match self {
            Event::Disconnected => Some(State::Disconnected),
            Event::StreamInit => Some(State::StreamInitialized),
            Event::StreamUp => Some(State::StreamOn),
            Event::StreamDown => Some(State::StreamOff),
            Event::PhyReset => Some(State::PhyReset),
            Event::FrlConfig => Some(State::FrlConfig),
            Event::FrlStart => Some(State::FrlStart),
            Event::TmdsConfig => Some(State::TmdsConfig),
            Event::Connected | Event::Poll => None,
        }
    }
}

impl State {
    /// Looks up the transition for `event` in this state.
    ///
    /// `None` means the event is ignored: no entry action runs and nothing is
    /// recorded. `Some(next)` means the entry action of `next` runs, including the
    /// self-loops that re-fire their entry action (`Disconnected`,
    /// `StreamInitialized`, `StreamOn`, `PhyReset`, `FrlConfig`, `TmdsConfig`).
    pub fn next_state(self, event: Event) -> Option<State> {
        use Event as E;
        use State as S;

        match (self, event) {
            // Only a connect leaves the disconnected state.
            (S::Disconnected, E::Disconnected) => Some(S::Disconnected),
            (S::Disconnected, E::Connected) => Some(S::Connected),
            (S::Disconnected, _) => None,

            (S::NoStream, E::StreamUp) => None,
            (S::StreamOn | S::StreamOff | S::FrlStart, E::FrlStart) => None,
            (S::StreamOff, E::StreamDown) => None,

            (_, event) => event.target(),
        }
    }
}

/// Bookkeeping of the state machine.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct StateInfo {
    pub(crate) current: State,
    pub(crate) previous: State,
}

impl StateInfo {
    pub(crate) fn reset(&mut self) {
        self.current = State::Disconnected;
        self.previous = State::Disconnected;
    }

    pub fn current(&self) -> State {
        self.current
    }

    pub fn previous(&self) -> State {
        self.previous
    }
}

impl Default for StateInfo {
    fn default() -> Self {
        StateInfo {
            current: State::Disconnected,
            previous: State::Disconnected,
        }
    }
}
