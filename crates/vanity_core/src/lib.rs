//! Vanity core: pure session controller and view-model helpers.
mod effect;
mod form;
mod msg;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use form::{ConnectionProfile, CpuSlider, FormField, FormState, DEFAULT_PORT, DEFAULT_USERNAME};
pub use msg::Msg;
pub use state::{AppState, PendingAction, PendingConfirmation, ServerInfo, SessionState};
pub use update::update;
pub use view_model::{AppViewModel, ServerInfoView, StatusLine, TerminalLine, Tone};
pub use vanity_protocol::{
    ClientEvent, ConnectionRequest, ConnectionResult, GenerationRequest, ServerEvent, TaskId,
};
