use vanity_protocol::ClientEvent;

use crate::ConnectionProfile;

/// Side effects requested by [`crate::update`]; the platform layer executes them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Send an event to the backend.
    Emit(ClientEvent),
    /// Show a blocking notice; nothing was sent.
    Alert(String),
    /// Ask the user a yes/no question. The answer comes back as
    /// `Msg::ConfirmationResolved`.
    Confirm { prompt: String },
    /// Fetch `/download/{result_file}` from the backend.
    OpenDownload { result_file: String },
    /// Persist the non-secret connection fields.
    SaveProfile(ConnectionProfile),
}
