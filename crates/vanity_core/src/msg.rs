use vanity_protocol::ServerEvent;

use crate::{ConnectionProfile, FormField};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// User edited one form input.
    FormEdited(FormField),
    /// Restore the saved connection profile at start-up.
    ProfileRestored(ConnectionProfile),
    /// User clicked "Test connection".
    TestConnectionClicked,
    /// User clicked "Start".
    StartClicked,
    /// User clicked "Stop".
    StopClicked,
    /// User clicked "Download".
    DownloadClicked,
    /// User cleared the terminal view.
    ClearTerminalClicked,
    /// User answered the pending confirmation prompt.
    ConfirmationResolved { accepted: bool },
    /// Inbound message from the backend or the transport.
    Server(ServerEvent),
    /// A downloaded result file was written locally.
    DownloadSaved { result_file: String, path: String },
    /// A download attempt failed.
    DownloadFailed { result_file: String, reason: String },
    /// The transport could not decode or deliver a frame.
    TransportError(String),
    /// Fallback for placeholder wiring.
    NoOp,
}

impl Msg {
    /// Messages that originate from the user interacting with the page.
    ///
    /// These are held back while a confirmation prompt is open.
    pub fn is_user_action(&self) -> bool {
        matches!(
            self,
            Msg::FormEdited(_)
                | Msg::TestConnectionClicked
                | Msg::StartClicked
                | Msg::StopClicked
                | Msg::DownloadClicked
                | Msg::ClearTerminalClicked
        )
    }
}
