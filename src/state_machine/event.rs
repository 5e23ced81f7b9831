//! Events that can occur during a turn

use crate::api::{AnsweredQuery, Report};

/// Events that trigger state transitions
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    // User events
    UserPrompt {
        text: String,
    },

    // Query events
    QueryAnswered(AnsweredQuery),
    /// The service answered with `success: false`
    QueryRejected {
        message: Option<String>,
    },
    /// The request never produced a usable HTTP response
    TransportFailed {
        message: String,
    },

    // Report events
    ReportResolved {
        text: String,
        snapshot: Report,
    },

    /// Anything that does not fit the categories above
    Unexpected {
        message: String,
    },
}
