//! Per-send values: the outgoing request and the delivery receipt.

/// An HTML email to a single recipient. Built per send, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailRequest {
    pub recipient: String,
    pub subject: String,
    pub body_html: String,
}

impl EmailRequest {
    pub fn new(
        recipient: impl Into<String>,
        subject: impl Into<String>,
        body_html: impl Into<String>,
    ) -> Self {
        Self {
            recipient: recipient.into(),
            subject: subject.into(),
            body_html: body_html.into(),
        }
    }
}

/// Receipt for an accepted message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    /// `Message-ID` assigned to the outgoing message.
    pub message_id: String,
    /// Name of the transport configuration that accepted it.
    pub transport: String,
}
