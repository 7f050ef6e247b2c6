//! SSE encoding of notifications.
//!
//! Each notification becomes one event with `id` set to the sequence number,
//! `event: notification`, and the payload as UTF-8 text in `data`.

use nf_core::Notification;

use axum::response::sse::Event;

pub const EVENT_NAME: &str = "notification";

pub fn encode(notification: &Notification) -> Event {
    Event::default()
        .id(notification.sequence.to_string())
        .event(EVENT_NAME)
        .data(payload_text(&notification.payload))
}

/// Payload as text. Invalid UTF-8 is replaced and bare carriage returns become
/// line feeds, which the SSE framing splits into `data:` lines.
pub fn payload_text(payload: &[u8]) -> String {
    String::from_utf8_lossy(payload)
        .replace("\r\n", "\n")
        .replace('\r', "\n")
}
