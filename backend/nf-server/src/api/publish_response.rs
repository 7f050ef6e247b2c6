use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct PublishResponse {
    pub channel: String,
    pub bytes: usize,
}
