//! Counter-id generation.

/// Generates a unique counter id: 128 random bits as 32 lowercase hex characters.
pub fn new_counter_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
