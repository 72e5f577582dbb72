//! Storage key derivation. Keys are deterministic functions of entity type
//! and owner id, kept byte-compatible with the records the web client wrote
//! to browser storage.

pub const CURRENT_USER_KEY: &str = "arceus_user";
pub const CURRENT_PROFILE_KEY: &str = "arceus_userProfile";

pub fn session_list_key(user_id: &str) -> String {
    format!("arceus_chatSessions_{user_id}")
}

pub fn message_list_key(session_id: &str) -> String {
    format!("arceus_messages_{session_id}")
}
