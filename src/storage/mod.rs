mod keys;
mod kv;
mod message_store;
mod session_store;


pub use keys::{message_list_key, session_list_key, CURRENT_PROFILE_KEY, CURRENT_USER_KEY};
pub use kv::{FileKv, KvStore, MemoryKv};
pub use message_store::{KvMessageStore, MessageStore};
pub use session_store::{KvSessionStore, SessionStore};
