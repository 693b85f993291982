use rand::{distributions::Alphanumeric, thread_rng, Rng};

pub const SESSION_KEY_LENGTH: usize = 40;

pub fn generate_session_key() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SESSION_KEY_LENGTH)
        .map(char::from)
        .collect()
}
