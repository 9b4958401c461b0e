use rand::Rng;
use std::future::Future;
use tracing::warn;

use crate::database::DatabaseError;

pub const SHORT_ID_LENGTH: usize = 10;
pub const MAX_INSERT_ATTEMPTS: usize = 3;

const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Random lowercase base-36 id used in share links
pub fn generate() -> String {
    let mut rng = rand::thread_rng();
    (0..SHORT_ID_LENGTH)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}

/// Referral codes: 8 uppercase alphanumerics
pub fn referral_code() -> String {
    let mut rng = rand::thread_rng();
    (0..8)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())].to_ascii_uppercase() as char)
        .collect()
}

/// Run `insert` with fresh short ids until it stops colliding on `constraint`
pub async fn with_unique_short_id<T, F, Fut>(constraint: &str, mut insert: F) -> Result<T, DatabaseError>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<T, DatabaseError>>,
{
    let mut attempt = 1;
    loop {
        match insert(generate()).await {
            Err(e) if e.is_unique_violation_on(constraint) && attempt < MAX_INSERT_ATTEMPTS => {
                warn!("Short id collision on {} (attempt {})", constraint, attempt);
                attempt += 1;
            }
            result => return result,
        }
    }
}
