use rand::Rng;

use crate::error::GameError;
use crate::models::room::Room;
use crate::store::DocumentStore;

pub const CODE_LENGTH: usize = 5;
const MAX_ATTEMPTS: usize = 8;

/// Alphabet without ambiguous glyphs (0/O, 1/I/L).
const ALPHABET: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";

pub fn generate_code(rng: &mut impl Rng) -> String {
    (0..CODE_LENGTH)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}

/// Allocate a fresh code and insert the room under it, retrying on collision
/// a bounded number of times.
pub async fn allocate(
    store: &dyn DocumentStore,
    rng: &mut impl Rng,
    make_room: impl Fn(String) -> Room,
) -> Result<Room, GameError> {
    for _ in 0..MAX_ATTEMPTS {
        let code = generate_code(rng);
        let room = make_room(code.clone());
        if store.insert_if_absent(&code, room.clone()).await {
            return Ok(room);
        }
    }
    Err(GameError::RoomCreationFailed)
}
