use rand::Rng;
use uuid::{Builder, Uuid};

/// Draws a random (version 4) UUID from the caller's generator, so a seeded
/// run reproduces the same identifiers.
pub fn next_id<R: Rng + ?Sized>(rng: &mut R) -> Uuid {
    Builder::from_random_bytes(rng.gen()).into_uuid()
}
