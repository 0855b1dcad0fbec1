use rand::Rng;

/// Characters a client id is drawn from.
pub const ID_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
pub const DEFAULT_CLIENT_ID_LENGTH: usize = 7;

/// Per-page-load identity sent with every request so the service can tell
/// connected browsers apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSession {
    id: String,
}

impl ClientSession {
    pub fn generate<R: Rng + ?Sized>(rng: &mut R, length: usize) -> Self {
        Self {
            id: make_id(rng, length),
        }
    }

    pub fn from_id(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }
}

/// Random alphanumeric string of exactly `length` characters. Collisions are
/// unlikely, not impossible.
pub fn make_id<R: Rng + ?Sized>(rng: &mut R, length: usize) -> String {
    (0..length)
        .map(|_| char::from(ID_ALPHABET[rng.random_range(0..ID_ALPHABET.len())]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::quickcheck;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn default_length_matches_page_session_ids() {
        let mut rng = StdRng::seed_from_u64(7);
        let session = ClientSession::generate(&mut rng, DEFAULT_CLIENT_ID_LENGTH);
        assert_eq!(session.id().len(), 7);
    }

    #[test]
    fn zero_length_yields_empty_id() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(make_id(&mut rng, 0), "");
    }

    #[test]
    fn independent_sessions_do_not_collide() {
        let mut first = StdRng::seed_from_u64(11);
        let mut second = StdRng::seed_from_u64(12);
        let a = ClientSession::generate(&mut first, 16);
        let b = ClientSession::generate(&mut second, 16);
        assert_ne!(a, b);
    }

    #[test]
    fn from_id_keeps_value_verbatim() {
        let session = ClientSession::from_id("abc1234");
        assert_eq!(session.id(), "abc1234");
    }

    quickcheck! {
        fn ids_have_requested_length_and_alphabet(length: u8, seed: u64) -> bool {
            let mut rng = StdRng::seed_from_u64(seed);
            let id = make_id(&mut rng, usize::from(length));
            id.len() == usize::from(length) && id.bytes().all(|byte| ID_ALPHABET.contains(&byte))
        }
    }
}
