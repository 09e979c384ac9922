#![forbid(unsafe_code)]

pub mod model;

pub use model::{ColumnValue, ColumnValueError, Columns, Row};

pub mod ids {
    use rand::Rng;

    pub const SUFFIX_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
    pub const SUFFIX_LEN: usize = 10;

    /// Produces new row identifiers scoped by a prefix (the row type).
    ///
    /// Identifiers only need to be probably unique: the store guards every
    /// insert with a key-absence condition, so a collision surfaces as a failed
    /// write rather than an overwrite.
    pub trait IdGenerator: Send + Sync {
        fn generate(&self, prefix: &str) -> String;
    }

    /// `<prefix>_<10 lowercase letters>`. Not cryptographically secure.
    #[derive(Clone, Copy, Debug, Default)]
    pub struct RandomSuffix;

    impl IdGenerator for RandomSuffix {
        fn generate(&self, prefix: &str) -> String {
            format!("{prefix}_{}", random_suffix(SUFFIX_LEN))
        }
    }

    pub fn random_suffix(len: usize) -> String {
        let mut rng = rand::thread_rng();
        (0..len)
            .map(|_| {
                let index = rng.gen_range(0..SUFFIX_ALPHABET.len());
                SUFFIX_ALPHABET[index] as char
            })
            .collect()
    }

    pub fn split_prefix(id: &str) -> Option<(&str, &str)> {
        id.rsplit_once('_')
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn random_suffix_uses_prefix_and_lowercase_alphabet() {
            let id = RandomSuffix.generate("organization");
            let (prefix, suffix) = split_prefix(&id).expect("id has a prefix separator");
            assert_eq!(prefix, "organization");
            assert_eq!(suffix.len(), SUFFIX_LEN);
            assert!(suffix.bytes().all(|b| b.is_ascii_lowercase()));
        }

        #[test]
        fn prefix_may_contain_separator() {
            let id = RandomSuffix.generate("team_member");
            let (prefix, suffix) = split_prefix(&id).expect("id has a prefix separator");
            assert_eq!(prefix, "team_member");
            assert_eq!(suffix.len(), SUFFIX_LEN);
        }

        #[test]
        fn consecutive_ids_differ() {
            let a = RandomSuffix.generate("team");
            let b = RandomSuffix.generate("team");
            assert_ne!(a, b);
        }
    }
}
