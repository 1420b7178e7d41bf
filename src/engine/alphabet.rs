use super::{SelectionId, SignEngine};

/// Number of signs in the built-in engine, one per letter A-Z.
pub const ALPHABET_SIGNS: u32 = 26;

/// Built-in engine: id `k` in `1..=26` is the `k`-th capital letter.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlphabetEngine;

impl SignEngine for AlphabetEngine {
    fn sign_letter(&self, id: SelectionId) -> Option<char> {
        if !self.is_valid_id(id) {
            return None;
        }
        char::from_u32('A' as u32 + (id.0 as u32 - 1))
    }

    fn is_valid_id(&self, id: SelectionId) -> bool {
        id.0 >= 1 && id.0 <= ALPHABET_SIGNS as i32
    }

    fn total_signs(&self) -> u32 {
        ALPHABET_SIGNS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maps_every_id_to_its_letter() {
        let letters: String = (1..=26)
            .filter_map(|i| AlphabetEngine.sign_letter(SelectionId(i)))
            .collect();
        assert_eq!(letters, "ABCDEFGHIJKLMNOPQRSTUVWXYZ");
    }

    #[test]
    fn test_rejects_out_of_domain() {
        for id in [i32::MIN, -1, 0, 27, i32::MAX] {
            assert!(!AlphabetEngine.is_valid_id(SelectionId(id)));
            assert_eq!(AlphabetEngine.sign_letter(SelectionId(id)), None);
        }
    }

    #[test]
    fn test_total_signs() {
        assert_eq!(AlphabetEngine.total_signs(), 26);
    }
}
