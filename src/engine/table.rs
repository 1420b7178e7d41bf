use std::collections::BTreeMap;

use serde::Deserialize;

use super::{SelectionId, SignEngine};

/// Largest domain a table may declare; one selector button is built per id.
pub const MAX_SIGNS: u32 = 1024;

/// On-disk shape of a sign table.
#[derive(Debug, Deserialize)]
struct SignTableFile {
    total_signs: u32,
    #[serde(default)]
    signs: BTreeMap<i32, char>,
}

/// Engine backed by a JSON sign table.
///
/// ```json
/// { "total_signs": 26, "signs": { "1": "A", "2": "B" } }
/// ```
///
/// Ids in `1..=total_signs` without an entry classify as no-match.
#[derive(Debug, Clone)]
pub struct SignTable {
    total_signs: u32,
    signs: BTreeMap<i32, char>,
}

impl SignTable {
    /// Parse and validate a table document.
    pub fn from_json(data: &str) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let file: SignTableFile = serde_json::from_str(data)?;

        if file.total_signs == 0 {
            return Err("sign table declares no signs".into());
        }
        if file.total_signs > MAX_SIGNS {
            return Err(format!(
                "sign table too large: {} signs (max {MAX_SIGNS})",
                file.total_signs
            )
            .into());
        }
        let max = file.total_signs as i32;
        if let Some(id) = file.signs.keys().find(|id| !(1..=max).contains(*id)) {
            return Err(format!("sign id {id} outside 1..={max}").into());
        }

        log::debug!(
            "Sign table parsed: {} of {} ids mapped",
            file.signs.len(),
            file.total_signs
        );
        Ok(Self {
            total_signs: file.total_signs,
            signs: file.signs,
        })
    }
}

impl SignEngine for SignTable {
    fn sign_letter(&self, id: SelectionId) -> Option<char> {
        self.signs.get(&id.0).copied()
    }

    fn is_valid_id(&self, id: SelectionId) -> bool {
        id.0 >= 1 && id.0 as u32 <= self.total_signs
    }

    fn total_signs(&self) -> u32 {
        self.total_signs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sparse_table() {
        let table =
            SignTable::from_json(r#"{ "total_signs": 5, "signs": { "1": "A", "3": "C" } }"#)
                .unwrap();
        assert_eq!(table.total_signs(), 5);
        assert_eq!(table.sign_letter(SelectionId(1)), Some('A'));
        assert_eq!(table.sign_letter(SelectionId(2)), None);
        assert!(table.is_valid_id(SelectionId(2)));
        assert!(table.is_valid_id(SelectionId(5)));
        assert!(!table.is_valid_id(SelectionId(6)));
        assert!(!table.is_valid_id(SelectionId(0)));
    }

    #[test]
    fn test_missing_signs_means_all_unmapped() {
        let table = SignTable::from_json(r#"{ "total_signs": 2 }"#).unwrap();
        assert_eq!(table.sign_letter(SelectionId(1)), None);
        assert!(table.is_valid_id(SelectionId(1)));
    }

    #[test]
    fn test_rejects_empty_domain() {
        let err = SignTable::from_json(r#"{ "total_signs": 0, "signs": {} }"#).unwrap_err();
        assert_eq!(err.to_string(), "sign table declares no signs");
    }

    #[test]
    fn test_rejects_oversized_domain() {
        let err = SignTable::from_json(r#"{ "total_signs": 2147483647 }"#).unwrap_err();
        assert_eq!(
            err.to_string(),
            "sign table too large: 2147483647 signs (max 1024)"
        );
        assert!(SignTable::from_json(r#"{ "total_signs": 4294967295 }"#).is_err());

        let table = SignTable::from_json(r#"{ "total_signs": 1024 }"#).unwrap();
        assert_eq!(table.total_signs(), MAX_SIGNS);
    }

    #[test]
    fn test_rejects_entry_outside_domain() {
        let err = SignTable::from_json(r#"{ "total_signs": 2, "signs": { "3": "C" } }"#)
            .unwrap_err();
        assert_eq!(err.to_string(), "sign id 3 outside 1..=2");
    }

    #[test]
    fn test_rejects_multi_char_letter() {
        assert!(SignTable::from_json(r#"{ "total_signs": 1, "signs": { "1": "AB" } }"#).is_err());
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(SignTable::from_json("not json").is_err());
    }
}
