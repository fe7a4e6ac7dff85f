//! Static table decoding
//!
//! The vector table, the device delay table, and the program catalog are
//! loaded once and never mutated. Line number = index for the first two.

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use ksim_core::ProgramImage;

use crate::error::TableError;

/// Decode the vector table: one ISR address string per line, line number =
/// interrupt number. Addresses are kept verbatim (they are only ever
/// logged, never jumped to).
pub fn parse_vector_table(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .map(|line| line.to_string())
        .collect()
}

/// Decode the device delay table: one duration per line, line number =
/// device number.
pub fn parse_delay_table(text: &str) -> Result<Vec<u64>, TableError> {
    let mut delays = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        let token = raw.trim();
        if token.is_empty() {
            continue;
        }
        let delay = token.parse::<u64>().map_err(|_| TableError::BadDelay {
            line: idx + 1,
            value: token.to_string(),
        })?;
        delays.push(delay);
    }
    Ok(delays)
}

/// Decode the program catalog: `name,size_mb` per line. Catalog order is
/// preserved; EXEC takes the first match.
pub fn parse_catalog(text: &str) -> Result<Vec<ProgramImage>, TableError> {
    let mut catalog = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            continue;
        }
        let line = idx + 1;
        let (name, size) = trimmed
            .split_once(',')
            .ok_or(TableError::BadCatalogEntry { line })?;
        let name = name.trim();
        let size_mb = size
            .trim()
            .parse::<u32>()
            .map_err(|_| TableError::BadCatalogEntry { line })?;
        if name.is_empty() {
            return Err(TableError::BadCatalogEntry { line });
        }
        catalog.push(ProgramImage {
            name: name.to_string(),
            size_mb,
        });
    }
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn test_parse_vector_table() {
        let vectors = parse_vector_table("0X01E3\n0X029C\n0X0695\n");
        assert_eq!(vectors, vec!["0X01E3", "0X029C", "0X0695"]);
    }

    #[test]
    fn test_parse_delay_table() {
        assert_eq!(parse_delay_table("110\n22\n46\n"), Ok(vec![110, 22, 46]));
        assert_eq!(
            parse_delay_table("110\nfast\n"),
            Err(TableError::BadDelay {
                line: 2,
                value: "fast".to_string()
            })
        );
    }

    #[test]
    fn test_parse_catalog() {
        let catalog = parse_catalog("program1,20\nprogram2, 3\n").unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog[0].name, "program1");
        assert_eq!(catalog[0].size_mb, 20);
        assert_eq!(catalog[1].size_mb, 3);
    }

    #[test]
    fn test_parse_catalog_rejects_garbage() {
        assert_eq!(
            parse_catalog("program1\n"),
            Err(TableError::BadCatalogEntry { line: 1 })
        );
        assert_eq!(
            parse_catalog("program1,heavy\n"),
            Err(TableError::BadCatalogEntry { line: 1 })
        );
    }
}
