//! FASTA file reading.

use std::path::Path;

use log::info;
use needletail::parse_fastx_file;

use crate::error::FastaError;

/// A named sequence read from a FASTA file.
///
/// Residues are kept exactly as read (including alignment gaps `-`), since
/// profile training sets rely on them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    pub name: String,
    pub residues: Vec<char>,
}

impl Sequence {
    /// The residues joined back into a displayable string.
    pub fn residue_string(&self) -> String {
        self.residues.iter().collect()
    }
}

/// Read every record of a FASTA file into named sequences.
///
/// # Errors
///
/// - `FastaError::Read` if the file cannot be opened or a record is
///   malformed
/// - `FastaError::Empty` if the file holds no records
pub fn read_fasta(path: impl AsRef<Path>) -> Result<Vec<Sequence>, FastaError> {
    let path = path.as_ref();
    info!("reading {}", path.display());

    let mut reader = parse_fastx_file(path).map_err(|e| FastaError::read(path, e.to_string()))?;

    let mut sequences = Vec::new();
    while let Some(record) = reader.next() {
        let record = record.map_err(|e| FastaError::read(path, e.to_string()))?;
        let name = String::from_utf8_lossy(record.id()).into_owned();
        let residues = record.seq().iter().map(|&b| b as char).collect();
        sequences.push(Sequence { name, residues });
    }

    if sequences.is_empty() {
        return Err(FastaError::empty(path));
    }

    info!("read {} sequences from {}", sequences.len(), path.display());
    Ok(sequences)
}
