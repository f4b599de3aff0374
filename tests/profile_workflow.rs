//! End-to-end profile workflow: aligned training FASTA in, decoded state
//! paths out, exercising the same calls the `profile_decode` binary makes.

use std::io::Write;

use tempfile::NamedTempFile;

use hmm_decode::hmm::profile::RNA_ALPHABET;
use hmm_decode::{read_fasta, HmmError, ProfileHmm};

fn write_fasta(records: &[(&str, &str)]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    for (name, residues) in records {
        writeln!(file, ">{name}").unwrap();
        writeln!(file, "{residues}").unwrap();
    }
    file.flush().unwrap();
    file
}

#[test]
fn trains_and_decodes_from_fasta_files() {
    let train = write_fasta(&[
        ("t1", "GCCGA"),
        ("t2", "GC-GA"),
        ("t3", "GCCGA"),
        ("t4", "GCCG-"),
    ]);
    let test = write_fasta(&[("q1", "GCCGA"), ("q2", "GCGA"), ("q3", "GCCCGA")]);

    let training = read_fasta(train.path()).unwrap();
    let model = ProfileHmm::from_training(&training, &RNA_ALPHABET).unwrap();
    assert_eq!(model.profile_len(), 5);

    let queries = read_fasta(test.path()).unwrap();
    let paths: Vec<Vec<char>> = queries
        .iter()
        .map(|q| model.decode(&q.residues).unwrap())
        .collect();

    // One state label per residue, and only emitting states appear.
    for (query, path) in queries.iter().zip(&paths) {
        assert_eq!(path.len(), query.residues.len());
        assert!(path.iter().all(|&s| s == 'M' || s == 'I'));
    }

    // The consensus query aligns match-for-match.
    assert_eq!(paths[0], vec!['M'; 5]);
    // The six-residue query needs exactly one insert.
    assert_eq!(paths[2].iter().filter(|&&s| s == 'I').count(), 1);
}

#[test]
fn decode_failure_surfaces_as_typed_error() {
    let train = write_fasta(&[("t1", "ACG"), ("t2", "ACG")]);
    let training = read_fasta(train.path()).unwrap();
    let model = ProfileHmm::from_training(&training, &RNA_ALPHABET).unwrap();

    let test = write_fasta(&[("q1", "ANG")]);
    let queries = read_fasta(test.path()).unwrap();
    let result = model.decode(&queries[0].residues);
    assert_eq!(result.unwrap_err(), HmmError::UnknownSymbol('N'));
}
