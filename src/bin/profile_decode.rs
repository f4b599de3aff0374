//! Decode test sequences against a profile HMM derived from an aligned
//! training set.

use std::error::Error;
use std::path::PathBuf;
use std::process;

use structopt::StructOpt;

use hmm_decode::hmm::profile::RNA_ALPHABET;
use hmm_decode::{read_fasta, ProfileHmm};

#[derive(Debug, StructOpt)]
#[structopt(
    name = "profile_decode",
    about = "Viterbi-decode sequences against a profile HMM built from an aligned FASTA training set"
)]
struct Opt {
    /// Aligned FASTA training set the profile is derived from.
    #[structopt(long = "filetrain", parse(from_os_str))]
    filetrain: PathBuf,

    /// FASTA file of sequences to decode.
    #[structopt(long = "filetest", parse(from_os_str))]
    filetest: PathBuf,
}

fn main() {
    env_logger::init();
    let opt = Opt::from_args();
    if let Err(e) = run(&opt) {
        eprintln!("ERROR: {e}");
        process::exit(1);
    }
}

fn run(opt: &Opt) -> Result<(), Box<dyn Error>> {
    let training = read_fasta(&opt.filetrain)?;
    let model = ProfileHmm::from_training(&training, &RNA_ALPHABET)?;

    let tests = read_fasta(&opt.filetest)?;
    for sequence in &tests {
        let path = model.decode(&sequence.residues)?;
        println!("{}", sequence.residue_string());
        println!("{}", path.iter().collect::<String>());
        println!();
    }

    Ok(())
}
