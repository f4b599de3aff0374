//! Decode dice-roll sequences with the dishonest-casino model.

use std::error::Error;
use std::path::PathBuf;
use std::process;

use structopt::StructOpt;

use hmm_decode::{casino_model, read_fasta};

#[derive(Debug, StructOpt)]
#[structopt(
    name = "casino_decode",
    about = "Viterbi-decode dice-roll sequences with the fair/loaded casino HMM"
)]
struct Opt {
    /// FASTA file of dice-roll sequences (faces 1-6).
    #[structopt(long = "file", parse(from_os_str))]
    file: PathBuf,
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
    let model = casino_model();
    let sequences = read_fasta(&opt.file)?;
    for sequence in &sequences {
        let path = model.decode(&sequence.residues)?;
        println!("{}", sequence.residue_string());
        println!("{}", path.iter().collect::<String>());
        println!();
    }

    Ok(())
}
