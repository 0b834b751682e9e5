use clap::Parser;
use crlsim::{
    console::{execute, Args},
    error::CrlResult,
};
use env_logger::Env;

fn main() -> CrlResult<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));
    //parse CLI arguments and run the subcommand
    let output = execute(Args::parse())?;
    println!("{output}");
    Ok(())
}
