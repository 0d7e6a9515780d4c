use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use blockcrab::Confidentiality::Composed::{key_pair_from_hex, DoubleDES, TripleDES, DES_KEY_PAIR_SIZE_BYTES};
use blockcrab::Confidentiality::DES::{DESParameters, DES, DES_KEY_SIZE_BYTES};
use blockcrab::Confidentiality::GOST::{GOST, GOST_KEY_SIZE_BYTES};
use blockcrab::Confidentiality::STB::{STB, STB_KEY_SIZE_BYTES};
use blockcrab::{key_from_hex, BlockCypher, KeyedCypher};
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::LevelFilter;
use rand::prelude::*;

#[derive(Parser)]
#[command(name = "blockcrab", version, about = "block cyphers over whole files")]
struct Cli {
    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a DES table set and store it as JSON
    Params {
        #[arg(long)]
        seed: Option<u64>,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Encrypt INPUT into OUTPUT, printing the bit length needed to decrypt
    Encrypt(CypherArgs),
    /// Decrypt INPUT into OUTPUT
    Decrypt {
        #[command(flatten)]
        args: CypherArgs,
        /// Original bit length, drops the padding
        #[arg(short, long)]
        length: Option<usize>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum CypherKind {
    Des,
    DoubleDes,
    TripleDes,
    Gost,
    Stb,
}

#[derive(Args)]
struct CypherArgs {
    #[arg(short, long, value_enum)]
    cipher: CypherKind,
    /// Key in hex
    #[arg(short, long)]
    key: String,
    /// Second DES key in hex, for double-des and triple-des
    #[arg(long)]
    second_key: Option<String>,
    /// DES table set written by `params`
    #[arg(short, long)]
    params: Option<PathBuf>,
    input: PathBuf,
    output: PathBuf,
}

enum Direction {
    Encrypt,
    Decrypt(Option<usize>),
}

fn main() {
    let cli = Cli::parse();
    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::builder()
        .filter_level(level)
        .parse_default_env()
        .init();

    let result = match cli.command {
        Command::Params { seed, output } => write_parameters(seed, &output),
        Command::Encrypt(args) => run(&args, Direction::Encrypt),
        Command::Decrypt { args, length } => run(&args, Direction::Decrypt(length)),
    };
    if let Err(e) = result {
        log::error!("{:#}", e);
        std::process::exit(1);
    }
}

fn write_parameters(seed: Option<u64>, output: &Path) -> anyhow::Result<()> {
    let parameters = match seed {
        Some(seed) => DESParameters::generate_with(&mut StdRng::seed_from_u64(seed)),
        None => DESParameters::generate(),
    };
    fs::write(output, parameters.to_json()?)
        .with_context(|| format!("writing {}", output.display()))?;
    log::info!("DES parameters written to {}", output.display());
    Ok(())
}

fn read_parameters(path: Option<&Path>) -> anyhow::Result<DES> {
    let Some(path) = path else {
        bail!("DES based cyphers need --params, generate them with `blockcrab params`");
    };
    let json = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let parameters = DESParameters::from_json(&json)
        .with_context(|| format!("loading {}", path.display()))?;
    Ok(DES::new(parameters))
}

fn single_key<const KEY_SIZE_BYTES: usize>(args: &CypherArgs) -> anyhow::Result<[u8; KEY_SIZE_BYTES]> {
    if args.second_key.is_some() {
        bail!("--second-key is only used by double-des and triple-des");
    }
    Ok(key_from_hex(&args.key)?)
}

fn key_pair(args: &CypherArgs) -> anyhow::Result<[u8; DES_KEY_PAIR_SIZE_BYTES]> {
    let Some(second) = args.second_key.as_deref() else {
        bail!("this cypher needs --second-key");
    };
    Ok(key_pair_from_hex(&args.key, second)?)
}

fn run(args: &CypherArgs, direction: Direction) -> anyhow::Result<()> {
    match args.cipher {
        CypherKind::Des => {
            let key = single_key::<DES_KEY_SIZE_BYTES>(args)?;
            let des = read_parameters(args.params.as_deref())?;
            apply(KeyedCypher::new(des, key), args, direction)
        }
        CypherKind::DoubleDes => {
            let keys = key_pair(args)?;
            let des = read_parameters(args.params.as_deref())?;
            apply(KeyedCypher::new(DoubleDES::new(des), keys), args, direction)
        }
        CypherKind::TripleDes => {
            let keys = key_pair(args)?;
            let des = read_parameters(args.params.as_deref())?;
            apply(KeyedCypher::new(TripleDES::new(des), keys), args, direction)
        }
        CypherKind::Gost => {
            apply(KeyedCypher::new(GOST::new(), single_key::<GOST_KEY_SIZE_BYTES>(args)?), args, direction)
        }
        CypherKind::Stb => {
            apply(KeyedCypher::new(STB::new(), single_key::<STB_KEY_SIZE_BYTES>(args)?), args, direction)
        }
    }
}

fn apply<C, const BLOCK_SIZE_BYTES: usize, const KEY_SIZE_BYTES: usize>(
    keyed: KeyedCypher<C, BLOCK_SIZE_BYTES, KEY_SIZE_BYTES>,
    args: &CypherArgs,
    direction: Direction,
) -> anyhow::Result<()>
where
    C: BlockCypher<BLOCK_SIZE_BYTES, KEY_SIZE_BYTES> + Sync,
{
    match direction {
        Direction::Encrypt => {
            let length = keyed.encrypt_file(&args.input, &args.output)?;
            log::info!("encrypted {} into {}", args.input.display(), args.output.display());
            println!("{}", length);
        }
        Direction::Decrypt(length) => {
            keyed.decrypt_file(&args.input, &args.output, length)?;
            log::info!("decrypted {} into {}", args.input.display(), args.output.display());
        }
    }
    Ok(())
}

#[cfg(test)]
mod main_tests {
    use super::*;
    use blockcrab::CipherError;

    fn cypher_args(arguments: &[&str]) -> CypherArgs {
        let cli = Cli::try_parse_from(["blockcrab", "encrypt"].iter().chain(arguments).copied()).unwrap();
        match cli.command {
            Command::Encrypt(args) => args,
            _ => unreachable!(),
        }
    }

    #[test]
    fn second_key_rejected_for_single_key_cyphers_test() {
        let gost_key = "00".repeat(32);
        for cipher in ["des", "gost", "stb"] {
            let args = cypher_args(&["--cipher", cipher, "--key", &gost_key, "--second-key", "00", "in", "out"]);
            let err = run(&args, Direction::Encrypt).unwrap_err();
            assert!(err.to_string().contains("--second-key"), "{cipher}: {err}");
        }
        let args = cypher_args(&["--cipher", "triple-des", "--key", "0f1571c947d9e8", "in", "out"]);
        assert!(key_pair(&args).is_err());
    }

    #[test]
    fn wrong_key_width_test() {
        let args = cypher_args(&["--cipher", "stb", "--key", "0011", "in", "out"]);
        let err = single_key::<STB_KEY_SIZE_BYTES>(&args).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CipherError>(),
            Some(CipherError::InvalidKeyLength { expected: 256, actual: 16 })
        ));
    }

    #[test]
    fn params_file_round_trip_test() {
        let dir = std::env::temp_dir().join(format!("blockcrab-cli-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let params = dir.join("params.json");
        write_parameters(Some(7), &params).unwrap();
        let reloaded = read_parameters(Some(params.as_path())).unwrap();
        let seeded = DESParameters::generate_with(&mut StdRng::seed_from_u64(7));
        assert_eq!(**reloaded.parameters(), seeded);

        let (plain, encrypted, decrypted) = (dir.join("plain"), dir.join("encrypted"), dir.join("decrypted"));
        fs::write(&plain, b"persisted tables, same cypher").unwrap();
        let params = params.to_str().unwrap();
        let paths = [plain.to_str().unwrap(), encrypted.to_str().unwrap()];
        let args = cypher_args(&[
            "--cipher", "double-des", "--key", "0f1571c947d9e8", "--second-key", "59cb7d3e4f2a10",
            "--params", params, paths[0], paths[1],
        ]);
        run(&args, Direction::Encrypt).unwrap();
        let args = cypher_args(&[
            "--cipher", "double-des", "--key", "0f1571c947d9e8", "--second-key", "59cb7d3e4f2a10",
            "--params", params, paths[1], decrypted.to_str().unwrap(),
        ]);
        run(&args, Direction::Decrypt(Some(29 * 8))).unwrap();
        assert_eq!(fs::read(&decrypted).unwrap(), b"persisted tables, same cypher");

        let args = cypher_args(&["--cipher", "des", "--key", "0f1571c947d9e8", paths[0], paths[1]]);
        assert!(run(&args, Direction::Encrypt).is_err());
        fs::remove_dir_all(&dir).unwrap();
    }
}
