use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use homoledger::cryptosystems::paillier::{PaillierPK, PaillierSK};
use homoledger::encoding::{
    decode_pem_private_key, decode_pem_public_key, gen_pem_private_key, gen_pem_public_key,
};
use homoledger::ledger::client::prepare_tx_info;
use homoledger::wire;
use homoledger_traits::cryptosystems::DecryptionKey;
use homoledger_traits::randomness::GeneralRng;
use log::{debug, info};
use rand_core::OsRng;
use rug::Integer;
use std::fs;
use std::path::{Path, PathBuf};

/// Paillier keys, encrypted amounts and confidential transfers from the command line.
/// Ciphertexts are read and printed as hex.
#[derive(Debug, Parser)]
#[command(name = "homoledger", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate a key pair and write it to priv.pem and pub.pem
    Keygen(KeygenArgs),
    /// Encrypt a non-negative amount
    Encrypt(EncryptArgs),
    /// Decrypt a ciphertext and print the amount
    Decrypt(DecryptArgs),
    /// Add two ciphertexts
    AddCipher(CipherPairArgs),
    /// Subtract the second ciphertext from the first
    SubCipher(CipherPairArgs),
    /// Add a plaintext constant to a ciphertext
    Add(ConstantArgs),
    /// Multiply a ciphertext by a plaintext constant
    Mul(ConstantArgs),
    /// Prepare a transfer payload for the ledger
    PrepareTransfer(PrepareTransferArgs),
}

#[derive(Debug, Args)]
struct KeygenArgs {
    /// Modulus size in bits; must be even
    #[arg(long, env = "HOMOLEDGER_KEY_BITS", default_value_t = 2048)]
    bits: u32,
    #[arg(long, value_name = "DIR", default_value = ".")]
    out_dir: PathBuf,
}

#[derive(Debug, Args)]
struct EncryptArgs {
    #[arg(long, value_name = "FILE")]
    public_key: PathBuf,
    #[arg(value_name = "AMOUNT")]
    amount: String,
}

#[derive(Debug, Args)]
struct DecryptArgs {
    #[arg(long, value_name = "FILE")]
    private_key: PathBuf,
    #[arg(value_name = "HEX")]
    ciphertext: String,
}

#[derive(Debug, Args)]
struct CipherPairArgs {
    #[arg(long, value_name = "FILE")]
    public_key: PathBuf,
    #[arg(value_name = "HEX")]
    cipher_a: String,
    #[arg(value_name = "HEX")]
    cipher_b: String,
}

#[derive(Debug, Args)]
struct ConstantArgs {
    #[arg(long, value_name = "FILE")]
    public_key: PathBuf,
    #[arg(value_name = "HEX")]
    ciphertext: String,
    #[arg(value_name = "CONSTANT")]
    constant: String,
}

#[derive(Debug, Args)]
struct PrepareTransferArgs {
    /// The sender's current encrypted balance
    #[arg(long, value_name = "HEX")]
    balance: String,
    #[arg(long)]
    amount: u64,
    /// The sender's public key
    #[arg(long = "from", value_name = "FILE")]
    from: PathBuf,
    /// The receiver's public key
    #[arg(long = "to", value_name = "FILE")]
    to: PathBuf,
    /// The sender's private key
    #[arg(long, value_name = "FILE")]
    private_key: PathBuf,
}

fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn read_public_key(path: &Path) -> Result<PaillierPK> {
    decode_pem_public_key(&read_text(path)?)
        .with_context(|| format!("{} does not hold a public key", path.display()))
}

fn read_private_key(path: &Path) -> Result<PaillierSK> {
    decode_pem_private_key(&read_text(path)?)
        .with_context(|| format!("{} does not hold a private key", path.display()))
}

fn parse_ciphertext(text: &str) -> Result<Vec<u8>> {
    hex::decode(text.trim()).with_context(|| format!("'{}' is not a hex ciphertext", text))
}

/// Parses a non-negative decimal integer into its big-endian bytes.
fn parse_amount(text: &str) -> Result<Vec<u8>> {
    let value: Integer = text
        .trim()
        .parse()
        .with_context(|| format!("'{}' is not a decimal integer", text))?;
    if value < 0 {
        bail!("'{}' is negative", text);
    }

    Ok(wire::integer_to_bytes(&value))
}

fn keygen(args: KeygenArgs, rng: &mut GeneralRng<OsRng>) -> Result<()> {
    info!("generating a {}-bit key pair", args.bits);
    let secret_key = wire::generate_key(rng, args.bits)?;

    fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("failed to create {}", args.out_dir.display()))?;
    for (name, contents) in [
        ("priv.pem", gen_pem_private_key(&secret_key)),
        ("pub.pem", gen_pem_public_key(secret_key.public_key())),
    ] {
        let path = args.out_dir.join(name);
        fs::write(&path, contents).with_context(|| format!("failed to write {}", path.display()))?;
        info!("wrote {}", path.display());
    }

    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    debug!("{:?}", cli.command);

    let mut rng = GeneralRng::new(OsRng);

    match cli.command {
        Command::Keygen(args) => keygen(args, &mut rng)?,
        Command::Encrypt(args) => {
            let public_key = read_public_key(&args.public_key)?;
            let ciphertext = wire::encrypt(&public_key, &parse_amount(&args.amount)?, &mut rng)?;
            println!("{}", hex::encode(ciphertext));
        }
        Command::Decrypt(args) => {
            let secret_key = read_private_key(&args.private_key)?;
            let plaintext = wire::decrypt(&secret_key, &parse_ciphertext(&args.ciphertext)?)?;
            println!("{}", wire::integer_from_bytes(&plaintext));
        }
        Command::AddCipher(args) => {
            let public_key = read_public_key(&args.public_key)?;
            let sum = wire::add_cipher(
                &public_key,
                &parse_ciphertext(&args.cipher_a)?,
                &parse_ciphertext(&args.cipher_b)?,
            )?;
            println!("{}", hex::encode(sum));
        }
        Command::SubCipher(args) => {
            let public_key = read_public_key(&args.public_key)?;
            let difference = wire::sub_cipher(
                &public_key,
                &parse_ciphertext(&args.cipher_a)?,
                &parse_ciphertext(&args.cipher_b)?,
            )?;
            println!("{}", hex::encode(difference));
        }
        Command::Add(args) => {
            let public_key = read_public_key(&args.public_key)?;
            let shifted = wire::add(
                &public_key,
                &parse_ciphertext(&args.ciphertext)?,
                &parse_amount(&args.constant)?,
            )?;
            println!("{}", hex::encode(shifted));
        }
        Command::Mul(args) => {
            let public_key = read_public_key(&args.public_key)?;
            let product = wire::mul(
                &public_key,
                &parse_ciphertext(&args.ciphertext)?,
                &parse_amount(&args.constant)?,
            )?;
            println!("{}", hex::encode(product));
        }
        Command::PrepareTransfer(args) => {
            let tx = prepare_tx_info(
                &parse_ciphertext(&args.balance)?,
                args.amount,
                &read_text(&args.from)?,
                &read_text(&args.to)?,
                &read_text(&args.private_key)?,
                &mut rng,
            )?;
            println!("{}", tx.to_json()?);
        }
    }

    Ok(())
}
