// Entry point for the ledger node CLI
use clap::Parser;
use ledger_node::cli::{random_port, random_transfer, SEED_ORIGIN, TRAFFIC_ORIGIN};
use ledger_node::{
    broadcast, launch, mine_genesis, Command, Message, Opt, Payload, Settings, TcpTransport,
    Transport, Wallet,
};
use log::{error, info, LevelFilter};
use rand::Rng;
use std::process;
use std::thread;
use std::time::Duration;

// Pause between generated transactions, in seconds
const TRAFFIC_PAUSE_SECS: std::ops::RangeInclusive<u64> = 3..=10;

fn main() {
    // Info level by default, RUST_LOG still wins
    env_logger::builder()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    let opt = Opt::parse();

    if let Err(e) = run_command(opt) {
        error!("Error: {e}");
        process::exit(1);
    }
}

fn run_command(opt: Opt) -> Result<(), Box<dyn std::error::Error>> {
    let mut settings = Settings::load(opt.config.as_deref())?;
    opt.command.apply_overrides(&mut settings);
    settings.validate()?;

    match opt.command {
        Command::Node { .. } => {
            launch(&settings)?;
        }
        // Mine a genesis block locally and hand it to the given nodes
        Command::Seed { to, payout_secret } => {
            let payout = Wallet::from_secret_str(&payout_secret)?;
            info!(
                "Mining genesis block at difficulty {}",
                settings.consensus.difficulty
            );
            let genesis = mine_genesis(&settings.consensus, payout.public_key())?;
            let hash = genesis.get_hash().unwrap_or_default().to_string();

            let delivered = broadcast(
                &transport(&settings),
                &to,
                &Message::new(Payload::Block(genesis), SEED_ORIGIN),
            );
            println!("Genesis block {hash} delivered to {delivered}/{} nodes", to.len());
        }
        // Random signed transfers, one node at a time, until count runs out
        Command::Traffic {
            min_port,
            max_port,
            count,
        } => {
            let transport = transport(&settings);
            let mut rng = rand::thread_rng();
            let mut sent: u64 = 0;
            while count.map_or(true, |limit| sent < limit) {
                let tx = random_transfer(&mut rng)?;
                let port = random_port(&mut rng, min_port, max_port);
                let txid = tx.get_id().to_string();
                match transport.send(port, &Message::new(Payload::Transaction(tx), TRAFFIC_ORIGIN)) {
                    Ok(()) => println!("tx {txid} sent to {port}"),
                    Err(e) => error!("Failed to send tx to {port}: {e}"),
                }
                sent += 1;
                if count.map_or(true, |limit| sent < limit) {
                    thread::sleep(Duration::from_secs(rng.gen_range(TRAFFIC_PAUSE_SECS)));
                }
            }
        }
        Command::Keygen { wif } => {
            let wallet = match wif {
                Some(wif) => Wallet::from_wif(&wif)?,
                None => Wallet::generate()?,
            };
            println!("Secret:                {:x}", wallet.secret());
            println!("WIF:                   {}", wallet.to_wif(false));
            println!("WIF (compressed):      {}", wallet.to_wif(true));
            println!(
                "Public key:            {}",
                hex::encode(wallet.encode_public_key(false))
            );
            println!(
                "Public key (compr.):   {}",
                hex::encode(wallet.encode_public_key(true))
            );
            println!("Address:               {}", wallet.get_address(false));
            println!("Address (compressed):  {}", wallet.get_address(true));
        }
    }
    Ok(())
}

fn transport(settings: &Settings) -> TcpTransport {
    TcpTransport::new(
        settings.network.host.clone(),
        settings.network.connect_timeout(),
    )
}
