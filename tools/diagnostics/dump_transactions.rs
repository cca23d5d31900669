//! Transaction Dump Tool
//!
//! Prints the deduplicated transaction history of one address and the
//! events the observatory classifies in it.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin dump-transactions -- --address harkonnen1... --chain harkonnen
//! cargo run --bin dump-transactions -- --address terra1... --events-only
//! ```

use clap::Parser;

use alliance_observatory::aggregator::{aggregate_rewards, ClaimBuckets};
use alliance_observatory::config::load_config;
use alliance_observatory::discovery::extract_ibc_transfers;
use alliance_observatory::lcd::LcdClient;
use alliance_observatory::series::CumulativeSeries;
use alliance_observatory::types::EventKind;

#[derive(Parser, Debug)]
#[clap(name = "dump-transactions")]
#[clap(about = "Dump the transactions and classified events of one address", long_about = None)]
struct Args {
    #[clap(long)]
    address: String,

    /// Chain name (default: the chain whose prefix matches the address)
    #[clap(long)]
    chain: Option<String>,

    /// Config file (default: ./config.toml when present)
    #[clap(long)]
    config: Option<std::path::PathBuf>,

    /// Only print classified events, not every transaction
    #[clap(long, default_value_t = false)]
    events_only: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let settings = load_config(args.config.as_deref())?;
    let registry = settings.registry()?;

    let chain = match &args.chain {
        Some(name) => registry.chains().iter().find(|c| &c.name == name),
        None => registry
            .chains()
            .iter()
            .filter(|c| c.owns_address(&args.address))
            .max_by_key(|c| c.address_prefix().len()),
    }
    .ok_or("No configured chain for this address (use --chain)")?;

    println!("🔍 Address: {}", args.address);
    println!("   Chain:   {} ({})", chain.name, chain.lcd);

    let client = reqwest::Client::builder()
        .timeout(settings.lcd.timeout())
        .user_agent(settings.lcd.user_agent.as_str())
        .build()?;
    let lcd = LcdClient::new(client, &chain.name, &chain.lcd)
        .with_page_limit(settings.lcd.page_limit)
        .with_page_delay(settings.lcd.page_delay());

    println!("\n⏳ Fetching transactions...");
    let transactions = lcd.fetch_transactions(&args.address).await?;
    println!("   ✅ {} unique transactions", transactions.len());

    for tx in &transactions {
        let classified: Vec<_> = tx
            .all_events()
            .filter(|e| e.kind() != EventKind::Other)
            .collect();

        if args.events_only && classified.is_empty() {
            continue;
        }

        println!("\n{}  height={}  {}", tx.txhash, tx.height, tx.timestamp);
        for event in classified {
            let amount: Vec<&str> = event.attribute_values("amount").collect();
            println!("   {:?} {}", event.kind(), amount.join(" "));
        }
    }

    let transfers = extract_ibc_transfers(&transactions);
    let mut buckets = ClaimBuckets::new();
    let stats = aggregate_rewards(&transactions, registry.ibc_denoms(), &mut buckets);
    let series = CumulativeSeries::from_buckets(&buckets);

    println!("\n📊 Summary");
    println!("   IBC sent:     {}", transfers.sent.len());
    println!("   IBC received: {}", transfers.received_by(&args.address).count());
    println!("   Delegated:    {}", stats.delegated);
    println!("   Undelegated:  {}", stats.undelegated);
    println!("   Redelegated:  {}", stats.redelegated);
    println!("   Claims:       {}", stats.claims);

    if let Some(last) = series.last() {
        println!("\n💰 Claimed up to {}", last.timestamp);
        for (denom, amount) in &last.amounts {
            println!("   {:<12} {:.6}", denom, amount);
        }
    }

    Ok(())
}
