use std::env;

use aisle_cli::{parse_args, Runtime};
use aisle_session::ChatReply;

/// Run each argument as one turn of the same conversation and print the replies as JSON.
fn main() -> anyhow::Result<()> {
    let options = parse_args(env::args().skip(1))?;
    if options.help || options.positional.is_empty() {
        eprintln!("Usage: aisle-query [--data <dir>] [--limit <n>] <message> [<message> ...]");
        eprintln!("Example: aisle-query 'Show me Coke or Pepsi' 'from Subway'");
        std::process::exit(if options.help { 0 } else { 1 });
    }

    let runtime = Runtime::bootstrap(&options)?;
    let mut assistant = runtime.assistant();
    let replies: Vec<ChatReply> = options.positional.iter().map(|message| assistant.respond(message)).collect();
    println!("{}", serde_json::to_string_pretty(&replies)?);
    Ok(())
}
