use std::env;
use std::io::{self, BufRead, Write};

use aisle_cli::{parse_args, parse_shop, Options, Runtime};
use aisle_core::types::SearchResult;
use aisle_session::{Assistant, ChatReply};
use aisle_translate::RuleTranslator;

fn main() -> anyhow::Result<()> {
    let options: Options = parse_args(env::args().skip(1))?;
    if options.help {
        print_usage();
        return Ok(());
    }
    let runtime = Runtime::bootstrap(&options)?;

    println!("🛒 aisle chat");
    println!("=============");
    println!(
        "✅ Catalog loaded: {} products from {} shops",
        runtime.catalog.len(),
        runtime.catalog.vendors().len()
    );
    if !runtime.report.skipped.is_empty() {
        println!("⚠️  Skipped {} unreadable source(s)", runtime.report.skipped.len());
    }
    if runtime.report.records_skipped > 0 {
        println!("⚠️  Skipped {} malformed record(s)", runtime.report.records_skipped);
    }
    println!();

    let mut assistant = runtime.assistant();
    show_commands();
    chat_loop(&mut assistant)
}

fn chat_loop(assistant: &mut Assistant<RuleTranslator>) -> anyhow::Result<()> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("you> ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            println!();
            break;
        };
        let line = line?;
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let (command, arg) = input.split_once(' ').unwrap_or((input, ""));
        match command {
            "/help" | "/h" => show_commands(),
            "/vendors" | "/shops" => list("Shops", &assistant.catalog().vendors()),
            "/categories" => list("Categories", &assistant.catalog().categories()),
            "/tags" => list("Tags", &assistant.catalog().tags()),
            "/context" | "/c" => show_context(assistant),
            "/shop" => {
                let known = assistant.catalog().vendors();
                match parse_shop(arg, &known) {
                    Some(scope) => print_reply(&assistant.select_vendors(scope)),
                    None => println!("❌ Usage: /shop <name[, name]> | /shop not <name> | /shop any"),
                }
            }
            "/reset" => {
                assistant.reset();
                println!("🔄 Context cleared! Starting fresh conversation.");
            }
            "/quit" | "/q" | "quit" | "exit" => {
                println!("👋 Goodbye!");
                break;
            }
            _ => print_reply(&assistant.respond(input)),
        }
        println!();
    }
    Ok(())
}

fn print_reply(reply: &ChatReply) {
    println!("{}", reply.message);
    for (i, result) in reply.products.iter().enumerate() {
        print_result(i + 1, result);
    }
}

fn print_result(position: usize, result: &SearchResult) {
    let product = &result.product;
    println!(
        "  {}. {} ({}) · {} · £{:.2}",
        position, product.name, product.brand, product.vendor, product.price
    );
    println!("     💡 {}", result.reason);
}

fn show_context(assistant: &Assistant<RuleTranslator>) {
    let context = assistant.context();
    if context.has_active_context() {
        println!("{}", context.summarize());
    } else {
        println!("📌 No active context");
    }
    match serde_json::to_string_pretty(&context.as_query().context_json()) {
        Ok(json) => println!("{json}"),
        Err(e) => println!("❌ Error showing context: {e}"),
    }
}

fn list(title: &str, values: &[String]) {
    println!("📋 {} ({}):", title, values.len());
    for value in values {
        println!("  - {value}");
    }
}

fn show_commands() {
    println!("🎯 Commands:");
    println!("  /help              - Show this help message");
    println!("  /vendors           - List shops in the catalog");
    println!("  /categories        - List product categories");
    println!("  /tags              - List dietary tags");
    println!("  /context           - Show what the conversation remembers");
    println!("  /shop <names|any>  - Scope to shops and re-run the last search");
    println!("  /reset             - Forget the conversation (also: reset, start over)");
    println!("  /quit              - Exit");
    println!("  <message>          - Ask for products, e.g. \"vegan sandwiches under £4\"");
    println!();
}

fn print_usage() {
    println!("Usage: aisle-chat [--data <dir>] [--limit <n>]");
    println!("Config: config.toml, config.<RUST_ENV>.toml, APP_* variables (APP_CATALOG__DATA_DIR=...)");
}
