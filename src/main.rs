use anyhow::Context;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, Instrument};

use shopping_list::app_system::{setup_tracing, Settings, ShoppingListSystem};
use shopping_list::clients::ScreenClient;
use shopping_list::domain::ProductForm;
use shopping_list::screen::{ScreenSnapshot, SwipeDirection};

const HELP: &str = "commands: add <name> <quantity> | swipe <row> | clear | list | help | quit";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::parse();
    setup_tracing(&settings.log_level);

    info!("Starting shopping list");

    let system = ShoppingListSystem::from_settings(&settings)
        .await
        .context("failed to open the product store")?;
    let screen = system.screen_client.clone();

    let span = tracing::info_span!("screen_session");
    let session = async {
        screen.enter().await?;
        print_snapshot(&screen.settled().await?);
        println!("{HELP}");

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            if !run_command(&screen, line.trim()).await? {
                break;
            }
        }
        anyhow::Ok(())
    }
    .instrument(span)
    .await;

    if let Err(e) = &session {
        error!(error = %e, "Session ended with an error");
    }

    system.shutdown().await.map_err(anyhow::Error::msg)?;
    info!("Shopping list closed");
    session
}

/// Runs one typed command. Returns false when the user asked to quit.
async fn run_command(screen: &ScreenClient, line: &str) -> anyhow::Result<bool> {
    let (command, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();

    match command {
        "" => return Ok(true),
        "quit" | "exit" => return Ok(false),
        "help" => {
            println!("{HELP}");
            return Ok(true);
        }
        "list" => {
            print_snapshot(&screen.snapshot().await?);
            return Ok(true);
        }
        "add" => {
            // The last word is the quantity field, the rest is the name field.
            let (name, quantity) = rest.rsplit_once(char::is_whitespace).unwrap_or((rest, ""));
            if let Err(e) = screen.add_product(ProductForm::new(name, quantity)).await {
                println!("! {e}");
                return Ok(true);
            }
        }
        "swipe" => match rest.parse::<usize>() {
            Ok(row) if row >= 1 => {
                if let Err(e) = screen.swipe(row - 1, SwipeDirection::Left).await {
                    println!("! {e}");
                    return Ok(true);
                }
            }
            _ => {
                println!("! swipe takes a row number starting at 1");
                return Ok(true);
            }
        },
        "clear" => screen.delete_all().await?,
        other => {
            println!("! unknown command {other:?}; {HELP}");
            return Ok(true);
        }
    }

    print_snapshot(&screen.settled().await?);
    Ok(true)
}

fn print_snapshot(snapshot: &ScreenSnapshot) {
    if snapshot.rows.is_empty() {
        println!("(shopping list is empty)");
    }
    for (index, row) in snapshot.rows.iter().enumerate() {
        println!("{:>3}. {:<24} {}", index + 1, row.name_label, row.quantity_label);
    }
    if let Some(notice) = &snapshot.notice {
        println!("! {notice}");
    }
}
