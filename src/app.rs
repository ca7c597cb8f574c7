//! Terminal Front End
//!
//! Line commands stand in for the list page: two sort buttons, a delete
//! button per row and the add form. Snapshots re-render the list as they
//! arrive; create and delete run on spawned tasks so rendering never waits
//! on the store.

use doc_store::DocumentId;
use log::{error, info};
use std::io::BufRead;
use tokio::sync::mpsc;

use crate::error::SyncResult;
use crate::models::{Item, SortKey};
use crate::view::ListSyncView;

pub const HELP: &str = "\
Commands:
  add <name> <price>   add an item
  del <n> | del #<id>  delete row n of the list, or the item with that id
  sort name|price      change the ordering
  list                 show the list again
  help                 show this text
  quit                 leave";

#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    /// 1-based row of the rendered list
    Row(usize),
    Id(DocumentId),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Add { name: String, price: f64 },
    Delete(Target),
    Sort(SortKey),
    List,
    Help,
    Quit,
}

/// Parse one input line. Blank lines yield `Ok(None)`.
pub fn parse_action(line: &str) -> Result<Option<Action>, String> {
    let words: Vec<&str> = line.split_whitespace().collect();
    let Some((command, args)) = words.split_first() else {
        return Ok(None);
    };

    let action = match command.to_ascii_lowercase().as_str() {
        "add" => {
            let Some((price, name)) = args.split_last().filter(|(_, name)| !name.is_empty())
            else {
                return Err("usage: add <name> <price>".to_string());
            };
            let price = price
                .parse::<f64>()
                .map_err(|_| format!("price must be a number, got '{}'", price))?;
            Action::Add {
                name: name.join(" "),
                price,
            }
        }
        "del" | "delete" => match args {
            [target] => Action::Delete(parse_target(target)?),
            _ => return Err("usage: del <n> | del #<id>".to_string()),
        },
        "sort" => match args {
            [key] => Action::Sort(key.parse::<SortKey>().map_err(|e| format!("{}", e))?),
            _ => return Err("usage: sort name|price".to_string()),
        },
        "list" | "ls" => Action::List,
        "help" | "?" => Action::Help,
        "quit" | "exit" | "q" => Action::Quit,
        other => return Err(format!("unknown command '{}', try help", other)),
    };
    Ok(Some(action))
}

fn parse_target(word: &str) -> Result<Target, String> {
    if let Some(id) = word.strip_prefix('#') {
        if id.is_empty() {
            return Err("missing id after '#'".to_string());
        }
        return Ok(Target::Id(DocumentId::from(id)));
    }
    match word.parse::<usize>() {
        Ok(row) if row > 0 => Ok(Target::Row(row)),
        _ => Err(format!("'{}' is not a row number", word)),
    }
}

/// Map a delete target onto an item currently shown
pub fn resolve_target(items: &[Item], target: &Target) -> Result<DocumentId, String> {
    match target {
        Target::Row(row) => row
            .checked_sub(1)
            .and_then(|i| items.get(i))
            .map(|item| item.id.clone())
            .ok_or_else(|| format!("there is no row {}", row)),
        Target::Id(id) => Ok(id.clone()),
    }
}

/// Render the working list as numbered rows
pub fn render(items: &[Item], key: SortKey) -> String {
    if items.is_empty() {
        return "Shopping list is empty.".to_string();
    }
    let width = items.iter().map(|i| i.name.chars().count()).max().unwrap_or(0);
    let mut out = format!("Shopping list (sorted by {}):", key);
    for (row, item) in items.iter().enumerate() {
        out.push_str(&format!("\n{:>3}. {:<width$}  {}", row + 1, item.name, item.price, width = width));
    }
    out
}

enum Event {
    Update(Option<SyncResult<()>>),
    Line(Option<String>),
}

/// Blocking stdin reader on its own thread so it never holds up shutdown
fn spawn_reader(tx: mpsc::UnboundedSender<String>) {
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    error!("Failed to read input: {}", e);
                    break;
                }
            }
        }
    });
}

async fn handle(view: &mut ListSyncView, action: Action) {
    match action {
        Action::Add { name, price } => {
            let commands = view.commands();
            tokio::spawn(async move {
                match commands.create(&name, price).await {
                    Ok(id) => println!("Added {} (#{})", name, id),
                    Err(e) => println!("{}", e),
                }
            });
        }
        Action::Delete(target) => match resolve_target(view.items(), &target) {
            Ok(id) => {
                let commands = view.commands();
                tokio::spawn(async move {
                    if let Err(e) = commands.delete_item(&id).await {
                        println!("{}", e);
                    }
                });
            }
            Err(msg) => println!("{}", msg),
        },
        Action::Sort(key) => match view.set_sort_key(key).await {
            Ok(()) => println!("{}", render(view.items(), view.sort_key())),
            Err(e) => println!("{}", e),
        },
        Action::List => println!("{}", render(view.items(), view.sort_key())),
        Action::Help => println!("{}", HELP),
        Action::Quit => {}
    }
}

/// Drive the view until the user quits or input closes
pub async fn run(mut view: ListSyncView) -> SyncResult<()> {
    let (tx, mut lines) = mpsc::unbounded_channel();
    spawn_reader(tx);

    view.subscribe().await?;
    info!("Showing '{}'", view.collection());
    println!("{}", HELP);

    loop {
        let event = tokio::select! {
            update = view.next_update(), if view.is_subscribed() => Event::Update(update),
            line = lines.recv() => Event::Line(line),
        };

        match event {
            Event::Update(Some(Ok(()))) => println!("{}", render(view.items(), view.sort_key())),
            Event::Update(Some(Err(e))) => println!("{}", e),
            Event::Update(None) => println!("The list is no longer live."),
            Event::Line(None) => break,
            Event::Line(Some(line)) => match parse_action(&line) {
                Ok(Some(Action::Quit)) => break,
                Ok(Some(action)) => handle(&mut view, action).await,
                Ok(None) => {}
                Err(msg) => println!("{}", msg),
            },
        }
    }

    view.unsubscribe();
    info!("Leaving '{}'", view.collection());
    Ok(())
}
