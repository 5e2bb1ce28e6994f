use recipient_chips::adapters::{EmailValidator, Rfc822Tokenizer, StaticDirectory};
use recipient_chips::config::FieldConfig;
use recipient_chips::events::ChipEvent;
use recipient_chips::traits::ChipResources;
use recipient_chips::widgets::RecipientField;

use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use serde_json::json;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;

const VERSION: &str = env!("CARGO_PKG_VERSION");

const HELP: &str = "\
Type text to insert it at the cursor. Commands:
  :focus | :blur          change focus
  :size W H               set the field size
  :paste TEXT             paste delimited recipients
  :commit                 commit the token at the cursor
  :backspace              delete one character
  :clear                  empty the field
  :select N | :remove N   select or remove the Nth chip
  :alternates N           request alternates for the Nth chip
  :choose N M             replace the Nth chip with alternate M
  :stats                  print counters
  :quit";

/// Value following `flag` on the command line.
fn arg_value(flag: &str) -> Option<String> {
    let mut args = std::env::args().skip_while(|arg| arg != flag);
    args.next();
    args.next()
}

fn load_config() -> Result<FieldConfig> {
    let config = match arg_value("--config") {
        Some(path) => {
            let json = std::fs::read_to_string(&path).wrap_err_with(|| format!("reading {}", path))?;
            FieldConfig::from_json_str(&json)?
        }
        None => FieldConfig::default(),
    };
    Ok(config.with_overrides(|key| std::env::var(key).ok())?)
}

fn build_field() -> Result<RecipientField> {
    let config = load_config()?;
    let mut field = RecipientField::new(Rfc822Tokenizer::new(), config)?
        .with_validator(EmailValidator::new())
        .with_chip_resources(ChipResources::default());

    if let Some(path) = arg_value("--contacts") {
        let directory = StaticDirectory::load(&PathBuf::from(path))?;
        tracing::info!("Loaded {} contacts", directory.len());
        field = field.with_directory(Arc::new(directory));
    }

    field.on_size_changed(80, 1)?;
    field.on_focus_changed(true)?;
    Ok(field)
}

fn chip_index(field: &RecipientField, arg: Option<&str>) -> Result<recipient_chips::models::ChipId> {
    let index: usize = arg
        .ok_or_else(|| eyre!("missing chip index"))?
        .parse()
        .wrap_err("chip index must be a number")?;
    field
        .chips()
        .get(index)
        .map(|chip| chip.id())
        .ok_or_else(|| eyre!("no chip at index {}", index))
}

fn run_command(field: &mut RecipientField, line: &str) -> Result<bool> {
    let Some(command) = line.strip_prefix(':') else {
        // typed one character at a time, like a keyboard
        let mut buf = [0; 4];
        for c in line.chars() {
            field.insert_text(c.encode_utf8(&mut buf))?;
        }
        return Ok(true);
    };

    let mut parts = command.splitn(2, ' ');
    let name = parts.next().unwrap_or_default();
    let rest = parts.next().unwrap_or_default();
    let mut args = rest.split_whitespace();

    match name {
        "quit" | "q" => return Ok(false),
        "help" => println!("{}", HELP),
        "focus" => field.on_focus_changed(true)?,
        "blur" => field.on_focus_changed(false)?,
        "size" => {
            let width = args.next().unwrap_or("0").parse()?;
            let height = args.next().unwrap_or("1").parse()?;
            field.on_size_changed(width, height)?;
        }
        "paste" => field.paste_recipients(rest)?,
        "commit" => {
            field.commit_pending_text()?;
        }
        "backspace" => field.backspace()?,
        "clear" => field.clear()?,
        "select" => {
            let id = chip_index(field, args.next())?;
            field.select_chip(id)?;
        }
        "remove" => {
            let id = chip_index(field, args.next())?;
            field.remove_chip(id)?;
        }
        "alternates" => {
            let id = chip_index(field, args.next())?;
            field.request_alternates(id)?;
        }
        "choose" => {
            let id = chip_index(field, args.next())?;
            let choice: usize = args.next().unwrap_or("0").parse()?;
            let entry = field
                .alternates_for(id)
                .and_then(|entries| entries.get(choice))
                .cloned()
                .ok_or_else(|| eyre!("no alternate {} loaded for that chip", choice))?;
            field.choose_alternate(id, entry)?;
        }
        "stats" => println!("{}", serde_json::to_string_pretty(&field.stats())?),
        other => println!("unknown command :{} (try :help)", other),
    }
    Ok(true)
}

fn print_state(field: &RecipientField, events: &mut UnboundedReceiver<ChipEvent>) -> Result<()> {
    while let Ok(event) = events.try_recv() {
        println!("event {}", serde_json::to_string(&event)?);
    }

    let chips: Vec<_> = field
        .chips()
        .iter()
        .map(|chip| {
            json!({
                "label": chip.entry().chip_label(),
                "range": [chip.range().start, chip.range().end],
                "provisional": chip.is_provisional(),
                "visible": chip.is_visible(),
            })
        })
        .collect();
    let state = json!({
        "text": field.text(),
        "cursor": field.cursor(),
        "chips": chips,
        "overflow": field.overflow().map(|summary| summary.label()),
    });
    println!("{}", serde_json::to_string_pretty(&state)?);
    Ok(())
}

fn main() -> Result<()> {
    if std::env::args().any(|arg| arg == "--version") {
        println!("chipfield {}", VERSION);
        return Ok(());
    }

    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let mut field = build_field()?;
        let mut events = field.subscribe();

        println!("{}", HELP);
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let line = line?;
            match run_command(&mut field, &line) {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) => eprintln!("error: {:#}", e),
            }
            field.settle().await?;
            print_state(&field, &mut events)?;
            io::stdout().flush()?;
        }

        println!("{}", serde_json::to_string_pretty(&field.recipients())?);
        Ok::<(), color_eyre::Report>(())
    })
}
