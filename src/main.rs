use std::sync::Arc;

use chrono::NaiveDate;

use daybook::agenda::Agenda;
use daybook::config::DaybookConfig;
use daybook::core::reminder::{self, ReminderTracker};
use daybook::core::todo::display_order;
use daybook::core::{Recurrence, Todo};
use daybook::store::StorageBackend;

const USAGE: &str = "\
usage: daybook [--date YYYY-MM-DD] [--vault PATH] <command>

commands:
  list                       show the day's to-dos (default)
  add <text> [--at TIME] [--every 1d|2w|1m]
  done <n>                   toggle completion
  pin <n> | bookmark <n>     toggle a flag
  rm <n>                     delete
  edit <n> <text>            replace text, keeping reminder and repeat
  move <from> <to>           reorder
  bookmarks                  bookmarked to-dos across dates
  due                        reminders that fell within the last minute
  dates                      dates that have a file
  memo [text]                show or replace the global memo";

fn install_logger(config: &DaybookConfig) {
    // Journal logging (`journalctl --user -t daybook -f`).
    // Wrapper filters: daybook at info/debug (per config), everything else at warn.
    struct FilteredJournal {
        inner: systemd_journal_logger::JournalLog,
    }

    impl log::Log for FilteredJournal {
        fn enabled(&self, metadata: &log::Metadata) -> bool {
            if metadata.target().starts_with("daybook") {
                let max = if daybook::debug_logging() { log::LevelFilter::Debug } else { log::LevelFilter::Info };
                metadata.level() <= max
            } else {
                metadata.level() <= log::LevelFilter::Warn
            }
        }
        fn log(&self, record: &log::Record) {
            if self.enabled(record.metadata()) {
                self.inner.log(record);
            }
        }
        fn flush(&self) {
            self.inner.flush();
        }
    }

    daybook::set_debug_logging(config.debug_logging);

    let journal = match systemd_journal_logger::JournalLog::new() {
        Ok(journal) => journal.with_syslog_identifier("daybook".to_string()),
        Err(e) => {
            eprintln!("daybook: journal unavailable, logging disabled: {}", e);
            return;
        }
    };
    if log::set_boxed_logger(Box::new(FilteredJournal { inner: journal })).is_ok() {
        // Global max must be Debug so debug logs can pass through when toggled
        log::set_max_level(log::LevelFilter::Debug);
    }
}

/// Pull `--flag value` out of `args`.
fn take_option(args: &mut Vec<String>, flag: &str) -> Result<Option<String>, String> {
    let Some(pos) = args.iter().position(|a| a == flag) else {
        return Ok(None);
    };
    if pos + 1 >= args.len() {
        return Err(format!("{} needs a value", flag));
    }
    let value = args.remove(pos + 1);
    args.remove(pos);
    Ok(Some(value))
}

/// Resolve a 1-based number from the listing to a view position.
fn pick(agenda: &Agenda, arg: Option<&String>) -> Result<usize, String> {
    let n: usize = arg
        .ok_or("missing item number")?
        .parse()
        .map_err(|_| "item number must be a positive integer".to_string())?;
    let shown = display_order(agenda.todos());
    let todo = shown
        .get(n.wrapping_sub(1))
        .ok_or_else(|| format!("no item {}", n))?;
    agenda.position(todo.id).map_err(|e| e.to_string())
}

fn print_todo(agenda: &Agenda, n: usize, todo: &Todo) {
    let mut line = format!(
        "{:>3}. [{}] {}",
        n,
        if todo.completed { "x" } else { " " },
        todo.text
    );
    if todo.pinned {
        line.push_str(" (pinned)");
    }
    if todo.bookmarked {
        line.push_str(" (bookmarked)");
    }
    if agenda.is_carried(todo) {
        if let Some(origin) = todo.original_date {
            line.push_str(&format!(" (from {})", origin));
        }
    }
    if let Some(at) = todo.reminder {
        line.push_str(&format!(" (remind {})", reminder::format(at)));
    }
    if let Some(recurrence) = todo.recurrence {
        line.push_str(&format!(" (every {})", recurrence));
    }
    println!("{}", line);
}

fn print_list(agenda: &Agenda) {
    println!("TODO - {}", agenda.date());
    let shown = display_order(agenda.todos());
    if shown.is_empty() {
        println!("  nothing to do");
    }
    for (i, todo) in shown.into_iter().enumerate() {
        print_todo(agenda, i + 1, todo);
    }
}

async fn run(mut args: Vec<String>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = DaybookConfig::load()?;
    install_logger(&config);

    if let Some(vault) = take_option(&mut args, "--vault")? {
        config.vault_path = Some(vault.into());
    }
    let date = match take_option(&mut args, "--date")? {
        Some(s) => NaiveDate::parse_from_str(&s, "%Y-%m-%d")
            .map_err(|e| format!("bad --date {:?}: {}", s, e))?,
        None => chrono::Local::now().date_naive(),
    };

    config.ensure_folders()?;
    let storage: Arc<dyn StorageBackend> = Arc::new(config.storage());
    log::debug!("Using vault {}", config.vault_dir().display());

    let command = if args.is_empty() { "list".to_string() } else { args.remove(0) };
    match command.as_str() {
        "list" => {
            let agenda = Agenda::open_with_lookback(storage, date, config.lookback_days).await?;
            print_list(&agenda);
        }
        "add" => {
            let at = match take_option(&mut args, "--at")? {
                Some(s) => Some(reminder::parse(&s).ok_or(format!("bad --at {:?}", s))?),
                None => None,
            };
            let every = match take_option(&mut args, "--every")? {
                Some(s) => Some(Recurrence::parse(&s).ok_or(format!("bad --every {:?}", s))?),
                None => None,
            };
            let mut agenda = Agenda::open_with_lookback(storage, date, config.lookback_days).await?;
            let id = agenda.add_todo(&args.join(" "), at).await?;
            if every.is_some() {
                let text = agenda.get(id).map(|t| t.text.clone()).unwrap_or_default();
                agenda.update_todo(id, &text, at, every).await?;
            }
            print_list(&agenda);
        }
        "done" | "pin" | "bookmark" | "rm" | "edit" => {
            let mut agenda = Agenda::open_with_lookback(storage, date, config.lookback_days).await?;
            let index = pick(&agenda, args.first())?;
            let todo = agenda.todos()[index].clone();
            match command.as_str() {
                "done" => {
                    if let Some(next) = agenda.toggle_todo(todo.id).await? {
                        println!("next occurrence scheduled for {}", next);
                    }
                }
                "pin" => agenda.toggle_pin(todo.id).await?,
                "bookmark" => agenda.toggle_bookmark(todo.id).await?,
                "rm" => agenda.delete_todo(todo.id).await?,
                _ => {
                    let text = args[1..].join(" ");
                    agenda
                        .update_todo(todo.id, &text, todo.reminder, todo.recurrence)
                        .await?
                }
            }
            print_list(&agenda);
        }
        "move" => {
            let mut agenda = Agenda::open_with_lookback(storage, date, config.lookback_days).await?;
            let from = pick(&agenda, args.first())?;
            let to = pick(&agenda, args.get(1))?;
            agenda.reorder_todos(from, to).await?;
            print_list(&agenda);
        }
        "bookmarks" => {
            let agenda = Agenda::open_with_lookback(storage, date, config.lookback_days).await?;
            let marks = agenda.bookmarks().await?;
            if marks.is_empty() {
                println!("no bookmarks");
            }
            for (day, todos) in marks.iter().rev() {
                println!("{}", day);
                for todo in todos {
                    println!("  [{}] {}", if todo.completed { "x" } else { " " }, todo.text);
                }
            }
        }
        "due" => {
            let agenda = Agenda::open_with_lookback(storage, date, config.lookback_days).await?;
            let mut tracker = ReminderTracker::new();
            let now = chrono::Local::now().naive_local();
            for id in tracker.due(agenda.todos(), now) {
                if let Some(todo) = agenda.get(id) {
                    println!("reminder: {}", todo.text);
                }
            }
        }
        "dates" => {
            for day in storage.list_dates().await? {
                println!("{}", day);
            }
        }
        "memo" => {
            if args.is_empty() {
                println!("{}", storage.read_memo("global").await?.unwrap_or_default());
            } else {
                storage.write_memo("global", &args.join(" ")).await?;
            }
        }
        "help" | "--help" | "-h" => println!("{}", USAGE),
        other => return Err(format!("unknown command {:?}\n\n{}", other, USAGE).into()),
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if let Err(e) = run(args).await {
        log::error!("{}", e);
        eprintln!("daybook: {}", e);
        std::process::exit(1);
    }
}
