//! The interactive command loop run by `pwvault open`.

use std::io::{self, Write};

use console::style;

use crate::cli::interrupt::Interrupt;
use crate::cli::output;
use crate::errors::{Result, VaultError};
use crate::session::{EntryEditor, Prompter, Session, Written};
use crate::vault::{vault_to_pretty_json, DisplayRef, Placement};

/// One parsed line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Search(String),
    List,
    Add { top: bool },
    Show(String),
    Edit(String),
    Remove(String),
    Print,
    Clear,
    Help,
    Exit,
    /// Blank line.
    Empty,
    /// A known command with missing or extra arguments; holds the usage line.
    Usage(&'static str),
    Unknown(String),
}

/// Split a line into a command and its argument.
///
/// Command words are case-insensitive.  Everything after the first word
/// is the argument, so search terms may contain spaces.
pub fn parse_command(line: &str) -> Command {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    match (word.to_lowercase().as_str(), rest) {
        ("", _) => Command::Empty,
        ("search", "") => Command::Usage("search <term>"),
        ("search", term) => Command::Search(term.to_string()),
        ("list", "") => Command::List,
        ("add", "") => Command::Add { top: false },
        ("add", "--top") => Command::Add { top: true },
        ("add", _) => Command::Usage("add [--top]"),
        ("show", "") => Command::Usage("show <n>"),
        ("show", n) => Command::Show(n.to_string()),
        ("edit", "") => Command::Usage("edit <n>"),
        ("edit", n) => Command::Edit(n.to_string()),
        ("remove", "") => Command::Usage("remove <n>"),
        ("remove", n) => Command::Remove(n.to_string()),
        ("print", "") => Command::Print,
        ("clear", "") => Command::Clear,
        ("help", _) => Command::Help,
        ("exit" | "quit", _) => Command::Exit,
        ("list", _) => Command::Usage("list"),
        ("print", _) => Command::Usage("print"),
        ("clear", _) => Command::Usage("clear"),
        (other, _) => Command::Unknown(other.to_string()),
    }
}

/// Lines read from stdin one call at a time.
///
/// No lock is held between lines, so a `Prompter` can read its own
/// answers from stdin in the middle of a command.
#[derive(Debug, Default)]
pub struct StdinLines;

impl Iterator for StdinLines {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut line = String::new();
        match io::stdin().read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(Ok(line.trim_end_matches(['\r', '\n']).to_string())),
            Err(e) => Some(Err(e)),
        }
    }
}

/// Read commands from `input` until `exit`, end of input or Ctrl-C.
///
/// Command failures are reported and the loop continues; only a failure
/// to read input or write the prompt ends it early.
pub fn run<P, E, I>(session: &mut Session<P, E>, input: I, interrupt: &Interrupt) -> Result<()>
where
    P: Prompter,
    E: EntryEditor,
    I: IntoIterator<Item = io::Result<String>>,
{
    let mut lines = input.into_iter();

    loop {
        if interrupt.requested() {
            output::info("Goodbye.");
            return Ok(());
        }

        println!("{}", style("-".repeat(40)).dim());
        print!("> ");
        io::stdout().flush()?;

        // `None` here means the interrupt handler already said goodbye.
        let Some(next) = interrupt.while_idle(|| lines.next()) else {
            return Ok(());
        };
        let line = match next {
            Some(Ok(line)) => line,
            Some(Err(e)) if e.kind() != io::ErrorKind::Interrupted => return Err(e.into()),
            Some(Err(_)) | None => {
                println!();
                output::info("Goodbye.");
                return Ok(());
            }
        };

        match parse_command(&line) {
            Command::Exit => {
                output::info("Goodbye.");
                return Ok(());
            }
            command => match dispatch(session, command) {
                Ok(()) => {}
                Err(VaultError::UserCancelled) => output::info("Cancelled."),
                Err(e) => output::error(&e.to_string()),
            },
        }
    }
}

fn dispatch<P: Prompter, E: EntryEditor>(
    session: &mut Session<P, E>,
    command: Command,
) -> Result<()> {
    match command {
        Command::Search(term) => output::print_results_table(session.search(&term)?),
        Command::List => output::print_results_table(session.list()?),
        Command::Add { top } => {
            let placement = if top {
                Placement::Prepend
            } else {
                Placement::Append
            };
            report_written(&session.add(placement)?);
        }
        Command::Show(n) => {
            let shown = session.show(parse_ref(&n)?)?;
            output::print_entry(&shown.entry)?;
            if let Some(e) = shown.save_error {
                output::warning(&format!("Access time not recorded: {e}"));
            }
        }
        Command::Edit(n) => report_written(&session.edit(parse_ref(&n)?)?),
        Command::Remove(n) => {
            let removed = session.remove(parse_ref(&n)?)?;
            output::success(&format!(
                "Removed entry {} \"{}\" ({} left)",
                removed.position,
                removed.entry.display_title(),
                removed.report.after
            ));
        }
        Command::Print => println!("{}", vault_to_pretty_json(&session.vault()?)?.as_str()),
        Command::Clear => console::Term::stdout().clear_screen()?,
        Command::Help => output::print_help(),
        Command::Empty | Command::Exit => {}
        Command::Usage(usage) => output::tip(&format!("Usage: {usage}")),
        Command::Unknown(word) => {
            output::warning(&format!("Unknown command '{word}'."));
            output::tip("Type `help` to see the available commands.");
        }
    }
    Ok(())
}

fn parse_ref(arg: &str) -> Result<DisplayRef> {
    arg.parse()
}

fn report_written(written: &Written) {
    if !written.changed {
        output::info("No changes detected.");
    }
    if written.report.added() > 0 {
        output::info(&format!("Adding {} entries.", written.report.added()));
    }
    output::success(&format!("Saved entry {}", written.position));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, Cursor};

    #[test]
    fn parses_simple_commands() {
        assert_eq!(parse_command("list"), Command::List);
        assert_eq!(parse_command("  LIST  "), Command::List);
        assert_eq!(parse_command("print"), Command::Print);
        assert_eq!(parse_command("clear"), Command::Clear);
        assert_eq!(parse_command("help"), Command::Help);
        assert_eq!(parse_command("exit"), Command::Exit);
        assert_eq!(parse_command("quit"), Command::Exit);
        assert_eq!(parse_command(""), Command::Empty);
    }

    #[test]
    fn search_term_keeps_inner_spaces() {
        assert_eq!(
            parse_command("search  my bank "),
            Command::Search("my bank".into())
        );
        assert_eq!(parse_command("search"), Command::Usage("search <term>"));
    }

    #[test]
    fn add_accepts_top_flag() {
        assert_eq!(parse_command("add"), Command::Add { top: false });
        assert_eq!(parse_command("add --top"), Command::Add { top: true });
        assert_eq!(parse_command("add sideways"), Command::Usage("add [--top]"));
    }

    #[test]
    fn indexed_commands_need_an_argument() {
        assert_eq!(parse_command("show 3"), Command::Show("3".into()));
        assert_eq!(parse_command("edit 7"), Command::Edit("7".into()));
        assert_eq!(parse_command("remove x"), Command::Remove("x".into()));
        assert_eq!(parse_command("show"), Command::Usage("show <n>"));
        assert_eq!(parse_command("remove"), Command::Usage("remove <n>"));
    }

    #[test]
    fn unknown_words_are_reported() {
        assert_eq!(parse_command("frobnicate 1"), Command::Unknown("frobnicate".into()));
    }

    #[test]
    fn bad_references_are_rejected() {
        assert!(matches!(parse_ref("0"), Err(VaultError::InvalidIndex(_))));
        assert!(matches!(parse_ref("two"), Err(VaultError::InvalidIndex(_))));
        assert_eq!(parse_ref(" 2 ").unwrap().get(), 2);
    }

    struct Deny;

    impl Prompter for Deny {
        fn passphrase(&mut self, _prompt: &str) -> Result<zeroize::Zeroizing<String>> {
            Err(VaultError::UserCancelled)
        }

        fn confirm(&mut self, _prompt: &str) -> Result<bool> {
            Ok(false)
        }
    }

    struct Unchanged;

    impl EntryEditor for Unchanged {
        fn edit(&mut self, entry: &crate::vault::Entry) -> Result<crate::vault::Entry> {
            Ok(entry.clone())
        }
    }

    /// A one-entry vault under `dir`.
    fn seeded_store(dir: &std::path::Path) -> crate::vault::VaultStore {
        use crate::crypto::kdf::Argon2Params;
        use crate::vault::{Entry, Vault, VaultStore};

        let store = VaultStore::create(
            &dir.join("v.pwv"),
            zeroize::Zeroizing::new("k".into()),
            &Argon2Params::minimum(),
        )
        .unwrap();
        store
            .save(&Vault::new(vec![Entry {
                title: "A".into(),
                username: "a".into(),
                ..Entry::default()
            }]))
            .unwrap();
        store
    }

    #[test]
    fn loop_survives_bad_commands_and_ends_at_eof() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut session = Session::new(seeded_store(dir.path()), "pc", Deny, Unchanged);
        let input = Cursor::new("list\nbogus\nshow 9\nremove 1\nedit 1\n");
        run(&mut session, input.lines(), &Interrupt::default()).unwrap();

        let vault = session.vault().unwrap();
        assert_eq!(vault.len(), 1);
        assert_eq!(vault.logins[0].access.records().len(), 1);
    }

    #[test]
    fn pending_interrupt_stops_before_the_next_command() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = seeded_store(dir.path());
        let before = std::fs::read(store.path()).unwrap();

        let interrupt = Interrupt::default();
        interrupt.raise();
        let mut session = Session::new(store, "pc", Deny, Unchanged);
        run(&mut session, Cursor::new("show 1\n").lines(), &interrupt).unwrap();

        assert_eq!(std::fs::read(session.store().path()).unwrap(), before);
    }

    #[test]
    fn interrupted_read_ends_the_loop() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut session = Session::new(seeded_store(dir.path()), "pc", Deny, Unchanged);
        let input = vec![Err(io::Error::from(io::ErrorKind::Interrupted)), Ok("show 1".into())];

        run(&mut session, input, &Interrupt::default()).unwrap();
        assert_eq!(session.vault().unwrap().logins[0].access.records().len(), 0);
    }

    struct Retitle;

    impl EntryEditor for Retitle {
        fn edit(&mut self, entry: &crate::vault::Entry) -> Result<crate::vault::Entry> {
            let mut edited = entry.clone();
            edited.title = "Changed".into();
            Ok(edited)
        }
    }

    #[test]
    fn loop_continues_after_a_failed_save() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = seeded_store(dir.path());
        let before = std::fs::read(store.path()).unwrap();
        std::fs::create_dir(dir.path().join(".v.pwv.tmp")).unwrap();

        let mut session = Session::new(store, "pc", Deny, Retitle);
        let input = Cursor::new("edit 1\nshow 1\nadd\nlist\n");
        run(&mut session, input.lines(), &Interrupt::default()).unwrap();

        assert_eq!(std::fs::read(session.store().path()).unwrap(), before);
        assert_eq!(session.vault().unwrap().logins[0].title, "A");
    }
}
