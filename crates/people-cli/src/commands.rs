//! Subcommands, shared by one-shot invocations and the interactive shell.

use std::path::PathBuf;

use anyhow::Context as _;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use people_core::{
  Error, Result,
  person::{Nif, Person, Photo},
  registry::Registry,
  store::PersonStore,
};
use serde::Serialize;
use tokio::io::{AsyncBufReadExt as _, BufReader};
use tracing::debug;

#[derive(Subcommand, Debug)]
pub enum Command {
  /// Register a new person.
  Insert(PersonArgs),
  /// Show one person.
  Read {
    nif:          Nif,
    /// Also write the person's photo to this file.
    #[arg(long, value_name = "FILE")]
    export_photo: Option<PathBuf>,
  },
  /// Replace every field of a registered person.
  Update(PersonArgs),
  /// Remove one person and their photo.
  Delete { nif: Nif },
  /// Show everyone.
  List {
    #[arg(long)]
    json: bool,
  },
  /// Print how many people are registered.
  Count,
  /// Remove every person and every photo.
  DeleteAll {
    /// Required; nothing is deleted without it.
    #[arg(long)]
    yes: bool,
  },
  /// Read commands from stdin, one per line, against the same backend.
  Shell,
}

#[derive(Args, Debug)]
pub struct PersonArgs {
  /// National identity number: 1 to 9 letters or digits.
  #[arg(long)]
  pub nif:         Nif,
  #[arg(long)]
  pub name:        String,
  #[arg(long)]
  pub phone:       String,
  #[arg(long)]
  pub postal_code: String,
  #[arg(long, value_name = "YYYY-MM-DD")]
  pub born:        Option<NaiveDate>,
  /// PNG file to attach.
  #[arg(long, value_name = "FILE")]
  pub photo:       Option<PathBuf>,
}

impl PersonArgs {
  async fn into_person(self) -> Result<Person> {
    let mut person = Person::new(self.nif, self.name, self.phone, self.postal_code);
    person.date_of_birth = self.born;
    if let Some(path) = self.photo {
      let bytes = tokio::fs::read(&path)
        .await
        .map_err(|e| Error::InvalidPhoto(format!("{}: {e}", path.display())))?;
      person.photo = Some(Photo::from_png(bytes)?);
    }
    Ok(person)
  }
}

/// One shell line, parsed with the same grammar as the command line.
#[derive(Parser, Debug)]
#[command(no_binary_name = true)]
struct ShellLine {
  #[command(subcommand)]
  command: Command,
}

// ─── Execution ───────────────────────────────────────────────────────────────

/// Run `command` and return the text to show the user.
pub async fn execute<S: PersonStore>(
  registry: &mut Registry<S>,
  command: Command,
) -> Result<String> {
  match command {
    Command::Insert(args) => {
      let person = args.into_person().await?;
      let nif = person.nif().clone();
      registry.insert(person).await?;
      Ok(format!("inserted {nif}"))
    }
    Command::Read { nif, export_photo } => {
      let person = registry
        .read(&nif)
        .await?
        .ok_or_else(|| Error::NotRegistered(nif.clone()))?;
      let mut out = describe(&person);
      if let Some(path) = export_photo {
        match &person.photo {
          Some(photo) => {
            tokio::fs::write(&path, photo.as_png()).await?;
            out.push_str(&format!("\nphoto written to {}", path.display()));
          }
          None => out.push_str("\nno photo to export"),
        }
      }
      Ok(out)
    }
    Command::Update(args) => {
      let person = args.into_person().await?;
      let nif = person.nif().clone();
      registry.update(person).await?;
      Ok(format!("updated {nif}"))
    }
    Command::Delete { nif } => {
      registry.delete(&nif).await?;
      Ok(format!("deleted {nif}"))
    }
    Command::List { json } => {
      let people = registry.read_all().await?;
      if json {
        let views: Vec<PersonView> = people.iter().map(PersonView::from).collect();
        return serde_json::to_string_pretty(&views).map_err(|e| Error::Decode(e.to_string()));
      }
      Ok(people.iter().map(summary).collect::<Vec<_>>().join("\n"))
    }
    Command::Count => Ok(registry.count().await?.to_string()),
    Command::DeleteAll { yes: false } => {
      Ok("nothing deleted; pass --yes to remove every record".to_string())
    }
    Command::DeleteAll { yes: true } => {
      let cleared = registry.delete_all().await?;
      let mut out = format!("deleted {} records", cleared.records);
      for path in &cleared.leftover_photos {
        out.push_str(&format!("\ncould not remove {}", path.display()));
      }
      Ok(out)
    }
    Command::Shell => Ok("already in a shell".to_string()),
  }
}

/// Execute and print. Domain errors become warnings; anything else ends
/// the session.
pub async fn run<S: PersonStore>(
  registry: &mut Registry<S>,
  command: Command,
) -> anyhow::Result<()> {
  match execute(registry, command).await {
    Ok(out) => {
      if !out.is_empty() {
        println!("{out}");
      }
      Ok(())
    }
    Err(e) if e.is_domain() => {
      debug!(error = %e, "command refused");
      eprintln!("warning: {e}");
      Ok(())
    }
    Err(e) => Err(e.into()),
  }
}

/// Read commands from stdin until EOF, `exit` or `quit`.
pub async fn shell<S: PersonStore>(registry: &mut Registry<S>) -> anyhow::Result<()> {
  let mut lines = BufReader::new(tokio::io::stdin()).lines();
  while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
    let words = match split_words(&line) {
      Ok(words) => words,
      Err(e) => {
        eprintln!("error: {e}");
        continue;
      }
    };
    match words.first().map(String::as_str) {
      None => continue,
      Some("exit" | "quit") => break,
      Some(_) => {}
    }
    match ShellLine::try_parse_from(words) {
      Ok(ShellLine { command }) => run(registry, command).await?,
      Err(e) => eprint!("{e}"),
    }
  }
  Ok(())
}

/// Split a line on whitespace, keeping double-quoted runs together.
pub fn split_words(line: &str) -> anyhow::Result<Vec<String>> {
  let mut words = Vec::new();
  let mut current = String::new();
  let mut in_word = false;
  let mut quoted = false;

  for c in line.chars() {
    match c {
      '"' => {
        quoted = !quoted;
        in_word = true;
      }
      c if c.is_whitespace() && !quoted => {
        if in_word {
          words.push(std::mem::take(&mut current));
          in_word = false;
        }
      }
      c => {
        current.push(c);
        in_word = true;
      }
    }
  }

  if quoted {
    anyhow::bail!("unterminated quote");
  }
  if in_word {
    words.push(current);
  }
  Ok(words)
}

// ─── Output ──────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct PersonView<'a> {
  nif:           &'a str,
  name:          &'a str,
  phone_number:  &'a str,
  postal_code:   &'a str,
  date_of_birth: Option<NaiveDate>,
  has_photo:     bool,
}

impl<'a> From<&'a Person> for PersonView<'a> {
  fn from(p: &'a Person) -> Self {
    Self {
      nif:           p.nif().as_str(),
      name:          &p.name,
      phone_number:  &p.phone_number,
      postal_code:   &p.postal_code,
      date_of_birth: p.date_of_birth,
      has_photo:     p.photo.is_some(),
    }
  }
}

fn born(p: &Person) -> String {
  p.date_of_birth.map_or_else(|| "-".to_string(), |d| d.to_string())
}

fn photo_note(p: &Person) -> String {
  p.photo
    .as_ref()
    .map_or_else(|| "none".to_string(), |ph| format!("{} bytes", ph.byte_len()))
}

fn summary(p: &Person) -> String {
  format!(
    "{}\t{}\t{}\t{}\t{}\tphoto: {}",
    p.nif(),
    p.name,
    p.phone_number,
    p.postal_code,
    born(p),
    photo_note(p),
  )
}

fn describe(p: &Person) -> String {
  format!(
    "nif:           {}\nname:          {}\nphone:         {}\npostal code:   {}\ndate of birth: {}\nphoto:         {}",
    p.nif(),
    p.name,
    p.phone_number,
    p.postal_code,
    born(p),
    photo_note(p),
  )
}
