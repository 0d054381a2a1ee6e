//! Book command handlers

use anyhow::{bail, Context, Result};
use chrono::{Datelike, Local};
use uuid::Uuid;

use shelf_core::{Catalog, Config, NewBook, SearchField, GENRES};

use crate::output::Output;
use crate::prompt::confirm;

/// Which book a remove or toggle command refers to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Full UUID or unique prefix
    Id(String),
    /// 1-based position as shown by `shelf list`
    Position(usize),
}

impl Target {
    /// Build a target from the mutually exclusive CLI arguments
    pub fn from_args(id: Option<String>, position: Option<usize>) -> Result<Self> {
        match (id, position) {
            (Some(id), None) => Ok(Target::Id(id)),
            (None, Some(position)) => Ok(Target::Position(position)),
            _ => bail!("Specify either a book ID or --position"),
        }
    }
}

/// Raw `shelf add` arguments, before validation
#[derive(Debug, Clone)]
pub struct AddArgs {
    pub title: String,
    pub author: String,
    pub year: i32,
    pub genre: String,
    pub read: bool,
}

/// Add a new book after validating the input
pub fn add(catalog: &mut Catalog, config: &Config, args: AddArgs, output: &Output) -> Result<()> {
    let input = validate_new_book(
        &args.title,
        &args.author,
        args.year,
        &args.genre,
        config.min_year,
        Local::now().year(),
    )?
    .read(args.read);

    let book = catalog.add(input).context("Failed to add book")?;

    output.success(&format!("Book added: {}", book.short_id()));
    output.print_book(&book);
    Ok(())
}

/// List all books in display order
pub fn list(catalog: &Catalog, output: &Output) -> Result<()> {
    output.print_books(catalog.books());
    Ok(())
}

/// Show a single book
pub fn show(catalog: &Catalog, id: String, output: &Output) -> Result<()> {
    let uuid = resolve_id(catalog, &id)?;
    let book = catalog
        .get(uuid)
        .ok_or_else(|| anyhow::anyhow!("Book not found: {}", id))?;

    output.print_book(book);
    Ok(())
}

/// Remove a book, asking for confirmation in interactive mode
pub fn remove(catalog: &mut Catalog, target: Target, yes: bool, output: &Output) -> Result<()> {
    let Some(index) = resolve_target(catalog, &target)? else {
        output.message(&not_at_position(&target));
        return Ok(());
    };

    if output.should_prompt() && !yes {
        let book = &catalog.books()[index];
        println!("Remove: {} - {} by {}", book.short_id(), book.title, book.author);
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    match catalog.remove_at(index).context("Failed to remove book")? {
        Some(book) => output.success(&format!("Book removed: {}", book.title)),
        None => output.message(&not_at_position(&target)),
    }
    Ok(())
}

/// Flip a book's read status
pub fn toggle(catalog: &mut Catalog, target: Target, output: &Output) -> Result<()> {
    let Some(index) = resolve_target(catalog, &target)? else {
        output.message(&not_at_position(&target));
        return Ok(());
    };

    match catalog
        .toggle_read_at(index)
        .context("Failed to update read status")?
    {
        Some(read) => {
            let book = &catalog.books()[index];
            let label = if read { "read" } else { "unread" };
            output.success(&format!("Marked '{}' as {}", book.title, label));
        }
        None => output.message(&not_at_position(&target)),
    }
    Ok(())
}

/// Search one field for a term
pub fn search(catalog: &Catalog, term: String, field: SearchField, output: &Output) -> Result<()> {
    if term.is_empty() {
        bail!("Search term cannot be empty");
    }
    let matches = catalog.search(&term, field);
    output.print_matches(&matches);
    Ok(())
}

/// Check and normalize input for a new book
///
/// Title and author are trimmed and must be non-empty, the year must lie
/// in `[min_year, current_year]`, and the genre must be one of `GENRES`
/// (case-insensitive; returned in its canonical spelling).
pub fn validate_new_book(
    title: &str,
    author: &str,
    year: i32,
    genre: &str,
    min_year: i32,
    current_year: i32,
) -> Result<NewBook> {
    let title = title.trim();
    let author = author.trim();

    if title.is_empty() {
        bail!("Title cannot be empty");
    }
    if author.is_empty() {
        bail!("Author cannot be empty");
    }
    if year < min_year || year > current_year {
        bail!(
            "Publication year {} is out of range ({}-{})",
            year,
            min_year,
            current_year
        );
    }

    let genre = GENRES
        .iter()
        .find(|g| g.eq_ignore_ascii_case(genre.trim()))
        .ok_or_else(|| {
            anyhow::anyhow!(
                "Unknown genre '{}'. Valid genres: {}",
                genre,
                GENRES.join(", ")
            )
        })?;

    Ok(NewBook::new(title, author, year).genre(*genre))
}

/// Resolve a target to an index; `None` means no book at that position
fn resolve_target(catalog: &Catalog, target: &Target) -> Result<Option<usize>> {
    match target {
        Target::Id(id) => {
            let uuid = resolve_id(catalog, id)?;
            Ok(catalog.position(uuid))
        }
        Target::Position(position) => Ok(position
            .checked_sub(1)
            .filter(|index| *index < catalog.len())),
    }
}

fn not_at_position(target: &Target) -> String {
    match target {
        Target::Id(id) => format!("No book found matching: {}", id),
        Target::Position(position) => format!("No book at position {}", position),
    }
}

/// Parse a book ID (supports full UUID or prefix)
fn resolve_id(catalog: &Catalog, id: &str) -> Result<Uuid> {
    let id = id.trim();
    if id.is_empty() {
        bail!("Book ID cannot be empty");
    }
    if let Ok(uuid) = Uuid::parse_str(id) {
        return Ok(uuid);
    }

    let matches = catalog.find_by_id_prefix(id);
    match matches.len() {
        0 => bail!("No book found matching: {}", id),
        1 => Ok(matches[0].id),
        _ => {
            eprintln!("Multiple books match '{}':", id);
            for book in &matches {
                eprintln!("  {} - {}", book.id, book.title);
            }
            bail!("Ambiguous ID. Please provide more characters.");
        }
    }
}
