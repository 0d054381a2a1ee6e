//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use serde::Serialize;

use shelf_core::{Book, LibraryStats, StorageError};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Check if output is in quiet mode
    pub fn is_quiet(&self) -> bool {
        matches!(self.format, OutputFormat::Quiet)
    }

    /// Print a single book
    pub fn print_book(&self, book: &Book) {
        match self.format {
            OutputFormat::Human => {
                println!("ID:        {}", book.id);
                println!("Title:     {}", book.title);
                println!("Author:    {}", book.author);
                println!("Published: {}", book.publication_year);
                println!("Genre:     {}", book.genre);
                println!("Status:    {}", read_label(book.read_status));
                if !book.added_date().is_empty() {
                    println!("Added:     {}", book.added_date());
                }
            }
            OutputFormat::Json => print_json(book),
            OutputFormat::Quiet => println!("{}", book.id),
        }
    }

    /// Print books in display order with their 1-based positions
    pub fn print_books(&self, books: &[Book]) {
        match self.format {
            OutputFormat::Human => {
                if books.is_empty() {
                    println!("No books found. Add some books to get started!");
                    return;
                }
                for (i, book) in books.iter().enumerate() {
                    println!("{:>3}. {}", i + 1, book_line(book));
                }
                println!("\n{} book(s)", books.len());
            }
            OutputFormat::Json => print_json(&books),
            OutputFormat::Quiet => {
                for book in books {
                    println!("{}", book.id);
                }
            }
        }
    }

    /// Print search results
    pub fn print_matches(&self, books: &[&Book]) {
        match self.format {
            OutputFormat::Human => {
                if books.is_empty() {
                    println!("No matching books found.");
                    return;
                }
                println!("Found {} result(s).", books.len());
                for book in books {
                    println!("     {}", book_line(book));
                }
            }
            OutputFormat::Json => print_json(&books),
            OutputFormat::Quiet => {
                for book in books {
                    println!("{}", book.id);
                }
            }
        }
    }

    /// Print library statistics
    pub fn print_stats(&self, stats: &LibraryStats) {
        match self.format {
            OutputFormat::Human => {
                println!("Library Statistics");
                println!("==================");
                println!();
                println!("Total books:  {}", stats.total);
                println!("Books read:   {}", stats.read_count);
                println!("Books unread: {}", stats.unread_count);
                println!("Read:         {:.1}%", stats.percent_read);

                if stats.total == 0 {
                    println!();
                    println!("No books in library to generate statistics.");
                    return;
                }

                print_counts("By genre:", &stats.genre_counts);
                print_counts("By author:", &stats.author_counts);
                let decades: Vec<(String, usize)> = stats
                    .decade_counts
                    .iter()
                    .map(|(decade, count)| (format!("{}s", decade), *count))
                    .collect();
                print_counts("By decade:", &decades);
            }
            OutputFormat::Json => {
                let named = |counts: &[(String, usize)]| -> Vec<serde_json::Value> {
                    counts
                        .iter()
                        .map(|(name, count)| serde_json::json!({"name": name, "count": count}))
                        .collect()
                };
                let decades: Vec<_> = stats
                    .decade_counts
                    .iter()
                    .map(|(decade, count)| serde_json::json!({"decade": decade, "count": count}))
                    .collect();
                print_json(&serde_json::json!({
                    "total": stats.total,
                    "read_count": stats.read_count,
                    "unread_count": stats.unread_count,
                    "percent_read": stats.percent_read,
                    "genre_counts": named(&stats.genre_counts),
                    "author_counts": named(&stats.author_counts),
                    "decade_counts": decades
                }));
            }
            OutputFormat::Quiet => {
                println!("{} {} {}", stats.total, stats.read_count, stats.unread_count);
            }
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Report a problem recovered from while opening the library
    ///
    /// Warnings go to stderr so they never mix with JSON on stdout.
    pub fn warn(&self, warning: &StorageError) {
        if self.is_quiet() {
            return;
        }
        eprintln!("⚠ {}", warning);
        if let Some(hint) = warning.recovery_suggestion() {
            eprintln!("  {}", hint);
        }
    }

    /// Check if we should prompt for confirmation
    pub fn should_prompt(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to format output as JSON: {}", e),
    }
}

fn print_counts(heading: &str, counts: &[(String, usize)]) {
    println!();
    println!("{}", heading);
    for (name, count) in counts {
        let name = if name.is_empty() { "(none)" } else { name };
        println!("  {:<24} {}", truncate(name, 24), count);
    }
}

fn read_label(read: bool) -> &'static str {
    if read {
        "Read"
    } else {
        "Unread"
    }
}

/// One-line summary: short id, title, author, year, status
fn book_line(book: &Book) -> String {
    format!(
        "{} | {} | {} ({}) | {}",
        book.short_id(),
        truncate(&book.title, 35),
        truncate(&book.author, 25),
        book.publication_year,
        read_label(book.read_status)
    )
}

/// Truncate a string to max characters, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelf_core::NewBook;

    #[test]
    fn test_format_from_flags() {
        assert_eq!(OutputFormat::from_flags(false, false), OutputFormat::Human);
        assert_eq!(OutputFormat::from_flags(true, false), OutputFormat::Json);
        assert_eq!(OutputFormat::from_flags(false, true), OutputFormat::Quiet);
        // Quiet takes precedence
        assert_eq!(OutputFormat::from_flags(true, true), OutputFormat::Quiet);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("this is a long string", 10), "this is...");
        assert_eq!(truncate("Él niño y la ñandú", 8), "Él ni...");
    }

    #[test]
    fn test_book_line() {
        let book = Book::new(NewBook::new("Dune", "Frank Herbert", 1965).read(true));
        let line = book_line(&book);
        assert!(line.starts_with(&book.short_id()));
        assert!(line.contains("Dune | Frank Herbert (1965) | Read"));
    }

    #[test]
    fn test_should_prompt() {
        assert!(Output::new(OutputFormat::Human).should_prompt());
        assert!(!Output::new(OutputFormat::Json).should_prompt());
        assert!(Output::new(OutputFormat::Quiet).is_quiet());
    }
}
