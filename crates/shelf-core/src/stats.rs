//! Aggregate statistics over the library

use std::collections::HashMap;

use crate::models::Book;

/// Summary counts for a set of books
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LibraryStats {
    pub total: usize,
    pub read_count: usize,
    pub unread_count: usize,
    /// Percentage of books read, 0.0 for an empty library
    pub percent_read: f64,
    /// Books per genre, most common first
    pub genre_counts: Vec<(String, usize)>,
    /// Books per author, most common first
    pub author_counts: Vec<(String, usize)>,
    /// Books per decade, oldest first
    pub decade_counts: Vec<(i64, usize)>,
}

impl LibraryStats {
    /// Compute statistics in a single pass over `books`
    pub fn from_books(books: &[Book]) -> Self {
        let mut read_count = 0;
        let mut genres: HashMap<&str, usize> = HashMap::new();
        let mut authors: HashMap<&str, usize> = HashMap::new();
        let mut decades: HashMap<i64, usize> = HashMap::new();

        for book in books {
            if book.read_status {
                read_count += 1;
            }
            *genres.entry(book.genre.as_str()).or_default() += 1;
            *authors.entry(book.author.as_str()).or_default() += 1;
            *decades.entry(book.decade()).or_default() += 1;
        }

        let total = books.len();
        let percent_read = if total == 0 {
            0.0
        } else {
            read_count as f64 * 100.0 / total as f64
        };

        let mut decade_counts: Vec<(i64, usize)> = decades.into_iter().collect();
        decade_counts.sort_unstable_by_key(|(decade, _)| *decade);

        Self {
            total,
            read_count,
            unread_count: total - read_count,
            percent_read,
            genre_counts: by_count_desc(genres),
            author_counts: by_count_desc(authors),
            decade_counts,
        }
    }
}

/// Sort descending by count; equal counts are ordered by name
fn by_count_desc(counts: HashMap<&str, usize>) -> Vec<(String, usize)> {
    let mut out: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(name, count)| (name.to_string(), count))
        .collect();
    out.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewBook;

    fn book(title: &str, author: &str, year: i32, genre: &str, read: bool) -> Book {
        Book::new(NewBook::new(title, author, year).genre(genre).read(read))
    }

    #[test]
    fn test_empty() {
        let stats = LibraryStats::from_books(&[]);
        assert_eq!(stats.total, 0);
        assert_eq!(stats.read_count, 0);
        assert_eq!(stats.unread_count, 0);
        assert_eq!(stats.percent_read, 0.0);
        assert!(stats.genre_counts.is_empty());
        assert!(stats.author_counts.is_empty());
        assert!(stats.decade_counts.is_empty());
    }

    #[test]
    fn test_counts_and_percent() {
        let books = vec![
            book("Dune", "Herbert", 1965, "Science", false),
            book("Foundation", "Asimov", 1951, "Science", true),
        ];
        let stats = LibraryStats::from_books(&books);

        assert_eq!(stats.total, 2);
        assert_eq!(stats.read_count, 1);
        assert_eq!(stats.unread_count, 1);
        assert_eq!(stats.percent_read, 50.0);
        assert_eq!(stats.decade_counts, vec![(1950, 1), (1960, 1)]);
        assert_eq!(stats.genre_counts, vec![("Science".to_string(), 2)]);
    }

    #[test]
    fn test_ordering() {
        let books = vec![
            book("Emma", "Austen", 1815, "Romance", true),
            book("I, Robot", "Asimov", 1950, "Science", false),
            book("Foundation", "Asimov", 1951, "Science", true),
            book("Persuasion", "Austen", 1817, "Romance", false),
            book("The End of Eternity", "Asimov", 1955, "Science", false),
            book("Cosmos", "Sagan", 1980, "Non-Fiction", true),
        ];
        let stats = LibraryStats::from_books(&books);

        assert_eq!(
            stats.author_counts,
            vec![
                ("Asimov".to_string(), 3),
                ("Austen".to_string(), 2),
                ("Sagan".to_string(), 1),
            ]
        );
        assert_eq!(stats.genre_counts[0], ("Science".to_string(), 3));
        assert_eq!(stats.genre_counts[1], ("Romance".to_string(), 2));
        assert_eq!(
            stats.decade_counts,
            vec![(1810, 2), (1950, 3), (1980, 1)]
        );
    }

    #[test]
    fn test_ties_sorted_by_name() {
        let books = vec![
            book("B", "Zola", 2000, "History", false),
            book("A", "Alcott", 2001, "Fiction", false),
        ];
        let stats = LibraryStats::from_books(&books);

        assert_eq!(stats.author_counts[0].0, "Alcott");
        assert_eq!(stats.genre_counts[0].0, "Fiction");
        assert_eq!(stats.decade_counts, vec![(2000, 2)]);
    }

    #[test]
    fn test_percent_read_fraction() {
        let books = vec![
            book("A", "X", 2000, "Fiction", true),
            book("B", "X", 2000, "Fiction", false),
            book("C", "X", 2000, "Fiction", false),
        ];
        let stats = LibraryStats::from_books(&books);
        assert!((stats.percent_read - 33.333).abs() < 0.01);
    }

    #[test]
    fn test_extreme_years_do_not_overflow() {
        let books = vec![
            book("Oldest", "X", i32::MIN, "Fiction", false),
            book("Newest", "X", i32::MAX, "Fiction", false),
            book("Dune", "Herbert", 1965, "Science", false),
        ];
        let stats = LibraryStats::from_books(&books);

        assert_eq!(
            stats.decade_counts,
            vec![(-2_147_483_650, 1), (1960, 1), (2_147_483_640, 1)]
        );
    }
}
