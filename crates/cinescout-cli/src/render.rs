use std::fmt;

use cinescout_core::MovieRecord;
use cinescout_search::SearchState;

const MAX_LISTED: usize = 10;

/// Plain-text view of one state snapshot.
pub(crate) fn render(state: &SearchState) -> String {
    StateView(state).to_string()
}

struct StateView<'a>(&'a SearchState);

impl fmt::Display for StateView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.0;

        match state.settled_query.as_deref().map(str::trim) {
            Some("") | None => write!(f, "== Popular movies")?,
            Some(term) => write!(f, "== Results for \"{term}\"")?,
        }
        if state.loading {
            write!(f, " (loading...)")?;
        }
        writeln!(f)?;

        if let Some(message) = &state.error_message {
            writeln!(f, "   {message}")?;
        } else if !state.loading {
            for movie in state.movies.iter().take(MAX_LISTED) {
                writeln!(f, "   {}", MovieLine(movie))?;
            }
            if state.movies.len() > MAX_LISTED {
                writeln!(f, "   ... and {} more", state.movies.len() - MAX_LISTED)?;
            }
        }

        if !state.trending.is_empty() {
            writeln!(f, "== Trending")?;
            for (rank, entry) in state.trending.iter().enumerate() {
                let noun = if entry.search_count == 1 { "search" } else { "searches" };
                writeln!(
                    f,
                    "   {}. {} ({} {noun})",
                    rank + 1,
                    entry.movie_title,
                    entry.search_count
                )?;
            }
        }
        Ok(())
    }
}

struct MovieLine<'a>(&'a MovieRecord);

impl fmt::Display for MovieLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let movie = self.0;
        let year = movie
            .release_date
            .as_deref()
            .and_then(|d| d.get(..4))
            .filter(|y| y.chars().all(|c| c.is_ascii_digit()));
        match year {
            Some(year) => write!(f, "{} ({year})", movie.display_title()),
            None => write!(f, "{}", movie.display_title()),
        }
    }
}
