//! Numbered-menu front end for people who prefer not to remember
//! subcommands.

use std::io::{BufRead, Write};

use crate::{
    error::Result,
    search::{self, SearchEngine},
    store::{BuildStats, IndexStore},
};

/// Results shown per query in the menu.
pub const MENU_RESULT_LIMIT: usize = 5;

const MENU: &str = "\nChoose an action:\n\
    1: build / incrementally update the index\n\
    2: search documents\n\
    3: rebuild the index from scratch\n\
    exit: quit\n";

/// Run the menu loop until `exit` or end of input.
pub fn run<R: BufRead, W: Write>(
    store: &mut IndexStore,
    engine: &SearchEngine,
    mut input: R,
    out: &mut W,
) -> Result<()> {
    writeln!(out, "fuzzdoc: local fuzzy document search")?;
    write!(out, "{MENU}")?;

    loop {
        write!(out, "> ")?;
        out.flush()?;
        let Some(choice) = read_line(&mut input)? else {
            break;
        };

        match choice.to_lowercase().as_str() {
            "1" => {
                let stats = store.build_index(false)?;
                writeln!(out, "{}", summarize(&stats))?;
            }
            "2" => {
                write!(out, "query: ")?;
                out.flush()?;
                let query = read_line(&mut input)?.unwrap_or_default();
                if query.is_empty() {
                    writeln!(out, "The query must not be empty.")?;
                } else {
                    let hits = engine.search(store, &query, MENU_RESULT_LIMIT);
                    writeln!(out, "{}", search::format_human(&hits, store.index()))?;
                }
            }
            "3" => {
                let stats = store.build_index(true)?;
                writeln!(out, "{}", summarize(&stats))?;
            }
            "exit" => {
                writeln!(out, "Bye.")?;
                break;
            }
            _ => writeln!(out, "Unknown choice, try again.")?,
        }
        write!(out, "{MENU}")?;
    }

    Ok(())
}

/// One-line description of a build.
pub fn summarize(stats: &BuildStats) -> String {
    format!(
        "Indexed | added: {} updated: {} removed: {} documents: {} vocabulary: {}",
        stats.added,
        stats.updated,
        stats.removed,
        stats.total_docs,
        stats.vocab_size
    )
}

fn read_line<R: BufRead>(input: &mut R) -> Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}
