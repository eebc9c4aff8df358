//! Configuration collaborator: the default symbol universe and the run
//! knobs live here, outside the engine, and are handed in by the caller.

use anyhow::{bail, Context, Result};
use std::path::PathBuf;

pub const DEFAULT_YEARS_FOR_PAYOUT: u32 = 5;
pub const DEFAULT_YIELD_THRESHOLD: f64 = 0.06;

const STATE_FILE_VAR: &str = "DIVSCAN_STATE_FILE";
const SYMBOLS_FILE_VAR: &str = "DIVSCAN_SYMBOLS_FILE";
const DEFAULT_STATE_FILE: &str = "state.json";

/// Default universe: the TWSE listings the screen was built around.
const DEFAULT_SYMBOLS: &[&str] = &[
    "1101.TW", "1102.TW", "1103.TW", "1104.TW", "1108.TW", "1109.TW", "1110.TW",
    "1201.TW", "1203.TW", "1210.TW", "1213.TW", "1215.TW", "1216.TW", "1217.TW",
    "2330.TW", "2317.TW", "2454.TW", "2303.TW", "2308.TW", "2382.TW", "2881.TW",
];

/// Where the snapshot store lives; `DIVSCAN_STATE_FILE` overrides the
/// default `state.json` next to the working directory.
pub fn state_file() -> PathBuf {
    std::env::var(STATE_FILE_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_STATE_FILE))
}

/// Resolve the symbol universe: an explicit CLI list wins, then a
/// `DIVSCAN_SYMBOLS_FILE` file, then the built-in default list.
pub fn universe(cli_symbols: &[String]) -> Result<Vec<String>> {
    let cli_symbols: Vec<String> = cli_symbols
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    if !cli_symbols.is_empty() {
        return Ok(cli_symbols);
    }

    if let Ok(path) = std::env::var(SYMBOLS_FILE_VAR) {
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("reading symbols file {path}"))?;
        let symbols = parse_symbols(&text);
        if symbols.is_empty() {
            bail!("symbols file {path} contains no symbols");
        }
        return Ok(symbols);
    }

    Ok(DEFAULT_SYMBOLS.iter().map(|s| s.to_string()).collect())
}

/// Symbols separated by newlines or commas; `#` starts a comment.
fn parse_symbols(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| line.split('#').next().unwrap_or(""))
        .flat_map(|line| line.split(','))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commas_newlines_and_comments() {
        let text = "
            # cement
            1101.TW, 1102.TW
            2330.TW   # fab
            ,
        ";
        assert_eq!(parse_symbols(text), vec!["1101.TW", "1102.TW", "2330.TW"]);
    }

    #[test]
    fn cli_list_wins_and_drops_blanks() {
        let cli = vec!["2330.TW".to_string(), " ".to_string(), "2317.TW ".to_string()];
        let universe = universe(&cli).unwrap();
        assert_eq!(universe, vec!["2330.TW", "2317.TW"]);
    }
}
