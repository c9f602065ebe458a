//! Spoiler log parser
//!
//! The spoiler log is written by the randomizer when a seed is generated and
//! rewritten as checks are collected. The parts read here:
//!
//! ```text
//! Seed: 1234567
//! Major Items
//! 	Sword: Forest Grave Path - Sword Pickup
//! Overworld (23)
//! 	x Overworld - [Southwest] Fountain Page: Page 3
//! 	- Overworld - [West] Moss Chest: Fairy
//! 	- Windmill Entrance -- Cube Cave Exit
//! ```
//!
//! Check lines start with `x` once collected and `-` otherwise.
//! Lines indented with a tab right after `Major Items` repeat checks that are
//! listed again under their region, so they are skipped.

use std::io::{self, BufRead};
use std::sync::LazyLock;

use regex::Regex;

use super::lossy_lines;

use crate::domain::{is_shop_terminal, PairingGraph};

static CHECK_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s+([-x]) ([^-]+) - ([^:]+): ").expect("valid check regex"));

static PAIRING_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+- (.+) -- (.+)$").expect("valid pairing regex"));

const SEED_PREFIX: &str = "Seed: ";
const MAJOR_ITEMS: &str = "Major Items";

/// Classification of a single spoiler line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpoilerLine<'a> {
    Seed(&'a str),
    Check {
        found: bool,
        region: &'a str,
        check: &'a str,
    },
    Pairing(&'a str, &'a str),
    Other,
}

impl<'a> SpoilerLine<'a> {
    pub fn classify(line: &'a str) -> Self {
        if let Some(seed) = line.strip_prefix(SEED_PREFIX) {
            return SpoilerLine::Seed(seed);
        }

        if let Some(caps) = CHECK_LINE.captures(line) {
            if let (Some(marker), Some(region), Some(check)) = (caps.get(1), caps.get(2), caps.get(3)) {
                return SpoilerLine::Check {
                    found: marker.as_str() != "-",
                    region: region.as_str(),
                    check: check.as_str(),
                };
            }
        }

        if let Some(caps) = PAIRING_LINE.captures(line) {
            if let (Some(a), Some(b)) = (caps.get(1), caps.get(2)) {
                return SpoilerLine::Pairing(a.as_str(), b.as_str());
            }
        }

        SpoilerLine::Other
    }
}

/// A check reported by the spoiler log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckLine {
    pub region: String,
    pub check: String,
    pub found: bool,
}

/// Everything extracted from one spoiler log
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpoilerLog {
    pub seed: String,
    /// Check lines in file order, not yet validated against the world
    pub checks: Vec<CheckLine>,
    pub graph: PairingGraph,
    /// Doors that lead into the shop, in file order
    pub shop_destinations: Vec<String>,
    /// Number of pairing lines seen
    pub pairings: usize,
}

impl SpoilerLog {
    /// Reads a spoiler log line by line
    pub fn read<R: BufRead>(reader: R) -> io::Result<Self> {
        let mut scanner = Scanner::default();
        for line in lossy_lines(reader) {
            scanner.push(&line?);
        }
        Ok(scanner.log)
    }

    /// Parses an in-memory spoiler log
    pub fn parse(text: &str) -> Self {
        let mut scanner = Scanner::default();
        for line in text.lines() {
            scanner.push(line);
        }
        scanner.log
    }
}

#[derive(Default)]
struct Scanner {
    log: SpoilerLog,
    in_major_items: bool,
}

impl Scanner {
    fn push(&mut self, line: &str) {
        if self.in_major_items && line.starts_with('\t') {
            return;
        }
        self.in_major_items = false;
        if line == MAJOR_ITEMS {
            self.in_major_items = true;
            return;
        }

        match SpoilerLine::classify(line) {
            SpoilerLine::Seed(seed) => self.log.seed = seed.to_string(),
            SpoilerLine::Check {
                found,
                region,
                check,
            } => self.log.checks.push(CheckLine {
                region: region.to_string(),
                check: check.to_string(),
                found,
            }),
            SpoilerLine::Pairing(a, b) => {
                match (is_shop_terminal(a), is_shop_terminal(b)) {
                    (false, true) => self.log.shop_destinations.push(a.to_string()),
                    (true, false) => self.log.shop_destinations.push(b.to_string()),
                    _ => {}
                }
                self.log.graph.insert(a, b);
                self.log.pairings += 1;
            }
            SpoilerLine::Other => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_seed() {
        assert_eq!(SpoilerLine::classify("Seed: 54321"), SpoilerLine::Seed("54321"));
    }

    #[test]
    fn classify_check_lines() {
        assert_eq!(
            SpoilerLine::classify("\tx Overworld - [Southwest] Fountain Page: Page 3"),
            SpoilerLine::Check {
                found: true,
                region: "Overworld",
                check: "[Southwest] Fountain Page",
            }
        );
        assert_eq!(
            SpoilerLine::classify("\t- East Forest - Spider Chest: Money x20"),
            SpoilerLine::Check {
                found: false,
                region: "East Forest",
                check: "Spider Chest",
            }
        );
    }

    #[test]
    fn classify_pairing_line() {
        assert_eq!(
            SpoilerLine::classify("\t- Windmill Entrance -- Cube Cave Exit"),
            SpoilerLine::Pairing("Windmill Entrance", "Cube Cave Exit")
        );
    }

    #[test]
    fn check_and_pairing_patterns_are_disjoint() {
        assert!(matches!(
            SpoilerLine::classify("\t- Windmill Entrance -- Cube Cave Exit"),
            SpoilerLine::Pairing(..)
        ));
        assert!(matches!(
            SpoilerLine::classify("\tx Overworld - [West] Moss Chest: Fairy"),
            SpoilerLine::Check { .. }
        ));
    }

    #[test]
    fn unindented_lines_are_ignored() {
        assert_eq!(SpoilerLine::classify("Overworld (23)"), SpoilerLine::Other);
        assert_eq!(
            SpoilerLine::classify("x Overworld - [West] Moss Chest: Fairy"),
            SpoilerLine::Other
        );
    }

    #[test]
    fn parse_full_log() {
        let text = "Seed: 54321\n\
                    Overworld (2)\n\
                    \tx Overworld - [West] Moss Chest: Fairy\n\
                    \t- Overworld - [West] Chest After Bell: Money x15\n\
                    Entrances\n\
                    \t- Windmill Entrance -- Windmill Exit\n";
        let log = SpoilerLog::parse(text);

        assert_eq!(log.seed, "54321");
        assert_eq!(log.checks.len(), 2);
        assert!(log.checks[0].found);
        assert!(!log.checks[1].found);
        assert_eq!(log.pairings, 1);
        assert_eq!(log.graph.partner("Windmill Exit"), Some("Windmill Entrance"));
    }

    #[test]
    fn major_items_block_is_skipped() {
        let text = "Major Items\n\
                    \tx Overworld - [West] Moss Chest: Fairy\n\
                    \t- Fake Door -- Other Fake Door\n\
                    Overworld (1)\n\
                    \tx Overworld - [West] Moss Chest: Fairy\n";
        let log = SpoilerLog::parse(text);

        assert_eq!(log.checks.len(), 1);
        assert!(log.graph.is_empty());
    }

    #[test]
    fn major_items_block_ends_at_first_unindented_line() {
        let text = "Major Items\n\
                    \tx Overworld - [West] Moss Chest: Fairy\n\
                    \n\
                    \tx Overworld - [West] Chest After Bell: Fairy\n";
        let log = SpoilerLog::parse(text);

        assert_eq!(log.checks.len(), 1);
        assert_eq!(log.checks[0].check, "[West] Chest After Bell");
    }

    #[test]
    fn shop_pairings_are_listed_in_order() {
        let text = "\t- Windmill Shop -- Shop Portal\n\
                    \t- Windmill Entrance -- Windmill Exit\n\
                    \t- Shop -- Atoll Shop\n\
                    \t- Shop -- Shop Portal\n";
        let log = SpoilerLog::parse(text);

        assert_eq!(log.shop_destinations, vec!["Windmill Shop", "Atoll Shop"]);
        assert_eq!(log.pairings, 4);
    }

    #[test]
    fn read_matches_parse() {
        let text = "Seed: 1\n\t- A -- B\r\n\tx Overworld - [West] Moss Chest: Fairy\n";
        let read = SpoilerLog::read(io::Cursor::new(text)).unwrap();
        assert_eq!(read, SpoilerLog::parse(text));
        assert_eq!(read.graph.partner("A"), Some("B"));
    }
}
