//! Parsing of the player's typed lines. Nothing here touches the board.

use thiserror::Error;

use termsweeper_core::{Coord2, Item};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("expected a number, got {0:?}")]
    NotANumber(String),
    #[error("coordinates must not be negative")]
    NegativeCoordinate,
    #[error("expected `x y action`")]
    WrongArity,
    #[error("unknown action {0:?}")]
    UnknownAction(String),
    #[error("unknown item {0:?}")]
    UnknownItem(String),
    #[error("empty input")]
    Empty,
}

/// A single player command during a round.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Move {
    Reveal(Coord2),
    Flag(Coord2),
    Buy(Item),
    Scan,
    Quit,
}

pub fn parse_number(token: &str) -> Result<i64, InputError> {
    token
        .trim()
        .parse()
        .map_err(|_| InputError::NotANumber(token.trim().to_owned()))
}

fn parse_coord(token: &str) -> Result<usize, InputError> {
    let value = parse_number(token)?;
    usize::try_from(value).map_err(|_| InputError::NegativeCoordinate)
}

fn parse_item(token: &str) -> Result<Item, InputError> {
    Item::ALL
        .into_iter()
        .find(|item| item.name().eq_ignore_ascii_case(token) || (token == "scan" && *item == Item::Scanner))
        .ok_or_else(|| InputError::UnknownItem(token.to_owned()))
}

/// Parses `x y l` (reveal), `x y r` (flag), `buy <item>`, `scan` and `q`/`quit`.
pub fn parse_move(line: &str) -> Result<Move, InputError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    match tokens.as_slice() {
        [] => Err(InputError::Empty),
        ["q" | "quit"] => Ok(Move::Quit),
        ["scan"] => Ok(Move::Scan),
        ["buy", item] => parse_item(item).map(Move::Buy),
        [x, y, action] => {
            let coords = (parse_coord(x)?, parse_coord(y)?);
            match *action {
                "l" => Ok(Move::Reveal(coords)),
                "r" => Ok(Move::Flag(coords)),
                other => Err(InputError::UnknownAction(other.to_owned())),
            }
        }
        _ => Err(InputError::WrongArity),
    }
}

/// Usernames end up in file names and whitespace-separated records.
pub fn is_valid_username(name: &str) -> bool {
    !name.is_empty()
        && !name.chars().any(char::is_whitespace)
        && !name.contains(['/', '\\'])
        && name != "."
        && name != ".."
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_reveal_and_flag() {
        assert_eq!(parse_move("3 4 l"), Ok(Move::Reveal((3, 4))));
        assert_eq!(parse_move("  0 12 r \n"), Ok(Move::Flag((0, 12))));
    }

    #[test]
    fn rejects_malformed_moves() {
        assert_eq!(parse_move(""), Err(InputError::Empty));
        assert_eq!(parse_move("1 2"), Err(InputError::WrongArity));
        assert_eq!(
            parse_move("a 2 l"),
            Err(InputError::NotANumber("a".to_owned()))
        );
        assert_eq!(
            parse_move("1 2 x"),
            Err(InputError::UnknownAction("x".to_owned()))
        );
        assert_eq!(parse_move("-1 2 l"), Err(InputError::NegativeCoordinate));
    }

    #[test]
    fn parses_ladder_commands() {
        assert_eq!(parse_move("buy revive"), Ok(Move::Buy(Item::Revive)));
        assert_eq!(parse_move("buy scanner"), Ok(Move::Buy(Item::Scanner)));
        assert_eq!(parse_move("buy scan"), Ok(Move::Buy(Item::Scanner)));
        assert_eq!(parse_move("scan"), Ok(Move::Scan));
        assert_eq!(parse_move("quit"), Ok(Move::Quit));
        assert_eq!(
            parse_move("buy cake"),
            Err(InputError::UnknownItem("cake".to_owned()))
        );
    }

    #[test]
    fn username_rules() {
        assert!(is_valid_username("alice"));
        assert!(!is_valid_username(""));
        assert!(!is_valid_username("a b"));
        assert!(!is_valid_username("../x"));
    }
}
