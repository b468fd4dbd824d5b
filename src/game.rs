use crate::connect4::Player;
use std::fmt;

/// Where a game stands after a move.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Status {
    Ongoing,
    RedWin,
    YellowWin,
    Draw,
}

impl Status {
    /// Returns the status for a game the given player has just won.
    pub fn won_by(player: Player) -> Self {
        match player {
            Player::Red => Self::RedWin,
            Player::Yellow => Self::YellowWin,
        }
    }

    pub fn is_terminal(self) -> bool {
        self != Self::Ongoing
    }

    pub fn winner(self) -> Option<Player> {
        match self {
            Self::RedWin => Some(Player::Red),
            Self::YellowWin => Some(Player::Yellow),
            _ => None,
        }
    }

    /// The outcome value backpropagated through the search tree: +1 when
    /// Yellow wins, -1 when Red wins and 0 otherwise.
    pub fn value(self) -> i32 {
        self.winner().map_or(0, Player::sign)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Ongoing => "ongoing",
            Self::RedWin => "red wins",
            Self::YellowWin => "yellow wins",
            Self::Draw => "draw",
        };
        f.write_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_follow_sign_convention() {
        assert_eq!(Status::YellowWin.value(), 1);
        assert_eq!(Status::RedWin.value(), -1);
        assert_eq!(Status::Draw.value(), 0);
        assert_eq!(Status::Ongoing.value(), 0);
    }

    #[test]
    fn test_terminal_and_winner() {
        assert!(!Status::Ongoing.is_terminal());
        assert!(Status::Draw.is_terminal());
        assert_eq!(Status::won_by(Player::Red), Status::RedWin);
        assert_eq!(Status::YellowWin.winner(), Some(Player::Yellow));
        assert_eq!(Status::Draw.winner(), None);
    }
}
