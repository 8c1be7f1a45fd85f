pub mod eval;
pub mod game;
pub mod records;
pub mod scanner;
pub mod transform;

pub use eval::Eval;
pub use game::{FieldValue, Game, Outcome, PlayerColor, PlayerInfo, Ply};
pub use scanner::Scanner;
