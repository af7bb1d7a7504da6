use rand::Rng;

/// Rolls the opening pair for a turn: two uniform 1..6 pips, duplicated
/// to four entries when they match (a double grants four plays of that
/// pip). Shared by the Turn Manager's `roll_dice` and the AI Manager's
/// bot-turn trigger — both need the identical "two pips, double to four"
/// rule, just from different call sites.
pub(crate) fn roll_turn() -> Vec<u8> {
    let mut rng = rand::rng();
    let pips = (rng.random_range(1..=6), rng.random_range(1..=6));
    if pips.0 == pips.1 { vec![pips.0; 4] } else { vec![pips.0, pips.1] }
}

/// Rolls one opening pip, used by the Player/Lifecycle Manager's first
/// roll (each side rolls independently, ties re-roll).
pub(crate) fn roll_opening_pip() -> u8 {
    rand::rng().random_range(1..=6)
}
