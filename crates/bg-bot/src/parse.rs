use bg_rules::Step;

/// Scans engine stdout for the first hinted move line and returns the move
/// text left of the `Eq.:` separator, e.g. `"24/18 13/11(2) bar/22*"`.
pub fn extract_move_island(stdout: &str) -> Option<String> {
    let line = stdout.lines().find(|l| l.contains("1. Cubeful"))?;
    let (before_eq, _) = line.split_once("Eq.:")?;
    let (_, moves) = before_eq.split_once("Cubeful")?;
    Some(moves.trim().to_string())
}

fn engine_coord(token: &str) -> Option<usize> {
    let token = token.trim_end_matches('*');
    match token {
        "bar" => Some(25),
        "off" => Some(0),
        other => other.parse().ok(),
    }
}

/// Expands one whitespace-delimited chain token (e.g. `"13/11(2)"` or
/// `"24/18/13"`) into its atomic `{from, to}` segments, repeating the
/// whole chain according to a trailing `(n)` multiplier.
fn expand_chain_token(token: &str) -> Vec<(usize, usize)> {
    let (body, repeats) = match token.rfind('(') {
        Some(open) if token.ends_with(')') => {
            let count: usize = token[open + 1..token.len() - 1].parse().unwrap_or(1);
            (&token[..open], count.max(1))
        }
        _ => (token, 1),
    };

    let points: Vec<usize> = body.split('/').filter_map(engine_coord).collect();
    let mut base_segments = Vec::new();
    for window in points.windows(2) {
        base_segments.push((window[0], window[1]));
    }

    let mut segments = Vec::with_capacity(base_segments.len() * repeats);
    for _ in 0..repeats {
        segments.extend(base_segments.iter().copied());
    }
    segments
}

/// Parses the engine's whitespace-separated move chains into a flat list
/// of atomic steps, in the engine's own coordinate system (`bar` = 25,
/// `off` = 0).
pub fn parse_gnubg_to_atomic_moves(move_island: &str) -> Vec<Step> {
    move_island
        .split_whitespace()
        .flat_map(expand_chain_token)
        .map(|(from, to)| Step { from, to })
        .collect()
}

/// Converts engine-coordinate steps into board-coordinate steps for the
/// given bot color. White plays in the engine's native orientation; Black
/// mirrors every coordinate (`25`→`27`, `1..24`→`25-p`, `0`→`26`).
pub fn convert_coordinates(steps: &[Step], bot_sign: i8) -> Vec<Step> {
    if bot_sign == bg_core::WHITE {
        return steps.to_vec();
    }
    steps
        .iter()
        .map(|s| Step {
            from: flip(s.from),
            to: flip(s.to),
        })
        .collect()
}

fn flip(point: usize) -> usize {
    match point {
        25 => 27,
        0 => 26,
        p => 25 - p,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_island_left_of_equity() {
        let stdout = "foo\n1. Cubeful 24/18 13/11(2) Eq.: +0.123\nbar\n";
        let island = extract_move_island(stdout).unwrap();
        assert!(island.contains("24/18"));
        assert!(!island.contains("Eq.:"));
    }

    #[test]
    fn expands_repeat_multiplier() {
        let segments = expand_chain_token("13/11(2)");
        assert_eq!(segments, vec![(13, 11), (13, 11)]);
    }

    #[test]
    fn expands_multi_segment_chain() {
        let segments = expand_chain_token("24/18/13");
        assert_eq!(segments, vec![(24, 18), (18, 13)]);
    }

    #[test]
    fn parses_bar_and_off_tokens() {
        let moves = parse_gnubg_to_atomic_moves("bar/22* 6/off");
        assert_eq!(moves, vec![Step { from: 25, to: 22 }, Step { from: 6, to: 0 }]);
    }

    #[test]
    fn black_coordinates_are_mirrored() {
        let moves = vec![Step { from: 24, to: 18 }, Step { from: 25, to: 22 }];
        let flipped = convert_coordinates(&moves, bg_core::BLACK);
        assert_eq!(flipped, vec![Step { from: 1, to: 7 }, Step { from: 27, to: 3 }]);
    }
}
