use itertools::Itertools;
use pretty_assertions::assert_eq;
use zeitnot::chess::moves::Move;
use zeitnot::chess::position::Position;

fn setup(input: &str) -> Position {
    Position::from_fen(input).expect("parsing legal position")
}

fn get_moves(position: &Position) -> Vec<String> {
    position
        .legal_moves()
        .iter()
        .map(Move::to_string)
        .sorted()
        .collect::<Vec<_>>()
}

fn sorted_moves(moves: &[&str]) -> Vec<String> {
    moves
        .iter()
        .map(|m| (*m).to_string())
        .sorted()
        .collect::<Vec<_>>()
}

#[test]
fn starting_moves() {
    assert_eq!(
        get_moves(&Position::starting()),
        sorted_moves(&[
            "a2a3", "a2a4", "b1a3", "b1c3", "b2b3", "b2b4", "c2c3", "c2c4", "d2d3", "d2d4",
            "e2e3", "e2e4", "f2f3", "f2f4", "g1f3", "g1h3", "g2g3", "g2g4", "h2h3", "h2h4"
        ])
    );
}

#[test]
fn complex_middlegame() {
    // A promotion counts once here: the replacement kind is chosen after the
    // move, not encoded in it.
    let position = setup(
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
    );
    assert_eq!(position.legal_moves().len(), 48);
}

#[test]
fn en_passant_pin() {
    let position = setup("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1");
    assert_eq!(position.legal_moves().len(), 14);
}

#[test]
fn check_evasions() {
    // After 1. e4 e5 2. f4 Qh4+ White can only block on g3 or step to e2.
    let checked = setup("rnb1kbnr/pppp1ppp/8/4p3/4PP1q/8/PPPP2PP/RNBQKBNR w KQkq - 1 3");
    assert!(checked.in_check());
    assert_eq!(get_moves(&checked), sorted_moves(&["g2g3", "e1e2"]));
}

#[test]
fn castles_render_as_king_moves() {
    let position = setup("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
    let moves = get_moves(&position);
    assert!(moves.contains(&"e1g1".to_owned()), "moves: {moves:?}");
    assert!(moves.contains(&"e1c1".to_owned()), "moves: {moves:?}");
}

#[test]
fn stalemate_has_no_moves() {
    let position = setup("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1");
    assert!(position.is_stalemate());
    assert!(get_moves(&position).is_empty());
}

#[test]
fn checkmate_has_no_moves() {
    let position = setup("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3");
    assert!(position.is_checkmate());
    assert!(get_moves(&position).is_empty());
}
