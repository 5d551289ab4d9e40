use pretty_assertions::assert_eq;
use zeitnot::chess::position::{Position, STARTING_FEN};

fn legal_position(input: &str) {
    let position = Position::from_fen(input).expect("parsing legal position");
    assert_eq!(position.to_fen(), input);
}

#[test]
fn basic_positions() {
    legal_position(STARTING_FEN);
    legal_position("2r3r1/p3k3/1p3pp1/1B5p/5P2/2P1p1P1/PP4KP/3R4 w - - 0 34");
    legal_position("rnbqk1nr/p3bppp/1p2p3/2ppP3/3P4/P7/1PP1NPPP/R1BQKBNR w KQkq c6 0 7");
    legal_position("r2qkb1r/1pp1pp1p/p1np1np1/1B6/3PP1b1/2N1BN2/PPP2PPP/R2QK2R w KQkq - 0 7");
    legal_position("r3k3/5p2/2p5/p7/P3r3/2N2n2/1PP2P2/2K2B2 w q - 0 24");
    legal_position("8/8/8/8/2P5/3k4/8/KB6 b - c3 0 1");
    legal_position("rnbq1rk1/pp4pp/1b1ppn2/2p2p2/2PP4/1P2PN2/PB2BPPP/RN1Q1RK1 w - c6 0 9");
}

#[test]
fn no_white_king() {
    assert!(Position::from_fen("3k4/8/8/8/8/8/8/8 w - - 0 1").is_err());
}

#[test]
fn no_black_king() {
    assert!(Position::from_fen("8/8/8/8/8/8/8/3K4 w - - 0 1").is_err());
}

#[test]
fn too_many_kings() {
    assert!(Position::from_fen("1kk5/8/8/8/8/8/8/1KK5 w - - 0 1").is_err());
}

#[test]
fn castling_rights_must_match_placement() {
    // The white rooks are gone but the rights claim otherwise.
    assert!(Position::from_fen("4k3/8/8/8/8/8/8/4K3 w KQ - 0 1").is_err());
    // The black king is off its home square.
    assert!(Position::from_fen("3k4/8/8/8/8/8/8/R3K2R w KQkq - 0 1").is_err());
}

#[test]
fn side_not_to_move_cannot_be_in_check() {
    assert!(Position::from_fen("4k3/4R3/8/8/8/8/8/4K3 w - - 0 1").is_err());
}

#[test]
fn moved_pieces_lose_their_castling_and_double_push() {
    // Rights stripped from the FEN mean the rook has moved, and re-serializing
    // keeps them stripped.
    let position = Position::from_fen("4k3/8/8/8/8/8/8/R3K2R w Q - 0 1").unwrap();
    assert_eq!(position.to_fen(), "4k3/8/8/8/8/8/8/R3K2R w Q - 0 1");
    // A pawn off its starting rank has no double push.
    let position = Position::from_fen("4k3/8/8/8/8/4P3/8/4K3 w - - 0 1").unwrap();
    let pushes: Vec<String> = position
        .legal_moves()
        .iter()
        .filter(|m| m.origin().to_string() == "e3")
        .map(ToString::to_string)
        .collect();
    assert_eq!(pushes, vec!["e3e4"]);
}
