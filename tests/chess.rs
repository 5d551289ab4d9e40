use pretty_assertions::assert_eq;
use zeitnot::chess::moves::Move;
use zeitnot::chess::position::Position;

fn replay(moves: &[&str]) -> Position {
    let mut position = Position::starting();
    for san in moves {
        let mv = Move::from_san(san, &position).expect("move is legal");
        position = Position::after_move(&position, &mv, None).expect("move applies");
    }
    position
}

#[test]
fn open_sicilian() {
    let position = replay(&["e4", "c5", "Nf3", "d6", "d4", "cxd4", "Nxd4", "Nf6"]);
    assert_eq!(
        position.to_fen(),
        "rnbqkb1r/pp2pppp/3p1n2/8/3NP3/8/PPP2PPP/RNBQKB1R w KQkq - 1 5"
    );
}

#[test]
fn castling_in_both_notations() {
    let short = replay(&["e4", "e5", "Nf3", "Nc6", "Bc4", "Bc5", "0-0"]);
    let also_short = replay(&["e4", "e5", "Nf3", "Nc6", "Bc4", "Bc5", "O-O"]);
    assert_eq!(short.to_fen(), also_short.to_fen());
    assert_eq!(
        short.to_fen(),
        "r1bqk1nr/pppp1ppp/2n5/2b1p3/2B1P3/5N2/PPPP1PPP/RNBQ1RK1 b kq - 5 4"
    );
}

#[test]
fn notation_survives_the_round_trip() {
    let mut position = Position::starting();
    for san in ["d4", "d5", "Nf3", "Nf6", "c4", "dxc4", "e3", "b5", "a4", "c6"] {
        let mv = Move::from_san(san, &position).unwrap();
        let next = Position::after_move(&position, &mv, None).unwrap();
        assert_eq!(next.last_move().unwrap().notation(), san);
        position = next;
    }
}

#[test]
fn checks_get_their_suffix() {
    let position = replay(&["e4", "e5", "Qh5", "Nc6", "Qxf7"]);
    assert_eq!(position.last_move().unwrap().notation(), "Qxf7+");
    let mated = replay(&["f3", "e5", "g4", "Qh4"]);
    assert_eq!(mated.last_move().unwrap().notation(), "Qh4#");
    assert!(mated.is_checkmate());
}

#[test]
fn fifty_move_counter_follows_the_game() {
    let position = replay(&["e4", "e5", "Nf3", "Nc6", "Nc3", "Nf6"]);
    // Four knight moves since the last pawn push.
    assert_eq!(position.fifty_move_clock(), 4);
    let position = replay(&["e4", "e5", "Nf3", "Nc6", "Nc3", "Nf6", "Nxe5"]);
    assert_eq!(position.fifty_move_clock(), 0);
}

#[test]
fn captured_pieces_accumulate() {
    let position = replay(&["e4", "d5", "exd5", "Qxd5", "Nc3", "Qxd2", "Bxd2"]);
    let captured: Vec<char> = position
        .captured_pieces()
        .iter()
        .map(|piece| piece.fen_symbol())
        .collect();
    assert_eq!(captured, vec!['p', 'P', 'P', 'q']);
}
