use connect4_mcts::{
    decide, Algorithm, Board, ColumnValue, InputFile, Player, SearchConfig, SearchDriver,
    SearchError, Status, TextReporter, Verbosity, HEIGHT, WIDTH,
};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

fn board_from(turn: Player, moves: &[u8]) -> Board {
    let mut board = Board::with_turn(turn);
    for &col in moves {
        board.drop(col).unwrap();
    }
    board
}

#[test]
fn uniform_random_covers_every_column() {
    let mut board = Board::with_turn(Player::Yellow);
    let mut rng = ChaCha20Rng::seed_from_u64(7);
    let mut counts = [0u32; WIDTH];

    for _ in 0..7000 {
        let decision = decide(&mut board, Algorithm::UniformRandom, 0, &mut rng).unwrap();
        counts[decision.column as usize] += 1;
    }

    for count in counts {
        assert!((850..=1150).contains(&count), "counts: {:?}", counts);
    }
    assert_eq!(board, Board::with_turn(Player::Yellow));
}

#[test]
fn tree_searches_take_the_immediate_win() {
    // Yellow holds columns 0..3 on the bottom row and wins in column 3.
    let board = board_from(Player::Yellow, &[0, 0, 1, 1, 2, 2]);

    for (algorithm, sims) in [(Algorithm::Pmcgs, 2000), (Algorithm::Uct, 1000)] {
        for seed in 0..4 {
            let mut scratch = board.clone();
            let mut rng = ChaCha20Rng::seed_from_u64(seed);
            let decision = decide(&mut scratch, algorithm, sims, &mut rng).unwrap();
            assert_eq!(decision.column, 3, "{} seed {}", algorithm, seed);
            assert_eq!(scratch, board);
        }
    }
}

#[test]
fn full_column_is_never_chosen() {
    let board = board_from(Player::Red, &[3, 3, 3, 3, 3, 3]);
    assert!(!board.is_legal(3));

    for algorithm in [Algorithm::UniformRandom, Algorithm::Pmcgs, Algorithm::Uct] {
        for seed in 0..10 {
            let mut scratch = board.clone();
            let mut rng = ChaCha20Rng::seed_from_u64(seed);
            let decision = decide(&mut scratch, algorithm, 60, &mut rng).unwrap();
            assert_ne!(decision.column, 3);
            assert_eq!(decision.values[3], ColumnValue::Full);
        }
    }
}

#[test]
fn same_seed_same_decision() {
    let board = board_from(Player::Red, &[3, 2, 4]);
    let driver = SearchDriver::new(SearchConfig::default());

    for algorithm in [Algorithm::Pmcgs, Algorithm::Uct] {
        let run = |seed| {
            let mut scratch = board.clone();
            let mut rng = ChaCha20Rng::seed_from_u64(seed);
            driver
                .decide(
                    &mut scratch,
                    algorithm,
                    300,
                    &mut rng,
                    &mut connect4_mcts::NullReporter,
                )
                .unwrap()
        };
        assert_eq!(run(11), run(11));
    }
}

#[test]
fn verbosity_does_not_change_the_decision() {
    let board = board_from(Player::Yellow, &[3, 3, 2]);

    let mut decisions = Vec::new();
    for verbosity in [Verbosity::None, Verbosity::Brief, Verbosity::Verbose] {
        let mut scratch = board.clone();
        let mut rng = ChaCha20Rng::seed_from_u64(5);
        let mut reporter = TextReporter::new(verbosity, Vec::new());
        let decision = SearchDriver::default()
            .decide(&mut scratch, Algorithm::Uct, 200, &mut rng, &mut reporter)
            .unwrap();
        decisions.push(decision);
    }
    assert_eq!(decisions[0], decisions[1]);
    assert_eq!(decisions[1], decisions[2]);
}

#[test]
fn decided_positions_are_rejected() {
    // Red already has four in the bottom row.
    let mut won = board_from(Player::Red, &[0, 0, 1, 1, 2, 2, 3]);
    let mut rng = ChaCha20Rng::seed_from_u64(0);
    assert!(matches!(
        decide(&mut won, Algorithm::Uct, 100, &mut rng),
        Err(SearchError::GameOver(Status::RedWin))
    ));
}

#[test]
fn brief_trace_from_board_file() {
    let text = "PMCGS\nY\nOOOOOOO\nOOOOOOO\nOOOOOOO\nOOOOOOO\nOOOOOOO\nRRROOOO\n";
    let InputFile {
        algorithm,
        mut board,
    } = text.parse::<InputFile>().unwrap();
    assert_eq!(board.height(0), 1);
    assert_eq!(board.moves_played(), 0);

    let mut rng = ChaCha20Rng::seed_from_u64(1);
    let mut reporter = TextReporter::new(Verbosity::Brief, Vec::new());
    let decision = SearchDriver::default()
        .decide(&mut board, algorithm, 2000, &mut rng, &mut reporter)
        .unwrap();
    let out = String::from_utf8(reporter.into_inner()).unwrap();
    let lines: Vec<_> = out.lines().collect();

    assert_eq!(lines.len(), WIDTH + 1);
    for (col, line) in lines[..WIDTH].iter().enumerate() {
        assert!(line.starts_with(&format!("Column {}: ", col + 1)), "{}", line);
    }
    assert_eq!(
        lines[WIDTH],
        format!("FINAL Move selected: {}", decision.column + 1)
    );
    // Yellow has to block.
    assert_eq!(decision.column, 3);
}

#[test]
fn verbose_trace_shape() {
    let mut board = Board::new();
    let mut rng = ChaCha20Rng::seed_from_u64(2);
    let mut reporter = TextReporter::new(Verbosity::Verbose, Vec::new());
    SearchDriver::default()
        .decide(&mut board, Algorithm::Uct, 20, &mut rng, &mut reporter)
        .unwrap();
    let out = String::from_utf8(reporter.into_inner()).unwrap();

    assert_eq!(out.matches("NODE ADDED").count(), 20);
    assert_eq!(out.matches("TERMINAL NODE VALUE: ").count(), 20);
    assert!(out.contains("Updated values:"));
    assert!(out.contains("V1: "));
    assert!(out.lines().last().unwrap().starts_with("FINAL Move selected: "));
}

#[test]
fn one_open_column_is_forced() {
    // Fill every column except 6 without creating four in a row.
    let starts = [0, 0, 1, 1, 0, 0];
    let mut grid = [[None; HEIGHT]; WIDTH];
    for (col, cells) in grid.iter_mut().enumerate().take(6) {
        for (row, cell) in cells.iter_mut().enumerate() {
            *cell = Some(if (row + starts[col]) % 2 == 0 {
                Player::Red
            } else {
                Player::Yellow
            });
        }
    }
    let board = Board::from_grid(Player::Red, grid).unwrap();
    assert_eq!(board.scan_status(), Status::Ongoing);

    for algorithm in [Algorithm::UniformRandom, Algorithm::Pmcgs, Algorithm::Uct] {
        let mut scratch = board.clone();
        let mut rng = ChaCha20Rng::seed_from_u64(9);
        let decision = decide(&mut scratch, algorithm, 30, &mut rng).unwrap();
        assert_eq!(decision.column, 6);
    }
}
