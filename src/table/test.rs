use super::columns::*;
use super::engine::*;
use super::key::*;
use super::sort::*;

use crate::dom::{CellId, HeadCell, HeadRow};
use crate::error::SortError;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

fn head(cols: usize) -> ColumnMap {
    let cells = (0..cols).map(|i| HeadCell::header(&format!("c{}", i))).collect();
    ColumnMap::resolve(&[HeadRow::new(cells)]).unwrap()
}

fn sources(data: Vec<Vec<&str>>) -> Vec<RowSource> {
    data.into_iter()
        .map(|row| RowSource::new(row.into_iter().map(|s| s.to_string()).collect()))
        .collect()
}

/// Helper to get the first cell of every row in current engine order
fn first_texts(engine: &SortEngine) -> Vec<String> {
    engine.rows().iter().map(|r| r.key(0).text.clone()).collect()
}

fn cell(row: usize, cell: usize) -> Option<CellId> {
    Some(CellId { row, cell })
}

// === Keys ===

#[test]
fn test_key_integer_and_decimal() {
    assert_eq!(Key::parse("10").num, Some(10.0));
    assert_eq!(Key::parse("0.5").num, Some(0.5));
    assert_eq!(Key::parse("-3.25 kg").num, Some(-3.25));
    assert_eq!(Key::parse("+7").num, Some(7.0));
}

#[test]
fn test_key_leading_fraction_is_not_numeric() {
    let key = Key::parse(".5");
    assert_eq!(key.num, None);
    assert_eq!(key.text, ".5");
}

#[test]
fn test_key_only_leading_digest_counts() {
    // trailing dot without digits keeps the integer part
    assert_eq!(Key::parse("1.").num, Some(1.0));
    assert_eq!(Key::parse("12abc").num, Some(12.0));
    assert_eq!(Key::parse("abc12").num, None);
    // no trimming
    assert_eq!(Key::parse(" 12").num, None);
    assert_eq!(Key::parse("-").num, None);
}

#[test]
fn test_key_ascii_digits_only() {
    assert_eq!(Key::parse("\u{0663}").num, None);
}

#[test]
fn test_key_text_is_lowercased_untrimmed() {
    assert_eq!(Key::parse(" Hello World ").text, " hello world ");
}

#[test]
fn test_fallback_key() {
    let key = Key::fallback(4);
    assert_eq!(key.text, "#4");
    assert_eq!(key.num, Some(4.0));
}

#[test]
fn test_fake_row_uses_fallback_for_every_column() {
    let row = SortRow::extract(&["Total", "99"], 3, true);
    assert!(row.is_fake());
    assert_eq!(row.rank(), 3);
    assert_eq!(row.key(0), &Key::fallback(3));
    assert_eq!(row.key(7), &Key::fallback(3));
}

#[test]
fn test_short_row_missing_cells_are_empty_text() {
    let row = SortRow::extract(&["a"], 0, false);
    assert_eq!(row.key(1).text, "");
    assert_eq!(row.key(1).num, None);
}

// === Comparator ===

fn rows_of(texts: &[&str]) -> Vec<SortRow> {
    texts
        .iter()
        .enumerate()
        .map(|(rank, t)| SortRow::extract(&[*t], rank, false))
        .collect()
}

fn sorted_texts(texts: &[&str], column: Option<usize>, direction: SortDirection) -> Vec<String> {
    let mut rows = rows_of(texts);
    rows.sort_by(comparator(column, direction));
    rows.iter().map(|r| r.key(0).text.clone()).collect()
}

#[test]
fn test_text_sorts_before_numbers() {
    assert_eq!(
        sorted_texts(&["10", "abc", "2"], Some(0), SortDirection::Ascending),
        vec!["abc", "2", "10"]
    );
    assert_eq!(
        sorted_texts(&["10", "abc", "2"], Some(0), SortDirection::Descending),
        vec!["10", "2", "abc"]
    );
}

#[test]
fn test_equal_numbers_compare_as_text() {
    // 5 == 5.0 numerically, text decides
    assert_eq!(
        sorted_texts(&["5.0", "5", "5 apples"], Some(0), SortDirection::Ascending),
        vec!["5", "5 apples", "5.0"]
    );
}

#[test]
fn test_negative_and_float_numbers() {
    assert_eq!(
        sorted_texts(&["-10", "5", "-3", "0", "1.05", "1.5"], Some(0), SortDirection::Ascending),
        vec!["-10", "-3", "0", "1.05", "1.5", "5"]
    );
}

#[test]
fn test_case_insensitive() {
    assert_eq!(
        sorted_texts(&["Banana", "apple", "Cherry"], Some(0), SortDirection::Ascending),
        vec!["apple", "banana", "cherry"]
    );
}

#[test]
fn test_ties_break_on_rank_in_both_directions() {
    let rows = rows_of(&["same", "Same"]);
    let asc = RowComparator::new(Some(0), SortDirection::Ascending);
    let desc = RowComparator::new(Some(0), SortDirection::Descending);

    assert_eq!(asc.compare(&rows[0], &rows[1]), std::cmp::Ordering::Less);
    assert_eq!(desc.compare(&rows[0], &rows[1]), std::cmp::Ordering::Less);
    assert_eq!(desc.compare(&rows[1], &rows[0]), std::cmp::Ordering::Greater);
}

#[test]
fn test_no_column_restores_rank_ignoring_direction() {
    let mut rows = rows_of(&["c", "a", "b"]);
    rows.reverse();
    rows.sort_by(comparator(None, SortDirection::Descending));
    let ranks: Vec<usize> = rows.iter().map(|r| r.rank()).collect();
    assert_eq!(ranks, vec![0, 1, 2]);
}

#[test]
fn test_fake_rows_order_among_themselves_by_rank() {
    let fake_a = SortRow::extract(&["x"], 2, true);
    let fake_b = SortRow::extract(&["x"], 9, true);
    let cmp = RowComparator::new(Some(0), SortDirection::Ascending);
    assert_eq!(cmp.compare(&fake_a, &fake_b), std::cmp::Ordering::Less);
    assert_eq!(compare_keys(fake_a.key(0), fake_b.key(0)), std::cmp::Ordering::Less);
}

const SAMPLE_CELLS: &[&str] = &[
    "", "a", "B", "abc", "10", "2", "2", "2.0", "-1", "+1", ".5", "0.5", "1e3", "zz", "9 lives", "09",
];

fn random_rows(rng: &mut StdRng, count: usize) -> Vec<SortRow> {
    (0..count)
        .map(|rank| {
            let fake = rng.gen_ratio(1, 8);
            let cell = SAMPLE_CELLS[rng.gen_range(0..SAMPLE_CELLS.len())];
            SortRow::extract(&[cell], rank, fake)
        })
        .collect()
}

#[test]
fn test_comparator_is_transitive() {
    let mut rng = StdRng::seed_from_u64(7);
    let rows = random_rows(&mut rng, 40);

    for direction in [SortDirection::Ascending, SortDirection::Descending] {
        let cmp = RowComparator::new(Some(0), direction);
        for a in &rows {
            for b in &rows {
                // antisymmetric
                assert_eq!(cmp.compare(a, b), cmp.compare(b, a).reverse());
                for c in &rows {
                    if cmp.compare(a, b).is_le() && cmp.compare(b, c).is_le() {
                        assert!(cmp.compare(a, c).is_le());
                    }
                }
            }
        }
    }
}

#[test]
fn test_sort_is_deterministic_for_any_input_order() {
    let mut rng = StdRng::seed_from_u64(11);
    let rows = random_rows(&mut rng, 60);
    let mut expected = rows.clone();
    expected.sort_by(comparator(Some(0), SortDirection::Descending));

    for _ in 0..10 {
        let mut shuffled = rows.clone();
        shuffled.shuffle(&mut rng);
        shuffled.sort_by(comparator(Some(0), SortDirection::Descending));
        assert_eq!(shuffled, expected);
    }
}

// === Column resolution ===

#[test]
fn test_columns_simple_header() {
    let columns = head(3);
    assert_eq!(columns.len(), 3);
    assert_eq!(columns.header(1), cell(0, 1));
    assert_eq!(columns.header(3), None);
}

#[test]
fn test_columns_with_spans() {
    // | name (2)    | age (rowspan 2) |
    // | first | last |                |
    let columns = ColumnMap::resolve(&[
        HeadRow::new(vec![
            HeadCell::header("name").with_colspan(2),
            HeadCell::header("age").with_rowspan(2),
        ]),
        HeadRow::new(vec![HeadCell::header("first"), HeadCell::header("last")]),
    ])
    .unwrap();

    assert_eq!(columns.headers(), &[cell(1, 0), cell(1, 1), cell(0, 1)]);
    assert_eq!(columns.occupant(1, 2), Some((CellId { row: 0, cell: 1 }, 1)));
    assert_eq!(columns.occupant(0, 1), Some((CellId { row: 0, cell: 0 }, 2)));
    assert_eq!(columns.column_of(CellId { row: 1, cell: 1 }), Some(1));
}

#[test]
fn test_columns_rowspan_in_the_middle() {
    // | id (rowspan 2) | group (2)   | note (rowspan 2) |
    //                  | lo   | hi   |
    let columns = ColumnMap::resolve(&[
        HeadRow::new(vec![
            HeadCell::header("id").with_rowspan(2),
            HeadCell::header("group").with_colspan(2),
            HeadCell::header("note").with_rowspan(2),
        ]),
        HeadRow::new(vec![HeadCell::header("lo"), HeadCell::header("hi")]),
    ])
    .unwrap();

    assert_eq!(columns.headers(), &[cell(0, 0), cell(1, 0), cell(1, 1), cell(0, 2)]);
}

#[test]
fn test_columns_lower_cell_overrides_upper() {
    let columns = ColumnMap::resolve(&[
        HeadRow::new(vec![HeadCell::header("top")]),
        HeadRow::new(vec![HeadCell::header("bottom")]),
    ])
    .unwrap();
    assert_eq!(columns.header(0), cell(1, 0));
}

#[test]
fn test_columns_data_cells_are_not_headers() {
    let columns = ColumnMap::resolve(&[
        HeadRow::new(vec![HeadCell::header("a"), HeadCell::header("b")]),
        HeadRow::new(vec![HeadCell::data("filter"), HeadCell::header("b2")]),
    ])
    .unwrap();
    assert_eq!(columns.headers(), &[cell(0, 0), cell(1, 1)]);
}

#[test]
fn test_columns_only_wide_header_is_unsortable() {
    let columns = ColumnMap::resolve(&[
        HeadRow::new(vec![HeadCell::header("title").with_colspan(2), HeadCell::header("x")]),
    ])
    .unwrap();
    assert_eq!(columns.len(), 3);
    assert!(!columns.is_sortable(0));
    assert!(!columns.is_sortable(1));
    assert!(columns.is_sortable(2));
}

#[test]
fn test_columns_rowspan_zero_reaches_last_row() {
    let columns = ColumnMap::resolve(&[
        HeadRow::new(vec![HeadCell::header("tall").with_rowspan(0), HeadCell::header("a")]),
        HeadRow::new(vec![HeadCell::header("b")]),
        HeadRow::new(vec![HeadCell::header("c")]),
    ])
    .unwrap();
    assert_eq!(columns.headers(), &[cell(0, 0), cell(2, 0)]);
}

#[test]
fn test_columns_empty_header_is_an_error() {
    assert_eq!(ColumnMap::resolve(&[]), Err(SortError::EmptyHeader));
}

// === Engine ===

#[test]
fn test_engine_starts_unsorted_in_rank_order() {
    let engine = SortEngine::new(sources(vec![vec!["b"], vec!["a"]]), head(1));
    assert_eq!(engine.state(), SortState::Unsorted);
    assert_eq!(engine.order(), vec![0, 1]);
    assert_eq!(engine.len(), 2);
}

#[test]
fn test_engine_sort_by_second_column() {
    let mut engine = SortEngine::new(
        sources(vec![
            vec!["Alice", "95"],
            vec!["Bob", "87"],
            vec!["Carol", "92"],
        ]),
        head(2),
    );

    let t = engine.sort(Some(1), true).unwrap();
    assert_eq!(engine.order(), vec![1, 2, 0]);
    assert_eq!(t.previous, SortState::Unsorted);
    assert_eq!(t.current, SortState::Ascending(1));
    assert!(t.placements.iter().all(|p| p.mode == PlacementMode::Sorted));

    engine.sort(Some(1), false).unwrap();
    assert_eq!(engine.order(), vec![0, 2, 1]);
    assert_eq!(engine.state(), SortState::Descending(1));
}

#[test]
fn test_engine_fake_rows_detached_while_sorted() {
    let mut rows = sources(vec![vec!["b"], vec!["a"]]);
    rows.insert(0, RowSource::fake(vec!["header".to_string()]));
    let mut engine = SortEngine::new(rows, head(1));

    let t = engine.sort(Some(0), true).unwrap();
    let shown: Vec<usize> = t
        .placements
        .iter()
        .filter(|p| p.mode != PlacementMode::Detach)
        .map(|p| p.rank)
        .collect();
    assert_eq!(shown, vec![2, 1]);
    assert_eq!(first_texts(&engine)[..2], ["a".to_string(), "b".to_string()]);
    assert_eq!(
        t.placements.iter().find(|p| p.rank == 0).map(|p| p.mode),
        Some(PlacementMode::Detach)
    );

    let t = engine.sort(None, false).unwrap();
    assert_eq!(engine.order(), vec![0, 1, 2]);
    assert!(t.placements.iter().all(|p| p.mode == PlacementMode::Original));
}

#[test]
fn test_engine_out_of_range_column() {
    let mut engine = SortEngine::new(sources(vec![vec!["b"], vec!["a"]]), head(1));
    engine.sort(Some(0), true).unwrap();

    let err = engine.sort(Some(1), true).unwrap_err();
    assert_eq!(err, SortError::ColumnOutOfRange { column: 1, count: 1 });
    assert_eq!(engine.state(), SortState::Ascending(0));
    assert_eq!(engine.order(), vec![1, 0]);
}

#[test]
fn test_activation_cycle_ascending_first() {
    let mut engine = SortEngine::new(sources(vec![vec!["b"], vec!["c"], vec!["a"]]), head(1));

    assert_eq!(engine.activate(0, true).unwrap().current, SortState::Ascending(0));
    assert_eq!(engine.activate(0, false).unwrap().current, SortState::Descending(0));
    assert_eq!(engine.order(), vec![1, 0, 2]);
    assert_eq!(engine.activate(0, false).unwrap().current, SortState::Unsorted);
    assert_eq!(engine.order(), vec![0, 1, 2]);
}

#[test]
fn test_activation_cycle_descending_first() {
    let mut engine = SortEngine::new(sources(vec![vec!["b", "1"], vec!["a", "2"]]), head(2));

    assert_eq!(engine.activate(1, false).unwrap().current, SortState::Descending(1));
    assert_eq!(engine.activate(1, true).unwrap().current, SortState::Ascending(1));
    // another column starts over from its own control
    assert_eq!(engine.activate(0, true).unwrap().current, SortState::Ascending(0));
    assert_eq!(engine.activate(0, true).unwrap().current, SortState::Unsorted);
}

#[test]
fn test_state_transitions() {
    let state = SortState::Ascending(2);
    assert_eq!(state.column(), Some(2));
    assert_eq!(state.direction(), Some(SortDirection::Ascending));
    assert_eq!(state.activate(2, SortDirection::Ascending), SortState::Unsorted);
    assert_eq!(state.activate(2, SortDirection::Descending), SortState::Descending(2));
    assert_eq!(state.activate(0, SortDirection::Ascending), SortState::Ascending(0));
    assert_eq!(SortState::Unsorted.activate(1, SortDirection::Descending), SortState::Descending(1));
    assert!(!SortState::Unsorted.is_sorted());
}

#[test]
fn test_restore_after_any_sort_sequence() {
    let mut rng = StdRng::seed_from_u64(3);
    let data: Vec<RowSource> = (0..50)
        .map(|_| {
            let cells = (0..3)
                .map(|_| SAMPLE_CELLS[rng.gen_range(0..SAMPLE_CELLS.len())].to_string())
                .collect();
            if rng.gen_ratio(1, 10) {
                RowSource::fake(cells)
            } else {
                RowSource::new(cells)
            }
        })
        .collect();
    let mut engine = SortEngine::new(data, head(3));

    for _ in 0..25 {
        let column = rng.gen_range(0..3);
        engine.sort(Some(column), rng.gen()).unwrap();
    }
    engine.sort(None, true).unwrap();

    assert_eq!(engine.order(), (0..50).collect::<Vec<_>>());
}

#[test]
fn test_large_table_builds_same_keys_in_parallel() {
    let count = 10_001;
    let data: Vec<RowSource> = (0..count)
        .map(|i| RowSource::new(vec![format!("{}", count - i)]))
        .collect();
    let mut engine = SortEngine::new(data, head(1));

    assert_eq!(engine.rows()[5].rank(), 5);
    assert_eq!(engine.rows()[5].key(0).num, Some((count - 5) as f64));

    engine.sort(Some(0), true).unwrap();
    assert_eq!(engine.order()[0], count - 1);
}
