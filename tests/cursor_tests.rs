use avl_table::{Cursor, Position, Table};

#[test]
fn post_increment_style() {
    let table = Table::from([(1, 10), (2, 20), (3, 30)]);

    let mut cursor = table.begin();
    let old = cursor;
    cursor.move_next();

    assert_eq!(old.key(), Some(&1));
    assert_eq!(cursor.key(), Some(&2));
}

#[test]
fn post_decrement_style() {
    let table = Table::from([(1, 10), (2, 20), (3, 30)]);

    let mut cursor = table.find(&3);
    let old = cursor;
    cursor.move_prev();

    assert_eq!(old.key(), Some(&3));
    assert_eq!(cursor.key(), Some(&2));
}

#[test]
fn end_stays_end_forward() {
    let table = Table::from([(1, 10)]);

    let mut cursor = table.end();
    cursor.move_next();
    assert!(cursor == table.end());

    let mut cursor = table.begin();
    cursor.move_next();
    assert!(cursor == table.end());
}

#[test]
fn end_of_empty_stays_end_backward() {
    let table = Table::<i32, i32>::new();

    let mut cursor = table.end();
    cursor.move_prev();
    assert!(cursor == table.end());
}

#[test]
fn prev_of_begin_is_end_on_every_size() {
    for size in 1..40 {
        let table: Table<i32, ()> = (0..size).map(|key| (key, ())).collect();

        let mut cursor = table.begin();
        cursor.move_prev();
        assert!(cursor == table.end(), "size {size}");

        let mut cursor = table.end();
        cursor.move_prev();
        assert_eq!(cursor.key(), Some(&(size - 1)));
    }
}

#[test]
fn full_walk_in_both_directions() {
    let keys = [25, 10, 75, 5, 15, 30, 80, 2, 8, 12, 18, 22, 28, 35, 40, 50, 60, 70, 85, 90, 95, 3, 7, 20, 45, 55];
    let table: Table<i32, i32> = keys.iter().map(|key| (*key, key * 100)).collect();

    let mut sorted = keys.to_vec();
    sorted.sort_unstable();

    let mut forward = Vec::new();
    let mut cursor = table.begin();
    while let Some((key, value)) = cursor.entry() {
        assert_eq!(*value, key * 100);
        forward.push(*key);
        cursor.move_next();
    }
    assert_eq!(forward, sorted);

    let mut backward = Vec::new();
    let mut cursor = table.end();
    cursor.move_prev();
    while let Some(key) = cursor.key() {
        backward.push(*key);
        cursor.move_prev();
    }
    sorted.reverse();
    assert_eq!(backward, sorted);
}

#[test]
fn mutable_and_read_only_cursors_compare() {
    let mut table = Table::from([(1, 10), (2, 20)]);

    let cursor = table.begin_mut();
    let read_only: Cursor<'_, i32, i32> = cursor.as_cursor();
    assert!(cursor == read_only);
    assert!(read_only == cursor);
    assert!(!(read_only != cursor));

    let converted = Cursor::from(cursor);
    assert_eq!(converted.key(), Some(&1));
}

#[test]
fn cursors_of_different_tables_differ() {
    let lhs = Table::from([(1, 10)]);
    let rhs = lhs.clone();

    assert!(lhs.begin() != rhs.begin());
    assert!(lhs.end() != rhs.end());
}

#[test]
fn mutate_through_cursor() {
    let mut table = Table::from([(1, "one".to_string()), (2, "two".to_string())]);

    let mut cursor = table.begin_mut();
    let (key, value) = cursor.entry_mut().unwrap();
    assert_eq!(*key, 1);
    *value = "FIRST".to_string();

    assert_eq!(table.at(&1).map(String::as_str), Ok("FIRST"));
}

#[test]
fn into_value_mut_outlives_cursor() {
    let mut table = Table::from([(1, 10)]);

    let value = table.find_mut(&1).into_value_mut().unwrap();
    *value = 11;

    assert_eq!(table.at(&1), Ok(&11));
    assert!(table.find_mut(&2).into_value_mut().is_none());
}

#[test]
fn remove_while_walking() {
    let mut table: Table<i32, i32> = (0..50).map(|key| (key, key)).collect();

    let mut cursor = table.begin_mut();
    while let Some(key) = cursor.key().copied() {
        if key % 5 == 0 {
            cursor.remove_current();
        } else {
            cursor.move_next();
        }
    }

    assert_eq!(table.len(), 40);
    assert!(table.keys().all(|key| key % 5 != 0));
    table.check().unwrap();
}

#[test]
fn positions_track_elements_through_rebalancing() {
    let mut table = Table::new();
    let mut positions = Vec::new();
    for key in 0..64 {
        positions.push((key, table.insert(key, key).0));
    }

    for key in (0..64).filter(|key| key % 3 == 0) {
        table.erase_key(&key);
    }
    for key in 64..128 {
        table.insert(key, key);
    }

    for (key, pos) in positions.into_iter().filter(|(key, _)| key % 3 != 0) {
        let cursor = table.cursor_at(pos);
        assert_eq!(cursor.entry(), Some((&key, &key)));
    }
}

#[test]
fn position_round_trip() {
    let mut table = Table::from([(1, 'a'), (2, 'b'), (3, 'c')]);

    let pos = table.find(&2).position();
    assert!(!pos.is_end());

    let mut cursor = table.cursor_mut_at(pos);
    cursor.move_prev();
    assert_eq!(cursor.key(), Some(&1));
    assert!(table.cursor_at(Position::END).is_end());
}

#[test]
fn stale_position_ignores_recycled_slot() {
    let mut table = Table::from([(1, 'a'), (2, 'b'), (3, 'c')]);

    let stale = table.find(&1).position();
    assert_eq!(table.erase_key(&1), 1);
    table.insert(99, 'z');

    assert!(table.cursor_at(stale).is_end());
    assert!(table.cursor_mut_at(stale).is_end());
    assert_eq!(table.erase(stale), Position::END);

    assert_eq!(table.len(), 3);
    assert!(table.contains(&99));
    table.check().unwrap();
}

#[test]
fn stale_hint_falls_back_to_full_insert() {
    let mut table = Table::from([(10, ()), (20, ()), (30, ())]);

    let stale = table.find(&20).position();
    table.erase_key(&20);
    table.insert(5, ());

    let pos = table.emplace_hint(stale, (25, ()));

    assert_eq!(table.cursor_at(pos).key(), Some(&25));
    assert!(table.keys().copied().eq([5, 10, 25, 30]));
    table.check().unwrap();
}

#[test]
fn positions_taken_before_clear_stay_stale() {
    let mut table = Table::from([(1, 'a')]);

    let stale = table.begin().position();
    table.clear();
    table.insert(2, 'b');

    assert!(table.cursor_at(stale).is_end());
    assert_eq!(table.erase(stale), Position::END);
    assert_eq!(table.len(), 1);
}
