use avl_table::Table;
use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use rand::prelude::*;
use rbtree::RBTree;
use std::collections::BTreeMap;
use std::ops::Range;

const TABLE_SIZE: usize = 100000;

fn random_insertion_order() -> Vec<usize> {
    let mut rng = rand::thread_rng();
    let mut indices: Vec<usize> = (0..TABLE_SIZE).collect();

    indices.shuffle(&mut rng);

    indices
}

fn init_random_data(count: usize, range_opt: Option<Range<usize>>) -> Vec<usize> {
    let mut rng = rand::thread_rng();
    let range = range_opt.unwrap_or(0..TABLE_SIZE);
    let range = rand::distributions::Uniform::new(range.start, range.end);

    (0..count).map(|_| rng.sample(range)).collect()
}

fn init_large_table() -> Table<usize, usize> {
    let mut table = Table::new();

    for i in random_insertion_order() {
        table.insert(i, i);
    }

    table
}

fn init_large_btree() -> BTreeMap<usize, usize> {
    random_insertion_order().into_iter().map(|i| (i, i)).collect()
}

fn init_large_rbtree() -> RBTree<usize, usize> {
    let mut tree = RBTree::new();

    for i in random_insertion_order() {
        tree.insert(i, i);
    }

    tree
}

mod insertions {
    use super::*;

    pub fn table(data: Vec<usize>) {
        let mut table = Table::new();

        for i in data {
            table.insert(i, i);
        }
    }

    pub fn table_sorted_hint(data: Vec<usize>) {
        let mut table: Table<usize, usize> = Table::new();

        for i in data {
            let end = table.end().position();
            table.emplace_hint(end, (i, i));
        }
    }

    pub fn baseline(data: Vec<usize>) {
        let mut tree = BTreeMap::new();

        for i in data {
            tree.insert(i, i);
        }
    }

    pub fn rbtree(data: Vec<usize>) {
        let mut tree = RBTree::new();

        for i in data {
            tree.insert(i, i);
        }
    }
}

mod lookups {
    use super::*;

    pub fn table(table: Table<usize, usize>, indices: Vec<usize>) {
        for idx in indices {
            assert_eq!(table.get(&idx), Some(&idx));
        }
    }

    pub fn baseline(tree: BTreeMap<usize, usize>, indices: Vec<usize>) {
        for idx in indices {
            assert_eq!(tree.get(&idx), Some(&idx));
        }
    }

    pub fn rbtree(tree: RBTree<usize, usize>, indices: Vec<usize>) {
        for idx in indices {
            assert_eq!(tree.get(&idx), Some(&idx));
        }
    }
}

mod deletions {
    use super::*;

    pub fn table(mut table: Table<usize, usize>, indices: Vec<usize>) {
        for idx in indices {
            table.erase_key(&idx);
        }
    }

    pub fn baseline(mut tree: BTreeMap<usize, usize>, indices: Vec<usize>) {
        for idx in indices {
            tree.remove(&idx);
        }
    }

    pub fn rbtree(mut tree: RBTree<usize, usize>, indices: Vec<usize>) {
        for idx in indices {
            tree.remove(&idx);
        }
    }
}

mod insert_delete {
    use super::*;

    pub fn table(mut table: Table<usize, usize>, insertions: &[usize], deletions: &[usize]) {
        for idx in deletions {
            table.erase_key(idx);
        }
        for &idx in insertions {
            table.insert(idx, idx);
        }
    }

    pub fn baseline(mut tree: BTreeMap<usize, usize>, insertions: &[usize], deletions: &[usize]) {
        for idx in deletions {
            tree.remove(idx);
        }
        for &idx in insertions {
            tree.insert(idx, idx);
        }
    }
}

fn inorder_iteration(table: Table<usize, usize>) {
    for (i, (&key, _)) in table.iter().enumerate() {
        assert_eq!(i, key);
    }
}

fn inorder_iteration_btree(tree: BTreeMap<usize, usize>) {
    for (i, (&key, _)) in tree.iter().enumerate() {
        assert_eq!(i, key);
    }
}

fn table_benchmark(c: &mut Criterion) {
    c.bench_function("baseline table insert delete", |b| {
        b.iter_batched(
            || {
                (
                    init_large_btree(),
                    init_random_data(2000, Some(TABLE_SIZE..3 * TABLE_SIZE)),
                    init_random_data(2000, None),
                )
            },
            |(tree, to_insert, holes)| insert_delete::baseline(tree, &to_insert, &holes),
            BatchSize::LargeInput,
        )
    });

    c.bench_function("table insert delete", |b| {
        b.iter_batched(
            || {
                (
                    init_large_table(),
                    init_random_data(2000, Some(TABLE_SIZE..3 * TABLE_SIZE)),
                    init_random_data(2000, None),
                )
            },
            |(table, to_insert, holes)| insert_delete::table(table, &to_insert, &holes),
            BatchSize::LargeInput,
        )
    });

    c.bench_function("baseline table 100K insertions", |b| {
        b.iter_batched(random_insertion_order, insertions::baseline, BatchSize::LargeInput)
    });

    c.bench_function("rbtree 100K insertions", |b| {
        b.iter_batched(random_insertion_order, insertions::rbtree, BatchSize::LargeInput)
    });

    c.bench_function("table 100K insertions", |b| {
        b.iter_batched(random_insertion_order, insertions::table, BatchSize::LargeInput)
    });

    c.bench_function("table 100K sorted insertions with end hint", |b| {
        b.iter_batched(
            || (0..TABLE_SIZE).collect::<Vec<_>>(),
            insertions::table_sorted_hint,
            BatchSize::LargeInput,
        )
    });

    c.bench_function("baseline table random lookups", |b| {
        b.iter_batched(
            || (init_large_btree(), init_random_data(5000, None)),
            |(tree, indices)| lookups::baseline(tree, indices),
            BatchSize::LargeInput,
        )
    });

    c.bench_function("rbtree random lookups", |b| {
        b.iter_batched(
            || (init_large_rbtree(), init_random_data(5000, None)),
            |(tree, indices)| lookups::rbtree(tree, indices),
            BatchSize::LargeInput,
        )
    });

    c.bench_function("table random lookups", |b| {
        b.iter_batched(
            || (init_large_table(), init_random_data(5000, None)),
            |(table, indices)| lookups::table(table, indices),
            BatchSize::LargeInput,
        )
    });

    c.bench_function("baseline table random deletions", |b| {
        b.iter_batched(
            || (init_large_btree(), init_random_data(5000, None)),
            |(tree, indices)| deletions::baseline(tree, indices),
            BatchSize::LargeInput,
        )
    });

    c.bench_function("rbtree random deletions", |b| {
        b.iter_batched(
            || (init_large_rbtree(), init_random_data(5000, None)),
            |(tree, indices)| deletions::rbtree(tree, indices),
            BatchSize::LargeInput,
        )
    });

    c.bench_function("table random deletions", |b| {
        b.iter_batched(
            || (init_large_table(), init_random_data(5000, None)),
            |(table, indices)| deletions::table(table, indices),
            BatchSize::LargeInput,
        )
    });

    c.bench_function("table inorder iteration", |b| {
        b.iter_batched(init_large_table, inorder_iteration, BatchSize::LargeInput)
    });

    c.bench_function("baseline table inorder iteration", |b| {
        b.iter_batched(init_large_btree, inorder_iteration_btree, BatchSize::LargeInput)
    });
}

criterion_group!(benches, table_benchmark);
criterion_main!(benches);
