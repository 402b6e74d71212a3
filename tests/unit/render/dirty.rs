use super::*;

#[test]
fn mark_sets_covering_blocks_to_two() {
    let mut g = DirtyGrid::new(64, 32, 8, 8);
    g.mark(Rect::new(6, 6, 4, 4));
    g.mark(Rect::new(6, 6, 4, 4));
    for (c, r) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
        assert_eq!(g.counter(c, r), DIRTY_MARK);
    }
    assert_eq!(g.counter(2, 0), 0);
    assert_eq!(g.dirty_rects(), vec![Rect::new(0, 0, 16, 8), Rect::new(0, 8, 16, 8)]);
}

#[test]
fn mark_clips_to_the_grid() {
    let mut g = DirtyGrid::new(16, 16, 8, 8);
    g.mark(Rect::new(-20, -20, 10, 10));
    assert!(g.is_clean());
    g.mark(Rect::new(12, 12, 100, 100));
    assert_eq!(g.counter(1, 1), 2);
    assert_eq!(g.dirty_rects().len(), 1);
}

#[test]
fn runs_decay_over_two_takes() {
    let mut g = DirtyGrid::new(32, 8, 8, 8);
    g.mark(Rect::new(0, 0, 8, 8));
    g.mark(Rect::new(16, 0, 16, 8));
    let first = g.take_runs();
    assert_eq!(first, vec![Rect::new(0, 0, 8, 8), Rect::new(16, 0, 16, 8)]);
    assert_eq!(g.counter(0, 0), 1);
    assert_eq!(g.take_runs(), first);
    assert!(g.take_runs().is_empty());
    assert!(g.is_clean());
}

#[test]
fn resized_grid_keeps_block_size_and_starts_clean() {
    let mut grid = DirtyGrid::new(256, 224, 8, 8);
    grid.mark(Rect::new(0, 0, 8, 8));
    let wide = grid.resized(320, 224);
    assert_eq!((wide.cols(), wide.rows()), (40, 28));
    assert!(wide.is_clean());
}
