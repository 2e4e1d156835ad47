use keyadapt::learner::{compute_border, compute_hitboxes, Side};
use keyadapt::{
    EditLog, Hitbox, HitboxSet, JsonStore, KeyStat, KeyStatSet, KeyboardHash, Keystroke,
    LayoutLearner, LearnerConfig, LearnerStore, MemoryStore,
};
use rstest::rstest;

const KB1: KeyboardHash = 1;
const KB2: KeyboardHash = 2;

// --- FIXTURES ---

/// No minimum key size, default frequency threshold.
fn unconstrained() -> LearnerConfig {
    LearnerConfig {
        min_width_dp: 0.0,
        min_height_dp: 0.0,
        ..Default::default()
    }
}

/// One row of three keys sharing their vertical edges at x = 10 and x = 20.
fn row_of_three(kb: KeyboardHash, codes: [i32; 3]) -> HitboxSet {
    HitboxSet::from_hitboxes(
        kb,
        vec![
            Hitbox::new(codes[0], 1, 1, 10, 5),
            Hitbox::new(codes[1], 10, 1, 20, 5),
            Hitbox::new(codes[2], 20, 1, 30, 5),
        ],
    )
    .unwrap()
}

fn session(kb: KeyboardHash, touches: &[(i32, i32, i32)]) -> EditLog {
    let mut log = EditLog::new();
    for (pos, &(code, x, y)) in touches.iter().enumerate() {
        let pos = pos as i32;
        let ch = char::from(b'A' + code as u8 - 1);
        log.set(pos, pos, Keystroke::new(code, ch, x, y, kb));
    }
    log
}

/// Three typing sessions on keyboard 1; every touch of key 1 lands right
/// of its centre, keys 2 and 3 drift right as well.
fn three_sessions() -> Vec<EditLog> {
    vec![
        session(KB1, &[(1, 6, 3), (1, 12, 4), (1, 11, 4), (1, 8, 3), (1, 14, 2), (1, 12, 5)]),
        session(
            KB1,
            &[
                (2, 18, 3),
                (2, 19, 4),
                (2, 24, 1),
                (2, 23, 2),
                (2, 22, 2),
                (2, 20, 4),
                (2, 19, 2),
                (2, 21, 3),
            ],
        ),
        session(KB1, &[(3, 28, 3), (3, 25, 5), (3, 29, 5), (3, 26, 5), (3, 27, 4), (3, 28, 4)]),
    ]
}

fn persisted_history() -> KeyStatSet {
    let mut ks = KeyStatSet::new(KB1);
    ks.insert(KeyStat::from_summary(1, 12.0, 3.0, 16.0, 4.0, 0.0, 30));
    ks.insert(KeyStat::from_summary(2, 20.0, 3.0, 16.0, 4.0, 0.0, 30));
    ks.insert(KeyStat::from_summary(3, 26.0, 3.0, 16.0, 4.0, 0.0, 30));
    ks
}

fn n_of(ks: &KeyStatSet, code: i32) -> Option<u32> {
    ks.get(code).map(|k| k.n())
}

fn assert_seams_moved_right(before: &HitboxSet, after: &HitboxSet) {
    let right = |set: &HitboxSet, code| set.find_by_code(code).unwrap().right();
    let left = |set: &HitboxSet, code| set.find_by_code(code).unwrap().left();
    assert!(right(after, 1) > right(before, 1));
    assert!(left(after, 2) > left(before, 2));
    assert!(right(after, 2) > right(before, 2));
    assert!(left(after, 3) > left(before, 3));
}

// --- BORDER SOLVER ---

#[rstest]
#[case(3.0, 6.0, 4.0, 3.0, 0.75, 0.25, 5)] // unequal variances, dominant left
#[case(3.0, 5.0, 4.0, 4.0, 0.5, 0.5, 4)] // equal variances and priors: midpoint
#[case(3.0, 7.0, 1.0, 5.0, 0.9, 0.1, 5)] // narrow, likely left key
#[case(4.0, 3.0, 5.0, 1.0, 0.1, 0.9, 5)]
fn test_compute_border(
    #[case] mean_left: f64,
    #[case] mean_right: f64,
    #[case] var_left: f64,
    #[case] var_right: f64,
    #[case] prior_left: f64,
    #[case] prior_right: f64,
    #[case] expected: i32,
) {
    let left = Side {
        start: 0,
        end: 5,
        mean: mean_left,
        var: var_left,
        prior: prior_left,
    };
    let right = Side {
        start: 6,
        end: 10,
        mean: mean_right,
        var: var_right,
        prior: prior_right,
    };
    assert_eq!(compute_border(&left, &right), expected);
}

#[rstest]
#[case(0.0, 0.5)]
#[case(0.5, 0.0)]
fn test_degenerate_prior_returns_right_start(#[case] prior_left: f64, #[case] prior_right: f64) {
    let left = Side {
        start: 0,
        end: 5,
        mean: 2.0,
        var: 3.0,
        prior: prior_left,
    };
    let right = Side {
        start: 6,
        end: 10,
        mean: 8.0,
        var: 2.0,
        prior: prior_right,
    };
    assert_eq!(compute_border(&left, &right), 6);
}

// --- BOUNDARY COMPUTATION ---

#[test]
fn test_two_rows_with_special_key() {
    // Row 1: special key 1, then keys 2 and 3. Row 2: keys 4 and 5.
    let mut hb = HitboxSet::from_hitboxes(
        KB1,
        vec![
            Hitbox::new(1, 1, 1, 7, 5),
            Hitbox::new(2, 8, 1, 15, 5),
            Hitbox::new(3, 16, 1, 20, 5),
            Hitbox::new(4, 1, 6, 14, 10),
            Hitbox::new(5, 15, 6, 20, 10),
        ],
    )
    .unwrap();

    let mut ks = KeyStatSet::new(KB1);
    ks.insert(KeyStat::from_summary(2, 10.0, 2.0, 4.0, 3.0, 0.0, 6));
    ks.insert(KeyStat::from_summary(3, 17.0, 3.0, 9.0, 3.0, 0.0, 6));
    ks.insert(KeyStat::from_summary(4, 4.0, 7.5, 4.0, 16.0, 0.0, 16));
    ks.insert(KeyStat::from_summary(5, 15.0, 7.5, 16.0, 16.0, 0.0, 16));

    let report = compute_hitboxes(&ks, &mut hb, 0, 0, 5);
    assert_eq!(report.rows_moved, 1);

    for hit in hb.iter() {
        assert!(hit.left() >= 0 && hit.top() >= 0);
        assert!(hit.right() <= 20 && hit.bottom() <= 20);
    }

    let get = |code| hb.find_by_code(code).unwrap();

    // rows keep a shared top and bottom
    for code in [2, 3] {
        assert_eq!(get(1).top(), get(code).top());
        assert_eq!(get(1).bottom(), get(code).bottom());
    }
    assert_eq!(get(4).top(), get(5).top());
    assert_eq!(get(4).bottom(), get(5).bottom());

    // neighbours never overlap
    assert!(get(1).right() <= get(2).left());
    assert!(get(2).right() <= get(3).left());
    assert!(get(4).right() <= get(5).left());
    assert!(get(1).bottom() <= get(4).top());

    // the row seam moved up to 4
    assert_eq!(get(1).bottom(), 4);
    assert_eq!(get(4).top(), 4);
}

#[test]
fn test_keyboards_are_adapted_independently() {
    let mut hb1 = row_of_three(KB1, [1, 2, 3]);
    let mut hb2 = row_of_three(KB2, [2, 3, 4]);

    let mut ks1 = KeyStatSet::new(KB1);
    let mut ks2 = KeyStatSet::new(KB2);
    for (i, mean) in [12.0, 20.0, 26.0].into_iter().enumerate() {
        ks1.insert(KeyStat::from_summary(i as i32 + 1, mean, 3.0, 16.0, 4.0, 0.0, 30));
        ks2.insert(KeyStat::from_summary(i as i32 + 2, mean, 3.0, 16.0, 4.0, 0.0, 30));
    }

    compute_hitboxes(&ks1, &mut hb1, 0, 0, 5);
    compute_hitboxes(&ks2, &mut hb2, 0, 0, 5);

    assert!(hb1.find_by_code(1).unwrap().right() > 10);
    assert!(hb1.find_by_code(2).unwrap().right() > 20);
    assert!(hb2.find_by_code(2).unwrap().right() > 10);
    assert!(hb2.find_by_code(3).unwrap().right() > 20);
}

// --- END TO END ---

#[test]
fn test_learn_from_fresh_logs() {
    let mut store = MemoryStore::new();
    let before = row_of_three(KB1, [1, 2, 3]);
    store.save_hitbox_set(&before).unwrap();
    for log in three_sessions() {
        store.enqueue_log(&log).unwrap();
    }

    let mut learner = LayoutLearner::builder().store(store).config(unconstrained()).build();
    let report = learner.learn();

    assert_eq!(report.logs_drained, 3);
    assert_eq!(report.accepted, 20);
    assert_eq!(report.rejected_outliers, 0);
    assert_eq!(report.keyboards_updated, 1);

    let store = learner.into_store();
    assert_eq!(store.key_stat_sets().count(), 1);
    assert_eq!(store.hitbox_sets().count(), 1);
    assert_eq!(store.pending_len(), 0);

    let ks = store.load_key_stat_set(KB1).unwrap();
    assert_eq!(n_of(&ks, 1), Some(6));
    assert_eq!(n_of(&ks, 2), Some(8));
    assert_eq!(n_of(&ks, 3), Some(6));

    let after = store.load_hitbox_set(KB1).unwrap().unwrap();
    assert_seams_moved_right(&before, &after);
}

#[test]
fn test_learn_reinforces_existing_stats() {
    let mut store = MemoryStore::new();
    let before = row_of_three(KB1, [1, 2, 3]);
    store.save_hitbox_set(&before).unwrap();
    store.save_key_stat_set(&persisted_history()).unwrap();
    for log in three_sessions() {
        store.enqueue_log(&log).unwrap();
    }

    let mut learner = LayoutLearner::builder().store(store).config(unconstrained()).build();
    learner.learn();

    let ks = learner.store().load_key_stat_set(KB1).unwrap();
    assert_eq!(n_of(&ks, 1), Some(36));
    assert_eq!(n_of(&ks, 2), Some(38));
    assert_eq!(n_of(&ks, 3), Some(36));

    let after = learner.store().load_hitbox_set(KB1).unwrap().unwrap();
    assert_seams_moved_right(&before, &after);
}

#[test]
fn test_learn_multiple_keyboards_with_outlier() {
    let mut store = MemoryStore::new();
    let before1 = row_of_three(KB1, [1, 2, 3]);
    let before2 = row_of_three(KB2, [2, 3, 4]);
    store.save_hitbox_set(&before1).unwrap();
    store.save_hitbox_set(&before2).unwrap();
    store.save_key_stat_set(&persisted_history()).unwrap();
    for log in three_sessions() {
        store.enqueue_log(&log).unwrap();
    }

    // A session may switch keyboards mid-way.
    let mut mixed = session(KB2, &[(2, 7, 1), (2, 9, 2), (3, 17, 3)]);
    mixed.set(3, 3, Keystroke::new(2, 'B', 7, 1, KB1));
    store.enqueue_log(&mixed).unwrap();
    store
        .enqueue_log(&session(KB2, &[(3, 19, 2), (3, 24, 2), (2, 13, 2), (3, 23, 2), (3, 23, 2), (3, 25, 2)]))
        .unwrap();
    // the last touch is far outside key 2 and must be dropped
    store
        .enqueue_log(&session(KB2, &[(2, 14, 3), (2, 13, 3), (2, 11, 3), (2, 15, 3), (2, 25, 3)]))
        .unwrap();

    let mut learner = LayoutLearner::builder().store(store).config(unconstrained()).build();
    let report = learner.learn();
    assert_eq!(report.rejected_outliers, 1);
    assert_eq!(report.keyboards_updated, 2);

    let store = learner.into_store();
    assert_eq!(store.key_stat_sets().count(), 2);
    assert_eq!(store.hitbox_sets().count(), 2);

    let ks1 = store.load_key_stat_set(KB1).unwrap();
    assert_eq!(n_of(&ks1, 1), Some(36));
    assert_eq!(n_of(&ks1, 2), Some(39));
    assert_eq!(n_of(&ks1, 3), Some(36));

    let ks2 = store.load_key_stat_set(KB2).unwrap();
    assert_eq!(n_of(&ks2, 2), Some(7));
    assert_eq!(n_of(&ks2, 3), Some(6));
    assert_eq!(n_of(&ks2, 4), None);

    let after1 = store.load_hitbox_set(KB1).unwrap().unwrap();
    let after2 = store.load_hitbox_set(KB2).unwrap().unwrap();
    assert_seams_moved_right(&before1, &after1);
    assert!(after2.find_by_code(2).unwrap().right() > before2.find_by_code(2).unwrap().right());
    // key 4 was never typed, so its edge stays put
    assert_eq!(
        after2.find_by_code(4).unwrap().left(),
        before2.find_by_code(4).unwrap().left()
    );
}

#[test]
fn test_learn_through_json_store() {
    let dir = tempfile::tempdir().unwrap();
    let before = row_of_three(KB1, [1, 2, 3]);

    {
        let mut store = JsonStore::open(dir.path()).unwrap();
        store.save_hitbox_set(&before).unwrap();
        for log in three_sessions() {
            store.enqueue_log(&log).unwrap();
        }
    }

    let store = JsonStore::open(dir.path()).unwrap();
    let mut learner = LayoutLearner::builder().store(store).config(unconstrained()).build();
    let report = learner.learn();
    assert_eq!(report.logs_drained, 3);
    assert_eq!(report.save_failures, 0);

    let reopened = JsonStore::open(dir.path()).unwrap();
    let ks = reopened.load_key_stat_set(KB1).unwrap();
    assert_eq!(n_of(&ks, 2), Some(8));
    let after = reopened.load_hitbox_set(KB1).unwrap().unwrap();
    assert_seams_moved_right(&before, &after);

    // the queue was drained
    let mut reopened = reopened;
    assert!(reopened.drain_pending_logs().unwrap().is_empty());
}

#[test]
fn test_cap_limits_stored_samples() {
    let mut store = MemoryStore::new();
    store.save_hitbox_set(&row_of_three(KB1, [1, 2, 3])).unwrap();
    for log in three_sessions() {
        store.enqueue_log(&log).unwrap();
    }

    let config = LearnerConfig {
        data_cap: 10,
        ..unconstrained()
    };
    let mut learner = LayoutLearner::builder().store(store).config(config).build();
    learner.learn();

    let ks = learner.store().load_key_stat_set(KB1).unwrap();
    assert!(ks.total_samples() <= 10);
    assert!(ks.total_samples() > 0);
}

#[test]
fn test_learn_keeps_stored_keys_that_were_not_typed() {
    let mut store = MemoryStore::new();
    store.save_hitbox_set(&row_of_three(KB1, [1, 2, 3])).unwrap();

    let mut history = KeyStatSet::new(KB1);
    history.insert(KeyStat::from_summary(1, 5.0, 3.0, 4.0, 1.0, 0.0, 100));
    history.insert(KeyStat::from_summary(2, 15.0, 3.0, 4.0, 1.0, 0.0, 100));
    store.save_key_stat_set(&history).unwrap();
    store.enqueue_log(&session(KB1, &[(1, 5, 3)])).unwrap();

    let mut learner = LayoutLearner::builder().store(store).build();
    learner.learn();

    let ks = learner.store().load_key_stat_set(KB1).unwrap();
    assert_eq!(n_of(&ks, 1), Some(101));
    assert_eq!(n_of(&ks, 2), Some(100));
    assert_eq!(n_of(&ks, 3), None);
}

/// Two rows of two 50 x 50 keys; the row seam sits at y = 50.
fn two_by_two(kb: KeyboardHash) -> HitboxSet {
    HitboxSet::from_hitboxes(
        kb,
        vec![
            Hitbox::new(1, 0, 0, 50, 50),
            Hitbox::new(2, 50, 0, 100, 50),
            Hitbox::new(3, 0, 50, 50, 100),
            Hitbox::new(4, 50, 50, 100, 100),
        ],
    )
    .unwrap()
}

/// Both rows are hit low: the top row around y = 39, the bottom row around y = 76.
fn low_touches(kb: KeyboardHash) -> EditLog {
    session(
        kb,
        &[
            (1, 22, 34),
            (1, 27, 38),
            (1, 25, 41),
            (1, 20, 36),
            (1, 29, 39),
            (1, 24, 43),
            (2, 73, 35),
            (2, 77, 40),
            (2, 75, 37),
            (2, 71, 42),
            (2, 79, 38),
            (2, 76, 44),
            (3, 24, 72),
            (3, 26, 78),
            (3, 21, 75),
            (3, 28, 81),
            (3, 23, 74),
            (3, 25, 77),
            (4, 74, 76),
            (4, 77, 73),
            (4, 72, 79),
            (4, 78, 82),
            (4, 75, 71),
            (4, 76, 77),
        ],
    )
}

#[test]
fn test_learn_moves_row_seam_towards_touches() {
    let mut store = MemoryStore::new();
    store.save_hitbox_set(&two_by_two(KB1)).unwrap();
    store.enqueue_log(&low_touches(KB1)).unwrap();

    let mut learner = LayoutLearner::builder().store(store).build();
    let report = learner.learn();
    assert_eq!(report.accepted, 24);
    assert!(report.borders_moved >= 1);

    let after = learner.store().load_hitbox_set(KB1).unwrap().unwrap();
    let get = |code| after.find_by_code(code).unwrap();
    for code in [1, 2] {
        assert_eq!(get(code).top(), 0);
        assert_eq!(get(code).bottom(), 56);
    }
    for code in [3, 4] {
        assert_eq!(get(code).top(), 56);
        assert_eq!(get(code).bottom(), 100);
    }
}

#[test]
fn test_row_seam_respects_min_height() {
    let mut store = MemoryStore::new();
    store.save_hitbox_set(&two_by_two(KB1)).unwrap();
    store.enqueue_log(&low_touches(KB1)).unwrap();

    // a seam at 56 would leave the bottom row 44 px tall
    let config = LearnerConfig {
        min_height_dp: 45.0,
        ..Default::default()
    };
    let mut learner = LayoutLearner::builder().store(store).config(config).build();
    learner.learn();

    let after = learner.store().load_hitbox_set(KB1).unwrap().unwrap();
    let get = |code| after.find_by_code(code).unwrap();
    for code in [1, 2] {
        assert_eq!(get(code).bottom(), 50);
    }
    for code in [3, 4] {
        assert_eq!(get(code).top(), 50);
    }
}

#[rstest]
#[case(0, 1)]
#[case(44, 1)] // bottom row left exactly 44 px tall
#[case(45, 0)]
#[case(57, 0)]
fn test_row_pass_min_height_threshold(#[case] min_height: i32, #[case] expected_moves: usize) {
    let mut hb = two_by_two(KB1);
    let mut ks = KeyStatSet::new(KB1);
    for item in low_touches(KB1).complete_entries() {
        ks.add(item.code(), item.pos_x(), item.pos_y());
    }

    let report = compute_hitboxes(&ks, &mut hb, 0, min_height, 5);
    assert_eq!(report.rows_moved, expected_moves);
    let seam = if expected_moves == 1 { 56 } else { 50 };
    assert_eq!(hb.find_by_code(1).unwrap().bottom(), seam);
    assert_eq!(hb.find_by_code(3).unwrap().top(), seam);
}
