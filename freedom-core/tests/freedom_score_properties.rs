use freedom_core::{score_and_recommend, DiagnosticAnswers, SprintKey};

/// Deterministic spread of answer sets (LCG) so the sweep is reproducible.
fn answer_sets(n: usize) -> Vec<DiagnosticAnswers> {
    let mut state: u64 = 0x5eed_1234;
    let mut out = Vec::with_capacity(n);
    for _ in 0..n {
        let mut v = [0u8; 12];
        for x in v.iter_mut() {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            *x = ((state >> 33) % 10) as u8 + 1;
        }
        out.push(DiagnosticAnswers::from_array(v));
    }
    out
}

#[test]
fn totals_and_percent_are_consistent() {
    for a in answer_sets(2000) {
        let r = score_and_recommend(&a);
        let sum: f64 = r.module_averages.as_array().iter().sum();
        assert!((r.total_score - sum).abs() < 1e-9, "{a:?}");
        assert_eq!(r.percent, (r.total_score / 60.0 * 100.0).round() as u8);
        assert!((10..=100).contains(&r.percent));
        for m in r.module_averages.as_array() {
            assert!((1.0..=10.0).contains(&m));
        }
    }
}

#[test]
fn recommendation_count_follows_worst_score() {
    for a in answer_sets(2000) {
        let r = score_and_recommend(&a);
        let s = r.sprint_scores;
        let worst = [s.s1, s.s2, s.s3, s.s4, s.s5]
            .into_iter()
            .fold(f64::INFINITY, f64::min);
        let expected = if worst <= 6.0 { 3 } else { 2 };
        assert_eq!(r.recommended_order.len(), expected, "{a:?}");

        let priorities: Vec<u8> = r.recommended_order.iter().map(|x| x.priority).collect();
        assert_eq!(priorities, (1..=expected as u8).collect::<Vec<_>>());
    }
}

#[test]
fn delivery_is_weaker_of_systems_and_execution() {
    for a in answer_sets(2000) {
        let r = score_and_recommend(&a);
        let m = r.module_averages;
        assert_eq!(r.sprint_scores.s4, m.m3.min(m.m5));
        assert_eq!(r.sprint_scores.s1, m.m1);
        assert_eq!(r.sprint_scores.s2, m.m2);
        assert_eq!(r.sprint_scores.s3, m.m4);
        assert_eq!(r.sprint_scores.s5, m.m6);
    }
}

#[test]
fn pricing_precedes_conversion_when_tied() {
    for low in 1..=8u8 {
        let mut v = [10u8; 12];
        v[0] = low;
        v[1] = low;
        v[2] = low;
        v[3] = low;
        let r = score_and_recommend(&DiagnosticAnswers::from_array(v));
        let keys: Vec<SprintKey> = r.recommended_order.iter().map(|x| x.sprint_key).collect();
        assert_eq!(keys[..2], [SprintKey::S1, SprintKey::S2]);
    }
}

#[test]
fn identical_input_serializes_identically() {
    for a in answer_sets(200) {
        let first = serde_json::to_string(&score_and_recommend(&a)).unwrap();
        let second = serde_json::to_string(&score_and_recommend(&a)).unwrap();
        assert_eq!(first, second);
    }
}

#[test]
fn result_json_shape() {
    let r = score_and_recommend(&DiagnosticAnswers::uniform(5));
    let v: serde_json::Value = serde_json::to_value(&r).unwrap();
    assert_eq!(v["totalScore"], 30.0);
    assert_eq!(v["percent"], 50);
    assert_eq!(v["moduleAverages"]["M3"], 5.0);
    assert_eq!(v["sprintScores"]["S4"], 5.0);
    assert_eq!(v["recommendedOrder"][0]["sprintKey"], "S1");
    assert_eq!(v["recommendedOrder"][2]["priority"], 3);
    assert!(v["recommendedOrder"][0]["title"].is_string());
}
